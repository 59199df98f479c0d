use std::fmt;
use std::io;

use notiroute_dispatch::DispatchError;

// Exit codes follow the sysexits-style layout shared by our CLIs.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG_INVALID: i32 = 78;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn dispatch_error(context: &str, err: DispatchError) -> CliError {
    match err {
        DispatchError::SetupRead { source, .. } if source.kind() != io::ErrorKind::NotFound => {
            io_error(context, source)
        }
        DispatchError::SetupRead { .. }
        | DispatchError::InvalidSetup(_)
        | DispatchError::Schema(_) => CliError::new(CONFIG_INVALID, format!("{context}: {err}")),
        DispatchError::InvalidEnvelope(_)
        | DispatchError::MissingContent { .. }
        | DispatchError::InvalidRequest(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}
