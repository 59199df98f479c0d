use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use notiroute_dispatch::{Catalog, Setup};
use notiroute_schema::StoreConfig;

use crate::exit::{dispatch_error, io_error, CliResult};
use crate::output::OutputFormat;

pub mod check;
pub mod ingest;
pub mod send;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dispatch a notification request and print the report.
    Send(SendArgs),
    /// Validate one message against a registered schema.
    Validate(ValidateArgs),
    /// Consume queued envelopes and print an acknowledgement decision for each.
    Ingest(IngestArgs),
    /// Report routes and capabilities that reference unregistered entries.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Validate(args) => validate::run(args, format),
        Command::Ingest(args) => ingest::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Setup document declaring schemas, domains, routes and capabilities.
    #[arg(long, value_name = "FILE", env = "NOTIROUTE_SETUP")]
    pub setup: PathBuf,
    /// Reject undeclared message keys unless a schema allows them.
    #[arg(long)]
    pub strict: bool,
}

impl SetupArgs {
    pub fn load(&self) -> CliResult<(Setup, Catalog)> {
        let context = format!("failed loading setup {}", self.setup.display());
        let setup = Setup::from_file(&self.setup).map_err(|err| dispatch_error(&context, err))?;
        let config = StoreConfig {
            strict_mode: self.strict,
            ..StoreConfig::default()
        };
        let catalog = setup
            .build(config)
            .map_err(|err| dispatch_error(&context, err))?;
        Ok((setup, catalog))
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub setup: SetupArgs,
    /// Request document (JSON).
    pub request: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub setup: SetupArgs,
    /// Schema id to validate against.
    #[arg(long)]
    pub schema: String,
    /// Message document (JSON object).
    pub message: PathBuf,
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    #[command(flatten)]
    pub setup: SetupArgs,
    /// JSON-lines deliveries. Reads stdin when omitted.
    pub input: Option<PathBuf>,
    /// Acknowledge requests naming an unknown capability (`=false` turns it off).
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub acknowledge_rejected: Option<bool>,
    /// Acknowledge any message once its receive count reaches this value (0 disables).
    #[arg(long, value_name = "N")]
    pub max_receive_count: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub setup: SetupArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn read_input(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}
