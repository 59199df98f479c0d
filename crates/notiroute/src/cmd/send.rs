use notiroute_dispatch::{Dispatcher, NotificationRequest};

use crate::cmd::{read_input, SendArgs};
use crate::exit::{dispatch_error, CliResult, DATA_INVALID, FAILURE, SUCCESS};
use crate::output::{print_dispatch_report, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let (_, catalog) = args.setup.load()?;
    let text = read_input(&args.request)?;
    let request = NotificationRequest::from_json(&text).map_err(|err| {
        dispatch_error(&format!("failed decoding {}", args.request.display()), err)
    })?;

    let report = Dispatcher::new(catalog).send(&request);
    print_dispatch_report(&report, format);

    Ok(exit_code(&report))
}

fn exit_code(report: &notiroute_dispatch::DispatchReport) -> i32 {
    if report.is_rejected() {
        FAILURE
    } else if report.all_delivered() {
        SUCCESS
    } else {
        DATA_INVALID
    }
}
