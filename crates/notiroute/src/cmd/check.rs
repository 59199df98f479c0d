use notiroute_dispatch::Finding;
use serde::Serialize;

use crate::cmd::CheckArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct CheckOutput {
    schemas: usize,
    domains: usize,
    routes: usize,
    capabilities: usize,
    findings: Vec<Finding>,
    overall: &'static str,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let (_, catalog) = args.setup.load()?;
    let findings = catalog.audit();
    for finding in &findings {
        tracing::warn!(%finding, "dangling reference");
    }

    let has_findings = !findings.is_empty();
    let output = CheckOutput {
        schemas: catalog.schemas().len(),
        domains: catalog.registry().domains().len(),
        routes: catalog.registry().routes().len(),
        capabilities: catalog.registry().capabilities().len(),
        findings,
        overall: if has_findings { "fail" } else { "pass" },
    };

    print_check(&output, format);

    if has_findings {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_check(output: &CheckOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(
            "https://schemas.3leaps.dev/notiroute/cli/v1/check-report.schema.json",
            output,
        ),
        OutputFormat::Table => {
            println!(
                "schemas={} domains={} routes={} capabilities={}",
                output.schemas, output.domains, output.routes, output.capabilities
            );
            if output.findings.is_empty() {
                println!("no findings");
                return;
            }
            let mut table = new_table(vec!["FINDING"]);
            for finding in &output.findings {
                table.add_row(vec![finding.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for finding in &output.findings {
                println!("{finding}");
            }
            println!("overall: {}", output.overall);
        }
    }
}
