use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use notiroute_dispatch::{DispatchReport, PayloadOutcome, PayloadReport};
use serde::Serialize;

pub const DISPATCH_REPORT_SCHEMA: &str =
    "https://schemas.3leaps.dev/notiroute/cli/v1/dispatch-report.schema.json";

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Serialize `value` as one JSON line, tagged with its output schema.
pub fn print_json<T: Serialize>(schema_id: &'static str, value: &T) {
    #[derive(Serialize)]
    struct Tagged<'a, T> {
        schema_id: &'static str,
        #[serde(flatten)]
        value: &'a T,
    }

    println!(
        "{}",
        serde_json::to_string(&Tagged { schema_id, value }).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_dispatch_report(report: &DispatchReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(DISPATCH_REPORT_SCHEMA, report),
        OutputFormat::Table => {
            if let Some(rejection) = &report.rejection {
                println!("request rejected: {rejection}");
                return;
            }
            let mut table = new_table(vec!["#", "ROUTE", "STAGE", "STATUS", "DETAIL"]);
            for payload in &report.payloads {
                table.add_row(vec![
                    payload.index.to_string(),
                    payload.route_id.clone(),
                    format!("{:?}", payload.stage),
                    status_label(payload).to_string(),
                    detail(payload),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("capability: {}", report.capability_id);
            if let Some(rejection) = &report.rejection {
                println!("  rejected: {rejection}");
                return;
            }
            for payload in &report.payloads {
                println!(
                    "  [{}] {} {}: {}",
                    payload.index,
                    payload.route_id,
                    status_label(payload),
                    detail(payload)
                );
                if let Some(notiroute_dispatch::PayloadFailure::ValidationViolation {
                    errors, ..
                }) = payload.failure()
                {
                    for error in errors {
                        println!("      - {error}");
                    }
                }
            }
            println!(
                "  delivered={} failed={}",
                report.delivered_count(),
                report.failed_count()
            );
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            for payload in &report.payloads {
                let _ = writeln!(out, "{}\t{}", payload.route_id, status_label(payload));
            }
            let _ = out.flush();
        }
    }
}

fn status_label(payload: &PayloadReport) -> &'static str {
    if payload.is_delivered() {
        "delivered"
    } else {
        "failed"
    }
}

fn detail(payload: &PayloadReport) -> String {
    match &payload.outcome {
        PayloadOutcome::Delivered {
            domain_id,
            platform_type,
        } => format!("{domain_id} ({platform_type})"),
        PayloadOutcome::Failed { failure } => failure.to_string(),
    }
}
