use std::io::{BufRead, BufReader, Read};

use notiroute_dispatch::{
    AckDecision, Consumer, DeliveryMeta, Dispatcher, IngestConfig, IngestOutcome,
};
use serde::Deserialize;

use crate::cmd::IngestArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

const INGEST_OUTCOME_SCHEMA: &str =
    "https://schemas.3leaps.dev/notiroute/cli/v1/ingest-outcome.schema.json";

/// One queued delivery. `body` is the raw message text, or the envelope itself.
#[derive(Debug, Deserialize)]
struct QueueRecord {
    #[serde(flatten)]
    meta: DeliveryMeta,
    body: serde_json::Value,
}

impl QueueRecord {
    fn body_text(&self) -> String {
        match &self.body {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

pub fn run(args: IngestArgs, format: OutputFormat) -> CliResult<i32> {
    let (setup, catalog) = args.setup.load()?;
    let config = ingest_config(setup.ingest, &args);
    let consumer = Consumer::with_config(Dispatcher::new(catalog), config);

    let reader: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            std::fs::File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(std::io::stdin()),
    };

    let mut outcomes = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|err| io_error("failed reading input", err))?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = handle_line(&consumer, index + 1, &line);
        if format == OutputFormat::Table {
            outcomes.push(outcome);
        } else {
            print_outcome(&outcome, format);
        }
    }

    if format == OutputFormat::Table {
        print_table(&outcomes);
    }

    Ok(SUCCESS)
}

fn ingest_config(base: IngestConfig, args: &IngestArgs) -> IngestConfig {
    IngestConfig {
        acknowledge_rejected: args.acknowledge_rejected.unwrap_or(base.acknowledge_rejected),
        max_receive_count: args.max_receive_count.unwrap_or(base.max_receive_count),
    }
}

fn handle_line(consumer: &Consumer, line_number: usize, line: &str) -> IngestOutcome {
    match serde_json::from_str::<QueueRecord>(line) {
        Ok(record) => consumer.handle(&record.body_text(), &record.meta),
        Err(err) => {
            // Not a delivery record at all; nothing to redeliver.
            tracing::warn!(line = line_number, error = %err, "skipping malformed delivery record");
            IngestOutcome {
                message_id: format!("line-{line_number}"),
                decision: AckDecision::Acknowledge,
                kind: None,
                report: None,
                error: Some(format!("malformed delivery record: {err}")),
            }
        }
    }
}

fn decision_label(decision: AckDecision) -> &'static str {
    match decision {
        AckDecision::Acknowledge => "acknowledge",
        AckDecision::Withhold => "withhold",
    }
}

fn print_outcome(outcome: &IngestOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(INGEST_OUTCOME_SCHEMA, outcome),
        OutputFormat::Raw => {
            println!("{}\t{}", outcome.message_id, decision_label(outcome.decision));
        }
        OutputFormat::Pretty | OutputFormat::Table => {
            let summary = match (&outcome.report, &outcome.error) {
                (_, Some(error)) => error.clone(),
                (Some(report), None) => format!(
                    "delivered={} failed={}",
                    report.delivered_count(),
                    report.failed_count()
                ),
                (None, None) => "no dispatch".to_string(),
            };
            println!(
                "{} [{}] {}: {}",
                outcome.message_id,
                outcome.kind.as_deref().unwrap_or("-"),
                decision_label(outcome.decision),
                summary
            );
        }
    }
}

fn print_table(outcomes: &[IngestOutcome]) {
    let mut table = new_table(vec!["MESSAGE", "TYPE", "DECISION", "DELIVERED", "FAILED", "ERROR"]);
    for outcome in outcomes {
        let (delivered, failed) = outcome
            .report
            .as_ref()
            .map(|r| (r.delivered_count().to_string(), r.failed_count().to_string()))
            .unwrap_or_default();
        table.add_row(vec![
            outcome.message_id.clone(),
            outcome.kind.clone().unwrap_or_default(),
            decision_label(outcome.decision).to_string(),
            delivered,
            failed,
            outcome.error.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
}
