mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "notiroute", version, about = "Notification routing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "notiroute",
            "send",
            "--setup",
            "setup.json",
            "request.json",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.setup.setup.to_str(), Some("setup.json"));
                assert_eq!(args.request.to_str(), Some("request.json"));
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn validate_requires_schema_id() {
        let err = Cli::try_parse_from([
            "notiroute",
            "validate",
            "--setup",
            "setup.json",
            "message.json",
        ])
        .expect_err("missing --schema should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn ingest_input_is_optional() {
        let cli = Cli::try_parse_from([
            "notiroute",
            "--format",
            "json",
            "ingest",
            "--setup",
            "setup.json",
            "--max-receive-count",
            "3",
        ])
        .expect("ingest args should parse");

        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Command::Ingest(args) => {
                assert!(args.input.is_none());
                assert_eq!(args.max_receive_count, Some(3));
                assert_eq!(args.acknowledge_rejected, None);
            }
            other => panic!("expected ingest, got {other:?}"),
        }
    }

    #[test]
    fn acknowledge_rejected_accepts_explicit_value() {
        let parse = |flag: &str| {
            let cli = Cli::try_parse_from([
                "notiroute",
                "ingest",
                "--setup",
                "setup.json",
                flag,
                "in.jsonl",
            ])
            .expect("ingest args should parse");
            match cli.command {
                Command::Ingest(args) => {
                    assert_eq!(args.input.as_deref(), Some(std::path::Path::new("in.jsonl")));
                    args.acknowledge_rejected
                }
                other => panic!("expected ingest, got {other:?}"),
            }
        };

        assert_eq!(parse("--acknowledge-rejected"), Some(true));
        assert_eq!(parse("--acknowledge-rejected=true"), Some(true));
        assert_eq!(parse("--acknowledge-rejected=false"), Some(false));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "notiroute",
            "check",
            "--setup",
            "setup.json",
            "--log-level",
            "off",
            "--log-format",
            "json",
        ])
        .expect("check args should parse");

        assert_eq!(cli.log_level, LogLevel::Off);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Check(_)));
    }
}
