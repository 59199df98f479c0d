use notiroute_schema::{Message, PayloadValidator, ValidationResult};
use serde::Serialize;

use crate::cmd::{read_input, ValidateArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

const VALIDATION_SCHEMA: &str =
    "https://schemas.3leaps.dev/notiroute/cli/v1/validation-result.schema.json";

#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    schema: &'a str,
    #[serde(flatten)]
    result: &'a ValidationResult,
}

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let (_, catalog) = args.setup.load()?;
    let text = read_input(&args.message)?;
    let message: Message = serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not a JSON object: {err}", args.message.display()),
        )
    })?;

    let result = catalog.schemas().validate(&args.schema, &message);
    print_result(&args.schema, &result, format);

    if result.is_valid() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn print_result(schema: &str, result: &ValidationResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(VALIDATION_SCHEMA, &ValidationOutput { schema, result }),
        OutputFormat::Table => {
            if result.is_valid() {
                println!("{schema}: valid");
                return;
            }
            let mut table = new_table(vec!["#", "ERROR"]);
            for (index, error) in result.errors.iter().enumerate() {
                table.add_row(vec![(index + 1).to_string(), error.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            if result.is_valid() {
                println!("{schema}: valid");
            }
            for error in &result.errors {
                println!("{error}");
            }
        }
    }
}
