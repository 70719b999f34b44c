use edcmeter_codec::{Command, CONFIG_PORT};
use serde::Serialize;

use crate::cmd::{parse_hex, InspectArgs};
use crate::exit::{codec_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct InspectOutput {
    command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval_seconds: Option<u64>,
    #[serde(rename = "fPort")]
    f_port: u8,
}

impl From<Command> for InspectOutput {
    fn from(command: Command) -> Self {
        let interval_seconds = match command {
            Command::SetReportingInterval { interval_seconds } => Some(interval_seconds),
            Command::Reset | Command::FactoryReset => None,
        };
        Self {
            command: command.name(),
            interval_seconds,
            f_port: CONFIG_PORT,
        }
    }
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.payload)?;
    let command = Command::parse(&bytes).map_err(|err| codec_error("inspect failed", err))?;
    let output = InspectOutput::from(command);

    match format {
        OutputFormat::Json | OutputFormat::Raw => print_json(&output),
        OutputFormat::Table | OutputFormat::Pretty => match output.interval_seconds {
            Some(interval) => println!("{} interval_seconds={interval}", output.command),
            None => println!("{}", output.command),
        },
    }

    Ok(SUCCESS)
}
