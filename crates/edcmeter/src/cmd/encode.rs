use edcmeter_codec::{handle_downlink, DownlinkInput, DownlinkRequest};
use edcmeter_schema::Boundary;

use crate::cmd::{read_json_arg, EncodeArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_downlink, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = resolve_input(&args)?;
    tracing::info!(command = %input.data.command, "encoding downlink");

    let response = handle_downlink(&input);
    print_downlink(&response, format);

    if response.is_ok() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn resolve_input(args: &EncodeArgs) -> CliResult<DownlinkInput> {
    if let Some(json) = &args.json {
        let json = read_json_arg(json)?;
        args.schema
            .registry()?
            .validate(Boundary::Downlink, json.as_bytes())
            .map_err(|err| schema_error("invalid downlink envelope", err))?;
        return serde_json::from_str(&json).map_err(|err| {
            CliError::new(DATA_INVALID, format!("invalid downlink envelope: {err}"))
        });
    }

    Ok(DownlinkInput {
        data: DownlinkRequest {
            command: args.command.clone().unwrap_or_default(),
            interval_seconds: args.interval_seconds,
        },
    })
}
