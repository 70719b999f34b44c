use edcmeter_codec::{handle_uplink, DecodeConfig, UplinkInput};
use edcmeter_schema::Boundary;

use crate::cmd::{parse_hex, read_json_arg, DecodeArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_uplink, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = DecodeConfig {
        truncation: args.truncation.into(),
    };
    let input = resolve_input(&args)?;
    tracing::info!(f_port = input.f_port, size = input.bytes.len(), "decoding uplink");

    let response = handle_uplink(&input, &config);
    print_uplink(&response, format);

    if response.is_ok() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn resolve_input(args: &DecodeArgs) -> CliResult<UplinkInput> {
    if let Some(json) = &args.json {
        let json = read_json_arg(json)?;
        args.schema
            .registry()?
            .validate(Boundary::Uplink, json.as_bytes())
            .map_err(|err| schema_error("invalid uplink envelope", err))?;
        return serde_json::from_str(&json)
            .map_err(|err| CliError::new(DATA_INVALID, format!("invalid uplink envelope: {err}")));
    }

    let bytes = parse_hex(args.payload.as_deref().unwrap_or_default())?;
    Ok(UplinkInput {
        bytes,
        f_port: args.port,
    })
}
