use edcmeter_codec::channel::{self, BATTERY};
use edcmeter_codec::{battery_percent, Encoding, PayloadWriter};

use crate::cmd::BuildArgs;
use crate::exit::{codec_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_payload, OutputFormat};

pub fn run(args: BuildArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = build_payload(&args)?;
    tracing::info!(size = payload.len(), "built uplink payload");
    print_payload(&payload, format);
    Ok(SUCCESS)
}

fn build_payload(args: &BuildArgs) -> CliResult<Vec<u8>> {
    let mut writer = PayloadWriter::new();

    if let Some(level) = args.battery_level {
        writer
            .put_raw(BATTERY, u64::from(battery_percent(level)))
            .map_err(|err| codec_error("battery", err))?;
    }

    for assignment in &args.fields {
        let (field, value) = assignment.split_once('=').ok_or_else(|| {
            CliError::new(USAGE, format!("expected FIELD=VALUE, got {assignment:?}"))
        })?;
        let spec = channel::by_field(field)
            .ok_or_else(|| CliError::new(USAGE, format!("unknown field: {field}")))?;

        let result = match spec.encoding {
            Encoding::Ascii => writer.put_text(field, value),
            Encoding::Uint | Encoding::Flag => {
                let number: f64 = value.parse().map_err(|_| {
                    CliError::new(USAGE, format!("{field}: {value:?} is not a number"))
                })?;
                writer.put_value(field, number)
            }
        };
        result.map_err(|err| codec_error(field, err))?;
    }

    Ok(writer.finish().to_vec())
}
