use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use edcmeter_codec::{ChannelSpec, DownlinkResponse, Uplink, UplinkResponse};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
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

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn uplink_rows(uplink: &Uplink) -> Vec<(String, String)> {
    match uplink {
        Uplink::RangeTest { timestamp } => vec![
            ("message_type".to_string(), "range_test".to_string()),
            ("timestamp".to_string(), timestamp.to_string()),
        ],
        Uplink::Measurements(frame) => frame
            .iter()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect(),
    }
}

/// Uplinks have no raw form; `Raw` falls back to JSON.
pub fn print_uplink(response: &UplinkResponse, format: OutputFormat) {
    match (format, response) {
        (OutputFormat::Json | OutputFormat::Raw, _) => print_json(response),
        (OutputFormat::Table, UplinkResponse::Data { data }) => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (field, value) in uplink_rows(data) {
                table.add_row(vec![field, value]);
            }
            println!("{table}");
        }
        (OutputFormat::Pretty, UplinkResponse::Data { data }) => {
            let line = uplink_rows(data)
                .into_iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
        (_, UplinkResponse::Errors { errors }) => print_errors(errors),
    }
}

pub fn print_downlink(response: &DownlinkResponse, format: OutputFormat) {
    match (format, response) {
        (OutputFormat::Json, _) => print_json(response),
        (OutputFormat::Raw, DownlinkResponse::Encoded(downlink)) => print_raw(&downlink.bytes),
        (OutputFormat::Table, DownlinkResponse::Encoded(downlink)) => {
            let mut table = new_table(vec!["BYTES", "FPORT"]);
            table.add_row(vec![hex::encode(&downlink.bytes), downlink.f_port.to_string()]);
            println!("{table}");
        }
        (OutputFormat::Pretty, DownlinkResponse::Encoded(downlink)) => {
            println!(
                "bytes={} fPort={}",
                hex::encode(&downlink.bytes),
                downlink.f_port
            );
        }
        (_, DownlinkResponse::Errors { errors }) => print_errors(errors),
    }
}

fn print_errors(errors: &[String]) {
    for error in errors {
        println!("error: {error}");
    }
}

#[derive(Serialize)]
struct PayloadOutput {
    bytes: Vec<u8>,
    hex: String,
    size: usize,
}

pub fn print_payload(payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PayloadOutput {
            bytes: payload.to_vec(),
            hex: hex::encode(payload),
            size: payload.len(),
        }),
        OutputFormat::Raw => print_raw(payload),
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", hex::encode(payload)),
    }
}

#[derive(Serialize)]
struct ChannelOutput {
    id: u8,
    field: &'static str,
    width: usize,
    encoding: &'static str,
    scale: u32,
}

pub fn print_channels(channels: &[ChannelSpec], format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            let out: Vec<ChannelOutput> = channels
                .iter()
                .map(|spec| ChannelOutput {
                    id: spec.id,
                    field: spec.field,
                    width: spec.width,
                    encoding: spec.encoding.as_str(),
                    scale: spec.scale,
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "FIELD", "WIDTH", "ENCODING", "SCALE"]);
            for spec in channels {
                table.add_row(vec![
                    format!("0x{:02x}", spec.id),
                    spec.field.to_string(),
                    spec.width.to_string(),
                    spec.encoding.as_str().to_string(),
                    scale_text(spec),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for spec in channels {
                println!(
                    "0x{:02x} {:<34} {} {:<5} {}",
                    spec.id,
                    spec.field,
                    spec.width,
                    spec.encoding.as_str(),
                    scale_text(spec)
                );
            }
        }
    }
}

fn scale_text(spec: &ChannelSpec) -> String {
    if spec.is_scaled() {
        format!("1/{}", spec.scale)
    } else {
        "-".to_string()
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
