use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use edcmeter_codec::Truncation;
use edcmeter_schema::{RegistryConfig, SchemaRegistry};

use crate::exit::{schema_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod build;
pub mod channels;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode an uplink payload.
    Decode(DecodeArgs),
    /// Encode a downlink command.
    Encode(EncodeArgs),
    /// Identify the command carried by a downlink payload.
    Inspect(InspectArgs),
    /// Build an uplink payload from field values.
    Build(BuildArgs),
    /// List the channel table.
    Channels(ChannelsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Build(args) => build::run(args, format),
        Command::Channels(args) => channels::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum TruncationArg {
    #[default]
    Reject,
    ZeroPad,
    Stop,
}

impl From<TruncationArg> for Truncation {
    fn from(arg: TruncationArg) -> Self {
        match arg {
            TruncationArg::Reject => Truncation::Reject,
            TruncationArg::ZeroPad => Truncation::ZeroPad,
            TruncationArg::Stop => Truncation::Stop,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct SchemaArgs {
    /// Reject envelope properties the schema does not declare.
    #[arg(long)]
    pub strict: bool,
    /// Directory with uplink.schema.json / downlink.schema.json overrides.
    #[arg(long, value_name = "DIR", env = "EDCMETER_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,
}

impl SchemaArgs {
    pub fn registry(&self) -> CliResult<SchemaRegistry> {
        let config = RegistryConfig {
            strict_mode: self.strict,
            ..RegistryConfig::default()
        };
        let registry = match self.schema_dir.as_deref() {
            Some(dir) => SchemaRegistry::from_directory(dir, config),
            None => SchemaRegistry::builtin(config),
        };
        registry.map_err(|err| schema_error("schema setup failed", err))
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Payload as hex (whitespace, ':' and a 0x prefix are ignored).
    #[arg(required_unless_present = "json", conflicts_with = "json")]
    pub payload: Option<String>,
    /// LoRaWAN port the payload arrived on.
    #[arg(long, short = 'p', default_value = "2")]
    pub port: u8,
    /// Network-server envelope: {"bytes": [...], "fPort": n}.
    #[arg(long)]
    pub json: Option<String>,
    /// Policy for a value cut short by the end of the payload.
    #[arg(long, value_enum, default_value = "reject", env = "EDCMETER_TRUNCATION")]
    pub truncation: TruncationArg,
    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command name (set_reporting_interval, reset, factory_reset).
    #[arg(required_unless_present = "json", conflicts_with = "json")]
    pub command: Option<String>,
    /// Reporting interval for set_reporting_interval.
    #[arg(long, short = 'i')]
    pub interval_seconds: Option<u64>,
    /// Network-server envelope: {"data": {"command": "...", ...}}.
    #[arg(long)]
    pub json: Option<String>,
    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Downlink payload as hex.
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Field values as FIELD=VALUE, in payload order.
    #[arg(required_unless_present = "battery_level", value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,
    /// LoRaWAN battery level (0-255), written first as battery percent.
    #[arg(long)]
    pub battery_level: Option<u8>,
}

#[derive(Args, Debug, Default)]
pub struct ChannelsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a hex payload, tolerating separators people paste from consoles.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    hex::decode(&cleaned)
        .map_err(|err| CliError::new(USAGE, format!("payload is not valid hex: {err}")))
}

pub fn read_json_arg(path_or_inline: &str) -> CliResult<String> {
    match path_or_inline.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .map_err(|err| CliError::new(USAGE, format!("failed reading {path}: {err}"))),
        None => Ok(path_or_inline.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_common_spellings() {
        assert_eq!(parse_hex("0264").unwrap(), vec![0x02, 0x64]);
        assert_eq!(parse_hex("0x1E00E6").unwrap(), vec![0x1e, 0x00, 0xe6]);
        assert_eq!(parse_hex("02 64:1e-00 e6\n").unwrap(), vec![2, 0x64, 0x1e, 0, 0xe6]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        assert_eq!(parse_hex("zz").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("026").unwrap_err().code, USAGE);
    }

    #[test]
    fn json_arg_inline_passthrough() {
        assert_eq!(read_json_arg(r#"{"a":1}"#).unwrap(), r#"{"a":1}"#);
        assert_eq!(read_json_arg("@/nonexistent/edcmeter.json").unwrap_err().code, USAGE);
    }
}
