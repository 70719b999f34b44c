//! Downlink configuration commands.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Port every configuration downlink is sent on.
pub const CONFIG_PORT: u8 = 85;

/// Leading byte of every command opcode.
pub const COMMAND_PREFIX: u8 = 0xff;

pub const OP_SET_REPORTING_INTERVAL: u8 = 0x03;
pub const OP_RESET: u8 = 0x10;
pub const OP_FACTORY_RESET: u8 = 0x99;

/// Trailer byte of the parameterless commands.
const COMMAND_TRAILER: u8 = 0xff;

/// A configuration command understood by the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Change the uplink period. Only the low 16 bits reach the device.
    SetReportingInterval { interval_seconds: u64 },
    /// Reboot the device.
    Reset,
    /// Wipe stored configuration and reboot.
    FactoryReset,
}

impl Command {
    /// Resolve a command by name. `interval_seconds` defaults to zero.
    pub fn from_name(name: &str, interval_seconds: Option<u64>) -> Result<Self> {
        match name {
            "set_reporting_interval" => Ok(Command::SetReportingInterval {
                interval_seconds: interval_seconds.unwrap_or(0),
            }),
            "reset" => Ok(Command::Reset),
            "factory_reset" => Ok(Command::FactoryReset),
            other => Err(CodecError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SetReportingInterval { .. } => "set_reporting_interval",
            Command::Reset => "reset",
            Command::FactoryReset => "factory_reset",
        }
    }

    /// Encode the command opcode sequence.
    ///
    /// ```text
    /// set_reporting_interval  FF 03 <interval u16 LE>
    /// reset                   FF 10 FF
    /// factory_reset           FF 99 FF
    /// ```
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(4);
        dst.put_u8(COMMAND_PREFIX);
        match *self {
            Command::SetReportingInterval { interval_seconds } => {
                if interval_seconds > u64::from(u16::MAX) {
                    tracing::warn!(
                        interval_seconds,
                        sent = interval_seconds as u16,
                        "reporting interval wraps to 16 bits"
                    );
                }
                dst.put_u8(OP_SET_REPORTING_INTERVAL);
                dst.put_u16_le(interval_seconds as u16);
            }
            Command::Reset => {
                dst.put_u8(OP_RESET);
                dst.put_u8(COMMAND_TRAILER);
            }
            Command::FactoryReset => {
                dst.put_u8(OP_FACTORY_RESET);
                dst.put_u8(COMMAND_TRAILER);
            }
        }
        dst.freeze()
    }

    /// Recognize an encoded downlink.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        match *bytes {
            [COMMAND_PREFIX, OP_SET_REPORTING_INTERVAL, lo, hi] => {
                Ok(Command::SetReportingInterval {
                    interval_seconds: u64::from(u16::from_le_bytes([lo, hi])),
                })
            }
            [COMMAND_PREFIX, OP_RESET, COMMAND_TRAILER] => Ok(Command::Reset),
            [COMMAND_PREFIX, OP_FACTORY_RESET, COMMAND_TRAILER] => Ok(Command::FactoryReset),
            _ => Err(CodecError::UnknownOpcode(bytes.to_vec())),
        }
    }
}

/// Command request as written by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownlinkRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
}

/// Downlink envelope handed over by the network server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownlinkInput {
    pub data: DownlinkRequest,
}

/// Encoded downlink ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Downlink {
    pub bytes: Vec<u8>,
    #[serde(rename = "fPort")]
    pub f_port: u8,
}

impl From<Command> for Downlink {
    fn from(command: Command) -> Self {
        Self {
            bytes: command.encode().to_vec(),
            f_port: CONFIG_PORT,
        }
    }
}

/// Result envelope returned to the network server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DownlinkResponse {
    Encoded(Downlink),
    Errors { errors: Vec<String> },
}

impl DownlinkResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, DownlinkResponse::Encoded(_))
    }
}

impl From<Result<Downlink>> for DownlinkResponse {
    fn from(result: Result<Downlink>) -> Self {
        match result {
            Ok(downlink) => DownlinkResponse::Encoded(downlink),
            Err(err) => DownlinkResponse::Errors {
                errors: vec![err.to_string()],
            },
        }
    }
}

/// Encode a named command request.
pub fn encode_downlink(request: &DownlinkRequest) -> Result<Downlink> {
    let command = Command::from_name(&request.command, request.interval_seconds)?;
    tracing::debug!(command = command.name(), "encoded downlink");
    Ok(command.into())
}

/// Encode a downlink envelope, never failing: errors become a one-entry list.
pub fn handle_downlink(input: &DownlinkInput) -> DownlinkResponse {
    encode_downlink(&input.data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: &str, interval_seconds: Option<u64>) -> DownlinkRequest {
        DownlinkRequest {
            command: command.to_string(),
            interval_seconds,
        }
    }

    #[test]
    fn reporting_interval_is_little_endian() {
        let downlink = encode_downlink(&request("set_reporting_interval", Some(300))).unwrap();
        assert_eq!(downlink.bytes, vec![0xff, 0x03, 0x2c, 0x01]);
        assert_eq!(downlink.f_port, CONFIG_PORT);
    }

    #[test]
    fn reporting_interval_defaults_to_zero() {
        let downlink = encode_downlink(&request("set_reporting_interval", None)).unwrap();
        assert_eq!(downlink.bytes, vec![0xff, 0x03, 0x00, 0x00]);
    }

    #[test]
    fn reporting_interval_wraps_at_16_bits() {
        let downlink = encode_downlink(&request("set_reporting_interval", Some(65_536 + 5))).unwrap();
        assert_eq!(downlink.bytes, vec![0xff, 0x03, 0x05, 0x00]);
    }

    #[test]
    fn reset_and_factory_reset() {
        assert_eq!(Command::Reset.encode().as_ref(), &[0xff, 0x10, 0xff]);
        assert_eq!(Command::FactoryReset.encode().as_ref(), &[0xff, 0x99, 0xff]);
        let downlink = encode_downlink(&request("reset", Some(10))).unwrap();
        assert_eq!(downlink.bytes, vec![0xff, 0x10, 0xff]);
    }

    #[test]
    fn unknown_command_envelope() {
        let input: DownlinkInput =
            serde_json::from_str(r#"{"data":{"command":"unknown_cmd"}}"#).unwrap();
        let response = handle_downlink(&input);
        assert!(!response.is_ok());
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"errors":["Unknown command: unknown_cmd"]}"#
        );
    }

    #[test]
    fn encoded_envelope_json() {
        let input: DownlinkInput = serde_json::from_str(
            r#"{"data":{"command":"set_reporting_interval","interval_seconds":300}}"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_string(&handle_downlink(&input)).unwrap(),
            r#"{"bytes":[255,3,44,1],"fPort":85}"#
        );
    }

    #[test]
    fn parse_recognizes_every_command() {
        for command in [
            Command::SetReportingInterval {
                interval_seconds: 900,
            },
            Command::Reset,
            Command::FactoryReset,
        ] {
            assert_eq!(Command::parse(&command.encode()).unwrap(), command);
        }
        assert!(matches!(
            Command::parse(&[0xff, 0x10]),
            Err(CodecError::UnknownOpcode(_))
        ));
        assert!(Command::parse(&[0xff, 0x10, 0x00]).is_err());
    }
}
