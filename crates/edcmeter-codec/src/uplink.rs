//! Uplink routing between the range-test record and the TLV decoder.

use bytes::Buf;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_with_config, DecodeConfig};
use crate::error::Result;
use crate::frame::DecodedFrame;

/// Port the range-test application transmits on.
pub const RANGE_TEST_PORT: u8 = 2;

/// Exact size of a range-test record.
pub const RANGE_TEST_LEN: usize = 5;

/// First byte of a range-test record.
pub const RANGE_TEST_MARKER: u8 = 0xff;

/// A decoded uplink.
#[derive(Debug, Clone, PartialEq)]
pub enum Uplink {
    /// Diagnostic record carrying the device Unix timestamp.
    RangeTest { timestamp: u32 },
    /// Regular meter telemetry.
    Measurements(DecodedFrame),
}

impl Serialize for Uplink {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Uplink::RangeTest { timestamp } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("message_type", "range_test")?;
                map.serialize_entry("timestamp", timestamp)?;
                map.end()
            }
            Uplink::Measurements(frame) => frame.serialize(serializer),
        }
    }
}

/// Returns true if the payload is a range-test record rather than TLV data.
pub fn is_range_test(bytes: &[u8], f_port: u8) -> bool {
    f_port == RANGE_TEST_PORT && bytes.len() == RANGE_TEST_LEN && bytes[0] == RANGE_TEST_MARKER
}

/// Route and decode an uplink with the default decoder configuration.
pub fn decode_uplink(bytes: &[u8], f_port: u8) -> Result<Uplink> {
    decode_uplink_with_config(bytes, f_port, &DecodeConfig::default())
}

/// Route and decode an uplink.
pub fn decode_uplink_with_config(
    bytes: &[u8],
    f_port: u8,
    config: &DecodeConfig,
) -> Result<Uplink> {
    if is_range_test(bytes, f_port) {
        let mut src = &bytes[1..];
        let timestamp = src.get_u32();
        tracing::debug!(timestamp, "range test record");
        return Ok(Uplink::RangeTest { timestamp });
    }

    let frame = decode_with_config(bytes, config)?;
    tracing::debug!(f_port, fields = frame.len(), "decoded uplink");
    Ok(Uplink::Measurements(frame))
}

/// Uplink as handed over by the network server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkInput {
    pub bytes: Vec<u8>,
    #[serde(rename = "fPort")]
    pub f_port: u8,
}

/// Result envelope returned to the network server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UplinkResponse {
    Data { data: Uplink },
    Errors { errors: Vec<String> },
}

impl UplinkResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, UplinkResponse::Data { .. })
    }
}

impl From<Result<Uplink>> for UplinkResponse {
    fn from(result: Result<Uplink>) -> Self {
        match result {
            Ok(data) => UplinkResponse::Data { data },
            Err(err) => {
                tracing::warn!(error = %err, "uplink decode failed");
                UplinkResponse::Errors {
                    errors: vec![err.to_string()],
                }
            }
        }
    }
}

/// Decode an uplink envelope, never failing: errors become a one-entry list.
pub fn handle_uplink(input: &UplinkInput, config: &DecodeConfig) -> UplinkResponse {
    decode_uplink_with_config(&input.bytes, input.f_port, config).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Value;

    #[test]
    fn range_test_record() {
        let uplink = decode_uplink(&[0xff, 0x00, 0x00, 0x01, 0x00], 2).unwrap();
        assert_eq!(uplink, Uplink::RangeTest { timestamp: 256 });

        let json = serde_json::to_string(&UplinkResponse::from(Ok(uplink))).unwrap();
        assert_eq!(
            json,
            r#"{"data":{"message_type":"range_test","timestamp":256}}"#
        );
    }

    #[test]
    fn range_test_needs_port_length_and_marker() {
        assert!(is_range_test(&[0xff, 0, 0, 0, 1], 2));
        assert!(!is_range_test(&[0xff, 0, 0, 0, 1], 3));
        assert!(!is_range_test(&[0xff, 0, 0, 1], 2));
        assert!(!is_range_test(&[0xff, 0, 0, 0, 1, 0], 2));
        assert!(!is_range_test(&[0xfe, 0, 0, 0, 1], 2));
    }

    #[test]
    fn other_ports_use_the_decoder() {
        // 0xff is not a channel, so the TLV decoder yields nothing.
        let uplink = decode_uplink(&[0xff, 0x00, 0x00, 0x01, 0x00], 1).unwrap();
        assert_eq!(uplink, Uplink::Measurements(DecodedFrame::new()));

        let uplink = decode_uplink(&[0x02, 0x64], 2).unwrap();
        let Uplink::Measurements(frame) = uplink else {
            panic!("expected measurements");
        };
        assert_eq!(frame.get("battery"), Some(&Value::Integer(100)));
    }

    #[test]
    fn decode_failure_becomes_single_error() {
        let input = UplinkInput {
            bytes: vec![0x1e, 0x00],
            f_port: 1,
        };
        let response = handle_uplink(&input, &DecodeConfig::default());
        assert!(!response.is_ok());
        let UplinkResponse::Errors { errors } = &response else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("truncated value on channel 0x1e"));
    }

    #[test]
    fn measurement_envelope_json() {
        let input: UplinkInput =
            serde_json::from_str(r#"{"bytes":[2,100,30,0,230],"fPort":1}"#).unwrap();
        let response = handle_uplink(&input, &DecodeConfig::default());
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"data":{"battery":100,"v1":23.0}}"#
        );
    }
}
