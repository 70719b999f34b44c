use bytes::Buf;

use crate::channel::{self, ChannelSpec, Encoding};
use crate::error::{CodecError, Result};
use crate::frame::{DecodedFrame, Value};

/// Widest value any channel carries.
pub const MAX_VALUE_WIDTH: usize = 8;

/// What to do when a channel id is followed by fewer bytes than its width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Truncation {
    /// Fail the whole decode with [`CodecError::Truncated`].
    #[default]
    Reject,
    /// Read the missing trailing bytes as zero.
    ZeroPad,
    /// Drop the partial field and stop, as for an unknown channel.
    Stop,
}

/// Configuration for the uplink decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Policy for a value cut short by the end of the buffer.
    pub truncation: Truncation,
}

/// Read a 16-bit big-endian unsigned integer.
pub fn read_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Read a 24-bit big-endian unsigned integer.
pub fn read_u24_be(bytes: [u8; 3]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}

/// Read a 32-bit big-endian unsigned integer.
pub fn read_u32_be(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Map every byte to the character with the same code point.
///
/// No multi-byte decoding takes place; NUL and control bytes are kept.
pub fn read_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Decode an uplink payload with the default configuration.
pub fn decode(bytes: &[u8]) -> Result<DecodedFrame> {
    decode_with_config(bytes, &DecodeConfig::default())
}

/// Decode an uplink payload.
///
/// Scans the buffer once, left to right. Each channel id selects the width,
/// encoding and scale of the value that follows it. An unknown id ends the
/// scan and whatever was decoded so far is returned; that is not an error.
///
/// ```text
/// ┌────┬──────────────┬────┬──────────────┬─────
/// │ id │ value (width)│ id │ value (width)│ ...
/// │ 1B │ per table    │ 1B │ per table    │
/// └────┴──────────────┴────┴──────────────┴─────
/// ```
pub fn decode_with_config(bytes: &[u8], config: &DecodeConfig) -> Result<DecodedFrame> {
    let mut src = bytes;
    let mut frame = DecodedFrame::new();

    while src.has_remaining() {
        let id = src.get_u8();
        let Some(spec) = channel::lookup(id) else {
            tracing::debug!(
                channel = id,
                discarded = src.remaining(),
                "unknown channel, stopping"
            );
            break;
        };

        let mut value_bytes = [0u8; MAX_VALUE_WIDTH];
        let available = src.remaining();
        if available < spec.width {
            match config.truncation {
                Truncation::Reject => {
                    return Err(CodecError::Truncated {
                        channel: id,
                        needed: spec.width,
                        available,
                    });
                }
                Truncation::Stop => {
                    tracing::warn!(field = spec.field, available, "truncated value, stopping");
                    break;
                }
                Truncation::ZeroPad => {
                    tracing::warn!(field = spec.field, available, "truncated value, zero-padding");
                }
            }
        }

        let take = available.min(spec.width);
        src.copy_to_slice(&mut value_bytes[..take]);

        let value = decode_value(spec, &value_bytes[..spec.width]);
        tracing::trace!(field = spec.field, %value, "decoded");
        frame.insert(spec.field, value);
    }

    Ok(frame)
}

/// Decode exactly `spec.width` bytes according to the channel rules.
pub fn decode_value(spec: &ChannelSpec, bytes: &[u8]) -> Value {
    debug_assert_eq!(bytes.len(), spec.width);

    match spec.encoding {
        Encoding::Ascii => Value::Text(read_latin1(bytes)),
        Encoding::Flag => Value::Integer(u32::from(bytes[0] != 0)),
        Encoding::Uint => {
            let raw = read_uint(bytes);
            if spec.is_scaled() {
                Value::Decimal(f64::from(raw) / f64::from(spec.scale))
            } else {
                Value::Integer(raw)
            }
        }
    }
}

fn read_uint(bytes: &[u8]) -> u32 {
    match *bytes {
        [b0] => u32::from(b0),
        [b0, b1] => u32::from(read_u16_be([b0, b1])),
        [b0, b1, b2] => read_u24_be([b0, b1, b2]),
        [b0, b1, b2, b3] => read_u32_be([b0, b1, b2, b3]),
        _ => unreachable!("integer channels are at most 4 bytes wide"),
    }
}
