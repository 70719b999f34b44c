use bytes::{BufMut, Bytes, BytesMut};

use crate::channel::{self, ChannelSpec, Encoding};
use crate::error::{CodecError, Result};

/// Largest application payload the meter sends in one uplink.
pub const MAX_PAYLOAD: usize = 242;

/// LoRaWAN battery level meaning "not measured".
pub const BATTERY_UNKNOWN: u8 = 0xff;

const LORAWAN_MAX_BATTERY: u32 = 254;

/// Builds uplink payloads the way the meter firmware does.
///
/// Each `put_*` call appends one channel id followed by its big-endian value.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: BytesMut,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_PAYLOAD),
        }
    }

    /// Append a raw, unscaled integer on a numeric or flag channel.
    pub fn put_raw(&mut self, id: u8, raw: u64) -> Result<&mut Self> {
        let spec = channel::lookup(id).ok_or(CodecError::UnknownChannel(id))?;
        if spec.encoding == Encoding::Ascii {
            return Err(CodecError::EncodingMismatch {
                field: spec.field,
                expected: "numeric",
            });
        }
        if raw > spec.max_raw() {
            return Err(CodecError::ValueOutOfRange {
                field: spec.field,
                value: raw as f64,
                width: spec.width,
            });
        }
        self.buf.put_u8(spec.id);
        self.buf.put_uint(raw, spec.width);
        Ok(self)
    }

    /// Append an engineering value by field name, applying the channel scale.
    pub fn put_value(&mut self, field: &str, value: f64) -> Result<&mut Self> {
        let spec = lookup_field(field)?;
        let raw = (value * f64::from(spec.scale)).round();
        if !raw.is_finite() || raw < 0.0 || raw > spec.max_raw() as f64 {
            return Err(CodecError::ValueOutOfRange {
                field: spec.field,
                value,
                width: spec.width,
            });
        }
        self.put_raw(spec.id, raw as u64)
    }

    /// Append fixed-width text, padded with NUL.
    pub fn put_text(&mut self, field: &str, text: &str) -> Result<&mut Self> {
        let spec = lookup_field(field)?;
        if spec.encoding != Encoding::Ascii {
            return Err(CodecError::EncodingMismatch {
                field: spec.field,
                expected: "text",
            });
        }

        let mut encoded = Vec::with_capacity(spec.width);
        for c in text.chars() {
            let byte = u8::try_from(u32::from(c)).map_err(|_| invalid_text(spec))?;
            encoded.push(byte);
        }
        if encoded.len() > spec.width {
            return Err(invalid_text(spec));
        }
        encoded.resize(spec.width, 0);

        self.buf.put_u8(spec.id);
        self.buf.put_slice(&encoded);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the payload.
    pub fn finish(self) -> Bytes {
        tracing::trace!(size = self.buf.len(), "uplink payload built");
        self.buf.freeze()
    }
}

fn lookup_field(field: &str) -> Result<&'static ChannelSpec> {
    channel::by_field(field).ok_or_else(|| CodecError::UnknownField(field.to_string()))
}

fn invalid_text(spec: &ChannelSpec) -> CodecError {
    CodecError::InvalidText {
        field: spec.field,
        width: spec.width,
    }
}

/// Convert a LoRaWAN battery level to the percentage carried on channel 0x02.
///
/// `0` (external power) maps to 0 and [`BATTERY_UNKNOWN`] is passed through.
pub fn battery_percent(level: u8) -> u8 {
    match level {
        0 => 0,
        BATTERY_UNKNOWN => BATTERY_UNKNOWN,
        level => {
            let pct = (u32::from(level) * 100 + LORAWAN_MAX_BATTERY / 2) / LORAWAN_MAX_BATTERY;
            pct as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ACTIVE_ENERGY, BATTERY, NETWORK_STATE, V1};
    use crate::codec::decode;
    use crate::frame::Value;

    #[test]
    fn firmware_layout() {
        let mut writer = PayloadWriter::new();
        writer
            .put_raw(BATTERY, 100)
            .unwrap()
            .put_raw(NETWORK_STATE, 1)
            .unwrap()
            .put_raw(ACTIVE_ENERGY, 0x0102_0304)
            .unwrap();
        assert_eq!(
            writer.finish().as_ref(),
            &[0x02, 100, 0x04, 0x01, 0x0a, 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn written_values_decode_back() {
        let mut writer = PayloadWriter::new();
        writer.put_value("v1", 230.4).unwrap();
        writer.put_value("fpl2", 0.87).unwrap();
        writer.put_value("reactive_qb", 1.5).unwrap();
        writer.put_value("serial_number", 4_000_000_000.0).unwrap();
        writer.put_text("serial_number_str", "EDC0042").unwrap();

        let frame = decode(&writer.finish()).unwrap();
        assert_eq!(frame.get("v1"), Some(&Value::Decimal(230.4)));
        assert_eq!(frame.get("fpl2"), Some(&Value::Decimal(0.87)));
        assert_eq!(frame.get("reactive_qb"), Some(&Value::Decimal(1.5)));
        assert_eq!(frame.get("serial_number"), Some(&Value::Integer(4_000_000_000)));
        assert_eq!(
            frame.get("serial_number_str"),
            Some(&Value::Text("EDC0042\0".to_string()))
        );
    }

    #[test]
    fn rejects_out_of_range_and_unknown() {
        let mut writer = PayloadWriter::new();
        assert!(matches!(
            writer.put_raw(V1, 0x1_0000),
            Err(CodecError::ValueOutOfRange { field: "v1", .. })
        ));
        assert!(matches!(
            writer.put_value("fpl1", -0.1),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            writer.put_raw(0x01, 1),
            Err(CodecError::UnknownChannel(0x01))
        ));
        assert!(matches!(
            writer.put_value("frequency", 50.0),
            Err(CodecError::UnknownField(_))
        ));
        assert!(matches!(
            writer.put_raw(NETWORK_STATE, 2),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        assert!(writer.is_empty());
    }

    #[test]
    fn text_rules() {
        let mut writer = PayloadWriter::new();
        assert!(matches!(
            writer.put_text("serial_number_str", "EDC-0000042"),
            Err(CodecError::InvalidText { width: 8, .. })
        ));
        assert!(matches!(
            writer.put_text("serial_number_str", "€"),
            Err(CodecError::InvalidText { .. })
        ));
        assert!(matches!(
            writer.put_text("battery", "x"),
            Err(CodecError::EncodingMismatch { .. })
        ));
        assert!(matches!(
            writer.put_value("serial_number_str", 1.0),
            Err(CodecError::EncodingMismatch { .. })
        ));
        writer.put_text("serial_number_str", "Señor").unwrap();
        assert_eq!(writer.len(), 9);
    }

    #[test]
    fn battery_level_to_percent() {
        assert_eq!(battery_percent(0), 0);
        assert_eq!(battery_percent(1), 0);
        assert_eq!(battery_percent(127), 50);
        assert_eq!(battery_percent(254), 100);
        assert_eq!(battery_percent(BATTERY_UNKNOWN), BATTERY_UNKNOWN);
    }
}
