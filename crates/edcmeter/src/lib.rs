//! Payload decoder and downlink encoder for the EDC LoRaWAN energy meter.
//!
//! # Crate Structure
//!
//! - [`codec`] — Channel table, uplink decoder, downlink encoder, payload writer
//! - [`schema`] — JSON Schema validation of network-server envelopes (behind `schema` feature)
//!
//! ```
//! use edcmeter::codec::{decode_uplink, Uplink, Value};
//!
//! let uplink = decode_uplink(&[0x02, 0x64, 0x1e, 0x00, 0xe6], 1).unwrap();
//! let Uplink::Measurements(frame) = uplink else { unreachable!() };
//! assert_eq!(frame.get("battery"), Some(&Value::Integer(100)));
//! assert_eq!(frame.get("v1"), Some(&Value::Decimal(23.0)));
//! ```

/// Re-export codec types.
pub mod codec {
    pub use edcmeter_codec::*;
}

/// Re-export schema types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use edcmeter_schema::*;
}
