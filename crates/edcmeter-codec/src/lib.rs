//! Uplink decoder and downlink encoder for the EDC LoRaWAN energy meter.
//!
//! Uplinks are a flat run of channel records:
//! - A 1-byte channel id
//! - A value whose width, encoding and scale are fixed by the id
//!
//! There is no length byte; the [`channel`] table is the only source of
//! framing, and an unknown id ends the payload.

pub mod channel;
pub mod codec;
pub mod downlink;
pub mod error;
pub mod frame;
pub mod uplink;
pub mod writer;

pub use channel::{ChannelSpec, Encoding, CHANNELS};
pub use codec::{decode, decode_with_config, DecodeConfig, Truncation};
pub use downlink::{
    encode_downlink, handle_downlink, Command, Downlink, DownlinkInput, DownlinkRequest,
    DownlinkResponse, CONFIG_PORT,
};
pub use error::{CodecError, Result};
pub use frame::{DecodedFrame, Value};
pub use uplink::{
    decode_uplink, decode_uplink_with_config, handle_uplink, Uplink, UplinkInput, UplinkResponse,
    RANGE_TEST_PORT,
};
pub use writer::{battery_percent, PayloadWriter};
