/// Errors that can occur while decoding uplinks or encoding downlinks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// A channel id was followed by fewer bytes than its declared width.
    #[error("truncated value on channel 0x{channel:02x} (need {needed} bytes, {available} available)")]
    Truncated {
        channel: u8,
        needed: usize,
        available: usize,
    },

    /// The downlink command name is not one the meter understands.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The byte sequence does not match any downlink opcode.
    #[error("unrecognized downlink opcode: {0:02x?}")]
    UnknownOpcode(Vec<u8>),

    /// The channel id is not in the channel table.
    #[error("unknown channel 0x{0:02x}")]
    UnknownChannel(u8),

    /// No channel carries the given field name.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The value does not fit the channel width once scaled.
    #[error("value {value} out of range for {field} ({width} bytes)")]
    ValueOutOfRange {
        field: &'static str,
        value: f64,
        width: usize,
    },

    /// The channel carries a different encoding than the one requested.
    #[error("{field} does not carry {expected} values")]
    EncodingMismatch {
        field: &'static str,
        expected: &'static str,
    },

    /// Text does not fit the fixed-width text channel.
    #[error("text for {field} must be at most {width} latin-1 characters")]
    InvalidText { field: &'static str, width: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
