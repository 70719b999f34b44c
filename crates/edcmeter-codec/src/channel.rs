//! The fixed channel table.
//!
//! Every uplink field is introduced by a one-byte channel id. The id alone
//! determines how many bytes follow, how they are read and what divisor is
//! applied, so adding a channel is a single new row in [`CHANNELS`].

/// How the bytes following a channel id are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Big-endian unsigned integer.
    Uint,
    /// Single byte collapsed to 0 (zero) or 1 (anything else).
    Flag,
    /// Fixed-width text, one character per byte.
    Ascii,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Uint => "uint",
            Encoding::Flag => "flag",
            Encoding::Ascii => "ascii",
        }
    }
}

/// Static description of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Channel id as it appears on the wire.
    pub id: u8,
    /// Output field name.
    pub field: &'static str,
    /// Number of value bytes following the id.
    pub width: usize,
    /// Decode rule for the value bytes.
    pub encoding: Encoding,
    /// Divisor for the raw integer. `1` means the field stays an integer.
    pub scale: u32,
}

impl ChannelSpec {
    const fn uint(id: u8, field: &'static str, width: usize, scale: u32) -> Self {
        Self {
            id,
            field,
            width,
            encoding: Encoding::Uint,
            scale,
        }
    }

    const fn flag(id: u8, field: &'static str) -> Self {
        Self {
            id,
            field,
            width: 1,
            encoding: Encoding::Flag,
            scale: 1,
        }
    }

    const fn ascii(id: u8, field: &'static str, width: usize) -> Self {
        Self {
            id,
            field,
            width,
            encoding: Encoding::Ascii,
            scale: 1,
        }
    }

    /// Whether decoded values are divided into a decimal.
    pub fn is_scaled(&self) -> bool {
        self.encoding == Encoding::Uint && self.scale > 1
    }

    /// Largest raw integer the channel width can carry.
    pub fn max_raw(&self) -> u64 {
        match self.encoding {
            Encoding::Flag => 1,
            _ if self.width >= 8 => u64::MAX,
            _ => (1u64 << (self.width * 8)) - 1,
        }
    }
}

pub const BATTERY: u8 = 0x02;
pub const READ_ERROR: u8 = 0x03;
pub const NETWORK_STATE: u8 = 0x04;
pub const FIRMWARE: u8 = 0x05;
pub const ACTIVE_ENERGY: u8 = 0x0a;
pub const REACTIVE_ENERGY: u8 = 0x0b;
pub const APPARENT_ENERGY: u8 = 0x0c;
pub const REACTIVE_QA: u8 = 0x0d;
pub const REACTIVE_QB: u8 = 0x0e;
pub const I1: u8 = 0x14;
pub const I2: u8 = 0x15;
pub const I3: u8 = 0x16;
pub const V1: u8 = 0x1e;
pub const V2: u8 = 0x1f;
pub const V3: u8 = 0x20;
pub const PEAK_DEMAND: u8 = 0x28;
pub const LAST_DEMAND: u8 = 0x29;
pub const FPL1: u8 = 0x32;
pub const FPL2: u8 = 0x33;
pub const FPL3: u8 = 0x34;
pub const FPLT: u8 = 0x35;
pub const ACTIVE_CONSUMED: u8 = 0x3c;
pub const ACTIVE_GENERATED: u8 = 0x3d;
pub const REACTIVE_CONSUMED: u8 = 0x3e;
pub const REACTIVE_GENERATED: u8 = 0x3f;
pub const ACTIVE_ENERGY_LAST_PERIOD: u8 = 0x46;
pub const REACTIVE_ENERGY_LAST_PERIOD: u8 = 0x47;
pub const REACTIVE_CONSUMPTION_LAST_PERIOD: u8 = 0x48;
pub const REACTIVE_GENERATED_LAST_PERIOD: u8 = 0x49;
pub const PEAK_DEMAND_LAST_PERIOD: u8 = 0x4a;
pub const ACTIVE_ENERGY_LAST_PERIOD_ALT: u8 = 0x4b;
pub const STATF1: u8 = 0x50;
pub const STATF2: u8 = 0x51;
pub const SERIAL_NUMBER: u8 = 0x5a;
pub const SERIAL_NUMBER_STR: u8 = 0x5b;

/// All supported channels, sorted by id.
pub static CHANNELS: &[ChannelSpec] = &[
    ChannelSpec::uint(BATTERY, "battery", 1, 1),
    ChannelSpec::flag(READ_ERROR, "read_error"),
    ChannelSpec::flag(NETWORK_STATE, "network_state"),
    ChannelSpec::uint(FIRMWARE, "firmware", 1, 1),
    ChannelSpec::uint(ACTIVE_ENERGY, "active_energy", 4, 1),
    ChannelSpec::uint(REACTIVE_ENERGY, "reactive_energy", 4, 1),
    ChannelSpec::uint(APPARENT_ENERGY, "apparent_energy", 4, 1),
    ChannelSpec::uint(REACTIVE_QA, "reactive_qa", 3, 1000),
    ChannelSpec::uint(REACTIVE_QB, "reactive_qb", 3, 1000),
    ChannelSpec::uint(I1, "i1", 3, 10),
    ChannelSpec::uint(I2, "i2", 3, 10),
    ChannelSpec::uint(I3, "i3", 3, 10),
    ChannelSpec::uint(V1, "v1", 2, 10),
    ChannelSpec::uint(V2, "v2", 2, 10),
    ChannelSpec::uint(V3, "v3", 2, 10),
    ChannelSpec::uint(PEAK_DEMAND, "peak_demand", 2, 1),
    ChannelSpec::uint(LAST_DEMAND, "last_demand", 3, 1),
    ChannelSpec::uint(FPL1, "fpl1", 1, 100),
    ChannelSpec::uint(FPL2, "fpl2", 1, 100),
    ChannelSpec::uint(FPL3, "fpl3", 1, 100),
    ChannelSpec::uint(FPLT, "fplt", 1, 100),
    ChannelSpec::uint(ACTIVE_CONSUMED, "active_consumed", 4, 1),
    ChannelSpec::uint(ACTIVE_GENERATED, "active_generated", 4, 1),
    ChannelSpec::uint(REACTIVE_CONSUMED, "reactive_consumed", 4, 1),
    ChannelSpec::uint(REACTIVE_GENERATED, "reactive_generated", 4, 1),
    ChannelSpec::uint(ACTIVE_ENERGY_LAST_PERIOD, "active_energy_last_period", 4, 1),
    ChannelSpec::uint(REACTIVE_ENERGY_LAST_PERIOD, "reactive_energy_last_period", 4, 1),
    ChannelSpec::uint(
        REACTIVE_CONSUMPTION_LAST_PERIOD,
        "reactive_consumption_last_period",
        4,
        1,
    ),
    ChannelSpec::uint(
        REACTIVE_GENERATED_LAST_PERIOD,
        "reactive_generated_last_period",
        4,
        1,
    ),
    ChannelSpec::uint(PEAK_DEMAND_LAST_PERIOD, "peak_demand_last_period", 2, 1),
    ChannelSpec::uint(
        ACTIVE_ENERGY_LAST_PERIOD_ALT,
        "active_energy_last_period_alt",
        2,
        1,
    ),
    ChannelSpec::uint(STATF1, "statf1", 1, 1),
    ChannelSpec::uint(STATF2, "statf2", 1, 1),
    ChannelSpec::uint(SERIAL_NUMBER, "serial_number", 4, 1),
    ChannelSpec::ascii(SERIAL_NUMBER_STR, "serial_number_str", 8),
];

/// Look up a channel by its wire id.
pub fn lookup(id: u8) -> Option<&'static ChannelSpec> {
    CHANNELS
        .binary_search_by_key(&id, |spec| spec.id)
        .ok()
        .map(|idx| &CHANNELS[idx])
}

/// Look up a channel by its output field name.
pub fn by_field(field: &str) -> Option<&'static ChannelSpec> {
    CHANNELS.iter().find(|spec| spec.field == field)
}

/// Returns true if the id is in the channel table.
pub fn is_known(id: u8) -> bool {
    lookup(id).is_some()
}
