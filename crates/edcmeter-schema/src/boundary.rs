use std::fmt;

/// The two JSON envelopes a payload formatter receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Boundary {
    /// `{"bytes": [...], "fPort": n}`
    Uplink,
    /// `{"data": {"command": "...", "interval_seconds": n}}`
    Downlink,
}

impl Boundary {
    pub const ALL: [Boundary; 2] = [Boundary::Uplink, Boundary::Downlink];

    pub fn as_str(self) -> &'static str {
        match self {
            Boundary::Uplink => "uplink",
            Boundary::Downlink => "downlink",
        }
    }

    /// File name used when loading an override from a schema directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Boundary::Uplink => "uplink.schema.json",
            Boundary::Downlink => "downlink.schema.json",
        }
    }

    /// Schema shipped with the crate.
    pub fn embedded_schema(self) -> &'static str {
        match self {
            Boundary::Uplink => UPLINK_SCHEMA,
            Boundary::Downlink => DOWNLINK_SCHEMA,
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const UPLINK_SCHEMA: &str = r#"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "edcmeter uplink input",
    "type": "object",
    "properties": {
        "bytes": {
            "type": "array",
            "items": { "type": "integer", "minimum": 0, "maximum": 255 },
            "maxItems": 242
        },
        "fPort": { "type": "integer", "minimum": 0, "maximum": 255 }
    },
    "required": ["bytes", "fPort"]
}"#;

pub const DOWNLINK_SCHEMA: &str = r#"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "edcmeter downlink input",
    "type": "object",
    "properties": {
        "data": {
            "type": "object",
            "properties": {
                "command": { "type": "string" },
                "interval_seconds": { "type": ["integer", "null"], "minimum": 0 }
            },
            "required": ["command"]
        }
    },
    "required": ["data"]
}"#;
