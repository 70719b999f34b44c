//! JSON Schema validation of edcmeter uplink and downlink envelopes.
//!
//! Network servers hand payload formatters loosely typed JSON. Validating it
//! against a schema first turns a malformed envelope into a readable error
//! instead of a deserialization failure deep inside the codec.

pub mod boundary;
pub mod config;
pub mod error;
pub mod registry;
pub mod validator;

pub use boundary::Boundary;
pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
