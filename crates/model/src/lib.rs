//! Measurement and attachment metadata for the collector upload protocol.
//!
//! All value objects validate their invariants on construction and are
//! immutable afterwards. [`Uploadable::to_wire_map`] flattens them into
//! the exact field names the collector expects.

pub mod constants;
pub mod credentials;
pub mod error;
pub mod metadata;
pub mod uploadable;

// Re-export primary types for convenience.
pub use constants::{CURRENT_TRANSFER_FILE_FORMAT_VERSION, MAX_GENERIC_METADATA_FIELD_LENGTH};
pub use credentials::{Activation, Credentials, Registration};
pub use error::MetaDataError;
pub use metadata::{
    ApplicationMetaData, AttachmentMetaData, DeviceMetaData, GeoLocation, MeasurementMetaData,
};
pub use uploadable::{
    Attachment, AttachmentIdentifier, Measurement, MeasurementIdentifier, Uploadable, WireMap,
};
pub use uuid::Uuid;
