//! Validated metadata value objects.
//!
//! Each type checks its invariants in its constructor and exposes its
//! fields read-only afterwards.

use crate::constants::{CURRENT_TRANSFER_FILE_FORMAT_VERSION, MAX_GENERIC_METADATA_FIELD_LENGTH};
use crate::error::MetaDataError;

/// Checks a free-text field: non-empty and at most 30 characters.
fn generic_field(field: &'static str, value: String) -> Result<String, MetaDataError> {
    let length = value.chars().count();
    if length == 0 || length > MAX_GENERIC_METADATA_FIELD_LENGTH {
        return Err(MetaDataError::InvalidLength { field, length });
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// The device that captured a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMetaData {
    operating_system_version: String,
    device_type: String,
}

impl DeviceMetaData {
    pub fn new(
        operating_system_version: impl Into<String>,
        device_type: impl Into<String>,
    ) -> Result<Self, MetaDataError> {
        Ok(Self {
            operating_system_version: generic_field("osVersion", operating_system_version.into())?,
            device_type: generic_field("deviceType", device_type.into())?,
        })
    }

    pub fn operating_system_version(&self) -> &str {
        &self.operating_system_version
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// The application that captured a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationMetaData {
    application_version: String,
    format_version: i32,
}

impl ApplicationMetaData {
    /// Fails with [`MetaDataError::DeprecatedFormatVersion`] for older and
    /// [`MetaDataError::UnknownFormatVersion`] for newer format versions.
    pub fn new(
        application_version: impl Into<String>,
        format_version: i32,
    ) -> Result<Self, MetaDataError> {
        let application_version = generic_field("appVersion", application_version.into())?;
        if format_version < CURRENT_TRANSFER_FILE_FORMAT_VERSION {
            return Err(MetaDataError::DeprecatedFormatVersion(format_version));
        }
        if format_version != CURRENT_TRANSFER_FILE_FORMAT_VERSION {
            return Err(MetaDataError::UnknownFormatVersion(format_version));
        }
        Ok(Self {
            application_version,
            format_version,
        })
    }

    pub fn application_version(&self) -> &str {
        &self.application_version
    }

    pub fn format_version(&self) -> i32 {
        self.format_version
    }
}

// ---------------------------------------------------------------------------
// Geo location
// ---------------------------------------------------------------------------

/// A single geographical fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    timestamp: i64,
    latitude: f64,
    longitude: f64,
}

impl GeoLocation {
    /// `timestamp` is in milliseconds since the Unix epoch.
    pub fn new(timestamp: i64, latitude: f64, longitude: f64) -> Result<Self, MetaDataError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MetaDataError::InvalidValue {
                field: "latitude",
                value: latitude.to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MetaDataError::InvalidValue {
                field: "longitude",
                value: longitude.to_string(),
            });
        }
        Ok(Self {
            timestamp,
            latitude,
            longitude,
        })
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// Summary of the track captured by a measurement.
///
/// A measurement without locations is legitimate: the server decides
/// whether it wants such data, not the client.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementMetaData {
    length: f64,
    location_count: i64,
    start_location: Option<GeoLocation>,
    end_location: Option<GeoLocation>,
    modality: String,
}

impl MeasurementMetaData {
    /// `length` is the track length in meters.
    pub fn new(
        length: f64,
        location_count: i64,
        start_location: Option<GeoLocation>,
        end_location: Option<GeoLocation>,
        modality: impl Into<String>,
    ) -> Result<Self, MetaDataError> {
        if location_count < 0 {
            return Err(MetaDataError::InvalidValue {
                field: "locationCount",
                value: location_count.to_string(),
            });
        }
        // Also rejects NaN.
        if !(length >= 0.0 && length.is_finite()) {
            return Err(MetaDataError::InvalidValue {
                field: "length",
                value: length.to_string(),
            });
        }
        Ok(Self {
            length,
            location_count,
            start_location,
            end_location,
            modality: generic_field("modality", modality.into())?,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn location_count(&self) -> i64 {
        self.location_count
    }

    pub fn start_location(&self) -> Option<&GeoLocation> {
        self.start_location.as_ref()
    }

    pub fn end_location(&self) -> Option<&GeoLocation> {
        self.end_location.as_ref()
    }

    pub fn modality(&self) -> &str {
        &self.modality
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Counters describing the files attached to a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachmentMetaData {
    log_count: i32,
    image_count: i32,
    video_count: i32,
    files_size: i64,
}

impl AttachmentMetaData {
    /// `files_size` is the total number of bytes of all attachment files.
    pub fn new(
        log_count: i32,
        image_count: i32,
        video_count: i32,
        files_size: i64,
    ) -> Result<Self, MetaDataError> {
        for (field, value) in [
            ("logCount", log_count),
            ("imageCount", image_count),
            ("videoCount", video_count),
        ] {
            if value < 0 {
                return Err(MetaDataError::InvalidValue {
                    field,
                    value: value.to_string(),
                });
            }
        }
        if files_size < 0 {
            return Err(MetaDataError::InvalidValue {
                field: "filesSize",
                value: files_size.to_string(),
            });
        }
        let attachment_count = i64::from(log_count) + i64::from(image_count) + i64::from(video_count);
        if attachment_count > 0 && files_size == 0 {
            return Err(MetaDataError::InvalidValue {
                field: "filesSize",
                value: "0 with attachments present".into(),
            });
        }
        Ok(Self {
            log_count,
            image_count,
            video_count,
            files_size,
        })
    }

    /// Builds attachment metadata from optional counters.
    ///
    /// Requests without any attachment counters are still supported and
    /// mean "no attachments". Once one counter is present, all four are
    /// required.
    pub fn from_optional(
        log_count: Option<i32>,
        image_count: Option<i32>,
        video_count: Option<i32>,
        files_size: Option<i64>,
    ) -> Result<Self, MetaDataError> {
        match (log_count, image_count, video_count, files_size) {
            (None, None, None, None) => Ok(Self::default()),
            (Some(log), Some(image), Some(video), Some(size)) => {
                Self::new(log, image, video, size)
            }
            (None, ..) => Err(MetaDataError::Incomplete("logCount")),
            (_, None, ..) => Err(MetaDataError::Incomplete("imageCount")),
            (_, _, None, _) => Err(MetaDataError::Incomplete("videoCount")),
            (.., None) => Err(MetaDataError::Incomplete("filesSize")),
        }
    }

    /// Like [`from_optional`](Self::from_optional), parsing the raw header
    /// values first.
    pub fn from_wire_fields(
        log_count: Option<&str>,
        image_count: Option<&str>,
        video_count: Option<&str>,
        files_size: Option<&str>,
    ) -> Result<Self, MetaDataError> {
        Self::from_optional(
            parse_field("logCount", log_count)?,
            parse_field("imageCount", image_count)?,
            parse_field("videoCount", video_count)?,
            parse_field("filesSize", files_size)?,
        )
    }

    pub fn log_count(&self) -> i32 {
        self.log_count
    }

    pub fn image_count(&self) -> i32 {
        self.image_count
    }

    pub fn video_count(&self) -> i32 {
        self.video_count
    }

    pub fn files_size(&self) -> i64 {
        self.files_size
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, MetaDataError> {
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| MetaDataError::Unparsable {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_rejects_empty_and_long_fields() {
        assert!(DeviceMetaData::new("", "Pixel").is_err());
        let long = "x".repeat(31);
        assert_eq!(
            DeviceMetaData::new("Android 14", long).unwrap_err(),
            MetaDataError::InvalidLength {
                field: "deviceType",
                length: 31
            }
        );
        assert!(DeviceMetaData::new("Android 14", "x".repeat(30)).is_ok());
    }

    #[test]
    fn field_length_counts_characters() {
        // 30 multi-byte characters are still within the limit.
        assert!(DeviceMetaData::new("ä".repeat(30), "Pixel").is_ok());
    }

    #[test]
    fn older_format_version_is_deprecated() {
        let err = ApplicationMetaData::new("1.0.0", 2).unwrap_err();
        assert_eq!(err, MetaDataError::DeprecatedFormatVersion(2));
        assert!(err.is_deprecated());
    }

    #[test]
    fn newer_format_version_is_unknown() {
        let err = ApplicationMetaData::new("1.0.0", 4).unwrap_err();
        assert_eq!(err, MetaDataError::UnknownFormatVersion(4));
        assert!(!err.is_deprecated());
    }

    #[test]
    fn current_format_version_is_accepted() {
        let app = ApplicationMetaData::new("1.0.0", CURRENT_TRANSFER_FILE_FORMAT_VERSION).unwrap();
        assert_eq!(app.format_version(), 3);
    }

    #[test]
    fn geo_location_bounds() {
        assert!(GeoLocation::new(0, 90.0, 180.0).is_ok());
        assert!(GeoLocation::new(0, -90.0, -180.0).is_ok());
        assert!(GeoLocation::new(0, 90.1, 0.0).is_err());
        assert!(GeoLocation::new(0, 0.0, -180.5).is_err());
        assert!(GeoLocation::new(0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn measurement_without_locations_is_valid() {
        let meta = MeasurementMetaData::new(0.0, 0, None, None, "BICYCLE").unwrap();
        assert_eq!(meta.location_count(), 0);
        assert!(meta.start_location().is_none());
    }

    #[test]
    fn measurement_rejects_negative_values() {
        assert!(MeasurementMetaData::new(-0.1, 0, None, None, "WALKING").is_err());
        assert!(MeasurementMetaData::new(1.0, -1, None, None, "WALKING").is_err());
        assert!(MeasurementMetaData::new(f64::NAN, 0, None, None, "WALKING").is_err());
        assert!(MeasurementMetaData::new(1.0, 1, None, None, "").is_err());
    }

    #[test]
    fn attachments_absent_default_to_zero() {
        let meta = AttachmentMetaData::from_optional(None, None, None, None).unwrap();
        assert_eq!(meta, AttachmentMetaData::default());
        assert_eq!(meta.files_size(), 0);
    }

    #[test]
    fn attachments_partial_counters_fail() {
        assert_eq!(
            AttachmentMetaData::from_optional(Some(1), None, None, None).unwrap_err(),
            MetaDataError::Incomplete("imageCount")
        );
        assert_eq!(
            AttachmentMetaData::from_optional(None, Some(0), Some(0), Some(0)).unwrap_err(),
            MetaDataError::Incomplete("logCount")
        );
        assert_eq!(
            AttachmentMetaData::from_optional(Some(0), Some(0), Some(0), None).unwrap_err(),
            MetaDataError::Incomplete("filesSize")
        );
    }

    #[test]
    fn attachments_negative_counter_fails() {
        assert!(AttachmentMetaData::from_optional(Some(-1), Some(0), Some(0), Some(0)).is_err());
        assert!(AttachmentMetaData::new(0, 0, -3, 10).is_err());
        assert!(AttachmentMetaData::new(0, 0, 0, -1).is_err());
    }

    #[test]
    fn attachments_require_size_when_counted() {
        assert!(AttachmentMetaData::new(1, 0, 0, 0).is_err());
        assert!(AttachmentMetaData::new(1, 2, 0, 2048).is_ok());
    }

    #[test]
    fn attachments_from_wire_fields() {
        let meta =
            AttachmentMetaData::from_wire_fields(Some("2"), Some("1"), Some("0"), Some("4096"))
                .unwrap();
        assert_eq!(meta.log_count(), 2);
        assert_eq!(meta.image_count(), 1);
        assert_eq!(meta.files_size(), 4096);

        let err = AttachmentMetaData::from_wire_fields(Some("two"), Some("1"), Some("0"), Some("1"))
            .unwrap_err();
        assert!(matches!(err, MetaDataError::Unparsable { field: "logCount", .. }));
    }
}
