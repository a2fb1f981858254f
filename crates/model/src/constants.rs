//! Wire-level constants shared by the model and the upload client.

/// Maximum length of a free-text metadata field.
///
/// Leaves room for future values while keeping arbitrary long data out of
/// the request headers.
pub const MAX_GENERIC_METADATA_FIELD_LENGTH: usize = 30;

/// The transfer file format version this client produces.
///
/// Stored in the first two bytes of every transfer file so the server can
/// process data from different client generations.
pub const CURRENT_TRANSFER_FILE_FORMAT_VERSION: i32 = 3;

/// Metadata field names as expected by the collector API.
///
/// These names are used verbatim as request headers and as keys of the
/// pre-request JSON body. Changing any of them breaks server compatibility.
pub mod keys {
    pub const DEVICE_ID: &str = "deviceId";
    pub const MEASUREMENT_ID: &str = "measurementId";
    pub const ATTACHMENT_ID: &str = "attachmentId";
    pub const OS_VERSION: &str = "osVersion";
    pub const DEVICE_TYPE: &str = "deviceType";
    pub const APPLICATION_VERSION: &str = "appVersion";
    pub const FORMAT_VERSION: &str = "formatVersion";
    pub const START_LOCATION_LAT: &str = "startLocLat";
    pub const START_LOCATION_LON: &str = "startLocLon";
    pub const START_LOCATION_TS: &str = "startLocTS";
    pub const END_LOCATION_LAT: &str = "endLocLat";
    pub const END_LOCATION_LON: &str = "endLocLon";
    pub const END_LOCATION_TS: &str = "endLocTS";
    pub const LENGTH: &str = "length";
    pub const LOCATION_COUNT: &str = "locationCount";
    pub const MODALITY: &str = "modality";
    pub const LOG_COUNT: &str = "logCount";
    pub const IMAGE_COUNT: &str = "imageCount";
    pub const VIDEO_COUNT: &str = "videoCount";
    pub const FILES_SIZE: &str = "filesSize";
}

/// Formats a floating point value the way the collector parses it.
///
/// Always keeps a fractional part (`10.0`, not `10`) and uses the shortest
/// representation that round-trips. Magnitudes below `1e-4` or from `1e16`
/// up switch to exponent form without a fraction (`1e-7`, `1e16`), which
/// the collector's decimal parser accepts like `1.0E-7`.
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_keep_fraction() {
        assert_eq!(format_decimal(10.0), "10.0");
        assert_eq!(format_decimal(0.0), "0.0");
    }

    #[test]
    fn coordinates_are_shortest_form() {
        assert_eq!(format_decimal(51.1), "51.1");
        assert_eq!(format_decimal(-13.25), "-13.25");
    }

    #[test]
    fn extreme_magnitudes_use_exponent() {
        assert_eq!(format_decimal(0.0001), "0.0001");
        assert_eq!(format_decimal(1e-7), "1e-7");
        assert_eq!(format_decimal(1e16), "1e16");
        assert_eq!("1e-7".parse::<f64>().unwrap(), 1e-7);
    }

    #[test]
    fn key_names_are_stable() {
        assert_eq!(keys::START_LOCATION_TS, "startLocTS");
        assert_eq!(keys::APPLICATION_VERSION, "appVersion");
        assert_eq!(keys::OS_VERSION, "osVersion");
    }
}
