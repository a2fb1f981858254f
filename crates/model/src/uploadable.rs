//! Measurements and attachments ready for transmission.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::constants::{format_decimal, keys};
use crate::metadata::{
    ApplicationMetaData, AttachmentMetaData, DeviceMetaData, GeoLocation, MeasurementMetaData,
};

/// Flat wire metadata, ordered by key so equal inputs always serialize
/// identically.
pub type WireMap = BTreeMap<String, String>;

/// Anything that can be sent to the collector together with a file.
pub trait Uploadable {
    /// The device that captured the data.
    fn device_id(&self) -> Uuid;

    /// The device-local measurement identifier.
    fn measurement_id(&self) -> i64;

    /// Timestamp of the first location, in milliseconds, if any.
    fn timestamp(&self) -> Option<i64>;

    /// Flattens all metadata into the field names of the wire protocol.
    fn to_wire_map(&self) -> WireMap;
}

/// Globally unique identifier of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasurementIdentifier {
    pub device_id: Uuid,
    pub measurement_id: i64,
}

/// Globally unique identifier of an attachment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentIdentifier {
    pub device_id: Uuid,
    pub measurement_id: i64,
    pub attachment_id: i64,
}

/// Metadata blocks common to measurements and attachments.
#[derive(Debug, Clone, PartialEq)]
struct Context {
    device: DeviceMetaData,
    application: ApplicationMetaData,
    measurement: MeasurementMetaData,
    attachments: AttachmentMetaData,
}

impl Context {
    fn write_into(&self, map: &mut WireMap) {
        let mut put = |key: &str, value: String| {
            map.insert(key.to_string(), value);
        };

        put(keys::OS_VERSION, self.device.operating_system_version().into());
        put(keys::DEVICE_TYPE, self.device.device_type().into());

        put(keys::APPLICATION_VERSION, self.application.application_version().into());
        put(keys::FORMAT_VERSION, self.application.format_version().to_string());

        if let Some(start) = self.measurement.start_location() {
            write_location(
                &mut put,
                start,
                [keys::START_LOCATION_LAT, keys::START_LOCATION_LON, keys::START_LOCATION_TS],
            );
        }
        if let Some(end) = self.measurement.end_location() {
            write_location(
                &mut put,
                end,
                [keys::END_LOCATION_LAT, keys::END_LOCATION_LON, keys::END_LOCATION_TS],
            );
        }
        put(keys::LENGTH, format_decimal(self.measurement.length()));
        put(keys::LOCATION_COUNT, self.measurement.location_count().to_string());
        put(keys::MODALITY, self.measurement.modality().into());

        put(keys::LOG_COUNT, self.attachments.log_count().to_string());
        put(keys::IMAGE_COUNT, self.attachments.image_count().to_string());
        put(keys::VIDEO_COUNT, self.attachments.video_count().to_string());
        put(keys::FILES_SIZE, self.attachments.files_size().to_string());
    }

    fn timestamp(&self) -> Option<i64> {
        self.measurement.start_location().map(GeoLocation::timestamp)
    }
}

fn write_location(put: &mut impl FnMut(&str, String), location: &GeoLocation, names: [&str; 3]) {
    let [lat, lon, ts] = names;
    put(lat, format_decimal(location.latitude()));
    put(lon, format_decimal(location.longitude()));
    put(ts, location.timestamp().to_string());
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// A captured measurement and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    identifier: MeasurementIdentifier,
    context: Context,
}

impl Measurement {
    pub fn new(
        identifier: MeasurementIdentifier,
        device: DeviceMetaData,
        application: ApplicationMetaData,
        measurement: MeasurementMetaData,
        attachments: AttachmentMetaData,
    ) -> Self {
        Self {
            identifier,
            context: Context {
                device,
                application,
                measurement,
                attachments,
            },
        }
    }

    pub fn identifier(&self) -> &MeasurementIdentifier {
        &self.identifier
    }

    pub fn device(&self) -> &DeviceMetaData {
        &self.context.device
    }

    pub fn application(&self) -> &ApplicationMetaData {
        &self.context.application
    }

    pub fn measurement(&self) -> &MeasurementMetaData {
        &self.context.measurement
    }

    pub fn attachments(&self) -> &AttachmentMetaData {
        &self.context.attachments
    }
}

impl Uploadable for Measurement {
    fn device_id(&self) -> Uuid {
        self.identifier.device_id
    }

    fn measurement_id(&self) -> i64 {
        self.identifier.measurement_id
    }

    fn timestamp(&self) -> Option<i64> {
        self.context.timestamp()
    }

    fn to_wire_map(&self) -> WireMap {
        let mut map = WireMap::new();
        map.insert(keys::DEVICE_ID.into(), self.identifier.device_id.to_string());
        map.insert(
            keys::MEASUREMENT_ID.into(),
            self.identifier.measurement_id.to_string(),
        );
        self.context.write_into(&mut map);
        map
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// A file attached to a measurement (log, image or video), together with
/// the metadata of the measurement it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    identifier: AttachmentIdentifier,
    context: Context,
}

impl Attachment {
    pub fn new(
        identifier: AttachmentIdentifier,
        device: DeviceMetaData,
        application: ApplicationMetaData,
        measurement: MeasurementMetaData,
        attachments: AttachmentMetaData,
    ) -> Self {
        Self {
            identifier,
            context: Context {
                device,
                application,
                measurement,
                attachments,
            },
        }
    }

    pub fn identifier(&self) -> &AttachmentIdentifier {
        &self.identifier
    }

    pub fn attachment_id(&self) -> i64 {
        self.identifier.attachment_id
    }

    pub fn attachments(&self) -> &AttachmentMetaData {
        &self.context.attachments
    }
}

impl Uploadable for Attachment {
    fn device_id(&self) -> Uuid {
        self.identifier.device_id
    }

    fn measurement_id(&self) -> i64 {
        self.identifier.measurement_id
    }

    fn timestamp(&self) -> Option<i64> {
        self.context.timestamp()
    }

    fn to_wire_map(&self) -> WireMap {
        let mut map = WireMap::new();
        map.insert(keys::DEVICE_ID.into(), self.identifier.device_id.to_string());
        map.insert(
            keys::MEASUREMENT_ID.into(),
            self.identifier.measurement_id.to_string(),
        );
        map.insert(
            keys::ATTACHMENT_ID.into(),
            self.identifier.attachment_id.to_string(),
        );
        self.context.write_into(&mut map);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE: &str = "61e112e1-c6fb-42b6-a840-1b70d30094b8";

    fn reference_measurement() -> Measurement {
        let device_id = Uuid::parse_str(DEVICE).unwrap();
        Measurement::new(
            MeasurementIdentifier {
                device_id,
                measurement_id: 78,
            },
            DeviceMetaData::new("test_osVersion", "test_deviceType").unwrap(),
            ApplicationMetaData::new("test_appVersion", 3).unwrap(),
            MeasurementMetaData::new(
                10.0,
                5,
                Some(GeoLocation::new(1_000_000_000, 51.1, 13.1).unwrap()),
                Some(GeoLocation::new(1_000_010_000, 51.2, 13.2).unwrap()),
                "BICYCLE",
            )
            .unwrap(),
            AttachmentMetaData::default(),
        )
    }

    #[test]
    fn measurement_wire_map_matches_protocol() {
        let map = reference_measurement().to_wire_map();

        let expected: WireMap = [
            ("deviceId", DEVICE),
            ("measurementId", "78"),
            ("osVersion", "test_osVersion"),
            ("deviceType", "test_deviceType"),
            ("appVersion", "test_appVersion"),
            ("formatVersion", "3"),
            ("length", "10.0"),
            ("locationCount", "5"),
            ("modality", "BICYCLE"),
            ("startLocLat", "51.1"),
            ("startLocLon", "13.1"),
            ("startLocTS", "1000000000"),
            ("endLocLat", "51.2"),
            ("endLocLon", "13.2"),
            ("endLocTS", "1000010000"),
            ("logCount", "0"),
            ("imageCount", "0"),
            ("videoCount", "0"),
            ("filesSize", "0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(map, expected);
    }

    #[test]
    fn wire_map_is_deterministic() {
        let a = reference_measurement();
        let b = a.clone();
        assert_eq!(a.to_wire_map(), b.to_wire_map());
        assert_eq!(a.to_wire_map(), a.to_wire_map());
    }

    #[test]
    fn missing_locations_are_omitted() {
        let m = Measurement::new(
            MeasurementIdentifier {
                device_id: Uuid::nil(),
                measurement_id: 1,
            },
            DeviceMetaData::new("iOS 17", "iPhone").unwrap(),
            ApplicationMetaData::new("4.2.0", 3).unwrap(),
            MeasurementMetaData::new(0.0, 0, None, None, "WALKING").unwrap(),
            AttachmentMetaData::default(),
        );
        let map = m.to_wire_map();
        assert!(!map.contains_key(keys::START_LOCATION_LAT));
        assert!(!map.contains_key(keys::END_LOCATION_TS));
        assert_eq!(map[keys::LOCATION_COUNT], "0");
        assert_eq!(m.timestamp(), None);
    }

    #[test]
    fn attachment_wire_map_carries_attachment_id() {
        let device_id = Uuid::parse_str(DEVICE).unwrap();
        let attachment = Attachment::new(
            AttachmentIdentifier {
                device_id,
                measurement_id: 78,
                attachment_id: 3,
            },
            DeviceMetaData::new("Android 14", "Pixel 8").unwrap(),
            ApplicationMetaData::new("3.1.0", 3).unwrap(),
            MeasurementMetaData::new(12.5, 2, None, None, "CAR").unwrap(),
            AttachmentMetaData::new(1, 2, 0, 5120).unwrap(),
        );
        let map = attachment.to_wire_map();
        assert_eq!(map[keys::ATTACHMENT_ID], "3");
        assert_eq!(map[keys::MEASUREMENT_ID], "78");
        assert_eq!(map[keys::IMAGE_COUNT], "2");
        assert_eq!(map[keys::FILES_SIZE], "5120");
        assert_eq!(map[keys::LENGTH], "12.5");
        assert_eq!(attachment.device_id(), device_id);
    }

    #[test]
    fn timestamp_is_start_location() {
        assert_eq!(reference_measurement().timestamp(), Some(1_000_000_000));
    }
}
