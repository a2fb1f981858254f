//! JSON description of what to upload.
//!
//! ```json
//! {
//!   "deviceId": "61e112e1-c6fb-42b6-a840-1b70d30094b8",
//!   "measurementId": 78,
//!   "osVersion": "Android 14",
//!   "deviceType": "Pixel 8",
//!   "appVersion": "4.2.0",
//!   "formatVersion": 3,
//!   "length": 1532.4,
//!   "locationCount": 812,
//!   "startLocation": { "timestamp": 1700000000000, "latitude": 51.05, "longitude": 13.73 },
//!   "modality": "BICYCLE"
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use uploader_model::{
    ApplicationMetaData, Attachment, AttachmentIdentifier, AttachmentMetaData, DeviceMetaData,
    GeoLocation, Measurement, MeasurementIdentifier, MeasurementMetaData, Uuid,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFile {
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFile {
    pub device_id: Uuid,
    pub measurement_id: i64,
    #[serde(default)]
    pub attachment_id: Option<i64>,
    pub os_version: String,
    pub device_type: String,
    pub app_version: String,
    pub format_version: i32,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub location_count: i64,
    #[serde(default)]
    pub start_location: Option<LocationFile>,
    #[serde(default)]
    pub end_location: Option<LocationFile>,
    pub modality: String,
    #[serde(default)]
    pub log_count: Option<i32>,
    #[serde(default)]
    pub image_count: Option<i32>,
    #[serde(default)]
    pub video_count: Option<i32>,
    #[serde(default)]
    pub files_size: Option<i64>,
}

type Parts = (
    DeviceMetaData,
    ApplicationMetaData,
    MeasurementMetaData,
    AttachmentMetaData,
);

impl UploadFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading metadata {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing metadata {}", path.display()))
    }

    fn parts(&self) -> anyhow::Result<Parts> {
        let location = |l: &Option<LocationFile>| {
            l.as_ref()
                .map(|l| GeoLocation::new(l.timestamp, l.latitude, l.longitude))
                .transpose()
        };
        Ok((
            DeviceMetaData::new(&self.os_version, &self.device_type)?,
            ApplicationMetaData::new(&self.app_version, self.format_version)?,
            MeasurementMetaData::new(
                self.length,
                self.location_count,
                location(&self.start_location)?,
                location(&self.end_location)?,
                &self.modality,
            )?,
            AttachmentMetaData::from_optional(
                self.log_count,
                self.image_count,
                self.video_count,
                self.files_size,
            )?,
        ))
    }

    pub fn measurement(&self) -> anyhow::Result<Measurement> {
        let (device, application, measurement, attachments) = self.parts()?;
        Ok(Measurement::new(
            MeasurementIdentifier {
                device_id: self.device_id,
                measurement_id: self.measurement_id,
            },
            device,
            application,
            measurement,
            attachments,
        ))
    }

    pub fn attachment(&self) -> anyhow::Result<Attachment> {
        let attachment_id = self
            .attachment_id
            .context("attachmentId is required for attachment uploads")?;
        let (device, application, measurement, attachments) = self.parts()?;
        Ok(Attachment::new(
            AttachmentIdentifier {
                device_id: self.device_id,
                measurement_id: self.measurement_id,
                attachment_id,
            },
            device,
            application,
            measurement,
            attachments,
        ))
    }
}
