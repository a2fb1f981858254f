fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use uploader_client::ClientConfig;
    use uploader_model::{
        Activation, ApplicationMetaData, Attachment, AttachmentIdentifier, AttachmentMetaData,
        Credentials, DeviceMetaData, GeoLocation, Measurement, MeasurementIdentifier,
        MeasurementMetaData, Registration, Uploadable, Uuid, WireMap,
    };

    const DEVICE: &str = "61e112e1-c6fb-42b6-a840-1b70d30094b8";

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    fn parse_fixture<T: serde::de::DeserializeOwned>(name: &str) -> T {
        serde_json::from_value(load_fixture(name))
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"))
    }

    /// Deserializes a fixture and checks it serializes back unchanged.
    fn roundtrip_fixture<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let parsed: T = parse_fixture(name);
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(load_fixture(name), reserialized, "round-trip mismatch for {name}");
        parsed
    }

    /// Compares a wire map with a fixture object, key order ignored.
    fn assert_wire_map(name: &str, map: &WireMap) {
        let fixture: WireMap = parse_fixture(name);
        assert_eq!(
            &fixture, map,
            "wire map mismatch for {name}:\n  expected: {fixture:?}\n  actual:   {map:?}"
        );
    }

    fn device() -> DeviceMetaData {
        DeviceMetaData::new("test_osVersion", "test_deviceType").unwrap()
    }

    fn application() -> ApplicationMetaData {
        ApplicationMetaData::new("test_appVersion", 3).unwrap()
    }

    #[test]
    fn fixture_measurement_wire_map() {
        let measurement = Measurement::new(
            MeasurementIdentifier {
                device_id: Uuid::parse_str(DEVICE).unwrap(),
                measurement_id: 78,
            },
            device(),
            application(),
            MeasurementMetaData::new(
                0.0,
                0,
                Some(GeoLocation::new(10_000, 10.0, 10.0).unwrap()),
                Some(GeoLocation::new(12_000, 12.0, 12.0).unwrap()),
                "BICYCLE",
            )
            .unwrap(),
            AttachmentMetaData::default(),
        );
        assert_wire_map("measurement_wire_map.json", &measurement.to_wire_map());
    }

    #[test]
    fn fixture_attachment_wire_map() {
        let attachment = Attachment::new(
            AttachmentIdentifier {
                device_id: Uuid::parse_str(DEVICE).unwrap(),
                measurement_id: 78,
                attachment_id: 3,
            },
            device(),
            application(),
            MeasurementMetaData::new(0.0, 0, None, None, "BICYCLE").unwrap(),
            AttachmentMetaData::new(1, 2, 0, 4096).unwrap(),
        );
        assert_wire_map("attachment_wire_map.json", &attachment.to_wire_map());
    }

    #[test]
    fn fixture_login_payload() {
        let json = Credentials::new("test@example.com", "secret")
            .to_json()
            .unwrap();
        let actual: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(load_fixture("login_payload.json"), actual);
    }

    #[test]
    fn fixture_registration_payload() {
        let json = Registration::new(
            "test@example.com",
            "secret",
            "captcha-token",
            Activation::AppAndroid,
        )
        .with_group("guest")
        .to_json()
        .unwrap();
        let actual: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(load_fixture("registration_payload.json"), actual);
    }

    #[test]
    fn fixture_client_config_roundtrip() {
        let config: ClientConfig = roundtrip_fixture("client_config.json");
        assert!(config.compress_credentials);
        assert_eq!(config.connect_timeout_secs, 15);
    }
}
