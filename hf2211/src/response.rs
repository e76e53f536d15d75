//! Results tagged with the device that produced them

use serde::Serialize;

use hf2211_core::{TransactionResult, response::Failure};
use hf2211_types::DeviceDescriptor;

/// Outcome of a command sent through [`Scale`](crate::Scale)
///
/// Serializes as the result's own fields plus `deviceId` and `deviceName`.
/// Lookup failures happen before a device is chosen and carry neither.
///
/// ```json
/// {"type": "status", "code": 0, "description": "No error", "lrc": "30",
///  "lrcValid": true, "deviceId": "scale1", "deviceName": "HF2211 Scale"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleResponse {
    #[serde(flatten)]
    pub result: TransactionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

impl ScaleResponse {
    /// Tag `result` with `device`
    pub fn new(device: &DeviceDescriptor, result: TransactionResult) -> Self {
        Self {
            result,
            device_id: Some(device.id.clone()),
            device_name: Some(device.name.clone()),
        }
    }

    /// Result that never reached a device
    pub fn untagged(result: TransactionResult) -> Self {
        Self {
            result,
            device_id: None,
            device_name: None,
        }
    }

    /// Borrow the result
    pub fn result(&self) -> &TransactionResult {
        &self.result
    }

    /// Drop the device tag
    pub fn into_result(self) -> TransactionResult {
        self.result
    }

    pub fn is_error(&self) -> bool {
        self.result.is_error()
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        self.result.as_failure()
    }

    pub fn type_name(&self) -> &'static str {
        self.result.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf2211_core::FailureKind;
    use hf2211_core::response::StatusReading;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tagged_json() {
        let device = DeviceDescriptor::new("scale1", "192.168.1.11", 9999).with_name("HF2211 Scale");
        let result = TransactionResult::Status(StatusReading {
            code: 0,
            description: "No error",
            lrc: "30".into(),
            lrc_valid: true,
        });

        let value = serde_json::to_value(ScaleResponse::new(&device, result)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "status",
                "code": 0,
                "description": "No error",
                "lrc": "30",
                "lrcValid": true,
                "deviceId": "scale1",
                "deviceName": "HF2211 Scale",
            })
        );
    }

    #[test]
    fn test_error_json_keeps_failure_fields() {
        let device = DeviceDescriptor::new("bench", "127.0.0.1", 9999).with_name("Bench");
        let result = TransactionResult::failure(FailureKind::Timeout, "No response from scale, raw: none");

        let value = serde_json::to_value(ScaleResponse::new(&device, result)).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["error"], "No response from scale, raw: none");
        assert_eq!(value["deviceId"], "bench");
        assert_eq!(value["deviceName"], "Bench");
    }

    #[test]
    fn test_untagged_json_has_no_device() {
        let response = ScaleResponse::untagged(TransactionResult::failure(
            FailureKind::DeviceNotFound,
            "Device not found",
        ));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"type": "error", "kind": "deviceNotFound", "error": "Device not found"}));
        assert_eq!(response.type_name(), "error");
    }
}
