//! Device listing and sync structures.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One device record as returned by the fetch, sync, and details endpoints.
///
/// See <https://developer.apple.com/documentation/devicemanagement/device>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(default)]
    pub profile_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_assign_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_push_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_assigned_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_assigned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_family: Option<String>,

    /// Only populated by the sync endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_type: Option<String>,
    /// Only populated by the sync endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_date: Option<DateTime<Utc>>,

    /// Only populated by the details endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

/// Request body for the fetch and sync endpoints.
///
/// The initial fetch omits the cursor; subsequent calls carry the cursor of
/// the previous response. Per Apple the limit defaults to 100 with a
/// maximum of 1000.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Response of the fetch and sync endpoints.
///
/// See <https://developer.apple.com/documentation/devicemanagement/fetchdeviceresponse>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceResponse {
    #[serde(default)]
    pub cursor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub more_to_follow: bool,
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Request body carrying a plain list of serial numbers.
///
/// See <https://developer.apple.com/documentation/devicemanagement/devicelistrequest>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceListRequest {
    pub devices: Vec<String>,
}

/// Response of the device details endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub devices: HashMap<String, Device>,
}

/// Response of endpoints returning a per-serial status string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceStatusResponse {
    #[serde(default)]
    pub devices: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_response_with_op_types() {
        let json = r#"{
            "cursor": "MTY1ODE0NDQ5",
            "more_to_follow": false,
            "devices": [
                {"serial_number": "C8TJ500QF1MN", "model": "MacBook Pro",
                 "description": "", "color": "SPACE GRAY",
                 "profile_status": "empty", "op_type": "added",
                 "op_date": "2022-07-18T12:00:00Z"},
                {"serial_number": "B7CJ7000Q1GH", "model": "iPad",
                 "description": "", "color": "white",
                 "profile_status": "assigned", "op_type": "modified"}
            ]
        }"#;
        let resp: DeviceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.devices.len(), 2);
        assert_eq!(resp.devices[0].op_type.as_deref(), Some("added"));
        assert!(resp.devices[0].op_date.is_some());
        assert!(!resp.more_to_follow);
    }

    #[test]
    fn fetch_request_omits_empty_fields() {
        let body = serde_json::to_string(&DeviceRequest::default()).unwrap();
        assert_eq!(body, "{}");

        let body = serde_json::to_string(&DeviceRequest {
            cursor: Some("abc".into()),
            limit: Some(500),
        })
        .unwrap();
        assert_eq!(body, r#"{"cursor":"abc","limit":500}"#);
    }
}
