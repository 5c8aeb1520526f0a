//! DEP (ADE) profile structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An automated-enrollment profile definition.
///
/// The portal adds attributes over time; unmodeled ones ride along in
/// `extra`.
///
/// See <https://developer.apple.com/documentation/devicemanagement/profile>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_uuid: Option<String>,
    #[serde(default)]
    pub profile_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_pairing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_supervised: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multi_user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mandatory: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub await_device_configured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mdm_removable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_magic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchor_certs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supervising_host_certs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_setup_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request body for assigning a profile UUID to serial numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileServiceRequest {
    pub profile_uuid: String,
    pub devices: Vec<String>,
}

/// Response of the profile assignment endpoint: a per-serial result map
/// (`SUCCESS`, `NOT_ACCESSIBLE`, `FAILED`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignProfileResponse {
    #[serde(default)]
    pub profile_uuid: String,
    #[serde(default)]
    pub devices: HashMap<String, String>,
}

/// Request body for clearing profiles from serial numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearProfileRequest {
    pub devices: Vec<String>,
}

/// Response of the profile removal endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearProfileResponse {
    #[serde(default)]
    pub devices: HashMap<String, String>,
}

/// Response of the profile definition endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefineProfileResponse {
    #[serde(default)]
    pub profile_uuid: String,
    #[serde(default)]
    pub devices: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_response_result_map() {
        let json = r#"{
            "profile_uuid": "88fc4e378fea4021a94b2d7268fbf767",
            "devices": {
                "C8TJ500QF1MN": "SUCCESS",
                "B7CJ7000Q1GH": "NOT_ACCESSIBLE"
            }
        }"#;
        let resp: AssignProfileResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.devices.len(), 2);
        assert_eq!(resp.devices["C8TJ500QF1MN"], "SUCCESS");
    }
}
