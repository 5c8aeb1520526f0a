//! Account-driven enrollment structures.

use serde::{Deserialize, Serialize};

/// Request body for assigning the account-driven enrollment service
/// discovery URL.
///
/// See <https://developer.apple.com/documentation/devicemanagement/assign-an-account-driven-enrollment-profile>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountDrivenEnrollmentProfileRequest {
    pub mdm_service_discovery_url: String,
}

/// Response of the account-driven enrollment profile endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountDrivenEnrollmentProfileResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdm_service_discovery_url: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
