//! OS beta enrollment token structures.

use serde::{Deserialize, Serialize};

/// One beta program enrollment token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedBuildToken {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

/// Response of the beta enrollment tokens endpoint.
///
/// See <https://developer.apple.com/documentation/devicemanagement/get_beta_enrollment_tokens>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetSeedBuildTokenResponse {
    #[serde(default, rename = "betaEnrollmentTokens")]
    pub beta_enrollment_tokens: Vec<SeedBuildToken>,
}
