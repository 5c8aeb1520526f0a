//! Per-name DEP client configuration.

use serde::{Deserialize, Serialize};

/// Apple's production DEP endpoint.
pub const DEFAULT_BASE_URL: &str = "https://mdmenrollment.apple.com";

/// Client configuration for one DEP name.
///
/// Selects which DEP host the name talks to. An empty base URL means the
/// Apple production default; overriding it is mostly useful against a DEP
/// simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepConfig {
    #[serde(default)]
    pub base_url: String,
}

impl DepConfig {
    /// The effective base URL: the configured one, or the Apple default.
    pub fn base_url_or_default(config: Option<&DepConfig>) -> &str {
        match config {
            Some(c) if !c.base_url.is_empty() => &c.base_url,
            _ => DEFAULT_BASE_URL,
        }
    }
}
