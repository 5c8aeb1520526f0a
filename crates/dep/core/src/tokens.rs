//! DEP OAuth1 token sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The OAuth1 credential set Apple issues for one DEP server.
///
/// These are the outer credentials used to sign the `/session` request.
/// They arrive inside the encrypted token bundle downloaded from the
/// ABM/ASM/ABE portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Tokens {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
    pub access_token_expiry: DateTime<Utc>,
}

impl OAuth1Tokens {
    /// Whether all four credential strings are present.
    pub fn valid(&self) -> bool {
        !self.consumer_key.is_empty()
            && !self.consumer_secret.is_empty()
            && !self.access_token.is_empty()
            && !self.access_secret.is_empty()
    }
}
