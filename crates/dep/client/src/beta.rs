//! OS beta enrollment endpoint.

use dep_core::GetSeedBuildTokenResponse;

use crate::{ClientStorage, DepClient, DepError};

impl<S: ClientStorage> DepClient<S> {
    /// Fetch the OS beta enrollment tokens, for forcing enrollment into
    /// beta software during ADE enrollment.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/get_beta_enrollment_tokens>
    pub async fn os_beta_enrollment_tokens(
        &self,
        name: &str,
    ) -> Result<GetSeedBuildTokenResponse, DepError> {
        self.get(name, "/os-beta-enrollment/tokens").await
    }
}
