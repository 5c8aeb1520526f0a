//! Account-driven enrollment endpoint.

use reqwest::Method;

use dep_core::{AccountDrivenEnrollmentProfileRequest, AccountDrivenEnrollmentProfileResponse};

use crate::{ClientStorage, DepClient, DepError};

impl<S: ClientStorage> DepClient<S> {
    /// Assign the account-driven enrollment service discovery URL.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/assign-an-account-driven-enrollment-profile>
    pub async fn assign_account_driven_enrollment_profile(
        &self,
        name: &str,
        req: &AccountDrivenEnrollmentProfileRequest,
    ) -> Result<AccountDrivenEnrollmentProfileResponse, DepError> {
        self.do_request(name, Method::POST, "/account-driven-enrollment/profile", Some(req))
            .await
    }
}
