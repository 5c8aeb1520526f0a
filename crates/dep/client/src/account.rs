//! Account endpoint.

use dep_core::AccountDetail;

use crate::{ClientStorage, DepClient, DepError};

impl<S: ClientStorage> DepClient<S> {
    /// Get the details about the DEP account and MDM server.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/get_account_detail>
    pub async fn account_detail(&self, name: &str) -> Result<AccountDetail, DepError> {
        self.get(name, "/account").await
    }
}
