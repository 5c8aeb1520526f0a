//! Profile definition, retrieval, assignment, and removal endpoints.

use reqwest::Method;

use dep_core::{AssignProfileResponse, ClearProfileRequest, ClearProfileResponse,
    DefineProfileResponse, Profile, ProfileServiceRequest};

use crate::{ClientStorage, DepClient, DepError};

impl<S: ClientStorage> DepClient<S> {
    /// Assign a profile UUID to a list of serial numbers.
    ///
    /// Historically this has been an HTTP PUT and the DEP simulator depsim
    /// requires it; modern Apple documentation says POST. We keep PUT for
    /// compatibility.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/assign_a_profile>
    pub async fn assign_profile(
        &self,
        name: &str,
        profile_uuid: &str,
        serials: &[String],
    ) -> Result<AssignProfileResponse, DepError> {
        let req = ProfileServiceRequest {
            profile_uuid: profile_uuid.to_string(),
            devices: serials.to_vec(),
        };
        self.do_request(name, Method::PUT, "/profile/devices", Some(&req)).await
    }

    /// Unassign any profile from a list of serial numbers.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/remove_a_profile-c2c>
    pub async fn remove_profile(
        &self,
        name: &str,
        serials: &[String],
    ) -> Result<ClearProfileResponse, DepError> {
        let req = ClearProfileRequest { devices: serials.to_vec() };
        self.do_request(name, Method::DELETE, "/profile/devices", Some(&req)).await
    }

    /// Return the profile named by a UUID.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/get_a_profile>
    pub async fn get_profile(&self, name: &str, profile_uuid: &str) -> Result<Profile, DepError> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("profile_uuid", profile_uuid)
            .finish();
        self.get(name, &format!("/profile?{query}")).await
    }

    /// Define a profile with Apple's servers for later assignment.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/define_a_profile>
    pub async fn define_profile(
        &self,
        name: &str,
        profile: &Profile,
    ) -> Result<DefineProfileResponse, DepError> {
        self.do_request(name, Method::POST, "/profile", Some(profile)).await
    }
}
