//! Device listing, sync, details, and disowning endpoints.

use reqwest::Method;

use dep_core::{DeviceListRequest, DeviceListResponse, DeviceRequest, DeviceResponse,
    DeviceStatusResponse};

use crate::{ClientStorage, DepClient, DepError};

impl<S: ClientStorage> DepClient<S> {
    /// Retrieve a full list of devices assigned to this DEP name.
    ///
    /// The initial request omits the cursor; pass the cursor of the
    /// previous response on subsequent calls.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/get_a_list_of_devices>
    pub async fn fetch_devices(
        &self,
        name: &str,
        req: &DeviceRequest,
    ) -> Result<DeviceResponse, DepError> {
        self.do_request(name, Method::POST, "/server/devices", Some(req)).await
    }

    /// Retrieve the delta of device changes since the cursor.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/sync_the_list_of_devices>
    pub async fn sync_devices(
        &self,
        name: &str,
        req: &DeviceRequest,
    ) -> Result<DeviceResponse, DepError> {
        self.do_request(name, Method::POST, "/devices/sync", Some(req)).await
    }

    /// Get the details for a set of serial numbers.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/get_device_details>
    pub async fn device_details(
        &self,
        name: &str,
        serials: &[String],
    ) -> Result<DeviceListResponse, DepError> {
        let req = DeviceListRequest { devices: serials.to_vec() };
        self.do_request(name, Method::POST, "/devices", Some(&req)).await
    }

    /// Disclaim ownership of serial numbers.
    ///
    /// WARNING: permanently removes the devices from the ABM/ASM/ABE
    /// instance.
    ///
    /// See <https://developer.apple.com/documentation/devicemanagement/disown_devices>
    pub async fn disown_devices(
        &self,
        name: &str,
        serials: &[String],
    ) -> Result<DeviceStatusResponse, DepError> {
        let req = DeviceListRequest { devices: serials.to_vec() };
        self.do_request(name, Method::POST, "/devices/disown", Some(&req)).await
    }
}
