use crate::client::HueClient;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::BridgeConfig;

impl HueClient {
    /// Bridge configuration, including the whitelist of paired apps.
    ///
    /// `GET /api/{username}/config`
    pub async fn get_config(&self) -> Result<BridgeConfig, Error> {
        self.get(&Endpoint::collection(ResourceKind::Config)).await
    }
}
