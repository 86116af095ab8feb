use crate::client::HueClient;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::{Rule, Rules};

impl HueClient {
    /// Sensor-driven automations stored on the bridge.
    ///
    /// `GET /api/{username}/rules`
    pub async fn list_rules(&self) -> Result<Rules, Error> {
        self.get_collection(&Endpoint::collection(ResourceKind::Rules))
            .await
    }

    /// `GET /api/{username}/rules/{id}`
    pub async fn get_rule(&self, id: &str) -> Result<Rule, Error> {
        self.get(&Endpoint::element(ResourceKind::Rules, id)).await
    }
}
