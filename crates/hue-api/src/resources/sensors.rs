use crate::client::HueClient;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::{Sensor, Sensors};

impl HueClient {
    /// `GET /api/{username}/sensors`
    pub async fn list_sensors(&self) -> Result<Sensors, Error> {
        self.get_collection(&Endpoint::collection(ResourceKind::Sensors))
            .await
    }

    /// `GET /api/{username}/sensors/{id}`
    pub async fn get_sensor(&self, id: &str) -> Result<Sensor, Error> {
        self.get(&Endpoint::element(ResourceKind::Sensors, id)).await
    }
}
