use tracing::debug;

use crate::client::HueClient;
use crate::codec::RequestBody;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::{Light, Lights, ModificationResult};

impl HueClient {
    /// List all lights known to the bridge.
    ///
    /// `GET /api/{username}/lights`
    pub async fn list_lights(&self) -> Result<Lights, Error> {
        self.get_collection(&Endpoint::collection(ResourceKind::Lights))
            .await
    }

    /// `GET /api/{username}/lights/{id}`
    pub async fn get_light(&self, id: &str) -> Result<Light, Error> {
        self.get(&Endpoint::element(ResourceKind::Lights, id)).await
    }

    /// Switch a light on or off.
    ///
    /// `PUT /api/{username}/lights/{id}/state` with `{"on": <on>}`. Returns
    /// one entry per change the bridge acknowledged.
    pub async fn set_light_on(&self, id: &str, on: bool) -> Result<Vec<ModificationResult>, Error> {
        debug!(id, on, "setting light state");
        self.put(&Endpoint::light_state(id), &RequestBody::on(on)?)
            .await
    }
}
