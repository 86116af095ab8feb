use tracing::debug;

use crate::client::HueClient;
use crate::codec::RequestBody;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::{Group, Groups, ModificationResult};

impl HueClient {
    /// List all groups, rooms and zones.
    ///
    /// `GET /api/{username}/groups`
    pub async fn list_groups(&self) -> Result<Groups, Error> {
        self.get_collection(&Endpoint::collection(ResourceKind::Groups))
            .await
    }

    /// `GET /api/{username}/groups/{id}`
    pub async fn get_group(&self, id: &str) -> Result<Group, Error> {
        self.get(&Endpoint::element(ResourceKind::Groups, id)).await
    }

    /// Switch every light in a group on or off.
    ///
    /// `PUT /api/{username}/groups/{id}/action` with `{"on": <on>}`.
    pub async fn set_group_on(&self, id: &str, on: bool) -> Result<Vec<ModificationResult>, Error> {
        debug!(id, on, "setting group action");
        self.put(&Endpoint::group_action(id), &RequestBody::on(on)?)
            .await
    }
}
