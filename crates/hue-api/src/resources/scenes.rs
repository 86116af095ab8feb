use crate::client::HueClient;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::{Scene, Scenes};

impl HueClient {
    /// `GET /api/{username}/scenes`
    pub async fn list_scenes(&self) -> Result<Scenes, Error> {
        self.get_collection(&Endpoint::collection(ResourceKind::Scenes))
            .await
    }

    /// `GET /api/{username}/scenes/{id}`
    ///
    /// Unlike the list, the single-scene response also reports `picture`.
    pub async fn get_scene(&self, id: &str) -> Result<Scene, Error> {
        self.get(&Endpoint::element(ResourceKind::Scenes, id)).await
    }
}
