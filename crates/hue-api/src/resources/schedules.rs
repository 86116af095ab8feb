use crate::client::HueClient;
use crate::endpoint::{Endpoint, ResourceKind};
use crate::error::Error;
use crate::models::{Schedule, Schedules};

impl HueClient {
    /// `GET /api/{username}/schedules`
    pub async fn list_schedules(&self) -> Result<Schedules, Error> {
        self.get_collection(&Endpoint::collection(ResourceKind::Schedules))
            .await
    }

    /// `GET /api/{username}/schedules/{id}`
    pub async fn get_schedule(&self, id: &str) -> Result<Schedule, Error> {
        self.get(&Endpoint::element(ResourceKind::Schedules, id)).await
    }
}
