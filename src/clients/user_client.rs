use tracing::{debug, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserPatch, UserSummary};
use crate::user_actor::UserError;

/// Client for interacting with the user directory.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self, params), fields(role = ?params.role))]
    pub async fn create_user(&self, params: UserCreate) -> Result<String, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: String, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }

    /// Profile summary for an order participant; `None` if unknown or the directory is unreachable.
    #[instrument(skip(self))]
    pub async fn summary(&self, id: &str) -> Option<UserSummary> {
        match self.get_user(id.to_string()).await {
            Ok(user) => user.map(|u| u.summary()),
            Err(e) => {
                warn!(error = %e, "Participant lookup failed");
                None
            }
        }
    }
}
