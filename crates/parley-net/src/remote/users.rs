use async_trait::async_trait;

use parley_shared::error::ApiResult;
use parley_shared::models::User;
use parley_shared::types::UserId;

use crate::dto::ProfileUpdate;
use crate::http::ApiClient;
use crate::repository::UserRepository;

pub struct RemoteUserRepository {
    api: ApiClient,
}

impl RemoteUserRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UserRepository for RemoteUserRepository {
    async fn get_user(&self, user_id: UserId) -> ApiResult<User> {
        self.api.get(&format!("users/{user_id}")).await
    }

    async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.api.get(&format!("users/search?query={encoded}")).await
    }

    async fn get_contacts(&self) -> ApiResult<Vec<User>> {
        self.api.get("contacts").await
    }

    async fn add_contact(&self, user_id: UserId) -> ApiResult<()> {
        self.api.post(&format!("contacts/{user_id}"), &()).await
    }

    async fn remove_contact(&self, user_id: UserId) -> ApiResult<()> {
        self.api.delete(&format!("contacts/{user_id}")).await
    }

    async fn block_user(&self, user_id: UserId) -> ApiResult<()> {
        self.api.post(&format!("users/{user_id}/block"), &()).await
    }

    async fn unblock_user(&self, user_id: UserId) -> ApiResult<()> {
        self.api.delete(&format!("users/{user_id}/block")).await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> ApiResult<User> {
        let user: User = self.api.put("users/me", &update).await?;
        self.api.session().update_user(user.clone());
        Ok(user)
    }
}
