//! Contact list and blocking.

use tracing::info;

use parley_shared::models::User;
use parley_shared::types::UserId;

use crate::client::Client;
use crate::error::Result;

impl Client {
    pub async fn contacts(&self) -> Result<Vec<User>> {
        Ok(self.users.get_contacts().await?)
    }

    pub async fn add_contact(&self, user_id: UserId) -> Result<()> {
        self.users.add_contact(user_id).await?;
        info!(user_id = %user_id, "contact added");
        Ok(())
    }

    pub async fn remove_contact(&self, user_id: UserId) -> Result<()> {
        self.users.remove_contact(user_id).await?;
        info!(user_id = %user_id, "contact removed");
        Ok(())
    }

    pub async fn block_user(&self, user_id: UserId) -> Result<()> {
        self.users.block_user(user_id).await?;
        info!(user_id = %user_id, "user blocked");
        Ok(())
    }

    pub async fn unblock_user(&self, user_id: UserId) -> Result<()> {
        self.users.unblock_user(user_id).await?;
        info!(user_id = %user_id, "user unblocked");
        Ok(())
    }
}
