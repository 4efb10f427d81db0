//! Own profile and user lookup.

use tracing::{debug, info};

use parley_net::dto::ProfileUpdate;
use parley_shared::models::User;
use parley_shared::types::UserId;
use parley_shared::validation::{
    validate_bio, validate_name, validate_username, Field, FieldResult, FormErrors,
};

use crate::client::Client;
use crate::error::Result;

/// Profile edit form. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub picture_url: Option<String>,
}

impl ProfileForm {
    fn validate(&self) -> std::result::Result<(), FormErrors> {
        FormErrors::new()
            .check(Field::Name, check_present(&self.name, validate_name))
            .check(Field::Username, check_present(&self.username, validate_username))
            .check(Field::Bio, check_present(&self.bio, validate_bio))
            .into_result()
    }

    fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.map(|s| s.trim().to_string()),
            username: self.username.map(|s| s.trim().to_string()),
            bio: self.bio.map(|s| s.trim().to_string()),
            picture_url: self.picture_url,
        }
    }
}

fn check_present(value: &Option<String>, check: fn(&str) -> FieldResult) -> FieldResult {
    value.as_deref().map_or(Ok(()), check)
}

impl Client {
    /// Update the signed-in user's profile and the cached copy of it.
    pub async fn update_profile(&self, form: ProfileForm) -> Result<User> {
        form.validate()?;

        let user = self.users.update_profile(form.into_update()).await?;
        self.session.update_user(user.clone());
        self.db()?.save_profile(&user)?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User> {
        Ok(self.users.get_user(user_id).await?)
    }

    /// Search by name or username. A blank query matches nobody.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let users = self.users.search_users(query).await?;
        debug!(count = users.len(), "user search");
        Ok(users)
    }
}
