use async_trait::async_trait;

use parley_shared::error::ApiResult;
use parley_shared::models::User;

use crate::dto::{AuthSession, Credentials, EmailCode, PasswordReset, Registration};
use crate::http::ApiClient;
use crate::repository::AuthRepository;

#[derive(serde::Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

pub struct RemoteAuthRepository {
    api: ApiClient,
}

impl RemoteAuthRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthRepository for RemoteAuthRepository {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        self.api
            .post_anonymous("auth/login", &Credentials { email, password })
            .await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        self.api
            .post_anonymous(
                "auth/register",
                &Registration {
                    name,
                    email,
                    password,
                },
            )
            .await
    }

    async fn verify_email(&self, email: &str, code: &str) -> ApiResult<AuthSession> {
        self.api
            .post_anonymous("auth/verify-email", &EmailCode { email, code })
            .await
    }

    async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        self.api
            .post_anonymous("auth/password-reset/request", &EmailOnly { email })
            .await
    }

    async fn reset_password(&self, email: &str, code: &str, password: &str) -> ApiResult<()> {
        self.api
            .post_anonymous(
                "auth/password-reset/confirm",
                &PasswordReset {
                    email,
                    code,
                    password,
                },
            )
            .await
    }

    async fn me(&self) -> ApiResult<User> {
        self.api.get("auth/me").await
    }
}
