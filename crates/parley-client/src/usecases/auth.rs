//! Sign-up, sign-in and session lifecycle.

use tracing::{info, warn};

use parley_net::dto::AuthSession;
use parley_shared::error::ErrorKind;
use parley_shared::models::User;
use parley_shared::validation::{
    validate_code, validate_email, validate_name, validate_password,
    validate_password_confirmation, Field, FormErrors,
};

use crate::client::Client;
use crate::error::Result;

impl Client {
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        FormErrors::new()
            .check(Field::Email, validate_email(email))
            .check(Field::Password, validate_password(password))
            .into_result()?;

        let session = self.auth.login(email.trim(), password).await?;
        self.establish(session).await
    }

    /// Create an inactive account; the server mails a verification code.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<()> {
        FormErrors::new()
            .check(Field::Name, validate_name(name))
            .check(Field::Email, validate_email(email))
            .check(Field::Password, validate_password(password))
            .check(
                Field::ConfirmPassword,
                validate_password_confirmation(password, confirmation),
            )
            .into_result()?;

        self.auth
            .register(name.trim(), email.trim(), password)
            .await?;
        info!("account registered, awaiting verification");
        Ok(())
    }

    /// Confirm the emailed code; a valid code signs the user in.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<User> {
        FormErrors::new()
            .check(Field::Email, validate_email(email))
            .check(Field::Code, validate_code(code))
            .into_result()?;

        let session = self.auth.verify_email(email.trim(), code.trim()).await?;
        self.establish(session).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        FormErrors::new()
            .check(Field::Email, validate_email(email))
            .into_result()?;

        self.auth.request_password_reset(email.trim()).await?;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<()> {
        FormErrors::new()
            .check(Field::Email, validate_email(email))
            .check(Field::Code, validate_code(code))
            .check(Field::Password, validate_password(password))
            .check(
                Field::ConfirmPassword,
                validate_password_confirmation(password, confirmation),
            )
            .into_result()?;

        self.auth
            .reset_password(email.trim(), code.trim(), password)
            .await?;
        info!("password reset");
        Ok(())
    }

    /// Sign back in from the persisted token.
    ///
    /// Returns `None` when there is no token or the server rejects it (the
    /// stale token is then wiped). When the server is unreachable the cached
    /// profile is used and synchronisation keeps retrying in the background.
    pub async fn restore_session(&self) -> Result<Option<User>> {
        let (token, cached) = {
            let db = self.db()?;
            (db.load_token()?, db.load_profile()?)
        };
        let Some(token) = token else {
            return Ok(None);
        };

        self.session.sign_in(token, cached.clone());
        match self.auth.me().await {
            Ok(user) => {
                self.session.update_user(user.clone());
                self.db()?.save_profile(&user)?;
                self.start_sync().await;
                info!(user_id = %user.id, "session restored");
                Ok(Some(user))
            }
            Err(e) if e.kind == ErrorKind::Unauthorized => {
                warn!("stored token rejected, signing out");
                self.session.sign_out();
                self.db()?.clear_session()?;
                Ok(None)
            }
            Err(e) => match cached {
                Some(user) => {
                    warn!(error = %e, "server unreachable, using cached profile");
                    self.start_sync().await;
                    Ok(Some(user))
                }
                None => {
                    self.session.sign_out();
                    Err(e.into())
                }
            },
        }
    }

    /// Stop synchronising and forget the token locally. The server-side
    /// session is not revoked.
    pub async fn logout(&self) -> Result<()> {
        self.stop_sync().await;
        self.session.sign_out();
        self.db()?.clear_session()?;
        info!("signed out");
        Ok(())
    }

    async fn establish(&self, session: AuthSession) -> Result<User> {
        let AuthSession { token, user } = session;
        {
            let db = self.db()?;
            db.save_token(&token)?;
            db.save_profile(&user)?;
        }
        self.session.sign_in(token, Some(user.clone()));
        self.start_sync().await;
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }
}
