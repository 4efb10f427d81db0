//! Local application settings.

use tracing::debug;

use parley_store::AppSettings;

use crate::client::Client;
use crate::error::Result;

impl Client {
    /// Stored settings, defaults when never saved.
    pub fn settings(&self) -> Result<AppSettings> {
        Ok(self.db()?.load_settings()?)
    }

    pub fn update_settings(&self, settings: &AppSettings) -> Result<()> {
        self.db()?.save_settings(settings)?;
        debug!(?settings, "settings saved");
        Ok(())
    }
}
