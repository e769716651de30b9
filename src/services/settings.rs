//! Settings service.
//!
//! Reads and rewrites the settings object as a whole. Updates are applied to
//! a copy and validated before anything is written.

use crate::models::{AppSettings, Shortcut, WindowPosition};
use crate::storage::PersistenceGateway;
use crate::Result;
use std::sync::Arc;
use tracing::instrument;

/// Service for reading and updating application settings.
pub struct SettingsService {
    gateway: Arc<dyn PersistenceGateway>,
}

impl SettingsService {
    /// Creates a settings service.
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the stored settings, or defaults when none were saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read.
    pub fn get(&self) -> Result<AppSettings> {
        Ok(self.gateway.load_settings()?.unwrap_or_default())
    }

    /// Applies `f` to the current settings and writes the result.
    ///
    /// Nothing is written if the updated settings fail validation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if validation fails, or an
    /// error if the settings cannot be read or written.
    pub fn update(&self, f: impl FnOnce(&mut AppSettings)) -> Result<AppSettings> {
        let mut settings = self.get()?;
        f(&mut settings);
        settings.validate()?;
        self.gateway.save_settings(&settings)?;
        Ok(settings)
    }

    /// Sets the quick picker hotkey.
    ///
    /// The shortcut is stored in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if `shortcut` does not parse.
    #[instrument(skip(self))]
    pub fn set_quick_picker_shortcut(&self, shortcut: &str, enabled: bool) -> Result<AppSettings> {
        let canonical = shortcut.parse::<Shortcut>()?.to_string();
        let settings = self.update(|s| {
            s.global_shortcut.quick_picker = canonical;
            s.global_shortcut.enabled = enabled;
        })?;
        tracing::info!(shortcut = %settings.global_shortcut.quick_picker, enabled, "Updated shortcut");
        Ok(settings)
    }

    /// Remembers where the quick picker window was last shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be read or written.
    pub fn save_quick_picker_position(&self, x: i32, y: i32) -> Result<()> {
        self.update(|s| s.quick_picker.position = Some(WindowPosition { x, y }))?;
        tracing::debug!(x, y, "Saved quick picker position");
        Ok(())
    }

    /// Restores default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    pub fn reset(&self) -> Result<AppSettings> {
        let settings = AppSettings::default();
        self.gateway.save_settings(&settings)?;
        Ok(settings)
    }
}
