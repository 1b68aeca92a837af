//! User profile: location, calculation settings and reminder preferences.

use super::keys;
use super::{read_json, read_json_opt, write_json, KeyValueStore};
use crate::error::Result;
use crate::location::Location;
use crate::notifications::{NotificationPreference, NotificationPreferences};
use crate::times::CalculationSettings;

pub struct ProfileStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ProfileStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn location(&self) -> Result<Option<Location>> {
        let location: Option<Location> = read_json_opt(self.store, keys::LOCATION_PROFILE)?;
        // A stored profile that no longer validates is treated as absent.
        Ok(location.filter(|l| match l.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "stored location is invalid, ignoring it");
                false
            }
        }))
    }

    /// Validate and persist a location. Nothing is written on failure.
    pub fn save_location(&self, location: &Location) -> Result<()> {
        location.validate()?;
        write_json(self.store, keys::LOCATION_PROFILE, location)?;
        tracing::info!(location = %location.display_name(), "location saved");
        Ok(())
    }

    pub fn settings(&self) -> Result<CalculationSettings> {
        read_json(self.store, keys::CALCULATION_SETTINGS)
    }

    pub fn save_settings(&self, settings: &CalculationSettings) -> Result<()> {
        settings.adjustments.validate()?;
        write_json(self.store, keys::CALCULATION_SETTINGS, settings)
    }

    pub fn preferences(&self) -> Result<NotificationPreferences> {
        read_json(self.store, keys::NOTIFICATION_PREFERENCES)
    }

    /// Replace the preference for one prayer, keeping the others.
    pub fn set_preference(&self, preference: NotificationPreference) -> Result<NotificationPreferences> {
        let mut prefs = self.preferences()?;
        prefs.set(preference);
        write_json(self.store, keys::NOTIFICATION_PREFERENCES, &prefs)?;
        Ok(prefs)
    }
}
