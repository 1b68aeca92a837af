//! Logical keys of the persisted key/value store.

pub const LOCATION_PROFILE: &str = "location_profile";
pub const CALCULATION_SETTINGS: &str = "calculation_settings";
pub const NOTIFICATION_PREFERENCES: &str = "notification_preferences";
pub const ADHERENCE_RECORDS: &str = "adherence_records";
pub const STREAK_STATES: &str = "streak_states";
pub const SCHEDULED_NOTIFICATIONS: &str = "scheduled_notifications";
