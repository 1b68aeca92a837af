//! Geographic location profile.
//!
//! A [`Location`] is validated before it is ever persisted: coordinates must
//! be in range and the timezone must be a known IANA identifier. City and
//! country are display-only labels and never influence time computation.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone identifier, e.g. "Europe/London".
    pub timezone: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Display label produced by a reverse geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceLabel {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Resolves coordinates to a human-readable place name.
///
/// Used only for labelling; prayer times never depend on it.
pub trait ReverseGeocoder {
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<PlaceLabel>;
}

impl Location {
    /// Build a validated location without display labels.
    pub fn new(latitude: f64, longitude: f64, timezone: &str) -> Result<Self, ValidationError> {
        let location = Self {
            latitude,
            longitude,
            timezone: timezone.trim().to_string(),
            city: None,
            country: None,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn with_label(mut self, city: Option<String>, country: Option<String>) -> Self {
        self.city = city.filter(|c| !c.trim().is_empty());
        self.country = country.filter(|c| !c.trim().is_empty());
        self
    }

    /// Fill missing city/country from a geocoder. Existing labels win.
    pub fn label_with(mut self, geocoder: &dyn ReverseGeocoder) -> Self {
        if self.city.is_some() && self.country.is_some() {
            return self;
        }
        if let Some(label) = geocoder.lookup(self.latitude, self.longitude) {
            self.city = self.city.or(label.city);
            self.country = self.country.or(label.country);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::OutOfRange {
                field: "latitude".into(),
                value: self.latitude,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::OutOfRange {
                field: "longitude".into(),
                value: self.longitude,
                min: -180.0,
                max: 180.0,
            });
        }
        if self.timezone.is_empty() {
            return Err(ValidationError::Missing("timezone".into()));
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, ValidationError> {
        self.timezone.parse::<Tz>().map_err(|_| {
            ValidationError::invalid(
                "timezone",
                format!("'{}' is not an IANA timezone", self.timezone),
            )
        })
    }

    /// "City, Country" when labelled, coordinates otherwise.
    pub fn display_name(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (Some(city), None) => city.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder;

    impl ReverseGeocoder for FixedGeocoder {
        fn lookup(&self, _latitude: f64, _longitude: f64) -> Option<PlaceLabel> {
            Some(PlaceLabel {
                city: Some("Makkah".into()),
                country: Some("Saudi Arabia".into()),
            })
        }
    }

    #[test]
    fn accepts_boundary_coordinates() {
        assert!(Location::new(90.0, 180.0, "UTC").is_ok());
        assert!(Location::new(-90.0, -180.0, "UTC").is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = Location::new(91.0, 0.0, "UTC").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "latitude"));
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let err = Location::new(0.0, -180.5, "UTC").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "longitude"));
    }

    #[test]
    fn rejects_nan_coordinates() {
        assert!(Location::new(f64::NAN, 0.0, "UTC").is_err());
    }

    #[test]
    fn rejects_unknown_or_missing_timezone() {
        assert!(Location::new(21.4, 39.8, "Mars/Olympus").is_err());
        assert_eq!(
            Location::new(21.4, 39.8, "  ").unwrap_err(),
            ValidationError::Missing("timezone".into())
        );
    }

    #[test]
    fn geocoder_fills_only_missing_labels() {
        let loc = Location::new(21.42, 39.83, "Asia/Riyadh")
            .unwrap()
            .with_label(Some("Mecca".into()), None)
            .label_with(&FixedGeocoder);
        assert_eq!(loc.city.as_deref(), Some("Mecca"));
        assert_eq!(loc.country.as_deref(), Some("Saudi Arabia"));
        assert_eq!(loc.display_name(), "Mecca, Saudi Arabia");
    }
}
