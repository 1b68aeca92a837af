use clap::Subcommand;
use salat_core::storage::Database;
use salat_core::{Location, ProfileStore};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum LocationAction {
    /// Save the location used for prayer times
    Set {
        /// Latitude in degrees, -90 to 90
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees, -180 to 180
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// IANA timezone, e.g. "Europe/London"
        #[arg(long)]
        tz: String,
        /// Display city
        #[arg(long)]
        city: Option<String>,
        /// Display country
        #[arg(long)]
        country: Option<String>,
    },
    /// Print the saved location
    Show,
}

pub fn run(action: LocationAction) -> CmdResult {
    let db = Database::open()?;
    let profile = ProfileStore::new(&db);

    match action {
        LocationAction::Set {
            lat,
            lon,
            tz,
            city,
            country,
        } => {
            let location = Location::new(lat, lon, &tz)?.with_label(city, country);
            profile.save_location(&location)?;
            print_json(&location)?;
        }
        LocationAction::Show => match profile.location()? {
            Some(location) => print_json(&location)?,
            None => return Err("no location saved; run `salat location set`".into()),
        },
    }
    Ok(())
}
