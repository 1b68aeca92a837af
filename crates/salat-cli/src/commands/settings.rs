use clap::Subcommand;
use salat_core::storage::Database;
use salat_core::{CalculationMethod, HighLatitudeRule, Madhab, ProfileStore, TimeKey};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Update calculation settings; omitted options keep their value
    Set {
        /// Calculation method, e.g. "muslim_world_league", "umm_al_qura"
        #[arg(long)]
        method: Option<CalculationMethod>,
        /// "shafi" or "hanafi"
        #[arg(long)]
        madhab: Option<Madhab>,
        /// "middle_of_the_night", "seventh_of_the_night" or "twilight_angle"
        #[arg(long)]
        high_latitude_rule: Option<HighLatitudeRule>,
        /// Minute adjustment as NAME=MINUTES, e.g. "fajr=2" or "isha=-3"
        #[arg(long = "adjust", value_parser = parse_adjustment, allow_hyphen_values = true)]
        adjustments: Vec<(TimeKey, i32)>,
    },
    /// Print the saved settings
    Show,
}

fn parse_adjustment(s: &str) -> Result<(TimeKey, i32), String> {
    let (name, minutes) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MINUTES, got '{s}'"))?;
    let key = TimeKey::ALL
        .into_iter()
        .find(|k| k.as_str() == name.trim())
        .ok_or_else(|| format!("unknown time '{name}'"))?;
    let minutes = minutes
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid minutes '{minutes}': {e}"))?;
    Ok((key, minutes))
}

pub fn run(action: SettingsAction) -> CmdResult {
    let db = Database::open()?;
    let profile = ProfileStore::new(&db);

    match action {
        SettingsAction::Set {
            method,
            madhab,
            high_latitude_rule,
            adjustments,
        } => {
            let mut settings = profile.settings()?;
            if let Some(method) = method {
                settings.method = method;
            }
            if let Some(madhab) = madhab {
                settings.madhab = madhab;
            }
            if let Some(rule) = high_latitude_rule {
                settings.high_latitude_rule = rule;
            }
            for (key, minutes) in adjustments {
                settings.adjustments.set(key, minutes)?;
            }
            profile.save_settings(&settings)?;
            print_json(&settings)?;
        }
        SettingsAction::Show => print_json(&profile.settings()?)?,
    }
    Ok(())
}
