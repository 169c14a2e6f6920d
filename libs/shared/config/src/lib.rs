use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use shared_models::{Role, TriageLevel};
use thiserror::Error;
use tracing::{info, warn};

/// Fatal startup configuration failure (spec.md §7 "Configuration").
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: serde_json::Error },

    #[error("missing required config key: {0}")]
    MissingKey(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Day-part patient-acuity estimate triple used for demand generation
/// (spec.md §6 "Demand inputs"; C6).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DayPartCounts {
    pub day: f64,
    pub evening: f64,
    pub night: f64,
}

/// Raw JSON shape, deserialized verbatim before being validated and
/// converted (role/triage strings parsed into their enums) into
/// [`AppConfig`]. Kept separate from `AppConfig` so the enum-keyed maps on
/// the public type don't need custom `Deserialize` impls.
#[derive(Debug, Deserialize)]
struct RawConfig {
    population_size: u64,
    er_name: String,
    er_capacity: usize,
    er_treatment_rooms: usize,
    interarrival_time_mins: f64,

    max_hours_per_day: u32,
    max_regular_hours_per_week: u32,
    max_total_hours_per_week: u32,
    overtime_multiplier: f64,

    staff_counts: HashMap<String, u32>,
    hourly_wages: HashMap<String, f64>,
    cna_ratio: f64,
    lpn_ratio: f64,

    est_trauma_patients: DayPartCounts,
    est_non_trauma_patients: DayPartCounts,

    triage_nurse_requirements: HashMap<String, f64>,
    triage_physician_requirements: HashMap<String, f64>,
    triage_rp_requirements: HashMap<String, f64>,
    avg_treatment_times_mins: HashMap<String, f64>,

    patient_arrival_functions: HashMap<String, String>,
    default_arrival_function: String,

    patient_min_age: u8,
    patient_max_age: u8,
}

/// Configuration consumed once at startup (spec.md §6). Immutable after
/// construction — if multiple simulator instances share one `AppConfig`,
/// §5's locking discipline requires that it never be mutated again.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub population_size: u64,
    pub er_name: String,
    pub er_capacity: usize,
    pub er_treatment_rooms: usize,
    pub interarrival_time_mins: f64,

    pub max_hours_per_day: u32,
    pub max_regular_hours_per_week: u32,
    pub max_total_hours_per_week: u32,
    pub overtime_multiplier: f64,

    pub staff_counts: HashMap<Role, u32>,
    pub hourly_wages: HashMap<Role, f64>,
    pub cna_ratio: f64,
    pub lpn_ratio: f64,

    pub est_trauma_patients: DayPartCounts,
    pub est_non_trauma_patients: DayPartCounts,

    pub triage_nurse_requirements: HashMap<TriageLevel, f64>,
    pub triage_physician_requirements: HashMap<TriageLevel, f64>,
    pub triage_rp_requirements: HashMap<TriageLevel, f64>,
    pub avg_treatment_times_mins: HashMap<TriageLevel, f64>,

    pub patient_arrival_functions: HashMap<String, String>,
    pub default_arrival_function: String,

    pub patient_min_age: u8,
    pub patient_max_age: u8,
}

fn parse_role_map<V: Clone>(raw: &HashMap<String, V>, key: &str) -> Result<HashMap<Role, V>, ConfigError> {
    raw.iter()
        .map(|(k, v)| {
            Role::from_str(k)
                .map(|role| (role, v.clone()))
                .map_err(|reason| ConfigError::InvalidValue { key: format!("{key}.{k}"), reason })
        })
        .collect()
}

fn parse_triage_map<V: Clone>(raw: &HashMap<String, V>, key: &str) -> Result<HashMap<TriageLevel, V>, ConfigError> {
    raw.iter()
        .map(|(k, v)| {
            TriageLevel::from_str(k)
                .map(|level| (level, v.clone()))
                .map_err(|reason| ConfigError::InvalidValue { key: format!("{key}.{k}"), reason })
        })
        .collect()
}

impl AppConfig {
    /// Loads and validates the JSON config at `path` (spec.md §6). Any
    /// failure here is fatal at startup per §7.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        let raw: RawConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
        Self::from_raw(raw)
    }

    /// Resolves the config file path from `ED_SIM_CONFIG`, falling back to
    /// `config.json` in the current directory, then loads it.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        let path = env::var("ED_SIM_CONFIG").unwrap_or_else(|_| "config.json".to_string());
        info!(%path, "loading configuration");
        Self::from_file(path)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.er_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "er_capacity".into(),
                reason: "must be positive".into(),
            });
        }
        if raw.interarrival_time_mins <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "interarrival_time_mins".into(),
                reason: "must be positive".into(),
            });
        }
        if !raw.patient_arrival_functions.contains_key(&raw.default_arrival_function) {
            return Err(ConfigError::MissingKey(format!(
                "default_arrival_function '{}' not present in patient_arrival_functions",
                raw.default_arrival_function
            )));
        }
        for (level, mean) in &raw.avg_treatment_times_mins {
            if *mean <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("avg_treatment_times_mins.{level}"),
                    reason: "must be positive".into(),
                });
            }
        }

        let config = AppConfig {
            population_size: raw.population_size,
            er_name: raw.er_name,
            er_capacity: raw.er_capacity,
            er_treatment_rooms: raw.er_treatment_rooms,
            interarrival_time_mins: raw.interarrival_time_mins,
            max_hours_per_day: raw.max_hours_per_day,
            max_regular_hours_per_week: raw.max_regular_hours_per_week,
            max_total_hours_per_week: raw.max_total_hours_per_week,
            overtime_multiplier: raw.overtime_multiplier,
            staff_counts: parse_role_map(&raw.staff_counts, "staff_counts")?,
            hourly_wages: parse_role_map(&raw.hourly_wages, "hourly_wages")?,
            cna_ratio: raw.cna_ratio,
            lpn_ratio: raw.lpn_ratio,
            est_trauma_patients: raw.est_trauma_patients,
            est_non_trauma_patients: raw.est_non_trauma_patients,
            triage_nurse_requirements: parse_triage_map(&raw.triage_nurse_requirements, "triage_nurse_requirements")?,
            triage_physician_requirements: parse_triage_map(
                &raw.triage_physician_requirements,
                "triage_physician_requirements",
            )?,
            triage_rp_requirements: parse_triage_map(&raw.triage_rp_requirements, "triage_rp_requirements")?,
            avg_treatment_times_mins: parse_triage_map(&raw.avg_treatment_times_mins, "avg_treatment_times_mins")?,
            patient_arrival_functions: raw.patient_arrival_functions,
            default_arrival_function: raw.default_arrival_function,
            patient_min_age: raw.patient_min_age,
            patient_max_age: raw.patient_max_age,
        };

        for group in [&config.triage_nurse_requirements, &config.triage_physician_requirements, &config.triage_rp_requirements]
        {
            for level in TriageLevel::ALL {
                if !group.contains_key(&level) {
                    warn!(?level, "triage staff requirement missing, treatment gating will treat it as zero");
                }
            }
        }

        Ok(config)
    }

    pub fn default_arrival_expression(&self) -> &str {
        self.patient_arrival_functions
            .get(&self.default_arrival_function)
            .expect("validated at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> &'static str {
        r#"{
            "population_size": 1000,
            "er_name": "Test ER",
            "er_capacity": 20,
            "er_treatment_rooms": 5,
            "interarrival_time_mins": 8.0,
            "max_hours_per_day": 12,
            "max_regular_hours_per_week": 40,
            "max_total_hours_per_week": 48,
            "overtime_multiplier": 1.5,
            "staff_counts": {"REGISTERED_NURSE": 10, "ATTENDING_PHYSICIAN": 4, "RESIDENT_PHYSICIAN": 6, "ADMIN_CLERK": 2},
            "hourly_wages": {"REGISTERED_NURSE": 45.0, "ATTENDING_PHYSICIAN": 120.0, "RESIDENT_PHYSICIAN": 60.0, "ADMIN_CLERK": 22.0},
            "cna_ratio": 8.0,
            "lpn_ratio": 6.0,
            "est_trauma_patients": {"day": 5.0, "evening": 4.0, "night": 2.0},
            "est_non_trauma_patients": {"day": 20.0, "evening": 15.0, "night": 8.0},
            "triage_nurse_requirements": {"RED": 2.0, "ORANGE": 1.5, "YELLOW": 1.0, "GREEN": 0.5, "BLUE": 0.25},
            "triage_physician_requirements": {"RED": 1.0, "ORANGE": 1.0, "YELLOW": 0.5, "GREEN": 0.25, "BLUE": 0.1},
            "triage_rp_requirements": {"RED": 1.0, "ORANGE": 0.5, "YELLOW": 0.5, "GREEN": 0.25, "BLUE": 0.1},
            "avg_treatment_times_mins": {"RED": 180.0, "ORANGE": 120.0, "YELLOW": 90.0, "GREEN": 45.0, "BLUE": 15.0},
            "patient_arrival_functions": {"baseline": "(-0.25)*cos((pi/12)*t)+0.75"},
            "default_arrival_function": "baseline",
            "patient_min_age": 5,
            "patient_max_age": 99
        }"#
    }

    #[test]
    fn loads_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_json().as_bytes()).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.er_capacity, 20);
        assert_eq!(config.staff_counts[&Role::RegisteredNurse], 10);
        assert_eq!(config.triage_nurse_requirements[&TriageLevel::Red], 2.0);
    }

    #[test]
    fn rejects_unknown_default_arrival_function() {
        let bad = sample_json().replace("\"baseline\",", "\"missing\",");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, bad).unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::MissingKey(_))));
    }

    #[test]
    fn rejects_zero_capacity() {
        let bad = sample_json().replace("\"er_capacity\": 20,", "\"er_capacity\": 0,");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, bad).unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn rejects_non_positive_avg_treatment_time() {
        let bad = sample_json().replace("\"RED\": 180.0,", "\"RED\": 0.0,");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, bad).unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::InvalidValue { .. })));
    }
}
