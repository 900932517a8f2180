// File: ./src/config.rs
// Handles configuration loading and defaults.
use crate::context::AppContext;
use crate::model::{AcademicYear, CalendarMeta};
use crate::parser::Vocabulary;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_planning_url() -> String {
    "https://handiman.univ-paris8.fr/planningM2-25-26.php".to_string()
}
fn default_output_filename() -> String {
    "master_handi_schedule.ics".to_string()
}
fn default_cancellations_file() -> String {
    "cancelled_dates.txt".to_string()
}
fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_fall_year() -> i32 {
    2025
}

fn default_request_timeout() -> u64 {
    20
}
fn default_max_retries() -> u32 {
    3
}
fn default_discovery_ttl() -> u64 {
    60
}

fn default_instructors() -> Vec<String> {
    vec!["Mohammed".to_string(), "Marie".to_string()]
}

fn default_refresh_interval() -> u32 {
    1
}
fn default_publish_ttl() -> u32 {
    1
}
fn default_calendar_name() -> String {
    "MIASHS Master Handicap Schedule".to_string()
}
fn default_calendar_description() -> String {
    "MIASHS course schedule".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_planning_url")]
    pub planning_url: String,
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
    /// Relative paths are resolved against the config directory.
    #[serde(default = "default_cancellations_file")]
    pub cancellations_file: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_fall_year")]
    pub fall_year: i32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_discovery_ttl")]
    pub discovery_ttl_mins: u64,

    #[serde(default = "default_instructors")]
    pub instructor_names: Vec<String>,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_hours: u32,
    #[serde(default = "default_publish_ttl")]
    pub publish_ttl_hours: u32,
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,
    #[serde(default = "default_calendar_description")]
    pub calendar_description: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planning_url: default_planning_url(),
            output_filename: default_output_filename(),
            cancellations_file: default_cancellations_file(),
            timezone: default_timezone(),
            fall_year: 2025,
            request_timeout_secs: 20,
            max_retries: 3,
            discovery_ttl_mins: 60,
            instructor_names: default_instructors(),
            refresh_interval_hours: 1,
            publish_ttl_hours: 1,
            calendar_name: default_calendar_name(),
            calendar_description: default_calendar_description(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(cfg) => Ok(cfg),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::info!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether an error from `load` means the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    pub fn academic_year(&self) -> AcademicYear {
        AcademicYear::new(self.fall_year)
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(self.instructor_names.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn discovery_ttl(&self) -> Duration {
        Duration::from_secs(self.discovery_ttl_mins * 60)
    }

    pub fn calendar_meta(&self) -> CalendarMeta {
        CalendarMeta {
            name: self.calendar_name.clone(),
            description: self.calendar_description.clone(),
            timezone: self.timezone.clone(),
            refresh_interval_hours: self.refresh_interval_hours,
            publish_ttl_hours: self.publish_ttl_hours,
        }
    }

    pub fn cancellations_path(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        let file = PathBuf::from(&self.cancellations_file);
        if file.is_absolute() {
            return Ok(file);
        }
        Ok(ctx.get_config_dir()?.join(file))
    }

    /// Default output location: the data directory.
    pub fn output_path(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        Ok(ctx.get_data_dir()?.join(&self.output_filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_missing_file_falls_back() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "fall_year = 2026\ninstructor_names = [\"Paul\"]\n").unwrap();

        let cfg = Config::load(&ctx).unwrap();
        assert_eq!(cfg.fall_year, 2026);
        assert_eq!(cfg.academic_year().spring_year(), 2027);
        assert_eq!(cfg.instructor_names, vec!["Paul".to_string()]);
        assert_eq!(cfg.timezone, "Europe/Paris");
        assert_eq!(cfg.max_retries, 3);
    }

    #[test]
    fn test_parse_error_is_not_missing() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "fall_year = \"soon\"").unwrap();

        let err = Config::load_or_default(&ctx).unwrap_err();
        assert!(!Config::is_missing_config_error(&err));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_cancellations_path() {
        let ctx = TestContext::new();
        let mut cfg = Config::default();
        let rel = cfg.cancellations_path(&ctx).unwrap();
        assert_eq!(rel, ctx.get_config_dir().unwrap().join("cancelled_dates.txt"));

        let abs = std::env::temp_dir().join("elsewhere.txt");
        cfg.cancellations_file = abs.to_string_lossy().to_string();
        assert_eq!(cfg.cancellations_path(&ctx).unwrap(), abs);
    }
}
