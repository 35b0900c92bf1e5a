//! DML Configuration
//!
//! Constants the procedures apply: opportunity defaults, bulk lead
//! settings, case statuses and log verbosity. Every field has a default, so
//! an empty JSON object is a valid config.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmlConfig {
    pub opportunity: OpportunityDefaults,
    pub lead: LeadBulkConfig,
    pub case: CaseConfig,
    pub logging: LoggingConfig,
}

impl DmlConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DmlConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        log_event_with_fields(Event::ConfigLoaded, &[("path", &path.display().to_string())]);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.opportunity.stage_name.is_empty() {
            return Err(ConfigError::Invalid(
                "opportunity.stage_name must not be empty".to_string(),
            ));
        }
        if !CLOSE_IN_DAYS_RANGE.contains(&self.opportunity.close_in_days) {
            return Err(ConfigError::Invalid(format!(
                "opportunity.close_in_days must be within {}..={}",
                CLOSE_IN_DAYS_RANGE.start(),
                CLOSE_IN_DAYS_RANGE.end()
            )));
        }
        if self.lead.company.is_empty() {
            return Err(ConfigError::Invalid("lead.company must not be empty".to_string()));
        }
        if self.lead.max_batch == 0 {
            return Err(ConfigError::Invalid("lead.max_batch must be positive".to_string()));
        }
        if self.case.open_status == self.case.closed_status {
            return Err(ConfigError::Invalid(
                "case.open_status and case.closed_status must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepted offsets for a relative CloseDate (up to a century ahead)
pub const CLOSE_IN_DAYS_RANGE: std::ops::RangeInclusive<i64> = 0..=36_500;

/// Values forced onto opportunities by the defaulting procedures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityDefaults {
    /// StageName (default: "Prospecting")
    pub stage_name: String,

    /// Amount (default: 0.0)
    pub amount: f64,

    /// Fixed CloseDate; when absent, `close_in_days` from today
    pub close_date: Option<NaiveDate>,

    /// Days from today used when no fixed CloseDate is set (default: 30)
    pub close_in_days: i64,
}

impl Default for OpportunityDefaults {
    fn default() -> Self {
        Self {
            stage_name: "Prospecting".to_string(),
            amount: 0.0,
            close_date: None,
            close_in_days: 30,
        }
    }
}

impl OpportunityDefaults {
    /// CloseDate to apply for a call made on `today`
    pub fn close_date_from(&self, today: NaiveDate) -> Result<NaiveDate, ConfigError> {
        if let Some(fixed) = self.close_date {
            return Ok(fixed);
        }
        TimeDelta::try_days(self.close_in_days)
            .and_then(|offset| today.checked_add_signed(offset))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "opportunity.close_in_days {} is out of the date range from {}",
                    self.close_in_days, today
                ))
            })
    }
}

/// Settings for the bulk insert-then-delete procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadBulkConfig {
    /// Company on every generated lead (default: "Acme Corporation")
    pub company: String,

    /// LastName prefix, followed by the lead's position (default: "Lead")
    pub last_name_prefix: String,

    /// Largest batch accepted (default: 200)
    pub max_batch: usize,
}

impl Default for LeadBulkConfig {
    fn default() -> Self {
        Self {
            company: "Acme Corporation".to_string(),
            last_name_prefix: "Lead".to_string(),
            max_batch: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    pub open_status: String,
    pub closed_status: String,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            open_status: "New".to_string(),
            closed_status: "Closed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity written (default: info)
    pub min_severity: Severity,
}

impl LoggingConfig {
    pub fn apply(&self) {
        Logger::set_min_severity(self.min_severity);
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DmlConfig::default();
        assert_eq!(config.opportunity.stage_name, "Prospecting");
        assert_eq!(config.opportunity.close_in_days, 30);
        assert_eq!(config.lead.max_batch, 200);
        assert_eq!(config.case.open_status, "New");
        assert_eq!(config.logging.min_severity, Severity::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = DmlConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DmlConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = DmlConfig::from_json_str(
            r#"{"opportunity": {"amount": 1500.0, "close_date": "2026-12-31"},
                "logging": {"min_severity": "warn"}}"#,
        )
        .unwrap();
        assert_eq!(config.opportunity.amount, 1500.0);
        assert_eq!(config.opportunity.stage_name, "Prospecting");
        assert_eq!(
            config.opportunity.close_date,
            NaiveDate::from_ymd_opt(2026, 12, 31)
        );
        assert_eq!(config.logging.min_severity, Severity::Warn);
    }

    #[test]
    fn test_close_date_relative_to_today() {
        let defaults = OpportunityDefaults::default();
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            defaults.close_date_from(today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        );
    }

    #[test]
    fn test_fixed_close_date_wins() {
        let fixed = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
        let defaults = OpportunityDefaults {
            close_date: Some(fixed),
            ..OpportunityDefaults::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(defaults.close_date_from(today).unwrap(), fixed);
    }

    #[test]
    fn test_close_in_days_out_of_range_rejected() {
        let err = DmlConfig::from_json_str(r#"{"opportunity": {"close_in_days": 100000000}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            DmlConfig::from_json_str(r#"{"opportunity": {"close_in_days": -1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config =
            DmlConfig::from_json_str(r#"{"opportunity": {"close_in_days": 36500}}"#).unwrap();
        assert_eq!(config.opportunity.close_in_days, 36_500);
    }

    #[test]
    fn test_close_date_overflow_is_an_error() {
        let defaults = OpportunityDefaults {
            close_in_days: i64::MAX,
            ..OpportunityDefaults::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert!(matches!(
            defaults.close_date_from(today),
            Err(ConfigError::Invalid(_))
        ));

        let near_end = OpportunityDefaults {
            close_in_days: 36_500,
            ..OpportunityDefaults::default()
        };
        assert!(near_end.close_date_from(NaiveDate::MAX).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = DmlConfig::from_json_str(r#"{"lead": {"max_batch": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = DmlConfig::from_json_str(r#"{"case": {"open_status": "Closed"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = DmlConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"lead": {{"company": "Globex"}}}}"#).unwrap();

        let config = DmlConfig::load(file.path()).unwrap();
        assert_eq!(config.lead.company, "Globex");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DmlConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
