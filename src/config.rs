use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::pincode::Pincodes;
use crate::slots::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

const DEFAULT_DATE: &str = "30-07-2021";
const DEFAULT_PINCODES: &str = "[530068, 560004, 560034]";

/// Runtime settings for a slot query, read from the environment.
///
/// | Variable       | Default                     |
/// |----------------|-----------------------------|
/// | `DATE`         | `30-07-2021`                |
/// | `PINCODES`     | `[530068, 560004, 560034]`  |
/// | `API_BASE_URL` | `https://cdn-api.co-vin.in` |
/// | `TIMEOUT_SECS` | `5`                         |
/// | `CONCURRENCY`  | `1`                         |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Date to query, in the `DD-MM-YYYY` form the API expects
    pub date: String,
    pub pincodes: Pincodes,
    pub base_url: String,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup, falling back to
    /// defaults for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let date = var("DATE").unwrap_or_else(|| DEFAULT_DATE.to_string());

        let raw_pincodes = var("PINCODES").unwrap_or_else(|| DEFAULT_PINCODES.to_string());
        let pincodes = Pincodes::from_json(&raw_pincodes).map_err(|e| invalid("PINCODES", e))?;

        let base_url = var("API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match var("TIMEOUT_SECS") {
            Some(raw) => {
                let secs: f64 = raw.trim().parse().map_err(|e| invalid("TIMEOUT_SECS", e))?;
                Duration::try_from_secs_f64(secs)
                    .ok()
                    .filter(|d| !d.is_zero())
                    .ok_or_else(|| invalid("TIMEOUT_SECS", "must be a positive number of seconds"))?
            }
            None => DEFAULT_TIMEOUT,
        };

        let concurrency = match var("CONCURRENCY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => return Err(invalid("CONCURRENCY", "must be at least 1")),
                Ok(n) => n,
                Err(e) => return Err(invalid("CONCURRENCY", e)),
            },
            None => 1,
        };

        Ok(Self {
            date,
            pincodes,
            base_url,
            timeout,
            concurrency,
        })
    }
}

fn invalid(name: &str, reason: impl ToString) -> AppError {
    AppError::InvalidEnvVar {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.date, "30-07-2021");
        assert_eq!(config.pincodes, Pincodes::from([530068, 560004, 560034]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("DATE", "01-08-2021"),
            ("PINCODES", "560004"),
            ("API_BASE_URL", "http://127.0.0.1:8080"),
            ("TIMEOUT_SECS", "0.5"),
            ("CONCURRENCY", "4"),
        ])
        .unwrap();
        assert_eq!(config.date, "01-08-2021");
        assert_eq!(config.pincodes, Pincodes::from(560004));
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("DATE", "  "), ("PINCODES", "")]).unwrap();
        assert_eq!(config.date, "30-07-2021");
        assert_eq!(config.pincodes.len(), 3);
    }

    #[test]
    fn rejects_bad_values() {
        for vars in [
            [("PINCODES", "[530068,")],
            [("PINCODES", "[]")],
            [("TIMEOUT_SECS", "soon")],
            [("TIMEOUT_SECS", "0")],
            [("TIMEOUT_SECS", "-3")],
            [("CONCURRENCY", "0")],
            [("CONCURRENCY", "many")],
        ] {
            assert!(
                matches!(config(&vars), Err(AppError::InvalidEnvVar { .. })),
                "{vars:?} should be rejected"
            );
        }
    }
}
