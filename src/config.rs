use crate::errors::ConfigError;
use crate::population::PopulationTable;
use crate::profile::{SourceKind, SourceProfile};
use crate::repository::DEFAULT_RETRY_AFTER;
use crate::source::FeedLocation;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STALE_SECS: u64 = 3600;

/// One state in the side-by-side comparison.
#[derive(Debug, Clone)]
pub struct StateFeed {
    pub code: String,
    pub profile: SourceProfile,
    pub location: FeedLocation,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub profile: SourceProfile,
    pub location: FeedLocation,
    pub stale_after: Duration,
    pub retry_after: Duration,
    pub states: Vec<StateFeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => parse(&value, "PORT")?,
            None => DEFAULT_PORT,
        };

        let kind = match var("DASH_SOURCE") {
            Some(value) => {
                SourceKind::parse(&value).ok_or(ConfigError::UnknownSource(value))?
            }
            None => SourceKind::SanAntonio,
        };
        let populations = match var("DASH_POPULATION_PATH") {
            Some(path) => PopulationTable::from_path(Path::new(&path)).map_err(|err| {
                ConfigError::Population {
                    path,
                    reason: err.to_string(),
                }
            })?,
            None => PopulationTable::us_2018(),
        };

        let mut profile = SourceProfile::for_kind(kind, &populations)?;

        if let Some(value) = var("DASH_DEFAULT_START") {
            profile.default_start = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|_| ConfigError::InvalidValue {
                    name: "DASH_DEFAULT_START",
                    value,
                })?;
        }

        if let Some(url) = var("DASH_SOURCE_URL") {
            profile.url = url;
        }

        let location = match var("DASH_SOURCE_PATH") {
            Some(path) => FeedLocation::File(PathBuf::from(path)),
            None => FeedLocation::Http(profile.url.clone()),
        };

        let stale_secs = match var("DASH_STALE_SECS") {
            Some(value) => parse(&value, "DASH_STALE_SECS")?,
            None => DEFAULT_STALE_SECS,
        };

        let retry_after = match var("DASH_RETRY_SECS") {
            Some(value) => Duration::from_secs(parse(&value, "DASH_RETRY_SECS")?),
            None => DEFAULT_RETRY_AFTER,
        };

        let states = match var("DASH_STATES") {
            Some(list) => state_feeds(&list, var("DASH_STATES_DIR"), &populations)?,
            None => Vec::new(),
        };

        Ok(Self {
            port,
            profile,
            location,
            stale_after: Duration::from_secs(stale_secs),
            retry_after,
            states,
        })
    }
}

/// Parses `tx,ny,...`. With a directory, each state reads `<dir>/<code>.json`
/// instead of its tracking URL.
fn state_feeds(
    list: &str,
    dir: Option<String>,
    populations: &PopulationTable,
) -> Result<Vec<StateFeed>, ConfigError> {
    let mut feeds: Vec<StateFeed> = Vec::new();
    for code in list.split(',').map(str::trim).filter(|code| !code.is_empty()) {
        let kind = SourceKind::parse(&format!("state:{code}")).ok_or(ConfigError::InvalidValue {
            name: "DASH_STATES",
            value: code.to_string(),
        })?;
        let SourceKind::State(code) = &kind else {
            continue;
        };
        if feeds.iter().any(|feed| &feed.code == code) {
            continue;
        }

        let code = code.clone();
        let profile = SourceProfile::for_kind(kind, populations)?;
        let location = match &dir {
            Some(dir) => {
                FeedLocation::File(Path::new(dir).join(format!("{}.json", code.to_lowercase())))
            }
            None => FeedLocation::Http(profile.url.clone()),
        };
        feeds.push(StateFeed {
            code,
            profile,
            location,
        });
    }
    Ok(feeds)
}

fn parse<T: std::str::FromStr>(value: &str, name: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::derive::DerivedFieldSpec;
    use crate::errors::SeriesError;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_san_antonio_over_http() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.profile.kind, SourceKind::SanAntonio);
        assert_eq!(config.stale_after, Duration::from_secs(3600));
        assert!(matches!(config.location, FeedLocation::Http(ref url) if url.contains("arcgis")));
    }

    #[test]
    fn file_path_overrides_http() {
        let config = config(&[
            ("DASH_SOURCE", "state:tx"),
            ("DASH_SOURCE_PATH", "/tmp/tx.json"),
            ("DASH_STALE_SECS", "5"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.profile.catalog, Catalog::TRACKING);
        assert_eq!(config.location, FeedLocation::File(PathBuf::from("/tmp/tx.json")));
        assert_eq!(config.stale_after, Duration::from_secs(5));
    }

    #[test]
    fn default_start_can_be_overridden() {
        let config = config(&[("DASH_DEFAULT_START", "2020-06-01")]).unwrap();
        assert_eq!(
            config.profile.default_start,
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
        );
    }

    #[test]
    fn state_comparison_list_builds_one_feed_per_state() {
        let compared =
            config(&[("DASH_STATES", "tx, NY,tx"), ("DASH_STATES_DIR", "/data")]).unwrap();
        let codes: Vec<_> = compared.states.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, ["TX", "NY"]);
        assert_eq!(
            compared.states[1].location,
            FeedLocation::File(PathBuf::from("/data/ny.json"))
        );
        assert_eq!(compared.states[0].profile.catalog, Catalog::TRACKING);
        assert_eq!(compared.profile.kind, SourceKind::SanAntonio);

        let over_http = config(&[("DASH_STATES", "ca")]).unwrap();
        assert!(matches!(
            over_http.states[0].location,
            FeedLocation::Http(ref url) if url.ends_with("/states/ca/daily.json")
        ));
        assert!(matches!(
            config(&[("DASH_STATES", "tx,texas")]),
            Err(ConfigError::InvalidValue { name: "DASH_STATES", .. })
        ));
    }

    #[test]
    fn population_file_feeds_per_capita_columns() {
        let mut path = std::env::temp_dir();
        path.push(format!("covid_dash_states_{}.csv", std::process::id()));
        std::fs::write(&path, "state,2018 Population\nTX,1000\n").unwrap();

        let loaded = config(&[
            ("DASH_SOURCE", "state:tx"),
            ("DASH_POPULATION_PATH", path.to_str().unwrap()),
        ]);
        let missing = config(&[
            ("DASH_SOURCE", "state:ny"),
            ("DASH_POPULATION_PATH", path.to_str().unwrap()),
        ]);
        let _ = std::fs::remove_file(&path);

        let profile = loaded.unwrap().profile;
        let population = profile.derived.iter().find_map(|spec| match spec {
            DerivedFieldSpec::PerCapita { population, .. } => Some(*population),
            _ => None,
        });
        assert_eq!(population, Some(1000.0));
        assert!(matches!(
            missing,
            Err(ConfigError::Series(SeriesError::UnknownRegion(_)))
        ));
        assert!(matches!(
            config(&[("DASH_POPULATION_PATH", "/nonexistent/states.csv")]),
            Err(ConfigError::Population { .. })
        ));
    }

    #[test]
    fn retry_back_off_is_configurable() {
        assert_eq!(config(&[]).unwrap().retry_after, DEFAULT_RETRY_AFTER);
        let config = config(&[("DASH_RETRY_SECS", "5")]).unwrap();
        assert_eq!(config.retry_after, Duration::from_secs(5));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            config(&[("DASH_SOURCE", "atlantis")]),
            Err(ConfigError::UnknownSource(_))
        ));
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("DASH_SOURCE", "state:zz")]),
            Err(ConfigError::Series(_))
        ));
    }
}
