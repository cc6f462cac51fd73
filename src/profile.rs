use crate::catalog::Catalog;
use crate::derive::{DEFAULT_WINDOW, DerivedFieldSpec};
use crate::errors::SeriesError;
use crate::population::PopulationTable;
use crate::source::FeedFormat;
use crate::table::{DateField, DateFormat};
use chrono::NaiveDate;

pub const SAN_ANTONIO_URL: &str = "https://services.arcgis.com/g1fRTDLeMgspWrYp/arcgis/rest/services/vDateCOVID19_Tracker_Public/FeatureServer/0/query?where=1%3D1&outFields=*&outSR=4326&f=json";
const TRACKING_BASE_URL: &str = "https://covidtracking.com/api/v1";

/// Which upstream a dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    SanAntonio,
    UnitedStates,
    State(String),
}

impl SourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "san-antonio" | "sa" => Some(Self::SanAntonio),
            "us" => Some(Self::UnitedStates),
            other => {
                let code = other.strip_prefix("state:")?;
                (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
                    .then(|| Self::State(code.to_ascii_uppercase()))
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::SanAntonio => "san-antonio".to_string(),
            Self::UnitedStates => "us".to_string(),
            Self::State(code) => format!("state:{}", code.to_ascii_lowercase()),
        }
    }

    fn region(&self) -> Option<&str> {
        match self {
            Self::SanAntonio => None,
            Self::UnitedStates => Some("US"),
            Self::State(code) => Some(code.as_str()),
        }
    }
}

/// Everything needed to turn one upstream feed into a charted table.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub kind: SourceKind,
    pub url: String,
    pub format: FeedFormat,
    pub date_field: DateField,
    pub default_start: NaiveDate,
    pub derived: Vec<DerivedFieldSpec>,
    pub catalog: Catalog,
}

impl SourceProfile {
    pub fn for_kind(kind: SourceKind, populations: &PopulationTable) -> Result<Self, SeriesError> {
        match kind.region() {
            None => Ok(Self::san_antonio()),
            Some(region) => {
                let population = populations.get(region)? as f64;
                Ok(Self::tracking(kind, population))
            }
        }
    }

    fn san_antonio() -> Self {
        Self {
            kind: SourceKind::SanAntonio,
            url: SAN_ANTONIO_URL.to_string(),
            format: FeedFormat::FeatureCollection,
            date_field: DateField::new("Date", DateFormat::EpochMillis),
            default_start: ymd(2020, 3, 19),
            derived: vec![
                DerivedFieldSpec::daily_delta("Recovered", "Recovered_Daily_Change"),
                DerivedFieldSpec::daily_delta("Hospitalized", "Hospitalized_Daily"),
                DerivedFieldSpec::moving_average("ReportedOn", "Reported7dMA", DEFAULT_WINDOW),
                DerivedFieldSpec::moving_average("Deceased", "Deceased7dMA", DEFAULT_WINDOW),
                DerivedFieldSpec::moving_average(
                    "DBCTestPositive",
                    "DBCTestPositive7dMA",
                    DEFAULT_WINDOW,
                ),
                DerivedFieldSpec::percentage(
                    "DBCTestPositive",
                    "DBCLabTests",
                    "DBCTestPositivity7d",
                    DEFAULT_WINDOW,
                ),
            ],
            catalog: Catalog::MUNICIPAL,
        }
    }

    fn tracking(kind: SourceKind, population: f64) -> Self {
        let url = match &kind {
            SourceKind::State(code) => {
                format!("{TRACKING_BASE_URL}/states/{}/daily.json", code.to_ascii_lowercase())
            }
            _ => format!("{TRACKING_BASE_URL}/us/daily.json"),
        };

        Self {
            kind,
            url,
            format: FeedFormat::FlatArray,
            date_field: DateField::new("date", DateFormat::Compact),
            default_start: ymd(2020, 3, 1),
            derived: vec![
                DerivedFieldSpec::moving_average("positive", "positive_7dMA", DEFAULT_WINDOW),
                DerivedFieldSpec::moving_average("death", "death_7dMA", DEFAULT_WINDOW),
                DerivedFieldSpec::moving_average(
                    "positiveIncrease",
                    "positiveIncrease_7dMA",
                    DEFAULT_WINDOW,
                ),
                DerivedFieldSpec::moving_average(
                    "deathIncrease",
                    "deathIncrease_7dMA",
                    DEFAULT_WINDOW,
                ),
                DerivedFieldSpec::percentage(
                    "positiveIncrease",
                    "totalTestResultsIncrease",
                    "positivity_7d",
                    DEFAULT_WINDOW,
                ),
                DerivedFieldSpec::per_capita("positive", "positive_per100k", population),
                DerivedFieldSpec::per_capita("death", "death_per100k", population),
            ],
            catalog: Catalog::TRACKING,
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_names() {
        assert_eq!(SourceKind::parse("san-antonio"), Some(SourceKind::SanAntonio));
        assert_eq!(SourceKind::parse("US"), Some(SourceKind::UnitedStates));
        assert_eq!(
            SourceKind::parse("state:tx"),
            Some(SourceKind::State("TX".into()))
        );
        assert_eq!(SourceKind::parse("state:texas"), None);
        assert_eq!(SourceKind::parse("austin"), None);
    }

    #[test]
    fn state_profile_points_at_state_feed() {
        let profile =
            SourceProfile::for_kind(SourceKind::State("NY".into()), &PopulationTable::us_2018())
                .unwrap();
        assert!(profile.url.ends_with("/states/ny/daily.json"));
        assert_eq!(profile.format, FeedFormat::FlatArray);
        assert_eq!(profile.catalog, Catalog::TRACKING);
        assert!(profile.derived.iter().any(|s| s.output() == "death_per100k"));
    }

    #[test]
    fn unknown_state_fails_population_lookup() {
        let kind = SourceKind::State("ZZ".into());
        let err = SourceProfile::for_kind(kind, &PopulationTable::us_2018()).unwrap_err();
        assert_eq!(err, SeriesError::UnknownRegion("ZZ".into()));
    }

    #[test]
    fn san_antonio_profile_reads_epoch_dates() {
        let profile =
            SourceProfile::for_kind(SourceKind::SanAntonio, &PopulationTable::default()).unwrap();
        assert_eq!(profile.date_field.format, DateFormat::EpochMillis);
        assert_eq!(profile.default_start, ymd(2020, 3, 19));
        assert_eq!(profile.catalog, Catalog::MUNICIPAL);
    }
}
