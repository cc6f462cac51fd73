//! Static chart registry.
//!
//! Every chart is a `ChartId` variant; `ChartId::definition` maps it to its
//! label and series list. A `Catalog` is the ordered menu a source offers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleHint {
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub style: StyleHint,
    pub axis: Axis,
    /// Drop dates whose value is missing instead of reporting them as gaps.
    pub skip_missing: bool,
    /// Plot magnitudes; some feeds report corrections as negative counts.
    pub absolute: bool,
}

impl SeriesSpec {
    const fn line(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            style: StyleHint::Line,
            axis: Axis::Primary,
            skip_missing: false,
            absolute: false,
        }
    }

    const fn area(name: &'static str, label: &'static str) -> Self {
        Self {
            style: StyleHint::Area,
            ..Self::line(name, label)
        }
    }

    const fn secondary(self) -> Self {
        Self {
            axis: Axis::Secondary,
            ..self
        }
    }

    const fn dense(self) -> Self {
        Self {
            skip_missing: true,
            ..self
        }
    }

    const fn absolute(self) -> Self {
        Self {
            absolute: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartDefinition {
    pub id: ChartId,
    pub label: &'static str,
    pub series: &'static [SeriesSpec],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    ReportedCases,
    Mortality,
    TestsCumulative,
    TestsDaily,
    CasesVsPositiveTests,
    TestPositivity,
    Recoveries,
    StillIll,
    Hospitalizations,
    IcuCensus,
    VentilatorCensus,
    VentilatorAvailability,
    StaffedBedAvailability,
    Quarantine,
    PositiveResults,
    Deaths,
    PositivePer100k,
    DeathsPer100k,
    HospitalizedCurrently,
    IcuCurrently,
    VentilatorCurrently,
    RecoveredPatients,
    TestsPerformed,
    TrackingPositivity,
}

impl ChartId {
    pub const ALL: &'static [ChartId] = &[
        ChartId::ReportedCases,
        ChartId::Mortality,
        ChartId::TestsCumulative,
        ChartId::TestsDaily,
        ChartId::CasesVsPositiveTests,
        ChartId::TestPositivity,
        ChartId::Recoveries,
        ChartId::StillIll,
        ChartId::Hospitalizations,
        ChartId::IcuCensus,
        ChartId::VentilatorCensus,
        ChartId::VentilatorAvailability,
        ChartId::StaffedBedAvailability,
        ChartId::Quarantine,
        ChartId::PositiveResults,
        ChartId::Deaths,
        ChartId::PositivePer100k,
        ChartId::DeathsPer100k,
        ChartId::HospitalizedCurrently,
        ChartId::IcuCurrently,
        ChartId::VentilatorCurrently,
        ChartId::RecoveredPatients,
        ChartId::TestsPerformed,
        ChartId::TrackingPositivity,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            ChartId::ReportedCases => "reported-cases",
            ChartId::Mortality => "mortality",
            ChartId::TestsCumulative => "tests-cumulative",
            ChartId::TestsDaily => "tests-daily",
            ChartId::CasesVsPositiveTests => "cases-vs-positive-tests",
            ChartId::TestPositivity => "test-positivity",
            ChartId::Recoveries => "recoveries",
            ChartId::StillIll => "still-ill",
            ChartId::Hospitalizations => "hospitalizations",
            ChartId::IcuCensus => "icu-census",
            ChartId::VentilatorCensus => "ventilator-census",
            ChartId::VentilatorAvailability => "ventilator-availability",
            ChartId::StaffedBedAvailability => "staffed-bed-availability",
            ChartId::Quarantine => "quarantine",
            ChartId::PositiveResults => "positive-results",
            ChartId::Deaths => "deaths",
            ChartId::PositivePer100k => "positive-per-100k",
            ChartId::DeathsPer100k => "deaths-per-100k",
            ChartId::HospitalizedCurrently => "hospitalized-currently",
            ChartId::IcuCurrently => "icu-currently",
            ChartId::VentilatorCurrently => "ventilator-currently",
            ChartId::RecoveredPatients => "recovered-patients",
            ChartId::TestsPerformed => "tests-performed",
            ChartId::TrackingPositivity => "tracking-positivity",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.slug() == slug)
    }

    pub const fn definition(self) -> ChartDefinition {
        let (label, series) = match self {
            ChartId::ReportedCases => ("Reported Cases", REPORTED_CASES),
            ChartId::Mortality => ("Mortality Information", MORTALITY),
            ChartId::TestsCumulative => ("Cumulative Testing Information", TESTS_CUMULATIVE),
            ChartId::TestsDaily => ("Daily Testing Information", TESTS_DAILY),
            ChartId::CasesVsPositiveTests => (
                "Reported Cases and Daily Positive Tests",
                CASES_VS_POSITIVE_TESTS,
            ),
            ChartId::TestPositivity => ("Test Positivity", TEST_POSITIVITY),
            ChartId::Recoveries => ("Cumulative and Daily Changes in Recovery", RECOVERIES),
            ChartId::StillIll => ("Patients Who Are Still Ill", STILL_ILL),
            ChartId::Hospitalizations => (
                "Cumulative and Daily Hospitalization Information",
                HOSPITALIZATIONS,
            ),
            ChartId::IcuCensus => ("COVID ICU Patients", ICU_CENSUS),
            ChartId::VentilatorCensus => ("COVID Ventilator Patients", VENTILATOR_CENSUS),
            ChartId::VentilatorAvailability => ("Ventilator Availability", VENTILATOR_AVAILABILITY),
            ChartId::StaffedBedAvailability => (
                "Staffed Bed Availability Information",
                STAFFED_BED_AVAILABILITY,
            ),
            ChartId::Quarantine => ("Cumulative and Weekly Quarantine Information", QUARANTINE),
            ChartId::PositiveResults => ("Positive Results", POSITIVE_RESULTS),
            ChartId::Deaths => ("Deaths", DEATHS),
            ChartId::PositivePer100k => ("Positive Results per 100k", POSITIVE_PER_100K),
            ChartId::DeathsPer100k => ("Deaths per 100k", DEATHS_PER_100K),
            ChartId::HospitalizedCurrently => ("Hospitalizations", HOSPITALIZED_CURRENTLY),
            ChartId::IcuCurrently => ("ICU Patients", ICU_CURRENTLY),
            ChartId::VentilatorCurrently => ("Ventilator Patients", VENTILATOR_CURRENTLY),
            ChartId::RecoveredPatients => ("Recovered Patients", RECOVERED_PATIENTS),
            ChartId::TestsPerformed => ("Tests Performed", TESTS_PERFORMED),
            ChartId::TrackingPositivity => ("Test Positivity", TRACKING_POSITIVITY),
        };

        ChartDefinition {
            id: self,
            label,
            series,
        }
    }
}

const REPORTED_CASES: &[SeriesSpec] = &[
    SeriesSpec::line("ReportedCum", "Cumulative Reported Cases").secondary(),
    SeriesSpec::area("ReportedOn", "Daily Reported Cases"),
    SeriesSpec::line("Reported7dMA", "Daily Reported Cases 7d Moving Avg"),
];

const MORTALITY: &[SeriesSpec] = &[
    SeriesSpec::line("DeathsCum", "Cumulative Mortality").secondary(),
    SeriesSpec::area("Deceased", "Daily Mortality"),
    SeriesSpec::line("Deceased7dMA", "Daily Mortality 7d Moving Avg"),
];

const TESTS_CUMULATIVE: &[SeriesSpec] = &[
    SeriesSpec::area("BCLabTests", "Total Tests").dense(),
    SeriesSpec::area("BCTestNegative", "Negative Tests").dense(),
    SeriesSpec::area("BCTestPositive", "Positive Tests").dense(),
    SeriesSpec::area("BCTestInc", "Inconclusive Tests").dense(),
];

const TESTS_DAILY: &[SeriesSpec] = &[
    SeriesSpec::area("DBCLabTests", "Total Tests").dense(),
    SeriesSpec::area("DBCTestNegative", "Negative Tests").dense(),
    SeriesSpec::area("DBCTestPositive", "Positive Tests").dense().absolute(),
    SeriesSpec::area("DBCTestInc", "Inconclusive Tests").dense(),
];

const CASES_VS_POSITIVE_TESTS: &[SeriesSpec] = &[
    SeriesSpec::line("DBCTestPositive7dMA", "Daily Positive Tests 7d Moving Avg"),
    SeriesSpec::line("Reported7dMA", "Daily Reported Cases 7d Moving Avg"),
    SeriesSpec::area("DBCTestPositive", "Daily Positive Tests").dense().absolute(),
];

const TEST_POSITIVITY: &[SeriesSpec] = &[
    SeriesSpec::line("DBCTestPositivity7d", "Positive Test Rate 7d (%)"),
];

const RECOVERIES: &[SeriesSpec] = &[
    SeriesSpec::line("Recovered", "Cumulative Recoveries"),
    SeriesSpec::line("Recovered_Daily_Change", "Daily Change in Recoveries"),
];

const STILL_ILL: &[SeriesSpec] = &[
    SeriesSpec::line("StillIll", "Still Ill Patients"),
];

const HOSPITALIZATIONS: &[SeriesSpec] = &[
    SeriesSpec::line("Hospitalized", "Cumulative Hospitalizations").secondary(),
    SeriesSpec::area("Hospitalized_Daily", "Daily Hospitalizations"),
];

const ICU_CENSUS: &[SeriesSpec] = &[
    SeriesSpec::line("COVIDnICU", "Daily COVID ICU Census"),
];

const VENTILATOR_CENSUS: &[SeriesSpec] = &[
    SeriesSpec::line("COVIDonVent", "Daily COVID Ventilator Census"),
];

const VENTILATOR_AVAILABILITY: &[SeriesSpec] = &[
    SeriesSpec::area("TotalVents", "Total Ventilators"),
    SeriesSpec::area("AvailVent", "Available Ventilators"),
];

const STAFFED_BED_AVAILABILITY: &[SeriesSpec] = &[
    SeriesSpec::area("TotalStaffedBeds", "Total Staffed Beds"),
    SeriesSpec::area("AvailStaffedBeds", "Available Staffed Beds"),
];

const QUARANTINE: &[SeriesSpec] = &[
    SeriesSpec::line("EverQuar", "Cumulative Quarantine").dense(),
    SeriesSpec::line("WeekQuar", "Weekly Quarantine").dense(),
];

const POSITIVE_RESULTS: &[SeriesSpec] = &[
    SeriesSpec::line("positive", "Cumulative Positive Results").secondary(),
    SeriesSpec::area("positiveIncrease", "Daily Positive Tests"),
    SeriesSpec::line("positiveIncrease_7dMA", "Daily Positive Tests 7d Moving Avg"),
];

const DEATHS: &[SeriesSpec] = &[
    SeriesSpec::line("death", "Cumulative Deaths").secondary(),
    SeriesSpec::area("deathIncrease", "Daily Deaths"),
    SeriesSpec::line("deathIncrease_7dMA", "Daily Deaths 7d Moving Avg"),
];

const POSITIVE_PER_100K: &[SeriesSpec] = &[
    SeriesSpec::line("positive_per100k", "Cumulative Positive Results per 100k"),
];

const DEATHS_PER_100K: &[SeriesSpec] = &[
    SeriesSpec::line("death_per100k", "Cumulative Deaths per 100k"),
];

const HOSPITALIZED_CURRENTLY: &[SeriesSpec] = &[
    SeriesSpec::line("hospitalizedCurrently", "Current Hospitalizations"),
    SeriesSpec::line("hospitalizedCumulative", "Cumulative Hospitalizations").secondary(),
];

const ICU_CURRENTLY: &[SeriesSpec] = &[
    SeriesSpec::line("inIcuCurrently", "Current ICU Patients"),
    SeriesSpec::line("inIcuCumulative", "Cumulative ICU Patients").secondary(),
];

const VENTILATOR_CURRENTLY: &[SeriesSpec] = &[
    SeriesSpec::line("onVentilatorCurrently", "Current Ventilator Patients"),
    SeriesSpec::line("onVentilatorCumulative", "Cumulative Ventilator Patients").secondary(),
];

const RECOVERED_PATIENTS: &[SeriesSpec] = &[
    SeriesSpec::line("recovered", "Recovered Patients"),
];

const TESTS_PERFORMED: &[SeriesSpec] = &[
    SeriesSpec::line("totalTestResults", "Cumulative Tests Performed").secondary(),
    SeriesSpec::area("totalTestResultsIncrease", "Daily Tests Performed"),
];

const TRACKING_POSITIVITY: &[SeriesSpec] = &[
    SeriesSpec::line("positivity_7d", "Positive Test Rate 7d (%)"),
];

/// The menu one source offers: its charts and its overlay options, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    pub charts: &'static [ChartId],
    pub multiview: &'static [(&'static str, &'static str)],
}

impl Catalog {
    pub const MUNICIPAL: Catalog = Catalog {
        charts: &[
            ChartId::ReportedCases,
            ChartId::Mortality,
            ChartId::TestsCumulative,
            ChartId::TestsDaily,
            ChartId::CasesVsPositiveTests,
            ChartId::TestPositivity,
            ChartId::Recoveries,
            ChartId::StillIll,
            ChartId::Hospitalizations,
            ChartId::IcuCensus,
            ChartId::VentilatorCensus,
            ChartId::VentilatorAvailability,
            ChartId::StaffedBedAvailability,
            ChartId::Quarantine,
        ],
        multiview: &[
            ("Cumulative Reported Cases", "ReportedCum"),
            ("Daily Reported Cases", "ReportedOn"),
            ("Reported Cases 7d Moving Avg", "Reported7dMA"),
            ("Cumulative Mortality", "DeathsCum"),
            ("Daily Mortality", "Deceased"),
            ("Daily Mortality 7d Moving Avg", "Deceased7dMA"),
            ("Cumulative Recoveries", "Recovered"),
            ("Daily Change in Recoveries", "Recovered_Daily_Change"),
            ("Still Ill Patients", "StillIll"),
            ("Cumulative Hospitalizations", "Hospitalized"),
            ("Daily Hospitalizations", "Hospitalized_Daily"),
            ("Daily COVID ICU Census", "COVIDnICU"),
            ("Daily COVID Ventilator Census", "COVIDonVent"),
            ("Daily Positive Tests", "DBCTestPositive"),
            ("Daily Positive Tests 7d Moving Avg", "DBCTestPositive7dMA"),
        ],
    };

    pub const TRACKING: Catalog = Catalog {
        charts: &[
            ChartId::PositiveResults,
            ChartId::Deaths,
            ChartId::PositivePer100k,
            ChartId::DeathsPer100k,
            ChartId::HospitalizedCurrently,
            ChartId::IcuCurrently,
            ChartId::VentilatorCurrently,
            ChartId::RecoveredPatients,
            ChartId::TestsPerformed,
            ChartId::TrackingPositivity,
        ],
        multiview: &[
            ("Cumulative Positive Results", "positive"),
            ("Cumulative Positive Results 7d Moving Avg", "positive_7dMA"),
            ("Daily Positive Tests", "positiveIncrease"),
            ("Cumulative Deaths", "death"),
            ("Cumulative Deaths 7d Moving Avg", "death_7dMA"),
            ("Daily Deaths", "deathIncrease"),
            ("Current Hospitalizations", "hospitalizedCurrently"),
            ("Daily Hospitalizations", "hospitalizedIncrease"),
            ("Cumulative Hospitalizations", "hospitalizedCumulative"),
            ("Current ICU Patients", "inIcuCurrently"),
            ("Cumulative ICU Patients", "inIcuCumulative"),
            ("Current Ventilator Patients", "onVentilatorCurrently"),
            ("Cumulative Ventilator Patients", "onVentilatorCumulative"),
            ("Recovered Patients", "recovered"),
            ("Daily Tests Performed", "totalTestResultsIncrease"),
            ("Cumulative Tests Performed", "totalTestResults"),
        ],
    };

    /// Looks up a chart slug, but only among the charts this catalog offers.
    pub fn find(&self, slug: &str) -> Option<ChartDefinition> {
        ChartId::from_slug(slug)
            .filter(|id| self.charts.contains(id))
            .map(ChartId::definition)
    }

    pub fn multiview_label(&self, series: &str) -> Option<&'static str> {
        self.multiview
            .iter()
            .find(|(_, name)| *name == series)
            .map(|(label, _)| *label)
    }
}
