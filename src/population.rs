use crate::errors::SeriesError;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// 2018 population estimates, keyed by postal code.
const US_2018: &[(&str, u64)] = &[
    ("US", 327_167_434),
    ("AL", 4_887_871),
    ("AK", 737_438),
    ("AZ", 7_171_646),
    ("AR", 3_013_825),
    ("CA", 39_557_045),
    ("CO", 5_695_564),
    ("CT", 3_572_665),
    ("DE", 967_171),
    ("DC", 702_455),
    ("FL", 21_299_325),
    ("GA", 10_519_475),
    ("HI", 1_420_491),
    ("ID", 1_754_208),
    ("IL", 12_741_080),
    ("IN", 6_691_878),
    ("IA", 3_156_145),
    ("KS", 2_911_505),
    ("KY", 4_468_402),
    ("LA", 4_659_978),
    ("ME", 1_338_404),
    ("MD", 6_042_718),
    ("MA", 6_902_149),
    ("MI", 9_995_915),
    ("MN", 5_611_179),
    ("MS", 2_986_530),
    ("MO", 6_126_452),
    ("MT", 1_062_305),
    ("NE", 1_929_268),
    ("NV", 3_034_392),
    ("NH", 1_356_458),
    ("NJ", 8_908_520),
    ("NM", 2_095_428),
    ("NY", 19_542_209),
    ("NC", 10_383_620),
    ("ND", 760_077),
    ("OH", 11_689_442),
    ("OK", 3_943_079),
    ("OR", 4_190_713),
    ("PA", 12_807_060),
    ("RI", 1_057_315),
    ("SC", 5_084_127),
    ("SD", 882_235),
    ("TN", 6_770_010),
    ("TX", 28_701_845),
    ("UT", 3_161_105),
    ("VT", 626_299),
    ("VA", 8_517_685),
    ("WA", 7_535_591),
    ("WV", 1_805_832),
    ("WI", 5_813_568),
    ("WY", 577_737),
];

/// Region code to head count, for per-capita columns.
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    regions: HashMap<String, u64>,
}

impl PopulationTable {
    pub fn us_2018() -> Self {
        Self {
            regions: US_2018
                .iter()
                .map(|(code, population)| (code.to_string(), *population))
                .collect(),
        }
    }

    /// Loads a population CSV such as `states.csv`.
    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        Self::from_reader(File::open(path)?)
    }

    /// Reads CSV with a header row. The first column is the region code and
    /// the population comes from the first header mentioning "population",
    /// or the second column when none does. Rows without a usable count are
    /// skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let column = reader
            .headers()?
            .iter()
            .position(|header| header.to_ascii_lowercase().contains("population"))
            .unwrap_or(1);

        let mut regions = HashMap::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let code = record.get(0).unwrap_or_default();
            let count = record
                .get(column)
                .map(|value| value.replace([',', '_'], ""))
                .and_then(|value| value.parse::<u64>().ok());
            match count {
                Some(count) if !code.is_empty() => {
                    regions.insert(code.to_ascii_uppercase(), count);
                }
                _ => warn!(line = idx + 2, "skipping population row"),
            }
        }
        Ok(Self { regions })
    }

    /// Case-insensitive lookup.
    pub fn get(&self, region: &str) -> Result<u64, SeriesError> {
        self.regions
            .get(&region.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| SeriesError::UnknownRegion(region.to_string()))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_covers_states_dc_and_nation() {
        let table = PopulationTable::us_2018();
        assert_eq!(table.len(), 52);
        assert_eq!(table.get("tx").unwrap(), 28_701_845);
        assert!(table.get("US").is_ok());
    }

    #[test]
    fn csv_reads_the_population_column() {
        let text = "state,name,2018 Population\n\
                    TX,Texas,\"28,701,845\"\n\
                    ny, New York , 200 \n\
                    broken\n";
        let table = PopulationTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("tx").unwrap(), 28_701_845);
        assert_eq!(table.get("NY").unwrap(), 200);
    }

    #[test]
    fn csv_without_population_header_uses_second_column() {
        let table = PopulationTable::from_reader("code,count\nVT,626299\n".as_bytes()).unwrap();
        assert_eq!(table.get("vt").unwrap(), 626_299);
    }

    #[test]
    fn missing_csv_file_is_an_error() {
        assert!(PopulationTable::from_path(Path::new("/nonexistent/states.csv")).is_err());
    }

    #[test]
    fn unknown_region_is_an_error() {
        let err = PopulationTable::us_2018().get("zz").unwrap_err();
        assert_eq!(err, SeriesError::UnknownRegion("zz".into()));
    }
}
