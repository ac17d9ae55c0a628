use std::{fmt, fs::File, io::Read, path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use serde::{de, Deserialize, Deserializer};
use tracing::{debug, info};
use url::{ParseError, Url};

pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/labidimedaziz/renderboxing/main/working_data.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }

    pub fn from_code(code: &str) -> Option<Sex> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            _ => None,
        }
    }

    /// Selector value to sex; anything that is not `M` reads as female.
    pub fn from_selector(value: &str) -> Sex {
        Sex::from_code(value).unwrap_or(Sex::Female)
    }
}

/// One titleholder row of the dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoxerRecord {
    #[serde(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "Weight_class")]
    pub weight_class: String,
    #[serde(rename = "Height_cm")]
    pub height_cm: Option<f64>,
    #[serde(rename = "Reach_cm")]
    pub reach_cm: Option<f64>,
    #[serde(rename = "Wins", deserialize_with = "whole_count")]
    pub wins: Option<u32>,
    #[serde(rename = "Wins by KO", deserialize_with = "whole_count")]
    pub wins_by_ko: Option<u32>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Nationality")]
    pub nationality: Option<String>,
    #[serde(rename = "Sign")]
    pub sign: Option<String>,
}

impl BoxerRecord {
    /// Share of wins that ended by knockout, `0.0` for a boxer without wins.
    /// `None` when either count is missing.
    pub fn ko_percentage(&self) -> Option<f64> {
        let (wins, wins_by_ko) = (self.wins?, self.wins_by_ko?);
        if wins == 0 {
            return Some(0.0);
        }
        Some(f64::from(wins_by_ko) / f64::from(wins))
    }

    /// `None` for a row without a weight class.
    pub fn sex_weight_class(&self) -> Option<String> {
        if self.weight_class.is_empty() {
            return None;
        }
        Some(format!("{} - {}", self.sex.code(), self.weight_class))
    }
}

// Dataframe exports write integer columns holding blanks as floats ("25.0").
fn whole_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 || raw > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!(
            "expected a non-negative whole number, found {}",
            raw
        )));
    }
    Ok(Some(raw as u32))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Remote(Url),
    Local(PathBuf),
}

impl FromStr for DataSource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.starts_with("http://") || s.starts_with("https://") {
            true => Ok(DataSource::Remote(Url::from_str(s)?)),
            false => Ok(DataSource::Local(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{}", url),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads the whole dataset. Any fetch or decode failure aborts the load.
pub fn load(source: &DataSource) -> Result<Vec<BoxerRecord>> {
    info!(%source, "loading boxer dataset");
    let reader: Box<dyn Read> = match source {
        DataSource::Remote(url) => fetch(url)?,
        DataSource::Local(path) => Box::new(
            File::open(path).with_context(|| format!("unable to open {}", path.display()))?,
        ),
    };
    let records = parse(reader).with_context(|| format!("malformed dataset at {}", source))?;
    info!(rows = records.len(), "boxer dataset loaded");
    Ok(records)
}

fn fetch(url: &Url) -> Result<Box<dyn Read>> {
    let response = ureq::request_url("GET", url)
        .call()
        .with_context(|| format!("unable to fetch {}", url))?;
    debug!(status = response.status(), "dataset response received");
    Ok(Box::new(response.into_reader()))
}

pub fn parse<R: Read>(reader: R) -> Result<Vec<BoxerRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("unable to read csv header")?
        .clone();

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();
    while csv_reader.read_record(&mut row)? {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let record: BoxerRecord = row
            .deserialize(Some(&headers))
            .with_context(|| format!("invalid row on line {}", line))?;
        if let (Some(wins), Some(wins_by_ko)) = (record.wins, record.wins_by_ko) {
            if wins_by_ko > wins {
                bail!(
                    "invalid row on line {}: {} wins by KO exceed {} wins",
                    line,
                    wins_by_ko,
                    wins
                );
            }
        }
        records.push(record);
    }
    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{record, sample_records};
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_sample_with_blanks_and_float_counts() {
        let records = sample_records();
        assert_eq!(records.len(), 15);

        let marshall = &records[8];
        assert_eq!(marshall.height_cm, None);
        assert_eq!(marshall.reach_cm, None);

        let gassiev = &records[10];
        assert_eq!((gassiev.wins, gassiev.wins_by_ko), (Some(31), Some(23)));

        let ulysses = &records[14];
        assert_eq!(ulysses.country, None);
        assert_eq!(ulysses.nationality.as_deref(), Some("Cuban"));
        assert_eq!(ulysses.sign.as_deref(), Some("Libra"));
    }

    #[test]
    fn ko_percentage_is_zero_without_wins() {
        let records = sample_records();
        assert_eq!(records[9].wins, Some(0));
        assert_eq!(records[9].ko_percentage(), Some(0.0));
        assert_eq!(records[1].ko_percentage(), Some(44.0 / 50.0));
    }

    #[test]
    fn sex_weight_class_joins_code_and_class() {
        let flyweight = record(Sex::Female, "flyweight", 3, 1);
        assert_eq!(flyweight.sex_weight_class().as_deref(), Some("F - flyweight"));

        let unclassed = record(Sex::Male, "", 3, 1);
        assert_eq!(unclassed.sex_weight_class(), None);
    }

    #[test]
    fn blank_counts_are_missing_not_malformed() {
        let csv = "Sex,Weight_class,Height_cm,Reach_cm,Wins,Wins by KO,Country,Nationality,Sign\n\
                   M,heavyweight,190,200,,,Cuba,Cuban,Leo\n\
                   M,heavyweight,185,190,12.0,,Cuba,Cuban,Leo\n";
        let records = parse(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].wins, records[0].wins_by_ko), (None, None));
        assert_eq!(records[0].ko_percentage(), None);
        assert_eq!(records[1].wins, Some(12));
        assert_eq!(records[1].ko_percentage(), None);
        assert_eq!(records[0].height_cm, Some(190.0));
    }

    #[test]
    fn rejects_more_knockouts_than_wins() {
        let csv = "Sex,Weight_class,Height_cm,Reach_cm,Wins,Wins by KO,Country,Nationality,Sign\n\
                   M,heavyweight,190,200,3,4,Cuba,Cuban,Leo\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn rejects_fractional_and_missing_counts() {
        let fractional = "Sex,Weight_class,Wins,Wins by KO\nM,heavyweight,3.5,1\n";
        assert!(parse(fractional.as_bytes()).is_err());

        let missing = "Sex,Weight_class,Wins\nM,heavyweight,3\n";
        assert!(parse(missing.as_bytes()).is_err());
    }

    #[test]
    fn rejects_unknown_sex_code() {
        let csv = "Sex,Weight_class,Wins,Wins by KO\nX,heavyweight,3,1\n";
        assert!(parse(csv.as_bytes()).is_err());
    }

    #[test]
    fn selector_falls_back_to_female() {
        assert_eq!(Sex::from_selector("M"), Sex::Male);
        assert_eq!(Sex::from_selector("F"), Sex::Female);
        assert_eq!(Sex::from_selector("x"), Sex::Female);
        assert_eq!(Sex::from_selector(""), Sex::Female);
    }

    #[test]
    fn data_source_from_str() {
        assert_eq!(
            DataSource::from_str("data/working_data.csv").unwrap(),
            DataSource::Local(PathBuf::from("data/working_data.csv"))
        );
        assert!(matches!(
            DataSource::from_str("https://example.com/data.csv").unwrap(),
            DataSource::Remote(_)
        ));
        assert!(DataSource::from_str("https://").is_err());
        assert_eq!(
            DataSource::from_str(DEFAULT_SOURCE).unwrap().to_string(),
            DEFAULT_SOURCE
        );
    }

    #[test]
    fn load_reads_local_file() {
        let path = std::env::temp_dir().join(format!(
            "boxing-analytics-{}-sample.csv",
            std::process::id()
        ));
        std::fs::write(&path, super::fixtures::SAMPLE_CSV).unwrap();
        let records = load(&DataSource::Local(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(records.len(), 15);
    }

    #[test]
    fn load_fails_when_remote_is_unreachable() {
        let source = DataSource::from_str("http://127.0.0.1:1/working_data.csv").unwrap();
        let err = load(&source).unwrap_err();
        assert!(format!("{:#}", err).contains("unable to fetch"));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let source = DataSource::Local(PathBuf::from("/definitely/not/here.csv"));
        let err = load(&source).unwrap_err();
        assert!(err.to_string().contains("unable to open"));
    }

    proptest! {
        #[test]
        fn ko_percentage_stays_in_unit_interval(wins in 0u32..500, share in 0.0f64..=1.0) {
            let wins_by_ko = (f64::from(wins) * share).floor() as u32;
            let boxer = record(Sex::Male, "lightweight", wins, wins_by_ko);
            let ko = boxer.ko_percentage().unwrap();
            prop_assert!((0.0..=1.0).contains(&ko));
            if wins == 0 {
                prop_assert_eq!(ko, 0.0);
            } else {
                prop_assert_eq!(ko, f64::from(wins_by_ko) / f64::from(wins));
            }
        }
    }
}
