use indexmap::IndexMap;
use tracing::debug;

use crate::dataset::BoxerRecord;

pub const TOP_NATIONALITIES: usize = 10;

/// Category label paired with its aggregate, highest value first.
pub type Ranked<T> = Vec<(String, T)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Stats {
    pub fn compute(data: &[f64]) -> Option<Stats> {
        if data.is_empty() {
            return None;
        }
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = data.iter().sum();
        let mean = sum / data.len() as f64;

        let variance = data
            .iter()
            .map(|value| (mean - value).powf(2.))
            .sum::<f64>()
            / (data.len() as f64);

        Some(Stats {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Height and reach measurements with their summaries. Missing values are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Distributions {
    pub heights: Vec<f64>,
    pub reaches: Vec<f64>,
    pub height: Option<Stats>,
    pub reach: Option<Stats>,
}

impl Distributions {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a BoxerRecord>) -> Distributions {
        let mut heights = Vec::new();
        let mut reaches = Vec::new();
        for record in records {
            heights.extend(record.height_cm.filter(|h| h.is_finite()));
            reaches.extend(record.reach_cm.filter(|r| r.is_finite()));
        }
        Distributions {
            height: Stats::compute(&heights),
            reach: Stats::compute(&reaches),
            heights,
            reaches,
        }
    }
}

fn count_by<'a>(values: impl Iterator<Item = &'a str>) -> Ranked<usize> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
    ranked
}

/// Mean knockout share for every `sex - weight class` label present.
/// Rows without a weight class or without both counts are left out.
pub fn mean_ko_by_group(records: &[BoxerRecord]) -> Ranked<f64> {
    let mut groups: IndexMap<String, (f64, usize)> = IndexMap::new();
    for record in records {
        let (Some(group), Some(ko)) = (record.sex_weight_class(), record.ko_percentage()) else {
            continue;
        };
        let (sum, n) = groups.entry(group).or_insert((0.0, 0));
        *sum += ko;
        *n += 1;
    }
    let mut ranked: Ranked<f64> = groups
        .into_iter()
        .map(|(group, (sum, n))| (group, sum / n as f64))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    ranked
}

pub fn country_counts(records: &[BoxerRecord]) -> Ranked<usize> {
    count_by(records.iter().filter_map(|r| r.country.as_deref()))
}

pub fn sign_counts(records: &[BoxerRecord]) -> Ranked<usize> {
    count_by(records.iter().filter_map(|r| r.sign.as_deref()))
}

pub fn top_nationalities(records: &[BoxerRecord], n: usize) -> Ranked<usize> {
    let mut ranked = count_by(records.iter().filter_map(|r| r.nationality.as_deref()));
    ranked.truncate(n);
    ranked
}

/// Every static aggregate the dashboard shows, computed once.
#[derive(Debug, Clone, PartialEq)]
pub struct Views {
    pub ko_by_group: Ranked<f64>,
    pub countries: Ranked<usize>,
    pub signs: Ranked<usize>,
    pub nationalities: Ranked<usize>,
    pub distributions: Distributions,
}

impl Views {
    pub fn compute(records: &[BoxerRecord]) -> Views {
        let views = Views {
            ko_by_group: mean_ko_by_group(records),
            countries: country_counts(records),
            signs: sign_counts(records),
            nationalities: top_nationalities(records, TOP_NATIONALITIES),
            distributions: Distributions::of(records),
        };
        debug!(
            groups = views.ko_by_group.len(),
            countries = views.countries.len(),
            signs = views.signs.len(),
            nationalities = views.nationalities.len(),
            heights = views.distributions.heights.len(),
            reaches = views.distributions.reaches.len(),
            "aggregate views computed"
        );
        views
    }
}
