use crate::domain::model::{Observation, Site};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Mean of the present values; `None` when there are none.
pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Two decimals, as the summary table is displayed.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn unique_count<'a>(values: impl IntoIterator<Item = &'a str>) -> usize {
    values.into_iter().collect::<HashSet<_>>().len()
}

/// Headline numbers above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_observations: usize,
    pub unique_species: usize,
    pub avg_biomass: Option<f64>,
    pub total_sites: usize,
}

impl Metrics {
    pub fn compute(observations: &[&Observation]) -> Self {
        Self {
            total_observations: observations.len(),
            unique_species: unique_count(observations.iter().map(|o| o.species.as_str())),
            avg_biomass: mean(observations.iter().map(|o| o.biomass)),
            total_sites: unique_count(observations.iter().map(|o| o.site_name.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrophicDiversity {
    pub trophic: String,
    pub species: usize,
}

/// Distinct species per trophic level, ordered by level.
pub fn trophic_diversity(observations: &[&Observation]) -> Vec<TrophicDiversity> {
    let mut groups: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for obs in observations {
        groups
            .entry(obs.trophic.as_str())
            .or_default()
            .insert(obs.species.as_str());
    }
    groups
        .into_iter()
        .map(|(trophic, species)| TrophicDiversity {
            trophic: trophic.to_string(),
            species: species.len(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalPoint {
    pub year: i64,
    pub month: i64,
    /// First day of the month, when year/month form a valid date.
    pub date: Option<NaiveDate>,
    pub mean_biomass: Option<f64>,
    pub mean_density: Option<f64>,
}

/// Mean biomass and density per (year, month), chronological.
pub fn temporal_trends(observations: &[&Observation]) -> Vec<TemporalPoint> {
    let mut groups: BTreeMap<(i64, i64), Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        groups.entry((obs.year, obs.month)).or_default().push(obs);
    }
    groups
        .into_iter()
        .map(|((year, month), rows)| TemporalPoint {
            year,
            month,
            date: first_of_month(year, month),
            mean_biomass: mean(rows.iter().map(|o| o.biomass)),
            mean_density: mean(rows.iter().map(|o| o.density)),
        })
        .collect()
}

fn first_of_month(year: i64, month: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// A site joined with the observations recorded there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteBiomass {
    pub sea_site_id: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "mpa/control")]
    pub protection: String,
    pub mpa: Option<String>,
    pub visibility: Option<f64>,
    pub bleaching: Option<String>,
    pub mean_biomass: Option<f64>,
    pub mean_density: Option<f64>,
}

/// Inner join of `sites` with per-site means of `observations` on
/// `sea_site_id`. Sites without observations are left out; site order is kept.
pub fn site_biomass(sites: &[Site], observations: &[&Observation]) -> Vec<SiteBiomass> {
    let mut groups: HashMap<&str, Vec<&Observation>> = HashMap::new();
    for obs in observations {
        groups.entry(obs.sea_site_id.as_str()).or_default().push(obs);
    }

    sites
        .iter()
        .filter_map(|site| {
            let rows = groups.get(site.sea_site_id.as_str())?;
            Some(SiteBiomass {
                sea_site_id: site.sea_site_id.clone(),
                site_name: site.site_name.clone(),
                latitude: site.latitude,
                longitude: site.longitude,
                protection: site.protection.clone(),
                mpa: site.mpa.clone(),
                visibility: site.visibility,
                bleaching: site.bleaching.clone(),
                mean_biomass: mean(rows.iter().map(|o| o.biomass)),
                mean_density: mean(rows.iter().map(|o| o.density)),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub family: String,
    pub trophic: String,
    #[serde(rename = "control/mpa")]
    pub protection: String,
    pub species: usize,
    pub mean_biomass: Option<f64>,
    pub mean_density: Option<f64>,
    pub mean_size: Option<f64>,
}

/// Grouped by (family, trophic, protection), sorted by that key.
pub fn summary_table(observations: &[&Observation]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(&str, &str, &str), Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        groups
            .entry((obs.family.as_str(), obs.trophic.as_str(), obs.protection.as_str()))
            .or_default()
            .push(obs);
    }
    groups
        .into_iter()
        .map(|((family, trophic, protection), rows)| SummaryRow {
            family: family.to_string(),
            trophic: trophic.to_string(),
            protection: protection.to_string(),
            species: unique_count(rows.iter().map(|o| o.species.as_str())),
            mean_biomass: mean(rows.iter().map(|o| o.biomass)).map(round2),
            mean_density: mean(rows.iter().map(|o| o.density)).map(round2),
            mean_size: mean(rows.iter().map(|o| Some(o.size_cm as f64))).map(round2),
        })
        .collect()
}

/// Five-number summary of biomass for one protection status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomassBox {
    #[serde(rename = "control/mpa")]
    pub protection: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

/// Biomass spread per protection status, sorted by status. Missing biomass
/// is skipped and a status with no values at all is left out.
pub fn biomass_by_protection(observations: &[&Observation]) -> Vec<BiomassBox> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for obs in observations {
        if let Some(biomass) = obs.biomass {
            groups.entry(obs.protection.as_str()).or_default().push(biomass);
        }
    }
    groups
        .into_iter()
        .map(|(protection, mut values)| {
            values.sort_by(|a, b| a.total_cmp(b));
            BiomassBox {
                protection: protection.to_string(),
                count: values.len(),
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect()
}

pub const SIZE_BINS: usize = 20;

/// One histogram bar: `[start, end)` in cm, the last bar closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBin {
    pub start: f64,
    pub end: f64,
    pub counts: BTreeMap<String, usize>,
}

/// Fish size histogram with `SIZE_BINS` equal-width bars between the
/// smallest and largest size, counted per trophic level. Every bar lists
/// every trophic level present in `observations`, zero included.
pub fn size_distribution(observations: &[&Observation]) -> Vec<SizeBin> {
    let sizes = observations.iter().map(|o| o.size_cm as f64);
    let (min, max) = match (
        sizes.clone().reduce(f64::min),
        sizes.reduce(f64::max),
    ) {
        (Some(min), Some(max)) => (min, max),
        _ => return Vec::new(),
    };

    let width = if max > min {
        (max - min) / SIZE_BINS as f64
    } else {
        1.0
    };
    let levels: BTreeMap<String, usize> = observations
        .iter()
        .map(|o| (o.trophic.clone(), 0))
        .collect();

    let mut bins: Vec<SizeBin> = (0..SIZE_BINS)
        .map(|i| SizeBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            counts: levels.clone(),
        })
        .collect();

    for obs in observations {
        let index = (((obs.size_cm as f64 - min) / width).floor() as usize).min(SIZE_BINS - 1);
        if let Some(count) = bins[index].counts.get_mut(&obs.trophic) {
            *count += 1;
        }
    }
    bins
}
