use crate::domain::model::Observation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Dashboard selections. `None` in any dimension means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub protection: Option<String>,
    pub year: Option<i64>,
    pub trophic: Option<String>,
    pub family: Option<String>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn protection(mut self, value: impl Into<String>) -> Self {
        self.protection = Some(value.into());
        self
    }

    pub fn year(mut self, value: i64) -> Self {
        self.year = Some(value);
        self
    }

    pub fn trophic(mut self, value: impl Into<String>) -> Self {
        self.trophic = Some(value.into());
        self
    }

    pub fn family(mut self, value: impl Into<String>) -> Self {
        self.family = Some(value.into());
        self
    }

    pub fn matches(&self, obs: &Observation) -> bool {
        self.protection.as_ref().map_or(true, |p| &obs.protection == p)
            && self.year.map_or(true, |y| obs.year == y)
            && self.trophic.as_ref().map_or(true, |t| &obs.trophic == t)
            && self.family.as_ref().map_or(true, |f| &obs.family == f)
    }

    pub fn apply<'a>(&self, observations: &'a [Observation]) -> Vec<&'a Observation> {
        observations.iter().filter(|o| self.matches(o)).collect()
    }
}

/// "all" (any case) or an empty selection means no filter on that dimension.
pub fn selection(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

/// The values each dropdown offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub protection: Vec<String>,
    pub years: Vec<i64>,
    pub trophic: Vec<String>,
    pub family: Vec<String>,
}

impl FilterOptions {
    /// Unique values in first-seen order; years ascending.
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut years: Vec<i64> = observations.iter().map(|o| o.year).collect();
        years.sort_unstable();
        years.dedup();

        Self {
            protection: unique_in_order(observations.iter().map(|o| o.protection.as_str())),
            years,
            trophic: unique_in_order(observations.iter().map(|o| o.trophic.as_str())),
            family: unique_in_order(observations.iter().map(|o| o.family.as_str())),
        }
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
