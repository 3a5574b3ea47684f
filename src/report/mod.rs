//! Read-only summaries over a curated dataset, one per dashboard panel.

pub mod aggregate;
pub mod filter;

pub use aggregate::{
    biomass_by_protection, site_biomass, size_distribution, summary_table, temporal_trends,
    trophic_diversity, BiomassBox, Metrics, SiteBiomass, SizeBin, SummaryRow, TemporalPoint,
    TrophicDiversity,
};
pub use filter::{selection, Filter, FilterOptions};

use crate::domain::model::{Dataset, Observation};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub filter: Filter,
    pub metrics: Metrics,
    pub biomass_by_protection: Vec<BiomassBox>,
    pub trophic_diversity: Vec<TrophicDiversity>,
    pub temporal_trends: Vec<TemporalPoint>,
    pub size_distribution: Vec<SizeBin>,
    pub sites: Vec<SiteBiomass>,
    pub summary: Vec<SummaryRow>,
}

impl Report {
    /// Every panel is computed from the same filtered rows; the dataset is not modified.
    pub fn build(dataset: &Dataset, filter: &Filter) -> Self {
        let filtered: Vec<&Observation> = filter.apply(&dataset.observations);
        tracing::debug!(
            "Filter {:?} kept {} of {} observations",
            filter,
            filtered.len(),
            dataset.observations.len()
        );

        Self {
            filter: filter.clone(),
            metrics: Metrics::compute(&filtered),
            biomass_by_protection: biomass_by_protection(&filtered),
            trophic_diversity: trophic_diversity(&filtered),
            temporal_trends: temporal_trends(&filtered),
            size_distribution: size_distribution(&filtered),
            sites: site_biomass(&dataset.sites, &filtered),
            summary: summary_table(&filtered),
        }
    }
}
