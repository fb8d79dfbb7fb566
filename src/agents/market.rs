//! Market Intelligence Agent
//!
//! Serves mock market data for pharmaceuticals: market size, growth rates,
//! and the competitive landscape. In production this would connect to a
//! commercial market-data service; here it is a seeded table with a
//! synthetic fallback for unknown molecules.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::MoleculeSource;
use crate::types::Clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub market_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetrics {
    pub market_size: f64,
    pub growth: f64,
}

/// Market fragment returned for one molecule lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub molecule: String,
    pub market_size_usd: f64,
    pub market_size_units: f64,
    pub growth_rate: f64,
    pub therapeutic_area: String,
    pub competitors_count: usize,
    pub market_trend: String,
    pub therapeutic_sub_areas: Vec<String>,
    /// Competitor shares are illustrative and are not validated to sum to 1.
    pub top_competitors: Vec<Competitor>,
    pub regions: BTreeMap<String, RegionMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub data_source: String,
    pub query_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TherapeuticAreaTrend {
    pub area: String,
    pub total_market_size: f64,
    pub avg_growth_rate: f64,
    pub molecule_count: usize,
}

#[derive(Debug, Clone)]
struct StoredMarket {
    market_size_usd: f64,
    market_size_units: f64,
    growth_rate: f64,
    therapeutic_area: String,
    top_competitors: Vec<Competitor>,
    regions: BTreeMap<String, RegionMetrics>,
}

pub struct MarketAgent {
    // Vec keeps table insertion order, which is the tie-break for rankings.
    table: Vec<(String, StoredMarket)>,
    clock: Arc<dyn Clock>,
}

fn competitor(name: &str, market_share: f64) -> Competitor {
    Competitor {
        name: name.to_string(),
        market_share,
    }
}

fn regions(entries: &[(&str, f64, f64)]) -> BTreeMap<String, RegionMetrics> {
    entries
        .iter()
        .map(|(name, market_size, growth)| {
            (
                name.to_string(),
                RegionMetrics {
                    market_size: *market_size,
                    growth: *growth,
                },
            )
        })
        .collect()
}

impl MarketAgent {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Self::seed(),
            clock,
        }
    }

    fn seed() -> Vec<(String, StoredMarket)> {
        vec![
            (
                "aspirin".to_string(),
                StoredMarket {
                    market_size_usd: 2.1e9,
                    market_size_units: 5.3e9,
                    growth_rate: 0.03,
                    therapeutic_area: "Cardiovascular".to_string(),
                    top_competitors: vec![
                        competitor("Bayer Aspirin", 0.35),
                        competitor("Generic Aspirin", 0.50),
                        competitor("Ecotrin", 0.15),
                    ],
                    regions: regions(&[
                        ("North America", 1.1e9, 0.02),
                        ("Europe", 0.7e9, 0.01),
                        ("Asia", 0.3e9, 0.08),
                    ]),
                },
            ),
            (
                "metformin".to_string(),
                StoredMarket {
                    market_size_usd: 1.8e9,
                    market_size_units: 8.2e9,
                    growth_rate: 0.05,
                    therapeutic_area: "Endocrinology".to_string(),
                    top_competitors: vec![
                        competitor("Generic Metformin", 0.75),
                        competitor("Glucophage", 0.20),
                        competitor("Glumetza", 0.05),
                    ],
                    regions: regions(&[
                        ("North America", 0.9e9, 0.04),
                        ("Europe", 0.5e9, 0.03),
                        ("Asia", 0.4e9, 0.10),
                    ]),
                },
            ),
            (
                "doxycycline".to_string(),
                StoredMarket {
                    market_size_usd: 0.6e9,
                    market_size_units: 3.1e9,
                    growth_rate: 0.02,
                    therapeutic_area: "Anti-Infective".to_string(),
                    top_competitors: vec![
                        competitor("Generic Doxycycline", 0.85),
                        competitor("Vibramycin", 0.10),
                        competitor("Doryx", 0.05),
                    ],
                    regions: regions(&[
                        ("North America", 0.35e9, 0.01),
                        ("Europe", 0.15e9, 0.00),
                        ("Asia", 0.10e9, 0.05),
                    ]),
                },
            ),
        ]
    }

    fn market_trend(growth_rate: f64) -> &'static str {
        if growth_rate > 0.04 {
            "Upward"
        } else if growth_rate > 0.01 {
            "Stable"
        } else {
            "Downward"
        }
    }

    /// Query market data for a molecule. Unknown molecules get plausible
    /// generic data rather than an error.
    pub fn query_market_data(&self, molecule_name: &str) -> MarketData {
        let key = molecule_name.to_lowercase();
        let query_date = self.clock.now().to_rfc3339();

        if let Some((_, stored)) = self.table.iter().find(|(k, _)| *k == key) {
            MarketData {
                molecule: molecule_name.to_string(),
                market_size_usd: stored.market_size_usd,
                market_size_units: stored.market_size_units,
                growth_rate: stored.growth_rate,
                therapeutic_area: stored.therapeutic_area.clone(),
                competitors_count: stored.top_competitors.len(),
                market_trend: Self::market_trend(stored.growth_rate).to_string(),
                therapeutic_sub_areas: vec![
                    "Research Focus 1".to_string(),
                    "Research Focus 2".to_string(),
                    "Research Focus 3".to_string(),
                ],
                top_competitors: stored.top_competitors.clone(),
                regions: stored.regions.clone(),
                note: None,
                data_source: self.data_source().to_string(),
                query_date,
            }
        } else {
            MarketData {
                molecule: molecule_name.to_string(),
                market_size_usd: 5e8,
                market_size_units: 2.5e9,
                growth_rate: 0.04,
                therapeutic_area: "Unknown".to_string(),
                competitors_count: 3,
                market_trend: "Stable".to_string(),
                therapeutic_sub_areas: vec![
                    "Research Focus 1".to_string(),
                    "Research Focus 2".to_string(),
                ],
                top_competitors: vec![
                    competitor("Competitor A", 0.40),
                    competitor("Competitor B", 0.35),
                    competitor("Competitor C", 0.25),
                ],
                regions: regions(&[
                    ("North America", 0.3e9, 0.03),
                    ("Europe", 0.15e9, 0.02),
                    ("Asia", 0.05e9, 0.06),
                ]),
                note: Some("Generic data - molecule not in primary database".to_string()),
                data_source: self.data_source().to_string(),
                query_date,
            }
        }
    }

    /// Top therapeutic areas across the whole table, ranked by average growth.
    pub fn get_therapeutic_area_trends(&self) -> Vec<TherapeuticAreaTrend> {
        let mut areas: Vec<TherapeuticAreaTrend> = Vec::new();

        for (_, stored) in &self.table {
            match areas
                .iter_mut()
                .find(|a| a.area == stored.therapeutic_area)
            {
                Some(area) => {
                    area.total_market_size += stored.market_size_usd;
                    area.avg_growth_rate += stored.growth_rate;
                    area.molecule_count += 1;
                }
                None => areas.push(TherapeuticAreaTrend {
                    area: stored.therapeutic_area.clone(),
                    total_market_size: stored.market_size_usd,
                    avg_growth_rate: stored.growth_rate,
                    molecule_count: 1,
                }),
            }
        }

        for area in &mut areas {
            area.avg_growth_rate /= area.molecule_count as f64;
        }

        // Stable sort keeps table insertion order on ties.
        areas.sort_by(|a, b| b.avg_growth_rate.total_cmp(&a.avg_growth_rate));
        areas.truncate(5);
        areas
    }

    /// Regional market breakdown for one molecule.
    pub fn get_regional_analysis(&self, molecule_name: &str) -> BTreeMap<String, RegionMetrics> {
        let key = molecule_name.to_lowercase();
        match self.table.iter().find(|(k, _)| *k == key) {
            Some((_, stored)) => stored.regions.clone(),
            None => regions(&[
                ("North America", 0.3e9, 0.03),
                ("Europe", 0.15e9, 0.02),
                ("Asia", 0.05e9, 0.06),
            ]),
        }
    }
}

impl MoleculeSource for MarketAgent {
    type Fragment = MarketData;

    fn data_source(&self) -> &'static str {
        "Market Intelligence"
    }

    fn lookup(&self, molecule_name: &str) -> MarketData {
        self.query_market_data(molecule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixedClock;
    use chrono::{TimeZone, Utc};

    fn agent() -> MarketAgent {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        MarketAgent::new(Arc::new(clock))
    }

    #[test]
    fn known_molecule_returns_static_record() {
        let data = agent().query_market_data("aspirin");
        assert_eq!(data.market_size_usd, 2.1e9);
        assert_eq!(data.therapeutic_area, "Cardiovascular");
        assert_eq!(data.competitors_count, 3);
        assert_eq!(data.top_competitors[0].name, "Bayer Aspirin");
        assert!(data.note.is_none());
    }

    #[test]
    fn lookup_is_case_insensitive_but_echoes_input_name() {
        let data = agent().query_market_data("Aspirin");
        assert_eq!(data.molecule, "Aspirin");
        assert_eq!(data.market_size_usd, 2.1e9);
    }

    #[test]
    fn unknown_molecule_gets_synthetic_record() {
        let data = agent().query_market_data("unknown-xyz");
        assert_eq!(data.molecule, "unknown-xyz");
        assert_eq!(data.therapeutic_area, "Unknown");
        assert_eq!(data.market_size_usd, 5e8);
        assert!(data.note.is_some());
    }

    #[test]
    fn market_trend_buckets() {
        assert_eq!(MarketAgent::market_trend(0.05), "Upward");
        assert_eq!(MarketAgent::market_trend(0.03), "Stable");
        assert_eq!(MarketAgent::market_trend(0.01), "Downward");
    }

    #[test]
    fn area_trends_sorted_by_average_growth() {
        let trends = agent().get_therapeutic_area_trends();
        assert!(trends.len() <= 5);
        assert_eq!(trends[0].area, "Endocrinology");
        for pair in trends.windows(2) {
            assert!(pair[0].avg_growth_rate >= pair[1].avg_growth_rate);
        }
    }

    #[test]
    fn regional_analysis_falls_back_for_unknown() {
        let known = agent().get_regional_analysis("metformin");
        assert_eq!(known["Asia"].growth, 0.10);
        let unknown = agent().get_regional_analysis("novocompound");
        assert_eq!(unknown["North America"].market_size, 0.3e9);
    }

    #[test]
    fn query_date_comes_from_injected_clock() {
        let data = agent().query_market_data("aspirin");
        assert!(data.query_date.starts_with("2024-06-01"));
    }
}
