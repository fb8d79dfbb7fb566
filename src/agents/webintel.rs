//! Web Intelligence Agent
//!
//! Serves mock scientific-web data: publication lists per molecule and
//! trend/sentiment tables per therapeutic area.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::agents::MoleculeSource;
use crate::types::Clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub title: String,
    pub journal: String,
    pub year: i32,
    pub citations: u32,
    /// Relevance score in [0, 1].
    pub relevance: f64,
}

/// Web-intelligence fragment for one molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebIntelData {
    pub molecule: String,
    pub total_publications_found: usize,
    pub publications: Vec<PublicationRecord>,
    pub recent_publications_count: usize,
    /// Clamped to at most 0.95.
    pub innovation_index: f64,
    pub scientific_sentiment: String,
    pub data_source: String,
    pub query_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendData {
    pub keyword: String,
    pub trend: String,
    pub mentions_per_week: u32,
    pub sentiment: String,
    pub key_focus: Vec<String>,
    pub recent_publications: u32,
    pub media_coverage: String,
    pub data_source: String,
    pub query_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentAnalysis {
    pub topic: String,
    pub overall_sentiment: String,
    pub sentiment_breakdown: BTreeMap<String, u32>,
    pub confidence_score: f64,
    pub sample_positive_mentions: u32,
    pub sample_negative_mentions: u32,
    pub data_source: String,
    pub query_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaTrend {
    pub therapeutic_area: String,
    pub trend_direction: String,
    pub mentions_per_week: u32,
    pub sentiment: String,
    pub recent_publications: u32,
    pub key_focus_areas: Vec<String>,
    pub media_coverage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaInnovation {
    pub therapeutic_area: String,
    pub innovation_index: f64,
    pub publications_last_year: u32,
    pub web_mentions_per_week: u32,
    pub interpretation: String,
}

#[derive(Debug, Clone)]
struct StoredTrend {
    trend: String,
    mentions_per_week: u32,
    sentiment: String,
    key_focus: Vec<String>,
    recent_publications: u32,
    media_coverage: String,
}

pub struct WebIntelAgent {
    trends: Vec<(String, StoredTrend)>,
    publications: Vec<(String, Vec<PublicationRecord>)>,
    clock: Arc<dyn Clock>,
}

fn stored_trend(
    trend: &str,
    mentions_per_week: u32,
    sentiment: &str,
    key_focus: &[&str],
    recent_publications: u32,
    media_coverage: &str,
) -> StoredTrend {
    StoredTrend {
        trend: trend.to_string(),
        mentions_per_week,
        sentiment: sentiment.to_string(),
        key_focus: key_focus.iter().map(|s| s.to_string()).collect(),
        recent_publications,
        media_coverage: media_coverage.to_string(),
    }
}

fn publication(title: &str, journal: &str, year: i32, citations: u32, relevance: f64) -> PublicationRecord {
    PublicationRecord {
        title: title.to_string(),
        journal: journal.to_string(),
        year,
        citations,
        relevance,
    }
}

/// "infectious_disease" -> "Infectious Disease"
fn title_case_area(area: &str) -> String {
    area.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl WebIntelAgent {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            trends: Self::seed_trends(),
            publications: Self::seed_publications(),
            clock,
        }
    }

    fn seed_trends() -> Vec<(String, StoredTrend)> {
        vec![
            (
                "oncology".to_string(),
                stored_trend(
                    "Rising",
                    2500,
                    "Positive",
                    &["Immunotherapy", "CAR-T cells", "Personalized medicine"],
                    450,
                    "High",
                ),
            ),
            (
                "cns".to_string(),
                stored_trend(
                    "Moderately Rising",
                    1800,
                    "Mixed",
                    &["Neurodegeneration", "Mental health", "Pain management"],
                    320,
                    "Medium",
                ),
            ),
            (
                "respiratory".to_string(),
                stored_trend(
                    "Stable",
                    1200,
                    "Positive",
                    &["COPD", "Asthma", "COVID-19 sequelae"],
                    280,
                    "Medium",
                ),
            ),
            (
                "cardiovascular".to_string(),
                stored_trend(
                    "Declining",
                    950,
                    "Neutral",
                    &["Heart failure", "Arrhythmias", "Hypertension"],
                    210,
                    "Low",
                ),
            ),
            (
                "infectious_disease".to_string(),
                stored_trend(
                    "Rising",
                    1600,
                    "Positive",
                    &["Antibiotic resistance", "Viral infections", "Vaccines"],
                    380,
                    "High",
                ),
            ),
        ]
    }

    fn seed_publications() -> Vec<(String, Vec<PublicationRecord>)> {
        vec![
            (
                "aspirin".to_string(),
                vec![
                    publication(
                        "Aspirin in Primary Prevention of Cardiovascular Disease",
                        "Circulation Research",
                        2023,
                        250,
                        0.95,
                    ),
                    publication(
                        "Novel Uses of Aspirin: A Systematic Review",
                        "Pharmaceutical Reviews",
                        2024,
                        45,
                        0.88,
                    ),
                ],
            ),
            (
                "metformin".to_string(),
                vec![
                    publication(
                        "Metformin and Cancer Prevention: An Updated Meta-Analysis",
                        "Diabetes Research and Clinical Practice",
                        2024,
                        180,
                        0.92,
                    ),
                    publication(
                        "Metformin Beyond Diabetes: Emerging Applications",
                        "Nature Reviews Drug Discovery",
                        2023,
                        320,
                        0.90,
                    ),
                ],
            ),
        ]
    }

    fn synthetic_publications(&self, molecule_name: &str) -> Vec<PublicationRecord> {
        let year = self.clock.now().date_naive().year();
        vec![
            publication(
                &format!("Novel Therapeutic Applications of {}", molecule_name),
                "Journal of Medicinal Chemistry",
                year,
                50,
                0.85,
            ),
            publication(
                &format!("Clinical Safety Profile of {}: A Review", molecule_name),
                "Drug Safety",
                year - 1,
                30,
                0.80,
            ),
        ]
    }

    fn sentiment_bucket(avg_relevance: f64) -> &'static str {
        if avg_relevance > 0.85 {
            "Positive"
        } else if avg_relevance > 0.75 {
            "Mixed"
        } else {
            "Neutral"
        }
    }

    /// Recent scientific publications for a molecule, sorted by citations.
    pub fn search_publications(&self, molecule_name: &str, limit: usize) -> WebIntelData {
        let key = molecule_name.to_lowercase();

        let mut publications = match self.publications.iter().find(|(k, _)| *k == key) {
            Some((_, pubs)) => pubs.clone(),
            None => self.synthetic_publications(molecule_name),
        };
        publications.sort_by(|a, b| b.citations.cmp(&a.citations));

        let total = publications.len();
        let avg_relevance = if publications.is_empty() {
            0.0
        } else {
            publications.iter().map(|p| p.relevance).sum::<f64>() / publications.len() as f64
        };
        let innovation_index = (total as f64 * 0.15 + avg_relevance).min(0.95);
        let scientific_sentiment = Self::sentiment_bucket(avg_relevance).to_string();

        publications.truncate(limit);

        WebIntelData {
            molecule: molecule_name.to_string(),
            total_publications_found: total,
            publications,
            recent_publications_count: total,
            innovation_index,
            scientific_sentiment,
            data_source: self.data_source().to_string(),
            query_date: self.clock.now().to_rfc3339(),
        }
    }

    /// Trend snapshot for a keyword (therapeutic area or molecule).
    pub fn search_trends(&self, keyword: &str) -> TrendData {
        let key = keyword.to_lowercase();
        let query_date = self.clock.now().to_rfc3339();

        match self.trends.iter().find(|(k, _)| *k == key) {
            Some((_, stored)) => TrendData {
                keyword: keyword.to_string(),
                trend: stored.trend.clone(),
                mentions_per_week: stored.mentions_per_week,
                sentiment: stored.sentiment.clone(),
                key_focus: stored.key_focus.clone(),
                recent_publications: stored.recent_publications,
                media_coverage: stored.media_coverage.clone(),
                data_source: "Web Intelligence".to_string(),
                query_date,
            },
            None => TrendData {
                keyword: keyword.to_string(),
                trend: "Emerging".to_string(),
                mentions_per_week: 600,
                sentiment: "Positive".to_string(),
                key_focus: vec![
                    "Innovation".to_string(),
                    "Clinical efficacy".to_string(),
                    "Safety".to_string(),
                ],
                recent_publications: 150,
                media_coverage: "Low".to_string(),
                data_source: "Web Intelligence".to_string(),
                query_date,
            },
        }
    }

    /// Sentiment breakdown for a scientific topic.
    pub fn get_scientific_sentiment(&self, topic: &str) -> SentimentAnalysis {
        let key = topic.to_lowercase();
        let base_sentiment = self
            .trends
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, stored)| stored.sentiment.as_str())
            .unwrap_or("Neutral");

        let (positive, neutral, negative) = match base_sentiment {
            "Positive" => (65, 25, 10),
            "Negative" => (15, 25, 60),
            "Mixed" => (40, 40, 20),
            _ => (35, 50, 15),
        };

        let mut sentiment_breakdown = BTreeMap::new();
        sentiment_breakdown.insert("positive".to_string(), positive);
        sentiment_breakdown.insert("neutral".to_string(), neutral);
        sentiment_breakdown.insert("negative".to_string(), negative);

        SentimentAnalysis {
            topic: topic.to_string(),
            overall_sentiment: base_sentiment.to_string(),
            sentiment_breakdown,
            confidence_score: 0.75,
            sample_positive_mentions: 150,
            sample_negative_mentions: 30,
            data_source: "Scientific Sentiment Analysis".to_string(),
            query_date: self.clock.now().to_rfc3339(),
        }
    }

    /// Top therapeutic areas by weekly web mentions, top 5.
    pub fn get_trending_therapeutic_areas(&self) -> Vec<AreaTrend> {
        let mut areas: Vec<AreaTrend> = self
            .trends
            .iter()
            .map(|(area, stored)| AreaTrend {
                therapeutic_area: title_case_area(area),
                trend_direction: stored.trend.clone(),
                mentions_per_week: stored.mentions_per_week,
                sentiment: stored.sentiment.clone(),
                recent_publications: stored.recent_publications,
                key_focus_areas: stored.key_focus.clone(),
                media_coverage: stored.media_coverage.clone(),
            })
            .collect();

        areas.sort_by(|a, b| b.mentions_per_week.cmp(&a.mentions_per_week));
        areas.truncate(5);
        areas
    }

    /// Innovation index for a therapeutic area (R&D intensity heuristic).
    pub fn get_innovation_index(&self, therapeutic_area: &str) -> AreaInnovation {
        let key = therapeutic_area.to_lowercase().replace(' ', "_");

        let (publications, mentions) = self
            .trends
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, stored)| (stored.recent_publications, stored.mentions_per_week))
            .unwrap_or((150, 800));

        let innovation_index =
            (publications as f64 * 0.6 + mentions as f64 * 0.0001) / 100.0;
        let innovation_index = (innovation_index * 100.0).round() / 100.0;

        let interpretation = if innovation_index > 5.0 {
            "High Innovation"
        } else if innovation_index > 3.0 {
            "Moderate Innovation"
        } else {
            "Emerging Innovation"
        };

        AreaInnovation {
            therapeutic_area: therapeutic_area.to_string(),
            innovation_index,
            publications_last_year: publications,
            web_mentions_per_week: mentions,
            interpretation: interpretation.to_string(),
        }
    }
}

impl MoleculeSource for WebIntelAgent {
    type Fragment = WebIntelData;

    fn data_source(&self) -> &'static str {
        "Scientific Literature"
    }

    fn lookup(&self, molecule_name: &str) -> WebIntelData {
        self.search_publications(molecule_name, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixedClock;
    use chrono::{TimeZone, Utc};

    fn agent() -> WebIntelAgent {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        WebIntelAgent::new(Arc::new(clock))
    }

    #[test]
    fn known_molecule_publications_sorted_by_citations() {
        let data = agent().search_publications("aspirin", 10);
        assert_eq!(data.total_publications_found, 2);
        assert_eq!(data.publications[0].citations, 250);
        assert_eq!(data.publications[1].citations, 45);
    }

    #[test]
    fn unknown_molecule_synthesizes_publications_with_name() {
        let data = agent().search_publications("Zyloprexin", 10);
        assert_eq!(data.total_publications_found, 2);
        assert!(data.publications[0]
            .title
            .contains("Zyloprexin"));
        assert_eq!(data.publications[0].year, 2024);
    }

    #[test]
    fn innovation_index_is_clamped() {
        // 2 publications, avg relevance 0.915: 0.3 + 0.915 > 0.95.
        let data = agent().search_publications("aspirin", 10);
        assert_eq!(data.innovation_index, 0.95);
    }

    #[test]
    fn sentiment_buckets() {
        assert_eq!(WebIntelAgent::sentiment_bucket(0.9), "Positive");
        assert_eq!(WebIntelAgent::sentiment_bucket(0.8), "Mixed");
        assert_eq!(WebIntelAgent::sentiment_bucket(0.5), "Neutral");
        assert_eq!(WebIntelAgent::sentiment_bucket(0.0), "Neutral");
    }

    #[test]
    fn limit_truncates_but_counts_full_set() {
        let data = agent().search_publications("metformin", 1);
        assert_eq!(data.publications.len(), 1);
        assert_eq!(data.total_publications_found, 2);
    }

    #[test]
    fn trending_areas_sorted_by_mentions() {
        let areas = agent().get_trending_therapeutic_areas();
        assert_eq!(areas.len(), 5);
        assert_eq!(areas[0].therapeutic_area, "Oncology");
        assert_eq!(areas[1].therapeutic_area, "Cns");
        for pair in areas.windows(2) {
            assert!(pair[0].mentions_per_week >= pair[1].mentions_per_week);
        }
    }

    #[test]
    fn known_keyword_trend_vs_fallback() {
        let known = agent().search_trends("oncology");
        assert_eq!(known.trend, "Rising");
        assert_eq!(known.mentions_per_week, 2500);

        let unknown = agent().search_trends("gene-editing");
        assert_eq!(unknown.trend, "Emerging");
        assert_eq!(unknown.mentions_per_week, 600);
    }

    #[test]
    fn sentiment_percentages_follow_base_sentiment() {
        let mixed = agent().get_scientific_sentiment("cns");
        assert_eq!(mixed.overall_sentiment, "Mixed");
        assert_eq!(mixed.sentiment_breakdown["positive"], 40);

        let fallback = agent().get_scientific_sentiment("dermatology");
        assert_eq!(fallback.overall_sentiment, "Neutral");
        assert_eq!(fallback.sentiment_breakdown["neutral"], 50);
    }

    #[test]
    fn innovation_index_for_area() {
        let oncology = agent().get_innovation_index("oncology");
        // (450 * 0.6 + 2500 * 0.0001) / 100 = 2.70
        assert_eq!(oncology.innovation_index, 2.7);
        assert_eq!(oncology.interpretation, "Emerging Innovation");

        let spaced = agent().get_innovation_index("Infectious Disease");
        assert_eq!(spaced.publications_last_year, 380);
    }

    #[test]
    fn title_case_handles_underscores() {
        assert_eq!(title_case_area("infectious_disease"), "Infectious Disease");
        assert_eq!(title_case_area("oncology"), "Oncology");
    }
}
