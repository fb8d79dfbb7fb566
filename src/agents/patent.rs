//! Patent Intelligence Agent
//!
//! Serves mock patent data per molecule: portfolio contents, exclusivity
//! windows, and a coarse freedom-to-operate (FTO) risk score.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::agents::MoleculeSource;
use crate::types::Clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentRecord {
    pub patent_id: String,
    pub title: String,
    pub assignee: String,
    pub filing_date: String,
    pub grant_date: String,
    pub expiration_date: String,
    /// "Active" or "Expired".
    pub status: String,
    pub jurisdiction: String,
}

/// Patent fragment for one molecule: the portfolio plus derived stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentData {
    pub molecule: String,
    pub total_patents: usize,
    pub active_patents: usize,
    pub expired_patents: usize,
    /// 0-1 scale, lower is better.
    pub fto_risk_score: f64,
    /// Active patents expiring within the next two years.
    pub expiring_soon: usize,
    pub patents: Vec<PatentRecord>,
    pub data_source: String,
    pub query_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FtoAssessment {
    pub molecule: String,
    pub fto_assessment: String,
    pub fto_score: f64,
    pub active_patent_count: usize,
    pub analysis: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpirationEntry {
    pub patent_id: String,
    pub title: String,
    pub expiration_date: String,
    pub status: String,
    pub years_remaining: f64,
}

pub struct PatentAgent {
    table: Vec<(String, Vec<PatentRecord>)>,
    clock: Arc<dyn Clock>,
}

fn patent(
    patent_id: &str,
    title: &str,
    assignee: &str,
    filing_date: &str,
    grant_date: &str,
    expiration_date: &str,
    status: &str,
    jurisdiction: &str,
) -> PatentRecord {
    PatentRecord {
        patent_id: patent_id.to_string(),
        title: title.to_string(),
        assignee: assignee.to_string(),
        filing_date: filing_date.to_string(),
        grant_date: grant_date.to_string(),
        expiration_date: expiration_date.to_string(),
        status: status.to_string(),
        jurisdiction: jurisdiction.to_string(),
    }
}

impl PatentAgent {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Self::seed(),
            clock,
        }
    }

    fn seed() -> Vec<(String, Vec<PatentRecord>)> {
        vec![
            (
                "aspirin".to_string(),
                vec![
                    patent(
                        "US123456789",
                        "Acetylsalicylic Acid Formulations",
                        "Bayer AG",
                        "1999-05-10",
                        "2002-08-20",
                        "2022-05-10",
                        "Expired",
                        "United States",
                    ),
                    patent(
                        "US234567890",
                        "Extended-Release Aspirin Compositions",
                        "Boston Scientific",
                        "2010-03-15",
                        "2013-11-05",
                        "2033-03-15",
                        "Active",
                        "United States",
                    ),
                ],
            ),
            (
                "metformin".to_string(),
                vec![
                    patent(
                        "US345678901",
                        "Metformin Hydrochloride Extended-Release Tablets",
                        "Merck & Cie",
                        "2005-07-22",
                        "2010-02-16",
                        "2025-07-22",
                        "Active",
                        "United States",
                    ),
                    patent(
                        "EU456789012",
                        "Metformin Combination Therapies for Diabetes",
                        "Novo Nordisk",
                        "2008-11-11",
                        "2012-05-30",
                        "2028-11-11",
                        "Active",
                        "European Union",
                    ),
                ],
            ),
            (
                "doxycycline".to_string(),
                vec![patent(
                    "US567890123",
                    "Doxycycline Monohydrate Compositions",
                    "Pfizer Inc.",
                    "1998-01-20",
                    "2001-06-05",
                    "2018-01-20",
                    "Expired",
                    "United States",
                )],
            ),
        ]
    }

    /// Coarse FTO risk bucketed by active-patent count: 0, 1-2, >=3.
    fn fto_risk_score(active_count: usize) -> f64 {
        match active_count {
            0 => 0.1,
            1 | 2 => 0.5,
            _ => 0.8,
        }
    }

    fn synthetic_patent(molecule_name: &str) -> PatentRecord {
        patent(
            "US999999999",
            &format!("{} Formulation Patent", molecule_name),
            "Pharmaceutical Company A",
            "2015-01-10",
            "2018-06-15",
            "2035-01-10",
            "Active",
            "United States",
        )
    }

    /// Query the patent portfolio for a molecule.
    pub fn query_patents(&self, molecule_name: &str) -> PatentData {
        let key = molecule_name.to_lowercase();

        let patents = match self.table.iter().find(|(k, _)| *k == key) {
            Some((_, patents)) => patents.clone(),
            None => vec![Self::synthetic_patent(molecule_name)],
        };

        let active: Vec<&PatentRecord> =
            patents.iter().filter(|p| p.status == "Active").collect();
        let expired_count = patents.iter().filter(|p| p.status == "Expired").count();

        let today = self.clock.now().date_naive();
        let expiring_soon = active
            .iter()
            .filter(|p| {
                NaiveDate::parse_from_str(&p.expiration_date, "%Y-%m-%d")
                    .map(|exp| {
                        let days = (exp - today).num_days();
                        (0..=730).contains(&days)
                    })
                    .unwrap_or(false)
            })
            .count();

        PatentData {
            molecule: molecule_name.to_string(),
            total_patents: patents.len(),
            active_patents: active.len(),
            expired_patents: expired_count,
            fto_risk_score: Self::fto_risk_score(active.len()),
            expiring_soon,
            patents,
            data_source: self.data_source().to_string(),
            query_date: self.clock.now().to_rfc3339(),
        }
    }

    /// Freedom-to-operate assessment with a human-readable verdict.
    pub fn get_freedom_to_operate(&self, molecule_name: &str) -> FtoAssessment {
        let data = self.query_patents(molecule_name);
        let active_count = data.active_patents;
        let fto_score = Self::fto_risk_score(active_count);

        let fto_assessment = match active_count {
            0 => "Low - No active patents detected",
            1 | 2 => "Medium - Limited patent coverage",
            _ => "High - Significant patent portfolio",
        };

        let recommendation = if fto_score < 0.3 {
            "Consider generic entry"
        } else if fto_score < 0.7 {
            "Evaluate patent landscapes carefully"
        } else {
            "Significant patent barriers exist"
        };

        FtoAssessment {
            molecule: molecule_name.to_string(),
            fto_assessment: fto_assessment.to_string(),
            fto_score,
            active_patent_count: active_count,
            analysis: "Freedom-to-operate analysis based on active patent portfolio.".to_string(),
            recommendation: recommendation.to_string(),
        }
    }

    /// Patents ordered by expiration date, with years remaining for active ones.
    pub fn get_expiration_timeline(&self, molecule_name: &str) -> Vec<ExpirationEntry> {
        let data = self.query_patents(molecule_name);
        let today = self.clock.now().date_naive();

        let mut patents = data.patents;
        patents.sort_by(|a, b| a.expiration_date.cmp(&b.expiration_date));

        patents
            .into_iter()
            .map(|p| {
                let years_remaining = if p.status == "Active" {
                    NaiveDate::parse_from_str(&p.expiration_date, "%Y-%m-%d")
                        .map(|exp| (exp - today).num_days() as f64 / 365.0)
                        .unwrap_or(0.0)
                } else {
                    0.0
                };
                ExpirationEntry {
                    patent_id: p.patent_id,
                    title: p.title,
                    expiration_date: p.expiration_date,
                    status: p.status,
                    years_remaining,
                }
            })
            .collect()
    }
}

impl MoleculeSource for PatentAgent {
    type Fragment = PatentData;

    fn data_source(&self) -> &'static str {
        "Patent Database"
    }

    fn lookup(&self, molecule_name: &str) -> PatentData {
        self.query_patents(molecule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixedClock;
    use chrono::{TimeZone, Utc};

    fn agent() -> PatentAgent {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        PatentAgent::new(Arc::new(clock))
    }

    #[test]
    fn known_molecule_counts_active_and_expired() {
        let data = agent().query_patents("aspirin");
        assert_eq!(data.total_patents, 2);
        assert_eq!(data.active_patents, 1);
        assert_eq!(data.expired_patents, 1);
        assert_eq!(data.fto_risk_score, 0.5);
    }

    #[test]
    fn fto_score_buckets() {
        assert_eq!(PatentAgent::fto_risk_score(0), 0.1);
        assert_eq!(PatentAgent::fto_risk_score(1), 0.5);
        assert_eq!(PatentAgent::fto_risk_score(2), 0.5);
        assert_eq!(PatentAgent::fto_risk_score(3), 0.8);
        assert_eq!(PatentAgent::fto_risk_score(7), 0.8);
    }

    #[test]
    fn doxycycline_has_no_active_patents() {
        let data = agent().query_patents("doxycycline");
        assert_eq!(data.active_patents, 0);
        assert_eq!(data.fto_risk_score, 0.1);
        assert_eq!(data.expiring_soon, 0);
    }

    #[test]
    fn expiring_soon_counts_two_year_window() {
        // Metformin's US patent expires 2025-07-22, within 730 days of the
        // pinned 2024-06-01 clock; the EU patent expires 2028.
        let data = agent().query_patents("metformin");
        assert_eq!(data.expiring_soon, 1);
    }

    #[test]
    fn unknown_molecule_gets_synthetic_active_patent() {
        let data = agent().query_patents("novodrug");
        assert_eq!(data.total_patents, 1);
        assert_eq!(data.active_patents, 1);
        assert!(data.patents[0].title.contains("novodrug"));
    }

    #[test]
    fn fto_assessment_matches_score() {
        let fto = agent().get_freedom_to_operate("doxycycline");
        assert_eq!(fto.fto_score, 0.1);
        assert!(fto.fto_assessment.starts_with("Low"));
        assert_eq!(fto.recommendation, "Consider generic entry");

        let fto = agent().get_freedom_to_operate("metformin");
        assert_eq!(fto.fto_score, 0.5);
        assert_eq!(fto.recommendation, "Evaluate patent landscapes carefully");
    }

    #[test]
    fn expiration_timeline_is_sorted() {
        let timeline = agent().get_expiration_timeline("aspirin");
        assert_eq!(timeline[0].patent_id, "US123456789");
        assert_eq!(timeline[0].years_remaining, 0.0);
        assert!(timeline[1].years_remaining > 8.0);
    }
}
