//! Clinical Trials Agent
//!
//! Serves mock clinical trial data shaped like a ClinicalTrials.gov feed:
//! ongoing and completed studies per molecule plus summary statistics. A
//! synthetic study is generated for molecules outside the seeded table.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::agents::MoleculeSource;
use crate::types::Clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_id: String,
    pub title: String,
    /// Free text, e.g. "Recruiting", "Active, not recruiting", "Completed".
    pub status: String,
    pub phase: String,
    pub enrollment: u32,
    pub condition: String,
    pub sponsor: String,
    pub start_date: String,
    pub completion_date: String,
}

/// Clinical fragment for one molecule: the trial list plus derived stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalData {
    pub molecule: String,
    pub trials_count: usize,
    pub total_enrollment: u64,
    pub recruiting_trials: usize,
    pub main_sponsors: Vec<String>,
    pub estimated_completion_date: String,
    pub trials: Vec<TrialRecord>,
    pub data_source: String,
    pub query_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialStatusSummary {
    pub molecule: String,
    pub total_trials: usize,
    pub status_breakdown: BTreeMap<String, usize>,
    pub phase_breakdown: BTreeMap<String, usize>,
    pub total_enrollment: u64,
    pub average_enrollment_per_trial: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingCondition {
    pub condition: String,
    pub trial_count: usize,
    pub total_enrollment: u64,
    pub recruiting: usize,
}

pub struct ClinicalAgent {
    table: Vec<(String, Vec<TrialRecord>)>,
    clock: Arc<dyn Clock>,
}

fn trial(
    trial_id: &str,
    title: &str,
    status: &str,
    phase: &str,
    enrollment: u32,
    condition: &str,
    sponsor: &str,
    start_date: &str,
    completion_date: &str,
) -> TrialRecord {
    TrialRecord {
        trial_id: trial_id.to_string(),
        title: title.to_string(),
        status: status.to_string(),
        phase: phase.to_string(),
        enrollment,
        condition: condition.to_string(),
        sponsor: sponsor.to_string(),
        start_date: start_date.to_string(),
        completion_date: completion_date.to_string(),
    }
}

impl ClinicalAgent {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Self::seed(),
            clock,
        }
    }

    fn seed() -> Vec<(String, Vec<TrialRecord>)> {
        vec![
            (
                "aspirin".to_string(),
                vec![
                    trial(
                        "NCT04123456",
                        "Aspirin in Secondary Prevention of Cardiovascular Disease",
                        "Active, not recruiting",
                        "Phase 3",
                        3500,
                        "Cardiovascular Disease",
                        "Mayo Clinic",
                        "2020-01-15",
                        "2025-06-30",
                    ),
                    trial(
                        "NCT03987654",
                        "Low-dose Aspirin for Cancer Prevention",
                        "Recruiting",
                        "Phase 2",
                        1200,
                        "Cancer Prevention",
                        "National Cancer Institute",
                        "2021-06-01",
                        "2026-12-31",
                    ),
                ],
            ),
            (
                "metformin".to_string(),
                vec![
                    trial(
                        "NCT04234567",
                        "Metformin for Diabetes Prevention in High-Risk Patients",
                        "Recruiting",
                        "Phase 3",
                        2500,
                        "Type 2 Diabetes",
                        "Stanford University",
                        "2022-03-01",
                        "2027-02-28",
                    ),
                    trial(
                        "NCT04098765",
                        "Metformin as Adjunct in Oncology Treatment",
                        "Active, not recruiting",
                        "Phase 2",
                        800,
                        "Oncology",
                        "Johns Hopkins University",
                        "2020-11-10",
                        "2025-10-31",
                    ),
                ],
            ),
            (
                "doxycycline".to_string(),
                vec![trial(
                    "NCT04345678",
                    "Doxycycline in Periodontal Disease Management",
                    "Recruiting",
                    "Phase 3",
                    600,
                    "Periodontal Disease",
                    "University of Pennsylvania",
                    "2021-09-15",
                    "2025-08-31",
                )],
            ),
        ]
    }

    fn synthetic_trial(&self, molecule_name: &str) -> TrialRecord {
        let now = self.clock.now();
        let prefix: String = molecule_name.chars().take(4).collect::<String>().to_uppercase();
        TrialRecord {
            trial_id: format!("NCT{}0001", prefix),
            title: format!("Safety and Efficacy Study of {}", molecule_name),
            status: "Recruiting".to_string(),
            phase: "Phase 2".to_string(),
            enrollment: 500,
            condition: "Multiple Indications".to_string(),
            sponsor: "Research University".to_string(),
            start_date: (now - Duration::days(180)).format("%Y-%m-%d").to_string(),
            completion_date: (now + Duration::days(365)).format("%Y-%m-%d").to_string(),
        }
    }

    /// Query clinical trials for a molecule, with derived summary fields.
    pub fn query_trials(&self, molecule_name: &str) -> ClinicalData {
        let key = molecule_name.to_lowercase();

        let trials = match self.table.iter().find(|(k, _)| *k == key) {
            Some((_, trials)) => trials.clone(),
            None => vec![self.synthetic_trial(molecule_name)],
        };

        let total_enrollment: u64 = trials.iter().map(|t| u64::from(t.enrollment)).sum();
        let recruiting_trials = trials
            .iter()
            .filter(|t| t.status.contains("Recruiting"))
            .count();

        // First-seen order, capped at three sponsors.
        let mut main_sponsors: Vec<String> = Vec::new();
        for t in &trials {
            if !main_sponsors.contains(&t.sponsor) {
                main_sponsors.push(t.sponsor.clone());
            }
        }
        main_sponsors.truncate(3);

        let estimated_completion_date = trials
            .iter()
            .map(|t| t.completion_date.as_str())
            .max()
            .unwrap_or_default()
            .to_string();

        ClinicalData {
            molecule: molecule_name.to_string(),
            trials_count: trials.len(),
            total_enrollment,
            recruiting_trials,
            main_sponsors,
            estimated_completion_date,
            trials,
            data_source: self.data_source().to_string(),
            query_date: self.clock.now().to_rfc3339(),
        }
    }

    /// Status and phase breakdown for a molecule's trials.
    pub fn get_trial_status_summary(&self, molecule_name: &str) -> TrialStatusSummary {
        let data = self.query_trials(molecule_name);

        let mut status_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut phase_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for t in &data.trials {
            *status_breakdown.entry(t.status.clone()).or_insert(0) += 1;
            *phase_breakdown.entry(t.phase.clone()).or_insert(0) += 1;
        }

        let average_enrollment_per_trial = if data.trials.is_empty() {
            0.0
        } else {
            data.total_enrollment as f64 / data.trials.len() as f64
        };

        TrialStatusSummary {
            molecule: molecule_name.to_string(),
            total_trials: data.trials.len(),
            status_breakdown,
            phase_breakdown,
            total_enrollment: data.total_enrollment,
            average_enrollment_per_trial,
        }
    }

    /// All seeded trials whose condition mentions the given therapeutic area.
    pub fn get_therapeutic_area_trials(&self, therapeutic_area: &str) -> Vec<TrialRecord> {
        let needle = therapeutic_area.to_lowercase();
        let mut matched: Vec<TrialRecord> = self
            .table
            .iter()
            .flat_map(|(_, trials)| trials.iter())
            .filter(|t| t.condition.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matched.truncate(10);
        matched
    }

    /// Most actively recruited conditions across the whole table, top 5.
    pub fn get_trending_conditions(&self) -> Vec<TrendingCondition> {
        let mut conditions: Vec<TrendingCondition> = Vec::new();

        for t in self.table.iter().flat_map(|(_, trials)| trials.iter()) {
            match conditions.iter_mut().find(|c| c.condition == t.condition) {
                Some(c) => {
                    c.trial_count += 1;
                    c.total_enrollment += u64::from(t.enrollment);
                    if t.status.contains("Recruiting") {
                        c.recruiting += 1;
                    }
                }
                None => conditions.push(TrendingCondition {
                    condition: t.condition.clone(),
                    trial_count: 1,
                    total_enrollment: u64::from(t.enrollment),
                    recruiting: usize::from(t.status.contains("Recruiting")),
                }),
            }
        }

        conditions.sort_by(|a, b| b.recruiting.cmp(&a.recruiting));
        conditions.truncate(5);
        conditions
    }
}

impl MoleculeSource for ClinicalAgent {
    type Fragment = ClinicalData;

    fn data_source(&self) -> &'static str {
        "ClinicalTrials.gov"
    }

    fn lookup(&self, molecule_name: &str) -> ClinicalData {
        self.query_trials(molecule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixedClock;
    use chrono::{TimeZone, Utc};

    fn agent() -> ClinicalAgent {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        ClinicalAgent::new(Arc::new(clock))
    }

    #[test]
    fn known_molecule_returns_static_trials() {
        let data = agent().query_trials("aspirin");
        assert_eq!(data.trials_count, 2);
        assert_eq!(data.total_enrollment, 4700);
        assert_eq!(data.recruiting_trials, 1);
        assert_eq!(data.trials[0].trial_id, "NCT04123456");
        assert_eq!(data.estimated_completion_date, "2026-12-31");
    }

    #[test]
    fn unknown_molecule_gets_one_synthetic_trial_with_name_embedded() {
        let data = agent().query_trials("Zyloprexin");
        assert_eq!(data.trials_count, 1);
        let t = &data.trials[0];
        assert_eq!(t.title, "Safety and Efficacy Study of Zyloprexin");
        assert_eq!(t.trial_id, "NCTZYLO0001");
        assert_eq!(t.enrollment, 500);
        // 180 days before / 365 days after the injected clock instant.
        assert_eq!(t.start_date, "2023-12-04");
        assert_eq!(t.completion_date, "2025-06-01");
    }

    #[test]
    fn status_summary_counts_statuses_and_phases() {
        let summary = agent().get_trial_status_summary("metformin");
        assert_eq!(summary.total_trials, 2);
        assert_eq!(summary.status_breakdown["Recruiting"], 1);
        assert_eq!(summary.status_breakdown["Active, not recruiting"], 1);
        assert_eq!(summary.phase_breakdown["Phase 3"], 1);
        assert_eq!(summary.average_enrollment_per_trial, 1650.0);
    }

    #[test]
    fn trending_conditions_ranked_by_recruiting() {
        let trending = agent().get_trending_conditions();
        assert!(trending.len() <= 5);
        for pair in trending.windows(2) {
            assert!(pair[0].recruiting >= pair[1].recruiting);
        }
        // Ties keep table insertion order.
        let recruiting_one: Vec<_> = trending.iter().filter(|c| c.recruiting == 1).collect();
        assert_eq!(recruiting_one[0].condition, "Cancer Prevention");
    }

    #[test]
    fn therapeutic_area_filter_matches_substring() {
        let oncology = agent().get_therapeutic_area_trials("oncology");
        assert_eq!(oncology.len(), 1);
        assert_eq!(oncology[0].condition, "Oncology");
        assert!(agent().get_therapeutic_area_trials("nephrology").is_empty());
    }
}
