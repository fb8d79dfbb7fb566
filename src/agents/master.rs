//! Master Agent
//!
//! Orchestrates the four data agents, aggregates their fragments into one
//! envelope per molecule, and asks the summarization service for prose
//! insights and recommendations. All provider calls run sequentially within
//! one request; the envelope is never mutated after assembly.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agents::clinical::{ClinicalAgent, ClinicalData};
use crate::agents::market::{MarketAgent, MarketData};
use crate::agents::patent::{PatentAgent, PatentData};
use crate::agents::report::{ReportAgent, ReportFormat};
use crate::agents::webintel::{WebIntelAgent, WebIntelData};
use crate::agents::MoleculeSource;
use crate::config::Config;
use crate::llm::{CompletionRequest, SummaryClient};
use crate::types::{AppError, AppResult, Clock, SystemClock};
use crate::utils::markdown::strip_markdown;

pub const INSIGHTS_PLACEHOLDER: &str =
    "AI insights not available. Configure GROQ_API_KEY to enable summarization.";
pub const RECOMMENDATIONS_PLACEHOLDER: &str =
    "Unable to generate recommendations without a summarization API key.";

const INSIGHTS_SYSTEM_ROLE: &str =
    "You are a pharmaceutical intelligence analyst. Provide actionable, strategic insights.";
const RECOMMENDATIONS_SYSTEM_ROLE: &str =
    "You are a pharmaceutical strategy consultant. Provide actionable recommendations.";
const TRENDS_SYSTEM_ROLE: &str = "You are a pharmaceutical trends analyst.";

/// Aggregate root for one molecule query. Assembled once, then read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub molecule: String,
    pub timestamp: String,
    pub market_data: MarketData,
    pub clinical_data: ClinicalData,
    pub patent_data: PatentData,
    pub web_data: WebIntelData,
    pub ai_insights: String,
    pub recommendations: String,
}

/// Uniform shape for one ranked trend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendHighlight {
    pub label: String,
    pub description: String,
    pub metric: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebTrendSummary {
    pub publication_growth: f64,
    pub avg_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsEnvelope {
    pub timestamp: String,
    pub trending_therapeutic_areas: Vec<TrendHighlight>,
    pub trending_conditions: Vec<TrendHighlight>,
    pub web_trends: WebTrendSummary,
    pub market_insights: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

/// One slot per requested molecule; failures stay isolated in their slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Analysis(Box<AnalysisEnvelope>),
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEnvelope {
    pub timestamp: String,
    pub molecules_analyzed: usize,
    pub results: BTreeMap<String, BatchOutcome>,
}

pub struct MasterAgent {
    pub market: MarketAgent,
    pub clinical: ClinicalAgent,
    pub patents: PatentAgent,
    pub webintel: WebIntelAgent,
    report: ReportAgent,
    summarizer: Option<SummaryClient>,
    clock: Arc<dyn Clock>,
}

impl MasterAgent {
    pub fn new(summarizer: Option<SummaryClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            market: MarketAgent::new(clock.clone()),
            clinical: ClinicalAgent::new(clock.clone()),
            patents: PatentAgent::new(clock.clone()),
            webintel: WebIntelAgent::new(clock.clone()),
            report: ReportAgent::new(clock.clone()),
            summarizer,
            clock,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let summarizer = match &config.llm.groq_api_key {
            Some(key) => Some(SummaryClient::groq(key, &config.llm.model)),
            None => {
                warn!("GROQ_API_KEY not configured, AI fields will use placeholders");
                None
            }
        };
        Self::new(summarizer, Arc::new(SystemClock))
    }

    /// Run the full analysis for one molecule across all agents.
    pub async fn analyze_molecule(&self, molecule_name: &str) -> AppResult<AnalysisEnvelope> {
        let molecule_name = molecule_name.trim();
        if molecule_name.is_empty() {
            return Err(AppError::InvalidRequest(
                "Molecule name cannot be empty".to_string(),
            ));
        }

        info!(molecule = %molecule_name, "starting molecule analysis");

        let market_data = self.market.lookup(molecule_name);
        let clinical_data = self.clinical.lookup(molecule_name);
        let patent_data = self.patents.lookup(molecule_name);
        let web_data = self.webintel.lookup(molecule_name);

        let (ai_insights, recommendations) = match &self.summarizer {
            Some(client) => {
                let insights_prompt = Self::insights_prompt(
                    molecule_name,
                    &market_data,
                    &clinical_data,
                    &patent_data,
                    &web_data,
                );
                let insights_raw = client
                    .complete(
                        &CompletionRequest::new(insights_prompt)
                            .with_system_role(INSIGHTS_SYSTEM_ROLE),
                    )
                    .await;

                let recommendations_raw = client
                    .complete(
                        &CompletionRequest::new(Self::recommendations_prompt(molecule_name))
                            .with_system_role(RECOMMENDATIONS_SYSTEM_ROLE)
                            .with_max_tokens(800),
                    )
                    .await;

                (
                    strip_markdown(&insights_raw),
                    strip_markdown(&recommendations_raw),
                )
            }
            None => (
                INSIGHTS_PLACEHOLDER.to_string(),
                RECOMMENDATIONS_PLACEHOLDER.to_string(),
            ),
        };

        info!(molecule = %molecule_name, "molecule analysis complete");

        Ok(AnalysisEnvelope {
            molecule: molecule_name.to_string(),
            timestamp: self.clock.now().to_rfc3339(),
            market_data,
            clinical_data,
            patent_data,
            web_data,
            ai_insights,
            recommendations,
        })
    }

    fn insights_prompt(
        molecule: &str,
        market: &MarketData,
        clinical: &ClinicalData,
        patents: &PatentData,
        web: &WebIntelData,
    ) -> String {
        format!(
            "Based on the following pharmaceutical research data, generate key insights and recommendations:\n\
             \n\
             Molecule: {molecule}\n\
             \n\
             Market Data:\n\
             - Market Size: ${market_size:.0}\n\
             - Growth Rate: {growth:.1}%\n\
             - Therapeutic Area: {area}\n\
             \n\
             Clinical Development:\n\
             - Active Trials: {trials}\n\
             - Total Enrollment: {enrollment}\n\
             \n\
             Patent Landscape:\n\
             - Total Patents: {total_patents}\n\
             - Active Patents: {active_patents}\n\
             \n\
             Publications:\n\
             - Recent Publications: {publications}\n\
             \n\
             Provide:\n\
             1. Key opportunities\n\
             2. Risk factors\n\
             3. Market potential assessment\n\
             4. Clinical viability\n\
             5. Recommended next steps",
            molecule = molecule,
            market_size = market.market_size_usd,
            growth = market.growth_rate * 100.0,
            area = market.therapeutic_area,
            trials = clinical.trials_count,
            enrollment = clinical.total_enrollment,
            total_patents = patents.total_patents,
            active_patents = patents.active_patents,
            publications = web.total_publications_found,
        )
    }

    fn recommendations_prompt(molecule: &str) -> String {
        format!(
            "Based on the pharmaceutical research analysis for {molecule}, \
             provide strategic recommendations for drug repurposing opportunities considering:\n\
             \n\
             1. Market attractiveness (size and growth)\n\
             2. Clinical development status (ongoing trials)\n\
             3. Patent landscape and freedom-to-operate\n\
             4. Scientific trends and publication activity\n\
             \n\
             Focus on actionable next steps for R&D teams.",
        )
    }

    /// Cross-provider trends view: top-N rankings reshaped into uniform
    /// highlight records, optionally narrated by the summarization service.
    pub async fn get_trends(&self) -> TrendsEnvelope {
        info!("assembling cross-provider trends");

        let trending_therapeutic_areas: Vec<TrendHighlight> = self
            .market
            .get_therapeutic_area_trends()
            .into_iter()
            .map(|t| TrendHighlight {
                label: t.area,
                description: format!(
                    "Market Size: ${:.0}, Molecules: {}",
                    t.total_market_size, t.molecule_count
                ),
                metric: t.avg_growth_rate,
            })
            .collect();

        let trending_conditions: Vec<TrendHighlight> = self
            .clinical
            .get_trending_conditions()
            .into_iter()
            .map(|c| TrendHighlight {
                label: c.condition,
                description: format!("{} active trials", c.trial_count),
                metric: if c.recruiting > 0 { 0.85 } else { 0.50 },
            })
            .collect();

        let mut envelope = TrendsEnvelope {
            timestamp: self.clock.now().to_rfc3339(),
            trending_therapeutic_areas,
            trending_conditions,
            web_trends: WebTrendSummary {
                publication_growth: 0.25,
                avg_sentiment: 0.72,
            },
            market_insights: "The pharmaceutical market is experiencing significant growth in \
                              oncology and infectious disease areas, driven by increased R&D \
                              investment and rising patient populations."
                .to_string(),
            ai_summary: None,
        };

        if let Some(client) = &self.summarizer {
            let prompt = format!(
                "Summarize the key pharmaceutical trends based on: {}. \
                 Focus on drug repurposing opportunities.",
                serde_json::to_string(&envelope).unwrap_or_default()
            );
            // Adapter failures come back as "Error: ..." text and stay
            // confined to this one field.
            let summary = client
                .complete(
                    &CompletionRequest::new(prompt)
                        .with_system_role(TRENDS_SYSTEM_ROLE)
                        .with_max_tokens(500),
                )
                .await;
            envelope.ai_summary = Some(strip_markdown(&summary));
        }

        envelope
    }

    /// Analyze a list of molecules one at a time. A failing item records an
    /// error in its own slot and never aborts the rest of the batch.
    pub async fn batch_analyze(&self, molecule_names: &[String]) -> BatchEnvelope {
        info!(count = molecule_names.len(), "starting batch analysis");

        let mut results = BTreeMap::new();
        for name in molecule_names {
            let outcome = match self.analyze_molecule(name).await {
                Ok(envelope) => BatchOutcome::Analysis(Box::new(envelope)),
                Err(e) => BatchOutcome::Error {
                    error: e.to_string(),
                },
            };
            results.insert(name.clone(), outcome);
        }

        BatchEnvelope {
            timestamp: self.clock.now().to_rfc3339(),
            molecules_analyzed: molecule_names.len(),
            results,
        }
    }

    /// Render an envelope in the requested format.
    pub fn generate_report(
        &self,
        envelope: &AnalysisEnvelope,
        format: ReportFormat,
    ) -> AppResult<Vec<u8>> {
        match format {
            ReportFormat::Json => self.report.structured_document(envelope),
            ReportFormat::Pdf => self.report.printable_document(envelope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionAdapter;
    use crate::types::FixedClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn offline_master() -> MasterAgent {
        MasterAgent::new(None, fixed_clock())
    }

    struct CannedAdapter(&'static str);

    #[async_trait]
    impl CompletionAdapter for CannedAdapter {
        async fn complete(&self, _request: &CompletionRequest) -> AppResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn analysis_without_summarizer_uses_placeholders() {
        let envelope = offline_master().analyze_molecule("aspirin").await.unwrap();
        assert_eq!(envelope.molecule, "aspirin");
        assert_eq!(envelope.ai_insights, INSIGHTS_PLACEHOLDER);
        assert_eq!(envelope.recommendations, RECOMMENDATIONS_PLACEHOLDER);
        assert_eq!(envelope.market_data.therapeutic_area, "Cardiovascular");
        assert_eq!(envelope.clinical_data.trials_count, 2);
    }

    #[tokio::test]
    async fn summarizer_output_is_markdown_stripped() {
        let client = SummaryClient::with_adapter(Box::new(CannedAdapter(
            "**Key finding**: strong market\n- invest now",
        )));
        let master = MasterAgent::new(Some(client), fixed_clock());
        let envelope = master.analyze_molecule("aspirin").await.unwrap();
        assert_eq!(
            envelope.ai_insights,
            "Key finding: strong market\ninvest now"
        );
        assert!(!envelope.recommendations.contains("**"));
    }

    #[tokio::test]
    async fn empty_molecule_name_is_invalid() {
        let err = offline_master().analyze_molecule("   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn batch_isolates_items_and_unknowns_are_not_errors() {
        let names = vec![
            "aspirin".to_string(),
            "unknown-xyz".to_string(),
            "metformin".to_string(),
        ];
        let batch = offline_master().batch_analyze(&names).await;
        assert_eq!(batch.molecules_analyzed, 3);
        assert_eq!(batch.results.len(), 3);
        for outcome in batch.results.values() {
            assert!(matches!(outcome, BatchOutcome::Analysis(_)));
        }
    }

    #[tokio::test]
    async fn batch_records_error_slot_for_bad_input() {
        let names = vec!["aspirin".to_string(), "  ".to_string()];
        let batch = offline_master().batch_analyze(&names).await;
        assert_eq!(batch.results.len(), 2);
        assert!(matches!(
            batch.results.get("aspirin"),
            Some(BatchOutcome::Analysis(_))
        ));
        assert!(matches!(
            batch.results.get("  "),
            Some(BatchOutcome::Error { .. })
        ));
    }

    #[tokio::test]
    async fn trends_without_summarizer_omits_ai_summary() {
        let trends = offline_master().get_trends().await;
        assert!(trends.ai_summary.is_none());
        assert!(!trends.trending_therapeutic_areas.is_empty());
        assert!(!trends.trending_conditions.is_empty());
        // Uniform highlight shape: conditions carry the interest metric.
        assert_eq!(trends.trending_conditions[0].metric, 0.85);
    }

    #[tokio::test]
    async fn trends_with_summarizer_fills_narrative() {
        let client = SummaryClient::with_adapter(Box::new(CannedAdapter("# Summary\ntext")));
        let master = MasterAgent::new(Some(client), fixed_clock());
        let trends = master.get_trends().await;
        assert_eq!(trends.ai_summary.as_deref(), Some("Summary\ntext"));
    }

    #[test]
    fn batch_outcome_serializes_error_shape() {
        let outcome = BatchOutcome::Error {
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }
}
