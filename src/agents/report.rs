//! Report Agent
//!
//! Renders a finished analysis envelope as a downloadable document, either
//! pretty-printed JSON or a paginated PDF built with lopdf.

use std::str::FromStr;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::json;

use crate::agents::master::AnalysisEnvelope;
use crate::types::{AppError, AppResult, Clock};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 54.0;
const BODY_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 14.0;
const TITLE_SIZE: f32 = 18.0;
const LINE_GAP: f32 = 4.0;
const WRAP_COLUMNS: usize = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Pdf,
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            other => Err(AppError::InvalidRequest(format!(
                "Unsupported report format: {other}. Use 'json' or 'pdf'."
            ))),
        }
    }
}

/// One laid-out line of PDF text.
struct Line {
    text: String,
    size: f32,
    bold: bool,
    space_before: f32,
}

impl Line {
    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: BODY_SIZE,
            bold: false,
            space_before: 0.0,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: HEADING_SIZE,
            bold: true,
            space_before: 14.0,
        }
    }

    fn title(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: TITLE_SIZE,
            bold: true,
            space_before: 0.0,
        }
    }
}

pub struct ReportAgent {
    clock: Arc<dyn Clock>,
}

impl ReportAgent {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Full analysis as pretty-printed JSON with report metadata up front.
    /// Every envelope field is carried verbatim so the document decodes back
    /// to the exact analysis it was rendered from.
    pub fn structured_document(&self, envelope: &AnalysisEnvelope) -> AppResult<Vec<u8>> {
        let mut document = serde_json::to_value(envelope)
            .map_err(|e| AppError::Internal(format!("Report serialization failed: {e}")))?;
        document["report_metadata"] = json!({
            "title": format!("Pharmaceutical Research Report: {}", envelope.molecule),
            "generated_date": self.clock.now().to_rfc3339(),
            "molecule": envelope.molecule,
            "report_type": "Comprehensive Pharmaceutical Intelligence",
        });

        serde_json::to_vec_pretty(&document)
            .map_err(|e| AppError::Internal(format!("Report serialization failed: {e}")))
    }

    /// Paginated PDF rendering of the analysis.
    pub fn printable_document(&self, envelope: &AnalysisEnvelope) -> AppResult<Vec<u8>> {
        let lines = self.layout(envelope);
        Self::render_pdf(&lines)
    }

    fn layout(&self, envelope: &AnalysisEnvelope) -> Vec<Line> {
        let mut lines = Vec::new();

        lines.push(Line::title(format!(
            "Pharmaceutical Research Report: {}",
            envelope.molecule
        )));
        lines.push(Line::body(format!(
            "Generated: {}",
            self.clock.now().format("%Y-%m-%d %H:%M UTC")
        )));

        lines.push(Line::heading("Executive Summary"));
        // Always truncated to the first 500 characters with a trailing marker.
        let summary: String = envelope.ai_insights.chars().take(500).collect();
        for wrapped in wrap_text(&format!("{summary}..."), WRAP_COLUMNS) {
            lines.push(Line::body(wrapped));
        }

        lines.push(Line::heading("Market Analysis"));
        let market = &envelope.market_data;
        lines.push(Line::body(format!(
            "Market Size (USD): ${:.0}",
            market.market_size_usd
        )));
        lines.push(Line::body(format!(
            "Growth Rate: {:.1}%",
            market.growth_rate * 100.0
        )));
        lines.push(Line::body(format!(
            "Therapeutic Area: {}",
            non_empty(&market.therapeutic_area)
        )));
        lines.push(Line::body(format!("Market Trend: {}", market.market_trend)));
        lines.push(Line::body(format!(
            "Competitors: {}",
            market.competitors_count
        )));

        lines.push(Line::heading("Clinical Development"));
        let clinical = &envelope.clinical_data;
        lines.push(Line::body(format!(
            "Active Trials: {}",
            clinical.trials_count
        )));
        lines.push(Line::body(format!(
            "Total Enrollment: {}",
            clinical.total_enrollment
        )));
        lines.push(Line::body(format!(
            "Recruiting Trials: {}",
            clinical.recruiting_trials
        )));
        lines.push(Line::body(format!(
            "Estimated Completion: {}",
            non_empty(&clinical.estimated_completion_date)
        )));

        lines.push(Line::heading("Patent Landscape"));
        let patents = &envelope.patent_data;
        lines.push(Line::body(format!("Total Patents: {}", patents.total_patents)));
        lines.push(Line::body(format!(
            "Active Patents: {}",
            patents.active_patents
        )));
        lines.push(Line::body(format!(
            "Expired Patents: {}",
            patents.expired_patents
        )));
        lines.push(Line::body(format!(
            "FTO Risk Score: {:.1}",
            patents.fto_risk_score
        )));
        lines.push(Line::body(format!(
            "Expiring Within 2 Years: {}",
            patents.expiring_soon
        )));

        lines.push(Line::heading("Scientific Literature"));
        let web = &envelope.web_data;
        lines.push(Line::body(format!(
            "Publications Found: {}",
            web.total_publications_found
        )));
        lines.push(Line::body(format!(
            "Innovation Index: {:.2}",
            web.innovation_index
        )));
        lines.push(Line::body(format!(
            "Scientific Sentiment: {}",
            non_empty(&web.scientific_sentiment)
        )));

        lines.push(Line::heading("Strategic Recommendations"));
        for wrapped in wrap_text(&envelope.recommendations, WRAP_COLUMNS) {
            lines.push(Line::body(wrapped));
        }

        lines
    }

    fn render_pdf(lines: &[Line]) -> AppResult<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
                "F2" => bold_font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        let mut operations: Vec<Operation> = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        let flush_page = |doc: &mut Document,
                          kids: &mut Vec<Object>,
                          operations: Vec<Operation>|
         -> AppResult<()> {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| AppError::Internal(format!("PDF encoding failed: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
            Ok(())
        };

        for line in lines {
            let advance = line.space_before + line.size + LINE_GAP;
            if y - advance < MARGIN {
                flush_page(&mut doc, &mut kids, std::mem::take(&mut operations))?;
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= advance;

            let font = if line.bold { "F2" } else { "F1" };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![font.into(), line.size.into()],
            ));
            operations.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.text.as_str())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        if !operations.is_empty() {
            flush_page(&mut doc, &mut kids, operations)?;
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    PAGE_WIDTH.into(),
                    PAGE_HEIGHT.into(),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| AppError::Internal(format!("PDF serialization failed: {e}")))?;
        Ok(buffer)
    }
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Greedy word wrap; a single overlong word gets its own line. Paragraph
/// breaks survive as empty spacer lines.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            if !lines.is_empty() && !lines.last().is_some_and(|l| l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= columns {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push("N/A".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::MasterAgent;
    use crate::types::FixedClock;
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    async fn sample_envelope() -> AnalysisEnvelope {
        MasterAgent::new(None, fixed_clock())
            .analyze_molecule("aspirin")
            .await
            .unwrap()
    }

    #[test]
    fn report_format_parses_case_insensitively() {
        assert_eq!(ReportFormat::from_str("JSON").unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::from_str("pdf").unwrap(), ReportFormat::Pdf);
        assert!(matches!(
            ReportFormat::from_str("docx"),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn structured_document_carries_metadata() {
        let envelope = sample_envelope().await;
        let bytes = ReportAgent::new(fixed_clock())
            .structured_document(&envelope)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let meta = &value["report_metadata"];
        assert_eq!(meta["molecule"], "aspirin");
        assert_eq!(
            meta["title"],
            "Pharmaceutical Research Report: aspirin"
        );
        assert_eq!(meta["report_type"], "Comprehensive Pharmaceutical Intelligence");
        assert_eq!(value["market_data"]["therapeutic_area"], "Cardiovascular");
        assert_eq!(value["clinical_data"]["trials_count"], 2);
    }

    #[tokio::test]
    async fn structured_document_round_trips_every_envelope_field() {
        let envelope = sample_envelope().await;
        let bytes = ReportAgent::new(fixed_clock())
            .structured_document(&envelope)
            .unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        // The analysis timestamp is distinct from the render-time
        // generated_date and must survive verbatim.
        assert_eq!(value["timestamp"], envelope.timestamp);

        value.as_object_mut().unwrap().remove("report_metadata");
        assert_eq!(value, serde_json::to_value(&envelope).unwrap());

        let decoded: AnalysisEnvelope = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[tokio::test]
    async fn executive_summary_truncates_at_500_chars() {
        let mut envelope = sample_envelope().await;
        envelope.ai_insights = "x".repeat(600);
        let lines = ReportAgent::new(fixed_clock()).layout(&envelope);

        let expected = format!("{}...", "x".repeat(500));
        assert!(lines.iter().any(|l| l.text == expected));
        assert!(!lines.iter().any(|l| l.text.contains(&"x".repeat(501))));
    }

    #[tokio::test]
    async fn executive_summary_marker_applies_to_short_text() {
        let mut envelope = sample_envelope().await;
        envelope.ai_insights = "Short".to_string();
        let lines = ReportAgent::new(fixed_clock()).layout(&envelope);
        assert!(lines.iter().any(|l| l.text == "Short..."));
    }

    #[tokio::test]
    async fn patent_section_lists_expired_count() {
        // Aspirin seeds one active and one expired patent.
        let envelope = sample_envelope().await;
        let lines = ReportAgent::new(fixed_clock()).layout(&envelope);
        assert!(lines.iter().any(|l| l.text == "Expired Patents: 1"));
        assert!(lines.iter().any(|l| l.text == "Active Patents: 1"));
        assert!(lines.iter().any(|l| l.text == "Total Patents: 2"));
    }

    #[tokio::test]
    async fn printable_document_is_valid_pdf() {
        let envelope = sample_envelope().await;
        let bytes = ReportAgent::new(fixed_clock())
            .printable_document(&envelope)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn wrap_text_respects_column_limit() {
        let wrapped = wrap_text("one two three four five six seven", 12);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(wrapped.first().map(String::as_str), Some("one two"));
    }

    #[test]
    fn wrap_text_never_returns_empty() {
        assert_eq!(wrap_text("", 80), vec!["N/A".to_string()]);
        assert_eq!(wrap_text("\n\n", 80), vec!["N/A".to_string()]);
    }

    #[test]
    fn wrap_text_keeps_paragraph_breaks_as_spacers() {
        let wrapped = wrap_text("first paragraph\n\nsecond paragraph\n", 80);
        assert_eq!(
            wrapped,
            vec![
                "first paragraph".to_string(),
                String::new(),
                "second paragraph".to_string(),
            ]
        );
    }
}
