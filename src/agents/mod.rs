//! Agent System
//!
//! This module contains the data agents that power the pharma intelligence
//! dashboard:
//!
//! - **Market Agent**: Market size, growth, and competitive landscape
//! - **Clinical Agent**: Trial registries and enrollment statistics
//! - **Patent Agent**: Patent portfolios and freedom-to-operate scoring
//! - **Web Intel Agent**: Publications, sentiment, and innovation signals
//! - **Master Agent**: Orchestrates the four above plus AI summarization
//! - **Report Agent**: Renders finished analyses as JSON or PDF documents
//!
//! ## Pipeline Overview
//!
//! ```text
//! Molecule Query
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Master    │  → Fans out to the four data agents
//! │   Agent     │
//! └─────────────┘
//!   │  │  │  │
//!   ▼  ▼  ▼  ▼
//! Market Clinical Patent WebIntel
//!   │  │  │  │
//!   └──┴──┴──┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Summarizer  │  → Insights + recommendations (optional)
//! └─────────────┘
//!      │
//!      ▼
//! Analysis Envelope → Report Agent (JSON / PDF)
//! ```

pub mod clinical;
pub mod market;
pub mod master;
pub mod patent;
pub mod report;
pub mod webintel;

// Re-export main components
pub use clinical::{ClinicalAgent, ClinicalData};
pub use market::{MarketAgent, MarketData};
pub use master::{AnalysisEnvelope, BatchEnvelope, BatchOutcome, MasterAgent, TrendsEnvelope};
pub use patent::{PatentAgent, PatentData};
pub use report::{ReportAgent, ReportFormat};
pub use webintel::{WebIntelAgent, WebIntelData};

/// Common seam for the four per-molecule data providers. Each agent owns a
/// seeded table and answers every lookup, synthesizing a plausible fragment
/// for molecules it has never seen.
pub trait MoleculeSource {
    type Fragment: serde::Serialize;

    /// Human-readable provenance label stamped into every fragment.
    fn data_source(&self) -> &'static str;

    /// Fetch this provider's fragment for a molecule. Never fails; unknown
    /// molecules get synthetic data.
    fn lookup(&self, molecule_name: &str) -> Self::Fragment;
}
