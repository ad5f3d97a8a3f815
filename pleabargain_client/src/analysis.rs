//! Simulated FHE fairness analysis
//!
//! No homomorphic computation happens here. The analyzer waits for a fixed
//! delay and returns a canned report, which is then attached to the case.

use async_trait::async_trait;
use log::info;
use std::time::Duration;

use crate::common::Result;
use crate::config::AnalysisConfig;
use crate::store::CaseStore;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produce the analysis text for one case.
    async fn analyze(&self, case_id: &str) -> Result<String>;
}

/// Sleeps for the configured delay, then returns the configured report lines.
#[derive(Debug, Clone)]
pub struct SimulatedAnalyzer {
    delay: Duration,
    lines: Vec<String>,
}

impl SimulatedAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            delay: config.delay(),
            lines: config.result_lines.clone(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn report(&self) -> String {
        self.lines.join("\n")
    }
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

#[async_trait]
impl Analyzer for SimulatedAnalyzer {
    async fn analyze(&self, case_id: &str) -> Result<String> {
        info!("Running simulated FHE analysis for case {}", case_id);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.report())
    }
}

/// Analyze a case and attach the result. Returns the attached text.
pub async fn run_analysis(store: &CaseStore, analyzer: &dyn Analyzer, case_id: &str) -> Result<String> {
    let report = analyzer.analyze(case_id).await?;
    store.attach_analysis(case_id, &report).await?;
    Ok(report)
}
