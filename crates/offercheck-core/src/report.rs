use crate::Result;
use crate::scenario::Scenario;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Timing for one step of the flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// What one run of the search-and-offer flow selected and confirmed
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub scenario: Scenario,
    pub departure_airport: Option<String>,
    pub destination: Option<String>,
    pub participants: Option<String>,
    pub offer_confirmed: bool,
    pub steps: Vec<StepRecord>,
    /// Step the flow stopped at, if it did not run to the end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlowReport {
    pub fn new(base_url: impl Into<String>, scenario: Scenario) -> Self {
        Self {
            base_url: base_url.into(),
            started_at: Utc::now(),
            finished_at: None,
            scenario,
            departure_airport: None,
            destination: None,
            participants: None,
            offer_confirmed: false,
            steps: Vec::new(),
            failed_step: None,
            error: None,
        }
    }

    pub fn record_step(&mut self, name: &str, duration: Duration, note: Option<String>) {
        tracing::debug!("Step '{}' took {}ms", name, duration.as_millis());
        self.steps.push(StepRecord {
            name: name.to_string(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            note,
        });
    }

    /// Mark the run as stopped at `step`; the offer is no longer confirmable
    pub fn record_failure(&mut self, step: &str, error: impl std::fmt::Display) {
        self.failed_step = Some(step.to_string());
        self.error = Some(error.to_string());
        self.offer_confirmed = false;
    }

    pub fn finish(&mut self, offer_confirmed: bool) {
        self.offer_confirmed = offer_confirmed;
        self.finished_at = Some(Utc::now());
    }

    /// Total of the recorded step durations
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.steps.iter().map(|s| s.duration_ms).sum())
    }

    /// Steps that carried a warning note (skipped or timed out)
    pub fn warnings(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| s.note.is_some())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        tracing::info!("Wrote flow report to {}", path.display());
        Ok(())
    }
}
