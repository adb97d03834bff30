//! The end-to-end search-and-offer check.
//!
//! Picks an airport, a destination, the first date and one child with a
//! random birth date, searches, opens the first offer, and confirms the
//! offer page repeats the participants summary.

use crate::pages::{HomePage, ParticipantsSelection};
use crate::{BrowserSession, Error, Result};
use async_trait::async_trait;
use offercheck_core::{BirthDatePick, FlowReport, PollOutcome, RunConfig, Scenario};
use std::future::Future;
use std::time::Instant;

/// The page operations the flow needs, in the order it calls them
#[async_trait]
trait SearchFlow {
    async fn navigate_to_homepage(&mut self) -> Result<()>;
    async fn verify_page_loaded(&mut self) -> Result<()>;
    async fn select_departure_airport(&mut self, index: usize) -> Result<String>;
    async fn select_destination(&mut self, index: usize) -> Result<String>;
    async fn select_first_available_date(&mut self) -> Result<()>;
    async fn configure_participants(
        &mut self,
        birth: BirthDatePick,
    ) -> Result<ParticipantsSelection>;
    async fn click_search_button(&mut self) -> Result<()>;
    async fn click_first_offer_tile(&mut self) -> Result<()>;
    async fn click_view_offer_button(&mut self) -> Result<()>;
    async fn is_text_shown(&mut self, text: &str) -> Result<bool>;
}

/// The home page driving a real browser session
struct LiveFlow<'a> {
    home: HomePage,
    session: &'a mut BrowserSession,
}

#[async_trait]
impl SearchFlow for LiveFlow<'_> {
    async fn navigate_to_homepage(&mut self) -> Result<()> {
        self.home.navigate_to_homepage().await
    }

    async fn verify_page_loaded(&mut self) -> Result<()> {
        self.home.verify_page_loaded().await
    }

    async fn select_departure_airport(&mut self, index: usize) -> Result<String> {
        self.home.select_departure_airport(index).await
    }

    async fn select_destination(&mut self, index: usize) -> Result<String> {
        self.home.select_destination(index).await
    }

    async fn select_first_available_date(&mut self) -> Result<()> {
        self.home.select_first_available_date().await
    }

    async fn configure_participants(
        &mut self,
        birth: BirthDatePick,
    ) -> Result<ParticipantsSelection> {
        self.home.configure_participants(birth).await
    }

    async fn click_search_button(&mut self) -> Result<()> {
        self.home.click_search_button().await
    }

    async fn click_first_offer_tile(&mut self) -> Result<()> {
        self.home.click_first_offer_tile().await
    }

    async fn click_view_offer_button(&mut self) -> Result<()> {
        self.home.click_view_offer_button(self.session).await
    }

    async fn is_text_shown(&mut self, text: &str) -> Result<bool> {
        self.home.is_text_shown(text).await
    }
}

/// Time one step into the report; a failing step also marks the report as failed
async fn step<T, F>(report: &mut FlowReport, name: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tracing::info!("Step: {}", name);
    let started = Instant::now();
    let result = fut.await;
    report.record_step(
        name,
        started.elapsed(),
        result.as_ref().err().map(|e| format!("failed: {}", e)),
    );
    if let Err(e) = &result {
        report.record_failure(name, e);
    }
    result
}

fn birth_year_note(outcome: Option<PollOutcome>) -> Option<String> {
    match outcome {
        Some(PollOutcome::Acted) => None,
        Some(PollOutcome::TimedOut) => Some("birth year tile never became visible".to_string()),
        None => Some("not enough birth year tiles".to_string()),
    }
}

/// Run the whole flow on `session` and report what was selected.
///
/// A step that fails ends the run but not the report: the returned report
/// names the failed step and keeps the timings of the steps before it.
pub async fn run_flow(
    session: &mut BrowserSession,
    config: &RunConfig,
    scenario: Scenario,
) -> Result<FlowReport> {
    config.validate()?;

    let home = HomePage::new(session, config)?;
    let mut flow = LiveFlow { home, session };
    Ok(run_steps(&mut flow, config.base_url.as_str(), scenario).await)
}

async fn run_steps<F>(flow: &mut F, base_url: &str, scenario: Scenario) -> FlowReport
where
    F: SearchFlow + Send,
{
    let mut report = FlowReport::new(base_url, scenario.clone());

    match drive(flow, &mut report, &scenario).await {
        Ok(()) => {
            tracing::info!(
                "Offer page shows \"{}\"",
                report.participants.as_deref().unwrap_or_default()
            );
            report.finish(true);
        }
        Err(e) => {
            tracing::warn!(
                "Flow stopped at {}: {}",
                report.failed_step.as_deref().unwrap_or("setup"),
                e
            );
            if report.error.is_none() {
                report.error = Some(e.to_string());
            }
            report.finish(false);
        }
    }

    report
}

async fn drive<F>(flow: &mut F, report: &mut FlowReport, scenario: &Scenario) -> Result<()>
where
    F: SearchFlow + Send,
{
    step(report, "navigate_to_homepage", flow.navigate_to_homepage()).await?;
    step(report, "verify_page_loaded", flow.verify_page_loaded()).await?;

    let airport = step(
        report,
        "select_departure_airport",
        flow.select_departure_airport(scenario.airport_index),
    )
    .await?;
    report.departure_airport = Some(airport);

    let destination = step(
        report,
        "select_destination",
        flow.select_destination(scenario.destination_index),
    )
    .await?;
    report.destination = Some(destination);

    step(
        report,
        "select_first_available_date",
        flow.select_first_available_date(),
    )
    .await?;

    let participants = step(
        report,
        "configure_participants",
        flow.configure_participants(scenario.birth_date),
    )
    .await?;
    if let Some(note) = birth_year_note(participants.birth_year) {
        if let Some(last) = report.steps.last_mut() {
            last.note = Some(note);
        }
    }
    report.participants = Some(participants.summary.clone());

    step(report, "click_search_button", flow.click_search_button()).await?;
    step(report, "click_first_offer_tile", flow.click_first_offer_tile()).await?;
    step(
        report,
        "click_view_offer_button",
        flow.click_view_offer_button(),
    )
    .await?;

    let summary = participants.summary;
    step(report, "verify_participants_on_offer", async {
        if summary.is_empty() {
            return Err(Error::Assertion(
                "participants summary was empty, nothing to confirm on the offer page"
                    .to_string(),
            ));
        }
        if flow.is_text_shown(&summary).await? {
            Ok(())
        } else {
            Err(Error::Assertion(format!(
                "offer page does not show participants \"{}\"",
                summary
            )))
        }
    })
    .await
}
