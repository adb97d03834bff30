//! Home page of the travel site: search form and offer results.
//!
//! Methods follow the order a customer uses them: departure airport,
//! destination, date, participants, search, then open an offer.

use super::BasePage;
use crate::{BrowserSession, ElementTarget, Error, Locator, Result};
use offercheck_core::{BirthDatePick, PollConfig, PollOutcome, PollTarget, Poller, RunConfig};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

const AIRPORT_CHECKBOXES: &str = "[class*=\"dropdown-items-list__item checkbox\"]";
const DESTINATION_CHECKBOXES: &str =
    "label.direction-item:has(input[type=\"checkbox\"]:not([disabled]))";
const AVAILABLE_DATES: &str = ".react-calendar__tile:enabled";
const AVAILABLE_YEARS: &str = ".react-calendar__tile:enabled";
const AVAILABLE_MONTHS: &str =
    ".react-calendar__tile.react-calendar__year-view__months__month:enabled";
const AVAILABLE_DAYS: &str = ".react-calendar__tile.react-calendar__month-view__days__day:enabled";

struct HomeLocators {
    airport_dropdown: Locator,
    airport_checkboxes: Locator,
    select_button: Locator,
    destination_dropdown: Locator,
    destination_checkboxes: Locator,
    date_dropdown: Locator,
    available_dates: Locator,
    participants_dropdown: Locator,
    add_child_button: Locator,
    birth_date_button: Locator,
    available_years: Locator,
    available_months: Locator,
    available_days: Locator,
    search_button: Locator,
    offer_tiles: Locator,
    view_offer_button: Locator,
    main_header: Locator,
}

impl HomeLocators {
    fn new() -> Self {
        Self {
            airport_dropdown: Locator::test_id("dropdown--airport"),
            airport_checkboxes: Locator::new(AIRPORT_CHECKBOXES),
            select_button: Locator::test_id("dropdown-window-button-submit"),
            destination_dropdown: Locator::test_id("dropdown--region"),
            destination_checkboxes: Locator::new(DESTINATION_CHECKBOXES),
            date_dropdown: Locator::test_id("dropdown-field--travel-date"),
            available_dates: Locator::new(AVAILABLE_DATES),
            participants_dropdown: Locator::test_id("dropdown-field--participants"),
            add_child_button: Locator::test_id("person-count-increment-children"),
            birth_date_button: Locator::test_id("birth-date-button"),
            available_years: Locator::new(AVAILABLE_YEARS),
            available_months: Locator::new(AVAILABLE_MONTHS),
            available_days: Locator::new(AVAILABLE_DAYS),
            search_button: Locator::test_id("global-search-button-submit"),
            offer_tiles: Locator::test_id("offer-tile"),
            view_offer_button: Locator::test_id("offer-tile-button"),
            main_header: Locator::test_id("main-header"),
        }
    }
}

/// Result of filling in the participants dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantsSelection {
    /// Summary shown in the dropdown field, e.g. "2 dorosłych, 1 dziecko"
    pub summary: String,
    /// `None` when the calendar had fewer year tiles than requested
    pub birth_year: Option<PollOutcome>,
}

pub struct HomePage {
    base: BasePage,
    locators: HomeLocators,
    base_url: Url,
    calendar_poll: PollConfig,
    calendar_settle: Duration,
}

impl HomePage {
    pub fn new(session: &BrowserSession, config: &RunConfig) -> Result<Self> {
        let base = BasePage::new(
            session.page().clone(),
            Poller::new(),
            config.navigation_poll()?,
        );

        Ok(Self {
            base,
            locators: HomeLocators::new(),
            base_url: config.base_url.clone(),
            calendar_poll: config.poll,
            calendar_settle: config.calendar_settle,
        })
    }

    pub async fn navigate_to_homepage(&self) -> Result<()> {
        self.base.navigate(self.base_url.as_str()).await?;
        self.base.accept_cookies().await?;
        Ok(())
    }

    pub async fn verify_page_loaded(&self) -> Result<()> {
        self.wait_visible(&self.locators.main_header).await?;
        Ok(())
    }

    /// Tick the `index`-th departure airport; returns the dropdown's summary
    pub async fn select_departure_airport(&self, index: usize) -> Result<String> {
        self.pick_checkbox(
            &self.locators.airport_dropdown,
            &self.locators.airport_checkboxes,
            index,
        )
        .await
    }

    pub async fn select_destination(&self, index: usize) -> Result<String> {
        self.pick_checkbox(
            &self.locators.destination_dropdown,
            &self.locators.destination_checkboxes,
            index,
        )
        .await
    }

    pub async fn select_first_available_date(&self) -> Result<()> {
        self.click(&self.locators.date_dropdown).await?;

        let dates = self.locators.available_dates.all(self.base.page()).await?;
        match dates.first() {
            Some(date) => {
                date.click().await?;
                self.click(&self.locators.select_button).await
            }
            None => {
                tracing::warn!("No available travel dates, keeping the default");
                Ok(())
            }
        }
    }

    /// Add one child and pick its birth date from the calendar
    pub async fn configure_participants(
        &self,
        birth: BirthDatePick,
    ) -> Result<ParticipantsSelection> {
        self.click(&self.locators.participants_dropdown).await?;
        self.base.wait_for_load().await?;
        self.click(&self.locators.add_child_button).await?;
        self.click(&self.locators.birth_date_button).await?;
        self.base.wait_for_load().await?;

        let birth_year = self.select_child_birth_year(birth.year_index).await?;
        self.select_child_birth_month(birth.month_index).await?;
        self.select_child_birth_day(birth.day_index).await?;

        self.click(&self.locators.select_button).await?;

        let summary = self
            .locators
            .participants_dropdown
            .text(self.base.page())
            .await?;
        tracing::info!("Participants: {}", summary);

        Ok(ParticipantsSelection {
            summary,
            birth_year,
        })
    }

    /// The year view animates in and its tiles flicker; this is the one
    /// click that goes through the bounded poll instead of a plain wait.
    async fn select_child_birth_year(&self, index: usize) -> Result<Option<PollOutcome>> {
        self.base.pause(self.calendar_settle).await;

        let years = self.locators.available_years.all(self.base.page()).await?;
        let Some(year) = years.get(index) else {
            tracing::warn!(
                "Only {} birth year tile(s), cannot pick index {}",
                years.len(),
                index
            );
            return Ok(None);
        };

        let outcome = self
            .base
            .poller()
            .poll_and_act(year, self.calendar_poll)
            .await?;

        if outcome == PollOutcome::TimedOut {
            tracing::warn!(
                "Birth year tile {} never became visible within {}ms",
                index,
                self.calendar_poll.timeout().as_millis()
            );
        }

        Ok(Some(outcome))
    }

    async fn select_child_birth_month(&self, index: usize) -> Result<()> {
        let months = self.locators.available_months.all(self.base.page()).await?;
        let Some(month) = months.get(index) else {
            tracing::warn!(
                "Only {} month tile(s), cannot pick index {}",
                months.len(),
                index
            );
            return Ok(());
        };

        self.base.wait_for_load().await?;
        self.wait_until_ready(month).await?;
        month.click().await
    }

    async fn select_child_birth_day(&self, index: usize) -> Result<()> {
        let days = self.locators.available_days.all(self.base.page()).await?;
        if days.is_empty() {
            tracing::warn!("No selectable birth days");
            return Ok(());
        }

        let day = days.get(index).ok_or_else(|| {
            Error::ElementNotFound(format!(
                "{} (index {} of {})",
                AVAILABLE_DAYS,
                index,
                days.len()
            ))
        })?;

        self.base.wait_for_load().await?;
        day.click().await
    }

    pub async fn click_search_button(&self) -> Result<()> {
        self.click(&self.locators.search_button).await
    }

    pub async fn click_first_offer_tile(&self) -> Result<()> {
        // Results render asynchronously after the search
        self.wait_visible(&self.locators.offer_tiles).await?;

        let tiles = self.locators.offer_tiles.all(self.base.page()).await?;
        match tiles.first() {
            Some(tile) => tile.click().await,
            None => Err(Error::ElementNotFound(
                self.locators.offer_tiles.selector().to_string(),
            )),
        }
    }

    /// Open the offer, which the site shows in a new tab, and follow it
    pub async fn click_view_offer_button(&mut self, session: &mut BrowserSession) -> Result<()> {
        let button = self.wait_visible(&self.locators.view_offer_button).await?;

        let known: HashSet<String> = session
            .pages()
            .await?
            .iter()
            .map(|page| page.target_id().inner().clone())
            .collect();

        button.click().await?;

        let known = &known;
        let tabs = &*session;
        let opened = self
            .base
            .poller()
            .wait_until(
                move || async move {
                    let pages = tabs.pages().await?;
                    Ok::<_, Error>(
                        pages
                            .into_iter()
                            .find(|page| !known.contains(page.target_id().inner())),
                    )
                },
                self.base.wait_config(),
            )
            .await
            .ok_or_else(|| Error::WaitTimeout {
                what: "the offer to open in a new tab".to_string(),
                timeout_ms: self.base.wait_config().timeout().as_millis(),
            })?;

        tracing::info!("Offer opened in a new tab");
        session.switch_to(opened.clone());
        self.base.set_page(opened);
        self.base.wait_for_load().await
    }

    /// Whether `text` becomes visible on the current page within the page budget
    pub async fn is_text_shown(&self, text: &str) -> Result<bool> {
        self.base.wait_for_text(text).await
    }

    async fn pick_checkbox(
        &self,
        dropdown: &Locator,
        checkboxes: &Locator,
        index: usize,
    ) -> Result<String> {
        self.click(dropdown).await?;

        let boxes = checkboxes.all(self.base.page()).await?;
        if boxes.is_empty() {
            tracing::warn!("No options behind {}", dropdown.selector());
            return Ok(String::new());
        }

        let option = boxes.get(index).ok_or_else(|| {
            Error::ElementNotFound(format!(
                "{} (index {} of {})",
                checkboxes.selector(),
                index,
                boxes.len()
            ))
        })?;
        option.click().await?;
        self.click(&self.locators.select_button).await?;

        dropdown.text(self.base.page()).await
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        locator
            .click(self.base.page(), self.base.poller(), self.base.wait_config())
            .await
    }

    async fn wait_visible(&self, locator: &Locator) -> Result<ElementTarget> {
        locator
            .wait_visible(self.base.page(), self.base.poller(), self.base.wait_config())
            .await
    }

    async fn wait_until_ready(&self, target: &ElementTarget) -> Result<()> {
        let ready = self
            .base
            .poller()
            .wait_until(
                || async move {
                    target.is_ready().await.map(|ready| ready.then_some(()))
                },
                self.base.wait_config(),
            )
            .await;

        ready.ok_or_else(|| Error::WaitTimeout {
            what: format!("'{}' to become visible", target.selector()),
            timeout_ms: self.base.wait_config().timeout().as_millis(),
        })
    }
}
