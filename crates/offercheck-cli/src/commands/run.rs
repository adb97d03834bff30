use crate::OutputFormat;
use anyhow::{Result, anyhow, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use offercheck_browser::{BrowserSession, ChromeFinder, ChromeLauncher, ProfileManager, run_flow};
use offercheck_core::{FlowReport, RunConfig, Scenario};
use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;

/// Flags of the `run` command, already parsed
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub config: RunConfig,
    pub profile: Option<String>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Kills Chrome when the run ends, however it ends
struct ChromeProcess(Child);

impl Drop for ChromeProcess {
    fn drop(&mut self) {
        if let Err(e) = self.0.kill() {
            tracing::debug!("Chrome already exited: {}", e);
        }
        let _ = self.0.wait();
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    args.config.validate()?;

    let scenario = match args.seed {
        Some(seed) => Scenario::seeded(seed)?,
        None => Scenario::random()?,
    };
    tracing::debug!("Scenario: {:?}", scenario);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(drive(&args, scenario))?;

    if let Some(path) = &args.output {
        report.write_json(path)?;
    }

    match args.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Pretty => print_pretty(&report),
    }

    if !report.offer_confirmed {
        bail!("{}", failure_summary(&report));
    }

    Ok(())
}

async fn drive(args: &RunArgs, scenario: Scenario) -> Result<FlowReport> {
    let config = &args.config;

    let chrome_binary = ChromeFinder::new(config.chrome_path.clone()).find()?;
    tracing::info!("Found Chrome at: {}", chrome_binary.display());

    let profile = match &args.profile {
        Some(name) => ProfileManager::named(name)?,
        None => ProfileManager::temporary()?,
    };
    tracing::debug!("Using profile: {}", profile.path().display());

    let launcher = ChromeLauncher::new(
        chrome_binary,
        profile.path().to_path_buf(),
        config.debugging_port,
    )
    .headless(config.headless);
    let _chrome = ChromeProcess(launcher.launch()?);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .map_err(|e| anyhow!("Invalid spinner template: {}", e))?,
    );
    spinner.set_message("Connecting to Chrome...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let connected = BrowserSession::connect(launcher.debugging_port()).await;
    spinner.finish_and_clear();
    let mut session = connected?;

    let report = run_flow(&mut session, config, scenario).await?;

    // Session must close before Chrome is killed and the profile removed
    drop(session);
    Ok(report)
}

fn print_pretty(report: &FlowReport) {
    let verdict = if report.offer_confirmed {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    };

    println!("{} {}", verdict, report.base_url);
    if let Some(seed) = report.scenario.seed {
        println!("  Seed:              {}", seed);
    }
    println!(
        "  Departure airport: {}",
        report.departure_airport.as_deref().unwrap_or("-")
    );
    println!(
        "  Destination:       {}",
        report.destination.as_deref().unwrap_or("-")
    );
    println!(
        "  Participants:      {}",
        report.participants.as_deref().unwrap_or("-")
    );
    println!();

    for step in &report.steps {
        let line = format!("  {:<30} {:>7}ms", step.name, step.duration_ms);
        match &step.note {
            Some(note) => println!("{}  {}", style(line).yellow(), note),
            None => println!("{}", line),
        }
    }
    println!(
        "  {:<30} {:>7}ms",
        "total",
        report.total_duration().as_millis()
    );

    let warnings = report.warnings().count();
    if warnings > 0 {
        println!("  {} step(s) with warnings", warnings);
    }
    if let Some(step) = &report.failed_step {
        println!("  {} {}", style("Stopped at").red(), step);
    }
}

fn failure_summary(report: &FlowReport) -> String {
    match (&report.failed_step, &report.error) {
        (Some(step), Some(error)) => format!("Flow failed at {}: {}", step, error),
        (None, Some(error)) => format!("Flow failed: {}", error),
        _ => format!(
            "Offer page did not show the selected participants ({})",
            report.participants.as_deref().unwrap_or("none")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offercheck_core::{BirthDatePick, Scenario};

    fn report() -> FlowReport {
        FlowReport::new(
            "https://www.tui.pl/",
            Scenario {
                airport_index: 3,
                destination_index: 0,
                birth_date: BirthDatePick {
                    year_index: 0,
                    month_index: 0,
                    day_index: 0,
                },
                seed: None,
            },
        )
    }

    #[test]
    fn test_failure_summary_names_failed_step() {
        let mut report = report();
        report.record_step("select_destination", Duration::from_millis(5), None);
        report.record_failure("select_destination", "No element matches selector: label");

        assert_eq!(
            failure_summary(&report),
            "Flow failed at select_destination: No element matches selector: label"
        );
    }

    #[test]
    fn test_failure_summary_without_failed_step() {
        let mut report = report();
        report.participants = Some("2 dorosłych".to_string());

        assert_eq!(
            failure_summary(&report),
            "Offer page did not show the selected participants (2 dorosłych)"
        );
    }
}
