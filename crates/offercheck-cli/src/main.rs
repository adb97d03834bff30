use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use offercheck_cli::OutputFormat;
use offercheck_cli::commands;
use offercheck_core::config::{DEFAULT_BASE_URL, DEFAULT_DEBUGGING_PORT};
use offercheck_core::{PollConfig, RunConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "offercheck")]
#[command(author, version, long_about = None)]
#[command(
    about = "End-to-end check of a travel site's search-and-offer flow",
    long_about = "offercheck drives Chrome through the booking search: it picks a departure \
                  airport, a destination, a date and a child's birth date, searches, opens the \
                  first offer and checks that the offer page shows the chosen participants."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search-and-offer flow in Chrome
    Run {
        /// Site under test
        #[arg(long, env = "OFFERCHECK_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Path to the Chrome binary (auto-detected when omitted)
        #[arg(long, value_name = "PATH")]
        chrome_path: Option<PathBuf>,

        /// Run Chrome without a window
        #[arg(long)]
        headless: bool,

        /// Chrome remote debugging port
        #[arg(long, default_value_t = DEFAULT_DEBUGGING_PORT)]
        port: u16,

        /// Reuse a named Chrome profile instead of a temporary one
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Seed for the random scenario, to replay a previous run
        #[arg(long)]
        seed: Option<u64>,

        /// Budget for the flaky calendar clicks, in milliseconds
        #[arg(long, default_value_t = 5000, value_name = "MS")]
        poll_timeout_ms: u64,

        /// Delay between readiness checks, in milliseconds
        #[arg(long, default_value_t = 100, value_name = "MS")]
        poll_interval_ms: u64,

        /// Pause before reading the birth-year calendar, in milliseconds
        #[arg(long, default_value_t = 3000, value_name = "MS")]
        calendar_settle_ms: u64,

        /// Budget for page loads and element waits, in seconds
        #[arg(long, default_value_t = 30, value_name = "SECS")]
        navigation_timeout: u64,

        /// Also write the JSON report to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print randomised flow inputs without launching a browser
    Scenario {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Number of scenarios to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: offercheck completion --shell bash >> ~/.bashrc\n  \
        zsh:  offercheck completion --shell zsh > ~/.zfunc/_offercheck\n  \
        fish: offercheck completion --shell fish > ~/.config/fish/completions/offercheck.fish")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            base_url,
            chrome_path,
            headless,
            port,
            profile,
            seed,
            poll_timeout_ms,
            poll_interval_ms,
            calendar_settle_ms,
            navigation_timeout,
            output,
        } => {
            let mut config = RunConfig::new(&base_url)?;
            config.chrome_path = chrome_path;
            config.headless = headless;
            config.debugging_port = port;
            config.poll = PollConfig::from_millis(poll_timeout_ms, poll_interval_ms)?;
            config.calendar_settle = Duration::from_millis(calendar_settle_ms);
            config.navigation_timeout = Duration::from_secs(navigation_timeout);

            commands::run::execute(commands::run::RunArgs {
                config,
                profile,
                seed,
                output,
                format: cli.format,
            })
        }
        Commands::Scenario { seed, count } => commands::scenario::execute(seed, count, cli.format),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command(), &mut std::io::stdout())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("offercheck_cli=debug,offercheck_core=debug,offercheck_browser=debug")
    } else {
        EnvFilter::new("offercheck_cli=info,offercheck_core=info,offercheck_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
