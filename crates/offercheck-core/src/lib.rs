pub mod config;
pub mod error;
pub mod poll;
pub mod random;
pub mod report;
pub mod scenario;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use poll::{Clock, PollConfig, PollOutcome, PollTarget, Poller, SystemClock};
pub use report::{FlowReport, StepRecord};
pub use scenario::{BirthDatePick, Scenario};
