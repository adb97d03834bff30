mod chrome_finder;
mod element;
mod error;
pub mod flow;
mod launcher;
mod locator;
pub mod pages;
mod profile;
mod session;

pub use chrome_finder::ChromeFinder;
pub use element::ElementTarget;
pub use error::{Error, Result};
pub use flow::run_flow;
pub use launcher::ChromeLauncher;
pub use locator::{Locator, PageLocator};
pub use profile::ProfileManager;
pub use session::BrowserSession;
