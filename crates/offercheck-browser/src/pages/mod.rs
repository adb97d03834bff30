mod base;
mod home;

pub use base::BasePage;
pub use home::{HomePage, ParticipantsSelection};
