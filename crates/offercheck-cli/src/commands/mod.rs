pub mod completion;
pub mod run;
pub mod scenario;
