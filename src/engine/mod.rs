mod executor;
mod state;

pub use executor::{Executor, ExecutorBuilder};
pub use state::{AttemptRecord, AttemptStatus, ExecutorState};
