//! Server-side jobs: start, then poll until the attempt ceiling.

mod kind;
mod monitor;
mod poller;

pub use kind::{JobKind, JobSchedule, JobSchedules};
pub use monitor::JobMonitor;
pub use poller::{CycleToken, JobError, JobPoller, JobRun, JobState, Tick};
