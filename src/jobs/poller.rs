use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use super::kind::{JobKind, JobSchedule};

/// Why a cycle did not run to its ceiling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
	/// A second start of a kind that cannot restart.
	#[error("{0} is already running")]
	AlreadyRunning(JobKind),
	/// The start request was rejected or failed.
	#[error("could not start {kind}: {message}")]
	StartFailed { kind: JobKind, message: String },
	/// A re-fetch failed.
	#[error("{kind} stopped early: {message}")]
	PollFailed { kind: JobKind, message: String },
}

/// Identity of one polling cycle. Callbacks carry the token they were
/// scheduled under and are ignored once it is no longer current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CycleToken(u64);

impl fmt::Display for CycleToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Phase of the live cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
	/// No live cycle.
	Idle,
	/// Start request sent, no answer yet.
	Starting,
	/// Job accepted, re-fetching on a timer.
	Polling,
}

/// The most recent cycle of a job kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRun {
	/// Job the cycle belongs to.
	pub kind: JobKind,
	/// When `start` was called.
	pub started_at: DateTime<Utc>,
	/// Ticks so far.
	pub poll_count: u32,
	/// Still the live cycle.
	pub active: bool,
}

/// What a timer callback should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
	/// The cycle was cancelled or replaced. Do nothing.
	Stale,
	/// Re-fetch the data. `next` is the wait before the following tick, `None`
	/// when this was the last one and the poller is already idle.
	Refetch { attempt: u32, next: Option<Duration> },
}

/// Start-then-poll state machine for one job kind.
///
/// Holds no timers itself: callers schedule callbacks from the delays it hands
/// back and feed the cycle token into every transition.
#[derive(Clone, Debug)]
pub struct JobPoller {
	kind: JobKind,
	schedule: JobSchedule,
	state: JobState,
	token: Option<CycleToken>,
	/// Cycle that ran to its last tick, until the next start or cancel. Its
	/// final re-fetch may still be in flight.
	finished: Option<CycleToken>,
	issued: u64,
	run: Option<JobRun>,
	last_error: Option<JobError>,
}

impl JobPoller {
	/// An idle poller.
	pub fn new(kind: JobKind, schedule: JobSchedule) -> Self {
		Self {
			kind,
			schedule,
			state: JobState::Idle,
			token: None,
			finished: None,
			issued: 0,
			run: None,
			last_error: None,
		}
	}

	/// The job this poller tracks.
	pub fn kind(&self) -> JobKind {
		self.kind
	}

	/// Where the live cycle is, or `Idle`.
	pub fn state(&self) -> JobState {
		self.state
	}

	/// True from `start` until the cycle finishes, fails or is cancelled.
	pub fn is_running(&self) -> bool {
		self.state != JobState::Idle
	}

	/// The latest cycle, live or not.
	pub fn run(&self) -> Option<&JobRun> {
		self.run.as_ref()
	}

	/// Why the latest cycle ended early, if it did.
	pub fn last_error(&self) -> Option<&JobError> {
		self.last_error.as_ref()
	}

	/// `token` names the live cycle.
	pub fn is_current(&self, token: CycleToken) -> bool {
		self.token == Some(token)
	}

	/// Whether data re-fetched under `token` may still be shown: the cycle is
	/// live, or it just ran its last tick and nothing has started since.
	pub fn accepts_result(&self, token: CycleToken) -> bool {
		self.is_current(token) || self.finished == Some(token)
	}

	/// Open a new cycle. A restartable kind drops its live cycle first; any
	/// other kind refuses while not idle.
	pub fn start(&mut self, now: DateTime<Utc>) -> Result<CycleToken, JobError> {
		if self.is_running() && !self.schedule.restartable {
			return Err(JobError::AlreadyRunning(self.kind));
		}
		if let Some(old) = self.token.take() {
			debug!("{}: cycle {} replaced", self.kind, old);
		}

		self.issued += 1;
		let token = CycleToken(self.issued);
		self.token = Some(token);
		self.finished = None;
		self.state = JobState::Starting;
		self.last_error = None;
		self.run = Some(JobRun {
			kind: self.kind,
			started_at: now,
			poll_count: 0,
			active: true,
		});
		info!("{}: starting cycle {}", self.kind, token);
		Ok(token)
	}

	/// The server accepted the job. Returns the wait before the first tick.
	pub fn accepted(&mut self, token: CycleToken) -> Option<Duration> {
		if !self.is_current(token) || self.state != JobState::Starting {
			return None;
		}
		self.state = JobState::Polling;
		Some(self.schedule.initial_delay)
	}

	/// The start request failed. Returns false when the failure belongs to a
	/// stale cycle and was discarded.
	pub fn start_failed(&mut self, token: CycleToken, message: impl Into<String>) -> bool {
		if !self.is_current(token) || self.state != JobState::Starting {
			return false;
		}
		let error = JobError::StartFailed {
			kind: self.kind,
			message: message.into(),
		};
		warn!("{error}");
		self.finish();
		self.last_error = Some(error);
		true
	}

	/// A timer fired.
	pub fn tick(&mut self, token: CycleToken) -> Tick {
		if !self.is_current(token) || self.state != JobState::Polling {
			return Tick::Stale;
		}
		let Some(run) = self.run.as_mut() else {
			return Tick::Stale;
		};
		run.poll_count += 1;
		let attempt = run.poll_count;

		if attempt >= self.schedule.max_attempts {
			debug!("{}: cycle {} done after {} polls", self.kind, token, attempt);
			self.finish();
			self.finished = Some(token);
			Tick::Refetch {
				attempt,
				next: None,
			}
		} else {
			Tick::Refetch {
				attempt,
				next: Some(self.schedule.interval),
			}
		}
	}

	/// A re-fetch failed. Ends the cycle early and records the error, including
	/// for the final re-fetch of a finished cycle; false when stale.
	pub fn poll_failed(&mut self, token: CycleToken, message: impl Into<String>) -> bool {
		if !self.accepts_result(token) {
			return false;
		}
		let error = JobError::PollFailed {
			kind: self.kind,
			message: message.into(),
		};
		warn!("{error}");
		self.finish();
		self.last_error = Some(error);
		true
	}

	/// Invalidate the live cycle, if any. Used on teardown.
	pub fn cancel(&mut self) -> Option<CycleToken> {
		self.finished = None;
		let token = self.token?;
		debug!("{}: cycle {} cancelled", self.kind, token);
		self.finish();
		Some(token)
	}

	fn finish(&mut self) {
		self.state = JobState::Idle;
		self.token = None;
		self.finished = None;
		if let Some(run) = self.run.as_mut() {
			run.active = false;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::jobs::JobSchedules;

	fn poller(kind: JobKind) -> JobPoller {
		JobPoller::new(kind, JobSchedules::default().for_kind(kind))
	}

	#[test]
	fn recurring_cycle_runs_to_ceiling() {
		let mut p = poller(JobKind::FetchMentions);
		let token = p.start(Utc::now()).unwrap();
		assert_eq!(p.state(), JobState::Starting);
		assert!(p.is_running());

		assert_eq!(p.accepted(token), Some(Duration::from_secs(10)));
		assert_eq!(p.state(), JobState::Polling);

		for attempt in 1..6 {
			assert_eq!(
				p.tick(token),
				Tick::Refetch {
					attempt,
					next: Some(Duration::from_secs(10)),
				}
			);
			assert!(p.is_running());
		}
		assert_eq!(
			p.tick(token),
			Tick::Refetch {
				attempt: 6,
				next: None,
			}
		);
		assert!(!p.is_running());
		assert_eq!(p.tick(token), Tick::Stale);

		let run = p.run().unwrap();
		assert_eq!(run.poll_count, 6);
		assert!(!run.active);
		assert!(p.last_error().is_none());
	}

	#[test]
	fn single_shot_polls_once() {
		let mut p = poller(JobKind::DiscoverFromMentions);
		let token = p.start(Utc::now()).unwrap();
		assert_eq!(p.accepted(token), Some(Duration::from_secs(3)));
		assert_eq!(
			p.tick(token),
			Tick::Refetch {
				attempt: 1,
				next: None,
			}
		);
		assert_eq!(p.state(), JobState::Idle);
	}

	#[test]
	fn non_restartable_kind_rejects_overlap() {
		let mut p = poller(JobKind::DiscoverAll);
		let token = p.start(Utc::now()).unwrap();
		assert_eq!(
			p.start(Utc::now()),
			Err(JobError::AlreadyRunning(JobKind::DiscoverAll))
		);
		assert!(p.is_current(token));

		p.accepted(token);
		assert!(p.start(Utc::now()).is_err());
		p.tick(token);
		assert!(p.start(Utc::now()).is_ok());
	}

	#[test]
	fn restart_leaves_exactly_one_live_cycle() {
		let mut p = poller(JobKind::FetchMentions);
		let first = p.start(Utc::now()).unwrap();
		p.accepted(first);
		assert!(matches!(p.tick(first), Tick::Refetch { attempt: 1, .. }));

		let second = p.start(Utc::now()).unwrap();
		assert_ne!(first, second);
		assert!(!p.is_current(first));

		// Timers from the first cycle that were already queued.
		assert_eq!(p.tick(first), Tick::Stale);
		assert_eq!(p.accepted(first), None);
		assert!(!p.poll_failed(first, "late"));
		assert_eq!(p.state(), JobState::Starting);
		assert_eq!(p.run().unwrap().poll_count, 0);

		p.accepted(second);
		assert!(matches!(p.tick(second), Tick::Refetch { attempt: 1, .. }));
		assert!(p.is_running());
		assert!(p.last_error().is_none());
	}

	#[test]
	fn late_accept_from_replaced_start_is_ignored() {
		let mut p = poller(JobKind::FetchMentions);
		let first = p.start(Utc::now()).unwrap();
		let second = p.start(Utc::now()).unwrap();

		assert_eq!(p.accepted(first), None);
		assert!(!p.start_failed(first, "timeout"));
		assert_eq!(p.state(), JobState::Starting);
		assert!(p.accepted(second).is_some());
	}

	#[test]
	fn start_failure_returns_to_idle() {
		let mut p = poller(JobKind::DiscoverAll);
		let token = p.start(Utc::now()).unwrap();
		assert!(p.start_failed(token, "HTTP 500"));
		assert_eq!(p.state(), JobState::Idle);
		assert_eq!(
			p.last_error().map(|e| e.to_string()),
			Some("could not start discover all connections: HTTP 500".to_string())
		);
		assert_eq!(p.tick(token), Tick::Stale);
	}

	#[test]
	fn poll_failure_ends_cycle_early() {
		let mut p = poller(JobKind::FetchMentions);
		let token = p.start(Utc::now()).unwrap();
		p.accepted(token);
		p.tick(token);
		assert!(p.poll_failed(token, "network down"));
		assert!(!p.is_running());
		assert!(matches!(p.last_error(), Some(JobError::PollFailed { .. })));
		assert_eq!(p.tick(token), Tick::Stale);
	}

	#[test]
	fn cancel_silences_pending_ticks() {
		let mut p = poller(JobKind::FetchMentions);
		let token = p.start(Utc::now()).unwrap();
		p.accepted(token);
		assert_eq!(p.cancel(), Some(token));
		assert_eq!(p.tick(token), Tick::Stale);
		assert_eq!(p.cancel(), None);
		assert!(!p.is_running());
	}

	#[test]
	fn new_start_clears_previous_error() {
		let mut p = poller(JobKind::DiscoverFromMentions);
		let token = p.start(Utc::now()).unwrap();
		p.start_failed(token, "boom");
		assert!(p.last_error().is_some());
		p.start(Utc::now()).unwrap();
		assert!(p.last_error().is_none());
	}

	#[test]
	fn late_result_of_finished_cycle_loses_to_new_start() {
		let mut p = poller(JobKind::FetchMentions);
		let first = p.start(Utc::now()).unwrap();
		p.accepted(first);
		for _ in 0..6 {
			p.tick(first);
		}
		assert!(!p.is_running());
		// The last re-fetch is still in flight and may land.
		assert!(p.accepts_result(first));

		let second = p.start(Utc::now()).unwrap();
		assert!(!p.accepts_result(first));
		assert!(!p.poll_failed(first, "late"));
		assert!(p.accepts_result(second));
		assert!(p.last_error().is_none());
	}

	#[test]
	fn replaced_cycle_results_are_refused_mid_flight() {
		let mut p = poller(JobKind::FetchMentions);
		let first = p.start(Utc::now()).unwrap();
		p.accepted(first);
		assert!(matches!(p.tick(first), Tick::Refetch { attempt: 1, .. }));
		assert!(p.accepts_result(first));

		let second = p.start(Utc::now()).unwrap();
		assert!(!p.accepts_result(first));
		assert!(p.accepts_result(second));
	}

	#[test]
	fn final_poll_failure_is_reported() {
		let mut p = poller(JobKind::DiscoverAll);
		let token = p.start(Utc::now()).unwrap();
		p.accepted(token);
		assert_eq!(
			p.tick(token),
			Tick::Refetch {
				attempt: 1,
				next: None,
			}
		);
		assert!(p.poll_failed(token, "HTTP 502"));
		assert!(matches!(p.last_error(), Some(JobError::PollFailed { .. })));
		assert!(!p.accepts_result(token));
	}

	#[test]
	fn cancel_refuses_in_flight_results() {
		let mut p = poller(JobKind::DiscoverFromMentions);
		let token = p.start(Utc::now()).unwrap();
		p.accepted(token);
		p.tick(token);
		assert!(p.accepts_result(token));
		p.cancel();
		assert!(!p.accepts_result(token));
	}
}
