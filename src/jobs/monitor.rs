use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use super::kind::{JobKind, JobSchedule};
use super::poller::{CycleToken, JobPoller, Tick};

/// The re-fetch half of a cycle: `fetch` loads fresh data, `apply` shows it.
struct Refetch<R, A> {
	fetch: R,
	apply: A,
}

/// Reactive driver for a [`JobPoller`]: runs the start request, owns the poll
/// timer and mirrors the poller's state into signals for the view.
#[derive(Clone, Copy)]
pub struct JobMonitor {
	kind: JobKind,
	poller: StoredValue<JobPoller>,
	pending: StoredValue<Option<TimeoutHandle>>,
	running: RwSignal<bool>,
	error: RwSignal<Option<String>>,
}

impl JobMonitor {
	/// Create a monitor owned by the current reactive scope. Its live cycle is
	/// cancelled when the scope is cleaned up.
	pub fn new(kind: JobKind, schedule: JobSchedule) -> Self {
		let monitor = Self {
			kind,
			poller: StoredValue::new(JobPoller::new(kind, schedule)),
			pending: StoredValue::new(None),
			running: RwSignal::new(false),
			error: RwSignal::new(None),
		};
		on_cleanup(move || monitor.cancel());
		monitor
	}

	/// The job this monitor drives.
	pub fn kind(&self) -> JobKind {
		self.kind
	}

	/// Tracked. True from the start request until the last poll.
	pub fn is_running(&self) -> bool {
		self.running.get()
	}

	/// Tracked. Message from the last failed start or poll.
	pub fn error(&self) -> Option<String> {
		self.error.get()
	}

	/// Kick off the job with `start_job`, then call `refetch` on the kind's
	/// schedule until the attempt ceiling is reached or a refetch fails.
	///
	/// Each refetched value is handed to `apply` only if its cycle is still
	/// the live one, or the one that just finished with no newer start.
	pub fn start<S, SF, R, RF, T, A, E>(&self, start_job: S, refetch: R, apply: A)
	where
		S: FnOnce() -> SF + 'static,
		SF: Future<Output = Result<(), E>> + 'static,
		R: Fn() -> RF + Clone + 'static,
		RF: Future<Output = Result<T, E>> + 'static,
		T: 'static,
		A: Fn(T) + Clone + 'static,
		E: Display + 'static,
	{
		let monitor = *self;
		let Some(started) = monitor.poller.try_update_value(|p| p.start(Utc::now())) else {
			return;
		};
		let token = match started {
			Ok(token) => token,
			Err(err) => {
				warn!("{err}");
				monitor.error.try_set(Some(err.to_string()));
				return;
			}
		};
		monitor.clear_pending();
		monitor.sync();

		spawn_local(async move {
			match start_job().await {
				Ok(()) => {
					if let Some(Some(delay)) = monitor.poller.try_update_value(|p| p.accepted(token)) {
						monitor.schedule(token, delay, Refetch { fetch: refetch, apply });
					}
				}
				Err(err) => {
					monitor
						.poller
						.try_update_value(|p| p.start_failed(token, err.to_string()));
				}
			}
			monitor.sync();
		});
	}

	/// Drop the live cycle and its pending timer.
	pub fn cancel(&self) {
		self.poller.try_update_value(|p| p.cancel());
		self.clear_pending();
		self.sync();
	}

	fn schedule<R, RF, T, A, E>(self, token: CycleToken, delay: Duration, refetch: Refetch<R, A>)
	where
		R: Fn() -> RF + Clone + 'static,
		RF: Future<Output = Result<T, E>> + 'static,
		T: 'static,
		A: Fn(T) + Clone + 'static,
		E: Display + 'static,
	{
		match set_timeout_with_handle(move || self.on_tick(token, refetch), delay) {
			Ok(handle) => {
				self.pending.try_update_value(|p| *p = Some(handle));
			}
			Err(err) => {
				self.poller
					.try_update_value(|p| p.poll_failed(token, format!("timer unavailable: {err:?}")));
				self.sync();
			}
		}
	}

	fn on_tick<R, RF, T, A, E>(self, token: CycleToken, refetch: Refetch<R, A>)
	where
		R: Fn() -> RF + Clone + 'static,
		RF: Future<Output = Result<T, E>> + 'static,
		T: 'static,
		A: Fn(T) + Clone + 'static,
		E: Display + 'static,
	{
		let Some(Tick::Refetch { attempt, next }) = self.poller.try_update_value(|p| p.tick(token))
		else {
			debug!("{}: ignoring tick from cycle {}", self.kind, token);
			return;
		};
		debug!("{}: poll {} of cycle {}", self.kind, attempt, token);
		self.pending.try_update_value(|p| *p = None);

		let fetch = (refetch.fetch)();
		let apply = refetch.apply.clone();
		if let Some(delay) = next {
			self.schedule(token, delay, refetch);
		}
		self.sync();

		spawn_local(async move {
			let result = fetch.await;
			let Some(live) = self.poller.try_with_value(|p| p.accepts_result(token)) else {
				return;
			};
			if !live {
				debug!("{}: dropping result of cycle {}", self.kind, token);
				return;
			}
			match result {
				Ok(value) => apply(value),
				Err(err) => {
					let ended = self
						.poller
						.try_update_value(|p| p.poll_failed(token, err.to_string()));
					if ended == Some(true) {
						self.clear_pending();
						self.sync();
					}
				}
			}
		});
	}

	fn clear_pending(&self) {
		if let Some(Some(handle)) = self.pending.try_update_value(|p| p.take()) {
			handle.clear();
		}
	}

	fn sync(&self) {
		let Some((running, error)) = self
			.poller
			.try_with_value(|p| (p.is_running(), p.last_error().map(ToString::to_string)))
		else {
			return;
		};
		self.running.try_set(running);
		self.error.try_set(error);
	}
}
