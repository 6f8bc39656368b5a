use std::fmt;
use std::time::Duration;

/// Long-running server computations the client can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
	/// Search news sources for mentions of contacts in rotation.
	FetchMentions,
	/// Scan stored mention snippets for links between contacts.
	DiscoverFromMentions,
	/// Mention scan plus web search for links between contacts.
	DiscoverAll,
}

impl JobKind {
	/// Start endpoint, relative to the API base.
	pub fn endpoint(self) -> &'static str {
		match self {
			JobKind::FetchMentions => "jobs/fetch-mentions",
			JobKind::DiscoverFromMentions => "jobs/discover-connections-from-mentions",
			JobKind::DiscoverAll => "jobs/discover-all-connections",
		}
	}

	/// Lowercase name for logs and messages.
	pub fn label(self) -> &'static str {
		match self {
			JobKind::FetchMentions => "fetch mentions",
			JobKind::DiscoverFromMentions => "discover connections from mentions",
			JobKind::DiscoverAll => "discover all connections",
		}
	}
}

impl fmt::Display for JobKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Poll cadence for one job kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobSchedule {
	/// Wait between the job being accepted and the first re-fetch.
	pub initial_delay: Duration,
	/// Wait between later re-fetches.
	pub interval: Duration,
	/// Re-fetches before the cycle ends, whether or not new data showed up.
	pub max_attempts: u32,
	/// A new start cancels the live cycle instead of being rejected.
	pub restartable: bool,
}

impl JobSchedule {
	/// Re-fetch every `every`, `attempts` times.
	pub const fn recurring(every: Duration, attempts: u32) -> Self {
		Self {
			initial_delay: every,
			interval: every,
			max_attempts: attempts,
			restartable: false,
		}
	}

	/// One re-fetch after `delay`.
	pub const fn single_shot(delay: Duration) -> Self {
		Self {
			initial_delay: delay,
			interval: delay,
			max_attempts: 1,
			restartable: false,
		}
	}

	/// Let a new start replace the live cycle.
	pub const fn restartable(mut self) -> Self {
		self.restartable = true;
		self
	}

	/// Time from acceptance to the last re-fetch.
	pub fn ceiling(&self) -> Duration {
		self.initial_delay + self.interval * self.max_attempts.saturating_sub(1)
	}
}

/// Schedules for every [`JobKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobSchedules {
	/// Dashboard's "Refresh mentions now".
	pub fetch_mentions: JobSchedule,
	/// "From mentions only" on the map.
	pub discover_from_mentions: JobSchedule,
	/// "Discover all connections" on the map.
	pub discover_all: JobSchedule,
}

impl JobSchedules {
	/// The schedule `kind` polls on.
	pub fn for_kind(&self, kind: JobKind) -> JobSchedule {
		match kind {
			JobKind::FetchMentions => self.fetch_mentions,
			JobKind::DiscoverFromMentions => self.discover_from_mentions,
			JobKind::DiscoverAll => self.discover_all,
		}
	}
}

impl Default for JobSchedules {
	fn default() -> Self {
		Self {
			fetch_mentions: JobSchedule::recurring(Duration::from_secs(10), 6).restartable(),
			discover_from_mentions: JobSchedule::single_shot(Duration::from_secs(3)),
			discover_all: JobSchedule::single_shot(Duration::from_secs(5)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_cadence() {
		let schedules = JobSchedules::default();
		let mentions = schedules.for_kind(JobKind::FetchMentions);
		assert_eq!(mentions.ceiling(), Duration::from_secs(60));
		assert!(mentions.restartable);

		let all = schedules.for_kind(JobKind::DiscoverAll);
		assert_eq!(all.max_attempts, 1);
		assert_eq!(all.ceiling(), Duration::from_secs(5));
		assert!(!all.restartable);
	}

	#[test]
	fn endpoints_are_distinct() {
		let kinds = [
			JobKind::FetchMentions,
			JobKind::DiscoverFromMentions,
			JobKind::DiscoverAll,
		];
		let mut endpoints: Vec<_> = kinds.iter().map(|k| k.endpoint()).collect();
		endpoints.sort_unstable();
		endpoints.dedup();
		assert_eq!(endpoints.len(), kinds.len());
	}
}
