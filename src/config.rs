//! App-wide settings, provided to components through context.

use leptos::prelude::*;

use crate::api::ApiClient;
use crate::jobs::JobSchedules;

/// Where the backend lives when no override is set at build time.
pub const DEFAULT_API_BASE: &str = "/api";

/// Backend location, job cadence and list sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Prefix for every backend path.
	pub api_base: String,
	/// Poll cadence per job kind.
	pub jobs: JobSchedules,
	/// Window and size of the dashboard's recent mention list.
	pub recent_mention_days: u32,
	/// Most mentions listed on the dashboard.
	pub recent_mention_limit: u32,
	/// Contacts offered by the rotation page's add picker.
	pub contact_picker_limit: u32,
	/// Rows on the contacts page.
	pub contact_list_limit: u32,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_API_BASE.to_string(),
			jobs: JobSchedules::default(),
			recent_mention_days: 7,
			recent_mention_limit: 20,
			contact_picker_limit: 400,
			contact_list_limit: 100,
		}
	}
}

impl AppConfig {
	/// Defaults, with `OUTREACH_API_BASE` from the build environment when set.
	pub fn from_build_env() -> Self {
		Self::with_api_base(option_env!("OUTREACH_API_BASE"))
	}

	fn with_api_base(api_base: Option<&str>) -> Self {
		let mut config = Self::default();
		if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
			config.api_base = base.to_string();
		}
		config
	}

	/// A backend client rooted at `api_base`.
	pub fn client(&self) -> ApiClient {
		ApiClient::new(&self.api_base)
	}
}

/// Config from context, or the defaults outside an [`App`](crate::App).
pub fn use_config() -> AppConfig {
	use_context::<AppConfig>().unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_override_keeps_default() {
		assert_eq!(AppConfig::with_api_base(Some("  ")).api_base, DEFAULT_API_BASE);
		assert_eq!(AppConfig::with_api_base(None).api_base, DEFAULT_API_BASE);
		assert_eq!(
			AppConfig::with_api_base(Some("https://crm.example/api")).client().base(),
			"https://crm.example/api"
		);
	}
}
