//! Client for the outreach REST backend.

mod types;

use gloo_net::http::{Request, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use types::{
	Connection, ConnectionList, Contact, ContactList, ContactPatch, ContactQuery, JobAccepted,
	Mention, MentionList, MentionQuery, NewConnection, OutreachEntry, OutreachList,
	RotationContact, RotationList, RotationUpdate,
};

use crate::graph::RawGraph;
use crate::jobs::JobKind;
use crate::rotation::RotationIdSet;

/// Anything that can go wrong talking to the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
	/// The request never got a response.
	#[error("network error: {0}")]
	Network(String),
	/// Non-2xx answer, with the backend's `detail` text.
	#[error("HTTP {status}: {detail}")]
	Status { status: u16, detail: String },
	/// The body did not have the expected shape.
	#[error("unexpected response: {0}")]
	Decode(String),
}

impl From<gloo_net::Error> for ApiError {
	fn from(err: gloo_net::Error) -> Self {
		match err {
			gloo_net::Error::SerdeError(err) => ApiError::Decode(err.to_string()),
			other => ApiError::Network(other.to_string()),
		}
	}
}

/// Handle on the backend. Cheap to clone; every page builds its own from the
/// app config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiClient {
	base: String,
}

impl ApiClient {
	/// Client for the backend at `base`, with or without a trailing slash.
	pub fn new(base: impl Into<String>) -> Self {
		let base = base.into();
		Self {
			base: base.trim_end_matches('/').to_string(),
		}
	}

	/// Base URL without a trailing slash.
	pub fn base(&self) -> &str {
		&self.base
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base, path.trim_start_matches('/'))
	}

	/// Send and return the body of a 2xx response.
	async fn body(request: Request) -> Result<String, ApiError> {
		let method = request.method();
		let url = request.url();
		let response = request.send().await?;
		let text = response.text().await?;
		if !response.ok() {
			log::warn!("{method:?} {url} -> {}", response.status());
			return Err(ApiError::Status {
				status: response.status(),
				detail: error_detail(&text),
			});
		}
		Ok(text)
	}

	async fn json<T: DeserializeOwned>(request: Request) -> Result<T, ApiError> {
		let text = Self::body(request).await?;
		serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
	}

	async fn get<T: DeserializeOwned>(&self, path: &str, pairs: &[(&str, String)]) -> Result<T, ApiError> {
		let request = Request::get(&self.url(path))
			.header("Accept", "application/json")
			.query(pairs.iter().map(|(key, value)| (*key, value)))
			.build()?;
		Self::json(request).await
	}

	fn with_json<B: Serialize>(builder: RequestBuilder, body: &B) -> Result<Request, ApiError> {
		Ok(builder.header("Accept", "application/json").json(body)?)
	}

	/// Relationship map nodes and links, unvalidated.
	pub async fn relationship_map(&self) -> Result<RawGraph, ApiError> {
		self.get("relationship-map", &[]).await
	}

	/// Contacts matching `query`, ordered by the backend.
	pub async fn contacts(&self, query: &ContactQuery) -> Result<ContactList, ApiError> {
		self.get("contacts", &query.pairs()).await
	}

	/// One contact by id.
	pub async fn contact(&self, id: i64) -> Result<Contact, ApiError> {
		self.get(&format!("contacts/{id}"), &[]).await
	}

	/// Apply a partial update to a contact.
	pub async fn update_contact(&self, id: i64, patch: &ContactPatch) -> Result<(), ApiError> {
		let request = Self::with_json(Request::patch(&self.url(&format!("contacts/{id}"))), patch)?;
		Self::body(request).await.map(drop)
	}

	/// Contacts currently in the mention rotation.
	pub async fn rotation(&self) -> Result<RotationList, ApiError> {
		self.get("contacts/rotation", &[]).await
	}

	/// Replace the whole rotation. Ids unknown to the backend are ignored there.
	pub async fn replace_rotation(&self, ids: &RotationIdSet) -> Result<RotationUpdate, ApiError> {
		let body = types::RotationReplace {
			contact_ids: ids.to_vec(),
		};
		let request = Self::with_json(Request::put(&self.url("contacts/rotation")), &body)?;
		Self::json(request).await
	}

	/// Connections touching one contact.
	pub async fn connections(&self, contact_id: i64) -> Result<ConnectionList, ApiError> {
		self.get(&format!("contacts/{contact_id}/connections"), &[]).await
	}

	/// Link `contact_id` to another contact.
	pub async fn add_connection(
		&self,
		contact_id: i64,
		connection: &NewConnection,
	) -> Result<Connection, ApiError> {
		let url = self.url(&format!("contacts/{contact_id}/connections"));
		Self::json(Self::with_json(Request::post(&url), connection)?).await
	}

	/// Delete one connection.
	pub async fn remove_connection(&self, contact_id: i64, connection_id: i64) -> Result<(), ApiError> {
		let url = self.url(&format!("contacts/{contact_id}/connections/{connection_id}"));
		Self::body(Request::delete(&url).build()?).await.map(drop)
	}

	/// Mentions, newest first.
	pub async fn mentions(&self, query: &MentionQuery) -> Result<MentionList, ApiError> {
		self.get("mentions", &query.pairs()).await
	}

	/// Outreach log for one contact, newest first.
	pub async fn outreach(&self, contact_id: i64) -> Result<OutreachList, ApiError> {
		self.get("outreach", &[("contact_id", contact_id.to_string())])
			.await
	}

	/// Fire a job. Returns as soon as the backend has queued it.
	pub async fn start_job(&self, kind: JobKind) -> Result<JobAccepted, ApiError> {
		let request = Request::post(&self.url(kind.endpoint()))
			.header("Accept", "application/json")
			.build()?;
		Self::json(request).await
	}
}

/// Pull FastAPI's `{"detail": ...}` out of an error body, falling back to the
/// raw text.
fn error_detail(body: &str) -> String {
	match serde_json::from_str::<serde_json::Value>(body) {
		Ok(serde_json::Value::Object(map)) => match map.get("detail") {
			Some(serde_json::Value::String(detail)) => detail.clone(),
			Some(other) => other.to_string(),
			None => body.trim().to_string(),
		},
		_ => body.trim().to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_join_base_and_path() {
		let client = ApiClient::new("/api/");
		assert_eq!(client.base(), "/api");
		assert_eq!(client.url("relationship-map"), "/api/relationship-map");
		assert_eq!(client.url("/contacts/7"), "/api/contacts/7");
	}

	#[test]
	fn job_urls() {
		let client = ApiClient::new("http://localhost:8000/api");
		assert_eq!(
			client.url(JobKind::DiscoverAll.endpoint()),
			"http://localhost:8000/api/jobs/discover-all-connections"
		);
	}

	#[test]
	fn error_detail_prefers_detail_field() {
		assert_eq!(error_detail(r#"{"detail": "Contact not found"}"#), "Contact not found");
		assert_eq!(
			error_detail(r#"{"detail": [{"msg": "bad"}]}"#),
			r#"[{"msg":"bad"}]"#
		);
		assert_eq!(error_detail("Internal Server Error\n"), "Internal Server Error");
	}

	#[test]
	fn status_error_message() {
		let err = ApiError::Status {
			status: 404,
			detail: "Contact not found".into(),
		};
		assert_eq!(err.to_string(), "HTTP 404: Contact not found");
	}
}
