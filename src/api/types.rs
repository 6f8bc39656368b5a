use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact as listed by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Contact {
	/// Backend id.
	pub id: i64,
	/// Position in the imported names file.
	#[serde(default)]
	pub list_number: Option<i64>,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Names file category, possibly numbered.
	#[serde(default)]
	pub category: Option<String>,
	/// Role and organisation, free text.
	#[serde(default)]
	pub role_org: Option<String>,
	/// Free-form stage such as "warm" or "met".
	#[serde(default)]
	pub relationship_stage: Option<String>,
	/// Searched by the next mention fetch.
	#[serde(default)]
	pub in_mention_rotation: bool,
}

impl Contact {
	/// Category without the names file's `Category N: ` prefix.
	pub fn category_label(&self) -> String {
		let Some(category) = self.category.as_deref() else {
			return String::new();
		};
		category
			.strip_prefix("Category ")
			.and_then(|rest| rest.split_once(": "))
			.filter(|(n, _)| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
			.map_or(category, |(_, label)| label)
			.to_string()
	}
}

/// One page of contacts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ContactList {
	/// Matches before the limit was applied.
	#[serde(default)]
	pub total: usize,
	/// This page, in names file order.
	#[serde(default)]
	pub contacts: Vec<Contact>,
}

/// Filters for the contact listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactQuery {
	/// Name or category substring.
	pub q: Option<String>,
	/// Only contacts in the mention rotation.
	pub in_rotation: bool,
	/// Page size; the backend caps it at 500.
	pub limit: Option<u32>,
}

impl ContactQuery {
	pub(super) fn pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();
		if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
			pairs.push(("q", q.to_string()));
		}
		if self.in_rotation {
			pairs.push(("in_rotation", "true".to_string()));
		}
		if let Some(limit) = self.limit {
			pairs.push(("limit", limit.to_string()));
		}
		pairs
	}
}

/// Partial contact update. Unset fields are left alone by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactPatch {
	/// New stage.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub relationship_stage: Option<String>,
	/// Add to or drop from the rotation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub in_mention_rotation: Option<bool>,
}

/// A rotation member, as listed on the rotation page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RotationContact {
	/// Backend id.
	pub id: i64,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Names file category.
	#[serde(default)]
	pub category: Option<String>,
}

/// The current rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RotationList {
	/// Members, in names file order.
	#[serde(default)]
	pub contacts: Vec<RotationContact>,
	/// Member count reported by the backend.
	#[serde(default)]
	pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(super) struct RotationReplace {
	pub contact_ids: Vec<u64>,
}

/// Outcome of replacing the rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RotationUpdate {
	/// Members after the update.
	#[serde(default)]
	pub in_rotation: usize,
	/// Human-readable summary.
	#[serde(default)]
	pub message: String,
}

/// A link from one contact to another, as seen from the first contact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Connection {
	/// Connection id, used to delete it.
	pub id: i64,
	/// The contact on the far end.
	pub other_contact_id: i64,
	/// Name of the far end, when the backend sends it.
	#[serde(default)]
	pub other_contact_name: Option<String>,
	/// Free-form label such as `co_author`.
	#[serde(default)]
	pub relationship_type: String,
	/// Anything recorded alongside the link.
	#[serde(default)]
	pub notes: Option<String>,
}

/// Connections of one contact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionList {
	/// Every link touching the contact.
	#[serde(default)]
	pub connections: Vec<Connection>,
}

/// Body for adding a connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewConnection {
	/// The contact to link to.
	pub other_contact_id: i64,
	/// Label for the link.
	pub relationship_type: String,
	/// Optional free text.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

/// A news or web mention of a contact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Mention {
	/// Backend id.
	pub id: i64,
	/// The contact mentioned.
	pub contact_id: i64,
	/// Included on listings across contacts.
	#[serde(default)]
	pub contact_name: Option<String>,
	/// Where it was found, such as `news`.
	#[serde(default)]
	pub source_type: String,
	/// Link to the original.
	#[serde(default)]
	pub source_url: Option<String>,
	/// Headline, when the source has one.
	#[serde(default)]
	pub title: Option<String>,
	/// Excerpt around the mention.
	#[serde(default)]
	pub snippet: Option<String>,
	/// Publication time, UTC.
	#[serde(default, deserialize_with = "timestamp::deserialize")]
	pub published_at: Option<DateTime<Utc>>,
}

impl Mention {
	/// Contact name, or `Contact #id` when missing.
	pub fn contact_label(&self) -> String {
		match self.contact_name.as_deref() {
			Some(name) if !name.is_empty() => name.to_string(),
			_ => format!("Contact #{}", self.contact_id),
		}
	}

	/// Title, or the first 100 characters of the snippet.
	pub fn headline(&self) -> String {
		match (self.title.as_deref(), self.snippet.as_deref()) {
			(Some(title), _) if !title.is_empty() => title.to_string(),
			(_, Some(snippet)) => snippet.chars().take(100).collect(),
			_ => String::new(),
		}
	}

	/// Publication day, or "Unknown date".
	pub fn date_label(&self) -> String {
		self.published_at
			.map(|at| at.format("%Y-%m-%d").to_string())
			.unwrap_or_else(|| "Unknown date".to_string())
	}
}

/// One page of mentions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MentionList {
	/// Matches before the limit was applied.
	#[serde(default)]
	pub total: usize,
	/// Newest first.
	#[serde(default)]
	pub mentions: Vec<Mention>,
}

/// Filters for the mention listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MentionQuery {
	/// Only the last `days` days.
	pub days: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
	/// Only mentions of this contact.
	pub contact_id: Option<i64>,
}

impl MentionQuery {
	pub(super) fn pairs(&self) -> Vec<(&'static str, String)> {
		[
			("days", self.days.map(|v| v.to_string())),
			("limit", self.limit.map(|v| v.to_string())),
			("contact_id", self.contact_id.map(|v| v.to_string())),
		]
		.into_iter()
		.filter_map(|(key, value)| Some((key, value?)))
		.collect()
	}
}

/// One logged outreach attempt (email, LinkedIn message and so on).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OutreachEntry {
	/// Backend id.
	pub id: i64,
	/// Channel used, such as `email`.
	#[serde(default)]
	pub method: String,
	/// Subject line, if any.
	#[serde(default)]
	pub subject: Option<String>,
	/// Message body, if logged.
	#[serde(default)]
	pub content: Option<String>,
	/// When it went out; `None` for drafts.
	#[serde(default, deserialize_with = "timestamp::deserialize")]
	pub sent_at: Option<DateTime<Utc>>,
	/// `sent`, `replied`, `no_response` or `bounced`.
	#[serde(default)]
	pub response_status: Option<String>,
}

impl OutreachEntry {
	/// "sent date • response", with placeholders for either half.
	pub fn status_line(&self) -> String {
		let sent = self
			.sent_at
			.map(|at| at.format("%Y-%m-%d %H:%M").to_string())
			.unwrap_or_else(|| "Not sent".to_string());
		let response = self
			.response_status
			.as_deref()
			.filter(|s| !s.is_empty())
			.unwrap_or("Unknown");
		format!("{sent} • {response}")
	}
}

/// Outreach log page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OutreachList {
	/// Entries before the limit was applied.
	#[serde(default)]
	pub total: usize,
	/// Most recently sent first.
	#[serde(default)]
	pub entries: Vec<OutreachEntry>,
}

/// Acknowledgement from a job start endpoint. No job id is returned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct JobAccepted {
	/// Usually `started`.
	#[serde(default)]
	pub status: String,
	/// Human-readable note from the backend.
	#[serde(default)]
	pub message: String,
}

/// The backend writes ISO timestamps with or without an offset; offset-less
/// ones are UTC.
mod timestamp {
	use chrono::{DateTime, NaiveDateTime, Utc};
	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let Some(raw) = Option::<String>::deserialize(deserializer)? else {
			return Ok(None);
		};
		Ok(parse(&raw))
	}

	pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
		DateTime::parse_from_rfc3339(raw)
			.map(|at| at.with_timezone(&Utc))
			.ok()
			.or_else(|| {
				NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
					.ok()
					.map(|at| at.and_utc())
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timestamps_with_and_without_offset() {
		let with = timestamp::parse("2025-03-01T08:30:00+00:00").unwrap();
		let without = timestamp::parse("2025-03-01T08:30:00").unwrap();
		assert_eq!(with, without);
		assert!(timestamp::parse("2025-03-01T08:30:00.123456").is_some());
		assert!(timestamp::parse("last tuesday").is_none());
	}

	#[test]
	fn mention_decodes_loose_fields() {
		let mention: Mention = serde_json::from_str(
			r#"{"id": 3, "contact_id": 9, "source_type": "news", "title": null,
			"snippet": "A long story", "published_at": null, "relevance_score": 0.4}"#,
		)
		.unwrap();
		assert_eq!(mention.contact_label(), "Contact #9");
		assert_eq!(mention.headline(), "A long story");
		assert_eq!(mention.date_label(), "Unknown date");
	}

	#[test]
	fn mention_headline_prefers_title() {
		let mention = Mention {
			title: Some("Keynote".into()),
			snippet: Some("x".repeat(300)),
			published_at: timestamp::parse("2025-01-02T00:00:00"),
			..Default::default()
		};
		assert_eq!(mention.headline(), "Keynote");
		assert_eq!(mention.date_label(), "2025-01-02");

		let untitled = Mention {
			snippet: Some("x".repeat(300)),
			..Default::default()
		};
		assert_eq!(untitled.headline().chars().count(), 100);
	}

	#[test]
	fn contact_patch_skips_unset_fields() {
		let patch = ContactPatch {
			in_mention_rotation: Some(false),
			..Default::default()
		};
		assert_eq!(
			serde_json::to_string(&patch).unwrap(),
			r#"{"in_mention_rotation":false}"#
		);
	}

	#[test]
	fn query_pairs_skip_blank_values() {
		let query = ContactQuery {
			q: Some("  ".into()),
			in_rotation: true,
			limit: Some(400),
		};
		assert_eq!(
			query.pairs(),
			vec![("in_rotation", "true".to_string()), ("limit", "400".to_string())]
		);

		let mentions = MentionQuery {
			days: Some(7),
			contact_id: Some(4),
			..Default::default()
		};
		assert_eq!(
			mentions.pairs(),
			vec![("days", "7".to_string()), ("contact_id", "4".to_string())]
		);
	}

	#[test]
	fn category_label_drops_numbered_prefix() {
		let contact = |category: Option<&str>| Contact {
			category: category.map(str::to_string),
			..Default::default()
		};
		assert_eq!(contact(Some("Category 3: Academics")).category_label(), "Academics");
		assert_eq!(contact(Some("Category X: Academics")).category_label(), "Category X: Academics");
		assert_eq!(contact(Some("Journalists")).category_label(), "Journalists");
		assert_eq!(contact(None).category_label(), "");
	}

	#[test]
	fn outreach_entries_decode_and_describe() {
		let list: OutreachList = serde_json::from_str(
			r#"{"total": 2, "skip": 0, "limit": 50, "entries": [
				{"id": 1, "contact_id": 4, "method": "email", "subject": "Hello",
				"sent_at": "2025-02-03T09:15:00", "response_status": "replied"},
				{"id": 2, "contact_id": 4, "method": "linkedin", "sent_at": null}
			]}"#,
		)
		.unwrap();
		assert_eq!(list.total, 2);
		assert_eq!(list.entries[0].status_line(), "2025-02-03 09:15 • replied");
		assert_eq!(list.entries[1].status_line(), "Not sent • Unknown");
		assert_eq!(list.entries[1].subject, None);
	}
}
