//! Mention rotation: the contacts searched by the next mention fetch.

mod ids;

use thiserror::Error;

pub use ids::{MAX_RANGE_SPAN, RotationIdSet, parse_ids};

/// Rotation size below which the page nudges for more contacts.
pub const RECOMMENDED_SIZE: usize = 30;

/// Why pasted ids cannot replace the rotation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RotationError {
	/// Nothing in the text parsed as an id.
	#[error("No valid IDs found")]
	NoValidIds,
}

/// Parse pasted ids for a replace-all submission.
pub fn replacement_ids(text: &str) -> Result<RotationIdSet, RotationError> {
	let ids = parse_ids(text);
	if ids.is_empty() {
		return Err(RotationError::NoValidIds);
	}
	Ok(ids)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_submission_is_rejected() {
		assert_eq!(replacement_ids("foo, 0"), Err(RotationError::NoValidIds));
		assert_eq!(RotationError::NoValidIds.to_string(), "No valid IDs found");
	}

	#[test]
	fn valid_submission_passes_through() {
		assert_eq!(replacement_ids("2,1").map(|ids| ids.to_vec()), Ok(vec![1, 2]));
	}
}
