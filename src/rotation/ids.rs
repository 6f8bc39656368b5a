use std::collections::BTreeSet;

use log::warn;

/// Widest `a-b` range expanded. Wider ranges are treated as typos and dropped.
pub const MAX_RANGE_SPAN: u64 = 10_000;

/// Distinct positive contact ids in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationIdSet(BTreeSet<u64>);

impl RotationIdSet {
	/// Nothing usable was found.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of distinct ids.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// `id` was listed or fell inside a range.
	pub fn contains(&self, id: u64) -> bool {
		self.0.contains(&id)
	}

	/// Ids in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
		self.0.iter().copied()
	}

	/// Ids in ascending order, as the backend expects them.
	pub fn to_vec(&self) -> Vec<u64> {
		self.iter().collect()
	}
}

/// Pull every valid id out of free text.
///
/// Tokens are separated by commas, semicolons or whitespace. A token is a
/// positive integer or an inclusive range `a-b` in either order. Anything else
/// is skipped, so this never fails; an empty set means nothing usable was
/// found.
pub fn parse_ids(text: &str) -> RotationIdSet {
	let mut ids = BTreeSet::new();
	for token in text
		.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
		.filter(|t| !t.is_empty())
	{
		match token.split_once('-') {
			Some((a, b)) => {
				let (Some(a), Some(b)) = (positive(a), positive(b)) else {
					continue;
				};
				let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
				if hi - lo < MAX_RANGE_SPAN {
					ids.extend(lo..=hi);
				} else {
					warn!("ignoring id range {token}: wider than {MAX_RANGE_SPAN}");
				}
			}
			None => ids.extend(positive(token)),
		}
	}
	RotationIdSet(ids)
}

fn positive(token: &str) -> Option<u64> {
	if !token.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	token.parse().ok().filter(|&n| n > 0)
}
