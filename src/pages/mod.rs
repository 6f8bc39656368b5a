pub mod contact;
pub mod contacts;
pub mod dashboard;
pub mod not_found;
pub mod relationship_map;
pub mod rotation;

/// Progress of a page's initial fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
	Loading,
	Ready,
	Failed(String),
}
