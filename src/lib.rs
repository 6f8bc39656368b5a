//! Outreach client: dashboard, relationship map and mention rotation.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod api;
pub mod config;
pub mod graph;
pub mod jobs;
pub mod rotation;

mod components;
mod pages;

use crate::components::layout::Layout;
use crate::config::AppConfig;
use crate::pages::contact::ContactDetail;
use crate::pages::contacts::Contacts;
use crate::pages::dashboard::Dashboard;
use crate::pages::not_found::NotFound;
use crate::pages::relationship_map::RelationshipMap;
use crate::pages::rotation::Rotation;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// The app router, with the backend config in context.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();
	let config = AppConfig::from_build_env();
	info!("api base {}", config.api_base);
	provide_context(config);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Outreach" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Layout>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Dashboard />
					<Route path=path!("/contacts") view=Contacts />
					<Route path=path!("/map") view=RelationshipMap />
					<Route path=path!("/rotation") view=Rotation />
					<Route path=path!("/contacts/:id") view=ContactDetail />
				</Routes>
			</Layout>
		</Router>
	}
}
