use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use log::{debug, warn};

use super::LoadStatus;
use crate::api::{ApiClient, ApiError};
use crate::components::force_graph::{ForceGraphCanvas, GraphData};
use crate::config::use_config;
use crate::graph::{GraphModel, focus};
use crate::jobs::{JobKind, JobMonitor};

/// Fetch the relationship map and build a fresh model from it.
async fn fetch_map(client: ApiClient) -> Result<GraphModel, ApiError> {
	let (graph, report) = client.relationship_map().await?.build();
	debug!(
		"relationship map: {} contacts, {} connections ({:?})",
		graph.nodes().len(),
		graph.edges().len(),
		report
	);
	Ok(graph)
}

/// Network of contacts, focused by a live search.
#[component]
pub fn RelationshipMap() -> impl IntoView {
	let config = use_config();
	let client = config.client();

	let model = RwSignal::new(GraphModel::default());
	let status = RwSignal::new(LoadStatus::Loading);
	let search = RwSignal::new(String::new());
	let focused = Memo::new(move |_| model.with(|m| search.with(|q| focus(m, q))));
	let graph_data = Signal::derive(move || focused.with(|f| GraphData::from(f)));

	let from_mentions = JobMonitor::new(
		JobKind::DiscoverFromMentions,
		config.jobs.for_kind(JobKind::DiscoverFromMentions),
	);
	let discover_all = JobMonitor::new(
		JobKind::DiscoverAll,
		config.jobs.for_kind(JobKind::DiscoverAll),
	);
	let discovering = move || from_mentions.is_running() || discover_all.is_running();

	let show = move |graph: GraphModel| {
		model.try_set(graph);
		status.try_set(LoadStatus::Ready);
	};
	let reload = {
		let client = client.clone();
		move || fetch_map(client.clone())
	};
	let load = {
		let reload = reload.clone();
		move || {
			status.set(LoadStatus::Loading);
			let pending = reload();
			spawn_local(async move {
				match pending.await {
					Ok(graph) => show(graph),
					Err(err) => {
						warn!("loading relationship map: {err}");
						status.try_set(LoadStatus::Failed(err.to_string()));
					}
				}
			});
		}
	};
	load();

	let refresh = {
		let load = load.clone();
		move |_| load()
	};
	let retry = move |_| load();

	let discover = move |monitor: JobMonitor| {
		let client = client.clone();
		monitor.start(
			move || async move { client.start_job(monitor.kind()).await.map(drop) },
			reload.clone(),
			show,
		);
	};
	let discover_from_mentions = {
		let discover = discover.clone();
		move |_| discover(from_mentions)
	};
	let discover_everything = move |_| discover(discover_all);

	let navigate = use_navigate();
	let open_contact = move |id: i64| navigate(&format!("/contacts/{id}"), Default::default());

	view! {
		<div class="page">
			<div class="toolbar">
				<div>
					<h1>"Relationship map"</h1>
					<p class="muted">
						"How everyone on the list is connected. Search to focus on matching contacts and their connections; the map updates as you type."
					</p>
				</div>
				<div class="actions">
					<input
						type="search"
						placeholder="Search by name or category..."
						aria-label="Search contacts to focus map"
						prop:value=move || search.get()
						on:input=move |ev| search.set(event_target_value(&ev))
					/>
					<Show when=move || search.with(|q| !q.trim().is_empty())>
						<button type="button" on:click=move |_| search.set(String::new())>
							"Clear"
						</button>
					</Show>
					<button type="button" on:click=refresh>
						"Refresh"
					</button>
					<button
						type="button"
						class="primary"
						disabled=discovering
						on:click=discover_everything
						title="Scan mentions and search the web for links between contacts. Takes a few minutes."
					>
						{move || {
							if discover_all.is_running() {
								"Discovering all…"
							} else {
								"Discover all connections"
							}
						}}
					</button>
					<button
						type="button"
						disabled=discovering
						on:click=discover_from_mentions
						title="Scan existing mention snippets only."
					>
						{move || {
							if from_mentions.is_running() { "Running…" } else { "From mentions only" }
						}}
					</button>
				</div>
			</div>

			{move || {
				[from_mentions, discover_all]
					.into_iter()
					.filter_map(|monitor| monitor.error())
					.map(|err| view! { <p class="error">{err}</p> })
					.collect_view()
			}}

			{move || match status.get() {
				LoadStatus::Failed(err) => {
					let retry = retry.clone();
					view! {
						<div class="notice error">
							<p>{err}</p>
							<button type="button" on:click=retry>
								"Retry"
							</button>
						</div>
					}
						.into_any()
				}
				LoadStatus::Loading if model.with(|m| m.nodes().is_empty()) => {
					view! { <p class="muted">"Loading relationship map..."</p> }.into_any()
				}
				_ if !model.with(GraphModel::has_connections) => {
					view! {
						<div class="notice warning">
							"No connections yet. Add connections on contact detail pages to see the network here."
						</div>
					}
						.into_any()
				}
				_ if focused.with(|f| f.is_no_results()) => {
					view! {
						<p class="muted">
							{move || format!("No contacts match \"{}\".", focused.with(|f| f.query.clone()))}
						</p>
					}
						.into_any()
				}
				_ => ().into_any(),
			}}

			<div class="map-panel">
				<ForceGraphCanvas data=graph_data on_node_click=open_contact />
			</div>

			<p class="meta">
				{move || focused.with(|f| model.with(|m| f.summary(m)))}
				" Click a node to open the contact."
			</p>
		</div>
	}
}
