use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use log::warn;

use super::LoadStatus;
use crate::api::{ApiClient, ApiError, Mention, MentionQuery};
use crate::config::use_config;
use crate::jobs::{JobKind, JobMonitor};

async fn fetch_mentions(client: ApiClient, query: MentionQuery) -> Result<Vec<Mention>, ApiError> {
	Ok(client.mentions(&query).await?.mentions)
}

/// One row of the recent mentions list.
#[component]
fn MentionItem(mention: Mention) -> impl IntoView {
	let href = format!("/contacts/{}", mention.contact_id);
	let meta = format!("{} • {}", mention.source_type, mention.date_label());
	let label = mention.contact_label();
	let headline = mention.headline();
	view! {
		<li class="mention">
			<div>
				<A href=href>{label}</A>
				<p class="muted">{headline}</p>
				<p class="meta">{meta}</p>
			</div>
			{mention
				.source_url
				.map(|url| {
					view! {
						<a href=url target="_blank" rel="noopener noreferrer">
							"View source"
						</a>
					}
				})}
		</li>
	}
}

/// Recent mentions and the manual mention fetch.
#[component]
pub fn Dashboard() -> impl IntoView {
	let config = use_config();
	let client = config.client();
	let schedule = config.jobs.for_kind(JobKind::FetchMentions);
	let query = MentionQuery {
		days: Some(config.recent_mention_days),
		limit: Some(config.recent_mention_limit),
		contact_id: None,
	};

	let mentions = RwSignal::new(Vec::<Mention>::new());
	let status = RwSignal::new(LoadStatus::Loading);
	let refresh = JobMonitor::new(JobKind::FetchMentions, schedule);

	let show = move |list: Vec<Mention>| {
		mentions.try_set(list);
		status.try_set(LoadStatus::Ready);
	};
	let reload = {
		let client = client.clone();
		move || fetch_mentions(client.clone(), query.clone())
	};
	let first_load = reload();
	spawn_local(async move {
		match first_load.await {
			Ok(list) => show(list),
			Err(err) => {
				warn!("loading mentions: {err}");
				status.try_set(LoadStatus::Failed(err.to_string()));
			}
		}
	});

	let on_refresh = move |_| {
		let client = client.clone();
		refresh.start(
			move || async move { client.start_job(JobKind::FetchMentions).await.map(drop) },
			reload.clone(),
			show,
		);
	};
	let running_label = format!(
		"Fetching... (updates every {}s)",
		schedule.interval.as_secs()
	);
	let hint = format!(
		"Searches news for contacts in rotation, then reloads this list for up to {}s.",
		schedule.ceiling().as_secs()
	);
	let heading = format!("Recent Mentions (Last {} Days)", config.recent_mention_days);

	view! {
		<div class="page">
			<h1>"Dashboard"</h1>

			<section class="card">
				<h2>{heading}</h2>
				{move || match status.get() {
					LoadStatus::Loading => view! { <p class="muted">"Loading..."</p> }.into_any(),
					LoadStatus::Failed(err) => view! { <p class="error">{err}</p> }.into_any(),
					LoadStatus::Ready if mentions.with(Vec::is_empty) => {
						view! {
							<p class="muted">
								"No mentions yet. Run the mention monitoring job to populate."
							</p>
						}
							.into_any()
					}
					LoadStatus::Ready => {
						view! {
							<ul class="list">
								{mentions
									.get()
									.into_iter()
									.map(|mention| view! { <MentionItem mention=mention /> })
									.collect_view()}
							</ul>
						}
							.into_any()
					}
				}}
			</section>

			<section class="card">
				<h2>"Quick Actions"</h2>
				<div class="actions">
					<button on:click=on_refresh disabled=move || refresh.is_running() title=hint>
						{move || {
							if refresh.is_running() {
								running_label.clone()
							} else {
								"Refresh mentions now".to_string()
							}
						}}
					</button>
					<A href="/contacts">"Contacts"</A>
					<A href="/map">"Relationship map"</A>
				</div>
				{move || refresh.error().map(|err| view! { <p class="error">{err}</p> })}
			</section>
		</div>
	}
}
