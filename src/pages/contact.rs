use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;
use log::warn;

use super::LoadStatus;
use crate::api::{
	ApiClient, Connection, Contact, ContactPatch, Mention, MentionQuery, NewConnection, OutreachEntry,
};
use crate::config::use_config;

async fn load_contact(
	client: ApiClient,
	id: i64,
	contact: RwSignal<Option<Contact>>,
	status: RwSignal<LoadStatus>,
) {
	status.try_set(LoadStatus::Loading);
	match client.contact(id).await {
		Ok(found) => {
			contact.try_set(Some(found));
			status.try_set(LoadStatus::Ready);
		}
		Err(err) => {
			warn!("loading contact {id}: {err}");
			status.try_set(LoadStatus::Failed(err.to_string()));
		}
	}
}

async fn load_connections(client: ApiClient, id: i64, connections: RwSignal<Vec<Connection>>) {
	match client.connections(id).await {
		Ok(list) => {
			connections.try_set(list.connections);
		}
		Err(err) => warn!("loading connections for {id}: {err}"),
	}
}

async fn load_contact_mentions(
	client: ApiClient,
	id: i64,
	limit: u32,
	mentions: RwSignal<Vec<Mention>>,
) {
	let query = MentionQuery {
		days: None,
		limit: Some(limit),
		contact_id: Some(id),
	};
	match client.mentions(&query).await {
		Ok(list) => {
			mentions.try_set(list.mentions);
		}
		Err(err) => warn!("loading mentions for {id}: {err}"),
	}
}

async fn load_outreach(client: ApiClient, id: i64, outreach: RwSignal<Vec<OutreachEntry>>) {
	match client.outreach(id).await {
		Ok(list) => {
			outreach.try_set(list.entries);
		}
		Err(err) => warn!("loading outreach log for {id}: {err}"),
	}
}

/// One contact with its connections, mentions and outreach log.
#[component]
pub fn ContactDetail() -> impl IntoView {
	let config = use_config();
	let client = config.client();
	let mention_limit = config.recent_mention_limit;
	let params = use_params_map();
	let contact_id = Memo::new(move |_| params.with(|p| p.get("id").and_then(|id| id.parse::<i64>().ok())));

	let contact = RwSignal::new(None::<Contact>);
	let status = RwSignal::new(LoadStatus::Loading);
	let connections = RwSignal::new(Vec::<Connection>::new());
	let mentions = RwSignal::new(Vec::<Mention>::new());
	let outreach = RwSignal::new(Vec::<OutreachEntry>::new());
	let error = RwSignal::new(None::<String>);
	let other_id = RwSignal::new(String::new());
	let relationship_type = RwSignal::new(String::new());

	{
		let client = client.clone();
		Effect::new(move |_| {
			let Some(id) = contact_id.get() else {
				status.set(LoadStatus::Failed("Invalid contact id".to_string()));
				return;
			};
			let client = client.clone();
			spawn_local(async move {
				load_contact(client.clone(), id, contact, status).await;
				load_connections(client.clone(), id, connections).await;
				load_contact_mentions(client.clone(), id, mention_limit, mentions).await;
				load_outreach(client, id, outreach).await;
			});
		});
	}

	let toggle_rotation = {
		let client = client.clone();
		move |_| {
			let (Some(id), Some(current)) = (
				contact_id.get_untracked(),
				contact.with_untracked(|c| c.as_ref().map(|c| c.in_mention_rotation)),
			) else {
				return;
			};
			let client = client.clone();
			spawn_local(async move {
				let patch = ContactPatch {
					in_mention_rotation: Some(!current),
					..Default::default()
				};
				match client.update_contact(id, &patch).await {
					Ok(()) => {
						contact.try_update(|c| {
							if let Some(c) = c {
								c.in_mention_rotation = !current;
							}
						});
					}
					Err(err) => {
						error.try_set(Some(err.to_string()));
					}
				}
			});
		}
	};

	let add_connection = {
		let client = client.clone();
		move |ev: leptos::ev::SubmitEvent| {
			ev.prevent_default();
			let Some(id) = contact_id.get_untracked() else {
				return;
			};
			let Ok(other) = other_id.get_untracked().trim().parse::<i64>() else {
				error.set(Some("Enter the other contact's numeric ID".to_string()));
				return;
			};
			let kind = relationship_type.get_untracked().trim().to_string();
			let connection = NewConnection {
				other_contact_id: other,
				relationship_type: if kind.is_empty() { "knows".to_string() } else { kind },
				notes: None,
			};
			error.set(None);
			let client = client.clone();
			spawn_local(async move {
				match client.add_connection(id, &connection).await {
					Ok(_) => {
						other_id.try_set(String::new());
						relationship_type.try_set(String::new());
						load_connections(client, id, connections).await;
					}
					Err(err) => {
						error.try_set(Some(err.to_string()));
					}
				}
			});
		}
	};

	let remove_connection = move |connection_id: i64| {
		let client = client.clone();
		async move {
			let Some(id) = contact_id.get_untracked() else {
				return;
			};
			match client.remove_connection(id, connection_id).await {
				Ok(()) => load_connections(client, id, connections).await,
				Err(err) => {
					error.try_set(Some(err.to_string()));
				}
			}
		}
	};

	view! {
		<div class="page">
			<A href="/map">"Back to the map"</A>

			{move || match status.get() {
				LoadStatus::Loading => view! { <p class="muted">"Loading..."</p> }.into_any(),
				LoadStatus::Failed(err) => view! { <p class="error">{err}</p> }.into_any(),
				LoadStatus::Ready => {
					let Some(c) = contact.get() else {
						return ().into_any();
					};
					let stage = c.relationship_stage.clone().unwrap_or_default();
					let category = c.category_label();
					view! {
						<h1>{c.name}</h1>
						<dl class="fields">
							<dt>"Category"</dt>
							<dd>{category}</dd>
							<dt>"Role / organisation"</dt>
							<dd>{c.role_org.unwrap_or_default()}</dd>
							<dt>"Relationship stage"</dt>
							<dd>{if stage.is_empty() { "Not set".to_string() } else { stage }}</dd>
							<dt>"Mention rotation"</dt>
							<dd>{if c.in_mention_rotation { "In rotation" } else { "Not in rotation" }}</dd>
						</dl>
					}
						.into_any()
				}
			}}

			<button type="button" on:click=toggle_rotation>
				{move || {
					if contact.with(|c| c.as_ref().is_some_and(|c| c.in_mention_rotation)) {
						"Remove from rotation"
					} else {
						"Add to rotation"
					}
				}}
			</button>

			{move || error.get().map(|err| view! { <p class="error">{err}</p> })}

			<section class="card">
				<h2>"Connections"</h2>
				{move || {
					let list = connections.get();
					if list.is_empty() {
						return view! { <p class="muted">"No connections yet."</p> }.into_any();
					}
					let remove_connection = remove_connection.clone();
					view! {
						<ul class="list">
							{list
								.into_iter()
								.map(|conn| {
									let remove_connection = remove_connection.clone();
									let other = conn.other_contact_id;
									let label = conn
										.other_contact_name
										.filter(|name| !name.is_empty())
										.unwrap_or_else(|| format!("Contact {other}"));
									view! {
										<li>
											<A href=format!("/contacts/{other}")>{label}</A>
											<span class="muted">{conn.relationship_type}</span>
											{conn.notes.map(|notes| view! { <p class="meta">{notes}</p> })}
											<button
												type="button"
												class="danger"
												on:click=move |_| spawn_local(remove_connection(conn.id))
											>
												"Remove"
											</button>
										</li>
									}
								})
								.collect_view()}
						</ul>
					}
						.into_any()
				}}
				<form on:submit=add_connection>
					<input
						type="text"
						inputmode="numeric"
						placeholder="Other contact ID"
						prop:value=move || other_id.get()
						on:input=move |ev| other_id.set(event_target_value(&ev))
					/>
					<input
						type="text"
						placeholder="Relationship (e.g. colleague)"
						prop:value=move || relationship_type.get()
						on:input=move |ev| relationship_type.set(event_target_value(&ev))
					/>
					<button type="submit">"Add connection"</button>
				</form>
			</section>

			<section class="card">
				<h2>"Mentions"</h2>
				{move || {
					let list = mentions.get();
					if list.is_empty() {
						return view! { <p class="muted">"No mentions recorded."</p> }.into_any();
					}
					view! {
						<ul class="list">
							{list
								.into_iter()
								.map(|mention| {
									let meta = format!("{} • {}", mention.source_type, mention.date_label());
									view! {
										<li class="mention">
											<p>{mention.headline()}</p>
											<p class="meta">{meta}</p>
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
								})
								.collect_view()}
						</ul>
					}
						.into_any()
				}}
			</section>

			<section class="card">
				<h2>"Outreach log"</h2>
				{move || {
					let entries = outreach.get();
					if entries.is_empty() {
						return view! { <p class="muted">"No outreach logged yet."</p> }.into_any();
					}
					view! {
						<ul class="list">
							{entries
								.into_iter()
								.map(|entry| {
									let status_line = entry.status_line();
									view! {
										<li>
											<p>{entry.method}</p>
											{entry.subject.map(|subject| view! { <p class="muted">{subject}</p> })}
											<p class="meta">{status_line}</p>
										</li>
									}
								})
								.collect_view()}
						</ul>
					}
						.into_any()
				}}
			</section>
		</div>
	}
}
