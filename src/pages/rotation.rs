use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use log::warn;

use crate::api::{ApiClient, Contact, ContactPatch, ContactQuery, RotationContact};
use crate::config::use_config;
use crate::rotation::{RECOMMENDED_SIZE, replacement_ids};

async fn load_rotation(client: ApiClient, rotation: RwSignal<Vec<RotationContact>>) {
	match client.rotation().await {
		Ok(list) => {
			rotation.try_set(list.contacts);
		}
		Err(err) => {
			warn!("loading rotation: {err}");
			rotation.try_set(Vec::new());
		}
	}
}

async fn load_contacts(client: ApiClient, limit: u32, contacts: RwSignal<Vec<Contact>>) {
	let query = ContactQuery {
		limit: Some(limit),
		..Default::default()
	};
	match client.contacts(&query).await {
		Ok(list) => {
			contacts.try_set(list.contacts);
		}
		Err(err) => {
			warn!("loading contacts: {err}");
			contacts.try_set(Vec::new());
		}
	}
}

/// Which contacts the next mention fetch searches.
#[component]
pub fn Rotation() -> impl IntoView {
	let config = use_config();
	let client = config.client();
	let picker_limit = config.contact_picker_limit;

	let rotation = RwSignal::new(Vec::<RotationContact>::new());
	let contacts = RwSignal::new(Vec::<Contact>::new());
	let add_id = RwSignal::new(String::new());
	let adding = RwSignal::new(false);
	let ids_text = RwSignal::new(String::new());
	let replacing = RwSignal::new(false);
	let notice = RwSignal::new(None::<String>);
	let error = RwSignal::new(None::<String>);

	spawn_local(load_rotation(client.clone(), rotation));
	spawn_local(load_contacts(client.clone(), picker_limit, contacts));

	let set_in_rotation = {
		let client = client.clone();
		move |id: i64, in_rotation: bool| {
			let client = client.clone();
			async move {
				let patch = ContactPatch {
					in_mention_rotation: Some(in_rotation),
					..Default::default()
				};
				match client.update_contact(id, &patch).await {
					Ok(()) => load_rotation(client, rotation).await,
					Err(err) => {
						error.try_set(Some(err.to_string()));
					}
				}
			}
		}
	};

	let add = {
		let set_in_rotation = set_in_rotation.clone();
		move |ev: leptos::ev::SubmitEvent| {
			ev.prevent_default();
			let Ok(id) = add_id.get_untracked().parse::<i64>() else {
				return;
			};
			adding.set(true);
			let pending = set_in_rotation(id, true);
			spawn_local(async move {
				pending.await;
				add_id.try_set(String::new());
				adding.try_set(false);
			});
		}
	};

	let replace = {
		let client = client.clone();
		move |ev: leptos::ev::SubmitEvent| {
			ev.prevent_default();
			notice.set(None);
			let ids = match replacement_ids(&ids_text.get_untracked()) {
				Ok(ids) => ids,
				Err(err) => {
					error.set(Some(err.to_string()));
					return;
				}
			};
			error.set(None);
			replacing.set(true);
			let client = client.clone();
			spawn_local(async move {
				match client.replace_rotation(&ids).await {
					Ok(update) => {
						notice.try_set(Some(update.message));
						ids_text.try_set(String::new());
						load_rotation(client.clone(), rotation).await;
						load_contacts(client, picker_limit, contacts).await;
					}
					Err(err) => {
						error.try_set(Some(err.to_string()));
					}
				}
				replacing.try_set(false);
			});
		}
	};

	let rotation_heading = move || {
		let count = rotation.with(Vec::len);
		if count >= RECOMMENDED_SIZE {
			format!("In rotation ({count})")
		} else {
			format!("In rotation ({count}), recommend {RECOMMENDED_SIZE}+")
		}
	};

	view! {
		<div class="page">
			<h1>"Mention rotation"</h1>
			<p class="muted">
				"Tag a core group to focus the mention fetch. Only these contacts are searched when the job runs; change the group regularly to cover the full list."
			</p>

			{move || error.get().map(|err| view! { <p class="error">{err}</p> })}
			{move || notice.get().map(|msg| view! { <p class="notice">{msg}</p> })}

			<section class="card">
				<h2>{rotation_heading}</h2>
				{move || {
					let members = rotation.get();
					if members.is_empty() {
						return view! {
							<p class="muted">
								"No one in rotation. Add contacts below or set from the list."
							</p>
						}
							.into_any();
					}
					let set_in_rotation = set_in_rotation.clone();
					view! {
						<ul class="list">
							{members
								.into_iter()
								.map(|member| {
									let set_in_rotation = set_in_rotation.clone();
									let id = member.id;
									view! {
										<li>
											<A href=format!("/contacts/{id}")>{member.name}</A>
											<span class="muted">
												{member.category.unwrap_or_default()}
											</span>
											<button
												type="button"
												class="danger"
												on:click=move |_| spawn_local(set_in_rotation(id, false))
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
			</section>

			<section class="card">
				<h2>"Add to rotation"</h2>
				<form on:submit=add>
					<select
						prop:value=move || add_id.get()
						on:change=move |ev| add_id.set(event_target_value(&ev))
					>
						<option value="">"Select..."</option>
						{move || {
							rotation
								.with(|members| {
									contacts
										.get()
										.into_iter()
										.filter(|c| !members.iter().any(|m| m.id == c.id))
										.collect::<Vec<_>>()
								})
								.into_iter()
								.map(|c| view! { <option value=c.id.to_string()>{c.name}</option> })
								.collect_view()
						}}
					</select>
					<button
						type="submit"
						disabled=move || adding.get() || add_id.with(String::is_empty)
					>
						{move || if adding.get() { "Adding..." } else { "Add" }}
					</button>
				</form>
			</section>

			<section class="card">
				<h2>"Set rotation from list (replace all)"</h2>
				<p class="meta">
					"Paste contact IDs separated by commas, spaces or new lines. Ranges like 5-12 are expanded."
				</p>
				<form on:submit=replace>
					<textarea
						rows="3"
						placeholder="e.g. 1, 2, 3, 5-8..."
						prop:value=move || ids_text.get()
						on:input=move |ev| ids_text.set(event_target_value(&ev))
					></textarea>
					<button type="submit" disabled=move || replacing.get()>
						{move || {
							if replacing.get() { "Setting..." } else { "Replace rotation with these IDs" }
						}}
					</button>
				</form>
			</section>
		</div>
	}
}
