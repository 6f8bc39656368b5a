use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use log::warn;

use super::LoadStatus;
use crate::api::{Contact, ContactList, ContactPatch, ContactQuery};
use crate::config::use_config;

/// Searchable contact table with per-row rotation toggles.
#[component]
pub fn Contacts() -> impl IntoView {
	let config = use_config();
	let client = config.client();
	let limit = config.contact_list_limit;

	let search = RwSignal::new(String::new());
	let rotation_only = RwSignal::new(false);
	let listing = RwSignal::new(ContactList::default());
	let status = RwSignal::new(LoadStatus::Loading);
	let toggling = RwSignal::new(None::<i64>);
	let error = RwSignal::new(None::<String>);
	// Bumped per request so a slow answer to an older query is dropped.
	let generation = StoredValue::new(0_u64);

	{
		let client = client.clone();
		Effect::new(move |_| {
			let query = ContactQuery {
				q: Some(search.get()),
				in_rotation: rotation_only.get(),
				limit: Some(limit),
			};
			let Some(ticket) = generation.try_update_value(|g| {
				*g += 1;
				*g
			}) else {
				return;
			};
			let client = client.clone();
			spawn_local(async move {
				let result = client.contacts(&query).await;
				if generation.try_with_value(|g| *g) != Some(ticket) {
					return;
				}
				match result {
					Ok(list) => {
						listing.try_set(list);
						status.try_set(LoadStatus::Ready);
					}
					Err(err) => {
						warn!("loading contacts: {err}");
						status.try_set(LoadStatus::Failed(err.to_string()));
					}
				}
			});
		});
	}

	let toggle = move |contact: Contact| {
		let client = client.clone();
		async move {
			let flipped = !contact.in_mention_rotation;
			toggling.try_set(Some(contact.id));
			let patch = ContactPatch {
				in_mention_rotation: Some(flipped),
				..Default::default()
			};
			match client.update_contact(contact.id, &patch).await {
				Ok(()) => {
					listing.try_update(|list| {
						if let Some(row) = list.contacts.iter_mut().find(|c| c.id == contact.id) {
							row.in_mention_rotation = flipped;
						}
					});
				}
				Err(err) => {
					error.try_set(Some(err.to_string()));
				}
			}
			toggling.try_set(None);
		}
	};

	view! {
		<div class="page">
			<h1>"Contacts"</h1>

			<div class="toolbar">
				<input
					type="search"
					placeholder="Search by name or category..."
					prop:value=move || search.get()
					on:input=move |ev| search.set(event_target_value(&ev))
				/>
				<label>
					<input
						type="checkbox"
						prop:checked=move || rotation_only.get()
						on:change=move |ev| rotation_only.set(event_target_checked(&ev))
					/>
					"In rotation only"
				</label>
				<A href="/rotation">"Manage rotation"</A>
			</div>

			{move || error.get().map(|err| view! { <p class="error">{err}</p> })}

			{move || match status.get() {
				LoadStatus::Loading => view! { <p class="muted">"Loading..."</p> }.into_any(),
				LoadStatus::Failed(err) => view! { <p class="error">{err}</p> }.into_any(),
				LoadStatus::Ready => {
					let toggle = toggle.clone();
					view! {
						<table class="table">
							<thead>
								<tr>
									<th>"#"</th>
									<th>"Name"</th>
									<th>"Category"</th>
									<th>"Role/Org"</th>
									<th>"Rotation"</th>
								</tr>
							</thead>
							<tbody>
								{listing
									.get()
									.contacts
									.into_iter()
									.map(|contact| {
										let toggle = toggle.clone();
										let id = contact.id;
										let in_rotation = contact.in_mention_rotation;
										let number = contact
											.list_number
											.map_or_else(|| "-".to_string(), |n| n.to_string());
										let category = contact.category_label();
										let role = contact.role_org.clone().unwrap_or_else(|| "-".to_string());
										let name = contact.name.clone();
										view! {
											<tr>
												<td class="muted">{number}</td>
												<td>
													<A href=format!("/contacts/{id}")>{name}</A>
												</td>
												<td>{if category.is_empty() { "-".to_string() } else { category }}</td>
												<td class="muted">{role}</td>
												<td>
													<button
														type="button"
														class:active=in_rotation
														disabled=move || toggling.get() == Some(id)
														title={if in_rotation { "Remove from rotation" } else { "Add to rotation" }}
														on:click=move |_| spawn_local(toggle(contact.clone()))
													>
														{move || {
															if toggling.get() == Some(id) {
																"…"
															} else if in_rotation {
																"In rotation"
															} else {
																"Add"
															}
														}}
													</button>
												</td>
											</tr>
										}
									})
									.collect_view()}
							</tbody>
						</table>
					}
						.into_any()
				}
			}}

			<p class="meta">
				{move || {
					listing
						.with(|list| format!("Showing {} of {} contacts", list.contacts.len(), list.total))
				}}
			</p>
		</div>
	}
}
