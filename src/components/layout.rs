use leptos::prelude::*;
use leptos_router::components::A;

/// Navigation bar around every page.
#[component]
pub fn Layout(children: Children) -> impl IntoView {
	view! {
		<div class="layout">
			<nav class="nav">
				<span class="brand">"Outreach"</span>
				<A href="/">"Dashboard"</A>
				<A href="/contacts">"Contacts"</A>
				<A href="/map">"Relationship map"</A>
				<A href="/rotation">"Rotation"</A>
			</nav>
			<main class="content">{children()}</main>
		</div>
	}
}
