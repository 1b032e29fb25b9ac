use leptos::prelude::*;

use crate::components::force_graph::{ForceGraphCanvas, GraphViewConfig};

/// Id of an optional `<script type="application/json">` holding the view config.
const CONFIG_ELEMENT_ID: &str = "graph-view-config";

fn page_config() -> GraphViewConfig {
	let json = web_sys::window()
		.and_then(|window| window.document())
		.and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
		.and_then(|element| element.text_content());
	GraphViewConfig::from_embedded(json.as_deref())
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas config=page_config() fullscreen=true />
			</div>
		</ErrorBoundary>
	}
}
