use leptos::html::Div;
use leptos::prelude::*;

use crate::content::DatasetConfig;
use crate::loader::spawn_dataset_load;

/// One biography section. The server renders the empty mount point; once it
/// is live in the browser it is handed to the loader.
#[component]
pub fn DatasetSection(config: &'static DatasetConfig) -> impl IntoView {
    let mount = NodeRef::<Div>::new();

    Effect::new(move |_| {
        if let Some(element) = mount.get() {
            spawn_dataset_load(config, element.into());
        }
    });

    view! {
        <section class="content-section">
            <h2>{config.heading}</h2>
            <div id=config.mount_id class="content-block" node_ref=mount></div>
        </section>
    }
}
