use leptos::prelude::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <div class="footer">
            <span>"gdn"</span>
            <span>"•"</span>
            <a href="/api/v1/photos" target="_blank" rel="noopener noreferrer">
                "photos"
            </a>
        </div>
    }
}
