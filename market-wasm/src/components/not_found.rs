use leptos::prelude::*;
use market_core::routes::HOME_PATH;

use crate::router::Link;
use crate::state::AppState;

#[component]
pub(crate) fn NotFound(state: AppState) -> impl IntoView {
    view! {
        <section class="container not-found">
            <h1>"404"</h1>
            <p>"រកមិនឃើញទំព័រដែលអ្នកស្វែងរកទេ។"</p>
            <Link state=state href=HOME_PATH class="btn btn-primary">
                "ត្រឡប់ទៅទំព័រដើម"
            </Link>
        </section>
    }
}
