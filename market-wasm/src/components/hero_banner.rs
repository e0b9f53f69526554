use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use market_core::listings::ListingQuery;
use market_core::routes::Route;

use crate::router::navigate;
use crate::state::AppState;

/// Баннер главной страницы с поиском.
#[component]
pub(crate) fn HeroBanner(state: AppState) -> impl IntoView {
    let search = RwSignal::new(String::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let query = ListingQuery {
            search: Some(search.get()),
            ..ListingQuery::default()
        }
        .to_query_string();
        let path = Route::Listings.path();
        if query.is_empty() {
            navigate(state, &path);
        } else {
            navigate(state, &format!("{path}?{query}"));
        }
    };

    view! {
        <section class="hero">
            <div class="container">
                <h1>"ទិញ និងលក់អ្វីៗគ្រប់យ៉ាងនៅកម្ពុជា"</h1>
                <p>"ស្វែងរកទំនិញថ្មី និងមួយទឹក ពីអ្នកលក់ជុំវិញប្រទេស"</p>
                <form class="hero-search" on:submit=on_submit>
                    <input
                        type="search"
                        placeholder="តើអ្នកកំពុងរកអ្វី?"
                        prop:value=move || search.get()
                        on:input=move |ev| search.set(event_target_value(&ev))
                    />
                    <button type="submit" class="btn btn-primary">
                        "ស្វែងរក"
                    </button>
                </form>
            </div>
        </section>
    }
}
