use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::Listing;
use market_core::listings::{DEFAULT_PAGE_SIZE, ListingQuery};
use market_core::retry::RetryCounter;
use market_core::routes::Route;

use crate::api;
use crate::components::category_grid::CategoryGrid;
use crate::components::error_banner::ErrorBanner;
use crate::components::hero_banner::HeroBanner;
use crate::components::listing_card::ListingCard;
use crate::pages::LoadingGrid;
use crate::router::Link;
use crate::state::AppState;

#[component]
pub(crate) fn HomePage(state: AppState) -> impl IntoView {
    let listings = RwSignal::new(Vec::<Listing>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());

    let load = move || {
        loading.set(true);
        error.set(None);
        let query = ListingQuery {
            limit: Some(DEFAULT_PAGE_SIZE),
            ..ListingQuery::default()
        };
        let token = state.token.get_untracked();
        spawn_local(async move {
            match api::list_listings(&query, token.as_deref()).await {
                Ok(page) => {
                    listings.set(page.items);
                    retry.update(RetryCounter::reset);
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            loading.set(false);
        });
    };
    load();

    let on_retry = Callback::new(move |_| load());

    view! {
        <HeroBanner state=state />
        <CategoryGrid state=state />

        <section class="container">
            <div class="section-header">
                <h2 class="section-title">"ការផ្សាយថ្មីៗ"</h2>
                <Link state=state href=Route::Listings.path()>
                    "មើលទាំងអស់ →"
                </Link>
            </div>

            <ErrorBanner error=error on_retry=on_retry retry=retry />

            <Show when=move || loading.get() fallback=move || {
                view! {
                    <Show
                        when=move || listings.with(|items| !items.is_empty())
                        fallback=|| view! { <p class="empty">"មិនទាន់មានការផ្សាយនៅឡើយទេ"</p> }
                    >
                        <div class="listing-grid">
                            <For
                                each=move || listings.get()
                                key=|listing| listing.id
                                children=move |listing| view! { <ListingCard state=state listing=listing /> }
                            />
                        </div>
                    </Show>
                }
            }>
                <LoadingGrid />
            </Show>
        </section>
    }
}
