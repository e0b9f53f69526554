use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::Listing;
use market_core::listings::{ListingQuery, related};

use crate::api;
use crate::components::listing_card::ListingCard;
use crate::state::AppState;

const RELATED_LIMIT: usize = 4;

/// Похожие объявления той же категории.
#[component]
pub(crate) fn RelatedPosts(state: AppState, listing: Listing) -> impl IntoView {
    let items = RwSignal::new(Vec::<Listing>::new());

    let query = ListingQuery {
        category: Some(listing.category.clone()),
        limit: Some(RELATED_LIMIT as u32 + 1),
        ..ListingQuery::default()
    };
    let token = state.token.get_untracked();
    spawn_local(async move {
        match api::list_listings(&query, token.as_deref()).await {
            Ok(page) => items.set(related(&page.items, &listing, RELATED_LIMIT)),
            // Виджет второстепенный: без баннера, только в консоль.
            Err(err) => log::warn!("related listings: {err}"),
        }
    });

    view! {
        <Show when=move || items.with(|items| !items.is_empty())>
            <section class="related">
                <h2 class="section-title">"ការផ្សាយស្រដៀងគ្នា"</h2>
                <div class="listing-grid">
                    <For
                        each=move || items.get()
                        key=|listing| listing.id
                        children=move |listing| view! { <ListingCard state=state listing=listing /> }
                    />
                </div>
            </section>
        </Show>
    }
}
