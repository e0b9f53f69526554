use leptos::prelude::*;
use market_core::routes::Route;
use market_core::{Listing, catalog, format, time_ago};

use crate::components::swap_to_placeholder;
use crate::config;
use crate::router::Link;
use crate::state::AppState;

/// Карточка объявления в сетке. Кнопки управления показываются, если
/// передан `on_delete` и пользователь может управлять объявлением.
#[component]
pub(crate) fn ListingCard(
    state: AppState,
    listing: Listing,
    #[prop(optional)] on_delete: Option<Callback<i64>>,
) -> impl IntoView {
    let id = listing.id;
    let href = Route::ListingDetail(id).path();
    let cover = config::media().cover(&listing);
    let created_at = listing.created_at;
    let price = format::format_price(listing.price);
    let category = catalog::label(&listing.category);
    let image_count = listing.image_paths().len();
    let title = listing.title.clone();
    let alt = listing.title.clone();

    let can_manage = {
        let listing = listing.clone();
        move || on_delete.is_some() && state.session().can_manage(&listing)
    };

    view! {
        <article class="listing-card">
            <Link state=state href=href.clone() class="listing-card-media">
                <img src=cover alt=alt loading="lazy" on:error=move |ev| swap_to_placeholder(&ev) />
                <Show when=move || { image_count > 1 }>
                    <span class="badge badge-count">{format!("📷 {image_count}")}</span>
                </Show>
            </Link>
            <div class="listing-card-body">
                <Link state=state href=href class="listing-card-title">
                    {title}
                </Link>
                <p class="price">{price}</p>
                <p class="muted">
                    <span>{category}</span>
                    " · "
                    <span>{move || time_ago::format_optional(created_at, state.now.get())}</span>
                </p>
                <Show when=can_manage>
                    <div class="listing-card-actions">
                        <Link state=state href=Route::EditListing(id).path() class="btn btn-light">
                            "កែប្រែ"
                        </Link>
                        <button
                            class="btn btn-danger"
                            on:click=move |_| {
                                if let Some(on_delete) = on_delete {
                                    on_delete.run(id);
                                }
                            }
                        >
                            "លុប"
                        </button>
                    </div>
                </Show>
            </div>
        </article>
    }
}
