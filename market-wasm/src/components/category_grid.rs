use leptos::prelude::*;
use market_core::catalog::CATEGORIES;
use market_core::listings::ListingQuery;
use market_core::routes::Route;

use crate::router::Link;
use crate::state::AppState;

fn category_href(slug: &str) -> String {
    let query = ListingQuery {
        category: Some(slug.to_string()),
        ..ListingQuery::default()
    };
    format!("{}?{}", Route::Listings.path(), query.to_query_string())
}

#[component]
pub(crate) fn CategoryGrid(state: AppState) -> impl IntoView {
    view! {
        <section class="container">
            <h2 class="section-title">"ប្រភេទ"</h2>
            <div class="category-grid">
                {CATEGORIES
                    .iter()
                    .map(|category| {
                        view! {
                            <Link state=state href=category_href(category.slug) class="category-tile">
                                <span class="category-icon">{category.icon}</span>
                                <span>{category.label}</span>
                            </Link>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}
