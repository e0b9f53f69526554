use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::Listing;
use market_core::catalog::CATEGORIES;
use market_core::format::{parse_price, total_pages};
use market_core::listings::{DEFAULT_PAGE_SIZE, ListingQuery};
use market_core::retry::RetryCounter;
use market_core::routes::Route;

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::components::listing_card::ListingCard;
use crate::pages::LoadingGrid;
use crate::router::{navigate, query_of};
use crate::state::AppState;

/// Поиск с фильтрами. Фильтры живут в query-строке адреса, поэтому
/// «назад» в браузере возвращает предыдущий поиск.
#[component]
pub(crate) fn ListingsPage(state: AppState) -> impl IntoView {
    let listings = RwSignal::new(Vec::<Listing>::new());
    let total = RwSignal::new(0_u64);
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());
    let query = RwSignal::new(ListingQuery::default());

    let search = RwSignal::new(String::new());
    let category = RwSignal::new(String::new());
    let min_price = RwSignal::new(String::new());
    let max_price = RwSignal::new(String::new());

    let load = move || {
        loading.set(true);
        error.set(None);
        let mut current = query.get_untracked();
        current.limit = current.limit.or(Some(DEFAULT_PAGE_SIZE));
        let token = state.token.get_untracked();
        spawn_local(async move {
            match api::list_listings(&current, token.as_deref()).await {
                Ok(page) => {
                    total.set(page.total);
                    listings.set(page.items);
                    retry.update(RetryCounter::reset);
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            loading.set(false);
        });
    };

    Effect::new(move |_| {
        let location = state.location.get();
        if state.route() != Route::Listings {
            return;
        }
        let parsed = ListingQuery::from_query_string(query_of(&location));
        search.set(parsed.search.clone().unwrap_or_default());
        category.set(parsed.category.clone().unwrap_or_default());
        min_price.set(parsed.min_price.map(|p| p.to_string()).unwrap_or_default());
        max_price.set(parsed.max_price.map(|p| p.to_string()).unwrap_or_default());
        query.set(parsed);
        load();
    });

    let go_to = move |next: ListingQuery| {
        let query = next.to_query_string();
        let path = Route::Listings.path();
        if query.is_empty() {
            navigate(state, &path);
        } else {
            navigate(state, &format!("{path}?{query}"));
        }
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        go_to(ListingQuery {
            search: Some(search.get()),
            category: Some(category.get()),
            min_price: parse_price(&min_price.get()),
            max_price: parse_price(&max_price.get()),
            page: None,
            limit: None,
        });
    };

    let on_reset = move |_| go_to(ListingQuery::default());

    let page = move || query.with(|query| query.page.unwrap_or(1));
    let pages = move || {
        let limit = query.with(|query| query.limit.unwrap_or(DEFAULT_PAGE_SIZE));
        total_pages(total.get(), limit)
    };
    let to_page = move |page: u32| {
        let mut next = query.get();
        next.page = Some(page);
        go_to(next);
    };

    let on_retry = Callback::new(move |_| load());

    view! {
        <section class="container">
            <h1 class="page-title">"ការផ្សាយទាំងអស់"</h1>

            <form class="filters" on:submit=on_submit>
                <input
                    type="search"
                    placeholder="ស្វែងរក..."
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
                <select
                    prop:value=move || category.get()
                    on:change=move |ev| category.set(event_target_value(&ev))
                >
                    <option value="">"ប្រភេទទាំងអស់"</option>
                    {CATEGORIES
                        .iter()
                        .map(|c| view! { <option value=c.slug>{format!("{} {}", c.icon, c.label)}</option> })
                        .collect_view()}
                </select>
                <input
                    type="number"
                    min="0"
                    placeholder="តម្លៃចាប់ពី"
                    prop:value=move || min_price.get()
                    on:input=move |ev| min_price.set(event_target_value(&ev))
                />
                <input
                    type="number"
                    min="0"
                    placeholder="ដល់"
                    prop:value=move || max_price.get()
                    on:input=move |ev| max_price.set(event_target_value(&ev))
                />
                <button type="submit" class="btn btn-primary">"ស្វែងរក"</button>
                <button type="button" class="btn btn-light" on:click=on_reset>"សម្អាត"</button>
            </form>

            <p class="muted">{move || format!("រកឃើញ {} ការផ្សាយ", total.get())}</p>

            <ErrorBanner error=error on_retry=on_retry retry=retry />

            <Show when=move || !loading.get() fallback=|| view! { <LoadingGrid /> }>
                <Show
                    when=move || listings.with(|items| !items.is_empty())
                    fallback=|| view! { <p class="empty">"រកមិនឃើញការផ្សាយដែលត្រូវនឹងការស្វែងរកទេ"</p> }
                >
                    <div class="listing-grid">
                        <For
                            each=move || listings.get()
                            key=|listing| listing.id
                            children=move |listing| view! { <ListingCard state=state listing=listing /> }
                        />
                    </div>
                </Show>
            </Show>

            <Show when=move || { pages() > 1 }>
                <nav class="pagination">
                    <button
                        class="btn btn-light"
                        disabled=move || { page() <= 1 }
                        on:click=move |_| to_page(page().saturating_sub(1).max(1))
                    >
                        "‹ មុន"
                    </button>
                    <span>{move || format!("{} / {}", page(), pages())}</span>
                    <button
                        class="btn btn-light"
                        disabled=move || { page() >= pages() }
                        on:click=move |_| to_page(page() + 1)
                    >
                        "បន្ទាប់ ›"
                    </button>
                </nav>
            </Show>
        </section>
    }
}
