use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::listings::{ListingQuery, filter_local, remove_by_id};
use market_core::retry::RetryCounter;
use market_core::routes::Route;
use market_core::{Listing, User, format, time_ago};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::pages::confirm;
use crate::router::Link;
use crate::state::AppState;

const ADMIN_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Users,
    Listings,
}

/// Панель администратора: пользователи и все объявления.
#[component]
pub(crate) fn AdminPage(state: AppState) -> impl IntoView {
    let tab = RwSignal::new(Tab::Users);
    let users = RwSignal::new(Vec::<User>::new());
    let listings = RwSignal::new(Vec::<Listing>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());
    let listing_filter = RwSignal::new(String::new());

    let load = move || {
        let Some(token) = state.token.get_untracked() else {
            return;
        };
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            let query = ListingQuery {
                limit: Some(ADMIN_PAGE_SIZE),
                ..ListingQuery::default()
            };
            match api::list_users(&token).await {
                Ok(items) => users.set(items),
                Err(err) => {
                    error.set(Some(state.failure_message(&err)));
                    loading.set(false);
                    return;
                }
            }
            match api::list_listings(&query, Some(&token)).await {
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

    let delete_user = move |user_id: i64| {
        if !confirm("លុបអ្នកប្រើប្រាស់នេះ?") {
            return;
        }
        let Some(token) = state.token.get_untracked() else {
            return;
        };
        spawn_local(async move {
            match api::delete_user(&token, user_id).await {
                Ok(()) => users.update(|items| items.retain(|user| user.id != user_id)),
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
        });
    };

    let delete_listing = move |listing_id: i64| {
        if !confirm("លុបការផ្សាយនេះ?") {
            return;
        }
        let Some(token) = state.token.get_untracked() else {
            return;
        };
        spawn_local(async move {
            match api::delete_listing(&token, listing_id).await {
                Ok(()) => listings.update(|items| {
                    remove_by_id(items, listing_id);
                }),
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
        });
    };

    // Быстрый фильтр по уже загруженным объявлениям, без запроса к API.
    let visible_listings = move || {
        let query = ListingQuery {
            search: Some(listing_filter.get()),
            ..ListingQuery::default()
        };
        listings.with(|items| filter_local(items, &query))
    };

    let on_retry = Callback::new(move |_| load());
    let current_user_id = move || state.user.with(|user| user.as_ref().map(|u| u.id));

    view! {
        <section class="container">
            <h1 class="page-title">"ផ្ទាំងគ្រប់គ្រង"</h1>
            <div class="tabs">
                <button
                    class="tab"
                    class:active=move || tab.get() == Tab::Users
                    on:click=move |_| tab.set(Tab::Users)
                >
                    {move || format!("អ្នកប្រើប្រាស់ ({})", users.with(Vec::len))}
                </button>
                <button
                    class="tab"
                    class:active=move || tab.get() == Tab::Listings
                    on:click=move |_| tab.set(Tab::Listings)
                >
                    {move || format!("ការផ្សាយ ({})", listings.with(Vec::len))}
                </button>
            </div>

            <ErrorBanner error=error on_retry=on_retry retry=retry />
            <Show when=move || loading.get()>
                <p class="muted">"កំពុងផ្ទុក..."</p>
            </Show>

            <Show when=move || tab.get() == Tab::Users>
                <table class="table">
                    <thead>
                        <tr>
                            <th>"ID"</th>
                            <th>"ឈ្មោះ"</th>
                            <th>"អ៊ីមែល"</th>
                            <th>"តួនាទី"</th>
                            <th>"ចុះឈ្មោះ"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || users.get()
                            key=|user| user.id
                            children=move |user| {
                                let user_id = user.id;
                                let created_at = user.created_at;
                                let is_self = move || current_user_id() == Some(user_id);
                                view! {
                                    <tr>
                                        <td>{user_id}</td>
                                        <td>
                                            <Link state=state href=Route::UserProfile(user_id).path()>
                                                {user.display_name()}
                                            </Link>
                                        </td>
                                        <td>{user.email.clone().unwrap_or_else(|| "-".to_string())}</td>
                                        <td>{if user.is_admin { "admin" } else { "user" }}</td>
                                        <td>{move || time_ago::format_optional(created_at, state.now.get())}</td>
                                        <td>
                                            <Show when=move || !is_self()>
                                                <button class="btn btn-danger btn-sm" on:click=move |_| delete_user(user_id)>
                                                    "លុប"
                                                </button>
                                            </Show>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </Show>

            <Show when=move || tab.get() == Tab::Listings>
                <div class="filters">
                    <input
                        type="search"
                        placeholder="ស្វែងរកការផ្សាយ..."
                        prop:value=move || listing_filter.get()
                        on:input=move |ev| listing_filter.set(event_target_value(&ev))
                    />
                </div>
                <table class="table">
                    <thead>
                        <tr>
                            <th>"ID"</th>
                            <th>"ចំណងជើង"</th>
                            <th>"តម្លៃ"</th>
                            <th>"ម្ចាស់"</th>
                            <th>"បង្ហោះ"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=visible_listings
                            key=|listing| listing.id
                            children=move |listing| {
                                let listing_id = listing.id;
                                let created_at = listing.created_at;
                                let owner = listing
                                    .owner
                                    .as_ref()
                                    .map(|owner| owner.display_name())
                                    .unwrap_or_else(|| "-".to_string());
                                view! {
                                    <tr>
                                        <td>{listing_id}</td>
                                        <td>
                                            <Link state=state href=Route::ListingDetail(listing_id).path()>
                                                {listing.title.clone()}
                                            </Link>
                                        </td>
                                        <td>{format::format_price(listing.price)}</td>
                                        <td>{owner}</td>
                                        <td>{move || time_ago::format_optional(created_at, state.now.get())}</td>
                                        <td>
                                            <button class="btn btn-danger btn-sm" on:click=move |_| delete_listing(listing_id)>
                                                "លុប"
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </Show>
        </section>
    }
}
