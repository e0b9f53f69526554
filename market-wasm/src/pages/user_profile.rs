use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::listings::sort_newest_first;
use market_core::retry::RetryCounter;
use market_core::{Listing, User, time_ago};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::components::listing_card::ListingCard;
use crate::components::swap_to_placeholder;
use crate::config;
use crate::pages::LoadingGrid;
use crate::state::AppState;

/// Публичный профиль продавца.
#[component]
pub(crate) fn UserProfilePage(state: AppState, id: i64) -> impl IntoView {
    let user = RwSignal::new(None::<User>);
    let listings = RwSignal::new(Vec::<Listing>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());

    let load = move || {
        loading.set(true);
        error.set(None);
        let token = state.token.get_untracked();
        spawn_local(async move {
            let profile = api::get_user(id, token.as_deref()).await;
            let items = api::user_listings(id, token.as_deref()).await;
            match (profile, items) {
                (Ok(profile), Ok(mut items)) => {
                    sort_newest_first(&mut items);
                    user.set(Some(profile));
                    listings.set(items);
                    retry.update(RetryCounter::reset);
                }
                (Err(err), _) | (_, Err(err)) => error.set(Some(state.failure_message(&err))),
            }
            loading.set(false);
        });
    };
    load();

    let on_retry = Callback::new(move |_| load());

    let header = move || {
        user.get().map(|user| {
            let media = config::media();
            let avatar = media.avatar(user.profile_picture.as_deref());
            let cover = user
                .cover_banner
                .as_deref()
                .and_then(|path| media.resolve(path));
            let created_at = user.created_at;
            let phone = user.phonenumber.clone().filter(|p| !p.trim().is_empty());
            view! {
                <div class="profile-header">
                    {cover.map(|url| view! { <img class="profile-cover" src=url alt="" /> })}
                    <div class="profile-info">
                        <img class="avatar avatar-lg" src=avatar alt="" on:error=move |ev| swap_to_placeholder(&ev) />
                        <div>
                            <h1>{user.display_name()}</h1>
                            <p class="muted">
                                "សមាជិកតាំងពី "
                                {move || time_ago::format_optional(created_at, state.now.get())}
                            </p>
                            {user.bio.clone().map(|bio| view! { <p>{bio}</p> })}
                            {phone.map(|phone| view! {
                                <a class="btn btn-light" href=format!("tel:{phone}")>{format!("📞 {phone}")}</a>
                            })}
                        </div>
                    </div>
                </div>
            }
        })
    };

    view! {
        <section class="container">
            <ErrorBanner error=error on_retry=on_retry retry=retry />
            {header}

            <h2 class="section-title">
                {move || format!("ការផ្សាយ ({})", listings.with(Vec::len))}
            </h2>
            <Show when=move || !loading.get() fallback=|| view! { <LoadingGrid count=4 /> }>
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
            </Show>
        </section>
    }
}
