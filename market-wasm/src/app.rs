use chrono::Utc;
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::routes::{GuardDecision, Route, guard};

use crate::api;
use crate::components::footer::Footer;
use crate::components::navbar::Navbar;
use crate::components::not_found::NotFound;
use crate::pages::admin::AdminPage;
use crate::pages::edit_listing::EditListingPage;
use crate::pages::home::HomePage;
use crate::pages::listing_details::ListingDetailsPage;
use crate::pages::listings::ListingsPage;
use crate::pages::login::LoginPage;
use crate::pages::my_listings::MyListingsPage;
use crate::pages::post_ad::PostAdPage;
use crate::pages::register::RegisterPage;
use crate::pages::user_profile::UserProfilePage;
use crate::router;
use crate::state::AppState;

const CLOCK_TICK_MS: u32 = 1_000;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new(router::current_location());
    router::listen_history(state);

    let clock = StoredValue::new_local(Interval::new(CLOCK_TICK_MS, move || {
        state.now.set(Utc::now());
    }));
    on_cleanup(move || clock.dispose());

    // Токен из localStorage без профиля: догружаем пользователя.
    Effect::new(move |_| {
        let Some(token) = state.token.get() else {
            return;
        };
        if state.user.with_untracked(Option::is_some) {
            return;
        }
        spawn_local(async move {
            match api::me(&token).await {
                Ok(user) => state.set_user(user),
                Err(err) => {
                    let message = state.failure_message(&err);
                    log::warn!("failed to restore session: {message}");
                }
            }
        });
    });

    // Query-строка меняется чаще маршрута; страница пересоздаётся только
    // при смене самого маршрута.
    let route = Memo::new(move |_| state.route());
    let decision = Memo::new(move |_| guard(&route.get(), &state.session()));

    Effect::new(move |_| {
        if let GuardDecision::Redirect(to) = decision.get() {
            log::info!("redirecting {:?} to {to}", route.get_untracked());
            router::redirect(state, to);
        }
    });

    let page = move || {
        if decision.get() != GuardDecision::Allow {
            return view! { <div class="redirecting"></div> }.into_any();
        }
        match route.get() {
            Route::Home => view! { <HomePage state=state /> }.into_any(),
            Route::Listings => view! { <ListingsPage state=state /> }.into_any(),
            Route::ListingDetail(id) => view! { <ListingDetailsPage state=state id=id /> }.into_any(),
            Route::EditListing(id) => view! { <EditListingPage state=state id=id /> }.into_any(),
            Route::PostAd => view! { <PostAdPage state=state /> }.into_any(),
            Route::MyListings => view! { <MyListingsPage state=state /> }.into_any(),
            Route::UserProfile(id) => view! { <UserProfilePage state=state id=id /> }.into_any(),
            Route::Admin => view! { <AdminPage state=state /> }.into_any(),
            Route::Login => view! { <LoginPage state=state /> }.into_any(),
            Route::Register => view! { <RegisterPage state=state /> }.into_any(),
            Route::NotFound => view! { <NotFound state=state /> }.into_any(),
        }
    };

    view! {
        <div class="app">
            <Navbar state=state />
            <main class="page">{page}</main>
            <Footer />
        </div>
    }
}
