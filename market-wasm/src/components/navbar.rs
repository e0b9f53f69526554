use leptos::prelude::*;
use market_core::routes::{HOME_PATH, Route};

use crate::components::swap_to_placeholder;
use crate::config;
use crate::router::{Link, navigate};
use crate::state::AppState;

#[component]
pub(crate) fn Navbar(state: AppState) -> impl IntoView {
    let menu_open = RwSignal::new(false);

    let on_logout = move |_| {
        state.sign_out();
        menu_open.set(false);
        navigate(state, HOME_PATH);
    };

    let avatar = move || {
        let user = state.user.get();
        config::media().avatar(user.as_ref().and_then(|u| u.profile_picture.as_deref()))
    };
    let name = move || {
        state
            .user
            .get()
            .map(|user| user.display_name())
            .unwrap_or_default()
    };
    let is_admin = move || state.session().is_admin();

    // Мобильное меню закрывается при любом переходе.
    Effect::new(move |_| {
        state.location.track();
        menu_open.set(false);
    });

    view! {
        <header class="navbar">
            <div class="container navbar-inner">
                <Link state=state href=HOME_PATH class="brand">
                    "🛒 ផ្សារអនឡាញ"
                </Link>

                <button class="navbar-toggle" on:click=move |_| menu_open.update(|open| *open = !*open)>
                    "☰"
                </button>

                <nav class="navbar-links" class:open=move || menu_open.get()>
                    <Link state=state href=Route::Listings.path()>
                        "ការផ្សាយទាំងអស់"
                    </Link>
                    <Link state=state href=Route::PostAd.path() class="btn btn-primary">
                        "+ ដាក់លក់"
                    </Link>

                    <Show
                        when=move || state.is_authenticated()
                        fallback=move || {
                            view! {
                                <Link state=state href=Route::Login.path()>
                                    "ចូលគណនី"
                                </Link>
                                <Link state=state href=Route::Register.path()>
                                    "ចុះឈ្មោះ"
                                </Link>
                            }
                        }
                    >
                        <Link state=state href=Route::MyListings.path() class="navbar-user">
                            <img
                                class="avatar avatar-sm"
                                src=avatar
                                alt="avatar"
                                on:error=move |ev| swap_to_placeholder(&ev)
                            />
                            <span>{name}</span>
                        </Link>
                        <Show when=is_admin>
                            <Link state=state href=Route::Admin.path()>
                                "គ្រប់គ្រង"
                            </Link>
                        </Show>
                        <button class="btn btn-light" on:click=on_logout>
                            "ចាកចេញ"
                        </button>
                    </Show>
                </nav>
            </div>
        </header>
    }
}
