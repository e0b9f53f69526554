use leptos::ev::SubmitEvent;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::listings::{remove_by_id, sort_newest_first};
use market_core::retry::RetryCounter;
use market_core::routes::Route;
use market_core::validation::{FieldErrors, ProfileForm};
use market_core::{Listing, User, time_ago};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::components::listing_card::ListingCard;
use crate::components::swap_to_placeholder;
use crate::config;
use crate::pages::{FieldError, LoadingGrid, confirm, selected_files};
use crate::router::Link;
use crate::state::AppState;

/// Профиль текущего пользователя и его объявления.
#[component]
pub(crate) fn MyListingsPage(state: AppState) -> impl IntoView {
    let listings = RwSignal::new(Vec::<Listing>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());
    let editing = RwSignal::new(false);

    let load = move || {
        let Some(token) = state.token.get_untracked() else {
            return;
        };
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api::me(&token).await {
                Ok(user) => state.set_user(user),
                Err(err) => {
                    error.set(Some(state.failure_message(&err)));
                    loading.set(false);
                    return;
                }
            }
            match api::my_listings(&token).await {
                Ok(mut items) => {
                    sort_newest_first(&mut items);
                    listings.set(items);
                    retry.update(RetryCounter::reset);
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            loading.set(false);
        });
    };
    load();

    let on_delete = Callback::new(move |listing_id: i64| {
        if !confirm("តើអ្នកពិតជាចង់លុបការផ្សាយនេះមែនទេ?") {
            return;
        }
        let Some(token) = state.token.get_untracked() else {
            return;
        };
        spawn_local(async move {
            match api::delete_listing(&token, listing_id).await {
                // Список правится локально, без повторной загрузки.
                Ok(()) => listings.update(|items| {
                    remove_by_id(items, listing_id);
                }),
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
        });
    });

    let on_retry = Callback::new(move |_| load());

    let header = move || {
        state.user.get().map(|user| {
            let media = config::media();
            let avatar = media.avatar(user.profile_picture.as_deref());
            let cover = user
                .cover_banner
                .as_deref()
                .and_then(|path| media.resolve(path));
            let created_at = user.created_at;
            view! {
                <div class="profile-header">
                    {cover.map(|url| view! { <img class="profile-cover" src=url alt="" /> })}
                    <div class="profile-info">
                        <img class="avatar avatar-lg" src=avatar alt="" on:error=move |ev| swap_to_placeholder(&ev) />
                        <div>
                            <h1>{user.display_name()}</h1>
                            <p class="muted">{format!("@{}", user.username)}</p>
                            <p class="muted">
                                "សមាជិកតាំងពី "
                                {move || time_ago::format_optional(created_at, state.now.get())}
                            </p>
                            {user.bio.clone().map(|bio| view! { <p>{bio}</p> })}
                        </div>
                        <button class="btn btn-light" on:click=move |_| editing.update(|e| *e = !*e)>
                            {move || if editing.get() { "បិទ" } else { "កែប្រែប្រវត្តិរូប" }}
                        </button>
                    </div>
                </div>
            }
        })
    };

    view! {
        <section class="container">
            {header}

            <Show when=move || editing.get()>
                {move || state.user.get().map(|user| view! {
                    <ProfileEditor state=state user=user on_saved=Callback::new(move |_| editing.set(false)) />
                })}
            </Show>

            <div class="section-header">
                <h2 class="section-title">
                    {move || format!("ការផ្សាយរបស់ខ្ញុំ ({})", listings.with(Vec::len))}
                </h2>
                <Link state=state href=Route::PostAd.path() class="btn btn-primary">
                    "+ ដាក់លក់"
                </Link>
            </div>

            <ErrorBanner error=error on_retry=on_retry retry=retry />

            <Show when=move || !loading.get() fallback=|| view! { <LoadingGrid count=4 /> }>
                <Show
                    when=move || listings.with(|items| !items.is_empty())
                    fallback=|| view! { <p class="empty">"អ្នកមិនទាន់មានការផ្សាយនៅឡើយទេ"</p> }
                >
                    <div class="listing-grid">
                        <For
                            each=move || listings.get()
                            key=|listing| listing.id
                            children=move |listing| {
                                view! { <ListingCard state=state listing=listing on_delete=on_delete /> }
                            }
                        />
                    </div>
                </Show>
            </Show>
        </section>
    }
}

#[component]
fn ProfileEditor(state: AppState, user: User, on_saved: Callback<()>) -> impl IntoView {
    let initial = ProfileForm::from_user(&user);
    let firstname = RwSignal::new(initial.firstname);
    let lastname = RwSignal::new(initial.lastname);
    let email = RwSignal::new(initial.email);
    let gender = RwSignal::new(initial.gender);
    let address = RwSignal::new(initial.address);
    let phonenumber = RwSignal::new(initial.phonenumber);
    let bio = RwSignal::new(initial.bio);

    let field_errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let sending = RwSignal::new(false);
    let avatar_input: NodeRef<Input> = NodeRef::new();
    let cover_input: NodeRef<Input> = NodeRef::new();

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let form = ProfileForm {
            firstname: firstname.get(),
            lastname: lastname.get(),
            email: email.get(),
            gender: gender.get(),
            address: address.get(),
            phonenumber: phonenumber.get(),
            bio: bio.get(),
        };
        let form = match form.validate() {
            Ok(form) => form,
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };
        field_errors.set(FieldErrors::default());

        let Some(token) = state.token.get_untracked() else {
            return;
        };
        let avatar = selected_files(avatar_input).into_iter().next();
        let cover = selected_files(cover_input).into_iter().next();

        sending.set(true);
        spawn_local(async move {
            match api::update_me(&token, &form, avatar, cover).await {
                Ok(user) => {
                    state.set_user(user);
                    on_saved.run(());
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            sending.set(false);
        });
    };

    let text_field = move |label: &'static str, field: &'static str, value: RwSignal<String>| {
        view! {
            <label>
                {label}
                <input
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
            <FieldError errors=field_errors field=field />
        }
    };

    view! {
        <form class="card form" on:submit=on_submit>
            <ErrorBanner error=error />
            {text_field("នាមខ្លួន", "firstname", firstname)}
            {text_field("នាមត្រកូល", "lastname", lastname)}
            {text_field("អ៊ីមែល", "email", email)}
            <label>
                "ភេទ"
                <select
                    prop:value=move || gender.get()
                    on:change=move |ev| gender.set(event_target_value(&ev))
                >
                    <option value="">"-"</option>
                    <option value="male">"ប្រុស"</option>
                    <option value="female">"ស្រី"</option>
                    <option value="other">"ផ្សេងៗ"</option>
                </select>
            </label>
            {text_field("អាសយដ្ឋាន", "address", address)}
            {text_field("លេខទូរស័ព្ទ", "phonenumber", phonenumber)}
            <label>
                "អំពីខ្ញុំ"
                <textarea
                    rows="4"
                    prop:value=move || bio.get()
                    on:input=move |ev| bio.set(event_target_value(&ev))
                ></textarea>
            </label>
            <FieldError errors=field_errors field="bio" />
            <label>
                "រូបប្រូហ្វាល់"
                <input type="file" accept="image/*" node_ref=avatar_input />
            </label>
            <label>
                "រូបក្រប"
                <input type="file" accept="image/*" node_ref=cover_input />
            </label>
            <button type="submit" class="btn btn-primary" disabled=move || sending.get()>
                "រក្សាទុក"
            </button>
        </form>
    }
}
