use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::format::stars;
use market_core::models::average_rating;
use market_core::retry::RetryCounter;
use market_core::routes::Route;
use market_core::validation::{FieldErrors, ReviewForm};
use market_core::{Listing, Review, catalog, format, time_ago};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::components::image_gallery::ImageGallery;
use crate::components::related_posts::RelatedPosts;
use crate::components::swap_to_placeholder;
use crate::config;
use crate::pages::{FieldError, confirm};
use crate::router::{Link, navigate};
use crate::state::AppState;

#[component]
pub(crate) fn ListingDetailsPage(state: AppState, id: i64) -> impl IntoView {
    let listing = RwSignal::new(None::<Listing>);
    let reviews = RwSignal::new(Vec::<Review>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());

    let load = move || {
        loading.set(true);
        error.set(None);
        let token = state.token.get_untracked();
        spawn_local(async move {
            match api::get_listing(id, token.as_deref()).await {
                Ok(loaded) => {
                    reviews.set(loaded.reviews.clone());
                    listing.set(Some(loaded));
                    retry.update(RetryCounter::reset);
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            loading.set(false);
        });
    };

    // Просмотр засчитывается один раз за открытие страницы.
    {
        let token = state.token.get_untracked();
        spawn_local(async move {
            if let Err(err) = api::record_view(id, token.as_deref()).await {
                log::debug!("record view for listing {id}: {err}");
            }
        });
    }
    load();

    let on_delete = move |_| {
        if !confirm("តើអ្នកពិតជាចង់លុបការផ្សាយនេះមែនទេ?") {
            return;
        }
        let Some(token) = state.token.get_untracked() else {
            navigate(state, &Route::Login.path());
            return;
        };
        spawn_local(async move {
            match api::delete_listing(&token, id).await {
                Ok(()) => navigate(state, &Route::MyListings.path()),
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
        });
    };

    let on_retry = Callback::new(move |_| load());

    let details = move || {
        listing.get().map(|listing| {
            let gallery = config::media().listing_gallery(&listing);
            let created_at = listing.created_at;
            let can_manage = state.session().can_manage(&listing);
            let telegram = listing
                .telegram_link
                .as_deref()
                .and_then(format::telegram_url);
            let email = listing.email.as_deref().and_then(format::mailto);
            let owner = listing.owner.clone();
            let title = listing.title.clone();
            let description = listing.description.clone();
            let price = format::format_price(listing.price);
            let category = catalog::label(&listing.category);
            let views = listing.views;
            let listing_id = listing.id;

            view! {
                <div class="details-layout">
                    <div class="details-main">
                        <ImageGallery images=gallery title=title.clone() />

                        <div class="card">
                            <h1 class="details-title">{title}</h1>
                            <p class="price price-lg">{price}</p>
                            <p class="muted">
                                <span>{category}</span>
                                " · "
                                <span>{move || time_ago::format_optional(created_at, state.now.get())}</span>
                                " · "
                                <span>{format!("👁 {views}")}</span>
                            </p>
                            <h2>"ការពិពណ៌នា"</h2>
                            <p class="description">
                                {if description.trim().is_empty() {
                                    "គ្មានការពិពណ៌នា".to_string()
                                } else {
                                    description
                                }}
                            </p>
                        </div>

                        <ReviewsSection state=state listing_id=listing_id reviews=reviews />
                    </div>

                    <aside class="details-side">
                        {owner.map(|owner| {
                            let avatar = config::media().avatar(owner.profile_picture.as_deref());
                            view! {
                                <Link state=state href=Route::UserProfile(owner.id).path() class="card seller">
                                    <img class="avatar" src=avatar alt="" on:error=move |ev| swap_to_placeholder(&ev) />
                                    <div>
                                        <strong>{owner.display_name()}</strong>
                                        <p class="muted">"មើលការផ្សាយផ្សេងទៀត"</p>
                                    </div>
                                </Link>
                            }
                        })}

                        <div class="card contact">
                            <h2>"ទំនាក់ទំនងអ្នកលក់"</h2>
                            {telegram.map(|url| view! {
                                <a class="btn btn-telegram" href=url target="_blank" rel="noopener">
                                    "Telegram"
                                </a>
                            })}
                            {email.map(|url| view! {
                                <a class="btn btn-light" href=url>"អ៊ីមែល"</a>
                            })}
                        </div>

                        <Show when=move || can_manage>
                            <div class="card manage">
                                <Link state=state href=Route::EditListing(id).path() class="btn btn-light">
                                    "កែប្រែ"
                                </Link>
                                <button class="btn btn-danger" on:click=on_delete>"លុប"</button>
                            </div>
                        </Show>
                    </aside>
                </div>

                <RelatedPosts state=state listing=listing />
            }
        })
    };

    view! {
        <section class="container">
            <ErrorBanner error=error on_retry=on_retry retry=retry />
            <Show when=move || loading.get() && listing.with(Option::is_none)>
                <div class="card skeleton skeleton-details"></div>
            </Show>
            {details}
        </section>
    }
}

#[component]
fn ReviewsSection(state: AppState, listing_id: i64, reviews: RwSignal<Vec<Review>>) -> impl IntoView {
    let rating = RwSignal::new(5_u8);
    let comment = RwSignal::new(String::new());
    let field_errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let sending = RwSignal::new(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let form = ReviewForm {
            rating: rating.get(),
            comment: comment.get(),
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
            navigate(state, &Route::Login.path());
            return;
        };

        sending.set(true);
        spawn_local(async move {
            match api::add_review(&token, listing_id, &form).await {
                Ok(review) => {
                    reviews.update(|reviews| reviews.insert(0, review));
                    comment.set(String::new());
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            sending.set(false);
        });
    };

    let summary = move || {
        reviews.with(|reviews| match average_rating(reviews) {
            Some(avg) => format!("{avg:.1} ★ ({} មតិ)", reviews.len()),
            None => "មិនទាន់មានមតិយោបល់".to_string(),
        })
    };

    view! {
        <div class="card reviews">
            <h2>"មតិយោបល់"</h2>
            <p class="muted">{summary}</p>

            <ul class="review-list">
                <For
                    each=move || reviews.get()
                    key=|review| (review.id, review.comment.clone())
                    children=move |review| {
                        let author = review
                            .reviewer
                            .as_ref()
                            .map(|reviewer| reviewer.display_name())
                            .unwrap_or_else(|| "អ្នកប្រើប្រាស់".to_string());
                        let created_at = review.created_at;
                        view! {
                            <li class="review">
                                <div class="review-head">
                                    <strong>{author}</strong>
                                    <span class="stars">{stars(review.rating)}</span>
                                    <span class="muted">
                                        {move || time_ago::format_optional(created_at, state.now.get())}
                                    </span>
                                </div>
                                <p>{review.comment.clone()}</p>
                            </li>
                        }
                    }
                />
            </ul>

            <Show
                when=move || state.is_authenticated()
                fallback=move || view! {
                    <p class="muted">
                        <Link state=state href=Route::Login.path()>"ចូលគណនី"</Link>
                        " ដើម្បីផ្តល់មតិយោបល់"
                    </p>
                }
            >
                <form class="review-form" on:submit=on_submit>
                    <ErrorBanner error=error />
                    <select
                        prop:value=move || rating.get().to_string()
                        on:change=move |ev| {
                            if let Ok(value) = event_target_value(&ev).parse::<u8>() {
                                rating.set(value);
                            }
                        }
                    >
                        {(1..=5_u8)
                            .rev()
                            .map(|value| view! { <option value=value.to_string()>{stars(value)}</option> })
                            .collect_view()}
                    </select>
                    <FieldError errors=field_errors field="rating" />
                    <textarea
                        placeholder="សរសេរមតិយោបល់..."
                        prop:value=move || comment.get()
                        on:input=move |ev| comment.set(event_target_value(&ev))
                    ></textarea>
                    <FieldError errors=field_errors field="comment" />
                    <button type="submit" class="btn btn-primary" disabled=move || sending.get()>
                        "បញ្ជូន"
                    </button>
                </form>
            </Show>
        </div>
    }
}
