use leptos::ev::SubmitEvent;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::{ApiFailure, Listing};
use market_core::gallery::{ImageEditState, MAX_IMAGES};
use market_core::retry::RetryCounter;
use market_core::routes::Route;
use market_core::validation::{FieldErrors, ListingForm};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::components::swap_to_placeholder;
use crate::config;
use crate::pages::post_ad::{ListingFields, ListingFieldsView};
use crate::pages::{clear_files, release_previews_on_cleanup, replace_previews, selected_files};
use crate::router::navigate;
use crate::state::AppState;

#[component]
pub(crate) fn EditListingPage(state: AppState, id: i64) -> impl IntoView {
    let fields = ListingFields::new();
    let images = RwSignal::new(ImageEditState::default());
    let listing = RwSignal::new(None::<Listing>);
    let loaded = move || listing.with(Option::is_some);
    let loading = RwSignal::new(true);
    // Профиль может догрузиться позже объявления, поэтому права
    // пересчитываются вместе с сессией.
    let forbidden = Memo::new(move |_| {
        listing.with(|listing| {
            listing
                .as_ref()
                .is_some_and(|listing| state.session().denies_management(listing))
        })
    });
    let field_errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let retry = RwSignal::new(RetryCounter::default());
    let sending = RwSignal::new(false);
    let files_input: NodeRef<Input> = NodeRef::new();
    let previews = RwSignal::new(Vec::<String>::new());
    release_previews_on_cleanup(previews);

    let load = move || {
        loading.set(true);
        error.set(None);
        let token = state.token.get_untracked();
        spawn_local(async move {
            match api::get_listing(id, token.as_deref()).await {
                Ok(found) => {
                    fields.fill(ListingForm::from_listing(&found));
                    images.set(ImageEditState::new(
                        config::media().listing_gallery(&found),
                    ));
                    listing.set(Some(found));
                    retry.update(RetryCounter::reset);
                }
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            loading.set(false);
        });
    };
    load();

    let on_files = move |_| {
        let files = selected_files(files_input);
        let accepted = images
            .try_update(|images| images.set_new_uploads(files.len()))
            .unwrap_or(false);
        if !accepted {
            let remaining = images.with(ImageEditState::remaining_slots);
            error.set(Some(format!("អាចបន្ថែមរូបភាពបាន {remaining} ទៀតប៉ុណ្ណោះ")));
            clear_files(files_input);
            images.update(|images| {
                images.set_new_uploads(0);
            });
            replace_previews(previews, &[]);
            return;
        }
        error.set(None);
        replace_previews(previews, &files);
    };

    let toggle_image = move |image_id: i64| {
        images.update(|images| {
            if images.is_marked(image_id) {
                images.restore(image_id);
            } else {
                images.mark_for_deletion(image_id);
            }
        });
        // Восстановленное фото может не влезть рядом с уже выбранными файлами.
        if !images.with(|images| images.can_accept(images.new_uploads())) {
            clear_files(files_input);
            images.update(|images| {
                images.set_new_uploads(0);
            });
            replace_previews(previews, &[]);
        }
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let draft = match fields.form().validate() {
            Ok(draft) => draft,
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
        let new_images = selected_files(files_input);
        if !images.with(|images| images.can_accept(new_images.len())) {
            error.set(Some(format!("អាចបញ្ចូលរូបភាពបានច្រើនបំផុត {MAX_IMAGES}")));
            return;
        }
        let to_delete = images.with(ImageEditState::images_to_delete_json);

        sending.set(true);
        spawn_local(async move {
            match api::update_listing(&token, id, &draft, &new_images, to_delete.as_deref()).await {
                Ok(updated) => navigate(state, &Route::ListingDetail(updated.id).path()),
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            sending.set(false);
        });
    };

    let on_cancel = move |_| navigate(state, &Route::ListingDetail(id).path());
    let on_retry = Callback::new(move |_| load());

    let existing = move || {
        images.with(|images| {
            images
                .existing()
                .iter()
                .map(|image| {
                    let url = image.url.clone();
                    let image_id = image.id;
                    let marked = image_id.is_some_and(|id| images.is_marked(id));
                    view! {
                        <div class="edit-image" class:marked=marked>
                            <img src=url alt="" on:error=move |ev| swap_to_placeholder(&ev) />
                            {image_id.map(|image_id| view! {
                                <button
                                    type="button"
                                    class="btn btn-sm"
                                    on:click=move |_| toggle_image(image_id)
                                >
                                    {if marked { "↺ ស្ដារ" } else { "✕ លុប" }}
                                </button>
                            })}
                        </div>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <section class="container narrow">
            <h1 class="page-title">"កែប្រែការផ្សាយ"</h1>
            <ErrorBanner error=error on_retry=on_retry retry=retry />

            <Show when=move || forbidden.get()>
                <div class="error-banner">
                    {ApiFailure::Forbidden.user_message()}
                </div>
            </Show>

            <Show when=move || loading.get() && !loaded()>
                <div class="card skeleton skeleton-form"></div>
            </Show>

            <Show when=move || loaded() && !forbidden.get()>
                <form class="card form" on:submit=on_submit>
                    <ListingFieldsView fields=fields errors=field_errors />

                    <h2>"រូបភាពបច្ចុប្បន្ន"</h2>
                    <div class="edit-image-grid">{existing}</div>

                    <label>
                        {move || {
                            format!(
                                "បន្ថែមរូបភាព (នៅសល់ {})",
                                images.with(ImageEditState::remaining_slots),
                            )
                        }}
                        <input
                            type="file"
                            accept="image/*"
                            multiple=true
                            node_ref=files_input
                            on:change=on_files
                        />
                    </label>
                    <div class="preview-grid">
                        <For
                            each=move || previews.get()
                            key=|url| url.clone()
                            children=|url| view! { <img class="preview" src=url alt="" /> }
                        />
                    </div>

                    <div class="form-actions">
                        <button type="button" class="btn btn-light" on:click=on_cancel>
                            "បោះបង់"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || sending.get()>
                            {move || if sending.get() { "កំពុងរក្សាទុក..." } else { "រក្សាទុក" }}
                        </button>
                    </div>
                </form>
            </Show>
        </section>
    }
}
