pub(crate) mod admin;
pub(crate) mod edit_listing;
pub(crate) mod home;
pub(crate) mod listing_details;
pub(crate) mod listings;
pub(crate) mod login;
pub(crate) mod my_listings;
pub(crate) mod post_ad;
pub(crate) mod register;
pub(crate) mod user_profile;

use leptos::html::Input;
use leptos::prelude::*;
use market_core::validation::FieldErrors;
use web_sys::{File, Url};

/// Сообщение об ошибке под полем формы.
#[component]
pub(crate) fn FieldError(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors.with(|errors| {
            errors
                .get(field)
                .map(|message| view! { <p class="field-error">{message.to_string()}</p> })
        })
    }
}

/// Скелетон сетки карточек на время загрузки.
#[component]
pub(crate) fn LoadingGrid(#[prop(default = 8)] count: usize) -> impl IntoView {
    view! {
        <div class="listing-grid">
            {(0..count)
                .map(|_| {
                    view! {
                        <div class="listing-card skeleton">
                            <div class="skeleton-media"></div>
                            <div class="skeleton-line"></div>
                            <div class="skeleton-line short"></div>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// Диалог подтверждения браузера; без окна считается отказом.
pub(crate) fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}

/// Файлы, выбранные в `<input type="file">`.
pub(crate) fn selected_files(input: NodeRef<Input>) -> Vec<File> {
    let Some(input) = input.get_untracked() else {
        return Vec::new();
    };
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|index| list.item(index)).collect()
}

/// Сбрасывает выбор файлов.
pub(crate) fn clear_files(input: NodeRef<Input>) {
    if let Some(input) = input.get_untracked() {
        input.set_value("");
    }
}

/// Обновляет превью выбранных файлов, освобождая старые object URL.
pub(crate) fn replace_previews(previews: RwSignal<Vec<String>>, files: &[File]) {
    previews.update(|urls| {
        revoke(urls);
        *urls = files
            .iter()
            .filter_map(|file| Url::create_object_url_with_blob(file).ok())
            .collect();
    });
}

/// Освобождает object URL превью при уходе со страницы.
pub(crate) fn release_previews_on_cleanup(previews: RwSignal<Vec<String>>) {
    on_cleanup(move || {
        previews.try_update_untracked(|urls| revoke(urls));
    });
}

fn revoke(urls: &mut Vec<String>) {
    for url in urls.drain(..) {
        if let Err(err) = Url::revoke_object_url(&url) {
            log::debug!("revokeObjectURL failed: {err:?}");
        }
    }
}
