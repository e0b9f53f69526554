pub(crate) mod category_grid;
pub(crate) mod error_banner;
pub(crate) mod footer;
pub(crate) mod hero_banner;
pub(crate) mod image_gallery;
pub(crate) mod listing_card;
pub(crate) mod navbar;
pub(crate) mod not_found;
pub(crate) mod related_posts;

use leptos::prelude::*;
use market_core::media::PLACEHOLDER_IMAGE;

/// Обработчик `on:error` для `<img>`: битая ссылка заменяется заглушкой.
pub(crate) fn swap_to_placeholder(ev: &web_sys::Event) {
    let img = event_target::<web_sys::HtmlImageElement>(ev);
    if !img.src().ends_with(PLACEHOLDER_IMAGE) {
        img.set_src(PLACEHOLDER_IMAGE);
    }
}
