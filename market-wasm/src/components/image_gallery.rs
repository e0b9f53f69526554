use gloo_timers::callback::Interval;
use leptos::prelude::*;
use market_core::gallery::{AUTO_ADVANCE_MS, Carousel};
use market_core::media::{GalleryImage, PLACEHOLDER_IMAGE};

use crate::components::swap_to_placeholder;

/// Галерея объявления: большое фото, стрелки, миниатюры, автопрокрутка и
/// полноэкранный режим.
#[component]
pub(crate) fn ImageGallery(images: Vec<GalleryImage>, #[prop(into)] title: String) -> impl IntoView {
    let urls: Vec<String> = if images.is_empty() {
        vec![PLACEHOLDER_IMAGE.to_string()]
    } else {
        images.into_iter().map(|image| image.url).collect()
    };
    let carousel = RwSignal::new(Carousel::new(urls.len()));
    let urls = StoredValue::new(urls);

    let timer = StoredValue::new_local(Interval::new(AUTO_ADVANCE_MS, move || {
        carousel.update(|carousel| {
            carousel.tick();
        });
    }));
    on_cleanup(move || timer.dispose());

    let current = move || {
        let index = carousel.with(Carousel::index);
        urls.with_value(|urls| urls.get(index).cloned().unwrap_or_default())
    };
    let has_controls = move || carousel.with(Carousel::has_controls);
    let counter = move || {
        carousel.with(|carousel| format!("{} / {}", carousel.index() + 1, carousel.len()))
    };

    let prev = move |_| carousel.update(Carousel::prev);
    let next = move |_| carousel.update(Carousel::next);
    let toggle_fullscreen = move |_| carousel.update(Carousel::toggle_fullscreen);
    let close_fullscreen = move |_| carousel.update(Carousel::close_fullscreen);

    let thumbnails = move || {
        urls.get_value()
            .into_iter()
            .enumerate()
            .map(|(index, url)| {
                let active = move || carousel.with(|carousel| carousel.index() == index);
                view! {
                    <button
                        class="thumbnail"
                        class:active=active
                        on:click=move |_| {
                            carousel.update(|carousel| {
                                carousel.select(index);
                            })
                        }
                    >
                        <img src=url alt="" on:error=move |ev| swap_to_placeholder(&ev) />
                    </button>
                }
            })
            .collect_view()
    };

    let alt = title.clone();
    view! {
        <div
            class="gallery"
            on:mouseenter=move |_| carousel.update(Carousel::pause)
            on:mouseleave=move |_| carousel.update(Carousel::resume)
        >
            <div class="gallery-main">
                <img
                    src=current
                    alt=alt
                    on:click=toggle_fullscreen
                    on:error=move |ev| swap_to_placeholder(&ev)
                />
                <Show when=has_controls>
                    <button class="gallery-arrow gallery-prev" on:click=prev>"‹"</button>
                    <button class="gallery-arrow gallery-next" on:click=next>"›"</button>
                    <span class="gallery-counter">{counter}</span>
                </Show>
            </div>

            <Show when=has_controls>
                <div class="gallery-thumbnails">{thumbnails}</div>
            </Show>

            <Show when=move || carousel.with(Carousel::is_fullscreen)>
                <div class="gallery-fullscreen" on:click=close_fullscreen>
                    <img
                        src=current
                        alt=title.clone()
                        on:click=move |ev| ev.stop_propagation()
                    />
                    <button class="gallery-close" on:click=close_fullscreen>"✕"</button>
                    <Show when=has_controls>
                        <button
                            class="gallery-arrow gallery-prev"
                            on:click=move |ev| {
                                ev.stop_propagation();
                                carousel.update(Carousel::prev);
                            }
                        >
                            "‹"
                        </button>
                        <button
                            class="gallery-arrow gallery-next"
                            on:click=move |ev| {
                                ev.stop_propagation();
                                carousel.update(Carousel::next);
                            }
                        >
                            "›"
                        </button>
                    </Show>
                </div>
            </Show>
        </div>
    }
}
