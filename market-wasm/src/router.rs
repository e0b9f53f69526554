use leptos::ev::MouseEvent;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

use crate::state::AppState;

/// Путь и query текущей страницы, например `/listings?category=phones`.
pub(crate) fn current_location() -> String {
    let location = window().location();
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    format!("{path}{search}")
}

/// Переход внутри SPA без перезагрузки страницы.
pub(crate) fn navigate(state: AppState, to: &str) {
    match window().history() {
        Ok(history) => {
            if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(to)) {
                log::warn!("pushState failed: {err:?}");
            }
        }
        Err(err) => log::warn!("history is not available: {err:?}"),
    }
    state.location.set(to.to_string());
    window().scroll_to_with_x_and_y(0.0, 0.0);
}

/// Как [`navigate`], но без новой записи в истории (редиректы защиты).
pub(crate) fn redirect(state: AppState, to: &str) {
    if let Ok(history) = window().history() {
        if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(to)) {
            log::warn!("replaceState failed: {err:?}");
        }
    }
    state.location.set(to.to_string());
}

/// Кнопки «назад/вперёд» браузера.
pub(crate) fn listen_history(state: AppState) {
    let handle = window_event_listener(leptos::ev::popstate, move |_| {
        state.location.set(current_location());
    });
    on_cleanup(move || handle.remove());
}

/// Query-часть адреса без `?`.
pub(crate) fn query_of(location: &str) -> &str {
    location.split_once('?').map(|(_, query)| query).unwrap_or_default()
}

#[component]
pub(crate) fn Link(
    state: AppState,
    #[prop(into)] href: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let target = href.clone();
    let on_click = move |ev: MouseEvent| {
        // Ctrl/Cmd-клик открывает новую вкладку как обычно.
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() || ev.button() != 0 {
            return;
        }
        ev.prevent_default();
        navigate(state, &target);
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
