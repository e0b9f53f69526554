use leptos::prelude::*;
use market_core::retry::RetryCounter;

/// Баннер ошибки. Кнопка «ព្យាយាមម្តងទៀត» видна, пока не исчерпан счётчик
/// повторов.
#[component]
pub(crate) fn ErrorBanner(
    error: RwSignal<Option<String>>,
    #[prop(optional)] on_retry: Option<Callback<()>>,
    #[prop(optional)] retry: Option<RwSignal<RetryCounter>>,
) -> impl IntoView {
    let can_retry = move || {
        on_retry.is_some() && retry.is_none_or(|counter| counter.with(RetryCounter::can_retry))
    };

    let on_click = move |_| {
        if let Some(counter) = retry {
            let mut allowed = false;
            counter.update(|counter| allowed = counter.record_attempt());
            if !allowed {
                return;
            }
        }
        if let Some(on_retry) = on_retry {
            on_retry.run(());
        }
    };

    view! {
        <Show when=move || error.with(Option::is_some)>
            <div class="error-banner" role="alert">
                <span>{move || error.get().unwrap_or_default()}</span>
                <Show when=can_retry>
                    <button class="btn btn-light" on:click=on_click>
                        "ព្យាយាមម្តងទៀត"
                    </button>
                </Show>
            </div>
        </Show>
    }
}
