use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::AuthResponse;
use market_core::routes::{HOME_PATH, Route};
use market_core::validation::{FieldErrors, LoginForm};

use crate::api::{self, ApiError};
use crate::components::error_banner::ErrorBanner;
use crate::pages::FieldError;
use crate::router::{Link, navigate};
use crate::state::AppState;

/// Сохраняет сессию; если бэкенд не вернул пользователя, догружает его.
pub(crate) async fn complete_sign_in(state: AppState, auth: AuthResponse) -> Result<(), String> {
    let token = auth.access_token.clone();
    let needs_profile = auth.user.is_none();
    state.sign_in(auth)?;
    if needs_profile {
        match api::me(&token).await {
            Ok(user) => state.set_user(user),
            Err(err) => log::warn!("failed to load profile after sign in: {err}"),
        }
    }
    Ok(())
}

pub(crate) fn auth_error(err: &ApiError) -> String {
    // 401 на входе это неверный пароль, а не протухшая сессия.
    match err {
        ApiError::Http { status: 401, .. } => "ឈ្មោះអ្នកប្រើ ឬពាក្យសម្ងាត់មិនត្រឹមត្រូវ".to_string(),
        other => other.failure().user_message(),
    }
}

#[component]
pub(crate) fn LoginPage(state: AppState) -> impl IntoView {
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let field_errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let sending = RwSignal::new(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let form = LoginForm {
            username: username.get(),
            password: password.get(),
        };
        let form = match form.validate() {
            Ok(form) => form,
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };
        field_errors.set(FieldErrors::default());

        sending.set(true);
        spawn_local(async move {
            match api::login(&form).await {
                Ok(auth) => match complete_sign_in(state, auth).await {
                    Ok(()) => navigate(state, HOME_PATH),
                    Err(err) => error.set(Some(err)),
                },
                Err(err) => error.set(Some(auth_error(&err))),
            }
            sending.set(false);
        });
    };

    view! {
        <section class="container auth">
            <form class="card form" on:submit=on_submit>
                <h1>"ចូលគណនី"</h1>
                <ErrorBanner error=error />
                <label>
                    "ឈ្មោះអ្នកប្រើ"
                    <input
                        autocomplete="username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                </label>
                <FieldError errors=field_errors field="username" />
                <label>
                    "ពាក្យសម្ងាត់"
                    <input
                        type="password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                <FieldError errors=field_errors field="password" />
                <button type="submit" class="btn btn-primary" disabled=move || sending.get()>
                    "ចូល"
                </button>
                <p class="muted">
                    "មិនទាន់មានគណនី? "
                    <Link state=state href=Route::Register.path()>"ចុះឈ្មោះ"</Link>
                </p>
            </form>
        </section>
    }
}
