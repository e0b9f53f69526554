use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::routes::{HOME_PATH, Route};
use market_core::validation::{FieldErrors, RegisterForm};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::pages::FieldError;
use crate::pages::login::{auth_error, complete_sign_in};
use crate::router::{Link, navigate};
use crate::state::AppState;

#[component]
pub(crate) fn RegisterPage(state: AppState) -> impl IntoView {
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let field_errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let sending = RwSignal::new(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        let form = RegisterForm {
            username: username.get(),
            email: email.get(),
            password: password.get(),
            confirm_password: confirm_password.get(),
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
            match api::register(&form).await {
                Ok(auth) => match complete_sign_in(state, auth).await {
                    Ok(()) => navigate(state, HOME_PATH),
                    Err(err) => error.set(Some(err)),
                },
                Err(err) => error.set(Some(auth_error(&err))),
            }
            sending.set(false);
        });
    };

    let input = move |label: &'static str, field: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <label>
                {label}
                <input
                    type=kind
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
            <FieldError errors=field_errors field=field />
        }
    };

    view! {
        <section class="container auth">
            <form class="card form" on:submit=on_submit>
                <h1>"ចុះឈ្មោះ"</h1>
                <ErrorBanner error=error />
                {input("ឈ្មោះអ្នកប្រើ", "username", "text", username)}
                {input("អ៊ីមែល", "email", "email", email)}
                {input("ពាក្យសម្ងាត់", "password", "password", password)}
                {input("បញ្ជាក់ពាក្យសម្ងាត់", "confirm_password", "password", confirm_password)}
                <button type="submit" class="btn btn-primary" disabled=move || sending.get()>
                    "ចុះឈ្មោះ"
                </button>
                <p class="muted">
                    "មានគណនីរួចហើយ? "
                    <Link state=state href=Route::Login.path()>"ចូលគណនី"</Link>
                </p>
            </form>
        </section>
    }
}
