use chrono::{DateTime, Utc};
use leptos::prelude::*;
use market_core::routes::{LOGIN_PATH, Route};
use market_core::{AuthResponse, Session, User};

use crate::api::ApiError;
use crate::router;
use crate::storage;

/// Общее состояние SPA: сессия (зеркало localStorage), адрес и часы.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AppState {
    pub(crate) token: RwSignal<Option<String>>,
    pub(crate) user: RwSignal<Option<User>>,
    pub(crate) location: RwSignal<String>,
    /// Тикает раз в секунду; от него считается «N минут назад».
    pub(crate) now: RwSignal<DateTime<Utc>>,
}

impl AppState {
    pub(crate) fn new(location: String) -> Self {
        Self {
            token: RwSignal::new(storage::load_token()),
            user: RwSignal::new(storage::load_user()),
            location: RwSignal::new(location),
            now: RwSignal::new(Utc::now()),
        }
    }

    pub(crate) fn session(&self) -> Session {
        Session::new(self.token.get(), self.user.get())
    }

    pub(crate) fn route(&self) -> Route {
        Route::parse(&self.location.get())
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.token.with(Option::is_some)
    }

    pub(crate) fn sign_in(&self, auth: AuthResponse) -> Result<(), String> {
        storage::save_token(&auth.access_token)?;
        if let Some(user) = &auth.user {
            storage::save_user(user)?;
        }
        self.token.set(Some(auth.access_token));
        self.user.set(auth.user);
        Ok(())
    }

    pub(crate) fn set_user(&self, user: User) {
        if let Err(err) = storage::save_user(&user) {
            log::warn!("{err}");
        }
        self.user.set(Some(user));
    }

    pub(crate) fn sign_out(&self) {
        if let Err(err) = storage::clear_token() {
            log::warn!("{err}");
        }
        if let Err(err) = storage::clear_user() {
            log::warn!("{err}");
        }
        self.token.set(None);
        self.user.set(None);
    }

    /// Текст ошибки для пользователя. На 401 сессия сбрасывается и
    /// происходит переход на `/login`.
    pub(crate) fn failure_message(&self, err: &ApiError) -> String {
        let failure = err.failure();
        if failure.requires_reauth() {
            self.sign_out();
            router::navigate(*self, LOGIN_PATH);
        }
        failure.user_message()
    }
}
