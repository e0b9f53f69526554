//! Сессия в localStorage: токен и последний известный профиль.

use market_core::User;
use market_core::session::{parse_token, parse_user};
use web_sys::Storage;

const TOKEN_KEY: &str = "market_token";
const USER_KEY: &str = "market_user";

fn local_storage() -> Result<Storage, String> {
    web_sys::window()
        .ok_or("window is not available")?
        .local_storage()
        .map_err(|_| "failed to access localStorage")?
        .ok_or_else(|| "localStorage is not available".to_string())
}

fn read(key: &str) -> Option<String> {
    local_storage().ok()?.get_item(key).ok()?
}

fn write(key: &str, value: &str) -> Result<(), String> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| format!("failed to save {key}"))
}

fn remove(key: &str) -> Result<(), String> {
    local_storage()?
        .remove_item(key)
        .map_err(|_| format!("failed to clear {key}"))
}

pub(crate) fn load_token() -> Option<String> {
    read(TOKEN_KEY).as_deref().and_then(parse_token)
}

pub(crate) fn save_token(token: &str) -> Result<(), String> {
    write(TOKEN_KEY, token)
}

pub(crate) fn clear_token() -> Result<(), String> {
    remove(TOKEN_KEY)
}

pub(crate) fn load_user() -> Option<User> {
    read(USER_KEY).as_deref().and_then(parse_user)
}

pub(crate) fn save_user(user: &User) -> Result<(), String> {
    let raw = serde_json::to_string(user).map_err(|err| format!("failed to serialize user: {err}"))?;
    write(USER_KEY, &raw)
}

pub(crate) fn clear_user() -> Result<(), String> {
    remove(USER_KEY)
}
