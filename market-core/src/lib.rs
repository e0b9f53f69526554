//! Общая логика клиента доски объявлений, не зависящая от транспорта и
//! платформы.
//!
//! Крейт собирается и на хосте, и под `wasm32`: им пользуются нативный
//! `market-client`/`market-cli` и браузерный `market-wasm`. Здесь живут модель
//! данных, нормализация URL изображений, относительное время на кхмерском,
//! валидация форм, состояние карусели, таблица маршрутов и тексты ошибок.
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod format;
pub mod gallery;
pub mod listings;
pub mod media;
pub mod models;
pub mod retry;
pub mod routes;
pub mod session;
pub mod time_ago;
pub mod validation;

pub use error::ApiFailure;
pub use models::{AuthResponse, Listing, ListingImage, ListingsPage, Review, User, UserSummary};
pub use session::Session;
