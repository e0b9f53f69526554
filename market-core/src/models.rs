//! Записи, которые возвращает REST API.
//!
//! Бэкенд отдаёт их без строгой схемы: поля могут отсутствовать или приходить
//! как `null`, цена иногда приходит строкой, время бывает без часового пояса.
//! Поэтому почти все поля декодируются «мягко» и получают значение по
//! умолчанию вместо ошибки.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time_ago::parse_timestamp;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Краткие данные пользователя, вложенные в объявление или отзыв.
pub struct UserSummary {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    /// Имя.
    #[serde(default)]
    pub firstname: Option<String>,
    /// Фамилия.
    #[serde(default)]
    pub lastname: Option<String>,
    /// Путь или URL аватара.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl UserSummary {
    /// Имя для отображения: «имя фамилия», либо логин.
    pub fn display_name(&self) -> String {
        display_name(
            self.firstname.as_deref(),
            self.lastname.as_deref(),
            &self.username,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Полная модель пользователя (`/users/me`, `/users/{id}`).
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    /// Имя.
    #[serde(default)]
    pub firstname: Option<String>,
    /// Фамилия.
    #[serde(default)]
    pub lastname: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Пол в свободной форме.
    #[serde(default)]
    pub gender: Option<String>,
    /// Адрес.
    #[serde(default)]
    pub address: Option<String>,
    /// Номер телефона.
    #[serde(default)]
    pub phonenumber: Option<String>,
    /// О себе.
    #[serde(default)]
    pub bio: Option<String>,
    /// Путь или URL аватара.
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Путь или URL обложки профиля.
    #[serde(default)]
    pub cover_banner: Option<String>,
    /// Признак администратора.
    #[serde(default, deserialize_with = "nullable")]
    pub is_admin: bool,
    /// Дата регистрации (UTC).
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Имя для отображения: «имя фамилия», либо логин.
    pub fn display_name(&self) -> String {
        display_name(
            self.firstname.as_deref(),
            self.lastname.as_deref(),
            &self.username,
        )
    }

    /// Сокращённая форма для вложения в объявление.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Изображение объявления.
pub struct ListingImage {
    /// Идентификатор изображения, нужен для `images_to_delete`.
    #[serde(default)]
    pub id: Option<i64>,
    /// Относительный путь (`uploads/...`) или абсолютный URL.
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Отзыв к объявлению.
pub struct Review {
    /// Идентификатор отзыва.
    #[serde(default)]
    pub id: i64,
    /// Автор отзыва.
    #[serde(default)]
    pub reviewer: Option<UserSummary>,
    /// Оценка 1..=5.
    #[serde(default, deserialize_with = "nullable")]
    pub rating: u8,
    /// Текст отзыва.
    #[serde(default, deserialize_with = "nullable")]
    pub comment: String,
    /// Дата создания (UTC).
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Объявление.
pub struct Listing {
    /// Идентификатор объявления.
    pub id: i64,
    /// Заголовок.
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    /// Описание.
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    /// Цена в долларах. Строка с числом тоже принимается.
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    /// Slug категории.
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    /// Ссылка или имя в Telegram.
    #[serde(default)]
    pub telegram_link: Option<String>,
    /// Контактный email.
    #[serde(default)]
    pub email: Option<String>,
    /// Дата публикации (UTC).
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Упорядоченный список изображений.
    #[serde(default, deserialize_with = "nullable")]
    pub images: Vec<ListingImage>,
    /// Единственное изображение в старом формате записи.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Владелец объявления.
    #[serde(default)]
    pub owner: Option<UserSummary>,
    /// Количество просмотров.
    #[serde(default, deserialize_with = "nullable")]
    pub views: u64,
    /// Отзывы.
    #[serde(default, deserialize_with = "nullable")]
    pub reviews: Vec<Review>,
}

impl Listing {
    /// Пути изображений в порядке показа.
    ///
    /// Непустой `images` имеет приоритет, иначе используется старое поле
    /// `image_url`.
    pub fn image_paths(&self) -> Vec<&str> {
        if !self.images.is_empty() {
            return self
                .images
                .iter()
                .map(|image| image.image_url.as_str())
                .filter(|path| !path.trim().is_empty())
                .collect();
        }

        self.image_url
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .into_iter()
            .collect()
    }

    /// Идентификатор владельца, если бэкенд его прислал.
    pub fn owner_id(&self) -> Option<i64> {
        self.owner.as_ref().map(|owner| owner.id)
    }

    /// Средняя оценка по отзывам с валидным рейтингом.
    pub fn average_rating(&self) -> Option<f64> {
        average_rating(&self.reviews)
    }
}

/// Средняя оценка; рейтинги вне 1..=5 не учитываются.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    let ratings: Vec<u8> = reviews
        .iter()
        .map(|review| review.rating)
        .filter(|rating| (1..=5).contains(rating))
        .collect();
    if ratings.is_empty() {
        return None;
    }
    let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
    Some(f64::from(sum) / ratings.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Ответ после успешного входа или регистрации.
pub struct AuthResponse {
    /// Bearer-токен.
    pub access_token: String,
    /// Тип токена, обычно `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Данные пользователя, если бэкенд их вернул.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawListingsPage")]
/// Страница объявлений.
///
/// Бэкенд отдаёт либо голый массив, либо объект `{items|listings, total}`.
pub struct ListingsPage {
    /// Объявления на странице.
    pub items: Vec<Listing>,
    /// Общее количество, если известно; иначе длина `items`.
    pub total: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawListingsPage {
    Bare(Vec<Listing>),
    Wrapped {
        #[serde(alias = "listings", alias = "results")]
        items: Vec<Listing>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl From<RawListingsPage> for ListingsPage {
    fn from(value: RawListingsPage) -> Self {
        match value {
            RawListingsPage::Bare(items) => Self {
                total: items.len() as u64,
                items,
            },
            RawListingsPage::Wrapped { items, total } => Self {
                total: total.unwrap_or(items.len() as u64),
                items,
            },
        }
    }
}

fn display_name(firstname: Option<&str>, lastname: Option<&str>, username: &str) -> String {
    let full = [firstname, lastname]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if full.is_empty() {
        username.to_string()
    } else {
        full
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(value)) => value,
        Some(NumberOrText::Text(raw)) => raw.trim().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_tolerates_nulls_and_string_price() {
        let raw = r#"{
            "id": 7,
            "title": null,
            "price": "12.50",
            "category": "phones",
            "images": null,
            "created_at": "2026-01-01T10:00:00",
            "views": null
        }"#;
        let listing: Listing = serde_json::from_str(raw).expect("listing should parse");
        assert_eq!(listing.id, 7);
        assert_eq!(listing.title, "");
        assert_eq!(listing.price, 12.5);
        assert!(listing.images.is_empty());
        assert_eq!(listing.views, 0);
        assert!(listing.created_at.is_some());
    }

    #[test]
    fn listing_with_bad_timestamp_still_parses() {
        let raw = r#"{"id": 1, "created_at": "yesterday"}"#;
        let listing: Listing = serde_json::from_str(raw).expect("listing should parse");
        assert!(listing.created_at.is_none());
    }

    #[test]
    fn image_paths_prefers_images_over_legacy_field() {
        let listing = Listing {
            id: 1,
            images: vec![
                ListingImage {
                    id: Some(1),
                    image_url: "uploads/a.jpg".to_string(),
                },
                ListingImage {
                    id: Some(2),
                    image_url: "  ".to_string(),
                },
            ],
            image_url: Some("uploads/legacy.jpg".to_string()),
            ..Listing::default()
        };
        assert_eq!(listing.image_paths(), vec!["uploads/a.jpg"]);
    }

    #[test]
    fn image_paths_falls_back_to_legacy_field() {
        let listing = Listing {
            id: 1,
            image_url: Some("legacy.jpg".to_string()),
            ..Listing::default()
        };
        assert_eq!(listing.image_paths(), vec!["legacy.jpg"]);
    }

    #[test]
    fn listings_page_accepts_bare_array_and_wrapped_object() {
        let bare: ListingsPage = serde_json::from_str(r#"[{"id":1},{"id":2}]"#).expect("bare");
        assert_eq!(bare.items.len(), 2);
        assert_eq!(bare.total, 2);

        let wrapped: ListingsPage =
            serde_json::from_str(r#"{"listings":[{"id":3}],"total":40}"#).expect("wrapped");
        assert_eq!(wrapped.items[0].id, 3);
        assert_eq!(wrapped.total, 40);
    }

    #[test]
    fn display_name_uses_full_name_when_present() {
        let user = User {
            id: 1,
            username: "dara".to_string(),
            firstname: Some("Sok".to_string()),
            lastname: Some(" Dara ".to_string()),
            ..User::default()
        };
        assert_eq!(user.display_name(), "Sok Dara");

        let anonymous = UserSummary {
            id: 2,
            username: "vanna".to_string(),
            ..UserSummary::default()
        };
        assert_eq!(anonymous.display_name(), "vanna");
    }

    #[test]
    fn average_rating_ignores_out_of_range_values() {
        let listing = Listing {
            id: 1,
            reviews: vec![
                Review {
                    rating: 5,
                    ..Review::default()
                },
                Review {
                    rating: 2,
                    ..Review::default()
                },
                Review {
                    rating: 0,
                    ..Review::default()
                },
            ],
            ..Listing::default()
        };
        assert_eq!(listing.average_rating(), Some(3.5));
    }

    #[test]
    fn user_survives_local_storage_round_trip() {
        let raw = r#"{"id":1,"username":"u","is_admin":true,"created_at":"2026-01-01T00:00:00Z"}"#;
        let user: User = serde_json::from_str(raw).expect("user should parse");
        let stored = serde_json::to_string(&user).expect("user should serialize");
        let restored: User = serde_json::from_str(&stored).expect("user should parse again");
        assert_eq!(restored, user);
        assert!(restored.is_admin);
    }
}
