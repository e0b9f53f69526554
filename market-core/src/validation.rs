//! Валидация форм на клиенте.
//!
//! Каждая форма хранит сырые строки из полей ввода. `validate()` обрезает
//! пробелы, прогоняет правила `validator` и возвращает либо готовые к
//! отправке данные, либо карту «поле → сообщение на кхмерском». Пока форма
//! невалидна, запрос к API не отправляется.

use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::catalog;
use crate::models::{Listing, User};

const MSG_TITLE_REQUIRED: &str = "សូមបញ្ចូលចំណងជើង";
const MSG_PRICE_REQUIRED: &str = "សូមបញ្ចូលតម្លៃ";
const MSG_PRICE_INVALID: &str = "តម្លៃត្រូវតែជាលេខមិនអវិជ្ជមាន";
const MSG_CATEGORY_REQUIRED: &str = "សូមជ្រើសរើសប្រភេទ";
const MSG_CATEGORY_UNKNOWN: &str = "ប្រភេទមិនត្រឹមត្រូវ";
const MSG_TELEGRAM_INVALID: &str = "តំណ Telegram មិនត្រឹមត្រូវ";
const MSG_EMAIL_REQUIRED: &str = "សូមបញ្ចូលអ៊ីមែល";
const MSG_EMAIL_INVALID: &str = "អ៊ីមែលមិនត្រឹមត្រូវ";
const MSG_PHONE_INVALID: &str = "លេខទូរស័ព្ទមិនត្រឹមត្រូវ";
const MSG_USERNAME_REQUIRED: &str = "សូមបញ្ចូលឈ្មោះអ្នកប្រើ";
const MSG_USERNAME_LENGTH: &str = "ឈ្មោះអ្នកប្រើត្រូវមាន 3 ដល់ 64 តួអក្សរ";
const MSG_PASSWORD_REQUIRED: &str = "សូមបញ្ចូលពាក្យសម្ងាត់";
const MSG_PASSWORD_SHORT: &str = "ពាក្យសម្ងាត់ត្រូវមានយ៉ាងហោចណាស់ 6 តួអក្សរ";
const MSG_PASSWORD_MISMATCH: &str = "ពាក្យសម្ងាត់មិនដូចគ្នា";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ошибки формы по полям, в порядке имён полей.
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Добавляет ошибку; первая ошибка поля сохраняется.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Сообщение для поля.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Нет ни одной ошибки.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Количество полей с ошибками.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Пары «поле → сообщение».
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Все сообщения одной строкой, для баннера ошибки.
    pub fn summary(&self) -> String {
        self.0.values().cloned().collect::<Vec<_>>().join("; ")
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.insert(field.to_string(), message);
            }
        }
        out
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn required_title(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", MSG_TITLE_REQUIRED));
    }
    Ok(())
}

fn validate_price(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(error("required", MSG_PRICE_REQUIRED));
    }
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(()),
        _ => Err(error("price", MSG_PRICE_INVALID)),
    }
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", MSG_CATEGORY_REQUIRED));
    }
    if catalog::find(value).is_none() {
        return Err(error("category", MSG_CATEGORY_UNKNOWN));
    }
    Ok(())
}

fn validate_telegram(value: &str) -> Result<(), ValidationError> {
    if is_valid_telegram(value) {
        Ok(())
    } else {
        Err(error("telegram", MSG_TELEGRAM_INVALID))
    }
}

fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(error("email", MSG_EMAIL_INVALID))
    }
}

fn validate_required_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", MSG_EMAIL_REQUIRED));
    }
    validate_optional_email(value)
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || is_valid_phone(value) {
        Ok(())
    } else {
        Err(error("phone", MSG_PHONE_INVALID))
    }
}

fn validate_username(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(error("required", MSG_USERNAME_REQUIRED));
    }
    if !(3..=64).contains(&len) {
        return Err(error("length", MSG_USERNAME_LENGTH));
    }
    Ok(())
}

fn required_login(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", MSG_USERNAME_REQUIRED));
    }
    Ok(())
}

fn required_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", MSG_PASSWORD_REQUIRED));
    }
    Ok(())
}

fn validate_new_password(value: &str) -> Result<(), ValidationError> {
    required_password(value)?;
    if value.chars().count() < 6 {
        return Err(error("length", MSG_PASSWORD_SHORT));
    }
    Ok(())
}

/// Кампучийский номер: `0XXXXXXXX[X]` или `+855XXXXXXXX[X]`.
///
/// Пробелы и дефисы игнорируются.
pub fn is_valid_phone(raw: &str) -> bool {
    let compact: String = raw
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect();

    let national = if let Some(rest) = compact.strip_prefix("+855") {
        rest
    } else if let Some(rest) = compact.strip_prefix('0') {
        rest
    } else {
        return false;
    };

    (8..=9).contains(&national.len())
        && national.chars().all(|ch| ch.is_ascii_digit())
        && !national.starts_with('0')
}

/// Пустое значение, `@username`, `username` или ссылка на `t.me`.
pub fn is_valid_telegram(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return true;
    }

    let username = if let Some(rest) = raw
        .strip_prefix("https://t.me/")
        .or_else(|| raw.strip_prefix("http://t.me/"))
        .or_else(|| raw.strip_prefix("t.me/"))
    {
        rest.trim_end_matches('/')
    } else {
        raw.strip_prefix('@').unwrap_or(raw)
    };

    (5..=32).contains(&username.len())
        && username
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
/// Форма подачи и редактирования объявления.
pub struct ListingForm {
    /// Заголовок.
    #[validate(
        custom(function = "required_title"),
        length(max = 120, message = "ចំណងជើងវែងពេក (អតិបរមា 120 តួអក្សរ)")
    )]
    pub title: String,
    /// Описание.
    #[validate(length(max = 5000, message = "ការពិពណ៌នាវែងពេក"))]
    pub description: String,
    /// Цена в том виде, в каком её ввели.
    #[validate(custom(function = "validate_price"))]
    pub price: String,
    /// Slug категории.
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    /// Контакт Telegram.
    #[validate(custom(function = "validate_telegram"))]
    pub telegram_link: String,
    /// Контактный email.
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Проверенные данные объявления, готовые к отправке.
pub struct ListingDraft {
    /// Заголовок.
    pub title: String,
    /// Описание.
    pub description: String,
    /// Цена.
    pub price: f64,
    /// Slug категории.
    pub category: String,
    /// Контакт Telegram.
    pub telegram_link: Option<String>,
    /// Контактный email.
    pub email: Option<String>,
}

impl ListingForm {
    /// Заполняет форму редактирования текущими значениями объявления.
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price.to_string(),
            category: listing.category.clone(),
            telegram_link: listing.telegram_link.clone().unwrap_or_default(),
            email: listing.email.clone().unwrap_or_default(),
        }
    }

    fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            category: self.category.trim().to_lowercase(),
            telegram_link: self.telegram_link.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// Проверяет форму и возвращает данные для отправки.
    pub fn validate(&self) -> Result<ListingDraft, FieldErrors> {
        let form = self.trimmed();
        Validate::validate(&form).map_err(FieldErrors::from)?;

        Ok(ListingDraft {
            price: form.price.parse::<f64>().unwrap_or_default(),
            telegram_link: non_blank(&form.telegram_link),
            email: non_blank(&form.email),
            title: form.title,
            description: form.description,
            category: form.category,
        })
    }
}

impl ListingDraft {
    /// Текстовые поля multipart-тела в порядке, который ожидает API.
    pub fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("price", self.price.to_string()),
            ("category", self.category.clone()),
            ("telegram_link", self.telegram_link.clone().unwrap_or_default()),
            ("email", self.email.clone().unwrap_or_default()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
/// Форма редактирования профиля.
pub struct ProfileForm {
    /// Имя.
    #[validate(length(max = 64, message = "ឈ្មោះវែងពេក"))]
    pub firstname: String,
    /// Фамилия.
    #[validate(length(max = 64, message = "ឈ្មោះវែងពេក"))]
    pub lastname: String,
    /// Email.
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    /// Пол.
    pub gender: String,
    /// Адрес.
    #[validate(length(max = 255, message = "អាសយដ្ឋានវែងពេក"))]
    pub address: String,
    /// Телефон.
    #[validate(custom(function = "validate_phone"))]
    pub phonenumber: String,
    /// О себе.
    #[validate(length(max = 500, message = "ការពិពណ៌នាអំពីខ្លួនវែងពេក"))]
    pub bio: String,
}

impl ProfileForm {
    /// Заполняет форму текущими данными пользователя.
    pub fn from_user(user: &User) -> Self {
        Self {
            firstname: user.firstname.clone().unwrap_or_default(),
            lastname: user.lastname.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            gender: user.gender.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            phonenumber: user.phonenumber.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
        }
    }

    /// Проверяет форму; результат это обрезанная копия, поля которой
    /// уходят в multipart как есть.
    pub fn validate(&self) -> Result<ProfileForm, FieldErrors> {
        let form = Self {
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            email: self.email.trim().to_string(),
            gender: self.gender.trim().to_string(),
            address: self.address.trim().to_string(),
            phonenumber: self.phonenumber.trim().to_string(),
            bio: self.bio.trim().to_string(),
        };
        Validate::validate(&form).map_err(FieldErrors::from)?;
        Ok(form)
    }

    /// Текстовые поля multipart-тела `PUT /users/me`.
    pub fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("firstname", self.firstname.clone()),
            ("lastname", self.lastname.clone()),
            ("email", self.email.clone()),
            ("gender", self.gender.clone()),
            ("address", self.address.clone()),
            ("phonenumber", self.phonenumber.clone()),
            ("bio", self.bio.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
/// Форма входа.
pub struct LoginForm {
    /// Логин или email.
    #[validate(custom(function = "required_login"))]
    pub username: String,
    /// Пароль.
    #[validate(custom(function = "required_password"))]
    pub password: String,
}

impl LoginForm {
    /// Проверяет форму; логин обрезается, пароль нет.
    pub fn validate(&self) -> Result<LoginForm, FieldErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        };
        Validate::validate(&form).map_err(FieldErrors::from)?;
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
/// Форма регистрации.
pub struct RegisterForm {
    /// Логин.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    /// Email.
    #[validate(custom(function = "validate_required_email"))]
    pub email: String,
    /// Пароль.
    #[validate(custom(function = "validate_new_password"))]
    pub password: String,
    /// Повтор пароля.
    pub confirm_password: String,
}

impl RegisterForm {
    /// Проверяет форму, включая совпадение паролей.
    pub fn validate(&self) -> Result<RegisterForm, FieldErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        };

        let mut errors = match Validate::validate(&form) {
            Ok(()) => FieldErrors::default(),
            Err(errors) => FieldErrors::from(errors),
        };
        if form.password != form.confirm_password {
            errors.insert("confirm_password", MSG_PASSWORD_MISMATCH);
        }

        if errors.is_empty() {
            Ok(form)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
/// Форма отзыва.
pub struct ReviewForm {
    /// Оценка 1..=5.
    #[validate(range(min = 1, max = 5, message = "សូមផ្តល់ពិន្ទុពី 1 ដល់ 5"))]
    pub rating: u8,
    /// Текст отзыва.
    #[validate(length(max = 1000, message = "មតិយោបល់វែងពេក"))]
    pub comment: String,
}

impl ReviewForm {
    /// Проверяет отзыв.
    pub fn validate(&self) -> Result<ReviewForm, FieldErrors> {
        let form = Self {
            rating: self.rating,
            comment: self.comment.trim().to_string(),
        };
        Validate::validate(&form).map_err(FieldErrors::from)?;
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_listing() -> ListingForm {
        ListingForm {
            title: "  iPhone 13  ".to_string(),
            description: "Like new".to_string(),
            price: "450.5".to_string(),
            category: "Phones".to_string(),
            telegram_link: "@seller_kh".to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn listing_form_produces_trimmed_draft() {
        let draft = valid_listing().validate().expect("form should be valid");
        assert_eq!(draft.title, "iPhone 13");
        assert_eq!(draft.price, 450.5);
        assert_eq!(draft.category, "phones");
        assert_eq!(draft.telegram_link.as_deref(), Some("@seller_kh"));
        assert!(draft.email.is_none());
    }

    #[test]
    fn missing_title_reports_required_error() {
        let form = ListingForm {
            title: "   ".to_string(),
            ..valid_listing()
        };
        let errors = form.validate().expect_err("title is required");
        assert_eq!(errors.get("title"), Some(MSG_TITLE_REQUIRED));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let form = ListingForm {
            title: String::new(),
            description: String::new(),
            price: "-3".to_string(),
            category: "boats".to_string(),
            telegram_link: "not a handle!".to_string(),
            email: "nope".to_string(),
        };
        let errors = form.validate().expect_err("form is invalid");
        assert_eq!(errors.get("price"), Some(MSG_PRICE_INVALID));
        assert_eq!(errors.get("category"), Some(MSG_CATEGORY_UNKNOWN));
        assert_eq!(errors.get("telegram_link"), Some(MSG_TELEGRAM_INVALID));
        assert_eq!(errors.get("email"), Some(MSG_EMAIL_INVALID));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn title_length_is_capped() {
        let form = ListingForm {
            title: "x".repeat(121),
            ..valid_listing()
        };
        let errors = form.validate().expect_err("title too long");
        assert_eq!(errors.get("title"), Some("ចំណងជើងវែងពេក (អតិបរមា 120 តួអក្សរ)"));
    }

    #[test]
    fn multipart_fields_keep_api_order() {
        let draft = valid_listing().validate().expect("valid");
        let names: Vec<_> = draft.multipart_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            ["title", "description", "price", "category", "telegram_link", "email"]
        );
    }

    #[test]
    fn phone_accepts_local_and_international_formats() {
        assert!(is_valid_phone("012 345 678"));
        assert!(is_valid_phone("+855-97-123-4567"));
        assert!(!is_valid_phone("12345678"));
        assert!(!is_valid_phone("0012345678"));
        assert!(!is_valid_phone("+85512ab5678"));
    }

    #[test]
    fn profile_form_rejects_bad_phone_only_when_present() {
        let ok = ProfileForm::default().validate();
        assert!(ok.is_ok());

        let bad = ProfileForm {
            phonenumber: "555".to_string(),
            ..ProfileForm::default()
        };
        let errors = bad.validate().expect_err("phone is invalid");
        assert_eq!(errors.get("phonenumber"), Some(MSG_PHONE_INVALID));
    }

    #[test]
    fn telegram_rules() {
        assert!(is_valid_telegram(""));
        assert!(is_valid_telegram("https://t.me/seller_kh/"));
        assert!(is_valid_telegram("seller_kh"));
        assert!(!is_valid_telegram("@abc"));
        assert!(!is_valid_telegram("https://example.com/seller"));
    }

    #[test]
    fn register_form_checks_password_confirmation() {
        let form = RegisterForm {
            username: "dara".to_string(),
            email: "Dara@Example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let errors = form.validate().expect_err("passwords differ");
        assert_eq!(errors.get("confirm_password"), Some(MSG_PASSWORD_MISMATCH));

        let ok = RegisterForm {
            confirm_password: "secret1".to_string(),
            ..form
        }
        .validate()
        .expect("form should be valid");
        assert_eq!(ok.email, "dara@example.com");
    }

    #[test]
    fn register_form_requires_fields() {
        let errors = RegisterForm::default().validate().expect_err("empty form");
        assert_eq!(errors.get("username"), Some(MSG_USERNAME_REQUIRED));
        assert_eq!(errors.get("email"), Some(MSG_EMAIL_REQUIRED));
        assert_eq!(errors.get("password"), Some(MSG_PASSWORD_REQUIRED));
    }

    #[test]
    fn login_form_requires_both_fields() {
        let errors = LoginForm::default().validate().expect_err("empty form");
        assert_eq!(errors.len(), 2);
        assert!(!errors.summary().is_empty());
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let errors = ReviewForm {
            rating: 0,
            comment: String::new(),
        }
        .validate()
        .expect_err("rating 0 is invalid");
        assert_eq!(errors.get("rating"), Some("សូមផ្តល់ពិន្ទុពី 1 ដល់ 5"));

        assert!(
            ReviewForm {
                rating: 5,
                comment: "great".to_string()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn edit_form_prefills_from_listing() {
        let listing = Listing {
            id: 3,
            title: "Bike".to_string(),
            price: 120.0,
            category: "vehicles".to_string(),
            email: Some("a@b.kh".to_string()),
            ..Listing::default()
        };
        let form = ListingForm::from_listing(&listing);
        assert_eq!(form.price, "120");
        assert_eq!(form.email, "a@b.kh");
        assert!(form.validate().is_ok());
    }
}
