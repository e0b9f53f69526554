//! Клиентская библиотека для REST API доски объявлений.
//!
//! `MarketClient` хранит bearer-токен после `register`/`login` и подставляет
//! его во все запросы. Формы проверяются до отправки: невалидная форма
//! возвращает `MarketClientError::InvalidRequest` без обращения к сети.
#![warn(missing_docs)]

mod error;
mod http_client;
mod upload;

pub use error::{MarketClientError, MarketClientResult};
pub use market_core::listings::ListingQuery;
pub use market_core::models::{AuthResponse, Listing, ListingsPage, Review, User};
pub use market_core::validation::{ListingForm, LoginForm, ProfileForm, RegisterForm, ReviewForm};
pub use upload::ImageUpload;

use http_client::HttpClient;
use market_core::session::parse_token;
use market_core::validation::FieldErrors;

#[derive(Debug, Clone)]
/// Клиент доски объявлений поверх HTTP.
pub struct MarketClient {
    http: HttpClient,
    token: Option<String>,
}

impl MarketClient {
    /// Создаёт клиент с базовым URL API, например `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(base_url),
            token: None,
        }
    }

    /// Базовый URL API.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Устанавливает токен вручную; пустая строка сбрасывает его.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = parse_token(&token.into());
    }

    /// Возвращает текущий токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный токен.
    pub async fn register(&mut self, form: &RegisterForm) -> MarketClientResult<AuthResponse> {
        let form = form.validate().map_err(invalid)?;
        let auth = self
            .http
            .register(&form.username, &form.email, &form.password)
            .await?;
        self.token = parse_token(&auth.access_token);
        Ok(auth)
    }

    /// Выполняет вход и сохраняет полученный токен.
    pub async fn login(&mut self, form: &LoginForm) -> MarketClientResult<AuthResponse> {
        let form = form.validate().map_err(invalid)?;
        let auth = self.http.login(&form.username, &form.password).await?;
        self.token = parse_token(&auth.access_token);
        Ok(auth)
    }

    /// Профиль текущего пользователя.
    ///
    /// Требует токен.
    pub async fn me(&self) -> MarketClientResult<User> {
        self.http.me(self.require_token()?).await
    }

    /// Обновляет профиль текущего пользователя.
    ///
    /// Требует токен.
    pub async fn update_me(
        &self,
        form: &ProfileForm,
        profile_picture: Option<ImageUpload>,
        cover_banner: Option<ImageUpload>,
    ) -> MarketClientResult<User> {
        let token = self.require_token()?;
        let form = form.validate().map_err(invalid)?;
        self.http
            .update_me(token, &form, profile_picture, cover_banner)
            .await
    }

    /// Лента/поиск объявлений.
    pub async fn list_listings(&self, query: &ListingQuery) -> MarketClientResult<ListingsPage> {
        self.http.list_listings(query, self.get_token()).await
    }

    /// Объявление по идентификатору.
    pub async fn get_listing(&self, id: i64) -> MarketClientResult<Listing> {
        self.http.get_listing(id, self.get_token()).await
    }

    /// Засчитывает просмотр объявления.
    pub async fn record_view(&self, id: i64) -> MarketClientResult<()> {
        self.http.record_view(id, self.get_token()).await
    }

    /// Объявления текущего пользователя.
    ///
    /// Требует токен.
    pub async fn my_listings(&self) -> MarketClientResult<Vec<Listing>> {
        let page = self.http.my_listings(self.require_token()?).await?;
        Ok(page.items)
    }

    /// Объявления пользователя по его id.
    pub async fn user_listings(&self, user_id: i64) -> MarketClientResult<Vec<Listing>> {
        let page = self.http.user_listings(user_id, self.get_token()).await?;
        Ok(page.items)
    }

    /// Публикует объявление.
    ///
    /// Требует токен.
    pub async fn create_listing(
        &self,
        form: &ListingForm,
        images: Vec<ImageUpload>,
    ) -> MarketClientResult<Listing> {
        let token = self.require_token()?;
        let draft = form.validate().map_err(invalid)?;
        self.http.create_listing(token, &draft, images).await
    }

    /// Обновляет объявление: новые поля, новые изображения и id изображений
    /// на удаление.
    ///
    /// Требует токен.
    pub async fn update_listing(
        &self,
        id: i64,
        form: &ListingForm,
        images: Vec<ImageUpload>,
        images_to_delete: &[i64],
    ) -> MarketClientResult<Listing> {
        let token = self.require_token()?;
        let draft = form.validate().map_err(invalid)?;
        self.http
            .update_listing(token, id, &draft, images, images_to_delete)
            .await
    }

    /// Удаляет объявление.
    ///
    /// Требует токен.
    pub async fn delete_listing(&self, id: i64) -> MarketClientResult<()> {
        self.http.delete_listing(self.require_token()?, id).await
    }

    /// Оставляет отзыв к объявлению.
    ///
    /// Требует токен.
    pub async fn add_review(&self, listing_id: i64, form: &ReviewForm) -> MarketClientResult<Review> {
        let token = self.require_token()?;
        let form = form.validate().map_err(invalid)?;
        self.http.add_review(token, listing_id, &form).await
    }

    /// Все пользователи (администратор).
    ///
    /// Требует токен.
    pub async fn list_users(&self) -> MarketClientResult<Vec<User>> {
        self.http.list_users(self.require_token()?).await
    }

    /// Публичный профиль пользователя.
    pub async fn get_user(&self, id: i64) -> MarketClientResult<User> {
        self.http.get_user(id, self.get_token()).await
    }

    /// Удаляет пользователя (администратор).
    ///
    /// Требует токен.
    pub async fn delete_user(&self, id: i64) -> MarketClientResult<()> {
        self.http.delete_user(self.require_token()?, id).await
    }

    fn require_token(&self) -> MarketClientResult<&str> {
        self.token.as_deref().ok_or(MarketClientError::Unauthorized)
    }
}

fn invalid(errors: FieldErrors) -> MarketClientError {
    MarketClientError::InvalidRequest(errors.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_token_ignores_blank_values() {
        let mut client = MarketClient::new("http://127.0.0.1:8000");
        client.set_token("  abc  ");
        assert_eq!(client.get_token(), Some("abc"));
        client.set_token("   ");
        assert!(client.get_token().is_none());
    }

    #[tokio::test]
    async fn protected_calls_fail_fast_without_token() {
        let client = MarketClient::new("http://127.0.0.1:9");
        assert!(matches!(
            client.delete_listing(1).await,
            Err(MarketClientError::Unauthorized)
        ));
        assert!(matches!(client.me().await, Err(MarketClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn invalid_listing_form_is_rejected_before_any_request() {
        // Порт 9 (discard) не слушается: сетевой запрос дал бы Http-ошибку.
        let mut client = MarketClient::new("http://127.0.0.1:9");
        client.set_token("token");
        let form = ListingForm {
            title: String::new(),
            price: "10".to_string(),
            category: "phones".to_string(),
            ..ListingForm::default()
        };
        match client.create_listing(&form, Vec::new()).await {
            Err(MarketClientError::InvalidRequest(message)) => assert!(!message.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_login_form_keeps_token_untouched() {
        let mut client = MarketClient::new("http://127.0.0.1:9");
        client.set_token("previous");
        let result = client.login(&LoginForm::default()).await;
        assert!(matches!(result, Err(MarketClientError::InvalidRequest(_))));
        assert_eq!(client.get_token(), Some("previous"));
    }
}
