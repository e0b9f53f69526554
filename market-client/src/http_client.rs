use std::time::Duration;

use market_core::listings::ListingQuery;
use market_core::models::{AuthResponse, Listing, ListingsPage, Review, User};
use market_core::validation::{ListingDraft, ProfileForm, ReviewForm};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::{MarketClientError, MarketClientResult};
use crate::upload::ImageUpload;

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ReviewRequestDto<'a> {
    rating: u8,
    comment: &'a str,
}

#[derive(Debug, Clone)]
/// HTTP-клиент REST API доски объявлений.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build tuned reqwest client, using defaults");
                Client::new()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Базовый URL без завершающего `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        debug!(%method, path, authorized = token.is_some(), "sending request");
        let mut request = self.client.request(method, self.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn execute(request: RequestBuilder, path: &str) -> MarketClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(MarketClientError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), path, "request failed");
            return Err(MarketClientError::from_http_status(status, &body));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> MarketClientResult<T> {
        response
            .json::<T>()
            .await
            .map_err(MarketClientError::from_reqwest)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> MarketClientResult<T> {
        let request = self.request(Method::GET, path, token);
        let response = Self::execute(request, path).await?;
        Self::decode(response).await
    }

    /// универсальный helper для запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> MarketClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let request = self.request(method, path, token).json(body);
        let response = Self::execute(request, path).await?;
        Self::decode(response).await
    }

    async fn send_form<TRes: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Form,
        token: &str,
    ) -> MarketClientResult<TRes> {
        let request = self.request(method, path, Some(token)).multipart(form);
        let response = Self::execute(request, path).await?;
        Self::decode(response).await
    }

    async fn send_empty(&self, method: Method, path: &str, token: Option<&str>) -> MarketClientResult<()> {
        let request = self.request(method, path, token);
        Self::execute(request, path).await?;
        Ok(())
    }

    /// `POST /auth/register`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> MarketClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        self.send_json(Method::POST, "/auth/register", &payload, None)
            .await
    }

    /// `POST /auth/login`.
    pub async fn login(&self, username: &str, password: &str) -> MarketClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        self.send_json(Method::POST, "/auth/login", &payload, None)
            .await
    }

    /// `GET /users/me`.
    pub async fn me(&self, token: &str) -> MarketClientResult<User> {
        self.fetch("/users/me", Some(token)).await
    }

    /// `PUT /users/me` multipart-формой с необязательными аватаром и обложкой.
    pub async fn update_me(
        &self,
        token: &str,
        profile: &ProfileForm,
        profile_picture: Option<ImageUpload>,
        cover_banner: Option<ImageUpload>,
    ) -> MarketClientResult<User> {
        let mut form = Form::new();
        for (name, value) in profile.multipart_fields() {
            form = form.text(name, value);
        }
        if let Some(upload) = profile_picture {
            form = form.part("profile_picture", image_part(upload)?);
        }
        if let Some(upload) = cover_banner {
            form = form.part("cover_banner", image_part(upload)?);
        }
        self.send_form(Method::PUT, "/users/me", form, token).await
    }

    /// `GET /listings` с фильтрами и пагинацией.
    pub async fn list_listings(
        &self,
        query: &ListingQuery,
        token: Option<&str>,
    ) -> MarketClientResult<ListingsPage> {
        let path = "/listings";
        let request = self
            .request(Method::GET, path, token)
            .query(&query.to_pairs());
        let response = Self::execute(request, path).await?;
        Self::decode(response).await
    }

    /// `GET /listings/{id}`.
    pub async fn get_listing(&self, id: i64, token: Option<&str>) -> MarketClientResult<Listing> {
        self.fetch(&format!("/listings/{id}"), token).await
    }

    /// `POST /listings/{id}/view`: засчитывает просмотр.
    pub async fn record_view(&self, id: i64, token: Option<&str>) -> MarketClientResult<()> {
        self.send_empty(Method::POST, &format!("/listings/{id}/view"), token)
            .await
    }

    /// `GET /listings/my`.
    pub async fn my_listings(&self, token: &str) -> MarketClientResult<ListingsPage> {
        self.fetch("/listings/my", Some(token)).await
    }

    /// `GET /listings/user/{id}`.
    pub async fn user_listings(
        &self,
        user_id: i64,
        token: Option<&str>,
    ) -> MarketClientResult<ListingsPage> {
        self.fetch(&format!("/listings/user/{user_id}"), token)
            .await
    }

    /// `POST /listings` multipart-формой.
    pub async fn create_listing(
        &self,
        token: &str,
        draft: &ListingDraft,
        images: Vec<ImageUpload>,
    ) -> MarketClientResult<Listing> {
        let form = listing_form(draft, images, None)?;
        self.send_form(Method::POST, "/listings", form, token).await
    }

    /// `PUT /listings/{id}` multipart-формой; `images_to_delete` уходит
    /// JSON-массивом id.
    pub async fn update_listing(
        &self,
        token: &str,
        id: i64,
        draft: &ListingDraft,
        images: Vec<ImageUpload>,
        images_to_delete: &[i64],
    ) -> MarketClientResult<Listing> {
        let images_to_delete = if images_to_delete.is_empty() {
            None
        } else {
            Some(serde_json::to_string(images_to_delete).map_err(|err| {
                MarketClientError::InvalidRequest(format!("images_to_delete: {err}"))
            })?)
        };
        let form = listing_form(draft, images, images_to_delete)?;
        self.send_form(Method::PUT, &format!("/listings/{id}"), form, token)
            .await
    }

    /// `DELETE /listings/{id}`.
    pub async fn delete_listing(&self, token: &str, id: i64) -> MarketClientResult<()> {
        self.send_empty(Method::DELETE, &format!("/listings/{id}"), Some(token))
            .await
    }

    /// `POST /listings/{id}/reviews`.
    pub async fn add_review(
        &self,
        token: &str,
        listing_id: i64,
        review: &ReviewForm,
    ) -> MarketClientResult<Review> {
        let payload = ReviewRequestDto {
            rating: review.rating,
            comment: &review.comment,
        };
        self.send_json(
            Method::POST,
            &format!("/listings/{listing_id}/reviews"),
            &payload,
            Some(token),
        )
        .await
    }

    /// `GET /users` (администратор).
    pub async fn list_users(&self, token: &str) -> MarketClientResult<Vec<User>> {
        self.fetch("/users", Some(token)).await
    }

    /// `GET /users/{id}`.
    pub async fn get_user(&self, id: i64, token: Option<&str>) -> MarketClientResult<User> {
        self.fetch(&format!("/users/{id}"), token).await
    }

    /// `DELETE /users/{id}` (администратор).
    pub async fn delete_user(&self, token: &str, id: i64) -> MarketClientResult<()> {
        self.send_empty(Method::DELETE, &format!("/users/{id}"), Some(token))
            .await
    }
}

fn image_part(upload: ImageUpload) -> MarketClientResult<Part> {
    Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.mime)
        .map_err(MarketClientError::from_reqwest)
}

fn listing_form(
    draft: &ListingDraft,
    images: Vec<ImageUpload>,
    images_to_delete: Option<String>,
) -> MarketClientResult<Form> {
    let mut form = Form::new();
    for (name, value) in draft.multipart_fields() {
        form = form.text(name, value);
    }
    for upload in images {
        form = form.part("images", image_part(upload)?);
    }
    if let Some(ids) = images_to_delete {
        form = form.text("images_to_delete", ids);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/listings/my"), "http://localhost:8000/listings/my");
        assert_eq!(client.endpoint("users"), "http://localhost:8000/users");
    }

    #[test]
    fn listing_form_accepts_images_and_deletions() {
        let draft = ListingDraft {
            title: "Bike".to_string(),
            description: String::new(),
            price: 10.0,
            category: "vehicles".to_string(),
            telegram_link: None,
            email: None,
        };
        let images = vec![ImageUpload::new("a.png", vec![1, 2, 3])];
        let form = listing_form(&draft, images, Some("[1,2]".to_string()));
        assert!(form.is_ok());
    }
}
