use gloo_net::http::{Request, RequestBuilder, Response};
use market_core::error::ApiFailure;
use market_core::listings::ListingQuery;
use market_core::validation::{ListingDraft, LoginForm, ProfileForm, RegisterForm, ReviewForm};
use market_core::{AuthResponse, Listing, ListingsPage, Review, User};
use serde::de::DeserializeOwned;
use serde_json::json;
use wasm_bindgen::JsValue;
use web_sys::{File, FormData};

use crate::config::endpoint;

#[derive(Debug, Clone)]
pub(crate) enum ApiError {
    Network(String),
    Http { status: u16, body: String },
    Decode(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http { status, body } => write!(f, "http error {status}: {body}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl ApiError {
    pub(crate) fn failure(&self) -> ApiFailure {
        match self {
            Self::Network(msg) | Self::Decode(msg) => ApiFailure::Network(msg.clone()),
            Self::Http { status, body } => ApiFailure::from_status(*status, body),
        }
    }
}

fn network(err: impl core::fmt::Display) -> ApiError {
    ApiError::Network(err.to_string())
}

fn js_error(err: JsValue) -> ApiError {
    ApiError::Network(format!("{err:?}"))
}

fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
        None => builder,
    }
}

async fn execute(request: Result<Request, gloo_net::Error>) -> Result<Response, ApiError> {
    let request = request.map_err(network)?;
    let method = request.method();
    let url = request.url();
    log::debug!("{method:?} {url}");

    let response = request.send().await.map_err(network)?;
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::warn!("{method:?} {url} failed with {status}");
    Err(ApiError::Http { status, body })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn fetch<T: DeserializeOwned>(path: &str, token: Option<&str>) -> Result<T, ApiError> {
    let request = authorized(Request::get(&endpoint(path)), token).build();
    parse_json(execute(request).await?).await
}

fn listing_form_data(
    draft: &ListingDraft,
    images: &[File],
    images_to_delete: Option<&str>,
) -> Result<FormData, ApiError> {
    let form = FormData::new().map_err(js_error)?;
    for (name, value) in draft.multipart_fields() {
        form.append_with_str(name, &value).map_err(js_error)?;
    }
    for file in images {
        form.append_with_blob_and_filename("images", file, &file.name())
            .map_err(js_error)?;
    }
    if let Some(ids) = images_to_delete {
        form.append_with_str("images_to_delete", ids)
            .map_err(js_error)?;
    }
    Ok(form)
}

pub(crate) async fn register(form: &RegisterForm) -> Result<AuthResponse, ApiError> {
    let payload = json!({
        "username": form.username,
        "email": form.email,
        "password": form.password,
    });
    let request = Request::post(&endpoint("/auth/register")).json(&payload);
    parse_json(execute(request).await?).await
}

pub(crate) async fn login(form: &LoginForm) -> Result<AuthResponse, ApiError> {
    let payload = json!({
        "username": form.username,
        "password": form.password,
    });
    let request = Request::post(&endpoint("/auth/login")).json(&payload);
    parse_json(execute(request).await?).await
}

pub(crate) async fn me(token: &str) -> Result<User, ApiError> {
    fetch("/users/me", Some(token)).await
}

pub(crate) async fn update_me(
    token: &str,
    profile: &ProfileForm,
    profile_picture: Option<File>,
    cover_banner: Option<File>,
) -> Result<User, ApiError> {
    let form = FormData::new().map_err(js_error)?;
    for (name, value) in profile.multipart_fields() {
        form.append_with_str(name, &value).map_err(js_error)?;
    }
    if let Some(file) = &profile_picture {
        form.append_with_blob_and_filename("profile_picture", file, &file.name())
            .map_err(js_error)?;
    }
    if let Some(file) = &cover_banner {
        form.append_with_blob_and_filename("cover_banner", file, &file.name())
            .map_err(js_error)?;
    }

    let request = authorized(Request::put(&endpoint("/users/me")), Some(token)).body(form);
    parse_json(execute(request).await?).await
}

pub(crate) async fn list_listings(
    query: &ListingQuery,
    token: Option<&str>,
) -> Result<ListingsPage, ApiError> {
    let query = query.to_query_string();
    let path = if query.is_empty() {
        "/listings".to_string()
    } else {
        format!("/listings?{query}")
    };
    fetch(&path, token).await
}

pub(crate) async fn get_listing(id: i64, token: Option<&str>) -> Result<Listing, ApiError> {
    fetch(&format!("/listings/{id}"), token).await
}

pub(crate) async fn record_view(id: i64, token: Option<&str>) -> Result<(), ApiError> {
    let request = authorized(Request::post(&endpoint(&format!("/listings/{id}/view"))), token).build();
    execute(request).await?;
    Ok(())
}

pub(crate) async fn my_listings(token: &str) -> Result<Vec<Listing>, ApiError> {
    let page: ListingsPage = fetch("/listings/my", Some(token)).await?;
    Ok(page.items)
}

pub(crate) async fn user_listings(user_id: i64, token: Option<&str>) -> Result<Vec<Listing>, ApiError> {
    let page: ListingsPage = fetch(&format!("/listings/user/{user_id}"), token).await?;
    Ok(page.items)
}

pub(crate) async fn create_listing(
    token: &str,
    draft: &ListingDraft,
    images: &[File],
) -> Result<Listing, ApiError> {
    let form = listing_form_data(draft, images, None)?;
    let request = authorized(Request::post(&endpoint("/listings")), Some(token)).body(form);
    parse_json(execute(request).await?).await
}

pub(crate) async fn update_listing(
    token: &str,
    id: i64,
    draft: &ListingDraft,
    images: &[File],
    images_to_delete: Option<&str>,
) -> Result<Listing, ApiError> {
    let form = listing_form_data(draft, images, images_to_delete)?;
    let request =
        authorized(Request::put(&endpoint(&format!("/listings/{id}"))), Some(token)).body(form);
    parse_json(execute(request).await?).await
}

pub(crate) async fn delete_listing(token: &str, id: i64) -> Result<(), ApiError> {
    let request =
        authorized(Request::delete(&endpoint(&format!("/listings/{id}"))), Some(token)).build();
    execute(request).await?;
    Ok(())
}

pub(crate) async fn add_review(
    token: &str,
    listing_id: i64,
    review: &ReviewForm,
) -> Result<Review, ApiError> {
    let payload = json!({
        "rating": review.rating,
        "comment": review.comment,
    });
    let request = authorized(
        Request::post(&endpoint(&format!("/listings/{listing_id}/reviews"))),
        Some(token),
    )
    .json(&payload);
    parse_json(execute(request).await?).await
}

pub(crate) async fn list_users(token: &str) -> Result<Vec<User>, ApiError> {
    fetch("/users", Some(token)).await
}

pub(crate) async fn get_user(id: i64, token: Option<&str>) -> Result<User, ApiError> {
    fetch(&format!("/users/{id}"), token).await
}

pub(crate) async fn delete_user(token: &str, id: i64) -> Result<(), ApiError> {
    let request = authorized(Request::delete(&endpoint(&format!("/users/{id}"))), Some(token)).build();
    execute(request).await?;
    Ok(())
}
