use std::time::{SystemTime, UNIX_EPOCH};

use market_client::{
    ImageUpload, ListingForm, ListingQuery, LoginForm, MarketClient, MarketClientError,
    RegisterForm, ReviewForm,
};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

// 1x1 прозрачный PNG.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[tokio::test]
#[ignore = "requires running marketplace backend"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("MARKET_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let mut client = MarketClient::new(base_url);

    let suffix = unique_suffix();
    let username = format!("smoke_{suffix}");
    let password = "password123".to_string();

    client
        .register(&RegisterForm {
            username: username.clone(),
            email: format!("smoke_{suffix}@example.com"),
            password: password.clone(),
            confirm_password: password.clone(),
        })
        .await
        .expect("register must succeed");

    let login = client
        .login(&LoginForm {
            username: username.clone(),
            password,
        })
        .await
        .expect("login must succeed");
    assert!(!login.access_token.is_empty());
    assert!(client.get_token().is_some());

    let me = client.me().await.expect("me must succeed");
    assert_eq!(me.username, username);

    let form = ListingForm {
        title: "smoke bike".to_string(),
        description: "smoke description".to_string(),
        price: "25".to_string(),
        category: "vehicles".to_string(),
        telegram_link: "@smoke_seller".to_string(),
        email: String::new(),
    };
    let created = client
        .create_listing(&form, vec![ImageUpload::new("pixel.png", PIXEL_PNG.to_vec())])
        .await
        .expect("create_listing must succeed");
    assert_eq!(created.title, "smoke bike");

    client
        .record_view(created.id)
        .await
        .expect("record_view must succeed");

    let fetched = client
        .get_listing(created.id)
        .await
        .expect("get_listing must succeed");
    assert_eq!(fetched.id, created.id);

    let found = client
        .list_listings(&ListingQuery {
            search: Some("smoke bike".to_string()),
            ..ListingQuery::default()
        })
        .await
        .expect("list_listings must succeed");
    assert!(found.items.iter().any(|listing| listing.id == created.id));

    let mine = client.my_listings().await.expect("my_listings must succeed");
    assert!(mine.iter().any(|listing| listing.id == created.id));

    let to_delete: Vec<i64> = fetched.images.iter().filter_map(|image| image.id).collect();
    let updated = client
        .update_listing(
            created.id,
            &ListingForm {
                title: "smoke bike updated".to_string(),
                ..form
            },
            Vec::new(),
            &to_delete,
        )
        .await
        .expect("update_listing must succeed");
    assert_eq!(updated.title, "smoke bike updated");

    client
        .add_review(
            created.id,
            &ReviewForm {
                rating: 5,
                comment: "smoke".to_string(),
            },
        )
        .await
        .expect("add_review must succeed");

    client
        .delete_listing(created.id)
        .await
        .expect("delete_listing must succeed");

    let after_delete = client.get_listing(created.id).await;
    assert!(matches!(after_delete, Err(MarketClientError::NotFound)));
}

#[tokio::test]
#[ignore = "requires running marketplace backend"]
async fn stale_token_is_rejected() {
    let base_url =
        std::env::var("MARKET_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let mut client = MarketClient::new(base_url);
    client.set_token("definitely-not-a-valid-token");

    let result = client.me().await;
    match result {
        Err(err) => assert!(err.requires_reauth()),
        Ok(user) => panic!("stale token accepted for user {}", user.id),
    }
}
