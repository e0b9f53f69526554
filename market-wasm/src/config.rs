use market_core::media::MediaResolver;

pub(crate) const API_BASE_URL: &str = match option_env!("MARKET_API_BASE_URL") {
    Some(value) => value,
    None => "http://127.0.0.1:8000",
};

/// Откуда раздаются `uploads/`; обычно совпадает с API.
pub(crate) const MEDIA_BASE_URL: &str = match option_env!("MARKET_MEDIA_BASE_URL") {
    Some(value) => value,
    None => API_BASE_URL,
};

pub(crate) fn endpoint(path: &str) -> String {
    join(API_BASE_URL, path)
}

pub(crate) fn media() -> MediaResolver {
    MediaResolver::new(MEDIA_BASE_URL)
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        assert_eq!(join("http://api/", "/listings"), "http://api/listings");
        assert_eq!(join("http://api", "users/me"), "http://api/users/me");
    }

    #[test]
    fn media_resolver_uses_media_base() {
        let url = media().resolve("uploads/a.jpg").expect("non-empty path");
        assert!(url.starts_with(MEDIA_BASE_URL.trim_end_matches('/')));
        assert!(url.ends_with("/uploads/a.jpg"));
    }
}
