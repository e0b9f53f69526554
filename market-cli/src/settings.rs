use anyhow::{Result, anyhow};

pub(crate) const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TOKEN_FILE: &str = ".market_token";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) api_url: String,
    pub(crate) media_url: String,
    pub(crate) token_file: String,
    pub(crate) log_level: String,
}

impl Settings {
    /// Читает настройки из окружения (`.env` подгружается заранее).
    ///
    /// `server` из флага `--server` имеет приоритет над `MARKET_API_URL`.
    pub(crate) fn from_env(server: Option<String>) -> Result<Self> {
        let api_url = match server {
            Some(server) => server,
            None => get_or("MARKET_API_URL", DEFAULT_API_URL),
        };
        let api_url = normalize_server(&api_url)?;

        let media_url = match std::env::var("MARKET_MEDIA_URL") {
            Ok(raw) if !raw.trim().is_empty() => normalize_server(&raw)?,
            _ => api_url.clone(),
        };

        let token_file = get_or("MARKET_TOKEN_FILE", DEFAULT_TOKEN_FILE);
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            api_url,
            media_url,
            token_file,
            log_level,
        })
    }
}

fn get_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn normalize_server(server: &str) -> Result<String> {
    let server = server.trim().trim_end_matches('/');
    if server.is_empty() {
        return Err(anyhow!("server address must not be empty"));
    }
    if server.starts_with("http://") || server.starts_with("https://") {
        return Ok(server.to_string());
    }

    Ok(format!("http://{server}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://market.example.com/").expect("valid");
        assert_eq!(s, "https://market.example.com");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8000").expect("valid");
        assert_eq!(s, "http://127.0.0.1:8000");
    }

    #[test]
    fn normalize_server_rejects_blank() {
        assert!(normalize_server("  ").is_err());
    }

    #[test]
    fn server_flag_overrides_environment() {
        let settings = Settings::from_env(Some("localhost:9999".to_string())).expect("valid");
        assert_eq!(settings.api_url, "http://localhost:9999");
        assert!(!settings.token_file.is_empty());
    }
}
