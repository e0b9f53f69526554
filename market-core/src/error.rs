//! Ошибки запросов к API и их тексты для пользователя.

use serde::Deserialize;
use thiserror::Error;

const MSG_REAUTH: &str = "សម័យប្រើប្រាស់បានផុតកំណត់។ សូមចូលគណនីម្តងទៀត។";
const MSG_FORBIDDEN: &str = "អ្នកមិនមានសិទ្ធិធ្វើប្រតិបត្តិការនេះទេ។";
const MSG_NOT_FOUND: &str = "រកមិនឃើញទិន្នន័យដែលអ្នកស្វែងរកទេ។";
const MSG_NETWORK: &str = "មិនអាចភ្ជាប់ទៅម៉ាស៊ីនមេបានទេ។ សូមពិនិត្យអ៊ីនធឺណិតរបស់អ្នក។";
const MSG_GENERIC: &str = "មានបញ្ហាកើតឡើង";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Классифицированная ошибка запроса к API, общая для нативного клиента и SPA.
pub enum ApiFailure {
    /// 401: токен отсутствует или истёк.
    #[error("unauthorized")]
    Unauthorized,

    /// 403: недостаточно прав.
    #[error("forbidden")]
    Forbidden,

    /// 404: ресурс не найден.
    #[error("not found")]
    NotFound,

    /// 400/422 от бэкенда или форма, отклонённая до отправки.
    #[error("validation failed: {detail}")]
    Validation {
        /// HTTP-статус; `None`, если запрос не отправлялся.
        status: Option<u16>,
        /// Текст ошибки.
        detail: String,
    },

    /// Любой другой неуспешный статус.
    #[error("server error {status}: {detail}")]
    Server {
        /// HTTP-статус.
        status: u16,
        /// Текст ошибки от сервера.
        detail: String,
    },

    /// Запрос не дошёл до сервера или ответ не удалось прочитать.
    #[error("network error: {0}")]
    Network(String),
}

impl ApiFailure {
    /// Классифицирует неуспешный HTTP-ответ по статусу и телу.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 422 => Self::Validation {
                status: Some(status),
                detail: extract_detail(body).unwrap_or_else(|| format!("HTTP {status}")),
            },
            _ => Self::Server {
                status,
                detail: extract_detail(body).unwrap_or_else(|| format!("HTTP {status}")),
            },
        }
    }

    /// HTTP-статус, если ошибка пришла от сервера.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::Validation { status, .. } => *status,
            Self::Server { status, .. } => Some(*status),
            Self::Network(_) => None,
        }
    }

    /// Нужно ли сбросить токен и отправить пользователя на `/login`.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Сообщение для пользователя на кхмерском.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => MSG_REAUTH.to_string(),
            Self::Forbidden => MSG_FORBIDDEN.to_string(),
            Self::NotFound => MSG_NOT_FOUND.to_string(),
            Self::Network(_) => MSG_NETWORK.to_string(),
            Self::Validation { detail, .. } | Self::Server { detail, .. } => {
                format!("{MSG_GENERIC}: {detail}")
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Detail>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Достаёт текст ошибки из тела ответа.
///
/// Понимает `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}`,
/// `{"error": "..."}` и `{"message": "..."}`; иначе берёт непустой текст
/// как есть.
pub fn extract_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return Some(body.to_string());
    };

    let detail = match parsed.detail {
        Some(Detail::Text(text)) => Some(text),
        Some(Detail::Items(items)) => {
            let joined = items
                .into_iter()
                .filter_map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        None => None,
    };

    detail
        .or(parsed.error)
        .or(parsed.message)
        .filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_requires_reauth() {
        let failure = ApiFailure::from_status(401, "");
        assert_eq!(failure, ApiFailure::Unauthorized);
        assert!(failure.requires_reauth());
        assert_eq!(failure.user_message(), MSG_REAUTH);
    }

    #[test]
    fn not_found_has_dedicated_message() {
        let failure = ApiFailure::from_status(404, r#"{"detail":"Listing not found"}"#);
        assert!(!failure.requires_reauth());
        assert_eq!(failure.user_message(), MSG_NOT_FOUND);
    }

    #[test]
    fn generic_message_embeds_server_detail() {
        let failure = ApiFailure::from_status(500, r#"{"detail":"db is down"}"#);
        assert_eq!(failure.status(), Some(500));
        assert!(failure.user_message().ends_with("db is down"));
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = r#"{"detail":[{"msg":"title required"},{"msg":"price invalid"}]}"#;
        let failure = ApiFailure::from_status(422, body);
        assert_eq!(
            failure,
            ApiFailure::Validation {
                status: Some(422),
                detail: "title required; price invalid".to_string(),
            }
        );
        assert_eq!(failure.status(), Some(422));
    }

    #[test]
    fn bad_request_keeps_its_status() {
        let failure = ApiFailure::from_status(400, r#"{"detail":"bad price"}"#);
        assert_eq!(failure.status(), Some(400));
        assert!(failure.user_message().ends_with("bad price"));
    }

    #[test]
    fn extract_detail_accepts_error_and_plain_text() {
        assert_eq!(extract_detail(r#"{"error":"boom"}"#).as_deref(), Some("boom"));
        assert_eq!(extract_detail(r#"{"message":"m"}"#).as_deref(), Some("m"));
        assert_eq!(extract_detail("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert!(extract_detail("  ").is_none());
        assert!(extract_detail("{}").is_none());
    }
}
