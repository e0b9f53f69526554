use market_core::ApiFailure;
use market_core::error::extract_detail;
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `market-client`.
pub enum MarketClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/истёк токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Недостаточно прав для операции.
    #[error("forbidden")]
    Forbidden,

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Данные не прошли проверку на клиенте; запрос не отправлялся.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Бэкенд отклонил данные (400/422).
    #[error("rejected {status}: {message}")]
    Rejected {
        /// HTTP-статус.
        status: u16,
        /// Текст ошибки от сервера.
        message: String,
    },

    /// Прочие неуспешные ответы сервера.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP-статус.
        status: u16,
        /// Текст ошибки от сервера.
        message: String,
    },

    /// Не удалось прочитать файл изображения.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Результат операций `market-client`.
pub type MarketClientResult<T> = Result<T, MarketClientError>;

impl MarketClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden,
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                let message = extract_detail(body).unwrap_or_else(|| format!("http status {status}"));
                Self::Rejected {
                    status: status.as_u16(),
                    message,
                }
            }
            _ => Self::Server {
                status: status.as_u16(),
                message: extract_detail(body).unwrap_or_else(|| format!("http status {status}")),
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, "");
        }
        Self::Http(err)
    }

    /// Нужно ли забыть сохранённый токен и войти заново.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Та же ошибка в общей классификации `market-core`, для текстов
    /// пользователю.
    pub fn failure(&self) -> ApiFailure {
        match self {
            Self::Unauthorized => ApiFailure::Unauthorized,
            Self::Forbidden => ApiFailure::Forbidden,
            Self::NotFound => ApiFailure::NotFound,
            Self::InvalidRequest(message) => ApiFailure::Validation {
                status: None,
                detail: message.clone(),
            },
            Self::Rejected { status, message } => ApiFailure::Validation {
                status: Some(*status),
                detail: message.clone(),
            },
            Self::Server { status, message } => ApiFailure::Server {
                status: *status,
                detail: message.clone(),
            },
            Self::Http(err) => ApiFailure::Network(err.to_string()),
            Self::Io(err) => ApiFailure::Network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            MarketClientError::from_http_status(StatusCode::UNAUTHORIZED, ""),
            MarketClientError::Unauthorized
        ));
        assert!(matches!(
            MarketClientError::from_http_status(StatusCode::FORBIDDEN, ""),
            MarketClientError::Forbidden
        ));
        assert!(matches!(
            MarketClientError::from_http_status(StatusCode::NOT_FOUND, ""),
            MarketClientError::NotFound
        ));
    }

    #[test]
    fn validation_body_detail_is_kept() {
        let err = MarketClientError::from_http_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"msg":"field required"}]}"#,
        );
        match &err {
            MarketClientError::Rejected { status, message } => {
                assert_eq!(*status, 422);
                assert_eq!(message, "field required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.failure().status(), Some(422));
    }

    #[test]
    fn local_validation_failure_has_no_status() {
        let err = MarketClientError::InvalidRequest("title".to_string());
        assert_eq!(err.failure().status(), None);
    }

    #[test]
    fn server_error_falls_back_to_status_text() {
        let err = MarketClientError::from_http_status(StatusCode::BAD_GATEWAY, "");
        match &err {
            MarketClientError::Server { status, message } => {
                assert_eq!(*status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.failure().status(), Some(502));
    }

    #[test]
    fn only_unauthorized_requires_reauth() {
        assert!(MarketClientError::Unauthorized.requires_reauth());
        assert!(!MarketClientError::Forbidden.requires_reauth());
        assert!(MarketClientError::Unauthorized.failure().requires_reauth());
    }
}
