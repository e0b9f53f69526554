use std::path::Path;

use crate::error::MarketClientResult;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Файл изображения для multipart-запроса.
pub struct ImageUpload {
    /// Имя файла, которое увидит сервер.
    pub file_name: String,
    /// MIME-тип.
    pub mime: String,
    /// Содержимое.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Изображение из памяти; MIME определяется по расширению имени.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Читает изображение с диска.
    pub async fn from_path(path: impl AsRef<Path>) -> MarketClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(ImageUpload::new("a.JPG", vec![]).mime, "image/jpeg");
        assert_eq!(ImageUpload::new("b.webp", vec![]).mime, "image/webp");
        assert_eq!(
            ImageUpload::new("noext", vec![]).mime,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let result = ImageUpload::from_path("/definitely/missing/photo.png").await;
        assert!(matches!(
            result,
            Err(crate::error::MarketClientError::Io(_))
        ));
    }
}
