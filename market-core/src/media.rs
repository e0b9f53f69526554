//! Превращение путей изображений из API в URL для `<img src>`.

use crate::models::Listing;

/// Картинка-заглушка для объявлений без фото и для ошибок загрузки.
pub const PLACEHOLDER_IMAGE: &str = "/assets/placeholder.png";
/// Аватар по умолчанию.
pub const PLACEHOLDER_AVATAR: &str = "/assets/avatar.png";

const UPLOADS_SEGMENT: &str = "uploads/";
const PASSTHROUGH_PREFIXES: [&str; 5] = ["http://", "https://", "data:", "blob:", "//"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Изображение галереи с уже разрешённым URL.
pub struct GalleryImage {
    /// Идентификатор изображения на бэкенде, если известен.
    pub id: Option<i64>,
    /// URL для показа.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Разрешает относительные пути относительно базового URL файлового хранилища.
pub struct MediaResolver {
    base_url: String,
}

impl MediaResolver {
    /// Создаёт резолвер; завершающие `/` у базового URL отбрасываются.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Базовый URL без завершающего `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Возвращает URL изображения или `None` для пустого пути.
    ///
    /// Абсолютные URL не меняются. Относительный путь очищается от ведущих
    /// `/` и любых повторов `uploads/` и склеивается как
    /// `{base}/uploads/{path}`.
    pub fn resolve(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        if PASSTHROUGH_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
        {
            return Some(path.to_string());
        }

        let mut rest = path.trim_start_matches('/');
        while let Some(stripped) = rest.strip_prefix(UPLOADS_SEGMENT) {
            rest = stripped.trim_start_matches('/');
        }
        if rest.is_empty() {
            return None;
        }

        Some(format!("{}/{UPLOADS_SEGMENT}{rest}", self.base_url))
    }

    /// Как [`MediaResolver::resolve`], но с заглушкой вместо `None`.
    pub fn resolve_or_placeholder(&self, path: Option<&str>) -> String {
        path.and_then(|path| self.resolve(path))
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
    }

    /// URL аватара или аватар по умолчанию.
    pub fn avatar(&self, path: Option<&str>) -> String {
        path.and_then(|path| self.resolve(path))
            .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string())
    }

    /// Обложка карточки объявления: первое изображение или заглушка.
    pub fn cover(&self, listing: &Listing) -> String {
        self.resolve_or_placeholder(listing.image_paths().first().copied())
    }

    /// Все изображения объявления в порядке показа.
    pub fn listing_gallery(&self, listing: &Listing) -> Vec<GalleryImage> {
        if !listing.images.is_empty() {
            return listing
                .images
                .iter()
                .filter_map(|image| {
                    self.resolve(&image.image_url).map(|url| GalleryImage {
                        id: image.id,
                        url,
                    })
                })
                .collect();
        }

        listing
            .image_url
            .as_deref()
            .and_then(|path| self.resolve(path))
            .map(|url| GalleryImage { id: None, url })
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingImage;

    fn resolver() -> MediaResolver {
        MediaResolver::new("http://localhost:8000/")
    }

    #[test]
    fn absolute_urls_pass_through() {
        let r = resolver();
        assert_eq!(
            r.resolve("https://cdn.example.com/x.jpg").as_deref(),
            Some("https://cdn.example.com/x.jpg")
        );
        assert_eq!(
            r.resolve("data:image/png;base64,AAAA").as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn relative_paths_get_base_and_uploads_prefix() {
        assert_eq!(
            resolver().resolve("a.jpg").as_deref(),
            Some("http://localhost:8000/uploads/a.jpg")
        );
    }

    #[test]
    fn existing_uploads_prefix_is_not_doubled() {
        let r = resolver();
        let expected = Some("http://localhost:8000/uploads/listings/a.jpg");
        assert_eq!(r.resolve("uploads/listings/a.jpg").as_deref(), expected);
        assert_eq!(r.resolve("/uploads/listings/a.jpg").as_deref(), expected);
        assert_eq!(r.resolve("uploads/uploads/listings/a.jpg").as_deref(), expected);
    }

    #[test]
    fn blank_paths_fall_back_to_placeholder() {
        let r = resolver();
        assert!(r.resolve("   ").is_none());
        assert!(r.resolve("/uploads/").is_none());
        assert_eq!(r.resolve_or_placeholder(None), PLACEHOLDER_IMAGE);
        assert_eq!(r.avatar(Some("")), PLACEHOLDER_AVATAR);
    }

    #[test]
    fn gallery_keeps_order_and_ids() {
        let listing = Listing {
            id: 1,
            images: vec![
                ListingImage {
                    id: Some(10),
                    image_url: "uploads/b.jpg".to_string(),
                },
                ListingImage {
                    id: Some(11),
                    image_url: "https://cdn/c.jpg".to_string(),
                },
            ],
            ..Listing::default()
        };
        let gallery = resolver().listing_gallery(&listing);
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[0].id, Some(10));
        assert_eq!(gallery[0].url, "http://localhost:8000/uploads/b.jpg");
        assert_eq!(gallery[1].url, "https://cdn/c.jpg");
        assert_eq!(resolver().cover(&listing), gallery[0].url);
    }

    #[test]
    fn cover_uses_placeholder_without_images() {
        let listing = Listing {
            id: 1,
            ..Listing::default()
        };
        assert_eq!(resolver().cover(&listing), PLACEHOLDER_IMAGE);
    }
}
