//! Локальные операции над списками объявлений и параметры поиска.
//!
//! После успешного DELETE страница не перезагружает список, а правит
//! локальное состояние.

use std::cmp::Reverse;

use url::form_urlencoded;

use crate::models::Listing;

/// Размер страницы ленты по умолчанию.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Убирает объявление из списка. Возвращает `true`, если оно там было.
pub fn remove_by_id(listings: &mut Vec<Listing>, id: i64) -> bool {
    let before = listings.len();
    listings.retain(|listing| listing.id != id);
    before != listings.len()
}

/// Сортирует по дате публикации, новые первыми; без даты в конце.
pub fn sort_newest_first(listings: &mut [Listing]) {
    listings.sort_by_key(|listing| Reverse(listing.created_at));
}

/// Похожие объявления: та же категория, без текущего, новые первыми.
pub fn related(listings: &[Listing], current: &Listing, limit: usize) -> Vec<Listing> {
    let mut related: Vec<Listing> = listings
        .iter()
        .filter(|listing| listing.id != current.id)
        .filter(|listing| listing.category.eq_ignore_ascii_case(&current.category))
        .cloned()
        .collect();
    sort_newest_first(&mut related);
    related.truncate(limit);
    related
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Параметры `GET /listings`.
pub struct ListingQuery {
    /// Поиск по заголовку и описанию.
    pub search: Option<String>,
    /// Slug категории.
    pub category: Option<String>,
    /// Минимальная цена.
    pub min_price: Option<f64>,
    /// Максимальная цена.
    pub max_price: Option<f64>,
    /// Номер страницы, с 1.
    pub page: Option<u32>,
    /// Размер страницы.
    pub limit: Option<u32>,
}

impl ListingQuery {
    /// Пары query-параметров; пустые значения пропускаются.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            pairs.push(("category", category.to_string()));
        }
        if let Some(min_price) = self.min_price {
            pairs.push(("min_price", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("max_price", max_price.to_string()));
        }
        if let Some(page) = self.page.filter(|&page| page > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|&limit| limit > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Query-строка без ведущего `?` (`application/x-www-form-urlencoded`).
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }

    /// Разбирает query-строку адресной строки (с `?` или без). Неизвестные
    /// ключи и нечисловые цены пропускаются.
    pub fn from_query_string(raw: &str) -> Self {
        let mut query = Self::default();
        let raw = raw.trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "search" => query.search = Some(value.to_string()),
                "category" => query.category = Some(value.to_string()),
                "min_price" => query.min_price = value.parse().ok(),
                "max_price" => query.max_price = value.parse().ok(),
                "page" => query.page = value.parse().ok(),
                "limit" => query.limit = value.parse().ok(),
                _ => {}
            }
        }
        query
    }

    /// Подходит ли объявление под фильтр (для уже загруженной ленты).
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_title = listing.title.to_lowercase().contains(&needle);
            let in_description = listing.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(category) = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            if !listing.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| listing.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| listing.price > max) {
            return false;
        }
        true
    }
}

/// Фильтрует уже загруженную ленту на клиенте.
pub fn filter_local(listings: &[Listing], query: &ListingQuery) -> Vec<Listing> {
    listings
        .iter()
        .filter(|listing| query.matches(listing))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn listing(id: i64, category: &str, price: f64, day: u32) -> Listing {
        Listing {
            id,
            title: format!("Item {id}"),
            category: category.to_string(),
            price,
            created_at: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).single(),
            ..Listing::default()
        }
    }

    #[test]
    fn remove_by_id_filters_deleted_listing() {
        let mut list = vec![listing(1, "phones", 1.0, 1), listing(2, "phones", 2.0, 2)];
        assert!(remove_by_id(&mut list, 1));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 2);
        assert!(!remove_by_id(&mut list, 1));
    }

    #[test]
    fn related_excludes_current_and_other_categories() {
        let all = vec![
            listing(1, "phones", 1.0, 1),
            listing(2, "phones", 1.0, 5),
            listing(3, "cars", 1.0, 9),
            listing(4, "Phones", 1.0, 3),
        ];
        let current = all[0].clone();
        let related = related(&all, &current, 5);
        assert_eq!(related.iter().map(|l| l.id).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn query_skips_blank_values() {
        let query = ListingQuery {
            search: Some("  ".to_string()),
            category: Some("phones".to_string()),
            page: Some(0),
            limit: Some(20),
            ..ListingQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![("category", "phones".to_string()), ("limit", "20".to_string())]
        );
    }

    #[test]
    fn query_string_is_percent_encoded() {
        let query = ListingQuery {
            search: Some("iphone 13 pro".to_string()),
            ..ListingQuery::default()
        };
        assert_eq!(query.to_query_string(), "search=iphone+13+pro");
    }

    #[test]
    fn query_string_round_trips_through_address_bar() {
        let query = ListingQuery::from_query_string(
            "?search=iphone%2013+pro&category=phones&max_price=100&page=x&utm=1",
        );
        assert_eq!(query.search.as_deref(), Some("iphone 13 pro"));
        assert_eq!(query.category.as_deref(), Some("phones"));
        assert_eq!(query.max_price, Some(100.0));
        assert_eq!(query.page, None);
        assert_eq!(ListingQuery::from_query_string(&query.to_query_string()), query);
    }

    #[test]
    fn broken_percent_escape_is_kept() {
        let query = ListingQuery::from_query_string("search=50%");
        assert_eq!(query.search.as_deref(), Some("50%"));

        // `+` это пробел, `%` без двух hex-цифр остаётся как есть.
        let query = ListingQuery::from_query_string("search=a%+Fb&category=a%zzb");
        assert_eq!(query.search.as_deref(), Some("a% Fb"));
        assert_eq!(query.category.as_deref(), Some("a%zzb"));
    }

    #[test]
    fn query_string_escapes_reserved_characters() {
        let query = ListingQuery {
            search: Some("a&b=c%d".to_string()),
            ..ListingQuery::default()
        };
        let encoded = query.to_query_string();
        assert_eq!(encoded, "search=a%26b%3Dc%25d");
        assert_eq!(ListingQuery::from_query_string(&encoded), query);
    }

    #[test]
    fn local_filter_applies_search_category_and_price() {
        let mut cheap = listing(1, "phones", 50.0, 1);
        cheap.description = "Samsung phone".to_string();
        let all = vec![cheap, listing(2, "phones", 500.0, 2), listing(3, "cars", 50.0, 3)];

        let query = ListingQuery {
            search: Some("samsung".to_string()),
            category: Some("phones".to_string()),
            max_price: Some(100.0),
            ..ListingQuery::default()
        };
        let found = filter_local(&all, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }
}
