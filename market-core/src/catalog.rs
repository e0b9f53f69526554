//! Справочник категорий объявлений.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Категория: slug для API, подпись на кхмерском и иконка для сетки.
pub struct Category {
    /// Значение поля `category` в API.
    pub slug: &'static str,
    /// Подпись в интерфейсе.
    pub label: &'static str,
    /// Эмодзи-иконка для сетки категорий.
    pub icon: &'static str,
}

/// Все известные категории в порядке показа.
pub const CATEGORIES: &[Category] = &[
    Category {
        slug: "phones",
        label: "ទូរស័ព្ទ",
        icon: "📱",
    },
    Category {
        slug: "computers",
        label: "កុំព្យូទ័រ",
        icon: "💻",
    },
    Category {
        slug: "electronics",
        label: "គ្រឿងអេឡិចត្រូនិច",
        icon: "🎧",
    },
    Category {
        slug: "vehicles",
        label: "យានយន្ត",
        icon: "🚗",
    },
    Category {
        slug: "real-estate",
        label: "អចលនទ្រព្យ",
        icon: "🏠",
    },
    Category {
        slug: "fashion",
        label: "សម្លៀកបំពាក់",
        icon: "👕",
    },
    Category {
        slug: "furniture",
        label: "គ្រឿងសង្ហារិម",
        icon: "🛋️",
    },
    Category {
        slug: "jobs",
        label: "ការងារ",
        icon: "💼",
    },
    Category {
        slug: "services",
        label: "សេវាកម្ម",
        icon: "🛠️",
    },
    Category {
        slug: "other",
        label: "ផ្សេងៗ",
        icon: "📦",
    },
];

/// Ищет категорию по slug без учёта регистра.
pub fn find(slug: &str) -> Option<&'static Category> {
    let slug = slug.trim();
    CATEGORIES
        .iter()
        .find(|category| category.slug.eq_ignore_ascii_case(slug))
}

/// Подпись категории; неизвестный slug показывается как есть.
pub fn label(slug: &str) -> String {
    find(slug)
        .map(|category| category.label.to_string())
        .unwrap_or_else(|| slug.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(find(" Phones ").map(|c| c.slug), Some("phones"));
        assert!(find("spaceships").is_none());
    }

    #[test]
    fn unknown_slug_label_falls_back_to_slug() {
        assert_eq!(label("vehicles"), "យានយន្ត");
        assert_eq!(label("boats"), "boats");
    }

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<_> = CATEGORIES.iter().map(|c| c.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), CATEGORIES.len());
    }
}
