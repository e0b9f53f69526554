//! Форматирование цены, оценок и контактов для показа.

const FREE: &str = "ឥតគិតថ្លៃ";
const TELEGRAM_BASE: &str = "https://t.me/";

/// `$1,250.00`; нулевая цена показывается как «бесплатно».
pub fn format_price(price: f64) -> String {
    if !price.is_finite() || price <= 0.0 {
        return FREE.to_string();
    }

    // Округление делает сам `f64`: целая часть не упирается в размер u64.
    let rounded = format!("{price:.2}");
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("${grouped}.{fraction}")
}

/// Цена из поля фильтра: число не меньше нуля, иначе `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Число страниц выдачи; хотя бы одна, даже для пустой.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX).max(1)
}

/// Оценка звёздами, `★★★☆☆`; больше пяти не рисуется.
pub fn stars(rating: u8) -> String {
    let rating = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating))
}

/// Приводит контакт Telegram к ссылке `https://t.me/...`.
///
/// Принимает `@user`, `user`, `t.me/user` и полные URL. Пустое значение
/// даёт `None`.
pub fn telegram_url(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("http://") || link.starts_with("https://") {
        return Some(link.to_string());
    }
    if let Some(rest) = link.strip_prefix("t.me/") {
        return Some(format!("{TELEGRAM_BASE}{rest}"));
    }

    let username = link.trim_start_matches('@');
    if username.is_empty() {
        return None;
    }
    Some(format!("{TELEGRAM_BASE}{username}"))
}

/// `mailto:` ссылка для непустого email.
pub fn mailto(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return None;
    }
    Some(format!("mailto:{email}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_grouped_with_two_decimals() {
        assert_eq!(format_price(1250.0), "$1,250.00");
        assert_eq!(format_price(999.5), "$999.50");
        assert_eq!(format_price(1_234_567.891), "$1,234,567.89");
    }

    #[test]
    fn huge_price_keeps_every_digit() {
        assert_eq!(format_price(1e20), "$100,000,000,000,000,000,000.00");
        assert_eq!(format_price(f64::INFINITY), FREE);
    }

    #[test]
    fn price_filter_ignores_garbage_and_negatives() {
        assert_eq!(parse_price(" 25 "), Some(25.0));
        assert_eq!(parse_price("-1"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn total_pages_rounds_up_and_is_never_zero() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn stars_are_clamped_to_five() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
        assert_eq!(stars(0), "☆☆☆☆☆");
    }

    #[test]
    fn zero_price_is_free() {
        assert_eq!(format_price(0.0), FREE);
        assert_eq!(format_price(f64::NAN), FREE);
    }

    #[test]
    fn telegram_handles_all_forms() {
        let expected = Some("https://t.me/dara".to_string());
        assert_eq!(telegram_url("@dara"), expected);
        assert_eq!(telegram_url("dara"), expected);
        assert_eq!(telegram_url("t.me/dara"), expected);
        assert_eq!(telegram_url("https://t.me/dara"), expected);
        assert_eq!(telegram_url(" @ "), None);
    }

    #[test]
    fn mailto_skips_blank() {
        assert_eq!(mailto("a@b.kh").as_deref(), Some("mailto:a@b.kh"));
        assert!(mailto("  ").is_none());
    }
}
