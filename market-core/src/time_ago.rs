//! Относительное время публикации на кхмерском («5 នាទីមុន»).
//!
//! `now` передаётся снаружи: в SPA это сигнал часов, который тикает раз в
//! секунду, в CLI это `Utc::now()`.

use chrono::{DateTime, NaiveDateTime, Utc};

const JUST_NOW: &str = "ទើបតែឥឡូវនេះ";
const AGO: &str = "មុន";
const SECONDS: &str = "វិនាទី";
const MINUTES: &str = "នាទី";
const HOURS: &str = "ម៉ោង";
const DAYS: &str = "ថ្ងៃ";

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
/// Дальше этого порога показывается абсолютная дата.
const RELATIVE_LIMIT: i64 = 30 * DAY;
/// Меньше этого порога показывается «только что».
const JUST_NOW_LIMIT: i64 = 10;

/// Форматирует время относительно `now` самой крупной подходящей единицей.
pub fn format_relative(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created).num_seconds();

    if elapsed < JUST_NOW_LIMIT {
        return JUST_NOW.to_string();
    }
    if elapsed < MINUTE {
        return format!("{elapsed} {SECONDS}{AGO}");
    }
    if elapsed < HOUR {
        return format!("{} {MINUTES}{AGO}", elapsed / MINUTE);
    }
    if elapsed < DAY {
        return format!("{} {HOURS}{AGO}", elapsed / HOUR);
    }
    if elapsed < RELATIVE_LIMIT {
        return format!("{} {DAYS}{AGO}", elapsed / DAY);
    }

    created.format("%d/%m/%Y").to_string()
}

/// То же, что [`format_relative`], но для отсутствующей даты возвращает `-`.
pub fn format_optional(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match created {
        Some(created) => format_relative(created, now),
        None => "-".to_string(),
    }
}

/// Разбирает время из API.
///
/// Принимает RFC 3339 и «наивный» формат без часового пояса, который
/// считается UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
            .single()
            .expect("valid ts")
    }

    #[test]
    fn recent_and_future_times_render_just_now() {
        assert_eq!(format_relative(now() - Duration::seconds(3), now()), JUST_NOW);
        assert_eq!(format_relative(now() + Duration::minutes(5), now()), JUST_NOW);
    }

    #[test]
    fn picks_largest_applicable_unit() {
        assert_eq!(
            format_relative(now() - Duration::seconds(42), now()),
            "42 វិនាទីមុន"
        );
        assert_eq!(
            format_relative(now() - Duration::seconds(150), now()),
            "2 នាទីមុន"
        );
        assert_eq!(
            format_relative(now() - Duration::hours(5), now()),
            "5 ម៉ោងមុន"
        );
        assert_eq!(
            format_relative(now() - Duration::days(29), now()),
            "29 ថ្ងៃមុន"
        );
    }

    #[test]
    fn old_listings_render_absolute_date() {
        let created = Utc
            .with_ymd_and_hms(2025, 12, 1, 8, 30, 0)
            .single()
            .expect("valid ts");
        assert_eq!(format_relative(created, now()), "01/12/2025");
    }

    #[test]
    fn missing_timestamp_renders_dash() {
        assert_eq!(format_optional(None, now()), "-");
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_naive() {
        let with_zone = parse_timestamp("2026-03-15T19:00:00+07:00").expect("rfc3339");
        assert_eq!(with_zone, now());

        let naive = parse_timestamp("2026-03-15T12:00:00.123456").expect("naive");
        assert_eq!(naive.timestamp(), now().timestamp());

        let spaced = parse_timestamp("2026-03-15 12:00:00").expect("spaced");
        assert_eq!(spaced, now());
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }
}
