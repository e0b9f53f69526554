//! Таблица маршрутов SPA и защита страниц, требующих входа.

use crate::session::Session;

/// Путь страницы входа.
pub const LOGIN_PATH: &str = "/login";
/// Путь главной страницы.
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Страница приложения.
pub enum Route {
    /// Лента на главной.
    Home,
    /// Поиск объявлений.
    Listings,
    /// Карточка объявления.
    ListingDetail(i64),
    /// Редактирование объявления.
    EditListing(i64),
    /// Подача объявления.
    PostAd,
    /// Мои объявления и профиль.
    MyListings,
    /// Публичный профиль пользователя.
    UserProfile(i64),
    /// Панель администратора.
    Admin,
    /// Вход.
    Login,
    /// Регистрация.
    Register,
    /// Неизвестный путь.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Решение защиты маршрута.
pub enum GuardDecision {
    /// Страницу можно показать.
    Allow,
    /// Нужно перейти по указанному пути.
    Redirect(&'static str),
}

impl Route {
    /// Разбирает путь из адресной строки. Query и фрагмент игнорируются,
    /// как и завершающий `/`.
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["listings"] => Self::Listings,
            ["listings", id] => parse_id(id).map_or(Self::NotFound, Self::ListingDetail),
            ["listings", id, "edit"] => parse_id(id).map_or(Self::NotFound, Self::EditListing),
            ["post-ad"] => Self::PostAd,
            ["my-listings"] => Self::MyListings,
            ["users", id] => parse_id(id).map_or(Self::NotFound, Self::UserProfile),
            ["admin"] => Self::Admin,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            _ => Self::NotFound,
        }
    }

    /// Путь маршрута; для `NotFound` ведёт на главную.
    pub fn path(&self) -> String {
        match self {
            Self::Home | Self::NotFound => HOME_PATH.to_string(),
            Self::Listings => "/listings".to_string(),
            Self::ListingDetail(id) => format!("/listings/{id}"),
            Self::EditListing(id) => format!("/listings/{id}/edit"),
            Self::PostAd => "/post-ad".to_string(),
            Self::MyListings => "/my-listings".to_string(),
            Self::UserProfile(id) => format!("/users/{id}"),
            Self::Admin => "/admin".to_string(),
            Self::Login => LOGIN_PATH.to_string(),
            Self::Register => "/register".to_string(),
        }
    }

    /// Страница требует токен.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::PostAd | Self::EditListing(_) | Self::MyListings | Self::Admin
        )
    }

    /// Страница доступна только администратору.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Решает, можно ли показать страницу в текущей сессии.
pub fn guard(route: &Route, session: &Session) -> GuardDecision {
    if route.requires_auth() && !session.is_authenticated() {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    // Пока профиль не загружен, флаг администратора неизвестен: пускаем, а
    // бэкенд всё равно ответит 403.
    if route.requires_admin() && session.user.is_some() && !session.is_admin() {
        return GuardDecision::Redirect(HOME_PATH);
    }
    GuardDecision::Allow
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|&id| id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[test]
    fn parse_maps_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/listings?category=phones"), Route::Listings);
        assert_eq!(Route::parse("/listings/42/"), Route::ListingDetail(42));
        assert_eq!(Route::parse("/listings/42/edit"), Route::EditListing(42));
        assert_eq!(Route::parse("/users/7#reviews"), Route::UserProfile(7));
        assert_eq!(Route::parse("/post-ad"), Route::PostAd);
    }

    #[test]
    fn parse_rejects_unknown_and_bad_ids() {
        assert_eq!(Route::parse("/listings/abc"), Route::NotFound);
        assert_eq!(Route::parse("/listings/-1"), Route::NotFound);
        assert_eq!(Route::parse("/nope"), Route::NotFound);
    }

    #[test]
    fn path_is_inverse_of_parse() {
        let routes = [
            Route::Home,
            Route::Listings,
            Route::ListingDetail(3),
            Route::EditListing(3),
            Route::PostAd,
            Route::MyListings,
            Route::UserProfile(9),
            Route::Admin,
            Route::Login,
            Route::Register,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn anonymous_user_is_redirected_to_login_from_protected_routes() {
        let anonymous = Session::default();
        for route in [Route::PostAd, Route::EditListing(1), Route::MyListings, Route::Admin] {
            assert_eq!(guard(&route, &anonymous), GuardDecision::Redirect(LOGIN_PATH));
        }
        assert_eq!(guard(&Route::ListingDetail(1), &anonymous), GuardDecision::Allow);
    }

    #[test]
    fn non_admin_is_sent_home_from_admin() {
        let user = User {
            id: 1,
            ..User::default()
        };
        let session = Session::new(Some("token".to_string()), Some(user));
        assert_eq!(guard(&Route::Admin, &session), GuardDecision::Redirect(HOME_PATH));
        assert_eq!(guard(&Route::MyListings, &session), GuardDecision::Allow);
    }
}
