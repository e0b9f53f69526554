//! Текущая сессия пользователя.

use crate::models::{Listing, User};

#[derive(Debug, Clone, Default, PartialEq)]
/// Текущая сессия: токен из хранилища и данные пользователя.
pub struct Session {
    /// Bearer-токен.
    pub token: Option<String>,
    /// Текущий пользователь, если уже загружен.
    pub user: Option<User>,
}

impl Session {
    /// Сессия с токеном и, возможно, пользователем.
    pub fn new(token: Option<String>, user: Option<User>) -> Self {
        Self { token, user }
    }

    /// Есть ли токен.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Является ли пользователь администратором.
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().is_some_and(|user| user.is_admin)
    }

    /// Может ли пользователь редактировать и удалять объявление.
    pub fn can_manage(&self, listing: &Listing) -> bool {
        if self.is_admin() {
            return true;
        }
        match (&self.user, listing.owner_id()) {
            (Some(user), Some(owner_id)) => self.is_authenticated() && user.id == owner_id,
            _ => false,
        }
    }

    /// Отказ в управлении объявлением. Пока профиль не загружен, права
    /// неизвестны и отказа нет.
    pub fn denies_management(&self, listing: &Listing) -> bool {
        self.user.is_some() && !self.can_manage(listing)
    }
}

/// Нормализует сохранённый токен: обрезает пробелы, пустой отбрасывает.
pub fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Профиль из localStorage; битая запись считается отсутствующей.
pub fn parse_user(raw: &str) -> Option<User> {
    serde_json::from_str::<User>(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSummary;

    fn user(id: i64, is_admin: bool) -> User {
        User {
            id,
            username: format!("user{id}"),
            is_admin,
            ..User::default()
        }
    }

    fn owned_by(owner: i64) -> Listing {
        Listing {
            id: 10,
            owner: Some(UserSummary {
                id: owner,
                ..UserSummary::default()
            }),
            ..Listing::default()
        }
    }

    #[test]
    fn parse_user_returns_none_for_invalid_json() {
        assert!(parse_user("{not-json}").is_none());
    }

    #[test]
    fn parse_user_accepts_sparse_record() {
        let raw = r#"{"id":1,"username":"u","is_admin":true}"#;
        let user = parse_user(raw).expect("user should parse");
        assert_eq!(user.id, 1);
        assert!(user.is_admin);
        assert!(user.email.is_none());
    }

    #[test]
    fn parse_token_trims_and_rejects_blank() {
        assert_eq!(parse_token("  abc.def  ").as_deref(), Some("abc.def"));
        assert!(parse_token("   ").is_none());
    }

    #[test]
    fn owner_and_admin_can_manage() {
        let owner = Session::new(Some("t".to_string()), Some(user(1, false)));
        let stranger = Session::new(Some("t".to_string()), Some(user(2, false)));
        let admin = Session::new(Some("t".to_string()), Some(user(3, true)));
        let listing = owned_by(1);

        assert!(owner.can_manage(&listing));
        assert!(!stranger.can_manage(&listing));
        assert!(admin.can_manage(&listing));
    }

    #[test]
    fn owner_is_not_denied_while_profile_is_loading() {
        let listing = owned_by(1);
        let mut session = Session::new(Some("t".to_string()), None);
        assert!(!session.can_manage(&listing));
        assert!(!session.denies_management(&listing));

        session.user = Some(user(1, false));
        assert!(session.can_manage(&listing));
        assert!(!session.denies_management(&listing));

        session.user = Some(user(2, false));
        assert!(session.denies_management(&listing));
    }

    #[test]
    fn admin_flag_without_token_is_ignored() {
        let session = Session::new(None, Some(user(3, true)));
        assert!(!session.is_admin());
        assert!(!session.can_manage(&owned_by(3)));
    }
}
