// User Domain Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store identifier of a user
pub type UserId = i64;

/// Contest participant as seen by the lifecycle engine.
///
/// The engine only ever writes `likes_number`, `views_number`, `rank` and
/// `is_winner`; every other field belongs to the admin layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// External identifier printed as a QR code
    pub id_qr_code: String,
    pub full_name: Option<String>,
    pub is_gold: bool,
    pub is_active: bool,
    pub date_wedding: Option<NaiveDate>,
    /// Posted video
    pub url: Option<String>,
    pub likes_number: Option<i64>,
    pub views_number: Option<i64>,
    pub rank: i64,
    pub is_winner: bool,
}

impl User {
    /// Content URL, if one is set and non-empty
    pub fn content_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_url(url: Option<&str>) -> User {
        User {
            id: 1,
            id_qr_code: "USER1".to_string(),
            full_name: None,
            is_gold: true,
            is_active: true,
            date_wedding: None,
            url: url.map(str::to_string),
            likes_number: Some(0),
            views_number: Some(0),
            rank: 0,
            is_winner: false,
        }
    }

    #[test]
    fn test_content_url_filters_empty() {
        assert_eq!(user_with_url(None).content_url(), None);
        assert_eq!(user_with_url(Some("")).content_url(), None);
        assert_eq!(
            user_with_url(Some("https://fb.watch/v/123456789")).content_url(),
            Some("https://fb.watch/v/123456789")
        );
    }
}
