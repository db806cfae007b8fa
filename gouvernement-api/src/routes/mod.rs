/// API route handlers
///
/// - `health`: health check
/// - `auth`: registration, login and token refresh
/// - `projects`: project listing, initiation, info, editing and deletion
/// - `tasks`: task listing, initiation, info, editing and deletion

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

use gouvernement_shared::search::DEFAULT_FILTERS;
use serde::{Deserialize, Serialize};

/// Query string of listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    pub filters: Option<String>,
}

impl Listing {
    /// Search string of the task listing; absent means [`DEFAULT_FILTERS`]
    pub fn task_filters(&self) -> &str {
        self.filters.as_deref().unwrap_or(DEFAULT_FILTERS)
    }

    /// Search string of project listings and project info; absent means none
    pub fn filters(&self) -> &str {
        self.filters.as_deref().unwrap_or_default()
    }
}

/// A user-facing outcome message, optionally with the affected resource
#[derive(Debug, Serialize, Deserialize)]
pub struct Notice<T> {
    /// `"success"` or `"error"`
    pub category: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Notice<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            category: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Notice<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            category: "success".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_task_listing_defaults() {
        let absent = Listing::default();
        assert_eq!(absent.task_filters(), DEFAULT_FILTERS);
        assert_eq!(absent.filters(), "");
    }

    #[test]
    fn test_empty_filters_stay_empty() {
        let listing = Listing {
            filters: Some(String::new()),
        };
        assert_eq!(listing.task_filters(), "");
        assert_eq!(listing.filters(), "");
    }

    #[test]
    fn test_done_notice_omits_data() {
        let json = serde_json::to_value(Notice::done("Project Apollo has been deleted.")).unwrap();

        assert_eq!(json["category"], "success");
        assert!(json.get("data").is_none());
    }
}
