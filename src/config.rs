//! Application settings that are fixed for the lifetime of the server.

use std::path::PathBuf;

use crate::pagination::PaginationConfig;

/// The categories a transaction or budget may be filed under.
pub const DEFAULT_CATEGORIES: [&str; 11] = [
    "food",
    "transport",
    "shopping",
    "entertainment",
    "housing",
    "utilities",
    "healthcare",
    "education",
    "salary",
    "investment",
    "other",
];

/// The period labels a budget may use.
pub const DEFAULT_BUDGET_PERIODS: [&str; 4] = ["weekly", "monthly", "quarterly", "yearly"];

/// Settings that are built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The name shown in page titles and the navigation bar.
    pub app_name: String,
    /// The allowed transaction and budget categories.
    pub categories: Vec<String>,
    /// The allowed budget period labels.
    pub budget_periods: Vec<String>,
    /// Page sizes for the transaction and knowledge lists.
    pub pagination: PaginationConfig,
    /// The directory avatars are saved to and served from.
    pub upload_dir: PathBuf,
    /// File extensions, in lowercase and without the dot, accepted for avatars.
    pub allowed_avatar_extensions: Vec<String>,
    /// The largest avatar file accepted, in bytes.
    pub max_avatar_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Pocket Ledger".to_owned(),
            categories: DEFAULT_CATEGORIES.map(str::to_owned).to_vec(),
            budget_periods: DEFAULT_BUDGET_PERIODS.map(str::to_owned).to_vec(),
            pagination: PaginationConfig::default(),
            upload_dir: PathBuf::from("uploads"),
            allowed_avatar_extensions: ["png", "jpg", "jpeg", "gif"].map(str::to_owned).to_vec(),
            max_avatar_bytes: 2 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Whether `category` is one of the configured categories.
    pub fn is_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Whether `period` is one of the configured budget periods.
    pub fn is_budget_period(&self, period: &str) -> bool {
        self.budget_periods.iter().any(|p| p == period)
    }

    /// Whether a file called `file_name` has an allowed avatar extension.
    ///
    /// The check is case insensitive and a file without an extension is rejected.
    pub fn is_allowed_avatar(&self, file_name: &str) -> bool {
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return false;
        };

        let extension = extension.to_lowercase();
        self.allowed_avatar_extensions
            .iter()
            .any(|allowed| *allowed == extension)
    }
}

#[cfg(test)]
mod config_tests {
    use super::AppConfig;

    #[test]
    fn default_has_food_category() {
        let config = AppConfig::default();

        assert!(config.is_category("food"));
        assert!(!config.is_category("Food"));
        assert!(!config.is_category(""));
    }

    #[test]
    fn default_has_monthly_period() {
        let config = AppConfig::default();

        assert!(config.is_budget_period("monthly"));
        assert!(!config.is_budget_period("daily"));
    }

    #[test]
    fn avatar_extension_is_case_insensitive() {
        let config = AppConfig::default();

        assert!(config.is_allowed_avatar("me.PNG"));
        assert!(config.is_allowed_avatar("holiday.photo.jpg"));
        assert!(!config.is_allowed_avatar("script.sh"));
        assert!(!config.is_allowed_avatar("png"));
    }
}
