use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CheckGuardian";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key for the bank template collection.
pub const TEMPLATES_KEY: &str = "check-guardian-banks";

/// Storage key for the verification history collection.
pub const HISTORY_KEY: &str = "check-guardian-history";

/// Default endpoint of the local analysis service.
pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:11434";

/// Default timeout for a single analysis call, in seconds.
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 300;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "check_guardian=info".to_string()
}

/// Get the application data directory
/// ~/CheckGuardian/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("CheckGuardian")
}

/// Default location of the on-disk key-value store.
pub fn store_path() -> PathBuf {
    app_data_dir().join("store.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("CheckGuardian"));
    }

    #[test]
    fn store_path_under_app_data() {
        let path = store_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("store.json"));
    }

    #[test]
    fn storage_keys_are_distinct() {
        assert_ne!(TEMPLATES_KEY, HISTORY_KEY);
    }

    #[test]
    fn default_filter_targets_crate() {
        assert!(default_log_filter().contains("check_guardian"));
    }
}
