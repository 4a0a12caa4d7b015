use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "voicecoach";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("voicecoach_config.json"))
    }

    /// Local key-value store holding `userId` and `authToken`
    pub fn storage_path() -> PathBuf {
        Self::data_dir().join("storage.json")
    }

    pub fn recordings_dir() -> PathBuf {
        Self::data_dir().join("recordings")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("voicecoach.log")
    }

    fn data_dir() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".voicecoach"))
    }

    fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            Self::data_dir()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_named_for_the_app() {
        assert!(AppDirs::config_path().ends_with("config.json"));
        assert!(AppDirs::storage_path().ends_with("storage.json"));
        assert!(AppDirs::log_path().ends_with("voicecoach.log"));
        assert!(AppDirs::recordings_dir().ends_with("recordings"));
    }
}
