//! Platform-specific configuration paths.
//!
//! - **User config dir**: `~/.config/timbre/` (Linux), `~/Library/Application Support/timbre/` (macOS), `%APPDATA%\timbre\` (Windows)
//! - **Default config file**: `<user config dir>/timbre.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use timbre_config::paths;
//!
//! println!("Config: {:?}", paths::default_config_path());
//! ```

use std::path::PathBuf;

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "timbre";

/// File name of the default configuration.
pub const CONFIG_FILE_NAME: &str = "timbre.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the default configuration file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Creates the user config directory if it doesn't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        assert!(user_config_dir().ends_with(APP_NAME));
    }

    #[test]
    fn default_path_is_inside_config_dir() {
        let path = default_config_path();
        assert_eq!(path.parent(), Some(user_config_dir().as_path()));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(CONFIG_FILE_NAME)
        );
    }
}
