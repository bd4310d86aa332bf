//! Configuration for timbre feature extraction.
//!
//! Loads analysis settings from TOML, validates them at the boundary and
//! converts them into the parameter structs of `timbre-analysis`.
//!
//! # Example
//!
//! ```rust
//! use timbre_config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_toml_str(r#"
//!     sample_rate = 48000.0
//!     rolloff_percent = 90.0
//!
//!     [mel]
//!     filters = 20
//! "#).unwrap();
//!
//! assert!((config.rolloff_params().fraction - 0.9).abs() < 1e-12);
//! assert_eq!(config.mfcc_params().mel.filters, 20);
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Range and format checks.
pub mod validation;

pub use config::{AnalysisConfig, DEFAULT_SAMPLE_RATE, MAX_LPCC_ORDER, MelConfig, MelGain};
pub use error::ConfigError;
pub use paths::{default_config_path, ensure_user_config_dir, user_config_dir};
pub use validation::{ValidationError, ValidationResult};
