//! Configuration module for voice-translate.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each external
//! service, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `AppConfig::load_or_init` / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, LimitsConfig, RecognizerConfig, SynthesizerConfig, ToolchainSettings,
    TranslatorConfig,
};
