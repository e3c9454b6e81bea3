//! TOML Configuration File Support
//!
//! Halo reads an optional TOML file at `~/.config/halo/halo.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`HALO_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [scene]
//! variant = "dungeon"
//! agent_count = 7
//! seed = 42
//! avatar_model = "angel"
//!
//! [effects]
//! afterimage_damp = 0.94
//! bloom_threshold = 0.75
//! bloom_strength = 0.8
//! bloom_radius = 2
//! bloom_enabled = true
//!
//! [timers]
//! link_timeout_ms = 2000
//! overlay_duration_ms = 5000
//! shooting_star_check_ms = 3000
//! reply_delay_ms = 1000
//!
//! [companion]
//! url = "ws://127.0.0.1:5001"
//! enabled = true
//!
//! [display]
//! target_fps = 30
//! username = "Traveler"
//! ```
//!
//! # Environment
//!
//! | Variable | Effect |
//! |---|---|
//! | `HALO_SCENE` | scene variant (`orb-circle`, `dungeon`) |
//! | `HALO_COMPANION_URL` | companion WebSocket address |
//! | `HALO_OFFLINE` | any value but `0`/`false` disables the companion |
//! | `HALO_AFTERIMAGE_DAMP` | afterimage damping |
//! | `HALO_FPS` | target frame rate |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::EffectSettings;
use crate::scene::{AssetSet, SceneDescription, SceneVariant, DEFAULT_AGENT_COUNT};
use crate::scheduler::SchedulerSettings;

/// Companion address used when nothing else is configured
pub const DEFAULT_COMPANION_URL: &str = "ws://127.0.0.1:5001";

/// Frame rate used when nothing else is configured
pub const DEFAULT_TARGET_FPS: u32 = 30;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Scene section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneToml {
    /// Tableau to stage
    pub variant: Option<String>,

    /// Number of avatars
    pub agent_count: Option<usize>,

    /// RNG seed for reproducible scenes
    pub seed: Option<u64>,

    /// Avatar model override
    pub avatar_model: Option<String>,
}

/// Effects section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsToml {
    /// Afterimage damping in (0, 1)
    pub afterimage_damp: Option<f32>,

    /// Bloom luminance threshold
    pub bloom_threshold: Option<f32>,

    /// Bloom add-back strength
    pub bloom_strength: Option<f32>,

    /// Bloom blur radius in pixels
    pub bloom_radius: Option<usize>,

    /// Whether bloom runs
    pub bloom_enabled: Option<bool>,
}

/// Timers section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimersToml {
    /// How long a triggered link stays active
    pub link_timeout_ms: Option<u64>,

    /// How long a speech overlay lives
    pub overlay_duration_ms: Option<u64>,

    /// Period of the shooting-star check
    pub shooting_star_check_ms: Option<u64>,

    /// Delay before a local reply
    pub reply_delay_ms: Option<u64>,
}

/// Companion section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionToml {
    /// WebSocket address
    pub url: Option<String>,

    /// Whether to connect at all
    pub enabled: Option<bool>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Frames per second
    pub target_fps: Option<u32>,

    /// Name shown for the human in the log
    pub username: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HaloToml {
    /// Scene section
    pub scene: SceneToml,

    /// Effects section
    pub effects: EffectsToml,

    /// Timers section
    pub timers: TimersToml,

    /// Companion section
    pub companion: CompanionToml,

    /// Display section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for a Halo surface
#[derive(Clone, Debug)]
pub struct HaloConfig {
    /// Tableau to stage
    pub scene_variant: SceneVariant,

    /// Number of avatars
    pub agent_count: usize,

    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Avatar model override; unknown names fall back to a plain sphere
    pub avatar_model: Option<String>,

    /// Post-processing tunables
    pub effects: EffectSettings,

    /// How long a triggered link stays active
    pub link_timeout: Duration,

    /// How long a speech overlay lives
    pub overlay_duration: Duration,

    /// Period of the shooting-star check
    pub shooting_star_check: Duration,

    /// Delay before a local reply
    pub reply_delay: Duration,

    /// Companion WebSocket address
    pub companion_url: String,

    /// Whether to connect to the companion
    pub companion_enabled: bool,

    /// Frames per second
    pub target_fps: u32,

    /// Name shown for the human in the log
    pub username: String,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for HaloConfig {
    fn default() -> Self {
        let timers = SchedulerSettings::default();
        Self {
            scene_variant: SceneVariant::default(),
            agent_count: DEFAULT_AGENT_COUNT,
            seed: None,
            avatar_model: None,
            effects: EffectSettings::default(),
            link_timeout: timers.link_timeout,
            overlay_duration: timers.overlay_duration,
            shooting_star_check: timers.shooting_star_check,
            reply_delay: timers.reply_delay,
            companion_url: DEFAULT_COMPANION_URL.to_string(),
            companion_enabled: true,
            target_fps: DEFAULT_TARGET_FPS,
            username: timers.username,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl HaloConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Scene to build from this configuration
    #[must_use]
    pub fn scene_description(&self) -> SceneDescription {
        let assets = AssetSet::resolve(self.scene_variant, self.avatar_model.as_deref());
        SceneDescription::with_assets(self.scene_variant, assets, self.agent_count)
    }

    /// Scheduler timings from this configuration
    #[must_use]
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            link_timeout: self.link_timeout,
            overlay_duration: self.overlay_duration,
            shooting_star_check: self.shooting_star_check,
            reply_delay: self.reply_delay,
            effects: self.effects.clone(),
            seed: self.seed,
            username: self.username.clone(),
            ..SchedulerSettings::default()
        }
    }

    /// Time between frames at the target rate
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for damping outside (0, 1), a
    /// zero agent count or a zero frame rate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let damp = self.effects.afterimage_damp;
        if !(damp > 0.0 && damp < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "afterimage_damp must be between 0 and 1 (exclusive), got {damp}"
            )));
        }
        if self.agent_count == 0 {
            return Err(ConfigError::ValidationError(
                "agent_count must be at least 1".to_string(),
            ));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::ValidationError(
                "target_fps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/halo/halo.toml` or `~/.config/halo/halo.toml`
/// if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("halo").join("halo.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if the resolved values fail validation. A missing config file is not
/// an error (defaults are used).
pub fn load_config() -> Result<HaloConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<HaloConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from a specific path, reading variables through `env`
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<HaloConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = HaloConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_config = read_toml(config_path)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;
    Ok(config)
}

fn read_toml(path: &Path) -> Result<HaloToml, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut HaloConfig, toml: &HaloToml) -> Result<(), ConfigError> {
    // Scene
    if let Some(ref variant) = toml.scene.variant {
        config.scene_variant = variant.parse().map_err(ConfigError::ValidationError)?;
    }
    if let Some(count) = toml.scene.agent_count {
        config.agent_count = count;
    }
    if toml.scene.seed.is_some() {
        config.seed = toml.scene.seed;
    }
    if toml.scene.avatar_model.is_some() {
        config.avatar_model = toml.scene.avatar_model.clone();
    }

    // Effects
    if let Some(damp) = toml.effects.afterimage_damp {
        config.effects.afterimage_damp = damp;
    }
    if let Some(threshold) = toml.effects.bloom_threshold {
        config.effects.bloom_threshold = threshold;
    }
    if let Some(strength) = toml.effects.bloom_strength {
        config.effects.bloom_strength = strength;
    }
    if let Some(radius) = toml.effects.bloom_radius {
        config.effects.bloom_radius = radius;
    }
    if let Some(enabled) = toml.effects.bloom_enabled {
        config.effects.bloom_enabled = enabled;
    }

    // Timers
    if let Some(ms) = toml.timers.link_timeout_ms {
        config.link_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timers.overlay_duration_ms {
        config.overlay_duration = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timers.shooting_star_check_ms {
        config.shooting_star_check = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timers.reply_delay_ms {
        config.reply_delay = Duration::from_millis(ms);
    }

    // Companion
    if let Some(ref url) = toml.companion.url {
        config.companion_url = url.clone();
    }
    if let Some(enabled) = toml.companion.enabled {
        config.companion_enabled = enabled;
    }

    // Display
    if let Some(fps) = toml.display.target_fps {
        config.target_fps = fps;
    }
    if let Some(ref name) = toml.display.username {
        config.username = name.clone();
    }
    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut HaloConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(scene) = env("HALO_SCENE") {
        match scene.parse() {
            Ok(variant) => {
                config.scene_variant = variant;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring HALO_SCENE"),
        }
    }
    if let Some(url) = env("HALO_COMPANION_URL") {
        config.companion_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(offline) = env("HALO_OFFLINE") {
        let offline = offline != "0" && offline.to_lowercase() != "false";
        config.companion_enabled = !offline;
        config.source = ConfigSource::Env;
    }
    if let Some(damp) = env("HALO_AFTERIMAGE_DAMP") {
        if let Ok(damp) = damp.parse::<f32>() {
            config.effects.afterimage_damp = damp;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(fps) = env("HALO_FPS") {
        if let Ok(fps) = fps.parse::<u32>() {
            config.target_fps = fps;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides,
/// then call [`HaloConfig::validate`] again.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Scene variant override
    pub scene_variant: Option<SceneVariant>,

    /// Companion address override
    pub companion_url: Option<String>,

    /// Run without a companion
    pub offline: bool,

    /// Seed override
    pub seed: Option<u64>,

    /// Frame rate override
    pub target_fps: Option<u32>,

    /// Username override
    pub username: Option<String>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scene variant override
    #[must_use]
    pub fn with_scene_variant(mut self, variant: SceneVariant) -> Self {
        self.scene_variant = Some(variant);
        self
    }

    /// Set companion address override
    #[must_use]
    pub fn with_companion_url(mut self, url: String) -> Self {
        self.companion_url = Some(url);
        self
    }

    /// Disable the companion
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set frame rate override
    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Set username override
    #[must_use]
    pub fn with_username(mut self, name: String) -> Self {
        self.username = Some(name);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut HaloConfig) {
        if self.scene_variant.is_some()
            || self.companion_url.is_some()
            || self.offline
            || self.seed.is_some()
            || self.target_fps.is_some()
            || self.username.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(variant) = self.scene_variant {
            config.scene_variant = variant;
        }
        if let Some(ref url) = self.companion_url {
            config.companion_url = url.clone();
        }
        if self.offline {
            config.companion_enabled = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(fps) = self.target_fps {
            config.target_fps = fps;
        }
        if let Some(ref name) = self.username {
            config.username = name.clone();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = HaloConfig::default();
        assert_eq!(config.scene_variant, SceneVariant::OrbCircle);
        assert_eq!(config.agent_count, 7);
        assert_eq!(config.companion_url, "ws://127.0.0.1:5001");
        assert!(config.companion_enabled);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.link_timeout, Duration::from_millis(2000));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_with_env(Some(PathBuf::from("/nonexistent/halo.toml")), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_default_path_is_under_halo() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("halo/halo.toml"));
        }
    }

    // =========================================================================
    // File Loading Tests
    // =========================================================================

    #[test]
    fn test_file_values_applied() {
        let file = write_config(
            r#"
[scene]
variant = "dungeon"
seed = 42

[effects]
afterimage_damp = 0.8
bloom_enabled = false

[timers]
link_timeout_ms = 1500

[companion]
enabled = false

[display]
target_fps = 60
"#,
        );
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.scene_variant, SceneVariant::Dungeon);
        assert_eq!(config.seed, Some(42));
        assert!((config.effects.afterimage_damp - 0.8).abs() < f32::EPSILON);
        assert!(!config.effects.bloom_enabled);
        assert_eq!(config.link_timeout, Duration::from_millis(1500));
        assert!(!config.companion_enabled);
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[display]\ntarget_fps = 24\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.target_fps, 24);
        assert_eq!(config.agent_count, 7);
        assert_eq!(config.scene_variant, SceneVariant::OrbCircle);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let file = write_config("[scene\nvariant = ");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_variant_is_validation_error() {
        let file = write_config("[scene]\nvariant = \"aquarium\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    // =========================================================================
    // Precedence Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[display]\ntarget_fps = 60\n[scene]\nvariant = \"orb-circle\"\n");
        let env = env_of(&[("HALO_FPS", "12"), ("HALO_SCENE", "dungeon")]);
        let config = load_config_with_env(Some(file.path().to_path_buf()), env).unwrap();
        assert_eq!(config.target_fps, 12);
        assert_eq!(config.scene_variant, SceneVariant::Dungeon);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_offline_flag() {
        let config = load_config_with_env(None, env_of(&[("HALO_OFFLINE", "1")])).unwrap();
        assert!(!config.companion_enabled);
        let config = load_config_with_env(None, env_of(&[("HALO_OFFLINE", "false")])).unwrap();
        assert!(config.companion_enabled);
    }

    #[test]
    fn test_unparsable_env_is_ignored() {
        let config = load_config_with_env(None, env_of(&[("HALO_FPS", "fast")])).unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config =
            load_config_with_env(None, env_of(&[("HALO_COMPANION_URL", "ws://env:1")])).unwrap();
        ConfigOverrides::new()
            .with_companion_url("ws://cli:2".to_string())
            .with_seed(9)
            .apply(&mut config);
        assert_eq!(config.companion_url, "ws://cli:2");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = HaloConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_damp_out_of_range_rejected() {
        for damp in ["0", "1", "1.5", "-0.2"] {
            let result = load_config_with_env(None, env_of(&[("HALO_AFTERIMAGE_DAMP", damp)]));
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "damp {damp} accepted"
            );
        }
    }

    #[test]
    fn test_zero_agents_and_fps_rejected() {
        let file = write_config("[scene]\nagent_count = 0\n");
        assert!(load_config_with_env(Some(file.path().to_path_buf()), no_env).is_err());
        assert!(load_config_with_env(None, env_of(&[("HALO_FPS", "0")])).is_err());
    }

    // =========================================================================
    // Derived Settings Tests
    // =========================================================================

    #[test]
    fn test_scene_description_uses_placeholder_for_unknown_model() {
        let config = HaloConfig {
            avatar_model: Some("dragon".to_string()),
            ..HaloConfig::default()
        };
        let description = config.scene_description();
        assert_eq!(description.assets.avatar_model, crate::avatar::AvatarModel::PlainSphere);
        assert_eq!(description.agent_count, 7);
    }

    #[test]
    fn test_scheduler_settings_carry_timers() {
        let config = HaloConfig {
            reply_delay: Duration::from_millis(250),
            seed: Some(3),
            ..HaloConfig::default()
        };
        let settings = config.scheduler_settings();
        assert_eq!(settings.reply_delay, Duration::from_millis(250));
        assert_eq!(settings.seed, Some(3));
        assert_eq!(config.frame_interval(), Duration::from_secs(1) / 30);
    }
}
