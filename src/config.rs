//! Configuration management

use crate::{NarratorError, Result};
use ini::Ini;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default synthesis service endpoint
pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Default playback ceiling in milliseconds
pub const DEFAULT_CEILING_MS: u64 = 10_000;

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "NARRATOR_API_KEY";

/// One character's speaking style
///
/// Presets are keyed by locale and character name in the config file,
/// e.g. `[voice.vi-VN.male]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoicePreset {
    /// Voice name, used to resolve the service's gender tag
    pub voice: String,
    /// Speaking rate (1.0 is normal)
    pub speed: f32,
    /// Pitch offset in semitones (0.0 is normal)
    pub pitch: f32,
    /// Vocal range. Kept for preset compatibility; the synthesis
    /// service has no parameter for it.
    pub range: f32,
}

/// Application configuration
///
/// Holds the synthesis service settings and the per-locale character voice
/// preset table.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.narrator.cfg)
    path: PathBuf,

    /// Voice presets keyed by (locale, character)
    presets: HashMap<(String, String), VoicePreset>,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path (tests use a temp dir)
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| NarratorError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| NarratorError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        let mut config = Self {
            ini,
            path,
            presets: HashMap::new(),
        };

        config.parse_presets();

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| NarratorError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.narrator.cfg)
    fn config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".narrator.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("service"))
            .set("base_url", DEFAULT_BASE_URL)
            .set("ceiling_ms", DEFAULT_CEILING_MS.to_string());

        ini.with_section(Some("voice.vi-VN.male"))
            .set("voice", "taichi")
            .set("speed", "1.0")
            .set("pitch", "0.0")
            .set("range", "1.0");

        ini.with_section(Some("voice.vi-VN.female"))
            .set("voice", "nozomi")
            .set("speed", "1.0")
            .set("pitch", "0.0")
            .set("range", "1.0");

        ini.with_section(Some("voice.pt-BR.male"))
            .set("voice", "hiroshi")
            .set("speed", "1.0")
            .set("pitch", "0.0")
            .set("range", "1.0");

        ini
    }

    /// Parse `[voice.<locale>.<character>]` sections into the preset table
    fn parse_presets(&mut self) {
        for (section, properties) in self.ini.iter() {
            let Some(name) = section else { continue };
            let Some(rest) = name.strip_prefix("voice.") else {
                continue;
            };
            let Some((locale, character)) = rest.split_once('.') else {
                debug!("Ignoring malformed voice section [{}]", name);
                continue;
            };

            let Some(voice) = properties.get("voice") else {
                debug!("Voice section [{}] has no voice name, skipping", name);
                continue;
            };

            let parse_f32 = |key: &str, default: f32| {
                properties
                    .get(key)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default)
            };

            self.presets.insert(
                (locale.to_string(), character.to_string()),
                VoicePreset {
                    voice: voice.to_string(),
                    speed: parse_f32("speed", 1.0),
                    pitch: parse_f32("pitch", 0.0),
                    range: parse_f32("range", 1.0),
                },
            );
        }
        debug!("Loaded {} voice presets", self.presets.len());
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: u64) -> u64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Speech service configuration getters

    /// API key for the synthesis service
    ///
    /// The NARRATOR_API_KEY environment variable takes precedence over the
    /// config file, so the key never has to be written to disk.
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return Ok(key);
            }
        }

        match self.ini.get_from(Some("service"), "api_key") {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(NarratorError::Config(format!(
                "No API key configured. Set {} or add api_key to [service] in {:?}",
                API_KEY_ENV, self.path
            ))),
        }
    }

    /// Base URL of the synthesis service
    pub fn base_url(&self) -> String {
        self.get_string("service", "base_url", DEFAULT_BASE_URL)
    }

    /// Playback ceiling in milliseconds
    pub fn ceiling_ms(&self) -> u64 {
        self.get_int("service", "ceiling_ms", DEFAULT_CEILING_MS)
    }

    /// Look up the voice preset for a locale and character
    pub fn preset(&self, locale: &str, character: &str) -> Option<&VoicePreset> {
        self.presets
            .get(&(locale.to_string(), character.to_string()))
    }

    /// Locales with at least one configured preset
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self
            .presets
            .keys()
            .map(|(locale, _)| locale.as_str())
            .collect();
        locales.sort_unstable();
        locales.dedup();
        locales
    }
}
