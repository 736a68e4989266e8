use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::mixer::{EQ_GAIN_RANGE_DB, REVERB_RANGE, VOLUME_RANGE};

/// Pixel deadbands for the finger-extension classifier. These are the only
/// tunables; parameter ranges are fixed constants in `mixer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Thumb tip must sit at least this many pixels left of the IP joint.
    #[serde(default = "default_thumb_dx")]
    pub thumb_dx: f32,
    /// Fingertip must sit at least this many pixels above the finger base.
    #[serde(default = "default_finger_dy")]
    pub finger_dy: f32,
}

fn default_thumb_dx() -> f32 {
    5.0
}

fn default_finger_dy() -> f32 {
    20.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            thumb_dx: default_thumb_dx(),
            finger_dy: default_finger_dy(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
}

fn config_dir() -> PathBuf {
    let home = UserDirs::new().unwrap().home_dir().to_path_buf();
    home.join(".config").join("handmix")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_config_text() -> &'static str {
    include_str!("../config/default.toml")
}

impl Config {
    /// Reads the user config, installing the embedded default first if none
    /// exists yet.
    pub fn load_or_install_default() -> Result<Self> {
        fs::create_dir_all(config_dir())?;
        let path = config_path();
        if !path.exists() {
            fs::write(&path, default_config_text())?;
            info!("installed default config at {}", path.display());
        }
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        let cfg: Config =
            toml::from_str(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))?;
        validate(&cfg)?;
        Ok(cfg)
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        serde_json::json!({
            "config_path": config_path(),
            "socket": crate::session::runtime::socket_path(),
            "thresholds": {
                "thumb_dx": self.thresholds.thumb_dx,
                "finger_dy": self.thresholds.finger_dy,
            },
            "ranges": {
                "volume_percent": [VOLUME_RANGE.0, VOLUME_RANGE.1],
                "eq_gain_db": [EQ_GAIN_RANGE_DB.0, EQ_GAIN_RANGE_DB.1],
                "reverb_mix": [REVERB_RANGE.0, REVERB_RANGE.1],
            },
        })
    }
}

fn validate(c: &Config) -> Result<()> {
    for (name, v) in [
        ("thresholds.thumb_dx", c.thresholds.thumb_dx),
        ("thresholds.finger_dy", c.thresholds.finger_dy),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(anyhow!("{name} must be a non-negative number, got {v}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classifier_deadbands() {
        let th = Thresholds::default();
        assert_eq!(th.thumb_dx, 5.0);
        assert_eq!(th.finger_dy, 20.0);
    }

    #[test]
    fn embedded_default_config_parses_to_defaults() {
        let cfg: Config = toml::from_str(default_config_text()).unwrap();
        assert_eq!(cfg.thresholds.thumb_dx, 5.0);
        assert_eq!(cfg.thresholds.finger_dy, 20.0);
        validate(&cfg).unwrap();
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.thresholds.finger_dy, 20.0);
        let cfg: Config = toml::from_str("[thresholds]\nthumb_dx = 8.0\n").unwrap();
        assert_eq!(cfg.thresholds.thumb_dx, 8.0);
        assert_eq!(cfg.thresholds.finger_dy, 20.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[thresholds]\npinch = 1.0\n").is_err());
        assert!(toml::from_str::<Config>("[bindings]\n").is_err());
    }

    #[test]
    fn negative_thresholds_fail_validation() {
        let cfg: Config = toml::from_str("[thresholds]\nfinger_dy = -3.0\n").unwrap();
        assert!(validate(&cfg).is_err());
    }
}
