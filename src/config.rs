//! Widget configuration. Defaults reproduce the stock valentine page; with the
//! `serde` feature a host page can override any subset from JSON.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::celebration::{BurstTiming, CONFETTI_PALETTE, PARTICLE_COUNT, PARTICLE_LIFETIME_MS, SPAWN_STAGGER_MS};
use crate::escalation::{PANDA_IMAGES, PLEADING_MESSAGES};
use crate::geometry::{COMPACT_MAX_WIDTH, COMPACT_PADDING, DESKTOP_PADDING, INITIAL_OFFSET_X, ViewportMode};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("at least one pleading message is required")]
    NoMessages,
    #[error("at least one image is required")]
    NoImages,
    #[error("confetti palette is empty")]
    EmptyPalette,
    #[error("compact viewport width must be positive, got {0}")]
    BadThreshold(f64),
    #[error("padding must be non-negative, got {0}")]
    BadPadding(f64),
    #[error("element id `{0}` is empty")]
    EmptyId(&'static str),
    #[cfg(feature = "serde_json")]
    #[error("invalid config json: {0}")]
    Json(String),
}

impl From<ConfigError> for JsValue {
    fn from(e: ConfigError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// DOM hooks the widget expects the page markup to provide.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ElementIds {
    pub yes_button: String,
    pub no_button: String,
    pub image: String,
    pub message: String,
    pub completion_panel: String,
    /// CSS selector, not an id.
    pub buttons_container: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            yes_button: "yesButton".into(),
            no_button: "noButton".into(),
            image: "pandaImage".into(),
            message: "pleadingText".into(),
            completion_panel: "successModal".into(),
            buttons_container: ".buttons-container".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct WidgetConfig {
    pub elements: ElementIds,
    pub compact_max_width: f64,
    pub compact_padding: f64,
    pub desktop_padding: f64,
    pub initial_offset_x: f64,
    pub shake_ms: u32,
    pub shake_class: String,
    pub distressed_class: String,
    pub hidden_class: String,
    pub messages: Vec<String>,
    pub images: Vec<String>,
    pub palette: Vec<String>,
    pub particle_count: u32,
    pub spawn_stagger_ms: u32,
    pub particle_lifetime_ms: u32,
    /// Log every trigger and mode switch to the console.
    pub verbose: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            compact_max_width: COMPACT_MAX_WIDTH,
            compact_padding: COMPACT_PADDING,
            desktop_padding: DESKTOP_PADDING,
            initial_offset_x: INITIAL_OFFSET_X,
            shake_ms: 1000,
            shake_class: "shake".into(),
            distressed_class: "sad".into(),
            hidden_class: "hidden".into(),
            messages: PLEADING_MESSAGES.iter().map(|s| s.to_string()).collect(),
            images: PANDA_IMAGES.iter().map(|s| s.to_string()).collect(),
            palette: CONFETTI_PALETTE.iter().map(|s| s.to_string()).collect(),
            particle_count: PARTICLE_COUNT,
            spawn_stagger_ms: SPAWN_STAGGER_MS,
            particle_lifetime_ms: PARTICLE_LIFETIME_MS,
            verbose: false,
        }
    }
}

impl WidgetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.messages.is_empty() {
            return Err(ConfigError::NoMessages);
        }
        if self.images.is_empty() {
            return Err(ConfigError::NoImages);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        // NaN fails this comparison too
        if !(self.compact_max_width > 0.0) {
            return Err(ConfigError::BadThreshold(self.compact_max_width));
        }
        for pad in [self.compact_padding, self.desktop_padding] {
            if !(pad >= 0.0) {
                return Err(ConfigError::BadPadding(pad));
            }
        }
        let e = &self.elements;
        let ids: [(&'static str, &str); 6] = [
            ("yesButton", &e.yes_button),
            ("noButton", &e.no_button),
            ("image", &e.image),
            ("message", &e.message),
            ("completionPanel", &e.completion_panel),
            ("buttonsContainer", &e.buttons_container),
        ];
        if let Some(&(name, _)) = ids.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::EmptyId(name));
        }
        Ok(())
    }

    pub fn padding(&self, mode: ViewportMode) -> f64 {
        match mode {
            ViewportMode::Compact => self.compact_padding,
            ViewportMode::Desktop => self.desktop_padding,
        }
    }

    pub fn burst(&self) -> BurstTiming {
        BurstTiming {
            count: self.particle_count,
            stagger_ms: self.spawn_stagger_ms,
            lifetime_ms: self.particle_lifetime_ms,
        }
    }

    /// Parses a (possibly partial) JSON object and validates the result.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = WidgetConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.messages.len(), 5);
        assert_eq!(cfg.images.len(), 6);
        assert_eq!(cfg.padding(ViewportMode::Compact), 10.0);
        assert_eq!(cfg.padding(ViewportMode::Desktop), 20.0);
        assert_eq!(cfg.burst(), BurstTiming::default());
    }

    #[test]
    fn rejects_empty_tables() {
        let cfg = WidgetConfig { messages: vec![], ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoMessages));
        let cfg = WidgetConfig { images: vec![], ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoImages));
        let cfg = WidgetConfig { palette: vec![], ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn rejects_bad_geometry() {
        let cfg = WidgetConfig { compact_max_width: 0.0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::BadThreshold(0.0)));
        let cfg = WidgetConfig { desktop_padding: -1.0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::BadPadding(-1.0)));
    }

    #[test]
    fn rejects_blank_ids() {
        let mut cfg = WidgetConfig::default();
        cfg.elements.no_button = "  ".into();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyId("noButton")));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_overrides_named_fields() {
        let cfg = WidgetConfig::from_json(r#"{"particleCount": 12, "elements": {"noButton": "nope"}}"#).unwrap();
        assert_eq!(cfg.particle_count, 12);
        assert_eq!(cfg.elements.no_button, "nope");
        assert_eq!(cfg.elements.yes_button, "yesButton");
        assert_eq!(cfg.messages.len(), 5);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(WidgetConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert_eq!(WidgetConfig::from_json(r#"{"images": []}"#), Err(ConfigError::NoImages));
    }
}
