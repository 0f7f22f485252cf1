//! Card configuration parsing and validation.
//!
//! # Responsibility
//! - Resolve the required identity from user configuration.
//! - Validate presentation values, falling back to defaults when invalid.
//!
//! # Invariants
//! - A missing identity is the only fatal configuration error besides a
//!   non-object document.
//! - Invalid presentation values never fail; they fall back to defaults.

use crate::model::identity::Identity;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_FONT_SIZE: &str = "16px";
pub const DEFAULT_LINE_HEIGHT: f64 = 1.0;
pub const DEFAULT_MEDIA_WIDTH: &str = "100%";
pub const DEFAULT_MEDIA_HEIGHT: &str = "auto";
const MEDIA_AUTO: &str = "auto";

static FONT_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?(px|rem|em)$").expect("valid font size regex"));
static MEDIA_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?(px|%)$").expect("valid media size regex"));
static LEADING_FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("valid float regex")
});

/// Configuration errors surfaced from card setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `person_name` nor `entity` was provided.
    MissingIdentity,
    InvalidConfig(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => {
                write!(f, "person_name or entity configuration is required")
            }
            Self::InvalidConfig(message) => write!(f, "invalid card configuration: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCardConfig {
    person_name: Option<String>,
    entity: Option<String>,
    font_size: Option<Value>,
    line_height: Option<Value>,
    media_width: Option<Value>,
    media_height: Option<Value>,
    persist: Option<bool>,
}

/// Validated card configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CardConfig {
    pub identity: Identity,
    /// CSS font size (`px`, `rem` or `em`).
    pub font_size: String,
    /// Multiplier applied to the numeric font size.
    pub line_height: f64,
    /// `--media-width` override, when configured.
    pub media_width: Option<String>,
    /// `--media-height` override, when configured.
    pub media_height: Option<String>,
    /// Seed from and write through persistence.
    pub persist: bool,
}

impl CardConfig {
    /// Creates a configuration with default presentation values.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            font_size: DEFAULT_FONT_SIZE.to_string(),
            line_height: DEFAULT_LINE_HEIGHT,
            media_width: None,
            media_height: None,
            persist: true,
        }
    }

    /// Parses user configuration.
    ///
    /// `person_name` takes precedence over `entity` when both are set.
    ///
    /// # Errors
    /// - `MissingIdentity` when no non-blank identity is configured.
    /// - `InvalidConfig` when the document is not an object or a field has
    ///   the wrong type.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::InvalidConfig(
                "configuration must be an object".to_string(),
            ));
        }
        let raw: RawCardConfig = serde_json::from_value(value)
            .map_err(|err| ConfigError::InvalidConfig(err.to_string()))?;

        let identity = match (non_blank(raw.person_name), non_blank(raw.entity)) {
            (Some(name), _) => Identity::Person(name),
            (None, Some(entity_id)) => Identity::Entity(entity_id),
            (None, None) => return Err(ConfigError::MissingIdentity),
        };

        Ok(Self {
            identity,
            font_size: validate_value(
                raw.font_size.as_ref(),
                DEFAULT_FONT_SIZE,
                &FONT_SIZE_RE,
                None,
            ),
            line_height: parse_line_height(raw.line_height.as_ref()),
            media_width: raw
                .media_width
                .as_ref()
                .map(|value| validate_media(value, DEFAULT_MEDIA_WIDTH)),
            media_height: raw
                .media_height
                .as_ref()
                .map(|value| validate_media(value, DEFAULT_MEDIA_HEIGHT)),
            persist: raw.persist.unwrap_or(true),
        })
    }

    /// Numeric part of `font_size`, used for line-height computation.
    pub fn font_size_value(&self) -> f64 {
        leading_float(&self.font_size).unwrap_or(16.0)
    }

    /// Line height in pixels: numeric font size times `line_height`.
    pub fn line_height_px(&self) -> f64 {
        self.font_size_value() * self.line_height
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Accepts a string matching `pattern` (or equal to `extra`), else `default`.
fn validate_value(
    value: Option<&Value>,
    default: &str,
    pattern: &Regex,
    extra: Option<&str>,
) -> String {
    match value.and_then(Value::as_str) {
        Some(raw) if pattern.is_match(raw) || extra == Some(raw) => raw.to_string(),
        _ => default.to_string(),
    }
}

fn validate_media(value: &Value, default: &str) -> String {
    validate_value(Some(value), default, &MEDIA_SIZE_RE, Some(MEDIA_AUTO))
}

fn parse_line_height(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => leading_float(raw),
        _ => None,
    };
    match parsed {
        Some(height) if height.is_finite() && height > 0.0 => height,
        _ => DEFAULT_LINE_HEIGHT,
    }
}

/// Parses the longest leading decimal number, like a lenient `parseFloat`.
fn leading_float(raw: &str) -> Option<f64> {
    LEADING_FLOAT_RE
        .find(raw)
        .and_then(|found| found.as_str().trim().parse::<f64>().ok())
}
