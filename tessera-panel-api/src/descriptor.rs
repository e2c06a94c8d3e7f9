//! Panel descriptors and wire payloads for the Tessera dashboard.
//!
//! These are the types the grid engine exchanges with the outside world: the
//! backend's layout document on the way in, and position/size updates on the
//! way out. The engine itself never talks to a renderer or an HTTP client
//! directly; it consumes a plain list of [`PanelDescriptor`]s and produces a
//! [`PositionBatch`].
//!
//! Panel sizes travel as `"WxH"` grid-unit tokens (`"3x2"` is three columns
//! wide, two rows tall), matching the backend's layout document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a `"WxH"` size token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSizeError {
    /// The token is missing the `x` separator.
    #[error("size token '{0}' is missing the 'x' separator")]
    MissingSeparator(String),
    /// One of the dimensions is not a positive integer.
    #[error("size token '{0}' has a non-numeric or non-positive dimension")]
    BadDimension(String),
}

/// A panel size in grid units, parsed from a `"WxH"` token.
///
/// # Example
///
/// ```rust
/// use tessera_panel_api::SizeToken;
///
/// let size: SizeToken = "3x2".parse().unwrap();
/// assert_eq!(size.w, 3);
/// assert_eq!(size.h, 2);
/// assert_eq!(size.to_string(), "3x2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeToken {
    /// Width in grid columns
    pub w: i32,
    /// Height in grid rows
    pub h: i32,
}

impl SizeToken {
    /// The fallback size used when a panel's size token is missing or
    /// malformed. Recovered locally; never an error.
    pub const DEFAULT: SizeToken = SizeToken { w: 2, h: 2 };

    /// Create a size token from explicit dimensions.
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Parse an optional token, falling back to [`SizeToken::DEFAULT`] on a
    /// missing or malformed value.
    ///
    /// Malformed input is a recovered condition: it is logged at warn level
    /// and replaced with the default, never surfaced as an error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_panel_api::SizeToken;
    ///
    /// assert_eq!(SizeToken::parse_or_default(Some("4x3")), SizeToken::new(4, 3));
    /// assert_eq!(SizeToken::parse_or_default(Some("garbage")), SizeToken::DEFAULT);
    /// assert_eq!(SizeToken::parse_or_default(None), SizeToken::DEFAULT);
    /// ```
    pub fn parse_or_default(token: Option<&str>) -> Self {
        match token {
            None => Self::DEFAULT,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("invalid panel size token {:?}: {}. Using default.", raw, e);
                Self::DEFAULT
            }),
        }
    }
}

impl FromStr for SizeToken {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| ParseSizeError::MissingSeparator(s.to_string()))?;

        let parse_dim = |d: &str| {
            d.trim()
                .parse::<i32>()
                .ok()
                .filter(|v| *v >= 1)
                .ok_or_else(|| ParseSizeError::BadDimension(s.to_string()))
        };

        Ok(Self {
            w: parse_dim(w)?,
            h: parse_dim(h)?,
        })
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// A cell origin on the grid, as stored in the backend layout document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One panel's entry in the layout source the engine is built from.
///
/// Descriptors come from the backend layout document (or, historically, from
/// rendered elements' data attributes). Every field except `id` is optional:
/// a missing or malformed size recovers to `2x2`, a missing position to
/// `(0, 0)`. The `order` field, when present, drives the sequence order of
/// the built grid, which is the tie-break for compaction.
///
/// # Example
///
/// ```rust
/// use tessera_panel_api::PanelDescriptor;
///
/// let desc = PanelDescriptor::new("weather")
///     .with_size("3x2")
///     .with_position(4, 0)
///     .with_min_size("2x2");
/// assert_eq!(desc.id, "weather");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDescriptor {
    /// Unique panel identifier
    pub id: String,
    /// Size as a `"WxH"` grid-unit token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Cell origin on the grid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GridPosition>,
    /// Minimum size as a `"WxH"` token
    #[serde(default, rename = "minSize", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<String>,
    /// Explicit sequence order; defaults to source order when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl PanelDescriptor {
    /// Create a descriptor with only an id; everything else defaults.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            size: None,
            position: None,
            min_size: None,
            order: None,
        }
    }

    /// Set the `"WxH"` size token.
    pub fn with_size<S: Into<String>>(mut self, size: S) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Set the cell origin.
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(GridPosition::new(x, y));
        self
    }

    /// Set the `"WxH"` minimum-size token.
    pub fn with_min_size<S: Into<String>>(mut self, min_size: S) -> Self {
        self.min_size = Some(min_size.into());
        self
    }

    /// Set the explicit sequence order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

/// One panel's committed placement, as submitted to the backend.
///
/// Drag commits positions only; resize also carries the new dimensions, so
/// `w`/`h` are optional and omitted from the JSON body when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
}

/// Body of `POST /api/panels/positions`: the full widget set after a
/// committed gesture or a compact-all action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBatch {
    pub panels: Vec<PositionUpdate>,
}

impl PositionBatch {
    pub fn new(panels: Vec<PositionUpdate>) -> Self {
        Self { panels }
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_token_parse() {
        assert_eq!("3x2".parse::<SizeToken>().unwrap(), SizeToken::new(3, 2));
        assert_eq!("12x8".parse::<SizeToken>().unwrap(), SizeToken::new(12, 8));
        assert_eq!("1x1".parse::<SizeToken>().unwrap(), SizeToken::new(1, 1));
    }

    #[test]
    fn test_size_token_parse_rejects_malformed() {
        assert!(matches!(
            "32".parse::<SizeToken>(),
            Err(ParseSizeError::MissingSeparator(_))
        ));
        assert!(matches!(
            "ax2".parse::<SizeToken>(),
            Err(ParseSizeError::BadDimension(_))
        ));
        assert!(matches!(
            "3x0".parse::<SizeToken>(),
            Err(ParseSizeError::BadDimension(_))
        ));
        assert!(matches!(
            "-1x2".parse::<SizeToken>(),
            Err(ParseSizeError::BadDimension(_))
        ));
        assert!("".parse::<SizeToken>().is_err());
    }

    #[test]
    fn test_size_token_display_round_trip() {
        let size = SizeToken::new(4, 3);
        assert_eq!(size.to_string(), "4x3");
        assert_eq!(size.to_string().parse::<SizeToken>().unwrap(), size);
    }

    #[test]
    fn test_size_token_recovery() {
        assert_eq!(SizeToken::parse_or_default(None), SizeToken::DEFAULT);
        assert_eq!(SizeToken::parse_or_default(Some("oops")), SizeToken::DEFAULT);
        assert_eq!(SizeToken::parse_or_default(Some("0x0")), SizeToken::DEFAULT);
        assert_eq!(
            SizeToken::parse_or_default(Some("5x4")),
            SizeToken::new(5, 4)
        );
    }

    #[test]
    fn test_descriptor_from_backend_json() {
        let json = r#"{
            "id": "hn-top",
            "size": "4x3",
            "position": { "x": 3, "y": 0 },
            "minSize": "2x2",
            "order": 1
        }"#;
        let desc: PanelDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(desc.id, "hn-top");
        assert_eq!(desc.size.as_deref(), Some("4x3"));
        assert_eq!(desc.position, Some(GridPosition::new(3, 0)));
        assert_eq!(desc.min_size.as_deref(), Some("2x2"));
        assert_eq!(desc.order, Some(1));
    }

    #[test]
    fn test_descriptor_with_missing_fields() {
        let desc: PanelDescriptor = serde_json::from_str(r#"{"id": "bare"}"#).unwrap();
        assert_eq!(desc.id, "bare");
        assert!(desc.size.is_none());
        assert!(desc.position.is_none());
        assert!(desc.min_size.is_none());
        assert!(desc.order.is_none());
    }

    #[test]
    fn test_position_update_omits_missing_dimensions() {
        let update = PositionUpdate {
            id: "a".to_string(),
            x: 3,
            y: 0,
            w: None,
            h: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "a", "x": 3, "y": 0 }));
    }

    #[test]
    fn test_position_update_with_dimensions() {
        let update = PositionUpdate {
            id: "a".to_string(),
            x: 3,
            y: 0,
            w: Some(4),
            h: Some(3),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "a", "x": 3, "y": 0, "w": 4, "h": 3 })
        );
    }

    #[test]
    fn test_position_batch_body_shape() {
        let batch = PositionBatch::new(vec![PositionUpdate {
            id: "a".to_string(),
            x: 0,
            y: 0,
            w: None,
            h: None,
        }]);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "panels": [{ "id": "a", "x": 0, "y": 0 }] })
        );
    }
}
