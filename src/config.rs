//! Configuration types for waypoint extraction.
//!
//! All run behaviour is controlled through [`ExtractConfig`], built via its
//! [`ExtractConfigBuilder`]. The GPX constants that shape the output (creator
//! string, namespace URIs, rounding precision) are plain fields with
//! defaults, so tests and library callers can substitute their own values.
//!
//! # Output profiles
//! Two output flavours exist: a Garmin flavour that attaches a `gpxx`
//! extension block (street address and optional POI category) to every point,
//! and a basic flavour that only carries a symbol. Both go through the same
//! builder; [`OutputProfile`] selects which optional blocks are emitted.

use crate::error::GpxExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace of GPX 1.0 documents.
pub const GPX_1_0_NAMESPACE: &str = "http://www.topografix.com/GPX/1/0";
/// Namespace of GPX 1.1 documents.
pub const GPX_1_1_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
/// Namespace of the Garmin GPX extensions (v3).
pub const GARMIN_EXTENSION_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/GpxExtensions/v3";
/// Default value of the output `creator` attribute.
pub const DEFAULT_CREATOR: &str = "https://github.com/passing/gpx-starting-point-extract";
/// Symbol used by [`OutputProfile::Basic`] when none is configured.
pub const DEFAULT_BASIC_SYMBOL: &str = "Flag";
/// Fractional digits kept on extracted coordinates.
pub const DEFAULT_PRECISION: u32 = 9;

/// Configuration for an extraction run.
///
/// Built via [`ExtractConfig::builder()`] or using
/// [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use gpx_starting_point_extract::{ExtractConfig, OutputProfile};
///
/// let config = ExtractConfig::builder()
///     .profile(OutputProfile::Garmin)
///     .category("Trailheads")
///     .include_bounds(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// Value of the output root's `creator` attribute.
    pub creator: String,

    /// Namespace that identifies elements of GPX 1.0 inputs.
    pub gpx10_namespace: String,

    /// Namespace that identifies elements of GPX 1.1 inputs. Also the
    /// default namespace of the output document.
    pub gpx11_namespace: String,

    /// Namespace bound to the `gpxx` prefix when extensions are emitted.
    pub extension_namespace: String,

    /// Fractional digits kept on latitude and longitude. Default: 9.
    ///
    /// Nine digits is sub-millimetre on the ground, enough to absorb the
    /// binary noise of parsing without inflating the output.
    pub precision: u32,

    /// Which optional per-point blocks are emitted. Default: [`OutputProfile::Garmin`].
    pub profile: OutputProfile,

    /// Point symbol (`<sym>`). `None` falls back to the profile default.
    pub symbol: Option<String>,

    /// Garmin POI category. Only valid with [`OutputProfile::Garmin`].
    pub category: Option<String>,

    /// Prepend `<metadata><bounds/></metadata>` to the output. Default: false.
    pub include_bounds: bool,

    /// What to do when a file's first waypoint lacks required data.
    /// Default: [`InvalidWaypointPolicy::Abort`].
    pub invalid_waypoint_policy: InvalidWaypointPolicy,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            creator: DEFAULT_CREATOR.to_string(),
            gpx10_namespace: GPX_1_0_NAMESPACE.to_string(),
            gpx11_namespace: GPX_1_1_NAMESPACE.to_string(),
            extension_namespace: GARMIN_EXTENSION_NAMESPACE.to_string(),
            precision: DEFAULT_PRECISION,
            profile: OutputProfile::default(),
            symbol: None,
            category: None,
            include_bounds: false,
            invalid_waypoint_policy: InvalidWaypointPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("creator", &self.creator)
            .field("gpx10_namespace", &self.gpx10_namespace)
            .field("gpx11_namespace", &self.gpx11_namespace)
            .field("extension_namespace", &self.extension_namespace)
            .field("precision", &self.precision)
            .field("profile", &self.profile)
            .field("symbol", &self.symbol)
            .field("category", &self.category)
            .field("include_bounds", &self.include_bounds)
            .field("invalid_waypoint_policy", &self.invalid_waypoint_policy)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }

    /// Namespace URI that elements of a document with `version` live in.
    pub fn namespace_for(&self, version: GpxVersion) -> &str {
        match version {
            GpxVersion::V1_0 => &self.gpx10_namespace,
            GpxVersion::V1_1 => &self.gpx11_namespace,
        }
    }

    /// The `<sym>` text to emit, after applying the profile default.
    pub fn effective_symbol(&self) -> Option<&str> {
        match (&self.symbol, self.profile) {
            (Some(s), _) => Some(s.as_str()),
            (None, OutputProfile::Basic) => Some(DEFAULT_BASIC_SYMBOL),
            (None, OutputProfile::Garmin) => None,
        }
    }

    /// Whether points carry the `gpxx` extension block.
    pub fn with_extensions(&self) -> bool {
        self.profile == OutputProfile::Garmin
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.config.creator = creator.into();
        self
    }

    pub fn gpx10_namespace(mut self, ns: impl Into<String>) -> Self {
        self.config.gpx10_namespace = ns.into();
        self
    }

    pub fn gpx11_namespace(mut self, ns: impl Into<String>) -> Self {
        self.config.gpx11_namespace = ns.into();
        self
    }

    pub fn extension_namespace(mut self, ns: impl Into<String>) -> Self {
        self.config.extension_namespace = ns.into();
        self
    }

    pub fn precision(mut self, digits: u32) -> Self {
        self.config.precision = digits;
        self
    }

    pub fn profile(mut self, profile: OutputProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.config.symbol = Some(symbol.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.config.category = Some(category.into());
        self
    }

    pub fn include_bounds(mut self, v: bool) -> Self {
        self.config.include_bounds = v;
        self
    }

    pub fn invalid_waypoint_policy(mut self, policy: InvalidWaypointPolicy) -> Self {
        self.config.invalid_waypoint_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, GpxExtractError> {
        let c = &self.config;
        if c.precision > 15 {
            return Err(GpxExtractError::InvalidConfig(format!(
                "Precision must be 0–15 digits, got {}",
                c.precision
            )));
        }
        if c.category.is_some() && c.profile != OutputProfile::Garmin {
            return Err(GpxExtractError::InvalidConfig(
                "A POI category needs the garmin profile (extensions are disabled)".into(),
            ));
        }
        if c.gpx11_namespace.is_empty() || c.gpx10_namespace.is_empty() {
            return Err(GpxExtractError::InvalidConfig(
                "GPX namespaces must not be empty".into(),
            ));
        }
        if c.with_extensions() && c.extension_namespace.is_empty() {
            return Err(GpxExtractError::InvalidConfig(
                "Extension namespace must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// GPX schema versions this tool reads.
///
/// Anything else is rejected with
/// [`GpxExtractError::UnsupportedVersion`] instead of being guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpxVersion {
    V1_0,
    V1_1,
}

impl GpxVersion {
    /// Map a root `version` attribute value to a known version.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "1.0" => Some(GpxVersion::V1_0),
            "1.1" => Some(GpxVersion::V1_1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GpxVersion::V1_0 => "1.0",
            GpxVersion::V1_1 => "1.1",
        }
    }
}

impl fmt::Display for GpxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional blocks emitted per output point.
///
/// | Profile | `gpxx` extensions | default `<sym>` | category |
/// |---------|-------------------|-----------------|----------|
/// | Garmin  | yes               | none            | allowed  |
/// | Basic   | no                | `Flag`          | rejected |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputProfile {
    /// Street address and optional category in a `gpxx:WaypointExtension`. (default)
    #[default]
    Garmin,
    /// Plain GPX 1.1 points with a symbol.
    Basic,
}

/// Per-file handling of a first waypoint that lacks `lat`, `lon` or `<name>`
/// or carries an unparsable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidWaypointPolicy {
    /// Fail the whole run. (default)
    #[default]
    Abort,
    /// Record a [`crate::error::FileSkip::Invalid`] and continue.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_lookup_is_closed() {
        assert_eq!(GpxVersion::from_attribute("1.0"), Some(GpxVersion::V1_0));
        assert_eq!(GpxVersion::from_attribute("1.1"), Some(GpxVersion::V1_1));
        assert_eq!(GpxVersion::from_attribute("2.0"), None);
        assert_eq!(GpxVersion::from_attribute(" 1.1"), None);
        assert_eq!(GpxVersion::from_attribute(""), None);
    }

    #[test]
    fn namespace_for_uses_configured_values() {
        let config = ExtractConfig::builder()
            .gpx10_namespace("urn:test:gpx10")
            .build()
            .unwrap();
        assert_eq!(config.namespace_for(GpxVersion::V1_0), "urn:test:gpx10");
        assert_eq!(config.namespace_for(GpxVersion::V1_1), GPX_1_1_NAMESPACE);
    }

    #[test]
    fn basic_profile_defaults_symbol_to_flag() {
        let config = ExtractConfig::builder()
            .profile(OutputProfile::Basic)
            .build()
            .unwrap();
        assert_eq!(config.effective_symbol(), Some("Flag"));
        assert!(!config.with_extensions());
    }

    #[test]
    fn garmin_profile_has_no_default_symbol() {
        let config = ExtractConfig::default();
        assert_eq!(config.effective_symbol(), None);
        assert!(config.with_extensions());

        let config = ExtractConfig::builder().symbol("Pin, Blue").build().unwrap();
        assert_eq!(config.effective_symbol(), Some("Pin, Blue"));
    }

    #[test]
    fn category_requires_garmin_profile() {
        let err = ExtractConfig::builder()
            .profile(OutputProfile::Basic)
            .category("Parking")
            .build()
            .unwrap_err();
        assert!(matches!(err, GpxExtractError::InvalidConfig(_)));
    }

    #[test]
    fn precision_is_bounded() {
        assert!(ExtractConfig::builder().precision(15).build().is_ok());
        assert!(ExtractConfig::builder().precision(16).build().is_err());
    }

    #[test]
    fn defaults_match_published_constants() {
        let c = ExtractConfig::default();
        assert_eq!(c.precision, 9);
        assert_eq!(c.creator, DEFAULT_CREATOR);
        assert!(!c.include_bounds);
        assert_eq!(c.invalid_waypoint_policy, InvalidWaypointPolicy::Abort);
    }
}
