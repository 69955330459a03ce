//! Calculator configuration: one explicit struct with compile-time defaults.
//!
//! Policy
//! - Partial JSON fills missing fields from `Default` (`#[serde(default)]`).
//! - Unknown enum spellings never fail deserialization: they are logged with
//!   `tracing::warn!` and replaced by the variant's default.
//! - Out-of-range numbers are repaired by `sanitized()`, also with a warning.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Enum parsed from a kebab-case string, falling back to `Default` with a
/// warning on unknown input.
macro_rules! lenient_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text $(| $alias)* => $name::$variant,)+
                    other => {
                        let fallback = $name::default();
                        warn!(kind = $what, value = other, fallback = ?fallback, "unknown value; using default");
                        fallback
                    }
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                match v {
                    $($name::$variant => $text.to_string(),)+
                }
            }
        }
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Algorithm {
    #[default]
    Geometric,
    Points,
    PerPixel,
}
lenient_enum!(Algorithm, "algorithm", {
    Geometric => "geometric" | "area",
    Points => "points",
    PerPixel => "per-pixel" | "pixels",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}
lenient_enum!(ProjectionKind, "projection", {
    Perspective => "perspective",
    Orthographic => "orthographic",
});

/// Which sense a query is evaluated for; selects wall and tile restrictions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sense {
    #[default]
    Sight,
    Light,
    Sound,
}
lenient_enum!(Sense, "sense", {
    Sight => "sight",
    Light => "light",
    Sound => "sound",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PointLayout {
    Center,
    Five,
    #[default]
    Nine,
}
lenient_enum!(PointLayout, "point layout", {
    Center => "center",
    Five => "five",
    Nine => "nine",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViewpointLayout {
    #[default]
    Center,
    Corners,
    CenterAndCorners,
}
lenient_enum!(ViewpointLayout, "viewpoint layout", {
    Center => "center",
    Corners => "corners",
    CenterAndCorners => "center-and-corners",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenBlocking {
    pub dead: bool,
    pub live: bool,
    pub prone: bool,
}

impl Default for TokenBlocking {
    fn default() -> Self {
        Self {
            dead: false,
            live: true,
            prone: false,
        }
    }
}

/// Obstacle categories that participate in occlusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingConfig {
    pub walls: bool,
    pub tiles: bool,
    pub regions: bool,
    pub tokens: TokenBlocking,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            walls: true,
            tiles: true,
            regions: true,
            tokens: TokenBlocking::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub layout: PointLayout,
    /// Fraction of the half-extent kept when placing off-center points.
    pub inset: f64,
    /// Elevation levels sampled: 1 (middle) or 3 (bottom, middle, top).
    pub levels: u8,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            layout: PointLayout::default(),
            inset: 0.75,
            levels: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelsConfig {
    /// Square render size in pixels.
    pub resolution: usize,
}

impl Default for PixelsConfig {
    fn default() -> Self {
        Self { resolution: 32 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewpointsConfig {
    pub layout: ViewpointLayout,
    pub inset: f64,
}

impl Default for ViewpointsConfig {
    fn default() -> Self {
        Self {
            layout: ViewpointLayout::default(),
            inset: 0.75,
        }
    }
}

/// Everything one visibility evaluation needs to know besides the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub algorithm: Algorithm,
    pub projection: ProjectionKind,
    pub sense: Sense,
    pub blocking: BlockingConfig,
    /// Tiles with an alpha mask block only where alpha >= this value.
    pub alpha_threshold: Option<f64>,
    /// Normalize by one grid cube instead of the whole target silhouette.
    pub large_target: bool,
    pub grid_size: f64,
    /// Results within this distance of 0 or 1 snap to 0 or 1.
    pub visible_epsilon: f64,
    /// Height fraction kept by prone (and dead) tokens.
    pub prone_height_multiplier: f64,
    pub near_plane: f64,
    pub points: PointsConfig,
    pub pixels: PixelsConfig,
    pub viewpoints: ViewpointsConfig,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            projection: ProjectionKind::default(),
            sense: Sense::default(),
            blocking: BlockingConfig::default(),
            alpha_threshold: None,
            large_target: false,
            grid_size: 100.0,
            visible_epsilon: 0.01,
            prone_height_multiplier: 0.5,
            near_plane: 0.1,
            points: PointsConfig::default(),
            pixels: PixelsConfig::default(),
            viewpoints: ViewpointsConfig::default(),
        }
    }
}

impl CalculatorConfig {
    /// Replace out-of-range values with defaults, logging each repair.
    pub fn sanitized(mut self) -> Self {
        let d = CalculatorConfig::default();
        fn fix(name: &str, v: &mut f64, ok: bool, default: f64) {
            if !ok {
                warn!(field = name, value = *v, default, "out-of-range config value; using default");
                *v = default;
            }
        }
        let v = self.grid_size;
        fix("grid_size", &mut self.grid_size, v.is_finite() && v > 0.0, d.grid_size);
        let v = self.visible_epsilon;
        fix(
            "visible_epsilon",
            &mut self.visible_epsilon,
            (0.0..0.5).contains(&v),
            d.visible_epsilon,
        );
        let v = self.prone_height_multiplier;
        fix(
            "prone_height_multiplier",
            &mut self.prone_height_multiplier,
            v > 0.0 && v <= 1.0,
            d.prone_height_multiplier,
        );
        let v = self.near_plane;
        fix("near_plane", &mut self.near_plane, v.is_finite() && v > 0.0, d.near_plane);
        let v = self.points.inset;
        fix("points.inset", &mut self.points.inset, (0.0..=1.0).contains(&v), d.points.inset);
        let v = self.viewpoints.inset;
        fix(
            "viewpoints.inset",
            &mut self.viewpoints.inset,
            (0.0..=1.0).contains(&v),
            d.viewpoints.inset,
        );
        if self.points.levels != 1 && self.points.levels != 3 {
            warn!(value = self.points.levels, "points.levels must be 1 or 3; using 1");
            self.points.levels = 1;
        }
        if self.pixels.resolution == 0 || self.pixels.resolution > 1024 {
            warn!(value = self.pixels.resolution, "pixels.resolution out of range; using default");
            self.pixels.resolution = d.pixels.resolution;
        }
        if let Some(a) = self.alpha_threshold {
            if !(0.0..=1.0).contains(&a) {
                warn!(value = a, "alpha_threshold outside [0, 1]; alpha test disabled");
                self.alpha_threshold = None;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: CalculatorConfig =
            serde_json::from_str(r#"{"algorithm": "points", "blocking": {"tokens": {"dead": true}}}"#)
                .unwrap();
        assert_eq!(cfg.algorithm, Algorithm::Points);
        assert!(cfg.blocking.walls);
        assert!(cfg.blocking.tokens.dead);
        assert!(cfg.blocking.tokens.live);
        assert_eq!(cfg.visible_epsilon, 0.01);
    }

    #[test]
    fn unknown_enum_values_fall_back() {
        let cfg: CalculatorConfig =
            serde_json::from_str(r#"{"projection": "fisheye", "sense": "smell"}"#).unwrap();
        assert_eq!(cfg.projection, ProjectionKind::Perspective);
        assert_eq!(cfg.sense, Sense::Sight);
        let round = serde_json::to_string(&cfg).unwrap();
        assert!(round.contains(r#""projection":"perspective""#));
    }

    #[test]
    fn sanitize_repairs_out_of_range_values() {
        let mut cfg = CalculatorConfig::default();
        cfg.points.levels = 2;
        cfg.pixels.resolution = 0;
        cfg.near_plane = -1.0;
        cfg.alpha_threshold = Some(3.0);
        let cfg = cfg.sanitized();
        assert_eq!(cfg.points.levels, 1);
        assert_eq!(cfg.pixels.resolution, 32);
        assert_eq!(cfg.near_plane, 0.1);
        assert_eq!(cfg.alpha_threshold, None);
    }
}
