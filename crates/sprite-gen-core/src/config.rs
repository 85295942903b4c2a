use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SpriteError};

/// Ordering applied to each repeat group before layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Byte-wise ascending file name. Reproducible across platforms.
    NameAsc,
    /// Keep directory enumeration order. Depends on the filesystem and is not
    /// reproducible; only useful to mimic older outputs.
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name_asc" => Ok(Self::NameAsc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Background fill for canvas pixels no fragment covers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Matte {
    /// Fully transparent; the composite keeps its alpha channel.
    #[default]
    Transparent,
    /// Opaque solid color.
    Solid([u8; 3]),
}

impl Matte {
    pub fn has_alpha(&self) -> bool {
        matches!(self, Matte::Transparent)
    }

    /// RGBA value used to fill the canvas.
    pub fn fill(&self) -> [u8; 4] {
        match *self {
            Matte::Transparent => [0, 0, 0, 0],
            Matte::Solid([r, g, b]) => [r, g, b, 255],
        }
    }
}

/// Parses `transparent` or an `R,G,B` triple. Missing trailing components
/// default to 255, so `"0"` is `0,255,255`.
impl FromStr for Matte {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Matte::Transparent);
        }
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() > 3 {
            return Err(SpriteError::InvalidConfig(format!(
                "matte '{s}' has more than three components"
            )));
        }
        let mut rgb = [255u8; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            *slot = part.parse::<u8>().map_err(|_| {
                SpriteError::InvalidConfig(format!(
                    "matte component '{part}' is not an integer in 0..=255"
                ))
            })?;
        }
        Ok(Matte::Solid(rgb))
    }
}

impl fmt::Display for Matte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matte::Transparent => f.write_str("transparent"),
            Matte::Solid([r, g, b]) => write!(f, "{r},{g},{b}"),
        }
    }
}

impl TryFrom<String> for Matte {
    type Error = SpriteError;
    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Matte> for String {
    fn from(m: Matte) -> Self {
        m.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// Directory holding the fragments; outputs are written next to them.
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Base name of the composites and the stylesheet.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub matte: Matte,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Upper bound on `width * height` of any single composite.
    #[serde(default = "default_max_canvas_pixels")]
    pub max_canvas_pixels: u64,
    /// Render the repeat groups on the rayon pool when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            prefix: default_prefix(),
            matte: Matte::default(),
            sort_order: default_sort_order(),
            max_canvas_pixels: default_max_canvas_pixels(),
            parallel: false,
        }
    }
}

impl SpriteConfig {
    /// Validates the configuration parameters.
    ///
    /// The prefix must be a plain file name stem and the canvas limit must be
    /// non-zero. Whether `path` exists is checked when the run scans it.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(SpriteError::InvalidConfig("prefix must not be empty".into()));
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(SpriteError::InvalidConfig(format!(
                "prefix '{}' must not contain path separators",
                self.prefix
            )));
        }
        if self.max_canvas_pixels == 0 {
            return Err(SpriteError::InvalidConfig(
                "max_canvas_pixels must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `SpriteConfig`.
    pub fn builder() -> SpriteConfigBuilder {
        SpriteConfigBuilder::new()
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}
fn default_prefix() -> String {
    "sprites".into()
}
fn default_sort_order() -> SortOrder {
    SortOrder::NameAsc
}
fn default_max_canvas_pixels() -> u64 {
    1 << 28
}

/// Builder for `SpriteConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SpriteConfigBuilder {
    cfg: SpriteConfig,
}

impl SpriteConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: SpriteConfig::default(),
        }
    }
    pub fn path(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.path = v.into();
        self
    }
    pub fn prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.prefix = v.into();
        self
    }
    pub fn matte(mut self, v: Matte) -> Self {
        self.cfg.matte = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn max_canvas_pixels(mut self, v: u64) -> Self {
        self.cfg.max_canvas_pixels = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> SpriteConfig {
        self.cfg
    }
}
