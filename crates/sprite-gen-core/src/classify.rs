//! Filename grammar for sprite fragments.
//!
//! A fragment's repeat class and padding live in the tail of its file stem:
//!
//! ```text
//! border-bottom-left-n.png      no-repeat
//! border-bottom-x.png           repeat-x
//! border-right-y-pl300.png      repeat-y, 300px left padding
//! icon-n-pr5-pl2.gif            no-repeat, 2px left / 5px right padding
//! ```
//!
//! Matching is case-insensitive. Anything that does not end in such a suffix
//! is not a fragment and is skipped without error.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;

/// Extensions considered at all (compared case-insensitively).
pub const FRAGMENT_EXTENSIONS: [&str; 4] = ["png", "gif", "jpg", "jpeg"];

static SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)-([nxy])(?:-pl(\d+)(?:-pr(\d+))?|-pr(\d+)(?:-pl(\d+))?)?$")
        .expect("fragment suffix pattern is valid")
});

/// Tiling behavior of a fragment, which also selects its composite and layout axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatClass {
    NoRepeat,
    RepeatX,
    RepeatY,
}

impl RepeatClass {
    /// Output order of the groups: composites, stylesheet sections and reports.
    pub const ALL: [RepeatClass; 3] = [
        RepeatClass::NoRepeat,
        RepeatClass::RepeatY,
        RepeatClass::RepeatX,
    ];

    /// CSS `background-repeat` keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            RepeatClass::NoRepeat => "no-repeat",
            RepeatClass::RepeatX => "repeat-x",
            RepeatClass::RepeatY => "repeat-y",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "n" => Some(RepeatClass::NoRepeat),
            "x" => Some(RepeatClass::RepeatX),
            "y" => Some(RepeatClass::RepeatY),
            _ => None,
        }
    }
}

impl fmt::Display for RepeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Horizontal padding (pixels) requested through `-pl<n>` / `-pr<n>`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub right: u32,
}

impl Padding {
    pub fn new(left: u32, right: u32) -> Self {
        Self { left, right }
    }
}

/// Parsed filename suffix: the repeat class plus its padding directives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "class", rename_all = "kebab-case")]
pub enum Directive {
    NoRepeat(Padding),
    /// Padding is parsed but the vertical strip layout does not apply it.
    RepeatX(Padding),
    RepeatY(Padding),
}

impl Directive {
    pub fn new(class: RepeatClass, padding: Padding) -> Self {
        match class {
            RepeatClass::NoRepeat => Directive::NoRepeat(padding),
            RepeatClass::RepeatX => Directive::RepeatX(padding),
            RepeatClass::RepeatY => Directive::RepeatY(padding),
        }
    }

    pub fn class(&self) -> RepeatClass {
        match self {
            Directive::NoRepeat(_) => RepeatClass::NoRepeat,
            Directive::RepeatX(_) => RepeatClass::RepeatX,
            Directive::RepeatY(_) => RepeatClass::RepeatY,
        }
    }

    pub fn padding(&self) -> Padding {
        match *self {
            Directive::NoRepeat(p) | Directive::RepeatX(p) | Directive::RepeatY(p) => p,
        }
    }
}

/// File names of the generated artifacts for a given prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputNames {
    pub no_repeat: String,
    pub repeat_x: String,
    pub repeat_y: String,
    pub stylesheet: String,
}

impl OutputNames {
    pub fn new(prefix: &str) -> Self {
        Self {
            no_repeat: format!("{prefix}.png"),
            repeat_x: format!("{prefix}-x.png"),
            repeat_y: format!("{prefix}-y.png"),
            stylesheet: format!("{prefix}.css"),
        }
    }

    /// Composite image file for a repeat class.
    pub fn composite(&self, class: RepeatClass) -> &str {
        match class {
            RepeatClass::NoRepeat => &self.no_repeat,
            RepeatClass::RepeatX => &self.repeat_x,
            RepeatClass::RepeatY => &self.repeat_y,
        }
    }

    /// True for the composites this run (or an earlier one) writes.
    pub fn is_composite(&self, file_name: &str) -> bool {
        RepeatClass::ALL
            .iter()
            .any(|c| self.composite(*c).eq_ignore_ascii_case(file_name))
    }
}

/// Classifies a directory entry by name.
///
/// Returns `None` when the extension is not an image extension, when the name
/// is one of our own composites, or when the stem has no valid suffix.
pub fn classify_file_name(file_name: &str, outputs: &OutputNames) -> Option<Directive> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !FRAGMENT_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
    {
        return None;
    }
    if outputs.is_composite(file_name) {
        return None;
    }
    parse_suffix(stem)
}

/// Matches the repeat/padding suffix of a file stem (no extension).
pub fn parse_suffix(stem: &str) -> Option<Directive> {
    let caps = SUFFIX.captures(stem)?;
    let class = RepeatClass::from_tag(caps.get(1)?.as_str())?;
    // groups 2/3 hold `-pl..-pr..`, groups 4/5 hold `-pr..-pl..`
    // digits overflowing u32 reject the whole name
    let left = digits(&caps, 2)
        .or_else(|| digits(&caps, 5))
        .transpose()
        .ok()?
        .unwrap_or(0);
    let right = digits(&caps, 3)
        .or_else(|| digits(&caps, 4))
        .transpose()
        .ok()?
        .unwrap_or(0);
    Some(Directive::new(class, Padding::new(left, right)))
}

fn digits(caps: &Captures<'_>, group: usize) -> Option<Result<u32, ParseIntError>> {
    caps.get(group).map(|m| m.as_str().parse::<u32>())
}
