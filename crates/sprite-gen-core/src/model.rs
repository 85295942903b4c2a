use serde::{Deserialize, Serialize};

use crate::classify::{Directive, OutputNames, Padding, RepeatClass};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }
    /// True if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        (self.x as u64) < other.right()
            && (other.x as u64) < self.right()
            && (self.y as u64) < other.bottom()
            && (other.y as u64) < self.bottom()
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Raster format detected from file content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Png,
    Gif,
    Jpeg,
}

impl SourceFormat {
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(SourceFormat::Png),
            image::ImageFormat::Gif => Some(SourceFormat::Gif),
            image::ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            _ => None,
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::Gif => image::ImageFormat::Gif,
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// One source image destined for a composite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    /// File name within the scanned directory (unique there).
    pub file_name: String,
    pub directive: Directive,
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
    /// Bytes on disk. Informational only.
    pub file_size: u64,
}

impl Fragment {
    pub fn class(&self) -> RepeatClass {
        self.directive.class()
    }
    pub fn padding(&self) -> Padding {
        self.directive.padding()
    }
}

/// Top-left corner of a fragment inside its composite.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub offset_x: u32,
    pub offset_y: u32,
}

/// A fragment together with the placement the layout engine gave it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedFragment {
    pub fragment: Fragment,
    pub placement: Placement,
}

impl PlacedFragment {
    /// Rectangle occupied by the fragment's native pixels.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.placement.offset_x,
            self.placement.offset_y,
            self.fragment.width,
            self.fragment.height,
        )
    }
}

/// All fragments of one repeat class, laid out, plus the canvas bounding them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepeatGroup {
    pub class: RepeatClass,
    pub items: Vec<PlacedFragment>,
    pub width: u32,
    pub height: u32,
}

impl RepeatGroup {
    pub fn empty(class: RepeatClass) -> Self {
        Self {
            class,
            items: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rectangle the renderer fills for an item. Repeat-x fragments span the
    /// full canvas width, repeat-y fragments the full canvas height.
    pub fn target_rect(&self, item: &PlacedFragment) -> Rect {
        let r = item.rect();
        match self.class {
            RepeatClass::NoRepeat => r,
            RepeatClass::RepeatX => Rect::new(0, r.y, self.width, r.h),
            RepeatClass::RepeatY => Rect::new(r.x, 0, r.w, self.height),
        }
    }
}

/// The three laid-out groups of one run, in output order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub names: OutputNames,
    pub groups: Vec<RepeatGroup>,
}

/// Statistics about sheet efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetStats {
    /// Number of non-empty groups, i.e. composites to render.
    pub num_composites: usize,
    pub num_fragments: usize,
    /// Sum of canvas areas.
    pub total_canvas_area: u64,
    /// Sum of native fragment areas.
    pub used_fragment_area: u64,
    /// used_fragment_area / total_canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl SpriteSheet {
    pub fn group(&self, class: RepeatClass) -> Option<&RepeatGroup> {
        self.groups.iter().find(|g| g.class == class)
    }

    pub fn num_fragments(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn stats(&self) -> SheetStats {
        let mut num_composites = 0;
        let mut total_canvas_area = 0u64;
        let mut used_fragment_area = 0u64;
        for g in self.groups.iter().filter(|g| !g.is_empty()) {
            num_composites += 1;
            total_canvas_area += g.width as u64 * g.height as u64;
            used_fragment_area += g.items.iter().map(|i| i.rect().area()).sum::<u64>();
        }
        let occupancy = if total_canvas_area > 0 {
            used_fragment_area as f64 / total_canvas_area as f64
        } else {
            0.0
        };
        SheetStats {
            num_composites,
            num_fragments: self.num_fragments(),
            total_canvas_area,
            used_fragment_area,
            occupancy,
        }
    }
}

impl SheetStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Composites: {}, Fragments: {}, Occupancy: {:.2}%, Canvas Area: {} px², Used Area: {} px²",
            self.num_composites,
            self.num_fragments,
            self.occupancy * 100.0,
            self.total_canvas_area,
            self.used_fragment_area,
        )
    }
}
