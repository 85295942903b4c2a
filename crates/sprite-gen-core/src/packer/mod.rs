use crate::classify::RepeatClass;
use crate::error::Result;
use crate::model::{Fragment, PlacedFragment, Placement, RepeatGroup};

pub mod horizontal;
pub mod vertical;

pub use horizontal::HorizontalStrip;
pub use vertical::VerticalStrip;

/// A packer places fragments one after another along a single axis.
///
/// Implementations must never produce overlapping rectangles, and
/// `canvas_size` must be the tight bounding box of everything placed so far
/// (plus explicit padding).
pub trait StripPacker {
    fn place(&mut self, fragment: &Fragment) -> Result<Placement>;
    fn canvas_size(&self) -> (u32, u32);
}

/// Strip packer used for a repeat class: no-repeat and repeat-y fragments sit
/// side by side, repeat-x fragments are stacked.
pub fn packer_for(class: RepeatClass) -> Box<dyn StripPacker> {
    match class {
        RepeatClass::NoRepeat | RepeatClass::RepeatY => Box::new(HorizontalStrip::new(class)),
        RepeatClass::RepeatX => Box::new(VerticalStrip::new()),
    }
}

/// Lays out `fragments` in the given order. An empty list yields a 0x0 group.
pub fn layout_group(class: RepeatClass, fragments: Vec<Fragment>) -> Result<RepeatGroup> {
    let mut packer = packer_for(class);
    let mut items = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        debug_assert_eq!(fragment.class(), class, "fragment in the wrong group");
        let placement = packer.place(&fragment)?;
        items.push(PlacedFragment {
            fragment,
            placement,
        });
    }
    let (width, height) = packer.canvas_size();
    Ok(RepeatGroup {
        class,
        items,
        width,
        height,
    })
}
