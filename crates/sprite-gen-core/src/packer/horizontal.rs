use super::StripPacker;
use crate::classify::RepeatClass;
use crate::error::{Result, SpriteError};
use crate::model::{Fragment, Placement};

/// Left-to-right strip anchored at `y = 0`, honoring left/right padding.
///
/// Used for no-repeat and repeat-y groups. Canvas width is the running cursor,
/// canvas height the tallest fragment.
pub struct HorizontalStrip {
    class: RepeatClass,
    cursor: u32,
    height: u32,
}

impl HorizontalStrip {
    pub fn new(class: RepeatClass) -> Self {
        Self {
            class,
            cursor: 0,
            height: 0,
        }
    }

    fn advance(&self, from: u32, by: u32) -> Result<u32> {
        from.checked_add(by).ok_or(SpriteError::CanvasOverflow {
            class: self.class.keyword(),
        })
    }
}

impl StripPacker for HorizontalStrip {
    fn place(&mut self, fragment: &Fragment) -> Result<Placement> {
        let padding = fragment.padding();
        let x = self.advance(self.cursor, padding.left)?;
        let end = self.advance(x, fragment.width)?;
        self.cursor = self.advance(end, padding.right)?;
        self.height = self.height.max(fragment.height);
        Ok(Placement {
            offset_x: x,
            offset_y: 0,
        })
    }

    fn canvas_size(&self) -> (u32, u32) {
        (self.cursor, self.height)
    }
}
