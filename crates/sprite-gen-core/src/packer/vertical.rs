use super::StripPacker;
use crate::error::{Result, SpriteError};
use crate::model::{Fragment, Placement};

/// Top-to-bottom stack anchored at `x = 0`, used for repeat-x groups.
///
/// Padding directives are not applied here.
#[derive(Default)]
pub struct VerticalStrip {
    cursor: u32,
    width: u32,
}

impl VerticalStrip {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StripPacker for VerticalStrip {
    fn place(&mut self, fragment: &Fragment) -> Result<Placement> {
        let y = self.cursor;
        self.cursor = y
            .checked_add(fragment.height)
            .ok_or(SpriteError::CanvasOverflow { class: "repeat-x" })?;
        self.width = self.width.max(fragment.width);
        Ok(Placement {
            offset_x: 0,
            offset_y: y,
        })
    }

    fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.cursor)
    }
}
