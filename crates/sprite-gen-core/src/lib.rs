//! Core library for building CSS sprite sheets.
//!
//! - Classifier: the filename suffix (`-n`, `-x`, `-y`, optional `-pl<n>` / `-pr<n>`) picks a repeat class and padding
//! - Layout: no-repeat and repeat-y fragments go on a horizontal strip, repeat-x fragments on a vertical stack
//! - Rendering: one PNG composite per non-empty repeat class, over a transparent or solid matte
//! - Export: a stylesheet positioning each fragment with negated offsets, plus JSON layout metadata
//!
//! Quick example:
//! ```ignore
//! use sprite_gen_core::{SpriteConfig, run};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = SpriteConfig::builder().path("assets/slices").prefix("ui").build();
//! let report = run(cfg)?;
//! println!("wrote {} files", report.written.len());
//! # Ok(()) }
//! ```

pub mod classify;
pub mod collect;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use classify::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_gen_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::classify::{Directive, OutputNames, Padding, RepeatClass, classify_file_name};
    pub use crate::config::{Matte, SortOrder, SpriteConfig, SpriteConfigBuilder};
    pub use crate::model::{
        Fragment, PlacedFragment, Placement, Rect, RepeatGroup, SheetStats, SourceFormat,
        SpriteSheet,
    };
    pub use crate::packer::{StripPacker, layout_group};
    pub use crate::{
        GroupOutcome, GroupRender, RunReport, layout_sheet, plan, render_each, render_sheet, run,
        to_stylesheet,
    };
}
