use image::RgbaImage;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, instrument};

use crate::classify::{OutputNames, RepeatClass};
use crate::collect::{collect_fragments, group_fragments, scan_dir};
use crate::compositing::{render_group, save_png};
use crate::config::{SortOrder, SpriteConfig};
use crate::error::{Result, SpriteError};
use crate::export::to_stylesheet;
use crate::model::{Fragment, RepeatGroup, SpriteSheet};
use crate::packer::layout_group;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of rendering one repeat group.
pub enum GroupOutcome {
    /// Group has no fragments; nothing is rendered or written.
    Empty,
    Rendered(RgbaImage),
    /// A fragment failed to decode or the canvas was over the limit.
    Failed(SpriteError),
}

pub struct GroupRender {
    pub class: RepeatClass,
    pub outcome: GroupOutcome,
}

/// What a full run produced.
#[derive(Debug)]
pub struct RunReport {
    pub sheet: SpriteSheet,
    pub stylesheet: String,
    /// Files written, composites first, stylesheet last.
    pub written: Vec<PathBuf>,
    /// Composites that could not be rendered, with the reason.
    pub failed: Vec<(RepeatClass, String)>,
}

/// Lays out already-probed fragments: groups them by class, orders each group
/// and runs its strip packer.
pub fn layout_sheet(
    fragments: Vec<Fragment>,
    names: OutputNames,
    order: SortOrder,
) -> Result<SpriteSheet> {
    let groups = group_fragments(fragments, order)
        .into_iter()
        .map(|(class, list)| layout_group(class, list))
        .collect::<Result<Vec<RepeatGroup>>>()?;
    Ok(SpriteSheet { names, groups })
}

#[instrument(skip_all, fields(path = %cfg.path.display()))]
/// Scans, classifies, probes and lays out the fragments under `cfg.path`.
///
/// No files are touched. Fails when the path is missing or when no fragment
/// survives probing.
pub fn plan(cfg: &SpriteConfig) -> Result<SpriteSheet> {
    cfg.validate()?;
    let names = OutputNames::new(&cfg.prefix);
    let candidates = scan_dir(&cfg.path, &names)?;
    let fragments = collect_fragments(&candidates);
    info!(
        candidates = candidates.len(),
        fragments = fragments.len(),
        "collected fragments"
    );
    if fragments.is_empty() {
        return Err(SpriteError::NoFragments);
    }
    let sheet = layout_sheet(fragments, names, cfg.sort_order)?;
    for g in &sheet.groups {
        info!(class = %g.class, count = g.items.len(), width = g.width, height = g.height, "layout");
    }
    Ok(sheet)
}

fn render_one(g: &RepeatGroup, cfg: &SpriteConfig) -> GroupRender {
    let outcome = if g.is_empty() {
        GroupOutcome::Empty
    } else {
        match render_group(g, &cfg.path, cfg.matte, cfg.max_canvas_pixels) {
            Ok(canvas) => GroupOutcome::Rendered(canvas),
            Err(e) => GroupOutcome::Failed(e),
        }
    };
    GroupRender {
        class: g.class,
        outcome,
    }
}

/// Renders every group of `sheet` from the fragments in `cfg.path` and keeps
/// all the canvases.
///
/// Groups are independent; one failing does not affect the others. Up to three
/// canvases are alive at once; with `cfg.parallel` they are also rendered at
/// the same time.
pub fn render_sheet(sheet: &SpriteSheet, cfg: &SpriteConfig) -> Vec<GroupRender> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return sheet.groups.par_iter().map(|g| render_one(g, cfg)).collect();
        }
    }

    sheet.groups.iter().map(|g| render_one(g, cfg)).collect()
}

/// Renders the groups in sheet order and hands each result to `sink` as soon
/// as it is ready.
///
/// Sequentially, a group is rendered only after `sink` returned for the
/// previous one, so at most one canvas is alive. With `cfg.parallel` the whole
/// sheet is rendered first (three canvases at peak) and then drained into
/// `sink`. The first error returned by `sink` stops the loop.
pub fn render_each<F>(sheet: &SpriteSheet, cfg: &SpriteConfig, mut sink: F) -> Result<()>
where
    F: FnMut(GroupRender) -> Result<()>,
{
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            for render in render_sheet(sheet, cfg) {
                sink(render)?;
            }
            return Ok(());
        }
    }

    for g in &sheet.groups {
        sink(render_one(g, cfg))?;
    }
    Ok(())
}

#[instrument(skip_all)]
/// Runs the whole pipeline and writes the composites and the stylesheet into
/// `cfg.path`.
///
/// Configuration problems and write failures abort the run. A composite that
/// fails to render is skipped and reported; its stylesheet rules are still
/// emitted.
pub fn run(cfg: SpriteConfig) -> Result<RunReport> {
    let sheet = plan(&cfg)?;
    let stylesheet = to_stylesheet(&sheet);

    let mut written = Vec::new();
    let mut failed = Vec::new();
    render_each(&sheet, &cfg, |render| {
        let name = sheet.names.composite(render.class);
        match render.outcome {
            GroupOutcome::Empty => {}
            GroupOutcome::Rendered(canvas) => {
                let png_path = cfg.path.join(name);
                save_png(&canvas, cfg.matte, &png_path)?;
                info!(?png_path, "wrote composite");
                written.push(png_path);
            }
            GroupOutcome::Failed(e) => {
                error!(class = %render.class, image = name, error = %e, "composite not written");
                failed.push((render.class, e.to_string()));
            }
        }
        Ok(())
    })?;

    let css_path = cfg.path.join(&sheet.names.stylesheet);
    fs::write(&css_path, &stylesheet)?;
    info!(?css_path, "wrote stylesheet");
    written.push(css_path);

    info!("{}", sheet.stats().summary());
    Ok(RunReport {
        sheet,
        stylesheet,
        written,
        failed,
    })
}
