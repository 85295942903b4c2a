use image::ImageReader;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::{Directive, OutputNames, RepeatClass, classify_file_name};
use crate::config::SortOrder;
use crate::error::{DecodeError, Result, SpriteError};
use crate::model::{Fragment, SourceFormat};

/// A directory entry whose name passed the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub file_name: String,
    pub path: PathBuf,
    pub directive: Directive,
}

/// Lists classified fragments directly inside `dir` (non-recursive), in
/// directory enumeration order.
///
/// A directory that exists but cannot be read is an I/O error, not an empty
/// listing.
pub fn scan_dir(dir: &Path, names: &OutputNames) -> Result<Vec<Candidate>> {
    if !dir.is_dir() {
        return Err(SpriteError::PathNotFound(dir.to_path_buf()));
    }
    let mut list = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            // the directory itself could not be listed
            Err(e) if e.depth() == 0 => return Err(SpriteError::Io(e.into())),
            Err(e) => {
                warn!(error = %e, "skip unreadable directory entry");
                continue;
            }
        };
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            debug!(?p, "skip non UTF-8 file name");
            continue;
        };
        match classify_file_name(file_name, names) {
            Some(directive) => list.push(Candidate {
                file_name: file_name.to_string(),
                path: p.to_path_buf(),
                directive,
            }),
            None => debug!(file_name, "not a fragment"),
        }
    }
    Ok(list)
}

/// Reads just enough of `candidate` to learn its size and format.
pub fn probe_fragment(candidate: &Candidate) -> std::result::Result<Fragment, DecodeError> {
    let path = &candidate.path;
    let open_err = |source| DecodeError::Open {
        path: path.clone(),
        source,
    };
    let file_size = fs::metadata(path).map_err(open_err)?.len();
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(open_err)?;
    let format = reader
        .format()
        .and_then(SourceFormat::from_image_format)
        .ok_or_else(|| DecodeError::Unsupported { path: path.clone() })?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|source| DecodeError::Header {
            path: path.clone(),
            source,
        })?;
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty {
            path: path.clone(),
            width,
            height,
        });
    }
    Ok(Fragment {
        file_name: candidate.file_name.clone(),
        directive: candidate.directive,
        width,
        height,
        format,
        file_size,
    })
}

/// Probes every candidate, dropping (and logging) the ones that fail.
pub fn collect_fragments(candidates: &[Candidate]) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(candidates.len());
    for c in candidates {
        match probe_fragment(c) {
            Ok(f) => out.push(f),
            Err(e) => warn!(file = %c.file_name, error = %e, "skip fragment"),
        }
    }
    out
}

/// Splits fragments into one list per repeat class, in `RepeatClass::ALL`
/// order, each sorted per `order`. Sorting is stable.
pub fn group_fragments(
    fragments: Vec<Fragment>,
    order: SortOrder,
) -> Vec<(RepeatClass, Vec<Fragment>)> {
    let mut groups: Vec<(RepeatClass, Vec<Fragment>)> =
        RepeatClass::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for f in fragments {
        if let Some((_, list)) = groups.iter_mut().find(|(c, _)| *c == f.class()) {
            list.push(f);
        }
    }
    match order {
        SortOrder::None => {}
        SortOrder::NameAsc => {
            for (_, list) in &mut groups {
                list.sort_by(|a, b| a.file_name.cmp(&b.file_name));
            }
        }
    }
    groups
}
