//! Archive packaging
//!
//! Collects every transformed image of a batch into one ZIP container that
//! is handed to the download collaborator.

use crate::models::{ArchiveResult, DuplicatePolicy, Workflow, ARCHIVE_CONTENT_TYPE};
use crate::Result;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write each `(name, bytes)` pair as a deflated entry, names verbatim.
///
/// Names must already be unique; see [`resolve_duplicates`].
pub fn build_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Make entry names unique according to `policy`, keeping upload order.
pub fn resolve_duplicates(
    entries: Vec<(String, Vec<u8>)>,
    policy: DuplicatePolicy,
) -> Vec<(String, Vec<u8>)> {
    match policy {
        DuplicatePolicy::Rename => rename_duplicates(entries),
        DuplicatePolicy::Replace => replace_duplicates(entries),
    }
}

fn rename_duplicates(entries: Vec<(String, Vec<u8>)>) -> Vec<(String, Vec<u8>)> {
    // Every incoming name is reserved up front so a generated suffix never
    // shadows a later upload.
    let mut taken: HashSet<String> = entries.iter().map(|(name, _)| name.clone()).collect();
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(entries.len());

    for (name, bytes) in entries {
        if seen.insert(name.clone()) {
            resolved.push((name, bytes));
            continue;
        }

        let (stem, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{}", ext)),
            None => (name.as_str(), String::new()),
        };
        let mut counter = 1;
        let renamed = loop {
            let candidate = format!("{}_{}{}", stem, counter, extension);
            if !taken.contains(&candidate) {
                break candidate;
            }
            counter += 1;
        };

        warn!("Duplicate archive entry {} renamed to {}", name, renamed);
        taken.insert(renamed.clone());
        seen.insert(renamed.clone());
        resolved.push((renamed, bytes));
    }

    resolved
}

fn replace_duplicates(entries: Vec<(String, Vec<u8>)>) -> Vec<(String, Vec<u8>)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut resolved: Vec<(String, Vec<u8>)> = Vec::with_capacity(entries.len());

    for (name, bytes) in entries {
        if let Some(&index) = positions.get(&name) {
            warn!("Duplicate archive entry {} replaces an earlier upload", name);
            resolved[index].1 = bytes;
        } else {
            positions.insert(name.clone(), resolved.len());
            resolved.push((name, bytes));
        }
    }

    resolved
}

/// Package a batch's pending entries. Returns `None` when there is nothing
/// to archive.
pub fn package_batch(
    workflow: Workflow,
    entries: Vec<(String, Vec<u8>)>,
    policy: DuplicatePolicy,
) -> Result<Option<ArchiveResult>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let entries = resolve_duplicates(entries, policy);
    let bytes = build_archive(&entries)?;

    Ok(Some(ArchiveResult {
        file_name: workflow.archive_file_name(),
        content_type: ARCHIVE_CONTENT_TYPE,
        bytes,
        entries: entries.into_iter().map(|(name, _)| name).collect(),
    }))
}
