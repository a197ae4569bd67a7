//! Line-oriented record source for batch input files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use simclust_core::Record;
use tracing::debug;

/// Read one record per line from `path`.
///
/// Only the line terminator is stripped; interior whitespace stays part of
/// the value. Lines that are empty after trimming are skipped without
/// counting as errors, and indices are assigned densely over the surviving
/// lines. An unopenable file is fatal and fails here, before any lookup is
/// dispatched.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let file =
        File::open(path).with_context(|| format!("opening input file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("reading input file {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(Record::new(records.len(), line));
    }

    debug!(records = records.len(), input = %path.display(), "read input batch");
    Ok(records)
}
