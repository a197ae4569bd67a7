//! Output sinks for enriched batches.
//!
//! Both sinks consume the full resolution sequence in batch order and write
//! to any `io::Write`, so tests capture bytes instead of console text.

use std::io::Write;

use simclust_core::{Resolution, cluster, cluster_strict};

/// Where an enriched batch ends up.
pub trait OutputSink {
    fn write(&mut self, resolutions: &[Resolution]) -> anyhow::Result<()>;
}

/// One CSV row per record: `(value, key)`. Failed lookups keep their row
/// with a blank key, so row count always equals record count. Values with
/// delimiters or quotes get standard CSV quoting.
pub struct FullDumpSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> FullDumpSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }
}

impl<W: Write> OutputSink for FullDumpSink<W> {
    fn write(&mut self, resolutions: &[Resolution]) -> anyhow::Result<()> {
        for r in resolutions {
            self.writer
                .write_record([r.record.value.as_str(), r.key_or_empty()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// The duplicate report: each cluster's members as `value,key` lines, with a
/// single blank line between clusters, no header, no trailing separator.
/// Zero clusters writes nothing, which is a valid outcome.
pub struct ClusterReportSink<W: Write> {
    out: W,
    require_success: bool,
}

impl<W: Write> ClusterReportSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            require_success: false,
        }
    }

    /// Restrict clustering to lookups that returned the success result code.
    pub fn require_success(mut self, yes: bool) -> Self {
        self.require_success = yes;
        self
    }
}

impl<W: Write> OutputSink for ClusterReportSink<W> {
    fn write(&mut self, resolutions: &[Resolution]) -> anyhow::Result<()> {
        let clusters = if self.require_success {
            cluster_strict(resolutions)
        } else {
            cluster(resolutions)
        };

        for (i, c) in clusters.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            for m in &c.members {
                writeln!(self.out, "{},{}", m.record.value, c.key)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
