#![forbid(unsafe_code)]

//! JSONL step traces.
//!
//! One JSON object per line. Step lines carry a 1-based `seq`, the
//! algorithm, and the event; the last line is the run summary:
//!
//! ```text
//! {"record":"step","seq":1,"algorithm":"bubble","event":{"kind":"compare","i":0,"j":1}}
//! {"record":"step","seq":2,"algorithm":"bubble","event":{"kind":"swap","i":0,"j":1}}
//! {"record":"summary","algorithm":"bubble","state":"completed",...}
//! ```

use std::io::{self, Write};

use serde::Serialize;
use sortscope_core::{Algorithm, StepEvent};

use crate::app::Summary;

/// A single trace line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum TraceRecord {
    Step {
        seq: u64,
        algorithm: Algorithm,
        event: StepEvent,
    },
    Summary(Summary),
}

impl TraceRecord {
    /// Convert to one JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> io::Result<String> {
        serde_json::to_string(self).map_err(io::Error::from)
    }
}

/// Streams trace records to a writer.
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    writer: W,
    algorithm: Algorithm,
    seq: u64,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W, algorithm: Algorithm) -> Self {
        Self {
            writer,
            algorithm,
            seq: 0,
        }
    }

    /// Records written so far, excluding the summary.
    pub fn len(&self) -> u64 {
        self.seq
    }

    pub fn is_empty(&self) -> bool {
        self.seq == 0
    }

    pub fn record(&mut self, event: StepEvent) -> io::Result<()> {
        self.seq += 1;
        let record = TraceRecord::Step {
            seq: self.seq,
            algorithm: self.algorithm,
            event,
        };
        self.write(&record)
    }

    /// Write the summary line, flush, and hand the writer back.
    pub fn finish(mut self, summary: &Summary) -> io::Result<W> {
        self.write(&TraceRecord::Summary(summary.clone()))?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write(&mut self, record: &TraceRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record.to_jsonl()?)
    }
}
