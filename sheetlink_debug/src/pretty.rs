// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use sheetlink_core::id::NodeId;
use sheetlink_core::trace::{
    AdoptEvent, FrameEvent, ImportStrippedEvent, MutationBatchEvent, RestyleEvent,
    ScopeStateEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Compact `index.generation` form for node handles.
struct Node(NodeId);

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0.index(), self.0.generation())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_adopt(&mut self, e: &AdoptEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [adopt] scope={} sheets={} created={}",
            e.seq,
            Node(e.scope),
            e.sheets,
            e.created,
        );
    }

    fn on_restyle(&mut self, e: &RestyleEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [restyle] frame={} scope={} sheet={} replayed={}",
            e.seq,
            e.frame_index,
            Node(e.scope),
            e.sheet.index(),
            e.replayed,
        );
    }

    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        let repaired = if e.repaired { " REPAIRED" } else { "" };
        let _ = writeln!(
            self.writer,
            "#{} [mutations] scope={} records={} +{} -{}{repaired}",
            e.seq,
            Node(e.scope),
            e.records,
            e.connected,
            e.disconnected,
        );
    }

    fn on_scope_state(&mut self, e: &ScopeStateEvent) {
        let state = if e.connected { "connected" } else { "disconnected" };
        let _ = writeln!(
            self.writer,
            "#{} [scope] {} {} {state}",
            e.seq,
            e.kind,
            Node(e.scope),
        );
    }

    fn on_import_stripped(&mut self, e: &ImportStrippedEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [import] sheet={} dropped={}",
            e.seq,
            e.sheet.index(),
            e.directives,
        );
    }

    fn on_frame(&mut self, e: &FrameEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [frame] frame={} restyled={} skipped={}",
            e.seq, e.frame_index, e.restyled, e.skipped,
        );
    }
}
