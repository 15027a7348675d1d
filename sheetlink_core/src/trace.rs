// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls as it reconciles scopes, handles notifications and runs
//! frames. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before stamping a sequence
//! number and dispatching.
//!
//! Human-readable warnings go through the `tracing` crate instead; this
//! module is for structured, per-event instrumentation.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use crate::host::RootKind;
use crate::id::{NodeId, SheetId};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a scope's replicas are placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdoptEvent {
    /// Event sequence number.
    pub seq: u64,
    /// Root of the scope.
    pub scope: NodeId,
    /// Number of unique sheets placed.
    pub sheets: u32,
    /// How many of those needed a new replica node.
    pub created: u32,
}

/// Emitted when a replica's content is recopied from its canonical sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestyleEvent {
    /// Event sequence number.
    pub seq: u64,
    /// Frame counter, or the next frame's when restyled inline.
    pub frame_index: u64,
    /// Root of the scope owning the replica.
    pub scope: NodeId,
    /// The canonical sheet.
    pub sheet: SheetId,
    /// Number of logged operations replayed after the copy.
    pub replayed: u32,
}

/// Emitted after a scope handles one batch of child-list records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutationBatchEvent {
    /// Event sequence number.
    pub seq: u64,
    /// Root of the observing scope.
    pub scope: NodeId,
    /// Number of records in the batch.
    pub records: u32,
    /// Whether a removed replica triggered a re-adopt.
    pub repaired: bool,
    /// Nested scopes connected by this batch.
    pub connected: u32,
    /// Nested scopes disconnected by this batch.
    pub disconnected: u32,
}

/// Emitted when a scope connects or disconnects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeStateEvent {
    /// Event sequence number.
    pub seq: u64,
    /// Root of the scope.
    pub scope: NodeId,
    /// Kind of root.
    pub kind: RootKind,
    /// The new state.
    pub connected: bool,
}

/// Emitted when asynchronous replacement drops `@import` directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportStrippedEvent {
    /// Event sequence number.
    pub seq: u64,
    /// The sheet being replaced.
    pub sheet: SheetId,
    /// Number of directives removed.
    pub directives: u32,
}

/// Emitted at the end of [`Engine::run_frame`](crate::Engine::run_frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameEvent {
    /// Event sequence number.
    pub seq: u64,
    /// Frame counter.
    pub frame_index: u64,
    /// Replicas restyled this frame.
    pub restyled: u32,
    /// Dirty replicas skipped because their scope is disconnected.
    pub skipped: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a scope's replicas are placed.
    fn on_adopt(&mut self, e: &AdoptEvent) {
        _ = e;
    }

    /// Called when a replica is restyled.
    fn on_restyle(&mut self, e: &RestyleEvent) {
        _ = e;
    }

    /// Called after a batch of child-list records is handled.
    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        _ = e;
    }

    /// Called when a scope connects or disconnects.
    fn on_scope_state(&mut self, e: &ScopeStateEvent) {
        _ = e;
    }

    /// Called when `@import` directives are stripped.
    fn on_import_stripped(&mut self, e: &ImportStrippedEvent) {
        _ = e;
    }

    /// Called at the end of each frame.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owning wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// [`new`](Self::new) drops the sink. When **on**, each method checks the
/// inner `Option` (one branch) before dispatching.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
    #[cfg(feature = "trace")]
    seq: u64,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self {
                sink: Some(sink),
                seq: 0,
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None, seq: 0 }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {}
        }
    }

    /// Returns the sink, if one is installed.
    #[cfg(feature = "trace")]
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    #[cfg(feature = "trace")]
    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    /// Emits an [`AdoptEvent`].
    #[inline]
    pub fn adopt(&mut self, scope: NodeId, sheets: u32, created: u32) {
        #[cfg(feature = "trace")]
        if self.sink.is_some() {
            let seq = self.next_seq();
            if let Some(s) = &mut self.sink {
                s.on_adopt(&AdoptEvent {
                    seq,
                    scope,
                    sheets,
                    created,
                });
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (scope, sheets, created);
        }
    }

    /// Emits a [`RestyleEvent`].
    #[inline]
    pub fn restyle(&mut self, frame_index: u64, scope: NodeId, sheet: SheetId, replayed: u32) {
        #[cfg(feature = "trace")]
        if self.sink.is_some() {
            let seq = self.next_seq();
            if let Some(s) = &mut self.sink {
                s.on_restyle(&RestyleEvent {
                    seq,
                    frame_index,
                    scope,
                    sheet,
                    replayed,
                });
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (frame_index, scope, sheet, replayed);
        }
    }

    /// Emits a [`MutationBatchEvent`].
    #[inline]
    pub fn mutation_batch(
        &mut self,
        scope: NodeId,
        records: u32,
        repaired: bool,
        connected: u32,
        disconnected: u32,
    ) {
        #[cfg(feature = "trace")]
        if self.sink.is_some() {
            let seq = self.next_seq();
            if let Some(s) = &mut self.sink {
                s.on_mutation_batch(&MutationBatchEvent {
                    seq,
                    scope,
                    records,
                    repaired,
                    connected,
                    disconnected,
                });
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (scope, records, repaired, connected, disconnected);
        }
    }

    /// Emits a [`ScopeStateEvent`].
    #[inline]
    pub fn scope_state(&mut self, scope: NodeId, kind: RootKind, connected: bool) {
        #[cfg(feature = "trace")]
        if self.sink.is_some() {
            let seq = self.next_seq();
            if let Some(s) = &mut self.sink {
                s.on_scope_state(&ScopeStateEvent {
                    seq,
                    scope,
                    kind,
                    connected,
                });
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (scope, kind, connected);
        }
    }

    /// Emits an [`ImportStrippedEvent`].
    #[inline]
    pub fn import_stripped(&mut self, sheet: SheetId, directives: u32) {
        #[cfg(feature = "trace")]
        if self.sink.is_some() {
            let seq = self.next_seq();
            if let Some(s) = &mut self.sink {
                s.on_import_stripped(&ImportStrippedEvent {
                    seq,
                    sheet,
                    directives,
                });
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (sheet, directives);
        }
    }

    /// Emits a [`FrameEvent`].
    #[inline]
    pub fn frame(&mut self, frame_index: u64, restyled: u32, skipped: u32) {
        #[cfg(feature = "trace")]
        if self.sink.is_some() {
            let seq = self.next_seq();
            if let Some(s) = &mut self.sink {
                s.on_frame(&FrameEvent {
                    seq,
                    frame_index,
                    restyled,
                    skipped,
                });
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (frame_index, restyled, skipped);
        }
    }
}
