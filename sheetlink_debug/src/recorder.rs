// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events as
//! fixed-size little-endian records. The engine owns its sink, so the bytes
//! live in a shared buffer reachable through a [`Recording`] handle taken
//! before the sink is installed. [`decode`] reads them back as an iterator
//! of [`RecordedEvent`].

use std::cell::RefCell;
use std::rc::Rc;

use sheetlink_core::host::RootKind;
use sheetlink_core::id::{NodeId, SheetId};
use sheetlink_core::trace::{
    AdoptEvent, FrameEvent, ImportStrippedEvent, MutationBatchEvent, RestyleEvent,
    ScopeStateEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_ADOPT: u8 = 1;
const TAG_RESTYLE: u8 = 2;
const TAG_MUTATION_BATCH: u8 = 3;
const TAG_SCOPE_STATE: u8 = 4;
const TAG_IMPORT_STRIPPED: u8 = 5;
const TAG_FRAME: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// Shared view of the bytes a [`RecorderSink`] has written.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl Recording {
    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Number of bytes recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }
}

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that keeps reading the buffer after the sink has
    /// been boxed and handed to an engine.
    #[must_use]
    pub fn recording(&self) -> Recording {
        Recording {
            buf: Rc::clone(&self.buf),
        }
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&self, v: u8) {
        self.buf.borrow_mut().push(v);
    }

    fn write_u32(&self, v: u32) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&self, v: u64) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_node(&self, n: NodeId) {
        self.write_u32(n.index());
        self.write_u32(n.generation());
    }

    fn write_sheet(&self, s: SheetId) {
        self.write_u32(s.index());
        self.write_u32(s.engine());
    }

    fn write_kind(&self, k: RootKind) {
        self.write_u8(match k {
            RootKind::Document => 0,
            RootKind::ShadowRoot => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_adopt(&mut self, e: &AdoptEvent) {
        self.write_u8(TAG_ADOPT);
        self.write_u64(e.seq);
        self.write_node(e.scope);
        self.write_u32(e.sheets);
        self.write_u32(e.created);
    }

    fn on_restyle(&mut self, e: &RestyleEvent) {
        self.write_u8(TAG_RESTYLE);
        self.write_u64(e.seq);
        self.write_u64(e.frame_index);
        self.write_node(e.scope);
        self.write_sheet(e.sheet);
        self.write_u32(e.replayed);
    }

    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        self.write_u8(TAG_MUTATION_BATCH);
        self.write_u64(e.seq);
        self.write_node(e.scope);
        self.write_u32(e.records);
        self.write_bool(e.repaired);
        self.write_u32(e.connected);
        self.write_u32(e.disconnected);
    }

    fn on_scope_state(&mut self, e: &ScopeStateEvent) {
        self.write_u8(TAG_SCOPE_STATE);
        self.write_u64(e.seq);
        self.write_node(e.scope);
        self.write_kind(e.kind);
        self.write_bool(e.connected);
    }

    fn on_import_stripped(&mut self, e: &ImportStrippedEvent) {
        self.write_u8(TAG_IMPORT_STRIPPED);
        self.write_u64(e.seq);
        self.write_sheet(e.sheet);
        self.write_u32(e.directives);
    }

    fn on_frame(&mut self, e: &FrameEvent) {
        self.write_u8(TAG_FRAME);
        self.write_u64(e.seq);
        self.write_u64(e.frame_index);
        self.write_u32(e.restyled);
        self.write_u32(e.skipped);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// An [`AdoptEvent`].
    Adopt(AdoptEvent),
    /// A [`RestyleEvent`].
    Restyle(RestyleEvent),
    /// A [`MutationBatchEvent`].
    MutationBatch(MutationBatchEvent),
    /// A [`ScopeStateEvent`].
    ScopeState(ScopeStateEvent),
    /// An [`ImportStrippedEvent`].
    ImportStripped(ImportStrippedEvent),
    /// A [`FrameEvent`].
    Frame(FrameEvent),
}

impl RecordedEvent {
    /// Sequence number of the underlying event.
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::Adopt(e) => e.seq,
            Self::Restyle(e) => e.seq,
            Self::MutationBatch(e) => e.seq,
            Self::ScopeState(e) => e.seq,
            Self::ImportStripped(e) => e.seq,
            Self::Frame(e) => e.seq,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_node(&mut self) -> Option<NodeId> {
        Some(NodeId::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_sheet(&mut self) -> Option<SheetId> {
        Some(SheetId::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_kind(&mut self) -> Option<RootKind> {
        Some(match self.read_u8()? {
            0 => RootKind::Document,
            _ => RootKind::ShadowRoot,
        })
    }

    fn decode_adopt(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Adopt(AdoptEvent {
            seq: self.read_u64()?,
            scope: self.read_node()?,
            sheets: self.read_u32()?,
            created: self.read_u32()?,
        }))
    }

    fn decode_restyle(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Restyle(RestyleEvent {
            seq: self.read_u64()?,
            frame_index: self.read_u64()?,
            scope: self.read_node()?,
            sheet: self.read_sheet()?,
            replayed: self.read_u32()?,
        }))
    }

    fn decode_mutation_batch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MutationBatch(MutationBatchEvent {
            seq: self.read_u64()?,
            scope: self.read_node()?,
            records: self.read_u32()?,
            repaired: self.read_bool()?,
            connected: self.read_u32()?,
            disconnected: self.read_u32()?,
        }))
    }

    fn decode_scope_state(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScopeState(ScopeStateEvent {
            seq: self.read_u64()?,
            scope: self.read_node()?,
            kind: self.read_kind()?,
            connected: self.read_bool()?,
        }))
    }

    fn decode_import_stripped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ImportStripped(ImportStrippedEvent {
            seq: self.read_u64()?,
            sheet: self.read_sheet()?,
            directives: self.read_u32()?,
        }))
    }

    fn decode_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Frame(FrameEvent {
            seq: self.read_u64()?,
            frame_index: self.read_u64()?,
            restyled: self.read_u32()?,
            skipped: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_ADOPT => self.decode_adopt(),
            TAG_RESTYLE => self.decode_restyle(),
            TAG_MUTATION_BATCH => self.decode_mutation_batch(),
            TAG_SCOPE_STATE => self.decode_scope_state(),
            TAG_IMPORT_STRIPPED => self.decode_import_stripped(),
            TAG_FRAME => self.decode_frame(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
