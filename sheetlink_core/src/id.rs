// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node, sheet, and subscription identity types.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a host tree.
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and its slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    /// Slot index into the host's storage.
    pub(crate) idx: u32,
    /// Generation counter; must match the host's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Creates a handle from raw parts.
    ///
    /// Hosts other than [`Document`](crate::dom::Document) use this to mint
    /// handles for their own storage.
    #[inline]
    #[must_use]
    pub const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// A handle to a canonical stylesheet owned by an [`Engine`](crate::Engine).
///
/// The `engine` tag identifies the engine that minted the handle; a handle
/// presented to any other engine is rejected as an illegal invocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SheetId {
    pub(crate) idx: u32,
    pub(crate) engine: u32,
}

impl SheetId {
    /// Creates a handle from raw parts (for decoding recorded traces).
    #[inline]
    #[must_use]
    pub const fn new(idx: u32, engine: u32) -> Self {
        Self { idx, engine }
    }

    /// Returns the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the tag of the engine that minted this handle.
    #[inline]
    #[must_use]
    pub const fn engine(self) -> u32 {
        self.engine
    }
}

impl fmt::Debug for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SheetId({}@engine{})", self.idx, self.engine)
    }
}

/// An opaque handle to a child-list subscription registered with
/// [`Host::observe`](crate::host::Host::observe).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u32);

impl fmt::Debug for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WatchId({})", self.0)
    }
}
