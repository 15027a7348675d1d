// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use crate::id::{INVALID, NodeId};

use super::store::Document;

/// An iterator over the direct children of a node.
///
/// Created by [`Document::children`].
#[derive(Debug)]
pub struct Children<'a> {
    doc: &'a Document,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(doc: &'a Document, first: u32) -> Self {
        Self {
            doc,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.doc.next_sibling[idx as usize];
        self.doc.id_at(idx)
    }
}

/// A pre-order iterator over the descendants of a node.
///
/// Shadow trees are not entered. Created by [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<u32>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(doc: &'a Document, root: NodeId) -> Self {
        let mut stack = Vec::new();
        if doc.is_alive(root) {
            push_children_reversed(doc, root.idx, &mut stack);
        }
        Self { doc, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        push_children_reversed(self.doc, idx, &mut self.stack);
        self.doc.id_at(idx)
    }
}

fn push_children_reversed(doc: &Document, idx: u32, stack: &mut Vec<u32>) {
    let mut child = doc.last_child[idx as usize];
    while child != INVALID {
        stack.push(child);
        child = doc.prev_sibling[child as usize];
    }
}
