// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested scope discovery.
//!
//! [`scope_roots`] walks a subtree in tree order with an explicit stack and
//! yields every element that hosts a shadow root, at any depth. The walk
//! stays in the tree it starts in: shadow trees it finds are reported, not
//! entered. Each connected scope runs its own discovery over its container.

use alloc::vec::Vec;

use crate::host::Host;
use crate::id::NodeId;

/// Lazy pre-order walk yielding `(host element, shadow root)` pairs.
///
/// Created by [`scope_roots`]. Not restartable; the host must not change
/// while the walk is in progress.
#[derive(Debug)]
pub struct ScopeRoots<'a, H: Host + ?Sized> {
    host: &'a H,
    stack: Vec<NodeId>,
}

/// Starts a discovery walk at `start`, which is itself visited.
pub fn scope_roots<H: Host + ?Sized>(host: &H, start: NodeId) -> ScopeRoots<'_, H> {
    let stack = if host.contains(start) {
        alloc::vec![start]
    } else {
        Vec::new()
    };
    ScopeRoots { host, stack }
}

impl<H: Host + ?Sized> Iterator for ScopeRoots<'_, H> {
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // Push children in reverse so the first child is visited next.
            let mark = self.stack.len();
            let mut child = self.host.first_child(node);
            while let Some(c) = child {
                self.stack.push(c);
                child = self.host.next_sibling(c);
            }
            self.stack[mark..].reverse();

            if !self.host.is_element(node) {
                continue;
            }
            if let Some(root) = self.host.shadow_root_of(node) {
                return Some((node, root));
            }
        }
        None
    }
}
