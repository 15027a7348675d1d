// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory reference host.
//!
//! [`Document`] is a small element tree with the pieces the engine relies
//! on: open and closed shadow roots, style elements with rule lists,
//! fragments, subtree subscriptions and a frame-request flag. It is used by
//! the crate's tests and is a reasonable starting point for hosts that keep
//! their own tree in memory.
//!
//! Unlike a browser, nothing happens on its own: records queue until the
//! engine drains them through
//! [`Engine::deliver_mutations`](crate::Engine::deliver_mutations), and
//! [`Document::take_frame_request`] tells the caller when to run
//! [`Engine::run_frame`](crate::Engine::run_frame).

mod observe;
mod store;
mod style;
mod traverse;

pub use store::{Document, NodeKind, ReadyState, ShadowMode};
pub use traverse::{Children, Descendants};

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::HostError;
use crate::host::{Host, MutationRecord, RootKind};
use crate::id::{NodeId, WatchId};
use crate::rule::RuleOp;

impl Host for Document {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn document(&self) -> NodeId {
        self.root
    }

    fn is_ready(&self) -> bool {
        self.ready == ReadyState::Complete
    }

    fn root_kind(&self, node: NodeId) -> Option<RootKind> {
        match self.kind(node)? {
            NodeKind::Document => Some(RootKind::Document),
            NodeKind::ShadowRoot(_) => Some(RootKind::ShadowRoot),
            _ => None,
        }
    }

    fn adopter_container(&self, root: NodeId) -> Option<NodeId> {
        match self.root_kind(root)? {
            RootKind::Document => self.is_alive(self.body).then_some(self.body),
            RootKind::ShadowRoot => Some(root),
        }
    }

    fn shadow_root_of(&self, element: NodeId) -> Option<NodeId> {
        self.attached_shadow(element)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        Self::is_connected(self, node)
    }

    fn contains(&self, node: NodeId) -> bool {
        Self::is_alive(self, node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Element)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).next()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        if !Self::is_alive(self, node) {
            return None;
        }
        self.id_at(self.next_sibling[node.idx as usize])
    }

    fn create_style(&mut self) -> NodeId {
        self.create_element("style")
    }

    fn create_fragment(&mut self) -> NodeId {
        Self::create_fragment(self)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        Self::append_child(self, parent, child)
    }

    fn remove(&mut self, node: NodeId) -> Result<(), HostError> {
        Self::remove(self, node)
    }

    fn destroy(&mut self, node: NodeId) {
        Self::destroy(self, node);
    }

    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        Self::set_style_text(self, node, text)
    }

    fn rules(&self, node: NodeId) -> Result<&[String], HostError> {
        self.check(node)?;
        Self::rules(self, node).ok_or(HostError::NotAStyle(node))
    }

    fn apply_rule(&mut self, node: NodeId, op: &RuleOp) -> Result<usize, HostError> {
        self.check(node)?;
        match &mut self.rules[node.idx as usize] {
            Some(rules) => rules.apply(op),
            None => Err(HostError::NotAStyle(node)),
        }
    }

    fn observe(&mut self, target: NodeId) -> WatchId {
        Self::observe(self, target)
    }

    fn unobserve(&mut self, watch: WatchId) {
        Self::unobserve(self, watch);
    }

    fn take_records(&mut self, watch: WatchId) -> Vec<MutationRecord> {
        Self::take_records(self, watch)
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }
}
