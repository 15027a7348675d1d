// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for tree integrations.
//!
//! The engine never owns the tree it styles. Everything it needs from the
//! surrounding environment goes through [`Host`]:
//!
//! - **Tree**: Node creation, ordered insertion, removal and sibling
//!   enumeration. Appending a fragment moves its children as one ordered
//!   batch, which is how the reconciler re-linearizes replicas in one step.
//!
//! - **Roots**: The document root, nested shadow roots (including closed
//!   ones, which client code cannot reach), the container each root hosts
//!   replicas in, and a reachability predicate.
//!
//! - **Style content**: Replacing a style node's text and applying
//!   [`RuleOp`]s to its rule list. Parsing stays on the host side.
//!
//! - **Notifications**: Child-list subscriptions over a subtree. Records
//!   queue on the host until the engine drains them with
//!   [`take_records`](Host::take_records); dropping a subscription discards
//!   anything undelivered.
//!
//! - **Scheduling**: [`request_frame`](Host::request_frame) asks the host to
//!   call [`Engine::run_frame`](crate::Engine::run_frame) at its next frame
//!   boundary.
//!
//! # Event loop pseudocode
//!
//! ```rust,ignore
//! fn on_idle(host: &mut MyHost, engine: &mut Engine) {
//!     // Notifications: repair removed replicas, connect added scopes.
//!     engine.deliver_mutations(host)?;
//! }
//!
//! fn on_frame(host: &mut MyHost, engine: &mut Engine) {
//!     // Deferred restyles: copy canonical content, replay the rule log.
//!     engine.run_frame(host)?;
//! }
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::HostError;
use crate::id::{NodeId, WatchId};
use crate::rule::RuleOp;

/// Which kind of tree root a scope is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// The document root. Its replicas live in the document body.
    Document,
    /// A shadow root attached to an element. Its replicas live directly in
    /// the shadow root.
    ShadowRoot,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "Document",
            Self::ShadowRoot => "ShadowRoot",
        })
    }
}

/// One child-list change delivered by a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    /// The node whose child list changed.
    pub target: NodeId,
    /// Nodes inserted into `target`, in order.
    pub added: Vec<NodeId>,
    /// Nodes removed from `target`, in order.
    pub removed: Vec<NodeId>,
}

/// The surrounding tree, as seen by the engine.
///
/// Read-only queries must tolerate stale handles (returning `None` or
/// `false`); mutating calls report them as [`HostError::StaleNode`].
pub trait Host {
    /// Whether the environment is still alive. Once this returns `false` the
    /// engine drops its subscriptions and ignores further work.
    fn is_alive(&self) -> bool;

    /// Returns the document root.
    fn document(&self) -> NodeId;

    /// Whether the document has finished loading its initial tree.
    fn is_ready(&self) -> bool;

    /// Returns the kind of root `node` is, or `None` if it is not a root.
    fn root_kind(&self, node: NodeId) -> Option<RootKind>;

    /// Returns the node replicas for `root` are inserted into.
    fn adopter_container(&self, root: NodeId) -> Option<NodeId>;

    /// Returns the shadow root attached to `element`, whatever its mode.
    fn shadow_root_of(&self, element: NodeId) -> Option<NodeId>;

    /// Whether `node` is reachable from the document, crossing shadow
    /// boundaries through their host elements.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Whether `node` still refers to a live node.
    fn contains(&self, node: NodeId) -> bool;

    /// Whether `node` is an element.
    fn is_element(&self, node: NodeId) -> bool;

    /// Returns the parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the first child of `node`.
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the next sibling of `node`.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Creates a detached, empty style node.
    fn create_style(&mut self) -> NodeId;

    /// Creates a detached fragment used as a staging area.
    fn create_fragment(&mut self) -> NodeId;

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Appending a fragment moves its children instead.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Detaches `node` from its parent.
    fn remove(&mut self, node: NodeId) -> Result<(), HostError>;

    /// Destroys a detached node and its subtree, invalidating the handles.
    fn destroy(&mut self, node: NodeId);

    /// Replaces the text of a style node and re-derives its rule list.
    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError>;

    /// Returns the rule list of a style node.
    fn rules(&self, node: NodeId) -> Result<&[String], HostError>;

    /// Applies a rule operation to a style node, returning the affected index.
    fn apply_rule(&mut self, node: NodeId, op: &RuleOp) -> Result<usize, HostError>;

    /// Subscribes to child-list changes in the subtree rooted at `target`.
    ///
    /// The subscription does not descend into shadow trees.
    fn observe(&mut self, target: NodeId) -> WatchId;

    /// Drops a subscription, discarding any undelivered records.
    fn unobserve(&mut self, watch: WatchId);

    /// Takes every record queued for `watch` since the last call.
    fn take_records(&mut self, watch: WatchId) -> Vec<MutationRecord>;

    /// Asks the host to run [`Engine::run_frame`](crate::Engine::run_frame)
    /// at its next frame boundary.
    fn request_frame(&mut self);
}
