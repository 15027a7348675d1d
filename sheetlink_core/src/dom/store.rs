// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and content.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::HostError;
use crate::host::MutationRecord;
use crate::id::{INVALID, NodeId};

use super::observe::Observer;
use super::style::RuleList;
use super::traverse::{Children, Descendants};

/// Encapsulation mode of a shadow root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadowMode {
    /// Reachable through [`Document::shadow_root`].
    Open,
    /// Only reachable by the engine through
    /// [`Host::shadow_root_of`](crate::host::Host::shadow_root_of).
    Closed,
}

/// What a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node. Exactly one per [`Document`].
    Document,
    /// An element with a tag name.
    Element,
    /// A text node.
    Text,
    /// A document fragment. Appending one moves its children.
    Fragment,
    /// A shadow root attached to an element.
    ShadowRoot(ShadowMode),
}

/// Loading state of a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// The initial tree is still being built.
    Loading,
    /// The initial tree is complete.
    Complete,
}

/// An in-memory document tree.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; destroyed nodes are recycled through a free list and the
/// generation counter rejects stale handles.
///
/// Every tree edit queues a [`MutationRecord`] for each subscription whose
/// target is an inclusive ancestor of the edited node in the same tree.
#[derive(Debug)]
pub struct Document {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Shadow links --
    pub(crate) shadow: Vec<u32>,
    pub(crate) shadow_host: Vec<u32>,

    // -- Content --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) tag: Vec<Option<String>>,
    pub(crate) text: Vec<String>,
    pub(crate) rules: Vec<Option<RuleList>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Document state --
    pub(crate) root: NodeId,
    pub(crate) html: NodeId,
    pub(crate) head: NodeId,
    pub(crate) body: NodeId,
    pub(crate) ready: ReadyState,
    pub(crate) alive: bool,
    pub(crate) frame_requested: bool,

    // -- Subscriptions --
    pub(crate) observers: Vec<Option<Observer>>,
    pub(crate) free_observers: Vec<u32>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a loaded document with `html`, `head` and `body` elements.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            shadow: Vec::new(),
            shadow_host: Vec::new(),
            kind: Vec::new(),
            tag: Vec::new(),
            text: Vec::new(),
            rules: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            root: NodeId::new(INVALID, 0),
            html: NodeId::new(INVALID, 0),
            head: NodeId::new(INVALID, 0),
            body: NodeId::new(INVALID, 0),
            ready: ReadyState::Complete,
            alive: true,
            frame_requested: false,
            observers: Vec::new(),
            free_observers: Vec::new(),
        };
        doc.root = doc.alloc(NodeKind::Document, None);
        doc.html = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.link_last(doc.root.idx, doc.html.idx);
        doc.link_last(doc.html.idx, doc.head.idx);
        doc.link_last(doc.html.idx, doc.body.idx);
        doc
    }

    /// Creates a document that is still loading.
    ///
    /// Call [`finish_loading`](Self::finish_loading) once the initial tree is
    /// built.
    #[must_use]
    pub fn loading() -> Self {
        let mut doc = Self::new();
        doc.ready = ReadyState::Loading;
        doc
    }

    /// Marks the initial tree as complete.
    pub fn finish_loading(&mut self) {
        self.ready = ReadyState::Complete;
    }

    /// Returns the loading state.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.ready
    }

    /// Tears the environment down. Subscriptions stop receiving records.
    pub fn teardown(&mut self) {
        self.alive = false;
        self.observers.clear();
        self.free_observers.clear();
    }

    /// Returns the document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the `html` element.
    #[must_use]
    pub fn document_element(&self) -> NodeId {
        self.html
    }

    /// Returns the `head` element.
    #[must_use]
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// Returns the `body` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Returns and clears the pending frame request.
    pub fn take_frame_request(&mut self) -> bool {
        core::mem::take(&mut self.frame_requested)
    }

    // -- Allocation API --

    /// Creates a detached element. Tag names are stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let is_style = tag == "style";
        let id = self.alloc(NodeKind::Element, Some(tag));
        if is_style {
            self.rules[id.idx as usize] = Some(RuleList::default());
        }
        id
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::Text, None);
        self.text[id.idx as usize] = String::from(text);
        id
    }

    /// Creates an empty fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment, None)
    }

    /// Attaches a shadow root to `host`.
    ///
    /// Fails if `host` is not an element or already has a shadow root.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowMode) -> Result<NodeId, HostError> {
        self.check(host)?;
        let h = host.idx as usize;
        if self.kind[h] != NodeKind::Element || self.shadow[h] != INVALID {
            return Err(HostError::HierarchyRequest(host));
        }
        let root = self.alloc(NodeKind::ShadowRoot(mode), None);
        self.shadow[h] = root.idx;
        self.shadow_host[root.idx as usize] = host.idx;
        Ok(root)
    }

    /// Returns the open shadow root attached to `element`.
    #[must_use]
    pub fn shadow_root(&self, element: NodeId) -> Option<NodeId> {
        let root = self.attached_shadow(element)?;
        (self.kind[root.idx as usize] == NodeKind::ShadowRoot(ShadowMode::Open)).then_some(root)
    }

    /// Returns the element a shadow root is attached to.
    #[must_use]
    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        if !self.is_alive(root) {
            return None;
        }
        self.id_at(self.shadow_host[root.idx as usize])
    }

    /// Destroys `node` and its subtree, including attached shadow trees.
    ///
    /// Stale handles are ignored.
    pub fn destroy(&mut self, node: NodeId) {
        if !self.is_alive(node) {
            return;
        }
        if self.parent[node.idx as usize] != INVALID {
            self.detach(node.idx);
        }
        let mut stack = alloc::vec![node.idx];
        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            let mut child = self.first_child[i];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            if self.shadow[i] != INVALID {
                stack.push(self.shadow[i]);
            }
            self.release(idx);
        }
    }

    /// Returns whether the handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    // -- Topology API --

    /// Appends `child` as the last child of `parent`.
    ///
    /// A fragment `child` contributes its children, in order, and is left
    /// empty.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` into `parent` before `reference`, or last when
    /// `reference` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), HostError> {
        self.check(parent)?;
        self.check(child)?;
        if let Some(r) = reference {
            self.check(r)?;
            if self.parent[r.idx as usize] != parent.idx {
                return Err(HostError::HierarchyRequest(r));
            }
        }
        if matches!(self.kind[parent.idx as usize], NodeKind::Text) {
            return Err(HostError::HierarchyRequest(parent));
        }
        // Inserting a node before itself means before its next sibling.
        let reference = match reference {
            Some(r) if r == child => self.id_at(self.next_sibling[r.idx as usize]),
            other => other,
        };
        let nodes = if self.kind[child.idx as usize] == NodeKind::Fragment {
            let moved: Vec<NodeId> = self.children(child).collect();
            if moved.is_empty() {
                return Ok(());
            }
            for &m in &moved {
                self.check_insertable(parent, m)?;
            }
            let moved: Vec<u32> = moved.iter().map(|m| m.idx).collect();
            for &idx in &moved {
                self.unlink(idx);
            }
            let removed = moved.iter().filter_map(|&i| self.id_at(i)).collect();
            self.queue_record(child.idx, Vec::new(), removed);
            moved
        } else {
            self.check_insertable(parent, child)?;
            if self.parent[child.idx as usize] != INVALID {
                self.detach(child.idx);
            }
            alloc::vec![child.idx]
        };

        let before = reference.map_or(INVALID, |r| r.idx);
        for &idx in &nodes {
            self.link_before(parent.idx, idx, before);
        }
        let added = nodes.iter().filter_map(|&i| self.id_at(i)).collect();
        self.queue_record(parent.idx, added, Vec::new());
        Ok(())
    }

    /// Detaches `node` from its parent. Detached nodes are left alone.
    pub fn remove(&mut self, node: NodeId) -> Result<(), HostError> {
        self.check(node)?;
        if self.parent[node.idx as usize] != INVALID {
            self.detach(node.idx);
        }
        Ok(())
    }

    /// Detaches every child of `node`, in one record.
    pub fn clear_children(&mut self, node: NodeId) -> Result<(), HostError> {
        self.check(node)?;
        let removed: Vec<NodeId> = self.children(node).collect();
        if removed.is_empty() {
            return Ok(());
        }
        for r in &removed {
            self.unlink(r.idx);
        }
        self.queue_record(node.idx, Vec::new(), removed);
        Ok(())
    }

    /// Replaces the text of a node.
    ///
    /// Text nodes change in place. Style elements re-derive their rule list.
    /// Other nodes lose their children and gain a single text child.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.check(node)?;
        let i = node.idx as usize;
        if self.kind[i] == NodeKind::Text {
            self.text[i] = String::from(text);
            return Ok(());
        }
        if self.rules[i].is_some() {
            return self.set_style_text(node, text);
        }
        self.clear_children(node)?;
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(node, t)?;
        }
        Ok(())
    }

    /// Replaces the text of a style element and re-derives its rule list.
    pub fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.check(node)?;
        let i = node.idx as usize;
        let Some(rules) = &mut self.rules[i] else {
            return Err(HostError::NotAStyle(node));
        };
        *rules = RuleList::parse(text);
        self.text[i] = String::from(text);
        Ok(())
    }

    // -- Queries (stale handles read as absent) --

    /// Returns the parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.is_alive(node) {
            return None;
        }
        self.id_at(self.parent[node.idx as usize])
    }

    /// Iterates the direct children of `node`.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Children<'_> {
        let first = if self.is_alive(node) {
            self.first_child[node.idx as usize]
        } else {
            INVALID
        };
        Children::new(self, first)
    }

    /// Iterates the descendants of `node` in tree order, without entering
    /// shadow trees.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants::new(self, node)
    }

    /// Returns the kind of `node`.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.is_alive(node).then(|| self.kind[node.idx as usize])
    }

    /// Returns the lowercase tag name of an element.
    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        if !self.is_alive(node) {
            return None;
        }
        self.tag[node.idx as usize].as_deref()
    }

    /// Returns the text of a text node or style element, or the
    /// concatenated text of a subtree.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        if !self.is_alive(node) {
            return String::new();
        }
        let i = node.idx as usize;
        if self.kind[i] == NodeKind::Text || self.rules[i].is_some() {
            return self.text[i].clone();
        }
        let mut out = String::new();
        for d in self.descendants(node) {
            if self.kind[d.idx as usize] == NodeKind::Text {
                out.push_str(&self.text[d.idx as usize]);
            }
        }
        out
    }

    /// Returns the rule list of a style element.
    #[must_use]
    pub fn rules(&self, node: NodeId) -> Option<&[String]> {
        if !self.is_alive(node) {
            return None;
        }
        self.rules[node.idx as usize].as_ref().map(RuleList::as_slice)
    }

    /// Whether `node` is reachable from the document node, crossing shadow
    /// roots through their hosts.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        if !self.is_alive(node) {
            return false;
        }
        let mut idx = node.idx;
        loop {
            if idx == self.root.idx {
                return true;
            }
            let i = idx as usize;
            idx = if self.parent[i] != INVALID {
                self.parent[i]
            } else if self.shadow_host[i] != INVALID {
                self.shadow_host[i]
            } else {
                return false;
            };
        }
    }

    // -- Internals --

    pub(crate) fn id_at(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| NodeId::new(idx, self.generation[idx as usize]))
    }

    pub(crate) fn attached_shadow(&self, element: NodeId) -> Option<NodeId> {
        if !self.is_alive(element) {
            return None;
        }
        self.id_at(self.shadow[element.idx as usize])
    }

    pub(crate) fn check(&self, id: NodeId) -> Result<(), HostError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(HostError::StaleNode(id))
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        if matches!(
            self.kind[child.idx as usize],
            NodeKind::Document | NodeKind::ShadowRoot(_)
        ) {
            return Err(HostError::HierarchyRequest(child));
        }
        // A node cannot become its own descendant.
        let mut idx = parent.idx;
        while idx != INVALID {
            if idx == child.idx {
                return Err(HostError::HierarchyRequest(child));
            }
            idx = self.parent[idx as usize];
        }
        Ok(())
    }

    fn alloc(&mut self, kind: NodeKind, tag: Option<String>) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.shadow[i] = INVALID;
            self.shadow_host[i] = INVALID;
            self.kind[i] = kind;
            self.tag[i] = tag;
            self.text[i].clear();
            self.rules[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.shadow.push(INVALID);
            self.shadow_host.push(INVALID);
            self.kind.push(kind);
            self.tag.push(tag);
            self.text.push(String::new());
            self.rules.push(None);
            self.generation.push(0);
            idx
        };
        NodeId::new(idx, self.generation[idx as usize])
    }

    /// Frees a slot. Bumping the generation invalidates outstanding handles.
    fn release(&mut self, idx: u32) {
        let i = idx as usize;
        self.generation[i] += 1;
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.last_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.shadow[i] = INVALID;
        self.shadow_host[i] = INVALID;
        self.rules[i] = None;
        self.free_list.push(idx);
    }

    /// Unlinks `idx` from its parent and queues the removal record.
    fn detach(&mut self, idx: u32) {
        let parent = self.parent[idx as usize];
        let removed = self.id_at(idx);
        self.unlink(idx);
        self.queue_record(parent, Vec::new(), removed.into_iter().collect());
    }

    /// Removes `idx` from its parent's child list without queuing records.
    fn unlink(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i];
        let prev = self.prev_sibling[i];
        let next = self.next_sibling[i];
        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        } else {
            self.last_child[p as usize] = prev;
        }
        self.parent[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
    }

    fn link_last(&mut self, parent: u32, idx: u32) {
        self.link_before(parent, idx, INVALID);
    }

    fn link_before(&mut self, parent: u32, idx: u32, before: u32) {
        let i = idx as usize;
        let p = parent as usize;
        self.parent[i] = parent;
        if before == INVALID {
            let last = self.last_child[p];
            self.prev_sibling[i] = last;
            self.next_sibling[i] = INVALID;
            if last != INVALID {
                self.next_sibling[last as usize] = idx;
            } else {
                self.first_child[p] = idx;
            }
            self.last_child[p] = idx;
        } else {
            let prev = self.prev_sibling[before as usize];
            self.prev_sibling[i] = prev;
            self.next_sibling[i] = before;
            self.prev_sibling[before as usize] = idx;
            if prev != INVALID {
                self.next_sibling[prev as usize] = idx;
            } else {
                self.first_child[p] = idx;
            }
        }
    }

    fn queue_record(&mut self, target: u32, added: Vec<NodeId>, removed: Vec<NodeId>) {
        let Some(target) = self.id_at(target) else {
            return;
        };
        let record = MutationRecord {
            target,
            added,
            removed,
        };
        self.dispatch(record);
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn new_document_has_body() {
        let doc = Document::new();
        assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
        assert_eq!(doc.parent(doc.document_element()), Some(doc.root()));
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert!(doc.is_connected(doc.body()));
        assert_eq!(doc.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn append_and_insert_before_keep_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        doc.append_child(body, a).unwrap();
        doc.append_child(body, c).unwrap();
        doc.insert_before(body, b, Some(c)).unwrap();
        assert_eq!(doc.children(body).collect::<Vec<_>>(), vec![a, b, c]);

        // Re-appending moves to the end.
        doc.append_child(body, a).unwrap();
        assert_eq!(doc.children(body).collect::<Vec<_>>(), vec![b, c, a]);
    }

    #[test]
    fn fragment_append_moves_children() {
        let mut doc = Document::new();
        let frag = doc.create_fragment();
        let x = doc.create_element("x");
        let y = doc.create_element("y");
        doc.append_child(frag, x).unwrap();
        doc.append_child(frag, y).unwrap();
        doc.append_child(doc.body(), frag).unwrap();
        assert_eq!(doc.children(frag).count(), 0);
        assert_eq!(doc.children(doc.body()).collect::<Vec<_>>(), vec![x, y]);
        assert_eq!(doc.parent(x), Some(doc.body()));
    }

    #[test]
    fn hierarchy_checks() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(a, b).unwrap();
        assert_eq!(
            doc.append_child(b, a),
            Err(HostError::HierarchyRequest(a))
        );
        let text = doc.create_text("hi");
        assert_eq!(
            doc.append_child(text, b),
            Err(HostError::HierarchyRequest(text))
        );
        let root = doc.attach_shadow(a, ShadowMode::Open).unwrap();
        assert_eq!(
            doc.append_child(b, root),
            Err(HostError::HierarchyRequest(root))
        );
        assert!(doc.attach_shadow(a, ShadowMode::Open).is_err());
    }

    #[test]
    fn shadow_roots_connect_through_host() {
        let mut doc = Document::new();
        let host = doc.create_element("x-comp");
        let open = doc.attach_shadow(host, ShadowMode::Open).unwrap();
        let other = doc.create_element("x-other");
        let closed = doc.attach_shadow(other, ShadowMode::Closed).unwrap();
        assert!(!doc.is_connected(open));

        doc.append_child(doc.body(), host).unwrap();
        assert!(doc.is_connected(open));
        assert_eq!(doc.shadow_root(host), Some(open));
        assert_eq!(doc.shadow_root(other), None);
        assert_eq!(doc.attached_shadow(other), Some(closed));
        assert_eq!(doc.shadow_host(open), Some(host));
        assert_eq!(doc.parent(open), None);
    }

    #[test]
    fn destroy_invalidates_subtree() {
        let mut doc = Document::new();
        let host = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(host, child).unwrap();
        let root = doc.attach_shadow(host, ShadowMode::Open).unwrap();
        doc.append_child(doc.body(), host).unwrap();

        doc.destroy(host);
        assert!(!doc.is_alive(host));
        assert!(!doc.is_alive(child));
        assert!(!doc.is_alive(root));
        assert_eq!(doc.children(doc.body()).count(), 0);
        assert_eq!(doc.remove(child), Err(HostError::StaleNode(child)));

        // Slot reuse does not revive old handles.
        let fresh = doc.create_element("p");
        assert!(doc.is_alive(fresh));
        assert!(!doc.is_alive(host));
        assert!(!doc.is_alive(child));
    }

    #[test]
    fn style_text_derives_rules() {
        let mut doc = Document::new();
        let style = doc.create_element("STYLE");
        doc.set_text_content(style, "a { b: c } d { e: f }").unwrap();
        assert_eq!(doc.rules(style).map(<[_]>::len), Some(2));
        assert_eq!(doc.text_content(style), "a { b: c } d { e: f }");

        let div = doc.create_element("div");
        assert_eq!(
            doc.set_style_text(div, "a {}"),
            Err(HostError::NotAStyle(div))
        );
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_text_content(div, "hello").unwrap();
        let span = doc.create_element("span");
        let t = doc.create_text(" world");
        doc.append_child(span, t).unwrap();
        doc.append_child(div, span).unwrap();
        assert_eq!(doc.text_content(div), "hello world".to_string());

        doc.set_text_content(div, "").unwrap();
        assert_eq!(doc.children(div).count(), 0);
    }
}
