// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical stylesheets.
//!
//! A canonical sheet is the single source of truth for one stylesheet. It
//! keeps its content in a detached style node owned by the engine (the
//! *basic* node, which the host parses into rules), the raw text last
//! assigned, and the log of rule operations applied since that assignment.
//!
//! Every scope that adopts the sheet gets its own replica node. Replicas are
//! registered per scope root in the sheet's adopter map:
//!
//! - A full replacement ([`replace_sync`](Engine::replace_sync),
//!   [`replace`](Engine::replace)) clears the log and schedules a full
//!   restyle of every connected replica.
//! - A rule operation ([`apply`](Engine::apply) and its shorthands) goes to
//!   the basic node first, is logged, and is applied directly to every
//!   connected replica that is already current. Everything else catches up
//!   from the log when it is next restyled.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::future::{Ready, ready};

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::id::{NodeId, SheetId};
use crate::rule::RuleOp;
use crate::sanitize;

/// Construction options for a canonical sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetInit {
    /// Media query list the sheet applies to. Empty means all media.
    pub media: String,
}

/// A value presented where a stylesheet is expected.
///
/// Clients that accept untyped input classify it into one of these before
/// handing it to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetLike {
    /// A handle minted by [`Engine::create_sheet`]. Handles from another
    /// engine are treated as foreign.
    Constructed(SheetId),
    /// A host-native sheet owned by a style or link node.
    NonConstructed(NodeId),
    /// Anything else.
    Foreign,
}

impl From<SheetId> for SheetLike {
    fn from(id: SheetId) -> Self {
        Self::Constructed(id)
    }
}

/// Engine-side state of one canonical sheet.
#[derive(Debug)]
pub(crate) struct StyleSheet {
    /// Detached style node holding the canonical rule list.
    pub(crate) basic: NodeId,
    /// Text of the last full replacement.
    pub(crate) content: String,
    pub(crate) media: String,
    /// Operations applied since the last full replacement.
    pub(crate) log: Vec<RuleOp>,
    /// Replica slot per adopting scope root.
    adopters: BTreeMap<NodeId, u32>,
}

impl StyleSheet {
    pub(crate) fn new(basic: NodeId, media: String) -> Self {
        Self {
            basic,
            content: String::new(),
            media,
            log: Vec::new(),
            adopters: BTreeMap::new(),
        }
    }

    pub(crate) fn adopter_for(&self, root: NodeId) -> Option<u32> {
        self.adopters.get(&root).copied()
    }

    pub(crate) fn set_adopter_for(&mut self, root: NodeId, slot: u32) {
        self.adopters.insert(root, slot);
    }

    pub(crate) fn remove_adopter_for(&mut self, root: NodeId) -> Option<u32> {
        self.adopters.remove(&root)
    }

    /// Iterates `(scope root, replica slot)` pairs.
    pub(crate) fn adopters(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.adopters.iter().map(|(&root, &slot)| (root, slot))
    }
}

impl Engine {
    /// Creates an empty canonical sheet.
    pub fn create_sheet<H: Host + ?Sized>(&mut self, host: &mut H) -> SheetId {
        self.create_sheet_with(host, SheetInit::default())
    }

    /// Creates an empty canonical sheet with construction options.
    pub fn create_sheet_with<H: Host + ?Sized>(&mut self, host: &mut H, init: SheetInit) -> SheetId {
        let basic = host.create_style();
        let id = SheetId::new(self.sheets.len() as u32, self.id);
        self.sheets.push(StyleSheet::new(basic, init.media));
        tracing::trace!(sheet = ?id, "created canonical sheet");
        id
    }

    /// Replaces a sheet's content synchronously.
    ///
    /// Fails without touching the sheet if `text` contains an `@import`
    /// directive.
    pub fn replace_sync<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        sheet: impl Into<SheetLike>,
        text: &str,
    ) -> Result<SheetId> {
        let id = self.constructed(sheet.into(), "replaceSync")?;
        if let Some(directive) = sanitize::find_import(text) {
            return Err(Error::ImportRejected {
                directive: String::from(directive),
            });
        }
        self.replace_content(host, id, String::from(text))?;
        Ok(id)
    }

    /// Replaces a sheet's content, dropping any `@import` directives with a
    /// warning.
    ///
    /// The returned future is already resolved: replication of the new
    /// content is scheduled, not awaited. It resolves to the sheet itself.
    pub fn replace<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        sheet: impl Into<SheetLike>,
        text: &str,
    ) -> Ready<Result<SheetId>> {
        ready(self.replace_now(host, sheet.into(), text))
    }

    fn replace_now<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        sheet: SheetLike,
        text: &str,
    ) -> Result<SheetId> {
        let id = self.constructed(sheet, "replace")?;
        let sanitized = sanitize::strip_imports(text);
        if !sanitized.directives.is_empty() {
            tracing::warn!(
                sheet = ?id,
                directives = ?sanitized.directives,
                "@import rules are not allowed in constructed stylesheets; dropped"
            );
            self.tracer
                .import_stripped(id, sanitized.directives.len() as u32);
        }
        self.replace_content(host, id, sanitized.text)?;
        Ok(id)
    }

    /// Applies a rule operation to a sheet and every connected replica.
    ///
    /// Returns the index the canonical rule list reports. A rejected
    /// operation is not logged and reaches no replica.
    pub fn apply<H: Host + ?Sized>(&mut self, host: &mut H, sheet: SheetId, op: RuleOp) -> Result<usize> {
        let idx = self.sheet_index(sheet).ok_or(Error::IllegalInvocation)?;
        let result = host.apply_rule(self.sheets[idx].basic, &op)?;

        let cursor = self.sheets[idx].log.len();
        self.sheets[idx].log.push(op);

        let adopters: Vec<(NodeId, u32)> = self.sheets[idx].adopters().collect();
        for (root, slot) in adopters {
            if !self.scope_connected(&*host, root) {
                continue;
            }
            let Some(replica) = self.replicas.get_mut(slot) else {
                continue;
            };
            // Replicas behind the log catch up on their pending restyle.
            if replica.cursor != Some(cursor) || !host.contains(replica.node) {
                continue;
            }
            match host.apply_rule(replica.node, &self.sheets[idx].log[cursor]) {
                Ok(_) => replica.cursor = Some(cursor + 1),
                Err(err) => {
                    tracing::warn!(sheet = ?sheet, scope = ?root, %err, "replica rejected rule operation");
                    replica.cursor = None;
                    self.restyle_adopter(host, slot)?;
                }
            }
        }
        Ok(result)
    }

    /// `insertRule(rule, index)`. The index defaults to 0.
    pub fn insert_rule<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        sheet: SheetId,
        rule: &str,
        index: Option<usize>,
    ) -> Result<usize> {
        let op = RuleOp::InsertRule {
            rule: String::from(rule),
            index: index.unwrap_or(0),
        };
        self.apply(host, sheet, op)
    }

    /// `deleteRule(index)`.
    pub fn delete_rule<H: Host + ?Sized>(&mut self, host: &mut H, sheet: SheetId, index: usize) -> Result<()> {
        self.apply(host, sheet, RuleOp::DeleteRule { index }).map(drop)
    }

    /// Legacy `addRule(selector, style, index)`. The index defaults to the
    /// end of the list.
    pub fn add_rule<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        sheet: SheetId,
        selector: &str,
        style: &str,
        index: Option<usize>,
    ) -> Result<usize> {
        let op = RuleOp::AddRule {
            selector: String::from(selector),
            style: String::from(style),
            index,
        };
        self.apply(host, sheet, op)
    }

    /// Legacy `removeRule(index)`.
    pub fn remove_rule<H: Host + ?Sized>(&mut self, host: &mut H, sheet: SheetId, index: usize) -> Result<()> {
        self.apply(host, sheet, RuleOp::RemoveRule { index }).map(drop)
    }

    /// Returns the canonical rule list.
    pub fn css_rules<'h, H: Host + ?Sized>(&self, host: &'h H, sheet: SheetId) -> Result<&'h [String]> {
        let idx = self.sheet_index(sheet).ok_or(Error::IllegalInvocation)?;
        Ok(host.rules(self.sheets[idx].basic)?)
    }

    /// Returns the media list given at construction.
    pub fn media(&self, sheet: SheetId) -> Result<&str> {
        let idx = self.sheet_index(sheet).ok_or(Error::IllegalInvocation)?;
        Ok(&self.sheets[idx].media)
    }

    /// Returns the text of the last full replacement.
    pub fn content(&self, sheet: SheetId) -> Result<&str> {
        let idx = self.sheet_index(sheet).ok_or(Error::IllegalInvocation)?;
        Ok(&self.sheets[idx].content)
    }

    /// Returns the operations applied since the last full replacement.
    pub fn operation_log(&self, sheet: SheetId) -> Result<&[RuleOp]> {
        let idx = self.sheet_index(sheet).ok_or(Error::IllegalInvocation)?;
        Ok(&self.sheets[idx].log)
    }

    /// Resolves a replace target to a sheet this engine owns.
    fn constructed(&self, sheet: SheetLike, api: &'static str) -> Result<SheetId> {
        match sheet {
            SheetLike::Constructed(id) if self.sheet_index(id).is_some() => Ok(id),
            SheetLike::NonConstructed(_) => Err(Error::NonConstructedReplace { api }),
            SheetLike::Constructed(_) | SheetLike::Foreign => Err(Error::IllegalInvocation),
        }
    }

    fn replace_content<H: Host + ?Sized>(&mut self, host: &mut H, id: SheetId, text: String) -> Result<()> {
        let idx = id.idx as usize;
        host.set_style_text(self.sheets[idx].basic, &text)?;
        let sheet = &mut self.sheets[idx];
        sheet.content = text;
        sheet.log.clear();

        let adopters: Vec<(NodeId, u32)> = sheet.adopters().collect();
        for (root, slot) in adopters {
            if let Some(replica) = self.replicas.get_mut(slot) {
                replica.cursor = None;
            }
            if self.scope_connected(&*host, root) {
                self.restyle_adopter(host, slot)?;
            }
        }
        Ok(())
    }
}
