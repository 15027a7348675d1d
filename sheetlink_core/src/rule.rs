// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutating rule operations.
//!
//! A [`RuleOp`] is one entry of a canonical stylesheet's operation log. The
//! same value is applied to the canonical rule list, to every connected
//! replica, and later replayed into replicas that were not connected when it
//! happened.

use alloc::string::String;

/// A mutating call on a stylesheet's rule list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RuleOp {
    /// `insertRule(rule, index)`.
    InsertRule {
        /// Text of exactly one rule.
        rule: String,
        /// Position to insert at; must not exceed the list length.
        index: usize,
    },
    /// `deleteRule(index)`.
    DeleteRule {
        /// Position of the rule to delete.
        index: usize,
    },
    /// Legacy `addRule(selector, style, index)`.
    AddRule {
        /// Selector text.
        selector: String,
        /// Declaration block contents, without braces.
        style: String,
        /// Position to insert at, or the end of the list.
        index: Option<usize>,
    },
    /// Legacy `removeRule(index)`.
    RemoveRule {
        /// Position of the rule to delete.
        index: usize,
    },
}

impl RuleOp {
    /// Returns the script-visible name of the operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InsertRule { .. } => "insertRule",
            Self::DeleteRule { .. } => "deleteRule",
            Self::AddRule { .. } => "addRule",
            Self::RemoveRule { .. } => "removeRule",
        }
    }
}
