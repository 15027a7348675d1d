// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for adoption and stylesheet operations.
//!
//! Messages follow the wording hosts use for the equivalent script-visible
//! exceptions, naming the API and the kind of root involved.
//!
//! Validation errors are raised before any state is touched: a failed
//! [`set_adopted_sheets`](crate::Engine::set_adopted_sheets) leaves the scope
//! exactly as it was, and a failed
//! [`replace_sync`](crate::Engine::replace_sync) leaves the sheet's content
//! unchanged.

use alloc::string::String;

use thiserror::Error;

use crate::host::RootKind;
use crate::id::NodeId;

/// Result type alias for engine operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Top-level error type for the engine.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The assigned value is not an ordered sequence.
    #[error(
        "Failed to set the 'adoptedStyleSheets' property on {kind}: Iterator getter is not callable."
    )]
    InvalidSheetList {
        /// Kind of root whose property was assigned.
        kind: RootKind,
    },

    /// An element of the assigned sequence is not a stylesheet this engine
    /// recognizes.
    #[error(
        "Failed to set the 'adoptedStyleSheets' property on {kind}: Failed to convert value to 'CSSStyleSheet'"
    )]
    ConvertSheet {
        /// Kind of root whose property was assigned.
        kind: RootKind,
        /// Position of the offending element.
        position: usize,
    },

    /// An element of the assigned sequence is a host-native stylesheet.
    #[error(
        "Failed to set the 'adoptedStyleSheets' property on {kind}: Can't adopt non-constructed stylesheets"
    )]
    NonConstructedAdopt {
        /// Kind of root whose property was assigned.
        kind: RootKind,
        /// Position of the offending element.
        position: usize,
    },

    /// The node is neither a document nor a shadow root.
    #[error("{node:?} is not a document or shadow root")]
    NotARoot {
        /// The node that was used as a root.
        node: NodeId,
    },

    /// A stylesheet operation was invoked on a handle this engine never
    /// registered.
    #[error("Illegal invocation")]
    IllegalInvocation,

    /// Synchronous replacement was given an `@import` directive.
    #[error(
        "Failed to execute 'replaceSync' on 'CSSStyleSheet': @import rules are not allowed when creating stylesheet synchronously (found `{directive}`)"
    )]
    ImportRejected {
        /// The first rejected directive.
        directive: String,
    },

    /// A replace entry point was invoked on a host-native stylesheet.
    #[error(
        "Failed to execute '{api}' on 'CSSStyleSheet': Can't call {api} on non-constructed CSSStyleSheets."
    )]
    NonConstructedReplace {
        /// The entry point name (`replace` or `replaceSync`).
        api: &'static str,
    },

    /// The host rejected a tree or rule operation.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors reported by a [`Host`](crate::host::Host) implementation.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    /// A rule index was out of range.
    #[error(
        "Failed to execute '{api}' on 'CSSStyleSheet': The index provided ({index}) is larger than the maximum index ({len})."
    )]
    IndexSize {
        /// The rule operation name.
        api: &'static str,
        /// The requested index.
        index: usize,
        /// Length of the rule list at the time of the call.
        len: usize,
    },

    /// Rule text did not parse to exactly one rule.
    #[error("Failed to execute '{api}' on 'CSSStyleSheet': Failed to parse the rule '{rule}'.")]
    Syntax {
        /// The rule operation name.
        api: &'static str,
        /// The offending rule text.
        rule: String,
    },

    /// The handle refers to a destroyed node.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),

    /// The node cannot carry style content.
    #[error("{0:?} is not a style element")]
    NotAStyle(NodeId),

    /// The insertion would produce an invalid tree.
    #[error("{0:?} cannot be inserted at this position")]
    HierarchyRequest(NodeId),
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_root_kind() {
        let err = Error::InvalidSheetList {
            kind: RootKind::ShadowRoot,
        };
        assert!(err.to_string().contains("on ShadowRoot"), "got: {err}");

        let err = Error::ConvertSheet {
            kind: RootKind::Document,
            position: 0,
        };
        assert!(err.to_string().contains("on Document"), "got: {err}");
    }

    #[test]
    fn host_errors_convert() {
        let err: Error = HostError::NotAStyle(NodeId::new(3, 0)).into();
        assert!(matches!(err, Error::Host(HostError::NotAStyle(_))));
        assert_eq!(err.to_string(), "NodeId(3@gen0) is not a style element");
    }

    #[test]
    fn replace_errors_name_api() {
        let err = Error::NonConstructedReplace { api: "replaceSync" };
        assert_eq!(
            err.to_string(),
            "Failed to execute 'replaceSync' on 'CSSStyleSheet': Can't call replaceSync on non-constructed CSSStyleSheets."
        );
    }
}
