// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Defer replica restyles to the next
    /// [`run_frame`](crate::Engine::run_frame).
    ///
    /// When `false`, replicas are restyled as soon as they are placed.
    pub deferred_restyle: bool,
    /// Connect every nested scope that discovery finds.
    ///
    /// When `false`, only nested scopes with a non-empty requested list are
    /// connected; the rest connect once a list is assigned to them.
    pub connect_empty_scopes: bool,
}

impl EngineConfig {
    /// Default configuration: deferred restyles, eager scope connection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deferred_restyle: true,
            connect_empty_scopes: true,
        }
    }

    /// Restyles replicas inline instead of waiting for a frame.
    ///
    /// Useful for hosts without a frame loop and for tests.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            deferred_restyle: false,
            connect_empty_scopes: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
