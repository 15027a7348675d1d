// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared, mutable stylesheets adopted across document and shadow scopes.
//!
//! `sheetlink_core` lets any number of presentation scopes (a document root and
//! the shadow roots nested inside it) share a small set of canonical
//! stylesheets. Each scope gets a private in-tree replica of every sheet it
//! adopts; edits to a canonical sheet propagate to every connected replica and
//! are replayed into replicas that reconnect later. It is `no_std` compatible
//! (with `alloc`) and talks to the surrounding tree only through the
//! [`Host`](host::Host) trait.
//!
//! # Architecture
//!
//! The engine is a reactor over two host-driven boundaries:
//!
//! ```text
//!   client ──► Engine::set_adopted_sheets ──► Scope::update ──► adopt()
//!                                                                 │
//!        ┌────────────────────────────────────────────────────────┘
//!        ▼
//!   Host::observe ──► MutationRecord batches ──► Engine::deliver_mutations
//!                                                  │ repair / discover
//!   Host::request_frame ──► Engine::run_frame ◄────┘ restyle replicas
//! ```
//!
//! **[`host`]**: The contract the surrounding tree implements: node
//! creation and movement, root lookup, batched child-list notifications and
//! frame requests.
//!
//! **[`dom`]**: An in-memory reference [`Host`](host::Host) with shadow
//! roots, style elements and mutation-observer style subscriptions.
//!
//! **[`engine`]**: [`Engine`](engine::Engine), which owns canonical
//! stylesheets, the scope registry and the replica store.
//!
//! **[`discover`]**: Worklist traversal that finds nested scope roots
//! beneath a node.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! engine instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod adopt;
pub mod config;
mod dirty;
pub mod discover;
pub mod dom;
pub mod engine;
pub mod error;
pub mod host;
pub mod id;
mod replica;
mod restyle;
pub mod rule;
mod sanitize;
pub mod scope;
pub mod sheet;
pub mod trace;
mod watch;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, HostError, Result};
pub use host::{Host, MutationRecord, RootKind};
pub use id::{NodeId, SheetId, WatchId};
pub use rule::RuleOp;
pub use scope::AdoptedValue;
pub use sheet::{SheetInit, SheetLike};
