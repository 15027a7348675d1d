// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Replicas waiting for a restyle are tracked with [`understory_dirty`],
//! keyed by replica slot. Marking is local-only: a replica has no
//! dependents, so only the explicitly marked slot appears in the drain
//! output.
//!
//! [`Engine::run_frame`](crate::Engine::run_frame) drains the channel once
//! per frame. Slots freed in the meantime are removed from the tracker when
//! their replica is dropped, so a drain never names a recycled slot.

use understory_dirty::Channel;

/// Replica content must be recopied from its canonical sheet and the
/// operation log replayed.
pub(crate) const RESTYLE: Channel = Channel::new(0);
