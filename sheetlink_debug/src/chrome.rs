// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Events carry no wall-clock time, so the sequence number is used as the
//! timestamp in microseconds. Each scope gets its own track (`tid` is the
//! scope root's slot index); frames and import events go on track 0 of a
//! separate process.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const PID_SCOPES: u32 = 0;
const PID_ENGINE: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = recorded.seq();
        match recorded {
            RecordedEvent::Adopt(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Adopt",
                    "cat": "Scope",
                    "ts": ts,
                    "pid": PID_SCOPES,
                    "tid": e.scope.index(),
                    "s": "t",
                    "args": {
                        "sheets": e.sheets,
                        "created": e.created,
                    }
                }));
            }
            RecordedEvent::Restyle(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Restyle",
                    "cat": "Replica",
                    "ts": ts,
                    "pid": PID_SCOPES,
                    "tid": e.scope.index(),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "sheet": e.sheet.index(),
                        "replayed": e.replayed,
                    }
                }));
            }
            RecordedEvent::MutationBatch(e) => {
                let name = if e.repaired { "Repair" } else { "Mutations" };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Watch",
                    "ts": ts,
                    "pid": PID_SCOPES,
                    "tid": e.scope.index(),
                    "s": "t",
                    "args": {
                        "records": e.records,
                        "connected": e.connected,
                        "disconnected": e.disconnected,
                    }
                }));
            }
            RecordedEvent::ScopeState(e) => {
                // Connected spans open and close on the scope's own track.
                let ph = if e.connected { "B" } else { "E" };
                events.push(json!({
                    "ph": ph,
                    "name": format!("{} connected", e.kind),
                    "cat": "Scope",
                    "ts": ts,
                    "pid": PID_SCOPES,
                    "tid": e.scope.index(),
                }));
            }
            RecordedEvent::ImportStripped(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ImportStripped",
                    "cat": "Sheet",
                    "ts": ts,
                    "pid": PID_ENGINE,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "sheet": e.sheet.index(),
                        "directives": e.directives,
                    }
                }));
            }
            RecordedEvent::Frame(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": ts,
                    "pid": PID_ENGINE,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "restyled": e.restyled,
                        "skipped": e.skipped,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
