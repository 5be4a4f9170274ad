// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes a JSON array
//! with one object per event. Every object has a
//! `"kind"` field (`"frame"`, `"buffers"`, `"backend"` or `"hook"`) and an
//! ordinal `"seq"`; views are written as `"index@generation"` strings.

use std::io::{self, Write};

use serde_json::{Value, json};

use frosted_core::host::ViewId;
use frosted_core::surface::CaptureOutcome;
use frosted_core::trace::{BackendAction, BufferAction};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (seq, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::FrameHook(e) => {
                let (outcome, detail) = match e.outcome {
                    CaptureOutcome::Captured { redraw } => {
                        ("captured", json!({ "redraw": redraw }))
                    }
                    CaptureOutcome::Skipped(reason) => {
                        ("skipped", json!({ "reason": format!("{reason:?}") }))
                    }
                };
                events.push(json!({
                    "seq": seq,
                    "kind": "frame",
                    "surface": view(e.surface),
                    "frame_index": e.frame_index,
                    "outcome": outcome,
                    "args": detail,
                }));
            }
            RecordedEvent::Buffer(e) => {
                let (action, reason) = match e.action {
                    BufferAction::Allocated => ("Allocated", Value::Null),
                    BufferAction::Released(reason) => ("Released", json!(format!("{reason:?}"))),
                    BufferAction::AllocationFailed => ("AllocationFailed", Value::Null),
                };
                events.push(json!({
                    "seq": seq,
                    "kind": "buffers",
                    "action": action,
                    "reason": reason,
                    "width": e.width,
                    "height": e.height,
                }));
            }
            RecordedEvent::Backend(e) => {
                let (action, error) = match e.action {
                    BackendAction::Prepared => ("Prepared", Value::Null),
                    BackendAction::PrepareFailed(err) => ("PrepareFailed", json!(err.to_string())),
                    BackendAction::Released => ("Released", Value::Null),
                };
                events.push(json!({
                    "seq": seq,
                    "kind": "backend",
                    "action": action,
                    "error": error,
                    "radius": e.radius,
                    "width": e.width,
                    "height": e.height,
                }));
            }
            RecordedEvent::Subscription(e) => {
                events.push(json!({
                    "seq": seq,
                    "kind": "hook",
                    "surface": view(e.surface),
                    "root": e.root.map(view),
                    "action": format!("{:?}", e.action),
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn view(id: ViewId) -> String {
    format!("{}@{}", id.index(), id.generation())
}

#[cfg(test)]
mod tests {
    use frosted_core::error::BackendError;
    use frosted_core::surface::SkipReason;
    use frosted_core::trace::{
        BackendEvent, BufferEvent, FrameHookEvent, ReleaseReason, SubscriptionAction,
        SubscriptionEvent, TraceSink,
    };

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_subscription(&SubscriptionEvent {
            surface: ViewId::new(1, 1),
            root: Some(ViewId::new(0, 1)),
            action: SubscriptionAction::Subscribed,
        });
        rec.on_backend(&BackendEvent {
            action: BackendAction::PrepareFailed(BackendError::Unavailable),
            radius: 2.5,
            width: 100,
            height: 75,
        });
        rec.on_frame_hook(&FrameHookEvent {
            surface: ViewId::new(1, 1),
            frame_index: 1,
            outcome: CaptureOutcome::Skipped(SkipReason::BackendUnavailable),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["kind"], "hook");
        assert_eq!(parsed[0]["root"], "0@1");
        assert_eq!(parsed[0]["action"], "Subscribed");

        assert_eq!(parsed[1]["kind"], "backend");
        assert_eq!(parsed[1]["action"], "PrepareFailed");
        assert_eq!(parsed[1]["radius"], 2.5);

        assert_eq!(parsed[2]["seq"], 2);
        assert_eq!(parsed[2]["outcome"], "skipped");
        assert_eq!(parsed[2]["args"]["reason"], "BackendUnavailable");
    }

    #[test]
    fn export_names_release_reason() {
        let mut rec = RecorderSink::new();
        rec.on_buffer(&BufferEvent {
            action: BufferAction::Released(ReleaseReason::Dropped),
            width: 100,
            height: 75,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["kind"], "buffers");
        assert_eq!(parsed[0]["action"], "Released");
        assert_eq!(parsed[0]["reason"], "Dropped");
        assert_eq!(parsed[0]["width"], 100);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
