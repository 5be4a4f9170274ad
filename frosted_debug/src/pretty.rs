// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use frosted_core::host::ViewId;
use frosted_core::surface::CaptureOutcome;
use frosted_core::trace::{
    BackendAction, BackendEvent, BufferAction, BufferEvent, FrameHookEvent, ReleaseReason,
    SubscriptionAction, SubscriptionEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct View(ViewId);

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.0.index(), self.0.generation())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_hook(&mut self, e: &FrameHookEvent) {
        let outcome = match e.outcome {
            CaptureOutcome::Captured { redraw: true } => "captured+redraw".to_owned(),
            CaptureOutcome::Captured { redraw: false } => "captured".to_owned(),
            CaptureOutcome::Skipped(reason) => format!("skipped({reason:?})"),
        };
        let _ = writeln!(
            self.writer,
            "[frame] surface={} frame={} {outcome}",
            View(e.surface),
            e.frame_index,
        );
    }

    fn on_buffer(&mut self, e: &BufferEvent) {
        let action = match e.action {
            BufferAction::Allocated => "alloc",
            BufferAction::Released(ReleaseReason::Resized) => "release(resize)",
            BufferAction::Released(ReleaseReason::Disabled) => "release(disable)",
            BufferAction::Released(ReleaseReason::Detached) => "release(detach)",
            BufferAction::Released(ReleaseReason::Dropped) => "release(drop)",
            BufferAction::AllocationFailed => "ALLOC FAILED",
        };
        let _ = writeln!(self.writer, "[buffers] {action} {}x{}", e.width, e.height);
    }

    fn on_backend(&mut self, e: &BackendEvent) {
        let _ = match e.action {
            BackendAction::Prepared => writeln!(
                self.writer,
                "[backend] prepare {}x{} radius={:.2}",
                e.width, e.height, e.radius,
            ),
            BackendAction::PrepareFailed(err) => writeln!(
                self.writer,
                "[backend] PREPARE FAILED {}x{} radius={:.2}: {err}",
                e.width, e.height, e.radius,
            ),
            BackendAction::Released => writeln!(self.writer, "[backend] release"),
        };
    }

    fn on_subscription(&mut self, e: &SubscriptionEvent) {
        let action = match e.action {
            SubscriptionAction::Scheduled => "scheduled",
            SubscriptionAction::Subscribed => "subscribed",
            SubscriptionAction::Unsubscribed => "unsubscribed",
            SubscriptionAction::Stale => "stale",
            SubscriptionAction::RootUnavailable => "root unavailable",
        };
        let _ = match e.root {
            Some(root) => writeln!(
                self.writer,
                "[hook] surface={} root={} {action}",
                View(e.surface),
                View(root),
            ),
            None => writeln!(
                self.writer,
                "[hook] surface={} root=none {action}",
                View(e.surface),
            ),
        };
    }
}
