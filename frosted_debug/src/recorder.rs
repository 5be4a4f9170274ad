// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use frosted_core::error::BackendError;
use frosted_core::host::ViewId;
use frosted_core::surface::{CaptureOutcome, SkipReason};
use frosted_core::trace::{
    BackendAction, BackendEvent, BufferAction, BufferEvent, FrameHookEvent, ReleaseReason,
    SubscriptionAction, SubscriptionEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_HOOK: u8 = 1;
const TAG_BUFFER: u8 = 2;
const TAG_BACKEND: u8 = 3;
const TAG_SUBSCRIPTION: u8 = 4;

const SKIP_REASONS: [SkipReason; 7] = [
    SkipReason::ContainerHidden,
    SkipReason::RootUnavailable,
    SkipReason::NotShown,
    SkipReason::EmptySurface,
    SkipReason::BlurDisabled,
    SkipReason::AllocationFailed,
    SkipReason::BackendUnavailable,
];

const RELEASE_REASONS: [ReleaseReason; 4] = [
    ReleaseReason::Resized,
    ReleaseReason::Disabled,
    ReleaseReason::Detached,
    ReleaseReason::Dropped,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_view(&mut self, v: ViewId) {
        self.write_u32(v.index());
        self.write_u32(v.generation());
    }

    fn write_option_view(&mut self, v: Option<ViewId>) {
        match v {
            Some(view) => {
                self.write_u8(1);
                self.write_view(view);
            }
            None => {
                self.write_u8(0);
                self.write_view(ViewId::new(0, 0));
            }
        }
    }

    fn write_outcome(&mut self, outcome: CaptureOutcome) {
        self.write_u8(match outcome {
            CaptureOutcome::Captured { redraw: false } => 0,
            CaptureOutcome::Captured { redraw: true } => 1,
            CaptureOutcome::Skipped(reason) => {
                let idx = SKIP_REASONS.iter().position(|&r| r == reason).unwrap_or(0);
                2 + u8::try_from(idx).unwrap_or(0)
            }
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_hook(&mut self, e: &FrameHookEvent) {
        self.write_u8(TAG_FRAME_HOOK);
        self.write_view(e.surface);
        self.write_u64(e.frame_index);
        self.write_outcome(e.outcome);
    }

    fn on_buffer(&mut self, e: &BufferEvent) {
        self.write_u8(TAG_BUFFER);
        self.write_u8(match e.action {
            BufferAction::Allocated => 0,
            BufferAction::AllocationFailed => 1,
            BufferAction::Released(reason) => {
                let idx = RELEASE_REASONS.iter().position(|&r| r == reason).unwrap_or(0);
                2 + u8::try_from(idx).unwrap_or(0)
            }
        });
        self.write_u32(e.width);
        self.write_u32(e.height);
    }

    fn on_backend(&mut self, e: &BackendEvent) {
        self.write_u8(TAG_BACKEND);
        self.write_u8(match e.action {
            BackendAction::Prepared => 0,
            BackendAction::PrepareFailed(BackendError::Unavailable) => 1,
            BackendAction::PrepareFailed(BackendError::Allocation) => 2,
            BackendAction::Released => 3,
        });
        self.write_f32(e.radius);
        self.write_u32(e.width);
        self.write_u32(e.height);
    }

    fn on_subscription(&mut self, e: &SubscriptionEvent) {
        self.write_u8(TAG_SUBSCRIPTION);
        self.write_view(e.surface);
        self.write_option_view(e.root);
        self.write_u8(match e.action {
            SubscriptionAction::Scheduled => 0,
            SubscriptionAction::Subscribed => 1,
            SubscriptionAction::Unsubscribed => 2,
            SubscriptionAction::Stale => 3,
            SubscriptionAction::RootUnavailable => 4,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`FrameHookEvent`].
    FrameHook(FrameHookEvent),
    /// A [`BufferEvent`].
    Buffer(BufferEvent),
    /// A [`BackendEvent`].
    Backend(BackendEvent),
    /// A [`SubscriptionEvent`].
    Subscription(SubscriptionEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.read_u32().map(f32::from_bits)
    }

    fn read_view(&mut self) -> Option<ViewId> {
        let idx = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(ViewId::new(idx, generation))
    }

    fn read_option_view(&mut self) -> Option<Option<ViewId>> {
        let present = self.read_u8()?;
        let view = self.read_view()?;
        Some((present != 0).then_some(view))
    }

    fn read_outcome(&mut self) -> Option<CaptureOutcome> {
        Some(match self.read_u8()? {
            0 => CaptureOutcome::Captured { redraw: false },
            1 => CaptureOutcome::Captured { redraw: true },
            n => CaptureOutcome::Skipped(*SKIP_REASONS.get(usize::from(n - 2))?),
        })
    }

    fn decode_frame_hook(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameHook(FrameHookEvent {
            surface: self.read_view()?,
            frame_index: self.read_u64()?,
            outcome: self.read_outcome()?,
        }))
    }

    fn decode_buffer(&mut self) -> Option<RecordedEvent> {
        let action = match self.read_u8()? {
            0 => BufferAction::Allocated,
            1 => BufferAction::AllocationFailed,
            n => BufferAction::Released(*RELEASE_REASONS.get(usize::from(n - 2))?),
        };
        Some(RecordedEvent::Buffer(BufferEvent {
            action,
            width: self.read_u32()?,
            height: self.read_u32()?,
        }))
    }

    fn decode_backend(&mut self) -> Option<RecordedEvent> {
        let action = match self.read_u8()? {
            0 => BackendAction::Prepared,
            1 => BackendAction::PrepareFailed(BackendError::Unavailable),
            2 => BackendAction::PrepareFailed(BackendError::Allocation),
            _ => BackendAction::Released,
        };
        Some(RecordedEvent::Backend(BackendEvent {
            action,
            radius: self.read_f32()?,
            width: self.read_u32()?,
            height: self.read_u32()?,
        }))
    }

    fn decode_subscription(&mut self) -> Option<RecordedEvent> {
        let surface = self.read_view()?;
        let root = self.read_option_view()?;
        let action = match self.read_u8()? {
            0 => SubscriptionAction::Scheduled,
            1 => SubscriptionAction::Subscribed,
            2 => SubscriptionAction::Unsubscribed,
            3 => SubscriptionAction::Stale,
            _ => SubscriptionAction::RootUnavailable,
        };
        Some(RecordedEvent::Subscription(SubscriptionEvent {
            surface,
            root,
            action,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_HOOK => self.decode_frame_hook(),
            TAG_BUFFER => self.decode_buffer(),
            TAG_BACKEND => self.decode_backend(),
            TAG_SUBSCRIPTION => self.decode_subscription(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
