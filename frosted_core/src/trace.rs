// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the capture pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls as buffers, backends and frame-hook subscriptions change
//! state. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::error::BackendError;
use crate::host::ViewId;
use crate::surface::CaptureOutcome;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to the capture/result buffer pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferAction {
    /// Both buffers were allocated.
    Allocated,
    /// Both buffers were released.
    Released(ReleaseReason),
    /// Allocation failed; nothing is held.
    AllocationFailed,
}

/// Why the capture/result buffer pair was released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReleaseReason {
    /// The surface size or downsampling changed.
    Resized,
    /// The blur radius dropped to zero.
    Disabled,
    /// The surface left the view tree.
    Detached,
    /// The surface was dropped.
    Dropped,
}

/// What happened to the blur backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendAction {
    /// `prepare` succeeded.
    Prepared,
    /// `prepare` failed.
    PrepareFailed(BackendError),
    /// Backend resources were released.
    Released,
}

/// What happened to a surface's frame-hook subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionAction {
    /// A deferred subscribe attempt was posted to the host.
    Scheduled,
    /// The surface now receives frame hooks.
    Subscribed,
    /// The surface no longer receives frame hooks.
    Unsubscribed,
    /// A deferred attempt ran but its ticket was stale.
    Stale,
    /// A subscribe attempt found no live root or observer.
    RootUnavailable,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per frame-hook firing.
#[derive(Clone, Copy, Debug)]
pub struct FrameHookEvent {
    /// The surface the hook fired for.
    pub surface: ViewId,
    /// Per-surface frame-hook counter.
    pub frame_index: u64,
    /// What the surface did with the frame.
    pub outcome: CaptureOutcome,
}

/// Emitted when the capture/result buffers change.
#[derive(Clone, Copy, Debug)]
pub struct BufferEvent {
    /// What happened.
    pub action: BufferAction,
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
}

/// Emitted when the backend is prepared or released.
#[derive(Clone, Copy, Debug)]
pub struct BackendEvent {
    /// What happened.
    pub action: BackendAction,
    /// Effective radius in buffer pixels (0 for releases).
    pub radius: f32,
    /// Prepared buffer width (0 for releases).
    pub width: u32,
    /// Prepared buffer height (0 for releases).
    pub height: u32,
}

/// Emitted when a frame-hook subscription changes.
#[derive(Clone, Copy, Debug)]
pub struct SubscriptionEvent {
    /// The surface whose subscription changed.
    pub surface: ViewId,
    /// The root the surface is bound to, if any.
    pub root: Option<ViewId>,
    /// What happened.
    pub action: SubscriptionAction,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called once per frame-hook firing.
    fn on_frame_hook(&mut self, e: &FrameHookEvent) {
        _ = e;
    }

    /// Called when buffers are allocated or released.
    fn on_buffer(&mut self, e: &BufferEvent) {
        _ = e;
    }

    /// Called when the backend is prepared or released.
    fn on_backend(&mut self, e: &BackendEvent) {
        _ = e;
    }

    /// Called when a subscription changes.
    fn on_subscription(&mut self, e: &SubscriptionEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameHookEvent`].
    #[inline]
    pub fn frame_hook(&mut self, e: &FrameHookEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_hook(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BufferEvent`].
    #[inline]
    pub fn buffer(&mut self, e: &BufferEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_buffer(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BackendEvent`].
    #[inline]
    pub fn backend(&mut self, e: &BackendEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_backend(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubscriptionEvent`].
    #[inline]
    pub fn subscription(&mut self, e: &SubscriptionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_subscription(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
