// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blur backend contract and process-wide backend selection.
//!
//! The actual blur convolution lives behind [`BlurBackend`], so backend
//! crates can provide CPU, GPU or platform-native implementations. A backend
//! is stateful: [`prepare`](BlurBackend::prepare) allocates resources sized to
//! one buffer and one radius, [`blur`](BlurBackend::blur) runs a pass, and
//! [`release`](BlurBackend::release) frees everything.
//!
//! # Selection
//!
//! Whether a capable backend works at all is decided once per process by a
//! trial prepare/release on a throwaway 4×4 buffer (see
//! [`BackendSelector`]). If the trial fails, every surface created afterwards
//! gets a [`NoopBackend`], which renders an unblurred surface instead of
//! failing.

use alloc::boxed::Box;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::BackendError;
use crate::pixmap::Pixmap;

/// Largest radius, in buffer pixels, a backend is ever asked to prepare for.
///
/// Larger requests are satisfied by downsampling further (see
/// [`BufferGeometry::compute`](crate::buffers::BufferGeometry::compute)).
pub const MAX_BLUR_RADIUS: f32 = 25.0;

/// A replaceable blur implementation.
pub trait BlurBackend {
    /// Allocates resources sized to `buffer` and configures the blur strength
    /// for `radius` (in buffer pixels, `0 < radius <= MAX_BLUR_RADIUS`).
    ///
    /// Resources are retained until [`release`](Self::release). Any
    /// previously prepared resources are released first.
    fn prepare(&mut self, buffer: &Pixmap, radius: f32) -> Result<(), BackendError>;

    /// Frees all backend resources. Idempotent; safe to call when nothing was
    /// prepared.
    fn release(&mut self);

    /// Blurs `input` into `output`.
    ///
    /// The caller guarantees a successful [`prepare`](Self::prepare) for
    /// buffers of exactly this size. Implementations may panic or produce
    /// garbage otherwise.
    fn blur(&mut self, input: &Pixmap, output: &mut Pixmap);
}

/// The fallback backend: never prepares, never blurs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopBackend;

impl BlurBackend for NoopBackend {
    fn prepare(&mut self, _buffer: &Pixmap, _radius: f32) -> Result<(), BackendError> {
        Err(BackendError::Unavailable)
    }

    fn release(&mut self) {}

    fn blur(&mut self, _input: &Pixmap, _output: &mut Pixmap) {}
}

/// Constructs a fresh instance of a capable backend.
pub type BackendFactory = fn() -> Box<dyn BlurBackend>;

/// Result of the one-time backend probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendAvailability {
    /// The probe has not run yet.
    Unprobed,
    /// The probe succeeded; the capable backend is used.
    Capable,
    /// The probe failed; [`NoopBackend`] is used.
    Unavailable,
}

const UNPROBED: u8 = 0;
const CAPABLE: u8 = 1;
const UNAVAILABLE: u8 = 2;

/// Caches the outcome of a one-time backend probe.
///
/// The process-wide instance is [`BACKEND_SELECTOR`]. The first call to
/// [`select`](Self::select) probes; later calls reuse the cached answer.
/// The probe runs on the UI thread before any surface exists, so a racing
/// second probe is harmless and both arrive at the same answer.
#[derive(Debug)]
pub struct BackendSelector {
    state: AtomicU8,
}

/// The process-wide backend selector.
pub static BACKEND_SELECTOR: BackendSelector = BackendSelector::new();

impl Default for BackendSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendSelector {
    /// Creates an unprobed selector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNPROBED),
        }
    }

    /// Returns the cached probe outcome without probing.
    #[must_use]
    pub fn availability(&self) -> BackendAvailability {
        match self.state.load(Ordering::Acquire) {
            CAPABLE => BackendAvailability::Capable,
            UNAVAILABLE => BackendAvailability::Unavailable,
            _ => BackendAvailability::Unprobed,
        }
    }

    /// Returns a backend for a new surface: a fresh instance from `factory`
    /// if the capable backend passed its probe, a [`NoopBackend`] otherwise.
    #[must_use]
    pub fn select(&self, factory: BackendFactory) -> Box<dyn BlurBackend> {
        if self.probe(factory) {
            factory()
        } else {
            Box::new(NoopBackend)
        }
    }

    /// Runs the trial prepare/release if it has not run yet and returns
    /// whether the capable backend is usable.
    pub fn probe(&self, factory: BackendFactory) -> bool {
        match self.availability() {
            BackendAvailability::Capable => true,
            BackendAvailability::Unavailable => false,
            BackendAvailability::Unprobed => {
                let capable = trial(factory);
                let state = if capable { CAPABLE } else { UNAVAILABLE };
                self.state.store(state, Ordering::Release);
                capable
            }
        }
    }
}

fn trial(factory: BackendFactory) -> bool {
    let Ok(buffer) = Pixmap::try_new(4, 4) else {
        return false;
    };
    let mut backend = factory();
    let prepared = backend.prepare(&buffer, 4.0).is_ok();
    backend.release();
    prepared
}
