// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture/result buffer lifecycle.
//!
//! [`BufferManager`] owns two identically sized [`Pixmap`]s: the capture
//! buffer the host paints into, and the result buffer the backend blurs into.
//! [`ensure`](BufferManager::ensure) runs once per frame before capturing and
//! brings three things in line with the current geometry:
//!
//! 1. **Geometry** — [`BufferGeometry::compute`] derives the effective radius
//!    and the downsampled dimensions, downsampling further once the radius
//!    would exceed [`MAX_BLUR_RADIUS`].
//! 2. **Buffers** — reallocated together whenever the dimensions change. The
//!    old pair and the backend's resources are always released before the new
//!    pair is allocated.
//! 3. **Backend** — re-prepared while the manager is dirty. The dirty flag is
//!    set by configuration changes and reallocation, and cleared only by a
//!    successful prepare for the current radius.

use crate::backend::{BlurBackend, MAX_BLUR_RADIUS};
use crate::pixmap::Pixmap;
use crate::trace::{BackendAction, BackendEvent, BufferAction, BufferEvent, ReleaseReason, Tracer};

/// Downsampled buffer dimensions and backend radius for one surface size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferGeometry {
    /// Downsample factor actually applied (may exceed the requested one).
    pub downsample_factor: f32,
    /// Radius handed to the backend, in buffer pixels.
    pub radius: f32,
    /// Buffer width, at least 1.
    pub width: u32,
    /// Buffer height, at least 1.
    pub height: u32,
}

impl BufferGeometry {
    /// Computes the geometry for a surface of `width × height` physical
    /// pixels.
    ///
    /// `downsample_factor` must be positive and `radius` (physical pixels)
    /// non-negative; both are validated by the configuration API.
    #[must_use]
    pub fn compute(width: u32, height: u32, downsample_factor: f32, radius: f32) -> Self {
        let mut factor = downsample_factor;
        let mut radius = radius / factor;
        if radius > MAX_BLUR_RADIUS {
            factor = factor * radius / MAX_BLUR_RADIUS;
            radius = MAX_BLUR_RADIUS;
        }
        Self {
            downsample_factor: factor,
            radius,
            width: scaled_dimension(width, factor),
            height: scaled_dimension(height, factor),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate; truncation is the intended floor"
)]
fn scaled_dimension(len: u32, factor: f32) -> u32 {
    ((len as f32 / factor) as u32).max(1)
}

/// Why [`BufferManager::ensure`] did or did not leave the buffers ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrepareOutcome {
    /// Buffers exist at the right size and the backend is primed.
    Ready,
    /// The blur radius is zero; everything was released.
    Disabled,
    /// Buffer allocation failed; everything was released. Retry next frame.
    AllocationFailed,
    /// The backend refused to prepare. Buffers are kept for a retry.
    BackendFailed,
}

impl PrepareOutcome {
    /// Returns `true` for [`PrepareOutcome::Ready`].
    #[inline]
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Allocation counters, for leak checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferStats {
    /// Buffers allocated over the manager's lifetime.
    pub allocated: u64,
    /// Buffers released over the manager's lifetime.
    pub released: u64,
}

impl BufferStats {
    /// Buffers currently held.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.allocated - self.released
    }
}

/// Owns the capture and result buffers of one surface.
#[derive(Debug)]
pub struct BufferManager {
    capture: Option<Pixmap>,
    result: Option<Pixmap>,
    geometry: Option<BufferGeometry>,
    prepared_radius: Option<f32>,
    dirty: bool,
    stats: BufferStats,
}

impl Default for BufferManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferManager {
    /// Creates a manager holding no buffers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capture: None,
            result: None,
            geometry: None,
            prepared_radius: None,
            dirty: true,
            stats: BufferStats::default(),
        }
    }

    /// Whether the backend must be re-prepared before the next blur.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces a re-prepare on the next [`ensure`](Self::ensure).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The geometry computed by the last [`ensure`](Self::ensure), if buffers
    /// are held.
    #[must_use]
    pub fn geometry(&self) -> Option<BufferGeometry> {
        self.geometry
    }

    /// The radius the backend was last successfully prepared with.
    #[must_use]
    pub fn prepared_radius(&self) -> Option<f32> {
        self.prepared_radius
    }

    /// Dimensions of the held buffers.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.capture.as_ref().map(Pixmap::dimensions)
    }

    /// The capture buffer, if held.
    #[must_use]
    pub fn capture(&self) -> Option<&Pixmap> {
        self.capture.as_ref()
    }

    /// The result buffer, if held.
    #[must_use]
    pub fn result(&self) -> Option<&Pixmap> {
        self.result.as_ref()
    }

    /// Both buffers, mutably, if held.
    pub fn buffers_mut(&mut self) -> Option<(&mut Pixmap, &mut Pixmap)> {
        self.capture.as_mut().zip(self.result.as_mut())
    }

    /// Allocation counters.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    /// Makes the buffers and backend ready for a `width × height` surface.
    ///
    /// `radius` is in physical pixels; zero disables blurring and releases
    /// everything.
    pub fn ensure(
        &mut self,
        backend: &mut dyn BlurBackend,
        width: u32,
        height: u32,
        downsample_factor: f32,
        radius: f32,
        tracer: &mut Tracer<'_>,
    ) -> PrepareOutcome {
        if radius <= 0.0 {
            self.release(backend, ReleaseReason::Disabled, tracer);
            return PrepareOutcome::Disabled;
        }

        let geometry = BufferGeometry::compute(width, height, downsample_factor, radius);
        let dims = (geometry.width, geometry.height);
        if self.dimensions() != Some(dims) {
            self.release(backend, ReleaseReason::Resized, tracer);
            match (Pixmap::try_new(dims.0, dims.1), Pixmap::try_new(dims.0, dims.1)) {
                (Ok(capture), Ok(result)) => {
                    self.capture = Some(capture);
                    self.result = Some(result);
                    self.stats.allocated += 2;
                    self.dirty = true;
                    tracer.buffer(&BufferEvent {
                        action: BufferAction::Allocated,
                        width: dims.0,
                        height: dims.1,
                    });
                }
                _ => {
                    tracer.buffer(&BufferEvent {
                        action: BufferAction::AllocationFailed,
                        width: dims.0,
                        height: dims.1,
                    });
                    return PrepareOutcome::AllocationFailed;
                }
            }
        }
        self.geometry = Some(geometry);

        if self.dirty || self.prepared_radius != Some(geometry.radius) {
            let Some(capture) = self.capture.as_ref() else {
                return PrepareOutcome::AllocationFailed;
            };
            if self.prepared_radius.take().is_some() {
                backend.release();
            }
            match backend.prepare(capture, geometry.radius) {
                Ok(()) => {
                    self.prepared_radius = Some(geometry.radius);
                    self.dirty = false;
                    tracer.backend(&BackendEvent {
                        action: BackendAction::Prepared,
                        radius: geometry.radius,
                        width: dims.0,
                        height: dims.1,
                    });
                }
                Err(err) => {
                    tracer.backend(&BackendEvent {
                        action: BackendAction::PrepareFailed(err),
                        radius: geometry.radius,
                        width: dims.0,
                        height: dims.1,
                    });
                    return PrepareOutcome::BackendFailed;
                }
            }
        }
        PrepareOutcome::Ready
    }

    /// Releases both buffers and the backend's resources. Idempotent.
    ///
    /// `reason` is reported on the [`BufferEvent`] if buffers were held.
    pub fn release(
        &mut self,
        backend: &mut dyn BlurBackend,
        reason: ReleaseReason,
        tracer: &mut Tracer<'_>,
    ) {
        backend.release();
        if self.prepared_radius.take().is_some() {
            tracer.backend(&BackendEvent {
                action: BackendAction::Released,
                radius: 0.0,
                width: 0,
                height: 0,
            });
        }

        let dims = self.dimensions();
        let released =
            u64::from(self.capture.take().is_some()) + u64::from(self.result.take().is_some());
        if released > 0 {
            self.stats.released += released;
            let (width, height) = dims.unwrap_or_default();
            tracer.buffer(&BufferEvent {
                action: BufferAction::Released(reason),
                width,
                height,
            });
        }
        self.geometry = None;
        self.dirty = true;
    }
}
