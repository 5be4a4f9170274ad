// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The blur surface orchestrator.
//!
//! A [`BlurSurface`] ties the other modules together for one host view:
//!
//! - the host tells it about attach, detach and container visibility, which
//!   drive the [`FrameCaptureScheduler`];
//! - once subscribed, the host calls [`on_pre_draw`](BlurSurface::on_pre_draw)
//!   every frame, which captures the bound root into the capture buffer,
//!   blurs it and requests a repaint when the result changed;
//! - the host's paint pass calls [`draw`](BlurSurface::draw), which
//!   composites the blurred result with rounding and tint.
//!
//! # Self-capture
//!
//! The surface sits inside the tree it captures. While any surface is
//! capturing, [`should_draw`](BlurSurface::should_draw) returns `false` and
//! hosts must skip painting blur surfaces met during the traversal. The
//! counter behind this is process-wide, so blur surfaces stacked on top of
//! each other do not see one another.

use alloc::boxed::Box;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;

use kurbo::Size;

use crate::backend::BlurBackend;
use crate::buffers::{BufferManager, PrepareOutcome};
use crate::canvas::{Canvas, PixmapCanvas};
use crate::color::Argb;
use crate::compositor;
use crate::config::{
    SurfaceConfig, check_blur_radius, check_corner_radius, check_downsample_factor,
    check_scale_factor,
};
use crate::error::ConfigError;
use crate::host::{SubscribeTicket, ViewHost, ViewId, find_window_root};
use crate::pixmap::PixmapId;
use crate::scheduler::{FrameCaptureScheduler, HookState};
use crate::trace::{FrameHookEvent, ReleaseReason, Tracer};

/// Why a frame-hook firing did not capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The surface's container is hidden.
    ContainerHidden,
    /// No root is bound, or the bound root was disposed.
    RootUnavailable,
    /// The surface itself is not on screen.
    NotShown,
    /// The surface has no area.
    EmptySurface,
    /// The blur radius is zero.
    BlurDisabled,
    /// Buffer allocation failed. Retried next frame.
    AllocationFailed,
    /// The backend could not be prepared. Retried next frame.
    BackendUnavailable,
}

/// What [`BlurSurface::on_pre_draw`] did with a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptureOutcome {
    /// The root was captured and blurred.
    Captured {
        /// Whether a repaint of the surface was requested.
        redraw: bool,
    },
    /// Nothing was captured.
    Skipped(SkipReason),
}

/// Counts captures in flight.
///
/// The process-wide instance backs [`rendering_count`] and
/// [`capture_in_flight`].
#[derive(Debug, Default)]
pub struct CaptureCounter {
    count: AtomicUsize,
}

/// Decrements its [`CaptureCounter`] on drop.
#[derive(Debug)]
#[must_use = "the capture ends when the guard is dropped"]
pub struct CaptureGuard<'a> {
    counter: &'a CaptureCounter,
}

impl CaptureCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }

    /// Number of captures currently running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Marks a capture as running until the guard drops.
    pub fn enter(&self) -> CaptureGuard<'_> {
        self.count.fetch_add(1, Ordering::AcqRel);
        CaptureGuard { counter: self }
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.counter.count.fetch_sub(1, Ordering::AcqRel);
    }
}

static CAPTURES: CaptureCounter = CaptureCounter::new();

/// Number of surfaces in the process currently painting into a capture
/// buffer.
#[must_use]
pub fn rendering_count() -> usize {
    CAPTURES.in_flight()
}

/// Whether any surface in the process is currently capturing.
///
/// Hosts that cannot borrow a blur surface during traversal use this in
/// place of [`BlurSurface::should_draw`].
#[must_use]
pub fn capture_in_flight() -> bool {
    rendering_count() > 0
}

/// A live backdrop-blur surface bound to one host view.
///
/// Hosts must call [`on_detached`](Self::on_detached) before dropping a
/// surface so that its frame hook is removed.
pub struct BlurSurface {
    view: ViewId,
    config: SurfaceConfig,
    backend: Box<dyn BlurBackend>,
    buffers: BufferManager,
    scheduler: FrameCaptureScheduler,
    container_visible: bool,
    explicit_root: bool,
    last_result: Option<PixmapId>,
    captures: &'static CaptureCounter,
    frame_index: u64,
}

impl fmt::Debug for BlurSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlurSurface")
            .field("view", &self.view)
            .field("config", &self.config)
            .field("buffers", &self.buffers)
            .field("scheduler", &self.scheduler)
            .field("container_visible", &self.container_visible)
            .field("explicit_root", &self.explicit_root)
            .field("last_result", &self.last_result)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl BlurSurface {
    /// Creates a surface for `view` with the default configuration.
    ///
    /// Pass the backend returned by
    /// [`BackendSelector::select`](crate::backend::BackendSelector::select).
    #[must_use]
    pub fn new(view: ViewId, backend: Box<dyn BlurBackend>) -> Self {
        let config = SurfaceConfig::new();
        Self {
            view,
            config,
            backend,
            buffers: BufferManager::new(),
            scheduler: FrameCaptureScheduler::new(view, config.subscribe_delay),
            container_visible: true,
            explicit_root: false,
            last_result: None,
            captures: &CAPTURES,
            frame_index: 0,
        }
    }

    /// Creates a surface with a validated configuration.
    pub fn with_config(
        view: ViewId,
        backend: Box<dyn BlurBackend>,
        config: SurfaceConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut surface = Self::new(view, backend);
        surface.config = config;
        surface.scheduler.set_delay(config.subscribe_delay);
        Ok(surface)
    }

    /// Uses `counter` instead of the process-wide capture counter.
    #[must_use]
    pub fn with_capture_counter(mut self, counter: &'static CaptureCounter) -> Self {
        self.captures = counter;
        self
    }

    /// The host view this surface draws into.
    #[must_use]
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// The capture/result buffers.
    #[must_use]
    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    /// The bound root, without a liveness check.
    #[must_use]
    pub fn root(&self) -> Option<ViewId> {
        self.scheduler.root()
    }

    /// The frame-hook subscription state.
    #[must_use]
    pub fn hook_state(&self) -> HookState {
        self.scheduler.state()
    }

    /// Number of frame-hook firings seen so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether the surface's container is visible.
    #[must_use]
    pub fn is_container_visible(&self) -> bool {
        self.container_visible
    }

    // -- Configuration ------------------------------------------------------

    /// Sets the downsample factor. Must be positive and finite.
    pub fn set_downsample_factor(
        &mut self,
        factor: f32,
        host: &mut dyn ViewHost,
    ) -> Result<(), ConfigError> {
        check_downsample_factor(factor)?;
        if factor != self.config.downsample_factor {
            self.config.downsample_factor = factor;
            self.buffers.mark_dirty();
            host.invalidate(self.view);
        }
        Ok(())
    }

    /// Sets the blur radius in logical units.
    ///
    /// Zero disables blurring: buffers and backend resources are released
    /// at once and the surface draws only its overlay color.
    pub fn set_blur_radius(
        &mut self,
        radius: f32,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), ConfigError> {
        check_blur_radius(radius)?;
        if radius == self.config.blur_radius {
            return Ok(());
        }
        self.config.blur_radius = radius;
        if radius == 0.0 {
            self.buffers.release(&mut *self.backend, ReleaseReason::Disabled, tracer);
            self.last_result = None;
        } else {
            self.buffers.mark_dirty();
        }
        host.invalidate(self.view);
        Ok(())
    }

    /// Sets the corner radius in logical units.
    pub fn set_corner_radius(
        &mut self,
        radius: f32,
        host: &mut dyn ViewHost,
    ) -> Result<(), ConfigError> {
        check_corner_radius(radius)?;
        if radius != self.config.corner_radius {
            self.config.corner_radius = radius;
            host.invalidate(self.view);
        }
        Ok(())
    }

    /// Sets the tint drawn over the blurred content.
    pub fn set_overlay_color(&mut self, color: Argb, host: &mut dyn ViewHost) {
        if color != self.config.overlay_color {
            self.config.overlay_color = color;
            host.invalidate(self.view);
        }
    }

    /// Sets the logical-to-physical pixel ratio.
    pub fn set_scale_factor(
        &mut self,
        scale: f32,
        host: &mut dyn ViewHost,
    ) -> Result<(), ConfigError> {
        check_scale_factor(scale)?;
        if scale != self.config.scale_factor {
            self.config.scale_factor = scale;
            self.buffers.mark_dirty();
            host.invalidate(self.view);
        }
        Ok(())
    }

    /// Sets the delay before deferred subscribe attempts run.
    pub fn set_subscribe_delay(&mut self, delay: Duration) {
        self.config.subscribe_delay = delay;
        self.scheduler.set_delay(delay);
    }

    /// Binds the surface to an explicit root, overriding the attach-time
    /// window lookup.
    ///
    /// `None` unbinds, which stops capturing until the next attach.
    pub fn set_root(
        &mut self,
        root: Option<ViewId>,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) {
        self.explicit_root = root.is_some();
        if self.scheduler.bind(root, host, tracer) {
            self.last_result = None;
            host.invalidate(self.view);
        }
    }

    // -- Host notifications -------------------------------------------------

    /// The surface's view was attached to the live view tree.
    ///
    /// Without an explicit root, binds to the decor view of the owning
    /// window. Subscribing to its frame hook is deferred.
    pub fn on_attached(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        if !self.explicit_root {
            let root = find_window_root(host, self.view, self.config.max_root_hops);
            self.scheduler.bind(root, host, tracer);
        }
        self.scheduler.attach(host, tracer);
    }

    /// The surface's view was detached. Unsubscribes and releases all
    /// buffers and backend resources.
    pub fn on_detached(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        self.scheduler.detach(host, tracer);
        self.buffers.release(&mut *self.backend, ReleaseReason::Detached, tracer);
        self.last_result = None;
        if !self.explicit_root {
            self.scheduler.bind(None, host, tracer);
        }
    }

    /// The surface's logical container became visible or hidden.
    pub fn set_container_visible(
        &mut self,
        visible: bool,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) {
        self.container_visible = visible;
        if visible {
            self.scheduler.enable_auto_update(host, tracer);
        } else {
            self.scheduler.disable_auto_update(host, tracer);
        }
    }

    /// Runs a deferred subscribe ticket this surface posted earlier.
    ///
    /// Returns whether the surface is subscribed afterwards.
    pub fn run_deferred(
        &mut self,
        ticket: SubscribeTicket,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        self.scheduler.run_deferred(ticket, host, tracer)
    }

    // -- Frame pipeline -----------------------------------------------------

    /// The frame hook: captures and blurs the bound root.
    pub fn on_pre_draw(
        &mut self,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) -> CaptureOutcome {
        self.frame_index += 1;
        let outcome = self.capture(host, tracer);
        tracer.frame_hook(&FrameHookEvent {
            surface: self.view,
            frame_index: self.frame_index,
            outcome,
        });
        outcome
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "view sizes are far below u32::MAX; truncation is the intended floor"
    )]
    fn capture(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) -> CaptureOutcome {
        if !self.container_visible {
            return CaptureOutcome::Skipped(SkipReason::ContainerHidden);
        }
        let Some(root) = self.scheduler.live_root(host) else {
            return CaptureOutcome::Skipped(SkipReason::RootUnavailable);
        };
        if !host.is_shown(self.view) {
            return CaptureOutcome::Skipped(SkipReason::NotShown);
        }
        let size = host.size(self.view);
        if !(size.width >= 1.0 && size.height >= 1.0) {
            return CaptureOutcome::Skipped(SkipReason::EmptySurface);
        }

        let outcome = self.buffers.ensure(
            &mut *self.backend,
            size.width as u32,
            size.height as u32,
            self.config.downsample_factor,
            self.config.physical_blur_radius(),
            tracer,
        );
        let reason = match outcome {
            PrepareOutcome::Ready => None,
            PrepareOutcome::Disabled => Some(SkipReason::BlurDisabled),
            PrepareOutcome::AllocationFailed => Some(SkipReason::AllocationFailed),
            PrepareOutcome::BackendFailed => Some(SkipReason::BackendUnavailable),
        };
        if let Some(reason) = reason {
            self.last_result = None;
            return CaptureOutcome::Skipped(reason);
        }
        let Some((capture, result)) = self.buffers.buffers_mut() else {
            return CaptureOutcome::Skipped(SkipReason::AllocationFailed);
        };

        // Position of the surface in root coordinates.
        let offset = host.screen_origin(self.view) - host.screen_origin(root);
        let clear = self.config.overlay_color.with_alpha(0);
        {
            let _guard = self.captures.enter();
            let scale_x = f64::from(capture.width()) / size.width;
            let scale_y = f64::from(capture.height()) / size.height;
            let mut canvas = PixmapCanvas::new(capture);
            canvas.clear(clear);
            canvas.save();
            canvas.scale(scale_x, scale_y);
            canvas.translate(-offset);
            host.draw_background(root, &mut canvas);
            host.draw(root, &mut canvas);
            canvas.restore();
        }
        self.backend.blur(capture, result);

        let id = result.id();
        let different_root = host.tree_root(self.view) != Some(root);
        let redraw = self.last_result != Some(id) || different_root;
        self.last_result = Some(id);
        if redraw {
            host.invalidate(self.view);
        }
        CaptureOutcome::Captured { redraw }
    }

    /// Whether the surface may paint itself now.
    ///
    /// `false` while any surface sharing this surface's capture counter is
    /// capturing, this one included.
    #[must_use]
    pub fn should_draw(&self) -> bool {
        self.captures.in_flight() == 0
    }

    /// Paints the blurred result, rounded and tinted, into `canvas`.
    ///
    /// Draws only the overlay when no blurred frame is available. Returns
    /// `false` without drawing when [`should_draw`](Self::should_draw) is
    /// `false`.
    pub fn draw(&self, canvas: &mut dyn Canvas, host: &dyn ViewHost) -> bool {
        if !self.should_draw() {
            return false;
        }
        let blurred = self
            .buffers
            .result()
            .filter(|result| self.last_result == Some(result.id()));
        let size: Size = host.size(self.view);
        compositor::draw_rounded(
            canvas,
            blurred,
            self.config.overlay_color,
            self.config.physical_corner_radius(),
            size,
        );
        true
    }
}

impl Drop for BlurSurface {
    fn drop(&mut self) {
        self.buffers.release(&mut *self.backend, ReleaseReason::Dropped, &mut Tracer::none());
    }
}
