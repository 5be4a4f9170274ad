// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles: an in-memory view tree, a recording backend and a recording
//! canvas.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

use kurbo::{Affine, Point, Rect, RoundedRect, Size, Vec2};

use crate::backend::BlurBackend;
use crate::canvas::{Canvas, Paint};
use crate::color::Argb;
use crate::error::BackendError;
use crate::host::{ContextId, SubscribeTicket, ViewHost, ViewId};
use crate::pixmap::{Pixmap, PixmapId};
use crate::surface::{BlurSurface, CaptureCounter};
use crate::trace::Tracer;

// ---------------------------------------------------------------------------
// MockHost
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MockView {
    generation: u32,
    alive: bool,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Relative to the parent.
    origin: Point,
    size: Size,
    shown: bool,
    context: Option<ContextId>,
    fill: Option<Argb>,
    background: Option<Argb>,
    observer_alive: bool,
    blur_surface: bool,
}

#[derive(Debug)]
struct MockContext {
    base: Option<ContextId>,
    decor: Option<ViewId>,
}

/// An in-memory view tree.
///
/// Views paint their fill color over their bounds. Views marked as blur
/// surfaces are skipped while the configured capture counter is non-zero.
#[derive(Debug, Default)]
pub(crate) struct MockHost {
    views: Vec<MockView>,
    contexts: Vec<MockContext>,
    hooks: Vec<(ViewId, ViewId)>,
    posted: Vec<(Duration, SubscribeTicket)>,
    invalidated: Vec<ViewId>,
    counter: Option<&'static CaptureCounter>,
    self_skips: usize,
}

impl MockHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push_view(&mut self, parent: Option<usize>, origin: Point, size: Size) -> ViewId {
        let idx = self.views.len();
        self.views.push(MockView {
            generation: 1,
            alive: true,
            parent,
            children: Vec::new(),
            origin,
            size,
            shown: true,
            context: None,
            fill: None,
            background: None,
            observer_alive: parent.is_none(),
            blur_surface: false,
        });
        if let Some(parent) = parent {
            self.views[parent].children.push(idx);
        }
        ViewId::new(u32::try_from(idx).unwrap(), 1)
    }

    fn slot(&self, view: ViewId) -> Option<&MockView> {
        self.views
            .get(view.index() as usize)
            .filter(|v| v.alive && v.generation == view.generation())
    }

    fn slot_mut(&mut self, view: ViewId) -> &mut MockView {
        let v = &mut self.views[view.index() as usize];
        assert_eq!(v.generation, view.generation(), "stale view handle");
        v
    }

    /// Adds a top-level view at the screen origin.
    pub(crate) fn add_root(&mut self, size: Size) -> ViewId {
        self.push_view(None, Point::ZERO, size)
    }

    /// Adds a child of `parent` at `origin` relative to it.
    pub(crate) fn add_view(&mut self, parent: ViewId, origin: Point, size: Size) -> ViewId {
        self.push_view(Some(parent.index() as usize), origin, size)
    }

    /// Adds a context wrapping `base`, owning the window of `decor` if set.
    pub(crate) fn add_context(
        &mut self,
        base: Option<ContextId>,
        decor: Option<ViewId>,
    ) -> ContextId {
        self.contexts.push(MockContext { base, decor });
        ContextId(u32::try_from(self.contexts.len() - 1).unwrap())
    }

    pub(crate) fn set_context(&mut self, view: ViewId, context: ContextId) {
        self.slot_mut(view).context = Some(context);
    }

    pub(crate) fn set_fill(&mut self, view: ViewId, color: Argb) {
        self.slot_mut(view).fill = Some(color);
    }

    pub(crate) fn set_background(&mut self, view: ViewId, color: Argb) {
        self.slot_mut(view).background = Some(color);
    }

    pub(crate) fn set_shown(&mut self, view: ViewId, shown: bool) {
        self.slot_mut(view).shown = shown;
    }

    pub(crate) fn set_size(&mut self, view: ViewId, size: Size) {
        self.slot_mut(view).size = size;
    }

    pub(crate) fn set_observer_alive(&mut self, root: ViewId, alive: bool) {
        self.slot_mut(root).observer_alive = alive;
    }

    pub(crate) fn mark_blur_surface(&mut self, view: ViewId) {
        self.slot_mut(view).blur_surface = true;
    }

    pub(crate) fn set_capture_counter(&mut self, counter: &'static CaptureCounter) {
        self.counter = Some(counter);
    }

    /// Moves `view` to the end of its parent's paint order.
    pub(crate) fn reorder_last(&mut self, view: ViewId) {
        let idx = view.index() as usize;
        if let Some(parent) = self.views[idx].parent {
            let children = &mut self.views[parent].children;
            children.retain(|&c| c != idx);
            children.push(idx);
        }
    }

    /// Disposes `view`. A disposed root takes its observer and hooks along.
    pub(crate) fn dispose(&mut self, view: ViewId) {
        self.slot_mut(view).alive = false;
        self.hooks.retain(|&(root, _)| root != view);
    }

    pub(crate) fn has_hook(&self, root: ViewId, surface: ViewId) -> bool {
        self.hooks.contains(&(root, surface))
    }

    pub(crate) fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub(crate) fn posted(&self) -> &[(Duration, SubscribeTicket)] {
        &self.posted
    }

    pub(crate) fn take_posted(&mut self) -> Vec<(Duration, SubscribeTicket)> {
        core::mem::take(&mut self.posted)
    }

    pub(crate) fn invalidated(&self) -> &[ViewId] {
        &self.invalidated
    }

    pub(crate) fn take_invalidated(&mut self) -> Vec<ViewId> {
        core::mem::take(&mut self.invalidated)
    }

    /// Blur surfaces skipped during captures so far.
    pub(crate) fn self_skips(&self) -> usize {
        self.self_skips
    }

    fn origin_of(&self, idx: usize) -> Point {
        let mut origin = Point::ZERO;
        let mut cur = Some(idx);
        while let Some(i) = cur {
            origin += self.views[i].origin.to_vec2();
            cur = self.views[i].parent;
        }
        origin
    }

    fn paint(&mut self, idx: usize, base: Vec2, canvas: &mut dyn Canvas) {
        let view = &self.views[idx];
        if !view.alive || !view.shown {
            return;
        }
        if view.blur_surface && self.counter.is_some_and(|c| c.in_flight() > 0) {
            self.self_skips += 1;
            return;
        }
        let origin = self.origin_of(idx) - base;
        if let Some(fill) = view.fill {
            canvas.fill_rect(Rect::from_origin_size(origin, view.size), fill);
        }
        for child in view.children.clone() {
            self.paint(child, base, canvas);
        }
    }
}

impl ViewHost for MockHost {
    fn is_alive(&self, view: ViewId) -> bool {
        self.slot(view).is_some()
    }

    fn screen_origin(&self, view: ViewId) -> Point {
        self.origin_of(view.index() as usize)
    }

    fn size(&self, view: ViewId) -> Size {
        self.slot(view).map_or(Size::ZERO, |v| v.size)
    }

    fn is_shown(&self, view: ViewId) -> bool {
        if self.slot(view).is_none() {
            return false;
        }
        let mut cur = Some(view.index() as usize);
        while let Some(i) = cur {
            let v = &self.views[i];
            if !v.alive || !v.shown {
                return false;
            }
            cur = v.parent;
        }
        true
    }

    fn tree_root(&self, view: ViewId) -> Option<ViewId> {
        self.slot(view)?;
        let mut idx = view.index() as usize;
        while let Some(parent) = self.views[idx].parent {
            idx = parent;
        }
        Some(ViewId::new(u32::try_from(idx).ok()?, self.views[idx].generation))
    }

    fn context(&self, view: ViewId) -> Option<ContextId> {
        self.slot(view)?.context
    }

    fn base_context(&self, context: ContextId) -> Option<ContextId> {
        self.contexts.get(context.0 as usize)?.base
    }

    fn window_decor(&self, context: ContextId) -> Option<ViewId> {
        self.contexts.get(context.0 as usize)?.decor
    }

    fn observer_alive(&self, root: ViewId) -> bool {
        self.slot(root).is_some_and(|v| v.observer_alive)
    }

    fn add_frame_hook(&mut self, root: ViewId, surface: ViewId) -> bool {
        if !self.observer_alive(root) {
            return false;
        }
        if !self.has_hook(root, surface) {
            self.hooks.push((root, surface));
        }
        true
    }

    fn remove_frame_hook(&mut self, root: ViewId, surface: ViewId) {
        self.hooks.retain(|&hook| hook != (root, surface));
    }

    fn post_delayed(&mut self, delay: Duration, ticket: SubscribeTicket) {
        self.posted.push((delay, ticket));
    }

    fn draw_background(&mut self, view: ViewId, canvas: &mut dyn Canvas) {
        if let Some(bg) = self.slot(view).and_then(|v| v.background) {
            canvas.fill_rect(self.size(view).to_rect(), bg);
        }
    }

    fn draw(&mut self, view: ViewId, canvas: &mut dyn Canvas) {
        if self.slot(view).is_none() {
            return;
        }
        let idx = view.index() as usize;
        let base = self.origin_of(idx).to_vec2();
        self.paint(idx, base, canvas);
    }

    fn invalidate(&mut self, view: ViewId) {
        self.invalidated.push(view);
    }
}

/// Runs every ticket the host has accumulated through `surface`, as the
/// host's timer would once the delay elapses.
pub(crate) fn flush_deferred(host: &mut MockHost, surface: &mut BlurSurface) {
    for (_, ticket) in host.take_posted() {
        let _ = surface.run_deferred(ticket, host, &mut Tracer::none());
    }
}

// ---------------------------------------------------------------------------
// RecordingBackend
// ---------------------------------------------------------------------------

/// Calls seen by a [`RecordingBackend`].
#[derive(Debug)]
pub(crate) struct BackendLog {
    /// `(width, height, radius)` of every prepare.
    pub(crate) prepares: Vec<(u32, u32, f32)>,
    pub(crate) releases: usize,
    pub(crate) blurs: usize,
    /// Cleared if a prepare ever arrives while resources are still held.
    pub(crate) released_before_prepare: bool,
    prepared: bool,
}

impl Default for BackendLog {
    fn default() -> Self {
        Self {
            prepares: Vec::new(),
            releases: 0,
            blurs: 0,
            released_before_prepare: true,
            prepared: false,
        }
    }
}

impl BackendLog {
    pub(crate) fn is_prepared(&self) -> bool {
        self.prepared
    }
}

/// A backend that always prepares and "blurs" by copying.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    log: Rc<RefCell<BackendLog>>,
}

impl RecordingBackend {
    pub(crate) fn new(log: Rc<RefCell<BackendLog>>) -> Self {
        Self { log }
    }
}

impl BlurBackend for RecordingBackend {
    fn prepare(&mut self, buffer: &Pixmap, radius: f32) -> Result<(), BackendError> {
        let mut log = self.log.borrow_mut();
        if log.prepared {
            log.released_before_prepare = false;
        }
        log.prepared = true;
        log.prepares.push((buffer.width(), buffer.height(), radius));
        Ok(())
    }

    fn release(&mut self) {
        let mut log = self.log.borrow_mut();
        log.prepared = false;
        log.releases += 1;
    }

    fn blur(&mut self, input: &Pixmap, output: &mut Pixmap) {
        self.log.borrow_mut().blurs += 1;
        output.copy_from(input);
    }
}

// ---------------------------------------------------------------------------
// RecordingCanvas
// ---------------------------------------------------------------------------

/// A drawing call seen by a [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CanvasOp {
    Save,
    Restore,
    Scale(f64, f64),
    Translate(Vec2),
    Clear(Argb),
    FillRect(Rect, Argb),
    FillImage {
        shape: RoundedRect,
        image: PixmapId,
        transform: Affine,
        anti_alias: bool,
    },
    FillSolid {
        shape: RoundedRect,
        color: Argb,
        anti_alias: bool,
    },
}

/// A canvas that records calls instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub(crate) ops: Vec<CanvasOp>,
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.ops.push(CanvasOp::Scale(sx, sy));
    }

    fn translate(&mut self, offset: Vec2) {
        self.ops.push(CanvasOp::Translate(offset));
    }

    fn clear(&mut self, color: Argb) {
        self.ops.push(CanvasOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Argb) {
        self.ops.push(CanvasOp::FillRect(rect, color));
    }

    fn fill_rounded_rect(&mut self, shape: RoundedRect, paint: &Paint<'_>, anti_alias: bool) {
        self.ops.push(match paint {
            Paint::Solid(color) => CanvasOp::FillSolid {
                shape,
                color: *color,
                anti_alias,
            },
            Paint::Image(pattern) => CanvasOp::FillImage {
                shape,
                image: pattern.image.id(),
                transform: pattern.transform,
                anti_alias,
            },
        });
    }
}
