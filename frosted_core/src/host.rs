// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary with the embedding view tree.
//!
//! The engine never owns host views. It refers to them through [`ViewId`]
//! handles, which are generational: once the host disposes a view and
//! reuses its slot, old handles fail [`ViewHost::is_alive`]. Every access to a
//! bound root goes through that liveness probe first, and a stale handle is
//! treated exactly like an absent one.
//!
//! The host is responsible for:
//!
//! - telling the surface it was attached, detached, shown or hidden
//!   ([`BlurSurface::on_attached`](crate::surface::BlurSurface::on_attached)
//!   and friends);
//! - invoking [`BlurSurface::on_pre_draw`](crate::surface::BlurSurface::on_pre_draw)
//!   once per frame for every surface registered through
//!   [`add_frame_hook`](ViewHost::add_frame_hook);
//! - running each ticket posted via [`post_delayed`](ViewHost::post_delayed)
//!   through [`BlurSurface::run_deferred`](crate::surface::BlurSurface::run_deferred)
//!   after the delay elapses.

use core::fmt;
use core::time::Duration;

use kurbo::{Point, Size};

use crate::canvas::Canvas;

/// A non-owning, generational handle to a host view.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    idx: u32,
    generation: u32,
}

impl ViewId {
    /// Creates a handle from a host slot index and generation.
    #[inline]
    #[must_use]
    pub const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque handle to a host context (the chain a view walks to find the
/// window that owns it).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContextId(pub u32);

/// A pending deferred subscribe attempt.
///
/// Tickets are never cancelled. A ticket whose generation no longer matches
/// its surface's scheduler is simply ignored when it runs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscribeTicket {
    /// The surface that posted the ticket.
    pub surface: ViewId,
    pub(crate) generation: u64,
}

/// The host view tree, as seen by the blur engine.
///
/// Geometry is in physical pixels.
pub trait ViewHost {
    /// Whether `view` still refers to a live, undisposed view.
    fn is_alive(&self, view: ViewId) -> bool;

    /// The on-screen origin of `view`.
    fn screen_origin(&self, view: ViewId) -> Point;

    /// The size of `view`.
    fn size(&self, view: ViewId) -> Size;

    /// Whether `view` and all of its ancestors are visible.
    fn is_shown(&self, view: ViewId) -> bool;

    /// The top-most ancestor of `view`, or `None` if the view is dead.
    fn tree_root(&self, view: ViewId) -> Option<ViewId>;

    /// The context `view` was created with.
    fn context(&self, view: ViewId) -> Option<ContextId>;

    /// The context `context` wraps, if any.
    fn base_context(&self, context: ContextId) -> Option<ContextId>;

    /// The decor view of the window owned by `context`, if `context` owns a
    /// window.
    fn window_decor(&self, context: ContextId) -> Option<ViewId>;

    /// Whether `root`'s pre-draw observer exists and has not been disposed.
    fn observer_alive(&self, root: ViewId) -> bool;

    /// Registers `surface` to receive frame hooks from `root`'s observer.
    ///
    /// Returns `false` if the registration could not be made.
    fn add_frame_hook(&mut self, root: ViewId, surface: ViewId) -> bool;

    /// Removes a registration made by [`add_frame_hook`](Self::add_frame_hook).
    fn remove_frame_hook(&mut self, root: ViewId, surface: ViewId);

    /// Runs `ticket` through its surface after `delay`.
    fn post_delayed(&mut self, delay: Duration, ticket: SubscribeTicket);

    /// Paints `view`'s background drawable, if it has one.
    fn draw_background(&mut self, view: ViewId, canvas: &mut dyn Canvas);

    /// Paints `view` and its subtree.
    ///
    /// Blur surfaces met during the traversal must consult
    /// [`BlurSurface::should_draw`](crate::surface::BlurSurface::should_draw)
    /// (or [`capture_in_flight`](crate::surface::capture_in_flight) when the
    /// surface cannot be borrowed) and skip themselves while a capture runs.
    fn draw(&mut self, view: ViewId, canvas: &mut dyn Canvas);

    /// Requests a repaint of `view`.
    fn invalidate(&mut self, view: ViewId);
}

/// Finds the decor view of the window that owns `view`.
///
/// Starting at `view`'s context, unwraps at most `max_hops` base contexts
/// looking for one that owns a window. Returns `None` if the chain ends, the
/// hop budget is exhausted, or the decor view is already dead.
pub fn find_window_root(host: &dyn ViewHost, view: ViewId, max_hops: u8) -> Option<ViewId> {
    let mut context = host.context(view)?;
    for _ in 0..max_hops {
        if host.window_decor(context).is_some() {
            break;
        }
        context = host.base_context(context)?;
    }
    host.window_decor(context)
        .filter(|&decor| host.is_alive(decor))
}
