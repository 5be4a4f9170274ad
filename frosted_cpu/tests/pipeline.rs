// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end capture, blur and composite with the CPU backend.

use std::time::Duration;

use frosted_core::canvas::{Canvas, PixmapCanvas};
use frosted_core::color::Argb;
use frosted_core::host::{ContextId, SubscribeTicket, ViewHost, ViewId};
use frosted_core::kurbo::{Point, Rect, Size};
use frosted_core::pixmap::Pixmap;
use frosted_core::scheduler::HookState;
use frosted_core::surface::{BlurSurface, CaptureOutcome, capture_in_flight};
use frosted_core::trace::Tracer;

const ROOT: ViewId = ViewId::new(0, 1);
const SURFACE: ViewId = ViewId::new(1, 1);
const WINDOW: ContextId = ContextId(0);

/// A 64×64 window, black on the left and white on the right, with a 32×32
/// blur surface centred on the seam.
#[derive(Debug, Default)]
struct SplitWindow {
    hooks: Vec<(ViewId, ViewId)>,
    posted: Vec<SubscribeTicket>,
    invalidated: Vec<ViewId>,
    surface_skips: usize,
}

impl ViewHost for SplitWindow {
    fn is_alive(&self, view: ViewId) -> bool {
        view == ROOT || view == SURFACE
    }

    fn screen_origin(&self, view: ViewId) -> Point {
        if view == SURFACE {
            Point::new(16.0, 16.0)
        } else {
            Point::ZERO
        }
    }

    fn size(&self, view: ViewId) -> Size {
        if view == SURFACE {
            Size::new(32.0, 32.0)
        } else {
            Size::new(64.0, 64.0)
        }
    }

    fn is_shown(&self, view: ViewId) -> bool {
        self.is_alive(view)
    }

    fn tree_root(&self, _view: ViewId) -> Option<ViewId> {
        Some(ROOT)
    }

    fn context(&self, _view: ViewId) -> Option<ContextId> {
        Some(WINDOW)
    }

    fn base_context(&self, _context: ContextId) -> Option<ContextId> {
        None
    }

    fn window_decor(&self, context: ContextId) -> Option<ViewId> {
        (context == WINDOW).then_some(ROOT)
    }

    fn observer_alive(&self, root: ViewId) -> bool {
        root == ROOT
    }

    fn add_frame_hook(&mut self, root: ViewId, surface: ViewId) -> bool {
        self.hooks.push((root, surface));
        true
    }

    fn remove_frame_hook(&mut self, root: ViewId, surface: ViewId) {
        self.hooks.retain(|&hook| hook != (root, surface));
    }

    fn post_delayed(&mut self, _delay: Duration, ticket: SubscribeTicket) {
        self.posted.push(ticket);
    }

    fn draw_background(&mut self, _view: ViewId, canvas: &mut dyn Canvas) {
        canvas.fill_rect(Rect::new(0.0, 0.0, 64.0, 64.0), Argb::BLACK);
    }

    fn draw(&mut self, _view: ViewId, canvas: &mut dyn Canvas) {
        canvas.fill_rect(Rect::new(32.0, 0.0, 64.0, 64.0), Argb::WHITE);
        if capture_in_flight() {
            self.surface_skips += 1;
        } else {
            canvas.fill_rect(Rect::new(16.0, 16.0, 48.0, 48.0), Argb(0xFFFF_0000));
        }
    }

    fn invalidate(&mut self, view: ViewId) {
        self.invalidated.push(view);
    }
}

fn red(pixel: u32) -> u32 {
    (pixel >> 16) & 0xFF
}

#[test]
fn split_window_is_blurred_across_the_seam() {
    let mut host = SplitWindow::default();
    let mut surface = BlurSurface::new(SURFACE, frosted_cpu::select_backend());

    surface.on_attached(&mut host, &mut Tracer::none());
    for ticket in std::mem::take(&mut host.posted) {
        surface.run_deferred(ticket, &mut host, &mut Tracer::none());
    }
    assert_eq!(surface.hook_state(), HookState::Subscribed);
    assert_eq!(host.hooks, [(ROOT, SURFACE)]);

    assert_eq!(
        surface.on_pre_draw(&mut host, &mut Tracer::none()),
        CaptureOutcome::Captured { redraw: true }
    );
    assert_eq!(host.surface_skips, 1, "surface must not capture itself");
    assert!(!capture_in_flight());

    let result = surface.buffers().result().unwrap();
    assert_eq!(result.dimensions(), (8, 8));
    // Columns 0..4 sit over black, 4..8 over white. Three unit boxes spread
    // the seam by three pixels either way.
    assert_eq!(result.pixel(0, 4), 0xFF00_0000);
    assert_eq!(result.pixel(7, 4), 0xFFFF_FFFF);
    let seam = red(result.pixel(3, 4));
    assert!(seam > 0 && seam < 255, "{seam}");
    assert!(red(result.pixel(2, 4)) < seam);
    assert!(red(result.pixel(4, 4)) > seam);

    assert_eq!(
        surface.on_pre_draw(&mut host, &mut Tracer::none()),
        CaptureOutcome::Captured { redraw: false }
    );

    let mut target = Pixmap::try_new(32, 32).unwrap();
    let mut canvas = PixmapCanvas::new(&mut target);
    assert!(surface.draw(&mut canvas, &host));
    // Left stays dark under the tint, right stays light.
    assert!(red(target.pixel(1, 16)) < red(target.pixel(30, 16)));
    assert_eq!(target.pixel(16, 16) >> 24, 0xFF);

    surface.on_detached(&mut host, &mut Tracer::none());
    assert!(host.hooks.is_empty());
    assert_eq!(surface.buffers().stats().live(), 0);
}
