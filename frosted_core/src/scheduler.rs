// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-hook subscription management.
//!
//! The [`FrameCaptureScheduler`] decides when a surface receives the host's
//! per-frame "about to draw" hook. It tracks three inputs:
//!
//! - the bound root (a weak [`ViewId`], re-checked before every use),
//! - whether the surface is attached to the live view tree,
//! - whether auto-update is enabled (driven by container visibility).
//!
//! # Deferred subscription
//!
//! The host window may not have a valid observer right after attach, so
//! subscribing is deferred: the scheduler posts a [`SubscribeTicket`] via
//! [`ViewHost::post_delayed`] and subscribes when the host runs it. Tickets
//! are never cancelled. Every bind, detach, auto-update change and new
//! schedule bumps the scheduler's generation, which turns all outstanding
//! tickets into no-ops.

use core::time::Duration;

use crate::host::{SubscribeTicket, ViewHost, ViewId};
use crate::trace::{SubscriptionAction, SubscriptionEvent, Tracer};

/// Where the scheduler stands with respect to the frame hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookState {
    /// No root is bound.
    Unbound,
    /// A root is bound but the surface does not receive its frame hook.
    Unsubscribed,
    /// The surface receives the bound root's frame hook.
    Subscribed,
}

/// Frame-hook subscription state machine for one surface.
#[derive(Debug)]
pub struct FrameCaptureScheduler {
    surface: ViewId,
    root: Option<ViewId>,
    subscribed: bool,
    attached: bool,
    auto_update: bool,
    generation: u64,
    delay: Duration,
}

impl FrameCaptureScheduler {
    /// Creates an unbound, detached scheduler with auto-update enabled.
    #[must_use]
    pub fn new(surface: ViewId, delay: Duration) -> Self {
        Self {
            surface,
            root: None,
            subscribed: false,
            attached: false,
            auto_update: true,
            generation: 0,
            delay,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> HookState {
        match (self.root, self.subscribed) {
            (None, _) => HookState::Unbound,
            (Some(_), false) => HookState::Unsubscribed,
            (Some(_), true) => HookState::Subscribed,
        }
    }

    /// The bound root, without a liveness check.
    #[must_use]
    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    /// The bound root if it is still alive.
    #[must_use]
    pub fn live_root(&self, host: &dyn ViewHost) -> Option<ViewId> {
        self.root.filter(|&root| host.is_alive(root))
    }

    /// Whether the surface is attached to the live view tree.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether auto-update is enabled.
    #[must_use]
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Sets the deferred subscribe delay used by later schedules.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Binds to a new root.
    ///
    /// Unsubscribes from the old root first, then schedules a subscribe
    /// attempt if the surface is attached. Returns `false` if `root` is
    /// already bound.
    pub fn bind(
        &mut self,
        root: Option<ViewId>,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if root == self.root {
            return false;
        }
        self.unsubscribe(host, tracer);
        self.root = root;
        self.generation += 1;
        if self.attached {
            self.schedule_subscribe(host, tracer);
        }
        true
    }

    /// Records attachment to the live view tree and schedules a subscribe
    /// attempt.
    pub fn attach(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.schedule_subscribe(host, tracer);
    }

    /// Records detachment and drops the subscription.
    pub fn detach(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        self.attached = false;
        self.generation += 1;
        self.unsubscribe(host, tracer);
    }

    /// Re-enables automatic subscription, after the usual deferred delay.
    pub fn enable_auto_update(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        if self.auto_update {
            return;
        }
        self.auto_update = true;
        if self.attached {
            self.schedule_subscribe(host, tracer);
        }
    }

    /// Drops the subscription immediately and stops resubscribing.
    pub fn disable_auto_update(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        if !self.auto_update {
            return;
        }
        self.auto_update = false;
        self.generation += 1;
        self.unsubscribe(host, tracer);
    }

    /// Posts a deferred subscribe attempt, invalidating any earlier one.
    ///
    /// Does nothing without a root or with auto-update disabled.
    pub fn schedule_subscribe(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        if self.root.is_none() || !self.auto_update || self.subscribed {
            return;
        }
        self.generation += 1;
        host.post_delayed(
            self.delay,
            SubscribeTicket {
                surface: self.surface,
                generation: self.generation,
            },
        );
        self.trace(tracer, SubscriptionAction::Scheduled);
    }

    /// Runs a deferred subscribe attempt posted by
    /// [`schedule_subscribe`](Self::schedule_subscribe).
    ///
    /// Stale tickets, detached surfaces and unavailable observers all make
    /// this a silent no-op. Returns whether the surface is subscribed
    /// afterwards.
    pub fn run_deferred(
        &mut self,
        ticket: SubscribeTicket,
        host: &mut dyn ViewHost,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if ticket.surface != self.surface || ticket.generation != self.generation {
            self.trace(tracer, SubscriptionAction::Stale);
            return self.subscribed;
        }
        if !self.attached || !self.auto_update {
            return self.subscribed;
        }
        self.subscribe(host, tracer)
    }

    fn subscribe(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) -> bool {
        if self.subscribed {
            return true;
        }
        let root = match self.live_root(host) {
            Some(root) if host.observer_alive(root) => root,
            _ => {
                self.trace(tracer, SubscriptionAction::RootUnavailable);
                return false;
            }
        };
        if host.add_frame_hook(root, self.surface) {
            self.subscribed = true;
            self.trace(tracer, SubscriptionAction::Subscribed);
        } else {
            self.trace(tracer, SubscriptionAction::RootUnavailable);
        }
        self.subscribed
    }

    fn unsubscribe(&mut self, host: &mut dyn ViewHost, tracer: &mut Tracer<'_>) {
        if !self.subscribed {
            return;
        }
        self.subscribed = false;
        // A disposed root took its observer and our registration with it.
        if let Some(root) = self.live_root(host) {
            if host.observer_alive(root) {
                host.remove_frame_hook(root, self.surface);
            }
        }
        self.trace(tracer, SubscriptionAction::Unsubscribed);
    }

    fn trace(&self, tracer: &mut Tracer<'_>, action: SubscriptionAction) {
        tracer.subscription(&SubscriptionEvent {
            surface: self.surface,
            root: self.root,
            action,
        });
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size};

    use super::*;
    use crate::test_support::MockHost;

    fn setup() -> (MockHost, ViewId, FrameCaptureScheduler) {
        let mut host = MockHost::new();
        let root = host.add_root(Size::new(200.0, 200.0));
        let surface = host.add_view(root, Point::new(10.0, 10.0), Size::new(50.0, 50.0));
        let scheduler = FrameCaptureScheduler::new(surface, Duration::from_millis(32));
        (host, root, scheduler)
    }

    fn run_posted(host: &mut MockHost, scheduler: &mut FrameCaptureScheduler) {
        for (_, ticket) in host.take_posted() {
            let _ = scheduler.run_deferred(ticket, host, &mut Tracer::none());
        }
    }

    #[test]
    fn bind_while_attached_subscribes_after_delay() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.attach(&mut host, &mut Tracer::none());
        assert!(scheduler.bind(Some(root), &mut host, &mut Tracer::none()));

        assert_eq!(scheduler.state(), HookState::Unsubscribed, "subscription is deferred");
        let posted = host.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, Duration::from_millis(32));

        run_posted(&mut host, &mut scheduler);
        assert_eq!(scheduler.state(), HookState::Subscribed);
        assert!(host.has_hook(root, scheduler.surface));
    }

    #[test]
    fn bind_while_detached_does_not_schedule() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        assert!(host.posted().is_empty());
        assert_eq!(scheduler.state(), HookState::Unsubscribed);
    }

    #[test]
    fn rebinding_same_root_is_a_no_op() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        assert!(!scheduler.bind(Some(root), &mut host, &mut Tracer::none()));
        assert_eq!(host.posted().len(), 1);
    }

    #[test]
    fn rebind_unsubscribes_old_root_and_stales_pending_ticket() {
        let (mut host, root, mut scheduler) = setup();
        let other = host.add_root(Size::new(300.0, 300.0));
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        run_posted(&mut host, &mut scheduler);
        assert!(host.has_hook(root, scheduler.surface));

        scheduler.bind(Some(other), &mut host, &mut Tracer::none());
        assert!(!host.has_hook(root, scheduler.surface), "old root unsubscribed first");

        // A ticket from before the rebind must not subscribe anything.
        let stale = SubscribeTicket {
            surface: scheduler.surface,
            generation: 1,
        };
        assert!(!scheduler.run_deferred(stale, &mut host, &mut Tracer::none()));

        run_posted(&mut host, &mut scheduler);
        assert!(host.has_hook(other, scheduler.surface));
        assert_eq!(host.hook_count(), 1);
    }

    #[test]
    fn ticket_for_detached_surface_is_harmless() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        scheduler.detach(&mut host, &mut Tracer::none());

        run_posted(&mut host, &mut scheduler);
        assert_eq!(scheduler.state(), HookState::Unsubscribed);
        assert_eq!(host.hook_count(), 0);
    }

    #[test]
    fn unavailable_observer_silently_skips_subscription() {
        let (mut host, root, mut scheduler) = setup();
        host.set_observer_alive(root, false);
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        run_posted(&mut host, &mut scheduler);
        assert_eq!(scheduler.state(), HookState::Unsubscribed);

        // Retried on the next attach.
        host.set_observer_alive(root, true);
        scheduler.detach(&mut host, &mut Tracer::none());
        scheduler.attach(&mut host, &mut Tracer::none());
        run_posted(&mut host, &mut scheduler);
        assert_eq!(scheduler.state(), HookState::Subscribed);
    }

    #[test]
    fn disposed_root_is_treated_as_absent() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        host.dispose(root);
        run_posted(&mut host, &mut scheduler);

        assert_eq!(scheduler.live_root(&host), None);
        assert_eq!(scheduler.state(), HookState::Unsubscribed);
        assert_eq!(host.hook_count(), 0);
    }

    #[test]
    fn auto_update_toggle_unsubscribes_and_resubscribes_after_delay() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        run_posted(&mut host, &mut scheduler);

        scheduler.disable_auto_update(&mut host, &mut Tracer::none());
        assert_eq!(scheduler.state(), HookState::Unsubscribed, "removed immediately");
        assert_eq!(host.hook_count(), 0);
        assert!(host.posted().is_empty());

        scheduler.enable_auto_update(&mut host, &mut Tracer::none());
        assert_eq!(scheduler.state(), HookState::Unsubscribed, "resubscribe is deferred");
        assert_eq!(host.posted().len(), 1);
        run_posted(&mut host, &mut scheduler);
        assert_eq!(scheduler.state(), HookState::Subscribed);
    }

    #[test]
    fn disabled_auto_update_ignores_pending_ticket() {
        let (mut host, root, mut scheduler) = setup();
        scheduler.attach(&mut host, &mut Tracer::none());
        scheduler.bind(Some(root), &mut host, &mut Tracer::none());
        scheduler.disable_auto_update(&mut host, &mut Tracer::none());
        run_posted(&mut host, &mut scheduler);
        assert_eq!(scheduler.state(), HookState::Unsubscribed);
    }
}
