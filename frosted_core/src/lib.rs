// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live backdrop blur for surfaces embedded in a host view tree.
//!
//! `frosted_core` fakes translucent "frosted glass" panels: a [`BlurSurface`]
//! captures whatever its host draws behind it, blurs a downsampled copy, and
//! composites the result (rounded and tinted) back into itself on every frame
//! where the content changed. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   ViewHost frame hook
//!       │
//!       ▼
//!   BlurSurface::on_pre_draw ──► BufferManager::ensure ──► BlurBackend::prepare
//!       │
//!       ▼
//!   ViewHost::draw (into capture Pixmap) ──► BlurBackend::blur ──► ViewHost::invalidate
//!                                                                      │
//!                 ┌────────────────────────────────────────────────────┘
//!                 ▼
//!   BlurSurface::draw ──► compositor::draw_rounded
//! ```
//!
//! **[`backend`]** — The [`BlurBackend`](backend::BlurBackend) capability
//! trait, the no-op fallback and the process-wide one-time probe.
//!
//! **[`buffers`]** — Capture/result buffer lifecycle, downsampling and the
//! dirty flag.
//!
//! **[`compositor`]** — Draws the blurred buffer with corner rounding and an
//! overlay tint.
//!
//! **[`scheduler`]** — Frame-hook subscription state machine with deferred,
//! generation-checked subscribe attempts.
//!
//! **[`surface`]** — The [`BlurSurface`] orchestrator and its configuration
//! API.
//!
//! **[`host`]** — The [`ViewHost`](host::ViewHost) boundary trait that the
//! embedding UI implements.
//!
//! **[`canvas`]** / **[`pixmap`]** / **[`color`]** — Pixel storage and the
//! drawing abstraction, including a software canvas over a [`Pixmap`].
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) events for buffer,
//! backend, subscription and capture activity.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//!
//! [`BlurSurface`]: surface::BlurSurface
//! [`Pixmap`]: pixmap::Pixmap

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod buffers;
pub mod canvas;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod host;
pub mod pixmap;
pub mod scheduler;
pub mod surface;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_support;

pub use kurbo;
