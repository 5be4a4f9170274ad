// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU blur backend for frosted.
//!
//! [`BoxBlur`] implements [`BlurBackend`] with a three-pass box blur on the
//! CPU. It needs no platform support, so its one-time probe only fails when
//! memory is exhausted.
//!
//! Most hosts create surfaces through [`select_backend`], which probes
//! [`BoxBlur`] once per process and falls back to
//! [`NoopBackend`](frosted_core::backend::NoopBackend) if the probe fails:
//!
//! ```
//! use frosted_core::host::ViewId;
//! use frosted_core::surface::BlurSurface;
//!
//! let surface = BlurSurface::new(ViewId::new(0, 1), frosted_cpu::select_backend());
//! assert_eq!(surface.config().downsample_factor, 4.0);
//! ```

pub mod box_blur;

pub use box_blur::BoxBlur;

use frosted_core::backend::{BACKEND_SELECTOR, BlurBackend};

/// Returns the backend for a new surface, probing [`BoxBlur`] on first use.
#[must_use]
pub fn select_backend() -> Box<dyn BlurBackend> {
    BACKEND_SELECTOR.select(new_box_blur)
}

fn new_box_blur() -> Box<dyn BlurBackend> {
    Box::new(BoxBlur::new())
}
