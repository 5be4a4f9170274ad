// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Three-pass box blur approximating a Gaussian.
//!
//! A blur of radius `r` is treated as a Gaussian with
//! `sigma = 0.4 * r + 0.6`, approximated by three successive box filters
//! whose widths are chosen so their combined variance matches `sigma²`
//! (see [`box_radii`]). Each box filter is separable and runs as a
//! horizontal then a vertical pass with a sliding-window sum, so the cost is
//! independent of the radius. Samples past the edges clamp to the nearest
//! edge pixel.
//!
//! Channels are blurred independently on premultiplied pixels, which keeps
//! transparent regions from bleeding dark fringes.

use frosted_core::backend::{BlurBackend, MAX_BLUR_RADIUS};
use frosted_core::error::BackendError;
use frosted_core::pixmap::Pixmap;

/// Number of box passes.
pub const PASSES: usize = 3;

type Px = [u8; 4];

/// Gaussian standard deviation used for a blur `radius`.
#[must_use]
pub fn sigma_for_radius(radius: f32) -> f32 {
    0.4 * radius + 0.6
}

/// Radii of the [`PASSES`] box filters whose combined variance best matches
/// a Gaussian of `sigma`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "box widths are small non-negative integers"
)]
pub fn box_radii(sigma: f32) -> [usize; PASSES] {
    let n = PASSES as f32;
    let variance = 12.0 * sigma * sigma;
    let ideal_width = (variance / n + 1.0).sqrt();
    let mut lower = (ideal_width.floor() as usize).max(1);
    if lower % 2 == 0 {
        lower -= 1;
    }
    let upper = lower + 2;
    let lw = lower as f32;
    let ideal_count = (variance - n * lw * lw - 4.0 * n * lw - 3.0 * n) / (-4.0 * lw - 4.0);
    let lower_count = ideal_count.round().clamp(0.0, n) as usize;

    let mut radii = [0; PASSES];
    for (i, r) in radii.iter_mut().enumerate() {
        let width = if i < lower_count { lower } else { upper };
        *r = (width - 1) / 2;
    }
    radii
}

#[derive(Debug)]
struct Prepared {
    width: u32,
    height: u32,
    radius: f32,
    radii: [usize; PASSES],
    scratch: Vec<Px>,
}

/// The CPU blur backend.
#[derive(Debug, Default)]
pub struct BoxBlur {
    prepared: Option<Prepared>,
}

impl BoxBlur {
    /// Creates an unprepared backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether resources are currently held.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// The radius of the current preparation.
    #[must_use]
    pub fn radius(&self) -> Option<f32> {
        self.prepared.as_ref().map(|p| p.radius)
    }

    /// The box radii of the current preparation.
    #[must_use]
    pub fn radii(&self) -> Option<[usize; PASSES]> {
        self.prepared.as_ref().map(|p| p.radii)
    }
}

impl BlurBackend for BoxBlur {
    /// Fails with [`BackendError::Unavailable`] for radii outside
    /// `(0, MAX_BLUR_RADIUS]` and with [`BackendError::Allocation`] if the
    /// scratch buffer cannot be reserved.
    fn prepare(&mut self, buffer: &Pixmap, radius: f32) -> Result<(), BackendError> {
        self.release();
        if !(radius > 0.0 && radius <= MAX_BLUR_RADIUS) {
            return Err(BackendError::Unavailable);
        }
        let len = buffer.data().len();
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(len)
            .map_err(|_| BackendError::Allocation)?;
        scratch.resize(len, [0; 4]);
        self.prepared = Some(Prepared {
            width: buffer.width(),
            height: buffer.height(),
            radius,
            radii: box_radii(sigma_for_radius(radius)),
            scratch,
        });
        Ok(())
    }

    fn release(&mut self) {
        self.prepared = None;
    }

    /// Leaves `output` untouched if the backend is not prepared for buffers
    /// of this size.
    fn blur(&mut self, input: &Pixmap, output: &mut Pixmap) {
        let Some(p) = self.prepared.as_mut() else {
            return;
        };
        if input.dimensions() != (p.width, p.height) || output.dimensions() != (p.width, p.height)
        {
            return;
        }
        output.copy_from(input);
        let width = p.width as usize;
        let height = p.height as usize;
        let pixels: &mut [Px] = bytemuck::cast_slice_mut(output.data_mut());
        for &r in &p.radii {
            if r == 0 {
                continue;
            }
            for y in 0..height {
                blur_line(pixels, &mut p.scratch, y * width, 1, width, r);
            }
            for x in 0..width {
                blur_line(&p.scratch, pixels, x, width, height, r);
            }
        }
    }
}

/// Box-filters the `len` pixels at `start, start + stride, …` of `src` into
/// the same positions of `dst`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "averages of u8 samples fit in u8"
)]
fn blur_line(src: &[Px], dst: &mut [Px], start: usize, stride: usize, len: usize, r: usize) {
    let last = len - 1;
    let at = |i: usize| src[start + i.min(last) * stride];
    let window = u32::try_from(2 * r + 1).unwrap_or(u32::MAX);
    let half = window / 2;

    let mut acc = [0_u32; 4];
    let first = at(0);
    for c in 0..4 {
        acc[c] = u32::from(first[c]) * (r as u32 + 1);
    }
    for i in 1..=r {
        let px = at(i);
        for c in 0..4 {
            acc[c] += u32::from(px[c]);
        }
    }

    for x in 0..len {
        let out = &mut dst[start + x * stride];
        for c in 0..4 {
            out[c] = ((acc[c] + half) / window) as u8;
        }
        let incoming = at(x + r + 1);
        let outgoing = at(x.saturating_sub(r));
        for c in 0..4 {
            acc[c] = acc[c] + u32::from(incoming[c]) - u32::from(outgoing[c]);
        }
    }
}
