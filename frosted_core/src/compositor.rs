// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing the blurred buffer into the destination surface.

use kurbo::{Affine, RoundedRect, Size};

use crate::canvas::{Canvas, ImagePattern, Paint};
use crate::color::Argb;
use crate::pixmap::Pixmap;

/// Draws `blurred` stretched over a `size` destination, clipped to a rounded
/// rectangle of `corner_radius`, then the same rounded rectangle flat-filled
/// with `overlay` on top.
///
/// Without a blurred buffer only the overlay is drawn, unrounded, over the
/// full destination.
pub fn draw_rounded(
    canvas: &mut dyn Canvas,
    blurred: Option<&Pixmap>,
    overlay: Argb,
    corner_radius: f64,
    size: Size,
) {
    let rect = size.to_rect();
    let Some(image) = blurred else {
        canvas.fill_rect(rect, overlay);
        return;
    };

    let shape = RoundedRect::from_rect(rect, corner_radius);
    let pattern = ImagePattern {
        image,
        transform: Affine::scale_non_uniform(
            size.width / f64::from(image.width()),
            size.height / f64::from(image.height()),
        ),
    };
    canvas.fill_rounded_rect(shape, &Paint::Image(pattern), true);
    canvas.fill_rounded_rect(shape, &Paint::Solid(overlay), true);
}
