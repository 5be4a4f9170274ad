// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing abstraction and a software canvas over a [`Pixmap`].
//!
//! The [`Canvas`] trait is the minimal set of 2D primitives the engine needs:
//! a save/restore transform stack, clearing, and filling (rounded)
//! rectangles with a solid color or a clamped image pattern. Hosts implement
//! it over their native canvas for the surface's own paint pass; the capture
//! pass always paints through a [`PixmapCanvas`] targeting the capture
//! buffer.
//!
//! Transform calls post-multiply the current transform, so
//! `scale(s); translate(v)` maps a point `p` to `s * (p + v)`.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, RoundedRect, Shape, Vec2};

use crate::color::{Argb, mul_div_255};
use crate::pixmap::Pixmap;

/// An image used as paint.
///
/// `transform` maps image pixel space into the local space of the shape being
/// filled. Samples outside the image clamp to the nearest edge pixel.
#[derive(Clone, Copy, Debug)]
pub struct ImagePattern<'a> {
    /// The source image.
    pub image: &'a Pixmap,
    /// Image space to local space.
    pub transform: Affine,
}

/// How a shape is filled.
#[derive(Clone, Copy, Debug)]
pub enum Paint<'a> {
    /// A flat color.
    Solid(Argb),
    /// A bilinearly sampled, edge-clamped image.
    Image(ImagePattern<'a>),
}

/// 2D drawing primitives used by the capture and composite passes.
pub trait Canvas {
    /// Pushes the current transform.
    fn save(&mut self);

    /// Pops the most recently saved transform. Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Post-multiplies the current transform by a non-uniform scale.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Post-multiplies the current transform by a translation.
    fn translate(&mut self, offset: Vec2);

    /// Replaces every pixel of the target with `color`, ignoring the
    /// transform and any blending.
    fn clear(&mut self, color: Argb);

    /// Fills `rect` with `color` (source-over).
    fn fill_rect(&mut self, rect: Rect, color: Argb);

    /// Fills `shape` with `paint` (source-over).
    fn fill_rounded_rect(&mut self, shape: RoundedRect, paint: &Paint<'_>, anti_alias: bool);
}

// 2x2 supersampling pattern used for anti-aliased coverage.
const AA_SAMPLES: [(f64, f64); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];
const CENTER_SAMPLE: [(f64, f64); 1] = [(0.5, 0.5)];

/// A [`Canvas`] that rasterizes into a [`Pixmap`] on the CPU.
#[derive(Debug)]
pub struct PixmapCanvas<'a> {
    target: &'a mut Pixmap,
    transform: Affine,
    stack: Vec<Affine>,
}

impl<'a> PixmapCanvas<'a> {
    /// Creates a canvas with an identity transform.
    #[must_use]
    pub fn new(target: &'a mut Pixmap) -> Self {
        Self {
            target,
            transform: Affine::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// Returns the current local-to-device transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Returns the number of transforms currently saved.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.stack.len()
    }

    fn fill_shape(&mut self, shape: &RoundedRect, paint: &Paint<'_>, anti_alias: bool) {
        if self.transform.determinant() == 0.0 {
            return;
        }
        let width = self.target.width();
        let bounds = Rect::new(0.0, 0.0, f64::from(width), f64::from(self.target.height()));
        let device = self
            .transform
            .transform_rect_bbox(shape.rect())
            .expand()
            .intersect(bounds);
        if device.width() <= 0.0 || device.height() <= 0.0 {
            return;
        }

        let to_local = self.transform.inverse();
        let (solid, to_image) = match paint {
            Paint::Solid(color) => (color.premultiply(), Affine::IDENTITY),
            Paint::Image(pattern) => (0, pattern.transform.inverse() * to_local),
        };
        let samples: &[(f64, f64)] = if anti_alias {
            &AA_SAMPLES
        } else {
            &CENTER_SAMPLE
        };

        #[expect(
            clippy::cast_possible_truncation,
            reason = "device bounds are clamped to the target and already integral"
        )]
        let (x0, y0, x1, y1) = (
            device.x0 as u32,
            device.y0 as u32,
            device.x1 as u32,
            device.y1 as u32,
        );
        for y in y0..y1 {
            for x in x0..x1 {
                let hits = samples
                    .iter()
                    .filter(|(dx, dy)| {
                        let p = to_local * Point::new(f64::from(x) + dx, f64::from(y) + dy);
                        shape.contains(p)
                    })
                    .count();
                if hits == 0 {
                    continue;
                }
                let src = match paint {
                    Paint::Solid(_) => solid,
                    Paint::Image(pattern) => {
                        let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                        sample_bilinear(pattern.image, to_image * center)
                    }
                };
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "at most four samples per pixel"
                )]
                let coverage = (hits * 255 / samples.len()) as u32;
                let idx = y as usize * width as usize + x as usize;
                let data = self.target.data_mut();
                data[idx] = source_over(scale_pixel(src, coverage), data[idx]);
            }
        }
    }
}

impl Canvas for PixmapCanvas<'_> {
    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform *= Affine::scale_non_uniform(sx, sy);
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform *= Affine::translate(offset);
    }

    fn clear(&mut self, color: Argb) {
        self.target.fill(color.premultiply());
    }

    fn fill_rect(&mut self, rect: Rect, color: Argb) {
        self.fill_shape(&RoundedRect::from_rect(rect, 0.0), &Paint::Solid(color), false);
    }

    fn fill_rounded_rect(&mut self, shape: RoundedRect, paint: &Paint<'_>, anti_alias: bool) {
        self.fill_shape(&shape, paint, anti_alias);
    }
}

/// Scales every channel of a premultiplied pixel by `coverage / 255`.
fn scale_pixel(pixel: u32, coverage: u32) -> u32 {
    if coverage >= 255 {
        return pixel;
    }
    let channel = |shift: u32| mul_div_255((pixel >> shift) & 0xFF, coverage) << shift;
    channel(24) | channel(16) | channel(8) | channel(0)
}

/// Premultiplied source-over.
fn source_over(src: u32, dst: u32) -> u32 {
    let inv = 255 - (src >> 24);
    if inv == 0 {
        return src;
    }
    let channel = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        (s + mul_div_255(d, inv)).min(255) << shift
    };
    channel(24) | channel(16) | channel(8) | channel(0)
}

/// Samples `image` at `p` (in pixel space, pixel centers at `+0.5`) with
/// bilinear filtering and edge clamping.
#[expect(
    clippy::cast_possible_truncation,
    reason = "coordinates are clamped to the image before conversion"
)]
fn sample_bilinear(image: &Pixmap, p: Point) -> u32 {
    let max_x = f64::from(image.width() - 1);
    let max_y = f64::from(image.height() - 1);
    let u = clamp(p.x - 0.5, max_x);
    let v = clamp(p.y - 0.5, max_y);
    let (x0, y0) = (u as u32, v as u32);
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = u - f64::from(x0);
    let fy = v - f64::from(y0);

    let (p00, p10) = (image.pixel(x0, y0), image.pixel(x1, y0));
    let (p01, p11) = (image.pixel(x0, y1), image.pixel(x1, y1));
    let channel = |shift: u32| {
        let c = |px: u32| f64::from((px >> shift) & 0xFF);
        let top = c(p00) + (c(p10) - c(p00)) * fx;
        let bottom = c(p01) + (c(p11) - c(p01)) * fx;
        let value = top + (bottom - top) * fy + 0.5;
        (value as u32).min(255) << shift
    };
    channel(24) | channel(16) | channel(8) | channel(0)
}

fn clamp(value: f64, max: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else if value > max {
        max
    } else {
        value
    }
}
