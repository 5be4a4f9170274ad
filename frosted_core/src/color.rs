// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed 32-bit ARGB colors.
//!
//! [`Argb`] is the straight-alpha color type used by the configuration API
//! (`0xAARRGGBB`). [`Pixmap`](crate::pixmap::Pixmap) storage is premultiplied;
//! use [`Argb::premultiply`] when writing pixels and [`unpremultiply`] when
//! reading them back.

use core::fmt;

/// A straight-alpha color packed as `0xAARRGGBB`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Argb(pub u32);

impl Argb {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0x0000_0000);

    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);

    /// Packs the four channels into a color.
    #[inline]
    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Returns the alpha channel.
    #[inline]
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Returns the red channel.
    #[inline]
    #[must_use]
    pub const fn red(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    /// Returns the green channel.
    #[inline]
    #[must_use]
    pub const fn green(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    /// Returns the blue channel.
    #[inline]
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    /// Returns this color with its alpha channel replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self(self.0 & 0x00FF_FFFF | (alpha as u32) << 24)
    }

    /// Returns the premultiplied packed pixel for this color.
    #[must_use]
    pub const fn premultiply(self) -> u32 {
        let a = self.alpha() as u32;
        let r = mul_div_255(self.red() as u32, a);
        let g = mul_div_255(self.green() as u32, a);
        let b = mul_div_255(self.blue() as u32, a);
        a << 24 | r << 16 | g << 8 | b
    }
}

impl fmt::Debug for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Argb(#{:08X})", self.0)
    }
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Converts a premultiplied packed pixel back to a straight-alpha color.
#[must_use]
pub fn unpremultiply(pixel: u32) -> Argb {
    let a = pixel >> 24;
    if a == 0 {
        return Argb::TRANSPARENT;
    }
    let channel = |shift: u32| {
        let c = (pixel >> shift) & 0xFF;
        ((c * 255 + a / 2) / a).min(255)
    };
    Argb(a << 24 | channel(16) << 16 | channel(8) << 8 | channel(0))
}

/// `c * a / 255`, rounded to nearest.
#[inline]
pub(crate) const fn mul_div_255(c: u32, a: u32) -> u32 {
    let t = c * a + 128;
    (t + (t >> 8)) >> 8
}
