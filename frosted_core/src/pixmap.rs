// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Premultiplied ARGB pixel buffers.

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::AllocError;

static NEXT_PIXMAP_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Pixmap`] allocation.
///
/// Two pixmaps never share an id, even if one was released before the other
/// was allocated, so comparing ids detects buffer reallocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PixmapId(u64);

impl fmt::Debug for PixmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixmapId({})", self.0)
    }
}

/// A `width × height` buffer of premultiplied `0xAARRGGBB` pixels in
/// row-major order.
pub struct Pixmap {
    id: PixmapId,
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixmap")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Pixmap {
    /// Allocates a transparent pixmap.
    ///
    /// Allocation is fallible: running out of memory returns an
    /// [`AllocError`] rather than aborting.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn try_new(width: u32, height: u32) -> Result<Self, AllocError> {
        assert!(width > 0 && height > 0, "pixmap dimensions must be non-zero");
        let err = AllocError { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(err)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| err)?;
        data.resize(len, 0);
        Ok(Self {
            id: PixmapId(NEXT_PIXMAP_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
            data,
        })
    }

    /// Returns this allocation's identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> PixmapId {
        self.id
    }

    /// Returns the width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the pixel data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Returns the pixel data mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Returns the premultiplied pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Overwrites every pixel with `pixel`.
    pub fn fill(&mut self, pixel: u32) {
        self.data.fill(pixel);
    }

    /// Copies `other`'s pixels into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "pixmap dimensions must match"
        );
        self.data.copy_from_slice(&other.data);
    }
}
