// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface configuration.

use core::time::Duration;

use crate::color::Argb;
use crate::error::ConfigError;

/// Configuration for a [`BlurSurface`](crate::surface::BlurSurface).
///
/// Radii are in logical units and converted to physical pixels with
/// [`scale_factor`](Self::scale_factor).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Divisor applied to the surface size before blurring (> 0).
    pub downsample_factor: f32,
    /// Blur radius in logical units (>= 0). Zero disables blurring.
    pub blur_radius: f32,
    /// Corner radius in logical units (>= 0).
    pub corner_radius: f32,
    /// Tint drawn over the blurred content.
    pub overlay_color: Argb,
    /// Logical-to-physical pixel ratio (> 0).
    pub scale_factor: f32,
    /// Delay before a deferred frame-hook subscribe attempt runs.
    pub subscribe_delay: Duration,
    /// Maximum number of base-context hops when looking up the window root.
    pub max_root_hops: u8,
}

impl SurfaceConfig {
    /// The default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            downsample_factor: 4.0,
            blur_radius: 10.0,
            corner_radius: 0.0,
            // ~30% white.
            overlay_color: Argb(0x4DFF_FFFF),
            scale_factor: 1.0,
            subscribe_delay: Duration::from_millis(32),
            max_root_hops: 4,
        }
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_downsample_factor(self.downsample_factor)?;
        check_blur_radius(self.blur_radius)?;
        check_corner_radius(self.corner_radius)?;
        check_scale_factor(self.scale_factor)
    }

    /// Blur radius in physical pixels.
    #[must_use]
    pub fn physical_blur_radius(&self) -> f32 {
        self.blur_radius * self.scale_factor
    }

    /// Corner radius in physical pixels.
    #[must_use]
    pub fn physical_corner_radius(&self) -> f64 {
        f64::from(self.corner_radius * self.scale_factor)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_downsample_factor(v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDownsampleFactor(v))
    }
}

pub(crate) fn check_blur_radius(v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidBlurRadius(v))
    }
}

pub(crate) fn check_corner_radius(v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCornerRadius(v))
    }
}

pub(crate) fn check_scale_factor(v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScaleFactor(v))
    }
}
