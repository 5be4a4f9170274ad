// Copyright 2026 the Frosted Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only [`ConfigError`] ever reaches a caller as a failure: it rejects invalid
//! configuration synchronously. Backend and allocation failures are reported
//! to the orchestrator, which degrades to "render nothing" or "render the last
//! good frame" and retries on the next frame.

use core::fmt;

/// A configuration value was rejected. The previous configuration is kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// The downsample factor must be finite and greater than zero.
    InvalidDownsampleFactor(f32),
    /// The blur radius must be finite and not negative.
    InvalidBlurRadius(f32),
    /// The corner radius must be finite and not negative.
    InvalidCornerRadius(f32),
    /// The scale factor must be finite and greater than zero.
    InvalidScaleFactor(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDownsampleFactor(v) => {
                write!(f, "downsample factor must be greater than 0, got {v}")
            }
            Self::InvalidBlurRadius(v) => write!(f, "blur radius must not be negative, got {v}"),
            Self::InvalidCornerRadius(v) => {
                write!(f, "corner radius must not be negative, got {v}")
            }
            Self::InvalidScaleFactor(v) => {
                write!(f, "scale factor must be greater than 0, got {v}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// A [`BlurBackend`](crate::backend::BlurBackend) could not be prepared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendError {
    /// No capable blur implementation is available, or it rejected the
    /// requested parameters.
    Unavailable,
    /// Backend resources could not be allocated.
    Allocation,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("blur backend unavailable"),
            Self::Allocation => f.write_str("blur backend resource allocation failed"),
        }
    }
}

impl core::error::Error for BackendError {}

/// A pixel buffer could not be allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocError {
    /// Requested width in pixels.
    pub width: u32,
    /// Requested height in pixels.
    pub height: u32,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate {}x{} pixel buffer",
            self.width, self.height
        )
    }
}

impl core::error::Error for AllocError {}
