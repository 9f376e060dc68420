// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Resource limits and cancellation support for lossless-JPEG decoding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    error::{Error, Result},
    headers::FrameHeader,
};

/// Configurable resource limits, checked against the frame header before
/// any row storage is allocated.
///
/// All limits default to `None` (unlimited). Use
/// [`DecoderLimits::default_safe()`] for general use, or
/// [`DecoderLimits::restrictive()`] for untrusted input.
///
/// ```
/// use rawljpeg::api::DecoderLimits;
///
/// let limits = DecoderLimits::restrictive();
/// assert!(limits.max_pixels.is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct DecoderLimits {
    /// Maximum columns times rows of one frame.
    /// Recommended safe: `1 << 30`.
    pub max_pixels: Option<usize>,

    /// Maximum samples per row, i.e. columns times components.
    /// Recommended safe: `1 << 20`.
    pub max_components_per_row: Option<usize>,
}

impl DecoderLimits {
    /// Limits large enough for any camera sensor in production.
    pub fn default_safe() -> Self {
        Self {
            max_pixels: Some(1 << 30),
            max_components_per_row: Some(1 << 20),
        }
    }

    /// Limits for input from untrusted sources.
    pub fn restrictive() -> Self {
        Self {
            max_pixels: Some(200_000_000),
            max_components_per_row: Some(1 << 17),
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn check(&self, header: &FrameHeader) -> Result<()> {
        let (width, height) = (header.width(), header.height());
        let too_many_pixels = self
            .max_pixels
            .is_some_and(|max| width.checked_mul(height).is_none_or(|p| p > max));
        let row_too_long = self
            .max_components_per_row
            .is_some_and(|max| header.samples_per_row() > max);
        if too_many_pixels || row_too_long {
            return Err(Error::ImageSizeTooLarge(width, height));
        }
        Ok(())
    }
}

/// A thread-safe token for cooperative cancellation of a decode.
///
/// The decoder polls the token once per row and stops with
/// [`Error::Cancelled`] once it is set.
///
/// ```
/// use rawljpeg::api::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals that the operation should be cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resets the token to allow reuse.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
