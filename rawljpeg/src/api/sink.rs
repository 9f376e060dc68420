// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    error::{Error, Result},
    headers::FrameHeader,
};

/// Receives decoded samples. Rows arrive in order; within a row, columns and
/// then components arrive in order.
pub trait SampleSink {
    fn place_sample(&mut self, row: usize, column: usize, component: usize, value: u16);

    /// Called after the last sample of `row` was placed.
    fn end_row(&mut self, _row: usize) {}
}

impl<F> SampleSink for F
where
    F: FnMut(usize, usize, usize, u16),
{
    fn place_sample(&mut self, row: usize, column: usize, component: usize, value: u16) {
        self(row, column, component, value)
    }
}

/// An owned frame of samples, row-major with components interleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    components: usize,
    samples: Vec<u16>,
}

impl Plane {
    pub fn new(width: usize, height: usize, components: usize) -> Result<Plane> {
        let len = width
            .checked_mul(height)
            .and_then(|p| p.checked_mul(components))
            .ok_or(Error::ImageSizeTooLarge(width, height))?;
        let mut samples = Vec::new();
        samples.try_reserve_exact(len)?;
        samples.resize(len, 0);
        Ok(Plane {
            width,
            height,
            components,
            samples,
        })
    }

    pub fn for_header(header: &FrameHeader) -> Result<Plane> {
        Plane::new(header.width(), header.height(), header.component_count())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn row(&self, row: usize) -> &[u16] {
        let stride = self.width * self.components;
        &self.samples[row * stride..(row + 1) * stride]
    }

    pub fn sample(&self, row: usize, column: usize, component: usize) -> u16 {
        self.row(row)[column * self.components + component]
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.samples
    }
}

impl SampleSink for Plane {
    fn place_sample(&mut self, row: usize, column: usize, component: usize, value: u16) {
        let index = (row * self.width + column) * self.components + component;
        self.samples[index] = value;
    }
}

/// A fully decoded frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub header: FrameHeader,
    pub plane: Plane,
    /// Copied from the decoder options.
    pub tile_width: Option<usize>,
}
