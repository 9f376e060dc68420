// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Lossless-JPEG predictor selection values.
#[repr(u8)]
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq, Default)]
pub enum Predictor {
    #[default]
    Zero = 0,
    Left = 1,
    Top = 2,
    TopLeft = 3,
    Gradient = 4,
    LeftHalfGradient = 5,
    TopHalfGradient = 6,
    AverageLeftAndTop = 7,
}

impl TryFrom<u8> for Predictor {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(Error::InvalidPredictor(value))
    }
}

impl Predictor {
    pub const NUM_PREDICTORS: u8 = Predictor::AverageLeftAndTop as u8 + 1;

    pub fn predict(self, left: i32, top: i32, top_left: i32) -> i32 {
        match self {
            Predictor::Zero => 0,
            Predictor::Left => left,
            Predictor::Top => top,
            Predictor::TopLeft => top_left,
            Predictor::Gradient => left + top - top_left,
            Predictor::LeftHalfGradient => left + ((top - top_left) >> 1),
            Predictor::TopHalfGradient => top + ((left - top_left) >> 1),
            Predictor::AverageLeftAndTop => (left + top) >> 1,
        }
    }
}
