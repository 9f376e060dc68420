// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod decode;
pub mod predict;
pub mod restart;
pub mod row_buffer;

pub use decode::{ComponentLayout, RowDecoder};
