// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::entropy_coding::huffman::HUFFMAN_MAX_BITS;

#[derive(Error, Debug)]
pub enum Error {
    // Huffman table errors
    #[error("Huffman table overfull: code of length {0} does not fit in {1} bits")]
    HuffmanTableOverfull(usize, usize),
    #[error("Huffman table truncated: counts declare {0} symbols, only {1} present")]
    HuffmanTableTruncated(usize, usize),
    #[error("Huffman table of max length {0} could not be allocated")]
    HuffmanTableAllocation(usize),
    // Marker stream errors
    #[error("Invalid start of image {0:02x}{1:02x}, expected ffd8")]
    MissingStartOfImage(u8, u8),
    #[error("Invalid marker {0:04x}")]
    InvalidMarker(u16),
    #[error("Invalid length {1} for segment {0:04x}")]
    InvalidSegmentLength(u16, usize),
    #[error("Segment {0:04x} extends past the end of the stream")]
    SegmentTruncated(u16),
    #[error("Too many marker segments: more than {0} before start of scan")]
    TooManySegments(usize),
    #[error("Stream ended before start of scan")]
    UnexpectedEndOfHeader,
    #[error("No frame segment before start of scan")]
    MissingFrameHeader,
    #[error("Invalid Huffman table slot {0}")]
    InvalidHuffmanSlot(u8),
    #[error("Invalid bit depth: {0}")]
    InvalidBitDepth(i32),
    #[error("Invalid component count: {0}")]
    InvalidComponentCount(usize),
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
    #[error("Invalid predictor selection value: {0}")]
    InvalidPredictor(u8),
    #[error("Huffman table slot {0} is not defined")]
    MissingHuffmanTable(usize),
    #[error("Invalid Huffman code")]
    InvalidHuffmanCode,
    #[error("Difference length {0} exceeds {max} bits", max = HUFFMAN_MAX_BITS)]
    InvalidDifferenceLength(u8),
    #[error("Difference length 16 is not allowed by this format revision")]
    Length16NotAllowed,
    #[error("Frame size {0}x{1} does not match expected {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),
    // Decode errors
    #[error("Lost sync: restart marker RST{marker} not found before row {row}")]
    SyncLost { row: usize, marker: u8 },
    #[error(
        "Sample overflow: {value} does not fit in {bit_depth} bits at row {row}, column {column}, component {component}"
    )]
    SampleOverflow {
        value: i32,
        bit_depth: u32,
        row: usize,
        column: usize,
        component: usize,
    },
    #[error("Stream truncated at row {row}, column {column}")]
    Truncated { row: usize, column: usize },
    #[error("Decode cancelled")]
    Cancelled,
    // Resource errors
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
}

/// Failure classes reported at the library boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedTable,
    MalformedStream,
    SyncLost,
    SampleOverflow,
    Truncated,
    Cancelled,
    ResourceLimit,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::HuffmanTableOverfull(..)
            | Error::HuffmanTableTruncated(..)
            | Error::HuffmanTableAllocation(_) => ErrorKind::MalformedTable,
            Error::MissingStartOfImage(..)
            | Error::InvalidMarker(_)
            | Error::InvalidSegmentLength(..)
            | Error::SegmentTruncated(_)
            | Error::TooManySegments(_)
            | Error::UnexpectedEndOfHeader
            | Error::MissingFrameHeader
            | Error::InvalidHuffmanSlot(_)
            | Error::InvalidBitDepth(_)
            | Error::InvalidComponentCount(_)
            | Error::InvalidImageSize(..)
            | Error::InvalidPredictor(_)
            | Error::MissingHuffmanTable(_)
            | Error::InvalidHuffmanCode
            | Error::InvalidDifferenceLength(_)
            | Error::Length16NotAllowed
            | Error::DimensionMismatch(..) => ErrorKind::MalformedStream,
            Error::SyncLost { .. } => ErrorKind::SyncLost,
            Error::SampleOverflow { .. } => ErrorKind::SampleOverflow,
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::OutOfMemory(_) | Error::ImageSizeTooLarge(..) => ErrorKind::ResourceLimit,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
