use std::error::Error;
use std::fmt::{Debug, Display};

use crate::blob::frame::expected_len;

/// This error occurs when a frame's pixel buffer does not agree with its declared dimensions.
pub struct InvalidFrameError {
    width: u32,
    height: u32,
    buffer_len: usize,
    reason: String,
}

impl InvalidFrameError {
    pub fn new<S: Into<String>>(width: u32, height: u32, buffer_len: usize, reason: S) -> Self {
        Self {
            width,
            height,
            buffer_len,
            reason: reason.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }
}

impl Debug for InvalidFrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match expected_len(self.width, self.height) {
            Some(expected) => write!(
                f,
                "Invalid {}x{} frame with a buffer of {} bytes (expected {}). Reason: {}",
                self.width, self.height, self.buffer_len, expected, self.reason,
            ),
            None => write!(
                f,
                "Invalid {}x{} frame with a buffer of {} bytes. Reason: {}",
                self.width, self.height, self.buffer_len, self.reason,
            ),
        }
    }
}

impl Display for InvalidFrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for InvalidFrameError {}
