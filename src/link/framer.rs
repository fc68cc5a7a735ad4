//! Newline-delimited frame splitter.
//!
//! Feed arbitrary socket chunks with [`LineFramer::push`] and pull whole lines
//! with [`LineFramer::next_frame`]. A line longer than the configured maximum
//! is discarded up to its terminating newline so the stream resynchronizes on
//! the next frame.
use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Default maximum line length (1 MiB).
pub const DEFAULT_MAX_LINE: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame exceeds {max} bytes")]
    Oversize { max: usize },
    #[error("frame is not valid UTF-8")]
    Utf8,
}

pub struct LineFramer {
    buf: BytesMut,
    max_line: usize,
    /// Dropping bytes of an oversize line until the next newline.
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE)
    }
}

impl LineFramer {
    pub fn new(max_line: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(8192),
            max_line,
            discarding: false,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Next complete line without its `\n` / `\r\n`. `None` when more input is
    /// needed. Blank lines are skipped.
    pub fn next_frame(&mut self) -> Option<Result<String, FrameError>> {
        loop {
            let Some(pos) = self.buf.iter().position(|b| *b == b'\n') else {
                if self.buf.len() > self.max_line {
                    // no newline in sight; drop what we have and keep discarding
                    self.buf.clear();
                    if !self.discarding {
                        self.discarding = true;
                        return Some(Err(FrameError::Oversize { max: self.max_line }));
                    }
                }
                return None;
            };

            let line = self.buf.split_to(pos + 1);
            if self.discarding {
                self.discarding = false;
                continue;
            }
            let mut end = line.len() - 1;
            if end > 0 && line[end - 1] == b'\r' {
                end -= 1;
            }
            if end > self.max_line {
                return Some(Err(FrameError::Oversize { max: self.max_line }));
            }
            if end == 0 {
                continue;
            }
            return Some(
                std::str::from_utf8(&line[..end])
                    .map(str::to_string)
                    .map_err(|_| FrameError::Utf8),
            );
        }
    }

    pub fn clear(&mut self) {
        let len = self.buf.len();
        self.buf.advance(len);
        self.discarding = false;
    }
}
