//! Newline framing for inbound client bytes.
//!
//! Wire format: ASCII lines terminated by `\n`. A `\r` before the newline
//! is dropped. Each completed line is stamped with the time of the read
//! that completed it.

use std::collections::VecDeque;

use crate::error::FramingError;

/// Longest partial line a client may leave unterminated.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// One framed message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    /// Arrival time in microseconds.
    pub time: i64,
}

/// Accumulates raw bytes and hands out complete lines in arrival order.
#[derive(Debug, Default)]
pub struct MessageQueue {
    partial: Vec<u8>,
    messages: VecDeque<Message>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes received at `time`, splitting out any complete lines.
    pub fn feed(&mut self, data: &[u8], time: i64) -> Result<(), FramingError> {
        for chunk in data.split_inclusive(|b| *b == b'\n') {
            self.partial.extend_from_slice(chunk);
            if self.partial.last() == Some(&b'\n') {
                self.partial.pop();
                if self.partial.last() == Some(&b'\r') {
                    self.partial.pop();
                }
                let text = String::from_utf8_lossy(&self.partial).into_owned();
                self.partial.clear();
                self.messages.push_back(Message { text, time });
            }
        }

        if self.partial.len() > MAX_LINE_LEN {
            return Err(FramingError::LineTooLong(self.partial.len()));
        }
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.messages.len()
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop_front()
    }
}
