use std::borrow::Cow;
use std::os::unix::io::RawFd;

use nix::errno::Errno;

use crate::os::Os;
use crate::types::MAX_LINE_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Ok(usize),
    Eof,
    Error(Errno),
}

/// One input line, at most `MAX_LINE_LEN` bytes, newline stripped.
pub struct LineBuffer {
    buffer: [u8; MAX_LINE_LEN + 1],
    len: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        LineBuffer::new()
    }
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer {
            buffer: [0; MAX_LINE_LEN + 1],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
        self.len = 0;
    }

    /// Read byte by byte until a newline, end of input, or the buffer is
    /// full. Bytes past the cap stay unread for the next call.
    pub fn read<O: Os + ?Sized>(&mut self, os: &mut O, fd: RawFd) -> LineStatus {
        self.clear();
        let mut seen_newline = false;
        let mut byte = [0u8; 1];

        while self.len < MAX_LINE_LEN {
            match os.read(fd, &mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        seen_newline = true;
                        break;
                    }
                    self.buffer[self.len] = byte[0];
                    self.len += 1;
                }
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    if self.len == 0 {
                        return LineStatus::Error(e);
                    }
                    break;
                }
            }
        }

        // the buffer was zero-filled, so buffer[len] is already the terminator
        if self.len == 0 && !seen_newline {
            return LineStatus::Eof;
        }
        LineStatus::Ok(self.len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}
