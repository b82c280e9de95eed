//! Frame encoding and byte-stream parsing.
//!
//! App-facing frame format (both directions):
//! - START (1 byte): 0x27
//! - LEN (1 byte): bytes from GROUP through the last payload byte
//! - GROUP (1 byte): sender/receiver group identifier
//! - ADDR (1 byte): bus address
//! - SC (1 byte): service code
//! - PAYLOAD (LEN - 3 bytes): service-specific data
//! - END (1 byte): 0x16
//!
//! The same parser also reads slave replies, which are prefixed by a group
//! byte that happens to equal START.

use heapless::Vec;

use crate::codes::{FRAME_END, FRAME_START};

/// Maximum LEN accepted on the App channel
pub const MAX_BODY_SIZE: usize = 64;

/// Maximum payload size in bytes (LEN minus GROUP, ADDR and SC)
pub const MAX_PAYLOAD_SIZE: usize = MAX_BODY_SIZE - 3;

/// Maximum complete frame size (START + LEN + body + END)
pub const MAX_FRAME_SIZE: usize = 1 + 1 + MAX_BODY_SIZE + 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// LEN byte was zero or larger than the channel accepts
    InvalidLength,
    /// The byte after the body was not END
    MissingEnd,
    /// Body too short for the header, or payload does not fit the command
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// An App-facing frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Group identifier
    pub group: u8,
    /// Bus address
    pub addr: u8,
    /// Service code
    pub service: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame
    pub fn new(group: u8, addr: u8, service: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            group,
            addr,
            service,
            payload: payload_vec,
        })
    }

    /// Split a parsed body (GROUP..last payload byte) into a frame
    pub fn from_body(body: &[u8]) -> Result<Self, FrameError> {
        if body.len() < 3 {
            return Err(FrameError::InvalidFrame);
        }
        Self::new(body[0], body[1], body[2], &body[3..])
    }

    /// Value of the LEN byte for this frame
    pub fn body_len(&self) -> u8 {
        (3 + self.payload.len()) as u8
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        self.body_len() as usize + 3
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_START;
        buffer[1] = self.body_len();
        buffer[2] = self.group;
        buffer[3] = self.addr;
        buffer[4] = self.service;
        buffer[5..5 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = FRAME_END;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Byte-at-a-time frame parser
///
/// `CAP` is the largest LEN the channel accepts. The parser owns no heap
/// and never blocks, so it can be fed straight from a receive interrupt.
#[derive(Debug, Clone)]
pub struct FrameParser<const CAP: usize> {
    state: ParseState,
    body: Vec<u8, CAP>,
    expected_len: u8,
    group_prefix: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    WaitStart,
    /// Got START; next byte is LEN or a group prefix
    GotStart,
    /// Group prefix consumed, waiting for LEN
    WaitLen,
    /// Reading body bytes
    Collect,
    /// Waiting for END
    WaitEnd,
}

impl<const CAP: usize> Default for FrameParser<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> FrameParser<CAP> {
    /// Create a parser for frames with no group prefix
    pub const fn new() -> Self {
        Self {
            state: ParseState::WaitStart,
            body: Vec::new(),
            expected_len: 0,
            group_prefix: None,
        }
    }

    /// Create a parser that skips an optional `prefix` byte right after START
    pub const fn with_group_prefix(prefix: u8) -> Self {
        Self {
            state: ParseState::WaitStart,
            body: Vec::new(),
            expected_len: 0,
            group_prefix: Some(prefix),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitStart;
        self.body.clear();
        self.expected_len = 0;
    }

    /// True when the parser is between frames
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitStart
    }

    fn accept_len(&mut self, byte: u8) -> Result<Option<Vec<u8, CAP>>, FrameError> {
        if byte == 0 || byte as usize > CAP {
            self.reset();
            return Err(FrameError::InvalidLength);
        }
        self.expected_len = byte;
        self.body.clear();
        self.state = ParseState::Collect;
        Ok(None)
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(body))` when a complete frame is parsed (the bytes
    /// between LEN and END), `Ok(None)` when more bytes are needed, or `Err`
    /// when the frame was malformed. The parser is back at START either way.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Vec<u8, CAP>>, FrameError> {
        match self.state {
            ParseState::WaitStart => {
                if byte == FRAME_START {
                    self.state = ParseState::GotStart;
                }
                // Silently ignore non-START bytes while waiting
                Ok(None)
            }
            ParseState::GotStart => {
                if self.group_prefix == Some(byte) {
                    self.state = ParseState::WaitLen;
                    return Ok(None);
                }
                self.accept_len(byte)
            }
            ParseState::WaitLen => self.accept_len(byte),
            ParseState::Collect => {
                // Cannot fail: expected_len <= CAP
                let _ = self.body.push(byte);
                if self.body.len() == self.expected_len as usize {
                    self.state = ParseState::WaitEnd;
                }
                Ok(None)
            }
            ParseState::WaitEnd => {
                if byte != FRAME_END {
                    self.reset();
                    return Err(FrameError::MissingEnd);
                }
                let body = self.body.clone();
                self.reset();
                Ok(Some(body))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Vec<u8, CAP>>, FrameError> {
        for &byte in bytes {
            if let Some(body) = self.feed(byte)? {
                return Ok(Some(body));
            }
        }
        Ok(None)
    }
}
