//! TX Byte Pump: drains one already-selected frame to the wire, one byte
//! per call, applying escape coding as it goes.
//!
//! This is the transmit-side mirror of [`crate::rx_frame::RxFrameMachine`],
//! generalizing the teacher's `stuffed_tx_byte` (`src/context.rs`) — which
//! emits an entire frame in one call — into an explicit, resumable
//! one-byte-at-a-time machine, so the host stays in control of pacing.

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    DoNothing,
    Start,
    NormalByte,
    EscapedByte { pending: u8, last: bool },
}

pub struct TxBytePump<const FRAME_BUF: usize> {
    state: State,
    /// Raw record bytes, *excluding* the leading `start_frame` (that byte
    /// is emitted directly from `cfg.start_frame` in the `Start` state).
    transmit_buffer: [u8; FRAME_BUF],
    transmit_length: usize,
    buffer_index: usize,
    transmit_service_index: u8,
}

impl<const FRAME_BUF: usize> TxBytePump<FRAME_BUF> {
    pub const fn new() -> Self {
        TxBytePump {
            state: State::DoNothing,
            transmit_buffer: [0; FRAME_BUF],
            transmit_length: 0,
            buffer_index: 0,
            transmit_service_index: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::DoNothing)
    }

    pub fn transmit_service_index(&self) -> u8 {
        self.transmit_service_index
    }

    /// Latches a new frame (service_code, length, data.., checksum — no
    /// leading start byte) for transmission and arms the pump in `Start`.
    pub fn arm(&mut self, service_index: u8, record_without_start: &[u8]) {
        let len = record_without_start.len().min(FRAME_BUF);
        self.transmit_buffer[..len].copy_from_slice(&record_without_start[..len]);
        self.transmit_length = len;
        self.buffer_index = 0;
        self.transmit_service_index = service_index;
        self.state = State::Start;
    }

    /// Emit exactly one byte, if any. Returns `None` when idle (the host
    /// should stop looping). Returns `Some(true)` when this call completed
    /// the frame (the caller should advance the ring's read cursor and
    /// record the transmit time for `transmit_service_index`).
    pub fn tx_byte<const N: usize>(&mut self, cfg: &Config<N>) -> Option<(u8, bool)> {
        match self.state {
            State::DoNothing => None,
            State::Start => {
                self.state = State::NormalByte;
                Some((cfg.start_frame, false))
            }
            State::NormalByte => {
                if self.buffer_index >= self.transmit_length {
                    self.state = State::DoNothing;
                    return None;
                }
                let byte = self.transmit_buffer[self.buffer_index];
                self.buffer_index += 1;
                let is_last = self.buffer_index >= self.transmit_length;

                if byte == cfg.start_frame {
                    self.state = State::EscapedByte {
                        pending: cfg.esc_start,
                        last: is_last,
                    };
                    Some((cfg.esc, false))
                } else if byte == cfg.esc {
                    self.state = State::EscapedByte {
                        pending: cfg.esc_esc,
                        last: is_last,
                    };
                    Some((cfg.esc, false))
                } else {
                    self.state = if is_last {
                        State::DoNothing
                    } else {
                        State::NormalByte
                    };
                    Some((byte, is_last))
                }
            }
            State::EscapedByte { pending, last } => {
                self.state = if last {
                    State::DoNothing
                } else {
                    State::NormalByte
                };
                Some((pending, last))
            }
        }
    }

    /// Total record length currently latched (including the leading start
    /// byte), for the caller to advance the ring buffer's read cursor by
    /// once transmission completes.
    pub fn latched_record_len(&self) -> usize {
        1 + self.transmit_length
    }
}
