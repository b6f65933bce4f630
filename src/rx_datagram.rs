//! RX Datagram Machine and the `Datagram` value it produces. One instance
//! exists per service; the engine owns an array of `N` of them.
//!
//! Generalizes the teacher's `valid_frame_received`/`msg_enqueue`
//! (`src/context.rs`), which hands a single already-complete frame straight
//! to the application, into multi-frame reassembly for diagnostics
//! services while keeping the stream-service fast path a direct pass-through.

use crate::error::ErrorCode;
use crate::rx_frame::Frame;

/// One fully reassembled datagram.
#[derive(Debug, Clone, Copy)]
pub struct Datagram<const DATAGRAM_BUF: usize> {
    pub service_index: u8,
    pub sub_service_index: u8,
    pub length: u16,
    pub data: [u8; DATAGRAM_BUF],
    /// `0` for stream services (no datagram-level checksum on the wire).
    pub checksum: u8,
}

impl<const DATAGRAM_BUF: usize> Datagram<DATAGRAM_BUF> {
    pub fn data(&self) -> &[u8] {
        &self.data[..self.length as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Populating,
    Error,
}

pub enum RxDatagramOutcome<const DATAGRAM_BUF: usize> {
    /// No datagram completed yet (mid-reassembly, or a frame was
    /// discarded while resyncing after an earlier error).
    None,
    Datagram(Datagram<DATAGRAM_BUF>),
    Error(ErrorCode),
}

pub struct RxDatagramMachine<const DATAGRAM_BUF: usize> {
    stream: bool,
    state: State,
    buffer: [u8; DATAGRAM_BUF],
    cur_idx: usize,
}

impl<const DATAGRAM_BUF: usize> RxDatagramMachine<DATAGRAM_BUF> {
    pub const fn new(stream: bool) -> Self {
        RxDatagramMachine {
            stream,
            state: State::Populating,
            buffer: [0; DATAGRAM_BUF],
            cur_idx: 0,
        }
    }

    pub fn reset(&mut self) {
        self.state = State::Populating;
        self.cur_idx = 0;
    }

    /// Feed one fully-received frame for this service.
    pub fn on_frame<const FRAME_BUF: usize>(
        &mut self,
        frame: &Frame<FRAME_BUF>,
        frame_length_max: u8,
        datagram_length_max: u16,
        checksum_fn: impl FnOnce(&[u8]) -> u8,
    ) -> RxDatagramOutcome<DATAGRAM_BUF> {
        if self.stream {
            let mut data = [0u8; DATAGRAM_BUF];
            let len = frame.length as usize;
            data[..len].copy_from_slice(frame.data());
            return RxDatagramOutcome::Datagram(Datagram {
                service_index: frame.service_index,
                sub_service_index: frame.sub_service_index,
                length: frame.length as u16,
                data,
                checksum: 0,
            });
        }

        let terminator = frame.length < frame_length_max || frame.length == 0;

        match self.state {
            State::Error => {
                if terminator {
                    self.reset();
                }
                RxDatagramOutcome::None
            }
            State::Populating => {
                let len = frame.length as usize;
                // `datagram_length_max + 1` accounts for the trailing
                // datagram checksum byte that rides along with the data in
                // this buffer until the terminator strips it back off.
                if self.cur_idx + len > datagram_length_max as usize + 1 {
                    self.state = State::Error;
                    if terminator {
                        self.reset();
                    }
                    return RxDatagramOutcome::Error(ErrorCode::DatagramTooLong);
                }
                self.buffer[self.cur_idx..self.cur_idx + len].copy_from_slice(frame.data());
                self.cur_idx += len;

                if !terminator {
                    return RxDatagramOutcome::None;
                }

                if self.cur_idx == 0 {
                    // An empty terminator with nothing ever populated before
                    // it: no datagram to emit, just resync.
                    self.reset();
                    return RxDatagramOutcome::None;
                }

                let payload_len = self.cur_idx - 1;
                let trailing_checksum = self.buffer[payload_len];
                let ok = checksum_fn(&self.buffer[..payload_len]) == trailing_checksum;
                let mut data = [0u8; DATAGRAM_BUF];
                data[..payload_len].copy_from_slice(&self.buffer[..payload_len]);
                self.reset();

                if ok {
                    RxDatagramOutcome::Datagram(Datagram {
                        service_index: frame.service_index,
                        sub_service_index: frame.sub_service_index,
                        length: payload_len as u16,
                        data,
                        checksum: trailing_checksum,
                    })
                } else {
                    RxDatagramOutcome::Error(ErrorCode::DatagramBadChecksum)
                }
            }
        }
    }
}
