//! Engine Facade: the single glue struct the host drives, generalizing the
//! teacher's `Context<'a, T>` (`src/context.rs`) from one MIN link to `N`
//! multiplexed PRLSC services.
//!
//! No hidden global state: every operation takes the `Config` and, via
//! `&mut self`/`&mut H`, the one `Engine` instance it operates on. A host
//! that runs several independent links just keeps several `Engine`s.

use log::{debug, trace, warn};

use crate::config::Config;
use crate::error::ErrorCode;
use crate::hooks::Hooks;
use crate::ring::CircularBuffer;
use crate::rx_datagram::{RxDatagramMachine, RxDatagramOutcome};
use crate::rx_frame::{Frame, RxByteOutcome, RxFrameMachine};
use crate::scheduler::{self, Selection};
use crate::tx_packer::{self, PackOutcome};
use crate::tx_pump::TxBytePump;

/// The protocol engine's mutable state. Parameterized by:
/// - `N`: number of multiplexed services (1..=8)
/// - `FRAME_BUF`: capacity for one frame record's `service_code, length,
///   data, checksum` bytes (must be >= `frame_length_max + 3`)
/// - `DATAGRAM_BUF`: capacity for one service's reassembled datagram
///   (must be >= `datagram_length_max + 1`)
/// - `TX_BUF`: capacity of one service's TX ring buffer
pub struct Engine<const N: usize, const FRAME_BUF: usize, const DATAGRAM_BUF: usize, const TX_BUF: usize>
{
    rx_frame: RxFrameMachine<FRAME_BUF>,
    rx_datagrams: [RxDatagramMachine<DATAGRAM_BUF>; N],
    tx_buffers: [CircularBuffer<TX_BUF>; N],
    tx_pump: TxBytePump<FRAME_BUF>,
    last_transmitted: [u32; N],
    new_tx_data_flag: bool,
    error_code: ErrorCode,
}

impl<const N: usize, const FRAME_BUF: usize, const DATAGRAM_BUF: usize, const TX_BUF: usize>
    Engine<N, FRAME_BUF, DATAGRAM_BUF, TX_BUF>
{
    pub fn new(cfg: &Config<N>) -> Self {
        Engine {
            rx_frame: RxFrameMachine::new(),
            rx_datagrams: core::array::from_fn(|i| RxDatagramMachine::new(cfg.services[i].stream)),
            tx_buffers: core::array::from_fn(|_| CircularBuffer::new()),
            tx_pump: TxBytePump::new(),
            last_transmitted: [0; N],
            new_tx_data_flag: false,
            error_code: ErrorCode::None,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Clears the sticky error field. Errors are otherwise sticky until the
    /// host calls this.
    pub fn clear_error(&mut self) {
        self.error_code = ErrorCode::None;
    }

    pub fn new_tx_data_flag(&self) -> bool {
        self.new_tx_data_flag
    }

    pub fn clear_new_tx_data_flag(&mut self) {
        self.new_tx_data_flag = false;
    }

    pub fn frames_received(&self) -> u32 {
        self.rx_frame.frames_received
    }

    /// Restores every piece of mutable state to its power-on value, without
    /// touching `Config`. Useful between test cases or after a link reset,
    /// since error codes are otherwise sticky until cleared.
    pub fn reset(&mut self) {
        self.rx_frame.reset();
        for rd in self.rx_datagrams.iter_mut() {
            rd.reset();
        }
        self.tx_buffers = core::array::from_fn(|_| CircularBuffer::new());
        self.tx_pump = TxBytePump::new();
        self.last_transmitted = [0; N];
        self.new_tx_data_flag = false;
        self.error_code = ErrorCode::None;
    }

    /// Feeds one incoming wire byte through the RX frame machine and, on a
    /// completed frame, through that service's RX datagram machine,
    /// delivering a completed datagram to `hooks.on_datagram`.
    pub fn receive_byte<H: Hooks<DATAGRAM_BUF>>(&mut self, byte: u8, cfg: &Config<N>, hooks: &mut H) {
        let outcome = self
            .rx_frame
            .receive_byte(byte, cfg, |data| hooks.checksum(data));
        match outcome {
            RxByteOutcome::Pending => {}
            RxByteOutcome::Error(code) => {
                warn!("prlsc: rx frame error {:?}", code);
                self.error_code = code;
            }
            RxByteOutcome::Frame(frame) => {
                trace!(
                    "prlsc: rx frame service={} sub={} len={}",
                    frame.service_index, frame.sub_service_index, frame.length
                );
                self.deliver_frame(&frame, cfg, hooks);
            }
        }
    }

    /// Bypasses the RX frame machine entirely and feeds an already-complete
    /// frame straight to the RX datagram machine, for tests or a host that
    /// reassembles frames itself.
    pub fn receive_frame<H: Hooks<DATAGRAM_BUF>>(
        &mut self,
        frame: &Frame<FRAME_BUF>,
        cfg: &Config<N>,
        hooks: &mut H,
    ) {
        if frame.service_index as usize >= cfg.service_count() {
            self.error_code = ErrorCode::RxFrameServiceIndexBounds;
            return;
        }
        self.deliver_frame(frame, cfg, hooks);
    }

    fn deliver_frame<H: Hooks<DATAGRAM_BUF>>(
        &mut self,
        frame: &Frame<FRAME_BUF>,
        cfg: &Config<N>,
        hooks: &mut H,
    ) {
        let idx = frame.service_index as usize;
        let outcome = self.rx_datagrams[idx].on_frame(
            frame,
            cfg.frame_length_max,
            cfg.datagram_length_max,
            |data| hooks.checksum(data),
        );
        match outcome {
            RxDatagramOutcome::None => {}
            RxDatagramOutcome::Error(code) => {
                warn!("prlsc: rx datagram error {:?} on service {}", code, idx);
                self.error_code = code;
            }
            RxDatagramOutcome::Datagram(datagram) => {
                debug!(
                    "prlsc: rx datagram service={} sub={} len={}",
                    datagram.service_index, datagram.sub_service_index, datagram.length
                );
                let _response = hooks.on_datagram(&datagram);
            }
        }
    }

    /// Packs `data` into one or more frames for `service_index` and writes
    /// them into that service's TX ring. Returns the number of frames
    /// buffered, or `0` on failure — check `error_code()` for why, except
    /// when the ring simply didn't have room, which leaves `error_code`
    /// untouched and is a signal to retry later.
    pub fn transmit_datagram<H: Hooks<DATAGRAM_BUF>>(
        &mut self,
        service_index: u8,
        sub_service_index: u8,
        data: &[u8],
        cfg: &Config<N>,
        hooks: &H,
    ) -> u32 {
        if service_index as usize >= cfg.service_count() {
            self.error_code = ErrorCode::DatagramServiceIndexBounds;
            return 0;
        }
        let outcome = tx_packer::pack_datagram(
            service_index,
            sub_service_index,
            data,
            cfg,
            |d| hooks.checksum(d),
            &mut self.tx_buffers[service_index as usize],
        );
        match outcome {
            PackOutcome::Enqueued { frames } => {
                self.new_tx_data_flag = true;
                trace!(
                    "prlsc: queued {} frame(s) for service {}",
                    frames, service_index
                );
                frames
            }
            PackOutcome::Error(code) => {
                self.error_code = code;
                0
            }
            PackOutcome::BufferFull => {
                debug!("prlsc: tx buffer full for service {}", service_index);
                0
            }
        }
    }

    /// Selects the next eligible service and arms the byte pump. Returns
    /// `true` (and arms the pump) if a frame is ready to send; otherwise
    /// returns `false` and reports the minimum time until a rate-limited
    /// service becomes eligible via `rate_limit_lifted_in`.
    pub fn prepare_service_transmission<H: Hooks<DATAGRAM_BUF>>(
        &mut self,
        cfg: &Config<N>,
        hooks: &H,
    ) -> (bool, u32) {
        let now = hooks.get_time();
        match scheduler::select(now, cfg, &self.tx_buffers, &self.last_transmitted) {
            Selection::Ready { service_index } => {
                // `copy_out_record` writes the leading start_frame byte too
                // (4 + frame_length_max worst case); the pump's transmit
                // buffer excludes it (see tx_pump.rs), so the record is
                // copied through a plain worst-case scratch array first.
                // This scratch size is a literal, not FRAME_BUF-derived,
                // for the same reason MAX_RECORD_BODY is in tx_packer.rs.
                let mut scratch = [0u8; 4 + 255];
                match self.tx_buffers[service_index].copy_out_record(&mut scratch) {
                    Some(len) => {
                        self.tx_pump.arm(service_index as u8, &scratch[1..len]);
                        (true, 0)
                    }
                    // The scheduler only selects non-empty buffers, so this
                    // doesn't happen in practice; stay idle rather than
                    // panic if it ever does.
                    None => (false, 0),
                }
            }
            Selection::NotReady { lifted_in } => (false, lifted_in),
        }
    }

    /// Emits at most one byte per call; the host loops until this returns
    /// `false`.
    pub fn tx_byte<H: Hooks<DATAGRAM_BUF>>(&mut self, cfg: &Config<N>, hooks: &mut H) -> bool {
        match self.tx_pump.tx_byte(cfg) {
            None => false,
            Some((byte, completed)) => {
                hooks.send_byte(byte);
                if completed {
                    let service_index = self.tx_pump.transmit_service_index() as usize;
                    let record_len = self.tx_pump.latched_record_len();
                    self.tx_buffers[service_index].advance_tx(record_len);
                    self.last_transmitted[service_index] = hooks.get_time();
                }
                true
            }
        }
    }
}
