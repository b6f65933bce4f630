//! Engine configuration.
//!
//! `Config` is immutable once built; there is no mutation API on the hot
//! path — configuration and state are owned by the host and passed into
//! every operation by reference.

use crate::error::ConfigError;

/// Per-service configuration.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Stream services map one datagram to one frame and carry no
    /// datagram-level checksum. Diagnostics services (`stream == false`)
    /// may span multiple frames and terminate on a short/empty frame.
    pub stream: bool,
    /// Minimum ticks between successive completed frame transmissions on
    /// this service. `0` means unlimited.
    pub rate_limit: u32,
    /// When set on a stream service, a newly queued datagram discards any
    /// still-unsent older frame for this service.
    pub only_tx_latest: bool,
}

impl ServiceConfig {
    pub const fn new(stream: bool, rate_limit: u32, only_tx_latest: bool) -> Self {
        ServiceConfig {
            stream,
            rate_limit,
            only_tx_latest,
        }
    }
}

/// Immutable engine configuration, parameterized by the number of
/// multiplexed services `N` (1..=8 — a 3-bit service index).
#[derive(Debug, Clone)]
pub struct Config<const N: usize> {
    pub start_frame: u8,
    pub esc: u8,
    pub esc_start: u8,
    pub esc_esc: u8,
    /// Upper bound on a single frame's payload, 1..=255.
    pub frame_length_max: u8,
    /// Upper bound on a datagram's payload (before any datagram checksum
    /// byte is appended for diagnostics services).
    pub datagram_length_max: u16,
    pub services: [ServiceConfig; N],
}

impl<const N: usize> Config<N> {
    /// Build a validated configuration.
    ///
    /// `FRAME_BUF`/`DATAGRAM_BUF` are passed in explicitly (rather than
    /// derived from `frame_length_max`/`datagram_length_max` via const-generic
    /// arithmetic) because stable Rust does not support expressions like
    /// `[u8; FRAME_MAX + 3]` in array lengths — the host picks buffer
    /// capacities at the type level and this constructor checks they are
    /// big enough.
    pub fn new(
        start_frame: u8,
        esc: u8,
        esc_start: u8,
        esc_esc: u8,
        frame_length_max: u8,
        datagram_length_max: u16,
        services: [ServiceConfig; N],
        frame_buf_capacity: usize,
        datagram_buf_capacity: usize,
    ) -> Result<Self, ConfigError> {
        if N == 0 || N > 8 {
            return Err(ConfigError::ServiceCountOutOfRange);
        }
        let sentinels = [start_frame, esc, esc_start, esc_esc];
        for i in 0..sentinels.len() {
            for j in (i + 1)..sentinels.len() {
                if sentinels[i] == sentinels[j] {
                    return Err(ConfigError::SentinelBytesNotDistinct);
                }
            }
        }
        if frame_length_max == 0 {
            return Err(ConfigError::FrameLengthMaxZero);
        }
        if frame_buf_capacity < frame_length_max as usize + 3 {
            return Err(ConfigError::FrameBufferTooSmall);
        }
        // A datagram buffer must hold whichever is larger: a diagnostics
        // datagram's payload plus its trailing checksum byte
        // (`datagram_length_max + 1`), or a stream datagram, which is
        // exactly one frame's worth of data and so can be as large as
        // `frame_length_max`. Either reassembly path copies straight into a
        // `[u8; DATAGRAM_BUF]` array, so undersizing either one is a buffer
        // overrun waiting to happen on otherwise-valid input.
        let min_datagram_buf = core::cmp::max(frame_length_max as usize, datagram_length_max as usize + 1);
        if datagram_buf_capacity < min_datagram_buf {
            return Err(ConfigError::DatagramBufferTooSmall);
        }

        Ok(Config {
            start_frame,
            esc,
            esc_start,
            esc_esc,
            frame_length_max,
            datagram_length_max,
            services,
        })
    }

    pub const fn service_count(&self) -> usize {
        N
    }
}
