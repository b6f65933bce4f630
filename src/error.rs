//! Sticky error codes surfaced via `State::error_code`, and the one-time
//! configuration errors raised by `Config::new`.

/// Error codes surfaced via `state.errorCode`.
///
/// Sticky: once raised, a code stays put until the host calls
/// [`crate::Engine::clear_error`] or [`crate::Engine::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    None = 0,
    RxFrameBadEsc = 1,
    RxFrameServiceIndexBounds = 2,
    RxFrameTooLong = 3,
    RxFrameBadChecksum = 4,
    DatagramBadChecksum = 5,
    DatagramTooLong = 6,
    DatagramServiceIndexBounds = 7,
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::None
    }
}

/// Response code returned by the host's `on_datagram` hook. Not propagated
/// over the wire, only surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    Positive = 0x00,
    InvalidRequest = 0x01,
    UnknownRequest = 0x02,
}

/// Problems with a [`crate::Config`] caught once, at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `start_frame`, `esc`, `esc_start` and `esc_esc` must all differ.
    SentinelBytesNotDistinct,
    /// Service count must be in `1..=8` (3-bit service index).
    ServiceCountOutOfRange,
    /// `frame_length_max` must be at least 1.
    FrameLengthMaxZero,
    /// The host-chosen `FRAME_BUF` const generic is too small to hold a
    /// maximum-length frame record (`frame_length_max + 3` bytes of
    /// service-code/length/data/checksum).
    FrameBufferTooSmall,
    /// The host-chosen `DATAGRAM_BUF` const generic is too small to hold a
    /// maximum-length datagram payload.
    DatagramBufferTooSmall,
}
