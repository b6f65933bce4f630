//! The host-supplied capability trait, generalizing the teacher's
//! `Interface` trait (`src/interface.rs`) to the four collaborators PRLSC
//! needs: a clock, a checksum routine, a byte sink, and a datagram callback.

use crate::rx_datagram::Datagram;
use crate::error::ResponseCode;

/// Everything the engine needs from its host. One type implements this and
/// is handed to [`crate::Engine`] by reference, the same shape the teacher
/// uses for `Context<'a, T> where T: Interface`.
///
/// Implementations must be plain and side-effect-bounded per call: `get_time`
/// monotonic-ish and wrapping, `checksum` pure, `send_byte` non-blocking,
/// `on_datagram` must not panic — a panic inside a hook is a host bug.
pub trait Hooks<const DATAGRAM_BUF: usize> {
    /// Current time, in the host's tick units. Must tolerate wraparound;
    /// the engine only ever compares times with `wrapping_sub`.
    fn get_time(&self) -> u32;

    /// Pure, deterministic checksum over `data`. The engine calls this both
    /// over frame headers+payload (frame-level checks) and over datagram
    /// payload alone (datagram-level checks) — the two spans are
    /// deliberately different, not a bug; preserve the asymmetry.
    fn checksum(&self, data: &[u8]) -> u8;

    /// Emit one raw byte to the wire. Called at most once per
    /// [`crate::Engine::tx_byte`] invocation.
    fn send_byte(&mut self, byte: u8);

    /// Deliver a fully reassembled datagram to the application.
    fn on_datagram(&mut self, datagram: &Datagram<DATAGRAM_BUF>) -> ResponseCode;
}
