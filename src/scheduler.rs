//! TX Scheduler: picks the next eligible service to transmit, honoring
//! per-service rate limits.
//!
//! Kept as free functions over borrowed state (rather than a struct) since
//! it owns nothing of its own — it only reads the per-service ring buffers
//! and `last_transmitted` table that already live on `Engine`. This mirrors
//! the teacher's `find_retransmit_frame` (`src/context.rs`), which is a
//! pure selection function over `Transport` state it doesn't own either.

use crate::config::Config;
use crate::ring::CircularBuffer;

/// Result of a scheduling attempt.
pub enum Selection {
    /// `service_index` won; the caller should copy its next record out of
    /// `buffers[service_index]` and arm the byte pump.
    Ready { service_index: usize },
    /// No service is eligible right now. `lifted_in` is the minimum time
    /// until some rate-limited, non-empty service becomes eligible, or `0`
    /// if no service has anything queued at all.
    NotReady { lifted_in: u32 },
}

/// Lowest-indexed eligible service wins: deterministic, and starvation of
/// high-index services is accepted.
pub fn select<const N: usize, const TX_BUF: usize>(
    now: u32,
    cfg: &Config<N>,
    buffers: &[CircularBuffer<TX_BUF>; N],
    last_transmitted: &[u32; N],
) -> Selection {
    let mut lifted_in: Option<u32> = None;

    for s in 0..N {
        if buffers[s].is_empty() {
            continue;
        }
        let rate_limit = cfg.services[s].rate_limit;
        if rate_limit == 0 {
            return Selection::Ready { service_index: s };
        }
        let elapsed = now.wrapping_sub(last_transmitted[s]);
        if elapsed >= rate_limit {
            return Selection::Ready { service_index: s };
        }
        let remaining = rate_limit - elapsed;
        lifted_in = Some(match lifted_in {
            None => remaining,
            Some(m) => m.min(remaining),
        });
    }

    Selection::NotReady {
        lifted_in: lifted_in.unwrap_or(0),
    }
}
