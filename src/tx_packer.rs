//! TX Datagram Packer: splits a host datagram into one or more frame
//! records and writes them into a service's TX ring.
//!
//! Generalizes the teacher's `on_wire_bytes` (`src/context.rs`, which
//! builds exactly one frame's bytes) into the multi-frame chunking and
//! short/empty-terminator rules diagnostics services need.

use crate::codec;
use crate::config::Config;
use crate::error::ErrorCode;
use crate::ring::CircularBuffer;

/// Worst-case record size: 1 service-code byte + 1 length byte + up to 255
/// data bytes + 1 checksum byte. A plain stack constant, not tied to any
/// const generic, since `frame_length_max` is a runtime-checked `u8`.
const MAX_RECORD_BODY: usize = 2 + 255 + 1;

pub enum PackOutcome {
    Enqueued { frames: u32 },
    /// A named precondition failed; `state.error_code` should be set to this.
    Error(ErrorCode),
    /// Not enough room in the ring right now. There is no dedicated error
    /// code for this case — the zero return value *is* the signal, and
    /// `error_code` is left untouched.
    BufferFull,
}

/// Packs one datagram for `service_index` into `buffer`.
pub fn pack_datagram<const N: usize, const TX_BUF: usize, const DATAGRAM_BUF: usize>(
    service_index: u8,
    sub_service_index: u8,
    data: &[u8],
    cfg: &Config<N>,
    checksum_fn: impl Fn(&[u8]) -> u8,
    buffer: &mut CircularBuffer<TX_BUF>,
) -> PackOutcome {
    if service_index as usize >= cfg.service_count() {
        return PackOutcome::Error(ErrorCode::DatagramServiceIndexBounds);
    }
    let service_cfg = cfg.services[service_index as usize];
    let length = data.len();

    if service_cfg.stream {
        // A stream datagram is exactly one frame, so it is bounded by
        // whichever of `frame_length_max`/`datagram_length_max` is
        // smaller — `frame_length_max` because it can never span more than
        // one frame, `datagram_length_max` because it is still a datagram
        // length precondition like any other service.
        let max_len = (cfg.frame_length_max as usize).min(cfg.datagram_length_max as usize);
        if length > max_len {
            return PackOutcome::Error(ErrorCode::DatagramTooLong);
        }
        return write_chunks(
            service_index,
            sub_service_index,
            ChunkSource::Single(data),
            cfg,
            &checksum_fn,
            buffer,
            service_cfg.only_tx_latest,
        );
    }

    if length > cfg.datagram_length_max as usize {
        return PackOutcome::Error(ErrorCode::DatagramTooLong);
    }

    // DATAGRAM_BUF is guaranteed by Config::new to hold `length + 1`.
    let mut payload = [0u8; DATAGRAM_BUF];
    payload[..length].copy_from_slice(data);
    payload[length] = checksum_fn(data);
    let payload_len = length + 1;

    write_chunks(
        service_index,
        sub_service_index,
        ChunkSource::Split {
            payload: &payload[..payload_len],
        },
        cfg,
        &checksum_fn,
        buffer,
        false,
    )
}

enum ChunkSource<'a> {
    /// Stream services: exactly one frame, never chunked.
    Single(&'a [u8]),
    /// Diagnostics services: split into `frame_length_max`-sized chunks,
    /// with a trailing empty chunk if the payload is an exact multiple.
    Split { payload: &'a [u8] },
}

fn write_chunks<const N: usize, const TX_BUF: usize>(
    service_index: u8,
    sub_service_index: u8,
    source: ChunkSource,
    cfg: &Config<N>,
    checksum_fn: &impl Fn(&[u8]) -> u8,
    buffer: &mut CircularBuffer<TX_BUF>,
    only_tx_latest: bool,
) -> PackOutcome {
    let frame_max = cfg.frame_length_max as usize;
    let service_code = codec::service_code(service_index, sub_service_index);

    // Compute total bytes needed up front so the reservation is atomic
    // across every chunk: a record is either fully written or not at all.
    let mut total = 0usize;
    let mut chunk_count = 0u32;
    match &source {
        ChunkSource::Single(data) => {
            total += 4 + data.len();
            chunk_count = 1;
        }
        ChunkSource::Split { payload } => {
            let mut remaining = payload.len();
            loop {
                let this_chunk = remaining.min(frame_max);
                total += 4 + this_chunk;
                chunk_count += 1;
                remaining -= this_chunk;
                if remaining == 0 {
                    if this_chunk == frame_max {
                        // exact multiple: one more, empty, chunk terminates.
                        total += 4;
                        chunk_count += 1;
                    }
                    break;
                }
            }
        }
    }

    if only_tx_latest && !buffer.is_empty() {
        buffer.discard_queued();
    }
    if total > buffer.free_space() {
        return PackOutcome::BufferFull;
    }

    let mut record = [0u8; MAX_RECORD_BODY];
    let mut push_one = |chunk: &[u8]| {
        record[0] = service_code;
        record[1] = chunk.len() as u8;
        record[2..2 + chunk.len()].copy_from_slice(chunk);
        let checksum = checksum_fn(&record[..2 + chunk.len()]);
        record[2 + chunk.len()] = checksum;
        buffer.try_push_record(cfg.start_frame, &record[..3 + chunk.len()])
    };

    match source {
        ChunkSource::Single(data) => {
            push_one(data);
        }
        ChunkSource::Split { payload } => {
            let mut offset = 0;
            loop {
                let remaining = payload.len() - offset;
                let this_chunk = remaining.min(frame_max);
                push_one(&payload[offset..offset + this_chunk]);
                offset += this_chunk;
                if remaining == this_chunk {
                    if this_chunk == frame_max {
                        push_one(&[]);
                    }
                    break;
                }
            }
        }
    }

    PackOutcome::Enqueued {
        frames: chunk_count,
    }
}
