//! # prlsc
//!
//! PRLSC is a byte-oriented serial framing and multi-service datagram
//! protocol engine for embedded controllers. One continuous byte stream
//! carries frames for up to 8 independently-configured services, each
//! either a "stream" service (one datagram per frame, no reassembly) or
//! a "diagnostics" service (a datagram may span several frames, and
//! carries its own trailing checksum byte).
//!
//! The engine owns no buffers it wasn't given sized const generics for
//! and performs no dynamic allocation; a host wires it to a real UART (or
//! a loopback, for tests) through the [`Hooks`] trait.
//!
//! ## Example
//! ```
//! use prlsc::{Config, Engine, Hooks, ResponseCode, ServiceConfig, Datagram, default_checksum};
//!
//! struct Loopback {
//!     time: u32,
//!     wire: Vec<u8>,
//! }
//!
//! impl Hooks<65> for Loopback {
//!     fn get_time(&self) -> u32 {
//!         self.time
//!     }
//!     fn checksum(&self, data: &[u8]) -> u8 {
//!         default_checksum(data)
//!     }
//!     fn send_byte(&mut self, byte: u8) {
//!         self.wire.push(byte);
//!     }
//!     fn on_datagram(&mut self, datagram: &Datagram<65>) -> ResponseCode {
//!         println!("service {} got {:?}", datagram.service_index, datagram.data());
//!         ResponseCode::Positive
//!     }
//! }
//!
//! let cfg: Config<1> = Config::new(
//!     0xC0, 0xDB, 0xDC, 0xDD,
//!     64, 64,
//!     [ServiceConfig::new(true, 0, false)],
//!     67, 65,
//! ).unwrap();
//!
//! let mut engine: Engine<1, 67, 65, 256> = Engine::new(&cfg);
//! let mut host = Loopback { time: 0, wire: Vec::new() };
//!
//! engine.transmit_datagram(0, 0, &[1, 2, 3], &cfg, &host);
//! while engine.prepare_service_transmission(&cfg, &host).0 {
//!     while engine.tx_byte(&cfg, &mut host) {}
//! }
//!
//! let wire = std::mem::take(&mut host.wire);
//! for byte in wire {
//!     engine.receive_byte(byte, &cfg, &mut host);
//! }
//! assert_eq!(engine.frames_received(), 1);
//! ```

mod checksum;
mod codec;
mod config;
mod engine;
mod error;
mod hooks;
mod ring;
mod rx_datagram;
mod rx_frame;
mod scheduler;
mod tx_packer;
mod tx_pump;

pub use checksum::default_checksum;
pub use config::{Config, ServiceConfig};
pub use engine::Engine;
pub use error::{ConfigError, ErrorCode, ResponseCode};
pub use hooks::Hooks;
pub use rx_datagram::Datagram;
pub use rx_frame::Frame;
