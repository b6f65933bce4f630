//! Two services sharing one wire: a fast, rate-limited telemetry stream and
//! a slower diagnostics channel that reassembles multi-frame datagrams.
//! Modeled on the teacher's `examples/transport.rs`, which runs its `Uart`
//! over a pair of channels and logs with `log`/`env_logger` instead of
//! `println!`.

use log::{debug, info};
use prlsc::{default_checksum, Config, Datagram, Engine, Hooks, ResponseCode, ServiceConfig};

const TELEMETRY: u8 = 0;
const DIAGNOSTICS: u8 = 1;
const DATAGRAM_BUF: usize = 65;

struct Board {
    time: u32,
    wire: Vec<u8>,
}

impl Hooks<DATAGRAM_BUF> for Board {
    fn get_time(&self) -> u32 {
        self.time
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        default_checksum(data)
    }

    fn send_byte(&mut self, byte: u8) {
        self.wire.push(byte);
    }

    fn on_datagram(&mut self, datagram: &Datagram<DATAGRAM_BUF>) -> ResponseCode {
        let who = if datagram.service_index == TELEMETRY {
            "telemetry"
        } else {
            "diagnostics"
        };
        info!(target: who, "received {:?}", datagram.data());
        ResponseCode::Positive
    }
}

fn pump_and_deliver<const N: usize, const FRAME_BUF: usize, const TX_BUF: usize>(
    engine: &mut Engine<N, FRAME_BUF, DATAGRAM_BUF, TX_BUF>,
    cfg: &Config<N>,
    host: &mut Board,
) {
    loop {
        let (ready, lifted_in) = engine.prepare_service_transmission(cfg, host);
        if !ready {
            debug!("nothing eligible yet (lifted in {} ticks)", lifted_in);
            break;
        }
        while engine.tx_byte(cfg, host) {}
    }
    let wire = std::mem::take(&mut host.wire);
    for byte in wire {
        engine.receive_byte(byte, cfg, host);
    }
}

fn main() {
    env_logger::init();

    let cfg: Config<2> = Config::new(
        0xC0,
        0xDB,
        0xDC,
        0xDD,
        8,
        64,
        [
            ServiceConfig::new(true, 50, true),
            ServiceConfig::new(false, 0, false),
        ],
        11,
        65,
    )
    .expect("valid configuration");

    let mut engine: Engine<2, 11, DATAGRAM_BUF, 512> = Engine::new(&cfg);
    let mut host = Board { time: 0, wire: Vec::new() };

    engine.transmit_datagram(TELEMETRY, 0, &[0x01, 0x02], &cfg, &host);
    engine.transmit_datagram(DIAGNOSTICS, 0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], &cfg, &host);
    pump_and_deliver(&mut engine, &cfg, &mut host);

    // The telemetry service is rate-limited to one frame per 50 ticks; a
    // second send before that elapses is dropped by `only_tx_latest` once a
    // third send arrives.
    host.time = 10;
    engine.transmit_datagram(TELEMETRY, 0, &[0x03, 0x04], &cfg, &host);
    engine.transmit_datagram(TELEMETRY, 0, &[0x05, 0x06], &cfg, &host);
    pump_and_deliver(&mut engine, &cfg, &mut host);

    host.time = 60;
    pump_and_deliver(&mut engine, &cfg, &mut host);

    println!("frames received: {}", engine.frames_received());
}
