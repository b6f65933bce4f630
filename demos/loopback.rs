//! Minimal loopback demo: one stream service, wired straight back to its own
//! receiver, modeled on the teacher's `examples/no_transport.rs`.

use log::info;
use prlsc::{default_checksum, Config, Datagram, Engine, Hooks, ResponseCode, ServiceConfig};

const DATAGRAM_BUF: usize = 65;

struct Loopback {
    time: u32,
    wire: Vec<u8>,
}

impl Hooks<DATAGRAM_BUF> for Loopback {
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
        info!(
            "service {} sub {}: {:?}",
            datagram.service_index,
            datagram.sub_service_index,
            datagram.data()
        );
        ResponseCode::Positive
    }
}

fn main() {
    env_logger::init();

    let cfg: Config<1> = Config::new(
        0xC0,
        0xDB,
        0xDC,
        0xDD,
        64,
        64,
        [ServiceConfig::new(true, 0, false)],
        67,
        65,
    )
    .expect("valid configuration");

    let mut engine: Engine<1, 67, DATAGRAM_BUF, 256> = Engine::new(&cfg);
    let mut host = Loopback {
        time: 0,
        wire: Vec::new(),
    };

    let data = [0xC0, 0x01, 0x02, 0xDB, 0x03];
    let frames = engine.transmit_datagram(0, 7, &data, &cfg, &host);
    println!("queued {} frame(s)", frames);

    loop {
        let (ready, _) = engine.prepare_service_transmission(&cfg, &host);
        if !ready {
            break;
        }
        while engine.tx_byte(&cfg, &mut host) {}
    }

    let wire = std::mem::take(&mut host.wire);
    print!("on the wire:");
    for byte in &wire {
        print!(" {:02x}", byte);
    }
    println!();

    for byte in wire {
        engine.receive_byte(byte, &cfg, &mut host);
    }
}
