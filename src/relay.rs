//! OSC message relay for remote control.
//!
//! A nonblocking UDP socket is drained by a background thread into an mpsc
//! channel; the control loop calls [`Relay::poll`] once per frame and gets
//! back at most one pending event, never blocking. Wire compatibility with
//! other OSC tools is not a goal; the address set here is the whole
//! contract.
//!
//! Addresses:
//! - `/ping` — trigger a ping voice
//! - `/control <x> <y> [rate]` — gesture input for the feedback graph
//! - `/gain <name> <db>` — set a named gain

use rosc::{OscPacket, OscType};
use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How recently a message must have arrived for the relay to count as live.
const LIVE_WINDOW: Duration = Duration::from_secs(2);

/// One inbound remote-control event.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Ping,
    Control { x: f32, y: f32, rate: f32 },
    Gain { name: String, db: f32 },
}

pub struct Relay {
    receiver: Receiver<RelayEvent>,
    running: Arc<Mutex<bool>>,
    last_seen: Arc<Mutex<Option<Instant>>>,
    address: SocketAddr,
}

impl Relay {
    /// Bind the relay on `port` (0 picks an ephemeral port) and start the
    /// receive thread.
    pub fn new(port: u16) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        socket.set_nonblocking(true)?;
        let address = socket.local_addr()?;
        info!("relay listening on {}", address);

        let (sender, receiver) = channel();
        let running = Arc::new(Mutex::new(true));
        let last_seen = Arc::new(Mutex::new(None));

        {
            let running = running.clone();
            let last_seen = last_seen.clone();
            thread::spawn(move || receive_loop(socket, sender, running, last_seen));
        }

        Ok(Self {
            receiver,
            running,
            last_seen,
            address,
        })
    }

    /// At most one pending event; never blocks.
    pub fn poll(&self) -> Option<RelayEvent> {
        self.receiver.try_recv().ok()
    }

    /// True if a message arrived within the last two seconds.
    pub fn live(&self) -> bool {
        self.last_seen
            .lock()
            .unwrap()
            .map(|t| t.elapsed() < LIVE_WINDOW)
            .unwrap_or(false)
    }

    /// The bound socket address, for dashboard display.
    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        *self.running.lock().unwrap() = false;
    }
}

fn receive_loop(
    socket: UdpSocket,
    sender: Sender<RelayEvent>,
    running: Arc<Mutex<bool>>,
    last_seen: Arc<Mutex<Option<Instant>>>,
) {
    let mut buf = [0u8; 1024];
    while *running.lock().unwrap() {
        match socket.recv_from(&mut buf) {
            Ok((size, _addr)) => {
                *last_seen.lock().unwrap() = Some(Instant::now());
                match rosc::decoder::decode_udp(&buf[..size]) {
                    Ok((_, packet)) => {
                        if let Some(event) = parse_packet(packet) {
                            let _ = sender.send(event);
                        }
                    }
                    Err(e) => warn!("relay: undecodable packet: {}", e),
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                warn!("relay socket error: {}", e);
                break;
            }
        }
    }
}

fn parse_packet(packet: OscPacket) -> Option<RelayEvent> {
    match packet {
        OscPacket::Message(msg) => parse_message(msg.addr.as_str(), &msg.args),
        OscPacket::Bundle(bundle) => bundle.content.into_iter().find_map(parse_packet),
    }
}

fn parse_message(addr: &str, args: &[OscType]) -> Option<RelayEvent> {
    match addr {
        "/ping" => Some(RelayEvent::Ping),
        "/control" => {
            let x = number(args.first()?)?;
            let y = number(args.get(1)?)?;
            let rate = args.get(2).and_then(number).unwrap_or(0.0);
            Some(RelayEvent::Control { x, y, rate })
        }
        "/gain" => {
            if let (Some(OscType::String(name)), Some(db)) =
                (args.first(), args.get(1).and_then(number))
            {
                return Some(RelayEvent::Gain {
                    name: name.clone(),
                    db,
                });
            }
            None
        }
        _ => None,
    }
}

/// Accept any numeric OSC argument as f32; senders are sloppy about types.
fn number(arg: &OscType) -> Option<f32> {
    match arg {
        OscType::Float(f) => Some(*f),
        OscType::Double(d) => Some(*d as f32),
        OscType::Int(i) => Some(*i as f32),
        _ => None,
    }
}
