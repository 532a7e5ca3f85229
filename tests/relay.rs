//! Relay round trips over a real UDP socket.

use std::net::UdpSocket;
use std::thread;
use std::time::{Duration, Instant};

use rosc::{OscMessage, OscPacket, OscType};

use aeolus::relay::{Relay, RelayEvent};

fn send(relay: &Relay, addr: &str, args: Vec<OscType>) {
    let packet = OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    });
    let bytes = rosc::encoder::encode(&packet).unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .send_to(&bytes, ("127.0.0.1", relay.address().port()))
        .unwrap();
}

/// Poll until an event arrives or the deadline passes. The receive thread
/// sleeps between reads, so delivery is not immediate.
fn wait_for_event(relay: &Relay) -> Option<RelayEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(event) = relay.poll() {
            return Some(event);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn poll_is_nonblocking_and_empty_at_start() {
    let relay = Relay::new(0).unwrap();
    let start = Instant::now();
    assert_eq!(relay.poll(), None);
    assert!(start.elapsed() < Duration::from_millis(50));
    assert!(!relay.live());
}

#[test]
fn ping_round_trips() {
    let relay = Relay::new(0).unwrap();
    send(&relay, "/ping", vec![]);
    assert_eq!(wait_for_event(&relay), Some(RelayEvent::Ping));
    assert!(relay.live());
}

#[test]
fn control_and_gain_round_trip() {
    let relay = Relay::new(0).unwrap();

    send(
        &relay,
        "/control",
        vec![OscType::Float(0.25), OscType::Float(0.75), OscType::Float(2.0)],
    );
    assert_eq!(
        wait_for_event(&relay),
        Some(RelayEvent::Control {
            x: 0.25,
            y: 0.75,
            rate: 2.0
        })
    );

    send(
        &relay,
        "/gain",
        vec![OscType::String("master".to_string()), OscType::Float(-9.0)],
    );
    assert_eq!(
        wait_for_event(&relay),
        Some(RelayEvent::Gain {
            name: "master".to_string(),
            db: -9.0
        })
    );
}

#[test]
fn events_arrive_one_per_poll() {
    let relay = Relay::new(0).unwrap();
    send(&relay, "/ping", vec![]);
    send(&relay, "/ping", vec![]);

    assert_eq!(wait_for_event(&relay), Some(RelayEvent::Ping));
    assert_eq!(wait_for_event(&relay), Some(RelayEvent::Ping));
    assert_eq!(relay.poll(), None);
}

#[test]
fn unknown_addresses_produce_no_events() {
    let relay = Relay::new(0).unwrap();
    send(&relay, "/tempo", vec![OscType::Float(120.0)]);
    // The message still counts for liveness even though it parses to
    // nothing, so wait on that instead of an event.
    let deadline = Instant::now() + Duration::from_secs(2);
    while !relay.live() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(relay.live());
    assert_eq!(relay.poll(), None);
}
