//! Unit tests for the free-port prober.
//!
//! These bind real loopback sockets, so they are serialized to keep the
//! probed ranges stable.

use std::net::{Ipv4Addr, TcpListener};

use serial_test::serial;

use devserve::session::prober::{find_free_port, probe, DEFAULT_PORT_RANGE_SIZE};
use devserve::AppError;

/// Find a base port with three consecutive free ports, high enough to stay
/// clear of common dev-server ranges.
fn three_free_ports() -> u16 {
    (48300..48900)
        .find(|&p| probe(p) && probe(p + 1) && probe(p + 2))
        .expect("no three consecutive free ports in test range")
}

fn occupy(port: u16) -> TcpListener {
    TcpListener::bind((Ipv4Addr::LOCALHOST, port)).expect("occupy port")
}

#[test]
#[serial]
fn returns_bindable_port_in_range() {
    let base = three_free_ports();
    let port = find_free_port(base, DEFAULT_PORT_RANGE_SIZE).expect("range has free ports");
    assert!(port >= base);
    assert!(u32::from(port) < u32::from(base) + u32::from(DEFAULT_PORT_RANGE_SIZE));

    // The returned port must be bindable immediately after return.
    let listener = occupy(port);
    drop(listener);
}

#[test]
#[serial]
fn skips_occupied_ports_in_ascending_order() {
    let base = three_free_ports();
    let _first = occupy(base);
    let _second = occupy(base + 1);

    let port = find_free_port(base, 3).expect("third candidate is free");
    assert_eq!(port, base + 2);
}

#[test]
#[serial]
fn exhausted_range_reports_no_port_available() {
    let base = three_free_ports();
    let _first = occupy(base);
    let _second = occupy(base + 1);
    let _third = occupy(base + 2);

    let err = find_free_port(base, 3).expect_err("all candidates occupied");
    match err {
        AppError::NoPortAvailable { start, count } => {
            assert_eq!(start, base);
            assert_eq!(count, 3);
        }
        other => panic!("expected NoPortAvailable, got {other:?}"),
    }
}

#[test]
fn empty_range_reports_no_port_available() {
    let err = find_free_port(48300, 0).expect_err("zero candidates");
    assert!(matches!(err, AppError::NoPortAvailable { count: 0, .. }));
}

#[test]
#[serial]
fn range_saturates_at_max_port_without_wrapping() {
    // Only one real candidate exists; the probe must not wrap to port 0.
    let result = find_free_port(u16::MAX, 10);
    if let Ok(port) = result {
        assert_eq!(port, u16::MAX);
    }
}

#[test]
#[serial]
fn probe_reflects_current_availability() {
    let base = three_free_ports();
    assert!(probe(base));
    let _listener = occupy(base);
    assert!(!probe(base));
}
