//! Fault-injection suite exercising retry, skip-arithmetic and
//! duplicate-confirm logic end-to-end against a mock transport, without a
//! real serial port.

use maple_core::{DeviceOps, MapleError, ProxyTransport};

/// A byte pattern that debittify() decodes to one recovered byte (`0xFF`)
/// with `idle_observed = true`: two complete alternating-edge bytes of
/// `0xA5` followed by two all-high idle bytes.
fn canonical_capture() -> Vec<u8> {
    vec![0xA5, 0xA5, 0xA5, 0xA5, 0xFF, 0xFF]
}

/// A garbled capture: the prelude never ends, so it decodes to an empty,
/// non-idle result — the shape a noisy bit-recovery round actually produces.
fn garbled_capture() -> Vec<u8> {
    vec![0xFF, 0xFF, 0xFF]
}

/// A mock [`ProxyTransport`] that serves `garbled_capture()` for its first
/// `corrupt_calls` round-trips, then `canonical_capture()` forever after —
/// simulating a transient run of bit-recovery noise that clears up, which
/// the retry/duplicate-confirm logic must tolerate without inventing data.
struct ChaoticMockTransport {
    corrupt_calls: u32,
    calls: u32,
}

impl ChaoticMockTransport {
    fn new(corrupt_calls: u32) -> Self {
        Self { corrupt_calls, calls: 0 }
    }
}

impl ProxyTransport for ChaoticMockTransport {
    fn round_trip(&mut self, _frame: &[u8], _recv_skip: u16) -> std::io::Result<Vec<u8>> {
        self.calls += 1;
        if self.calls <= self.corrupt_calls {
            Ok(garbled_capture())
        } else {
            Ok(canonical_capture())
        }
    }
}

#[test]
fn retries_absorb_transient_corruption_without_inventing_data() {
    // Four garbled round-trips (two full non-idle outer rounds under
    // duplicate-confirm) before the capture clears up; the transaction must
    // still complete successfully once it does.
    let mut transport = ChaoticMockTransport::new(4);
    let mut ops = DeviceOps::new(&mut transport);
    let result = ops.device_info(0x20);
    assert!(result.is_ok());
    assert!(result.expect("completes once corruption clears"));
}

#[test]
fn zero_corruption_completes_in_minimum_round_trips() {
    let mut transport = ChaoticMockTransport::new(0);
    let mut ops = DeviceOps::new(&mut transport);
    assert!(ops.device_info(0x20).expect("clean capture"));
    // Duplicate-confirm should accept after exactly two identical reads.
    assert_eq!(transport.calls, 2);
}

#[test]
fn always_short_response_is_reported_without_panicking() {
    struct AlwaysShort;
    impl ProxyTransport for AlwaysShort {
        fn round_trip(&mut self, _frame: &[u8], _recv_skip: u16) -> std::io::Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    let mut transport = AlwaysShort;
    let mut ops = DeviceOps::new(&mut transport);
    assert!(!ops.device_info(0x20).expect("short response is Ok(empty), not an error"));
}

#[test]
fn io_failure_propagates_as_maple_error_io() {
    struct FailingTransport;
    impl ProxyTransport for FailingTransport {
        fn round_trip(&mut self, _frame: &[u8], _recv_skip: u16) -> std::io::Result<Vec<u8>> {
            Err(std::io::Error::other("serial link dropped"))
        }
    }

    let mut transport = FailingTransport;
    let mut ops = DeviceOps::new(&mut transport);
    let err = ops.device_info(0x20).unwrap_err();
    assert!(matches!(err, MapleError::Io(_)));
}
