//! Retry/alignment controller driving one logical Maple transaction.

use maple_decoder::debittify;
use maple_proto::encode_request;
use tracing::{debug, warn};

use crate::{
    error::{MapleError, Result},
    transport_trait::ProxyTransport,
};

/// Sample-slot divisor used to turn accumulated useful samples into the
/// proxy-facing `recv_skip` count.
const SKIP_LOOP_LENGTH: usize = 2;

/// Drives one logical Maple transaction against a [`ProxyTransport`].
///
/// Owns no state across calls to [`Transactor::transact`]; each call is a
/// fresh transaction. Generic over the transport so tests can exercise the
/// full retry/skip/duplicate-confirm logic without a real serial port.
pub struct Transactor<'t, T: ProxyTransport> {
    transport: &'t mut T,
}

impl<'t, T: ProxyTransport> Transactor<'t, T> {
    /// Build a transactor over a borrowed transport.
    pub fn new(transport: &'t mut T) -> Self {
        Self { transport }
    }

    /// Run one transaction: encode `(cmd, recipient, payload)`, send it to
    /// the proxy, and loop decoding/retrying until idle is observed (or a
    /// single round-trip, when `allow_repeats` is `false`).
    ///
    /// A zero-length proxy response ends the transaction immediately and is
    /// not an error: this returns `Ok` with whatever was accumulated so far,
    /// which is an empty `Vec` if no round-trip had produced bytes yet.
    ///
    /// # Errors
    ///
    /// Returns [`MapleError::Protocol`] if the request cannot be encoded, or
    /// [`MapleError::Io`] if the transport fails.
    pub fn transact(
        &mut self,
        cmd: u8,
        recipient: u8,
        payload: &[u8],
        allow_repeats: bool,
    ) -> Result<Vec<u8>> {
        let frame = encode_request(cmd, recipient, payload)?;
        let num_tries = if allow_repeats { 3 } else { 1 };

        let mut accumulated = Vec::new();
        let mut samples_so_far: usize = 0;

        loop {
            #[allow(clippy::cast_possible_truncation)]
            let recv_skip = (samples_so_far / SKIP_LOOP_LENGTH) as u16;

            // A zero-length proxy response aborts the transaction. This is
            // not an exception, so whatever was accumulated so far (possibly
            // nothing) is returned as-is.
            let decoded = match self.attempt_round(&frame, recv_skip, num_tries)? {
                Some(decoded) => decoded,
                None => return Ok(accumulated),
            };

            debug!(
                frame_len = frame.len(),
                recv_skip,
                bytes_received = decoded.bytes.len(),
                "proxy round-trip"
            );

            accumulated.extend_from_slice(&decoded.bytes);

            if !allow_repeats || decoded.idle_observed {
                return Ok(accumulated);
            }

            samples_so_far += decoded.useful_sample_count;
        }
    }

    /// Run up to `num_tries` retransmissions of the same frame, accepting
    /// early if two consecutive decodes are byte-identical. Returns `None`
    /// if the proxy reports a zero-length response.
    fn attempt_round(
        &mut self,
        frame: &[u8],
        recv_skip: u16,
        num_tries: u32,
    ) -> Result<Option<maple_decoder::DecodedRx>> {
        let mut last: Option<maple_decoder::DecodedRx> = None;

        for attempt in 0..num_tries {
            let raw = self.transport.round_trip(frame, recv_skip)?;
            if raw.is_empty() {
                return Ok(None);
            }

            let decoded = debittify(&raw);

            if let Some(prev) = &last {
                if prev.bytes == decoded.bytes {
                    warn!(attempt, "duplicate-confirm short-circuit");
                    return Ok(Some(decoded));
                }
            }

            if attempt + 1 == num_tries && attempt > 0 {
                warn!(attempt, "retry budget exhausted, accepting last decode");
            }

            last = Some(decoded);
        }

        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use maple_decoder::debittify;

    use super::*;

    /// Replays a fixed sequence of raw responses, one per call to
    /// [`ProxyTransport::round_trip`], recording the `recv_skip` it was
    /// asked for.
    struct ScriptedTransport {
        responses: VecDeque<Vec<u8>>,
        recv_skips_seen: Vec<u16>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            Self { responses: responses.into(), recv_skips_seen: Vec::new() }
        }
    }

    impl ProxyTransport for ScriptedTransport {
        fn round_trip(&mut self, _frame: &[u8], recv_skip: u16) -> std::io::Result<Vec<u8>> {
            self.recv_skips_seen.push(recv_skip);
            Ok(self.responses.pop_front().unwrap_or_default())
        }
    }

    /// A byte pattern that debittify() decodes to idle-observed = true with
    /// no garbage prefix: a 0x00 byte to leave the prelude, then enough
    /// 0xFF bytes to trip the idle-completion threshold.
    fn idle_capture() -> Vec<u8> {
        vec![0x00, 0xFF, 0xFF]
    }

    #[test]
    fn single_round_trip_without_repeats() {
        let mut transport = ScriptedTransport::new(vec![idle_capture()]);
        let mut transactor = Transactor::new(&mut transport);
        let result = transactor.transact(0x01, 0x20, &[], false).expect("one round-trip");
        assert_eq!(result, debittify(&idle_capture()).bytes);
    }

    #[test]
    fn short_response_is_not_an_error_but_returns_empty() {
        let mut transport = ScriptedTransport::new(vec![Vec::new()]);
        let mut transactor = Transactor::new(&mut transport);
        let result = transactor.transact(0x01, 0x20, &[], false).expect("short response is Ok");
        assert!(result.is_empty());
    }

    #[test]
    fn loops_until_idle_is_observed_under_allow_repeats() {
        // Each outer round needs two identical decodes to accept early via
        // duplicate-confirm: round 1 is non-idle, round 2 is idle.
        let non_idle = vec![0x00, 0x00];
        let mut transport = ScriptedTransport::new(vec![
            non_idle.clone(),
            non_idle.clone(),
            idle_capture(),
            idle_capture(),
        ]);
        let mut transactor = Transactor::new(&mut transport);
        let result = transactor.transact(0x09, 0x20, &[], true).expect("two outer rounds");

        let mut expected = debittify(&non_idle).bytes;
        expected.extend(debittify(&idle_capture()).bytes);
        assert_eq!(result, expected);
    }

    #[test]
    fn recv_skip_advances_by_useful_sample_count_over_skip_loop_length() {
        let non_idle = vec![0x00, 0x00]; // decode this to learn its useful_sample_count
        let useful = debittify(&non_idle).useful_sample_count;

        let mut transport = ScriptedTransport::new(vec![
            non_idle.clone(),
            non_idle.clone(),
            idle_capture(),
            idle_capture(),
        ]);
        let mut transactor = Transactor::new(&mut transport);
        transactor.transact(0x09, 0x20, &[], true).expect("two outer rounds");

        // Both attempts within round 1 request the same skip; round 2's
        // attempts request the advanced skip.
        let distinct: Vec<u16> =
            transport.recv_skips_seen.iter().copied().fold(Vec::new(), |mut acc, skip| {
                if acc.last() != Some(&skip) {
                    acc.push(skip);
                }
                acc
            });

        assert_eq!(distinct[0], 0);
        #[allow(clippy::cast_possible_truncation)]
        let expected_second_skip = (useful / SKIP_LOOP_LENGTH) as u16;
        assert_eq!(distinct[1], expected_second_skip);
    }

    #[test]
    fn duplicate_confirm_stops_before_retry_budget_is_exhausted() {
        struct CountingTransport {
            response: Vec<u8>,
            calls: u32,
        }
        impl ProxyTransport for CountingTransport {
            fn round_trip(&mut self, _frame: &[u8], _recv_skip: u16) -> std::io::Result<Vec<u8>> {
                self.calls += 1;
                Ok(self.response.clone())
            }
        }

        let mut transport = CountingTransport { response: idle_capture(), calls: 0 };
        let mut transactor = Transactor::new(&mut transport);
        transactor.transact(0x01, 0x20, &[], true).expect("idle on first identical pair");

        // Two identical decodes in a row is enough to accept; never reaches
        // the 3-attempt budget.
        assert_eq!(transport.calls, 2);
    }
}
