//! "Are-you-there" handshake performed once at connect time.

use std::{thread, time::Duration};

use tracing::{info, warn};

use crate::{errors::TransportError, serial_link::SerialLink};

/// Are-you-there probe sent to the proxy.
const PROBE: [u8; 3] = [0x00, 0x00, 0x00];

/// Reply byte that confirms a proxy is listening.
const ACK: u8 = 0x01;

/// Delay between probe attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Total time budget across all probe attempts before giving up.
const TOTAL_BUDGET: Duration = Duration::from_secs(5);

/// Probes `link` for a maple proxy, retrying every 500 ms up to a 5 s total
/// budget.
///
/// # Errors
///
/// Returns [`TransportError::HandshakeTimeout`] if no `0x01` reply is
/// observed within the budget, or [`TransportError::Io`] on a write/read
/// failure.
pub fn perform(link: &mut SerialLink) -> Result<(), TransportError> {
    let mut elapsed = Duration::ZERO;

    while elapsed < TOTAL_BUDGET {
        link.write_all(&PROBE)?;
        if link.try_read_one()? == Some(ACK) {
            info!("maple proxy detected");
            return Ok(());
        }
        thread::sleep(RETRY_DELAY);
        elapsed += RETRY_DELAY;
    }

    warn!(?elapsed, "proxy handshake timed out");
    Err(TransportError::HandshakeTimeout(elapsed))
}
