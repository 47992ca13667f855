//! Retry/alignment transaction controller and typed device operations.
//!
//! Generic over [`ProxyTransport`], the Sans-IO seam separating this crate's
//! protocol logic from any concrete transport. `maple-transport` backs it
//! with a real serial port; tests back it with an in-memory double.

mod device;
mod error;
mod transactor;
mod transport_trait;

pub use device::{
    DeviceOps, FLASH_BLOCK_LEN, FLASH_CHUNK_LEN, FLASH_PHASES_PER_BLOCK, LCD_BITMAP_LEN,
};
pub use error::{MapleError, Result};
pub use transactor::Transactor;
pub use transport_trait::ProxyTransport;
