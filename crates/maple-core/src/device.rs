//! Typed device operations layered over [`Transactor`].
//!
//! Each operation pairs a payload builder with a response interpreter, the
//! typed-operation redesign called for over the source's loose
//! catch-all transact path.

use maple_proto::{
    decode_header, parse_controller_cond, parse_device_info, parse_mem_info, word_swap, Address,
    Command, ControllerCondition, DeviceInfo, MemInfo, FN_CONTROLLER, FN_LCD, FN_MEMORY_CARD,
};
use tracing::info;

use crate::{
    error::{MapleError, Result},
    transport_trait::ProxyTransport,
    transactor::Transactor,
};

/// Size in bytes of a VMU LCD bitmap payload.
pub const LCD_BITMAP_LEN: usize = 192;

/// Size in bytes of one flash block.
pub const FLASH_BLOCK_LEN: usize = 512;

/// Size in bytes of one flash write phase (a block is written in 4 of these).
pub const FLASH_CHUNK_LEN: usize = 128;

/// Number of 128-byte phases a 512-byte flash block is split into.
pub const FLASH_PHASES_PER_BLOCK: u32 = 4;

fn invariant(msg: impl Into<String>) -> MapleError {
    MapleError::InvariantViolation(msg.into())
}

/// High-level device operations, each a thin (build payload, interpret
/// response) pair over [`Transactor`].
pub struct DeviceOps<'t, T: ProxyTransport> {
    transactor: Transactor<'t, T>,
}

impl<'t, T: ProxyTransport> DeviceOps<'t, T> {
    /// Build device operations over a borrowed transport.
    pub fn new(transport: &'t mut T) -> Self {
        Self { transactor: Transactor::new(transport) }
    }

    /// Send `INFO` with an empty payload. Returns `true` iff the device
    /// responded with a non-empty payload.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn device_info(&mut self, addr: Address) -> Result<bool> {
        let response = self.transactor.transact(Command::Info.to_u8(), addr, &[], true)?;
        let present = !response.is_empty();
        info!(addr, present, "device_info");
        Ok(present)
    }

    /// Send `INFO` and parse the fixed device-information block from the
    /// response, if present.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn device_info_detail(&mut self, addr: Address) -> Result<Option<DeviceInfo>> {
        let response = self.transactor.transact(Command::Info.to_u8(), addr, &[], true)?;
        if response.len() < 4 {
            return Ok(None);
        }
        // The decoder's idle-tail drop already removes the trailing
        // checksum byte from a fully-idle-terminated response, so the
        // header is immediately followed by the payload. Unlike
        // `read_controller`/`get_mem_info`, the device-info payload is not
        // word-swapped as a whole: only its embedded ASCII fields are.
        Ok(Some(parse_device_info(&response[4..])?))
    }

    /// Send `GET_COND` with the given function-code mask.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn get_cond(&mut self, addr: Address, fn_code: u32) -> Result<Vec<u8>> {
        let payload = fn_code.to_le_bytes();
        self.transactor.transact(Command::GetCond.to_u8(), addr, &payload, false)
    }

    /// Send `GET_COND` for `FN_CONTROLLER` and parse the response.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn read_controller(&mut self, addr: Address) -> Result<ControllerCondition> {
        let response = self.get_cond(addr, FN_CONTROLLER)?;
        if response.len() < 4 {
            return Err(MapleError::ShortResponse);
        }
        let payload = word_swap(&response[4..])?;
        Ok(parse_controller_cond(&payload)?)
    }

    /// Send `WRITE` with an LCD bitmap. `bitmap` must be exactly
    /// [`LCD_BITMAP_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MapleError::InvariantViolation`] if `bitmap` is not exactly
    /// 192 bytes.
    pub fn write_lcd(&mut self, addr: Address, bitmap: &[u8]) -> Result<()> {
        if bitmap.len() != LCD_BITMAP_LEN {
            return Err(invariant(format!(
                "LCD bitmap must be {LCD_BITMAP_LEN} bytes, got {}",
                bitmap.len()
            )));
        }
        let mut payload = Vec::with_capacity(8 + LCD_BITMAP_LEN);
        payload.extend_from_slice(&FN_LCD.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(bitmap);
        self.transactor.transact(Command::Write.to_u8(), addr, &payload, false)?;
        Ok(())
    }

    /// Send `READ` for one flash phase and loop until a 512-byte `XFER_RESP`
    /// is received.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn read_flash(&mut self, addr: Address, block: u16, phase: u16) -> Result<[u8; 512]> {
        let arg = (u32::from(phase) << 16) | u32::from(block);
        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&FN_MEMORY_CARD.to_le_bytes());
        payload.extend_from_slice(&arg.to_le_bytes());

        // XFER_RESP echoes the FN_MEMORY_CARD/addr words (8 bytes) ahead of
        // the 512-byte data block itself.
        const ECHO_LEN: usize = 8;

        loop {
            let response = self.transactor.transact(Command::Read.to_u8(), addr, &payload, true)?;
            if response.len() < 4 {
                continue;
            }
            let header = decode_header(&response)?;
            let body = &response[4..];
            if header.cmd == Command::XferResp.to_u8() && body.len() == ECHO_LEN + FLASH_BLOCK_LEN
            {
                let data = word_swap(&body[ECHO_LEN..])?;
                let mut block = [0u8; FLASH_BLOCK_LEN];
                block.copy_from_slice(&data);
                return Ok(block);
            }
        }
    }

    /// Send `WRITE` for one 128-byte flash phase. `chunk` must be exactly
    /// [`FLASH_CHUNK_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MapleError::InvariantViolation`] if `chunk` is not exactly
    /// 128 bytes.
    pub fn write_flash(&mut self, addr: Address, block: u16, phase: u16, chunk: &[u8]) -> Result<()> {
        if chunk.len() != FLASH_CHUNK_LEN {
            return Err(invariant(format!(
                "flash write chunk must be {FLASH_CHUNK_LEN} bytes, got {}",
                chunk.len()
            )));
        }
        let arg = (u32::from(phase) << 16) | u32::from(block);
        let mut payload = Vec::with_capacity(8 + FLASH_CHUNK_LEN);
        payload.extend_from_slice(&FN_MEMORY_CARD.to_le_bytes());
        payload.extend_from_slice(&arg.to_le_bytes());
        payload.extend_from_slice(&word_swap(chunk)?);
        self.transactor.transact(Command::Write.to_u8(), addr, &payload, false)?;
        Ok(())
    }

    /// Send `WRITE_COMPLETE` for a flash block.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn write_flash_complete(&mut self, addr: Address, block: u16) -> Result<()> {
        let arg = (FLASH_PHASES_PER_BLOCK << 16) | u32::from(block);
        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&FN_MEMORY_CARD.to_le_bytes());
        payload.extend_from_slice(&arg.to_le_bytes());
        self.transactor.transact(Command::WriteComplete.to_u8(), addr, &payload, false)?;
        Ok(())
    }

    /// Send `GET_MEMINFO` and parse the memory-card layout.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn get_mem_info(&mut self, addr: Address) -> Result<MemInfo> {
        let response = self.transactor.transact(Command::GetMemInfo.to_u8(), addr, &[], true)?;
        if response.len() < 4 {
            return Err(MapleError::ShortResponse);
        }
        let payload = word_swap(&response[4..])?;
        Ok(parse_mem_info(&payload)?)
    }

    /// Send `RESET` with an empty payload.
    ///
    /// # Errors
    ///
    /// See [`MapleError`].
    pub fn reset(&mut self, addr: Address) -> Result<()> {
        self.transactor.transact(Command::Reset.to_u8(), addr, &[], false)?;
        Ok(())
    }

    /// Write a VMU filesystem image supplied as a block map (key = block
    /// index 0–255), in ascending key order, each split into 4 phases of
    /// 128 bytes via [`DeviceOps::write_flash`] followed by one
    /// [`DeviceOps::write_flash_complete`] per block.
    ///
    /// The caller is responsible for constructing the block map itself;
    /// this orchestration loop is the in-scope counterpart to that
    /// out-of-scope image construction.
    ///
    /// # Errors
    ///
    /// Returns [`MapleError::InvariantViolation`] if any block is not
    /// exactly [`FLASH_BLOCK_LEN`] bytes.
    pub fn write_vmu_image(
        &mut self,
        addr: Address,
        image: &std::collections::BTreeMap<u16, [u8; FLASH_BLOCK_LEN]>,
    ) -> Result<()> {
        for (&block, data) in image {
            for phase in 0..FLASH_PHASES_PER_BLOCK {
                #[allow(clippy::cast_possible_truncation)]
                let phase_u16 = phase as u16;
                let start = phase as usize * FLASH_CHUNK_LEN;
                let chunk = &data[start..start + FLASH_CHUNK_LEN];
                self.write_flash(addr, block, phase_u16, chunk)?;
            }
            self.write_flash_complete(addr, block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysEmptyTransport;
    impl ProxyTransport for AlwaysEmptyTransport {
        fn round_trip(&mut self, _frame: &[u8], _recv_skip: u16) -> std::io::Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn write_lcd_rejects_wrong_size_bitmap() {
        let mut transport = AlwaysEmptyTransport;
        let mut ops = DeviceOps::new(&mut transport);
        let err = ops.write_lcd(0x20, &[0u8; 10]).unwrap_err();
        assert!(matches!(err, MapleError::InvariantViolation(_)));
    }

    #[test]
    fn write_flash_rejects_wrong_size_chunk() {
        let mut transport = AlwaysEmptyTransport;
        let mut ops = DeviceOps::new(&mut transport);
        let err = ops.write_flash(0x20, 0, 0, &[0u8; 10]).unwrap_err();
        assert!(matches!(err, MapleError::InvariantViolation(_)));
    }

    #[test]
    fn device_info_is_false_on_empty_response() {
        let mut transport = AlwaysEmptyTransport;
        let mut ops = DeviceOps::new(&mut transport);
        assert!(!ops.device_info(0x20).expect("empty response is not an error"));
    }
}
