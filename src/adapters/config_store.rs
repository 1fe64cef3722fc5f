//! Persistent [`LockConfig`] block inside the credential EEPROM.
//!
//! Implements [`ConfigPort`] over any [`ByteStore`].  The block lives in
//! the reserved region at the bottom of the chip:
//!
//! ```text
//!  0x0000  MAGIC (0xC5)
//!  0x0001  LEN   (payload bytes)
//!  0x0002  postcard payload ...
//! ```
//!
//! # Security
//!
//! - Config validation: every field is range-checked on load and before
//!   persistence, so a tampered block cannot disable the alarm.
//! - Torn writes: the magic byte is cleared first and written last, so a
//!   reset mid-save falls back to defaults instead of a half-written block.

use log::{info, warn};

use crate::app::ports::{ByteStore, ConfigError, ConfigPort};
use crate::config::{CONFIG_REGION_LEN, CONFIG_REGION_START, LockConfig};

/// Marks a written config block.
pub const CONFIG_MAGIC: u8 = 0xC5;

const HEADER_LEN: u16 = 2;
const MAX_PAYLOAD: usize = (CONFIG_REGION_LEN - HEADER_LEN) as usize;

pub struct ConfigStore<'a, S> {
    store: &'a mut S,
}

impl<'a, S: ByteStore> ConfigStore<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Invalidate the stored block; the next load yields defaults.
    pub fn erase(&mut self) -> Result<(), ConfigError> {
        self.store.write_byte(CONFIG_REGION_START, 0xFF)?;
        Ok(())
    }
}

impl<S: ByteStore> ConfigPort for ConfigStore<'_, S> {
    fn load(&mut self) -> Result<LockConfig, ConfigError> {
        if self.store.read_byte(CONFIG_REGION_START)? != CONFIG_MAGIC {
            info!("ConfigStore: no stored config, using defaults");
            return Ok(LockConfig::default());
        }

        let len = usize::from(self.store.read_byte(CONFIG_REGION_START + 1)?);
        if len == 0 || len > MAX_PAYLOAD {
            warn!("ConfigStore: bad payload length {}", len);
            return Err(ConfigError::Corrupted);
        }

        let mut buf = [0u8; MAX_PAYLOAD];
        for (addr, slot) in (CONFIG_REGION_START + HEADER_LEN..).zip(buf[..len].iter_mut()) {
            *slot = self.store.read_byte(addr)?;
        }

        let cfg: LockConfig =
            postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("ConfigStore: loaded config ({} bytes)", len);
        Ok(cfg)
    }

    fn save(&mut self, config: &LockConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let mut buf = [0u8; MAX_PAYLOAD];
        let payload = postcard::to_slice(config, &mut buf).map_err(|_| {
            ConfigError::ValidationFailed("config does not fit the reserved region")
        })?;

        self.store.write_byte(CONFIG_REGION_START, 0xFF)?;
        for (addr, &byte) in (CONFIG_REGION_START + HEADER_LEN..).zip(payload.iter()) {
            self.store.write_byte(addr, byte)?;
        }
        self.store
            .write_byte(CONFIG_REGION_START + 1, payload.len() as u8)?;
        self.store.write_byte(CONFIG_REGION_START, CONFIG_MAGIC)?;

        info!("ConfigStore: saved config ({} bytes)", payload.len());
        Ok(())
    }
}
