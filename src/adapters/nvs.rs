//! NVS-backed poll-URL store.
//!
//! Implements [`ConfigPort`] for the Gongbot device.  The persisted form
//! mirrors the board's original EEPROM layout: a fixed 256-byte region
//! whose first byte is the URL length (0–254), followed by that many raw
//! bytes.  Erased flash reads 0xFF, so a length byte of 255 doubles as
//! the "uninitialized" sentinel — a fresh device loads as unconfigured
//! rather than yielding garbage.
//!
//! The region is stored as a single NVS blob; ESP-IDF commits are atomic
//! per nvs_commit().  The simulation backend keeps the region in memory,
//! pre-filled with 0xFF like erased flash.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{validate_poll_url, MAX_URL_LEN};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &str = "gongbot";
#[cfg(target_os = "espidf")]
const REGION_KEY: &[u8] = b"urlcfg\0";

/// Size of the persisted region (one length byte + payload).
pub const REGION_SIZE: usize = 256;
/// Length-byte value meaning "never written" (erased flash).
pub const UNINIT_SENTINEL: u8 = 0xFF;

// ───────────────────────────────────────────────────────────────
// Region codec (pure, unit-testable)
// ───────────────────────────────────────────────────────────────

/// Encode a URL into a fresh region image.
pub fn encode_region(url: &str) -> [u8; REGION_SIZE] {
    let mut region = [UNINIT_SENTINEL; REGION_SIZE];
    let bytes = url.as_bytes();
    region[0] = bytes.len() as u8;
    region[1..=bytes.len()].copy_from_slice(bytes);
    region
}

/// Decode a region image.  `None` for the uninitialized sentinel, an
/// out-of-range length, or a non-UTF-8 payload.
pub fn decode_region(region: &[u8]) -> Option<&str> {
    let len = *region.first()? as usize;
    if len == usize::from(UNINIT_SENTINEL) || len == 0 || len > MAX_URL_LEN {
        return None;
    }
    let payload = region.get(1..=len)?;
    core::str::from_utf8(payload).ok()
}

// ───────────────────────────────────────────────────────────────
// Store
// ───────────────────────────────────────────────────────────────

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    region: std::cell::RefCell<[u8; REGION_SIZE]>,
}

impl NvsConfigStore {
    /// Create the store and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably.  On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsConfigStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsConfigStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            region: std::cell::RefCell::new([UNINIT_SENTINEL; REGION_SIZE]),
        })
    }

    /// Open the config namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CONFIG_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    fn read_region(&self) -> Result<[u8; REGION_SIZE], ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            Ok(*self.region.borrow())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let mut region = [UNINIT_SENTINEL; REGION_SIZE];
                let mut size = REGION_SIZE;
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        REGION_KEY.as_ptr() as *const _,
                        region.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    // Never written — keep the all-0xFF image.
                    return Ok(region);
                }
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(region)
            });
            result.map_err(|rc| {
                warn!("NVS: region read failed (rc={})", rc);
                ConfigError::IoError
            })
        }
    }

    fn write_region(&self, region: &[u8; REGION_SIZE]) -> Result<(), ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            *self.region.borrow_mut() = *region;
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        REGION_KEY.as_ptr() as *const _,
                        region.as_ptr() as *const _,
                        REGION_SIZE,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|rc| {
                warn!("NVS: region write failed (rc={})", rc);
                if rc == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    ConfigError::StorageFull
                } else {
                    ConfigError::IoError
                }
            })
        }
    }
}

impl ConfigPort for NvsConfigStore {
    fn load_poll_url(&self) -> Result<Option<heapless::String<MAX_URL_LEN>>, ConfigError> {
        let region = self.read_region()?;
        match decode_region(&region) {
            Some(url) => {
                let mut out = heapless::String::new();
                out.push_str(url).map_err(|_| ConfigError::IoError)?;
                info!("NvsConfigStore: loaded poll URL");
                Ok(Some(out))
            }
            None => {
                info!("NvsConfigStore: no stored poll URL (uninitialized region)");
                Ok(None)
            }
        }
    }

    fn save_poll_url(&self, url: &str) -> Result<(), ConfigError> {
        validate_poll_url(url).map_err(ConfigError::ValidationFailed)?;
        self.write_region(&encode_region(url))?;
        info!("NvsConfigStore: poll URL persisted ({} bytes)", url.len());
        Ok(())
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn region_roundtrip() {
        let url = "http://example.com/poll";
        let region = encode_region(url);
        assert_eq!(region[0] as usize, url.len());
        assert_eq!(decode_region(&region), Some(url));
    }

    #[test]
    fn sentinel_region_decodes_as_unconfigured() {
        let region = [UNINIT_SENTINEL; REGION_SIZE];
        assert_eq!(decode_region(&region), None);
    }

    #[test]
    fn zero_length_region_decodes_as_unconfigured() {
        let mut region = [UNINIT_SENTINEL; REGION_SIZE];
        region[0] = 0;
        assert_eq!(decode_region(&region), None);
    }

    #[test]
    fn over_long_length_rejected() {
        let mut region = [b'x'; REGION_SIZE];
        region[0] = (MAX_URL_LEN + 1) as u8;
        assert_eq!(decode_region(&region), None);
    }

    #[test]
    fn store_roundtrip() {
        let store = NvsConfigStore::new().unwrap();
        assert_eq!(store.load_poll_url().unwrap(), None, "fresh store empty");

        store.save_poll_url("http://example.com/poll").unwrap();
        let loaded = store.load_poll_url().unwrap().unwrap();
        assert_eq!(loaded.as_str(), "http://example.com/poll");
    }

    #[test]
    fn save_rejects_invalid_urls() {
        let store = NvsConfigStore::new().unwrap();
        assert!(matches!(
            store.save_poll_url(""),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert!(matches!(
            store.save_poll_url("nonsense"),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert_eq!(store.load_poll_url().unwrap(), None);
    }
}
