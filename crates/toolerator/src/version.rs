//! Protocol identity of the toolerator module.
//!
//! The major and minor numbers change whenever the frame layout changes, so a
//! driver and firmware that disagree on either cannot talk to each other. Patch
//! releases never touch the wire.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier the firmware reports for a toolerator module.
pub const MODULE_ID: u32 = 0x4e32_796a;

/// Name of the module as registered with the host framework.
pub const MODULE_NAME: &str = "toolerator";

/// Protocol version implemented by this driver.
pub const DRIVER_VERSION: ProtocolVersion = ProtocolVersion::new(1, 0, 0);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl ProtocolVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether two versions share a wire format.
    pub fn is_compatible(&self, other: &ProtocolVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidVersion(s.to_string()));
        }
        let mut nums = [0u8; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

/// Check the version reported by the firmware against [`DRIVER_VERSION`].
pub fn check_firmware_version(firmware: ProtocolVersion) -> Result<()> {
    if !DRIVER_VERSION.is_compatible(&firmware) {
        return Err(Error::VersionMismatch {
            driver: DRIVER_VERSION,
            firmware,
        });
    }
    if DRIVER_VERSION.patch != firmware.patch {
        tracing::debug!(
            driver = %DRIVER_VERSION,
            firmware = %firmware,
            "patch versions differ; wire format unchanged"
        );
    }
    Ok(())
}
