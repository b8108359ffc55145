use fpga_link::BlockSizes;

use crate::version::{ProtocolVersion, DRIVER_VERSION, MODULE_ID, MODULE_NAME};
use crate::{Result, Toolerator};

/// Hooks the host driver calls on a configured module.
///
/// Every hook that takes a cursor must advance it by exactly the size the
/// matching `required_*` function declared, so the next module on the board
/// starts on its own data.
pub trait DriverModule {
    fn required_config_buffer(&self) -> usize;
    fn required_write_buffer(&self) -> usize;
    fn required_read_buffer(&self) -> usize;

    fn block_sizes(&self) -> BlockSizes {
        BlockSizes::new(
            self.required_config_buffer(),
            self.required_write_buffer(),
            self.required_read_buffer(),
        )
    }

    /// Write module settings during the first cycle.
    fn configure(&mut self, data: &mut &mut [u8], period_ns: u64) -> Result<()>;

    /// Serialise the module's write block.
    fn prepare_write(&mut self, data: &mut &mut [u8], period_ns: u64) -> Result<()>;

    /// Consume the module's read block.
    fn process_read(&mut self, data: &mut &[u8], period_ns: u64) -> Result<()>;
}

impl DriverModule for Toolerator {
    fn required_config_buffer(&self) -> usize {
        Toolerator::required_config_buffer(self)
    }

    fn required_write_buffer(&self) -> usize {
        Toolerator::required_write_buffer(self)
    }

    fn required_read_buffer(&self) -> usize {
        Toolerator::required_read_buffer(self)
    }

    fn configure(&mut self, data: &mut &mut [u8], _period_ns: u64) -> Result<()> {
        Toolerator::configure(self, data)
    }

    fn prepare_write(&mut self, data: &mut &mut [u8], _period_ns: u64) -> Result<()> {
        Toolerator::prepare_write(self, data)
    }

    fn process_read(&mut self, data: &mut &[u8], _period_ns: u64) -> Result<()> {
        Toolerator::process_read(self, data)
    }
}

/// Entry point the host uses to build a module from its config block.
pub type InitializeFn = fn(&mut &[u8]) -> Result<Box<dyn DriverModule>>;

/// What the host needs to find and initialise this module.
#[derive(Clone, Copy)]
pub struct ModuleRegistration {
    pub id: u32,
    pub name: &'static str,
    pub version: ProtocolVersion,
    pub initialize: InitializeFn,
}

impl std::fmt::Debug for ModuleRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistration")
            .field("id", &format_args!("{:#010x}", self.id))
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl ModuleRegistration {
    /// Whether a module id reported by the firmware belongs to this registration.
    pub fn matches(&self, id: u32) -> bool {
        self.id == id
    }
}

fn initialize(config: &mut &[u8]) -> Result<Box<dyn DriverModule>> {
    Ok(Box::new(Toolerator::from_config(config)?))
}

/// Registration of the toolerator module.
pub fn registration() -> ModuleRegistration {
    ModuleRegistration {
        id: MODULE_ID,
        name: MODULE_NAME,
        version: DRIVER_VERSION,
        initialize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_identity() {
        let reg = registration();
        assert!(reg.matches(0x4e32_796a));
        assert!(!reg.matches(0));
        assert_eq!(reg.name, "toolerator");
        assert_eq!(reg.version, ProtocolVersion::new(1, 0, 0));
    }

    #[test]
    fn test_initialize_through_registration() {
        let raw = [2u8, 6, 8, 0];
        let mut cursor: &[u8] = &raw;
        let mut module = (registration().initialize)(&mut cursor).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(module.block_sizes(), BlockSizes::new(0, 8, 8));

        let mut write = [0u8; 8];
        let mut w: &mut [u8] = &mut write;
        module.prepare_write(&mut w, 1_000_000).unwrap();
        assert!(w.is_empty());

        let read = [0u8, 1, 1, 0x08, 0, 2, 1, 0x08];
        let mut r: &[u8] = &read;
        module.process_read(&mut r, 1_000_000).unwrap();
        assert!(r.is_empty());
    }
}
