//! toolerator: driver module for a stepper-driven turret tool changer
//!
//! The FPGA reports one config block per module at start-up; from it this crate
//! builds a [`Toolerator`] holding every turret on the board. Each cycle the host
//! asks the board for its write block ([`Toolerator::prepare_write`]), exchanges it
//! with the FPGA and hands back the read block ([`Toolerator::process_read`]).

mod error;
pub use error::{Error, Result};

mod types;
pub use types::*;

pub mod status;
pub use status::{transition_for, Effect, ToolchangerStatus, Transition};

mod registry;
pub use registry::{BoardRegistry, Toolerator};

mod encode;
pub use encode::WriteFrame;

mod decode;
pub use decode::{ReadFrame, StatusRecord};

mod loader;
pub use loader::{load_module_file, load_modules_dir, InstanceConfig, ModuleConfig, ModuleSet};

mod metrics;
pub use metrics::{MetricsHub, ToolchangerMetrics};

mod traits;
pub use traits::{registration, DriverModule, InitializeFn, ModuleRegistration};

pub mod version;
pub use version::{check_firmware_version, ProtocolVersion, DRIVER_VERSION, MODULE_ID, MODULE_NAME};
