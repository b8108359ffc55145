use serde::{Deserialize, Serialize};

/// Bytes the device reserves for this module's configuration, whatever the
/// instance count.
pub const CONFIG_STRIDE: usize = 4;

/// Instances that fit in one config block: one count byte, then one tool count
/// per instance.
pub const MAX_INSTANCES_PER_BOARD: usize = CONFIG_STRIDE - 1;

/// Packed size of the per-module settings written during the configure cycle.
/// The toolerator has no settings, so the record is empty.
pub const CONFIG_RECORD_SIZE: usize = 0;

/// Packed size of one instance's write frame.
pub const WRITE_FRAME_SIZE: usize = 4;

/// Packed size of one instance's read frame.
pub const READ_FRAME_SIZE: usize = 4;

/// Control signals set by the machine controller between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchangerInputs {
    /// FALSE stops motion; the changer must re-home before its next use.
    pub enable: bool,
    /// Held TRUE to request a tool change.
    pub tool_change: bool,
    /// Requested tool. Any value; wrapped onto the turret before transmission.
    pub tool_number: u32,
}

/// State reported back to the machine controller after each read cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchangerOutputs {
    /// Raw status code from the device.
    pub status: u8,
    /// Latched once the device reports an error.
    pub error: bool,
    pub homing: bool,
    pub homed: bool,
    /// Tool change finished; mirrors the request while the device is ready.
    pub tool_changed: bool,
    pub current_tool: u8,
}

/// One configured turret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchangerInstance {
    tool_count: u8,
    name: Option<String>,
    pub inputs: ToolchangerInputs,
    pub outputs: ToolchangerOutputs,
}

impl ToolchangerInstance {
    pub(crate) fn new(tool_count: u8) -> Self {
        Self {
            tool_count,
            name: None,
            inputs: ToolchangerInputs::default(),
            outputs: ToolchangerOutputs::default(),
        }
    }

    /// Number of tool positions on the turret. Never zero.
    pub fn tool_count(&self) -> u8 {
        self.tool_count
    }

    /// Alias given to the instance in the module descriptor, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Clear a latched error. Nothing the device reports clears it on its own.
    pub fn reset_error(&mut self) {
        self.outputs.error = false;
    }
}
