use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::status::{transition_for, ToolchangerStatus};
use crate::types::{ToolchangerInstance, READ_FRAME_SIZE};
use crate::{Error, Result, Toolerator};

/// Read frame for one instance: `[padding][tool_number][homed][status]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadFrame {
    pub tool_number: u8,
    pub homed: bool,
    pub status: u8,
}

impl ReadFrame {
    pub fn from_bytes(bytes: [u8; READ_FRAME_SIZE]) -> Self {
        Self {
            tool_number: bytes[1],
            homed: bytes[2] != 0,
            status: bytes[3],
        }
    }

    pub fn to_bytes(self) -> [u8; READ_FRAME_SIZE] {
        [0, self.tool_number, u8::from(self.homed), self.status]
    }
}

impl ToolchangerInstance {
    /// Take over the device state from `frame` and update the derived signals.
    ///
    /// `homed` and the current tool are copied every cycle. `homing`,
    /// `tool_changed` and `error` only change where the status table says so.
    pub fn apply_read_frame(&mut self, frame: ReadFrame) {
        let was_error = self.outputs.error;

        self.outputs.status = frame.status;
        transition_for(frame.status).apply(&mut self.outputs, self.inputs.tool_change);
        self.outputs.homed = frame.homed;
        self.outputs.current_tool = frame.tool_number;

        if self.outputs.error && !was_error {
            warn!(
                instance = self.name().unwrap_or("-"),
                status = frame.status,
                "toolerator reported an error"
            );
        }
    }
}

impl Toolerator {
    /// Deserialise the read frames of all instances, in configuration order, and
    /// advance `data` by exactly [`Toolerator::required_read_buffer`] bytes.
    pub fn process_read(&mut self, data: &mut &[u8]) -> Result<()> {
        let required = self.required_read_buffer();
        if data.len() < required {
            return Err(Error::BufferTooSmall {
                block: "read",
                expected: required,
                actual: data.len(),
            });
        }
        let (block, rest) = data.split_at(required);

        for (instance, chunk) in self
            .instances_mut()
            .iter_mut()
            .zip(block.chunks_exact(READ_FRAME_SIZE))
        {
            let mut raw = [0u8; READ_FRAME_SIZE];
            raw.copy_from_slice(chunk);
            instance.apply_read_frame(ReadFrame::from_bytes(raw));
        }
        *data = rest;
        debug!(bytes = required, "toolerator read block processed");
        Ok(())
    }

    /// Snapshot of every instance, for diagnostics.
    pub fn status_records(&self, ts: Option<OffsetDateTime>) -> Vec<StatusRecord> {
        self.instances()
            .iter()
            .enumerate()
            .map(|(index, inst)| StatusRecord::from_instance(index, inst, ts))
            .collect()
    }
}

/// Status output surface of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub tool_count: u8,
    pub status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ToolchangerStatus>,
    pub error: bool,
    pub homing: bool,
    pub homed: bool,
    pub tool_changed: bool,
    pub current_tool: u8,
}

impl StatusRecord {
    pub fn from_instance(
        index: usize,
        inst: &ToolchangerInstance,
        ts: Option<OffsetDateTime>,
    ) -> Self {
        let out = &inst.outputs;
        Self {
            index,
            name: inst.name().map(str::to_string),
            ts: ts.and_then(|t| {
                t.format(&time::format_description::well_known::Rfc3339)
                    .ok()
            }),
            tool_count: inst.tool_count(),
            status: out.status,
            state: ToolchangerStatus::from_code(out.status),
            error: out.error,
            homing: out.homing,
            homed: out.homed,
            tool_changed: out.tool_changed,
            current_tool: out.current_tool,
        }
    }
}
