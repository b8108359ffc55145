//! Status codes reported by the toolerator state machine and the effect each one
//! has on the derived output signals.

use serde::{Deserialize, Serialize};

use crate::types::ToolchangerOutputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ToolchangerStatus {
    Start = 0x01,
    HomeSearching = 0x02,
    HomeBackOff = 0x03,
    HomeLatching = 0x04,
    HomeMoveToZero = 0x05,
    MovingForward = 0x06,
    MovingBackward = 0x07,
    Ready = 0x08,
    Error = 0x09,
}

impl ToolchangerStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Start),
            0x02 => Some(Self::HomeSearching),
            0x03 => Some(Self::HomeBackOff),
            0x04 => Some(Self::HomeLatching),
            0x05 => Some(Self::HomeMoveToZero),
            0x06 => Some(Self::MovingForward),
            0x07 => Some(Self::MovingBackward),
            0x08 => Some(Self::Ready),
            0x09 => Some(Self::Error),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_homing(self) -> bool {
        matches!(
            self,
            Self::HomeSearching | Self::HomeBackOff | Self::HomeLatching | Self::HomeMoveToZero
        )
    }
}

/// What a status does to one derived signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Unchanged,
    Set(bool),
    /// Copy the current tool-change request.
    MirrorRequest,
}

impl Effect {
    fn apply(self, signal: &mut bool, tool_change_request: bool) {
        match self {
            Effect::Unchanged => {}
            Effect::Set(v) => *signal = v,
            Effect::MirrorRequest => *signal = tool_change_request,
        }
    }
}

/// Effect of one status code on `homing`, `tool_changed` and `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub homing: Effect,
    pub tool_changed: Effect,
    pub error: Effect,
}

impl Transition {
    pub const IDENTITY: Transition = Transition {
        homing: Effect::Unchanged,
        tool_changed: Effect::Unchanged,
        error: Effect::Unchanged,
    };

    const HOMING: Transition = Transition {
        homing: Effect::Set(true),
        tool_changed: Effect::Set(false),
        error: Effect::Unchanged,
    };

    const MOVING: Transition = Transition {
        homing: Effect::Unchanged,
        tool_changed: Effect::Set(false),
        error: Effect::Unchanged,
    };

    const READY: Transition = Transition {
        homing: Effect::Unchanged,
        tool_changed: Effect::MirrorRequest,
        error: Effect::Unchanged,
    };

    const ERROR: Transition = Transition {
        homing: Effect::Unchanged,
        tool_changed: Effect::Set(false),
        error: Effect::Set(true),
    };

    pub fn apply(&self, outputs: &mut ToolchangerOutputs, tool_change_request: bool) {
        self.homing.apply(&mut outputs.homing, tool_change_request);
        self.tool_changed
            .apply(&mut outputs.tool_changed, tool_change_request);
        self.error.apply(&mut outputs.error, tool_change_request);
    }
}

/// Status codes with an effect on the derived signals. Codes not listed, START
/// included, leave every signal as it was. No entry clears `error`.
pub const TRANSITIONS: [(ToolchangerStatus, Transition); 8] = [
    (ToolchangerStatus::HomeSearching, Transition::HOMING),
    (ToolchangerStatus::HomeBackOff, Transition::HOMING),
    (ToolchangerStatus::HomeLatching, Transition::HOMING),
    (ToolchangerStatus::HomeMoveToZero, Transition::HOMING),
    (ToolchangerStatus::MovingForward, Transition::MOVING),
    (ToolchangerStatus::MovingBackward, Transition::MOVING),
    (ToolchangerStatus::Ready, Transition::READY),
    (ToolchangerStatus::Error, Transition::ERROR),
];

/// Look up the transition for a raw status code.
pub fn transition_for(code: u8) -> Transition {
    TRANSITIONS
        .iter()
        .find(|(status, _)| status.code() == code)
        .map(|(_, t)| *t)
        .unwrap_or(Transition::IDENTITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(homing: bool, tool_changed: bool, error: bool) -> ToolchangerOutputs {
        ToolchangerOutputs {
            homing,
            tool_changed,
            error,
            ..Default::default()
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for code in 0x01..=0x09u8 {
            let status = ToolchangerStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(ToolchangerStatus::from_code(0x00), None);
        assert_eq!(ToolchangerStatus::from_code(0x0A), None);
    }

    #[test]
    fn test_homing_states_force_homing() {
        for code in 0x02..=0x05u8 {
            for error in [false, true] {
                let mut out = outputs(false, true, error);
                transition_for(code).apply(&mut out, true);
                assert!(out.homing, "code {code:#04x}");
                assert!(!out.tool_changed, "code {code:#04x}");
                assert_eq!(out.error, error, "code {code:#04x}");
            }
        }
    }

    #[test]
    fn test_moving_keeps_homing() {
        for code in [0x06u8, 0x07] {
            let mut out = outputs(true, true, false);
            transition_for(code).apply(&mut out, true);
            assert_eq!(out, outputs(true, false, false));
        }
    }

    #[test]
    fn test_ready_mirrors_request() {
        let mut out = outputs(false, false, false);
        transition_for(0x08).apply(&mut out, true);
        assert!(out.tool_changed);
        transition_for(0x08).apply(&mut out, false);
        assert!(!out.tool_changed);
    }

    #[test]
    fn test_error_latches() {
        let mut out = outputs(false, true, false);
        transition_for(0x09).apply(&mut out, true);
        assert_eq!(out, outputs(false, false, true));
    }

    #[test]
    fn test_unlisted_codes_are_identity() {
        for code in [0x00u8, 0x01, 0x0A, 0x7F, 0xFF] {
            assert_eq!(transition_for(code), Transition::IDENTITY);
            let mut out = outputs(true, true, true);
            transition_for(code).apply(&mut out, false);
            assert_eq!(out, outputs(true, true, true));
        }
    }

    #[test]
    fn test_no_transition_clears_error() {
        for (_, t) in TRANSITIONS {
            assert_ne!(t.error, Effect::Set(false));
            assert_ne!(t.error, Effect::MirrorRequest);
        }
    }

    #[test]
    fn test_homing_helper_matches_table() {
        for (status, t) in TRANSITIONS {
            assert_eq!(status.is_homing(), t.homing == Effect::Set(true));
        }
    }
}
