//! 执行检查步骤 (PPS) 状态机
//!
//! 尚未开始执行的检查没有执行状态，用 `None` 表示。
//! 设备在执行过程中会重复发送 IN PROGRESS 通知，因此 IN_PROGRESS 上的 Start 保持原状态。

use radiology_core::{PerformedProcedureStepStatus, RadiologyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 执行步骤事件，来自设备的 MPPS 通知
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProcedureStepEvent {
    Start,
    Complete,
    Discontinue,
}

impl ProcedureStepEvent {
    /// 到达目标状态所需的事件
    pub fn for_status(status: PerformedProcedureStepStatus) -> Self {
        match status {
            PerformedProcedureStepStatus::InProgress => Self::Start,
            PerformedProcedureStepStatus::Completed => Self::Complete,
            PerformedProcedureStepStatus::Discontinued => Self::Discontinue,
        }
    }
}

type PpsState = Option<PerformedProcedureStepStatus>;

/// 执行步骤状态机
#[derive(Debug)]
pub struct PerformedProcedureStepStateMachine {
    transitions: HashMap<(PpsState, ProcedureStepEvent), PerformedProcedureStepStatus>,
}

impl PerformedProcedureStepStateMachine {
    pub fn new() -> Self {
        use PerformedProcedureStepStatus::*;

        let mut transitions = HashMap::new();
        transitions.insert((None, ProcedureStepEvent::Start), InProgress);
        transitions.insert((Some(InProgress), ProcedureStepEvent::Start), InProgress);
        transitions.insert((Some(InProgress), ProcedureStepEvent::Complete), Completed);
        transitions.insert((Some(InProgress), ProcedureStepEvent::Discontinue), Discontinued);

        Self { transitions }
    }

    pub fn can_transition(&self, from: PpsState, event: ProcedureStepEvent) -> bool {
        self.transitions.contains_key(&(from, event))
    }

    pub fn transition(
        &self,
        from: PpsState,
        event: ProcedureStepEvent,
    ) -> Result<PerformedProcedureStepStatus> {
        self.transitions
            .get(&(from, event))
            .copied()
            .ok_or_else(|| RadiologyError::InvalidStateTransition {
                from: PerformedProcedureStepStatus::name_or_unknown(from).to_string(),
                event: format!("{:?}", event),
            })
    }

    /// 当前状态下允许的事件
    pub fn get_possible_events(&self, current_state: PpsState) -> Vec<ProcedureStepEvent> {
        self.transitions
            .keys()
            .filter(|(state, _)| *state == current_state)
            .map(|(_, event)| *event)
            .collect()
    }
}

impl Default for PerformedProcedureStepStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
