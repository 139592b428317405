//! 队列状态机
//!
//! 管理队列条目从候诊到办结的状态转换

use hqms_core::{HqmsError, QueueStatus, Result};
use std::collections::HashSet;

/// 队列状态机
#[derive(Debug)]
pub struct QueueStateMachine {
    transitions: HashSet<(QueueStatus, QueueStatus)>,
}

impl QueueStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashSet::new();

        // 定义状态转换规则
        transitions.insert((QueueStatus::Waiting, QueueStatus::InProgress));
        transitions.insert((QueueStatus::InProgress, QueueStatus::Done));
        transitions.insert((QueueStatus::InProgress, QueueStatus::Completed));
        transitions.insert((QueueStatus::Waiting, QueueStatus::Skipped));
        transitions.insert((QueueStatus::InProgress, QueueStatus::Skipped));

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: QueueStatus, to: QueueStatus) -> bool {
        self.transitions.contains(&(from, to))
    }

    /// 执行状态转换
    pub fn transition(&self, from: QueueStatus, to: QueueStatus) -> Result<QueueStatus> {
        if self.can_transition(from, to) {
            Ok(to)
        } else {
            Err(HqmsError::InvalidStateTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    /// 获取某状态所有可能的后继状态
    pub fn possible_targets(&self, from: QueueStatus) -> Vec<QueueStatus> {
        self.transitions
            .iter()
            .filter(|(f, _)| *f == from)
            .map(|(_, t)| *t)
            .collect()
    }
}

impl Default for QueueStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let sm = QueueStateMachine::new();

        // 测试有效转换
        assert!(sm.can_transition(QueueStatus::Waiting, QueueStatus::InProgress));
        assert!(sm.can_transition(QueueStatus::InProgress, QueueStatus::Done));
        assert!(sm.can_transition(QueueStatus::InProgress, QueueStatus::Completed));
        assert!(sm.can_transition(QueueStatus::Waiting, QueueStatus::Skipped));
        assert!(sm.can_transition(QueueStatus::InProgress, QueueStatus::Skipped));
    }

    #[test]
    fn test_invalid_transitions() {
        let sm = QueueStateMachine::new();

        // 测试无效转换
        assert!(!sm.can_transition(QueueStatus::Waiting, QueueStatus::Done));
        assert!(!sm.can_transition(QueueStatus::Done, QueueStatus::Waiting));
        assert!(!sm.can_transition(QueueStatus::Completed, QueueStatus::InProgress));
        assert!(!sm.can_transition(QueueStatus::Skipped, QueueStatus::Waiting));
    }

    #[test]
    fn test_transition_execution() {
        let sm = QueueStateMachine::new();

        let result = sm.transition(QueueStatus::Waiting, QueueStatus::InProgress);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), QueueStatus::InProgress);

        let result = sm.transition(QueueStatus::Done, QueueStatus::InProgress);
        assert!(result.is_err());
    }

    #[test]
    fn test_terminal_states_have_no_targets() {
        let sm = QueueStateMachine::new();

        assert!(sm.possible_targets(QueueStatus::Done).is_empty());
        assert!(sm.possible_targets(QueueStatus::Completed).is_empty());
        assert!(sm.possible_targets(QueueStatus::Skipped).is_empty());
    }
}
