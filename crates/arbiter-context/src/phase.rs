//! The semantic phases of one evaluation pass.

use serde::{Deserialize, Serialize};

/// A phase is a semantic boundary, not a procedural step: it decides which
/// capabilities are granted and which invariants must hold. The canonical
/// order is strictly forward; no phase is ever revisited within a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionPhase {
    /// Chain initialization and context validation. Read-only.
    PreEvaluation,
    /// All conditions run here. Strictly read-only.
    Condition,
    /// Actions run here. The only phase that grants write capability.
    Action,
    /// Result convergence, formatting, audit. Read-only again.
    PostAction,
}

impl ExecutionPhase {
    /// The canonical forward order.
    pub const ORDER: [ExecutionPhase; 4] = [
        ExecutionPhase::PreEvaluation,
        ExecutionPhase::Condition,
        ExecutionPhase::Action,
        ExecutionPhase::PostAction,
    ];

    /// Whether this phase grants write capability.
    pub fn is_writable(self) -> bool {
        self == ExecutionPhase::Action
    }

    /// The canonical successor, or `None` at the end of the pass.
    pub fn next(self) -> Option<ExecutionPhase> {
        match self {
            ExecutionPhase::PreEvaluation => Some(ExecutionPhase::Condition),
            ExecutionPhase::Condition => Some(ExecutionPhase::Action),
            ExecutionPhase::Action => Some(ExecutionPhase::PostAction),
            ExecutionPhase::PostAction => None,
        }
    }
}

impl std::fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExecutionPhase::PreEvaluation => "pre_evaluation",
            ExecutionPhase::Condition => "condition",
            ExecutionPhase::Action => "action",
            ExecutionPhase::PostAction => "post_action",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_action_phase_is_writable() {
        for phase in ExecutionPhase::ORDER {
            assert_eq!(phase.is_writable(), phase == ExecutionPhase::Action);
        }
    }

    #[test]
    fn successors_walk_the_canonical_order() {
        let mut walked = vec![ExecutionPhase::PreEvaluation];
        while let Some(next) = walked.last().unwrap().next() {
            walked.push(next);
        }
        assert_eq!(walked, ExecutionPhase::ORDER);
    }
}
