//! Stable machine-readable error codes.

use serde::{Deserialize, Serialize};

use crate::fault::{Fault, FaultResult};

/// The closed set of error codes the kernel can raise.
///
/// Each code pairs a stable string form (used in logs, metrics, and message
/// mapping) with a default developer-facing message. The string forms are a
/// published contract: they never change meaning and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A write was attempted against a frozen data bag.
    ContextFrozen,
    /// A write was attempted outside the writable phase.
    MutatorNotAllowed,
    /// A stored value did not match the requested type.
    TypeMismatch,
    /// A numeric value fell outside the representable range.
    ValueOutOfRange,
    /// A phase transition or phase-bound operation was invalid.
    PhaseIllegal,
    /// A condition raised a fault while being evaluated.
    ConditionEvalError,
    /// An action raised a fault while being executed.
    ActionExecError,
    /// Malformed wiring: bad operands, unknown codes, invalid setup.
    ConfigurationError,
}

impl ErrorCode {
    /// Every known code, in declaration order.
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::ContextFrozen,
        ErrorCode::MutatorNotAllowed,
        ErrorCode::TypeMismatch,
        ErrorCode::ValueOutOfRange,
        ErrorCode::PhaseIllegal,
        ErrorCode::ConditionEvalError,
        ErrorCode::ActionExecError,
        ErrorCode::ConfigurationError,
    ];

    /// The stable string form of this code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorCode::ContextFrozen => "E-C-001",
            ErrorCode::MutatorNotAllowed => "E-C-003",
            ErrorCode::TypeMismatch => "E-D-001",
            ErrorCode::ValueOutOfRange => "E-D-002",
            ErrorCode::PhaseIllegal => "E-L-001",
            ErrorCode::ConditionEvalError => "E-L-002",
            ErrorCode::ActionExecError => "E-L-003",
            ErrorCode::ConfigurationError => "E-CFG-001",
        }
    }

    /// The default developer-facing message for this code.
    ///
    /// Meant for logs and debugging, not necessarily for end users.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::ContextFrozen => "Context is frozen and cannot be modified",
            ErrorCode::MutatorNotAllowed => "Write access is not allowed in this phase",
            ErrorCode::TypeMismatch => "Data type mismatch",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::PhaseIllegal => "Illegal execution phase",
            ErrorCode::ConditionEvalError => "Condition evaluation failed",
            ErrorCode::ActionExecError => "Action execution failed",
            ErrorCode::ConfigurationError => "Invalid engine configuration",
        }
    }

    /// Resolve a stable string form back to its code.
    ///
    /// Blank or unknown input is malformed wiring and fails with a
    /// configuration fault carrying the offending input and the full list of
    /// valid codes.
    pub fn lookup(input: &str) -> FaultResult<ErrorCode> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Fault::configuration(
                ErrorCode::ConfigurationError,
                "Error code lookup requires a non-blank input",
            )
            .with_attribute("input", input)
            .with_attribute("valid_codes", Self::valid_codes()));
        }

        Self::ALL
            .into_iter()
            .find(|candidate| candidate.code() == trimmed)
            .ok_or_else(|| {
                Fault::configuration(
                    ErrorCode::ConfigurationError,
                    "Unknown error code",
                )
                .with_attribute("input", input)
                .with_attribute("valid_codes", Self::valid_codes())
            })
    }

    fn valid_codes() -> serde_json::Value {
        serde_json::Value::Array(
            Self::ALL
                .into_iter()
                .map(|code| serde_json::Value::String(code.code().to_string()))
                .collect(),
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultCategory;

    #[test]
    fn codes_are_unique() {
        for (i, a) in ErrorCode::ALL.iter().enumerate() {
            for b in &ErrorCode::ALL[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn lookup_resolves_known_code() {
        let code = ErrorCode::lookup("E-C-001").unwrap();
        assert_eq!(code, ErrorCode::ContextFrozen);
    }

    #[test]
    fn lookup_ignores_surrounding_whitespace() {
        let code = ErrorCode::lookup("  E-D-001  ").unwrap();
        assert_eq!(code, ErrorCode::TypeMismatch);
    }

    #[test]
    fn lookup_rejects_blank_input_with_configuration_fault() {
        let fault = ErrorCode::lookup("   ").unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Configuration);
        assert_eq!(fault.code(), ErrorCode::ConfigurationError);
        assert!(fault.has_attribute("valid_codes"));
    }

    #[test]
    fn lookup_rejects_unknown_input_with_configuration_fault() {
        let fault = ErrorCode::lookup("E-X-999").unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Configuration);
        assert_eq!(fault.code(), ErrorCode::ConfigurationError);
        assert_eq!(
            fault.attribute("input"),
            Some(&serde_json::Value::String("E-X-999".to_string()))
        );
    }
}
