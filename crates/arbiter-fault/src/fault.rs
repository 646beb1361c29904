//! The fault value: code, category, message, and a diagnostic snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::code::ErrorCode;

/// Result alias for operations that fail with a [`Fault`].
pub type FaultResult<T> = std::result::Result<T, Fault>;

/// The domain a fault belongs to — the first dimension of fault handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultCategory {
    /// Rule, condition, or action logic failed.
    Logic,
    /// Malformed wiring: bad rule configuration, invalid operands.
    Configuration,
    /// The kernel itself violated an invariant. Reserved; no current producer.
    Engine,
    /// A dependent external system failed. Reserved; no current producer.
    External,
    /// Deliberate control-flow short-circuit. Not an error.
    Control,
}

impl FaultCategory {
    /// Whether faults of this category are genuine errors that warrant
    /// alerting and handling. Only `Control` is exempt.
    pub fn is_error(self) -> bool {
        self != FaultCategory::Control
    }
}

impl std::fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FaultCategory::Logic => "LOGIC",
            FaultCategory::Configuration => "CONFIGURATION",
            FaultCategory::Engine => "ENGINE",
            FaultCategory::External => "EXTERNAL",
            FaultCategory::Control => "CONTROL",
        };
        write!(f, "{name}")
    }
}

/// An immutable kernel fault.
///
/// Everything is fixed at construction: the code, the category, the message,
/// and the attribute bag (possibly empty, never absent). A fault may be
/// observed at several points while it propagates, so enrichment never
/// mutates: [`Fault::with_attribute`] returns a new value and the receiver
/// keeps its original snapshot.
///
/// The textual form is a log-scraping contract:
/// `[CATEGORY] CODE: message [attributes={...}]`, and for control faults
/// `[CONTROL] Execution interrupted: <reason>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    code: ErrorCode,
    category: FaultCategory,
    message: String,
    attributes: BTreeMap<String, serde_json::Value>,
}

impl Fault {
    /// Construct a fault with an empty attribute bag.
    pub fn new(code: ErrorCode, category: FaultCategory, message: impl Into<String>) -> Self {
        Self {
            code,
            category,
            message: message.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// A business-logic fault: a rule, condition, or action misbehaved.
    pub fn logic(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, FaultCategory::Logic, message)
    }

    /// A configuration fault: malformed wiring, raised eagerly and never
    /// swallowed.
    pub fn configuration(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, FaultCategory::Configuration, message)
    }

    /// The control-flow fault: stop processing the remaining rule chain.
    ///
    /// This is not an error. External drivers catch it to end a pass early
    /// without alerting.
    pub fn interrupted(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::PhaseIllegal, FaultCategory::Control, reason)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn category(&self) -> FaultCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The diagnostic snapshot. Never absent; possibly empty.
    pub fn attributes(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attributes
    }

    /// Look up a single diagnostic attribute.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Whether this fault warrants alerting and handling.
    pub fn is_error(&self) -> bool {
        self.category.is_error()
    }

    /// A new fault equal to this one plus one diagnostic attribute.
    ///
    /// Copy-on-write: the receiver is left untouched. Attributes carry
    /// diagnostic context only; they must never change the business meaning
    /// of the fault.
    pub fn with_attribute(
        &self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Fault {
        let mut attributes = self.attributes.clone();
        attributes.insert(key.into(), value.into());
        Fault {
            code: self.code,
            category: self.category,
            message: self.message.clone(),
            attributes,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.category == FaultCategory::Control {
            return write!(f, "[CONTROL] Execution interrupted: {}", self.message);
        }
        write!(
            f,
            "[{}] {}: {} [attributes={}]",
            self.category,
            self.code.code(),
            self.message,
            render_attributes(&self.attributes)
        )
    }
}

impl std::error::Error for Fault {}

/// Render the attribute bag as `{k=v, k2=v2}`, keys in map order.
fn render_attributes(attributes: &BTreeMap<String, serde_json::Value>) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in attributes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push('=');
        match value {
            serde_json::Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_is_the_only_non_error_category() {
        assert!(FaultCategory::Logic.is_error());
        assert!(FaultCategory::Configuration.is_error());
        assert!(FaultCategory::Engine.is_error());
        assert!(FaultCategory::External.is_error());
        assert!(!FaultCategory::Control.is_error());
    }

    #[test]
    fn enrichment_leaves_the_original_untouched() {
        let f1 = Fault::logic(ErrorCode::ConditionEvalError, "msg");
        let f2 = f1.with_attribute("k", "v");

        assert!(f1.attributes().is_empty());
        assert_eq!(
            f2.attribute("k"),
            Some(&serde_json::Value::String("v".to_string()))
        );
        assert_ne!(f1, f2);
    }

    #[test]
    fn enrichment_accumulates_across_chained_calls() {
        let fault = Fault::logic(ErrorCode::ActionExecError, "failed")
            .with_attribute("key", "amount")
            .with_attribute("operation", "AND");
        assert_eq!(fault.attributes().len(), 2);
    }

    #[test]
    fn display_includes_category_code_message_and_attributes() {
        let fault = Fault::logic(ErrorCode::TypeMismatch, "bad value")
            .with_attribute("key", "amount");
        assert_eq!(
            fault.to_string(),
            "[LOGIC] E-D-001: bad value [attributes={key=amount}]"
        );
    }

    #[test]
    fn display_renders_empty_attribute_bag() {
        let fault = Fault::configuration(ErrorCode::ConfigurationError, "bad wiring");
        assert_eq!(
            fault.to_string(),
            "[CONFIGURATION] E-CFG-001: bad wiring [attributes={}]"
        );
    }

    #[test]
    fn control_fault_renders_the_interrupted_form() {
        let fault = Fault::interrupted("rule chain stopped by priority hit");
        assert_eq!(
            fault.to_string(),
            "[CONTROL] Execution interrupted: rule chain stopped by priority hit"
        );
        assert!(!fault.is_error());
    }

    #[test]
    fn non_string_attribute_values_render_as_json() {
        let fault = Fault::logic(ErrorCode::ValueOutOfRange, "overflow")
            .with_attribute("limit", 100)
            .with_attribute("strict", true);
        assert_eq!(
            fault.to_string(),
            "[LOGIC] E-D-002: overflow [attributes={limit=100, strict=true}]"
        );
    }
}
