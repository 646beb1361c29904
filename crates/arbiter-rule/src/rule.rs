//! The rule model consumed by external chain drivers.

use arbiter_fault::{ErrorCode, Fault, FaultResult};

use crate::action::Action;
use crate::condition::Condition;

/// A business rule: when the condition holds, run the actions in order.
///
/// The kernel enforces nothing beyond the condition/action contracts; the
/// external driver owns ordering (ascending priority, lower value first),
/// filtering of disabled rules, and chain termination.
#[derive(Clone)]
pub struct Rule {
    id: String,
    name: String,
    condition: Condition,
    actions: Vec<Action>,
    priority: i32,
    enabled: bool,
    description: Option<String>,
    version: String,
}

impl Rule {
    /// Start building a rule with the given business name.
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            id: None,
            name: name.into(),
            condition: None,
            actions: Vec::new(),
            priority: 0,
            enabled: true,
            description: None,
            version: "1.0".to_string(),
        }
    }

    /// Globally unique identifier, for lookup, persistence, and tracing.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable business name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// The actions to run when the condition holds, in declared order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Execution precedence: lower values run first. Defaults to 0.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Disabled rules never reach evaluation.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Version tag for staged rollout. Defaults to `"1.0"`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("description", &self.description)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Rule`].
pub struct RuleBuilder {
    id: Option<String>,
    name: String,
    condition: Option<Condition>,
    actions: Vec<Action>,
    priority: i32,
    enabled: bool,
    description: Option<String>,
    version: String,
}

impl RuleBuilder {
    /// Override the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> RuleBuilder {
        self.id = Some(id.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> RuleBuilder {
        self.condition = Some(condition);
        self
    }

    /// Append an action; order of calls is execution order.
    pub fn with_action(mut self, action: Action) -> RuleBuilder {
        self.actions.push(action);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> RuleBuilder {
        self.priority = priority;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> RuleBuilder {
        self.enabled = enabled;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> RuleBuilder {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> RuleBuilder {
        self.version = version.into();
        self
    }

    /// Finish the rule.
    ///
    /// Missing condition or a blank explicit id is malformed wiring and
    /// fails with a configuration fault; an omitted id is generated.
    pub fn build(self) -> FaultResult<Rule> {
        let condition = self.condition.ok_or_else(|| {
            Fault::configuration(
                ErrorCode::ConfigurationError,
                "A rule requires a condition",
            )
            .with_attribute("rule_name", self.name.as_str())
        })?;

        let id = match self.id {
            Some(explicit) if explicit.trim().is_empty() => {
                return Err(Fault::configuration(
                    ErrorCode::ConfigurationError,
                    "An explicit rule id must not be blank",
                )
                .with_attribute("rule_name", self.name.as_str()));
            }
            Some(explicit) => explicit,
            None => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Rule {
            id,
            name: self.name,
            condition,
            actions: self.actions,
            priority: self.priority,
            enabled: self.enabled,
            description: self.description,
            version: self.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use arbiter_fault::FaultCategory;

    use super::*;

    #[test]
    fn defaults_follow_the_rule_contract() {
        let rule = Rule::builder("vip discount")
            .with_condition(Condition::always())
            .build()
            .unwrap();
        assert_eq!(rule.priority(), 0);
        assert!(rule.is_enabled());
        assert_eq!(rule.version(), "1.0");
        assert!(rule.description().is_none());
        assert!(!rule.id().is_empty());
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Rule::builder("a")
            .with_condition(Condition::always())
            .build()
            .unwrap();
        let b = Rule::builder("b")
            .with_condition(Condition::always())
            .build()
            .unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn a_missing_condition_is_a_configuration_fault() {
        let fault = Rule::builder("incomplete").build().unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Configuration);
    }

    #[test]
    fn a_blank_explicit_id_is_a_configuration_fault() {
        let fault = Rule::builder("bad id")
            .with_id("  ")
            .with_condition(Condition::always())
            .build()
            .unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Configuration);
    }

    #[test]
    fn actions_keep_declaration_order() {
        let rule = Rule::builder("ordered")
            .with_condition(Condition::always())
            .with_action(Action::set_variable("step", 1i64))
            .with_action(Action::set_variable("step", 2i64))
            .build()
            .unwrap();
        assert_eq!(rule.actions().len(), 2);
    }
}
