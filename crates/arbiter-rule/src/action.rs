//! Action operations and their combinators.

use std::rc::Rc;

use arbiter_context::{MutatorContext, Value};
use arbiter_fault::{ErrorCode, Fault, FaultCategory, FaultResult};
use tracing::warn;

/// A side-effecting operation over the privileged view.
///
/// An action only decides *what* to do, never *whether* — it trusts the
/// caller's condition outcome completely. All effects land in the bag; there
/// is no rollback.
#[derive(Clone)]
pub struct Action {
    operation: Rc<dyn Fn(&MutatorContext<'_>) -> FaultResult<()>>,
}

impl Action {
    /// Lift a closure into an action.
    pub fn new(operation: impl Fn(&MutatorContext<'_>) -> FaultResult<()> + 'static) -> Action {
        Action {
            operation: Rc::new(operation),
        }
    }

    /// The action that does nothing.
    pub fn noop() -> Action {
        Action::new(|_| Ok(()))
    }

    /// Write exactly one key.
    ///
    /// A blank key is malformed wiring and fails with a configuration fault
    /// before any write attempt. A kernel fault from the underlying write is
    /// wrapped as a logic fault carrying the key, the value, and the nested
    /// message.
    pub fn set_variable(key: impl Into<String>, value: impl Into<Value>) -> Action {
        let key = key.into();
        let value = value.into();
        Action::new(move |ctx| {
            if key.trim().is_empty() {
                return Err(Fault::configuration(
                    ErrorCode::ConfigurationError,
                    "Variable assignment requires a non-blank key",
                )
                .with_attribute("key", key.as_str())
                .with_attribute("value", value.to_json()));
            }
            ctx.put(key.clone(), value.clone())
                .map(|_| ())
                .map_err(|fault| {
                    Fault::logic(ErrorCode::ActionExecError, "Failed to set variable")
                        .with_attribute("key", key.as_str())
                        .with_attribute("value", value.to_json())
                        .with_attribute("nested_fault", fault.message())
                })
        })
    }

    /// Execute against the privileged view.
    pub fn execute(&self, ctx: &MutatorContext<'_>) -> FaultResult<()> {
        (self.operation)(ctx)
    }

    /// Sequential composition: this action, then `next`.
    ///
    /// If this action fails, `next` never runs and effects already committed
    /// stay committed. Logic faults from the sequence are enriched with a
    /// chain marker; every other kernel fault passes through unmodified.
    pub fn and_then(self, next: Action) -> Action {
        Action::new(move |ctx| {
            self.execute(ctx)
                .and_then(|()| next.execute(ctx))
                .map_err(|fault| {
                    if fault.category() == FaultCategory::Logic {
                        warn!(nested = %fault, "Action chain interrupted by logic fault");
                        fault.with_attribute("action_chain", "sequential")
                    } else {
                        fault
                    }
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use arbiter_context::ExecutionContext;

    use super::*;

    fn at_action_phase() -> ExecutionContext {
        let context = ExecutionContext::new();
        context.advance().unwrap();
        context.advance().unwrap();
        context
    }

    #[test]
    fn set_variable_writes_exactly_one_key() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        Action::set_variable("status", "approved")
            .execute(&mutator)
            .unwrap();
        assert_eq!(context.context().get_string("status"), "approved");
        assert_eq!(context.context().len(), 1);
    }

    #[test]
    fn set_variable_rejects_blank_keys_before_writing() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        let fault = Action::set_variable("   ", 1i64)
            .execute(&mutator)
            .unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Configuration);
        assert!(context.context().is_empty());
    }

    #[test]
    fn set_variable_wraps_rejected_writes_as_logic_faults() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        context.freeze();

        let fault = Action::set_variable("late", 9i64)
            .execute(&mutator)
            .unwrap_err();
        assert_eq!(fault.code(), ErrorCode::ActionExecError);
        assert_eq!(
            fault.attribute("key"),
            Some(&serde_json::Value::String("late".to_string()))
        );
        assert!(fault.has_attribute("nested_fault"));
    }

    #[test]
    fn and_then_runs_strictly_in_sequence() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        Action::set_variable("step", "first")
            .and_then(Action::set_variable("step", "second"))
            .execute(&mutator)
            .unwrap();
        assert_eq!(context.context().get_string("step"), "second");
    }

    #[test]
    fn a_failed_first_action_stops_the_chain_without_rollback() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        let ran_next = Rc::new(Cell::new(false));
        let observer = Rc::clone(&ran_next);

        let first = Action::new(|ctx| {
            ctx.put("partial", true)?;
            Err(Fault::logic(ErrorCode::ActionExecError, "first action died"))
        });
        let second = Action::new(move |_| {
            observer.set(true);
            Ok(())
        });

        let fault = first.and_then(second).execute(&mutator).unwrap_err();
        assert_eq!(
            fault.attribute("action_chain"),
            Some(&serde_json::Value::String("sequential".to_string()))
        );
        assert!(!ran_next.get());
        // Effects already committed stay committed.
        assert!(context.context().get_bool("partial"));
    }

    #[test]
    fn non_logic_faults_pass_through_the_chain_unmodified() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        let interrupting = Action::new(|_| Err(Fault::interrupted("chain stop")));

        let fault = interrupting
            .and_then(Action::noop())
            .execute(&mutator)
            .unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Control);
        assert!(!fault.has_attribute("action_chain"));
    }

    #[test]
    fn noop_leaves_the_bag_untouched() {
        let context = at_action_phase();
        let mutator = context.mutator().unwrap();
        Action::noop().execute(&mutator).unwrap();
        assert!(context.context().is_empty());
    }
}
