//! Condition predicates and their combinators.

use std::rc::Rc;

use arbiter_context::Context;
use arbiter_fault::{ErrorCode, Fault, FaultResult};
use tracing::warn;

/// A predicate over the read view deciding whether a rule fires.
///
/// Contract: evaluation must be idempotent and side-effect-free. The kernel
/// cannot enforce that structurally — conditions only receive the read view,
/// but a closure could still observe outside state — so it is a usage
/// contract, like the original design intends.
#[derive(Clone)]
pub struct Condition {
    predicate: Rc<dyn Fn(&Context<'_>) -> FaultResult<bool>>,
}

impl Condition {
    /// Lift a closure into a condition.
    pub fn new(predicate: impl Fn(&Context<'_>) -> FaultResult<bool> + 'static) -> Condition {
        Condition {
            predicate: Rc::new(predicate),
        }
    }

    /// The constantly-true condition.
    pub fn always() -> Condition {
        Condition::new(|_| Ok(true))
    }

    /// The constantly-false condition.
    pub fn never() -> Condition {
        Condition::new(|_| Ok(false))
    }

    /// Evaluate against the read view.
    pub fn evaluate(&self, ctx: &Context<'_>) -> FaultResult<bool> {
        (self.predicate)(ctx)
    }

    /// Logical AND. Short-circuits: the right operand is not evaluated when
    /// the left is false. Faults from either operand are normalized at this
    /// boundary.
    pub fn and(self, other: Condition) -> Condition {
        Condition::new(move |ctx| {
            both(&self, &other, ctx).map_err(|fault| {
                normalize("AND", "Condition AND evaluation failed", &fault)
            })
        })
    }

    /// Logical OR. Short-circuits: the right operand is not evaluated when
    /// the left is true. Faults from either operand are normalized at this
    /// boundary.
    pub fn or(self, other: Condition) -> Condition {
        Condition::new(move |ctx| {
            either(&self, &other, ctx).map_err(|fault| {
                normalize("OR", "Condition OR evaluation failed", &fault)
            })
        })
    }

    /// Logical complement. Faults from the operand are normalized at this
    /// boundary.
    pub fn negate(self) -> Condition {
        Condition::new(move |ctx| {
            self.evaluate(ctx).map(|outcome| !outcome).map_err(|fault| {
                normalize("NOT", "Condition negation evaluation failed", &fault)
            })
        })
    }
}

fn both(left: &Condition, right: &Condition, ctx: &Context<'_>) -> FaultResult<bool> {
    Ok(left.evaluate(ctx)? && right.evaluate(ctx)?)
}

fn either(left: &Condition, right: &Condition, ctx: &Context<'_>) -> FaultResult<bool> {
    Ok(left.evaluate(ctx)? || right.evaluate(ctx)?)
}

/// Re-wrap a kernel fault caught at a combinator boundary as a logic fault
/// tagged with the combinator, keeping the original message as a nested
/// diagnostic attribute.
fn normalize(operation: &str, message: &str, fault: &Fault) -> Fault {
    warn!(operation, nested = %fault, "Condition fault normalized at combinator boundary");
    Fault::logic(ErrorCode::ConditionEvalError, message)
        .with_attribute("nested_fault", fault.message())
        .with_attribute("operation", operation)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use arbiter_context::ExecutionContext;
    use arbiter_fault::FaultCategory;

    use super::*;

    /// A condition that counts its evaluations before returning a constant.
    fn probe(outcome: bool) -> (Condition, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let observer = Rc::clone(&hits);
        let condition = Condition::new(move |_| {
            observer.set(observer.get() + 1);
            Ok(outcome)
        });
        (condition, hits)
    }

    #[test]
    fn and_short_circuits_on_a_false_left_operand() {
        let context = ExecutionContext::new();
        let (right, hits) = probe(true);

        let outcome = Condition::never().and(right).evaluate(&context.context());
        assert!(!outcome.unwrap());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn always_and_never_is_false_without_probing_the_right_side_twice() {
        let context = ExecutionContext::new();
        let (right, hits) = probe(false);

        let outcome = Condition::always().and(right).evaluate(&context.context());
        assert!(!outcome.unwrap());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn or_short_circuits_on_a_true_left_operand() {
        let context = ExecutionContext::new();
        let (right, hits) = probe(false);

        let outcome = Condition::always().or(right).evaluate(&context.context());
        assert!(outcome.unwrap());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn negate_flips_the_outcome() {
        let context = ExecutionContext::new();
        assert!(!Condition::always().negate().evaluate(&context.context()).unwrap());
        assert!(Condition::never().negate().evaluate(&context.context()).unwrap());
    }

    #[test]
    fn faults_are_normalized_with_the_combinator_tag() {
        let context = ExecutionContext::new();
        let failing = Condition::new(|_| {
            Err(Fault::logic(ErrorCode::TypeMismatch, "underlying failure"))
        });

        let fault = Condition::always()
            .and(failing)
            .evaluate(&context.context())
            .unwrap_err();

        assert_eq!(fault.category(), FaultCategory::Logic);
        assert_eq!(fault.code(), ErrorCode::ConditionEvalError);
        assert_eq!(
            fault.attribute("operation"),
            Some(&serde_json::Value::String("AND".to_string()))
        );
        assert_eq!(
            fault.attribute("nested_fault"),
            Some(&serde_json::Value::String("underlying failure".to_string()))
        );
    }

    #[test]
    fn control_faults_are_normalized_like_any_kernel_fault() {
        // The boundary keys on the fault hierarchy, not the category; drivers
        // that interrupt a chain raise the control fault outside combined
        // conditions.
        let context = ExecutionContext::new();
        let interrupting = Condition::new(|_| Err(Fault::interrupted("stop here")));

        let fault = interrupting
            .or(Condition::always())
            .evaluate(&context.context())
            .unwrap_err();
        assert_eq!(fault.category(), FaultCategory::Logic);
        assert_eq!(
            fault.attribute("operation"),
            Some(&serde_json::Value::String("OR".to_string()))
        );
    }

    #[test]
    fn conditions_read_business_data_through_the_view() {
        let context = ExecutionContext::seeded([
            ("amount".to_string(), "250.00".into()),
            ("vip".to_string(), true.into()),
        ]);
        let threshold =
            Condition::new(|ctx| Ok(ctx.get_financial("amount")? > ctx.get_financial("limit")?));
        let vip = Condition::new(|ctx| Ok(ctx.get_bool("vip")));

        // "limit" is absent, so the threshold faults; OR normalizes it even
        // though the vip leg would have passed.
        let fault = threshold
            .clone()
            .or(vip.clone())
            .evaluate(&context.context())
            .unwrap_err();
        assert_eq!(fault.code(), ErrorCode::ConditionEvalError);

        // vip alone is fine.
        assert!(vip.evaluate(&context.context()).unwrap());
    }
}
