//! The composition root: one bag, one phase, two capability views.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use arbiter_fault::{ErrorCode, Fault, FaultResult};
use arbiter_money::{Decimal, Money};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::phase::ExecutionPhase;
use crate::value::{FromValue, Value};

/// Owns the business data of exactly one evaluation pass.
///
/// The context binds a data bag to the current [`ExecutionPhase`] and decides
/// whether a mutation capability is granted: [`ExecutionContext::mutator`]
/// returns a populated handle only while the phase is writable and the bag is
/// not frozen. Absence of the handle is the normal read-only state, never a
/// fault.
///
/// [`ExecutionContext::freeze`] is a semantic lock, not a snapshot: it
/// converts the bag to read-only permanently, independent of phase, and no
/// later transition restores writability.
pub struct ExecutionContext {
    id: String,
    created_at: DateTime<Utc>,
    phase: Cell<ExecutionPhase>,
    frozen: Cell<bool>,
    bag: RefCell<BTreeMap<String, Value>>,
    /// Financial conversions already performed for a key. Entries are dropped
    /// whenever the key is written, so reads always reflect the live value.
    financial_cache: RefCell<HashMap<String, Money>>,
}

impl ExecutionContext {
    /// A fresh pass with an empty bag, starting at the first phase.
    pub fn new() -> ExecutionContext {
        Self::seeded(std::iter::empty::<(String, Value)>())
    }

    /// A fresh pass seeded with initial business data.
    pub fn seeded(entries: impl IntoIterator<Item = (String, Value)>) -> ExecutionContext {
        let context = ExecutionContext {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            phase: Cell::new(ExecutionPhase::PreEvaluation),
            frozen: Cell::new(false),
            bag: RefCell::new(entries.into_iter().collect()),
            financial_cache: RefCell::new(HashMap::new()),
        };
        debug!(pass = %context.id, "Execution context created");
        context
    }

    /// Identifier of this pass, for tracing and audit.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> ExecutionPhase {
        self.phase.get()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Move to the canonical next phase.
    ///
    /// Transitions are strictly forward; advancing past the final phase is
    /// malformed driver wiring and raises a configuration fault.
    pub fn advance(&self) -> FaultResult<ExecutionPhase> {
        let current = self.phase.get();
        let next = current.next().ok_or_else(|| {
            Fault::configuration(
                ErrorCode::PhaseIllegal,
                "Evaluation pass has no phase after the final one",
            )
            .with_attribute("phase", current.to_string())
        })?;
        self.phase.set(next);
        debug!(pass = %self.id, from = %current, to = %next, "Phase advanced");
        Ok(next)
    }

    /// The live read view. Always available, reflects current values, and
    /// exposes no write operation.
    pub fn context(&self) -> Context<'_> {
        Context { owner: self }
    }

    /// The mutation capability granted by the current phase, if any.
    ///
    /// Write access is a phase-granted, revocable privilege, never an
    /// inherent property of a handle; holders must expect every operation to
    /// re-validate the grant.
    pub fn mutator(&self) -> Option<MutatorContext<'_>> {
        if self.frozen.get() || !self.phase.get().is_writable() {
            debug!(
                pass = %self.id,
                phase = %self.phase.get(),
                frozen = self.frozen.get(),
                "Mutation capability not granted"
            );
            return None;
        }
        Some(MutatorContext { owner: self })
    }

    /// Irreversibly convert the bag to read-only, whatever the phase.
    pub fn freeze(&self) -> Context<'_> {
        self.frozen.set(true);
        debug!(pass = %self.id, phase = %self.phase.get(), "Context frozen");
        self.context()
    }
}

impl Default for ExecutionContext {
    fn default() -> ExecutionContext {
        ExecutionContext::new()
    }
}

/// The read-only projection over the live bag.
///
/// Derived accessors never mutate and never fail on a type mismatch; they
/// return an absence or a documented fallback instead.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    owner: &'a ExecutionContext,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("pass", &self.owner.id)
            .field("phase", &self.owner.phase.get())
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    /// The raw stored value, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.owner.bag.borrow().get(key).cloned()
    }

    /// Strongly-typed read. Absent when the stored tag does not match; no
    /// coercion ever happens on this path.
    pub fn get_typed<T: FromValue>(&self, key: &str) -> Option<T> {
        self.get(key).as_ref().and_then(T::from_value)
    }

    /// Boolean read: booleans verbatim, strings parsed case-insensitively as
    /// `"true"`/`"false"`, everything else false.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(flag)) => flag,
            Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// String read: empty for null or absent, trimmed rendering otherwise.
    pub fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(value) => value.to_string().trim().to_string(),
        }
    }

    /// Financial read — the only sanctioned path for amounts, rates, and
    /// weights.
    ///
    /// Stored financial values pass through unchanged; strings and numbers
    /// are converted and the conversion is cached per key until the key is
    /// written again. Anything unconvertible is a logic fault carrying the
    /// key and the raw value.
    pub fn get_financial(&self, key: &str) -> FaultResult<Money> {
        if let Some(hit) = self.owner.financial_cache.borrow().get(key) {
            return Ok(hit.clone());
        }

        let stored = self.get(key);
        let converted = match &stored {
            Some(Value::Financial(money)) => return Ok(money.clone()),
            Some(Value::String(text)) => {
                Money::parse(text).map_err(|fault| fault.with_attribute("key", key))?
            }
            Some(Value::Int(number)) => Money::new(Decimal::from(*number)),
            Some(Value::Float(number)) => {
                let amount = Decimal::try_from(*number).map_err(|parse_error| {
                    Fault::logic(
                        ErrorCode::TypeMismatch,
                        "Value cannot be read as a financial amount",
                    )
                    .with_attribute("key", key)
                    .with_attribute("raw", number.to_string())
                    .with_attribute("reason", parse_error.to_string())
                })?;
                Money::new(amount)
            }
            other => {
                return Err(Fault::logic(
                    ErrorCode::TypeMismatch,
                    "Value cannot be read as a financial amount",
                )
                .with_attribute("key", key)
                .with_attribute(
                    "raw",
                    other.as_ref().map_or(serde_json::Value::Null, Value::to_json),
                ));
            }
        };

        self.owner
            .financial_cache
            .borrow_mut()
            .insert(key.to_string(), converted.clone());
        Ok(converted)
    }

    /// Whether the key holds a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some(Value::Null))
    }

    /// All keys currently present, in deterministic order.
    pub fn keys(&self) -> Vec<String> {
        self.owner.bag.borrow().keys().cloned().collect()
    }

    /// A point-in-time snapshot of the bag, for serialization or tracing.
    pub fn as_map(&self) -> BTreeMap<String, Value> {
        self.owner.bag.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.owner.bag.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner.bag.borrow().is_empty()
    }
}

/// The privileged view: read plus put/remove/evolve/lock.
///
/// The handle itself proves nothing durable — the grant lives with the
/// owning phase and the frozen flag, and is re-checked on every operation.
/// A handle obtained before a freeze fails deterministically afterwards;
/// freeze is sticky and stronger than phase.
pub struct MutatorContext<'a> {
    owner: &'a ExecutionContext,
}

impl std::fmt::Debug for MutatorContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutatorContext")
            .field("pass", &self.owner.id)
            .field("phase", &self.owner.phase.get())
            .finish_non_exhaustive()
    }
}

impl<'a> MutatorContext<'a> {
    fn ensure_writable(&self) -> FaultResult<()> {
        if self.owner.frozen.get() {
            warn!(pass = %self.owner.id, "Write rejected: context is frozen");
            return Err(Fault::logic(
                ErrorCode::ContextFrozen,
                "Context is frozen and cannot be modified",
            )
            .with_attribute("phase", self.owner.phase.get().to_string()));
        }
        let phase = self.owner.phase.get();
        if !phase.is_writable() {
            warn!(pass = %self.owner.id, phase = %phase, "Write rejected: phase is read-only");
            return Err(Fault::logic(
                ErrorCode::MutatorNotAllowed,
                "Write access is not allowed in this phase",
            )
            .with_attribute("phase", phase.to_string()));
        }
        Ok(())
    }

    /// Write one value, overwriting any existing entry for the key.
    ///
    /// Returns the handle so a sequence of writes reads as one state
    /// evolution.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) -> FaultResult<&Self> {
        self.ensure_writable()?;
        let key = key.into();
        self.owner.financial_cache.borrow_mut().remove(&key);
        debug!(pass = %self.owner.id, key = %key, "Value written");
        self.owner.bag.borrow_mut().insert(key, value.into());
        Ok(self)
    }

    /// Bulk merge, last write per key wins.
    ///
    /// One validation and one bag borrow for the whole batch — the path for
    /// engine initialization and large imports.
    pub fn put_all(&self, entries: impl IntoIterator<Item = (String, Value)>) -> FaultResult<()> {
        self.ensure_writable()?;
        let mut bag = self.owner.bag.borrow_mut();
        let mut cache = self.owner.financial_cache.borrow_mut();
        let mut written = 0usize;
        for (key, value) in entries {
            cache.remove(&key);
            bag.insert(key, value);
            written += 1;
        }
        debug!(pass = %self.owner.id, count = written, "Batch written");
        Ok(())
    }

    /// Remove a key. Absent keys are a no-op, never a fault.
    pub fn remove(&self, key: &str) -> FaultResult<Option<Value>> {
        self.ensure_writable()?;
        self.owner.financial_cache.borrow_mut().remove(key);
        let removed = self.owner.bag.borrow_mut().remove(key);
        debug!(pass = %self.owner.id, key = %key, removed = removed.is_some(), "Key removed");
        Ok(removed)
    }

    /// Run a state evolution in a controlled closure, then lock the bag.
    ///
    /// The callback runs synchronously against this handle. If it completes,
    /// the bag is converted to read-only and the locked view is returned. If
    /// it faults, the fault propagates and the bag is NOT locked, so the
    /// caller can observe how far the writes got.
    pub fn evolve(
        &self,
        action: impl FnOnce(&MutatorContext<'a>) -> FaultResult<()>,
    ) -> FaultResult<Context<'a>> {
        action(self)?;
        Ok(self.lock())
    }

    /// Convert the bag to read-only and hand back the read view.
    ///
    /// Equivalent to [`ExecutionContext::freeze`]: permanent, phase-independent.
    pub fn lock(&self) -> Context<'a> {
        self.owner.freeze();
        Context { owner: self.owner }
    }

    /// The read view over the same live bag.
    pub fn as_context(&self) -> Context<'a> {
        Context { owner: self.owner }
    }

    /// Read passthrough; see [`Context::get`].
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_context().get(key)
    }

    /// Read passthrough; see [`Context::get_financial`].
    pub fn get_financial(&self, key: &str) -> FaultResult<Money> {
        self.as_context().get_financial(key)
    }

    /// Read passthrough; see [`Context::contains`].
    pub fn contains(&self, key: &str) -> bool {
        self.as_context().contains(key)
    }
}
