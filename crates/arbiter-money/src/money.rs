//! The financial value contract and its reference implementation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use arbiter_fault::{ErrorCode, Fault, FaultResult};
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;

/// Conventional metadata key for the currency tag. No vocabulary is enforced;
/// compatibility policy belongs to the host.
pub const CURRENCY: &str = "currency";

/// The contract every financial value must satisfy.
///
/// The kernel reads amounts exclusively through this contract. Implementors
/// must keep equality and ordering scale-insensitive — `1.0` and `1.00` are
/// the same amount — which [`Decimal`] guarantees by construction.
pub trait FinancialValue {
    /// The underlying decimal amount.
    ///
    /// Mainly for arithmetic at the host boundary; rule logic should prefer
    /// the sign helpers below.
    fn decimal(&self) -> &Decimal;

    /// Auxiliary tag attached to the amount (e.g. [`CURRENCY`]).
    fn metadata(&self, key: &str) -> Option<&str>;

    /// Whether the two values may legally meet in one computation.
    ///
    /// The default accepts everything; strict currency or unit enforcement is
    /// the provider's responsibility.
    fn is_compatible(&self, _other: &dyn FinancialValue) -> bool {
        true
    }

    fn is_zero(&self) -> bool {
        self.decimal().signum() == 0
    }

    fn is_positive(&self) -> bool {
        self.decimal().signum() > 0
    }

    fn is_negative(&self) -> bool {
        self.decimal().signum() < 0
    }
}

/// Reference implementation of [`FinancialValue`].
///
/// Equality, ordering, and hashing follow the amount only; metadata is
/// descriptive and never influences identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl Money {
    pub fn new(amount: Decimal) -> Money {
        Money {
            amount,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata tag, builder style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Money {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Parse a textual amount into a financial value.
    ///
    /// Unparseable text is a logic fault carrying the raw input and the parse
    /// failure as diagnostic attributes.
    pub fn parse(raw: &str) -> FaultResult<Money> {
        let amount = raw.parse::<Decimal>().map_err(|parse_error| {
            Fault::logic(
                ErrorCode::TypeMismatch,
                "Value cannot be read as a financial amount",
            )
            .with_attribute("raw", raw)
            .with_attribute("reason", parse_error.to_string())
        })?;
        Ok(Money::new(amount))
    }

    pub fn amount(&self) -> &Decimal {
        &self.amount
    }
}

impl FinancialValue for Money {
    fn decimal(&self) -> &Decimal {
        &self.amount
    }

    fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Money) -> bool {
        self.amount == other.amount
    }
}

impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Money) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Money) -> Ordering {
        self.amount.cmp(&other.amount)
    }
}

impl Hash for Money {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.amount.hash(state);
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Money {
        Money::new(amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount)
    }
}
