//! Flat storage item model shared by every table store.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A stored item: attribute name to scalar value.
pub type Item = BTreeMap<String, AttributeValue>;

/// Scalar attribute value as the key-value store sees it.
///
/// Numbers are carried as decimal text so no precision is lost between the
/// record layer and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    Bool(bool),
    Null,
}

impl AttributeValue {
    /// String payload, if this is an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(value) => Some(value),
            _ => None,
        }
    }

    /// Order two values of the same type; mixed types are unordered.
    fn compare(&self, other: &AttributeValue) -> Option<Ordering> {
        match (self, other) {
            (AttributeValue::S(left), AttributeValue::S(right)) => Some(left.cmp(right)),
            (AttributeValue::N(left), AttributeValue::N(right)) => {
                let left = left.parse::<f64>().ok()?;
                let right = right.parse::<f64>().ok()?;
                left.partial_cmp(&right)
            }
            (AttributeValue::Bool(left), AttributeValue::Bool(right)) => Some(left.cmp(right)),
            (AttributeValue::Null, AttributeValue::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::S(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::S(value)
    }
}

/// Primary key of a single-attribute (partition key only) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub attribute: String,
    pub value: String,
}

impl Key {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Extract this key's shape from an item, if the item carries it.
    pub fn of_item(attribute: &str, item: &Item) -> Option<Self> {
        item.get(attribute)
            .and_then(AttributeValue::as_s)
            .map(|value| Key::new(attribute, value))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// Filter predicate evaluated against a single item.
///
/// A missing attribute never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals {
        attribute: String,
        value: AttributeValue,
    },
    AtLeast {
        attribute: String,
        value: AttributeValue,
    },
    AtMost {
        attribute: String,
        value: AttributeValue,
    },
    Contains {
        attribute: String,
        value: String,
    },
}

impl Condition {
    pub fn equals(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Condition::Equals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn at_least(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Condition::AtLeast {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn at_most(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Condition::AtMost {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Contains {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Attribute this condition reads.
    pub fn attribute(&self) -> &str {
        match self {
            Condition::Equals { attribute, .. }
            | Condition::AtLeast { attribute, .. }
            | Condition::AtMost { attribute, .. }
            | Condition::Contains { attribute, .. } => attribute,
        }
    }

    /// Evaluate the condition against an item.
    pub fn matches(&self, item: &Item) -> bool {
        let Some(actual) = item.get(self.attribute()) else {
            return false;
        };
        match self {
            Condition::Equals { value, .. } => actual == value,
            Condition::AtLeast { value, .. } => matches!(
                actual.compare(value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Condition::AtMost { value, .. } => matches!(
                actual.compare(value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Condition::Contains { value, .. } => actual
                .as_s()
                .is_some_and(|actual| actual.contains(value.as_str())),
        }
    }
}

/// Whether every condition matches the item.
pub fn matches_all(conditions: &[Condition], item: &Item) -> bool {
    conditions.iter().all(|condition| condition.matches(item))
}

#[cfg(test)]
mod tests {
    use super::{AttributeValue, Condition, Item, matches_all};

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn conditions_compare_strings_lexicographically() {
        let row = item(&[("timestamp", "2025-01-02T10:00:00.000Z".into())]);
        assert!(Condition::at_least("timestamp", "2025-01-02T00:00:00.000Z").matches(&row));
        assert!(Condition::at_most("timestamp", "2025-01-02T10:00:00.000Z").matches(&row));
        assert!(!Condition::at_most("timestamp", "2025-01-01T23:59:59.999Z").matches(&row));
    }

    #[test]
    fn conditions_compare_numbers_numerically() {
        let row = item(&[("weight", AttributeValue::N("9.5".to_string()))]);
        assert!(!Condition::at_least("weight", AttributeValue::N("10".to_string())).matches(&row));
        assert!(Condition::at_most("weight", AttributeValue::N("10".to_string())).matches(&row));
    }

    #[test]
    fn missing_attributes_and_mixed_types_never_match() {
        let row = item(&[("name", "Greek Yogurt".into())]);
        assert!(Condition::contains("name", "Yogurt").matches(&row));
        assert!(!Condition::contains("category", "x").matches(&row));
        assert!(!Condition::at_least("name", AttributeValue::N("1".to_string())).matches(&row));
        assert!(matches_all(&[], &row));
        assert!(!matches_all(
            &[
                Condition::contains("name", "Yogurt"),
                Condition::equals("name", "Skyr"),
            ],
            &row
        ));
    }
}
