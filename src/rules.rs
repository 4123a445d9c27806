//! Attribute-aware topology rules.
//!
//! A rule set lists conditions under which an otherwise illegal relationship
//! between two features is accepted. A condition names an attribute and the
//! values that legalize the pair; it holds when *either* feature carries one of
//! those values. An empty condition list accepts nothing.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Feature attributes (GeoJSON `properties`)
pub type Attributes = Map<String, Value>;

/// `{ "attribute": "type", "values": ["bridge", "tunnel"] }`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttributeCondition {
    pub attribute: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl AttributeCondition {
    pub fn new(attribute: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            values,
        }
    }

    /// True if either feature's attribute value is one of the allowed values
    pub fn matches(&self, a: &Attributes, b: &Attributes) -> bool {
        self.matches_one(a) || self.matches_one(b)
    }

    fn matches_one(&self, attributes: &Attributes) -> bool {
        match attributes.get(&self.attribute) {
            Some(value) => self.values.iter().any(|allowed| values_equal(allowed, value)),
            None => false,
        }
    }
}

/// JSON equality, except numbers compare by value so `1` matches `1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Conditions legalizing intersections and overlaps for one dataset type
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RuleSet {
    #[serde(default)]
    pub allow_intersection_if: Vec<AttributeCondition>,
    #[serde(default)]
    pub allow_overlap_if: Vec<AttributeCondition>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.allow_intersection_if.is_empty() && self.allow_overlap_if.is_empty()
    }

    /// Whether two features may intersect
    pub fn allows_intersection(&self, a: &Attributes, b: &Attributes) -> bool {
        any_condition(&self.allow_intersection_if, a, b)
    }

    /// Whether two features may overlap
    pub fn allows_overlap(&self, a: &Attributes, b: &Attributes) -> bool {
        any_condition(&self.allow_overlap_if, a, b)
    }

    pub fn validate(&self) -> Result<()> {
        let all = self
            .allow_intersection_if
            .iter()
            .map(|c| ("allow_intersection_if", c))
            .chain(self.allow_overlap_if.iter().map(|c| ("allow_overlap_if", c)));

        for (list, condition) in all {
            if condition.attribute.trim().is_empty() {
                anyhow::bail!("{}: condition has an empty attribute name", list);
            }
        }
        Ok(())
    }
}

fn any_condition(conditions: &[AttributeCondition], a: &Attributes, b: &Attributes) -> bool {
    conditions.iter().any(|condition| condition.matches(a, b))
}
