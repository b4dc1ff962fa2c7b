//! @ai:module:intent Execution keys and skip rules in canonical bench:vm:variant form
//! @ai:module:layer domain
//! @ai:module:public_api Key, SkipRule, RulePart, WILDCARD
//! @ai:module:stateless true

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token matching any value in a skip rule position.
pub const WILDCARD: &str = "*";

const SEPARATOR: char = ':';

/// @ai:intent Split a key string into exactly three components
/// @ai:pre none
/// @ai:post Ok result has exactly 3 elements
/// @ai:example ("nbody:CPython:default-python") -> ["nbody", "CPython", "default-python"]
/// @ai:example ("nbody:CPython") -> Err(MalformedKey)
/// @ai:effects pure
fn split_triple(s: &str) -> Result<[&str; 3]> {
    let parts: Vec<&str> = s.split(SEPARATOR).collect();

    match parts.as_slice() {
        [bench, vm, variant] => Ok([*bench, *vm, *variant]),
        _ => Err(HarnessError::MalformedKey {
            key: s.to_string(),
            components: parts.len(),
        }),
    }
}

/// @ai:intent One (benchmark, vm, variant) combination, the unit of scheduling
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    benchmark: String,
    vm: String,
    variant: String,
}

impl Key {
    /// @ai:intent Build a key from its components
    /// @ai:pre no component contains ':'
    /// @ai:effects pure
    pub fn new(
        benchmark: impl Into<String>,
        vm: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            benchmark: benchmark.into(),
            vm: vm.into(),
            variant: variant.into(),
        }
    }

    /// @ai:intent Parse a key from "bench:vm:variant"
    /// @ai:effects pure
    pub fn parse(s: &str) -> Result<Self> {
        let [benchmark, vm, variant] = split_triple(s)?;
        Ok(Self::new(benchmark, vm, variant))
    }

    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    pub fn vm(&self) -> &str {
        &self.vm
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// @ai:intent Components in positional order
    /// @ai:effects pure
    pub fn components(&self) -> [&str; 3] {
        [self.benchmark.as_str(), self.vm.as_str(), self.variant.as_str()]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.benchmark, self.vm, self.variant)
    }
}

impl FromStr for Key {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Key {
    type Error = HarnessError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// @ai:intent A single position of a skip rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RulePart {
    Any,
    Exact(String),
}

impl RulePart {
    fn parse(s: &str) -> Self {
        if s == WILDCARD {
            RulePart::Any
        } else {
            RulePart::Exact(s.to_string())
        }
    }

    /// @ai:intent Check whether this position accepts a key component
    /// @ai:effects pure
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            RulePart::Any => true,
            RulePart::Exact(expected) => expected == value,
        }
    }
}

impl fmt::Display for RulePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulePart::Any => f.write_str(WILDCARD),
            RulePart::Exact(s) => f.write_str(s),
        }
    }
}

/// @ai:intent Wildcard-capable pattern over the three key positions
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkipRule {
    parts: [RulePart; 3],
}

impl SkipRule {
    /// @ai:intent Parse a rule such as "*:CPython:*"
    /// @ai:example ("bench:*:variant") -> middle position is a wildcard
    /// @ai:effects pure
    pub fn parse(s: &str) -> Result<Self> {
        let [bench, vm, variant] = split_triple(s)?;

        Ok(Self {
            parts: [
                RulePart::parse(bench),
                RulePart::parse(vm),
                RulePart::parse(variant),
            ],
        })
    }

    pub fn parts(&self) -> &[RulePart; 3] {
        &self.parts
    }
}

impl fmt::Display for SkipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.parts[0], self.parts[1], self.parts[2])
    }
}

impl FromStr for SkipRule {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SkipRule {
    type Error = HarnessError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<SkipRule> for String {
    fn from(rule: SkipRule) -> Self {
        rule.to_string()
    }
}
