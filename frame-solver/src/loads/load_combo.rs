//! Load combinations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Add, Mul};

use crate::error::{FrameError, FrameResult};
use crate::results::GroupResult;

/// A load combination: an expression over load-group results
///
/// Leaves name a load group. `Sum` and `Scale` are linear; the envelopes take
/// the value-wise maximum / minimum of their operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    Case(String),
    Sum(Vec<Combination>),
    Scale(f64, Box<Combination>),
    EnvelopeMax(Vec<Combination>),
    EnvelopeMin(Vec<Combination>),
}

impl Combination {
    /// Reference a single load group
    pub fn case(name: &str) -> Self {
        Self::Case(name.to_string())
    }

    /// Factored sum of load groups, e.g. `[("DC", 1.25), ("LL", 1.75)]`
    pub fn factored(factors: &[(&str, f64)]) -> Self {
        Self::Sum(
            factors
                .iter()
                .map(|&(case, factor)| Self::case(case) * factor)
                .collect(),
        )
    }

    pub fn envelope_max(items: Vec<Combination>) -> Self {
        Self::EnvelopeMax(items)
    }

    pub fn envelope_min(items: Vec<Combination>) -> Self {
        Self::EnvelopeMin(items)
    }

    /// Names of all load groups the expression refers to
    pub fn cases(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_cases(&mut names);
        names
    }

    fn collect_cases<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Case(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::Scale(_, inner) => inner.collect_cases(names),
            Self::Sum(items) | Self::EnvelopeMax(items) | Self::EnvelopeMin(items) => {
                for item in items {
                    item.collect_cases(names);
                }
            }
        }
    }

    /// Evaluate the expression against the load-group results of a solution
    pub fn evaluate(&self, name: &str, groups: &[GroupResult]) -> FrameResult<GroupResult> {
        self.evaluate_with(name, &|case: &str| {
            groups
                .iter()
                .find(|group| group.name == case)
                .cloned()
                .ok_or_else(|| FrameError::UnknownLoadGroup(case.to_string()))
        })
    }

    /// Evaluate the expression with a custom lookup of load-group values
    pub fn evaluate_with<T: Combinable>(
        &self,
        name: &str,
        lookup: &dyn Fn(&str) -> FrameResult<T>,
    ) -> FrameResult<T> {
        match self {
            Self::Case(case) => Ok(lookup(case)?.map(name, |v| v)),
            Self::Scale(factor, inner) => {
                Ok(inner.evaluate_with(name, lookup)?.map(name, |v| v * factor))
            }
            Self::Sum(items) => fold(name, items, lookup, |a, b| a + b),
            Self::EnvelopeMax(items) => fold(name, items, lookup, f64::max),
            Self::EnvelopeMin(items) => fold(name, items, lookup, f64::min),
        }
    }
}

/// Values that can be combined by load combinations
pub trait Combinable: Sized {
    /// Combine two values entry by entry
    fn zip_with(&self, other: &Self, name: &str, f: impl Fn(f64, f64) -> f64) -> FrameResult<Self>;

    /// Apply `f` to every entry
    fn map(&self, name: &str, f: impl Fn(f64) -> f64) -> Self;
}

fn fold<T: Combinable>(
    name: &str,
    items: &[Combination],
    lookup: &dyn Fn(&str) -> FrameResult<T>,
    f: impl Fn(f64, f64) -> f64 + Copy,
) -> FrameResult<T> {
    let (first, rest) = items.split_first().ok_or_else(|| {
        FrameError::InputConsistency(format!("combination '{}' has an empty operand list", name))
    })?;
    let mut acc = first.evaluate_with(name, lookup)?;
    for item in rest {
        acc = acc.zip_with(&item.evaluate_with(name, lookup)?, name, f)?;
    }
    Ok(acc)
}

impl Add for Combination {
    type Output = Combination;

    fn add(self, rhs: Combination) -> Combination {
        match self {
            Combination::Sum(mut items) => {
                items.push(rhs);
                Combination::Sum(items)
            }
            lhs => Combination::Sum(vec![lhs, rhs]),
        }
    }
}

impl Mul<f64> for Combination {
    type Output = Combination;

    fn mul(self, factor: f64) -> Combination {
        Combination::Scale(factor, Box::new(self))
    }
}

/// Named combinations, each evaluated at most once
#[derive(Debug, Clone, Default)]
pub struct CombinationCache {
    definitions: HashMap<String, Combination>,
    results: HashMap<String, GroupResult>,
}

impl CombinationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition (drops a cached result of the same name)
    pub fn define(&mut self, name: &str, combination: Combination) {
        self.results.remove(name);
        self.definitions.insert(name.to_string(), combination);
    }

    /// Evaluate the named combination, reusing a previous evaluation
    pub fn evaluate(&mut self, name: &str, groups: &[GroupResult]) -> FrameResult<&GroupResult> {
        if !self.results.contains_key(name) {
            let combination = self
                .definitions
                .get(name)
                .ok_or_else(|| FrameError::UnknownCombination(name.to_string()))?;
            let result = combination.evaluate(name, groups)?;
            log::debug!("Evaluated load combination '{}'", name);
            self.results.insert(name.to_string(), result);
        }
        self.results
            .get(name)
            .ok_or_else(|| FrameError::UnknownCombination(name.to_string()))
    }

    /// Whether the named combination has already been evaluated
    pub fn is_cached(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{Displacement, InternalForce, Reaction};
    use approx::assert_relative_eq;

    fn group(name: &str, m: f64) -> GroupResult {
        GroupResult {
            name: name.to_string(),
            displacements: vec![vec![Displacement::new(0.0, m / 10.0, 0.0)]],
            internal_forces: vec![vec![InternalForce::new(0.0, 0.0, m)]],
            support_reactions: vec![Reaction::new(0, [0.0, m, 0.0])],
            spring_reactions: vec![],
        }
    }

    fn groups() -> Vec<GroupResult> {
        vec![group("DC", 10.0), group("LL", -4.0)]
    }

    #[test]
    fn test_factored_sum() {
        let combo = Combination::factored(&[("DC", 1.25), ("LL", 1.75)]);
        let result = combo.evaluate("STR-I", &groups()).unwrap();
        assert_eq!(result.name, "STR-I");
        assert_relative_eq!(result.internal_forces[0][0].m, 12.5 - 7.0);
        assert_relative_eq!(result.support_reactions[0].fy, 12.5 - 7.0);
    }

    #[test]
    fn test_operators_build_sum() {
        let combo = Combination::case("DC") + Combination::case("LL") * 2.0;
        let result = combo.evaluate("c", &groups()).unwrap();
        assert_relative_eq!(result.internal_forces[0][0].m, 2.0);
    }

    #[test]
    fn test_envelopes() {
        let items = vec![Combination::case("DC"), Combination::case("LL")];
        let max = Combination::envelope_max(items.clone()).evaluate("max", &groups()).unwrap();
        let min = Combination::envelope_min(items).evaluate("min", &groups()).unwrap();
        assert_relative_eq!(max.internal_forces[0][0].m, 10.0);
        assert_relative_eq!(min.internal_forces[0][0].m, -4.0);
    }

    #[test]
    fn test_unknown_case() {
        let err = Combination::case("WS").evaluate("c", &groups()).unwrap_err();
        assert!(matches!(err, FrameError::UnknownLoadGroup(name) if name == "WS"));
    }

    #[test]
    fn test_cache_evaluates_once() {
        let mut cache = CombinationCache::new();
        cache.define("c", Combination::case("DC") * 2.0);
        assert!(!cache.is_cached("c"));
        let m = cache.evaluate("c", &groups()).unwrap().internal_forces[0][0].m;
        assert_relative_eq!(m, 20.0);
        assert!(cache.is_cached("c"));
        assert!(matches!(
            cache.evaluate("missing", &groups()),
            Err(FrameError::UnknownCombination(_))
        ));
    }

    #[test]
    fn test_serde_shape() {
        let combo: Combination =
            serde_json::from_str(r#"{"sum": [{"case": "DC"}, {"scale": [1.5, {"case": "LL"}]}]}"#)
                .unwrap();
        assert_eq!(combo.cases(), vec!["DC", "LL"]);
    }
}
