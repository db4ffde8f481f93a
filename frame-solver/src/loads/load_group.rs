//! Load groups - one right-hand side column of the solve

use serde::{Deserialize, Serialize};

use super::{DistributedLoad, FunctionalLoad, InitialDisplacement, NodalLoad, PointLoad};

/// A named collection of loads solved together as one load case
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadGroup {
    /// Name used by load combinations (defaults to `G<index>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodal: Vec<NodalLoad>,
    #[serde(default)]
    pub point: Vec<PointLoad>,
    #[serde(default)]
    pub distributed: Vec<DistributedLoad>,
    #[serde(skip)]
    pub functions: Vec<FunctionalLoad>,
    #[serde(default)]
    pub initial_displacements: Vec<InitialDisplacement>,
}

impl LoadGroup {
    /// Create a new unnamed load group
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named load group
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_nodal(mut self, load: NodalLoad) -> Self {
        self.nodal.push(load);
        self
    }

    pub fn with_point(mut self, load: PointLoad) -> Self {
        self.point.push(load);
        self
    }

    pub fn with_distributed(mut self, load: DistributedLoad) -> Self {
        self.distributed.push(load);
        self
    }

    pub fn with_function(mut self, load: FunctionalLoad) -> Self {
        self.functions.push(load);
        self
    }

    pub fn with_initial_displacement(mut self, displacement: InitialDisplacement) -> Self {
        self.initial_displacements.push(displacement);
        self
    }

    /// Name of the group at position `index` in the model
    pub fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("G{}", index))
    }

    /// Check whether the group carries any load at all
    pub fn is_empty(&self) -> bool {
        self.nodal.is_empty()
            && self.point.is_empty()
            && self.distributed.is_empty()
            && self.functions.is_empty()
            && self.initial_displacements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label_uses_index() {
        assert_eq!(LoadGroup::new().label(3), "G3");
        assert_eq!(LoadGroup::named("DC").label(3), "DC");
    }

    #[test]
    fn test_deserialize_partial_group() {
        let group: LoadGroup =
            serde_json::from_str(r#"{"nodal": [{"node": 1, "fy": -10.0}]}"#).unwrap();
        assert_eq!(group.nodal, vec![NodalLoad::new(1, 0.0, -10.0, 0.0)]);
        assert!(group.point.is_empty());
        assert!(!group.is_empty());
    }
}
