// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Symbolic `@group`, `@binding` and `@location` names are replaced by dense indices.
// Indices are handed out in order of first appearance: the first group seen is 0,
// the first binding seen within a group is 0, and so on. A name seen again gets
// the index it got the first time.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

/// Dense indices for bind groups and the bindings inside each group.
#[derive(Clone, Debug, Default)]
pub struct BindingResolver {
    groups: IndexMap<SmolStr, IndexSet<SmolStr>>,
}

impl BindingResolver {
    pub fn new() -> BindingResolver {
        BindingResolver::default()
    }

    /// Return `(group index, binding index)`, allocating indices for names not seen before.
    pub fn resolve(&mut self, group: &str, binding: &str) -> (u32, u32) {
        let entry = self.groups.entry(SmolStr::new(group));
        let group_index = entry.index();
        let (binding_index, _) = entry.or_default().insert_full(SmolStr::new(binding));
        (group_index as u32, binding_index as u32)
    }

    pub fn group_index(&self, group: &str) -> Option<u32> {
        self.groups.get_index_of(group).map(|index| index as u32)
    }

    pub fn binding_index(&self, group: &str, binding: &str) -> Option<u32> {
        self.groups
            .get(group)?
            .get_index_of(binding)
            .map(|index| index as u32)
    }

    pub fn number_of_groups(&self) -> usize {
        self.groups.len()
    }
}

/// Dense `@location` indices, counted separately for each struct or function.
#[derive(Clone, Debug, Default)]
pub struct LocationResolver {
    owners: IndexMap<SmolStr, IndexSet<SmolStr>>,
}

impl LocationResolver {
    pub fn new() -> LocationResolver {
        LocationResolver::default()
    }

    pub fn resolve(&mut self, owner: &str, location: &str) -> u32 {
        let (index, _) = self
            .owners
            .entry(SmolStr::new(owner))
            .or_default()
            .insert_full(SmolStr::new(location));
        index as u32
    }

    pub fn location_index(&self, owner: &str, location: &str) -> Option<u32> {
        self.owners
            .get(owner)?
            .get_index_of(location)
            .map(|index| index as u32)
    }
}

#[test]
fn test_binding_indices_are_dense() {
    let mut resolver = BindingResolver::new();
    assert_eq!(resolver.resolve("G", "B0"), (0, 0));
    assert_eq!(resolver.resolve("G", "B1"), (0, 1));
    assert_eq!(resolver.resolve("H", "B0"), (1, 0));
    assert_eq!(resolver.resolve("G", "B0"), (0, 0));
    assert_eq!(resolver.number_of_groups(), 2);
    assert_eq!(resolver.binding_index("H", "B0"), Some(0));
    assert_eq!(resolver.binding_index("H", "B1"), None);
}

#[test]
fn test_locations_per_owner() {
    let mut resolver = LocationResolver::new();
    assert_eq!(resolver.resolve("VertexOut", "color"), 0);
    assert_eq!(resolver.resolve("VertexOut", "uv"), 1);
    assert_eq!(resolver.resolve("main", "color"), 0);
    assert_eq!(resolver.location_index("VertexOut", "uv"), Some(1));
}
