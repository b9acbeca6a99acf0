use std::collections::BTreeMap;

use crate::ast::Function;

/// Loaded rules by id. Read-only while rules execute.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `function` unless its id is taken, in which case the existing
    /// definition stays and is returned.
    pub fn insert(&mut self, function: Function) -> Result<(), &Function> {
        use std::collections::btree_map::Entry;
        match self.functions.entry(function.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(function);
                Ok(())
            }
            Entry::Occupied(existing) => Err(existing.into_mut()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Function> {
        self.functions.get(id)
    }

    /// Sorted ids.
    pub fn ids(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
