use std::collections::BTreeMap;
use std::fmt;

use crate::adapter::Adapter;
use crate::ast::InvariantViolation;

use super::value::Value;

/// Variable bindings of one rule invocation.
///
/// A rule's own id lives here too: it is the slot its return value
/// accumulates in.
#[derive(Debug, Clone)]
pub struct VariableSet<N> {
    variables: BTreeMap<String, Value<N>>,
}

impl<N> Default for VariableSet<N> {
    fn default() -> Self {
        Self {
            variables: BTreeMap::new(),
        }
    }
}

impl<N: Clone + fmt::Debug> VariableSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value<N>> {
        self.variables.get(name)
    }

    /// Binds `name`, replacing any earlier binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value<N>) {
        self.variables.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value<N>> {
        self.variables.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// `( name {display ...} ... )`, with `0` standing for a null handle.
    pub fn render<A>(&self, adapter: &A) -> String
    where
        A: Adapter<Node = N>,
    {
        let mut rendered = String::from("(");
        for (name, value) in &self.variables {
            rendered.push(' ');
            rendered.push_str(name);
            rendered.push_str(" {");
            for handle in value.iter() {
                rendered.push(' ');
                match handle {
                    None => rendered.push('0'),
                    Some(node) => match adapter.attributes_of(node) {
                        Some(attributes) => rendered.push_str(&attributes.to_display_string()),
                        None => rendered.push_str(&format!("{:?}", node)),
                    },
                }
            }
            if !value.is_empty() {
                rendered.push(' ');
            }
            rendered.push('}');
        }
        rendered.push_str(" )");
        rendered
    }
}

/// The active scope plus the suspended scopes of every caller.
#[derive(Debug, Clone)]
pub struct ExecutionContext<N> {
    scope: VariableSet<N>,
    call_stack: Vec<VariableSet<N>>,
}

impl<N> Default for ExecutionContext<N> {
    fn default() -> Self {
        Self {
            scope: VariableSet::default(),
            call_stack: Vec::new(),
        }
    }
}

impl<N: Clone + fmt::Debug> ExecutionContext<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(&self) -> &VariableSet<N> {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut VariableSet<N> {
        &mut self.scope
    }

    /// Fresh scope for a top-level execution.
    pub fn reset(&mut self) {
        self.scope = VariableSet::new();
        self.call_stack.clear();
    }

    /// Suspends the current scope and makes `callee` active.
    pub fn push_call(&mut self, callee: VariableSet<N>) {
        let caller = std::mem::replace(&mut self.scope, callee);
        self.call_stack.push(caller);
    }

    /// Reinstates the caller's scope and hands back the callee's.
    pub fn pop_call(&mut self, line: usize) -> Result<VariableSet<N>, InvariantViolation> {
        let caller = self
            .call_stack
            .pop()
            .ok_or(InvariantViolation::CallStackUnderflow { line })?;
        Ok(std::mem::replace(&mut self.scope, caller))
    }

    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }
}
