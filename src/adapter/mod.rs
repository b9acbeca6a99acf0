//! # Host Adapter
//!
//! The evaluator never touches the host's syntax tree directly. Every question
//! a rule asks about it goes through [`Adapter`], and node properties come back
//! as [`Attributes`]. Node handles are opaque to the engine: they are cloned
//! into values and handed back to the adapter, never inspected.

use std::fmt;

pub mod json_tree;

pub use json_tree::JsonTree;

/// Read-only query interface over the host's syntax tree.
#[mockall::automock(type Node = u32;)]
pub trait Adapter {
    type Node: Clone + fmt::Debug;

    /// Ancestors of `node`, nearest first.
    fn parents_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn nodes_of_type(&self, type_name: &str) -> Vec<Self::Node>;

    /// Nodes related to `node` through the host's custom condition relation.
    fn conditions_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// `None` when the node carries no attributes at all.
    fn attributes_of(&self, node: &Self::Node) -> Option<Box<dyn Attributes>>;

    fn type_exists(&self, type_name: &str) -> bool;
}

/// Named string properties of one node.
#[mockall::automock]
pub trait Attributes {
    fn has(&self, name: &str) -> bool;

    fn value_of(&self, name: &str) -> String;

    /// Human readable form, used by `PRINT` and in traces.
    fn to_display_string(&self) -> String;
}
