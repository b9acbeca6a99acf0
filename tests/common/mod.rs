#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use kensa::{adapter::JsonTree, Diagnostic, RuleEngine};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn project_tree() -> JsonTree {
    JsonTree::from_file(fixture("project.json")).expect("fixture tree")
}

pub type Diagnostics = Rc<RefCell<Vec<Diagnostic>>>;

/// An engine writing to memory, with every diagnostic collected.
pub fn engine() -> (RuleEngine<JsonTree, Vec<u8>>, Diagnostics) {
    let diagnostics: Diagnostics = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&diagnostics);
    let engine = RuleEngine::with_output(project_tree(), Vec::new())
        .with_observer(move |d| sink.borrow_mut().push(d.clone()));
    (engine, diagnostics)
}

pub fn output_of(engine: &RuleEngine<JsonTree, Vec<u8>>) -> String {
    String::from_utf8_lossy(engine.output()).into_owned()
}
