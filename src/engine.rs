//! # Rule Engine
//!
//! The front-end a host embeds: load rule files into a function table, list
//! them, and execute entry rules against the host's tree.
//!
//! ```
//! use kensa::adapter::JsonTree;
//! use kensa::engine::{RuleEngine, RuleOutcome};
//!
//! let tree = JsonTree::from_json(r#"{ "root": { "type": "Module" } }"#).unwrap();
//! let mut engine = RuleEngine::with_output(tree, Vec::new());
//! engine.load_sources(&[("inline", "@Demo:\n@Demo = TRUE\nEND")]);
//! let outcomes = engine.execute(&["Demo"]).unwrap();
//! assert_eq!(outcomes, vec![RuleOutcome::Passed]);
//! ```

use std::fs;
use std::io::{self, Stdout, Write};
use std::path::Path;

use strum_macros::Display;
use thiserror::Error;

use crate::adapter::Adapter;
use crate::analyzer::parse_rules;
use crate::diagnostics::{Diagnostic, Reporter};
use crate::eval::{EvalError, Evaluator};
use crate::function_table::FunctionTable;
use crate::tokenizer::token::Tokenizer;
use crate::{Error, InternalResult};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read rule file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Function \"{id}\" in {path} @Line: {line} is already defined @Line: {previous_line}; keeping the first definition")]
    DuplicateFunction {
        id: String,
        path: String,
        line: usize,
        previous_line: usize,
    },
}

/// What one `load` call produced.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Ids added to the function table, in load order.
    pub loaded: Vec<String>,
    /// Every problem met; none of them stopped the remaining files.
    pub errors: Vec<Error>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RuleOutcome {
    Passed,
    Failed,
    /// Unknown, parameterized, or aborted by a runtime error.
    NotExecuted,
}

impl RuleOutcome {
    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn was_executed(&self) -> bool {
        !matches!(self, Self::NotExecuted)
    }
}

pub struct RuleEngine<A: Adapter, W: Write = Stdout> {
    adapter: A,
    functions: FunctionTable,
    output: W,
    reporter: Reporter,
}

impl<A: Adapter> RuleEngine<A, Stdout> {
    pub fn new(adapter: A) -> Self {
        Self::with_output(adapter, io::stdout())
    }
}

impl<A: Adapter, W: Write> RuleEngine<A, W> {
    /// An engine whose `PRINT`/`PRINTS` output goes to `output`.
    pub fn with_output(adapter: A, output: W) -> Self {
        Self {
            adapter,
            functions: FunctionTable::new(),
            output,
            reporter: Reporter::new(),
        }
    }

    /// Forwards every diagnostic to `observer` as well as to `tracing`.
    pub fn with_observer(mut self, observer: impl Fn(&Diagnostic) + 'static) -> Self {
        self.reporter.set_observer(observer);
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Replaces the loaded rules with those of `paths`.
    ///
    /// An unreadable file or a syntax error only affects its own file. When
    /// two files define the same rule the first definition is kept.
    #[tracing::instrument(level = "info", skip_all, fields(files = paths.len()))]
    pub fn load<P: AsRef<Path>>(&mut self, paths: &[P]) -> LoadReport {
        self.functions.clear();
        let mut report = LoadReport::default();
        for path in paths {
            let path = path.as_ref();
            let name = path.display().to_string();
            match fs::read_to_string(path) {
                Ok(source) => self.add_source(&name, &source, &mut report),
                Err(source) => {
                    let error = LoadError::Unreadable { path: name, source };
                    self.reporter.error(error.to_string(), None);
                    report.errors.push(error.into());
                }
            }
        }
        tracing::info!(rules = self.functions.len(), "rules loaded");
        report
    }

    /// Like [`load`](Self::load) for in-memory `(name, source)` pairs.
    pub fn load_sources(&mut self, sources: &[(&str, &str)]) -> LoadReport {
        self.functions.clear();
        let mut report = LoadReport::default();
        for (name, source) in sources {
            self.add_source(name, source, &mut report);
        }
        tracing::info!(rules = self.functions.len(), "rules loaded");
        report
    }

    fn add_source(&mut self, path: &str, source: &str, report: &mut LoadReport) {
        let tokens = match Tokenizer::new().tokenize(source) {
            Ok(tokens) => tokens,
            Err(e) => {
                self.reporter
                    .error(format!("{}: {}", path, e), Some(e.line()));
                report.errors.push(e.into());
                return;
            }
        };

        let parsed = parse_rules(path, &tokens);
        for function in parsed.functions {
            let (id, line) = (function.id.clone(), function.line());
            match self.functions.insert(function) {
                Ok(()) => {
                    tracing::debug!(rule = %id, path, line, "rule added");
                    report.loaded.push(id);
                }
                Err(previous) => {
                    let error = LoadError::DuplicateFunction {
                        id,
                        path: path.to_string(),
                        line,
                        previous_line: previous.line(),
                    };
                    self.reporter.warning(error.to_string(), Some(line));
                    report.errors.push(error.into());
                }
            }
        }

        if let Some(error) = parsed.error {
            self.reporter.error(error.to_string(), Some(error.line));
            report.errors.push(error.into());
        }
    }

    /// Loaded rule ids, sorted.
    pub fn loaded_functions(&self) -> Vec<String> {
        self.functions.ids()
    }

    /// Runs each rule in `ids` independently, returning outcomes in the same
    /// order.
    ///
    /// A runtime error fails only the rule it occurred in. An interpreter
    /// invariant violation aborts the whole batch.
    #[tracing::instrument(level = "info", skip_all, fields(rules = ids.len()))]
    pub fn execute<S: AsRef<str>>(&mut self, ids: &[S]) -> InternalResult<Vec<RuleOutcome>> {
        let mut outcomes = Vec::with_capacity(ids.len());
        {
            let mut evaluator = Evaluator::new(
                &self.functions,
                &self.adapter,
                &mut self.output,
                &self.reporter,
            );
            for id in ids {
                let id = id.as_ref();
                let Some(function) = self.functions.get(id) else {
                    self.reporter
                        .error(format!("Rule \"{}\" is not loaded", id), None);
                    outcomes.push(RuleOutcome::NotExecuted);
                    continue;
                };
                if !function.is_entry_point() {
                    self.reporter.warning(
                        format!(
                            "Rule \"{}\" takes {} parameters and can only be called from another rule @Line: {}",
                            id,
                            function.parameters.len(),
                            function.line()
                        ),
                        Some(function.line()),
                    );
                    outcomes.push(RuleOutcome::NotExecuted);
                    continue;
                }

                tracing::info!(rule = id, "executing rule");
                let outcome = match evaluator.run(function) {
                    Ok(value) if value.is_truthy() => RuleOutcome::Passed,
                    Ok(_) => RuleOutcome::Failed,
                    Err(EvalError::Invariant(violation)) => {
                        self.reporter
                            .error(violation.to_string(), Some(violation.line()));
                        return Err(Error::Invariant(violation));
                    }
                    Err(e) => {
                        self.reporter
                            .error(format!("RUNTIME ERROR: {}", e), Some(e.line()));
                        RuleOutcome::NotExecuted
                    }
                };
                tracing::info!(rule = id, %outcome, "rule finished");
                outcomes.push(outcome);
            }
        }
        self.output.flush()?;
        Ok(outcomes)
    }
}
