use crate::adapter::Adapter;
use crate::ast::{Statement, StatementKind};

use super::evaluator::{EvalError, EvalResult, Evaluator};
use super::value::Value;

impl<'a, A: Adapter> Evaluator<'a, A> {
    pub fn eval_block(&mut self, statements: &[Statement]) -> EvalResult<()> {
        for statement in statements {
            self.eval_statement(statement)?;
        }
        Ok(())
    }

    pub fn eval_statement(&mut self, statement: &Statement) -> EvalResult<()> {
        tracing::debug!(line = statement.line(), token = %statement.token, "exec statement");
        match &statement.kind {
            StatementKind::ForLoop {
                variable,
                collection,
                body,
            } => self.eval_for(variable, collection, body),
            StatementKind::While { condition, body } => {
                while self.eval_expression(condition)?.is_truthy() {
                    self.eval_block(body)?;
                }
                Ok(())
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expression(condition)?.is_truthy() {
                    self.eval_block(then_branch)
                } else {
                    self.eval_block(else_branch)
                }
            }
            StatementKind::Assignment { variable, value }
            | StatementKind::SetReturn {
                function: variable,
                value,
            } => {
                let value = self.eval_expression(value)?;
                self.context.scope_mut().set(variable.clone(), value);
                Ok(())
            }
            StatementKind::Call(call) => self.eval_call(call, statement.line()).map(|_| ()),
            StatementKind::Print(expression) => {
                let value = self.eval_expression(expression)?;
                self.print_nodes(&value, statement.line())
            }
            StatementKind::PrintText(text) => self.write_output(text, statement.line()),
        }
    }

    /// The loop variable is removed after every iteration and once more at
    /// the end, so it is unbound after the loop whatever it held before.
    fn eval_for(
        &mut self,
        variable: &str,
        collection: &crate::ast::Expression,
        body: &[Statement],
    ) -> EvalResult<()> {
        let collection = self.eval_expression(collection)?;
        for handle in collection {
            self.context
                .scope_mut()
                .set(variable, Value::singleton(handle));
            self.eval_block(body)?;
            self.context.scope_mut().remove(variable);
        }
        self.context.scope_mut().remove(variable);
        Ok(())
    }

    /// Writes the display form of every node in `value`. Null handles and
    /// nodes without attributes print nothing.
    fn print_nodes(&mut self, value: &Value<A::Node>, line: usize) -> EvalResult<()> {
        for node in value.iter().flatten() {
            if let Some(attributes) = self.adapter.attributes_of(node) {
                let text = attributes.to_display_string();
                self.write_output(&text, line)?;
                self.write_output("\n", line)?;
            }
        }
        Ok(())
    }

    fn write_output(&mut self, text: &str, line: usize) -> EvalResult<()> {
        self.output
            .write_all(text.as_bytes())
            .map_err(|source| EvalError::Output { line, source })
    }
}
