use crate::adapter::Adapter;
use crate::ast::{AttributeOperand, Call, ConditionalBlock, Expression, ExpressionKind, Function};

use super::context::VariableSet;
use super::evaluator::{EvalError, EvalResult, Evaluator};
use super::value::Value;

impl<'a, A: Adapter> Evaluator<'a, A> {
    pub fn eval_expression(&mut self, expression: &Expression) -> EvalResult<Value<A::Node>> {
        let line = expression.line();
        match &expression.kind {
            ExpressionKind::True => Ok(Value::truth()),
            ExpressionKind::False => Ok(Value::empty()),
            ExpressionKind::Variable(name) => self.lookup(name, line).cloned(),
            ExpressionKind::Not(inner) => Ok(self.eval_expression(inner)?.negate()),
            ExpressionKind::NullCheck(name) => {
                Ok(Value::from_bool(self.lookup(name, line)?.is_empty()))
            }
            ExpressionKind::Conditional(block) => self.eval_conditional(block),
            ExpressionKind::Parent(inner) => {
                let value = self.eval_expression(inner)?;
                Ok(match value.first() {
                    Some(Some(node)) => Value::from_nodes(self.adapter.parents_of(node)),
                    _ => Value::empty(),
                })
            }
            ExpressionKind::ConditionsOf(inner) => {
                let value = self.eval_expression(inner)?;
                let operation = expression.token.text.clone();
                match value.first() {
                    None => Err(EvalError::EmptyOperand { operation, line }),
                    Some(None) => Err(EvalError::NullReference { operation, line }),
                    Some(Some(node)) => Ok(Value::from_nodes(self.adapter.conditions_of(node))),
                }
            }
            ExpressionKind::NodesOfType(type_name) => {
                if !self.adapter.type_exists(type_name) {
                    return Err(EvalError::UnknownNodeType {
                        operation: expression.token.text.clone(),
                        type_name: type_name.clone(),
                        line,
                    });
                }
                Ok(Value::from_nodes(self.adapter.nodes_of_type(type_name)))
            }
            ExpressionKind::Call(call) => self.eval_call(call, line),
            ExpressionKind::AttributeCheck {
                variable,
                attribute,
                literal,
                check,
            } => {
                let value = self.attribute_value(variable, attribute, line)?;
                let passed = if check.is_numeric() {
                    let left = parse_number(&value, variable, attribute, line)?;
                    let right = literal.parse().map_err(|_| EvalError::NumberOutOfRange {
                        literal: literal.clone(),
                        line,
                    })?;
                    check.compare_numbers(left, right)
                } else {
                    check.compare_text(&value, literal)
                };
                Ok(Value::from_bool(passed))
            }
            ExpressionKind::CompareAttribute { left, right, check } => {
                let left_text = self.operand_text(left, line)?;
                let right_text = self.operand_text(right, line)?;
                tracing::debug!(left = %left_text, right = %right_text, %check, "compare attributes");
                let passed = if check.is_numeric() {
                    let l = parse_number(&left_text, &left.variable, &left.attribute, line)?;
                    let r = parse_number(&right_text, &right.variable, &right.attribute, line)?;
                    check.compare_numbers(l, r)
                } else {
                    check.compare_text(&left_text, &right_text)
                };
                Ok(Value::from_bool(passed))
            }
        }
    }

    /// AND and OR groups evaluate every member before combining.
    fn eval_conditional(&mut self, block: &ConditionalBlock) -> EvalResult<Value<A::Node>> {
        match block {
            ConditionalBlock::Atom(member) => self.eval_expression(member),
            ConditionalBlock::All(members) => {
                let mut all = true;
                for member in members {
                    all &= self.eval_expression(member)?.is_truthy();
                }
                Ok(Value::from_bool(all))
            }
            ConditionalBlock::Any(members) => {
                let mut any = false;
                for member in members {
                    any |= self.eval_expression(member)?.is_truthy();
                }
                Ok(Value::from_bool(any))
            }
        }
    }

    /// Invokes a rule with arguments evaluated in the caller's scope.
    ///
    /// An unknown rule or a wrong argument count is an error of the caller.
    /// Recoverable errors raised while evaluating the arguments or running the
    /// callee stop at this boundary: they are reported and the call yields an
    /// empty value.
    pub(super) fn eval_call(&mut self, call: &Call, line: usize) -> EvalResult<Value<A::Node>> {
        let functions = self.functions;
        let function = functions
            .get(&call.function)
            .ok_or_else(|| EvalError::UndefinedFunction {
                name: call.function.clone(),
                line,
            })?;
        if function.parameters.len() != call.arguments.len() {
            return Err(EvalError::ArityMismatch {
                name: call.function.clone(),
                given: call.arguments.len(),
                expected: function.parameters.len(),
                line,
            });
        }

        let outcome = self
            .bind_arguments(function, call)
            .and_then(|callee| self.invoke(function, callee, line));
        match outcome {
            Ok(value) => Ok(value),
            Err(error) if error.is_recoverable() => {
                self.reporter
                    .error(format!("RUNTIME ERROR: {}", error), Some(error.line()));
                Ok(Value::empty())
            }
            Err(error) => Err(error),
        }
    }

    fn bind_arguments(
        &mut self,
        function: &Function,
        call: &Call,
    ) -> EvalResult<VariableSet<A::Node>> {
        let mut callee = VariableSet::new();
        for (parameter, argument) in function.parameters.iter().zip(&call.arguments) {
            let value = self.eval_expression(argument)?;
            callee.set(parameter.clone(), value);
        }
        Ok(callee)
    }

    /// Runs `function` in the `callee` scope. The caller's scope is restored
    /// whether or not the body succeeds.
    fn invoke(
        &mut self,
        function: &Function,
        callee: VariableSet<A::Node>,
        line: usize,
    ) -> EvalResult<Value<A::Node>> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                rule = %function.id,
                caller = %self.context.scope().render(self.adapter),
                arguments = %callee.render(self.adapter),
                "call"
            );
        }
        self.context.push_call(callee);
        let outcome = self.eval_function(function);
        let callee = self.context.pop_call(line)?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(rule = %function.id, callee = %callee.render(self.adapter), "return");
        }
        outcome
    }

    fn lookup(&self, name: &str, line: usize) -> EvalResult<&Value<A::Node>> {
        self.context
            .scope()
            .get(name)
            .ok_or_else(|| EvalError::UndefinedVariable {
                name: name.to_string(),
                line,
            })
    }

    /// Named attribute of the first node bound to `variable`.
    fn attribute_value(&self, variable: &str, attribute: &str, line: usize) -> EvalResult<String> {
        let node = match self.lookup(variable, line)?.first() {
            None => {
                return Err(EvalError::EmptyValue {
                    name: variable.to_string(),
                    line,
                })
            }
            Some(node) => node.clone(),
        };
        let attributes = node
            .and_then(|node| self.adapter.attributes_of(&node))
            .ok_or_else(|| EvalError::NoAttributes {
                name: variable.to_string(),
                line,
            })?;
        if !attributes.has(attribute) {
            return Err(EvalError::MissingAttribute {
                name: variable.to_string(),
                attribute: attribute.to_string(),
                line,
            });
        }
        Ok(attributes.value_of(attribute))
    }

    fn operand_text(&self, operand: &AttributeOperand, line: usize) -> EvalResult<String> {
        let value = self.attribute_value(&operand.variable, &operand.attribute, line)?;
        Ok(format!("{}{}{}", operand.prefix, value, operand.postfix))
    }
}

fn parse_number(text: &str, variable: &str, attribute: &str, line: usize) -> EvalResult<i64> {
    text.trim().parse().map_err(|_| EvalError::NotANumber {
        name: variable.to_string(),
        attribute: attribute.to_string(),
        value: text.to_string(),
        line,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adapter::{JsonTree, MockAdapter};
    use crate::analyzer::parse_rules;
    use crate::diagnostics::{Diagnostic, Reporter};
    use crate::function_table::FunctionTable;
    use crate::tokenizer::token::Tokenizer;

    const TREE: &str = r#"{
        "types": ["Module", "Function", "Comment", "Macro"],
        "root": {
            "type": "Module",
            "id": "m",
            "attributes": { "name": "main" },
            "children": [
                { "type": "Function", "id": "f1", "conditions": ["f2"],
                  "attributes": { "name": "run", "lines": "12" } },
                { "type": "Function", "id": "f2", "attributes": { "name": "stop", "lines": " 3" } },
                { "type": "Function", "id": "f3", "attributes": { "name": "get_run", "lines": "many" } },
                { "type": "Comment" }
            ]
        }
    }"#;

    struct Run {
        result: EvalResult<Value<usize>>,
        output: String,
        diagnostics: Vec<Diagnostic>,
    }

    fn table(source: &str) -> FunctionTable {
        let tokens = Tokenizer::new().tokenize(source).unwrap();
        let parsed = parse_rules("test.rules", &tokens);
        assert!(parsed.error.is_none(), "{:?}", parsed.error);
        let mut table = FunctionTable::new();
        for function in parsed.functions {
            table.insert(function).unwrap();
        }
        table
    }

    fn run(source: &str, rule: &str) -> Run {
        let tree = JsonTree::from_json(TREE).unwrap();
        let functions = table(source);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let reporter = Reporter::with_observer(move |d| sink.borrow_mut().push(d.clone()));
        let mut output = Vec::new();

        let result = {
            let mut evaluator = Evaluator::new(&functions, &tree, &mut output, &reporter);
            evaluator.run(functions.get(rule).unwrap())
        };
        let diagnostics = seen.borrow().clone();
        Run {
            result,
            output: String::from_utf8(output).unwrap(),
            diagnostics,
        }
    }

    fn truthy(source: &str) -> bool {
        run(source, "R").result.unwrap().is_truthy()
    }

    #[test]
    fn test_and_or_evaluate_every_member() {
        let helpers = "@No:\nPRINTS(\"n\")\nEND\n@Yes:\nPRINTS(\"y\")\n@Yes = TRUE\nEND\n";

        let source = format!("{}@R:\n@R = @No AND @Yes AND @No\nEND\n", helpers);
        let outcome = run(&source, "R");
        assert!(!outcome.result.unwrap().is_truthy());
        assert_eq!(outcome.output, "nyn");

        let source = format!("{}@R:\n@R = @Yes OR @No OR @Yes\nEND\n", helpers);
        let outcome = run(&source, "R");
        assert!(outcome.result.unwrap().is_truthy());
        assert_eq!(outcome.output, "yny");
    }

    #[test]
    fn test_literals_not_and_null_check() {
        assert!(truthy("@R:\n@R = NOT(FALSE)\nEND"));
        assert!(!truthy("@R:\n@R = NOT(NOT(FALSE))\nEND"));
        assert!(truthy("@R:\n#x = FALSE\n@R = #x == NULL\nEND"));
        assert!(!truthy("@R:\n#x = TRUE\n@R = #x == NULL\nEND"));
        assert!(!truthy("@R:\nEND"));
    }

    #[test]
    fn test_null_check_on_undefined_variable() {
        let error = run("@R:\n#x = FALSE\n@R = #y == NULL\nEND", "R")
            .result
            .unwrap_err();
        assert!(matches!(error, EvalError::UndefinedVariable { ref name, line: 3 } if name == "y"));
    }

    #[test]
    fn test_undefined_variable() {
        let outcome = run("@R:\n\n@R = #nope\nEND", "R");
        let error = outcome.result.unwrap_err();
        assert!(matches!(error, EvalError::UndefinedVariable { ref name, line: 3 } if name == "nope"));
    }

    #[test]
    fn test_for_loop_unbinds_variable() {
        let outcome = run(
            "@R:\n#f = TRUE\nFOR #f IN GET_NODES_OF_TYPE(Macro)\nPRINTS(\"body\")\nEND\n@R = #f\nEND",
            "R",
        );
        assert_eq!(outcome.output, "");
        assert!(matches!(
            outcome.result,
            Err(EvalError::UndefinedVariable { ref name, .. }) if name == "f"
        ));
    }

    #[test]
    fn test_for_loop_and_print() {
        let outcome = run(
            "@R:\nFOR #f IN GET_NODES_OF_TYPE(Function)\nIF #f.name.StartsWith(\"get\") THEN PRINT(#f) END\nEND\nEND",
            "R",
        );
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.output, "Function[lines=\"many\" name=\"get_run\"]\n");
    }

    #[test]
    fn test_print_skips_nodes_without_attributes() {
        let outcome = run(
            "@R:\nPRINT(GET_NODES_OF_TYPE(Comment))\nPRINT(TRUE)\nEND",
            "R",
        );
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.output, "");
    }

    #[test]
    fn test_attribute_checks() {
        let prelude = "@R:\n#f = GET_NODES_OF_TYPE(Function)\n";
        assert!(truthy(&format!("{}@R = #f.name == \"run\"\nEND", prelude)));
        assert!(truthy(&format!("{}@R = #f.lines >= 12\nEND", prelude)));
        assert!(!truthy(&format!("{}@R = #f.lines < 12\nEND", prelude)));
        assert!(truthy(&format!("{}@R = #f.name.EndsWith(\"un\")\nEND", prelude)));
        assert!(truthy(&format!("{}@R = #f.name.Contains(\"u\")\nEND", prelude)));
    }

    #[test]
    fn test_attribute_check_errors() {
        let error = run("@R:\n#f = FALSE\n@R = #f.name == \"x\"\nEND", "R")
            .result
            .unwrap_err();
        assert!(matches!(error, EvalError::EmptyValue { .. }));

        let error = run("@R:\n#f = TRUE\n@R = #f.name == \"x\"\nEND", "R")
            .result
            .unwrap_err();
        assert!(matches!(error, EvalError::NoAttributes { .. }));

        let error = run(
            "@R:\n#f = GET_NODES_OF_TYPE(Function)\n@R = #f.size == \"x\"\nEND",
            "R",
        )
        .result
        .unwrap_err();
        assert!(matches!(error, EvalError::MissingAttribute { ref attribute, .. } if attribute == "size"));
    }

    #[test]
    fn test_numeric_check_on_text() {
        let source = "@R:\nFOR #f IN GET_NODES_OF_TYPE(Function)\nIF #f.lines < 100 THEN @R = TRUE END\nEND\nEND";
        let error = run(source, "R").result.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Value of f.lines \"many\" is not a number! @Line: 3"
        );
    }

    #[test]
    fn test_compare_attributes() {
        let outcome = run(
            "@R:\nFOR #f IN GET_NODES_OF_TYPE(Function)\nFOR #g IN GET_NODES_OF_TYPE(Function)\nIF \"get_\" + #f.name == #g.name THEN PRINTS(\"match\") END\nEND\nEND\nEND",
            "R",
        );
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.output, "match");

        let source = "@R:\nFOR #f IN GET_NODES_OF_TYPE(Function)\nIF #f.name == \"stop\" THEN #b = #f END\nEND\n#a = GET_NODES_OF_TYPE(Function)\n@R = #a.lines > #b.lines\nEND";
        assert!(truthy(source));
    }

    #[test]
    fn test_compare_attributes_checks_right_operand() {
        let prelude = "@R:\n#a = GET_NODES_OF_TYPE(Function)\n#b = FALSE\n#c = GET_NODES_OF_TYPE(Module)\n";

        let error = run(&format!("{}@R = #a.name == #b.name\nEND", prelude), "R")
            .result
            .unwrap_err();
        assert!(matches!(error, EvalError::EmptyValue { ref name, line: 5 } if name == "b"));

        let error = run(&format!("{}@R = #a.lines > #c.lines\nEND", prelude), "R")
            .result
            .unwrap_err();
        assert!(matches!(
            error,
            EvalError::MissingAttribute { ref name, ref attribute, line: 5 }
                if name == "c" && attribute == "lines"
        ));
    }

    #[test]
    fn test_numeric_literal_out_of_range() {
        let error = run(
            "@R:\n#f = GET_NODES_OF_TYPE(Function)\n@R = #f.lines < 99999999999999999999\nEND",
            "R",
        )
        .result
        .unwrap_err();
        assert!(matches!(error, EvalError::NumberOutOfRange { line: 3, .. }));
        assert_eq!(
            error.to_string(),
            "Number 99999999999999999999 is out of range! @Line: 3"
        );
    }

    #[test]
    fn test_parent_and_conditions() {
        let source = "@R:\n#f = GET_NODES_OF_TYPE(Function)\nPRINT(PARENT(#f))\nPRINT(CONDITIONS_OF(#f))\n@R = PARENT(FALSE)\nEND";
        let outcome = run(source, "R");
        assert!(!outcome.result.unwrap().is_truthy());
        assert_eq!(
            outcome.output,
            "Module[name=\"main\"]\nFunction[lines=\" 3\" name=\"stop\"]\n"
        );

        let error = run("@R:\n@R = CONDITIONS_OF(FALSE)\nEND", "R")
            .result
            .unwrap_err();
        assert!(matches!(error, EvalError::EmptyOperand { ref operation, line: 2 } if operation == "CONDITIONS_OF"));

        let error = run("@R:\n@R = CONDITIONS_OF(TRUE)\nEND", "R")
            .result
            .unwrap_err();
        assert!(matches!(error, EvalError::NullReference { .. }));
    }

    #[test]
    fn test_unknown_node_type() {
        let error = run("@R:\n@R = GET_NODES_OF_TYPE(Enum)\nEND", "R")
            .result
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Parameter \"Enum\" of GET_NODES_OF_TYPE is not a known Node Type. @Line: 2"
        );
    }

    #[test]
    fn test_call_binds_parameters_and_restores_caller() {
        let source = "@Both(#a, #b):\n@Both = #a AND #b\nEND\n@R:\n#a = FALSE\n#ok = @Both(TRUE, TRUE)\n@R = #ok AND #a == NULL\nEND";
        assert!(truthy(source));
    }

    #[test]
    fn test_call_errors() {
        let error = run("@R:\n@R = @Missing\nEND", "R").result.unwrap_err();
        assert!(matches!(error, EvalError::UndefinedFunction { .. }));

        let error = run("@One(#a):\nEND\n@R:\n@R = @One(TRUE, FALSE)\nEND", "R")
            .result
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Function with name \"One\" called with 2 parameters instead of 1. @Line: 4"
        );
    }

    #[test]
    fn test_runtime_error_stops_at_call_boundary() {
        let source = "@Bad:\nPRINTS(\"before\")\n@Bad = #missing\nPRINTS(\"after\")\nEND\n@R:\n#x = TRUE\n#y = @Bad\n@R = #x AND #y == NULL\nEND";
        let outcome = run(source, "R");
        assert!(outcome.result.unwrap().is_truthy());
        assert_eq!(outcome.output, "before");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].line, Some(3));
        assert!(outcome.diagnostics[0]
            .message
            .contains("Undefined variable: missing"));
    }

    #[test]
    fn test_argument_error_stops_at_call_boundary() {
        let source = "@Flag(#p):\nPRINTS(\"body\")\n@Flag = TRUE\nEND\n@R:\n#r = @Flag(#nope)\nPRINTS(\"after\")\n@R = #r == NULL\nEND";
        let outcome = run(source, "R");
        assert!(outcome.result.unwrap().is_truthy());
        assert_eq!(outcome.output, "after");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].line, Some(6));
        assert!(outcome.diagnostics[0]
            .message
            .contains("Undefined variable: nope"));
    }

    #[test]
    fn test_argument_error_keeps_caller_scope() {
        let source = "@Flag(#p):\n@Flag = TRUE\nEND\n@R:\n#x = TRUE\n#r = @Flag(CONDITIONS_OF(FALSE))\n@R = #x AND #r == NULL\nEND";
        let tree = JsonTree::from_json(TREE).unwrap();
        let functions = table(source);
        let reporter = Reporter::new();
        let mut output = Vec::new();
        let mut evaluator = Evaluator::new(&functions, &tree, &mut output, &reporter);
        assert!(evaluator.run(functions.get("R").unwrap()).unwrap().is_truthy());
        assert_eq!(evaluator.context().depth(), 0);
    }

    #[test]
    fn test_while_loop() {
        let source = "@R:\n#go = TRUE\nWHILE #go\nPRINTS(\"once\")\n#go = FALSE\nEND\n@R = NOT(#go)\nEND";
        let outcome = run(source, "R");
        assert!(outcome.result.unwrap().is_truthy());
        assert_eq!(outcome.output, "once");
    }

    #[test]
    fn test_adapter_queries() {
        let functions = table("@R:\n@R = PARENT(FALSE) OR GET_NODES_OF_TYPE(Function)\nEND");
        let mut adapter = MockAdapter::new();
        adapter
            .expect_type_exists()
            .withf(|name| name == "Function")
            .times(1)
            .return_const(true);
        adapter
            .expect_nodes_of_type()
            .times(1)
            .returning(|_| vec![10, 11]);
        adapter.expect_parents_of().never();

        let reporter = Reporter::new();
        let mut output = Vec::new();
        let mut evaluator = Evaluator::new(&functions, &adapter, &mut output, &reporter);
        let value = evaluator.run(functions.get("R").unwrap()).unwrap();
        assert!(value.is_truthy());
        assert_eq!(evaluator.context().depth(), 0);
    }
}
