//! Tree-walking interpreter for assertion statements.

use std::collections::{BTreeMap, BTreeSet};

use ams_core::errors::{ErrorInfo, GradeError};
use ams_frame::{Environment, Value};

use crate::ast::{BoolOp, Expr, Stmt};
use crate::library::{self, Kwargs};
use crate::ops::{self, eval_error, truthy, type_error};
use crate::parser::parse_statement;

fn name_error(name: &str) -> GradeError {
    GradeError::Eval(
        ErrorInfo::new("name-error", format!("name '{name}' is not defined"))
            .with_context("name", name.to_string()),
    )
}

/// Evaluates statements against a read-only environment.
///
/// Assignments land in a local scope layered over the environment; the
/// environment itself is never touched. `pd` and `np` resolve to the library
/// namespaces unless the environment binds those names.
#[derive(Debug)]
pub struct Interpreter<'env> {
    env: &'env Environment,
    locals: BTreeMap<String, Value>,
}

impl<'env> Interpreter<'env> {
    /// Creates an interpreter with an empty local scope.
    pub fn new(env: &'env Environment) -> Self {
        Self {
            env,
            locals: BTreeMap::new(),
        }
    }

    /// Names assigned so far.
    pub fn locals(&self) -> &BTreeMap<String, Value> {
        &self.locals
    }

    /// Parses and executes one statement.
    pub fn run_source(&mut self, source: &str) -> Result<Option<Value>, GradeError> {
        let stmt = parse_statement(source)?;
        self.exec(&stmt)
    }

    /// Executes a statement. Expression statements yield their value,
    /// assignments yield nothing.
    pub fn exec(&mut self, stmt: &Stmt) -> Result<Option<Value>, GradeError> {
        match stmt {
            Stmt::Assign { target, value } => {
                let value = self.eval(value)?;
                self.locals.insert(target.clone(), value);
                Ok(None)
            }
            Stmt::Expr(expr) => self.eval(expr).map(Some),
        }
    }

    /// Resolves a name: locals, then the environment, then library modules.
    pub fn lookup(&self, name: &str) -> Result<Value, GradeError> {
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.env.lookup(name) {
            return Ok(value);
        }
        if let Some(module) = library::module_for(name) {
            return Ok(Value::Module(module));
        }
        if library::is_builtin(name) {
            return Err(eval_error(
                "unsupported",
                format!("builtin '{name}' can only be called"),
            ));
        }
        Err(name_error(name))
    }

    fn shadowed(&self, name: &str) -> bool {
        self.locals.contains_key(name) || self.env.contains(name)
    }

    fn vars(&self) -> Value {
        let mut names: BTreeSet<String> = self.env.names().map(str::to_string).collect();
        names.extend(self.locals.keys().cloned());
        names.insert("np".to_string());
        names.insert("pd".to_string());
        Value::Names(names.into_iter().collect())
    }

    /// Evaluates an expression.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, GradeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) => self.eval_all(items).map(Value::List),
            Expr::Tuple(items) => self.eval_all(items).map(Value::Tuple),
            Expr::ListComp {
                element,
                target,
                iter,
                condition,
            } => self.comprehension(element, target, iter, condition.as_deref()),
            Expr::Attribute { object, name } => {
                let receiver = self.eval(object)?;
                library::attribute(&receiver, name)
            }
            Expr::Call { func, args, kwargs } => self.call(func, args, kwargs),
            Expr::Subscript { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                library::subscript(&object, &index)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                ops::unary(*op, &operand)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                ops::binary(*op, &left, &right)
            }
            Expr::Compare { first, rest } => {
                let mut left = self.eval(first)?;
                let mut result = Value::Bool(true);
                for (idx, (op, operand)) in rest.iter().enumerate() {
                    let right = self.eval(operand)?;
                    result = ops::compare(*op, &left, &right)?;
                    // Only intermediate links of a chain are tested for truth.
                    if idx + 1 < rest.len() && !truthy(&result)? {
                        return Ok(result);
                    }
                    left = right;
                }
                Ok(result)
            }
            Expr::BoolOp { op, left, right } => {
                let left = self.eval(left)?;
                let decided = match op {
                    BoolOp::And => !truthy(&left)?,
                    BoolOp::Or => truthy(&left)?,
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
        }
    }

    fn eval_all(&mut self, items: &[Expr]) -> Result<Vec<Value>, GradeError> {
        items.iter().map(|item| self.eval(item)).collect()
    }

    fn comprehension(
        &mut self,
        element: &Expr,
        target: &str,
        iter: &Expr,
        condition: Option<&Expr>,
    ) -> Result<Value, GradeError> {
        let items = library::iterate(&self.eval(iter)?)?;
        let saved = self.locals.remove(target);
        let produced = self.comprehension_items(element, target, items, condition);
        match saved {
            Some(previous) => {
                self.locals.insert(target.to_string(), previous);
            }
            None => {
                self.locals.remove(target);
            }
        }
        produced.map(Value::List)
    }

    fn comprehension_items(
        &mut self,
        element: &Expr,
        target: &str,
        items: Vec<Value>,
        condition: Option<&Expr>,
    ) -> Result<Vec<Value>, GradeError> {
        let mut produced = Vec::new();
        for item in items {
            self.locals.insert(target.to_string(), item);
            if let Some(condition) = condition {
                let keep = self.eval(condition)?;
                if !truthy(&keep)? {
                    continue;
                }
            }
            produced.push(self.eval(element)?);
        }
        Ok(produced)
    }

    fn call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        kwargs: &[(String, Expr)],
    ) -> Result<Value, GradeError> {
        match func {
            Expr::Name(name) if !self.shadowed(name) && library::is_builtin(name) => {
                let (args, kwargs) = self.arguments(args, kwargs)?;
                if name == "vars" {
                    if !args.is_empty() || !kwargs.is_empty() {
                        return Err(type_error("vars() without arguments is the only supported form"));
                    }
                    return Ok(self.vars());
                }
                library::call_builtin(name, args, kwargs)
            }
            Expr::Attribute { object, name } => {
                let receiver = self.eval(object)?;
                let (args, kwargs) = self.arguments(args, kwargs)?;
                match receiver {
                    Value::Module(module) => library::call_module(module, name, args, kwargs),
                    other => library::call_method(&other, name, args, kwargs),
                }
            }
            other => {
                let callee = self.eval(other)?;
                Err(type_error(format!(
                    "'{}' object is not callable",
                    callee.type_name()
                )))
            }
        }
    }

    fn arguments(
        &mut self,
        args: &[Expr],
        kwargs: &[(String, Expr)],
    ) -> Result<(Vec<Value>, Kwargs), GradeError> {
        let args = self.eval_all(args)?;
        let kwargs = kwargs
            .iter()
            .map(|(key, expr)| Ok((key.clone(), self.eval(expr)?)))
            .collect::<Result<Kwargs, GradeError>>()?;
        Ok((args, kwargs))
    }
}
