//! Expression evaluator
//!
//! Evaluates expression ASTs against a [`VariableSet`] to produce values.

use std::cmp::Ordering;

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::binding::VariableSet;
use crate::error::{EvalError, EvalResult};
use crate::functions::FunctionRegistry;

/// Value types during evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
}

impl Value {
    /// Numeric view; booleans become 1 or 0
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
        }
    }

    /// Truthiness; zero and NaN are false
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }

    /// Strictly the boolean `true`
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }
}

/// Context for expression evaluation
pub struct EvaluationContext<'a> {
    /// Bound variables
    pub vars: &'a VariableSet,
    /// Callable functions
    pub registry: &'a FunctionRegistry,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(vars: &'a VariableSet, registry: &'a FunctionRegistry) -> Self {
        Self { vars, registry }
    }

    /// Look up a bound variable
    pub fn variable(&self, name: &str) -> EvalResult<Value> {
        self.vars
            .get(name)
            .map(Value::Number)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))
    }
}

/// Evaluate an expression
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> EvalResult<Value> {
    match expr {
        // === Literals ===
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),

        // === References ===
        Expr::Variable(name) => ctx.variable(name),

        // === Operators ===
        Expr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        Expr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        // === Functions ===
        Expr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    ctx: &EvaluationContext,
) -> EvalResult<Value> {
    let left_val = evaluate(left, ctx)?;

    // Logical operators short-circuit
    match op {
        BinaryOperator::And if !left_val.as_bool() => return Ok(Value::Boolean(false)),
        BinaryOperator::Or if left_val.as_bool() => return Ok(Value::Boolean(true)),
        _ => {}
    }

    let right_val = evaluate(right, ctx)?;
    let l = left_val.as_number();
    let r = right_val.as_number();

    match op {
        // Arithmetic operators
        BinaryOperator::Add => Ok(Value::Number(l + r)),
        BinaryOperator::Subtract => Ok(Value::Number(l - r)),
        BinaryOperator::Multiply => Ok(Value::Number(l * r)),
        BinaryOperator::Divide => {
            if r == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Number(l / r))
            }
        }
        BinaryOperator::Modulo => {
            // Integer modulo of the truncated operands; sign follows the dividend
            let divisor = r as i64;
            if divisor == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let remainder = (l as i64).checked_rem(divisor).unwrap_or(0);
            Ok(Value::Number(remainder as f64))
        }
        BinaryOperator::Power => Ok(Value::Number(l.powf(r))),

        // Comparison operators
        BinaryOperator::Equal => Ok(Value::Boolean(loose_equals(&left_val, &right_val))),
        BinaryOperator::NotEqual => Ok(Value::Boolean(!loose_equals(&left_val, &right_val))),
        BinaryOperator::Identical => Ok(Value::Boolean(identical(&left_val, &right_val))),
        BinaryOperator::NotIdentical => Ok(Value::Boolean(!identical(&left_val, &right_val))),
        BinaryOperator::LessThan => Ok(Value::Boolean(l.partial_cmp(&r) == Some(Ordering::Less))),
        BinaryOperator::LessEqual => Ok(Value::Boolean(matches!(
            l.partial_cmp(&r),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOperator::GreaterThan => Ok(Value::Boolean(
            l.partial_cmp(&r) == Some(Ordering::Greater),
        )),
        BinaryOperator::GreaterEqual => Ok(Value::Boolean(matches!(
            l.partial_cmp(&r),
            Some(Ordering::Greater | Ordering::Equal)
        ))),

        // Left side already decided the other case
        BinaryOperator::And | BinaryOperator::Or => Ok(Value::Boolean(right_val.as_bool())),
    }
}

/// `==`: a boolean on either side compares truthiness
fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        _ => left.as_bool() == right.as_bool(),
    }
}

/// `===`: same type and equal
fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        _ => false,
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(op: UnaryOperator, operand: &Expr, ctx: &EvaluationContext) -> EvalResult<Value> {
    let val = evaluate(operand, ctx)?;

    match op {
        UnaryOperator::Negate => Ok(Value::Number(-val.as_number())),
        UnaryOperator::Not => Ok(Value::Boolean(!val.as_bool())),
    }
}

/// Evaluate a function call
fn evaluate_function(name: &str, args: &[Expr], ctx: &EvaluationContext) -> EvalResult<Value> {
    let func = ctx.registry.get(name).ok_or_else(|| EvalError::UnknownFunction {
        name: name.to_string(),
        position: 0,
    })?;

    // Evaluate arguments
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, ctx)?);
    }

    // Call the function
    (func.implementation)(&evaluated_args)
}
