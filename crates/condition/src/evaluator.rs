// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `evaluate(expr, ctx) -> bool` (spec §4.D): missing references produce
//! `false` and a recorded warning, never a runtime error.

use crate::ast::{ArithOp, CmpOp, Expr, Value};
use pipeline_core::ConditionContext;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalWarning {
    MissingStageReference { stage: String, key: String },
    /// Arithmetic/comparison attempted on a value that doesn't coerce to a
    /// number; resolves to `false`-like (`Missing`) rather than erroring.
    NonNumericOperand { context: String },
    ParseError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutcome {
    pub result: bool,
    pub warnings: Vec<EvalWarning>,
}

struct Evaluator<'a> {
    ctx: &'a ConditionContext,
    warnings: Vec<EvalWarning>,
}

impl<'a> Evaluator<'a> {
    fn eval(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Number(n) => Value::Number(*n),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::StageRef { stage, key } => match self.ctx.lookup(stage, key) {
                Some(v) => json_to_value(v),
                None => {
                    self.warnings.push(EvalWarning::MissingStageReference {
                        stage: stage.clone(),
                        key: key.clone(),
                    });
                    Value::Missing
                }
            },
            Expr::Not(inner) => Value::Bool(!self.eval(inner).truthy()),
            Expr::And(a, b) => Value::Bool(self.eval(a).truthy() && self.eval(b).truthy()),
            Expr::Or(a, b) => Value::Bool(self.eval(a).truthy() || self.eval(b).truthy()),
            Expr::Cmp(op, a, b) => Value::Bool(self.eval_cmp(*op, a, b)),
            Expr::Arith(op, a, b) => self.eval_arith(*op, a, b),
        }
    }

    fn eval_cmp(&mut self, op: CmpOp, a: &Expr, b: &Expr) -> bool {
        let lhs = self.eval(a);
        let rhs = self.eval(b);
        match op {
            CmpOp::Eq => values_equal(&lhs, &rhs),
            CmpOp::Ne => !values_equal(&lhs, &rhs),
            _ => {
                let (Some(l), Some(r)) = (lhs.as_number(), rhs.as_number()) else {
                    self.warnings.push(EvalWarning::NonNumericOperand {
                        context: "comparison".to_string(),
                    });
                    return false;
                };
                match op {
                    CmpOp::Gt => l > r,
                    CmpOp::Ge => l >= r,
                    CmpOp::Lt => l < r,
                    CmpOp::Le => l <= r,
                    CmpOp::Eq | CmpOp::Ne => unreachable!(),
                }
            }
        }
    }

    fn eval_arith(&mut self, op: ArithOp, a: &Expr, b: &Expr) -> Value {
        let lhs = self.eval(a);
        let rhs = self.eval(b);
        let (Some(l), Some(r)) = (lhs.as_number(), rhs.as_number()) else {
            self.warnings.push(EvalWarning::NonNumericOperand {
                context: "arithmetic".to_string(),
            });
            return Value::Missing;
        };
        let result = match op {
            ArithOp::Add => l + r,
            ArithOp::Sub => l - r,
            ArithOp::Mul => l * r,
            ArithOp::Div => {
                if r == 0.0 {
                    self.warnings.push(EvalWarning::NonNumericOperand {
                        context: "division by zero".to_string(),
                    });
                    return Value::Missing;
                }
                l / r
            }
        };
        Value::Number(result)
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Missing, _) | (_, Value::Missing) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::Str(s.clone()),
        _ => Value::Missing,
    }
}

/// Evaluate a parsed expression against a context.
pub fn evaluate(expr: &Expr, ctx: &ConditionContext) -> EvalOutcome {
    let mut evaluator = Evaluator {
        ctx,
        warnings: Vec::new(),
    };
    let result = evaluator.eval(expr).truthy();
    EvalOutcome {
        result,
        warnings: evaluator.warnings,
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
