use std::cmp::Ordering;

use ms_core::ast::{BinaryOp, CallExpr, Expr, UnaryOp};
use ms_core::{ErrorKind, ModScriptError, MsValue, SourceSpan, ValueType, Warning};

use super::boundary::build_prompt;
use super::lifecycle::Interrupt;
use super::ModScriptEngine;
use crate::bind::{lookup, plan_arguments};
use crate::proxy::{
    FailurePolicy, FunctionKind, FunctionProxy, FunctionSet, FunctionSignature, HostFailure,
};

impl<P: FunctionProxy> ModScriptEngine<P> {
    pub(super) fn eval(&mut self, expr: &Expr) -> Result<MsValue, Interrupt> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Variable { name, span } => self.context.lookup(name).cloned().ok_or_else(|| {
                ModScriptError::runtime(
                    "ENGINE_VAR_UNDEFINED",
                    format!("Variable \"{}\" is not defined.", name),
                    *span,
                )
                .into()
            }),
            Expr::Call(call) => self.call(call)?.ok_or_else(|| {
                ModScriptError::type_arity(
                    "BIND_VOID_VALUE",
                    format!("Function \"{}\" does not return a value.", call.name),
                    call.span,
                )
                .into()
            }),
            Expr::Unary { op, operand, span } => match op {
                UnaryOp::Not => Ok(MsValue::Bool(!self.eval_condition(operand)?)),
                UnaryOp::Negate => match self.eval(operand)? {
                    MsValue::Number(value) => Ok(MsValue::Number(-value)),
                    other => Err(type_mismatch(
                        format!("Cannot negate a {}.", other.type_name()),
                        *span,
                    )
                    .into()),
                },
            },
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
                ..
            } => {
                if !self.eval_condition(left)? {
                    return Ok(MsValue::Bool(false));
                }
                Ok(MsValue::Bool(self.eval_condition(right)?))
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
                ..
            } => {
                if self.eval_condition(left)? {
                    return Ok(MsValue::Bool(true));
                }
                Ok(MsValue::Bool(self.eval_condition(right)?))
            }
            Expr::Binary {
                op,
                left,
                right,
                span,
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(apply_binary(*op, &left, &right, *span)?)
            }
        }
    }

    pub(super) fn eval_condition(&mut self, expr: &Expr) -> Result<bool, Interrupt> {
        let value = self.eval(expr)?;
        value.truthy(self.options.truthiness).ok_or_else(|| {
            ModScriptError::runtime(
                "ENGINE_BOOLEAN_EXPECTED",
                format!("Condition must be a boolean, got {}.", value.type_name()),
                expr.span(),
            )
            .into()
        })
    }

    /// Evaluates one call. `None` is the result of a void function.
    ///
    /// Arguments are evaluated first, then the journal is consulted: a call
    /// that already ran while this statement was evaluated before a prompt
    /// yields its recorded result instead of reaching the host again.
    pub(super) fn call(&mut self, call: &CallExpr) -> Result<Option<MsValue>, Interrupt> {
        let case_insensitive = self.options.case_insensitive_names;
        let function = lookup::<P::Function>(call, case_insensitive)?;
        let signature = function.signature();

        let mut args = Vec::with_capacity(call.args.len());
        for expr in plan_arguments(&signature, call, case_insensitive)? {
            args.push(self.eval(expr)?);
        }

        if let Some(recorded) = self.journal.get(self.journal_cursor) {
            let recorded = recorded.clone();
            self.journal_cursor += 1;
            return Ok(recorded);
        }

        check_argument_types(&signature, &args, call.span)?;

        let FunctionKind::Prompt(kind) = signature.kind else {
            let value = self.invoke_host(function, &signature, &args, call.span)?;
            self.journal.push(value.clone());
            self.journal_cursor += 1;
            return Ok(value);
        };

        tracing::debug!(function = signature.name, ?kind, "waiting for user response");
        self.pending_prompt = Some(build_prompt(&signature, kind, &args, call.span));
        Err(Interrupt::Suspend)
    }

    fn invoke_host(
        &mut self,
        function: P::Function,
        signature: &FunctionSignature,
        args: &[MsValue],
        span: SourceSpan,
    ) -> Result<Option<MsValue>, Interrupt> {
        tracing::debug!(function = signature.name, args = args.len(), "invoking host function");
        match self.proxy.invoke(function, args, &mut self.context) {
            Ok(value) => match signature.returns {
                None => Ok(None),
                Some(ty) if ty.accepts(&value) => Ok(Some(value)),
                Some(ty) => Err(ModScriptError::with_span(
                    ErrorKind::HostFatal,
                    "HOST_RETURN_TYPE",
                    format!(
                        "Function \"{}\" returned a {} where a {} was declared.",
                        signature.name,
                        value.type_name(),
                        ty.name()
                    ),
                    span,
                )
                .into()),
            },
            Err(HostFailure::Cancelled) => {
                tracing::info!(function = signature.name, "host reported cancellation");
                Err(Interrupt::Cancelled)
            }
            Err(HostFailure::Failed(message)) => match signature.on_failure {
                FailurePolicy::Fatal => {
                    tracing::error!(function = signature.name, %message, "fatal host failure");
                    Err(ModScriptError::with_span(
                        ErrorKind::HostFatal,
                        "HOST_FATAL",
                        format!("{} failed: {}", signature.name, message),
                        span,
                    )
                    .into())
                }
                FailurePolicy::Recoverable => {
                    tracing::warn!(function = signature.name, %message, "recoverable host failure");
                    self.context
                        .push_warning(Warning::from_call(signature.name, message, span));
                    Ok(signature.returns.map(ValueType::default_value))
                }
            },
        }
    }
}

fn check_argument_types(
    signature: &FunctionSignature,
    args: &[MsValue],
    span: SourceSpan,
) -> Result<(), ModScriptError> {
    for (index, value) in args.iter().enumerate() {
        let (label, ty) = match signature.params.get(index) {
            Some(param) => (param.name.to_string(), param.ty),
            None => (
                format!("#{}", index + 1),
                signature.variadic.unwrap_or(ValueType::Any),
            ),
        };
        if !ty.accepts(value) {
            return Err(ModScriptError::type_arity(
                "ENGINE_ARG_TYPE",
                format!(
                    "Argument \"{}\" of \"{}\" must be a {}, got {}.",
                    label,
                    signature.name,
                    ty.name(),
                    value.type_name()
                ),
                span,
            ));
        }
    }
    Ok(())
}

fn type_mismatch(message: String, span: SourceSpan) -> ModScriptError {
    ModScriptError::runtime("ENGINE_TYPE_MISMATCH", message, span)
}

/// Applies a non-short-circuit binary operator.
///
/// `+` concatenates display forms when either side is a string. Equality
/// across kinds is `false`. Ordering needs two numbers or two strings.
pub fn apply_binary(
    op: BinaryOp,
    left: &MsValue,
    right: &MsValue,
    span: SourceSpan,
) -> Result<MsValue, ModScriptError> {
    let mismatch = || {
        type_mismatch(
            format!(
                "Operator '{}' cannot combine {} and {}.",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            span,
        )
    };

    match op {
        BinaryOp::Eq => Ok(MsValue::Bool(left == right)),
        BinaryOp::NotEq => Ok(MsValue::Bool(left != right)),
        BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
            let ordering = match (left, right) {
                (MsValue::Number(l), MsValue::Number(r)) => l.partial_cmp(r),
                (MsValue::String(l), MsValue::String(r)) => Some(l.cmp(r)),
                _ => return Err(mismatch()),
            };
            let holds = match (op, ordering) {
                (_, None) => false,
                (BinaryOp::Less, Some(ordering)) => ordering == Ordering::Less,
                (BinaryOp::LessEq, Some(ordering)) => ordering != Ordering::Greater,
                (BinaryOp::Greater, Some(ordering)) => ordering == Ordering::Greater,
                (_, Some(ordering)) => ordering != Ordering::Less,
            };
            Ok(MsValue::Bool(holds))
        }
        BinaryOp::Add => match (left, right) {
            (MsValue::Number(l), MsValue::Number(r)) => Ok(MsValue::Number(l + r)),
            (MsValue::String(_), _) | (_, MsValue::String(_)) => {
                Ok(MsValue::String(format!("{}{}", left, right)))
            }
            _ => Err(mismatch()),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (MsValue::Number(l), MsValue::Number(r)) = (left, right) else {
                return Err(mismatch());
            };
            if matches!(op, BinaryOp::Div | BinaryOp::Rem) && *r == 0.0 {
                return Err(ModScriptError::runtime(
                    "ENGINE_DIVIDE_BY_ZERO",
                    format!("Operator '{}' divides by zero.", op.symbol()),
                    span,
                ));
            }
            let value = match op {
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                _ => l % r,
            };
            Ok(MsValue::Number(value))
        }
        BinaryOp::And | BinaryOp::Or => {
            let rules = ms_core::Truthiness::Strict;
            match (left.truthy(rules), right.truthy(rules)) {
                (Some(l), Some(r)) if op == BinaryOp::And => Ok(MsValue::Bool(l && r)),
                (Some(l), Some(r)) => Ok(MsValue::Bool(l || r)),
                _ => Err(mismatch()),
            }
        }
    }
}
