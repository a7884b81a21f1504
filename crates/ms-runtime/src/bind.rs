use ms_core::ast::{Block, CallExpr, Expr, Script, Statement};
use ms_core::ModScriptError;

use crate::proxy::{resolve_function, FunctionSet, FunctionSignature};

/// Checks every call site against the dialect's function table before the
/// script runs, so an unknown name or a wrong argument count never reaches
/// the host.
#[tracing::instrument(level = "debug", skip_all)]
pub fn bind_script<F: FunctionSet>(
    script: &Script,
    case_insensitive: bool,
) -> Result<(), ModScriptError> {
    let binder = Binder::<F> {
        case_insensitive,
        _functions: std::marker::PhantomData,
    };
    binder.block(&script.body)
}

struct Binder<F> {
    case_insensitive: bool,
    _functions: std::marker::PhantomData<F>,
}

impl<F: FunctionSet> Binder<F> {
    fn block(&self, block: &Block) -> Result<(), ModScriptError> {
        block
            .statements
            .iter()
            .try_for_each(|statement| self.statement(statement))
    }

    fn statement(&self, statement: &Statement) -> Result<(), ModScriptError> {
        match statement {
            Statement::Call(call) => self.call(call, false),
            Statement::Assign { value, .. } | Statement::Set { value, .. } => self.expr(value),
            Statement::If {
                branches,
                otherwise,
                ..
            } => {
                for branch in branches {
                    self.expr(&branch.guard)?;
                    self.block(&branch.body)?;
                }
                match otherwise {
                    Some(block) => self.block(block),
                    None => Ok(()),
                }
            }
            Statement::While { guard, body, .. } => {
                self.expr(guard)?;
                self.block(body)
            }
            Statement::Block(block) => self.block(block),
            Statement::Return { .. } | Statement::Comment { .. } => Ok(()),
        }
    }

    fn expr(&self, expr: &Expr) -> Result<(), ModScriptError> {
        match expr {
            Expr::Literal { .. } | Expr::Variable { .. } => Ok(()),
            Expr::Call(call) => self.call(call, true),
            Expr::Binary { left, right, .. } => {
                self.expr(left)?;
                self.expr(right)
            }
            Expr::Unary { operand, .. } => self.expr(operand),
        }
    }

    fn call(&self, call: &CallExpr, needs_value: bool) -> Result<(), ModScriptError> {
        let function = lookup::<F>(call, self.case_insensitive)?;
        let signature = function.signature();
        if needs_value && signature.returns.is_none() {
            return Err(ModScriptError::type_arity(
                "BIND_VOID_VALUE",
                format!(
                    "Function \"{}\" does not return a value and cannot be used in an expression.",
                    signature.name
                ),
                call.span,
            ));
        }
        for expr in plan_arguments(&signature, call, self.case_insensitive)? {
            self.expr(expr)?;
        }
        Ok(())
    }
}

pub(crate) fn lookup<F: FunctionSet>(
    call: &CallExpr,
    case_insensitive: bool,
) -> Result<F, ModScriptError> {
    resolve_function::<F>(&call.name, case_insensitive).ok_or_else(|| {
        ModScriptError::type_arity(
            "BIND_UNKNOWN_FUNCTION",
            format!("Unknown function \"{}\".", call.name),
            call.span,
        )
    })
}

/// Orders a call's arguments the way the signature declares them.
/// Positional arguments fill parameters left to right, keyword arguments
/// fill by name, extra positional arguments go to the variadic tail.
pub(crate) fn plan_arguments<'a>(
    signature: &FunctionSignature,
    call: &'a CallExpr,
    case_insensitive: bool,
) -> Result<Vec<&'a Expr>, ModScriptError> {
    let mut slots: Vec<Option<&Expr>> = vec![None; signature.params.len()];
    let mut extra = Vec::new();
    let mut positional = 0usize;
    let mut seen_keyword = false;

    for argument in &call.args {
        match &argument.name {
            None => {
                if seen_keyword {
                    return Err(ModScriptError::type_arity(
                        "BIND_POSITIONAL_AFTER_KEYWORD",
                        format!(
                            "Positional argument follows a keyword argument in call to \"{}\".",
                            signature.name
                        ),
                        argument.value.span(),
                    ));
                }
                if positional < slots.len() {
                    slots[positional] = Some(&argument.value);
                } else if signature.variadic.is_some() {
                    extra.push(&argument.value);
                } else {
                    return Err(arity_error(signature, call));
                }
                positional += 1;
            }
            Some(name) => {
                seen_keyword = true;
                let index = signature
                    .params
                    .iter()
                    .position(|param| {
                        if case_insensitive {
                            param.name.eq_ignore_ascii_case(name)
                        } else {
                            param.name == name
                        }
                    })
                    .ok_or_else(|| {
                        ModScriptError::type_arity(
                            "BIND_UNKNOWN_PARAM",
                            format!(
                                "Function \"{}\" has no parameter named \"{}\".",
                                signature.name, name
                            ),
                            argument.value.span(),
                        )
                    })?;
                if slots[index].is_some() {
                    return Err(ModScriptError::type_arity(
                        "BIND_DUPLICATE_ARG",
                        format!(
                            "Parameter \"{}\" of \"{}\" is given more than once.",
                            signature.params[index].name, signature.name
                        ),
                        argument.value.span(),
                    ));
                }
                slots[index] = Some(&argument.value);
            }
        }
    }

    let mut ordered = Vec::with_capacity(slots.len() + extra.len());
    for slot in slots {
        match slot {
            Some(expr) => ordered.push(expr),
            None => return Err(arity_error(signature, call)),
        }
    }
    ordered.extend(extra);
    Ok(ordered)
}

fn arity_error(signature: &FunctionSignature, call: &CallExpr) -> ModScriptError {
    let expected = match signature.variadic {
        Some(_) => format!("at least {}", signature.params.len()),
        None => signature.params.len().to_string(),
    };
    ModScriptError::type_arity(
        "BIND_ARITY",
        format!(
            "Function \"{}\" expects {} argument(s) ({}), got {}.",
            signature.name,
            expected,
            signature.describe_params(),
            call.args.len()
        ),
        call.span,
    )
}
