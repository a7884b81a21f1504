use ms_core::ast::{Block, CallExpr, Expr, Script, Statement, UnaryOp};
use ms_core::MsValue;

const INDENT: &str = "  ";

/// Renders a parsed script back to source text. Parsing the output yields a
/// tree with the same structure; spacing and keyword case are normalized.
pub fn print_script(script: &Script) -> String {
    let mut out = String::new();
    print_statements(&script.body, 0, &mut out);
    out
}

fn print_statements(block: &Block, depth: usize, out: &mut String) {
    for statement in block.statements.iter() {
        print_statement(statement, depth, out);
    }
}

fn line(depth: usize, text: &str, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn print_statement(statement: &Statement, depth: usize, out: &mut String) {
    match statement {
        Statement::Call(call) => line(depth, &print_call(call), out),
        Statement::Assign { name, value, .. } => {
            line(depth, &format!("{} = {}", name, print_expr(value)), out)
        }
        Statement::Set { name, value, .. } => {
            line(depth, &format!("set {} = {}", name, print_expr(value)), out)
        }
        Statement::If {
            branches,
            otherwise,
            ..
        } => {
            for (index, branch) in branches.iter().enumerate() {
                let keyword = if index == 0 { "if" } else { "elseif" };
                line(
                    depth,
                    &format!("{} {} then", keyword, print_expr(&branch.guard)),
                    out,
                );
                print_statements(&branch.body, depth + 1, out);
            }
            if let Some(otherwise) = otherwise {
                line(depth, "else", out);
                print_statements(otherwise, depth + 1, out);
            }
            line(depth, "endif", out);
        }
        Statement::While { guard, body, .. } => {
            line(depth, &format!("while {} do", print_expr(guard)), out);
            print_statements(body, depth + 1, out);
            line(depth, "endwhile", out);
        }
        Statement::Block(block) => {
            line(depth, "begin", out);
            print_statements(block, depth + 1, out);
            line(depth, "end", out);
        }
        Statement::Return { .. } => line(depth, "return", out),
        Statement::Comment { text, .. } => line(depth, &format!("# {}", text), out),
    }
}

fn print_call(call: &CallExpr) -> String {
    let args = call
        .args
        .iter()
        .map(|arg| match &arg.name {
            Some(name) => format!("{}: {}", name, print_expr(&arg.value)),
            None => print_expr(&arg.value),
        })
        .collect::<Vec<_>>();
    format!("{}({})", call.name, args.join(", "))
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Unary { op, .. } => op.precedence(),
        _ => u8::MAX,
    }
}

fn wrap(expr: &Expr, parens: bool) -> String {
    let text = print_expr(expr);
    if parens {
        format!("({})", text)
    } else {
        text
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value, .. } => print_literal(value),
        Expr::Variable { name, .. } => name.clone(),
        Expr::Call(call) => print_call(call),
        Expr::Binary {
            op, left, right, ..
        } => {
            let own = op.precedence();
            format!(
                "{} {} {}",
                wrap(left, precedence(left) < own),
                op.symbol(),
                wrap(right, precedence(right) <= own)
            )
        }
        Expr::Unary { op, operand, .. } => {
            let parens = precedence(operand) < op.precedence();
            match op {
                UnaryOp::Not => format!("not {}", wrap(operand, parens)),
                UnaryOp::Negate => format!("-{}", wrap(operand, parens)),
            }
        }
    }
}

fn print_literal(value: &MsValue) -> String {
    match value {
        MsValue::String(text) => {
            let mut escaped = String::with_capacity(text.len() + 2);
            escaped.push('"');
            for ch in text.chars() {
                match ch {
                    '\\' => escaped.push_str("\\\\"),
                    '"' => escaped.push_str("\\\""),
                    '\n' => escaped.push_str("\\n"),
                    '\t' => escaped.push_str("\\t"),
                    '\r' => escaped.push_str("\\r"),
                    other => escaped.push(other),
                }
            }
            escaped.push('"');
            escaped
        }
        other => other.to_string(),
    }
}
