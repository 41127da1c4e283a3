//! Re-serialization of expression subtrees to source text.
//!
//! Diagnostics embed the rendered form of the reference they flag. The
//! renderer is total for well-formed trees; a structurally malformed node
//! means the tree is inconsistent upstream, and the failure is escalated to
//! a fatal [`crate::semantic::AnalysisError`] rather than producing a
//! garbled message.

use thiserror::Error;

use crate::ast::nodes::*;

/// Structural malformation found while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("identifier node has an empty name")]
    EmptyIdentifier,
    #[error("path node has no segments")]
    EmptyPath,
}

/// Render an expression subtree back to source text.
pub fn expr_to_string(expr: &Expr) -> Result<String, RenderError> {
    let mut out = String::new();
    write_expr(&mut out, expr)?;
    Ok(out)
}

fn write_expr(out: &mut String, expr: &Expr) -> Result<(), RenderError> {
    match &expr.kind {
        ExprKind::Literal(lit) => {
            write_literal(out, lit);
            Ok(())
        }
        ExprKind::Identifier(name) => {
            if name.is_empty() {
                return Err(RenderError::EmptyIdentifier);
            }
            out.push_str(name);
            Ok(())
        }
        ExprKind::Path(segments) => {
            if segments.is_empty() {
                return Err(RenderError::EmptyPath);
            }
            out.push_str(&segments.join("::"));
            Ok(())
        }
        ExprKind::Binary { left, op, right } => {
            write_expr(out, left)?;
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, right)
        }
        ExprKind::Unary { op, operand } => {
            out.push_str(op.symbol());
            write_expr(out, operand)
        }
        ExprKind::Assign { target, op, value } => {
            write_expr(out, target)?;
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, value)
        }
        ExprKind::Call { callee, args, .. } => {
            write_expr(out, callee)?;
            write_args(out, args)
        }
        ExprKind::MethodCall {
            object,
            method,
            args,
            ..
        } => {
            write_expr(out, object)?;
            out.push('.');
            out.push_str(method);
            write_args(out, args)
        }
        ExprKind::FieldAccess { object, field } => {
            write_expr(out, object)?;
            out.push('.');
            out.push_str(field);
            Ok(())
        }
        ExprKind::Index { object, index } => {
            write_expr(out, object)?;
            out.push('[');
            write_expr(out, index)?;
            out.push(']');
            Ok(())
        }
        ExprKind::Array(elems) => {
            out.push('[');
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, elem)?;
            }
            out.push(']');
            Ok(())
        }
        ExprKind::Grouping(inner) => {
            out.push('(');
            write_expr(out, inner)?;
            out.push(')');
            Ok(())
        }
        ExprKind::Closure { params, body } => {
            out.push('|');
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&param.name);
            }
            out.push_str("| ");
            write_expr(out, body)
        }
        ExprKind::Block(block) => write_block(out, block),
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push_str("if ");
            write_expr(out, condition)?;
            out.push(' ');
            write_block(out, then_branch)?;
            if let Some(ref eb) = else_branch {
                out.push_str(" else ");
                write_expr(out, eb)?;
            }
            Ok(())
        }
    }
}

fn write_args(out: &mut String, args: &[Expr]) -> Result<(), RenderError> {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, arg)?;
    }
    out.push(')');
    Ok(())
}

fn write_block(out: &mut String, block: &Block) -> Result<(), RenderError> {
    if block.stmts.is_empty() && block.tail_expr.is_none() {
        out.push_str("{ }");
        return Ok(());
    }
    out.push_str("{ ");
    for stmt in &block.stmts {
        write_stmt(out, stmt)?;
        out.push(' ');
    }
    if let Some(ref tail) = block.tail_expr {
        write_expr(out, tail)?;
        out.push(' ');
    }
    out.push('}');
    Ok(())
}

fn write_stmt(out: &mut String, stmt: &Stmt) -> Result<(), RenderError> {
    match stmt {
        Stmt::Let(s) => {
            out.push_str("let ");
            out.push_str(&s.name);
            if let Some(ref init) = s.initializer {
                out.push_str(" = ");
                write_expr(out, init)?;
            }
            out.push(';');
            Ok(())
        }
        Stmt::Expr(s) => {
            write_expr(out, &s.expr)?;
            out.push(';');
            Ok(())
        }
        Stmt::Return(s) => {
            out.push_str("return");
            if let Some(ref val) = s.value {
                out.push(' ');
                write_expr(out, val)?;
            }
            out.push(';');
            Ok(())
        }
    }
}

fn write_literal(out: &mut String, lit: &Literal) {
    match lit {
        Literal::Int(n) => out.push_str(&n.to_string()),
        Literal::Float(x) => out.push_str(&x.to_string()),
        Literal::String(s) => out.push_str(&format!("{:?}", s)),
        Literal::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Literal::Nil => out.push_str("nil"),
    }
}
