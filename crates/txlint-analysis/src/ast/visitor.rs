use txlint_common::Span;

use super::nodes::*;

/// A borrowed view of any node the traversal surfaces.
///
/// The set of kinds the analysis dispatches on is closed: declarations,
/// statements, and expressions. Parameters, field names, and member names
/// are plain strings in the node model and are never surfaced as nodes.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Decl(&'a Decl),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl<'a> NodeRef<'a> {
    pub fn span(&self) -> &'a Span {
        match self {
            NodeRef::Decl(d) => d.span(),
            NodeRef::Stmt(s) => s.span(),
            NodeRef::Expr(e) => &e.span,
        }
    }
}

/// Visit every node of the unit in document order: parent before children,
/// children in syntactic order.
///
/// Region open/close decisions downstream are purely positional, so callers
/// rely on this order and on node spans being monotone within one file.
/// The callback's first error aborts the walk and is returned unchanged.
pub fn inspect<'a, E, F>(unit: &'a CompilationUnit, f: &mut F) -> Result<(), E>
where
    F: FnMut(NodeRef<'a>) -> Result<(), E>,
{
    for decl in &unit.decls {
        inspect_decl(decl, f)?;
    }
    Ok(())
}

fn inspect_decl<'a, E, F>(decl: &'a Decl, f: &mut F) -> Result<(), E>
where
    F: FnMut(NodeRef<'a>) -> Result<(), E>,
{
    f(NodeRef::Decl(decl))?;
    match decl {
        Decl::Function(func) => inspect_function(func, f),
        // Struct fields carry no expressions.
        Decl::Struct(_) => Ok(()),
        Decl::Impl(imp) => {
            for method in &imp.methods {
                inspect_function(method, f)?;
            }
            Ok(())
        }
        Decl::Const(c) => inspect_expr(&c.value, f),
    }
}

fn inspect_function<'a, E, F>(func: &'a FunctionDecl, f: &mut F) -> Result<(), E>
where
    F: FnMut(NodeRef<'a>) -> Result<(), E>,
{
    if let Some(ref body) = func.body {
        inspect_block(body, f)?;
    }
    Ok(())
}

fn inspect_block<'a, E, F>(block: &'a Block, f: &mut F) -> Result<(), E>
where
    F: FnMut(NodeRef<'a>) -> Result<(), E>,
{
    for stmt in &block.stmts {
        inspect_stmt(stmt, f)?;
    }
    if let Some(ref tail) = block.tail_expr {
        inspect_expr(tail, f)?;
    }
    Ok(())
}

fn inspect_stmt<'a, E, F>(stmt: &'a Stmt, f: &mut F) -> Result<(), E>
where
    F: FnMut(NodeRef<'a>) -> Result<(), E>,
{
    f(NodeRef::Stmt(stmt))?;
    match stmt {
        Stmt::Let(s) => {
            if let Some(ref init) = s.initializer {
                inspect_expr(init, f)?;
            }
            Ok(())
        }
        Stmt::Expr(s) => inspect_expr(&s.expr, f),
        Stmt::Return(s) => {
            if let Some(ref val) = s.value {
                inspect_expr(val, f)?;
            }
            Ok(())
        }
    }
}

fn inspect_expr<'a, E, F>(expr: &'a Expr, f: &mut F) -> Result<(), E>
where
    F: FnMut(NodeRef<'a>) -> Result<(), E>,
{
    f(NodeRef::Expr(expr))?;
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::Path(_) => Ok(()),
        ExprKind::Binary { left, right, .. } => {
            inspect_expr(left, f)?;
            inspect_expr(right, f)
        }
        ExprKind::Unary { operand, .. } => inspect_expr(operand, f),
        ExprKind::Assign { target, value, .. } => {
            inspect_expr(target, f)?;
            inspect_expr(value, f)
        }
        ExprKind::Call { callee, args, .. } => {
            inspect_expr(callee, f)?;
            for arg in args {
                inspect_expr(arg, f)?;
            }
            Ok(())
        }
        ExprKind::MethodCall { object, args, .. } => {
            inspect_expr(object, f)?;
            for arg in args {
                inspect_expr(arg, f)?;
            }
            Ok(())
        }
        ExprKind::FieldAccess { object, .. } => inspect_expr(object, f),
        ExprKind::Index { object, index } => {
            inspect_expr(object, f)?;
            inspect_expr(index, f)
        }
        ExprKind::Array(elems) => {
            for elem in elems {
                inspect_expr(elem, f)?;
            }
            Ok(())
        }
        ExprKind::Grouping(inner) => inspect_expr(inner, f),
        ExprKind::Closure { body, .. } => inspect_expr(body, f),
        ExprKind::Block(block) => inspect_block(block, f),
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            inspect_expr(condition, f)?;
            inspect_block(then_branch, f)?;
            if let Some(ref eb) = else_branch {
                inspect_expr(eb, f)?;
            }
            Ok(())
        }
    }
}
