pub mod tx_receiver;
pub mod types;

use thiserror::Error;
use txlint_common::DiagnosticBag;

use crate::ast::nodes::CompilationUnit;
use crate::render::RenderError;

use self::tx_receiver::TxReceiverRule;
use self::types::TypeTable;

/// Metadata describing a rule to an external multi-rule host.
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

/// Fatal analysis failure.
///
/// Expected non-matches never surface here; the only way a run aborts is a
/// flagged reference that cannot be re-serialized, which means the tree is
/// inconsistent in a way the rule cannot reason about further.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to render flagged reference: {0}")]
    Render(#[from] RenderError),
}

/// Run the analysis over one compilation unit.
///
/// A fresh rule instance is constructed per unit, so no scan state survives
/// the call. Returns the unit's findings, or the fatal error.
pub fn analyze(unit: &CompilationUnit, types: &TypeTable) -> Result<DiagnosticBag, AnalysisError> {
    TxReceiverRule::new(types).check(unit)
}

/// Run the analysis over a sequence of compilation units, folding all
/// findings into one bag. Units are independent; the first fatal error
/// aborts the run.
pub fn analyze_units<'a, I>(units: I) -> Result<DiagnosticBag, AnalysisError>
where
    I: IntoIterator<Item = (&'a CompilationUnit, &'a TypeTable)>,
{
    let mut all_diagnostics = DiagnosticBag::new();
    for (unit, types) in units {
        for diag in analyze(unit, types)?.into_diagnostics() {
            all_diagnostics.report(diag);
        }
    }
    Ok(all_diagnostics)
}

#[cfg(test)]
mod tests {
    use super::types::{Type, TypeTable};
    use super::*;
    use crate::ast::nodes::*;
    use txlint_common::{Position, Span};

    fn at(offset: u32) -> Position {
        Position {
            line: 1,
            column: offset + 1,
            offset,
        }
    }

    fn sp(file: &str, start: u32, end: u32) -> Span {
        Span::new(file, at(start), at(end))
    }

    fn store_ty() -> Type {
        Type::Pointer(Box::new(Type::Named("Store".into())))
    }

    /// One function body holding `store.InsideTx(|tx| { store; })`, with
    /// the region delimiters at fixed offsets 14 and 39.
    fn unit_with_region(file: &str) -> (CompilationUnit, TypeTable) {
        let mut types = TypeTable::new();
        let mut next_id = 0u32;
        let mut expr = |kind: ExprKind, span: Span| {
            let e = Expr::new(ExprId(next_id), kind, span);
            next_id += 1;
            e
        };

        let receiver = expr(ExprKind::Identifier("store".into()), sp(file, 0, 5));
        types.record(receiver.id, store_ty());
        let inner = expr(ExprKind::Identifier("store".into()), sp(file, 22, 27));
        types.record(inner.id, store_ty());

        let block_span = sp(file, 20, 39);
        let block = expr(
            ExprKind::Block(Block {
                stmts: vec![Stmt::Expr(ExprStmt {
                    span: inner.span.clone(),
                    expr: inner,
                })],
                tail_expr: None,
                span: block_span.clone(),
            }),
            block_span,
        );
        let closure = expr(
            ExprKind::Closure {
                params: vec![Param {
                    name: "tx".into(),
                    span: sp(file, 16, 18),
                }],
                body: Box::new(block),
            },
            sp(file, 15, 39),
        );
        let call = expr(
            ExprKind::MethodCall {
                object: Box::new(receiver),
                method: "InsideTx".into(),
                args: vec![closure],
                lparen: at(14),
                rparen: at(39),
            },
            sp(file, 0, 40),
        );
        let unit = CompilationUnit {
            file: file.into(),
            decls: vec![Decl::Function(FunctionDecl {
                name: "run".into(),
                params: vec![],
                body: Some(Block {
                    stmts: vec![Stmt::Expr(ExprStmt {
                        span: call.span.clone(),
                        expr: call,
                    })],
                    tail_expr: None,
                    span: sp(file, 0, 41),
                }),
                span: sp(file, 0, 41),
            })],
            span: sp(file, 0, 41),
        };
        (unit, types)
    }

    /// A unit whose only receiver-typed identifier sits at an offset that
    /// would fall inside the *previous* unit's region if state leaked.
    fn unit_without_region(file: &str) -> (CompilationUnit, TypeTable) {
        let mut types = TypeTable::new();
        let ident = Expr::new(
            ExprId(0),
            ExprKind::Identifier("store".into()),
            sp(file, 20, 25),
        );
        types.record(ident.id, store_ty());
        let unit = CompilationUnit {
            file: file.into(),
            decls: vec![Decl::Const(ConstDecl {
                name: "DEFAULT".into(),
                value: ident,
                span: sp(file, 0, 30),
            })],
            span: sp(file, 0, 30),
        };
        (unit, types)
    }

    #[test]
    fn state_does_not_leak_across_units() {
        let (first, first_types) = unit_with_region("a.src");
        let (second, second_types) = unit_without_region("b.src");

        let diags = analyze_units([(&first, &first_types), (&second, &second_types)])
            .unwrap()
            .into_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span.as_ref().unwrap().file, "a.src");
    }

    #[test]
    fn unit_order_does_not_matter() {
        let (first, first_types) = unit_with_region("a.src");
        let (second, second_types) = unit_without_region("b.src");

        let diags = analyze_units([(&second, &second_types), (&first, &first_types)])
            .unwrap()
            .into_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span.as_ref().unwrap().file, "a.src");
    }

    #[test]
    fn descriptor_identifies_the_rule() {
        assert_eq!(tx_receiver::TX_RECEIVER.name, "tx_receiver");
        assert!(tx_receiver::TX_RECEIVER
            .description
            .contains("receiver type"));
    }

    // The sink contract: findings serialize to JSON with span, related
    // note, and suggestion intact.
    #[test]
    fn findings_serialize_for_the_sink() {
        let (unit, types) = unit_with_region("a.src");
        let diags = analyze(&unit, &types).unwrap();
        let json = serde_json::to_value(diags.diagnostics()).unwrap();

        let finding = &json[0];
        assert_eq!(finding["severity"], "warning");
        assert_eq!(finding["span"]["start"]["offset"], 22);
        assert_eq!(finding["span"]["file"], "a.src");
        assert_eq!(finding["related"][0]["span"]["start"]["offset"], 0);
        assert!(finding["message"]
            .as_str()
            .unwrap()
            .contains("only the transaction type should be used"));
    }
}
