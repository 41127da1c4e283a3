//! Reports references of a transaction's receiver type from inside the
//! transaction.
//!
//! A call like `store.InsideTx(|tx| ...)` hands the callback a transaction
//! handle; code inside the callback must go through that handle. Reaching
//! back to the outer receiver (directly or through an alias of the same
//! type) reads or mutates state outside the transaction's consistency
//! boundary. The rule captures the receiver's resolved type at the opening
//! call and flags every bare identifier of that exact type between the
//! call's argument-list delimiters.

use txlint_common::{Diagnostic, DiagnosticBag, Position, Span};

use crate::ast::nodes::{CompilationUnit, Expr, ExprKind};
use crate::ast::visitor::{inspect, NodeRef};
use crate::render;

use super::types::{Type, TypeTable};
use super::{AnalysisError, RuleDescriptor};

pub static TX_RECEIVER: RuleDescriptor = RuleDescriptor {
    name: "tx_receiver",
    description: "reports references of a transaction's receiver type from inside the transaction",
};

/// Method names that open a transaction region. Recognition is a literal,
/// case-sensitive name match; the receiver's type plays no part in it.
const ENTER_TRANSACTION_METHODS: [&str; 2] = ["InsideTx", "InsideTransaction"];

const SUGGESTION: &str =
    "use the transaction handle passed into the callback instead of the outer receiver";

/// A transaction region the traversal has entered and not yet left.
///
/// `start`/`end` are the argument-list delimiters of the opening call, so
/// the opening call's own callee subtree sits outside its region.
#[derive(Debug)]
struct OpenRegion {
    /// Resolved type of the expression the opening call was invoked on.
    /// `None` when the oracle had no entry; such a region matches nothing.
    receiver: Option<Type>,
    /// Span of the opening call, for the "opened here" note.
    opened_at: Span,
    start: Position,
    end: Position,
}

impl OpenRegion {
    fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// The transaction-receiver rule, scoped to one compilation unit.
///
/// State lives on the rule value the driver constructs per unit; nothing
/// persists across units.
pub struct TxReceiverRule<'a> {
    types: &'a TypeTable,
    /// Open regions, innermost last. A nested opening call pushes; a region
    /// pops the first time traversal reaches a node at or past its end, and
    /// that node is no longer checked against it.
    regions: Vec<OpenRegion>,
    diagnostics: DiagnosticBag,
}

impl<'a> TxReceiverRule<'a> {
    pub fn new(types: &'a TypeTable) -> Self {
        Self {
            types,
            regions: Vec::new(),
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Run the rule over one unit: a single preorder traversal in document
    /// order. Returns the findings, or the fatal error when a flagged
    /// reference cannot be rendered.
    pub fn check(mut self, unit: &CompilationUnit) -> Result<DiagnosticBag, AnalysisError> {
        inspect(unit, &mut |node| self.scan(node))?;
        Ok(self.diagnostics)
    }

    fn scan(&mut self, node: NodeRef<'_>) -> Result<(), AnalysisError> {
        let pos = node.span().start;
        while let Some(innermost) = self.regions.last() {
            if pos >= innermost.end {
                self.regions.pop();
            } else {
                break;
            }
        }

        let NodeRef::Expr(expr) = node else {
            return Ok(());
        };
        match &expr.kind {
            ExprKind::MethodCall {
                object,
                method,
                lparen,
                rparen,
                ..
            } if ENTER_TRANSACTION_METHODS.contains(&method.as_str()) => {
                self.regions.push(OpenRegion {
                    receiver: self.types.type_of(object).cloned(),
                    opened_at: expr.span.clone(),
                    start: *lparen,
                    end: *rparen,
                });
                Ok(())
            }
            ExprKind::Identifier(_) => self.check_identifier(expr),
            _ => Ok(()),
        }
    }

    /// Flag the identifier when an open region containing its position
    /// captured the same resolved type. Regions are consulted
    /// innermost-first; at most one diagnostic per occurrence, and repeated
    /// occurrences each get their own.
    fn check_identifier(&mut self, ident: &Expr) -> Result<(), AnalysisError> {
        let Some(ty) = self.types.type_of(ident) else {
            return Ok(());
        };
        let pos = ident.span.start;
        let Some(region) = self
            .regions
            .iter()
            .rev()
            .find(|region| region.contains(pos) && region.receiver.as_ref() == Some(ty))
        else {
            return Ok(());
        };

        let rendered = render::expr_to_string(ident)?;
        self.diagnostics.report(
            Diagnostic::warning(format!(
                "transaction receiver's type used inside transaction - only the transaction type should be used {:?}",
                rendered
            ))
            .with_span(ident.span.clone())
            .with_related(
                region.opened_at.clone(),
                format!(
                    "transaction opened here (receiver type {})",
                    ty.display_name()
                ),
            )
            .with_suggestion(SUGGESTION),
        );
        Ok(())
    }
}
