use core::fmt::{self, Display, Formatter};

use crate::expr::{Callee, ConvertOp, Expr, ExprKind};
use crate::types::ConversionKind;

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_expr(f, self, 0)
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self, self.ty())
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Expr], indent: usize) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_expr(f, item, indent)?;
    }
    Ok(())
}

fn write_expr(f: &mut Formatter<'_>, expr: &Expr, indent: usize) -> fmt::Result {
    match expr.kind() {
        ExprKind::Param { name, .. } | ExprKind::Local { name, .. } => write!(f, "{}", name),
        ExprKind::Default => write!(f, "default({})", expr.ty()),
        ExprKind::Constant(value) => write!(f, "{:?}", value),
        ExprKind::Member { target, member } => {
            write_expr(f, target, indent)?;
            write!(f, ".{}", member.name())
        }
        ExprKind::Convert { operand, op } => {
            match op {
                ConvertOp::Upcast | ConvertOp::Numeric => write!(f, "({})", expr.ty())?,
                ConvertOp::Cast => write!(f, "cast<{}>", expr.ty())?,
            }
            write!(f, "(")?;
            write_expr(f, operand, indent)?;
            write!(f, ")")
        }
        ExprKind::TypeAs(operand) => {
            write!(f, "(")?;
            write_expr(f, operand, indent)?;
            write!(f, " as {})", expr.ty())
        }
        ExprKind::Coalesce { value, fallback } => {
            write!(f, "(")?;
            write_expr(f, value, indent)?;
            write!(f, " ?? ")?;
            write_expr(f, fallback, indent)?;
            write!(f, ")")
        }
        ExprKind::Conditional {
            test,
            then,
            otherwise,
        } => {
            write!(f, "(")?;
            write_expr(f, test, indent)?;
            write!(f, " ? ")?;
            write_expr(f, then, indent)?;
            write!(f, " : ")?;
            write_expr(f, otherwise, indent)?;
            write!(f, ")")
        }
        ExprKind::IsNull(operand) => {
            write!(f, "(")?;
            write_expr(f, operand, indent)?;
            write!(f, " == null)")
        }
        ExprKind::New => write!(f, "new {}()", expr.ty()),
        ExprKind::NewSeq(items) => {
            write!(f, "new {} {{ ", expr.ty())?;
            write_list(f, items, indent)?;
            write!(f, " }}")
        }
        ExprKind::CollectSeq { source, .. } => {
            write!(f, "collect<{}>(", expr.ty())?;
            write_expr(f, source, indent)?;
            write!(f, ")")
        }
        ExprKind::Call { func, args } => {
            match func {
                Callee::ParseEnum => write!(f, "parse<{}>(", expr.ty())?,
                Callee::ChangeType => write!(f, "change_type<{}>(", expr.ty())?,
                Callee::ToString => write!(f, "to_string(")?,
                Callee::Operator(op) => match op.kind() {
                    ConversionKind::Implicit => write!(f, "implicit<{}>(", expr.ty())?,
                    ConversionKind::Explicit => write!(f, "explicit<{}>(", expr.ty())?,
                },
                Callee::Host(host) => write!(f, "{}(", host.name())?,
            }
            write_list(f, args, indent)?;
            write!(f, ")")
        }
        ExprKind::Assign { place, value } => {
            write_expr(f, place, indent)?;
            write!(f, " = ")?;
            write_expr(f, value, indent)
        }
        ExprKind::Block { locals, body } => {
            writeln!(f, "{{")?;
            let inner = indent + 1;
            if !locals.is_empty() {
                write!(f, "{:width$}let ", "", width = inner * 4)?;
                for (i, local) in locals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", local.name, local.ty)?;
                }
                writeln!(f, ";")?;
            }
            for statement in body {
                write!(f, "{:width$}", "", width = inner * 4)?;
                write_expr(f, statement, inner)?;
                writeln!(f, ";")?;
            }
            write!(f, "{:width$}}}", "", width = indent * 4)
        }
    }
}
