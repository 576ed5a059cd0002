//! Static kind checking. Every expression has one of three kinds, decided
//! entirely by its shape; evaluation is only attempted on expressions that
//! check cleanly.

use crate::common::*;
use crate::parse::ast::*;
use std::fmt;

/// The static category of an expression's value.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kind {
    /// A plain numeric quantity: literals, arithmetic over numbers.
    Number,
    /// A total of rolled values.
    Sum,
    /// A net success count.
    Success,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Number => "number",
            Self::Sum => "sum",
            Self::Success => "success",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("cannot {verb} kinds '{lhs}' and '{rhs}' (at {loc})")]
    BinOpIncompatibleKinds {
        verb: &'static str,
        lhs: Kind,
        rhs: Kind,
        loc: Location,
    },
    #[error("cannot mix kinds '{first}' and '{this}' (at {loc})")]
    GroupIncompatibleKinds { first: Kind, this: Kind, loc: Location },
}

/// Checks the whole expression, collecting every error rather than stopping
/// at the first.
pub fn check(expr: &Expr) -> Result<Kind, Vec<CheckError>> {
    match expr {
        Expr::Number(_) => Ok(Kind::Number),
        Expr::Dice(dice) => Ok(dice_kind(&dice.mods)),
        Expr::Call(call) => check(&call.arg),
        Expr::BinOp(bin) => check_binop(bin),
        Expr::Group(group) => check_group(group),
    }
}

fn dice_kind(mods: &DiceMods) -> Kind {
    if mods.success.is_some() {
        Kind::Success
    } else {
        Kind::Sum
    }
}

fn group_kind(mods: &GroupMods) -> Kind {
    if mods.success.is_some() {
        Kind::Success
    } else {
        Kind::Sum
    }
}

/// The kind a checked expression evaluates to. Unlike [`check`] this never
/// fails; operands that would not check combine to `sum`, on the assumption
/// the caller ran [`check`] first.
pub(crate) fn infer_kind(expr: &Expr) -> Kind {
    match expr {
        Expr::Number(_) => Kind::Number,
        Expr::Dice(dice) => dice_kind(&dice.mods),
        Expr::Group(group) => group_kind(&group.mods),
        Expr::Call(call) => infer_kind(&call.arg),
        Expr::BinOp(bin) => {
            let lhs = infer_kind(&bin.lhs);
            combine_kinds(lhs, infer_kind(&bin.rhs)).unwrap_or(Kind::Sum)
        }
    }
}

/// `Number` is compatible with anything and yields the other kind; the
/// rolled kinds only combine with themselves.
pub(crate) fn combine_kinds(lhs: Kind, rhs: Kind) -> Option<Kind> {
    match (lhs, rhs) {
        (l, r) if l == r => Some(l),
        (Kind::Number, other) | (other, Kind::Number) => Some(other),
        _ => None,
    }
}

fn check_binop(bin: &BinExpr) -> Result<Kind, Vec<CheckError>> {
    let lhs = check(&bin.lhs);
    let rhs = check(&bin.rhs);
    match (lhs, rhs) {
        (Ok(l), Ok(r)) => match combine_kinds(l, r) {
            Some(kind) => Ok(kind),
            None => Err(vec![CheckError::BinOpIncompatibleKinds {
                verb: bin.op.verb(),
                lhs: l,
                rhs: r,
                loc: bin.loc,
            }]),
        },
        (Ok(_), Err(errors)) | (Err(errors), Ok(_)) => Err(errors),
        (Err(mut errors), Err(more)) => {
            errors.extend(more);
            Err(errors)
        }
    }
}

/// Elements of a group must share a kind; the first element sets the
/// reference and later mismatches are reported at their own location. An
/// element that fails on its own reports only its own errors, and once more
/// than one element has failed the mixing pass is skipped entirely.
fn check_group(group: &GroupExpr) -> Result<Kind, Vec<CheckError>> {
    let mut errors = Vec::new();
    let mut failures = 0;
    let mut checked = Vec::new();
    for element in group.elements.iter() {
        match check(element) {
            Ok(kind) => checked.push((kind, element.loc())),
            Err(more) => {
                failures += 1;
                errors.extend(more);
            }
        }
    }

    if failures <= 1 {
        let mut iter = checked.into_iter();
        if let Some((first, _)) = iter.next() {
            for (kind, loc) in iter {
                if kind != first {
                    errors.push(CheckError::GroupIncompatibleKinds {
                        first,
                        this: kind,
                        loc,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(group_kind(&group.mods))
    } else {
        Err(errors)
    }
}
