use crate::common::*;
use crate::roll::Number;
use std::fmt;

/// A parsed expression. Nodes are immutable once the parser returns; the
/// checker and evaluator only ever read them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberLit),
    Dice(Box<DiceExpr>),
    BinOp(Box<BinExpr>),
    Call(Box<CallExpr>),
    Group(Box<GroupExpr>),
}

impl Expr {
    pub fn loc(&self) -> Location {
        match self {
            Self::Number(x) => x.loc,
            Self::Dice(x) => x.loc,
            Self::BinOp(x) => x.loc,
            Self::Call(x) => x.loc,
            Self::Group(x) => x.loc,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NumberLit {
    pub value: Number,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinExpr {
    pub op: BinaryOperator,
    pub lhs: Expr,
    pub rhs: Expr,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub func: Function,
    pub arg: Expr,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiceExpr {
    pub count: CountSpec,
    pub sides: SidesSpec,
    pub mods: DiceMods,
    pub loc: Location,
}

/// How many dice to roll: a literal, or a parenthesized sub-expression
/// resolved at roll time.
#[derive(Debug, Clone, PartialEq)]
pub enum CountSpec {
    Literal(Int),
    Computed(Expr),
}

/// What the dice are rolled against: `1..=N` faces, the Fate set
/// `{-1, 0, 1}`, or a sub-expression resolved to a face count at roll time.
#[derive(Debug, Clone, PartialEq)]
pub enum SidesSpec {
    Faces(Int),
    Fate,
    Computed(Expr),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiceMods {
    pub success: Option<ComparePoint>,
    pub failure: Option<ComparePoint>,
    pub explode: Option<Explode>,
    pub select: Option<Selection>,
    pub reroll_once: Option<ComparePoint>,
    pub reroll: Vec<ComparePoint>,
    pub sort: Option<SortDir>,
}

/// The modifiers a braced group accepts: no explosion, reroll or sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMods {
    pub success: Option<ComparePoint>,
    pub failure: Option<ComparePoint>,
    pub select: Option<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupExpr {
    pub elements: NonEmpty<Expr>,
    pub mods: GroupMods,
    pub loc: Location,
}

impl fmt::Display for DiceMods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cp) = self.success {
            write!(f, "{}", cp)?;
        }
        if let Some(cp) = self.failure {
            write!(f, "f{}", cp)?;
        }
        if let Some(x) = self.explode {
            write!(f, "{}", x)?;
        }
        if let Some(sel) = self.select {
            write!(f, "{}", sel)?;
        }
        if let Some(cp) = self.reroll_once {
            write!(f, "ro{}", cp)?;
        }
        for cp in &self.reroll {
            write!(f, "r{}", cp)?;
        }
        match self.sort {
            Some(SortDir::Asc) => f.write_str("sa")?,
            Some(SortDir::Desc) => f.write_str("sd")?,
            None => {}
        }
        Ok(())
    }
}

impl fmt::Display for GroupMods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cp) = self.success {
            write!(f, "{}", cp)?;
        }
        if let Some(cp) = self.failure {
            write!(f, "f{}", cp)?;
        }
        if let Some(sel) = self.select {
            write!(f, "{}", sel)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn num(value: impl Into<Number>) -> Expr {
        Expr::Number(NumberLit {
            value: value.into(),
            loc: Location::default(),
        })
    }

    pub fn dice(count: Int, sides: Int, mods: DiceMods) -> Expr {
        dice_spec(CountSpec::Literal(count), SidesSpec::Faces(sides), mods)
    }

    pub fn fate(count: Int, mods: DiceMods) -> Expr {
        dice_spec(CountSpec::Literal(count), SidesSpec::Fate, mods)
    }

    pub fn dice_spec(count: CountSpec, sides: SidesSpec, mods: DiceMods) -> Expr {
        Expr::Dice(Box::new(DiceExpr {
            count,
            sides,
            mods,
            loc: Location::default(),
        }))
    }

    pub fn binop(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Expr {
        Expr::BinOp(Box::new(BinExpr {
            op,
            lhs,
            rhs,
            loc: Location::default(),
        }))
    }

    pub fn call(func: Function, arg: Expr) -> Expr {
        Expr::Call(Box::new(CallExpr {
            func,
            arg,
            loc: Location::default(),
        }))
    }

    pub fn group(elements: Vec<Expr>, mods: GroupMods) -> Expr {
        Expr::Group(Box::new(GroupExpr {
            elements: NonEmpty::try_from_vec(elements).unwrap(),
            mods,
            loc: Location::default(),
        }))
    }

    /// Resets every span so parser output can be compared against
    /// builder-constructed expectations.
    pub fn strip_locs(expr: &mut Expr) {
        match expr {
            Expr::Number(x) => x.loc = Location::default(),
            Expr::Dice(x) => {
                x.loc = Location::default();
                if let CountSpec::Computed(e) = &mut x.count {
                    strip_locs(e);
                }
                if let SidesSpec::Computed(e) = &mut x.sides {
                    strip_locs(e);
                }
            }
            Expr::BinOp(x) => {
                x.loc = Location::default();
                strip_locs(&mut x.lhs);
                strip_locs(&mut x.rhs);
            }
            Expr::Call(x) => {
                x.loc = Location::default();
                strip_locs(&mut x.arg);
            }
            Expr::Group(x) => {
                x.loc = Location::default();
                for e in x.elements.iter_mut() {
                    strip_locs(e);
                }
            }
        }
    }
}
