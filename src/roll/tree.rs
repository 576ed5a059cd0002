//! The evaluated result tree. Evaluation mirrors the expression tree and
//! keeps every intermediate value and every individual die, including the
//! superseded and dropped ones, so callers can render a full roll trace.

use super::Number;
use crate::common::*;
use crate::parse::ast::{DiceMods, GroupMods};
use enum_dispatch::enum_dispatch;
use std::fmt;

#[enum_dispatch]
pub trait Outcome {
    fn value(&self) -> Number;
    fn loc(&self) -> Location;
}

#[enum_dispatch(Outcome)]
#[derive(Debug, Clone, PartialEq)]
pub enum ResultNode {
    Number(NumberResult),
    BinOp(BinOpResult),
    Call(CallResult),
    Dice(DiceResult),
    Group(GroupResult),
}

macro_rules! impl_outcome {
    ($($ty:ty),*) => {
        $(impl Outcome for $ty {
            fn value(&self) -> Number {
                self.value
            }

            fn loc(&self) -> Location {
                self.loc
            }
        })*
    };
}

impl_outcome!(NumberResult, BinOpResult, CallResult, DiceResult, GroupResult);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NumberResult {
    pub value: Number,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinOpResult {
    pub value: Number,
    pub op: BinaryOperator,
    pub lhs: Box<ResultNode>,
    pub rhs: Box<ResultNode>,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub value: Number,
    pub func: Function,
    pub arg: Box<ResultNode>,
    pub loc: Location,
}

/// The outcome of one dice expression. `families` holds one entry per die
/// of the resolved count; explosions and rerolls grow a family without
/// starting a new one. `count` and `sides` carry the sub-results of
/// computed specifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct DiceResult {
    pub value: Number,
    pub families: Vec<Family>,
    pub mods: DiceMods,
    pub count: Option<Box<ResultNode>>,
    pub sides: Option<Box<ResultNode>>,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    pub value: Number,
    pub elements: NonEmpty<GroupElement>,
    pub mods: GroupMods,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupElement {
    pub result: ResultNode,
    pub dropped: bool,
    pub success: SuccessMark,
}

/// One die within a family, with its full audit state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RollRecord {
    pub value: Int,
    pub status: RollStatus,
    pub crit: Crit,
    pub success: SuccessMark,
}

impl RollRecord {
    pub fn is_active(&self) -> bool {
        self.status == RollStatus::Active
    }
}

pub type Family = NonEmpty<RollRecord>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RollStatus {
    Active,
    /// Excluded by a keep/drop modifier.
    Dropped,
    /// Superseded by a reroll; kept for the trace.
    Rerolled,
}

/// Whether the raw value hit the top or bottom of the side sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Crit {
    Max,
    Min,
    None,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SuccessMark {
    Success,
    Ignored,
    Failure,
}

impl SuccessMark {
    /// The contribution of one record to a net success count.
    pub fn signed(&self) -> Int {
        match self {
            Self::Success => 1,
            Self::Ignored => 0,
            Self::Failure => -1,
        }
    }
}

impl fmt::Display for ResultNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{}", x.value),
            Self::BinOp(x) => write!(f, "{} {} {}", x.lhs, x.op, x.rhs),
            Self::Call(x) => write!(f, "{}({})", x.func, x.arg),
            Self::Dice(x) => write!(f, "{}", x),
            Self::Group(x) => write!(f, "{}", x),
        }
    }
}

impl fmt::Display for DiceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, family) in self.families.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if family.len() == 1 {
                write!(f, "{}", family.first())?;
            } else {
                f.write_str("[")?;
                for (j, record) in family.iter().enumerate() {
                    if j > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", record)?;
                }
                f.write_str("]")?;
            }
        }
        f.write_str(")")
    }
}

impl fmt::Display for RollRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        match self.status {
            RollStatus::Active => Ok(()),
            RollStatus::Dropped => f.write_str("d"),
            RollStatus::Rerolled => f.write_str("r"),
        }
    }
}

impl fmt::Display for GroupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", element.result)?;
            if element.dropped {
                f.write_str("d")?;
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn active(value: Int) -> RollRecord {
        record(value, RollStatus::Active)
    }

    pub fn record(value: Int, status: RollStatus) -> RollRecord {
        RollRecord {
            value,
            status,
            crit: Crit::None,
            success: SuccessMark::Ignored,
        }
    }
}
