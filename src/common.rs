use std::fmt::{self, Write};
pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u32;
pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// A half-open byte span into the source string. Nodes built
/// programmatically carry the default zero span.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinaryOperator {
    /// Human-readable verb used by check-time diagnostics.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "subtract",
            Self::Mul => "multiply",
            Self::Div => "divide",
            Self::Rem => "modulo",
            Self::Pow => "raise to power",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "**",
        };
        f.write_str(s)
    }
}

/// Built-in unary functions. The grammar restricts names to this set, so an
/// "unknown function" can never reach the evaluator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Function {
    Floor,
    Ceil,
    Round,
    Abs,
}

impl Function {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Abs => "abs",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Less,
    Equal,
    Greater,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Less => '<',
            Self::Equal => '=',
            Self::Greater => '>',
        };
        f.write_char(c)
    }
}

/// The number side of a compare-point. `DiceMax`/`DiceMin` are positional
/// sentinels resolved against the current side sequence at roll time (the
/// last/first element, not the numeric extremum -- relevant for Fate dice).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareTo {
    Value(Int),
    DiceMax,
    DiceMin,
}

/// An `{op, number}` pair used by success/failure/explosion/reroll
/// predicates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ComparePoint {
    pub op: CompareOp,
    pub number: CompareTo,
}

impl ComparePoint {
    pub fn new(op: CompareOp, number: CompareTo) -> Self {
        Self { op, number }
    }

    pub fn equal_to(number: Int) -> Self {
        Self::new(CompareOp::Equal, CompareTo::Value(number))
    }

    pub fn dice_max() -> Self {
        Self::new(CompareOp::Equal, CompareTo::DiceMax)
    }

    pub fn dice_min() -> Self {
        Self::new(CompareOp::Equal, CompareTo::DiceMin)
    }
}

impl fmt::Display for ComparePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            CompareTo::Value(x) => write!(f, "{}{}", self.op, x),
            CompareTo::DiceMax | CompareTo::DiceMin => Ok(()),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SelectDir {
    High,
    Low,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SelectKind {
    Keep,
    Drop,
}

/// A keep/drop modifier: rank by value and keep or drop the top/bottom
/// `count` records.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Selection {
    pub kind: SelectKind,
    pub dir: SelectDir,
    pub count: UInt,
}

impl Selection {
    pub fn keep(dir: SelectDir, count: UInt) -> Self {
        Self {
            kind: SelectKind::Keep,
            dir,
            count,
        }
    }

    pub fn drop(dir: SelectDir, count: UInt) -> Self {
        Self {
            kind: SelectKind::Drop,
            dir,
            count,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SelectKind::Keep => 'k',
            SelectKind::Drop => 'd',
        };
        let dir = match self.dir {
            SelectDir::High => 'h',
            SelectDir::Low => 'l',
        };
        write!(f, "{}{}{}", kind, dir, self.count)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ExplodeKind {
    Exploding,
    Compounding,
    Penetrating,
}

/// One of the three mutually-exclusive explosion modifiers together with
/// its trigger predicate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Explode {
    pub kind: ExplodeKind,
    pub point: ComparePoint,
}

impl Explode {
    pub fn new(kind: ExplodeKind, point: ComparePoint) -> Self {
        Self { kind, point }
    }
}

impl fmt::Display for Explode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.kind {
            ExplodeKind::Exploding => "!",
            ExplodeKind::Compounding => "!!",
            ExplodeKind::Penetrating => "!p",
        };
        write!(f, "{}{}", mark, self.point)
    }
}
