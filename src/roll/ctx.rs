//! The evaluator. Walks a parsed expression, rolling dice through a
//! [`Randomiser`] and building the result tree as it goes.

use super::classify::{self, SideSet};
use super::error::EvalError;
use super::num::Number;
use super::tree::*;
use super::{explode, select, EResult};
use crate::check::{infer_kind, Kind};
use crate::common::*;
use crate::parse::ast::*;
use crate::random::Randomiser;
use rand::rngs::ThreadRng;
use std::fmt;

/// Rolls allowed per evaluation unless overridden. Explosions and rerolls
/// can otherwise chain unboundedly.
pub const DEFAULT_MAX_ROLLS: u32 = 1000;

pub struct Evaluator<R = ThreadRng> {
    random: R,
    max_rolls: Option<u32>,
    rolls: u32,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_random(rand::thread_rng())
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Randomiser> Evaluator<R> {
    pub fn with_random(random: R) -> Self {
        Self {
            random,
            max_rolls: Some(DEFAULT_MAX_ROLLS),
            rolls: 0,
        }
    }

    /// Overrides the per-evaluation roll budget. `None` removes the limit;
    /// an expression like `1d1r1` will then never terminate.
    pub fn max_rolls(mut self, max: impl Into<Option<u32>>) -> Self {
        self.max_rolls = max.into();
        self
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Evaluated, EvalError> {
        self.rolls = 0;
        let tree = self.eval_expr(expr)?;
        Ok(Evaluated {
            value: tree.value(),
            kind: infer_kind(expr),
            tree,
        })
    }

    fn eval_expr(&mut self, expr: &Expr) -> EResult<ResultNode> {
        match expr {
            Expr::Number(lit) => Ok(ResultNode::Number(NumberResult {
                value: lit.value,
                loc: lit.loc,
            })),
            Expr::BinOp(bin) => {
                let lhs = self.eval_expr(&bin.lhs)?;
                let rhs = self.eval_expr(&bin.rhs)?;
                Ok(ResultNode::BinOp(BinOpResult {
                    value: lhs.value().apply(bin.op, rhs.value()),
                    op: bin.op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    loc: bin.loc,
                }))
            }
            Expr::Call(call) => {
                let arg = self.eval_expr(&call.arg)?;
                Ok(ResultNode::Call(CallResult {
                    value: arg.value().apply_fn(call.func),
                    func: call.func,
                    arg: Box::new(arg),
                    loc: call.loc,
                }))
            }
            Expr::Dice(dice) => self.eval_dice(dice),
            Expr::Group(group) => self.eval_group(group),
        }
    }

    fn eval_dice(&mut self, dice: &DiceExpr) -> EResult<ResultNode> {
        let (count, count_node) = match &dice.count {
            CountSpec::Literal(n) => (*n, None),
            CountSpec::Computed(expr) => {
                let node = self.eval_expr(expr)?;
                (node.value().trunc_int(), Some(Box::new(node)))
            }
        };
        // a negative computed count rolls nothing
        let count = count.max(0);

        let (sides, sides_node) = match &dice.sides {
            SidesSpec::Faces(n) => (SideSet::Faces(*n), None),
            SidesSpec::Fate => (SideSet::Fate, None),
            SidesSpec::Computed(expr) => {
                let node = self.eval_expr(expr)?;
                (
                    SideSet::Faces(node.value().trunc_int()),
                    Some(Box::new(node)),
                )
            }
        };
        if count > 0 && sides.is_empty() {
            return Err(EvalError::EmptySides { loc: dice.loc });
        }

        let mods = &dice.mods;
        // no capacity hint: `count` is user input and the budget, not the
        // allocator, is what bounds an absurd count
        let mut families = Vec::new();
        for _ in 0..count {
            let mut family = self.roll_family(mods, sides)?;
            if let Some(x) = mods.explode {
                explode::apply(&mut family, x, sides, || self.roll_family(mods, sides))?;
            }
            families.push(family);
        }

        if let Some(sel) = mods.select {
            select::apply(&mut families, sel);
        }
        classify::classify(&mut families, mods.success, mods.failure, sides);

        let value = if mods.success.is_some() {
            // bounded by the roll budget at one per record, so this cannot
            // overflow
            Number::Int(active_records(&families).map(|r| r.success.signed()).sum())
        } else {
            active_records(&families)
                .map(|r| Number::Int(r.value))
                .fold(Number::ZERO, |acc, v| acc + v)
        };

        Ok(ResultNode::Dice(DiceResult {
            value,
            families,
            mods: mods.clone(),
            count: count_node,
            sides: sides_node,
            loc: dice.loc,
        }))
    }

    /// Rolls one die and runs its reroll pass. The single-shot reroll only
    /// ever applies to the very first value; the cumulative reroll points
    /// are re-checked against every replacement.
    fn roll_family(&mut self, mods: &DiceMods, sides: SideSet) -> EResult<Family> {
        let mut family = vec1![self.roll_record(sides)?];
        if let Some(point) = mods.reroll_once {
            if classify::matches(family.last().value, point, sides) {
                family.last_mut().status = RollStatus::Rerolled;
                family.push(self.roll_record(sides)?);
            }
        }
        while mods
            .reroll
            .iter()
            .any(|&point| classify::matches(family.last().value, point, sides))
        {
            family.last_mut().status = RollStatus::Rerolled;
            family.push(self.roll_record(sides)?);
        }
        Ok(family)
    }

    fn roll_record(&mut self, sides: SideSet) -> EResult<RollRecord> {
        if let Some(max) = self.max_rolls {
            if self.rolls >= max {
                return Err(EvalError::TooManyRolls { max });
            }
        }
        self.rolls += 1;

        let idx = self.random.between(0, sides.len());
        let value = sides.at(idx);
        let crit = if value == sides.last() {
            Crit::Max
        } else if value == sides.first() {
            Crit::Min
        } else {
            Crit::None
        };
        Ok(RollRecord {
            value,
            status: RollStatus::Active,
            crit,
            success: SuccessMark::Ignored,
        })
    }

    fn eval_group(&mut self, group: &GroupExpr) -> EResult<ResultNode> {
        let mods = &group.mods;
        let mut results = Vec::with_capacity(group.elements.len());
        for element in group.elements.iter() {
            results.push(self.eval_expr(element)?);
        }
        let values: Vec<Number> = results.iter().map(|r| r.value()).collect();

        let survives = match mods.select {
            Some(sel) => select::survivors(&values, sel),
            None => vec![true; values.len()],
        };

        let mut elements = Vec::with_capacity(results.len());
        for (i, result) in results.into_iter().enumerate() {
            elements.push(GroupElement {
                success: group_mark(values[i], mods.success, mods.failure),
                dropped: !survives[i],
                result,
            });
        }
        // the source group is non-empty, so this cannot fail
        let elements = NonEmpty::try_from_vec(elements).unwrap_or_else(|_| unreachable!());

        let value = if mods.success.is_some() {
            Number::Int(
                elements
                    .iter()
                    .filter(|e| !e.dropped)
                    .map(|e| e.success.signed())
                    .sum(),
            )
        } else {
            elements
                .iter()
                .filter(|e| !e.dropped)
                .map(|e| e.result.value())
                .fold(Number::ZERO, |acc, v| acc + v)
        };

        Ok(ResultNode::Group(GroupResult {
            value,
            elements,
            mods: mods.clone(),
            loc: group.loc,
        }))
    }
}

fn active_records(families: &[Family]) -> impl Iterator<Item = &RollRecord> {
    families
        .iter()
        .flat_map(|family| family.iter())
        .filter(|record| record.is_active())
}

/// Group success predicates always carry a literal target; the grammar has
/// no way to attach a side-relative one to a group.
fn group_mark(
    value: Number,
    success: Option<ComparePoint>,
    failure: Option<ComparePoint>,
) -> SuccessMark {
    let hits = |point: ComparePoint| {
        let target = match point.number {
            CompareTo::Value(n) => Number::Int(n),
            CompareTo::DiceMax | CompareTo::DiceMin => unreachable!(),
        };
        match point.op {
            CompareOp::Less => value < target,
            CompareOp::Equal => value == target,
            CompareOp::Greater => value > target,
        }
    };
    match success {
        Some(point) if hits(point) => SuccessMark::Success,
        Some(_) => match failure {
            Some(point) if hits(point) => SuccessMark::Failure,
            _ => SuccessMark::Ignored,
        },
        None => SuccessMark::Ignored,
    }
}

/// The outcome of one evaluation: the final value, its kind, and the full
/// roll trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Number,
    pub kind: Kind,
    pub tree: ResultNode,
}

impl fmt::Display for Evaluated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.tree, self.value)
    }
}
