//! The three explosion modifiers. Each one extends an existing family with
//! follow-up rolls produced by the caller's `roll` closure, which performs
//! the reroll pass and enforces the roll budget.

use super::classify::{matches, SideSet};
use super::error::EvalError;
use super::tree::{Crit, Family, RollRecord, RollStatus, SuccessMark};
use crate::common::*;

pub fn apply<F>(
    family: &mut Family,
    explode: Explode,
    sides: SideSet,
    roll: F,
) -> Result<(), EvalError>
where
    F: FnMut() -> Result<Family, EvalError>,
{
    match explode.kind {
        ExplodeKind::Exploding => exploding(family, explode.point, sides, roll),
        ExplodeKind::Compounding => compounding(family, explode.point, sides, roll),
        ExplodeKind::Penetrating => penetrating(family, explode.point, sides, roll),
    }
}

/// Appends a fresh roll (with its reroll audit) whenever the latest value
/// triggers the predicate.
fn exploding<F>(
    family: &mut Family,
    point: ComparePoint,
    sides: SideSet,
    mut roll: F,
) -> Result<(), EvalError>
where
    F: FnMut() -> Result<Family, EvalError>,
{
    while matches(family.last().value, point, sides) {
        for record in roll()? {
            family.push(record);
        }
    }
    Ok(())
}

/// Folds the whole chain into one record holding the accumulated total.
/// A reroll firing on a follow-up ends the chain without absorbing it.
fn compounding<F>(
    family: &mut Family,
    point: ComparePoint,
    sides: SideSet,
    mut roll: F,
) -> Result<(), EvalError>
where
    F: FnMut() -> Result<Family, EvalError>,
{
    let mut latest = family.last().value;
    if !matches(latest, point, sides) {
        return Ok(());
    }

    let mut merged = RollRecord {
        value: latest,
        status: RollStatus::Active,
        crit: Crit::None,
        success: SuccessMark::Ignored,
    };
    while matches(latest, point, sides) {
        let follow_up = roll()?;
        if follow_up.len() > 1 {
            break;
        }
        latest = follow_up.last().value;
        // a record holds a plain integer, so the accumulator clamps at the
        // integer bounds instead of wrapping
        merged.value = merged.value.saturating_add(latest);
    }
    *family.last_mut() = merged;
    Ok(())
}

/// Explodes, then knocks one pip off every appended record. The predicate
/// is judged on raw values, as is the crit marking done by the caller.
fn penetrating<F>(
    family: &mut Family,
    point: ComparePoint,
    sides: SideSet,
    roll: F,
) -> Result<(), EvalError>
where
    F: FnMut() -> Result<Family, EvalError>,
{
    let before = family.len();
    exploding(family, point, sides, roll)?;
    for record in family.iter_mut().skip(before) {
        record.value -= 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tree::test_utils::*;
    use super::*;

    fn explode(kind: ExplodeKind) -> Explode {
        Explode::new(kind, ComparePoint::dice_max())
    }

    /// A roll source producing one single-record family per scripted value.
    fn script(values: Vec<Int>) -> impl FnMut() -> Result<Family, EvalError> {
        let mut values = values.into_iter();
        move || match values.next() {
            Some(v) => Ok(vec1![active(v)]),
            None => Err(EvalError::TooManyRolls { max: 0 }),
        }
    }

    fn values(family: &Family) -> Vec<Int> {
        family.iter().map(|r| r.value).collect()
    }

    #[test]
    fn test_exploding_chains() {
        let mut family = vec1![active(6)];
        apply(
            &mut family,
            explode(ExplodeKind::Exploding),
            SideSet::Faces(6),
            script(vec![6, 3]),
        )
        .unwrap();
        assert_eq!(values(&family), vec![6, 6, 3]);
    }

    #[test]
    fn test_exploding_no_trigger() {
        let mut family = vec1![active(4)];
        apply(
            &mut family,
            explode(ExplodeKind::Exploding),
            SideSet::Faces(6),
            script(vec![]),
        )
        .unwrap();
        assert_eq!(values(&family), vec![4]);
    }

    #[test]
    fn test_exploding_keeps_reroll_audit() {
        let mut family = vec1![active(6)];
        let mut rolls = vec![vec1![record(1, RollStatus::Rerolled), active(2)]].into_iter();
        apply(
            &mut family,
            explode(ExplodeKind::Exploding),
            SideSet::Faces(6),
            move || Ok(rolls.next().unwrap()),
        )
        .unwrap();
        assert_eq!(values(&family), vec![6, 1, 2]);
        assert_eq!(family[1].status, RollStatus::Rerolled);
    }

    #[test]
    fn test_compounding_merges() {
        let mut family = vec1![active(6)];
        apply(
            &mut family,
            explode(ExplodeKind::Compounding),
            SideSet::Faces(6),
            script(vec![6, 2]),
        )
        .unwrap();
        assert_eq!(values(&family), vec![14]);
        assert_eq!(family.first().crit, Crit::None);
    }

    #[test]
    fn test_compounding_clamps_huge_totals() {
        let mut family = vec1![active(Int::MAX)];
        apply(
            &mut family,
            explode(ExplodeKind::Compounding),
            SideSet::Faces(Int::MAX),
            script(vec![Int::MAX, 3]),
        )
        .unwrap();
        assert_eq!(values(&family), vec![Int::MAX]);
    }

    #[test]
    fn test_compounding_halts_on_reroll() {
        let mut family = vec1![active(6)];
        let mut rolls = vec![vec1![record(1, RollStatus::Rerolled), active(6)]].into_iter();
        apply(
            &mut family,
            explode(ExplodeKind::Compounding),
            SideSet::Faces(6),
            move || Ok(rolls.next().unwrap()),
        )
        .unwrap();
        // the follow-up triggered a reroll, so nothing is absorbed
        assert_eq!(values(&family), vec![6]);
    }

    #[test]
    fn test_penetrating_decrements_follow_ups() {
        let mut family = vec1![active(6)];
        apply(
            &mut family,
            explode(ExplodeKind::Penetrating),
            SideSet::Faces(6),
            script(vec![6, 3]),
        )
        .unwrap();
        // the predicate fired on the raw 6 before the decrement
        assert_eq!(values(&family), vec![6, 5, 2]);
    }

    #[test]
    fn test_budget_error_propagates() {
        let mut family = vec1![active(6)];
        let err = apply(
            &mut family,
            explode(ExplodeKind::Exploding),
            SideSet::Faces(6),
            script(vec![6, 6]),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::TooManyRolls { .. }));
    }
}
