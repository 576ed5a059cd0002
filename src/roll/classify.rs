//! Success/failure classification and the side sequences it is judged
//! against.

use super::tree::{Family, SuccessMark};
use crate::common::*;

/// The ordered sequence of faces a die can land on. `Faces(n)` is
/// `1..=n`; `Fate` is `-1, 0, 1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SideSet {
    Faces(Int),
    Fate,
}

impl SideSet {
    pub fn len(&self) -> Int {
        match self {
            Self::Faces(n) => (*n).max(0),
            Self::Fate => 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The face at zero-based position `idx`.
    pub fn at(&self, idx: Int) -> Int {
        match self {
            Self::Faces(_) => idx + 1,
            Self::Fate => idx - 1,
        }
    }

    pub fn first(&self) -> Int {
        self.at(0)
    }

    pub fn last(&self) -> Int {
        self.at(self.len() - 1)
    }
}

/// Resolves a compare-point target against this side sequence. The
/// sentinels are positional: the last or first face, not the numeric
/// extremum.
pub fn target(point: ComparePoint, sides: SideSet) -> Int {
    match point.number {
        CompareTo::Value(n) => n,
        CompareTo::DiceMax => sides.last(),
        CompareTo::DiceMin => sides.first(),
    }
}

pub fn matches(value: Int, point: ComparePoint, sides: SideSet) -> bool {
    let target = target(point, sides);
    match point.op {
        CompareOp::Less => value < target,
        CompareOp::Equal => value == target,
        CompareOp::Greater => value > target,
    }
}

/// Marks every record in every family, regardless of status. Dropped and
/// superseded records keep their marks for the trace but are excluded from
/// aggregation by the caller.
pub fn classify(
    families: &mut [Family],
    success: Option<ComparePoint>,
    failure: Option<ComparePoint>,
    sides: SideSet,
) {
    if success.is_none() {
        return;
    }
    for family in families.iter_mut() {
        for record in family.iter_mut() {
            record.success = classify_value(record.value, success, failure, sides);
        }
    }
}

/// Classifies one value. Success takes precedence over failure, and no
/// failure predicate means nothing is ever a failure.
pub fn classify_value(
    value: Int,
    success: Option<ComparePoint>,
    failure: Option<ComparePoint>,
    sides: SideSet,
) -> SuccessMark {
    match success {
        Some(point) if matches(value, point, sides) => SuccessMark::Success,
        Some(_) => match failure {
            Some(point) if matches(value, point, sides) => SuccessMark::Failure,
            _ => SuccessMark::Ignored,
        },
        None => SuccessMark::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tree::test_utils::*;
    use super::*;

    #[test]
    fn test_side_sets() {
        let d6 = SideSet::Faces(6);
        assert_eq!(d6.len(), 6);
        assert_eq!(d6.first(), 1);
        assert_eq!(d6.last(), 6);
        assert_eq!(d6.at(2), 3);

        let fate = SideSet::Fate;
        assert_eq!(fate.len(), 3);
        assert_eq!(fate.first(), -1);
        assert_eq!(fate.last(), 1);
        assert_eq!(fate.at(1), 0);

        assert!(SideSet::Faces(0).is_empty());
        assert!(SideSet::Faces(-2).is_empty());
    }

    #[test]
    fn test_sentinel_targets_are_positional() {
        assert_eq!(target(ComparePoint::dice_max(), SideSet::Faces(8)), 8);
        assert_eq!(target(ComparePoint::dice_min(), SideSet::Faces(8)), 1);
        assert_eq!(target(ComparePoint::dice_max(), SideSet::Fate), 1);
        assert_eq!(target(ComparePoint::dice_min(), SideSet::Fate), -1);
    }

    #[test]
    fn test_matches() {
        let gt5 = ComparePoint::new(CompareOp::Greater, CompareTo::Value(5));
        assert!(matches(8, gt5, SideSet::Faces(8)));
        assert!(!matches(5, gt5, SideSet::Faces(8)));
        assert!(matches(1, ComparePoint::dice_min(), SideSet::Faces(8)));
    }

    #[test]
    fn test_classify_families() {
        let mut families = vec![
            vec1![active(5)],
            vec1![active(8)],
            vec1![active(6)],
            vec1![active(1)],
            vec1![active(4)],
        ];
        classify(
            &mut families,
            Some(ComparePoint::new(CompareOp::Greater, CompareTo::Value(5))),
            Some(ComparePoint::new(CompareOp::Less, CompareTo::Value(2))),
            SideSet::Faces(8),
        );
        let marks: Vec<_> = families.iter().map(|f| f.first().success).collect();
        assert_eq!(
            marks,
            vec![
                SuccessMark::Ignored,
                SuccessMark::Success,
                SuccessMark::Success,
                SuccessMark::Failure,
                SuccessMark::Ignored,
            ]
        );
    }

    #[test]
    fn test_no_success_means_no_marks() {
        let mut families = vec![vec1![active(6)]];
        classify(
            &mut families,
            None,
            Some(ComparePoint::equal_to(6)),
            SideSet::Faces(6),
        );
        assert_eq!(families[0].first().success, SuccessMark::Ignored);
    }
}
