//! Keep/drop selection. Records are ranked by value into a bounded
//! leaderboard; whoever lands on it is the selected set. Ties always favour
//! the earlier record, whether the set is being kept or dropped.

use super::tree::{Family, RollStatus};
use crate::common::*;

/// Ranks `values` in arrival order and returns the indices of the `count`
/// most extreme ones, `High` meaning largest and `Low` meaning smallest.
/// A newcomer must strictly beat a slot to displace it.
fn rank<T: PartialOrd + Copy>(values: &[T], sel: Selection) -> Vec<usize> {
    let beats: fn(T, T) -> bool = match sel.dir {
        SelectDir::High => |a, b| a > b,
        SelectDir::Low => |a, b| a < b,
    };

    let mut board: Vec<usize> = Vec::new();
    for (idx, &value) in values.iter().enumerate() {
        let pos = board
            .iter()
            .position(|&held| beats(value, values[held]))
            .unwrap_or(board.len());
        board.insert(pos, idx);
        board.truncate(sel.count as usize);
    }
    board
}

/// Applies a keep/drop modifier across the active records of `families`,
/// marking the non-surviving ones `Dropped`.
pub fn apply(families: &mut [Family], sel: Selection) {
    let mut values = Vec::new();
    let mut slots = Vec::new();
    for (i, family) in families.iter().enumerate() {
        for (j, record) in family.iter().enumerate() {
            if record.is_active() {
                values.push(record.value);
                slots.push((i, j));
            }
        }
    }

    let ranked = rank(&values, sel);
    let survives = |nth: usize| match sel.kind {
        SelectKind::Keep => ranked.contains(&nth),
        SelectKind::Drop => !ranked.contains(&nth),
    };

    for (nth, &(i, j)) in slots.iter().enumerate() {
        if !survives(nth) {
            families[i][j].status = RollStatus::Dropped;
        }
    }
}

/// Ranks plain values and reports, per value, whether it survives. Used by
/// group selection, where elements are whole sub-results rather than dice.
pub fn survivors<T: PartialOrd + Copy>(values: &[T], sel: Selection) -> Vec<bool> {
    let ranked = rank(values, sel);
    (0..values.len())
        .map(|nth| match sel.kind {
            SelectKind::Keep => ranked.contains(&nth),
            SelectKind::Drop => !ranked.contains(&nth),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::tree::test_utils::*;
    use super::*;
    use proptest::prelude::*;

    fn keep(dir: SelectDir, count: UInt) -> Selection {
        Selection::keep(dir, count)
    }

    fn drop(dir: SelectDir, count: UInt) -> Selection {
        Selection::drop(dir, count)
    }

    fn statuses(families: &[Family]) -> Vec<bool> {
        families
            .iter()
            .flat_map(|fam| fam.iter().map(|r| r.is_active()))
            .collect()
    }

    #[test]
    fn test_rank_keep_high() {
        assert_eq!(rank(&[5, 8, 6, 1, 4], keep(SelectDir::High, 2)), vec![1, 2]);
        assert_eq!(rank(&[1, 4, 3, 6], keep(SelectDir::Low, 2)), vec![0, 2]);
    }

    #[test]
    fn test_rank_ties_favour_earlier() {
        // the later 5 never strictly beats the earlier one
        assert_eq!(rank(&[5, 3, 5], keep(SelectDir::High, 1)), vec![0]);
        assert_eq!(rank(&[2, 2, 1], drop(SelectDir::Low, 1)), vec![2]);
        assert_eq!(rank(&[2, 2], drop(SelectDir::Low, 1)), vec![0]);
    }

    #[test]
    fn test_rank_count_exceeding_len() {
        assert_eq!(rank(&[3, 1], keep(SelectDir::High, 5)), vec![0, 1]);
    }

    #[test]
    fn test_apply_marks_dropped() {
        let mut families = vec![
            vec1![active(5)],
            vec1![active(8)],
            vec1![active(6)],
            vec1![active(1)],
            vec1![active(4)],
        ];
        apply(&mut families, keep(SelectDir::High, 2));
        assert_eq!(
            statuses(&families),
            vec![false, true, true, false, false]
        );
    }

    #[test]
    fn test_apply_skips_inactive_records() {
        // the superseded 6 does not compete for the kept slot
        let mut families = vec![
            vec1![record(6, RollStatus::Rerolled), active(2)],
            vec1![active(5)],
        ];
        apply(&mut families, keep(SelectDir::High, 1));
        assert_eq!(families[0][0].status, RollStatus::Rerolled);
        assert_eq!(families[0][1].status, RollStatus::Dropped);
        assert!(families[1][0].is_active());
    }

    #[test]
    fn test_survivors() {
        assert_eq!(
            survivors(&[1, 4, 3, 6], keep(SelectDir::Low, 2)),
            vec![true, false, true, false]
        );
        assert_eq!(
            survivors(&[1, 4, 3, 6], drop(SelectDir::High, 1)),
            vec![true, true, true, false]
        );
    }

    proptest! {
        #[test]
        fn keep_activates_exactly_min_count_total(
            values in prop::collection::vec(1i64..=20, 1..12),
            count in 0u32..8,
            high in any::<bool>(),
        ) {
            let dir = if high { SelectDir::High } else { SelectDir::Low };
            let mut families: Vec<Family> =
                values.iter().map(|&v| vec1![active(v)]).collect();
            apply(&mut families, keep(dir, count));
            let active_count = statuses(&families).iter().filter(|&&a| a).count();
            prop_assert_eq!(active_count, values.len().min(count as usize));
        }

        #[test]
        fn drop_removes_exactly_min_count_total(
            values in prop::collection::vec(1i64..=20, 1..12),
            count in 0u32..8,
            high in any::<bool>(),
        ) {
            let dir = if high { SelectDir::High } else { SelectDir::Low };
            let mut families: Vec<Family> =
                values.iter().map(|&v| vec1![active(v)]).collect();
            apply(&mut families, drop(dir, count));
            let active_count = statuses(&families).iter().filter(|&&a| a).count();
            prop_assert_eq!(
                active_count,
                values.len().saturating_sub(count as usize)
            );
        }

        #[test]
        fn kept_high_records_dominate_dropped_ones(
            values in prop::collection::vec(1i64..=20, 1..12),
            count in 1u32..8,
        ) {
            let mut families: Vec<Family> =
                values.iter().map(|&v| vec1![active(v)]).collect();
            apply(&mut families, keep(SelectDir::High, count));
            let kept_min = families
                .iter()
                .filter(|fam| fam.first().is_active())
                .map(|fam| fam.first().value)
                .min();
            let dropped_max = families
                .iter()
                .filter(|fam| !fam.first().is_active())
                .map(|fam| fam.first().value)
                .max();
            if let (Some(kept_min), Some(dropped_max)) = (kept_min, dropped_max) {
                prop_assert!(kept_min >= dropped_max);
            }
        }
    }
}
