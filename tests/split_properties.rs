use household_budget::split::{AllocationMode, AllocationSet, SplitPolicy, AMOUNT_TOLERANCE, PERCENT_TOLERANCE};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
enum Op {
    SetPercentage(usize, u32),
    Add,
    Remove(usize),
    Even,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..5usize, 0..=1000u32).prop_map(|(i, tenths)| Op::SetPercentage(i, tenths)),
        Just(Op::Add),
        (0..5usize).prop_map(Op::Remove),
        Just(Op::Even),
    ]
}

fn total() -> impl Strategy<Value = Decimal> {
    (2_000i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Includes totals of a few cents, where every rounding step matters.
fn any_total() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (0i64..2_000).prop_map(|cents| Decimal::new(cents, 2)),
        total(),
    ]
}

fn id_at(set: &AllocationSet, i: usize) -> String {
    set.participants()[i % set.len()].id.clone()
}

fn apply(set: &mut AllocationSet, op: &Op) {
    match *op {
        Op::SetPercentage(i, tenths) => {
            let id = id_at(set, i);
            set.set_percentage(&id, Decimal::new(tenths as i64, 1));
        }
        Op::Add => set.add_participant().unwrap(),
        Op::Remove(i) => {
            let id = id_at(set, i);
            set.remove_participant(&id).unwrap();
        }
        Op::Even => set.distribute_evenly(),
    }
}

fn pct_sum(set: &AllocationSet) -> Decimal {
    set.participants().iter().map(|p| p.percentage).sum()
}

fn amount_sum(set: &AllocationSet) -> Decimal {
    set.participants().iter().map(|p| p.amount).sum()
}

proptest! {
    #[test]
    fn prop_percentages_stay_at_hundred(
        total in any_total(),
        count in 2usize..=5,
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let mut set = AllocationSet::even(total, count, SplitPolicy::default()).unwrap();
        for op in &ops {
            apply(&mut set, op);
            let sum = pct_sum(&set);
            prop_assert!((sum - Decimal::ONE_HUNDRED).abs() <= PERCENT_TOLERANCE, "sum {} after {:?}", sum, op);
            prop_assert!(set.participants().iter().all(|p| p.percentage >= Decimal::ZERO));
            prop_assert!((2..=5).contains(&set.len()));
        }
    }
}

proptest! {
    #[test]
    fn prop_amounts_stay_at_total(
        total in any_total(),
        count in 2usize..=5,
        edits in prop::collection::vec((0..5usize, 0..=1000u32), 1..25),
    ) {
        let mut set = AllocationSet::even(total, count, SplitPolicy::default()).unwrap();
        set.switch_mode();
        set.distribute_evenly();
        prop_assert_eq!(amount_sum(&set), total);

        for (i, permille) in edits {
            let id = id_at(&set, i);
            // never more than the total, so nothing is over-allocated on purpose
            let value = (total * Decimal::from(permille) / Decimal::from(1000)).round_dp(2);
            set.set_amount(&id, value);

            let sum = amount_sum(&set);
            prop_assert!((sum - total).abs() <= AMOUNT_TOLERANCE, "sum {} of {}", sum, total);
            prop_assert!(!set.is_over_allocated());
        }
    }
}

proptest! {
    #[test]
    fn prop_locked_participant_is_untouched(
        total in any_total(),
        count in 2usize..=5,
        locked in 0..5usize,
        edits in prop::collection::vec((0..4u8, 0..5usize, 0..=1000u32), 1..25),
    ) {
        let mut set = AllocationSet::even(total, count, SplitPolicy::default()).unwrap();
        let locked_id = id_at(&set, locked);
        set.toggle_lock(&locked_id);
        let before = set.participant(&locked_id).cloned().unwrap();

        for (kind, i, permille) in edits {
            let id = id_at(&set, i);
            if id == locked_id {
                continue;
            }
            match kind {
                0 => set.set_percentage(&id, Decimal::new(permille as i64, 1)),
                1 => set.set_amount(&id, (total * Decimal::from(permille) / Decimal::from(1000)).round_dp(2)),
                2 => set.add_participant().unwrap(),
                _ => set.remove_participant(&id).unwrap(),
            }
            prop_assert_eq!(set.participant(&locked_id), Some(&before));
        }
    }
}

proptest! {
    #[test]
    fn prop_even_distribution_is_idempotent(
        total in any_total(),
        count in 2usize..=5,
        ops in prop::collection::vec(op(), 0..15),
    ) {
        let mut set = AllocationSet::even(total, count, SplitPolicy::default()).unwrap();
        for op in &ops {
            apply(&mut set, op);
        }

        set.distribute_evenly();
        let once = set.clone();
        set.distribute_evenly();
        prop_assert_eq!(set, once);
    }
}

proptest! {
    #[test]
    fn prop_switching_mode_twice_restores_the_set(
        total in total(),
        count in 2usize..=5,
        edits in prop::collection::vec((0..5usize, 0..=1000u32), 1..6),
    ) {
        let mut set = AllocationSet::even(total, count, SplitPolicy::default()).unwrap();
        for (i, tenths) in edits {
            let id = id_at(&set, i);
            set.set_percentage(&id, Decimal::new(tenths as i64, 1));
        }
        // only guaranteed when the amounts add up exactly
        if amount_sum(&set) != total {
            return Ok(());
        }

        let before = set.clone();
        set.switch_mode();
        prop_assert_eq!(set.mode(), AllocationMode::Amount);
        set.switch_mode();
        prop_assert_eq!(set, before);
    }
}
