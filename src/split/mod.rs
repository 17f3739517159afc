//! Expense split engine
//!
//! Keeps an [`AllocationSet`] consistent while a user edits it: the
//! percentages of all participants add up to 100 (or, in amount mode, the
//! amounts add up to the expense total). Edits to one participant are
//! redistributed proportionally over the other unlocked participants.
//!
//! # Rules
//!
//! 1. **Locked participants keep their share** when somebody else is edited.
//! 2. **Percentages have one decimal, amounts two.** Rounding drift is repaired
//!    locally, never reported.
//! 3. **Unknown ids are a no-op.** Participant-count violations follow the
//!    configured [`LimitPolicy`].
//!
//! The engine is pure: no I/O, no shared state besides the set itself.

pub mod error;
pub mod participant;
pub mod policy;
pub mod rounding;

pub use error::{SplitError, SplitResult};
pub use participant::{AllocationMode, Participant};
pub use policy::{LimitPolicy, SplitPolicy, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
pub use rounding::{AMOUNT_TOLERANCE, MAX_AMOUNT, PERCENT_TOLERANCE};

use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::debug;

use participant::Share;
use rounding::{clamp, floor_to, round_amount, round_group, round_pct, AMOUNT_DP, HUNDRED};

/// The participants dividing one expense total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationSet {
    total: Decimal,
    mode: AllocationMode,
    participants: Vec<Participant>,
    policy: SplitPolicy,
}

impl AllocationSet {
    /// `count` participants with an even split. The rounding residual goes to
    /// the last one (33.3 / 33.3 / 33.4).
    pub fn even(total: Decimal, count: usize, policy: SplitPolicy) -> SplitResult<Self> {
        check_total(total)?;
        check_count(count)?;
        let participants = (1..=count)
            .map(|position| Participant::new(format!("p{position}"), policy.participant_name(position)))
            .collect();
        let mut set = Self {
            total,
            mode: AllocationMode::Percentage,
            participants,
            policy,
        };
        set.fill_even(count - 1);
        Ok(set)
    }

    /// Two partners at 50/50, or three participants when the policy marks a child expense.
    pub fn default_split(total: Decimal, policy: SplitPolicy) -> SplitResult<Self> {
        let count = if policy.child_expense { 3 } else { 2 };
        Self::even(total, count, policy)
    }

    /// Rebuilds a set from a persisted participant list.
    pub fn from_participants(
        total: Decimal,
        mode: AllocationMode,
        participants: Vec<Participant>,
        policy: SplitPolicy,
    ) -> SplitResult<Self> {
        check_total(total)?;
        check_count(participants.len())?;

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(participants.len());
        for mut p in participants {
            if !seen.insert(p.id.clone()) {
                return Err(SplitError::DuplicateParticipant(p.id));
            }
            if p.amount > MAX_AMOUNT {
                return Err(SplitError::AmountTooLarge(p.amount));
            }
            p.percentage = round_pct(clamp(p.percentage, Decimal::ZERO, HUNDRED));
            p.amount = round_amount(p.amount.max(Decimal::ZERO));
            normalized.push(p);
        }

        Ok(Self {
            total,
            mode,
            participants: normalized,
            policy,
        })
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    pub fn policy(&self) -> &SplitPolicy {
        &self.policy
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn into_participants(self) -> Vec<Participant> {
        self.participants
    }

    pub fn percentage_sum(&self) -> Decimal {
        self.sum(Share::Percentage)
    }

    pub fn amount_sum(&self) -> Decimal {
        self.sum(Share::Amount)
    }

    /// Money not yet assigned to anybody; negative when over-allocated.
    pub fn unallocated(&self) -> Decimal {
        self.total - self.amount_sum()
    }

    /// Only meaningful in amount mode; percentage edits cannot over-allocate.
    pub fn is_over_allocated(&self) -> bool {
        self.mode == AllocationMode::Amount && self.amount_sum() > self.total
    }

    /// Checks the set before it is saved.
    pub fn validate(&self) -> SplitResult<()> {
        check_count(self.participants.len())?;

        let mut seen = HashSet::new();
        for p in &self.participants {
            if !seen.insert(p.id.as_str()) {
                return Err(SplitError::DuplicateParticipant(p.id.clone()));
            }
            if p.percentage < Decimal::ZERO || p.amount < Decimal::ZERO {
                return Err(SplitError::NegativeShare(p.id.clone()));
            }
        }

        match self.mode {
            AllocationMode::Percentage => {
                let sum = self.percentage_sum();
                if (sum - HUNDRED).abs() > PERCENT_TOLERANCE {
                    return Err(SplitError::PercentageSum { sum });
                }
                // amounts are derived from the percentages in this mode
                for p in &self.participants {
                    let expected = round_amount(p.percentage * self.total / HUNDRED);
                    if (p.amount - expected).abs() > AMOUNT_TOLERANCE {
                        return Err(SplitError::AmountMismatch {
                            id: p.id.clone(),
                            amount: p.amount,
                            expected,
                        });
                    }
                }
            }
            AllocationMode::Amount => {
                let sum = self.amount_sum();
                if sum > self.total {
                    return Err(SplitError::OverAllocated { excess: sum - self.total });
                }
                if (self.total - sum).abs() > AMOUNT_TOLERANCE {
                    return Err(SplitError::AmountSum { sum, total: self.total });
                }
            }
        }
        Ok(())
    }

    /// Sets one participant's percentage and rebalances the others so the
    /// total stays at 100. If every other participant is locked, the target
    /// itself is pulled back to whatever keeps the total at 100.
    pub fn set_percentage(&mut self, id: &str, value: Decimal) {
        let Some(idx) = self.editable_index(id) else { return };

        let value = round_pct(clamp(value, Decimal::ZERO, HUNDRED));
        let delta = self.participants[idx].percentage - value;
        self.participants[idx].percentage = value;

        let mut others = self.unlocked_except(Some(idx));
        self.redistribute(Share::Percentage, &others, delta);

        others.push(idx);
        let residual = HUNDRED - self.percentage_sum();
        self.absorb(Share::Percentage, &others, residual);

        self.derive_amounts();
    }

    /// Sets one participant's amount. The target keeps the value as entered
    /// (capped at [`MAX_AMOUNT`]); other unlocked participants absorb the
    /// difference and are scaled down when the allocation would exceed the
    /// expense total.
    pub fn set_amount(&mut self, id: &str, value: Decimal) {
        let Some(idx) = self.editable_index(id) else { return };

        let value = round_amount(clamp(value, Decimal::ZERO, MAX_AMOUNT));
        let delta = self.participants[idx].amount - value;
        self.participants[idx].amount = value;

        let others = self.unlocked_except(Some(idx));
        self.redistribute(Share::Amount, &others, delta);
        self.trim_overflow(&others);

        self.derive_percentages();
    }

    pub fn toggle_lock(&mut self, id: &str) {
        match self.participants.iter_mut().find(|p| p.id == id) {
            Some(p) => p.locked = !p.locked,
            None => debug!(id, "toggle_lock: unknown participant"),
        }
    }

    /// Unlocks everybody and splits evenly; the first participant takes the
    /// rounding residual.
    pub fn distribute_evenly(&mut self) {
        self.fill_even(0);
    }

    pub fn add_participant(&mut self) -> SplitResult<()> {
        let n = self.participants.len();
        if n >= MAX_PARTICIPANTS {
            return self.policy.on_limit(SplitError::TooManyParticipants { max: MAX_PARTICIPANTS });
        }

        let factor = Decimal::from(n) / Decimal::from(n + 1);
        for p in self.participants.iter_mut().filter(|p| !p.locked) {
            p.percentage = round_pct(p.percentage * factor);
            p.amount = round_amount(p.amount * factor);
        }

        let percentage = (HUNDRED - self.percentage_sum()).max(Decimal::ZERO);
        let amount = (self.total - self.amount_sum()).max(Decimal::ZERO);
        let newcomer = Participant::new(self.next_id(), self.policy.participant_name(n + 1))
            .with_share(percentage, amount);
        debug!(id = %newcomer.id, %percentage, "participant added");
        self.participants.push(newcomer);

        self.derive_secondary();
        Ok(())
    }

    /// Hands the removed participant's share to the remaining unlocked
    /// participants. When all of them are locked, the first one is unlocked
    /// and receives the whole share.
    pub fn remove_participant(&mut self, id: &str) -> SplitResult<()> {
        let Some(idx) = self.participants.iter().position(|p| p.id == id) else {
            debug!(id, "remove_participant: unknown participant");
            return Ok(());
        };
        if self.participants.len() <= MIN_PARTICIPANTS {
            return self.policy.on_limit(SplitError::TooFewParticipants { min: MIN_PARTICIPANTS });
        }
        let removed = self.participants.remove(idx);

        let receivers = self.unlocked_except(None);
        if receivers.is_empty() {
            let first = &mut self.participants[0];
            first.locked = false;
            first.percentage = clamp(first.percentage + removed.percentage, Decimal::ZERO, HUNDRED);
            first.amount += removed.amount;
        } else {
            let share = self.mode.primary();
            self.redistribute(share, &receivers, removed.share(share));
            if share == Share::Percentage {
                let residual = HUNDRED - self.percentage_sum();
                self.absorb(Share::Percentage, &receivers, residual);
            }
        }

        self.derive_secondary();
        Ok(())
    }

    /// Flips between percentage and amount editing. Percentages derived from
    /// amounts are relative to the amounts actually allocated; back in
    /// percentage mode every amount is derived again from its percentage.
    pub fn switch_mode(&mut self) {
        if self.mode == AllocationMode::Amount {
            let allocated = self.amount_sum();
            if !allocated.is_zero() {
                for p in &mut self.participants {
                    p.percentage = round_pct(p.amount / allocated * HUNDRED);
                }
            }
        }
        let total = self.total;
        for p in &mut self.participants {
            p.amount = round_amount(p.percentage * total / HUNDRED);
        }
        self.mode = self.mode.toggled();
    }

    // ---------- internals ----------

    fn sum(&self, share: Share) -> Decimal {
        self.participants.iter().map(|p| p.share(share)).sum()
    }

    fn editable_index(&self, id: &str) -> Option<usize> {
        let Some(idx) = self.participants.iter().position(|p| p.id == id) else {
            debug!(id, "edit ignored: unknown participant");
            return None;
        };
        if self.participants[idx].locked {
            debug!(id, "edit ignored: participant is locked");
            return None;
        }
        Some(idx)
    }

    fn unlocked_except(&self, skip: Option<usize>) -> Vec<usize> {
        self.participants
            .iter()
            .enumerate()
            .filter(|(i, p)| !p.locked && Some(*i) != skip)
            .map(|(i, _)| i)
            .collect()
    }

    /// Adds `delta` to the participants at `indices`, proportionally to their
    /// current share (evenly when they hold nothing).
    fn redistribute(&mut self, share: Share, indices: &[usize], delta: Decimal) {
        if indices.is_empty() || delta.is_zero() {
            return;
        }
        let pool: Decimal = indices.iter().map(|&i| self.participants[i].share(share)).sum();
        let count = Decimal::from(indices.len());

        let mut values: Vec<Decimal> = indices
            .iter()
            .map(|&i| {
                let current = self.participants[i].share(share);
                let portion = if pool.is_zero() { delta / count } else { delta * current / pool };
                share.bound(current + portion)
            })
            .collect();
        round_group(&mut values, share.dp());

        for (&i, value) in indices.iter().zip(values) {
            self.participants[i].set_share(share, share.bound(value));
        }
    }

    /// Pushes `residual` into the participants in `order`, each as far as its bounds allow.
    fn absorb(&mut self, share: Share, order: &[usize], mut residual: Decimal) {
        for &i in order {
            if residual.is_zero() {
                break;
            }
            let current = self.participants[i].share(share);
            let next = share.bound(current + residual);
            residual -= next - current;
            self.participants[i].set_share(share, next);
        }
        if !residual.is_zero() {
            debug!(%residual, "residual could not be absorbed");
        }
    }

    /// Scales other unlocked participants down so the allocation fits the total.
    fn trim_overflow(&mut self, others: &[usize]) {
        let excess = self.amount_sum() - self.total;
        if excess <= Decimal::ZERO {
            return;
        }
        let pool: Decimal = others.iter().map(|&i| self.participants[i].amount).sum();
        if pool.is_zero() {
            debug!(%excess, "over-allocated, nothing left to scale down");
            return;
        }

        let keep = (pool - excess).max(Decimal::ZERO);
        let mut values: Vec<Decimal> = others
            .iter()
            .map(|&i| self.participants[i].amount * keep / pool)
            .collect();
        round_group(&mut values, AMOUNT_DP);
        for (&i, value) in others.iter().zip(values) {
            self.participants[i].amount = value;
        }
    }

    fn derive_amounts(&mut self) {
        let total = self.total;
        for p in self.participants.iter_mut().filter(|p| !p.locked) {
            p.amount = round_amount(p.percentage * total / HUNDRED);
        }
    }

    fn derive_percentages(&mut self) {
        let allocated = self.amount_sum();
        if allocated.is_zero() {
            return;
        }
        for p in self.participants.iter_mut().filter(|p| !p.locked) {
            p.percentage = round_pct(p.amount / allocated * HUNDRED);
        }
    }

    fn derive_secondary(&mut self) {
        match self.mode {
            AllocationMode::Percentage => self.derive_amounts(),
            AllocationMode::Amount => self.derive_percentages(),
        }
    }

    /// Even shares of the mode's primary field; the other field is derived.
    fn fill_even(&mut self, residual_at: usize) {
        let n = self.participants.len();
        if n == 0 {
            return;
        }
        let share = self.mode.primary();
        let target = match share {
            Share::Percentage => HUNDRED,
            Share::Amount => self.total,
        };
        let even = floor_to(target / Decimal::from(n), share.dp());

        for p in &mut self.participants {
            p.locked = false;
            p.set_share(share, even);
        }
        let rest = Decimal::from(n - 1);
        self.participants[residual_at.min(n - 1)].set_share(share, target - even * rest);
        self.derive_secondary();
    }

    fn next_id(&self) -> String {
        (1usize..)
            .map(|n| format!("p{n}"))
            .find(|id| self.participant(id).is_none())
            .unwrap_or_default()
    }
}

fn check_total(total: Decimal) -> SplitResult<()> {
    if total < Decimal::ZERO {
        return Err(SplitError::NegativeTotal(total));
    }
    if total > MAX_AMOUNT {
        return Err(SplitError::AmountTooLarge(total));
    }
    if total.normalize().scale() > AMOUNT_DP {
        return Err(SplitError::SubCentTotal(total));
    }
    Ok(())
}

fn check_count(count: usize) -> SplitResult<()> {
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&count) {
        return Err(SplitError::ParticipantCount {
            count,
            min: MIN_PARTICIPANTS,
            max: MAX_PARTICIPANTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn set_of(total: Decimal, shares: &[(&str, Decimal)]) -> AllocationSet {
        let participants = shares
            .iter()
            .map(|(id, pct)| {
                Participant::new(*id, id.to_uppercase()).with_share(*pct, round_amount(*pct * total / HUNDRED))
            })
            .collect();
        AllocationSet::from_participants(total, AllocationMode::Percentage, participants, SplitPolicy::default())
            .unwrap()
    }

    fn shares(set: &AllocationSet) -> Vec<(Decimal, Decimal)> {
        set.participants().iter().map(|p| (p.percentage, p.amount)).collect()
    }

    #[test]
    fn two_way_split_follows_the_edit() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        set.set_percentage("a", dec!(70));

        assert_eq!(shares(&set), vec![(dec!(70), dec!(70.00)), (dec!(30), dec!(30.00))]);
    }

    #[test]
    fn locked_partner_forces_target_back() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        set.toggle_lock("b");
        set.set_percentage("a", dec!(70));

        let b = set.participant("b").unwrap();
        assert_eq!((b.percentage, b.amount), (dec!(50), dec!(50.00)));
        assert_eq!(set.participant("a").unwrap().percentage, dec!(50));
    }

    #[test]
    fn edit_is_spread_proportionally() {
        let mut set = set_of(dec!(200), &[("a", dec!(50)), ("b", dec!(30)), ("c", dec!(20))]);
        set.set_percentage("a", dec!(60));

        assert_eq!(
            shares(&set),
            vec![(dec!(60), dec!(120)), (dec!(24), dec!(48)), (dec!(16), dec!(32))]
        );
    }

    #[test]
    fn zero_shares_receive_evenly() {
        let mut set = set_of(dec!(100), &[("a", dec!(100)), ("b", dec!(0)), ("c", dec!(0))]);
        set.set_percentage("a", dec!(40));

        assert_eq!(set.participant("b").unwrap().percentage, dec!(30));
        assert_eq!(set.participant("c").unwrap().percentage, dec!(30));
    }

    #[test]
    fn rounding_drift_is_repaired() {
        let mut set = set_of(dec!(100), &[("a", dec!(33.3)), ("b", dec!(33.3)), ("c", dec!(33.4))]);
        set.set_percentage("a", dec!(50));

        assert_eq!(set.percentage_sum(), dec!(100));
        assert_eq!(set.participant("b").unwrap().percentage, dec!(25));
        assert_eq!(set.participant("c").unwrap().percentage, dec!(25));
    }

    #[test]
    fn percentage_input_is_clamped() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        set.set_percentage("a", dec!(150));
        assert_eq!(shares(&set), vec![(dec!(100), dec!(100)), (dec!(0), dec!(0))]);

        set.set_percentage("a", dec!(-5));
        assert_eq!(shares(&set), vec![(dec!(0), dec!(0)), (dec!(100), dec!(100))]);
    }

    #[test]
    fn target_yields_when_others_run_dry() {
        let mut set = set_of(dec!(100), &[("a", dec!(20)), ("b", dec!(50)), ("c", dec!(30))]);
        set.toggle_lock("c");
        set.set_percentage("a", dec!(90));

        assert_eq!(set.participant("a").unwrap().percentage, dec!(70));
        assert_eq!(set.participant("b").unwrap().percentage, dec!(0));
        assert_eq!(set.participant("c").unwrap().percentage, dec!(30));
    }

    #[test]
    fn locked_and_unknown_edits_are_ignored() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        let before = set.clone();
        set.set_percentage("zz", dec!(10));
        set.set_amount("zz", dec!(10));
        set.toggle_lock("zz");
        assert_eq!(set, before);

        set.toggle_lock("a");
        set.set_percentage("a", dec!(10));
        set.set_amount("a", dec!(10));
        assert_eq!(set.participant("a").unwrap().percentage, dec!(50));
    }

    #[test]
    fn amount_edit_rebalances_and_derives_percentages() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        set.switch_mode();
        set.set_amount("a", dec!(70));

        assert_eq!(shares(&set), vec![(dec!(70), dec!(70)), (dec!(30), dec!(30))]);
        assert!(!set.is_over_allocated());
        assert!(set.validate().is_ok());
    }

    #[test]
    fn amount_overflow_with_locked_partner_is_flagged() {
        let mut set = set_of(dec!(100), &[("a", dec!(40)), ("b", dec!(30)), ("c", dec!(30))]);
        set.switch_mode();
        set.toggle_lock("c");
        set.set_amount("a", dec!(90));

        assert_eq!(set.participant("a").unwrap().amount, dec!(90));
        assert_eq!(set.participant("b").unwrap().amount, dec!(0));
        assert_eq!(set.participant("c").unwrap().amount, dec!(30));
        assert!(set.is_over_allocated());
        assert_eq!(set.unallocated(), dec!(-20));
        assert_eq!(set.validate(), Err(SplitError::OverAllocated { excess: dec!(20) }));
    }

    #[test]
    fn existing_overflow_is_scaled_back() {
        let participants = vec![
            Participant::new("a", "A").with_share(dec!(50), dec!(60)),
            Participant::new("b", "B").with_share(dec!(50), dec!(60)),
        ];
        let mut set = AllocationSet::from_participants(
            dec!(100),
            AllocationMode::Amount,
            participants,
            SplitPolicy::default(),
        )
        .unwrap();
        assert!(set.is_over_allocated());

        set.set_amount("a", dec!(50));
        assert_eq!(set.participant("a").unwrap().amount, dec!(50));
        assert_eq!(set.participant("b").unwrap().amount, dec!(50));
        assert!(!set.is_over_allocated());
    }

    #[test]
    fn add_participant_splits_three_ways() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        set.add_participant().unwrap();

        assert_eq!(set.len(), 3);
        let pct: Vec<Decimal> = set.participants().iter().map(|p| p.percentage).collect();
        assert_eq!(pct, vec![dec!(33.3), dec!(33.3), dec!(33.4)]);
        assert_eq!(set.percentage_sum(), dec!(100));
        assert_eq!(set.participants()[2].name, "Partner 3");
        assert_eq!(set.participants()[2].amount, dec!(33.40));
    }

    #[test]
    fn add_participant_keeps_locked_share() {
        let mut set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(50))]);
        set.toggle_lock("a");
        set.add_participant().unwrap();

        assert_eq!(set.participant("a").unwrap().percentage, dec!(50));
        assert_eq!(set.participant("b").unwrap().percentage, dec!(33.3));
        assert_eq!(set.participants()[2].percentage, dec!(16.7));
    }

    #[test]
    fn child_expense_names_third_participant() {
        let policy = SplitPolicy::default().for_child_expense(true);
        let set = AllocationSet::default_split(dec!(90), policy).unwrap();
        let pct: Vec<Decimal> = set.participants().iter().map(|p| p.percentage).collect();
        assert_eq!(pct, vec![dec!(33.3), dec!(33.3), dec!(33.4)]);
        assert_eq!(set.participants()[2].name, "Kind");
        assert_eq!(set.amount_sum(), dec!(90));
    }

    #[test]
    fn remove_participant_redistributes_proportionally() {
        let mut set = set_of(dec!(100), &[("a", dec!(40)), ("b", dec!(30)), ("c", dec!(30))]);
        set.remove_participant("c").unwrap();

        assert_eq!(shares(&set), vec![(dec!(57.1), dec!(57.10)), (dec!(42.9), dec!(42.90))]);
    }

    #[test]
    fn remove_with_everyone_locked_unlocks_first() {
        let mut set = set_of(dec!(100), &[("a", dec!(40)), ("b", dec!(30)), ("c", dec!(30))]);
        set.toggle_lock("a");
        set.toggle_lock("b");
        set.remove_participant("c").unwrap();

        let a = set.participant("a").unwrap();
        assert!(!a.locked);
        assert_eq!(a.percentage, dec!(70));
        assert!(set.participant("b").unwrap().locked);
        assert_eq!(set.participant("b").unwrap().percentage, dec!(30));
    }

    #[test]
    fn remove_in_amount_mode_conserves_amounts() {
        let mut set = set_of(dec!(100), &[("a", dec!(40)), ("b", dec!(30)), ("c", dec!(30))]);
        set.switch_mode();
        set.remove_participant("c").unwrap();

        assert_eq!(shares(&set), vec![(dec!(57.1), dec!(57.14)), (dec!(42.9), dec!(42.86))]);
    }

    #[test]
    fn participant_limits_follow_policy() {
        let mut set = AllocationSet::even(dec!(100), 5, SplitPolicy::default()).unwrap();
        assert_eq!(set.add_participant(), Ok(()));
        assert_eq!(set.len(), 5);

        let mut strict = AllocationSet::even(dec!(100), 5, SplitPolicy::with_limit(LimitPolicy::Reject)).unwrap();
        assert_eq!(
            strict.add_participant(),
            Err(SplitError::TooManyParticipants { max: MAX_PARTICIPANTS })
        );

        let mut pair = AllocationSet::even(dec!(100), 2, SplitPolicy::with_limit(LimitPolicy::Reject)).unwrap();
        assert_eq!(
            pair.remove_participant("p1"),
            Err(SplitError::TooFewParticipants { min: MIN_PARTICIPANTS })
        );
        assert_eq!(pair.len(), 2);
    }

    #[test]
    fn new_participant_ids_are_unique() {
        let mut set = AllocationSet::even(dec!(100), 3, SplitPolicy::default()).unwrap();
        set.remove_participant("p2").unwrap();
        set.add_participant().unwrap();
        set.add_participant().unwrap();

        let ids: Vec<&str> = set.participants().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p2", "p4"]);
    }

    #[test]
    fn distribute_evenly_unlocks_and_is_idempotent() {
        let mut set = set_of(dec!(100), &[("a", dec!(10)), ("b", dec!(20)), ("c", dec!(70))]);
        set.toggle_lock("c");
        set.distribute_evenly();
        let once = set.clone();
        set.distribute_evenly();

        assert_eq!(set, once);
        assert!(set.participants().iter().all(|p| !p.locked));
        assert_eq!(
            shares(&set),
            vec![(dec!(33.4), dec!(33.40)), (dec!(33.3), dec!(33.30)), (dec!(33.3), dec!(33.30))]
        );
        assert!(set.validate().is_ok());
    }

    #[test]
    fn distribute_evenly_in_amount_mode_splits_the_total() {
        let mut set = set_of(dec!(100), &[("a", dec!(10)), ("b", dec!(20)), ("c", dec!(70))]);
        set.switch_mode();
        set.distribute_evenly();

        assert_eq!(
            shares(&set),
            vec![(dec!(33.3), dec!(33.34)), (dec!(33.3), dec!(33.33)), (dec!(33.3), dec!(33.33))]
        );
        assert_eq!(set.amount_sum(), dec!(100));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn switch_mode_round_trip() {
        let mut set = set_of(dec!(100), &[("a", dec!(57.1)), ("b", dec!(42.9))]);
        let before = set.clone();
        set.switch_mode();
        assert_eq!(set.mode(), AllocationMode::Amount);
        set.switch_mode();
        assert_eq!(set, before);
    }

    #[test]
    fn switch_to_percentage_uses_allocated_sum() {
        let participants = vec![
            Participant::new("a", "A").with_share(dec!(0), dec!(30)),
            Participant::new("b", "B").with_share(dec!(0), dec!(30)),
        ];
        let mut set =
            AllocationSet::from_participants(dec!(100), AllocationMode::Amount, participants, SplitPolicy::default())
                .unwrap();
        set.switch_mode();

        assert_eq!(set.participant("a").unwrap().percentage, dec!(50));
        assert_eq!(set.participant("b").unwrap().percentage, dec!(50));
        assert_eq!(set.amount_sum(), dec!(100));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn from_participants_rejects_bad_input() {
        let one = vec![Participant::new("a", "A")];
        assert!(matches!(
            AllocationSet::from_participants(dec!(10), AllocationMode::Percentage, one, SplitPolicy::default()),
            Err(SplitError::ParticipantCount { count: 1, .. })
        ));

        let dupes = vec![Participant::new("a", "A"), Participant::new("a", "B")];
        assert_eq!(
            AllocationSet::from_participants(dec!(10), AllocationMode::Percentage, dupes, SplitPolicy::default()),
            Err(SplitError::DuplicateParticipant("a".into()))
        );

        assert_eq!(
            AllocationSet::even(dec!(-1), 2, SplitPolicy::default()),
            Err(SplitError::NegativeTotal(dec!(-1)))
        );
        assert_eq!(
            AllocationSet::even(dec!(10.005), 2, SplitPolicy::default()),
            Err(SplitError::SubCentTotal(dec!(10.005)))
        );
        assert!(AllocationSet::even(dec!(10.500), 2, SplitPolicy::default()).is_ok());

        let huge = MAX_AMOUNT * dec!(1000);
        assert_eq!(
            AllocationSet::default_split(huge, SplitPolicy::default()),
            Err(SplitError::AmountTooLarge(huge))
        );
        let inflated = vec![
            Participant::new("a", "A").with_share(dec!(50), huge),
            Participant::new("b", "B").with_share(dec!(50), dec!(5)),
        ];
        assert_eq!(
            AllocationSet::from_participants(dec!(10), AllocationMode::Amount, inflated, SplitPolicy::default()),
            Err(SplitError::AmountTooLarge(huge))
        );
    }

    #[test]
    fn largest_total_survives_amount_edits() {
        let mut set = AllocationSet::default_split(MAX_AMOUNT, SplitPolicy::default()).unwrap();
        set.switch_mode();
        set.set_amount("p1", Decimal::ZERO);
        assert_eq!(set.participant("p2").unwrap().amount, MAX_AMOUNT);

        set.set_amount("p1", MAX_AMOUNT * dec!(1000));
        assert_eq!(set.participant("p1").unwrap().amount, MAX_AMOUNT);
        assert_eq!(set.participant("p2").unwrap().amount, Decimal::ZERO);
        assert!(set.validate().is_ok());

        set.add_participant().unwrap();
        set.switch_mode();
        set.set_percentage("p1", dec!(12.5));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn sub_cent_totals_never_reach_the_participants() {
        assert!(AllocationSet::default_split(dec!(10.005), SplitPolicy::default()).is_err());

        let set = AllocationSet::default_split(dec!(10.01), SplitPolicy::default()).unwrap();
        assert!(set.participants().iter().all(|p| p.amount.normalize().scale() <= AMOUNT_DP));
    }

    #[test]
    fn percentage_mode_amounts_must_follow_percentages() {
        let participants = vec![
            Participant::new("a", "A").with_share(dec!(50), dec!(1000)),
            Participant::new("b", "B").with_share(dec!(50), dec!(1000)),
        ];
        let set =
            AllocationSet::from_participants(dec!(80), AllocationMode::Percentage, participants, SplitPolicy::default())
                .unwrap();
        assert_eq!(
            set.validate(),
            Err(SplitError::AmountMismatch {
                id: "a".into(),
                amount: dec!(1000),
                expected: dec!(40),
            })
        );

        let set = set_of(dec!(80), &[("a", dec!(50)), ("b", dec!(50))]);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn removing_unknown_id_is_a_no_op_even_at_the_minimum() {
        let mut pair = AllocationSet::even(dec!(100), 2, SplitPolicy::with_limit(LimitPolicy::Reject)).unwrap();
        let before = pair.clone();
        assert_eq!(pair.remove_participant("nobody"), Ok(()));
        assert_eq!(pair, before);
    }

    #[test]
    fn validate_reports_percentage_drift() {
        let set = set_of(dec!(100), &[("a", dec!(50)), ("b", dec!(40))]);
        assert_eq!(set.validate(), Err(SplitError::PercentageSum { sum: dec!(90) }));
    }
}
