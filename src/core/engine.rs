use crate::core::errors::SplitxError;
use crate::core::models::expense::Expense;
use crate::core::models::settlement::{BalanceMap, SettlementResult, SettlementStep, SettlementTransfer};
use crate::core::models::transaction::Transaction;
use indexmap::IndexMap;
use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// Decimal places of the smallest currency unit (cents).
pub const DEFAULT_MONEY_SCALE: u32 = 2;
pub const MAX_MONEY_SCALE: u32 = 6;

/// Turns a group's expenses and direct transactions into net balances and
/// the shortest greedy list of transfers that clears them.
///
/// The engine holds no state between calls; every `compute` builds fresh
/// working vectors and drops them on return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementEngine {
    scale: u32,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        SettlementEngine::new(DEFAULT_MONEY_SCALE)
    }
}

/// One side of the matching: a member and what is left of their balance.
struct Position<'a> {
    member: &'a str,
    remaining: Decimal,
}

impl SettlementEngine {
    pub fn new(scale: u32) -> Self {
        SettlementEngine {
            scale: scale.min(MAX_MONEY_SCALE),
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Computes final balances and the settlement plan for one group snapshot.
    ///
    /// # Arguments
    /// * `active_members` - Members active right now, in membership order.
    /// * `expenses` - Recorded expenses. An expense with an empty `split_between`
    ///   is shared between `active_members`.
    /// * `transactions` - Direct payments; the payer is debited and the receiver credited.
    ///
    /// # Errors
    /// `NoActiveMembers` when an expense has to be split over an empty member list,
    /// `InvalidInput` for non-positive or over-precise amounts and blank names,
    /// `ComputationError` when the balances do not net to zero.
    pub fn compute(
        &self,
        active_members: &[String],
        expenses: &[Expense],
        transactions: &[Transaction],
    ) -> Result<SettlementResult, SplitxError> {
        debug!(
            "Computing settlement over {} members, {} expenses, {} transactions",
            active_members.len(),
            expenses.len(),
            transactions.len()
        );

        let final_balances = self.accumulate(active_members, expenses, transactions)?;

        let total = final_balances
            .values()
            .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(*b))
            .ok_or_else(|| SplitxError::ComputationError("balance total overflowed".to_string()))?;
        if !total.is_zero() {
            warn!("Balances do not net to zero: total {}", total);
            return Err(SplitxError::ComputationError(format!(
                "balances sum to {} instead of zero",
                total
            )));
        }

        let (settlements, settlement_steps) = Self::match_balances(&final_balances)?;
        debug!("Settlement plan has {} transfers", settlements.len());

        Ok(SettlementResult {
            final_balances,
            settlements,
            settlement_steps,
        })
    }

    /// Net balance per member after expenses and transactions.
    ///
    /// Active members come first in the given order, then anyone else in the
    /// order they are first mentioned.
    pub fn accumulate(
        &self,
        active_members: &[String],
        expenses: &[Expense],
        transactions: &[Transaction],
    ) -> Result<BalanceMap, SplitxError> {
        ensure_distinct("active_members", active_members)?;

        let mut balances: BalanceMap = IndexMap::with_capacity(active_members.len());
        for member in active_members {
            balances.insert(member.clone(), Decimal::ZERO);
        }

        for expense in expenses {
            self.validate_amount("amount", expense.amount)?;
            validate_identity("paid_by", &expense.paid_by)?;

            let split_set: &[String] = if expense.split_between.is_empty() {
                active_members
            } else {
                ensure_distinct("split_between", &expense.split_between)?;
                &expense.split_between
            };
            if split_set.is_empty() {
                warn!("Expense {} has nobody to split between", expense.id);
                return Err(SplitxError::NoActiveMembers);
            }

            adjust(&mut balances, &expense.paid_by, expense.amount)?;
            for (member, share) in split_set.iter().zip(self.equal_shares(expense.amount, split_set.len())) {
                adjust(&mut balances, member, -share)?;
            }
        }

        for tx in transactions {
            self.validate_amount("amount", tx.amount)?;
            validate_identity("payer", &tx.payer)?;
            validate_identity("receiver", &tx.receiver)?;

            adjust(&mut balances, &tx.payer, -tx.amount)?;
            adjust(&mut balances, &tx.receiver, tx.amount)?;
        }

        Ok(balances)
    }

    /// Splits `amount` into `count` shares of whole minor units.
    ///
    /// Every share is `amount / count` rounded toward zero; the leftover units
    /// go one each to the first members, so the shares always add back up to
    /// `amount`.
    pub fn equal_shares(&self, amount: Decimal, count: usize) -> Vec<Decimal> {
        if count == 0 {
            return Vec::new();
        }
        let unit = Decimal::new(1, self.scale);
        let divisor = Decimal::from(count as u64);
        let base = (amount / divisor).round_dp_with_strategy(self.scale, RoundingStrategy::ToZero);
        let mut leftover = amount - base * divisor;

        (0..count)
            .map(|_| {
                if leftover >= unit {
                    leftover -= unit;
                    base + unit
                } else {
                    base
                }
            })
            .collect()
    }

    fn validate_amount(&self, field: &str, amount: Decimal) -> Result<(), SplitxError> {
        if amount <= Decimal::ZERO {
            return Err(SplitxError::invalid(
                field,
                "Invalid Amount",
                "Amount must be greater than 0",
            ));
        }
        if amount.round_dp(self.scale) != amount {
            return Err(SplitxError::invalid(
                field,
                "Invalid Amount",
                format!("Amount cannot have more than {} decimal places", self.scale),
            ));
        }
        Ok(())
    }

    /// Greedy two-cursor matching of creditors against debtors.
    fn match_balances(
        balances: &BalanceMap,
    ) -> Result<(Vec<SettlementTransfer>, Vec<SettlementStep>), SplitxError> {
        let mut creditors: Vec<Position<'_>> = balances
            .iter()
            .filter(|(_, b)| **b > Decimal::ZERO)
            .map(|(member, b)| Position {
                member,
                remaining: *b,
            })
            .collect();
        let mut debtors: Vec<Position<'_>> = balances
            .iter()
            .filter(|(_, b)| **b < Decimal::ZERO)
            .map(|(member, b)| Position {
                member,
                remaining: *b,
            })
            .collect();

        let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
        let mut steps = Vec::with_capacity(creditors.len() + debtors.len());
        let (mut i, mut j) = (0, 0);

        while i < creditors.len() && j < debtors.len() {
            let creditor = &mut creditors[i];
            let debtor = &mut debtors[j];
            let amount = creditor.remaining.min(-debtor.remaining);

            let before = IndexMap::from([
                (creditor.member.to_string(), creditor.remaining),
                (debtor.member.to_string(), debtor.remaining),
            ]);
            creditor.remaining -= amount;
            debtor.remaining += amount;
            let after = IndexMap::from([
                (creditor.member.to_string(), creditor.remaining),
                (debtor.member.to_string(), debtor.remaining),
            ]);

            steps.push(SettlementStep {
                action: format!(
                    "Settle {} from {} to {}",
                    amount.normalize(),
                    debtor.member,
                    creditor.member
                ),
                before,
                after,
            });
            transfers.push(SettlementTransfer {
                from: debtor.member.to_string(),
                to: creditor.member.to_string(),
                amount,
            });

            if creditor.remaining.is_zero() {
                i += 1;
            }
            if debtor.remaining.is_zero() {
                j += 1;
            }
        }

        if i < creditors.len() || j < debtors.len() {
            return Err(SplitxError::ComputationError(
                "unmatched balance left after settlement".to_string(),
            ));
        }
        Ok((transfers, steps))
    }
}

fn adjust(balances: &mut BalanceMap, member: &str, delta: Decimal) -> Result<(), SplitxError> {
    let entry = balances.entry(member.to_string()).or_insert(Decimal::ZERO);
    *entry = entry
        .checked_add(delta)
        .ok_or_else(|| SplitxError::ComputationError(format!("balance of {} overflowed", member)))?;
    Ok(())
}

fn validate_identity(field: &str, name: &str) -> Result<(), SplitxError> {
    if name.trim().is_empty() {
        return Err(SplitxError::invalid(
            field,
            format!("Invalid {}", field),
            format!("{} cannot be empty", field),
        ));
    }
    Ok(())
}

fn ensure_distinct(field: &str, members: &[String]) -> Result<(), SplitxError> {
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        validate_identity(field, member)?;
        if !seen.insert(member.as_str()) {
            return Err(SplitxError::invalid(
                field,
                format!("Duplicate {}", field),
                format!("{} is listed more than once", member),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn expense(amount: Decimal, paid_by: &str) -> Expense {
        Expense {
            id: format!("exp-{}-{}", paid_by, amount),
            group_id: "g1".to_string(),
            amount,
            paid_by: paid_by.to_string(),
            description: None,
            split_between: Vec::new(),
            date: Utc::now(),
        }
    }

    fn split_expense(amount: Decimal, paid_by: &str, split: &[&str]) -> Expense {
        Expense {
            split_between: members(split),
            ..expense(amount, paid_by)
        }
    }

    fn transaction(payer: &str, receiver: &str, amount: Decimal) -> Transaction {
        Transaction {
            id: format!("tx-{}-{}", payer, receiver),
            group_id: "g1".to_string(),
            payer: payer.to_string(),
            receiver: receiver.to_string(),
            amount,
            date: Utc::now(),
        }
    }

    fn transfer(from: &str, to: &str, amount: Decimal) -> SettlementTransfer {
        SettlementTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        }
    }

    fn assert_settles_to_zero(result: &SettlementResult) {
        let mut remaining = result.final_balances.clone();
        for t in &result.settlements {
            *remaining.get_mut(&t.from).unwrap() += t.amount;
            *remaining.get_mut(&t.to).unwrap() -= t.amount;
        }
        assert!(remaining.values().all(|b| b.is_zero()), "left over: {:?}", remaining);
    }

    #[test]
    fn single_expense_is_split_between_active_members() {
        let engine = SettlementEngine::default();
        let result = engine
            .compute(&members(&["A", "B", "C"]), &[expense(dec!(90), "A")], &[])
            .unwrap();

        assert_eq!(result.balance_of("A"), dec!(60));
        assert_eq!(result.balance_of("B"), dec!(-30));
        assert_eq!(result.balance_of("C"), dec!(-30));
        assert_eq!(
            result.settlements,
            vec![transfer("B", "A", dec!(30)), transfer("C", "A", dec!(30))]
        );
    }

    #[test]
    fn transaction_debits_payer_and_credits_receiver() {
        let engine = SettlementEngine::default();
        let result = engine
            .compute(
                &members(&["A", "B", "C"]),
                &[expense(dec!(90), "A")],
                &[transaction("B", "A", dec!(30))],
            )
            .unwrap();

        assert_eq!(result.balance_of("A"), dec!(90));
        assert_eq!(result.balance_of("B"), dec!(-60));
        assert_eq!(result.balance_of("C"), dec!(-30));
        assert_eq!(
            result.settlements,
            vec![transfer("B", "A", dec!(60)), transfer("C", "A", dec!(30))]
        );
    }

    #[test]
    fn adding_a_transaction_moves_exactly_its_amount() {
        let engine = SettlementEngine::default();
        let group = members(&["A", "B", "C", "D"]);
        let expenses = vec![expense(dec!(120), "A"), expense(dec!(45.50), "C")];

        let without = engine.compute(&group, &expenses, &[]).unwrap();
        let with = engine
            .compute(&group, &expenses, &[transaction("D", "B", dec!(12.25))])
            .unwrap();

        assert_eq!(with.balance_of("D") - without.balance_of("D"), dec!(-12.25));
        assert_eq!(with.balance_of("B") - without.balance_of("B"), dec!(12.25));
        assert_eq!(with.balance_of("A"), without.balance_of("A"));
        assert_eq!(with.balance_of("C"), without.balance_of("C"));
    }

    #[test]
    fn uneven_split_stays_zero_sum() {
        let engine = SettlementEngine::default();
        let result = engine
            .compute(&members(&["A", "B", "C"]), &[expense(dec!(100), "A")], &[])
            .unwrap();

        let total: Decimal = result.final_balances.values().sum();
        assert!(total.is_zero());
        // leftover cent goes to the first member of the split
        assert_eq!(result.balance_of("A"), dec!(66.66));
        assert_eq!(result.balance_of("B"), dec!(-33.33));
        assert_eq!(result.balance_of("C"), dec!(-33.33));
        assert_settles_to_zero(&result);
    }

    #[test]
    fn equal_shares_hand_out_leftover_units_in_order() {
        let engine = SettlementEngine::new(2);
        assert_eq!(
            engine.equal_shares(dec!(10), 3),
            vec![dec!(3.34), dec!(3.33), dec!(3.33)]
        );
        assert_eq!(engine.equal_shares(dec!(0.05), 3), vec![dec!(0.02), dec!(0.02), dec!(0.01)]);
        assert!(engine.equal_shares(dec!(10), 0).is_empty());

        let whole_units = SettlementEngine::new(0);
        assert_eq!(whole_units.equal_shares(dec!(7), 2), vec![dec!(4), dec!(3)]);
    }

    #[test]
    fn settlements_clear_every_balance_within_the_transfer_bound() {
        let engine = SettlementEngine::default();
        let group = members(&["Ann", "Ben", "Cat", "Dev", "Eve"]);
        let expenses = vec![
            expense(dec!(250), "Ann"),
            expense(dec!(37.90), "Ben"),
            expense(dec!(61.05), "Dev"),
            split_expense(dec!(18), "Eve", &["Cat", "Eve"]),
        ];
        let transactions = vec![transaction("Cat", "Ann", dec!(40)), transaction("Eve", "Ben", dec!(5))];

        let result = engine.compute(&group, &expenses, &transactions).unwrap();

        let creditors = result.final_balances.values().filter(|b| **b > Decimal::ZERO).count();
        let debtors = result.final_balances.values().filter(|b| **b < Decimal::ZERO).count();
        assert!(result.settlements.len() <= creditors + debtors - 1);
        assert!(result.settlements.iter().all(|t| t.amount > Decimal::ZERO));
        assert_settles_to_zero(&result);
    }

    #[test]
    fn steps_record_balances_before_and_after_each_transfer() {
        let engine = SettlementEngine::default();
        let result = engine
            .compute(&members(&["A", "B", "C"]), &[expense(dec!(90), "A")], &[])
            .unwrap();

        assert_eq!(result.settlement_steps.len(), 2);
        let first = &result.settlement_steps[0];
        assert_eq!(first.action, "Settle 30 from B to A");
        assert_eq!(first.before["A"], dec!(60));
        assert_eq!(first.before["B"], dec!(-30));
        assert_eq!(first.after["A"], dec!(30));
        assert_eq!(first.after["B"], dec!(0));

        let second = &result.settlement_steps[1];
        assert_eq!(second.before["A"], dec!(30));
        assert_eq!(second.after["A"], dec!(0));
        assert_eq!(second.after["C"], dec!(0));
    }

    #[test]
    fn split_snapshot_ignores_current_membership() {
        let engine = SettlementEngine::default();
        // C joined after the expense was recorded
        let result = engine
            .compute(
                &members(&["A", "B", "C"]),
                &[split_expense(dec!(50), "A", &["A", "B"])],
                &[],
            )
            .unwrap();

        assert_eq!(result.balance_of("A"), dec!(25));
        assert_eq!(result.balance_of("B"), dec!(-25));
        assert_eq!(result.balance_of("C"), dec!(0));
        assert_eq!(result.settlements, vec![transfer("B", "A", dec!(25))]);
    }

    #[test]
    fn inactive_payer_keeps_a_balance_after_the_active_members() {
        let engine = SettlementEngine::default();
        let result = engine
            .compute(&members(&["B", "C"]), &[expense(dec!(40), "Z")], &[])
            .unwrap();

        let order: Vec<&str> = result.final_balances.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["B", "C", "Z"]);
        assert_eq!(result.balance_of("Z"), dec!(40));
        assert_eq!(
            result.settlements,
            vec![transfer("B", "Z", dec!(20)), transfer("C", "Z", dec!(20))]
        );
    }

    #[test]
    fn no_active_members_is_rejected() {
        let engine = SettlementEngine::default();
        let result = engine.compute(&[], &[expense(dec!(10), "A")], &[]);
        assert!(matches!(result, Err(SplitxError::NoActiveMembers)));
        assert!(result.unwrap_err().is_invalid_input());
    }

    #[test]
    fn empty_group_settles_to_nothing() {
        let engine = SettlementEngine::default();
        let result = engine.compute(&[], &[], &[]).unwrap();
        assert!(result.final_balances.is_empty());
        assert!(result.settlements.is_empty());
        assert!(result.settlement_steps.is_empty());
    }

    #[test]
    fn non_positive_and_over_precise_amounts_are_rejected() {
        let engine = SettlementEngine::default();
        let group = members(&["A", "B"]);

        for bad in [dec!(0), dec!(-5), dec!(1.005)] {
            let result = engine.compute(&group, &[expense(bad, "A")], &[]);
            assert!(
                matches!(result, Err(SplitxError::InvalidInput(ref field, _)) if field == "amount"),
                "{} accepted",
                bad
            );
        }

        let result = engine.compute(&group, &[], &[transaction("A", "B", dec!(-1))]);
        assert!(matches!(result, Err(SplitxError::InvalidInput(..))));
    }

    #[test]
    fn blank_and_duplicate_names_are_rejected() {
        let engine = SettlementEngine::default();

        let blank_payer = engine.compute(&members(&["A"]), &[expense(dec!(5), " ")], &[]);
        assert!(matches!(blank_payer, Err(SplitxError::InvalidInput(ref f, _)) if f == "paid_by"));

        let repeated = engine.compute(&members(&["A", "A"]), &[], &[]);
        assert!(matches!(repeated, Err(SplitxError::InvalidInput(ref f, _)) if f == "active_members"));

        let repeated_split = engine.compute(&members(&["A"]), &[split_expense(dec!(5), "A", &["A", "A"])], &[]);
        assert!(matches!(repeated_split, Err(SplitxError::InvalidInput(ref f, _)) if f == "split_between"));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let engine = SettlementEngine::default();
        let group = members(&["A", "B"]);
        let expenses = vec![expense(dec!(10), "A")];
        let before = format!("{:?}{:?}", group, expenses);

        engine.compute(&group, &expenses, &[]).unwrap();

        assert_eq!(before, format!("{:?}{:?}", group, expenses));
    }

    #[test]
    fn scale_is_capped() {
        assert_eq!(SettlementEngine::new(12).scale(), MAX_MONEY_SCALE);
    }
}
