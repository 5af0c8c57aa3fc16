//! Per (session, player) profit aggregation and outcome classification.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reader::LedgerReader;
use crate::types::{Amount, LedgerEntry, LedgerKind};

/// Result of one player's participation in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    /// Exact comparison against zero. Amounts are decimal, so a session that
    /// nets out is exactly zero and needs no tolerance.
    pub fn classify(profit: Amount) -> Self {
        if profit > Decimal::ZERO {
            Outcome::Win
        } else if profit < Decimal::ZERO {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        }
    }
}

/// A running total left the range `Decimal` can represent.
///
/// Validated writes cannot get here; a ledger filled from elsewhere can.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} total out of range after adding {amount}")]
pub struct AmountOverflow {
    pub kind: LedgerKind,
    pub amount: Amount,
}

/// Buy-ins, cash-outs and their difference for some scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlayerProfit {
    pub buy_ins: Amount,
    pub cash_outs: Amount,
    pub profit: Amount,
}

impl SessionPlayerProfit {
    /// Sum ledger entries of both kinds. The caller is responsible for
    /// scoping the entries; no filtering happens here.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, AmountOverflow>
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        let mut totals = Self::default();
        for entry in entries {
            totals.add(entry.kind, entry.amount)?;
        }
        Ok(totals)
    }

    /// Add one entry. On overflow `self` is left unchanged.
    pub(crate) fn add(&mut self, kind: LedgerKind, amount: Amount) -> Result<(), AmountOverflow> {
        let overflow = || AmountOverflow { kind, amount };
        let mut next = *self;
        let total = match kind {
            LedgerKind::BuyIn => &mut next.buy_ins,
            LedgerKind::CashOut => &mut next.cash_outs,
        };
        *total = total.checked_add(amount).ok_or_else(overflow)?;
        next.profit = next
            .cash_outs
            .checked_sub(next.buy_ins)
            .ok_or_else(overflow)?;
        *self = next;
        Ok(())
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::classify(self.profit)
    }
}

/// Profit for one (session, player) pair, read fresh from the ledger.
///
/// A pair with no entries (rostered or not) yields all zeros.
pub fn compute_session_player_profit<R: LedgerReader>(
    reader: &R,
    session_id: &str,
    player_id: &str,
) -> Result<SessionPlayerProfit, R::Error> {
    let buy_ins = reader.list_buy_ins(Some(session_id), Some(player_id))?;
    let cash_outs = reader.list_cash_outs(Some(session_id), Some(player_id))?;

    Ok(SessionPlayerProfit::from_entries(
        buy_ins.iter().chain(cash_outs.iter()),
    )?)
}

/// Totals keyed by (session, player) and by player, built in one pass.
#[derive(Debug, Default)]
pub(crate) struct LedgerIndex {
    by_pair: HashMap<(String, String), SessionPlayerProfit>,
    by_player: HashMap<String, SessionPlayerProfit>,
}

impl LedgerIndex {
    pub(crate) fn build<'a, I>(entries: I) -> Result<Self, AmountOverflow>
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        let mut index = Self::default();
        for entry in entries {
            index
                .by_pair
                .entry((entry.session_id.clone(), entry.player_id.clone()))
                .or_default()
                .add(entry.kind, entry.amount)?;
            index
                .by_player
                .entry(entry.player_id.clone())
                .or_default()
                .add(entry.kind, entry.amount)?;
        }
        Ok(index)
    }

    pub(crate) fn session_player(&self, session_id: &str, player_id: &str) -> SessionPlayerProfit {
        self.by_pair
            .get(&(session_id.to_string(), player_id.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn player(&self, player_id: &str) -> SessionPlayerProfit {
        self.by_player.get(player_id).copied().unwrap_or_default()
    }

    /// Whether any indexed entry belongs to the player.
    pub(crate) fn has_player(&self, player_id: &str) -> bool {
        self.by_player.contains_key(player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(Outcome::classify(dec!(0.01)), Outcome::Win);
        assert_eq!(Outcome::classify(dec!(-0.01)), Outcome::Loss);
        assert_eq!(Outcome::classify(dec!(0)), Outcome::Breakeven);
        assert_eq!(Outcome::classify(dec!(0.00)), Outcome::Breakeven);
    }

    #[test]
    fn test_no_entries_is_zero() {
        let mut ledger = MemoryLedger::new();
        let p = ledger.add_player("Alice", None);
        let s = ledger.add_session(date(), None);
        ledger.enroll(&s, &p);

        let result = compute_session_player_profit(&ledger, &s, &p).unwrap();
        assert_eq!(result, SessionPlayerProfit::default());
        assert_eq!(result.outcome(), Outcome::Breakeven);
    }

    #[test]
    fn test_win_and_loss_scenarios() {
        let mut ledger = MemoryLedger::new();
        let a = ledger.add_player("A", None);
        let b = ledger.add_player("B", None);
        let x = ledger.add_session(date(), None);
        ledger.enroll(&x, &a);
        ledger.enroll(&x, &b);
        ledger.buy_in(&x, &a, dec!(100));
        ledger.cash_out(&x, &a, dec!(150));
        ledger.buy_in(&x, &b, dec!(200));

        let a_profit = compute_session_player_profit(&ledger, &x, &a).unwrap();
        assert_eq!(a_profit.buy_ins, dec!(100));
        assert_eq!(a_profit.cash_outs, dec!(150));
        assert_eq!(a_profit.profit, dec!(50));
        assert_eq!(a_profit.outcome(), Outcome::Win);

        let b_profit = compute_session_player_profit(&ledger, &x, &b).unwrap();
        assert_eq!(b_profit.profit, dec!(-200));
        assert_eq!(b_profit.outcome(), Outcome::Loss);
    }

    #[test]
    fn test_multiple_buy_ins_sum_before_cash_out() {
        let mut ledger = MemoryLedger::new();
        let p = ledger.add_player("Carol", None);
        let s = ledger.add_session(date(), None);
        ledger.buy_in(&s, &p, dec!(50));
        ledger.buy_in(&s, &p, dec!(30));

        let result = compute_session_player_profit(&ledger, &s, &p).unwrap();
        assert_eq!(result.buy_ins, dec!(80));
        assert_eq!(result.cash_outs, dec!(0));
        assert_eq!(result.profit, dec!(-80));
    }

    #[test]
    fn test_entries_in_other_sessions_are_ignored() {
        let mut ledger = MemoryLedger::new();
        let p = ledger.add_player("Dan", None);
        let s1 = ledger.add_session(date(), None);
        let s2 = ledger.add_session(date(), None);
        ledger.buy_in(&s1, &p, dec!(40));
        ledger.cash_out(&s2, &p, dec!(90));

        let s1_result = compute_session_player_profit(&ledger, &s1, &p).unwrap();
        assert_eq!(s1_result.profit, dec!(-40));
        let s2_result = compute_session_player_profit(&ledger, &s2, &p).unwrap();
        assert_eq!(s2_result.profit, dec!(90));
    }

    #[test]
    fn test_decimal_sums_are_exact() {
        // 0.1 + 0.2 - 0.3 is not zero in binary floating point.
        let mut ledger = MemoryLedger::new();
        let p = ledger.add_player("Eve", None);
        let s = ledger.add_session(date(), None);
        ledger.buy_in(&s, &p, dec!(0.1));
        ledger.buy_in(&s, &p, dec!(0.2));
        ledger.cash_out(&s, &p, dec!(0.3));

        let result = compute_session_player_profit(&ledger, &s, &p).unwrap();
        assert_eq!(result.profit, dec!(0));
        assert_eq!(result.outcome(), Outcome::Breakeven);
    }

    #[test]
    fn test_profit_is_order_independent() {
        let amounts = [
            (LedgerKind::CashOut, dec!(12.75)),
            (LedgerKind::BuyIn, dec!(20)),
            (LedgerKind::BuyIn, dec!(5.25)),
            (LedgerKind::CashOut, dec!(40)),
        ];

        let mut forward = MemoryLedger::new();
        let mut reverse = MemoryLedger::new();
        for ledger in [&mut forward, &mut reverse] {
            ledger.add_player("Finn", None);
            ledger.add_session(date(), None);
        }
        for (kind, amount) in amounts.iter() {
            match kind {
                LedgerKind::BuyIn => forward.buy_in("s2", "p1", *amount),
                LedgerKind::CashOut => forward.cash_out("s2", "p1", *amount),
            };
        }
        for (kind, amount) in amounts.iter().rev() {
            match kind {
                LedgerKind::BuyIn => reverse.buy_in("s2", "p1", *amount),
                LedgerKind::CashOut => reverse.cash_out("s2", "p1", *amount),
            };
        }

        let a = compute_session_player_profit(&forward, "s2", "p1").unwrap();
        let b = compute_session_player_profit(&reverse, "s2", "p1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.profit, dec!(52.75) - dec!(25.25));
    }

    #[test]
    fn test_index_matches_direct_computation() {
        let mut ledger = MemoryLedger::new();
        let p = ledger.add_player("Gus", None);
        let s1 = ledger.add_session(date(), None);
        let s2 = ledger.add_session(date(), None);
        ledger.buy_in(&s1, &p, dec!(10));
        ledger.cash_out(&s1, &p, dec!(25));
        ledger.buy_in(&s2, &p, dec!(30));

        let buy_ins = ledger.list_buy_ins(None, None).unwrap();
        let cash_outs = ledger.list_cash_outs(None, None).unwrap();
        let index = LedgerIndex::build(buy_ins.iter().chain(cash_outs.iter())).unwrap();

        assert_eq!(
            index.session_player(&s1, &p),
            compute_session_player_profit(&ledger, &s1, &p).unwrap()
        );
        assert_eq!(index.player(&p).profit, dec!(-15));
        assert_eq!(index.player("nobody"), SessionPlayerProfit::default());
    }

    #[test]
    fn test_overflowing_totals_are_errors() {
        let mut ledger = MemoryLedger::new();
        let p = ledger.add_player("Hal", None);
        let s = ledger.add_session(date(), None);
        ledger.buy_in(&s, &p, Decimal::MAX);
        ledger.buy_in(&s, &p, Decimal::MAX);

        let err = compute_session_player_profit(&ledger, &s, &p).unwrap_err();
        assert_eq!(err.kind, LedgerKind::BuyIn);
        assert_eq!(err.amount, Decimal::MAX);
    }

    #[test]
    fn test_failed_add_leaves_totals_unchanged() {
        let mut totals = SessionPlayerProfit::default();
        totals.add(LedgerKind::CashOut, Decimal::MAX).unwrap();
        let before = totals;

        // cash_outs fits, but cash_outs - (-1) does not.
        assert!(totals.add(LedgerKind::BuyIn, dec!(-1)).is_err());
        assert_eq!(totals, before);
        assert!(totals.add(LedgerKind::CashOut, dec!(1)).is_err());
        assert_eq!(totals, before);
    }
}
