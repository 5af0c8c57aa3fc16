//! Achievement lookups: biggest cash-out and buy-in totals plus the
//! manually awarded best-combo flag.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::LedgerIndex;
use crate::reader::LedgerReader;
use crate::types::{Amount, Player, PlayerRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTotal {
    pub player: PlayerRef,
    pub total: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievements {
    pub top_cash_out_player: Option<PlayerTotal>,
    pub top_buy_in_player: Option<PlayerTotal>,
    pub best_combo_player: Option<PlayerRef>,
}

pub fn compute_achievements<R: LedgerReader>(reader: &R) -> Result<Achievements, R::Error> {
    let players = reader.list_players()?;
    let buy_ins = reader.list_buy_ins(None, None)?;
    let cash_outs = reader.list_cash_outs(None, None)?;
    let index = LedgerIndex::build(buy_ins.iter().chain(cash_outs.iter()))?;

    Ok(Achievements {
        top_cash_out_player: top_by(&players, |p| index.player(&p.id).cash_outs),
        top_buy_in_player: top_by(&players, |p| index.player(&p.id).buy_ins),
        best_combo_player: players.iter().find(|p| p.has_best_combo).map(Player::to_ref),
    })
}

/// Highest non-zero total; ties go to the alphabetically first name.
fn top_by<F>(players: &[Player], total_of: F) -> Option<PlayerTotal>
where
    F: Fn(&Player) -> Amount,
{
    players
        .iter()
        .map(|p| (p, total_of(p)))
        .filter(|(_, total)| *total > Decimal::ZERO)
        .max_by(|(a, a_total), (b, b_total)| {
            a_total.cmp(b_total).then_with(|| b.name.cmp(&a.name))
        })
        .map(|(player, total)| PlayerTotal {
            player: player.to_ref(),
            total,
        })
}
