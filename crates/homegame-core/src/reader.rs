//! Read contract the aggregation engine consumes.

use crate::engine::AmountOverflow;
use crate::types::{LedgerEntry, Player, RosterEntry, Session};

/// Read access to the ledger, the session roster and the registries.
///
/// Every report issues all of its reads through a single reader, so an
/// implementation that holds a lock (or a read transaction) for its lifetime
/// gives the report a consistent snapshot. Filters left as `None` match
/// everything.
///
/// `Error` absorbs [`AmountOverflow`] so that summing what the reader returned
/// surfaces through the same error as reading it.
pub trait LedgerReader {
    type Error: std::error::Error + From<AmountOverflow> + Send + Sync + 'static;

    fn list_buy_ins(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, Self::Error>;

    fn list_cash_outs(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, Self::Error>;

    fn list_roster_entries(&self, player_id: Option<&str>)
        -> Result<Vec<RosterEntry>, Self::Error>;

    /// Roster of one session. Override when the backing store can filter.
    fn list_session_roster(&self, session_id: &str) -> Result<Vec<RosterEntry>, Self::Error> {
        let mut roster = self.list_roster_entries(None)?;
        roster.retain(|r| r.session_id == session_id);
        Ok(roster)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, Self::Error>;

    fn list_players(&self) -> Result<Vec<Player>, Self::Error>;
}

impl<R: LedgerReader + ?Sized> LedgerReader for &R {
    type Error = R::Error;

    fn list_buy_ins(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, Self::Error> {
        (**self).list_buy_ins(session_id, player_id)
    }

    fn list_cash_outs(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, Self::Error> {
        (**self).list_cash_outs(session_id, player_id)
    }

    fn list_roster_entries(
        &self,
        player_id: Option<&str>,
    ) -> Result<Vec<RosterEntry>, Self::Error> {
        (**self).list_roster_entries(player_id)
    }

    fn list_session_roster(&self, session_id: &str) -> Result<Vec<RosterEntry>, Self::Error> {
        (**self).list_session_roster(session_id)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, Self::Error> {
        (**self).list_sessions()
    }

    fn list_players(&self) -> Result<Vec<Player>, Self::Error> {
        (**self).list_players()
    }
}

pub(crate) fn matches(filter: Option<&str>, value: &str) -> bool {
    filter.map_or(true, |f| f == value)
}
