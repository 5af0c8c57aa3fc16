use homegame_core::{LedgerKind, LedgerReader, Outcome, ValidationError, MAX_AMOUNT};
use homegame_db::{Database, DbError, NewPlayer, NewSession, PlayerUpdate, SessionUpdate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn add_player(db: &Database, name: &str, nickname: Option<&str>) -> String {
    db.players()
        .create(&NewPlayer {
            name: name.to_string(),
            nickname: nickname.map(str::to_string),
            emoji: None,
        })
        .unwrap()
        .id
}

fn add_session<S: AsRef<str>>(db: &Database, date: &str, player_ids: &[S]) -> String {
    db.sessions()
        .create(&NewSession {
            date: date.to_string(),
            description: Some("Friday game".to_string()),
            player_ids: player_ids.iter().map(|s| s.as_ref().to_string()).collect(),
        })
        .unwrap()
        .session
        .id
}

// ============================================================
// Players
// ============================================================

#[test]
fn test_player_fields_are_normalized() {
    let db = Database::open_in_memory().unwrap();
    let player = db
        .players()
        .create(&NewPlayer {
            name: "  Alice  ".to_string(),
            nickname: Some("   ".to_string()),
            emoji: Some("🃏".to_string()),
        })
        .unwrap();

    assert_eq!(player.name, "Alice");
    assert_eq!(player.nickname, None);
    assert_eq!(player.emoji.as_deref(), Some("🃏"));
    assert!(!player.has_best_combo);
}

#[test]
fn test_player_empty_name_is_validation_error() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .players()
        .create(&NewPlayer {
            name: "   ".to_string(),
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, DbError::Validation(ValidationError::EmptyName)));
    assert!(db.players().list().unwrap().is_empty());
}

#[test]
fn test_player_update_and_missing() {
    let db = Database::open_in_memory().unwrap();
    let id = add_player(&db, "Bob", Some("Bobby"));

    let updated = db
        .players()
        .update(
            &id,
            &PlayerUpdate {
                name: "Robert".to_string(),
                nickname: None,
                emoji: Some("🎲".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Robert");
    assert_eq!(updated.nickname, None);
    assert_eq!(updated.emoji.as_deref(), Some("🎲"));

    let err = db
        .players()
        .update(
            "nope",
            &PlayerUpdate {
                name: "X".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "Player", .. }));
}

#[test]
fn test_players_listed_by_name() {
    let db = Database::open_in_memory().unwrap();
    add_player(&db, "Carol", None);
    add_player(&db, "Alice", None);
    add_player(&db, "Bob", None);

    let names: Vec<String> = db
        .players()
        .list()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
}

#[test]
fn test_player_with_sessions() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let early = add_session(&db, "2025-01-03", &[&alice, &bob]);
    let late = add_session(&db, "2025-01-10", &[&alice]);

    let with_sessions = db.players().get_with_sessions(&alice).unwrap().unwrap();
    let ids: Vec<&str> = with_sessions.sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![late.as_str(), early.as_str()]);

    let bob_sessions = db.players().get_with_sessions(&bob).unwrap().unwrap();
    assert_eq!(bob_sessions.sessions.len(), 1);

    assert!(db.players().get_with_sessions("nope").unwrap().is_none());
}

#[test]
fn test_delete_player_cascades() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let session = add_session(&db, "2025-02-01", &[&alice, &bob]);
    db.ledger().add_buy_in(&session, &alice, dec!(50)).unwrap();
    db.ledger().add_cash_out(&session, &bob, dec!(20)).unwrap();

    assert!(db.players().delete(&alice).unwrap());
    assert!(!db.players().delete(&alice).unwrap());

    let detail = db.sessions().get(&session).unwrap().unwrap();
    assert_eq!(detail.players.len(), 1);
    assert_eq!(detail.players[0].player.id, bob);
    assert!(detail.buy_ins.is_empty());
    assert_eq!(detail.cash_outs.len(), 1);

    let reader = db.reader();
    assert!(reader.list_buy_ins(None, Some(alice.as_str())).unwrap().is_empty());
    assert!(reader.list_roster_entries(Some(alice.as_str())).unwrap().is_empty());
}

// ============================================================
// Sessions
// ============================================================

#[test]
fn test_session_requires_roster() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .sessions()
        .create(&NewSession {
            date: "2025-02-01".to_string(),
            description: None,
            player_ids: vec![],
        })
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(ValidationError::EmptyRoster)));
    assert!(db.sessions().list().unwrap().is_empty());
}

#[test]
fn test_session_rejects_bad_date() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);

    for date in ["", "next friday", "2025-13-01"] {
        let err = db
            .sessions()
            .create(&NewSession {
                date: date.to_string(),
                description: None,
                player_ids: vec![alice.clone()],
            })
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)), "date {:?}", date);
    }
}

#[test]
fn test_session_with_unknown_player_is_not_created() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);

    let err = db
        .sessions()
        .create(&NewSession {
            date: "2025-02-01".to_string(),
            description: None,
            player_ids: vec![alice, "ghost".to_string()],
        })
        .unwrap_err();

    assert!(matches!(err, DbError::NotFound { entity: "Player", .. }));
    assert!(db.sessions().list().unwrap().is_empty());
    assert!(db.reader().list_roster_entries(None).unwrap().is_empty());
}

#[test]
fn test_duplicate_roster_ids_collapse() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let session = add_session(&db, "2025-02-01", &[&alice, &alice]);

    let roster = db.sessions().roster(&session).unwrap();
    assert_eq!(roster.len(), 1);
}

#[test]
fn test_session_accepts_timestamp_date() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let id = add_session(&db, "2025-02-07T20:30:00Z", &[&alice]);

    let detail = db.sessions().get(&id).unwrap().unwrap();
    assert_eq!(detail.session.date.to_string(), "2025-02-07");
    assert_eq!(detail.session.description.as_deref(), Some("Friday game"));
}

#[test]
fn test_roster_replacement() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let carol = add_player(&db, "Carol", None);
    let session = add_session(&db, "2025-02-01", &[&alice, &bob]);

    let detail = db
        .sessions()
        .update(
            &session,
            &SessionUpdate {
                date: "2025-02-02".to_string(),
                description: None,
                player_ids: Some(vec![bob.clone(), carol.clone()]),
            },
        )
        .unwrap();

    let ids: Vec<&str> = detail.players.iter().map(|m| m.player.id.as_str()).collect();
    assert_eq!(ids, vec![bob.as_str(), carol.as_str()]);
    assert_eq!(detail.session.date.to_string(), "2025-02-02");
    assert_eq!(detail.session.description, None);

    // Without player_ids the roster is untouched.
    let detail = db
        .sessions()
        .update(
            &session,
            &SessionUpdate {
                date: "2025-02-02".to_string(),
                description: Some("Rematch".to_string()),
                player_ids: None,
            },
        )
        .unwrap();
    assert_eq!(detail.players.len(), 2);
}

#[test]
fn test_failed_roster_replacement_keeps_old_roster() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let session = add_session(&db, "2025-02-01", &[&alice]);

    let err = db
        .sessions()
        .update(
            &session,
            &SessionUpdate {
                date: "2025-03-01".to_string(),
                description: None,
                player_ids: Some(vec!["ghost".to_string()]),
            },
        )
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));

    let detail = db.sessions().get(&session).unwrap().unwrap();
    assert_eq!(detail.players.len(), 1);
    assert_eq!(detail.session.date.to_string(), "2025-02-01");

    let err = db
        .sessions()
        .update(
            &session,
            &SessionUpdate {
                date: "2025-03-01".to_string(),
                description: None,
                player_ids: Some(vec![]),
            },
        )
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(ValidationError::EmptyRoster)));
}

#[test]
fn test_update_missing_session() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .sessions()
        .update(
            "nope",
            &SessionUpdate {
                date: "2025-03-01".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "Session", .. }));
}

#[test]
fn test_delete_session_cascades() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let session = add_session(&db, "2025-02-01", &[&alice]);
    db.ledger().add_buy_in(&session, &alice, dec!(20)).unwrap();

    assert!(db.sessions().delete(&session).unwrap());
    assert!(db.sessions().get(&session).unwrap().is_none());
    assert!(db.ledger().list(None, None, None).unwrap().is_empty());
    assert!(db.reader().list_roster_entries(None).unwrap().is_empty());
    assert!(!db.sessions().delete(&session).unwrap());
}

#[test]
fn test_sessions_listed_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let old = add_session(&db, "2024-12-20", &[&alice]);
    let new = add_session(&db, "2025-01-17", &[&alice]);

    let ids: Vec<String> = db
        .sessions()
        .list()
        .unwrap()
        .into_iter()
        .map(|d| d.session.id)
        .collect();
    assert_eq!(ids, vec![new, old]);
}

// ============================================================
// Ledger
// ============================================================

#[test]
fn test_ledger_validation_and_not_found() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let session = add_session(&db, "2025-02-01", &[&alice]);

    let err = db.ledger().add_buy_in(&session, &alice, dec!(0)).unwrap_err();
    assert!(matches!(err, DbError::Validation(ValidationError::NonPositiveAmount(_))));

    let err = db.ledger().add_cash_out(&session, &alice, dec!(-5)).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));

    let err = db.ledger().add_buy_in(&session, "", dec!(5)).unwrap_err();
    assert!(matches!(err, DbError::Validation(ValidationError::MissingPlayerId)));

    let err = db.ledger().add_buy_in("nope", &alice, dec!(5)).unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "Session", .. }));

    let err = db.ledger().add_buy_in(&session, "ghost", dec!(5)).unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "Player", .. }));

    assert!(db.ledger().list(None, None, None).unwrap().is_empty());
}

#[test]
fn test_ledger_rejects_out_of_range_amounts() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let session = add_session(&db, "2025-02-01", &[&alice]);

    let err = db.ledger().add_buy_in(&session, &alice, dec!(0.001)).unwrap_err();
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::TooManyDecimalPlaces(_))
    ));

    let err = db
        .ledger()
        .add_cash_out(&session, &alice, dec!(10000000000000))
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(ValidationError::AmountTooLarge(_))));

    assert!(db.ledger().list(None, None, None).unwrap().is_empty());

    db.ledger().add_buy_in(&session, &alice, MAX_AMOUNT).unwrap();
    db.ledger().add_buy_in(&session, &alice, dec!(0.50)).unwrap();
    let profit = db.session_player_profit(&session, &alice).unwrap();
    assert_eq!(profit.buy_ins, dec!(1000000000000.5));
}

#[test]
fn test_unvalidated_rows_that_overflow_are_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("homegame.db");

    let (alice, session) = {
        let db = Database::open_at(&path).unwrap();
        let alice = add_player(&db, "Alice", None);
        let session = add_session(&db, "2025-02-01", &[&alice]);
        (alice, session)
    };

    // Rows written behind the store's back, past the per-entry cap.
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        for id in ["raw-1", "raw-2"] {
            conn.execute(
                "INSERT INTO ledger_entries (id, kind, session_id, player_id, amount, created_at)
                 VALUES (?1, 'buy_in', ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id,
                    session,
                    alice,
                    Decimal::MAX.to_string(),
                    "2025-02-01T20:00:00+00:00"
                ],
            )
            .unwrap();
        }
    }

    let db = Database::open_at(&path).unwrap();
    assert!(matches!(db.player_statistics(), Err(DbError::Overflow(_))));
    assert!(matches!(db.game_matrix(), Err(DbError::Overflow(_))));
    assert!(matches!(
        db.session_player_profit(&session, &alice),
        Err(DbError::Overflow(_))
    ));
    assert!(matches!(db.sessions().get(&session), Err(DbError::Overflow(_))));
}

#[test]
fn test_ledger_line_carries_player_and_exact_amount() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", Some("Ace"));
    let session = add_session(&db, "2025-02-01", &[&alice]);

    let line = db.ledger().add_buy_in(&session, &alice, dec!(12.35)).unwrap();
    assert_eq!(line.entry.kind, LedgerKind::BuyIn);
    assert_eq!(line.entry.amount, dec!(12.35));
    assert_eq!(line.player.nickname.as_deref(), Some("Ace"));

    let stored = db.ledger().get(&line.entry.id).unwrap().unwrap();
    assert_eq!(stored, line);
}

#[test]
fn test_delete_entry_checks_kind() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let session = add_session(&db, "2025-02-01", &[&alice]);
    let buy_in = db.ledger().add_buy_in(&session, &alice, dec!(10)).unwrap();

    assert!(!db.ledger().delete_cash_out(&buy_in.entry.id).unwrap());
    assert!(db.ledger().delete_buy_in(&buy_in.entry.id).unwrap());
    assert!(!db.ledger().delete_buy_in(&buy_in.entry.id).unwrap());
}

#[test]
fn test_unrostered_entry_is_accepted() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let session = add_session(&db, "2025-02-01", &[&alice]);

    db.ledger().add_cash_out(&session, &bob, dec!(30)).unwrap();

    let stats = db.player_statistics().unwrap();
    let bob_stats = stats.iter().find(|s| s.player.id == bob).unwrap();
    assert_eq!(bob_stats.total_cash_outs, dec!(30));
    assert_eq!(bob_stats.profit, dec!(30));
    assert_eq!(bob_stats.sessions_count, 0);
    assert_eq!(bob_stats.win_rate, 0.0);

    // The session's bankroll table lists Bob even though he is not rostered.
    let detail = db.sessions().get(&session).unwrap().unwrap();
    assert_eq!(detail.players.len(), 1);
    let ids: Vec<&str> = detail.bankrolls.iter().map(|b| b.player_id.as_str()).collect();
    assert_eq!(ids, vec![bob.as_str(), alice.as_str()]);
    assert!(!detail.bankrolls[0].rostered);
    assert_eq!(detail.bankrolls[0].bankroll, dec!(30));
    assert!(detail.bankrolls[1].rostered);
}

#[test]
fn test_session_roster_read_is_scoped() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let first = add_session(&db, "2025-02-01", &[&alice, &bob]);
    let second = add_session(&db, "2025-02-08", &[&alice]);

    let reader = db.reader();
    let first_roster = reader.list_session_roster(&first).unwrap();
    assert_eq!(first_roster.len(), 2);
    assert!(first_roster.iter().all(|r| r.session_id == first));

    let second_roster = reader.list_session_roster(&second).unwrap();
    assert_eq!(second_roster.len(), 1);
    assert_eq!(second_roster[0].player_id, alice);

    assert!(reader.list_session_roster("missing").unwrap().is_empty());
}

// ============================================================
// Reports through the database
// ============================================================

#[test]
fn test_statistics_through_database() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let first = add_session(&db, "2025-01-03", &[&alice, &bob]);
    let second = add_session(&db, "2025-01-10", &[&alice, &bob]);

    let ledger = db.ledger();
    ledger.add_buy_in(&first, &alice, dec!(50)).unwrap();
    ledger.add_buy_in(&first, &alice, dec!(50)).unwrap();
    ledger.add_cash_out(&first, &alice, dec!(150)).unwrap();
    ledger.add_buy_in(&first, &bob, dec!(100)).unwrap();
    ledger.add_cash_out(&first, &bob, dec!(50)).unwrap();
    ledger.add_buy_in(&second, &alice, dec!(40)).unwrap();
    ledger.add_cash_out(&second, &alice, dec!(40)).unwrap();
    drop(ledger);

    let stats = db.player_statistics().unwrap();
    assert_eq!(stats.len(), 2);

    let top = &stats[0];
    assert_eq!(top.player.id, alice);
    assert_eq!(top.total_buy_ins, dec!(140));
    assert_eq!(top.total_cash_outs, dec!(190));
    assert_eq!(top.profit, dec!(50));
    assert_eq!(top.sessions_count, 2);
    assert_eq!(top.winning_sessions, 1);
    assert_eq!(top.breakeven_sessions, 1);
    assert_eq!(top.win_rate, 50.0);
    assert_eq!(top.session_stats[0].session_id, first);
    assert_eq!(top.session_stats[1].outcome, Outcome::Breakeven);

    let bottom = &stats[1];
    assert_eq!(bottom.player.id, bob);
    assert_eq!(bottom.profit, dec!(-50));
    assert_eq!(bottom.losing_sessions, 1);
    // No entries in the second session: still counted, as breakeven.
    assert_eq!(bottom.breakeven_sessions, 1);

    let matrix = db.game_matrix().unwrap();
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix[0].session_id, second);
    assert_eq!(matrix[1].players[0].bankroll, dec!(50));
    assert_eq!(matrix[1].players[1].bankroll, dec!(-50));
}

#[test]
fn test_best_combo_is_exclusive() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);

    assert!(db.achievements().best_combo_holder().unwrap().is_none());

    db.achievements().set_best_combo(&alice).unwrap();
    let holder = db.achievements().set_best_combo(&bob).unwrap();
    assert!(holder.has_best_combo);

    let flagged: Vec<String> = db
        .players()
        .list()
        .unwrap()
        .into_iter()
        .filter(|p| p.has_best_combo)
        .map(|p| p.id)
        .collect();
    assert_eq!(flagged, vec![bob.clone()]);

    let report = db.achievements_report().unwrap();
    assert_eq!(report.best_combo_player.map(|p| p.id), Some(bob.clone()));

    let cleared = db.achievements().clear_best_combo(&bob).unwrap();
    assert!(!cleared.has_best_combo);
    assert!(db.achievements().best_combo_holder().unwrap().is_none());

    let err = db.achievements().set_best_combo("ghost").unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
    let err = db.achievements().clear_best_combo("ghost").unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[test]
fn test_achievement_totals() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_player(&db, "Alice", None);
    let bob = add_player(&db, "Bob", None);
    let session = add_session(&db, "2025-02-01", &[&alice, &bob]);

    db.ledger().add_buy_in(&session, &alice, dec!(20)).unwrap();
    db.ledger().add_buy_in(&session, &bob, dec!(80)).unwrap();
    db.ledger().add_cash_out(&session, &alice, dec!(100)).unwrap();

    let report = db.achievements_report().unwrap();
    let top_cash_out = report.top_cash_out_player.unwrap();
    assert_eq!(top_cash_out.player.id, alice);
    assert_eq!(top_cash_out.total, dec!(100));
    let top_buy_in = report.top_buy_in_player.unwrap();
    assert_eq!(top_buy_in.player.id, bob);
    assert_eq!(top_buy_in.total, dec!(80));
}

#[test]
fn test_on_disk_database_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("homegame.db");

    let (alice, session) = {
        let db = Database::open_at(&path).unwrap();
        let alice = add_player(&db, "Alice", None);
        let session = add_session(&db, "2025-02-01", &[&alice]);
        db.ledger().add_buy_in(&session, &alice, dec!(25.10)).unwrap();
        (alice, session)
    };

    let db = Database::open_at(&path).unwrap();
    let profit = db.session_player_profit(&session, &alice).unwrap();
    assert_eq!(profit.buy_ins, dec!(25.10));
    assert_eq!(profit.profit, dec!(-25.10));
    assert_eq!(profit.outcome(), Outcome::Loss);
}
