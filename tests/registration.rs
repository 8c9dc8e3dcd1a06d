//! Integration tests for player registration.

use prize_bracket_web::{register_player, Registration, Tournament, TournamentError};
use uuid::Uuid;

fn cup() -> Tournament {
    Tournament::new(Uuid::new_v4(), "Cup")
}

#[test]
fn register_adds_player_with_zero_prize() {
    let mut t = cup();
    assert_eq!(register_player(&mut t, "A"), Ok(Registration::Added));
    assert_eq!(t.players, vec!["A".to_string()]);
    assert_eq!(t.prize_of("A"), Some(0.0));
    assert!(t.is_consistent());
}

#[test]
fn registering_twice_is_a_no_op() {
    let mut t = cup();
    register_player(&mut t, "A").unwrap();
    let before = t.clone();
    assert_eq!(register_player(&mut t, "A"), Ok(Registration::AlreadyRegistered));
    assert_eq!(t, before);
    assert_eq!(t.players.iter().filter(|p| *p == "A").count(), 1);
}

#[test]
fn names_are_trimmed_before_comparison() {
    let mut t = cup();
    register_player(&mut t, "  A ").unwrap();
    assert_eq!(register_player(&mut t, "A"), Ok(Registration::AlreadyRegistered));
    assert_eq!(t.players, vec!["A".to_string()]);
}

#[test]
fn blank_name_is_rejected() {
    let mut t = cup();
    assert_eq!(register_player(&mut t, "  "), Err(TournamentError::InvalidPlayerName));
    assert!(t.players.is_empty());
}

#[test]
fn registration_order_is_kept() {
    let mut t = cup();
    for p in ["C", "A", "B"] {
        register_player(&mut t, p).unwrap();
    }
    assert_eq!(t.players, vec!["C", "A", "B"]);
}
