//! Integration tests for round generation.

use prize_bracket_web::{
    generate_round, generate_round_with_rng, record_result, register_player, Tournament,
    TournamentError, TournamentFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

fn tournament_with_players(n: usize, format: TournamentFormat) -> Tournament {
    let mut t = Tournament::with_format(Uuid::new_v4(), "Cup", format);
    for i in 0..n {
        register_player(&mut t, &format!("P{i}")).unwrap();
    }
    t
}

#[test]
fn generate_requires_two_players() {
    for n in [0, 1] {
        let mut t = tournament_with_players(n, TournamentFormat::Open);
        let before = t.clone();
        assert_eq!(
            generate_round(&mut t),
            Err(TournamentError::InsufficientPlayers { needed: 2, current: n })
        );
        assert_eq!(t, before);
    }
}

#[test]
fn even_count_pairs_everyone() {
    let mut t = tournament_with_players(6, TournamentFormat::Open);
    let pairings = generate_round(&mut t).unwrap();
    assert_eq!(pairings.round, 1);
    assert_eq!(t.current_round, 1);
    assert_eq!(t.matches.len(), 3);
    assert!(t.bye.is_none());

    let seen: BTreeSet<&str> = t
        .matches
        .iter()
        .flat_map(|m| [m.player_1.as_str(), m.player_2.as_str()])
        .collect();
    assert_eq!(seen.len(), 6);
    assert!(t.is_consistent());
}

#[test]
fn odd_count_gives_one_bye() {
    let mut t = tournament_with_players(5, TournamentFormat::Open);
    let pairings = generate_round(&mut t).unwrap();
    assert_eq!(pairings.matches.len(), 2);
    let bye = pairings.bye.expect("odd player out");
    assert!(t.is_registered(&bye));
    assert!(t.matches.iter().all(|m| !m.involves(&bye)));
}

#[test]
fn each_generation_increments_round_once() {
    let mut t = tournament_with_players(4, TournamentFormat::Open);
    for expected in 1..=3 {
        generate_round(&mut t).unwrap();
        assert_eq!(t.current_round, expected);
    }
}

#[test]
fn open_format_replaces_unplayed_round() {
    let mut t = tournament_with_players(4, TournamentFormat::Open);
    generate_round(&mut t).unwrap();
    generate_round(&mut t).unwrap();
    assert_eq!(t.matches.len(), 2);
    assert!(t.history.is_empty());
}

#[test]
fn knockout_refuses_while_round_is_open() {
    let mut t = tournament_with_players(4, TournamentFormat::Knockout);
    generate_round(&mut t).unwrap();
    let before = t.clone();
    assert_eq!(
        generate_round(&mut t),
        Err(TournamentError::RoundInProgress { pending: 2 })
    );
    assert_eq!(t, before);
}

#[test]
fn knockout_draws_only_remaining_players() {
    let mut t = tournament_with_players(4, TournamentFormat::Knockout);
    generate_round(&mut t).unwrap();
    let winners: Vec<String> = t.matches.iter().map(|m| m.player_1.clone()).collect();
    for w in &winners {
        record_result(&mut t, w, 0.0).unwrap();
    }
    assert_eq!(t.eliminated.len(), 2);

    generate_round(&mut t).unwrap();
    assert_eq!(t.current_round, 2);
    assert_eq!(t.matches.len(), 1);
    let m = &t.matches[0];
    assert!(winners.contains(&m.player_1) && winners.contains(&m.player_2));
}

#[test]
fn same_seed_gives_same_pairings() {
    let base = tournament_with_players(8, TournamentFormat::Open);
    let mut a = base.clone();
    let mut b = base;
    let pa = generate_round_with_rng(&mut a, &mut StdRng::seed_from_u64(7)).unwrap();
    let pb = generate_round_with_rng(&mut b, &mut StdRng::seed_from_u64(7)).unwrap();
    let names = |p: &prize_bracket_web::Pairings| {
        p.matches
            .iter()
            .map(|m| (m.player_1.clone(), m.player_2.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&pa), names(&pb));
}

#[test]
fn every_pairing_of_three_players_shows_up() {
    // 3 players: the bye can land on any of them.
    let mut byes: HashMap<String, usize> = HashMap::new();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..300 {
        let mut t = tournament_with_players(3, TournamentFormat::Open);
        let p = generate_round_with_rng(&mut t, &mut rng).unwrap();
        *byes.entry(p.bye.unwrap()).or_default() += 1;
    }
    assert_eq!(byes.len(), 3);
    assert!(byes.values().all(|&n| n > 50));
}
