use dokoscore::{Game, Outcome, Player, Round, RoundStakes, ScoreError, compute_results};

fn roster(ids: &[&str]) -> Vec<Player> {
    ids.iter().map(|id| Player::new(*id, *id, "")).collect()
}

fn outcomes(entries: &[(&str, Outcome)]) -> Vec<(String, Outcome)> {
    entries
        .iter()
        .map(|(id, outcome)| (id.to_string(), *outcome))
        .collect()
}

#[test]
fn loser_pays_stake_winner_gets_cowardice_bonus() -> Result<(), ScoreError> {
    let mut game = Game::new("g", "grp", &roster(&["a", "b", "c", "d"]));
    game.record_round(
        RoundStakes::new(7, 3),
        outcomes(&[("a", Outcome::Win), ("b", Outcome::Lose)]),
    )?;
    let round = game.round(0)?;
    assert_eq!(round.multiplier(), 1);
    assert_eq!(round.points_for("a"), 3);
    assert_eq!(round.points_for("b"), 7);
    assert_eq!(round.points_for("c"), 0);
    assert_eq!(round.points_for("d"), 0);
    Ok(())
}

#[test]
fn bock_doubles_both_stakes() -> Result<(), ScoreError> {
    let mut game = Game::new("g", "grp", &roster(&["a", "b"]));
    game.record_round(
        RoundStakes::new(10, 2),
        outcomes(&[("a", Outcome::Lose), ("b", Outcome::Win)]),
    )?;
    assert_eq!(game.round(0)?.points_for("a"), 10);
    assert_eq!(game.round(0)?.points_for("b"), 2);

    game.toggle_bock(0)?;
    assert!(game.round(0)?.is_bock());
    assert_eq!(game.round(0)?.points_for("a"), 20);
    assert_eq!(game.round(0)?.points_for("b"), 4);
    assert_eq!(game.player("a").map(|p| p.result), Some(20.0));

    game.set_bock(0, false)?;
    assert_eq!(game.round(0)?.multiplier(), 1);
    assert_eq!(game.player("a").map(|p| p.result), Some(10.0));
    Ok(())
}

#[test]
fn solo_is_derived_from_results() {
    let mut lone = Round::new(0, 1, 0);
    lone.set_outcome("a", Outcome::Win);
    lone.set_outcome("b", Outcome::Lose);
    lone.set_outcome("c", Outcome::Unchanged);
    lone.set_outcome("d", Outcome::Unchanged);
    assert!(lone.is_solo());

    let mut pairs = Round::new(0, 1, 0);
    for (id, outcome) in [
        ("a", Outcome::Win),
        ("b", Outcome::Win),
        ("c", Outcome::Lose),
        ("d", Outcome::Lose),
    ] {
        pairs.set_outcome(id, outcome);
    }
    assert!(!pairs.is_solo());
}

#[test]
fn solo_tracks_edits_made_through_the_game() -> Result<(), ScoreError> {
    let mut game = Game::new("g", "grp", &roster(&["a", "b", "c", "d"]));
    game.record_round(
        RoundStakes::new(1, 0),
        outcomes(&[
            ("a", Outcome::Win),
            ("b", Outcome::Win),
            ("c", Outcome::Lose),
            ("d", Outcome::Lose),
        ]),
    )?;
    assert!(!game.round(0)?.is_solo());
    game.set_outcome(0, "b", Outcome::Lose)?;
    assert!(game.round(0)?.is_solo());
    Ok(())
}

#[test]
fn inactive_player_gets_the_table_average() -> Result<(), ScoreError> {
    let mut players = roster(&["a", "b", "c", "d"]);
    players.push(Player::new("e", "e", "").with_active(false));
    let mut game = Game::new("g", "grp", &players);

    // Totals a=10, b=0, c=5, d=0 after these rounds, shifted below to [10,-10,5,-5].
    game.record_round(
        RoundStakes::new(10, 0),
        outcomes(&[("a", Outcome::Lose), ("b", Outcome::Win)]),
    )?;
    game.record_round(
        RoundStakes::new(5, 0),
        outcomes(&[("c", Outcome::Lose), ("d", Outcome::Win)]),
    )?;
    game.record_round(
        RoundStakes::new(-10, 0),
        outcomes(&[("b", Outcome::Lose), ("a", Outcome::Win)]),
    )?;
    game.record_round(
        RoundStakes::new(-5, 0),
        outcomes(&[("d", Outcome::Lose), ("c", Outcome::Win)]),
    )?;

    let results: Vec<f64> = ["a", "b", "c", "d"]
        .iter()
        .filter_map(|id| game.player(id).map(|p| p.result))
        .collect();
    assert_eq!(results, vec![10.0, -10.0, 5.0, -5.0]);
    assert_eq!(game.player("e").map(|p| p.result), Some(0.0));
    assert_eq!(game.average_points(), 0.0);
    Ok(())
}

#[test]
fn average_is_zero_without_active_players() {
    let players = vec![Player::new("a", "a", "").with_active(false)];
    let game = compute_results(&Game::new("g", "grp", &players));
    assert_eq!(game.average_points(), 0.0);
    assert!(!game.average_points().is_nan());
}

#[test]
fn deleting_a_round_keeps_ids_dense() -> Result<(), ScoreError> {
    let mut game = Game::new("g", "grp", &roster(&["a", "b"]));
    for points in [1, 2, 3, 4] {
        game.add_round(RoundStakes::new(points, 0));
    }
    let removed = game.delete_round(1)?;
    assert_eq!(removed.round_points(), 2);

    let ids: Vec<usize> = game.rounds().iter().map(|r| r.id()).collect();
    let points: Vec<i64> = game.rounds().iter().map(|r| r.round_points()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(points, vec![1, 3, 4]);
    Ok(())
}

#[test]
fn deleting_a_round_resettles_totals() -> Result<(), ScoreError> {
    let mut game = Game::new("g", "grp", &roster(&["a", "b"]));
    game.record_round(RoundStakes::new(4, 0), outcomes(&[("a", Outcome::Lose)]))?;
    game.record_round(RoundStakes::new(6, 0), outcomes(&[("a", Outcome::Lose)]))?;
    assert_eq!(game.player("a").map(|p| p.result), Some(10.0));
    game.delete_round(0)?;
    assert_eq!(game.player("a").map(|p| p.result), Some(6.0));
    Ok(())
}

#[test]
fn out_of_range_round_is_reported() {
    let mut game = Game::new("g", "grp", &roster(&["a"]));
    assert!(matches!(
        game.delete_round(0),
        Err(ScoreError::RoundOutOfRange { index: 0, len: 0 })
    ));
    assert!(matches!(
        game.toggle_bock(3),
        Err(ScoreError::RoundOutOfRange { index: 3, .. })
    ));
}

#[test]
fn outcomes_only_for_active_players() {
    let players = vec![
        Player::new("a", "a", ""),
        Player::new("b", "b", "").with_active(false),
    ];
    let mut game = Game::new("g", "grp", &players);
    let inactive = game.record_round(RoundStakes::new(1, 0), outcomes(&[("b", Outcome::Lose)]));
    assert!(matches!(inactive, Err(ScoreError::PlayerNotActive(id)) if id == "b"));
    let unknown = game.record_round(RoundStakes::new(1, 0), outcomes(&[("z", Outcome::Lose)]));
    assert!(matches!(unknown, Err(ScoreError::UnknownPlayer(id)) if id == "z"));
    assert!(game.rounds().is_empty());
}

#[test]
fn new_rounds_list_every_active_player() -> Result<(), ScoreError> {
    let players = vec![
        Player::new("a", "a", ""),
        Player::new("b", "b", ""),
        Player::new("c", "c", "").with_active(false),
    ];
    let mut game = Game::new("g", "grp", &players);
    let index = game.add_round(RoundStakes::new(2, 0).with_bock(true));
    let round = game.round(index)?;
    assert_eq!(round.results().len(), 2);
    assert!(!round.results().contains("c"));
    assert_eq!(round.multiplier(), 2);
    Ok(())
}

#[test]
fn compute_results_is_idempotent() -> Result<(), ScoreError> {
    let mut game = Game::new("g", "grp", &roster(&["a", "b", "c"]));
    game.record_round(
        RoundStakes::new(3, 1),
        outcomes(&[("a", Outcome::Lose), ("b", Outcome::Win), ("c", Outcome::Win)]),
    )?;
    game.set_player_active("c", false)?;
    let once = compute_results(&game);
    let twice = compute_results(&once);
    assert_eq!(once, twice);
    assert_eq!(once.player("c").map(|p| p.result), Some(2.0));
    Ok(())
}
