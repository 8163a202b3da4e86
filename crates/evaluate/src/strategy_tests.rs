use super::*;

#[test]
fn linear_levels_are_evenly_spaced() {
    let levels = generate_elo_levels(800, 2800, 5).unwrap();
    assert_eq!(levels, vec![800, 1300, 1800, 2300, 2800]);
}

#[test]
fn single_match_plays_at_the_midpoint() {
    assert_eq!(generate_elo_levels(800, 2800, 1).unwrap(), vec![1800]);
}

#[test]
fn uneven_ranges_round_to_integers() {
    let levels = generate_elo_levels(1000, 2000, 4).unwrap();
    assert_eq!(levels, vec![1000, 1333, 1667, 2000]);
}

#[test]
fn level_generation_rejects_bad_input() {
    assert!(matches!(
        generate_elo_levels(800, 2800, 0),
        Err(EvalError::NoMatches)
    ));
    assert!(matches!(
        generate_elo_levels(2800, 800, 3),
        Err(EvalError::BadEloRange { .. })
    ));
}

#[test]
fn warmup_defaults_to_two_but_never_eats_every_match() {
    assert_eq!(resolve_warmup(None, 10).unwrap(), 2);
    assert_eq!(resolve_warmup(None, 2).unwrap(), 1);
    assert_eq!(resolve_warmup(None, 1).unwrap(), 0);
    assert_eq!(resolve_warmup(Some(4), 10).unwrap(), 4);
}

#[test]
fn warmup_must_leave_a_rated_match() {
    assert!(matches!(
        resolve_warmup(Some(5), 5),
        Err(EvalError::WarmupTooLarge { .. })
    ));
    assert!(matches!(resolve_warmup(None, 0), Err(EvalError::NoMatches)));
}

#[test]
fn warmup_exclusion_is_gradual() {
    // Exclusion starts once rated matches equal the warmup count.
    assert_eq!(warmup_excluded(2, 1), 0);
    assert_eq!(warmup_excluded(2, 2), 0);
    assert_eq!(warmup_excluded(2, 3), 0);
    assert_eq!(warmup_excluded(2, 4), 1);
    assert_eq!(warmup_excluded(2, 5), 2);
    assert_eq!(warmup_excluded(2, 6), 2);
}

#[test]
fn zero_warmup_never_excludes() {
    for total in 0..10 {
        assert_eq!(warmup_excluded(0, total), 0);
    }
}

#[test]
fn strategy_names_round_trip() {
    for s in [Strategy::Adaptive, Strategy::Linear, Strategy::Bsearch] {
        assert_eq!(s.as_str().parse::<Strategy>().unwrap(), s);
    }
    assert!(matches!(
        "random".parse::<Strategy>(),
        Err(EvalError::UnknownStrategy(_))
    ));
}
