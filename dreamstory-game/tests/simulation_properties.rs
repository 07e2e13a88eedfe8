use std::collections::BTreeSet;

use dreamstory_game::{
    ActionId, Choice, ClockTransition, Direction, GameSession, MemoryStorage, Mood, ScriptedRolls,
    SessionConfig, SessionEvent, SimulationState, SituationBank, StatKey, TransitionError, clock,
    resolver,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn bundled_bank() -> SituationBank {
    SituationBank::load_from_static().unwrap()
}

fn assert_invariants(state: &SimulationState, bank: &SituationBank) {
    assert!(state.stats.in_bounds(), "stats out of bounds: {:?}", state.stats);
    assert!(state.score >= 0);
    assert!(state.current_day >= 1);
    assert_eq!(state.stats.mood, state.stats.derive_mood());
    assert!(state.occurred_situations.is_subset(&bank.ids()));
}

/// Random intent sequences never break the state invariants.
#[test]
fn invariants_hold_under_random_play() {
    for seed in 0..24_u64 {
        let mut driver = ChaCha20Rng::seed_from_u64(seed ^ 0x5EED);
        let config = SessionConfig {
            trigger_chance: 0.6,
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(seed, bundled_bank(), config);
        let storage = MemoryStorage::new();

        for _ in 0..600 {
            match driver.random_range(0..12) {
                0..=4 => {
                    session.tick();
                }
                5 => {
                    let id = ActionId::ALL[driver.random_range(0..ActionId::ALL.len())];
                    if session.request_action(id).is_ok() {
                        let _ = session.confirm_action(driver.random_bool(0.8));
                    }
                }
                6 => {
                    let choice = if driver.random_bool(0.5) {
                        Choice::Accept
                    } else {
                        Choice::Decline
                    };
                    let _ = session.resolve_situation(choice);
                }
                7 => {
                    session.toggle_pause();
                }
                8 => {
                    let _ = session.cycle_location(if driver.random_bool(0.5) {
                        Direction::Next
                    } else {
                        Direction::Previous
                    });
                }
                9 => {
                    if session.request_save().is_ok() {
                        session.confirm_save(true, &storage);
                    }
                }
                10 => {
                    session.load_from(&storage);
                }
                _ => {
                    if driver.random_bool(0.1) {
                        session.reset();
                    }
                }
            }
            let bank = session.bank().clone();
            assert_invariants(session.snapshot(), &bank);
        }
    }
}

#[test]
fn day_counter_matches_midnights_crossed() {
    let mut session = GameSession::with_rolls(
        SituationBank::empty(),
        SessionConfig::default(),
        ScriptedRolls::default(),
    );
    let mut rollovers = 0;
    for _ in 0..(96 * 9) {
        if let ClockTransition::Rollover { day } = session.tick().clock {
            rollovers += 1;
            assert_eq!(day, rollovers + 1);
            assert_eq!(session.snapshot().daily_actions.completed(), 0);
        }
    }
    assert_eq!(rollovers, 9);
    assert_eq!(session.snapshot().current_day, 10);
}

#[test]
fn daily_actions_are_idempotent_within_a_day() {
    let mut state = SimulationState::default();
    for id in ActionId::ALL {
        resolver::submit_action(&mut state, id).unwrap();
    }
    assert!(state.daily_actions.all_done());
    let after_first_round = state.clone();

    for id in ActionId::ALL {
        assert_eq!(
            resolver::submit_action(&mut state, id),
            Err(TransitionError::AlreadyDoneToday { action: id })
        );
    }
    assert_eq!(state, after_first_round);
    assert_eq!(state.score, 20 + 15 + 18 + 12 + 8 + 10);

    while !matches!(clock::advance(&mut state), ClockTransition::Rollover { .. }) {}
    assert!(resolver::submit_action(&mut state, ActionId::Sleep).is_ok());
}

#[test]
fn each_situation_is_offered_at_most_once_per_run() {
    let bank = bundled_bank();
    let mut session =
        GameSession::with_rolls(bank.clone(), SessionConfig::default(), ScriptedRolls::always());
    let mut offered = Vec::new();

    // Two simulated weeks, answering every offer immediately.
    for _ in 0..(96 * 14) {
        session.tick();
        for event in session.drain_events() {
            if let SessionEvent::SituationOffered { id, .. } = event {
                offered.push(id);
                session.resolve_situation(Choice::Decline).unwrap();
            }
        }
    }
    let unique: BTreeSet<_> = offered.iter().copied().collect();
    assert_eq!(unique.len(), offered.len(), "repeated offers: {offered:?}");
    assert_eq!(unique, session.snapshot().occurred_situations);
    assert_eq!(unique, bank.ids());
}

#[test]
fn scripted_draws_replay_exactly() {
    let run = || {
        let mut rolls = ScriptedRolls::default();
        for step in 0..200_u32 {
            rolls.push_unit(f64::from(step % 10) / 10.0);
            rolls.push_index(usize::try_from(step % 3).unwrap());
        }
        let mut session = GameSession::with_rolls(bundled_bank(), SessionConfig::default(), rolls);
        let mut offers = Vec::new();
        for _ in 0..400 {
            if let Some(id) = session.tick().offered {
                offers.push(id);
                session.resolve_situation(Choice::Accept).unwrap();
            }
        }
        (offers, session.into_state())
    };
    let (first_offers, first_state) = run();
    let (second_offers, second_state) = run();
    assert!(!first_offers.is_empty());
    assert_eq!(first_offers, second_offers);
    assert_eq!(first_state, second_state);
}

#[test]
fn seeded_sessions_replay_exactly() {
    let run = |seed| {
        let mut session = GameSession::new(seed, bundled_bank(), SessionConfig::default());
        for _ in 0..2_000 {
            if session.tick().offered.is_some() {
                session.resolve_situation(Choice::Accept).unwrap();
            }
        }
        session.into_state()
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn sleep_example_from_fresh_game() {
    let mut session = GameSession::with_rolls(
        SituationBank::empty(),
        SessionConfig::default(),
        ScriptedRolls::default(),
    );
    session.request_action(ActionId::Sleep).unwrap();
    session.confirm_action(true).unwrap();
    let state = session.snapshot();
    assert_eq!(state.stats.get(StatKey::Health), 60);
    assert_eq!(state.stats.get(StatKey::Energy), 70);
    assert_eq!(state.stats.get(StatKey::SleepQuality), 75);
    assert_eq!(state.score, 20);
    assert_eq!(state.stats.mood, Mood::Relaxed);
}

#[test]
fn saude_minus_five_costs_fifty_points() {
    let bank = SituationBank::from_json(
        r#"[{ "id": 3, "titulo": "Junk food", "dia_semana": ["segunda"],
              "horario_inicio": "07:00", "horario_fim": "08:00",
              "opcoes": { "sim": { "efeitos": { "saude": -5 }, "mensagem": "ugh" },
                          "nao": { "efeitos": {}, "mensagem": "fine" } } }]"#,
    )
    .unwrap();
    let mut session = GameSession::with_rolls(bank, SessionConfig::default(), ScriptedRolls::always());
    session.advance_ticks(2);
    let feedback = session.resolve_situation(Choice::Accept).unwrap();
    assert_eq!(feedback.score_delta, -50);
    assert!(!feedback.is_positive());
    assert_eq!(session.snapshot().score, 0);
    assert_eq!(session.snapshot().stats.health, 0);
}
