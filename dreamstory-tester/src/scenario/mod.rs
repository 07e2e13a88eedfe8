pub mod catalog;

use crate::logic::SimulationPlan;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Scenario keys in the order `all` expands to.
pub const SCENARIO_KEYS: [&str; 8] = [
    "smoke",
    "day-rollover",
    "daily-actions",
    "situation-permanence",
    "stat-bounds",
    "save-load",
    "pause-freeze",
    "deterministic-replay",
];

const ALIASES: [(&str, &str); 7] = [
    ("rollover", "day-rollover"),
    ("actions", "daily-actions"),
    ("situations", "situation-permanence"),
    ("stats", "stat-bounds"),
    ("persistence", "save-load"),
    ("pause", "pause-freeze"),
    ("deterministic", "deterministic-replay"),
];

fn canonical_key(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    SCENARIO_KEYS
        .into_iter()
        .find(|key| *key == lowered)
        .or_else(|| {
            ALIASES
                .into_iter()
                .find(|(alias, _)| *alias == lowered)
                .map(|(_, key)| key)
        })
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = canonical_key(name)?;
    let plan = match key {
        "smoke" => catalog::smoke_plan(),
        "day-rollover" => catalog::day_rollover_plan(),
        "daily-actions" => catalog::daily_actions_plan(),
        "situation-permanence" => catalog::situation_permanence_plan(),
        "stat-bounds" => catalog::stat_bounds_plan(),
        "save-load" => catalog::save_load_plan(),
        "pause-freeze" => catalog::pause_freeze_plan(),
        "deterministic-replay" => catalog::deterministic_replay_plan(),
        _ => return None,
    };
    let title = list_scenarios()
        .into_iter()
        .find(|(listed, _)| *listed == key)
        .map_or(key, |(_, title)| title);
    Some(TestScenario::simulation(title, plan))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("day-rollover", "Day Rollover"),
        ("daily-actions", "Daily Action Idempotence"),
        ("situation-permanence", "Situation Permanence"),
        ("stat-bounds", "Stat Boundaries"),
        ("save-load", "Save/Load Round Trip"),
        ("pause-freeze", "Pause Freezes Time"),
        ("deterministic-replay", "Deterministic Replay"),
    ]
}
