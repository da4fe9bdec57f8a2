//! Unit tests for ai-planner.

use std::sync::Arc;

use ai_core::{AgentId, PlannerConfig, WorldPos};

use crate::{
    Action, Actor, Needs, Phase, Requirements, Stance, Task, TaskKind, TaskRegistry,
    UtilityPlanner, WorldState,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Villager {
    id:    AgentId,
    state: WorldState,
}

impl Villager {
    fn new(state: WorldState) -> Self {
        Self { id: AgentId(1), state }
    }
}

impl Actor for Villager {
    fn id(&self) -> AgentId {
        self.id
    }

    fn world_state(&self) -> WorldState {
        self.state.clone()
    }
}

fn idle() -> Task {
    Task::unregistered("idle", TaskKind::Simple(Action::new(1.0)))
}

fn simple(minutes: f32, bonus: f32) -> TaskKind {
    TaskKind::Simple(Action::new(minutes).with_bonus(bonus))
}

fn delta(hunger: f32, sleep: f32, social: f32) -> Needs {
    Needs { hunger, sleep, social }
}

/// Route `tracing` output through the test harness.  `RUST_LOG=trace` shows
/// every expansion.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn planner(villager: &Villager, registry: TaskRegistry) -> UtilityPlanner {
    init_tracing();
    UtilityPlanner::new(villager, idle(), Arc::new(registry), PlannerConfig::default()).unwrap()
}

fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-5, "expected {expected}, got {actual}");
}

// ── Task evaluation ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tasks {
    use super::*;
    use crate::ConversationEffect;

    #[test]
    fn utility_is_pressure_relief_plus_bonus() {
        let eat = Task::unregistered(
            "eat",
            TaskKind::Simple(Action::new(10.0).with_needs(delta(-0.5, 0.0, 0.0)).with_bonus(0.1)),
        );
        let state = WorldState::default().with_needs(Needs::new(1.0, 0.5, 0.0));
        // 1.0² + 0.5² before, 0.5² + 0.5² after.
        assert_close(eat.utility(&state), 0.75 + 0.1);
        assert_close(eat.predicted(&state).needs.hunger, 0.5);
    }

    #[test]
    fn needs_are_clamped() {
        let state = WorldState::default().with_needs(Needs::new(0.2, 0.0, 0.0));
        let feast = Task::unregistered(
            "feast",
            TaskKind::Simple(Action::new(1.0).with_needs(delta(-1.0, 0.3, 0.0))),
        );
        let after = feast.predicted(&state).needs;
        assert_eq!(after.hunger, 0.0);
        assert_close(after.sleep, 0.3);
    }

    #[test]
    fn travel_adds_to_time_and_moves_the_agent() {
        let config = PlannerConfig { walk_speed: 2.0, ..PlannerConfig::default() };
        let well = WorldPos::new(6.0, 8.0);
        let fetch = Task::unregistered("fetch", TaskKind::Simple(Action::new(3.0).at(well)));
        let state = WorldState::at(WorldPos::new(0.0, 0.0));
        assert_close(fetch.time_cost(&state, &config), 3.0 + 10.0 / 2.0);
        assert_eq!(fetch.predicted(&state).position, well);
    }

    #[test]
    fn time_is_floored() {
        let config = PlannerConfig::default();
        let blink = Task::unregistered("blink", TaskKind::Simple(Action::new(0.0)));
        assert_eq!(blink.time_cost(&WorldState::default(), &config), config.min_time_cost);
    }

    #[test]
    fn requirements_gate_conditions() {
        let req = Requirements {
            stance: Some(Stance::Sitting),
            min_needs: delta(0.0, 0.6, 0.0),
            in_conversation: Some(false),
            repeatable: false,
        };
        let mut nap = Task::unregistered("nap", TaskKind::Simple(Action::new(30.0).requiring(req)));
        nap.id = ai_core::TaskId(3);

        let tired = WorldState::default().with_stance(Stance::Sitting).with_needs(Needs::new(0.0, 0.8, 0.0));
        assert!(nap.conditions_met(&tired));
        assert!(!nap.conditions_met(&tired.clone().with_stance(Stance::Standing)));
        assert!(!nap.conditions_met(&tired.clone().with_needs(Needs::new(0.0, 0.2, 0.0))));

        let mut chatting = tired.clone();
        chatting.conversation = Some(AgentId(9));
        assert!(!nap.conditions_met(&chatting));

        let after = nap.predicted(&tired);
        assert_eq!(after.previous_task, Some(ai_core::TaskId(3)));
        assert!(!nap.conditions_met(&after));
    }

    #[test]
    fn conversation_effects() {
        let join = Task::unregistered(
            "greet",
            TaskKind::Simple(Action::new(1.0).conversation(ConversationEffect::Join(AgentId(4)))),
        );
        let leave = Task::unregistered(
            "bye",
            TaskKind::Simple(Action::new(1.0).conversation(ConversationEffect::Leave)),
        );
        let joined = join.predicted(&WorldState::default());
        assert_eq!(joined.conversation, Some(AgentId(4)));
        assert_eq!(leave.predicted(&joined).conversation, None);
    }

    #[test]
    fn risky_task_blends_outcomes() {
        let config = PlannerConfig::default();
        let hunt = Task::unregistered(
            "hunt",
            TaskKind::Risky {
                success: Action::new(2.0).with_needs(delta(-1.0, 0.0, 0.0)).with_stance(Stance::Sitting),
                failure: Action::new(4.0),
                chance:  0.25,
            },
        );
        let state = WorldState::default().with_needs(Needs::new(1.0, 0.0, 0.0));

        assert_close(hunt.utility(&state), 0.25);
        assert_close(hunt.time_cost(&state, &config), 0.25 * 2.0 + 0.75 * 4.0);
        let predicted = hunt.predicted(&state);
        assert_close(predicted.needs.hunger, 0.75);
        // Failure is likelier, so the stance stays.
        assert_eq!(predicted.stance, Stance::Standing);
    }

    #[test]
    fn composite_chains_outer_then_inner() {
        let config = PlannerConfig::default();
        let sit = Task::unregistered("sit", TaskKind::Nesting(Action::new(1.0).with_stance(Stance::Sitting)));
        let read = Task::unregistered(
            "read",
            TaskKind::Simple(Action::new(2.0).with_bonus(4.0).requiring(Requirements {
                stance: Some(Stance::Sitting),
                ..Requirements::default()
            })),
        );
        let both = Task::composite(sit, read);
        let standing = WorldState::default();
        assert!(both.conditions_met(&standing));
        assert_close(both.time_cost(&standing, &config), 3.0);
        assert_close(both.utility(&standing), 4.0);
        assert_eq!(both.predicted(&standing).stance, Stance::Sitting);
        assert_eq!(both.name, "sit > read");
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;
    use crate::PlannerError;

    #[test]
    fn ids_are_sequential_and_named() {
        let mut reg = TaskRegistry::new();
        let a = reg.register("a", simple(1.0, 1.0)).unwrap();
        let b = reg.register("b", simple(1.0, 1.0)).unwrap();
        assert_eq!((a.0, b.0), (0, 1));
        assert_eq!(reg.id_of("b"), Some(b));
        assert_eq!(reg.task(a).name, "a");
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn rejects_invalid_tasks() {
        let mut reg = TaskRegistry::new();
        reg.register("a", simple(1.0, 1.0)).unwrap();
        assert!(matches!(reg.register("a", simple(1.0, 1.0)), Err(PlannerError::DuplicateTask(_))));
        assert!(matches!(
            reg.register("neg", simple(-1.0, 0.0)),
            Err(PlannerError::InvalidDuration { .. })
        ));
        assert!(matches!(
            reg.register("inf", simple(1.0, f32::INFINITY)),
            Err(PlannerError::InvalidBonus { .. })
        ));
        assert!(matches!(
            reg.register(
                "gamble",
                TaskKind::Risky { success: Action::new(1.0), failure: Action::new(1.0), chance: 1.5 }
            ),
            Err(PlannerError::InvalidChance { .. })
        ));
    }

    #[test]
    fn rejects_nested_setups() {
        let inner = Task::unregistered(
            "inner",
            TaskKind::Setup {
                action: Action::new(1.0),
                payoff: Box::new(Task::unregistered("x", simple(1.0, 1.0))),
            },
        );
        let mut reg = TaskRegistry::new();
        let result = reg.register("outer", TaskKind::Setup { action: Action::new(1.0), payoff: Box::new(inner) });
        assert!(matches!(result, Err(PlannerError::NestedSetup(_))));
        assert!(reg.is_empty());
    }
}

// ── Payoff folding ────────────────────────────────────────────────────────────

#[cfg(test)]
mod payoffs {
    use super::*;
    use crate::PlanNode;

    fn setup(minutes: f32, payoff_minutes: f32, payoff_bonus: f32) -> TaskKind {
        TaskKind::Setup {
            action: Action::new(minutes),
            payoff: Box::new(Task::unregistered("payoff", simple(payoff_minutes, payoff_bonus))),
        }
    }

    #[test]
    fn one_payoff_folded_per_query() {
        let config = PlannerConfig::default();
        let mut reg = TaskRegistry::new();
        let plant = reg.register("plant", setup(4.0, 1.0, 20.0)).unwrap();
        let stock = reg.register("stock", setup(2.0, 1.0, 5.0)).unwrap();
        let start = WorldState::default();

        let root = PlanNode::root(reg.task(plant), &start, &config);
        let mut chain = root.extend(reg.task(stock), &reg, &config);
        assert_eq!(chain.pending, vec![plant, stock]);
        assert_close(chain.ratio(), 0.0);

        assert_close(chain.average(&reg, &config), 20.0 / 7.0);
        assert_eq!(chain.pending, vec![stock]);

        assert_close(chain.average(&reg, &config), 25.0 / 8.0);
        assert!(chain.pending.is_empty());
    }

    #[test]
    fn payoff_that_lowers_the_ratio_stays_pending() {
        let config = PlannerConfig::default();
        let mut reg = TaskRegistry::new();
        let chore = reg.register("chore", TaskKind::Setup {
            action: Action::new(1.0).with_bonus(10.0),
            payoff: Box::new(Task::unregistered("dull", simple(10.0, 1.0))),
        })
        .unwrap();

        let mut node = PlanNode::root(reg.task(chore), &WorldState::default(), &config);
        assert_close(node.average(&reg, &config), 10.0);
        assert_eq!(node.pending, vec![chore]);
    }

    #[test]
    fn planner_values_setups_through_their_payoff() {
        let mut reg = TaskRegistry::new();
        reg.register("plant", setup(4.0, 1.0, 20.0)).unwrap();
        reg.register("loiter", simple(1.0, 1.0)).unwrap();

        let villager = Villager::new(WorldState::default());
        let mut p = planner(&villager, reg);
        p.tick();
        assert_close(p.best_ratio().unwrap(), 4.0);
        assert_eq!(p.get_task(&villager).name, "plant");
    }
}

// ── Planner episodes ──────────────────────────────────────────────────────────

#[cfg(test)]
mod episodes {
    use super::*;

    fn two_tasks() -> TaskRegistry {
        let mut reg = TaskRegistry::new();
        reg.register("t1", simple(2.0, 10.0)).unwrap();
        reg.register("t2", simple(1.0, 3.0)).unwrap();
        reg
    }

    #[test]
    fn best_ratio_wins_after_seeding() {
        let villager = Villager::new(WorldState::default());
        let mut p = planner(&villager, two_tasks());
        assert_eq!(p.phase(), Phase::Seeding);
        assert_eq!(p.tick(), Phase::Expanding);
        assert_eq!(p.frontier_len(), 2);
        assert_close(p.best_ratio().unwrap(), 5.0);
        assert_eq!(p.get_task(&villager).name, "t1");
        assert_eq!(p.phase(), Phase::Seeding);
    }

    #[test]
    fn inapplicable_task_never_roots_a_chain() {
        let mut reg = two_tasks();
        reg.register("impossible", TaskKind::Simple(Action::new(1.0).with_bonus(1000.0).requiring(
            Requirements { min_needs: delta(2.0, 0.0, 0.0), ..Requirements::default() },
        )))
        .unwrap();

        let villager = Villager::new(WorldState::default());
        let mut p = planner(&villager, reg);
        for _ in 0..200 {
            p.tick();
            if let Some(root) = p.best_root() {
                assert_ne!(root.name, "impossible");
            }
            if p.phase() == Phase::Exhausted {
                break;
            }
        }
        assert_ne!(p.get_task(&villager).name, "impossible");
    }

    #[test]
    fn frontier_exhausts_and_keeps_best() {
        let villager = Villager::new(WorldState::default());
        let config = PlannerConfig { max_depth: 2, ..PlannerConfig::default() };
        let mut p = UtilityPlanner::new(&villager, idle(), Arc::new(two_tasks()), config).unwrap();

        p.tick();
        let mut ticks = 0;
        while p.tick() != Phase::Exhausted {
            ticks += 1;
            assert!(ticks < 10);
        }
        // 2 roots and 4 depth-2 children.
        assert_eq!(p.episode_expansions(), 6);
        assert_eq!(p.frontier_len(), 0);
        assert_eq!(p.tick(), Phase::Exhausted);
        assert_eq!(p.get_task(&villager).name, "t1");
    }

    #[test]
    fn several_expansions_per_tick() {
        let villager = Villager::new(WorldState::default());
        let config = PlannerConfig { max_depth: 2, expansions_per_tick: 10, ..PlannerConfig::default() };
        let mut p = UtilityPlanner::new(&villager, idle(), Arc::new(two_tasks()), config).unwrap();
        p.tick();
        assert_eq!(p.tick(), Phase::Exhausted);
        assert_eq!(p.episode_expansions(), 6);
    }

    #[test]
    fn nesting_root_collapses_with_its_follow_up() {
        let mut reg = TaskRegistry::new();
        reg.register("sit", TaskKind::Nesting(Action::new(1.0).with_stance(Stance::Sitting)))
            .unwrap();
        reg.register("read", TaskKind::Simple(Action::new(1.0).with_bonus(10.0).requiring(
            Requirements { stance: Some(Stance::Sitting), ..Requirements::default() },
        )))
        .unwrap();

        let villager = Villager::new(WorldState::default());
        let mut p = planner(&villager, reg);
        p.tick();
        assert_eq!(p.best_root().unwrap().name, "sit");
        p.tick();

        let task = p.get_task(&villager);
        assert!(matches!(task.kind, TaskKind::Composite { .. }));
        assert_eq!(task.name, "sit > read");
        assert_eq!(p.start_state().stance, Stance::Sitting);
    }

    #[test]
    fn stale_best_falls_back_to_live_state() {
        let mut reg = TaskRegistry::new();
        reg.register("eat", TaskKind::Simple(
            Action::new(1.0).with_needs(delta(-0.5, 0.0, 0.0)).requiring(Requirements {
                min_needs: delta(0.5, 0.0, 0.0),
                ..Requirements::default()
            }),
        ))
        .unwrap();
        reg.register("whittle", simple(1.0, 0.5)).unwrap();

        let mut villager = Villager::new(WorldState::default().with_needs(Needs::new(1.0, 0.0, 0.0)));
        let mut p = planner(&villager, reg);
        p.tick();
        assert_eq!(p.best_root().unwrap().name, "eat");

        // Someone fed the villager while the planner was thinking.
        villager.state.needs.hunger = 0.1;
        assert_eq!(p.get_task(&villager).name, "whittle");
    }

    #[test]
    fn nothing_applicable_repeats_last_task() {
        let mut reg = TaskRegistry::new();
        reg.register("eat", TaskKind::Simple(Action::new(1.0).requiring(Requirements {
            min_needs: delta(0.5, 0.0, 0.0),
            ..Requirements::default()
        })))
        .unwrap();

        let villager = Villager::new(WorldState::default());
        let mut p = planner(&villager, reg);
        assert_eq!(p.tick(), Phase::Exhausted);
        assert_eq!(p.best_ratio(), None);
        assert_eq!(p.get_task(&villager).name, "idle");
        assert_eq!(p.last_adopted().name, "idle");
    }

    #[test]
    fn override_restarts_from_forced_task() {
        let villager = Villager::new(WorldState::default());
        let mut p = planner(&villager, two_tasks());
        p.tick();
        p.tick();
        assert!(p.frontier_len() > 0);

        let faint = Task::unregistered("faint", TaskKind::Simple(Action::new(5.0).with_stance(Stance::Lying)));
        p.override_task(&villager, faint);
        assert_eq!(p.phase(), Phase::Seeding);
        assert_eq!(p.frontier_len(), 0);
        assert_eq!(p.best_ratio(), None);
        assert_eq!(p.episode_expansions(), 0);
        assert_eq!(p.start_state().stance, Stance::Lying);
        assert_eq!(p.last_adopted().name, "faint");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let villager = Villager::new(WorldState::default());
        let config = PlannerConfig { max_depth: 0, ..PlannerConfig::default() };
        assert!(UtilityPlanner::new(&villager, idle(), Arc::new(two_tasks()), config).is_err());
    }
}
