//! Skill runner tests: commit granularity, skill reporting, the plunging
//! flag and preview runs.

mod support;

use std::sync::Arc;

use rust_tcg::core::{
    DefinitionId, EntityId, ExecutorConfig, ExposedMutation, Phase, PlayerFlag, PlayerId,
    PublicSkillType,
};
use rust_tcg::data::{CallerRef, InitiativeSkillType, SkillDefinition, SkillInfo, TriggerOn};
use rust_tcg::effects::Effect;
use rust_tcg::executor::SkillExecutor;
use rust_tcg::mutator::Notification;
use rust_tcg::triggers::{DamageType, Event, EventName, SkillArg};

use support::*;

fn skill_used(log: &Journal) -> Vec<ExposedMutation> {
    exposed(log)
        .into_iter()
        .filter(|m| matches!(m, ExposedMutation::SkillUsed { .. }))
        .collect()
}

fn index_of(exposed: &[ExposedMutation], pred: impl Fn(&ExposedMutation) -> bool) -> usize {
    exposed.iter().position(pred).unwrap()
}

// ===== Reporting =====

/// Test that an initiative skill is reported with its owner and type.
#[test]
fn test_initiative_skill_reports_skill_used() {
    init_tracing();
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![strike(STRIKE, 1)]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, STRIKE)]).unwrap();

    assert_eq!(
        skill_used(&log),
        vec![ExposedMutation::SkillUsed {
            who: Some(PlayerId::P0),
            caller_id: EntityId(-1),
            caller_definition_id: DefinitionId(1),
            skill_definition_id: STRIKE,
            skill_type: PublicSkillType::Normal,
            triggered_on: TriggerOn::Initiative,
        }]
    );
}

/// Test that a triggered skill which changes nothing is not reported.
#[test]
fn test_noop_triggered_skill_not_reported() {
    let idle = SkillDefinition::triggered(DefinitionId(201), EventName::RoundBegin)
        .with_action(|_, _| Ok(()));
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![idle]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    SkillExecutor::handle_events(&mut m, vec![Event::RoundBegin.into()]).unwrap();

    assert!(skill_used(&log).is_empty());
}

/// Test that a triggered skill which changes the state is reported with
/// the event it fired on.
#[test]
fn test_effective_triggered_skill_reported() {
    let tick = SkillDefinition::triggered(DefinitionId(201), EventName::RoundBegin)
        .with_effects(vec![Effect::add_own("ticks", 1)]);
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![tick]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    SkillExecutor::handle_events(&mut m, vec![Event::RoundBegin.into()]).unwrap();

    let used = skill_used(&log);
    assert_eq!(used.len(), 1);
    assert!(matches!(
        &used[0],
        ExposedMutation::SkillUsed {
            who: Some(PlayerId::P0),
            skill_definition_id: DefinitionId(201),
            triggered_on: TriggerOn::Event(EventName::RoundBegin),
            ..
        }
    ));
}

// ===== Commit =====

/// Test that all edits of one skill body land as a single transition.
#[test]
fn test_skill_body_commits_once() {
    let triple = SkillDefinition::triggered(DefinitionId(201), EventName::RoundBegin)
        .with_effects(vec![
            Effect::add_own("ticks", 1),
            Effect::add_own("ticks", 1),
            Effect::add_own("ticks", 1),
        ]);
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![triple]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let caller = CallerRef {
        id: EntityId(-1),
        definition: Arc::clone(&state.character(EntityId(-1)).unwrap().definition),
    };
    let skill = Arc::clone(&caller.definition.skills[0]);
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());
    let before = m.revision();

    let state = SkillExecutor::execute_skill(
        &mut m,
        &SkillInfo::new(caller, skill),
        &SkillArg::Event(Event::RoundBegin),
    )
    .unwrap();

    assert_eq!(state.character(EntityId(-1)).unwrap().var("ticks"), 3);
    assert_eq!(m.revision(), before + 1);
}

/// Test that nothing runs once the game has ended.
#[test]
fn test_finished_game_runs_nothing() {
    let mut state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![strike(STRIKE, 3)]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    state.phase = Phase::GameEnd;
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    let state = SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, STRIKE)]).unwrap();

    assert_eq!(state.player(PlayerId::P1).active_character().unwrap().health(), 10);
    assert_eq!(state.player(PlayerId::P0).active_character().unwrap().energy(), 0);
    assert!(skill_used(&log).is_empty());
}

// ===== Plunging =====

/// Test that a character's attack consumes the plunging flag, reported
/// before the skill itself.
#[test]
fn test_attack_consumes_plunging() {
    let mut state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![strike(STRIKE, 1)]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    state.players[PlayerId::P0].can_plunging = true;
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    let state = SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, STRIKE)]).unwrap();

    assert!(!state.player(PlayerId::P0).can_plunging);
    let exposed = exposed(&log);
    let reset = index_of(&exposed, |m| {
        matches!(
            m,
            ExposedMutation::SetPlayerFlag {
                who: PlayerId::P0,
                flag: PlayerFlag::CanPlunging,
                value: false,
            }
        )
    });
    let used = index_of(&exposed, |m| matches!(m, ExposedMutation::SkillUsed { .. }));
    assert!(reset < used);
}

/// Test that a technique leaves the plunging flag alone.
#[test]
fn test_technique_keeps_plunging() {
    let glide = SkillDefinition::initiative(DefinitionId(102), InitiativeSkillType::Technique)
        .with_effects(vec![Effect::damage_opponent(1, DamageType::Physical)]);
    let mut state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![glide]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    state.players[PlayerId::P0].can_plunging = true;
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    let state =
        SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, DefinitionId(102))]).unwrap();

    assert!(state.player(PlayerId::P0).can_plunging);
    assert_eq!(state.player(PlayerId::P1).active_character().unwrap().health(), 9);
}

/// Test that an attack without the flag set emits no flag mutation.
#[test]
fn test_no_plunging_reset_without_flag() {
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![strike(STRIKE, 1)]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, STRIKE)]).unwrap();

    assert!(!exposed(&log)
        .iter()
        .any(|m| matches!(m, ExposedMutation::SetPlayerFlag { .. })));
}

// ===== Preview =====

fn preview_probe() -> SkillDefinition {
    SkillDefinition::initiative(DefinitionId(102), InitiativeSkillType::Elemental).with_action(
        |ctx, _| {
            let me = ctx.caller_id();
            let preview = i64::from(ctx.is_preview());
            ctx.set_variable(me, "preview", preview)
        },
    )
}

/// Test that a preview pass is visible to skill bodies.
#[test]
fn test_preview_reaches_skill_body() {
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![preview_probe()]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    SkillExecutor::new(&mut m, ExecutorConfig::preview())
        .handle_event(vec![use_skill(PlayerId::P0, DefinitionId(102))])
        .unwrap();

    assert_eq!(m.state().character(EntityId(-1)).unwrap().var("preview"), 1);
}

/// Test that a normal pass is not a preview.
#[test]
fn test_default_pass_is_not_preview() {
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![preview_probe()]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    let state =
        SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, DefinitionId(102))]).unwrap();

    assert_eq!(state.character(EntityId(-1)).unwrap().var("preview"), 0);
}

// ===== Notifications =====

/// Test that recorded notifications survive the wire encoding and carry
/// non-decreasing revisions.
#[test]
fn test_notifications_encode() {
    let state = Battle::new()
        .character(PlayerId::P0, character(1, 10, vec![strike(STRIKE, 2)]))
        .character(PlayerId::P1, character(2, 10, vec![]))
        .build();
    let log = journal();
    let mut m = mutator(state, &log, ScriptedIo::default());

    SkillExecutor::handle_events(&mut m, vec![use_skill(PlayerId::P0, STRIKE)]).unwrap();

    let notifications: Vec<Notification> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Entry::Notify(n) => Some(n.clone()),
            _ => None,
        })
        .collect();
    assert!(!notifications.is_empty());
    for pair in notifications.windows(2) {
        assert!(pair[0].revision <= pair[1].revision);
    }
    for n in &notifications {
        let bytes = n.to_bytes().unwrap();
        assert_eq!(&Notification::from_bytes(&bytes).unwrap(), n);
    }
}
