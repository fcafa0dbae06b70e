//! Events and requests.
//!
//! An `Event` reports something that already happened (damage dealt, an
//! entity entered, a skill is about to be used). Skills whose trigger names
//! the event react to it.
//!
//! A `Request` asks for something that needs a decision or a protocol of its
//! own (reroll, switch hands, select a card, use a specific skill). Requests
//! are never handled by reactive skills; the orchestrator resolves them.
//!
//! Both are closed enums, so every dispatch over them is checked for
//! exhaustiveness.

use serde::{Deserialize, Serialize};

use crate::core::{
    DefinitionId, EntityArea, EntityId, EntitySnapshot, EntityState, PlayerId, PublicSkillType,
};
use crate::data::SkillRef;

/// Name used for trigger matching and handling brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    BattleBegin,
    RoundBegin,
    EndPhase,
    BeforeUseSkill,
    UseSkill,
    PlayCard,
    SwitchActive,
    DamageOrHeal,
    Reaction,
    Enter,
    Dispose,
    SelectCard,
    ModifyZeroHealth,
    RequestReroll,
    RequestSwitchHands,
    RequestSelectCard,
    RequestUseSkill,
    RequestPlayCard,
    RequestAdventure,
    RequestTriggerEndPhaseSkill,
}

impl EventName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BattleBegin => "onBattleBegin",
            Self::RoundBegin => "onRoundBegin",
            Self::EndPhase => "onEndPhase",
            Self::BeforeUseSkill => "onBeforeUseSkill",
            Self::UseSkill => "onUseSkill",
            Self::PlayCard => "onPlayCard",
            Self::SwitchActive => "onSwitchActive",
            Self::DamageOrHeal => "onDamageOrHeal",
            Self::Reaction => "onReaction",
            Self::Enter => "onEnter",
            Self::Dispose => "onDispose",
            Self::SelectCard => "onSelectCard",
            Self::ModifyZeroHealth => "modifyZeroHealth",
            Self::RequestReroll => "requestReroll",
            Self::RequestSwitchHands => "requestSwitchHands",
            Self::RequestSelectCard => "requestSelectCard",
            Self::RequestUseSkill => "requestUseSkill",
            Self::RequestPlayCard => "requestPlayCard",
            Self::RequestAdventure => "requestAdventure",
            Self::RequestTriggerEndPhaseSkill => "requestTriggerEndPhaseSkill",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Damage element, or `Heal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Cryo,
    Hydro,
    Pyro,
    Electro,
    Anemo,
    Geo,
    Dendro,
    Piercing,
    Heal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    Melt,
    Vaporize,
    Overloaded,
    Superconduct,
    ElectroCharged,
    Frozen,
    Swirl,
    Crystallize,
    Burning,
    Bloom,
    Quicken,
}

/// Granted by a `ModifyZeroHealth` listener: the target survives with
/// `new_health`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmuneInfo {
    pub via: SkillRef,
    pub new_health: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOrHealArg {
    pub source: EntityId,
    pub via: Option<SkillRef>,
    pub target: EntityId,
    pub target_who: PlayerId,
    pub damage_type: DamageType,
    pub value: i64,
    pub old_health: i64,
    pub new_health: i64,
    /// The target was alive and this damage brought it to zero health.
    pub cause_defeated: bool,
    /// Set once an immunity listener saved the target.
    pub immune: Option<ImmuneInfo>,
}

impl DamageOrHealArg {
    /// True for genuine damage, false for heals.
    #[must_use]
    pub fn is_damage_type_damage(&self) -> bool {
        self.damage_type != DamageType::Heal
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseSkillArg {
    pub who: PlayerId,
    pub skill: SkillRef,
    pub skill_type: PublicSkillType,
    pub charged: bool,
    pub plunging: bool,
    pub prepared: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCardArg {
    pub who: PlayerId,
    pub card_id: EntityId,
    pub card_definition: DefinitionId,
    pub targets: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchActiveArg {
    pub who: PlayerId,
    pub from: EntityId,
    pub to: EntityId,
    pub via: Option<SkillRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionArg {
    pub target: EntityId,
    pub target_who: PlayerId,
    pub reaction: ReactionType,
    pub via: Option<SkillRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterArg {
    pub area: EntityArea,
    pub id: EntityId,
    pub definition: DefinitionId,
    /// An existing entity of the same definition was refreshed.
    pub refreshed: bool,
}

/// The disposed entity as it was just before removal.
#[derive(Clone, Debug)]
pub struct DisposeArg {
    pub area: EntityArea,
    pub entity: EntityState,
}

/// What to do with the card a player selects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectCardInfo {
    CreateHandCard {
        candidates: Vec<DefinitionId>,
    },
    CreateEntity {
        candidates: Vec<DefinitionId>,
        area: EntityArea,
    },
    RequestPlayCard {
        candidates: Vec<DefinitionId>,
        targets: Vec<EntityId>,
    },
}

impl SelectCardInfo {
    #[must_use]
    pub fn candidates(&self) -> &[DefinitionId] {
        match self {
            Self::CreateHandCard { candidates }
            | Self::CreateEntity { candidates, .. }
            | Self::RequestPlayCard { candidates, .. } => candidates,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectCardArg {
    pub who: PlayerId,
    pub via: Option<SkillRef>,
    pub info: SelectCardInfo,
}

/// Something that happened.
#[derive(Clone, Debug)]
pub enum Event {
    BattleBegin,
    RoundBegin,
    EndPhase,
    BeforeUseSkill(UseSkillArg),
    UseSkill(UseSkillArg),
    PlayCard(PlayCardArg),
    SwitchActive(SwitchActiveArg),
    DamageOrHeal(DamageOrHealArg),
    Reaction(ReactionArg),
    Enter(EnterArg),
    Dispose(DisposeArg),
    SelectCard(SelectCardArg),
    /// A damage would defeat its target; listeners may grant immunity.
    ModifyZeroHealth(DamageOrHealArg),
}

impl Event {
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::BattleBegin => EventName::BattleBegin,
            Self::RoundBegin => EventName::RoundBegin,
            Self::EndPhase => EventName::EndPhase,
            Self::BeforeUseSkill(_) => EventName::BeforeUseSkill,
            Self::UseSkill(_) => EventName::UseSkill,
            Self::PlayCard(_) => EventName::PlayCard,
            Self::SwitchActive(_) => EventName::SwitchActive,
            Self::DamageOrHeal(_) => EventName::DamageOrHeal,
            Self::Reaction(_) => EventName::Reaction,
            Self::Enter(_) => EventName::Enter,
            Self::Dispose(_) => EventName::Dispose,
            Self::SelectCard(_) => EventName::SelectCard,
            Self::ModifyZeroHealth(_) => EventName::ModifyZeroHealth,
        }
    }

    /// Player the event concerns, if any.
    #[must_use]
    pub fn who(&self) -> Option<PlayerId> {
        match self {
            Self::BattleBegin | Self::RoundBegin | Self::EndPhase => None,
            Self::BeforeUseSkill(arg) | Self::UseSkill(arg) => Some(arg.who),
            Self::PlayCard(arg) => Some(arg.who),
            Self::SwitchActive(arg) => Some(arg.who),
            Self::DamageOrHeal(arg) | Self::ModifyZeroHealth(arg) => Some(arg.target_who),
            Self::Reaction(arg) => Some(arg.target_who),
            Self::Enter(arg) => arg.area.who(),
            Self::Dispose(arg) => arg.area.who(),
            Self::SelectCard(arg) => Some(arg.who),
        }
    }

    /// Entity the event is about, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Self::DamageOrHeal(arg) | Self::ModifyZeroHealth(arg) => Some(arg.target),
            Self::Reaction(arg) => Some(arg.target),
            Self::SwitchActive(arg) => Some(arg.to),
            Self::Enter(arg) => Some(arg.id),
            Self::Dispose(arg) => Some(arg.entity.id),
            Self::BeforeUseSkill(arg) | Self::UseSkill(arg) => Some(arg.skill.caller_id),
            Self::PlayCard(arg) => Some(arg.card_id),
            Self::BattleBegin | Self::RoundBegin | Self::EndPhase | Self::SelectCard(_) => None,
        }
    }

    /// The damage payload of damage, heal and zero-health events.
    #[must_use]
    pub fn damage(&self) -> Option<&DamageOrHealArg> {
        match self {
            Self::DamageOrHeal(arg) | Self::ModifyZeroHealth(arg) => Some(arg),
            _ => None,
        }
    }
}

/// A pending decision or protocol step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    Reroll {
        who: PlayerId,
        times: u32,
    },
    SwitchHands {
        who: PlayerId,
    },
    SelectCard {
        who: PlayerId,
        via: Option<SkillRef>,
        info: SelectCardInfo,
    },
    UseSkill {
        who: PlayerId,
        via: Option<SkillRef>,
        skill_id: DefinitionId,
        as_prepared: bool,
    },
    PlayCard {
        who: PlayerId,
        via: Option<SkillRef>,
        card: DefinitionId,
        targets: Vec<EntityId>,
    },
    Adventure {
        who: PlayerId,
        via: Option<SkillRef>,
    },
    /// Run the end phase skills of `entity`, even if it has left the board
    /// by the time the request is handled.
    TriggerEndPhaseSkill {
        who: PlayerId,
        via: Option<SkillRef>,
        entity: EntitySnapshot,
    },
}

impl Request {
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::Reroll { .. } => EventName::RequestReroll,
            Self::SwitchHands { .. } => EventName::RequestSwitchHands,
            Self::SelectCard { .. } => EventName::RequestSelectCard,
            Self::UseSkill { .. } => EventName::RequestUseSkill,
            Self::PlayCard { .. } => EventName::RequestPlayCard,
            Self::Adventure { .. } => EventName::RequestAdventure,
            Self::TriggerEndPhaseSkill { .. } => EventName::RequestTriggerEndPhaseSkill,
        }
    }

    #[must_use]
    pub fn who(&self) -> PlayerId {
        match self {
            Self::Reroll { who, .. }
            | Self::SwitchHands { who }
            | Self::SelectCard { who, .. }
            | Self::UseSkill { who, .. }
            | Self::PlayCard { who, .. }
            | Self::Adventure { who, .. }
            | Self::TriggerEndPhaseSkill { who, .. } => *who,
        }
    }
}

/// Anything a skill body can emit.
#[derive(Clone, Debug)]
pub enum EventAndRequest {
    Event(Event),
    Request(Request),
}

impl EventAndRequest {
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::Event(event) => event.name(),
            Self::Request(request) => request.name(),
        }
    }
}

impl From<Event> for EventAndRequest {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl From<Request> for EventAndRequest {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

/// Argument handed to a skill's filter and body.
#[derive(Clone, Debug)]
pub enum SkillArg {
    /// Initiative use; play-card skills receive their targets here.
    Initiative { targets: Vec<EntityId> },
    Event(Event),
}

impl SkillArg {
    #[must_use]
    pub fn none() -> Self {
        Self::Initiative {
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn event(&self) -> Option<&Event> {
        match self {
            Self::Event(event) => Some(event),
            Self::Initiative { .. } => None,
        }
    }

    #[must_use]
    pub fn targets(&self) -> &[EntityId] {
        match self {
            Self::Initiative { targets } => targets,
            Self::Event(_) => &[],
        }
    }
}
