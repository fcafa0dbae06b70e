//! Elemental aura table.
//!
//! Only the aura bookkeeping lives here: which aura a hit leaves behind and
//! which reaction it names. Reaction side effects (bonus damage, summons,
//! shields) belong to the skills that listen for `Reaction`.

use crate::core::Aura;
use crate::triggers::{DamageType, ReactionType};

fn aura_of(damage_type: DamageType) -> Option<Aura> {
    match damage_type {
        DamageType::Cryo => Some(Aura::Cryo),
        DamageType::Hydro => Some(Aura::Hydro),
        DamageType::Pyro => Some(Aura::Pyro),
        DamageType::Electro => Some(Aura::Electro),
        DamageType::Dendro => Some(Aura::Dendro),
        _ => None,
    }
}

fn pair(left: Aura, right: Aura) -> Option<ReactionType> {
    use Aura::{Cryo, Dendro, Electro, Hydro, Pyro};
    let reaction = match (left, right) {
        (Cryo, Pyro) | (Pyro, Cryo) => ReactionType::Melt,
        (Hydro, Pyro) | (Pyro, Hydro) => ReactionType::Vaporize,
        (Pyro, Electro) | (Electro, Pyro) => ReactionType::Overloaded,
        (Cryo, Electro) | (Electro, Cryo) => ReactionType::Superconduct,
        (Hydro, Electro) | (Electro, Hydro) => ReactionType::ElectroCharged,
        (Cryo, Hydro) | (Hydro, Cryo) => ReactionType::Frozen,
        (Dendro, Pyro) | (Pyro, Dendro) => ReactionType::Burning,
        (Dendro, Hydro) | (Hydro, Dendro) => ReactionType::Bloom,
        (Dendro, Electro) | (Electro, Dendro) => ReactionType::Quicken,
        _ => return None,
    };
    Some(reaction)
}

/// Apply a hit of `damage_type` to a character carrying `aura`.
///
/// Returns the resulting aura and the reaction, if any.
#[must_use]
pub fn apply_element(aura: Aura, damage_type: DamageType) -> (Aura, Option<ReactionType>) {
    match damage_type {
        DamageType::Physical | DamageType::Piercing | DamageType::Heal => (aura, None),
        DamageType::Anemo | DamageType::Geo => {
            let reaction = if damage_type == DamageType::Anemo {
                ReactionType::Swirl
            } else {
                ReactionType::Crystallize
            };
            match aura {
                Aura::Cryo | Aura::Hydro | Aura::Pyro | Aura::Electro => (Aura::None, Some(reaction)),
                Aura::CryoDendro => (Aura::Dendro, Some(reaction)),
                Aura::None | Aura::Dendro => (aura, None),
            }
        }
        _ => {
            let Some(incoming) = aura_of(damage_type) else {
                return (aura, None);
            };
            match aura {
                Aura::None => (incoming, None),
                current if current == incoming => (aura, None),
                Aura::Cryo if incoming == Aura::Dendro => (Aura::CryoDendro, None),
                Aura::Dendro if incoming == Aura::Cryo => (Aura::CryoDendro, None),
                Aura::CryoDendro => match incoming {
                    Aura::Cryo | Aura::Dendro => (aura, None),
                    _ => (Aura::Dendro, pair(Aura::Cryo, incoming)),
                },
                current => match pair(current, incoming) {
                    Some(reaction) => (Aura::None, Some(reaction)),
                    None => (incoming, None),
                },
            }
        }
    }
}
