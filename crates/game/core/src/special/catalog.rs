//! Static registry of special-move effects.
//!
//! Each [`EffectKind`] maps to exactly one [`EffectDefinition`] in
//! [`CATALOG`], indexed by discriminant. Names round-trip through
//! `Display`/`FromStr` so content files and player input use the same
//! spelling the catalog does ("Knockback+", "SP Recover", ...).

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::ArenaConfig;
use crate::stats::Stats;

/// Effects carried by one move or attack (at most two).
pub type EffectList = ArrayVec<EffectKind, { ArenaConfig::MAX_EFFECTS_PER_MOVE }>;

/// The category a special move is defined as.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MoveCategory {
    MeleeAttack,
    RangedAttack,
    Defense,
    SupportSelf,
    SupportOther,
    HinderOther,
}

impl MoveCategory {
    pub const fn flag(self) -> MoveCategories {
        match self {
            Self::MeleeAttack => MoveCategories::MELEE_ATTACK,
            Self::RangedAttack => MoveCategories::RANGED_ATTACK,
            Self::Defense => MoveCategories::DEFENSE,
            Self::SupportSelf => MoveCategories::SUPPORT_SELF,
            Self::SupportOther => MoveCategories::SUPPORT_OTHER,
            Self::HinderOther => MoveCategories::HINDER_OTHER,
        }
    }

    /// Whether using a move of this category requires a target.
    pub const fn needs_target(self) -> bool {
        !matches!(self, Self::SupportSelf | Self::Defense)
    }
}

bitflags! {
    /// Set of categories an effect may be attached to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveCategories: u8 {
        const MELEE_ATTACK  = 1 << 0;
        const RANGED_ATTACK = 1 << 1;
        const DEFENSE       = 1 << 2;
        const SUPPORT_SELF  = 1 << 3;
        const SUPPORT_OTHER = 1 << 4;
        const HINDER_OTHER  = 1 << 5;
    }
}

const ATTACKS: MoveCategories = MoveCategories::MELEE_ATTACK.union(MoveCategories::RANGED_ATTACK);
const SUPPORT: MoveCategories = MoveCategories::SUPPORT_SELF.union(MoveCategories::SUPPORT_OTHER);
const ATTACKS_OR_HINDER: MoveCategories = ATTACKS.union(MoveCategories::HINDER_OTHER);
const ANY: MoveCategories = MoveCategories::all();
const ANY_BUT_DEFENSE: MoveCategories = ANY.difference(MoveCategories::DEFENSE);

/// Which slot of a two-effect move an effect may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    Either,
    FirstOnly,
    SecondOnly,
}

/// Every effect a special move can be built from.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum EffectKind {
    Absorb,
    #[strum(serialize = "Bonus Action")]
    BonusAction,
    #[strum(serialize = "Boosted Attack")]
    BoostedAttack,
    #[strum(serialize = "Boosted Defense")]
    BoostedDefense,
    #[strum(serialize = "Bypass Defense")]
    BypassDefense,
    #[strum(serialize = "Charge Move")]
    ChargeMove,
    Counterattack,
    #[strum(serialize = "Desperation Move")]
    DesperationMove,
    #[strum(serialize = "Double Attack")]
    DoubleAttack,
    #[strum(serialize = "Double Damage")]
    DoubleDamage,
    #[strum(serialize = "Grant Buffed ATK")]
    GrantBuffedAtk,
    #[strum(serialize = "Grant Buffed DEF")]
    GrantBuffedDef,
    #[strum(serialize = "Grant Buffed MOB")]
    GrantBuffedMob,
    #[strum(serialize = "Half Damage")]
    HalfDamage,
    #[strum(serialize = "Halve Damage")]
    HalveDamage,
    Heal,
    #[strum(serialize = "Inflict Debuffed ATK")]
    InflictDebuffedAtk,
    #[strum(serialize = "Inflict Debuffed DEF")]
    InflictDebuffedDef,
    #[strum(serialize = "Inflict Debuffed MOB")]
    InflictDebuffedMob,
    #[strum(serialize = "Inflict Immobilization")]
    InflictImmobilization,
    #[strum(serialize = "Inflict Disabled Action")]
    InflictDisabledAction,
    Knockback,
    #[strum(serialize = "Knockback+")]
    KnockbackPlus,
    Leech,
    #[strum(serialize = "Lunge Attack")]
    LungeAttack,
    #[strum(serialize = "Melee-Only Defense")]
    MeleeOnlyDefense,
    #[strum(serialize = "Negate Damage")]
    NegateDamage,
    #[strum(serialize = "Negate Effects")]
    NegateEffects,
    #[strum(serialize = "No Damage")]
    NoDamage,
    #[strum(serialize = "Opening Gambit")]
    OpeningGambit,
    #[strum(serialize = "Parting Attack")]
    PartingAttack,
    #[strum(serialize = "Perfect Attack")]
    PerfectAttack,
    #[strum(serialize = "Perfect Defense")]
    PerfectDefense,
    #[strum(serialize = "Point-Blank")]
    PointBlank,
    #[strum(serialize = "Precise Attack")]
    PreciseAttack,
    #[strum(serialize = "Precise Defense")]
    PreciseDefense,
    #[strum(serialize = "Projected Strike")]
    ProjectedStrike,
    #[strum(serialize = "Pull In")]
    PullIn,
    #[strum(serialize = "Pull In+")]
    PullInPlus,
    #[strum(serialize = "Ranged-Only Defense")]
    RangedOnlyDefense,
    #[strum(serialize = "Risky Defense")]
    RiskyDefense,
    Reflect,
    Recoil,
    #[strum(serialize = "SP Recover")]
    SpRecover,
    #[strum(serialize = "Super Dash")]
    SuperDash,
    #[strum(serialize = "Take Disabled Action")]
    TakeDisabledAction,
    #[strum(serialize = "Take Immobilization")]
    TakeImmobilization,
    #[strum(serialize = "Touch Effect")]
    TouchEffect,
    #[strum(serialize = "Vital Move")]
    VitalMove,
}

impl EffectKind {
    pub fn definition(self) -> &'static EffectDefinition {
        &CATALOG[self as usize]
    }

    pub fn cost(self) -> i32 {
        self.definition().cost
    }

    /// Drawbacks carry a negative cost and are never a move's first effect.
    pub fn is_drawback(self) -> bool {
        self.cost() < 0
    }

    pub fn applies_to(self, category: MoveCategory) -> bool {
        self.definition().categories.contains(category.flag())
    }

    /// True if either effect lists the other as incompatible.
    pub fn conflicts_with(self, other: EffectKind) -> bool {
        self.definition().incompatible.contains(&other)
            || other.definition().incompatible.contains(&self)
    }

    /// Effects that give a roll to a fighter whose attack stat is 0.
    pub fn grants_attack_roll(self) -> bool {
        matches!(
            self,
            Self::BoostedAttack | Self::PerfectAttack | Self::PreciseAttack
        )
    }

    pub fn all() -> impl Iterator<Item = EffectKind> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EffectKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_ref())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EffectKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = <String as serde::Deserialize>::deserialize(deserializer)?;
        name.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown effect `{name}`")))
    }
}

/// Immutable catalog entry.
#[derive(Debug)]
pub struct EffectDefinition {
    pub kind: EffectKind,
    /// Signed SP cost; negative for drawbacks.
    pub cost: i32,
    pub categories: MoveCategories,
    pub incompatible: &'static [EffectKind],
    pub placement: Placement,
    /// Minimum stats needed to take this effect.
    pub requires: Stats,
    pub description: &'static str,
}

const fn entry(
    kind: EffectKind,
    cost: i32,
    categories: MoveCategories,
    incompatible: &'static [EffectKind],
    description: &'static str,
) -> EffectDefinition {
    EffectDefinition {
        kind,
        cost,
        categories,
        incompatible,
        placement: Placement::Either,
        requires: Stats::ZERO,
        description,
    }
}

const fn placed(mut def: EffectDefinition, placement: Placement) -> EffectDefinition {
    def.placement = placement;
    def
}

const fn requiring(mut def: EffectDefinition, requires: Stats) -> EffectDefinition {
    def.requires = requires;
    def
}

use EffectKind as E;
use MoveCategories as C;

/// The full effect table, in [`EffectKind`] discriminant order.
pub static CATALOG: [EffectDefinition; 49] = [
    entry(E::Absorb, 2, C::DEFENSE, &[], "Recover HP from a defense roll that beats the attack"),
    placed(
        entry(E::BonusAction, 2, SUPPORT.union(C::HINDER_OTHER), &[], "Take another non-special action after this move"),
        Placement::SecondOnly,
    ),
    entry(E::BoostedAttack, 2, ATTACKS, &[], "Adds 2 to the attack roll"),
    entry(E::BoostedDefense, 2, C::DEFENSE, &[], "Adds 2 to the defense roll"),
    entry(E::BypassDefense, 2, ATTACKS, &[], "The target's defense roll is halved"),
    entry(E::ChargeMove, -2, ANY, &[], "Must be prepared with 'charge' before use"),
    entry(E::Counterattack, 2, C::DEFENSE, &[E::Reflect], "Attack back after a successful defense"),
    requiring(
        entry(E::DesperationMove, -1, ANY, &[], "Usable only at 1/3 HP or less"),
        Stats { vit: 1, ..Stats::ZERO },
    ),
    entry(
        E::DoubleAttack,
        2,
        ATTACKS,
        &[E::LungeAttack, E::PartingAttack, E::NoDamage],
        "Make two attacks, both carrying the other effect",
    ),
    entry(E::DoubleDamage, 2, ATTACKS, &[E::HalfDamage, E::NoDamage], "Doubles damage on a hit"),
    entry(E::GrantBuffedAtk, 2, SUPPORT, &[], "Target gets +1 to attack rolls for 3 turns"),
    entry(E::GrantBuffedDef, 2, SUPPORT, &[], "Target gets +1 to defense rolls for 3 turns"),
    entry(E::GrantBuffedMob, 2, SUPPORT, &[], "Target gets +1 movement for 3 turns"),
    entry(E::HalfDamage, -1, ATTACKS, &[E::DoubleDamage, E::NoDamage], "Halves damage on a hit"),
    entry(E::HalveDamage, 2, C::DEFENSE, &[E::NegateDamage], "Halves incoming damage if the attack hits"),
    entry(E::Heal, 2, SUPPORT, &[], "Target recovers HP equal to their VIT"),
    entry(E::InflictDebuffedAtk, 2, ATTACKS_OR_HINDER, &[], "Target gets -1 to attack rolls for 3 turns"),
    entry(E::InflictDebuffedDef, 2, ATTACKS_OR_HINDER, &[], "Target gets -1 to defense rolls for 3 turns"),
    entry(E::InflictDebuffedMob, 2, ATTACKS_OR_HINDER, &[], "Target gets -1 movement for 3 turns"),
    entry(E::InflictImmobilization, 2, ATTACKS_OR_HINDER, &[], "Target can't move on their next turn"),
    entry(E::InflictDisabledAction, 3, ATTACKS_OR_HINDER, &[], "Target can't act on their next turn"),
    entry(
        E::Knockback,
        1,
        ATTACKS_OR_HINDER,
        &[E::PullIn, E::KnockbackPlus, E::PullInPlus],
        "Target is pushed 2 steps away",
    ),
    entry(
        E::KnockbackPlus,
        2,
        ATTACKS_OR_HINDER,
        &[E::PullIn, E::PullInPlus, E::Knockback],
        "Target is pushed 4 steps away",
    ),
    entry(E::Leech, 2, ATTACKS, &[E::NoDamage], "Recover HP equal to the damage dealt"),
    entry(E::LungeAttack, 2, C::MELEE_ATTACK, &[E::PartingAttack], "Move 2 steps in for free before attacking"),
    entry(E::MeleeOnlyDefense, -1, C::DEFENSE, &[E::RangedOnlyDefense], "Only works against melee attacks"),
    entry(E::NegateDamage, 4, C::DEFENSE, &[E::HalveDamage], "Take no damage, effects still land"),
    entry(E::NegateEffects, 2, C::DEFENSE, &[], "Strip the attack's effects, damage still lands"),
    entry(
        E::NoDamage,
        -2,
        C::MELEE_ATTACK,
        &[E::DoubleDamage, E::HalfDamage],
        "Deals no damage, other effects still land",
    ),
    entry(
        E::OpeningGambit,
        -3,
        ANY_BUT_DEFENSE,
        &[E::Heal],
        "Usable only before taking any other action in the fight",
    ),
    entry(E::PartingAttack, 2, ATTACKS, &[E::LungeAttack], "Move 2 steps away for free after attacking"),
    entry(E::PerfectAttack, 4, ATTACKS, &[E::PreciseAttack], "Attack roll is set to 10"),
    entry(E::PerfectDefense, 4, C::DEFENSE, &[E::PreciseDefense], "Defense roll is set to 10"),
    entry(E::PointBlank, 2, C::RANGED_ATTACK, &[], "Ranged attacks work while engaged"),
    entry(E::PreciseAttack, 2, ATTACKS, &[E::PerfectAttack], "Attack roll is set to 6"),
    entry(E::PreciseDefense, 2, C::DEFENSE, &[E::PerfectDefense], "Defense roll is set to 6"),
    entry(E::ProjectedStrike, 2, C::MELEE_ATTACK, &[E::LungeAttack], "Melee attack at any range"),
    entry(
        E::PullIn,
        1,
        C::RANGED_ATTACK.union(C::HINDER_OTHER),
        &[E::Knockback, E::KnockbackPlus, E::PullInPlus],
        "Target is pulled 2 steps closer",
    ),
    entry(
        E::PullInPlus,
        1,
        C::RANGED_ATTACK.union(C::HINDER_OTHER),
        &[E::Knockback, E::KnockbackPlus, E::PullIn],
        "Target is pulled 4 steps closer",
    ),
    entry(E::RangedOnlyDefense, -1, C::DEFENSE, &[E::MeleeOnlyDefense], "Only works against ranged attacks"),
    entry(
        E::RiskyDefense,
        -1,
        C::DEFENSE,
        &[E::PreciseDefense, E::PerfectDefense, E::NegateDamage],
        "Take double damage if the defense fails",
    ),
    entry(E::Reflect, 2, C::DEFENSE, &[E::Counterattack], "Send a defended attack back at the attacker"),
    entry(E::Recoil, -1, ATTACKS, &[E::NoDamage], "Take half the damage you deal"),
    placed(
        entry(E::SpRecover, 2, C::SUPPORT_SELF, &[], "Regain 3 SP; needs a drawback as its second effect"),
        Placement::FirstOnly,
    ),
    entry(E::SuperDash, 2, C::SUPPORT_SELF, &[], "Dash with 2 extra movement"),
    entry(E::TakeDisabledAction, -2, ANY, &[], "You can't act on your next turn"),
    requiring(
        entry(E::TakeImmobilization, -1, ANY, &[], "You can't move on your next turn"),
        Stats { mob: 6, ..Stats::ZERO },
    ),
    entry(
        E::TouchEffect,
        -1,
        C::SUPPORT_OTHER.union(C::HINDER_OTHER),
        &[],
        "Target must be engaged with you",
    ),
    requiring(
        entry(E::VitalMove, -1, ANY, &[], "Usable only at 2/3 HP or more"),
        Stats { vit: 3, ..Stats::ZERO },
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_discriminant() {
        for kind in EffectKind::all() {
            assert_eq!(kind.definition().kind, kind, "{kind} misplaced");
        }
        assert_eq!(EffectKind::all().count(), CATALOG.len());
    }

    #[test]
    fn names_parse_back_case_insensitively() {
        for kind in EffectKind::all() {
            let lowered = kind.to_string().to_lowercase();
            assert_eq!(lowered.parse::<EffectKind>().unwrap(), kind);
        }
        assert_eq!("knockback+".parse::<EffectKind>().unwrap(), E::KnockbackPlus);
    }

    #[test]
    fn incompatibility_is_checked_both_ways() {
        assert!(E::Reflect.conflicts_with(E::Counterattack));
        assert!(E::Counterattack.conflicts_with(E::Reflect));
        assert!(E::ProjectedStrike.conflicts_with(E::LungeAttack));
        assert!(E::LungeAttack.conflicts_with(E::ProjectedStrike));
        assert!(!E::DoubleDamage.conflicts_with(E::Leech));
    }

    #[test]
    fn drawbacks_have_negative_cost() {
        assert!(E::ChargeMove.is_drawback());
        assert!(E::OpeningGambit.is_drawback());
        assert!(!E::Heal.is_drawback());
        assert_eq!(E::InflictDisabledAction.cost(), 3);
    }

    #[test]
    fn categories_gate_where_effects_attach() {
        assert!(E::PointBlank.applies_to(MoveCategory::RangedAttack));
        assert!(!E::PointBlank.applies_to(MoveCategory::MeleeAttack));
        assert!(!E::OpeningGambit.applies_to(MoveCategory::Defense));
        assert!(E::TakeDisabledAction.applies_to(MoveCategory::Defense));
    }
}
