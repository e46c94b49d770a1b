//! # Profession Data Model
//!
//! Closed enums and the static/runtime records shared by every subsystem.
//!
//! Static records (`MaterialDefinition`, `ProfessionDefinition`, `Recipe`)
//! are supplied by the catalogue and never mutated. Runtime records
//! (`ProfessionState`, `CraftingQueueEntry`, bank entries) are owned by the
//! manager and its subsystems and round-trip through save data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a material.
pub type MaterialId = String;

/// Unique identifier for a recipe.
pub type RecipeId = String;

/// Every profession the engine knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionId {
    /// Gathering: ore from the zone, tick-based.
    Mining,
    /// Gathering: herbs from the zone, tick-based.
    Herbalism,
    /// Gathering: leather from killed beasts, event-based.
    Skinning,
    /// Crafting.
    Blacksmithing,
    /// Crafting.
    Leatherworking,
    /// Crafting.
    Tailoring,
    /// Crafting.
    Alchemy,
    /// Crafting.
    Enchanting,
    /// Crafting.
    Engineering,
    /// Secondary.
    Cooking,
    /// Secondary.
    FirstAid,
    /// Secondary.
    Fishing,
}

impl ProfessionId {
    /// All profession ids in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Mining,
        Self::Herbalism,
        Self::Skinning,
        Self::Blacksmithing,
        Self::Leatherworking,
        Self::Tailoring,
        Self::Alchemy,
        Self::Enchanting,
        Self::Engineering,
        Self::Cooking,
        Self::FirstAid,
        Self::Fishing,
    ];

    /// Stable snake_case name, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mining => "mining",
            Self::Herbalism => "herbalism",
            Self::Skinning => "skinning",
            Self::Blacksmithing => "blacksmithing",
            Self::Leatherworking => "leatherworking",
            Self::Tailoring => "tailoring",
            Self::Alchemy => "alchemy",
            Self::Enchanting => "enchanting",
            Self::Engineering => "engineering",
            Self::Cooking => "cooking",
            Self::FirstAid => "first_aid",
            Self::Fishing => "fishing",
        }
    }

    /// How this profession gathers, if it gathers at all.
    #[must_use]
    pub const fn gathering_mode(self) -> Option<GatheringMode> {
        match self {
            Self::Mining | Self::Herbalism => Some(GatheringMode::Tick),
            Self::Skinning => Some(GatheringMode::MonsterKill),
            _ => None,
        }
    }
}

impl fmt::Display for ProfessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger for a gathering attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatheringMode {
    /// Every `gathering_interval_ticks` ticks.
    Tick,
    /// On a beast kill.
    MonsterKill,
}

/// Profession category. Drives the subsystem rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionKind {
    /// Produces materials into the bank.
    Gathering,
    /// Consumes materials through a crafting queue.
    Crafting,
    /// Always known, never occupies a primary slot, crafts through a queue.
    Secondary,
}

/// Named skill ranges, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillBracket {
    /// Skill 0-74 with canonical thresholds.
    Apprentice,
    /// Skill 75-149.
    Journeyman,
    /// Skill 150-224.
    Expert,
    /// Skill 225-274.
    Artisan,
    /// Skill 275-299.
    Master,
    /// Skill 300.
    Grandmaster,
}

impl SkillBracket {
    /// All brackets, lowest first.
    pub const ALL: [Self; 6] = [
        Self::Apprentice,
        Self::Journeyman,
        Self::Expert,
        Self::Artisan,
        Self::Master,
        Self::Grandmaster,
    ];

    /// Position of this bracket in [`SkillBracket::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Skill-up potential of a recipe relative to current skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeDifficulty {
    /// Recipe at or above current skill.
    Orange,
    /// Up to 25 points below current skill.
    Yellow,
    /// Up to 50 points below current skill.
    Green,
    /// More than 50 points below current skill.
    Gray,
}

/// Material and zone difficulty rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum MaterialTier {
    /// Zone levels 1-10.
    T1 = 1,
    /// Zone levels 11-20.
    T2 = 2,
    /// Zone levels 21-30.
    T3 = 3,
    /// Zone levels 31-40.
    T4 = 4,
    /// Zone levels 41-50.
    T5 = 5,
    /// Zone levels 51-60.
    T6 = 6,
}

impl TryFrom<u8> for MaterialTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::T1),
            2 => Ok(Self::T2),
            3 => Ok(Self::T3),
            4 => Ok(Self::T4),
            5 => Ok(Self::T5),
            6 => Ok(Self::T6),
            other => Err(format!("material tier must be 1-6, got {other}")),
        }
    }
}

impl From<MaterialTier> for u8 {
    fn from(tier: MaterialTier) -> Self {
        tier as u8
    }
}

/// Where a material comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSource {
    /// Produced by a gathering profession.
    Gathering,
    /// Dropped by monsters.
    MonsterDrop,
    /// Dropped in dungeons.
    DungeonDrop,
    /// Bought from a vendor.
    Vendor,
}

/// A material definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    /// Unique identifier.
    pub id: MaterialId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Difficulty rank.
    pub tier: MaterialTier,
    /// Maximum quantity held in one bank slot.
    pub stack_size: u32,
    /// Vendor sell price.
    #[serde(default)]
    pub vendor_price: u32,
    /// Source kind.
    pub source: MaterialSource,
    /// Owning gathering profession, for gathered materials.
    #[serde(default)]
    pub gathering_profession: Option<ProfessionId>,
}

/// One row of a profession's bracket table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketDefinition {
    /// The bracket.
    pub bracket: SkillBracket,
    /// Lowest skill in the bracket.
    pub skill_min: u32,
    /// Skill ceiling of the bracket.
    pub skill_max: u32,
    /// Character level needed to train it.
    pub required_level: u32,
    /// Training cost in gold.
    pub training_cost: u32,
}

/// A profession definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionDefinition {
    /// Unique identifier.
    pub id: ProfessionId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    pub kind: ProfessionKind,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Bracket table for display. The engine applies the balance thresholds;
    /// a non-empty table must agree with them, see
    /// [`crate::ProfessionCatalog::validate_brackets`].
    #[serde(default)]
    pub skill_brackets: Vec<BracketDefinition>,
    /// Suggested partner profession.
    #[serde(default)]
    pub pairs_with: Option<ProfessionId>,
}

/// Material requirement of a recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMaterial {
    /// The material.
    pub material_id: MaterialId,
    /// Quantity consumed.
    pub quantity: u32,
}

impl RecipeMaterial {
    /// Creates a new material requirement.
    #[must_use]
    pub fn new(material_id: impl Into<MaterialId>, quantity: u32) -> Self {
        Self {
            material_id: material_id.into(),
            quantity,
        }
    }
}

/// Skill-up chance per difficulty colour, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillUpChances {
    /// Orange chance.
    pub orange: f64,
    /// Yellow chance.
    pub yellow: f64,
    /// Green chance.
    pub green: f64,
    /// Gray chance.
    pub gray: f64,
}

impl SkillUpChances {
    /// Chance for one colour.
    #[inline]
    #[must_use]
    pub const fn for_difficulty(&self, difficulty: RecipeDifficulty) -> f64 {
        match difficulty {
            RecipeDifficulty::Orange => self.orange,
            RecipeDifficulty::Yellow => self.yellow,
            RecipeDifficulty::Green => self.green,
            RecipeDifficulty::Gray => self.gray,
        }
    }
}

impl Default for SkillUpChances {
    fn default() -> Self {
        Self {
            orange: 1.0,
            yellow: 0.75,
            green: 0.25,
            gray: 0.0,
        }
    }
}

/// Quality hint for generated items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemQuality {
    /// White.
    Common,
    /// Green.
    Uncommon,
    /// Blue.
    Rare,
    /// Purple.
    Epic,
    /// Orange.
    Legendary,
}

/// Timed buff produced by a consumable recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableEffect {
    /// Effect id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Buff duration, 0 for instant effects.
    #[serde(default)]
    pub duration_ms: u64,
    /// Stat name to bonus.
    #[serde(default)]
    pub stat_bonuses: BTreeMap<String, i32>,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
}

/// Permanent gear bonus produced by an enchanting recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantEffect {
    /// Effect id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Gear slot the enchant applies to.
    pub slot: String,
    /// Stat name to bonus.
    #[serde(default)]
    pub stat_bonuses: BTreeMap<String, i32>,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
}

/// What a recipe produces. Items are only named here; generation is external.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecipeOutput {
    /// An item template plus generation hints.
    Item {
        /// Template id resolved by the item generator.
        item_template_id: String,
        /// Stack produced.
        #[serde(default = "one")]
        quantity: u32,
        /// Item level hint.
        #[serde(default)]
        item_level: Option<u32>,
        /// Quality hint.
        #[serde(default)]
        quality: Option<ItemQuality>,
    },
    /// A consumable buff.
    Consumable {
        /// The buff.
        effect: ConsumableEffect,
        /// Stack produced.
        #[serde(default = "one")]
        quantity: u32,
    },
    /// A gear enchantment.
    Enchantment {
        /// The enchant.
        effect: EnchantEffect,
    },
}

const fn one() -> u32 {
    1
}

/// A crafting recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier.
    pub id: RecipeId,
    /// Owning profession.
    pub profession_id: ProfessionId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Difficulty anchor.
    pub skill_required: u32,
    /// Per-recipe chance table; falls back to the balance table when absent.
    #[serde(default)]
    pub skill_up_chance: Option<SkillUpChances>,
    /// Materials consumed when queued.
    #[serde(default)]
    pub materials: Vec<RecipeMaterial>,
    /// Craft duration.
    pub craft_time_ms: u64,
    /// Produced output.
    pub output: RecipeOutput,
}

/// Per-player state of one learned profession.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionState {
    /// The profession.
    pub profession_id: ProfessionId,
    /// Current skill; starts at 1.
    pub skill: u32,
    /// Ceiling of the current bracket.
    pub max_skill: u32,
    /// Learned recipe ids, in learn order.
    pub known_recipes: Vec<RecipeId>,
    /// Current bracket.
    pub current_bracket: SkillBracket,
}

impl ProfessionState {
    /// Fresh apprentice state with skill 1.
    #[must_use]
    pub fn new(profession_id: ProfessionId, max_skill: u32) -> Self {
        Self {
            profession_id,
            skill: 1,
            max_skill,
            known_recipes: Vec::new(),
            current_bracket: SkillBracket::Apprentice,
        }
    }

    /// Whether another skill point can still be earned in this bracket.
    #[inline]
    #[must_use]
    pub const fn can_skill_up(&self) -> bool {
        self.skill < self.max_skill
    }

    /// Adds one skill point, clamped to `max_skill`.
    pub fn gain_skill_point(&mut self) {
        self.skill = (self.skill + 1).min(self.max_skill);
    }
}

/// One bank slot, as stored in save data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialBankEntry {
    /// The material.
    pub material_id: MaterialId,
    /// Quantity held.
    pub quantity: u32,
}

/// A queued craft. Progress lives on the engine, not on the entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingQueueEntry {
    /// Recipe to craft.
    pub recipe_id: RecipeId,
    /// Wall-clock enqueue time (ms since epoch), informational.
    pub started_at: u64,
    /// `started_at + craft_time_ms`, informational.
    pub completes_at: u64,
}

/// Outcome of one gather attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatheringResult {
    /// Profession that gathered.
    pub profession_id: ProfessionId,
    /// Material produced.
    pub material_id: MaterialId,
    /// Yield computed for the attempt (the bank may accept less).
    pub quantity: u32,
    /// Whether the attempt raised skill.
    pub skill_up: bool,
    /// Skill after the attempt.
    pub new_skill: u32,
}

/// Outcome of one completed craft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingResult {
    /// Recipe that completed.
    pub recipe_id: RecipeId,
    /// Item template to generate, for item recipes.
    pub output_item_id: Option<String>,
    /// Buff produced, for consumable recipes.
    pub consumable_effect: Option<ConsumableEffect>,
    /// Enchant produced, for enchanting recipes.
    pub enchant_effect: Option<EnchantEffect>,
    /// Whether the craft raised skill.
    pub skill_up: bool,
    /// Skill after the craft.
    pub new_skill: u32,
}
