//! Catalog schema and typed row/value definitions

/// Schema applied on startup. Every statement is idempotent.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS weapons (
    weapon_id INTEGER PRIMARY KEY AUTOINCREMENT,
    weapon_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS skins (
    skin_id INTEGER PRIMARY KEY AUTOINCREMENT,
    skin_name TEXT NOT NULL,
    rarity TEXT,
    stattrak BOOLEAN NOT NULL DEFAULT 0,
    souvenir BOOLEAN NOT NULL DEFAULT 0,
    image_skin TEXT,
    weapon_id INTEGER NOT NULL REFERENCES weapons(weapon_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS skinwear (
    skinwear_id INTEGER PRIMARY KEY AUTOINCREMENT,
    skin_id INTEGER NOT NULL REFERENCES skins(skin_id) ON DELETE CASCADE,
    weartype TEXT NOT NULL,
    floatmin REAL NOT NULL,
    floatmax REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS cases (
    case_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_name TEXT NOT NULL UNIQUE,
    image_case TEXT
);

CREATE TABLE IF NOT EXISTS caseskins (
    case_id INTEGER NOT NULL REFERENCES cases(case_id) ON DELETE CASCADE,
    skin_id INTEGER NOT NULL REFERENCES skins(skin_id) ON DELETE CASCADE,
    PRIMARY KEY (case_id, skin_id)
);
";

/// A weapon row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    pub id: i64,
    pub name: String,
}

/// A skin row with its weapon name denormalized (every skin query
/// joins `weapons`, because nearly every rendering needs the
/// `Weapon | Skin` label).
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub id: i64,
    pub name: String,
    pub rarity: Option<String>,
    pub stattrak: bool,
    pub souvenir: bool,
    pub image_url: Option<String>,
    pub weapon_id: i64,
    pub weapon_name: String,
}

impl Skin {
    /// Display label used in selection lists and confirmations.
    pub fn label(&self) -> String {
        format!("{} | {}", self.weapon_name, self.name)
    }
}

/// A wear-variant row. `label` is stored as text; known labels map to
/// [`WearLabel`] for ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct WearVariant {
    pub id: i64,
    pub skin_id: i64,
    pub label: String,
    pub float_min: f64,
    pub float_max: f64,
}

/// A case row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
}

/// Outcome of linking a skin to a case. `AlreadyPresent` is a normal
/// result, not an error: the caller renders a specific message for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOutcome {
    Added,
    AlreadyPresent,
}

// ============================================================================
// Rarity
// ============================================================================

/// The rarity grades offered by the add-skin picker. The column itself
/// is free text (edits may write anything), so this enum exists for the
/// picker and for the severity comparator, not as a storage constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    ConsumerGrade,
    Common,
    IndustrialGrade,
    Uncommon,
    MilSpecGrade,
    Restricted,
    Mythical,
    Classified,
    Ancient,
    Covert,
}

impl Rarity {
    /// Picker order (as the admin keyboard presents them).
    pub const ALL: [Rarity; 10] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Mythical,
        Rarity::Ancient,
        Rarity::Covert,
        Rarity::Classified,
        Rarity::Restricted,
        Rarity::MilSpecGrade,
        Rarity::IndustrialGrade,
        Rarity::ConsumerGrade,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::ConsumerGrade => "Consumer Grade",
            Rarity::Common => "Common",
            Rarity::IndustrialGrade => "Industrial Grade",
            Rarity::Uncommon => "Uncommon",
            Rarity::MilSpecGrade => "Mil-Spec Grade",
            Rarity::Restricted => "Restricted",
            Rarity::Mythical => "Mythical",
            Rarity::Classified => "Classified",
            Rarity::Ancient => "Ancient",
            Rarity::Covert => "Covert",
        }
    }

    pub fn parse(s: &str) -> Option<Rarity> {
        Rarity::ALL.iter().copied().find(|r| r.as_str() == s)
    }

    /// Severity rank, higher is rarer. Drives the "rarity descending"
    /// ordering; intentionally not a lexical sort.
    pub fn severity(self) -> u8 {
        match self {
            Rarity::ConsumerGrade => 0,
            Rarity::Common => 1,
            Rarity::IndustrialGrade => 2,
            Rarity::Uncommon => 3,
            Rarity::MilSpecGrade => 4,
            Rarity::Restricted => 5,
            Rarity::Mythical => 6,
            Rarity::Classified => 7,
            Rarity::Ancient => 8,
            Rarity::Covert => 9,
        }
    }
}

/// Comparator key for an optional, possibly free-text rarity. Known
/// grades order by severity; unknown text and NULL sort after all of
/// them (least rare).
pub fn rarity_severity(rarity: Option<&str>) -> i16 {
    rarity
        .and_then(Rarity::parse)
        .map_or(-1, |r| i16::from(r.severity()))
}

// ============================================================================
// Wear labels
// ============================================================================

/// The fixed set of wear bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WearLabel {
    FactoryNew,
    MinimalWear,
    FieldTested,
    WellWorn,
    BattleScarred,
}

impl WearLabel {
    pub const ALL: [WearLabel; 5] = [
        WearLabel::FactoryNew,
        WearLabel::MinimalWear,
        WearLabel::FieldTested,
        WearLabel::WellWorn,
        WearLabel::BattleScarred,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WearLabel::FactoryNew => "Factory New",
            WearLabel::MinimalWear => "Minimal Wear",
            WearLabel::FieldTested => "Field-Tested",
            WearLabel::WellWorn => "Well-Worn",
            WearLabel::BattleScarred => "Battle-Scarred",
        }
    }

    pub fn parse(s: &str) -> Option<WearLabel> {
        WearLabel::ALL.iter().copied().find(|w| w.as_str() == s)
    }

    /// Canonical display position, Factory New first.
    pub fn rank(self) -> u8 {
        match self {
            WearLabel::FactoryNew => 0,
            WearLabel::MinimalWear => 1,
            WearLabel::FieldTested => 2,
            WearLabel::WellWorn => 3,
            WearLabel::BattleScarred => 4,
        }
    }
}

/// Rank for stored wear text; unknown labels sort last.
pub fn wear_rank(label: &str) -> u8 {
    WearLabel::parse(label).map_or(u8::MAX, WearLabel::rank)
}

// ============================================================================
// Typed updates
// ============================================================================

/// Updatable case fields. A closed set: update paths never take raw
/// column names.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseUpdate {
    Name(String),
    ImageUrl(Option<String>),
}

/// Updatable skin fields, each carrying its typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum SkinUpdate {
    Name(String),
    Rarity(Option<String>),
    StatTrak(bool),
    Souvenir(bool),
    ImageUrl(Option<String>),
}

/// Which skin field an edit flow is targeting. This is the UI-side
/// selector; it pairs with an input value to build a [`SkinUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinField {
    Name,
    Rarity,
    StatTrak,
    Souvenir,
    ImageUrl,
}

impl SkinField {
    /// Token used inside callback payloads (kept byte-compatible with
    /// the historical column-name encoding).
    pub fn token(self) -> &'static str {
        match self {
            SkinField::Name => "skin_name",
            SkinField::Rarity => "rarity",
            SkinField::StatTrak => "stattrak",
            SkinField::Souvenir => "souvenir",
            SkinField::ImageUrl => "image_skin",
        }
    }

    pub fn parse_token(s: &str) -> Option<SkinField> {
        match s {
            "skin_name" => Some(SkinField::Name),
            "rarity" => Some(SkinField::Rarity),
            "stattrak" => Some(SkinField::StatTrak),
            "souvenir" => Some(SkinField::Souvenir),
            "image_skin" => Some(SkinField::ImageUrl),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SkinField::Name => "Name",
            SkinField::Rarity => "Rarity",
            SkinField::StatTrak => "StatTrak",
            SkinField::Souvenir => "Souvenir",
            SkinField::ImageUrl => "Image URL",
        }
    }

    /// Boolean fields are edited through a Yes/No selection rather
    /// than free text.
    pub fn is_boolean(self) -> bool {
        matches!(self, SkinField::StatTrak | SkinField::Souvenir)
    }
}

/// Truthy tokens for boolean input: "true", "yes", "1"
/// (case-insensitive). Everything else is falsy.
pub fn parse_bool_token(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}
