//! Inbound events
//!
//! Everything the transport can hand the engine: a slash command, a
//! free-text message, or a parsed callback payload. Callback payloads
//! use the historical `<action>_<id>[_<sub>]` encoding, so parsing has
//! to try the most specific prefixes first (`edit_skin_field_` before
//! `edit_skin_`, `confirm_delete_case_` before `delete_case_`).

use crate::db::{Rarity, SkinField, WearLabel};

/// Recognized slash commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Admin,
    /// Any other `/command`: answered with the unsupported-input reply.
    Other,
}

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.split_whitespace().next()?;
        if !word.starts_with('/') {
            return None;
        }
        // `/start@BotName` also counts.
        match word.split('@').next().unwrap_or(word) {
            "/start" => Some(Command::Start),
            "/admin" => Some(Command::Admin),
            _ => Some(Command::Other),
        }
    }
}

/// One inbound user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command(Command),
    Text(String),
    Callback(CallbackAction),
}

/// Every button payload the bot emits. `encode` and `parse` are exact
/// inverses for all variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallbackAction {
    // Navigation
    MainMenu,
    AdminMenu,

    // Browsing
    ViewCases,
    ViewWeapons,
    ViewSkins,
    ShowCase(i64),
    ShowWeapon(i64),

    // Search
    SearchSkin,
    SearchWeapon(i64),

    // Admin sections
    AdminCases,
    AdminWeapons,
    AdminSkins,
    AdminCaseSkins,

    // Case management
    AddCase,
    EditCaseMenu,
    EditCase(i64),
    EditCaseName(i64),
    EditCaseImage(i64),
    DeleteCaseMenu,
    DeleteCase(i64),
    ConfirmDeleteCase(i64),

    // Weapon management
    AddWeapon,
    EditWeaponMenu,
    EditWeapon(i64),
    DeleteWeaponMenu,
    DeleteWeapon(i64),
    ConfirmDeleteWeapon(i64),

    // Skin management
    AddSkin,
    AddSkinWeapon(i64),
    SkinRarity(Option<Rarity>),
    SkinStatTrak(bool),
    SkinSouvenir(bool),
    EditSkinMenu,
    EditSkin(i64),
    EditSkinField(i64, SkinField),
    SetSkinBool(bool),
    DeleteSkinMenu,
    DeleteSkin(i64),
    ConfirmDeleteSkin(i64),

    // Wear variants
    AddWearMenu,
    AddWearSkin(i64),
    WearType(i64, WearLabel),

    // Case-skin links
    AddCaseSkin,
    AddCaseSkinCase(i64),
    AddCaseSkinSkin(i64),
    RemoveCaseSkin,
    RemoveCaseSkinCase(i64),
    RemoveCaseSkinSkin(i64),
    ConfirmRemoveCaseSkin(i64, i64),

    Cancel,
}

impl CallbackAction {
    pub fn encode(self) -> String {
        use CallbackAction::*;
        match self {
            MainMenu => "main_menu".to_string(),
            AdminMenu => "admin_menu".to_string(),
            ViewCases => "view_cases".to_string(),
            ViewWeapons => "view_weapons".to_string(),
            ViewSkins => "view_skins".to_string(),
            ShowCase(id) => format!("case_{id}"),
            ShowWeapon(id) => format!("weapon_{id}"),
            SearchSkin => "search_skin".to_string(),
            SearchWeapon(id) => format!("search_weapon_{id}"),
            AdminCases => "admin_cases".to_string(),
            AdminWeapons => "admin_weapons".to_string(),
            AdminSkins => "admin_skins".to_string(),
            AdminCaseSkins => "admin_caseskins".to_string(),
            AddCase => "add_case".to_string(),
            EditCaseMenu => "edit_case".to_string(),
            EditCase(id) => format!("edit_case_{id}"),
            EditCaseName(id) => format!("edit_case_name_{id}"),
            EditCaseImage(id) => format!("edit_case_image_{id}"),
            DeleteCaseMenu => "delete_case".to_string(),
            DeleteCase(id) => format!("delete_case_{id}"),
            ConfirmDeleteCase(id) => format!("confirm_delete_case_{id}"),
            AddWeapon => "add_weapon".to_string(),
            EditWeaponMenu => "edit_weapon".to_string(),
            EditWeapon(id) => format!("edit_weapon_{id}"),
            DeleteWeaponMenu => "delete_weapon".to_string(),
            DeleteWeapon(id) => format!("delete_weapon_{id}"),
            ConfirmDeleteWeapon(id) => format!("confirm_delete_weapon_{id}"),
            AddSkin => "add_skin".to_string(),
            AddSkinWeapon(id) => format!("add_skin_weapon_{id}"),
            SkinRarity(Some(r)) => format!("skin_rarity_{}", r.as_str()),
            SkinRarity(None) => "skin_rarity_skip".to_string(),
            SkinStatTrak(v) => format!("skin_stattrak_{v}"),
            SkinSouvenir(v) => format!("skin_souvenir_{v}"),
            EditSkinMenu => "edit_skin".to_string(),
            EditSkin(id) => format!("edit_skin_{id}"),
            EditSkinField(id, field) => format!("edit_skin_field_{id}_{}", field.token()),
            SetSkinBool(v) => format!("set_skin_value_{v}"),
            DeleteSkinMenu => "delete_skin".to_string(),
            DeleteSkin(id) => format!("delete_skin_{id}"),
            ConfirmDeleteSkin(id) => format!("confirm_delete_skin_{id}"),
            AddWearMenu => "add_skinwear".to_string(),
            AddWearSkin(id) => format!("add_wear_{id}"),
            WearType(id, wear) => format!("wear_type_{id}_{}", wear.as_str()),
            AddCaseSkin => "add_caseskin".to_string(),
            AddCaseSkinCase(id) => format!("add_caseskin_case_{id}"),
            AddCaseSkinSkin(id) => format!("add_caseskin_skin_{id}"),
            RemoveCaseSkin => "remove_caseskin".to_string(),
            RemoveCaseSkinCase(id) => format!("remove_caseskin_case_{id}"),
            RemoveCaseSkinSkin(id) => format!("remove_caseskin_skin_{id}"),
            ConfirmRemoveCaseSkin(case_id, skin_id) => {
                format!("confirm_remove_caseskin_{case_id}_{skin_id}")
            }
            Cancel => "cancel_action".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<CallbackAction> {
        use CallbackAction::*;
        // Bare tokens first; several of them are also prefixes of
        // id-carrying payloads (`delete_case` vs `delete_case_7`).
        match data {
            "main_menu" => return Some(MainMenu),
            "admin_menu" => return Some(AdminMenu),
            "view_cases" => return Some(ViewCases),
            "view_weapons" => return Some(ViewWeapons),
            "view_skins" => return Some(ViewSkins),
            "search_skin" => return Some(SearchSkin),
            "admin_cases" => return Some(AdminCases),
            "admin_weapons" => return Some(AdminWeapons),
            "admin_skins" => return Some(AdminSkins),
            "admin_caseskins" => return Some(AdminCaseSkins),
            "add_case" => return Some(AddCase),
            "edit_case" => return Some(EditCaseMenu),
            "delete_case" => return Some(DeleteCaseMenu),
            "add_weapon" => return Some(AddWeapon),
            "edit_weapon" => return Some(EditWeaponMenu),
            "delete_weapon" => return Some(DeleteWeaponMenu),
            "add_skin" => return Some(AddSkin),
            "edit_skin" => return Some(EditSkinMenu),
            "delete_skin" => return Some(DeleteSkinMenu),
            "add_skinwear" => return Some(AddWearMenu),
            "add_caseskin" => return Some(AddCaseSkin),
            "remove_caseskin" => return Some(RemoveCaseSkin),
            "skin_rarity_skip" => return Some(SkinRarity(None)),
            "cancel_action" => return Some(Cancel),
            _ => {}
        }

        // Most specific prefixes first.
        if let Some(rest) = data.strip_prefix("confirm_remove_caseskin_") {
            let (case_id, skin_id) = rest.split_once('_')?;
            return Some(ConfirmRemoveCaseSkin(case_id.parse().ok()?, skin_id.parse().ok()?));
        }
        if let Some(id) = parse_id(data, "confirm_delete_case_") {
            return Some(ConfirmDeleteCase(id));
        }
        if let Some(id) = parse_id(data, "confirm_delete_weapon_") {
            return Some(ConfirmDeleteWeapon(id));
        }
        if let Some(id) = parse_id(data, "confirm_delete_skin_") {
            return Some(ConfirmDeleteSkin(id));
        }
        if let Some(rest) = data.strip_prefix("edit_skin_field_") {
            let (id, token) = rest.split_once('_')?;
            return Some(EditSkinField(id.parse().ok()?, SkinField::parse_token(token)?));
        }
        if let Some(id) = parse_id(data, "edit_case_name_") {
            return Some(EditCaseName(id));
        }
        if let Some(id) = parse_id(data, "edit_case_image_") {
            return Some(EditCaseImage(id));
        }
        if let Some(id) = parse_id(data, "edit_case_") {
            return Some(EditCase(id));
        }
        if let Some(id) = parse_id(data, "edit_weapon_") {
            return Some(EditWeapon(id));
        }
        if let Some(id) = parse_id(data, "edit_skin_") {
            return Some(EditSkin(id));
        }
        if let Some(id) = parse_id(data, "delete_case_") {
            return Some(DeleteCase(id));
        }
        if let Some(id) = parse_id(data, "delete_weapon_") {
            return Some(DeleteWeapon(id));
        }
        if let Some(id) = parse_id(data, "delete_skin_") {
            return Some(DeleteSkin(id));
        }
        if let Some(id) = parse_id(data, "add_skin_weapon_") {
            return Some(AddSkinWeapon(id));
        }
        if let Some(rest) = data.strip_prefix("skin_rarity_") {
            return Some(SkinRarity(Some(Rarity::parse(rest)?)));
        }
        if let Some(rest) = data.strip_prefix("skin_stattrak_") {
            return Some(SkinStatTrak(parse_flag(rest)?));
        }
        if let Some(rest) = data.strip_prefix("skin_souvenir_") {
            return Some(SkinSouvenir(parse_flag(rest)?));
        }
        if let Some(rest) = data.strip_prefix("set_skin_value_") {
            return Some(SetSkinBool(parse_flag(rest)?));
        }
        if let Some(id) = parse_id(data, "add_wear_") {
            return Some(AddWearSkin(id));
        }
        if let Some(rest) = data.strip_prefix("wear_type_") {
            // The wear label itself contains no underscores, but it
            // does contain spaces, so split on the first underscore
            // only.
            let (id, label) = rest.split_once('_')?;
            return Some(WearType(id.parse().ok()?, WearLabel::parse(label)?));
        }
        if let Some(id) = parse_id(data, "add_caseskin_case_") {
            return Some(AddCaseSkinCase(id));
        }
        if let Some(id) = parse_id(data, "add_caseskin_skin_") {
            return Some(AddCaseSkinSkin(id));
        }
        if let Some(id) = parse_id(data, "remove_caseskin_case_") {
            return Some(RemoveCaseSkinCase(id));
        }
        if let Some(id) = parse_id(data, "remove_caseskin_skin_") {
            return Some(RemoveCaseSkinSkin(id));
        }
        if let Some(id) = parse_id(data, "search_weapon_") {
            return Some(SearchWeapon(id));
        }
        if let Some(id) = parse_id(data, "case_") {
            return Some(ShowCase(id));
        }
        if let Some(id) = parse_id(data, "weapon_") {
            return Some(ShowWeapon(id));
        }
        None
    }
}

fn parse_id(data: &str, prefix: &str) -> Option<i64> {
    data.strip_prefix(prefix)?.parse().ok()
}

fn parse_flag(token: &str) -> Option<bool> {
    match token {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/admin"), Some(Command::Admin));
        assert_eq!(Command::parse("/admin@SkindexBot"), Some(Command::Admin));
        assert_eq!(Command::parse("/help"), Some(Command::Other));
        assert_eq!(Command::parse("hello"), None);
    }

    #[test]
    fn prefix_disambiguation() {
        assert_eq!(CallbackAction::parse("edit_case"), Some(CallbackAction::EditCaseMenu));
        assert_eq!(CallbackAction::parse("edit_case_7"), Some(CallbackAction::EditCase(7)));
        assert_eq!(
            CallbackAction::parse("edit_case_name_7"),
            Some(CallbackAction::EditCaseName(7))
        );
        assert_eq!(
            CallbackAction::parse("edit_skin_field_3_stattrak"),
            Some(CallbackAction::EditSkinField(3, crate::db::SkinField::StatTrak))
        );
        assert_eq!(CallbackAction::parse("edit_skin_3"), Some(CallbackAction::EditSkin(3)));
        assert_eq!(CallbackAction::parse("delete_case"), Some(CallbackAction::DeleteCaseMenu));
        assert_eq!(
            CallbackAction::parse("confirm_delete_case_12"),
            Some(CallbackAction::ConfirmDeleteCase(12))
        );
        assert_eq!(
            CallbackAction::parse("confirm_remove_caseskin_2_9"),
            Some(CallbackAction::ConfirmRemoveCaseSkin(2, 9))
        );
    }

    #[test]
    fn spaced_payloads_parse() {
        assert_eq!(
            CallbackAction::parse("wear_type_5_Factory New"),
            Some(CallbackAction::WearType(5, WearLabel::FactoryNew))
        );
        assert_eq!(
            CallbackAction::parse("skin_rarity_Mil-Spec Grade"),
            Some(CallbackAction::SkinRarity(Some(Rarity::MilSpecGrade)))
        );
        assert_eq!(CallbackAction::parse("skin_rarity_skip"), Some(CallbackAction::SkinRarity(None)));
    }

    #[test]
    fn junk_payloads_rejected() {
        for data in [
            "",
            "case_",
            "case_x",
            "wear_type_5_Banana",
            "skin_rarity_Shiny",
            "skin_stattrak_maybe",
            "edit_skin_field_3_color",
            "confirm_remove_caseskin_2",
            "nonsense",
        ] {
            assert_eq!(CallbackAction::parse(data), None, "{data:?} should not parse");
        }
    }
}
