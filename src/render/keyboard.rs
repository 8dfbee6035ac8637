//! Inline keyboard construction
//!
//! Transport-agnostic keyboards: a grid of labelled buttons, each
//! carrying an encoded callback payload. Builders collect buttons in
//! order and then shape them into rows with [`KeyboardBuilder::adjust`]
//! (a row-width list whose last entry repeats, so `&[2]` means "two
//! per row" and `&[2, 2, 1]` pins the tail row to a single button).

use crate::db::{Case, Rarity, SkinField, Weapon, WearLabel};
use crate::state_machine::event::CallbackAction;

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            text: text.into(),
            callback_data: action.encode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

#[derive(Debug, Default)]
pub struct KeyboardBuilder {
    buttons: Vec<Button>,
}

impl KeyboardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(mut self, text: impl Into<String>, action: CallbackAction) -> Self {
        self.buttons.push(Button::new(text, action));
        self
    }

    /// Shape the collected buttons into rows. The last width repeats
    /// for any remaining buttons; an empty list means one per row.
    pub fn adjust(self, widths: &[usize]) -> Keyboard {
        let mut rows = Vec::new();
        let mut remaining = self.buttons.into_iter().peekable();
        let mut widths = widths.iter().copied().filter(|w| *w > 0);
        let mut width = widths.next().unwrap_or(1);
        while remaining.peek().is_some() {
            let row: Vec<Button> = remaining.by_ref().take(width).collect();
            rows.push(row);
            width = widths.next().unwrap_or(width);
        }
        Keyboard { rows }
    }
}

const CANCEL: &str = "❌ Cancel";
const BACK_TO_ADMIN: &str = "⬅️ Back";

// ==================== Static menus ====================

pub fn main_menu() -> Keyboard {
    KeyboardBuilder::new()
        .button("📦 Cases", CallbackAction::ViewCases)
        .button("🔫 Weapons", CallbackAction::ViewWeapons)
        .button("🎨 All skins", CallbackAction::ViewSkins)
        .button("🔎 Search skin", CallbackAction::SearchSkin)
        .adjust(&[2])
}

pub fn admin_menu() -> Keyboard {
    KeyboardBuilder::new()
        .button("📦 Manage cases", CallbackAction::AdminCases)
        .button("🔫 Manage weapons", CallbackAction::AdminWeapons)
        .button("🎨 Manage skins", CallbackAction::AdminSkins)
        .button("🔗 Case contents", CallbackAction::AdminCaseSkins)
        .button("🏠 Main menu", CallbackAction::MainMenu)
        .adjust(&[2, 2, 1])
}

pub fn admin_cases_menu() -> Keyboard {
    KeyboardBuilder::new()
        .button("➕ Add case", CallbackAction::AddCase)
        .button("✏️ Edit case", CallbackAction::EditCaseMenu)
        .button("🗑️ Delete case", CallbackAction::DeleteCaseMenu)
        .button(BACK_TO_ADMIN, CallbackAction::AdminMenu)
        .adjust(&[2, 2])
}

pub fn admin_weapons_menu() -> Keyboard {
    KeyboardBuilder::new()
        .button("➕ Add weapon", CallbackAction::AddWeapon)
        .button("✏️ Edit weapon", CallbackAction::EditWeaponMenu)
        .button("🗑️ Delete weapon", CallbackAction::DeleteWeaponMenu)
        .button(BACK_TO_ADMIN, CallbackAction::AdminMenu)
        .adjust(&[2, 2])
}

pub fn admin_skins_menu() -> Keyboard {
    KeyboardBuilder::new()
        .button("➕ Add skin", CallbackAction::AddSkin)
        .button("✏️ Edit skin", CallbackAction::EditSkinMenu)
        .button("🗑️ Delete skin", CallbackAction::DeleteSkinMenu)
        .button("📏 Add wear variant", CallbackAction::AddWearMenu)
        .button(BACK_TO_ADMIN, CallbackAction::AdminMenu)
        .adjust(&[2, 2, 1])
}

pub fn admin_caseskins_menu() -> Keyboard {
    KeyboardBuilder::new()
        .button("➕ Add skin to case", CallbackAction::AddCaseSkin)
        .button("➖ Remove skin from case", CallbackAction::RemoveCaseSkin)
        .button(BACK_TO_ADMIN, CallbackAction::AdminMenu)
        .adjust(&[1])
}

// ==================== Browsing ====================

pub fn case_list(cases: &[Case]) -> Keyboard {
    let mut builder = KeyboardBuilder::new();
    for case in cases {
        builder = builder.button(&case.name, CallbackAction::ShowCase(case.id));
    }
    builder.button("🏠 Main menu", CallbackAction::MainMenu).adjust(&[1])
}

pub fn weapon_list(weapons: &[Weapon]) -> Keyboard {
    let mut builder = KeyboardBuilder::new();
    for weapon in weapons {
        builder = builder.button(&weapon.name, CallbackAction::ShowWeapon(weapon.id));
    }
    builder.button("🏠 Main menu", CallbackAction::MainMenu).adjust(&[1])
}

pub fn back_to_main() -> Keyboard {
    KeyboardBuilder::new()
        .button("🏠 Main menu", CallbackAction::MainMenu)
        .adjust(&[1])
}

// ==================== Flow selection lists ====================

/// One button per item plus a trailing Cancel, one per row. Every
/// admin picker uses this shape; only the payload constructor differs.
pub fn selection_list<T>(
    items: &[T],
    label: impl Fn(&T) -> String,
    action: impl Fn(&T) -> CallbackAction,
) -> Keyboard {
    let mut builder = KeyboardBuilder::new();
    for item in items {
        builder = builder.button(label(item), action(item));
    }
    builder.button(CANCEL, CallbackAction::Cancel).adjust(&[1])
}

pub fn rarity_picker() -> Keyboard {
    let mut builder = KeyboardBuilder::new();
    for rarity in Rarity::ALL {
        builder = builder.button(rarity.as_str(), CallbackAction::SkinRarity(Some(rarity)));
    }
    builder
        .button("⏭️ Skip", CallbackAction::SkinRarity(None))
        .button(CANCEL, CallbackAction::Cancel)
        .adjust(&[2])
}

/// For free-text prompts: the only way out is Cancel.
pub fn cancel_only() -> Keyboard {
    KeyboardBuilder::new()
        .button(CANCEL, CallbackAction::Cancel)
        .adjust(&[1])
}

/// Yes/No choice with a Cancel underneath.
pub fn yes_no(yes: CallbackAction, no: CallbackAction) -> Keyboard {
    KeyboardBuilder::new()
        .button("✅ Yes", yes)
        .button("❌ No", no)
        .button(CANCEL, CallbackAction::Cancel)
        .adjust(&[2, 1])
}

/// Destructive-action confirmation; No returns to the admin menu.
pub fn confirm(yes: CallbackAction) -> Keyboard {
    KeyboardBuilder::new()
        .button("✅ Yes", yes)
        .button("❌ No", CallbackAction::AdminMenu)
        .adjust(&[2])
}

pub fn case_field_picker(case_id: i64) -> Keyboard {
    KeyboardBuilder::new()
        .button("✏️ Name", CallbackAction::EditCaseName(case_id))
        .button("🖼️ Image URL", CallbackAction::EditCaseImage(case_id))
        .button(CANCEL, CallbackAction::Cancel)
        .adjust(&[2, 1])
}

pub fn skin_field_picker(skin_id: i64) -> Keyboard {
    let mut builder = KeyboardBuilder::new();
    for field in [
        SkinField::Name,
        SkinField::Rarity,
        SkinField::StatTrak,
        SkinField::Souvenir,
        SkinField::ImageUrl,
    ] {
        builder = builder.button(field.display_name(), CallbackAction::EditSkinField(skin_id, field));
    }
    builder.button(CANCEL, CallbackAction::Cancel).adjust(&[2, 2, 1, 1])
}

pub fn wear_type_picker(skin_id: i64) -> Keyboard {
    let mut builder = KeyboardBuilder::new();
    for wear in WearLabel::ALL {
        builder = builder.button(wear.as_str(), CallbackAction::WearType(skin_id, wear));
    }
    builder.button(CANCEL, CallbackAction::Cancel).adjust(&[1])
}

/// Offered right after a skin commit: extend it with a wear variant or
/// go back to skin management.
pub fn after_skin_created(skin_id: i64) -> Keyboard {
    KeyboardBuilder::new()
        .button("📏 Add wear variant", CallbackAction::AddWearSkin(skin_id))
        .button("⬅️ Skin management", CallbackAction::AdminSkins)
        .adjust(&[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(keyboard: &Keyboard) -> Vec<usize> {
        keyboard.rows.iter().map(Vec::len).collect()
    }

    #[test]
    fn adjust_repeats_last_width() {
        let kb = KeyboardBuilder::new()
            .button("a", CallbackAction::MainMenu)
            .button("b", CallbackAction::MainMenu)
            .button("c", CallbackAction::MainMenu)
            .button("d", CallbackAction::MainMenu)
            .button("e", CallbackAction::MainMenu)
            .adjust(&[2]);
        assert_eq!(widths(&kb), vec![2, 2, 1]);
    }

    #[test]
    fn menu_layouts() {
        assert_eq!(widths(&main_menu()), vec![2, 2]);
        assert_eq!(widths(&admin_menu()), vec![2, 2, 1]);
        assert_eq!(widths(&admin_cases_menu()), vec![2, 2]);
        assert_eq!(widths(&admin_skins_menu()), vec![2, 2, 1]);
        assert_eq!(widths(&admin_caseskins_menu()), vec![1, 1, 1]);
    }

    #[test]
    fn rarity_picker_has_all_grades_plus_skip_and_cancel() {
        let kb = rarity_picker();
        let flat: Vec<&Button> = kb.rows.iter().flatten().collect();
        assert_eq!(flat.len(), 12);
        assert_eq!(flat[10].callback_data, "skin_rarity_skip");
        assert_eq!(flat[11].callback_data, "cancel_action");
        assert_eq!(widths(&kb), vec![2; 6]);
    }

    #[test]
    fn selection_list_ends_with_cancel() {
        let cases = vec![Case {
            id: 4,
            name: "Recoil Case".to_string(),
            image_url: None,
        }];
        let kb = selection_list(&cases, |c| c.name.clone(), |c| CallbackAction::EditCase(c.id));
        assert_eq!(widths(&kb), vec![1, 1]);
        assert_eq!(kb.rows[0][0].callback_data, "edit_case_4");
        assert_eq!(kb.rows[1][0].callback_data, "cancel_action");
    }

    #[test]
    fn wear_picker_payloads_carry_skin_and_label() {
        let kb = wear_type_picker(5);
        assert_eq!(kb.rows[0][0].callback_data, "wear_type_5_Factory New");
        assert_eq!(kb.rows[4][0].callback_data, "wear_type_5_Battle-Scarred");
    }
}
