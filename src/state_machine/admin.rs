//! Admin flow step handlers
//!
//! One method per button press or text step of the guided CRUD flows.
//! Access is already checked by the dispatcher; each handler here only
//! verifies that the press matches the flow the user is actually in
//! (anything else is a tap on a stale message) and advances or
//! commits.

use crate::db::{CaseUpdate, NewSkin, Rarity, SkinField, SkinUpdate, WearLabel};
use crate::db::{parse_bool_token, DbError};
use crate::render::keyboard;
use crate::state_machine::engine::{Engine, EngineResult, Outcome, UserRef};
use crate::state_machine::event::CallbackAction;
use crate::state_machine::state::{Flow, SkinDraft};
use crate::state_machine::validate;

const EMPTY_NAME: &str = "The name cannot be empty. Try again.";

impl Engine {
    // ==================== Sections ====================

    /// The case-management screen. Its header needs a store read; if
    /// that read fails the screen degrades to the plain admin menu
    /// instead of the generic failure.
    pub(crate) async fn admin_cases(&self, user_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        match self.db.list_cases().await {
            Ok(cases) => Ok(Outcome::reply(
                format!("📦 Case management ({} cases)", cases.len()),
                keyboard::admin_cases_menu(),
            )),
            Err(error) => {
                tracing::warn!(%error, "case section header failed, showing admin menu");
                Ok(self.show_admin_menu(user_id))
            }
        }
    }

    pub(crate) fn admin_weapons(&self, user_id: i64) -> Outcome {
        self.clear_flow(user_id);
        Outcome::reply("🔫 Weapon management", keyboard::admin_weapons_menu())
    }

    pub(crate) fn admin_skins(&self, user_id: i64) -> Outcome {
        self.clear_flow(user_id);
        Outcome::reply("🎨 Skin management", keyboard::admin_skins_menu())
    }

    pub(crate) fn admin_caseskins(&self, user_id: i64) -> Outcome {
        self.clear_flow(user_id);
        Outcome::reply("🔗 Case contents", keyboard::admin_caseskins_menu())
    }

    // ==================== Cases ====================

    pub(crate) fn start_add_case(&self, user_id: i64) -> Outcome {
        self.set_flow(user_id, Flow::AwaitingCaseName);
        Outcome::reply("Send the name of the new case.", keyboard::cancel_only())
    }

    pub(crate) async fn start_edit_case(&self, user_id: i64) -> EngineResult {
        let cases = self.db.list_cases().await?;
        if cases.is_empty() {
            return Ok(Outcome::reply(
                "There are no cases yet.",
                keyboard::admin_cases_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingCaseToEdit);
        Ok(Outcome::reply(
            "✏️ Choose a case to edit:",
            keyboard::selection_list(&cases, |c| c.name.clone(), |c| {
                CallbackAction::EditCase(c.id)
            }),
        ))
    }

    pub(crate) async fn pick_case_to_edit(&self, user_id: i64, case_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingCaseToEdit) {
            return Ok(self.stale(user_id));
        }
        let Some(case) = self.db.get_case(case_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply("Case not found.", keyboard::admin_cases_menu()));
        };
        self.set_flow(user_id, Flow::PickingCaseField { case_id });
        Ok(Outcome::reply(
            format!("What do you want to change in \"{}\"?", case.name),
            keyboard::case_field_picker(case_id),
        ))
    }

    pub(crate) fn pick_case_rename(&self, user_id: i64, case_id: i64) -> Outcome {
        match self.flow_of(user_id) {
            Some(Flow::PickingCaseField { case_id: expected }) if expected == case_id => {}
            _ => return self.stale(user_id),
        }
        self.set_flow(user_id, Flow::AwaitingCaseRename { case_id });
        Outcome::reply("Send the new case name.", keyboard::cancel_only())
    }

    pub(crate) fn pick_case_image(&self, user_id: i64, case_id: i64) -> Outcome {
        match self.flow_of(user_id) {
            Some(Flow::PickingCaseField { case_id: expected }) if expected == case_id => {}
            _ => return self.stale(user_id),
        }
        self.set_flow(user_id, Flow::AwaitingCaseImage { case_id });
        Outcome::reply(
            "Send the new image URL (or \"skip\" to clear it).",
            keyboard::cancel_only(),
        )
    }

    pub(crate) async fn start_delete_case(&self, user_id: i64) -> EngineResult {
        let cases = self.db.list_cases().await?;
        if cases.is_empty() {
            return Ok(Outcome::reply(
                "There are no cases yet.",
                keyboard::admin_cases_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingCaseToDelete);
        Ok(Outcome::reply(
            "🗑️ Choose a case to delete:",
            keyboard::selection_list(&cases, |c| c.name.clone(), |c| {
                CallbackAction::DeleteCase(c.id)
            }),
        ))
    }

    pub(crate) async fn pick_case_to_delete(&self, user_id: i64, case_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingCaseToDelete) {
            return Ok(self.stale(user_id));
        }
        let Some(case) = self.db.get_case(case_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply("Case not found.", keyboard::admin_cases_menu()));
        };
        self.set_flow(user_id, Flow::ConfirmingCaseDelete { case_id });
        Ok(Outcome::reply(
            format!(
                "⚠️ Delete case \"{}\"? Its skin links will be removed; the skins themselves stay.",
                case.name
            ),
            keyboard::confirm(CallbackAction::ConfirmDeleteCase(case_id)),
        ))
    }

    pub(crate) async fn confirm_delete_case(&self, user_id: i64, case_id: i64) -> EngineResult {
        match self.flow_of(user_id) {
            Some(Flow::ConfirmingCaseDelete { case_id: expected }) if expected == case_id => {}
            _ => return Ok(self.stale(user_id)),
        }
        self.clear_flow(user_id);
        match self.db.delete_case(case_id).await {
            Ok(()) => Ok(Outcome::reply("🗑️ Case deleted.", keyboard::admin_cases_menu())),
            Err(DbError::NotFound(_)) => Ok(Outcome::reply(
                "Case not found.",
                keyboard::admin_cases_menu(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    // ==================== Weapons ====================

    pub(crate) fn start_add_weapon(&self, user_id: i64) -> Outcome {
        self.set_flow(user_id, Flow::AwaitingWeaponName);
        Outcome::reply("Send the name of the new weapon.", keyboard::cancel_only())
    }

    pub(crate) async fn start_edit_weapon(&self, user_id: i64) -> EngineResult {
        let weapons = self.db.list_weapons().await?;
        if weapons.is_empty() {
            return Ok(Outcome::reply(
                "There are no weapons yet.",
                keyboard::admin_weapons_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingWeaponToEdit);
        Ok(Outcome::reply(
            "✏️ Choose a weapon to rename:",
            keyboard::selection_list(&weapons, |w| w.name.clone(), |w| {
                CallbackAction::EditWeapon(w.id)
            }),
        ))
    }

    pub(crate) async fn pick_weapon_to_edit(&self, user_id: i64, weapon_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingWeaponToEdit) {
            return Ok(self.stale(user_id));
        }
        let Some(weapon) = self.db.get_weapon(weapon_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                "Weapon not found.",
                keyboard::admin_weapons_menu(),
            ));
        };
        self.set_flow(user_id, Flow::AwaitingWeaponRename { weapon_id });
        Ok(Outcome::reply(
            format!("Send the new name for \"{}\".", weapon.name),
            keyboard::cancel_only(),
        ))
    }

    pub(crate) async fn start_delete_weapon(&self, user_id: i64) -> EngineResult {
        let weapons = self.db.list_weapons().await?;
        if weapons.is_empty() {
            return Ok(Outcome::reply(
                "There are no weapons yet.",
                keyboard::admin_weapons_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingWeaponToDelete);
        Ok(Outcome::reply(
            "🗑️ Choose a weapon to delete:",
            keyboard::selection_list(&weapons, |w| w.name.clone(), |w| {
                CallbackAction::DeleteWeapon(w.id)
            }),
        ))
    }

    pub(crate) async fn pick_weapon_to_delete(&self, user_id: i64, weapon_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingWeaponToDelete) {
            return Ok(self.stale(user_id));
        }
        let Some(weapon) = self.db.get_weapon(weapon_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                "Weapon not found.",
                keyboard::admin_weapons_menu(),
            ));
        };
        self.set_flow(user_id, Flow::ConfirmingWeaponDelete { weapon_id });
        Ok(Outcome::reply(
            format!(
                "⚠️ Delete weapon \"{}\"? All of its skins, their wear variants and case links will be deleted.",
                weapon.name
            ),
            keyboard::confirm(CallbackAction::ConfirmDeleteWeapon(weapon_id)),
        ))
    }

    pub(crate) async fn confirm_delete_weapon(&self, user_id: i64, weapon_id: i64) -> EngineResult {
        match self.flow_of(user_id) {
            Some(Flow::ConfirmingWeaponDelete { weapon_id: expected }) if expected == weapon_id => {}
            _ => return Ok(self.stale(user_id)),
        }
        self.clear_flow(user_id);
        match self.db.delete_weapon(weapon_id).await {
            Ok(()) => Ok(Outcome::reply(
                "🗑️ Weapon deleted.",
                keyboard::admin_weapons_menu(),
            )),
            Err(DbError::NotFound(_)) => Ok(Outcome::reply(
                "Weapon not found.",
                keyboard::admin_weapons_menu(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    // ==================== Skins: add ====================

    pub(crate) async fn start_add_skin(&self, user_id: i64) -> EngineResult {
        let weapons = self.db.list_weapons().await?;
        if weapons.is_empty() {
            return Ok(Outcome::reply(
                "Add a weapon first.",
                keyboard::admin_skins_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingSkinWeapon);
        Ok(Outcome::reply(
            "Choose the weapon for the new skin:",
            keyboard::selection_list(&weapons, |w| w.name.clone(), |w| {
                CallbackAction::AddSkinWeapon(w.id)
            }),
        ))
    }

    pub(crate) async fn pick_skin_weapon(&self, user_id: i64, weapon_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingSkinWeapon) {
            return Ok(self.stale(user_id));
        }
        let Some(weapon) = self.db.get_weapon(weapon_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                "Weapon not found.",
                keyboard::admin_skins_menu(),
            ));
        };
        self.set_flow(
            user_id,
            Flow::AwaitingSkinName {
                weapon_id: weapon.id,
                weapon_name: weapon.name.clone(),
            },
        );
        Ok(Outcome::reply(
            format!("Send the name of the new {} skin.", weapon.name),
            keyboard::cancel_only(),
        ))
    }

    pub(crate) fn pick_skin_rarity(&self, user_id: i64, rarity: Option<Rarity>) -> Outcome {
        let Some(Flow::PickingSkinRarity { draft }) = self.flow_of(user_id) else {
            return self.stale(user_id);
        };
        self.set_flow(
            user_id,
            Flow::PickingSkinStatTrak {
                draft,
                rarity: rarity.map(|r| r.as_str().to_string()),
            },
        );
        Outcome::reply(
            "Is this a StatTrak™ skin?",
            keyboard::yes_no(
                CallbackAction::SkinStatTrak(true),
                CallbackAction::SkinStatTrak(false),
            ),
        )
    }

    pub(crate) fn pick_skin_stattrak(&self, user_id: i64, value: bool) -> Outcome {
        let Some(Flow::PickingSkinStatTrak { draft, rarity }) = self.flow_of(user_id) else {
            return self.stale(user_id);
        };
        self.set_flow(
            user_id,
            Flow::PickingSkinSouvenir {
                draft,
                rarity,
                stattrak: value,
            },
        );
        Outcome::reply(
            "Is this a Souvenir skin?",
            keyboard::yes_no(
                CallbackAction::SkinSouvenir(true),
                CallbackAction::SkinSouvenir(false),
            ),
        )
    }

    pub(crate) fn pick_skin_souvenir(&self, user_id: i64, value: bool) -> Outcome {
        let Some(Flow::PickingSkinSouvenir { draft, rarity, stattrak }) = self.flow_of(user_id)
        else {
            return self.stale(user_id);
        };
        self.set_flow(
            user_id,
            Flow::AwaitingSkinImage {
                draft,
                rarity,
                stattrak,
                souvenir: value,
            },
        );
        Outcome::reply(
            "Send the image URL (or \"skip\").",
            keyboard::cancel_only(),
        )
    }

    // ==================== Skins: edit / delete ====================

    pub(crate) async fn start_edit_skin(&self, user_id: i64) -> EngineResult {
        let skins = self.db.list_all_skins().await?;
        if skins.is_empty() {
            return Ok(Outcome::reply(
                "There are no skins yet.",
                keyboard::admin_skins_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingSkinToEdit);
        Ok(Outcome::reply(
            "✏️ Choose a skin to edit:",
            keyboard::selection_list(&skins, |s| s.label(), |s| CallbackAction::EditSkin(s.id)),
        ))
    }

    pub(crate) async fn pick_skin_to_edit(&self, user_id: i64, skin_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingSkinToEdit) {
            return Ok(self.stale(user_id));
        }
        let Some(skin) = self.db.get_skin(skin_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply("Skin not found.", keyboard::admin_skins_menu()));
        };
        self.set_flow(user_id, Flow::PickingSkinField { skin_id });
        Ok(Outcome::reply(
            format!("What do you want to change in {}?", skin.label()),
            keyboard::skin_field_picker(skin_id),
        ))
    }

    pub(crate) fn pick_skin_field(&self, user_id: i64, skin_id: i64, field: SkinField) -> Outcome {
        match self.flow_of(user_id) {
            Some(Flow::PickingSkinField { skin_id: expected }) if expected == skin_id => {}
            _ => return self.stale(user_id),
        }
        if field.is_boolean() {
            self.set_flow(user_id, Flow::PickingSkinBool { skin_id, field });
            return Outcome::reply(
                format!("Set {} to:", field.display_name()),
                keyboard::yes_no(
                    CallbackAction::SetSkinBool(true),
                    CallbackAction::SetSkinBool(false),
                ),
            );
        }
        self.set_flow(user_id, Flow::AwaitingSkinValue { skin_id, field });
        let prompt = match field {
            SkinField::Name => "Send the new skin name.",
            SkinField::Rarity => "Send the new rarity.",
            SkinField::ImageUrl => "Send the new image URL (or \"skip\" to clear it).",
            SkinField::StatTrak | SkinField::Souvenir => unreachable!("boolean fields use buttons"),
        };
        Outcome::reply(prompt, keyboard::cancel_only())
    }

    pub(crate) async fn set_skin_bool(&self, user_id: i64, value: bool) -> EngineResult {
        let Some(Flow::PickingSkinBool { skin_id, field }) = self.flow_of(user_id) else {
            return Ok(self.stale(user_id));
        };
        self.clear_flow(user_id);
        self.apply_skin_bool(skin_id, field, value).await
    }

    async fn apply_skin_bool(&self, skin_id: i64, field: SkinField, value: bool) -> EngineResult {
        let update = match field {
            SkinField::StatTrak => SkinUpdate::StatTrak(value),
            SkinField::Souvenir => SkinUpdate::Souvenir(value),
            _ => unreachable!("only boolean fields reach the yes/no step"),
        };
        match self.db.update_skin(skin_id, update).await {
            Ok(()) => Ok(Outcome::reply(
                format!("✅ {} updated.", field.display_name()),
                keyboard::admin_skins_menu(),
            )),
            Err(DbError::NotFound(_)) => Ok(Outcome::reply(
                "Skin not found.",
                keyboard::admin_skins_menu(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) async fn start_delete_skin(&self, user_id: i64) -> EngineResult {
        let skins = self.db.list_all_skins().await?;
        if skins.is_empty() {
            return Ok(Outcome::reply(
                "There are no skins yet.",
                keyboard::admin_skins_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingSkinToDelete);
        Ok(Outcome::reply(
            "🗑️ Choose a skin to delete:",
            keyboard::selection_list(&skins, |s| s.label(), |s| CallbackAction::DeleteSkin(s.id)),
        ))
    }

    pub(crate) async fn pick_skin_to_delete(&self, user_id: i64, skin_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingSkinToDelete) {
            return Ok(self.stale(user_id));
        }
        let Some(skin) = self.db.get_skin(skin_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply("Skin not found.", keyboard::admin_skins_menu()));
        };
        self.set_flow(user_id, Flow::ConfirmingSkinDelete { skin_id });
        Ok(Outcome::reply(
            format!(
                "⚠️ Delete {}? Its wear variants and case links will be removed.",
                skin.label()
            ),
            keyboard::confirm(CallbackAction::ConfirmDeleteSkin(skin_id)),
        ))
    }

    pub(crate) async fn confirm_delete_skin(&self, user_id: i64, skin_id: i64) -> EngineResult {
        match self.flow_of(user_id) {
            Some(Flow::ConfirmingSkinDelete { skin_id: expected }) if expected == skin_id => {}
            _ => return Ok(self.stale(user_id)),
        }
        self.clear_flow(user_id);
        match self.db.delete_skin(skin_id).await {
            Ok(()) => Ok(Outcome::reply("🗑️ Skin deleted.", keyboard::admin_skins_menu())),
            Err(DbError::NotFound(_)) => Ok(Outcome::reply(
                "Skin not found.",
                keyboard::admin_skins_menu(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    // ==================== Wear variants ====================

    pub(crate) async fn start_add_wear(&self, user_id: i64) -> EngineResult {
        let skins = self.db.list_all_skins().await?;
        if skins.is_empty() {
            return Ok(Outcome::reply(
                "There are no skins yet.",
                keyboard::admin_skins_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingWearSkin);
        Ok(Outcome::reply(
            "📏 Choose the skin to add a wear variant to:",
            keyboard::selection_list(&skins, |s| s.label(), |s| {
                CallbackAction::AddWearSkin(s.id)
            }),
        ))
    }

    /// Entry point from both the picker and the "add wear variant"
    /// button offered right after a skin commit, which arrives with no
    /// flow at all. The skin is refetched either way.
    pub(crate) async fn pick_wear_skin(&self, user_id: i64, skin_id: i64) -> EngineResult {
        match self.flow_of(user_id) {
            Some(Flow::PickingWearSkin) | None => {}
            Some(_) => return Ok(self.stale(user_id)),
        }
        let Some(skin) = self.db.get_skin(skin_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply("Skin not found.", keyboard::admin_skins_menu()));
        };
        let skin_label = skin.label();
        self.set_flow(
            user_id,
            Flow::PickingWearLabel {
                skin_id,
                skin_label: skin_label.clone(),
            },
        );
        Ok(Outcome::reply(
            format!("Choose the wear type for {skin_label}:"),
            keyboard::wear_type_picker(skin_id),
        ))
    }

    pub(crate) fn pick_wear_label(&self, user_id: i64, skin_id: i64, wear: WearLabel) -> Outcome {
        let skin_label = match self.flow_of(user_id) {
            Some(Flow::PickingWearLabel { skin_id: expected, skin_label }) if expected == skin_id => {
                skin_label
            }
            _ => return self.stale(user_id),
        };
        self.set_flow(
            user_id,
            Flow::AwaitingFloatMin {
                skin_id,
                skin_label,
                wear,
            },
        );
        Outcome::reply(
            format!("Send the minimum float for {} (0 to 1).", wear.as_str()),
            keyboard::cancel_only(),
        )
    }

    // ==================== Case-skin links ====================

    pub(crate) async fn start_link(&self, user_id: i64) -> EngineResult {
        let cases = self.db.list_cases().await?;
        if cases.is_empty() {
            return Ok(Outcome::reply(
                "There are no cases yet.",
                keyboard::admin_caseskins_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingLinkCase);
        Ok(Outcome::reply(
            "➕ Choose a case:",
            keyboard::selection_list(&cases, |c| c.name.clone(), |c| {
                CallbackAction::AddCaseSkinCase(c.id)
            }),
        ))
    }

    pub(crate) async fn pick_link_case(&self, user_id: i64, case_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingLinkCase) {
            return Ok(self.stale(user_id));
        }
        let Some(case) = self.db.get_case(case_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                "Case not found.",
                keyboard::admin_caseskins_menu(),
            ));
        };
        let candidates = self.db.list_skins_not_in_case(case_id).await?;
        if candidates.is_empty() {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                format!("Every skin is already in \"{}\".", case.name),
                keyboard::admin_caseskins_menu(),
            ));
        }
        self.set_flow(
            user_id,
            Flow::PickingLinkSkin {
                case_id,
                case_name: case.name.clone(),
            },
        );
        Ok(Outcome::reply(
            format!("Choose a skin to add to \"{}\":", case.name),
            keyboard::selection_list(&candidates, |s| s.label(), |s| {
                CallbackAction::AddCaseSkinSkin(s.id)
            }),
        ))
    }

    pub(crate) async fn pick_link_skin(&self, user_id: i64, skin_id: i64) -> EngineResult {
        let Some(Flow::PickingLinkSkin { case_id, case_name }) = self.flow_of(user_id) else {
            return Ok(self.stale(user_id));
        };
        self.clear_flow(user_id);
        let Some(skin) = self.db.get_skin(skin_id).await? else {
            return Ok(Outcome::reply(
                "Skin not found.",
                keyboard::admin_caseskins_menu(),
            ));
        };
        let message = match self.db.add_skin_to_case(case_id, skin_id).await? {
            crate::db::AssociationOutcome::Added => {
                format!("✅ {} added to \"{case_name}\".", skin.label())
            }
            crate::db::AssociationOutcome::AlreadyPresent => {
                format!("ℹ️ {} is already in \"{case_name}\".", skin.label())
            }
        };
        Ok(Outcome::reply(message, keyboard::admin_caseskins_menu()))
    }

    pub(crate) async fn start_unlink(&self, user_id: i64) -> EngineResult {
        let cases = self.db.list_cases().await?;
        if cases.is_empty() {
            return Ok(Outcome::reply(
                "There are no cases yet.",
                keyboard::admin_caseskins_menu(),
            ));
        }
        self.set_flow(user_id, Flow::PickingUnlinkCase);
        Ok(Outcome::reply(
            "➖ Choose a case:",
            keyboard::selection_list(&cases, |c| c.name.clone(), |c| {
                CallbackAction::RemoveCaseSkinCase(c.id)
            }),
        ))
    }

    pub(crate) async fn pick_unlink_case(&self, user_id: i64, case_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingUnlinkCase) {
            return Ok(self.stale(user_id));
        }
        let Some(case) = self.db.get_case(case_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                "Case not found.",
                keyboard::admin_caseskins_menu(),
            ));
        };
        let linked = self.db.list_skins_for_case(case_id).await?;
        if linked.is_empty() {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                format!("\"{}\" has no skins.", case.name),
                keyboard::admin_caseskins_menu(),
            ));
        }
        self.set_flow(
            user_id,
            Flow::PickingUnlinkSkin {
                case_id,
                case_name: case.name.clone(),
            },
        );
        Ok(Outcome::reply(
            format!("Choose a skin to remove from \"{}\":", case.name),
            keyboard::selection_list(&linked, |s| s.label(), |s| {
                CallbackAction::RemoveCaseSkinSkin(s.id)
            }),
        ))
    }

    pub(crate) async fn pick_unlink_skin(&self, user_id: i64, skin_id: i64) -> EngineResult {
        let Some(Flow::PickingUnlinkSkin { case_id, case_name }) = self.flow_of(user_id) else {
            return Ok(self.stale(user_id));
        };
        let Some(skin) = self.db.get_skin(skin_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply(
                "Skin not found.",
                keyboard::admin_caseskins_menu(),
            ));
        };
        let skin_label = skin.label();
        self.set_flow(
            user_id,
            Flow::ConfirmingUnlink {
                case_id,
                case_name: case_name.clone(),
                skin_id,
                skin_label: skin_label.clone(),
            },
        );
        Ok(Outcome::reply(
            format!("Remove {skin_label} from \"{case_name}\"?"),
            keyboard::confirm(CallbackAction::ConfirmRemoveCaseSkin(case_id, skin_id)),
        ))
    }

    pub(crate) async fn confirm_unlink(
        &self,
        user_id: i64,
        case_id: i64,
        skin_id: i64,
    ) -> EngineResult {
        let (case_name, skin_label) = match self.flow_of(user_id) {
            Some(Flow::ConfirmingUnlink {
                case_id: c,
                case_name,
                skin_id: s,
                skin_label,
            }) if c == case_id && s == skin_id => (case_name, skin_label),
            _ => return Ok(self.stale(user_id)),
        };
        self.clear_flow(user_id);
        self.db.remove_skin_from_case(case_id, skin_id).await?;
        Ok(Outcome::reply(
            format!("🗑️ Removed {skin_label} from \"{case_name}\"."),
            keyboard::admin_caseskins_menu(),
        ))
    }

    // ==================== Text steps ====================

    /// Route free text to the flow that is waiting for it. Validation
    /// failures reply with a retry prompt and leave the flow where it
    /// was; only a successful step moves it forward.
    pub(crate) async fn advance_with_text(
        &self,
        user: &UserRef,
        flow: Flow,
        input: &str,
    ) -> EngineResult {
        match flow {
            Flow::AwaitingCaseName => self.commit_case_name(user.id, input).await,
            Flow::AwaitingCaseRename { case_id } => {
                self.commit_case_rename(user.id, case_id, input).await
            }
            Flow::AwaitingCaseImage { case_id } => {
                self.commit_case_image(user.id, case_id, input).await
            }
            Flow::AwaitingWeaponName => self.commit_weapon_name(user.id, input).await,
            Flow::AwaitingWeaponRename { weapon_id } => {
                self.commit_weapon_rename(user.id, weapon_id, input).await
            }
            Flow::AwaitingSkinName { weapon_id, weapon_name } => {
                Ok(self.accept_skin_name(user.id, weapon_id, weapon_name, input))
            }
            Flow::AwaitingSkinImage { draft, rarity, stattrak, souvenir } => {
                self.commit_new_skin(user.id, draft, rarity, stattrak, souvenir, input)
                    .await
            }
            Flow::AwaitingSkinValue { skin_id, field } => {
                self.commit_skin_value(user.id, skin_id, field, input).await
            }
            Flow::PickingSkinBool { skin_id, field } => {
                self.clear_flow(user.id);
                self.apply_skin_bool(skin_id, field, parse_bool_token(input)).await
            }
            Flow::AwaitingFloatMin { skin_id, skin_label, wear } => {
                Ok(self.accept_float_min(user.id, skin_id, skin_label, wear, input))
            }
            Flow::AwaitingFloatMax { skin_id, skin_label, wear, float_min } => {
                self.commit_wear_variant(user.id, skin_id, skin_label, wear, float_min, input)
                    .await
            }
            Flow::AwaitingSearchQuery { weapon_id, weapon_name } => {
                self.run_search(user.id, weapon_id, &weapon_name, input).await
            }
            other => {
                tracing::debug!(user_id = user.id, flow = ?other, "text at a non-text step");
                Ok(Outcome::none())
            }
        }
    }

    async fn commit_case_name(&self, user_id: i64, input: &str) -> EngineResult {
        let Some(name) = validate::clean_name(input) else {
            return Ok(Outcome::text(EMPTY_NAME));
        };
        match self.db.create_case(&name, None).await {
            Ok(_) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply(
                    format!("✅ Case \"{name}\" added."),
                    keyboard::admin_cases_menu(),
                ))
            }
            Err(DbError::Conflict(message)) => {
                Ok(Outcome::text(format!("⚠️ {message}. Send another name.")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit_case_rename(&self, user_id: i64, case_id: i64, input: &str) -> EngineResult {
        let Some(name) = validate::clean_name(input) else {
            return Ok(Outcome::text(EMPTY_NAME));
        };
        match self.db.update_case(case_id, CaseUpdate::Name(name.clone())).await {
            Ok(()) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply(
                    format!("✅ Case renamed to \"{name}\"."),
                    keyboard::admin_cases_menu(),
                ))
            }
            Err(DbError::Conflict(message)) => {
                Ok(Outcome::text(format!("⚠️ {message}. Send another name.")))
            }
            Err(DbError::NotFound(_)) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply("Case not found.", keyboard::admin_cases_menu()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit_case_image(&self, user_id: i64, case_id: i64, input: &str) -> EngineResult {
        let image = validate::optional_image(input);
        let cleared = image.is_none();
        match self.db.update_case(case_id, CaseUpdate::ImageUrl(image)).await {
            Ok(()) => {
                self.clear_flow(user_id);
                let message = if cleared {
                    "✅ Case image cleared."
                } else {
                    "✅ Case image updated."
                };
                Ok(Outcome::reply(message, keyboard::admin_cases_menu()))
            }
            Err(DbError::NotFound(_)) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply("Case not found.", keyboard::admin_cases_menu()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit_weapon_name(&self, user_id: i64, input: &str) -> EngineResult {
        let Some(name) = validate::clean_name(input) else {
            return Ok(Outcome::text(EMPTY_NAME));
        };
        match self.db.create_weapon(&name).await {
            Ok(_) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply(
                    format!("✅ Weapon \"{name}\" added."),
                    keyboard::admin_weapons_menu(),
                ))
            }
            Err(DbError::Conflict(message)) => {
                Ok(Outcome::text(format!("⚠️ {message}. Send another name.")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit_weapon_rename(&self, user_id: i64, weapon_id: i64, input: &str) -> EngineResult {
        let Some(name) = validate::clean_name(input) else {
            return Ok(Outcome::text(EMPTY_NAME));
        };
        match self.db.update_weapon_name(weapon_id, &name).await {
            Ok(()) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply(
                    format!("✅ Weapon renamed to \"{name}\"."),
                    keyboard::admin_weapons_menu(),
                ))
            }
            Err(DbError::Conflict(message)) => {
                Ok(Outcome::text(format!("⚠️ {message}. Send another name.")))
            }
            Err(DbError::NotFound(_)) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply(
                    "Weapon not found.",
                    keyboard::admin_weapons_menu(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn accept_skin_name(
        &self,
        user_id: i64,
        weapon_id: i64,
        weapon_name: String,
        input: &str,
    ) -> Outcome {
        let Some(name) = validate::clean_name(input) else {
            return Outcome::text(EMPTY_NAME);
        };
        let prompt = format!("Choose the rarity for {weapon_name} | {name}:");
        self.set_flow(
            user_id,
            Flow::PickingSkinRarity {
                draft: SkinDraft {
                    weapon_id,
                    weapon_name,
                    name,
                },
            },
        );
        Outcome::reply(prompt, keyboard::rarity_picker())
    }

    async fn commit_new_skin(
        &self,
        user_id: i64,
        draft: SkinDraft,
        rarity: Option<String>,
        stattrak: bool,
        souvenir: bool,
        input: &str,
    ) -> EngineResult {
        let skin = NewSkin {
            name: draft.name,
            weapon_id: draft.weapon_id,
            rarity,
            stattrak,
            souvenir,
            image_url: validate::optional_image(input),
        };
        let skin_id = self.db.create_skin(&skin).await?;
        self.clear_flow(user_id);
        Ok(Outcome::reply(
            format!("✅ Skin {} | {} added.", draft.weapon_name, skin.name),
            keyboard::after_skin_created(skin_id),
        ))
    }

    async fn commit_skin_value(
        &self,
        user_id: i64,
        skin_id: i64,
        field: SkinField,
        input: &str,
    ) -> EngineResult {
        let update = match field {
            SkinField::Name => {
                let Some(name) = validate::clean_name(input) else {
                    return Ok(Outcome::text(EMPTY_NAME));
                };
                SkinUpdate::Name(name)
            }
            SkinField::Rarity => {
                let Some(rarity) = validate::clean_name(input) else {
                    return Ok(Outcome::text("The rarity cannot be empty. Try again."));
                };
                SkinUpdate::Rarity(Some(rarity))
            }
            SkinField::ImageUrl => SkinUpdate::ImageUrl(validate::optional_image(input)),
            SkinField::StatTrak => SkinUpdate::StatTrak(parse_bool_token(input)),
            SkinField::Souvenir => SkinUpdate::Souvenir(parse_bool_token(input)),
        };
        match self.db.update_skin(skin_id, update).await {
            Ok(()) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply(
                    format!("✅ {} updated.", field.display_name()),
                    keyboard::admin_skins_menu(),
                ))
            }
            Err(DbError::NotFound(_)) => {
                self.clear_flow(user_id);
                Ok(Outcome::reply("Skin not found.", keyboard::admin_skins_menu()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn accept_float_min(
        &self,
        user_id: i64,
        skin_id: i64,
        skin_label: String,
        wear: WearLabel,
        input: &str,
    ) -> Outcome {
        match validate::parse_float_bound(input) {
            Ok(float_min) => {
                self.set_flow(
                    user_id,
                    Flow::AwaitingFloatMax {
                        skin_id,
                        skin_label,
                        wear,
                        float_min,
                    },
                );
                Outcome::reply("Send the maximum float (0 to 1).", keyboard::cancel_only())
            }
            Err(error) => Outcome::text(format!("⚠️ {error}")),
        }
    }

    async fn commit_wear_variant(
        &self,
        user_id: i64,
        skin_id: i64,
        skin_label: String,
        wear: WearLabel,
        float_min: f64,
        input: &str,
    ) -> EngineResult {
        let float_max = match validate::parse_float_max(input, float_min) {
            Ok(value) => value,
            Err(error) => return Ok(Outcome::text(format!("⚠️ {error}"))),
        };
        self.db
            .create_wear_variant(skin_id, wear, float_min, float_max)
            .await?;
        self.clear_flow(user_id);
        Ok(Outcome::reply(
            format!(
                "✅ {} added for {skin_label} (Float: {float_min} - {float_max}).",
                wear.as_str()
            ),
            keyboard::admin_skins_menu(),
        ))
    }
}
