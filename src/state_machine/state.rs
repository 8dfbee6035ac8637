//! Per-user conversation state
//!
//! A user is either idle (no entry in the session map) or inside
//! exactly one [`Flow`]. Each variant carries only what the flow has
//! accumulated so far, so a step handler never has to re-parse or
//! trust stringly-typed state.

use crate::db::{SkinField, WearLabel};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fields collected by the add-skin flow before the final commit.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinDraft {
    pub weapon_id: i64,
    pub weapon_name: String,
    pub name: String,
}

/// Active multi-step flow for one user.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    // Cases
    AwaitingCaseName,
    PickingCaseToEdit,
    PickingCaseField { case_id: i64 },
    AwaitingCaseRename { case_id: i64 },
    AwaitingCaseImage { case_id: i64 },
    PickingCaseToDelete,
    ConfirmingCaseDelete { case_id: i64 },

    // Weapons
    AwaitingWeaponName,
    PickingWeaponToEdit,
    AwaitingWeaponRename { weapon_id: i64 },
    PickingWeaponToDelete,
    ConfirmingWeaponDelete { weapon_id: i64 },

    // Skins: add
    PickingSkinWeapon,
    AwaitingSkinName { weapon_id: i64, weapon_name: String },
    PickingSkinRarity { draft: SkinDraft },
    PickingSkinStatTrak { draft: SkinDraft, rarity: Option<String> },
    PickingSkinSouvenir { draft: SkinDraft, rarity: Option<String>, stattrak: bool },
    AwaitingSkinImage { draft: SkinDraft, rarity: Option<String>, stattrak: bool, souvenir: bool },

    // Skins: edit / delete
    PickingSkinToEdit,
    PickingSkinField { skin_id: i64 },
    AwaitingSkinValue { skin_id: i64, field: SkinField },
    PickingSkinBool { skin_id: i64, field: SkinField },
    PickingSkinToDelete,
    ConfirmingSkinDelete { skin_id: i64 },

    // Wear variants
    PickingWearSkin,
    PickingWearLabel { skin_id: i64, skin_label: String },
    AwaitingFloatMin { skin_id: i64, skin_label: String, wear: WearLabel },
    AwaitingFloatMax { skin_id: i64, skin_label: String, wear: WearLabel, float_min: f64 },

    // Case-skin links
    PickingLinkCase,
    PickingLinkSkin { case_id: i64, case_name: String },
    PickingUnlinkCase,
    PickingUnlinkSkin { case_id: i64, case_name: String },
    ConfirmingUnlink { case_id: i64, case_name: String, skin_id: i64, skin_label: String },

    // Search (not admin-gated)
    PickingSearchWeapon,
    AwaitingSearchQuery { weapon_id: i64, weapon_name: String },
}

/// Which admin section a flow belongs to. Cancel routing and the
/// post-cancel menu are looked up by family, never per-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFamily {
    Cases,
    Weapons,
    Skins,
    CaseSkins,
    Search,
}

impl Flow {
    pub fn family(&self) -> FlowFamily {
        match self {
            Flow::AwaitingCaseName
            | Flow::PickingCaseToEdit
            | Flow::PickingCaseField { .. }
            | Flow::AwaitingCaseRename { .. }
            | Flow::AwaitingCaseImage { .. }
            | Flow::PickingCaseToDelete
            | Flow::ConfirmingCaseDelete { .. } => FlowFamily::Cases,

            Flow::AwaitingWeaponName
            | Flow::PickingWeaponToEdit
            | Flow::AwaitingWeaponRename { .. }
            | Flow::PickingWeaponToDelete
            | Flow::ConfirmingWeaponDelete { .. } => FlowFamily::Weapons,

            Flow::PickingSkinWeapon
            | Flow::AwaitingSkinName { .. }
            | Flow::PickingSkinRarity { .. }
            | Flow::PickingSkinStatTrak { .. }
            | Flow::PickingSkinSouvenir { .. }
            | Flow::AwaitingSkinImage { .. }
            | Flow::PickingSkinToEdit
            | Flow::PickingSkinField { .. }
            | Flow::AwaitingSkinValue { .. }
            | Flow::PickingSkinBool { .. }
            | Flow::PickingSkinToDelete
            | Flow::ConfirmingSkinDelete { .. }
            | Flow::PickingWearSkin
            | Flow::PickingWearLabel { .. }
            | Flow::AwaitingFloatMin { .. }
            | Flow::AwaitingFloatMax { .. } => FlowFamily::Skins,

            Flow::PickingLinkCase
            | Flow::PickingLinkSkin { .. }
            | Flow::PickingUnlinkCase
            | Flow::PickingUnlinkSkin { .. }
            | Flow::ConfirmingUnlink { .. } => FlowFamily::CaseSkins,

            Flow::PickingSearchWeapon | Flow::AwaitingSearchQuery { .. } => FlowFamily::Search,
        }
    }

    /// Whether the flow accepts free text. Text arriving at a pure
    /// picking/confirming flow is ignored rather than treated as
    /// input. The boolean edit step accepts both: its buttons and the
    /// truthy/falsy text tokens.
    pub fn expects_text(&self) -> bool {
        matches!(
            self,
            Flow::AwaitingCaseName
                | Flow::AwaitingCaseRename { .. }
                | Flow::AwaitingCaseImage { .. }
                | Flow::AwaitingWeaponName
                | Flow::AwaitingWeaponRename { .. }
                | Flow::AwaitingSkinName { .. }
                | Flow::AwaitingSkinImage { .. }
                | Flow::AwaitingSkinValue { .. }
                | Flow::PickingSkinBool { .. }
                | Flow::AwaitingFloatMin { .. }
                | Flow::AwaitingFloatMax { .. }
                | Flow::AwaitingSearchQuery { .. }
        )
    }

    /// Search is open to everyone; every other flow is admin-only and
    /// re-checked on each step.
    pub fn requires_admin(&self) -> bool {
        self.family() != FlowFamily::Search
    }
}

/// Shared per-user flow map. Entries are ephemeral: a restart drops
/// all in-progress conversations.
pub type SessionMap = Arc<Mutex<HashMap<i64, Flow>>>;

pub fn new_session_map() -> SessionMap {
    Arc::new(Mutex::new(HashMap::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_flows_are_not_admin_gated() {
        assert!(!Flow::PickingSearchWeapon.requires_admin());
        assert!(!Flow::AwaitingSearchQuery {
            weapon_id: 1,
            weapon_name: "AWP".to_string(),
        }
        .requires_admin());
        assert!(Flow::AwaitingCaseName.requires_admin());
    }

    #[test]
    fn text_expectation_matches_step_kind() {
        assert!(Flow::AwaitingCaseName.expects_text());
        assert!(Flow::AwaitingFloatMin {
            skin_id: 1,
            skin_label: "AK-47 | Redline".to_string(),
            wear: WearLabel::FactoryNew,
        }
        .expects_text());
        assert!(!Flow::PickingCaseToDelete.expects_text());
        assert!(!Flow::ConfirmingCaseDelete { case_id: 3 }.expects_text());
    }
}
