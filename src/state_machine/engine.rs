//! Engine: event dispatch and flow advancement
//!
//! The engine owns the session map and turns one inbound [`Event`]
//! into an [`Outcome`] of rendered replies, committing to the store
//! along the way. It is transport-free: the runtime decides how the
//! replies reach Telegram.
//!
//! Every event is handled inside an error boundary. A store failure
//! mid-flow logs, clears the user's state and degrades to a generic
//! failure message; it never leaves a half-advanced flow behind.

use crate::auth::AdminList;
use crate::db::{Database, DbError};
use crate::render::keyboard;
use crate::render::text;
use crate::render::Keyboard;
use crate::state_machine::event::{CallbackAction, Command, Event};
use crate::state_machine::state::{new_session_map, Flow, FlowFamily, SessionMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Db(#[from] DbError),
}

pub type EngineResult = Result<Outcome, EngineError>;

/// The user an event came from, as the transport saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

/// One outbound message: full text (the transport chunks it) and an
/// optional inline keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// Replies produced by one event. Usually one; empty means the event
/// was deliberately ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub replies: Vec<Reply>,
}

impl Outcome {
    pub fn reply(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            replies: vec![Reply {
                text: text.into(),
                keyboard: Some(keyboard),
            }],
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            replies: vec![Reply {
                text: text.into(),
                keyboard: None,
            }],
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

pub(crate) const UNSUPPORTED: &str = "This command is not supported.";
pub(crate) const DENIED_COMMAND: &str = "⛔ You do not have access to the admin panel.";
pub(crate) const DENIED_SECTION: &str =
    "⛔ You do not have permission to access this section.";
pub(crate) const GENERIC_FAILURE: &str = "⚠️ Something went wrong. Please try again.";
pub(crate) const STALE_ACTION: &str = "⚠️ That action is no longer active.";

pub struct Engine {
    pub(crate) db: Database,
    admins: AdminList,
    sessions: SessionMap,
}

impl Engine {
    pub fn new(db: Database, admins: AdminList) -> Self {
        Self {
            db,
            admins,
            sessions: new_session_map(),
        }
    }

    /// Handle one event. Infallible by contract: errors inside are the
    /// engine's to absorb, not the transport's.
    pub async fn handle(&self, user: &UserRef, event: Event) -> Outcome {
        match self.handle_inner(user, event).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(user_id = user.id, %error, "event handling failed");
                self.clear_flow(user.id);
                Outcome::reply(GENERIC_FAILURE, keyboard::main_menu())
            }
        }
    }

    async fn handle_inner(&self, user: &UserRef, event: Event) -> EngineResult {
        match event {
            Event::Command(command) => Ok(self.handle_command(user, command)),
            Event::Text(text) => self.handle_text(user, &text).await,
            Event::Callback(action) => self.handle_callback(user, action).await,
        }
    }

    fn handle_command(&self, user: &UserRef, command: Command) -> Outcome {
        self.clear_flow(user.id);
        match command {
            Command::Start => Outcome::reply(
                format!("👋 Hello, {}! What would you like to look at?", user.name),
                keyboard::main_menu(),
            ),
            Command::Admin => {
                if self.admins.is_admin(user.id) {
                    Outcome::reply("⚙️ Admin panel", keyboard::admin_menu())
                } else {
                    tracing::info!(user_id = user.id, "admin command denied");
                    Outcome::text(DENIED_COMMAND)
                }
            }
            Command::Other => Outcome::text(UNSUPPORTED),
        }
    }

    async fn handle_text(&self, user: &UserRef, input: &str) -> EngineResult {
        let Some(flow) = self.flow_of(user.id) else {
            return Ok(Outcome::text(UNSUPPORTED));
        };
        if !flow.expects_text() {
            tracing::debug!(user_id = user.id, ?flow, "ignoring text at a button step");
            return Ok(Outcome::none());
        }
        // Admin flows re-check the allow-list on every step, not just
        // at entry.
        if flow.requires_admin() && !self.admins.is_admin(user.id) {
            self.clear_flow(user.id);
            return Ok(Outcome::reply(DENIED_SECTION, keyboard::main_menu()));
        }
        self.advance_with_text(user, flow, input).await
    }

    async fn handle_callback(&self, user: &UserRef, action: CallbackAction) -> EngineResult {
        if action_requires_admin(action) && !self.admins.is_admin(user.id) {
            tracing::info!(user_id = user.id, ?action, "admin callback denied");
            self.clear_flow(user.id);
            return Ok(Outcome::reply(DENIED_SECTION, keyboard::main_menu()));
        }

        use CallbackAction as A;
        match action {
            // Navigation
            A::MainMenu => Ok(self.show_main_menu(user.id)),
            A::AdminMenu => Ok(self.show_admin_menu(user.id)),
            A::Cancel => Ok(self.cancel(user.id)),

            // Browsing
            A::ViewCases => self.view_cases(user.id).await,
            A::ViewWeapons => self.view_weapons(user.id).await,
            A::ViewSkins => self.view_all_skins(user.id).await,
            A::ShowCase(case_id) => self.show_case(user.id, case_id).await,
            A::ShowWeapon(weapon_id) => self.show_weapon(user.id, weapon_id).await,

            // Search
            A::SearchSkin => self.start_search(user.id).await,
            A::SearchWeapon(weapon_id) => self.pick_search_weapon(user.id, weapon_id).await,

            // Admin sections
            A::AdminCases => self.admin_cases(user.id).await,
            A::AdminWeapons => Ok(self.admin_weapons(user.id)),
            A::AdminSkins => Ok(self.admin_skins(user.id)),
            A::AdminCaseSkins => Ok(self.admin_caseskins(user.id)),

            // Cases
            A::AddCase => Ok(self.start_add_case(user.id)),
            A::EditCaseMenu => self.start_edit_case(user.id).await,
            A::EditCase(case_id) => self.pick_case_to_edit(user.id, case_id).await,
            A::EditCaseName(case_id) => Ok(self.pick_case_rename(user.id, case_id)),
            A::EditCaseImage(case_id) => Ok(self.pick_case_image(user.id, case_id)),
            A::DeleteCaseMenu => self.start_delete_case(user.id).await,
            A::DeleteCase(case_id) => self.pick_case_to_delete(user.id, case_id).await,
            A::ConfirmDeleteCase(case_id) => self.confirm_delete_case(user.id, case_id).await,

            // Weapons
            A::AddWeapon => Ok(self.start_add_weapon(user.id)),
            A::EditWeaponMenu => self.start_edit_weapon(user.id).await,
            A::EditWeapon(weapon_id) => self.pick_weapon_to_edit(user.id, weapon_id).await,
            A::DeleteWeaponMenu => self.start_delete_weapon(user.id).await,
            A::DeleteWeapon(weapon_id) => self.pick_weapon_to_delete(user.id, weapon_id).await,
            A::ConfirmDeleteWeapon(weapon_id) => {
                self.confirm_delete_weapon(user.id, weapon_id).await
            }

            // Skins
            A::AddSkin => self.start_add_skin(user.id).await,
            A::AddSkinWeapon(weapon_id) => self.pick_skin_weapon(user.id, weapon_id).await,
            A::SkinRarity(rarity) => Ok(self.pick_skin_rarity(user.id, rarity)),
            A::SkinStatTrak(value) => Ok(self.pick_skin_stattrak(user.id, value)),
            A::SkinSouvenir(value) => Ok(self.pick_skin_souvenir(user.id, value)),
            A::EditSkinMenu => self.start_edit_skin(user.id).await,
            A::EditSkin(skin_id) => self.pick_skin_to_edit(user.id, skin_id).await,
            A::EditSkinField(skin_id, field) => Ok(self.pick_skin_field(user.id, skin_id, field)),
            A::SetSkinBool(value) => self.set_skin_bool(user.id, value).await,
            A::DeleteSkinMenu => self.start_delete_skin(user.id).await,
            A::DeleteSkin(skin_id) => self.pick_skin_to_delete(user.id, skin_id).await,
            A::ConfirmDeleteSkin(skin_id) => self.confirm_delete_skin(user.id, skin_id).await,

            // Wear variants
            A::AddWearMenu => self.start_add_wear(user.id).await,
            A::AddWearSkin(skin_id) => self.pick_wear_skin(user.id, skin_id).await,
            A::WearType(skin_id, wear) => Ok(self.pick_wear_label(user.id, skin_id, wear)),

            // Case-skin links
            A::AddCaseSkin => self.start_link(user.id).await,
            A::AddCaseSkinCase(case_id) => self.pick_link_case(user.id, case_id).await,
            A::AddCaseSkinSkin(skin_id) => self.pick_link_skin(user.id, skin_id).await,
            A::RemoveCaseSkin => self.start_unlink(user.id).await,
            A::RemoveCaseSkinCase(case_id) => self.pick_unlink_case(user.id, case_id).await,
            A::RemoveCaseSkinSkin(skin_id) => self.pick_unlink_skin(user.id, skin_id).await,
            A::ConfirmRemoveCaseSkin(case_id, skin_id) => {
                self.confirm_unlink(user.id, case_id, skin_id).await
            }
        }
    }

    // ==================== Navigation ====================

    fn show_main_menu(&self, user_id: i64) -> Outcome {
        self.clear_flow(user_id);
        Outcome::reply("🏠 Main menu", keyboard::main_menu())
    }

    pub(crate) fn show_admin_menu(&self, user_id: i64) -> Outcome {
        self.clear_flow(user_id);
        Outcome::reply("⚙️ Admin panel", keyboard::admin_menu())
    }

    /// Cancel routes to the menu that encloses the active flow, looked
    /// up by family. No flow means there is nothing to cancel; go home.
    fn cancel(&self, user_id: i64) -> Outcome {
        let family = self.take_flow(user_id).map(|flow| flow.family());
        let (text, kb) = match family {
            Some(FlowFamily::Cases) => ("📦 Case management", keyboard::admin_cases_menu()),
            Some(FlowFamily::Weapons) => ("🔫 Weapon management", keyboard::admin_weapons_menu()),
            Some(FlowFamily::Skins) => ("🎨 Skin management", keyboard::admin_skins_menu()),
            Some(FlowFamily::CaseSkins) => ("🔗 Case contents", keyboard::admin_caseskins_menu()),
            Some(FlowFamily::Search) | None => ("🏠 Main menu", keyboard::main_menu()),
        };
        Outcome::reply(format!("❌ Cancelled.\n\n{text}"), kb)
    }

    // ==================== Browsing ====================

    async fn view_cases(&self, user_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        let cases = self.db.list_cases().await?;
        if cases.is_empty() {
            return Ok(Outcome::reply(
                "There are no cases yet.",
                keyboard::back_to_main(),
            ));
        }
        Ok(Outcome::reply("📦 Choose a case:", keyboard::case_list(&cases)))
    }

    async fn view_weapons(&self, user_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        let weapons = self.db.list_weapons().await?;
        if weapons.is_empty() {
            return Ok(Outcome::reply(
                "There are no weapons yet.",
                keyboard::back_to_main(),
            ));
        }
        Ok(Outcome::reply(
            "🔫 Choose a weapon:",
            keyboard::weapon_list(&weapons),
        ))
    }

    async fn view_all_skins(&self, user_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        let skins = self.db.list_all_skins().await?;
        Ok(Outcome::reply(text::all_skins(&skins), keyboard::back_to_main()))
    }

    async fn show_case(&self, user_id: i64, case_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        let Some(case) = self.db.get_case(case_id).await? else {
            return Ok(Outcome::reply("Case not found.", keyboard::back_to_main()));
        };
        let skins = self.db.list_skins_for_case(case_id).await?;
        Ok(Outcome::reply(
            text::case_details(&case, &skins),
            keyboard::back_to_main(),
        ))
    }

    async fn show_weapon(&self, user_id: i64, weapon_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        let Some(weapon) = self.db.get_weapon(weapon_id).await? else {
            return Ok(Outcome::reply("Weapon not found.", keyboard::back_to_main()));
        };
        let skins = self.db.list_skins_by_weapon(weapon_id).await?;
        Ok(Outcome::reply(
            text::weapon_details(&weapon, &skins),
            keyboard::back_to_main(),
        ))
    }

    // ==================== Search ====================

    async fn start_search(&self, user_id: i64) -> EngineResult {
        self.clear_flow(user_id);
        let weapons = self.db.list_weapons().await?;
        if weapons.is_empty() {
            return Ok(Outcome::reply(
                "There are no weapons yet.",
                keyboard::back_to_main(),
            ));
        }
        self.set_flow(user_id, Flow::PickingSearchWeapon);
        Ok(Outcome::reply(
            "🔎 Which weapon's skins are you looking for?",
            keyboard::selection_list(
                &weapons,
                |w| w.name.clone(),
                |w| CallbackAction::SearchWeapon(w.id),
            ),
        ))
    }

    async fn pick_search_weapon(&self, user_id: i64, weapon_id: i64) -> EngineResult {
        if self.flow_of(user_id) != Some(Flow::PickingSearchWeapon) {
            return Ok(self.stale(user_id));
        }
        let Some(weapon) = self.db.get_weapon(weapon_id).await? else {
            self.clear_flow(user_id);
            return Ok(Outcome::reply("Weapon not found.", keyboard::back_to_main()));
        };
        self.set_flow(
            user_id,
            Flow::AwaitingSearchQuery {
                weapon_id: weapon.id,
                weapon_name: weapon.name.clone(),
            },
        );
        Ok(Outcome::reply(
            format!("🔎 Send part of a {} skin name.", weapon.name),
            keyboard::cancel_only(),
        ))
    }

    pub(crate) async fn run_search(
        &self,
        user_id: i64,
        weapon_id: i64,
        weapon_name: &str,
        query: &str,
    ) -> EngineResult {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Outcome::text("Send a non-empty search text."));
        }
        self.clear_flow(user_id);
        let skins = self.db.search_skins(weapon_id, query).await?;
        if skins.is_empty() {
            return Ok(Outcome::reply(
                format!("Nothing found for \"{query}\" among {weapon_name} skins."),
                keyboard::back_to_main(),
            ));
        }
        let mut hits = Vec::with_capacity(skins.len());
        for skin in skins {
            let wears = self.db.list_wear_variants(skin.id).await?;
            let cases = self.db.list_cases_for_skin(skin.id).await?;
            hits.push((skin, wears, cases));
        }
        Ok(Outcome::reply(
            text::search_results(&hits),
            keyboard::back_to_main(),
        ))
    }

    // ==================== Session helpers ====================

    pub(crate) fn flow_of(&self, user_id: i64) -> Option<Flow> {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .get(&user_id)
            .cloned()
    }

    pub(crate) fn set_flow(&self, user_id: i64, flow: Flow) {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .insert(user_id, flow);
    }

    pub(crate) fn take_flow(&self, user_id: i64) -> Option<Flow> {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .remove(&user_id)
    }

    pub(crate) fn clear_flow(&self, user_id: i64) {
        self.take_flow(user_id);
    }

    /// A selection arrived for a flow the user is no longer in (state
    /// cleared, restart, or a tap on an old message).
    pub(crate) fn stale(&self, user_id: i64) -> Outcome {
        self.clear_flow(user_id);
        Outcome::reply(STALE_ACTION, keyboard::main_menu())
    }
}

/// Everything except plain browsing, search, navigation home and
/// cancel is admin-gated, `AdminMenu` included.
fn action_requires_admin(action: CallbackAction) -> bool {
    use CallbackAction as A;
    !matches!(
        action,
        A::MainMenu
            | A::ViewCases
            | A::ViewWeapons
            | A::ViewSkins
            | A::ShowCase(_)
            | A::ShowWeapon(_)
            | A::SearchSkin
            | A::SearchWeapon(_)
            | A::Cancel
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewSkin;

    pub(crate) const ADMIN: UserRef = UserRef {
        id: 1,
        name: String::new(),
    };

    pub(crate) async fn engine() -> Engine {
        let db = Database::open_in_memory().await.unwrap();
        Engine::new(db, AdminList::new([1]))
    }

    pub(crate) fn visitor() -> UserRef {
        UserRef {
            id: 99,
            name: "guest".to_string(),
        }
    }

    fn first_text(outcome: &Outcome) -> &str {
        &outcome.replies[0].text
    }

    #[tokio::test]
    async fn non_admin_command_is_denied_without_state() {
        let engine = engine().await;
        let user = visitor();
        let outcome = engine.handle(&user, Event::Command(Command::Admin)).await;
        assert_eq!(first_text(&outcome), DENIED_COMMAND);
        assert!(outcome.replies[0].keyboard.is_none());
        assert_eq!(engine.flow_of(user.id), None);
    }

    #[tokio::test]
    async fn non_admin_section_callback_is_denied() {
        let engine = engine().await;
        let user = visitor();
        let outcome = engine
            .handle(&user, Event::Callback(CallbackAction::AdminCases))
            .await;
        assert_eq!(first_text(&outcome), DENIED_SECTION);
        assert_eq!(engine.flow_of(user.id), None);
    }

    #[tokio::test]
    async fn text_without_flow_is_unsupported() {
        let engine = engine().await;
        let outcome = engine.handle(&ADMIN, Event::Text("hello".to_string())).await;
        assert_eq!(first_text(&outcome), UNSUPPORTED);
    }

    #[tokio::test]
    async fn text_at_button_step_is_ignored() {
        let engine = engine().await;
        engine.set_flow(ADMIN.id, Flow::PickingCaseToDelete);
        let outcome = engine.handle(&ADMIN, Event::Text("hello".to_string())).await;
        assert!(outcome.replies.is_empty());
        // The step survives the stray text.
        assert_eq!(engine.flow_of(ADMIN.id), Some(Flow::PickingCaseToDelete));
    }

    #[tokio::test]
    async fn menu_navigation_clears_flow() {
        let engine = engine().await;
        engine.set_flow(ADMIN.id, Flow::AwaitingCaseName);
        engine.handle(&ADMIN, Event::Callback(CallbackAction::MainMenu)).await;
        assert_eq!(engine.flow_of(ADMIN.id), None);
    }

    #[tokio::test]
    async fn cancel_routes_by_flow_family() {
        let engine = engine().await;

        engine.set_flow(ADMIN.id, Flow::AwaitingCaseName);
        let outcome = engine.handle(&ADMIN, Event::Callback(CallbackAction::Cancel)).await;
        assert!(first_text(&outcome).contains("Case management"));
        assert_eq!(engine.flow_of(ADMIN.id), None);

        engine.set_flow(ADMIN.id, Flow::PickingSearchWeapon);
        let outcome = engine.handle(&ADMIN, Event::Callback(CallbackAction::Cancel)).await;
        assert!(first_text(&outcome).contains("Main menu"));

        engine.set_flow(ADMIN.id, Flow::PickingLinkCase);
        let outcome = engine.handle(&ADMIN, Event::Callback(CallbackAction::Cancel)).await;
        assert!(first_text(&outcome).contains("Case contents"));
    }

    #[tokio::test]
    async fn stale_selection_resets() {
        let engine = engine().await;
        let outcome = engine
            .handle(&ADMIN, Event::Callback(CallbackAction::EditCase(5)))
            .await;
        assert_eq!(first_text(&outcome), STALE_ACTION);
        assert_eq!(engine.flow_of(ADMIN.id), None);
    }

    #[tokio::test]
    async fn search_end_to_end() {
        let engine = engine().await;
        let weapon_id = engine.db.create_weapon("AWP").await.unwrap();
        let skin_id = engine
            .db
            .create_skin(&NewSkin {
                name: "Dragon Lore".to_string(),
                weapon_id,
                rarity: Some("Covert".to_string()),
                stattrak: false,
                souvenir: false,
                image_url: None,
            })
            .await
            .unwrap();
        engine
            .db
            .create_wear_variant(skin_id, crate::db::WearLabel::FactoryNew, 0.0, 0.07)
            .await
            .unwrap();

        // Search is open to non-admins.
        let user = visitor();
        engine.handle(&user, Event::Callback(CallbackAction::SearchSkin)).await;
        assert_eq!(engine.flow_of(user.id), Some(Flow::PickingSearchWeapon));
        engine
            .handle(&user, Event::Callback(CallbackAction::SearchWeapon(weapon_id)))
            .await;
        let outcome = engine.handle(&user, Event::Text("dragon".to_string())).await;
        let body = first_text(&outcome);
        assert!(body.contains("AWP | Dragon Lore"));
        assert!(body.contains("Factory New (Float: 0 - 0.07)"));
        assert_eq!(engine.flow_of(user.id), None);
    }

    #[tokio::test]
    async fn search_with_no_hits_reports_it() {
        let engine = engine().await;
        let weapon_id = engine.db.create_weapon("AWP").await.unwrap();
        let user = visitor();
        engine.handle(&user, Event::Callback(CallbackAction::SearchSkin)).await;
        engine
            .handle(&user, Event::Callback(CallbackAction::SearchWeapon(weapon_id)))
            .await;
        let outcome = engine.handle(&user, Event::Text("unicorn".to_string())).await;
        assert!(first_text(&outcome).contains("Nothing found for \"unicorn\""));
    }

    #[tokio::test]
    async fn browsing_empty_catalog() {
        let engine = engine().await;
        let outcome = engine
            .handle(&visitor(), Event::Callback(CallbackAction::ViewCases))
            .await;
        assert_eq!(first_text(&outcome), "There are no cases yet.");
    }
}
