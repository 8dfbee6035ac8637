//! Property tests for the pure pieces: payload encoding, chunking and
//! float validation.

use crate::db::{Rarity, SkinField, WearLabel};
use crate::render::text::chunk_text;
use crate::state_machine::event::CallbackAction;
use crate::state_machine::validate::{self, FloatInputError};
use proptest::prelude::*;

fn id_strategy() -> impl Strategy<Value = i64> {
    0..1_000_000i64
}

fn action_strategy() -> impl Strategy<Value = CallbackAction> {
    use CallbackAction as A;
    let bare = prop::sample::select(vec![
        A::MainMenu,
        A::AdminMenu,
        A::ViewCases,
        A::ViewWeapons,
        A::ViewSkins,
        A::SearchSkin,
        A::AdminCases,
        A::AdminWeapons,
        A::AdminSkins,
        A::AdminCaseSkins,
        A::AddCase,
        A::EditCaseMenu,
        A::DeleteCaseMenu,
        A::AddWeapon,
        A::EditWeaponMenu,
        A::DeleteWeaponMenu,
        A::AddSkin,
        A::EditSkinMenu,
        A::DeleteSkinMenu,
        A::AddWearMenu,
        A::AddCaseSkin,
        A::RemoveCaseSkin,
        A::Cancel,
    ]);
    let id_ctors: Vec<fn(i64) -> A> = vec![
        A::ShowCase,
        A::ShowWeapon,
        A::SearchWeapon,
        A::EditCase,
        A::EditCaseName,
        A::EditCaseImage,
        A::DeleteCase,
        A::ConfirmDeleteCase,
        A::EditWeapon,
        A::DeleteWeapon,
        A::ConfirmDeleteWeapon,
        A::AddSkinWeapon,
        A::EditSkin,
        A::DeleteSkin,
        A::ConfirmDeleteSkin,
        A::AddWearSkin,
        A::AddCaseSkinCase,
        A::AddCaseSkinSkin,
        A::RemoveCaseSkinCase,
        A::RemoveCaseSkinSkin,
    ];
    let with_id =
        (prop::sample::select(id_ctors), id_strategy()).prop_map(|(ctor, id)| ctor(id));
    let flag_ctors: Vec<fn(bool) -> A> = vec![A::SkinStatTrak, A::SkinSouvenir, A::SetSkinBool];
    let with_flag =
        (prop::sample::select(flag_ctors), any::<bool>()).prop_map(|(ctor, value)| ctor(value));
    let rarity = prop::option::of(prop::sample::select(Rarity::ALL.to_vec()))
        .prop_map(A::SkinRarity);
    let field = (
        id_strategy(),
        prop::sample::select(vec![
            SkinField::Name,
            SkinField::Rarity,
            SkinField::StatTrak,
            SkinField::Souvenir,
            SkinField::ImageUrl,
        ]),
    )
        .prop_map(|(id, f)| A::EditSkinField(id, f));
    let wear = (id_strategy(), prop::sample::select(WearLabel::ALL.to_vec()))
        .prop_map(|(id, w)| A::WearType(id, w));
    let pair =
        (id_strategy(), id_strategy()).prop_map(|(case, skin)| A::ConfirmRemoveCaseSkin(case, skin));
    prop_oneof![bare, with_id, with_flag, rarity, field, wear, pair]
}

proptest! {
    #[test]
    fn callback_payloads_round_trip(action in action_strategy()) {
        let encoded = action.encode();
        prop_assert_eq!(CallbackAction::parse(&encoded), Some(action));
    }

    #[test]
    fn chunks_reassemble_exactly(text in ".{0,400}", limit in 1usize..200) {
        let chunks = chunk_text(&text, limit);
        prop_assert!(chunks.iter().all(|c| c.chars().count() <= limit));
        prop_assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn unit_interval_floats_are_accepted(value in 0.0f64..=1.0) {
        prop_assert_eq!(validate::parse_float_bound(&value.to_string()), Ok(value));
    }

    #[test]
    fn floats_outside_unit_interval_are_rejected(value in 1.0f64..1e6) {
        let above = value + 1.0;
        prop_assert_eq!(
            validate::parse_float_bound(&above.to_string()),
            Err(FloatInputError::OutOfRange)
        );
        let below = -above;
        prop_assert_eq!(
            validate::parse_float_bound(&below.to_string()),
            Err(FloatInputError::OutOfRange)
        );
    }

    #[test]
    fn float_max_never_accepts_at_or_below_min(min in 0.0f64..1.0, max in 0.0f64..=1.0) {
        match validate::parse_float_max(&max.to_string(), min) {
            Ok(accepted) => prop_assert!(accepted > min),
            Err(FloatInputError::MaxNotAboveMin) => prop_assert!(max <= min),
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}
