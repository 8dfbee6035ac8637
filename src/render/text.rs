//! Message text rendering
//!
//! Pure functions from catalog rows to display strings, plus the
//! 4096-character chunker the transport applies to every outbound
//! message.

use crate::db::{rarity_severity, Case, Skin, Weapon, WearVariant};

/// Telegram's hard limit on message length.
pub const MESSAGE_LIMIT: usize = 4096;

/// Split into chunks of at most `limit` characters. Chunk boundaries
/// are character boundaries (a byte split could land mid-codepoint);
/// concatenating the chunks reproduces the input exactly. Empty input
/// still yields one (empty) chunk so a reply is always sent.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0);
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    chunks.push(current);
    chunks
}

fn rarity_heading(rarity: Option<&str>) -> &str {
    rarity.unwrap_or("Unknown")
}

/// Name with the StatTrak™/Souvenir prefix the game uses.
fn skin_display(skin: &Skin) -> String {
    let mut out = String::new();
    if skin.stattrak {
        out.push_str("StatTrak™ ");
    }
    if skin.souvenir {
        out.push_str("Souvenir ");
    }
    out.push_str(&skin.label());
    out
}

/// Render a run of skins as rarity-grouped bullet lists. The caller
/// supplies the skins already ordered severity-descending; this only
/// detects the group boundaries.
fn rarity_groups(out: &mut String, skins: &[Skin]) {
    let mut current: Option<&str> = None;
    let mut first = true;
    for skin in skins {
        let heading = rarity_heading(skin.rarity.as_deref());
        if current != Some(heading) {
            if !first {
                out.push('\n');
            }
            out.push_str("🔹 ");
            out.push_str(heading);
            out.push_str(":\n");
            current = Some(heading);
            first = false;
        }
        out.push_str("• ");
        out.push_str(&skin_display(skin));
        out.push('\n');
    }
}

pub fn case_details(case: &Case, skins: &[Skin]) -> String {
    let mut out = format!("📦 Case: {}\n\n", case.name);
    if skins.is_empty() {
        out.push_str("This case has no skins yet.");
    } else {
        rarity_groups(&mut out, skins);
    }
    out
}

pub fn weapon_details(weapon: &Weapon, skins: &[Skin]) -> String {
    let mut out = format!("🔫 Weapon: {}\n\n", weapon.name);
    if skins.is_empty() {
        out.push_str("This weapon has no skins yet.");
    } else {
        rarity_groups(&mut out, skins);
    }
    out
}

/// The full catalog listing, grouped weapon → rarity. Input is ordered
/// by weapon name then skin name; each weapon's run is re-sorted by
/// severity here since that grouping is purely presentational.
pub fn all_skins(skins: &[Skin]) -> String {
    if skins.is_empty() {
        return "🎨 There are no skins in the catalog yet.".to_string();
    }
    let mut out = String::from("🎨 All skins:\n");
    let mut index = 0;
    while index < skins.len() {
        let weapon_name = &skins[index].weapon_name;
        let end = skins[index..]
            .iter()
            .position(|s| &s.weapon_name != weapon_name)
            .map_or(skins.len(), |offset| index + offset);
        let mut group: Vec<Skin> = skins[index..end].to_vec();
        group.sort_by_key(|s| std::cmp::Reverse(rarity_severity(s.rarity.as_deref())));

        out.push_str("\n🔫 ");
        out.push_str(weapon_name);
        out.push_str(":\n");
        rarity_groups(&mut out, &group);
        index = end;
    }
    out
}

/// One search hit with its wear variants and containing cases.
pub fn search_hit(skin: &Skin, wears: &[WearVariant], cases: &[Case]) -> String {
    let mut out = format!("🎨 Skin: {}\n", skin_display(skin));
    out.push_str("Rarity: ");
    out.push_str(rarity_heading(skin.rarity.as_deref()));
    out.push('\n');

    out.push('\n');
    if wears.is_empty() {
        out.push_str("No wear variants.");
    } else {
        out.push_str("Wear variants:");
        for wear in wears {
            out.push_str(&format!(
                "\n• {} (Float: {} - {})",
                wear.label, wear.float_min, wear.float_max
            ));
        }
    }

    out.push_str("\n\n");
    if cases.is_empty() {
        out.push_str("Not found in any case.");
    } else {
        out.push_str("Found in cases:");
        for case in cases {
            out.push_str("\n• ");
            out.push_str(&case.name);
        }
    }
    out
}

pub fn search_results(hits: &[(Skin, Vec<WearVariant>, Vec<Case>)]) -> String {
    hits.iter()
        .map(|(skin, wears, cases)| search_hit(skin, wears, cases))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin(name: &str, weapon: &str, rarity: Option<&str>) -> Skin {
        Skin {
            id: 1,
            name: name.to_string(),
            rarity: rarity.map(String::from),
            stattrak: false,
            souvenir: false,
            image_url: None,
            weapon_id: 1,
            weapon_name: weapon.to_string(),
        }
    }

    #[test]
    fn chunking_preserves_content() {
        let text = "abc".repeat(3000);
        let chunks = chunk_text(&text, MESSAGE_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_LIMIT));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunking_respects_char_boundaries() {
        // Multibyte characters must not be split.
        let text = "é".repeat(10);
        let chunks = chunk_text(&text, 3);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn empty_text_yields_one_chunk() {
        assert_eq!(chunk_text("", MESSAGE_LIMIT), vec![String::new()]);
    }

    #[test]
    fn case_details_groups_by_rarity() {
        let case = Case {
            id: 1,
            name: "Huntsman Case".to_string(),
            image_url: None,
        };
        let skins = vec![
            skin("Fire Serpent", "AK-47", Some("Covert")),
            skin("Redline", "AK-47", Some("Classified")),
            skin("Graphite", "AWP", Some("Classified")),
        ];
        let text = case_details(&case, &skins);
        assert_eq!(
            text,
            "📦 Case: Huntsman Case\n\n\
             🔹 Covert:\n• AK-47 | Fire Serpent\n\n\
             🔹 Classified:\n• AK-47 | Redline\n• AWP | Graphite\n"
        );
    }

    #[test]
    fn empty_case_has_placeholder() {
        let case = Case {
            id: 1,
            name: "Empty Case".to_string(),
            image_url: None,
        };
        assert!(case_details(&case, &[]).contains("no skins yet"));
    }

    #[test]
    fn all_skins_groups_weapon_then_rarity() {
        // Input ordered weapon then name, as the store returns it.
        let skins = vec![
            skin("Blue Laminate", "AK-47", Some("Restricted")),
            skin("Fire Serpent", "AK-47", Some("Covert")),
            skin("Dragon Lore", "AWP", Some("Covert")),
        ];
        let text = all_skins(&skins);
        let ak = text.find("🔫 AK-47:").unwrap();
        let awp = text.find("🔫 AWP:").unwrap();
        assert!(ak < awp);
        // Within AK-47, Covert precedes Restricted despite name order.
        let serpent = text.find("Fire Serpent").unwrap();
        let laminate = text.find("Blue Laminate").unwrap();
        assert!(serpent < laminate);
    }

    #[test]
    fn search_hit_includes_flags_wears_and_cases() {
        let mut s = skin("Redline", "AK-47", Some("Classified"));
        s.stattrak = true;
        let wears = vec![WearVariant {
            id: 1,
            skin_id: 1,
            label: "Field-Tested".to_string(),
            float_min: 0.15,
            float_max: 0.38,
        }];
        let cases = vec![Case {
            id: 1,
            name: "Phoenix Case".to_string(),
            image_url: None,
        }];
        let text = search_hit(&s, &wears, &cases);
        assert!(text.starts_with("🎨 Skin: StatTrak™ AK-47 | Redline\n"));
        assert!(text.contains("Rarity: Classified"));
        assert!(text.contains("• Field-Tested (Float: 0.15 - 0.38)"));
        assert!(text.contains("Found in cases:\n• Phoenix Case"));
    }

    #[test]
    fn search_hit_without_extras() {
        let s = skin("Mystery", "AK-47", None);
        let text = search_hit(&s, &[], &[]);
        assert!(text.contains("Rarity: Unknown"));
        assert!(text.contains("No wear variants."));
        assert!(text.contains("Not found in any case."));
    }
}
