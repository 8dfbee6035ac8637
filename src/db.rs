//! Catalog store
//!
//! Typed accessors over the five-entity catalog schema. Each method is
//! one logical store operation: a single parametrized statement (or a
//! read plus an in-process sort), executed against a pooled SQLite
//! connection. Cascade rules live in the schema, not here.

mod schema;

pub use schema::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Fields for a new skin row, accumulated by the add-skin flow.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSkin {
    pub name: String,
    pub weapon_id: i64,
    pub rarity: Option<String>,
    pub stattrak: bool,
    pub souvenir: bool,
    pub image_url: Option<String>,
}

/// Pooled database handle. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the catalog database at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open an in-memory database (for testing). A single connection
    /// that never idles out, so the database outlives pool churn.
    pub async fn open_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> DbResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    // ==================== Weapons ====================

    pub async fn list_weapons(&self) -> DbResult<Vec<Weapon>> {
        let rows = sqlx::query("SELECT weapon_id, weapon_name FROM weapons ORDER BY weapon_name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(weapon_from_row).collect()
    }

    pub async fn get_weapon(&self, weapon_id: i64) -> DbResult<Option<Weapon>> {
        let row = sqlx::query("SELECT weapon_id, weapon_name FROM weapons WHERE weapon_id = ?1")
            .bind(weapon_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(weapon_from_row).transpose()
    }

    pub async fn create_weapon(&self, name: &str) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO weapons (weapon_name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, format!("a weapon named '{name}' already exists")))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_weapon_name(&self, weapon_id: i64, name: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE weapons SET weapon_name = ?1 WHERE weapon_id = ?2")
            .bind(name)
            .bind(weapon_id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, format!("a weapon named '{name}' already exists")))?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("weapon"));
        }
        Ok(())
    }

    /// Deletes the weapon; its skins, their wear variants and case
    /// links go with it via cascade.
    pub async fn delete_weapon(&self, weapon_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM weapons WHERE weapon_id = ?1")
            .bind(weapon_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("weapon"));
        }
        Ok(())
    }

    // ==================== Cases ====================

    pub async fn list_cases(&self) -> DbResult<Vec<Case>> {
        let rows = sqlx::query("SELECT case_id, case_name, image_case FROM cases ORDER BY case_name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(case_from_row).collect()
    }

    pub async fn get_case(&self, case_id: i64) -> DbResult<Option<Case>> {
        let row = sqlx::query("SELECT case_id, case_name, image_case FROM cases WHERE case_id = ?1")
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(case_from_row).transpose()
    }

    pub async fn create_case(&self, name: &str, image_url: Option<&str>) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO cases (case_name, image_case) VALUES (?1, ?2)")
            .bind(name)
            .bind(image_url)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, format!("a case named '{name}' already exists")))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_case(&self, case_id: i64, update: CaseUpdate) -> DbResult<()> {
        let result = match update {
            CaseUpdate::Name(name) => {
                sqlx::query("UPDATE cases SET case_name = ?1 WHERE case_id = ?2")
                    .bind(&name)
                    .bind(case_id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        conflict_on_unique(e, format!("a case named '{name}' already exists"))
                    })?
            }
            CaseUpdate::ImageUrl(url) => {
                sqlx::query("UPDATE cases SET image_case = ?1 WHERE case_id = ?2")
                    .bind(url)
                    .bind(case_id)
                    .execute(&self.pool)
                    .await?
            }
        };
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("case"));
        }
        Ok(())
    }

    /// Deletes the case; only its `caseskins` rows cascade.
    pub async fn delete_case(&self, case_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cases WHERE case_id = ?1")
            .bind(case_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("case"));
        }
        Ok(())
    }

    // ==================== Skins ====================

    pub async fn get_skin(&self, skin_id: i64) -> DbResult<Option<Skin>> {
        let row = sqlx::query(
            "SELECT s.skin_id, s.skin_name, s.rarity, s.stattrak, s.souvenir, s.image_skin,
                    s.weapon_id, w.weapon_name
             FROM skins s
             JOIN weapons w ON s.weapon_id = w.weapon_id
             WHERE s.skin_id = ?1",
        )
        .bind(skin_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(skin_from_row).transpose()
    }

    /// Skins of one weapon, rarest first, then by name.
    pub async fn list_skins_by_weapon(&self, weapon_id: i64) -> DbResult<Vec<Skin>> {
        let rows = sqlx::query(
            "SELECT s.skin_id, s.skin_name, s.rarity, s.stattrak, s.souvenir, s.image_skin,
                    s.weapon_id, w.weapon_name
             FROM skins s
             JOIN weapons w ON s.weapon_id = w.weapon_id
             WHERE s.weapon_id = ?1
             ORDER BY s.skin_name",
        )
        .bind(weapon_id)
        .fetch_all(&self.pool)
        .await?;
        let mut skins: Vec<Skin> = rows.iter().map(skin_from_row).collect::<DbResult<_>>()?;
        sort_by_severity_desc(&mut skins);
        Ok(skins)
    }

    /// Every skin with its weapon name, ordered by weapon then name.
    /// Rarity grouping is the renderer's concern.
    pub async fn list_all_skins(&self) -> DbResult<Vec<Skin>> {
        let rows = sqlx::query(
            "SELECT s.skin_id, s.skin_name, s.rarity, s.stattrak, s.souvenir, s.image_skin,
                    s.weapon_id, w.weapon_name
             FROM skins s
             JOIN weapons w ON s.weapon_id = w.weapon_id
             ORDER BY w.weapon_name, s.skin_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(skin_from_row).collect()
    }

    /// Skins linked to a case, rarest first, then weapon/skin name.
    pub async fn list_skins_for_case(&self, case_id: i64) -> DbResult<Vec<Skin>> {
        let rows = sqlx::query(
            "SELECT s.skin_id, s.skin_name, s.rarity, s.stattrak, s.souvenir, s.image_skin,
                    s.weapon_id, w.weapon_name
             FROM skins s
             JOIN weapons w ON s.weapon_id = w.weapon_id
             JOIN caseskins cs ON s.skin_id = cs.skin_id
             WHERE cs.case_id = ?1
             ORDER BY w.weapon_name, s.skin_name",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        let mut skins: Vec<Skin> = rows.iter().map(skin_from_row).collect::<DbResult<_>>()?;
        sort_by_severity_desc(&mut skins);
        Ok(skins)
    }

    /// Skins not yet linked to a case (candidates for linking).
    pub async fn list_skins_not_in_case(&self, case_id: i64) -> DbResult<Vec<Skin>> {
        let rows = sqlx::query(
            "SELECT s.skin_id, s.skin_name, s.rarity, s.stattrak, s.souvenir, s.image_skin,
                    s.weapon_id, w.weapon_name
             FROM skins s
             JOIN weapons w ON s.weapon_id = w.weapon_id
             WHERE s.skin_id NOT IN (SELECT skin_id FROM caseskins WHERE case_id = ?1)
             ORDER BY w.weapon_name, s.skin_name",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(skin_from_row).collect()
    }

    pub async fn create_skin(&self, skin: &NewSkin) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO skins (skin_name, weapon_id, rarity, stattrak, souvenir, image_skin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&skin.name)
        .bind(skin.weapon_id)
        .bind(&skin.rarity)
        .bind(skin.stattrak)
        .bind(skin.souvenir)
        .bind(&skin.image_url)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_skin(&self, skin_id: i64, update: SkinUpdate) -> DbResult<()> {
        let result = match update {
            SkinUpdate::Name(name) => {
                sqlx::query("UPDATE skins SET skin_name = ?1 WHERE skin_id = ?2")
                    .bind(name)
                    .bind(skin_id)
                    .execute(&self.pool)
                    .await?
            }
            SkinUpdate::Rarity(rarity) => {
                sqlx::query("UPDATE skins SET rarity = ?1 WHERE skin_id = ?2")
                    .bind(rarity)
                    .bind(skin_id)
                    .execute(&self.pool)
                    .await?
            }
            SkinUpdate::StatTrak(value) => {
                sqlx::query("UPDATE skins SET stattrak = ?1 WHERE skin_id = ?2")
                    .bind(value)
                    .bind(skin_id)
                    .execute(&self.pool)
                    .await?
            }
            SkinUpdate::Souvenir(value) => {
                sqlx::query("UPDATE skins SET souvenir = ?1 WHERE skin_id = ?2")
                    .bind(value)
                    .bind(skin_id)
                    .execute(&self.pool)
                    .await?
            }
            SkinUpdate::ImageUrl(url) => {
                sqlx::query("UPDATE skins SET image_skin = ?1 WHERE skin_id = ?2")
                    .bind(url)
                    .bind(skin_id)
                    .execute(&self.pool)
                    .await?
            }
        };
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("skin"));
        }
        Ok(())
    }

    /// Deletes the skin; wear variants and case links cascade.
    pub async fn delete_skin(&self, skin_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM skins WHERE skin_id = ?1")
            .bind(skin_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("skin"));
        }
        Ok(())
    }

    /// Case-insensitive substring search on skin name, scoped to one
    /// weapon, ordered by name.
    pub async fn search_skins(&self, weapon_id: i64, query: &str) -> DbResult<Vec<Skin>> {
        let pattern = format!("%{}%", query.to_lowercase());
        let rows = sqlx::query(
            "SELECT s.skin_id, s.skin_name, s.rarity, s.stattrak, s.souvenir, s.image_skin,
                    s.weapon_id, w.weapon_name
             FROM skins s
             JOIN weapons w ON s.weapon_id = w.weapon_id
             WHERE s.weapon_id = ?1 AND LOWER(s.skin_name) LIKE ?2
             ORDER BY s.skin_name",
        )
        .bind(weapon_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(skin_from_row).collect()
    }

    // ==================== Wear variants ====================

    pub async fn list_wear_variants(&self, skin_id: i64) -> DbResult<Vec<WearVariant>> {
        let rows = sqlx::query(
            "SELECT skinwear_id, skin_id, weartype, floatmin, floatmax
             FROM skinwear
             WHERE skin_id = ?1
             ORDER BY weartype",
        )
        .bind(skin_id)
        .fetch_all(&self.pool)
        .await?;
        let mut wears: Vec<WearVariant> = rows.iter().map(wear_from_row).collect::<DbResult<_>>()?;
        wears.sort_by_key(|w| wear_rank(&w.label));
        Ok(wears)
    }

    pub async fn create_wear_variant(
        &self,
        skin_id: i64,
        label: WearLabel,
        float_min: f64,
        float_max: f64,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO skinwear (skin_id, weartype, floatmin, floatmax) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(skin_id)
        .bind(label.as_str())
        .bind(float_min)
        .bind(float_max)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    // ==================== Case-skin links ====================

    pub async fn add_skin_to_case(
        &self,
        case_id: i64,
        skin_id: i64,
    ) -> DbResult<AssociationOutcome> {
        let result = sqlx::query("INSERT INTO caseskins (case_id, skin_id) VALUES (?1, ?2)")
            .bind(case_id)
            .bind(skin_id)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(AssociationOutcome::Added),
            Err(e) if is_unique_violation(&e) => Ok(AssociationOutcome::AlreadyPresent),
            Err(e) => Err(e.into()),
        }
    }

    /// Idempotent: removing a link that does not exist is a no-op.
    pub async fn remove_skin_from_case(&self, case_id: i64, skin_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM caseskins WHERE case_id = ?1 AND skin_id = ?2")
            .bind(case_id)
            .bind(skin_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_cases_for_skin(&self, skin_id: i64) -> DbResult<Vec<Case>> {
        let rows = sqlx::query(
            "SELECT c.case_id, c.case_name, c.image_case
             FROM cases c
             JOIN caseskins cs ON c.case_id = cs.case_id
             WHERE cs.skin_id = ?1
             ORDER BY c.case_name",
        )
        .bind(skin_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(case_from_row).collect()
    }
}

// Row mapping

fn weapon_from_row(row: &SqliteRow) -> DbResult<Weapon> {
    Ok(Weapon {
        id: row.try_get("weapon_id")?,
        name: row.try_get("weapon_name")?,
    })
}

fn case_from_row(row: &SqliteRow) -> DbResult<Case> {
    Ok(Case {
        id: row.try_get("case_id")?,
        name: row.try_get("case_name")?,
        image_url: row.try_get("image_case")?,
    })
}

fn skin_from_row(row: &SqliteRow) -> DbResult<Skin> {
    Ok(Skin {
        id: row.try_get("skin_id")?,
        name: row.try_get("skin_name")?,
        rarity: row.try_get("rarity")?,
        stattrak: row.try_get("stattrak")?,
        souvenir: row.try_get("souvenir")?,
        image_url: row.try_get("image_skin")?,
        weapon_id: row.try_get("weapon_id")?,
        weapon_name: row.try_get("weapon_name")?,
    })
}

fn wear_from_row(row: &SqliteRow) -> DbResult<WearVariant> {
    Ok(WearVariant {
        id: row.try_get("skinwear_id")?,
        skin_id: row.try_get("skin_id")?,
        label: row.try_get("weartype")?,
        float_min: row.try_get("floatmin")?,
        float_max: row.try_get("floatmax")?,
    })
}

/// Stable sort, so the SQL name ordering survives within one grade.
fn sort_by_severity_desc(skins: &mut [Skin]) {
    skins.sort_by_key(|s| std::cmp::Reverse(rarity_severity(s.rarity.as_deref())));
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db)
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}

fn conflict_on_unique(e: sqlx::Error, message: String) -> DbError {
    if is_unique_violation(&e) {
        DbError::Conflict(message)
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let weapon_id = db.create_weapon("AK-47").await.unwrap();
        let skin_id = db
            .create_skin(&NewSkin {
                name: "Redline".to_string(),
                weapon_id,
                rarity: Some("Classified".to_string()),
                stattrak: true,
                souvenir: false,
                image_url: None,
            })
            .await
            .unwrap();
        let case_id = db.create_case("Huntsman Case", None).await.unwrap();
        (db, weapon_id, skin_id, case_id)
    }

    #[tokio::test]
    async fn create_and_get_case() {
        let db = Database::open_in_memory().await.unwrap();
        let id = db.create_case("Recoil Case", None).await.unwrap();
        let case = db.get_case(id).await.unwrap().unwrap();
        assert_eq!(case.name, "Recoil Case");
        assert_eq!(case.image_url, None);
    }

    #[tokio::test]
    async fn duplicate_case_name_is_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        db.create_case("Recoil Case", None).await.unwrap();
        let err = db.create_case("Recoil Case", None).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn wear_variant_round_trip() {
        let (db, _, skin_id, _) = seeded().await;
        db.create_wear_variant(skin_id, WearLabel::FactoryNew, 0.0, 0.07)
            .await
            .unwrap();
        db.create_wear_variant(skin_id, WearLabel::BattleScarred, 0.45, 1.0)
            .await
            .unwrap();
        let wears = db.list_wear_variants(skin_id).await.unwrap();
        assert_eq!(wears.len(), 2);
        // Canonical wear order, not insertion or lexical order.
        assert_eq!(wears[0].label, "Factory New");
        assert_eq!(wears[0].float_min, 0.0);
        assert_eq!(wears[0].float_max, 0.07);
        assert_eq!(wears[1].label, "Battle-Scarred");
    }

    #[tokio::test]
    async fn deleting_weapon_cascades_everything() {
        let (db, weapon_id, skin_id, case_id) = seeded().await;
        db.create_wear_variant(skin_id, WearLabel::FieldTested, 0.15, 0.38)
            .await
            .unwrap();
        db.add_skin_to_case(case_id, skin_id).await.unwrap();

        db.delete_weapon(weapon_id).await.unwrap();

        assert!(db.get_skin(skin_id).await.unwrap().is_none());
        assert!(db.list_wear_variants(skin_id).await.unwrap().is_empty());
        assert!(db.list_skins_for_case(case_id).await.unwrap().is_empty());
        // The case itself survives.
        assert!(db.get_case(case_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_case_keeps_skins() {
        let (db, _, skin_id, case_id) = seeded().await;
        db.add_skin_to_case(case_id, skin_id).await.unwrap();
        db.delete_case(case_id).await.unwrap();
        assert!(db.get_skin(skin_id).await.unwrap().is_some());
        assert!(db.list_cases_for_skin(skin_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_association_reports_already_present() {
        let (db, _, skin_id, case_id) = seeded().await;
        assert_eq!(
            db.add_skin_to_case(case_id, skin_id).await.unwrap(),
            AssociationOutcome::Added
        );
        assert_eq!(
            db.add_skin_to_case(case_id, skin_id).await.unwrap(),
            AssociationOutcome::AlreadyPresent
        );
        assert_eq!(db.list_skins_for_case(case_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_missing_association_is_noop() {
        let (db, _, skin_id, case_id) = seeded().await;
        db.remove_skin_from_case(case_id, skin_id).await.unwrap();
        db.add_skin_to_case(case_id, skin_id).await.unwrap();
        db.remove_skin_from_case(case_id, skin_id).await.unwrap();
        db.remove_skin_from_case(case_id, skin_id).await.unwrap();
        assert!(db.list_skins_for_case(case_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_scoped() {
        let (db, ak_id, _, _) = seeded().await;
        let awp_id = db.create_weapon("AWP").await.unwrap();
        for (name, weapon_id) in [
            ("Dragon Lore", awp_id),
            ("Fire Serpent", ak_id),
            ("Dragon Tattoo", ak_id),
        ] {
            db.create_skin(&NewSkin {
                name: name.to_string(),
                weapon_id,
                rarity: None,
                stattrak: false,
                souvenir: false,
                image_url: None,
            })
            .await
            .unwrap();
        }

        let hits = db.search_skins(ak_id, "DRAGON").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Dragon Tattoo");
        assert_eq!(hits[0].weapon_name, "AK-47");
    }

    #[tokio::test]
    async fn skins_sorted_by_severity_then_name() {
        let (db, weapon_id, _, _) = seeded().await;
        for (name, rarity) in [
            ("Safari Mesh", Some("Consumer Grade")),
            ("Fire Serpent", Some("Covert")),
            ("Blue Laminate", Some("Restricted")),
            ("Mystery", None),
        ] {
            db.create_skin(&NewSkin {
                name: name.to_string(),
                weapon_id,
                rarity: rarity.map(String::from),
                stattrak: false,
                souvenir: false,
                image_url: None,
            })
            .await
            .unwrap();
        }
        let skins = db.list_skins_by_weapon(weapon_id).await.unwrap();
        let names: Vec<&str> = skins.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Fire Serpent",  // Covert
                "Redline",       // Classified (seeded)
                "Blue Laminate", // Restricted
                "Safari Mesh",   // Consumer Grade
                "Mystery",       // no rarity sorts last
            ]
        );
    }

    #[tokio::test]
    async fn typed_updates_apply() {
        let (db, _, skin_id, case_id) = seeded().await;
        db.update_skin(skin_id, SkinUpdate::StatTrak(false))
            .await
            .unwrap();
        db.update_skin(skin_id, SkinUpdate::Name("Elite Build".to_string()))
            .await
            .unwrap();
        db.update_case(case_id, CaseUpdate::ImageUrl(Some("https://example.test/a.png".into())))
            .await
            .unwrap();

        let skin = db.get_skin(skin_id).await.unwrap().unwrap();
        assert!(!skin.stattrak);
        assert_eq!(skin.name, "Elite Build");
        let case = db.get_case(case_id).await.unwrap().unwrap();
        assert_eq!(case.image_url.as_deref(), Some("https://example.test/a.png"));
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db
            .update_skin(999, SkinUpdate::StatTrak(true))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound("skin")));
    }

    #[tokio::test]
    async fn not_in_case_listing_excludes_linked() {
        let (db, weapon_id, skin_id, case_id) = seeded().await;
        let other = db
            .create_skin(&NewSkin {
                name: "Vulcan".to_string(),
                weapon_id,
                rarity: Some("Covert".to_string()),
                stattrak: false,
                souvenir: false,
                image_url: None,
            })
            .await
            .unwrap();
        db.add_skin_to_case(case_id, skin_id).await.unwrap();

        let candidates = db.list_skins_not_in_case(case_id).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, other);
    }

    #[tokio::test]
    async fn open_on_disk_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let db = Database::open(&path).await.unwrap();
        db.create_weapon("Glock-18").await.unwrap();
        assert!(path.exists());
    }
}
