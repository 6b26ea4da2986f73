use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::models::{PetitionDetail, PetitionSummary};
use super::support_tiers::NewSupportTier;

/// Sort keys accepted by the petition listing. Cost and creation-date sorts
/// are tie-broken by petition id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetitionSort {
    AlphabeticalAsc,
    AlphabeticalDesc,
    CostAsc,
    CostDesc,
    #[default]
    CreatedAsc,
    CreatedDesc,
}

impl PetitionSort {
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "ALPHABETICAL_ASC" => Some(Self::AlphabeticalAsc),
            "ALPHABETICAL_DESC" => Some(Self::AlphabeticalDesc),
            "COST_ASC" => Some(Self::CostAsc),
            "COST_DESC" => Some(Self::CostDesc),
            "CREATED_ASC" => Some(Self::CreatedAsc),
            "CREATED_DESC" => Some(Self::CreatedDesc),
            _ => None,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            Self::AlphabeticalAsc => "ORDER BY p.title ASC",
            Self::AlphabeticalDesc => "ORDER BY p.title DESC",
            Self::CostAsc => "ORDER BY supporting_cost ASC, p.id ASC",
            Self::CostDesc => "ORDER BY supporting_cost DESC, p.id ASC",
            Self::CreatedAsc => "ORDER BY p.creation_date ASC, p.id ASC",
            Self::CreatedDesc => "ORDER BY p.creation_date DESC, p.id ASC",
        }
    }
}

/// Independently optional, conjunctive filters for the petition listing.
#[derive(Debug, Clone, Default)]
pub struct PetitionFilter {
    pub q: Option<String>,
    pub category_ids: Vec<i64>,
    pub supporting_cost: Option<i32>,
    pub owner_id: Option<i64>,
    pub supporter_id: Option<i64>,
    pub sort: PetitionSort,
}

/// Fetches the full filtered and sorted result set. Pagination is applied by
/// the caller over this set, so the reported total is the pre-pagination
/// match count.
pub async fn search(
    pool: &PgPool,
    filter: &PetitionFilter,
) -> Result<Vec<PetitionSummary>, sqlx::Error> {
    info!("Searching petitions with {:?}", filter);

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT p.id, p.title, p.category_id, p.owner_id, u.first_name, u.last_name, \
         p.creation_date, MIN(t.cost) AS supporting_cost, \
         (SELECT COUNT(*) FROM supporters s WHERE s.petition_id = p.id) AS number_of_supporters \
         FROM petitions p \
         JOIN users u ON u.id = p.owner_id \
         LEFT JOIN support_tiers t ON t.petition_id = p.id",
    );

    let mut has_where = false;
    let mut conjunct = |builder: &mut QueryBuilder<Postgres>| {
        builder.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
    };

    if let Some(q) = &filter.q {
        conjunct(&mut builder);
        let pattern = format!("%{}%", q);
        builder.push("(p.title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR p.description ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if !filter.category_ids.is_empty() {
        conjunct(&mut builder);
        builder.push("p.category_id = ANY(");
        builder.push_bind(filter.category_ids.clone());
        builder.push(")");
    }
    if let Some(owner_id) = filter.owner_id {
        conjunct(&mut builder);
        builder.push("p.owner_id = ");
        builder.push_bind(owner_id);
    }
    if let Some(supporter_id) = filter.supporter_id {
        conjunct(&mut builder);
        builder.push("EXISTS (SELECT 1 FROM supporters s WHERE s.petition_id = p.id AND s.user_id = ");
        builder.push_bind(supporter_id);
        builder.push(")");
    }

    builder.push(" GROUP BY p.id, u.id");

    if let Some(ceiling) = filter.supporting_cost {
        builder.push(" HAVING MIN(t.cost) <= ");
        builder.push_bind(ceiling);
    }

    builder.push(" ");
    builder.push(filter.sort.order_clause());

    builder.build_query_as::<PetitionSummary>().fetch_all(pool).await
}

pub async fn get_one(pool: &PgPool, id: i64) -> Result<Option<PetitionDetail>, sqlx::Error> {
    sqlx::query_as::<_, PetitionDetail>(
        "SELECT p.id, p.title, p.description, p.category_id, p.owner_id, \
         u.first_name, u.last_name, p.creation_date, p.image_filename \
         FROM petitions p JOIN users u ON u.id = p.owner_id \
         WHERE p.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Global title uniqueness check, optionally excluding a petition (for
/// partial updates that keep the current title).
pub async fn title_exists(
    pool: &PgPool,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM petitions WHERE title = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(title)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(found)
}

/// Inserts the petition and its initial tiers as one transaction, so a tier
/// insertion failure cannot leave a petition behind with fewer than one tier.
pub async fn create(
    pool: &PgPool,
    title: &str,
    description: &str,
    category_id: i64,
    owner_id: i64,
    tiers: &[NewSupportTier],
) -> Result<i64, sqlx::Error> {
    info!("Inserting petition '{}' with {} tiers", title, tiers.len());
    let mut tx = pool.begin().await?;

    let (petition_id,): (i64,) = sqlx::query_as(
        "INSERT INTO petitions (title, description, category_id, owner_id, creation_date) \
         VALUES ($1, $2, $3, $4, CURRENT_TIMESTAMP) RETURNING id",
    )
    .bind(title)
    .bind(description)
    .bind(category_id)
    .bind(owner_id)
    .fetch_one(&mut *tx)
    .await?;

    for tier in tiers {
        sqlx::query(
            "INSERT INTO support_tiers (petition_id, title, description, cost) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(petition_id)
        .bind(&tier.title)
        .bind(&tier.description)
        .bind(tier.cost)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(petition_id)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    title: &str,
    description: &str,
    category_id: i64,
) -> Result<(), sqlx::Error> {
    info!("Updating petition {}", id);
    sqlx::query("UPDATE petitions SET title = $1, description = $2, category_id = $3 WHERE id = $4")
        .bind(title)
        .bind(description)
        .bind(category_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    info!("Deleting petition {}", id);
    sqlx::query("DELETE FROM petitions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_image(pool: &PgPool, id: i64, filename: &str) -> Result<(), sqlx::Error> {
    info!("Saving image reference for petition {}", id);
    sqlx::query("UPDATE petitions SET image_filename = $1 WHERE id = $2")
        .bind(filename)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn clear_image(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    info!("Removing image reference for petition {}", id);
    sqlx::query("UPDATE petitions SET image_filename = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_params_map_to_known_keys() {
        assert_eq!(
            PetitionSort::from_param("ALPHABETICAL_ASC"),
            Some(PetitionSort::AlphabeticalAsc)
        );
        assert_eq!(PetitionSort::from_param("COST_DESC"), Some(PetitionSort::CostDesc));
        assert_eq!(PetitionSort::from_param("CREATED_ASC"), Some(PetitionSort::CreatedAsc));
        assert_eq!(PetitionSort::from_param("created_asc"), None);
        assert_eq!(PetitionSort::from_param(""), None);
    }

    #[test]
    fn default_sort_is_creation_date_ascending() {
        assert_eq!(PetitionSort::default(), PetitionSort::CreatedAsc);
    }

    #[test]
    fn cost_and_date_sorts_tie_break_by_id() {
        assert!(PetitionSort::CostAsc.order_clause().ends_with("p.id ASC"));
        assert!(PetitionSort::CostDesc.order_clause().ends_with("p.id ASC"));
        assert!(PetitionSort::CreatedDesc.order_clause().ends_with("p.id ASC"));
    }
}
