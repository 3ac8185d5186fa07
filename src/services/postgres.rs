use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;
use crate::models::{CategoryInterest, Interaction, InteractionType, InterestProfile, ModelError};

/// Number of log entries loaded alongside a profile
const PROFILE_LOG_LIMIT: i64 = 200;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ModelError),
}

/// Interaction types as stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interaction_type", rename_all = "lowercase")]
pub enum InteractionKind {
    View,
    Like,
    Dislike,
    Feedback,
}

impl From<InteractionType> for InteractionKind {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::View => InteractionKind::View,
            InteractionType::Like => InteractionKind::Like,
            InteractionType::Dislike => InteractionKind::Dislike,
            InteractionType::Feedback => InteractionKind::Feedback,
        }
    }
}

impl From<InteractionKind> for InteractionType {
    fn from(value: InteractionKind) -> Self {
        match value {
            InteractionKind::View => InteractionType::View,
            InteractionKind::Like => InteractionType::Like,
            InteractionKind::Dislike => InteractionType::Dislike,
            InteractionKind::Feedback => InteractionType::Feedback,
        }
    }
}

/// PostgreSQL client owning interest profiles and the interaction log
///
/// Profiles are created lazily on first access. The interaction log is
/// append-only; ordering and atomicity of appends are left to the database.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Create a client without connecting or migrating
    ///
    /// Connections are opened on first use.
    pub fn connect_lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Fetch a user's interest profile, creating an empty one if needed
    ///
    /// The most recent interactions are loaded into the profile's log.
    pub async fn get_or_create_profile(&self, user_id: &str) -> Result<InterestProfile, PostgresError> {
        self.ensure_profile(user_id).await?;

        let mut profile = self.load_preferences(user_id).await?;
        profile.interaction_log = self.recent_interactions(user_id, PROFILE_LOG_LIMIT).await?;

        // The recency bonus needs the latest view even when newer entries crowd it out
        if !profile.interaction_log.iter().any(|i| i.interaction_type == InteractionType::View) {
            if let Some(view) = self.latest_view(user_id).await? {
                profile.interaction_log.push(view);
            }
        }

        Ok(profile)
    }

    /// Most recent `view` entry of a user, if any
    pub async fn latest_view(&self, user_id: &str) -> Result<Option<Interaction>, PostgresError> {
        let query = r#"
            SELECT event_id, created_at
            FROM interactions
            WHERE user_id = $1 AND interaction_type = 'view'
            ORDER BY created_at DESC
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Interaction {
            event_id: row.get("event_id"),
            interaction_type: InteractionType::View,
            timestamp: row.get("created_at"),
        }))
    }

    /// Insert an empty profile row unless one exists
    async fn ensure_profile(&self, user_id: &str) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO interest_profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
        "#;

        let created = sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected()
            > 0;

        if created {
            tracing::info!("Created empty interest profile for user {}", user_id);
        }

        Ok(())
    }

    async fn load_preferences(&self, user_id: &str) -> Result<InterestProfile, PostgresError> {
        let query = r#"
            SELECT categories, preferred_times, preferred_locations
            FROM interest_profiles
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Interest profile for user {}", user_id)))?;

        let Json(categories): Json<Vec<CategoryInterest>> = row.get("categories");
        let times: Vec<i32> = row.get("preferred_times");
        let locations: Vec<String> = row.get("preferred_locations");

        let mut profile = InterestProfile::new(user_id);
        profile.categories = categories;
        profile.preferred_times = times
            .into_iter()
            .filter_map(|h| u8::try_from(h).ok().filter(|h| *h < 24))
            .collect();
        profile.preferred_locations = locations.into_iter().collect();

        Ok(profile)
    }

    /// Replace a user's declared preferences, creating the profile if needed
    pub async fn update_preferences(&self, profile: &InterestProfile) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO interest_profiles (user_id, categories, preferred_times, preferred_locations, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                categories = EXCLUDED.categories,
                preferred_times = EXCLUDED.preferred_times,
                preferred_locations = EXCLUDED.preferred_locations,
                updated_at = EXCLUDED.updated_at
        "#;

        let times: Vec<i32> = profile.preferred_times.iter().map(|h| *h as i32).collect();
        let locations: Vec<String> = profile.preferred_locations.iter().cloned().collect();

        sqlx::query(query)
            .bind(&profile.user_id)
            .bind(Json(&profile.categories))
            .bind(&times)
            .bind(&locations)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Updated preferences for {}: {} categories, {} times, {} locations",
            profile.user_id,
            profile.categories.len(),
            times.len(),
            locations.len()
        );

        Ok(())
    }

    /// Append one entry to a user's interaction log
    pub async fn append_interaction(
        &self,
        user_id: &str,
        interaction: &Interaction,
    ) -> Result<Uuid, PostgresError> {
        let query = r#"
            INSERT INTO interactions (id, user_id, event_id, interaction_type, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        self.ensure_profile(user_id).await?;

        let id = Uuid::new_v4();
        sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .bind(&interaction.event_id)
            .bind(InteractionKind::from(interaction.interaction_type))
            .bind(interaction.timestamp)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded interaction: {} -> {} ({})",
            user_id,
            interaction.event_id,
            interaction.interaction_type
        );

        Ok(id)
    }

    /// Most recent interactions of a user, newest first
    pub async fn recent_interactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interaction>, PostgresError> {
        let query = r#"
            SELECT event_id, interaction_type, created_at
            FROM interactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let interactions: Vec<Interaction> = rows
            .iter()
            .map(|row| Interaction {
                event_id: row.get("event_id"),
                interaction_type: row.get::<InteractionKind, _>("interaction_type").into(),
                timestamp: row.get("created_at"),
            })
            .collect();

        tracing::debug!("Loaded {} interactions for user {}", interactions.len(), user_id);

        Ok(interactions)
    }

    /// Get interaction totals for a user
    pub async fn interaction_counts(&self, user_id: &str) -> Result<InteractionCounts, PostgresError> {
        let query = r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE interaction_type = 'view') as views,
                COUNT(*) FILTER (WHERE interaction_type = 'like') as likes,
                COUNT(*) FILTER (WHERE interaction_type = 'dislike') as dislikes,
                COUNT(*) FILTER (WHERE interaction_type = 'feedback') as feedback,
                MAX(created_at) as last_interaction_at
            FROM interactions
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query).bind(user_id).fetch_one(&self.pool).await?;

        Ok(InteractionCounts {
            user_id: user_id.to_string(),
            total: row.get("total"),
            views: row.get("views"),
            likes: row.get("likes"),
            dislikes: row.get("dislikes"),
            feedback: row.get("feedback"),
            last_interaction_at: row.get("last_interaction_at"),
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Interaction totals for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionCounts {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub total: i64,
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub feedback: i64,
    #[serde(rename = "lastInteractionAt")]
    pub last_interaction_at: Option<DateTime<Utc>>,
}
