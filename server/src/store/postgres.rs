use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use super::{username_taken, Store};
use crate::models::{Event, Review, Rsvp, User, UserProfile};
use crate::utils::error::AppResult;

const EVENT_COLUMNS: &str = "e.id, e.title, e.description, e.organizer_id, e.location, \
     e.start_time, e.end_time, e.is_public, e.created_at, e.updated_at";

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    organizer_id: Uuid,
    location: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, invited_users: Vec<Uuid>) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            organizer_id: self.organizer_id,
            location: self.location,
            start_time: self.start_time,
            end_time: self.end_time,
            is_public: self.is_public,
            invited_users,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Successfully connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await?;
        info!("Migrations run successfully");
        Ok(())
    }

    /// Attaches invitation lists to a batch of event rows.
    async fn hydrate(&self, rows: Vec<EventRow>) -> AppResult<Vec<Event>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let pairs: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT event_id, user_id FROM event_invitations WHERE event_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut invitations: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (event_id, user_id) in pairs {
            invitations.entry(event_id).or_default().push(user_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let invited = invitations.remove(&row.id).unwrap_or_default();
                row.into_event(invited)
            })
            .collect())
    }

    async fn replace_invitations(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        invited_users: &[Uuid],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM event_invitations WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;

        if !invited_users.is_empty() {
            sqlx::query(
                "INSERT INTO event_invitations (event_id, user_id) \
                 SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
            )
            .bind(event_id)
            .bind(invited_users)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_user(&self, user: &User) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username, email = EXCLUDED.email \
             RETURNING id, username, email, created_at",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                username_taken(&user.username)
            }
            e => e.into(),
        })?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, full_name, bio, location, profile_picture, updated_at \
             FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn save_profile(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "INSERT INTO user_profiles (user_id, full_name, bio, location, profile_picture, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id) DO UPDATE SET full_name = EXCLUDED.full_name, bio = EXCLUDED.bio, \
             location = EXCLUDED.location, profile_picture = EXCLUDED.profile_picture, \
             updated_at = EXCLUDED.updated_at \
             RETURNING user_id, full_name, bio, location, profile_picture, updated_at",
        )
        .bind(profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.profile_picture)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn public_events(&self) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.is_public"
        ))
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn events_organized_by(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.organizer_id = $1"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn events_inviting(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             JOIN event_invitations i ON i.event_id = e.id WHERE i.user_id = $1"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_event(&self, event: &Event) -> AppResult<Event> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO events (id, title, description, organizer_id, location, start_time, \
             end_time, is_public, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.organizer_id)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.is_public)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&mut *tx)
        .await?;
        Self::replace_invitations(&mut tx, event.id, &event.invited_users).await?;
        tx.commit().await?;
        Ok(event.clone())
    }

    async fn update_event(&self, event: &Event) -> AppResult<Event> {
        let mut tx = self.pool.begin().await?;
        // organizer_id and created_at are never written after insert.
        sqlx::query(
            "UPDATE events SET title = $2, description = $3, location = $4, start_time = $5, \
             end_time = $6, is_public = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.is_public)
        .bind(event.updated_at)
        .execute(&mut *tx)
        .await?;
        Self::replace_invitations(&mut tx, event.id, &event.invited_users).await?;
        tx.commit().await?;
        Ok(event.clone())
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_rsvp(&self, rsvp: &Rsvp) -> AppResult<Rsvp> {
        let rsvp = sqlx::query_as::<_, Rsvp>(
            "INSERT INTO rsvps (id, event_id, user_id, status, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, event_id, user_id, status, created_at",
        )
        .bind(rsvp.id)
        .bind(rsvp.event_id)
        .bind(rsvp.user_id)
        .bind(rsvp.status)
        .bind(rsvp.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(rsvp)
    }

    async fn list_rsvps(&self, event_id: Uuid) -> AppResult<Vec<Rsvp>> {
        let rsvps = sqlx::query_as::<_, Rsvp>(
            "SELECT id, event_id, user_id, status, created_at FROM rsvps \
             WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rsvps)
    }

    async fn find_rsvp(&self, event_id: Uuid, rsvp_id: Uuid) -> AppResult<Option<Rsvp>> {
        let rsvp = sqlx::query_as::<_, Rsvp>(
            "SELECT id, event_id, user_id, status, created_at FROM rsvps \
             WHERE id = $1 AND event_id = $2",
        )
        .bind(rsvp_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rsvp)
    }

    async fn update_rsvp(&self, rsvp: &Rsvp) -> AppResult<Rsvp> {
        let rsvp = sqlx::query_as::<_, Rsvp>(
            "UPDATE rsvps SET status = $2 WHERE id = $1 \
             RETURNING id, event_id, user_id, status, created_at",
        )
        .bind(rsvp.id)
        .bind(rsvp.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(rsvp)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, event_id, user_id, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, event_id, user_id, rating, comment, created_at",
        )
        .bind(review.id)
        .bind(review.event_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    async fn list_reviews(&self, event_id: Uuid) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT id, event_id, user_id, rating, comment, created_at FROM reviews \
             WHERE event_id = $1 ORDER BY created_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn find_review(&self, event_id: Uuid, review_id: Uuid) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT id, event_id, user_id, rating, comment, created_at FROM reviews \
             WHERE id = $1 AND event_id = $2",
        )
        .bind(review_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn update_review(&self, review: &Review) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET rating = $2, comment = $3 WHERE id = $1 \
             RETURNING id, event_id, user_id, rating, comment, created_at",
        )
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    async fn delete_review(&self, review_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
