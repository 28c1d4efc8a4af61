//! Chat Store Implementation
//!
//! PostgreSQL implementation of the ChatStore trait.
//! Chats live in `chats`, rosters in `chat_memberships`.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Chat, ChatId, ChatStore, MemberRole, Membership, RosterChange, RosterChangeset};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Database row representation matching the chats table schema.
#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    name: String,
    creator_id: Uuid,
    is_channel: bool,
    join_link: String,
    description: String,
    profile_pic: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Chat {
            id: row.id,
            name: row.name,
            creator_id: row.creator_id,
            is_channel: row.is_channel,
            join_link: row.join_link,
            description: row.description,
            profile_pic: row.profile_pic,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row representation matching the chat_memberships table schema.
#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    chat_id: Uuid,
    user_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self) -> Result<Membership, AppError> {
        let role = self.role.parse::<MemberRole>().map_err(AppError::Internal)?;
        Ok(Membership {
            chat_id: self.chat_id,
            user_id: self.user_id,
            role,
            joined_at: self.joined_at,
        })
    }
}

/// PostgreSQL chat store.
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the chat row and verify the roster size the changeset was built against.
    async fn check_roster_size(
        tx: &mut Transaction<'_, Postgres>,
        chat_id: ChatId,
        expected: usize,
    ) -> Result<(), AppError> {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM chats WHERE id = $1 FOR UPDATE")
            .bind(chat_id)
            .fetch_optional(&mut **tx)
            .await?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!("Chat {} not found", chat_id)));
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_memberships WHERE chat_id = $1",
        )
        .bind(chat_id)
        .fetch_one(&mut **tx)
        .await?;

        if count != expected as i64 {
            return Err(AppError::Conflict(format!(
                "roster of chat {} changed concurrently ({} members, expected {})",
                chat_id, count, expected
            )));
        }

        Ok(())
    }

    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        chat_id: ChatId,
        change: &RosterChange,
    ) -> Result<(), AppError> {
        match change {
            RosterChange::SaveChat(chat) => {
                sqlx::query(
                    r#"
                    INSERT INTO chats (id, name, creator_id, is_channel, join_link,
                                       description, profile_pic, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (id) DO UPDATE
                    SET name = EXCLUDED.name,
                        description = EXCLUDED.description,
                        profile_pic = EXCLUDED.profile_pic,
                        updated_at = EXCLUDED.updated_at
                    "#,
                )
                .bind(chat.id)
                .bind(&chat.name)
                .bind(chat.creator_id)
                .bind(chat.is_channel)
                .bind(&chat.join_link)
                .bind(&chat.description)
                .bind(&chat.profile_pic)
                .bind(chat.created_at)
                .bind(chat.updated_at)
                .execute(&mut **tx)
                .await
                .map_err(|e| match &e {
                    sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                        AppError::Conflict("Join link already in use".to_string())
                    }
                    _ => AppError::Database(e),
                })?;
            }
            RosterChange::UpdateChat(chat) => {
                let updated = sqlx::query(
                    r#"
                    UPDATE chats
                    SET name = $2, description = $3, profile_pic = $4, updated_at = $5
                    WHERE id = $1
                    "#,
                )
                .bind(chat.id)
                .bind(&chat.name)
                .bind(&chat.description)
                .bind(&chat.profile_pic)
                .bind(chat.updated_at)
                .execute(&mut **tx)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("Chat {} not found", chat.id)));
                }
            }
            RosterChange::DeleteChat => {
                // Memberships go with it via ON DELETE CASCADE.
                sqlx::query("DELETE FROM chats WHERE id = $1")
                    .bind(chat_id)
                    .execute(&mut **tx)
                    .await?;
            }
            RosterChange::UpsertMembership(membership) => {
                sqlx::query(
                    r#"
                    INSERT INTO chat_memberships (chat_id, user_id, role, joined_at)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (chat_id, user_id) DO UPDATE
                    SET role = EXCLUDED.role
                    "#,
                )
                .bind(chat_id)
                .bind(membership.user_id)
                .bind(membership.role.as_str())
                .bind(membership.joined_at)
                .execute(&mut **tx)
                .await
                .map_err(|e| match &e {
                    sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                        AppError::NotFound(format!("Chat {} not found", chat_id))
                    }
                    _ => AppError::Database(e),
                })?;
            }
            RosterChange::DeleteMembership(user_id) => {
                sqlx::query("DELETE FROM chat_memberships WHERE chat_id = $1 AND user_id = $2")
                    .bind(chat_id)
                    .bind(user_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_chat(&self, chat_id: ChatId) -> Result<Option<Chat>, AppError> {
        let start = Instant::now();
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, name, creator_id, is_channel, join_link, description, profile_pic,
                   created_at, updated_at
            FROM chats
            WHERE id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;
        metrics::record_db_query("select", "chats", start.elapsed().as_secs_f64());

        Ok(row.map(Chat::from))
    }

    async fn find_chat_by_join_link(&self, join_link: &str) -> Result<Option<Chat>, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, name, creator_id, is_channel, join_link, description, profile_pic,
                   created_at, updated_at
            FROM chats
            WHERE join_link = $1
            "#,
        )
        .bind(join_link)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Chat::from))
    }

    async fn list_memberships(&self, chat_id: ChatId) -> Result<Vec<Membership>, AppError> {
        let start = Instant::now();
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT chat_id, user_id, role, joined_at
            FROM chat_memberships
            WHERE chat_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        metrics::record_db_query("select", "chat_memberships", start.elapsed().as_secs_f64());

        rows.into_iter().map(MembershipRow::into_membership).collect()
    }

    async fn commit(&self, changeset: RosterChangeset) -> Result<(), AppError> {
        if changeset.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let mut tx = self.pool.begin().await?;

        if let Some(expected) = changeset.expected_members {
            Self::check_roster_size(&mut tx, changeset.chat_id, expected).await?;
        }

        for change in &changeset.changes {
            Self::apply(&mut tx, changeset.chat_id, change).await?;
        }

        tx.commit().await?;
        metrics::record_db_query("commit", "chat_memberships", start.elapsed().as_secs_f64());

        Ok(())
    }
}
