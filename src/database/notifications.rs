// ABOUTME: Database operations for broadcast and targeted notifications
// ABOUTME: Per-user listing with read state, idempotent mark-read and admin management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::Utc;
use mealmate_core::models::{Notification, NotificationDraft, UserNotification};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::rows::{decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};

/// Notification storage
pub struct NotificationsManager {
    pool: SqlitePool,
}

impl NotificationsManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a notification
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error (including an unknown
    /// target user, rejected by the foreign key)
    pub async fn create(&self, draft: NotificationDraft) -> AppResult<Notification> {
        draft.validate()?;

        let notification = Notification {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_owned(),
            body: draft.body.trim().to_owned(),
            user_id: draft.user_id,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO notifications (id, title, body, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(notification.id.to_string())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.user_id.map(|id| id.to_string()))
        .bind(encode_timestamp(notification.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create notification: {e}")))?;

        Ok(notification)
    }

    /// Broadcasts plus notifications targeted at `user_id`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserNotification>> {
        let rows = sqlx::query(
            r"
            SELECT n.id, n.title, n.body, n.user_id, n.created_at,
                   CASE WHEN r.read_at IS NULL THEN 0 ELSE 1 END AS is_read
            FROM notifications n
            LEFT JOIN notification_reads r
                ON r.notification_id = n.id AND r.user_id = $1
            WHERE n.user_id IS NULL OR n.user_id = $1
            ORDER BY n.created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(UserNotification {
                    notification: row_to_notification(row)?,
                    read: row.get::<i64, _>("is_read") != 0,
                })
            })
            .collect()
    }

    /// Mark a notification read for `user_id`
    ///
    /// Returns `false` when the notification does not exist or is targeted at
    /// another user. Marking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let visible: Option<i64> = sqlx::query_scalar(
            r"
            SELECT 1 FROM notifications
            WHERE id = $1 AND (user_id IS NULL OR user_id = $2)
            ",
        )
        .bind(notification_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up notification: {e}")))?;

        if visible.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r"
            INSERT OR IGNORE INTO notification_reads (notification_id, user_id, read_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(notification_id.to_string())
        .bind(user_id.to_string())
        .bind(encode_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to mark notification read: {e}")))?;

        Ok(true)
    }

    /// Delete a notification and its read markers; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, notification_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(notification_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete notification: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Every notification regardless of audience, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_all(&self) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, title, body, user_id, created_at FROM notifications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list notifications: {e}")))?;

        rows.iter().map(row_to_notification).collect()
    }
}

fn row_to_notification(row: &SqliteRow) -> AppResult<Notification> {
    let id: String = row.get("id");
    let user_id: Option<String> = row.get("user_id");
    let created_at: String = row.get("created_at");

    Ok(Notification {
        id: decode_uuid(&id, "notifications.id")?,
        title: row.get("title"),
        body: row.get("body"),
        user_id: user_id
            .as_deref()
            .map(|u| decode_uuid(u, "notifications.user_id"))
            .transpose()?,
        created_at: decode_timestamp(&created_at, "notifications.created_at")?,
    })
}
