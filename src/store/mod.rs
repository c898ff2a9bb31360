// src/store/mod.rs

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{query_as, Pool, Postgres};

use crate::models::{ClassRecord, Holiday, MakeupClass, Room, SessionException, Teacher, TrialSession};

#[cfg(test)]
pub mod mem;

/// Data-access seam for the scheduling engine.
///
/// Range queries take an optional branch filter: `Some(branch)` scopes the
/// result to one branch, `None` returns rows across all branches (needed for
/// teacher-axis conflict checks, since a teacher cannot be in two branches at
/// once). Date ranges are inclusive on both ends.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn holidays_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Holiday>>;

    async fn active_classes(&self, branch_id: Option<i64>) -> Result<Vec<ClassRecord>>;

    async fn session_exceptions_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SessionException>>;

    async fn scheduled_makeups_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MakeupClass>>;

    async fn scheduled_trials_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrialSession>>;

    async fn active_rooms(&self, branch_id: i64) -> Result<Vec<Room>>;

    async fn active_teachers(&self, branch_id: i64) -> Result<Vec<Teacher>>;
}

/// PostgreSQL-backed store. Cheap to clone; wraps the shared pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn holidays_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Holiday>> {
        let rows = if let Some(b) = branch_id {
            query_as::<_, Holiday>(
                r#"
                SELECT * FROM public.holidays
                WHERE date BETWEEN $1 AND $2
                  AND (holiday_type = 'national' OR $3 = ANY(branch_ids))
                ORDER BY date
                "#,
            )
            .bind(start)
            .bind(end)
            .bind(b)
            .fetch_all(&self.pool)
            .await?
        } else {
            query_as::<_, Holiday>(
                r#"SELECT * FROM public.holidays WHERE date BETWEEN $1 AND $2 ORDER BY date"#,
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    async fn active_classes(&self, branch_id: Option<i64>) -> Result<Vec<ClassRecord>> {
        let rows = if let Some(b) = branch_id {
            query_as::<_, ClassRecord>(
                r#"SELECT * FROM public.classes WHERE status = 'active' AND branch_id = $1 ORDER BY class_id"#,
            )
            .bind(b)
            .fetch_all(&self.pool)
            .await?
        } else {
            query_as::<_, ClassRecord>(
                r#"SELECT * FROM public.classes WHERE status = 'active' ORDER BY class_id"#,
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    async fn session_exceptions_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SessionException>> {
        let rows = if let Some(b) = branch_id {
            query_as::<_, SessionException>(
                r#"
                SELECT e.exception_id, e.class_id, e.date, e.reason
                FROM public.class_session_exceptions e
                JOIN public.classes c ON c.class_id = e.class_id
                WHERE e.date BETWEEN $1 AND $2 AND c.branch_id = $3
                ORDER BY e.date
                "#,
            )
            .bind(start)
            .bind(end)
            .bind(b)
            .fetch_all(&self.pool)
            .await?
        } else {
            query_as::<_, SessionException>(
                r#"
                SELECT exception_id, class_id, date, reason
                FROM public.class_session_exceptions
                WHERE date BETWEEN $1 AND $2
                ORDER BY date
                "#,
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    async fn scheduled_makeups_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MakeupClass>> {
        let rows = if let Some(b) = branch_id {
            query_as::<_, MakeupClass>(
                r#"
                SELECT * FROM public.makeup_classes
                WHERE status = 'scheduled' AND makeup_date BETWEEN $1 AND $2 AND branch_id = $3
                ORDER BY makeup_date, start_time
                "#,
            )
            .bind(start)
            .bind(end)
            .bind(b)
            .fetch_all(&self.pool)
            .await?
        } else {
            query_as::<_, MakeupClass>(
                r#"
                SELECT * FROM public.makeup_classes
                WHERE status = 'scheduled' AND makeup_date BETWEEN $1 AND $2
                ORDER BY makeup_date, start_time
                "#,
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    async fn scheduled_trials_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrialSession>> {
        let rows = if let Some(b) = branch_id {
            query_as::<_, TrialSession>(
                r#"
                SELECT * FROM public.trial_sessions
                WHERE status = 'scheduled' AND scheduled_date BETWEEN $1 AND $2 AND branch_id = $3
                ORDER BY scheduled_date, start_time
                "#,
            )
            .bind(start)
            .bind(end)
            .bind(b)
            .fetch_all(&self.pool)
            .await?
        } else {
            query_as::<_, TrialSession>(
                r#"
                SELECT * FROM public.trial_sessions
                WHERE status = 'scheduled' AND scheduled_date BETWEEN $1 AND $2
                ORDER BY scheduled_date, start_time
                "#,
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    async fn active_rooms(&self, branch_id: i64) -> Result<Vec<Room>> {
        let rows = query_as::<_, Room>(
            r#"SELECT * FROM public.rooms WHERE branch_id = $1 AND is_active ORDER BY name"#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn active_teachers(&self, branch_id: i64) -> Result<Vec<Teacher>> {
        let rows = query_as::<_, Teacher>(
            r#"SELECT * FROM public.teachers WHERE branch_id = $1 AND is_active ORDER BY name"#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
