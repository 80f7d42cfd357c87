use std::{borrow::Cow, time::Duration};

use futures_util::try_join;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, Executor, PgPool, Postgres, Transaction,
};
use uuid::Uuid;

use crate::models::{
    Business, Event, NewBusiness, NewEvent, NewPhoto, NewReview, Photo, Review,
};

const BUSINESS_COLUMNS: &str = r#"
    id,
    owner_user_id,
    name,
    category,
    location,
    latitude,
    longitude,
    description,
    hours_text,
    hours_open,
    hours_close,
    phone,
    website,
    tour_url,
    featured,
    created_at,
    updated_at
"#;

const PHOTO_COLUMNS: &str = r#"
    id,
    business_id,
    url,
    storage_path,
    order_index,
    created_at
"#;

const REVIEW_COLUMNS: &str = r#"
    id,
    business_id,
    reviewer_id,
    rating,
    comment,
    created_at,
    updated_at
"#;

const EVENT_COLUMNS: &str = r#"
    id,
    business_id,
    title,
    description,
    starts_at,
    ends_at,
    recurrence,
    photo_url,
    created_at
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = match PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Some(Duration::from_secs(600)))
            .test_before_acquire(true)
            .connect(database_url)
            .await
        {
            Ok(pool) => pool,
            Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("3D000")) => {
                log::info!("Database missing, attempting to create it");
                create_database_if_missing(database_url).await?;

                PgPoolOptions::new()
                    .max_connections(10)
                    .min_connections(2)
                    .acquire_timeout(Duration::from_secs(5))
                    .idle_timeout(Some(Duration::from_secs(600)))
                    .test_before_acquire(true)
                    .connect(database_url)
                    .await?
            }
            Err(err) => return Err(err),
        };

        // Run embedded migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    // ========================================================================
    // BUSINESSES
    // ========================================================================

    pub async fn create_business(&self, business: NewBusiness) -> Result<Business, sqlx::Error> {
        let record = sqlx::query_as::<_, Business>(&format!(
            r#"
            INSERT INTO businesses (
                id,
                owner_user_id,
                name,
                category,
                location,
                latitude,
                longitude,
                description,
                hours_text,
                hours_open,
                hours_close,
                phone,
                website,
                tour_url,
                featured,
                created_at,
                updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17
            )
            RETURNING {BUSINESS_COLUMNS}
            "#,
        ))
        .bind(business.id)
        .bind(business.owner_user_id)
        .bind(business.name)
        .bind(business.category)
        .bind(business.location)
        .bind(business.latitude)
        .bind(business.longitude)
        .bind(business.description)
        .bind(business.hours_text)
        .bind(business.hours_open)
        .bind(business.hours_close)
        .bind(business.phone)
        .bind(business.website)
        .bind(business.tour_url)
        .bind(business.featured)
        .bind(business.created_at)
        .bind(business.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_business(&self, business_id: Uuid) -> Result<Option<Business>, sqlx::Error> {
        let record = sqlx::query_as::<_, Business>(&format!(
            r#"
            SELECT {BUSINESS_COLUMNS}
            FROM businesses
            WHERE id = $1
            "#,
        ))
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Full inventory in insertion order; the snapshot the engine derives from.
    pub async fn list_businesses(&self) -> Result<Vec<Business>, sqlx::Error> {
        let records = sqlx::query_as::<_, Business>(&format!(
            r#"
            SELECT {BUSINESS_COLUMNS}
            FROM businesses
            ORDER BY created_at ASC, id ASC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_businesses_for_user(
        &self,
        owner_user_id: Uuid,
    ) -> Result<Vec<Business>, sqlx::Error> {
        let records = sqlx::query_as::<_, Business>(&format!(
            r#"
            SELECT {BUSINESS_COLUMNS}
            FROM businesses
            WHERE owner_user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn update_business(&self, business: Business) -> Result<Business, sqlx::Error> {
        let record = sqlx::query_as::<_, Business>(&format!(
            r#"
            UPDATE businesses
            SET name = $2,
                category = $3,
                location = $4,
                latitude = $5,
                longitude = $6,
                description = $7,
                hours_text = $8,
                hours_open = $9,
                hours_close = $10,
                phone = $11,
                website = $12,
                tour_url = $13,
                featured = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BUSINESS_COLUMNS}
            "#,
        ))
        .bind(business.id)
        .bind(business.name)
        .bind(business.category)
        .bind(business.location)
        .bind(business.latitude)
        .bind(business.longitude)
        .bind(business.description)
        .bind(business.hours_text)
        .bind(business.hours_open)
        .bind(business.hours_close)
        .bind(business.phone)
        .bind(business.website)
        .bind(business.tour_url)
        .bind(business.featured)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn delete_business(&self, business_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM businesses WHERE id = $1"#)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    // ========================================================================
    // PHOTOS
    // ========================================================================

    pub async fn insert_photos(&self, photos: Vec<NewPhoto>) -> Result<Vec<Photo>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let mut stored = Vec::with_capacity(photos.len());
        for photo in photos {
            let inserted = Self::insert_photo_with_tx(&mut tx, photo).await?;
            stored.push(inserted);
        }

        tx.commit().await?;

        Ok(stored)
    }

    async fn insert_photo_with_tx(
        tx: &mut Transaction<'_, Postgres>,
        photo: NewPhoto,
    ) -> Result<Photo, sqlx::Error> {
        sqlx::query_as::<_, Photo>(&format!(
            r#"
            INSERT INTO business_photos (id, business_id, url, storage_path, order_index)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PHOTO_COLUMNS}
            "#,
        ))
        .bind(photo.id)
        .bind(photo.business_id)
        .bind(photo.url)
        .bind(photo.storage_path)
        .bind(photo.order_index)
        .fetch_one(tx.as_mut())
        .await
    }

    pub async fn get_photo(&self, photo_id: Uuid) -> Result<Option<Photo>, sqlx::Error> {
        let record = sqlx::query_as::<_, Photo>(&format!(
            r#"
            SELECT {PHOTO_COLUMNS}
            FROM business_photos
            WHERE id = $1
            "#,
        ))
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Arrival order; gallery ordering is derived downstream.
    pub async fn list_photos(&self) -> Result<Vec<Photo>, sqlx::Error> {
        let records = sqlx::query_as::<_, Photo>(&format!(
            r#"
            SELECT {PHOTO_COLUMNS}
            FROM business_photos
            ORDER BY created_at ASC, id ASC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_photos_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let records = sqlx::query_as::<_, Photo>(&format!(
            r#"
            SELECT {PHOTO_COLUMNS}
            FROM business_photos
            WHERE business_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Rewrites order_index by position in `photo_ids`, then returns the
    /// reordered gallery.
    pub async fn reorder_photos(
        &self,
        business_id: Uuid,
        photo_ids: &[Uuid],
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for (position, photo_id) in photo_ids.iter().enumerate() {
            sqlx::query(
                r#"
                UPDATE business_photos
                SET order_index = $3
                WHERE id = $1 AND business_id = $2
                "#,
            )
            .bind(photo_id)
            .bind(business_id)
            .bind(position as i32)
            .execute(tx.as_mut())
            .await?;
        }

        let records = sqlx::query_as::<_, Photo>(&format!(
            r#"
            SELECT {PHOTO_COLUMNS}
            FROM business_photos
            WHERE business_id = $1
            ORDER BY order_index ASC NULLS LAST, created_at ASC, id ASC
            "#,
        ))
        .bind(business_id)
        .fetch_all(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(records)
    }

    pub async fn delete_photo(&self, photo_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM business_photos WHERE id = $1"#)
            .bind(photo_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    // ========================================================================
    // REVIEWS
    // ========================================================================

    /// Plain insert; the unique (business, reviewer) constraint surfaces
    /// duplicate submissions to the caller.
    pub async fn create_review(&self, review: NewReview) -> Result<Review, sqlx::Error> {
        let record = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (id, business_id, reviewer_id, rating, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REVIEW_COLUMNS}
            "#,
        ))
        .bind(review.id)
        .bind(review.business_id)
        .bind(review.reviewer_id)
        .bind(review.rating)
        .bind(review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn update_review(
        &self,
        business_id: Uuid,
        reviewer_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Option<Review>, sqlx::Error> {
        let record = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET rating = $3,
                comment = $4,
                updated_at = NOW()
            WHERE business_id = $1 AND reviewer_id = $2
            RETURNING {REVIEW_COLUMNS}
            "#,
        ))
        .bind(business_id)
        .bind(reviewer_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>, sqlx::Error> {
        let records = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            ORDER BY created_at ASC, id ASC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_reviews_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let records = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE business_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub async fn create_event(&self, event: NewEvent) -> Result<Event, sqlx::Error> {
        let record = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (id, business_id, title, description, starts_at, ends_at, recurrence, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(event.id)
        .bind(event.business_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.recurrence)
        .bind(event.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        let records = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            ORDER BY starts_at ASC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_events_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let records = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE business_id = $1
            ORDER BY starts_at ASC
            "#,
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn delete_event(&self, event_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM events WHERE id = $1"#)
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    /// Raw collections the listing engine derives directory views from,
    /// fetched concurrently.
    pub async fn directory_snapshot(
        &self,
    ) -> Result<(Vec<Business>, Vec<Review>, Vec<Photo>), sqlx::Error> {
        try_join!(self.list_businesses(), self.list_reviews(), self.list_photos())
    }
}

async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    let database_name = options
        .get_database()
        .map(|name| name.to_string())
        .unwrap_or_else(|| "postgres".to_string());

    // If we're already targeting the default maintenance database, nothing to do.
    if database_name.eq_ignore_ascii_case("postgres") {
        return Ok(());
    }

    let maintenance_options = options.clone().database("postgres");

    let mut connection = sqlx::postgres::PgConnection::connect_with(&maintenance_options).await?;

    let escaped_name = database_name.replace('"', "\"");
    let create_stmt = format!("CREATE DATABASE \"{}\"", escaped_name);

    match connection.execute(create_stmt.as_str()).await {
        Ok(_) => {
            log::info!("Created database '{}'", database_name);
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("42P04")) => {
            log::info!("Database '{}' already exists", database_name);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
