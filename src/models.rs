use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// DIRECTORY ENTITIES
// ============================================================================

/// Business listing owned by a registered user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Business {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub hours_text: Option<String>,
    pub hours_open: Option<i32>,
    pub hours_close: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub tour_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Operating-hours window `[open, close)`, present only when both bounds are set.
    pub fn hours_window(&self) -> Option<(i32, i32)> {
        match (self.hours_open, self.hours_close) {
            (Some(open), Some(close)) => Some((open, close)),
            _ => None,
        }
    }
}

/// Helper struct used when inserting a new business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBusiness {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub hours_text: Option<String>,
    pub hours_open: Option<i32>,
    pub hours_close: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub tour_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gallery photo belonging to a business
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub business_id: Uuid,
    pub url: String,
    pub storage_path: String,
    pub order_index: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Helper for inserting photo records returned by the storage service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoto {
    pub id: Uuid,
    pub business_id: Uuid,
    pub url: String,
    pub storage_path: String,
    pub order_index: Option<i32>,
}

/// Visitor review; one per (business, reviewer) pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub business_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Helper for inserting a new review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub id: Uuid,
    pub business_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event hosted by a business
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub business_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub recurrence: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Display end time; events without an explicit end run for one hour.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.ends_at
            .unwrap_or_else(|| self.starts_at + Duration::hours(1))
    }
}

/// Helper for inserting a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub id: Uuid,
    pub business_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub recurrence: Option<String>,
    pub photo_url: Option<String>,
}

// ============================================================================
// REQUEST/RESPONSE DTOs
// ============================================================================

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

/// Payload sent by business owners to create a listing
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBusinessRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 120))]
    pub category: Option<String>,
    #[validate(length(min = 3))]
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 120))]
    pub hours_text: Option<String>,
    #[validate(range(min = 0, max = 24))]
    pub hours_open: Option<i32>,
    #[validate(range(min = 0, max = 24))]
    pub hours_close: Option<i32>,
    pub phone: Option<String>,
    #[validate(length(max = 1024))]
    pub website: Option<String>,
    #[validate(length(max = 1024))]
    pub tour_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl CreateBusinessRequest {
    pub fn into_new_business(self, owner_user_id: Uuid) -> NewBusiness {
        let now = Utc::now();
        NewBusiness {
            id: Uuid::new_v4(),
            owner_user_id,
            name: self.name,
            category: self.category,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description,
            hours_text: self.hours_text,
            hours_open: self.hours_open,
            hours_close: self.hours_close,
            phone: self.phone,
            website: self.website,
            tour_url: self.tour_url,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an existing listing
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 120))]
    pub category: Option<String>,
    #[validate(length(min = 3))]
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 120))]
    pub hours_text: Option<String>,
    #[validate(range(min = 0, max = 24))]
    pub hours_open: Option<i32>,
    #[validate(range(min = 0, max = 24))]
    pub hours_close: Option<i32>,
    pub phone: Option<String>,
    #[validate(length(max = 1024))]
    pub website: Option<String>,
    #[validate(length(max = 1024))]
    pub tour_url: Option<String>,
    pub featured: bool,
}

impl UpdateBusinessRequest {
    pub fn apply_to_existing(&self, existing: &mut Business) {
        existing.name = self.name.clone();
        existing.category = self.category.clone();
        existing.location = self.location.clone();
        existing.latitude = self.latitude;
        existing.longitude = self.longitude;
        existing.description = self.description.clone();
        existing.hours_text = self.hours_text.clone();
        existing.hours_open = self.hours_open;
        existing.hours_close = self.hours_close;
        existing.phone = self.phone.clone();
        existing.website = self.website.clone();
        existing.tour_url = self.tour_url.clone();
        existing.featured = self.featured;
        existing.updated_at = Utc::now();
    }
}

/// Review submitted by a visitor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_new_review(self, business_id: Uuid, reviewer_id: Uuid) -> NewReview {
        let now = Utc::now();
        NewReview {
            id: Uuid::new_v4(),
            business_id,
            reviewer_id,
            rating: self.rating,
            comment: self.comment.filter(|c| !c.trim().is_empty()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Edit of a reviewer's existing review
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Request to create an event
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 2, max = 160))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(length(max = 60))]
    pub recurrence: Option<String>,
    #[validate(length(max = 1024))]
    pub photo_url: Option<String>,
}

impl CreateEventRequest {
    pub fn validate_business_rules(&self) -> Result<(), String> {
        if let Some(ends_at) = self.ends_at {
            if ends_at <= self.starts_at {
                return Err("Event end must be after its start".into());
            }
        }
        Ok(())
    }

    pub fn into_new_event(self, business_id: Uuid) -> NewEvent {
        NewEvent {
            id: Uuid::new_v4(),
            business_id,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            recurrence: self.recurrence,
            photo_url: self.photo_url,
        }
    }
}

/// Photo record as persisted by the storage service after an upload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StoredPhotoRecord {
    #[validate(length(min = 1, max = 1024))]
    pub url: String,
    #[validate(length(min = 1, max = 1024))]
    pub storage_path: String,
    pub order_index: Option<i32>,
}

/// Request to register uploaded photos against a business
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPhotosRequest {
    #[validate(length(min = 1), nested)]
    pub photos: Vec<StoredPhotoRecord>,
}

impl RegisterPhotosRequest {
    pub fn into_new_photos(self, business_id: Uuid) -> Vec<NewPhoto> {
        self.photos
            .into_iter()
            .map(|record| NewPhoto {
                id: Uuid::new_v4(),
                business_id,
                url: record.url,
                storage_path: record.storage_path,
                order_index: record.order_index,
            })
            .collect()
    }
}

/// Gallery reordering: photo ids in their new display order
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderPhotosRequest {
    #[validate(length(min = 1))]
    pub photo_ids: Vec<Uuid>,
}

// ============================================================================
// COMPOSITE RESPONSE TYPES
// ============================================================================

/// Business annotated with its derived rating and ordered gallery
#[derive(Debug, Clone, Serialize)]
pub struct BusinessListing {
    #[serde(flatten)]
    pub business: Business,
    pub rating: f64,
    pub reviews_count: i64,
    pub cover_url: String,
    pub photos: Vec<Photo>,
}

/// One category bucket in first-appearance order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub businesses: Vec<BusinessListing>,
}

/// Event with its display end resolved
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub display_end: DateTime<Utc>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let display_end = event.effective_end();
        Self { event, display_end }
    }
}

/// Full detail view: listing plus its reviews and events
#[derive(Debug, Serialize)]
pub struct BusinessDetail {
    #[serde(flatten)]
    pub listing: BusinessListing,
    pub reviews: Vec<Review>,
    pub events: Vec<EventView>,
}
