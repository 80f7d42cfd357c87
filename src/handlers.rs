use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use chrono::{Local, Timelike, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::clients::photo_storage::PhotoStorageClient;
use crate::database::Database;
use crate::engine::{self, EventWindow, SortKey};
use crate::models::{
    ApiResponse, BusinessDetail, CreateBusinessRequest, CreateEventRequest, CreateReviewRequest,
    EventView, RegisterPhotosRequest, ReorderPhotosRequest, UpdateBusinessRequest,
    UpdateReviewRequest,
};

fn extract_actor_headers(req: &HttpRequest) -> Result<(Uuid, String), String> {
    let actor_id = req
        .headers()
        .get("X-Actor-Id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| "Missing or invalid X-Actor-Id header".to_string())?;

    let actor_name = req
        .headers()
        .get("X-Actor-Name")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| "Missing X-Actor-Name header".to_string())?;

    Ok((actor_id, actor_name))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

// ============================================================================
// HEALTH CHECK
// ============================================================================

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "directory-service",
        "timestamp": chrono::Utc::now()
    }))
}

// ============================================================================
// DIRECTORY VIEWS
// ============================================================================

#[derive(Deserialize)]
pub struct CategoriesQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub min_rating: Option<f64>,
    pub open_now: Option<bool>,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub window: Option<String>,
}

#[get("/directory/featured")]
pub async fn list_featured(db: web::Data<Database>) -> impl Responder {
    match db.directory_snapshot().await {
        Ok((businesses, reviews, photos)) => {
            let listings = engine::annotate(businesses, &reviews, photos);
            HttpResponse::Ok().json(ApiResponse::success(engine::compute_featured(&listings)))
        }
        Err(err) => {
            log::error!("Failed to load directory snapshot: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load directory".into()))
        }
    }
}

#[get("/directory/new")]
pub async fn list_new_arrivals(db: web::Data<Database>) -> impl Responder {
    match db.directory_snapshot().await {
        Ok((businesses, reviews, photos)) => {
            let listings = engine::annotate(businesses, &reviews, photos);
            HttpResponse::Ok().json(ApiResponse::success(engine::compute_new_arrivals(&listings)))
        }
        Err(err) => {
            log::error!("Failed to load directory snapshot: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load directory".into()))
        }
    }
}

/// Category buckets; counts reflect the active search term because the
/// search narrows the inventory before partitioning.
#[get("/directory/categories")]
pub async fn list_categories(
    db: web::Data<Database>,
    query: web::Query<CategoriesQuery>,
) -> impl Responder {
    match db.directory_snapshot().await {
        Ok((businesses, reviews, photos)) => {
            let listings = engine::annotate(businesses, &reviews, photos);
            let searched = engine::search(&listings, query.search.as_deref().unwrap_or(""));
            HttpResponse::Ok().json(ApiResponse::success(engine::group_by_category(&searched)))
        }
        Err(err) => {
            log::error!("Failed to load directory snapshot: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load directory".into()))
        }
    }
}

#[get("/directory/browse")]
pub async fn browse_directory(
    db: web::Data<Database>,
    query: web::Query<BrowseQuery>,
) -> impl Responder {
    let (businesses, reviews, photos) = match db.directory_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::error!("Failed to load directory snapshot: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load directory".into()));
        }
    };

    let listings = engine::annotate(businesses, &reviews, photos);
    let searched = engine::search(&listings, query.search.as_deref().unwrap_or(""));

    let bucket = match query.category.as_deref() {
        Some(category) if !category.trim().is_empty() => engine::group_by_category(&searched)
            .into_iter()
            .find(|group| group.category.eq_ignore_ascii_case(category.trim()))
            .map(|group| group.businesses)
            .unwrap_or_default(),
        _ => searched,
    };

    let opts = engine::BrowseOptions {
        min_rating: query.min_rating.unwrap_or(0.0),
        open_now: query.open_now.unwrap_or(false),
        current_hour: Local::now().hour(),
        sort: query.sort.as_deref().and_then(SortKey::parse),
    };

    HttpResponse::Ok().json(ApiResponse::success(engine::filter_and_sort(&bucket, &opts)))
}

#[get("/directory/events")]
pub async fn list_directory_events(
    db: web::Data<Database>,
    query: web::Query<EventsQuery>,
) -> impl Responder {
    let window = query
        .window
        .as_deref()
        .and_then(EventWindow::parse)
        .unwrap_or(EventWindow::Upcoming);

    match db.list_events().await {
        Ok(events) => {
            let views: Vec<EventView> = engine::filter_events(&events, window, Utc::now())
                .into_iter()
                .map(EventView::from)
                .collect();
            HttpResponse::Ok().json(ApiResponse::success(views))
        }
        Err(err) => {
            log::error!("Failed to list events: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to list events".into()))
        }
    }
}

// ============================================================================
// BUSINESSES
// ============================================================================

#[post("/businesses")]
pub async fn create_business(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateBusinessRequest>,
) -> impl Responder {
    let (actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let body = payload.into_inner();
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    let new_business = body.into_new_business(actor_id);
    match db.create_business(new_business).await {
        Ok(business) => HttpResponse::Created().json(ApiResponse::success(business)),
        Err(err) => {
            log::error!("Failed to create business: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to create business".into()))
        }
    }
}

#[get("/businesses/{business_id}")]
pub async fn get_business(db: web::Data<Database>, business_id: web::Path<Uuid>) -> impl Responder {
    let business_id = business_id.into_inner();

    let business = match db.get_business(business_id).await {
        Ok(Some(business)) => business,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Business not found".into()));
        }
        Err(err) => {
            log::error!("Failed to get business: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to get business".into()));
        }
    };

    let reviews = match db.list_reviews_for_business(business_id).await {
        Ok(reviews) => reviews,
        Err(err) => {
            log::error!("Failed to list reviews: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load business details".into()));
        }
    };

    let photos = match db.list_photos_for_business(business_id).await {
        Ok(photos) => photos,
        Err(err) => {
            log::error!("Failed to list photos: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load business details".into()));
        }
    };

    let events = match db.list_events_for_business(business_id).await {
        Ok(events) => events,
        Err(err) => {
            log::error!("Failed to list events: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load business details".into()));
        }
    };

    let listing = match engine::annotate(vec![business], &reviews, photos).into_iter().next() {
        Some(listing) => listing,
        None => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Business not found".into()));
        }
    };

    HttpResponse::Ok().json(ApiResponse::success(BusinessDetail {
        listing,
        reviews,
        events: events.into_iter().map(EventView::from).collect(),
    }))
}

#[get("/businesses/users/{user_id}")]
pub async fn list_businesses_for_user(
    db: web::Data<Database>,
    user_id: web::Path<Uuid>,
) -> impl Responder {
    let user_id = user_id.into_inner();
    match db.list_businesses_for_user(user_id).await {
        Ok(businesses) => HttpResponse::Ok().json(ApiResponse::success(businesses)),
        Err(err) => {
            log::error!("Failed to list businesses: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to list businesses".into()))
        }
    }
}

#[put("/businesses/{business_id}")]
pub async fn update_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<UpdateBusinessRequest>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    let mut existing_business = match db.get_business(business_id).await {
        Ok(Some(biz)) => biz,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Business not found".into()));
        }
        Err(err) => {
            log::error!("Failed to fetch business: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to load business".into()));
        }
    };

    body.apply_to_existing(&mut existing_business);

    match db.update_business(existing_business).await {
        Ok(updated) => HttpResponse::Ok().json(ApiResponse::success(updated)),
        Err(err) => {
            log::error!("Failed to update business: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to update business".into()))
        }
    }
}

#[delete("/businesses/{business_id}")]
pub async fn delete_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    match db.delete_business(business_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(sqlx::Error::RowNotFound) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Business not found".into()))
        }
        Err(err) => {
            log::error!("Failed to delete business: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to delete business".into()))
        }
    }
}

// ============================================================================
// REVIEWS
// ============================================================================

#[post("/businesses/{business_id}/reviews")]
pub async fn submit_review(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<CreateReviewRequest>,
) -> impl Responder {
    let (actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    match db.get_business(business_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Business not found".into()));
        }
        Err(err) => {
            log::error!("Failed to fetch business: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to submit review".into()));
        }
    }

    let new_review = body.into_new_review(business_id, actor_id);
    match db.create_review(new_review).await {
        Ok(review) => HttpResponse::Created().json(ApiResponse::success(review)),
        Err(err) if is_unique_violation(&err) => HttpResponse::Conflict().json(
            ApiResponse::<()>::error(
                "You have already reviewed this business. Edit your existing review instead."
                    .into(),
            ),
        ),
        Err(err) => {
            log::error!("Failed to create review: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to submit review".into()))
        }
    }
}

#[put("/businesses/{business_id}/reviews")]
pub async fn edit_review(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<UpdateReviewRequest>,
) -> impl Responder {
    let (actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    let comment = body.comment.filter(|c| !c.trim().is_empty());
    match db
        .update_review(business_id, actor_id, body.rating, comment)
        .await
    {
        Ok(Some(review)) => HttpResponse::Ok().json(ApiResponse::success(review)),
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "You have not reviewed this business yet".into(),
        )),
        Err(err) => {
            log::error!("Failed to update review: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to update review".into()))
        }
    }
}

#[get("/businesses/{business_id}/reviews")]
pub async fn list_business_reviews(
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
) -> impl Responder {
    let business_id = business_id.into_inner();
    match db.list_reviews_for_business(business_id).await {
        Ok(reviews) => HttpResponse::Ok().json(ApiResponse::success(reviews)),
        Err(err) => {
            log::error!("Failed to list reviews: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to list reviews".into()))
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

#[post("/businesses/{business_id}/events")]
pub async fn create_event(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<CreateEventRequest>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    if let Err(message) = body.validate_business_rules() {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error(message));
    }

    match db.get_business(business_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Business not found".into()));
        }
        Err(err) => {
            log::error!("Failed to fetch business: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to create event".into()));
        }
    }

    let new_event = body.into_new_event(business_id);
    match db.create_event(new_event).await {
        Ok(event) => HttpResponse::Created().json(ApiResponse::success(event)),
        Err(err) => {
            log::error!("Failed to create event: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to create event".into()))
        }
    }
}

#[get("/businesses/{business_id}/events")]
pub async fn list_business_events(
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    query: web::Query<EventsQuery>,
) -> impl Responder {
    let business_id = business_id.into_inner();
    let window = query
        .window
        .as_deref()
        .and_then(EventWindow::parse)
        .unwrap_or(EventWindow::All);

    match db.list_events_for_business(business_id).await {
        Ok(events) => {
            let views: Vec<EventView> = engine::filter_events(&events, window, Utc::now())
                .into_iter()
                .map(EventView::from)
                .collect();
            HttpResponse::Ok().json(ApiResponse::success(views))
        }
        Err(err) => {
            log::error!("Failed to list events: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to list events".into()))
        }
    }
}

#[delete("/events/{event_id}")]
pub async fn delete_event(
    req: HttpRequest,
    db: web::Data<Database>,
    event_id: web::Path<Uuid>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let event_id = event_id.into_inner();
    match db.delete_event(event_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(sqlx::Error::RowNotFound) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Event not found".into()))
        }
        Err(err) => {
            log::error!("Failed to delete event: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to delete event".into()))
        }
    }
}

// ============================================================================
// PHOTOS
// ============================================================================

#[post("/businesses/{business_id}/photos")]
pub async fn register_photos(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<RegisterPhotosRequest>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    match db.get_business(business_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Business not found".into()));
        }
        Err(err) => {
            log::error!("Failed to fetch business: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to register photos".into()));
        }
    }

    let new_photos = body.into_new_photos(business_id);
    match db.insert_photos(new_photos).await {
        Ok(photos) => HttpResponse::Created().json(ApiResponse::success(photos)),
        Err(err) => {
            log::error!("Failed to register photos: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to register photos".into()))
        }
    }
}

#[put("/businesses/{business_id}/photos/order")]
pub async fn reorder_photos(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<ReorderPhotosRequest>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    let body = payload.into_inner();

    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("Validation failed: {}", e)));
    }

    match db.reorder_photos(business_id, &body.photo_ids).await {
        Ok(photos) => HttpResponse::Ok().json(ApiResponse::success(photos)),
        Err(err) => {
            log::error!("Failed to reorder photos: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to reorder photos".into()))
        }
    }
}

#[delete("/photos/{photo_id}")]
pub async fn delete_photo(
    req: HttpRequest,
    db: web::Data<Database>,
    storage: web::Data<PhotoStorageClient>,
    photo_id: web::Path<Uuid>,
) -> impl Responder {
    let (_actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let photo_id = photo_id.into_inner();
    let photo = match db.get_photo(photo_id).await {
        Ok(Some(photo)) => photo,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Photo not found".into()));
        }
        Err(err) => {
            log::error!("Failed to fetch photo: {err:?}");
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to delete photo".into()));
        }
    };

    // The stored object goes first; the record survives a storage failure.
    if let Err(err) = storage.delete_object(photo.id, &photo.storage_path).await {
        log::error!("Failed to delete stored photo object: {err}");
        return HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error("Failed to delete stored photo".into()));
    }

    match db.delete_photo(photo_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(sqlx::Error::RowNotFound) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Photo not found".into()))
        }
        Err(err) => {
            log::error!("Failed to delete photo record: {err:?}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to delete photo".into()))
        }
    }
}

// ============================================================================
// FAVORITES
// ============================================================================

/// Per-actor favorite sets, process-local for the session. Mutation goes
/// through the engine's pure toggle; the lock only swaps sets.
#[derive(Default)]
pub struct FavoritesStore {
    inner: Mutex<HashMap<Uuid, HashSet<Uuid>>>,
}

impl FavoritesStore {
    pub fn toggle(&self, actor_id: Uuid, business_id: Uuid) -> Vec<Uuid> {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let current = guard.entry(actor_id).or_default();
        let next = engine::toggle_favorite(current, business_id);
        let snapshot = next.iter().copied().collect();
        *current = next;
        snapshot
    }

    pub fn favorites_for(&self, actor_id: Uuid) -> Vec<Uuid> {
        let guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .get(&actor_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[post("/favorites/{business_id}/toggle")]
pub async fn toggle_favorite(
    req: HttpRequest,
    favorites: web::Data<FavoritesStore>,
    business_id: web::Path<Uuid>,
) -> impl Responder {
    let (actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    let business_id = business_id.into_inner();
    HttpResponse::Ok().json(ApiResponse::success(
        favorites.toggle(actor_id, business_id),
    ))
}

#[get("/favorites")]
pub async fn list_favorites(
    req: HttpRequest,
    favorites: web::Data<FavoritesStore>,
) -> impl Responder {
    let (actor_id, _actor_name) = match extract_actor_headers(&req) {
        Ok(headers) => headers,
        Err(err) => {
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(err));
        }
    };

    HttpResponse::Ok().json(ApiResponse::success(favorites.favorites_for(actor_id)))
}
