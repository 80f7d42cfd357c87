//! Listing engine: derives every view the directory renders (ratings,
//! category buckets, featured/new selections, filtered browse sets) from a
//! snapshot of raw collections. All functions are pure and total; callers
//! pass the current time explicitly.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Business, BusinessListing, CategoryGroup, Event, Photo, Review};

/// Bucket key for businesses without a category.
pub const GENERAL_CATEGORY: &str = "general";

/// Card image for businesses with an empty gallery.
pub const PLACEHOLDER_PHOTO_URL: &str =
    "https://images.unsplash.com/photo-1554995207-c18c203602cb?w=400";

/// Below this many manually-featured businesses, the featured view is
/// filled by recency instead.
const CURATED_MINIMUM: usize = 6;

/// Derived review aggregate; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub rating: f64,
    pub reviews_count: i64,
}

/// Mean rating and count over the reviews matching `business_id`.
/// Empty set yields `{0.0, 0}`.
pub fn compute_rating(business_id: Uuid, reviews: &[Review]) -> RatingSummary {
    let ratings: Vec<i32> = reviews
        .iter()
        .filter(|review| review.business_id == business_id)
        .map(|review| review.rating)
        .collect();

    if ratings.is_empty() {
        return RatingSummary {
            rating: 0.0,
            reviews_count: 0,
        };
    }

    let sum: i32 = ratings.iter().sum();
    RatingSummary {
        rating: f64::from(sum) / ratings.len() as f64,
        reviews_count: ratings.len() as i64,
    }
}

/// Display category, falling back to the literal `"general"` bucket.
pub fn resolve_category(business: &Business) -> &str {
    match business.category.as_deref() {
        Some(category) if !category.trim().is_empty() => category,
        _ => GENERAL_CATEGORY,
    }
}

/// Gallery order: `order_index` ascending, unindexed photos after all
/// indexed ones, stable by arrival order among equals.
pub fn sort_photos(mut photos: Vec<Photo>) -> Vec<Photo> {
    photos.sort_by_key(|photo| (photo.order_index.is_none(), photo.order_index));
    photos
}

/// Cover image for a sorted gallery; placeholder when empty.
pub fn resolve_cover_url(photos: &[Photo]) -> String {
    photos
        .first()
        .map(|photo| photo.url.clone())
        .unwrap_or_else(|| PLACEHOLDER_PHOTO_URL.to_string())
}

/// Pairs every business with its derived rating and ordered gallery.
/// The single place presentation-bound annotations are produced.
pub fn annotate(
    businesses: Vec<Business>,
    reviews: &[Review],
    photos: Vec<Photo>,
) -> Vec<BusinessListing> {
    let mut galleries: HashMap<Uuid, Vec<Photo>> = HashMap::new();
    for photo in photos {
        galleries.entry(photo.business_id).or_default().push(photo);
    }

    businesses
        .into_iter()
        .map(|business| {
            let summary = compute_rating(business.id, reviews);
            let gallery = sort_photos(galleries.remove(&business.id).unwrap_or_default());
            let cover_url = resolve_cover_url(&gallery);
            BusinessListing {
                business,
                rating: summary.rating,
                reviews_count: summary.reviews_count,
                cover_url,
                photos: gallery,
            }
        })
        .collect()
}

/// Partitions listings into category buckets. Bucket order is first
/// appearance; listing order within a bucket is input order. No sorting.
pub fn group_by_category(listings: &[BusinessListing]) -> Vec<CategoryGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for listing in listings {
        let key = resolve_category(&listing.business).to_string();
        match positions.get(&key) {
            Some(&index) => groups[index].businesses.push(listing.clone()),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(CategoryGroup {
                    category: key,
                    businesses: vec![listing.clone()],
                });
            }
        }
    }

    groups
}

/// All manually-featured businesses when at least six exist; otherwise the
/// six oldest by `created_at`. Ties stable by input order.
pub fn compute_featured(listings: &[BusinessListing]) -> Vec<BusinessListing> {
    let flagged: Vec<BusinessListing> = listings
        .iter()
        .filter(|listing| listing.business.featured)
        .cloned()
        .collect();

    if flagged.len() >= CURATED_MINIMUM {
        return flagged;
    }

    let mut oldest = listings.to_vec();
    oldest.sort_by_key(|listing| listing.business.created_at);
    oldest.truncate(CURATED_MINIMUM);
    oldest
}

/// The six most recent listings by `created_at`, ties stable by input order.
pub fn compute_new_arrivals(listings: &[BusinessListing]) -> Vec<BusinessListing> {
    let mut recent = listings.to_vec();
    recent.sort_by(|a, b| b.business.created_at.cmp(&a.business.created_at));
    recent.truncate(CURATED_MINIMUM);
    recent
}

/// Case-insensitive substring match over name, category and location.
/// A blank term is the identity.
pub fn search(listings: &[BusinessListing], term: &str) -> Vec<BusinessListing> {
    let term = term.trim();
    if term.is_empty() {
        return listings.to_vec();
    }

    let needle = term.to_lowercase();
    listings
        .iter()
        .filter(|listing| {
            let business = &listing.business;
            business.name.to_lowercase().contains(&needle)
                || resolve_category(business).to_lowercase().contains(&needle)
                || business.location.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Browse ordering criterion. Unrecognized keys parse to `None`, which
/// leaves the input order untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    Reviews,
    Name,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "rating" => Some(SortKey::Rating),
            "reviews" => Some(SortKey::Reviews),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }
}

/// Filter state for one browse request.
#[derive(Debug, Clone, Copy)]
pub struct BrowseOptions {
    pub min_rating: f64,
    pub open_now: bool,
    /// Local hour-of-day the open-now check runs against.
    pub current_hour: u32,
    pub sort: Option<SortKey>,
}

/// Whether the business's operating window contains `hour`. A `{0, 24}`
/// window is always open; a missing window fails the check.
pub fn is_open_at(business: &Business, hour: u32) -> bool {
    match business.hours_window() {
        Some((0, 24)) => true,
        Some((open, close)) => {
            let hour = hour as i32;
            hour >= open && hour < close
        }
        None => false,
    }
}

/// Narrows a bucket by open-now, then minimum rating, then sorts. The
/// step order is fixed; sort is always last. Input is never mutated.
pub fn filter_and_sort(bucket: &[BusinessListing], opts: &BrowseOptions) -> Vec<BusinessListing> {
    let mut items: Vec<BusinessListing> = bucket
        .iter()
        .filter(|listing| !opts.open_now || is_open_at(&listing.business, opts.current_hour))
        .filter(|listing| opts.min_rating <= 0.0 || listing.rating >= opts.min_rating)
        .cloned()
        .collect();

    match opts.sort {
        Some(SortKey::Rating) => items.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        Some(SortKey::Reviews) => items.sort_by(|a, b| b.reviews_count.cmp(&a.reviews_count)),
        Some(SortKey::Name) => items.sort_by(|a, b| {
            a.business
                .name
                .to_lowercase()
                .cmp(&b.business.name.to_lowercase())
        }),
        None => {}
    }

    items
}

/// Fresh favorite set with `business_id` membership flipped.
pub fn toggle_favorite(favorites: &HashSet<Uuid>, business_id: Uuid) -> HashSet<Uuid> {
    let mut next = favorites.clone();
    if !next.remove(&business_id) {
        next.insert(business_id);
    }
    next
}

/// Display window for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    Upcoming,
    Past,
    All,
}

impl EventWindow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "upcoming" => Some(EventWindow::Upcoming),
            "past" => Some(EventWindow::Past),
            "all" => Some(EventWindow::All),
            _ => None,
        }
    }
}

/// Events whose start falls in the requested window relative to `now`.
/// Input order is preserved.
pub fn filter_events(events: &[Event], window: EventWindow, now: DateTime<Utc>) -> Vec<Event> {
    events
        .iter()
        .filter(|event| match window {
            EventWindow::Upcoming => event.starts_at >= now,
            EventWindow::Past => event.starts_at < now,
            EventWindow::All => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn business(name: &str, category: Option<&str>, age_days: i64, featured: bool) -> Business {
        Business {
            id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.map(str::to_string),
            location: "Downtown".to_string(),
            latitude: None,
            longitude: None,
            description: None,
            hours_text: None,
            hours_open: Some(9),
            hours_close: Some(18),
            phone: None,
            website: None,
            tour_url: None,
            featured,
            created_at: base_time() - Duration::days(age_days),
            updated_at: base_time(),
        }
    }

    fn listing(business: Business, rating: f64, reviews_count: i64) -> BusinessListing {
        BusinessListing {
            business,
            rating,
            reviews_count,
            cover_url: PLACEHOLDER_PHOTO_URL.to_string(),
            photos: Vec::new(),
        }
    }

    fn review(business_id: Uuid, rating: i32) -> Review {
        Review {
            id: Uuid::new_v4(),
            business_id,
            reviewer_id: Uuid::new_v4(),
            rating,
            comment: None,
            created_at: base_time(),
            updated_at: base_time(),
        }
    }

    fn photo(business_id: Uuid, url: &str, order_index: Option<i32>) -> Photo {
        Photo {
            id: Uuid::new_v4(),
            business_id,
            url: url.to_string(),
            storage_path: format!("photos/{url}"),
            order_index,
            created_at: base_time(),
        }
    }

    #[test]
    fn rating_is_arithmetic_mean() {
        let id = Uuid::new_v4();
        let reviews = vec![review(id, 4), review(id, 5), review(Uuid::new_v4(), 1)];

        let summary = compute_rating(id, &reviews);
        assert_eq!(summary.rating, 4.5);
        assert_eq!(summary.reviews_count, 2);
    }

    #[test]
    fn rating_of_empty_review_set_is_zero() {
        let summary = compute_rating(Uuid::new_v4(), &[]);
        assert_eq!(summary.rating, 0.0);
        assert_eq!(summary.reviews_count, 0);
    }

    #[test]
    fn rating_is_idempotent() {
        let id = Uuid::new_v4();
        let reviews = vec![review(id, 3), review(id, 4), review(id, 4)];

        assert_eq!(compute_rating(id, &reviews), compute_rating(id, &reviews));
    }

    #[test]
    fn grouping_is_a_partition_with_general_fallback() {
        let listings = vec![
            listing(business("Taco Loco", Some("mexican"), 3, false), 4.8, 12),
            listing(business("No Category", None, 2, false), 0.0, 0),
            listing(business("Blank Category", Some("  "), 1, false), 0.0, 0),
            listing(business("El Patio", Some("mexican"), 0, false), 4.1, 5),
        ];

        let groups = group_by_category(&listings);
        let total: usize = groups.iter().map(|g| g.businesses.len()).sum();
        assert_eq!(total, listings.len());

        assert_eq!(groups[0].category, "mexican");
        assert_eq!(groups[0].businesses.len(), 2);
        assert_eq!(groups[0].businesses[0].business.name, "Taco Loco");
        assert_eq!(groups[1].category, GENERAL_CATEGORY);
        assert_eq!(groups[1].businesses.len(), 2);
    }

    #[test]
    fn featured_returns_flagged_set_when_six_or_more() {
        let listings: Vec<BusinessListing> = (0..8)
            .map(|i| listing(business(&format!("Biz {i}"), None, i, i < 6), 0.0, 0))
            .collect();

        let featured = compute_featured(&listings);
        assert_eq!(featured.len(), 6);
        assert!(featured.iter().all(|l| l.business.featured));
    }

    #[test]
    fn featured_falls_back_to_oldest_when_curation_is_thin() {
        // Only 2 of 10 flagged: the flags are ignored in favor of recency.
        let listings: Vec<BusinessListing> = (0..10)
            .map(|i| listing(business(&format!("Biz {i}"), None, i, i < 2), 0.0, 0))
            .collect();

        let featured = compute_featured(&listings);
        assert_eq!(featured.len(), 6);
        // age_days = i, so the oldest are the highest indices.
        let names: Vec<&str> = featured.iter().map(|l| l.business.name.as_str()).collect();
        assert_eq!(names, vec!["Biz 9", "Biz 8", "Biz 7", "Biz 6", "Biz 5", "Biz 4"]);
    }

    #[test]
    fn featured_ties_are_stable_by_input_order() {
        let listings: Vec<BusinessListing> = (0..8)
            .map(|i| listing(business(&format!("Biz {i}"), None, 5, false), 0.0, 0))
            .collect();

        let featured = compute_featured(&listings);
        let names: Vec<&str> = featured.iter().map(|l| l.business.name.as_str()).collect();
        assert_eq!(names, vec!["Biz 0", "Biz 1", "Biz 2", "Biz 3", "Biz 4", "Biz 5"]);
    }

    #[test]
    fn new_arrivals_are_capped_and_descending() {
        let listings: Vec<BusinessListing> = (0..9)
            .map(|i| listing(business(&format!("Biz {i}"), None, i, false), 0.0, 0))
            .collect();

        let arrivals = compute_new_arrivals(&listings);
        assert_eq!(arrivals.len(), 6);
        for pair in arrivals.windows(2) {
            assert!(pair[0].business.created_at >= pair[1].business.created_at);
        }
        assert_eq!(arrivals[0].business.name, "Biz 0");
    }

    #[test]
    fn search_with_blank_term_is_identity() {
        let listings = vec![
            listing(business("Taco Loco", Some("mexican"), 1, false), 4.8, 12),
            listing(business("Modern Bistro", Some("fine dining"), 2, false), 4.6, 9),
        ];

        assert_eq!(search(&listings, "").len(), listings.len());
        assert_eq!(search(&listings, "   ").len(), listings.len());
    }

    #[test]
    fn search_is_case_insensitive_and_narrowing() {
        let listings = vec![
            listing(business("Taco Loco", Some("mexican"), 1, false), 4.8, 12),
            listing(business("Modern Bistro", Some("fine dining"), 2, false), 4.6, 9),
        ];

        let lower = search(&listings, "taco");
        let upper = search(&listings, "TACO");
        assert_eq!(lower.len(), 1);
        assert_eq!(lower.len(), upper.len());
        assert_eq!(lower[0].business.name, upper[0].business.name);
        assert!(search(&listings, "nowhere").is_empty());
    }

    #[test]
    fn search_matches_category_and_location() {
        let listings = vec![
            listing(business("Taco Loco", Some("mexican"), 1, false), 4.8, 12),
            listing(business("Modern Bistro", Some("fine dining"), 2, false), 4.6, 9),
        ];

        assert_eq!(search(&listings, "dining").len(), 1);
        assert_eq!(search(&listings, "downtown").len(), 2);
    }

    #[test]
    fn open_now_excludes_missing_hours() {
        let mut closed = business("No Hours", None, 1, false);
        closed.hours_open = None;
        closed.hours_close = None;

        let listings = vec![
            listing(closed, 4.0, 1),
            listing(business("Open Late", None, 2, false), 4.0, 1),
        ];
        let opts = BrowseOptions {
            min_rating: 0.0,
            open_now: true,
            current_hour: 10,
            sort: None,
        };

        let open = filter_and_sort(&listings, &opts);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].business.name, "Open Late");
    }

    #[test]
    fn round_the_clock_window_is_always_open() {
        let mut all_day = business("All Day Diner", None, 1, false);
        all_day.hours_open = Some(0);
        all_day.hours_close = Some(24);

        assert!(is_open_at(&all_day, 0));
        assert!(is_open_at(&all_day, 23));
    }

    #[test]
    fn open_window_is_half_open() {
        let shop = business("Nine To Six", None, 1, false);
        assert!(!is_open_at(&shop, 8));
        assert!(is_open_at(&shop, 9));
        assert!(is_open_at(&shop, 17));
        assert!(!is_open_at(&shop, 18));
    }

    #[test]
    fn min_rating_zero_is_a_no_op() {
        let listings = vec![
            listing(business("Low", None, 1, false), 1.0, 3),
            listing(business("High", None, 2, false), 4.9, 8),
        ];
        let opts = BrowseOptions {
            min_rating: 0.0,
            open_now: false,
            current_hour: 12,
            sort: None,
        };

        assert_eq!(filter_and_sort(&listings, &opts).len(), 2);
    }

    #[test]
    fn min_rating_threshold_filters_inclusively() {
        let listings = vec![
            listing(business("Low", None, 1, false), 3.9, 3),
            listing(business("Edge", None, 2, false), 4.0, 5),
            listing(business("High", None, 3, false), 4.9, 8),
        ];
        let opts = BrowseOptions {
            min_rating: 4.0,
            open_now: false,
            current_hour: 12,
            sort: None,
        };

        let kept = filter_and_sort(&listings, &opts);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|l| l.rating >= 4.0));
    }

    #[test]
    fn sort_keys_order_browse_results() {
        let listings = vec![
            listing(business("bravo", None, 1, false), 3.0, 50),
            listing(business("Alpha", None, 2, false), 5.0, 10),
            listing(business("charlie", None, 3, false), 4.0, 30),
        ];
        let opts = |sort| BrowseOptions {
            min_rating: 0.0,
            open_now: false,
            current_hour: 12,
            sort,
        };

        let by_rating = filter_and_sort(&listings, &opts(Some(SortKey::Rating)));
        assert_eq!(by_rating[0].business.name, "Alpha");
        assert_eq!(by_rating[2].business.name, "bravo");

        let by_reviews = filter_and_sort(&listings, &opts(Some(SortKey::Reviews)));
        assert_eq!(by_reviews[0].reviews_count, 50);

        let by_name = filter_and_sort(&listings, &opts(Some(SortKey::Name)));
        assert_eq!(by_name[0].business.name, "Alpha");
        assert_eq!(by_name[1].business.name, "bravo");

        // Unrecognized keys leave input order untouched.
        assert!(SortKey::parse("price").is_none());
        let untouched = filter_and_sort(&listings, &opts(None));
        assert_eq!(untouched[0].business.name, "bravo");
    }

    #[test]
    fn name_sort_is_idempotent() {
        let listings = vec![
            listing(business("bravo", None, 1, false), 3.0, 50),
            listing(business("Alpha", None, 2, false), 5.0, 10),
        ];
        let opts = BrowseOptions {
            min_rating: 0.0,
            open_now: false,
            current_hour: 12,
            sort: Some(SortKey::Name),
        };

        let once = filter_and_sort(&listings, &opts);
        let twice = filter_and_sort(&once, &opts);
        let names =
            |set: &[BusinessListing]| set.iter().map(|l| l.business.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn toggle_favorite_is_self_inverse() {
        let favorites: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let id = Uuid::new_v4();

        let added = toggle_favorite(&favorites, id);
        assert!(added.contains(&id));
        let removed = toggle_favorite(&added, id);
        assert_eq!(removed, favorites);
    }

    #[test]
    fn photos_sort_with_nulls_last_and_stable() {
        let id = Uuid::new_v4();
        let photos = vec![
            photo(id, "late-null", None),
            photo(id, "second", Some(1)),
            photo(id, "cover", Some(0)),
            photo(id, "later-null", None),
        ];

        let sorted = sort_photos(photos);
        let urls: Vec<&str> = sorted.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["cover", "second", "late-null", "later-null"]);
        assert_eq!(resolve_cover_url(&sorted), "cover");
    }

    #[test]
    fn empty_gallery_falls_back_to_placeholder() {
        assert_eq!(resolve_cover_url(&[]), PLACEHOLDER_PHOTO_URL);
    }

    #[test]
    fn annotate_pairs_every_business_once() {
        let a = business("Taco Loco", Some("mexican"), 1, false);
        let b = business("Modern Bistro", None, 2, false);
        let reviews = vec![review(a.id, 4), review(a.id, 5)];
        let photos = vec![photo(b.id, "bistro-front", Some(0))];

        let listings = annotate(vec![a.clone(), b.clone()], &reviews, photos);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].rating, 4.5);
        assert_eq!(listings[0].reviews_count, 2);
        assert_eq!(listings[0].cover_url, PLACEHOLDER_PHOTO_URL);
        assert_eq!(listings[1].rating, 0.0);
        assert_eq!(listings[1].cover_url, "bistro-front");
    }

    #[test]
    fn events_window_splits_on_now() {
        let now = base_time();
        let make = |offset_hours: i64| Event {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            title: "Jazz Night".to_string(),
            description: None,
            starts_at: now + Duration::hours(offset_hours),
            ends_at: None,
            recurrence: None,
            photo_url: None,
            created_at: now,
        };
        let events = vec![make(-2), make(0), make(3)];

        assert_eq!(filter_events(&events, EventWindow::Upcoming, now).len(), 2);
        assert_eq!(filter_events(&events, EventWindow::Past, now).len(), 1);
        assert_eq!(filter_events(&events, EventWindow::All, now).len(), 3);
    }

    #[test]
    fn event_end_defaults_to_one_hour() {
        let now = base_time();
        let open_ended = Event {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            title: "Cooking Class".to_string(),
            description: None,
            starts_at: now,
            ends_at: None,
            recurrence: None,
            photo_url: None,
            created_at: now,
        };

        assert_eq!(open_ended.effective_end(), now + Duration::hours(1));
    }
}
