use std::collections::HashSet;

use chrono::Utc;

use super::{Collection, JsonStore, StoreError};
use crate::models::{
    Booking, BookingEdit, BookingStatus, NewBooking, Review, ScheduleEntry, Service, ServiceInput,
};

/// Millisecond timestamp id. Bumped past ids already present in the
/// collection that was just read; writers racing on separate reads can still
/// collide.
pub fn generate_id<'a>(taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();
    let mut candidate = Utc::now().timestamp_millis();
    while taken.contains(candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

// ── Services ──

pub async fn list_services(store: &JsonStore) -> Vec<Service> {
    store.read(Collection::Services).await
}

pub async fn get_service(store: &JsonStore, id: &str) -> Option<Service> {
    list_services(store).await.into_iter().find(|s| s.id == id)
}

pub async fn create_service(
    store: &JsonStore,
    name: String,
    description: Option<String>,
    price: f64,
) -> Result<Service, StoreError> {
    let mut services: Vec<Service> = store.load(Collection::Services).await?;
    let service = Service {
        id: generate_id(services.iter().map(|s| s.id.as_str())),
        name,
        description,
        price,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    services.push(service.clone());
    store.write(Collection::Services, &services).await?;
    Ok(service)
}

pub async fn update_service(
    store: &JsonStore,
    id: &str,
    patch: &ServiceInput,
) -> Result<Option<Service>, StoreError> {
    let mut services: Vec<Service> = store.load(Collection::Services).await?;
    let Some(service) = services.iter_mut().find(|s| s.id == id) else {
        return Ok(None);
    };

    if let Some(name) = patch.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        service.name = name.to_string();
    }
    if let Some(description) = &patch.description {
        service.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
    }
    if let Some(price) = patch.price {
        service.price = price;
    }
    service.updated_at = Some(Utc::now());

    let updated = service.clone();
    store.write(Collection::Services, &services).await?;
    Ok(Some(updated))
}

/// Filter-based delete; an unknown id still rewrites the file and succeeds.
pub async fn delete_service(store: &JsonStore, id: &str) -> Result<bool, StoreError> {
    let services: Vec<Service> = store.load(Collection::Services).await?;
    let before = services.len();
    let remaining: Vec<Service> = services.into_iter().filter(|s| s.id != id).collect();
    store.write(Collection::Services, &remaining).await?;
    Ok(remaining.len() < before)
}

// ── Bookings ──

pub async fn list_bookings(store: &JsonStore) -> Vec<Booking> {
    store.read(Collection::Bookings).await
}

pub async fn get_booking(store: &JsonStore, id: &str) -> Option<Booking> {
    list_bookings(store).await.into_iter().find(|b| b.id == id)
}

pub async fn bookings_for_user(store: &JsonStore, user_id: &str) -> Vec<Booking> {
    list_bookings(store)
        .await
        .into_iter()
        .filter(|b| b.user_id.as_deref() == Some(user_id))
        .collect()
}

pub async fn insert_booking(store: &JsonStore, new: NewBooking) -> Result<Booking, StoreError> {
    let mut bookings: Vec<Booking> = store.load(Collection::Bookings).await?;
    let booking = Booking {
        id: generate_id(bookings.iter().map(|b| b.id.as_str())),
        name: new.name,
        phone: new.phone,
        service_id: new.service_id,
        date: new.date,
        time: new.time,
        comment: new.comment,
        user_id: new.user_id,
        username: new.username,
        status: BookingStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
        updated_by: None,
    };
    bookings.push(booking.clone());
    store.write(Collection::Bookings, &bookings).await?;
    Ok(booking)
}

pub async fn update_booking(
    store: &JsonStore,
    id: &str,
    edit: &BookingEdit,
    updated_by: &str,
) -> Result<Option<Booking>, StoreError> {
    let mut bookings: Vec<Booking> = store.load(Collection::Bookings).await?;
    let Some(booking) = bookings.iter_mut().find(|b| b.id == id) else {
        return Ok(None);
    };

    booking.name = edit.name.clone();
    booking.phone = edit.phone.clone();
    booking.date = edit.date.clone();
    booking.time = edit.time.clone();
    booking.comment = edit.comment.clone();
    booking.updated_at = Some(Utc::now());
    booking.updated_by = Some(updated_by.to_string());

    let updated = booking.clone();
    store.write(Collection::Bookings, &bookings).await?;
    Ok(Some(updated))
}

// ── Schedule ──

pub async fn list_schedule(store: &JsonStore) -> Vec<ScheduleEntry> {
    store.read(Collection::Schedule).await
}

pub async fn available_times(store: &JsonStore, date: &str) -> Vec<String> {
    list_schedule(store)
        .await
        .into_iter()
        .find(|s| s.date == date)
        .map(|s| s.times)
        .unwrap_or_default()
}

pub async fn upsert_schedule(store: &JsonStore, entry: ScheduleEntry) -> Result<(), StoreError> {
    let mut schedule: Vec<ScheduleEntry> = store.load(Collection::Schedule).await?;
    match schedule.iter_mut().find(|s| s.date == entry.date) {
        Some(existing) => existing.times = entry.times,
        None => schedule.push(entry),
    }
    store.write(Collection::Schedule, &schedule).await
}

pub async fn delete_schedule(store: &JsonStore, date: &str) -> Result<bool, StoreError> {
    let schedule: Vec<ScheduleEntry> = store.load(Collection::Schedule).await?;
    let before = schedule.len();
    let remaining: Vec<ScheduleEntry> = schedule.into_iter().filter(|s| s.date != date).collect();
    store.write(Collection::Schedule, &remaining).await?;
    Ok(remaining.len() < before)
}

// ── Reviews ──

/// Newest first.
pub async fn list_reviews(store: &JsonStore) -> Vec<Review> {
    let mut reviews: Vec<Review> = store.read(Collection::Reviews).await;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reviews
}

pub async fn create_review(
    store: &JsonStore,
    author: Option<String>,
    rating: u8,
    text: String,
) -> Result<Review, StoreError> {
    let mut reviews: Vec<Review> = store.load(Collection::Reviews).await?;
    let review = Review {
        id: generate_id(reviews.iter().map(|r| r.id.as_str())),
        author,
        rating,
        text,
        created_at: Utc::now(),
        updated_at: None,
    };
    reviews.push(review.clone());
    store.write(Collection::Reviews, &reviews).await?;
    Ok(review)
}

pub async fn update_review(
    store: &JsonStore,
    id: &str,
    author: Option<String>,
    rating: Option<u8>,
    text: Option<String>,
) -> Result<Option<Review>, StoreError> {
    let mut reviews: Vec<Review> = store.load(Collection::Reviews).await?;
    let Some(review) = reviews.iter_mut().find(|r| r.id == id) else {
        return Ok(None);
    };

    if author.is_some() {
        review.author = author;
    }
    if let Some(rating) = rating {
        review.rating = rating;
    }
    if let Some(text) = text {
        review.text = text;
    }
    review.updated_at = Some(Utc::now());

    let updated = review.clone();
    store.write(Collection::Reviews, &reviews).await?;
    Ok(Some(updated))
}

pub async fn delete_review(store: &JsonStore, id: &str) -> Result<bool, StoreError> {
    let reviews: Vec<Review> = store.load(Collection::Reviews).await?;
    let before = reviews.len();
    let remaining: Vec<Review> = reviews.into_iter().filter(|r| r.id != id).collect();
    store.write(Collection::Reviews, &remaining).await?;
    Ok(remaining.len() < before)
}
