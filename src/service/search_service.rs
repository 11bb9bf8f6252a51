// service/search_service.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::{
    db::{db::DBClient, profiledb::ProfileExt},
    models::profilemodels::WorkerProfile,
    service::error::ServiceError,
};

// Upper bound on the profile snapshot pulled for one search
const SNAPSHOT_LIMIT: i64 = 1000;

/// One worker discovery query. Built fresh per search, never mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct WorkerSearchQuery {
    pub candidate_days: Vec<NaiveDate>,
    pub hour: u32,
    pub minute: u32,
    pub services: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub keywords: Option<String>,
}

/// Keeps workers whose working hours cover the requested time and who are
/// not booked out on any of the candidate days.
///
/// A single conflicting day disqualifies the worker for the whole query. An
/// empty `candidate_days` list means no day constraint, so every worker
/// passes the day check.
pub fn filter_by_availability(
    workers: &[WorkerProfile],
    candidate_days: &[NaiveDate],
    hour: u32,
    minute: u32,
) -> Vec<WorkerProfile> {
    let requested = match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        // An unrepresentable time of day matches nobody
        None => return Vec::new(),
    };

    workers
        .iter()
        .filter(|worker| {
            worker.working_hours_start <= requested && requested <= worker.working_hours_end
        })
        .filter(|worker| {
            candidate_days
                .iter()
                .all(|day| !worker.unavailable_dates.contains(day))
        })
        .cloned()
        .collect()
}

/// Keeps workers offering every requested service. Labels are matched
/// exactly, case-sensitive. An empty request is no constraint.
pub fn filter_by_services(
    workers: &[WorkerProfile],
    requested: &[String],
) -> Vec<WorkerProfile> {
    workers
        .iter()
        .filter(|worker| requested.iter().all(|service| worker.tags.contains(service)))
        .cloned()
        .collect()
}

/// Keeps workers whose hourly rate falls inside [min, max]. Workers without
/// a published rate are excluded.
pub fn filter_by_price_range(
    workers: &[WorkerProfile],
    min: f64,
    max: f64,
) -> Vec<WorkerProfile> {
    workers
        .iter()
        .filter(|worker| match worker.hourly_rate {
            Some(rate) => min <= rate && rate <= max,
            None => false,
        })
        .cloned()
        .collect()
}

/// Orders by rating, highest first. The sort is stable so equally rated
/// workers keep their input order and results stay deterministic.
pub fn sort_by_rating(mut workers: Vec<WorkerProfile>) -> Vec<WorkerProfile> {
    workers.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    workers
}

/// Keeps workers matching every word of a free-text query against field of
/// work, description, display name and tags, ranked by rating.
pub fn search_by_keywords(workers: &[WorkerProfile], query: &str) -> Vec<WorkerProfile> {
    let words: Vec<String> = query
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect();

    if words.is_empty() {
        return sort_by_rating(workers.to_vec());
    }

    let matched = workers
        .iter()
        .filter(|worker| {
            words.iter().all(|word| {
                worker.field_of_work.to_lowercase().contains(word)
                    || worker.description.to_lowercase().contains(word)
                    || worker.display_name.to_lowercase().contains(word)
                    || worker.tags.iter().any(|tag| tag.to_lowercase().contains(word))
            })
        })
        .cloned()
        .collect();

    sort_by_rating(matched)
}

/// The discovery pipeline: availability filter, then service filter over the
/// survivors, then optional price/keyword narrowing, ranking last. No match
/// is an empty result, not an error.
pub fn search(workers: &[WorkerProfile], query: &WorkerSearchQuery) -> Vec<WorkerProfile> {
    let mut survivors =
        filter_by_availability(workers, &query.candidate_days, query.hour, query.minute);
    survivors = filter_by_services(&survivors, &query.services);

    if query.min_price.is_some() || query.max_price.is_some() {
        survivors = filter_by_price_range(
            &survivors,
            query.min_price.unwrap_or(0.0),
            query.max_price.unwrap_or(f64::MAX),
        );
    }

    if let Some(keywords) = query.keywords.as_deref() {
        if !keywords.trim().is_empty() {
            survivors = search_by_keywords(&survivors, keywords);
        }
    }

    sort_by_rating(survivors)
}

#[derive(Debug, Clone)]
pub struct SearchService {
    db_client: Arc<DBClient>,
}

impl SearchService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Fetches one snapshot of the worker collection and runs the pure
    /// pipeline on it, so the filters never observe concurrent mutation.
    pub async fn search_workers(
        &self,
        query: &WorkerSearchQuery,
    ) -> Result<Vec<WorkerProfile>, ServiceError> {
        let snapshot = self
            .db_client
            .get_worker_profiles(SNAPSHOT_LIMIT, 0)
            .await?;

        let results = search(&snapshot, query);
        tracing::debug!(
            "worker search matched {} of {} profiles",
            results.len(),
            snapshot.len()
        );

        Ok(results)
    }
}
