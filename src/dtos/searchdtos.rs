use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::profilemodels::WorkerProfile,
    service::search_service::WorkerSearchQuery,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SearchWorkersDto {
    #[serde(default)]
    pub candidate_days: Vec<NaiveDate>,

    #[validate(range(min = 0, max = 23, message = "Hour must be between 0 and 23"))]
    pub hour: u32,

    #[validate(range(min = 0, max = 59, message = "Minute must be between 0 and 59"))]
    pub minute: u32,

    #[serde(default)]
    pub services: Vec<String>,

    #[validate(range(min = 0.0, message = "Minimum price must be positive"))]
    pub min_price: Option<f64>,

    #[validate(range(min = 0.0, message = "Maximum price must be positive"))]
    pub max_price: Option<f64>,

    pub query: Option<String>,
}

impl SearchWorkersDto {
    pub fn into_query(self) -> WorkerSearchQuery {
        WorkerSearchQuery {
            candidate_days: self.candidate_days,
            hour: self.hour,
            minute: self.minute,
            services: self.services,
            min_price: self.min_price,
            max_price: self.max_price,
            keywords: self.query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultsDto {
    pub total: usize,
    pub workers: Vec<WorkerProfile>,
}
