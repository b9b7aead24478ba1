// File: ./src/client/mod.rs
pub mod core;
pub mod dto;
pub mod error;
pub mod middleware;

pub use crate::client::core::NeisClient;
pub use crate::client::error::FetchError;

use crate::config::Config;
use crate::model::{MealMenu, School, TimetablePeriod};
use chrono::NaiveDate;
use std::future::Future;

/// The three outbound queries the coordinator depends on.
///
/// `NeisClient` is the production implementation; tests substitute
/// in-memory sources.
pub trait ScheduleSource: Send + Sync + 'static {
    fn search_school(&self, name: &str) -> impl Future<Output = Result<School, FetchError>> + Send;

    fn fetch_meal_list(
        &self,
        config: &Config,
        date: NaiveDate,
    ) -> impl Future<Output = Result<MealMenu, FetchError>> + Send;

    fn fetch_timetable(
        &self,
        config: &Config,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<TimetablePeriod>, FetchError>> + Send;
}

impl ScheduleSource for NeisClient {
    async fn search_school(&self, name: &str) -> Result<School, FetchError> {
        NeisClient::search_school(self, name).await
    }

    async fn fetch_meal_list(&self, config: &Config, date: NaiveDate) -> Result<MealMenu, FetchError> {
        NeisClient::fetch_meal_list(self, config, date).await
    }

    async fn fetch_timetable(
        &self,
        config: &Config,
        date: NaiveDate,
    ) -> Result<Vec<TimetablePeriod>, FetchError> {
        NeisClient::fetch_timetable(self, config, date).await
    }
}
