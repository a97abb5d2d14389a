// src/lib.rs

use services::metric_store::MetricStore;

#[derive(Clone)]
pub struct AppState {
    pub store: MetricStore,
}

pub mod entities {
    pub mod prelude;
    pub mod sea_orm_active_enums;
    pub mod metric_identities;
    pub mod metric_values;
}

pub mod services {
    pub mod cryptowatch;
    pub mod metric_store;
    pub mod metric_ranking;
    pub mod metric_poller;
}

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod routes;
