pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::store::ApplicationStore;
use crate::services::{
    application_service::ApplicationService, report_service::ReportService,
    transition_service::TransitionService,
};

#[derive(Clone)]
pub struct AppState {
    pub application_service: ApplicationService,
    pub transition_service: TransitionService,
    pub report_service: ReportService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn ApplicationStore>, jwt_secret: &str) -> Self {
        Self {
            application_service: ApplicationService::new(store.clone()),
            transition_service: TransitionService::new(store.clone()),
            report_service: ReportService::new(store),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
