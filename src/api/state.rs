//! Application state shared by request handlers

use std::sync::Arc;

use crate::config::AppConfig;
use crate::infrastructure::services::IncidentAnalysisService;

#[derive(Clone)]
pub struct AppState {
    pub analysis_service: Arc<IncidentAnalysisService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(analysis_service: IncidentAnalysisService, config: AppConfig) -> Self {
        Self {
            analysis_service: Arc::new(analysis_service),
            config: Arc::new(config),
        }
    }
}
