use crate::service::ActivityService;
use crate::validation::ActivityLimits;

#[derive(Clone)]
pub struct AppState {
    pub service: ActivityService,
    pub limits: ActivityLimits,
}

impl AppState {
    pub fn new(service: ActivityService, limits: ActivityLimits) -> Self {
        Self { service, limits }
    }
}
