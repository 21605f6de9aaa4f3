// Application state for HTTP handlers
use crate::application::dashboard_app::DashboardApp;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardApp,
}
