//! Embedded browser dashboard

use crate::AppState;
use axum::{extract::State, response::Html};

const DASHBOARD_TEMPLATE: &str = include_str!("../../assets/dashboard.html");
const POLL_PLACEHOLDER: &str = "{{POLL_INTERVAL_MS}}";

pub async fn handle_dashboard(State(state): State<AppState>) -> Html<String> {
    Html(render(state.dashboard.poll_interval_seconds))
}

fn render(poll_interval_seconds: u64) -> String {
    let millis = poll_interval_seconds.saturating_mul(1000);
    DASHBOARD_TEMPLATE.replace(POLL_PLACEHOLDER, &millis.to_string())
}
