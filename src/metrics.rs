//! Request and submission counters exposed on `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::app::applications::Pathway;
use tracing::{info, warn};

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

pub const REQUESTS_TOTAL: &str = "roamsix_api_requests_total";
pub const CODE_CHECKS_TOTAL: &str = "roamsix_code_checks_total";
pub const APPLICATIONS_TOTAL: &str = "roamsix_applications_submitted_total";
pub const INTERESTS_TOTAL: &str = "roamsix_interests_submitted_total";

/// Install the Prometheus recorder once. Later calls are no-ops.
pub fn init_metrics() {
    HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            describe();
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    });
}

fn describe() {
    ::metrics::describe_counter!(REQUESTS_TOTAL, "API requests by route and outcome");
    ::metrics::describe_counter!(CODE_CHECKS_TOTAL, "Invitation code checks by result");
    ::metrics::describe_counter!(APPLICATIONS_TOTAL, "Applications accepted by Airtable, by pathway");
    ::metrics::describe_counter!(INTERESTS_TOTAL, "Alternative interest submissions accepted");
}

/// Prometheus text exposition, empty when the recorder isn't installed.
pub fn render() -> String {
    HANDLE
        .get()
        .and_then(|h| h.as_ref())
        .map(|h| h.render())
        .unwrap_or_default()
}

pub fn record_request(route: &str, status: u16) {
    let outcome = if status < 400 {
        "ok"
    } else if status < 500 {
        "client_error"
    } else {
        "server_error"
    };
    ::metrics::counter!(REQUESTS_TOTAL, "route" => route.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_code_check(valid: bool) {
    let result = if valid { "valid" } else { "invalid" };
    ::metrics::counter!(CODE_CHECKS_TOTAL, "result" => result).increment(1);
}

/// Known pathways keep their name; anything else shares `other`.
pub fn pathway_label(pathway: &str) -> &'static str {
    pathway.parse::<Pathway>().map_or("other", Pathway::as_str)
}

pub fn record_application(pathway: &'static str) {
    ::metrics::counter!(APPLICATIONS_TOTAL, "pathway" => pathway).increment(1);
}

pub fn record_interests() {
    ::metrics::counter!(INTERESTS_TOTAL).increment(1);
}
