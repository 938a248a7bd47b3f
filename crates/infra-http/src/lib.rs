// Contest Infrastructure - HTTP Adapter
// Implements: MetricsProvider over the Graph API

mod graph_provider;
mod payload;

pub use graph_provider::{extract_video_id, GraphMetricsProvider, DEFAULT_BASE_URL};
