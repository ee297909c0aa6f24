//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default public `PlantUML` server URL.
pub const DEFAULT_SERVER_URL: &str = "http://plantuml.com/plantuml/";

/// Default HTTP timeout for render requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
