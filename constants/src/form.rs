/// Path-planning strategies understood by the backend, in selector order.
pub const SEARCH_STRATEGIES: &[&str] = &["astar", "dfs", "bfs", "dijkstra"];

/// Shipping priority tokens understood by the backend, in selector order.
pub const SHIPPING_PRIORITIES: &[&str] = &["Standard", "NoRush", "Expedited"];

pub const MISSING_NAME_MESSAGE: &str = "[!] Error, missing name...";
pub const MISSING_LOCATIONS_MESSAGE: &str = "[!] Error, missing pickup and drop off location ...";
pub const MISSING_PACKAGE_NAME_MESSAGE: &str = "Please enter a package name";
