// ============================================================================
// API Gateway
// ============================================================================
//
// Single entry point in front of the data services:
// - fixed-credential login issuing ADMIN tokens
// - ADMIN token check on everything else
// - first-prefix-match forwarding with transparent error passthrough
//
// ============================================================================

pub mod middleware;
pub mod registry;
pub mod router;
pub mod service_client;

pub use registry::{Route, RouteRegistry};
pub use router::{create_router, GatewayState};
pub use service_client::ServiceClient;
