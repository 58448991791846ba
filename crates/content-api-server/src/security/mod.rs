pub mod middleware;
pub mod path_filter;
pub mod rate_limit;
pub mod user_agent;

pub use rate_limit::RateLimiter;
