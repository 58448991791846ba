pub mod config;
pub mod database;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod session;
pub mod state;
pub mod utils;
