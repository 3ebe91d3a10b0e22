//! Job-board web gateway: cookie-backed sessions, the login flow, and the
//! route gate that protects role-scoped pages.

pub mod api;
pub mod cancel;
pub mod config;
pub mod credentials;
pub mod gate;
pub mod login;
pub mod navigation;
pub mod paths;
pub mod routes;
pub mod session;
pub mod state;
