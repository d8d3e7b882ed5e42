//! HTTP-level integration tests, run against in-memory repositories.

mod helpers;

mod auth_test;
mod authorization_test;
mod reset_test;
mod session_test;
mod user_test;
