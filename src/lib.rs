pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

#[cfg(test)]
pub mod test_utils;
