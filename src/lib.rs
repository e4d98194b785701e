//! PDF upload pathway for the document chat product: an axum endpoint that
//! validates and stores PDF batches, and a client picker that submits them.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod tests;
