pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod flash;
pub mod guards;
pub mod itinerary;
pub mod models;
pub mod queries;
pub mod routes;
pub mod state;
pub mod validation;
