//! User Registry API Library
//!
//! Local user records joined with live data from two optional external
//! providers (tax records and payments). Provider failures never fail a
//! request: each one degrades to an empty list.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Enrichment logic, models and errors.
//! - `auth`: `X-API-KEY` gate.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema bootstrap.
//! - `db_storage`: User record stores (Postgres, in-memory).
//! - `docs`: OpenAPI document and Swagger UI.
//! - `enrichment`: Validation and user aggregation.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Records and request/response types.
//! - `routes`: Router assembly.
//! - `services`: External providers and the enrichment fan-out.

pub mod api;
pub mod core;

pub mod auth;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod docs;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
