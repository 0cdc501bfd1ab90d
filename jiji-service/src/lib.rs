//! Jiji Service - answers user queries over HTTP, backed by a PostgreSQL pool.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;
pub mod utils;
