// src/lib.rs

pub mod api;
pub mod config;
pub mod exchange;
pub mod logger;
pub mod models;
pub mod risk;
pub mod server;
pub mod utils;
