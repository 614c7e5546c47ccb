#![forbid(unsafe_code)]

pub mod conditions;
pub mod config;
pub mod id;
pub mod intake;
pub mod models;
pub mod stats;
pub mod storage;
pub mod store;
pub mod web;

pub use config::Config;
