pub mod api;
pub mod carriers;
pub mod config;
pub mod humanize;
pub mod money;
pub mod observability;
pub mod problem;
