pub mod annotation;
pub mod catalog;
pub mod models;
pub mod ports;
pub mod scoring;
pub mod services;
pub mod transformer;
