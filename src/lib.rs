pub mod admin;
pub mod config;
pub mod directory;
pub mod entropy;
pub mod environment;
pub mod errors;
pub mod geo;
pub mod location;
pub mod normalization;
pub mod persistence;
pub mod seed;
pub mod spot;
pub mod store;
pub mod view;
