//! Core recommendation functionality

pub mod recommender;

pub use recommender::{CatalogStatus, Recommender};
