pub mod adapters;
pub mod config;
pub mod controller;
pub mod error;
pub mod ui;

pub use controller::{AppController, AppEvent, CatalogView, Flow};
