pub mod api;
pub mod argspec;
pub mod backends;
pub mod error;
pub mod executor;
pub mod generator;
pub mod model;
pub mod paths;
pub mod service;
pub mod settings;
pub mod state;
pub mod templates;
