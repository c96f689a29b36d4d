pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod hydrant;
pub mod overpass;
pub mod routes;
pub mod services;
pub mod state;
pub mod static_assets;
pub mod view;

#[cfg(test)]
pub mod test_support;
