pub mod hydrants;
pub mod settings;
