use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hydrant-map",
    version,
    about = "Fire hydrant map viewer backed by OpenStreetMap"
)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    /// Directory holding the built front-end; a placeholder page is served otherwise.
    #[arg(long)]
    pub static_root: Option<PathBuf>,
    /// Start without fetching hydrants; the first reload happens on request.
    #[arg(long, default_value_t = false)]
    pub skip_initial_load: bool,
}
