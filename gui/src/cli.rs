use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Cli {
    /// Path to the TOML config file holding the API credential
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Config profile to read the credential from
    #[arg(short, long, default_value = engine::config::DEFAULT_PROFILE)]
    pub profile: String,

    /// RON file with color overrides for the UI
    #[arg(short, long)]
    pub style: Option<PathBuf>,
}
