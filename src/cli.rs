//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "COMICGEN_DEBUG")]
    /// Enable debug logging. Env: COMICGEN_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "5000", env = "COMICGEN_PORT")]
    /// http listener, defaults to `5000`.
    /// Env: COMICGEN_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "COMICGEN_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: COMICGEN_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    /// Gemini API key used for text and image generation.
    /// Env: GEMINI_API_KEY
    pub api_key: Option<String>,

    #[clap(long, help = "Skip image generation and return text-only panels")]
    /// Disable per-panel image generation
    pub no_images: bool,
}
