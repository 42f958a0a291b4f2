use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose;
use clap::Parser;
use comicgen::gemini::GeminiClient;
use comicgen::generator::{ComicGenerator, format_comic_text};
use std::fs;
use std::path::PathBuf;

/// Generate a comic strip from a story without running the web service.
///
/// Minimal UX:
///   comic_demo story.txt
#[derive(Parser, Debug)]
#[command(name = "comic_demo")]
#[command(about = "Convert a story into comic strip panels from the command line")]
struct Args {
    /// Path to a text file containing the story; uses a built-in sample when omitted
    story_file: Option<PathBuf>,

    /// Gemini API key
    #[arg(required = true, long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: String,

    /// Maximum number of panels to request
    #[arg(long, default_value_t = 5)]
    max_panels: u32,

    /// Directory for per-panel PNGs (images are skipped entirely when unset)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

const SAMPLE_STORY: &str = "\
Once upon a time, there was a brave knight named Sir Arthur who embarked on a \
quest to save the kingdom from a fearsome dragon. The journey was long and \
treacherous, through dark forests and across raging rivers. After many days, \
Sir Arthur finally reached the mountain where the dragon lived. The dragon \
emerged with a mighty roar, but Sir Arthur discovered it was only angry \
because a thorn was stuck in its foot. He carefully removed the thorn, and \
the dragon promised to trouble the kingdom no more. Sir Arthur returned home \
a hero, having won not through violence, but through compassion.";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let story = match &args.story_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => SAMPLE_STORY.to_string(),
    };

    let client = GeminiClient::new(args.gemini_api_key)?;
    let generator = ComicGenerator::new(client, args.out_dir.is_some());

    let panels = generator.generate_comic(&story, args.max_panels).await?;
    println!("{}", format_comic_text(&panels));

    if let Some(out_dir) = &args.out_dir {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        let mut written = 0usize;
        for panel in &panels {
            let Some(data) = &panel.image_data else {
                continue;
            };
            let bytes = general_purpose::STANDARD
                .decode(data)
                .context("Failed to decode panel image data")?;
            let path = out_dir.join(format!("panel_{}.png", panel.panel_number));
            fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }
        eprintln!("Saved {} panel images to {}", written, out_dir.display());
    }

    Ok(())
}
