use clap::Parser;
use comicgen::gemini::GeminiClient;
use comicgen::generator::ComicGenerator;
use tracing::error;

#[tokio::main(flavor = "multi_thread", worker_threads = 32)]
async fn main() {
    let cli = comicgen::cli::CliOptions::parse();

    if comicgen::config::setup_logging(cli.debug).is_err() {
        return;
    }

    let api_key = cli.api_key.clone().unwrap_or_default();
    let client = match GeminiClient::new(api_key) {
        Ok(client) => client,
        Err(err) => {
            error!("{}", err);
            error!(
                "Get an API key from https://aistudio.google.com/app/apikey and set GEMINI_API_KEY."
            );
            return;
        }
    };

    let generator = ComicGenerator::new(client, !cli.no_images);

    if let Err(err) = comicgen::web::setup_server(&cli.listen_address, cli.port, generator).await {
        error!("Application error: {}", err);
    }
}
