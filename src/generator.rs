//! Comic generation orchestration: prompt → text model → parser → images.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use tracing::{info, warn};

use crate::constants::{IMAGE_STYLE_PREFIX, PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH};
use crate::error::ComicgenError;
use crate::panel::Panel;
use crate::parser::parse_comic_response;
use crate::placeholder::render_placeholder;
use crate::prompt::build_comic_prompt;

/// Upstream generation capabilities the orchestrator depends on.
///
/// The real implementation is [`crate::gemini::GeminiClient`]; tests
/// substitute a scripted backend.
#[async_trait]
pub trait ComicBackend: Send + Sync {
    /// Generates free text from a prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String, ComicgenError>;
    /// Generates one image from a prompt, returning raw encoded bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ComicgenError>;
    /// Reports whether an API credential is configured.
    fn api_key_configured(&self) -> bool;
}

/// Batch outcome of an image acquisition pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageStats {
    /// Panels that received a generated image.
    pub generated: usize,
    /// Panels that fell back to a placeholder.
    pub placeholders: usize,
    /// Whether the image API refused the batch for billing reasons.
    pub billing_limited: bool,
}

/// Sequences prompt building, the text model call, response parsing, and
/// per-panel image acquisition. Constructed once at startup and injected
/// into the request handlers; holds no mutable state.
pub struct ComicGenerator<B> {
    backend: B,
    generate_images: bool,
}

impl<B: ComicBackend> ComicGenerator<B> {
    /// Creates a generator over a backend.
    pub fn new(backend: B, generate_images: bool) -> Self {
        Self {
            backend,
            generate_images,
        }
    }

    /// Reports whether the backend has a credential configured.
    pub fn api_key_configured(&self) -> bool {
        self.backend.api_key_configured()
    }

    /// Generates comic panels for a story.
    ///
    /// Makes exactly one text generation call. The panel count is whatever
    /// the model produced; `max_panels` only rides in the prompt and the
    /// result is deliberately not clipped to it.
    pub async fn generate_comic(
        &self,
        story: &str,
        max_panels: u32,
    ) -> Result<Vec<Panel>, ComicgenError> {
        let prompt = build_comic_prompt(story, max_panels);
        let reply = self.backend.generate_text(&prompt).await?;
        let mut panels = parse_comic_response(&reply);
        info!("Parsed {} panels from model reply", panels.len());

        if self.generate_images {
            let stats = self.acquire_images(&mut panels).await;
            info!(
                "Image acquisition: {} generated, {} placeholders",
                stats.generated, stats.placeholders
            );
        }

        Ok(panels)
    }

    /// Generates a comic and renders it as formatted text.
    pub async fn generate_comic_text(
        &self,
        story: &str,
        max_panels: u32,
    ) -> Result<String, ComicgenError> {
        let panels = self.generate_comic(story, max_panels).await?;
        Ok(format_comic_text(&panels))
    }

    /// Attaches an image to every panel, strictly sequentially.
    ///
    /// Each panel gets exactly one generation attempt; any failure falls
    /// back to a locally rendered placeholder for that panel only, so a
    /// broken image API never aborts the batch. The billing notice is
    /// surfaced once per batch, not once per panel.
    pub async fn acquire_images(&self, panels: &mut [Panel]) -> ImageStats {
        let mut stats = ImageStats::default();

        for panel in panels.iter_mut() {
            let enhanced_prompt = format!("{IMAGE_STYLE_PREFIX}{}", panel.image_prompt);
            match self.backend.generate_image(&enhanced_prompt).await {
                Ok(bytes) => {
                    panel.image_data = Some(general_purpose::STANDARD.encode(bytes));
                    stats.generated += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    if is_billing_error(&message) {
                        if !stats.billing_limited {
                            stats.billing_limited = true;
                            info!(
                                "Image API requires a billing account; \
                                 using placeholder images for this batch"
                            );
                        }
                    } else {
                        warn!(
                            "Failed to generate image for panel {}: {}",
                            panel.panel_number, message
                        );
                    }

                    match render_placeholder(panel, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT) {
                        Ok(png) => {
                            panel.image_data = Some(general_purpose::STANDARD.encode(png));
                        }
                        Err(render_err) => {
                            warn!(
                                "Failed to render placeholder for panel {}: {}",
                                panel.panel_number, render_err
                            );
                        }
                    }
                    stats.placeholders += 1;
                }
            }
        }

        stats
    }
}

/// Renders panels as a banner-framed text comic.
pub fn format_comic_text(panels: &[Panel]) -> String {
    let banner = "=".repeat(60);
    let mut output = String::new();
    output.push_str(&banner);
    output.push_str("\nCOMIC STRIP\n");
    output.push_str(&banner);
    output.push_str("\n\n");
    for panel in panels {
        output.push_str(&panel.to_string());
        output.push_str("\n\n");
    }
    output.push_str(&banner);
    output
}

/// Matches the image API's billing-restriction failure class.
fn is_billing_error(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("billed users") || message.contains("billing")
}
