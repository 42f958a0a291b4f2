//! Shared constants/setters for things
//!

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "Story to Comic Strip Generator";

/// Upper bound on the number of panels a request may ask for.
pub const MAX_PANELS_LIMIT: u32 = 20;

/// Panels requested when the caller doesn't say.
pub const DEFAULT_MAX_PANELS: u32 = 10;

/// Minimum story length (in characters, after trimming) accepted by the API.
pub const MIN_STORY_LENGTH: usize = 10;

/// Style directive prepended to every image generation prompt.
pub const IMAGE_STYLE_PREFIX: &str =
    "Comic book art style with bold outlines and vibrant colors. ";

/// Placeholder image width in pixels.
pub const PLACEHOLDER_WIDTH: u32 = 512;

/// Placeholder image height in pixels.
pub const PLACEHOLDER_HEIGHT: u32 = 384;

/// Scene text longer than this is truncated before placeholder rendering.
pub const PLACEHOLDER_SCENE_LIMIT: usize = 200;

/// Maximum number of wrapped scene lines drawn on a placeholder.
pub const PLACEHOLDER_MAX_LINES: usize = 8;
