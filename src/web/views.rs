use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) service: &'static str,
    pub(crate) max_panels_limit: u32,
    pub(crate) min_story_length: usize,
}
