use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Turns a sketch image into a textual layout description.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe_image(&self, path: &Path) -> anyhow::Result<String>;
}

/// Returns a fixed description. The image file is never opened.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSketchDescriber;

pub const STATIC_SKETCH_DESCRIPTION: &str = "A hand-drawn sketch of a website layout with the following elements:
    - A header with a logo on the left and navigation menu on the right
    - A hero section with a large heading and a call-to-action button
    - A features section with three columns of feature cards
    - A footer with contact information and social media links";

#[async_trait]
impl ImageDescriber for StaticSketchDescriber {
    async fn describe_image(&self, path: &Path) -> anyhow::Result<String> {
        info!("🖼️ Describing sketch {} (static description)", path.display());
        Ok(STATIC_SKETCH_DESCRIPTION.to_string())
    }
}
