/// Page metadata for a post detail view
use serde::Serialize;

use crate::config::SiteConfig;
use crate::models::Post;

const DESCRIPTION_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSeo {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub image: String,
    pub og_type: &'static str,
    pub twitter_card: &'static str,
}

impl PostSeo {
    pub fn for_post(post: &Post, site: &SiteConfig) -> Self {
        Self {
            title: format!("{} | {}", post.title, site.name),
            description: post.content.chars().take(DESCRIPTION_CHARS).collect(),
            canonical_url: format!("{}/posts/{}", site.url, post.slug),
            image: post
                .featured_image_url
                .clone()
                .unwrap_or_else(|| format!("{}/placeholder.svg", site.url)),
            og_type: "article",
            twitter_card: "summary_large_image",
        }
    }
}
