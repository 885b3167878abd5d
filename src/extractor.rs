use crate::models::AssetCategory;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Size assumed for a YouTube/Vimeo player embed, which is never fetched
pub const EMBED_PLACEHOLDER_BYTES: f64 = 800.0 * 1024.0;
pub const EMBED_CONTENT_TYPE: &str = "video/embed";

const EMBED_HOSTS: &[&str] = &["youtube.com", "vimeo.com"];

// Valueless boolean attributes are recorded under their own name
const BOOLEAN_ATTRIBUTES: &[&str] = &["async", "defer", "autoplay"];

static IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img, picture source, source[type]").expect("image selector should be valid")
});
static STYLESHEET_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link[rel='stylesheet']").expect("stylesheet selector should be valid")
});
static STYLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("style").expect("style selector should be valid"));
static SCRIPT_SRC_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[src]").expect("script[src] selector should be valid"));
static INLINE_SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script:not([src])").expect("inline script selector should be valid")
});
static VIDEO_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("video source, video[src]").expect("video selector should be valid")
});
static IFRAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("iframe[src]").expect("iframe selector should be valid"));
static FONT_PRELOAD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link[rel='preload'][as='font']").expect("font preload selector should be valid")
});

// Best-effort match, not a CSS parser: one URL per @font-face block
static FONT_FACE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)@font-face[^}]*url\(['"]?([^'")]+)['"]?\)"#)
        .expect("font-face pattern should be valid")
});

/// How the transfer size of a candidate is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSource {
    /// Must be measured over the network
    Remote,
    /// Size known from the markup alone (inline blocks, embeds)
    Known {
        size_bytes: f64,
        content_type: &'static str,
    },
}

/// A resource reference found in the markup, in discovery order
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCandidate {
    pub url: String,
    pub category: AssetCategory,
    pub source: CandidateSource,
    pub attributes: HashMap<String, String>,
}

impl ResourceCandidate {
    fn remote(url: String, category: AssetCategory) -> Self {
        Self {
            url,
            category,
            source: CandidateSource::Remote,
            attributes: HashMap::new(),
        }
    }

    fn known(
        url: String,
        category: AssetCategory,
        size_bytes: f64,
        content_type: &'static str,
    ) -> Self {
        Self {
            url,
            category,
            source: CandidateSource::Known {
                size_bytes,
                content_type,
            },
            attributes: HashMap::new(),
        }
    }
}

/// Finds every resource a page depends on without touching the network
pub struct ResourceExtractor;

impl ResourceExtractor {
    /// Candidates in canonical order: images, stylesheets (then inline
    /// styles), scripts (then inline scripts), video (then embeds), fonts
    pub fn extract(document: &Html, page_url: &Url) -> Vec<ResourceCandidate> {
        let mut candidates = Vec::new();
        candidates.extend(Self::extract_images(document, page_url));
        candidates.extend(Self::extract_stylesheets(document, page_url));
        candidates.extend(Self::extract_scripts(document, page_url));
        candidates.extend(Self::extract_videos(document, page_url));
        candidates.extend(Self::extract_fonts(document, page_url));
        candidates
    }

    pub fn extract_images(document: &Html, page_url: &Url) -> Vec<ResourceCandidate> {
        let mut images = Vec::new();

        for element in document.select(&IMAGE_SELECTOR) {
            // <source type> inside <video>/<audio> is deliberately not an image:
            // the media pass measures it, and counting it here would double its bytes
            if element.value().name() == "source" && Self::media_parent(&element).is_some() {
                continue;
            }

            let Some(src) = Self::image_source(&element) else {
                continue;
            };
            let Some(url) = resolve_url(src, page_url) else {
                continue;
            };

            let mut candidate = ResourceCandidate::remote(url, AssetCategory::Images);
            copy_attributes(&element, &["loading", "srcset"], &mut candidate.attributes);
            images.push(candidate);
        }

        images
    }

    pub fn extract_stylesheets(document: &Html, page_url: &Url) -> Vec<ResourceCandidate> {
        let mut stylesheets: Vec<_> = document
            .select(&STYLESHEET_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_url(href, page_url))
            .map(|url| ResourceCandidate::remote(url, AssetCategory::Css))
            .collect();

        let inline_size = text_length(document, &STYLE_SELECTOR);
        if inline_size > 0 {
            stylesheets.push(ResourceCandidate::known(
                format!("{}#inline-styles", page_url),
                AssetCategory::Css,
                inline_size as f64,
                "text/css",
            ));
        }

        stylesheets
    }

    pub fn extract_scripts(document: &Html, page_url: &Url) -> Vec<ResourceCandidate> {
        let mut scripts = Vec::new();

        for element in document.select(&SCRIPT_SRC_SELECTOR) {
            let Some(url) = element
                .value()
                .attr("src")
                .and_then(|src| resolve_url(src, page_url))
            else {
                continue;
            };

            let mut candidate = ResourceCandidate::remote(url, AssetCategory::JavaScript);
            copy_attributes(&element, &["async", "defer"], &mut candidate.attributes);
            scripts.push(candidate);
        }

        let inline_size = text_length(document, &INLINE_SCRIPT_SELECTOR);
        if inline_size > 0 {
            scripts.push(ResourceCandidate::known(
                format!("{}#inline-scripts", page_url),
                AssetCategory::JavaScript,
                inline_size as f64,
                "application/javascript",
            ));
        }

        scripts
    }

    pub fn extract_videos(document: &Html, page_url: &Url) -> Vec<ResourceCandidate> {
        let mut videos = Vec::new();

        for element in document.select(&VIDEO_SELECTOR) {
            let Some(url) = element
                .value()
                .attr("src")
                .and_then(|src| resolve_url(src, page_url))
            else {
                continue;
            };

            // Playback attributes live on the <video>, not on its <source>s
            let owner = if element.value().name() == "source" {
                Self::media_parent(&element)
                    .filter(|parent| parent.value().name() == "video")
                    .unwrap_or(element)
            } else {
                element
            };

            let mut candidate = ResourceCandidate::remote(url, AssetCategory::Video);
            copy_attributes(&owner, &["autoplay", "preload"], &mut candidate.attributes);
            videos.push(candidate);
        }

        for element in document.select(&IFRAME_SELECTOR) {
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            if !EMBED_HOSTS.iter().any(|host| src.contains(host)) {
                continue;
            }
            if let Some(url) = resolve_url(src, page_url) {
                videos.push(ResourceCandidate::known(
                    url,
                    AssetCategory::Video,
                    EMBED_PLACEHOLDER_BYTES,
                    EMBED_CONTENT_TYPE,
                ));
            }
        }

        videos
    }

    pub fn extract_fonts(document: &Html, page_url: &Url) -> Vec<ResourceCandidate> {
        let mut fonts: Vec<_> = document
            .select(&FONT_PRELOAD_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_url(href, page_url))
            .map(|url| ResourceCandidate::remote(url, AssetCategory::Fonts))
            .collect();

        for style in document.select(&STYLE_SELECTOR) {
            let css = style.text().collect::<String>();
            for captures in FONT_FACE_URL.captures_iter(&css) {
                if let Some(url) = captures
                    .get(1)
                    .and_then(|m| resolve_url(m.as_str(), page_url))
                {
                    fonts.push(ResourceCandidate::remote(url, AssetCategory::Fonts));
                }
            }
        }

        fonts
    }

    /// `src`, then `data-src`, then the first URL of `srcset`
    fn image_source<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
        let attr = |name: &str| {
            element
                .value()
                .attr(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        attr("src").or_else(|| attr("data-src")).or_else(|| {
            attr("srcset")
                .and_then(|srcset| srcset.split(',').next())
                .and_then(|first| first.split_whitespace().next())
        })
    }

    fn media_parent<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        element
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|parent| matches!(parent.value().name(), "video" | "audio"))
    }
}

/// Resolves a markup reference against the page URL.
///
/// `data:` URIs are never fetched, absolute URLs pass through unchanged and
/// anything that cannot be resolved is dropped.
pub fn resolve_url(reference: &str, page_url: &Url) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    {
        return None;
    }
    if Url::parse(reference).is_ok() {
        return Some(reference.to_string());
    }
    page_url.join(reference).ok().map(|url| url.to_string())
}

fn copy_attributes(element: &ElementRef, names: &[&str], into: &mut HashMap<String, String>) {
    for name in names {
        if let Some(value) = element.value().attr(name) {
            let value = if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(name) {
                name.to_string()
            } else {
                value.to_string()
            };
            into.insert(name.to_string(), value);
        }
    }
}

fn text_length(document: &Html, selector: &Selector) -> usize {
    document
        .select(selector)
        .map(|element| element.text().map(|t| t.chars().count()).sum::<usize>())
        .sum()
}
