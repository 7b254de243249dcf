//! Page-level facts read from an article page before sanitizing its body.

use crate::sanitize::{self, SanitizeRules};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use dom_query::Document;
use url::Url;

/// Layout of the publish time attribute.
pub const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a site keeps its page-level metadata.
#[derive(Debug, Clone, Copy)]
pub struct PageRules {
    pub title_selector: &'static str,
    pub title_attr: &'static str,
    pub time_selector: &'static str,
    pub time_attr: &'static str,
    /// Publish times are written in this offset, seconds east of UTC.
    pub site_offset_secs: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    pub title: String,
    pub post_time: Option<DateTime<Local>>,
    /// The body contains a `<video>` element.
    pub has_video: bool,
    /// Absolute sources of the body images to localize, in document order.
    pub image_sources: Vec<String>,
}

/// Read page facts and the body's image sources in one parse.
///
/// The body element is located with `body.body_selector`; relative image
/// sources resolve against `base`.
pub fn inspect(html: &str, rules: &PageRules, body: &SanitizeRules, base: Option<&Url>) -> PageFacts {
    let doc = Document::from(html);
    let title = doc
        .select(rules.title_selector)
        .attr(rules.title_attr)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    let post_time = doc
        .select(rules.time_selector)
        .attr(rules.time_attr)
        .and_then(|raw| parse_post_time(&raw, rules.site_offset_secs));
    let content = doc.select(body.body_selector).first();
    let has_video = content.select("video").exists();
    let image_sources = if content.exists() {
        sanitize::image_sources(&content, body, base)
    } else {
        Vec::new()
    };

    PageFacts {
        title,
        post_time,
        has_video,
        image_sources,
    }
}

/// Parse a site-local publish time and convert it to the local zone.
///
/// Anything unparseable yields `None`; a bad timestamp never fails an article.
pub fn parse_post_time(raw: &str, site_offset_secs: i32) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), PUBLISH_TIME_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(site_offset_secs)?;
    let at_site = offset.from_local_datetime(&naive).single()?;
    Some(at_site.with_timezone(&Local))
}
