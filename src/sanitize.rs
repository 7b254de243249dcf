//! Article body sanitization.
//!
//! Takes a fetched article page and reduces its body element to publishable
//! markup:
//!
//! 1. images are localized or dropped, decorative ones removed outright
//! 2. in-body keyword links become tag markers (`<a class="tag" data-name data-tag>`)
//! 3. paragraph ids, centering classes and editor artifacts are cleaned up
//! 4. empty paragraphs at either end are trimmed
//! 5. comments are stripped and each `</p>` is followed by a newline
//!
//! Image downloads happen outside this module. The caller first collects
//! the sources with [`image_sources`], localizes them, then passes the
//! successful `src → local path` pairs to [`sanitize`]. Sources are keyed
//! after resolution against the article URL. A source missing from that
//! map is treated as a failed download.

use crate::models::ArticleTag;
use crate::transliterate::transliterate;
use dom_query::{Document, Selection};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// Class marking a rewritten keyword link.
pub const TAG_CLASS: &str = "tag";
/// Attribute carrying the tag display name.
pub const TAG_ATTR_NAME: &str = "data-name";
/// Attribute carrying the ASCII tag key.
pub const TAG_ATTR_VALUE: &str = "data-tag";
/// Query parameter holding the keyword on in-body links.
pub const KEYWORD_PARAM: &str = "keyword";

static HTML_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Site-specific knobs for the sanitizer.
#[derive(Debug, Clone, Copy)]
pub struct SanitizeRules {
    /// Selector of the article body element.
    pub body_selector: &'static str,
    /// Image sources ending in one of these are site chrome, not content.
    pub decorative_suffixes: &'static [&'static str],
    /// Paragraph class that means "centered".
    pub center_class: &'static str,
    /// Editor leftovers removed from the body.
    pub artifact_selector: &'static str,
}

/// Result of sanitizing one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitized {
    pub content: String,
    pub tags: Vec<ArticleTag>,
    pub local_images: Vec<String>,
    /// Characters of whitespace-trimmed visible text left in the body.
    pub visible_chars: usize,
}

/// Sources of the images in `body` that need localizing, in document order.
///
/// Empty and decorative sources are left out; the rest are resolved
/// against `base`.
pub fn image_sources(body: &Selection, rules: &SanitizeRules, base: Option<&Url>) -> Vec<String> {
    body.select("img")
        .iter()
        .filter_map(|img| image_source(&img))
        .filter(|src| !is_decorative(src, rules))
        .map(|src| resolve(src, base))
        .collect()
}

/// Sanitize the body of `html`.
///
/// `images` maps resolved image sources to local paths for every download
/// that succeeded. `base` resolves relative image sources and link
/// targets. A page without a body element yields an empty result.
pub fn sanitize(
    html: &str,
    rules: &SanitizeRules,
    images: &HashMap<String, String>,
    base: Option<&Url>,
) -> Sanitized {
    let doc = Document::from(html);
    let body = doc.select(rules.body_selector).first();
    let mut out = Sanitized::default();
    if !body.exists() {
        return out;
    }

    rewrite_images(&body, rules, images, base, &mut out.local_images);
    rewrite_links(&body, base, &mut out.tags);
    clean_paragraphs(&body, rules);
    trim_empty_paragraphs(&body);

    out.visible_chars = body.text().trim().chars().count();
    out.content = finish_markup(&body.inner_html());
    out
}

fn image_source(img: &Selection) -> Option<String> {
    let raw = img.attr("src")?;
    let src = html_escape::decode_html_entities(raw.trim()).into_owned();
    if src.is_empty() { None } else { Some(src) }
}

fn resolve(src: String, base: Option<&Url>) -> String {
    match base.and_then(|b| b.join(&src).ok()) {
        Some(url) => url.into(),
        None => src,
    }
}

fn is_decorative(src: &str, rules: &SanitizeRules) -> bool {
    rules.decorative_suffixes.iter().any(|s| src.ends_with(s))
}

fn rewrite_images(
    body: &Selection,
    rules: &SanitizeRules,
    images: &HashMap<String, String>,
    base: Option<&Url>,
    local_images: &mut Vec<String>,
) {
    for img in body.select("img").iter() {
        let Some(src) = image_source(&img) else {
            continue;
        };

        if is_decorative(&src, rules) {
            let parent = img.parent();
            if holds_only(&parent, rules) {
                parent.remove();
            } else {
                img.remove();
            }
            continue;
        }

        let Some(local) = images.get(&resolve(src, base)) else {
            img.remove();
            continue;
        };
        if let Some(alt) = img.attr("alt") {
            if alt.trim().is_empty() || alt.contains("http://") || alt.contains("https://") {
                img.remove_attr("alt");
            }
        }
        img.set_attr("src", local);
        local_images.push(local.clone());
    }
}

/// A `div` wrapper whose only content is the one image.
fn holds_only(parent: &Selection, rules: &SanitizeRules) -> bool {
    parent.is("div")
        && !parent.is(rules.body_selector)
        && parent.children().length() == 1
        && parent.text().trim().is_empty()
}

fn rewrite_links(body: &Selection, base: Option<&Url>, tags: &mut Vec<ArticleTag>) {
    for a in body.select("a").iter() {
        let href = a.attr("href").map(|h| h.trim().to_string()).unwrap_or_default();
        if href.is_empty() {
            a.remove();
            continue;
        }

        if a.inner_html().is_empty() {
            a.remove();
            continue;
        }

        let keyword = keyword_of(&href, base).unwrap_or_default();
        let key = transliterate(&keyword);
        a.remove_attr("href");
        a.add_class(TAG_CLASS);
        a.set_attr(TAG_ATTR_NAME, &keyword);
        a.set_attr(TAG_ATTR_VALUE, &key);
        tags.push(ArticleTag { name: keyword, tag: key });
    }
}

fn keyword_of(href: &str, base: Option<&Url>) -> Option<String> {
    let url = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    }
    .ok()?;
    url.query_pairs()
        .find(|(k, _)| k == KEYWORD_PARAM)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_paragraphs(body: &Selection, rules: &SanitizeRules) {
    for p in body.select("p").iter() {
        p.remove_attr("id");
        if p.has_class(rules.center_class) {
            p.set_attr("style", "text-align: center;");
            p.remove_class(rules.center_class);
            if p.attr("class").is_some_and(|c| c.trim().is_empty()) {
                p.remove_attr("class");
            }
        }
    }
    body.select(rules.artifact_selector).remove();
}

fn trim_empty_paragraphs(body: &Selection) {
    loop {
        let first = body.select("p").first();
        if !first.exists() || !is_empty_paragraph(&first) {
            break;
        }
        first.remove();
    }
    loop {
        let last = body.select("p").last();
        if !last.exists() || !is_empty_paragraph(&last) {
            break;
        }
        last.remove();
    }
}

/// No visible text. Images do not count.
fn is_empty_paragraph(p: &Selection) -> bool {
    p.text().trim().is_empty()
}

fn finish_markup(inner: &str) -> String {
    HTML_COMMENT
        .replace_all(inner, "")
        .replace("</p>", "</p>\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: SanitizeRules = SanitizeRules {
        body_selector: ".post_body",
        decorative_suffixes: &["logo.png"],
        center_class: "f_center",
        artifact_selector: ".Apple-interchange-newline",
    };

    fn page(body: &str) -> String {
        format!(r#"<html><head></head><body><div class="post_body">{body}</div></body></html>"#)
    }

    fn run(body: &str) -> Sanitized {
        sanitize(&page(body), &RULES, &HashMap::new(), None)
    }

    #[test]
    fn test_trims_empty_boundary_paragraphs() {
        let out = run("<p></p><p>X</p><p> </p>");
        assert_eq!(out.content, "<p>X</p>");
        assert_eq!(out.visible_chars, 1);
    }

    #[test]
    fn test_trim_keeps_inner_empty_paragraphs() {
        let out = run("<p> </p><p>A</p><p></p><p>B</p><p>\n</p>");
        assert_eq!(out.content, "<p>A</p>\n<p></p>\n<p>B</p>");
    }

    #[test]
    fn test_trim_all_empty() {
        let out = run("<p></p><p>  </p>");
        assert_eq!(out.content, "");
        assert_eq!(out.visible_chars, 0);
    }

    #[test]
    fn test_image_only_boundary_paragraph_is_trimmed() {
        let mut images = HashMap::new();
        images.insert("https://img/a.jpg".to_string(), "images/a.jpg".to_string());
        images.insert("https://img/b.jpg".to_string(), "images/b.jpg".to_string());
        let out = sanitize(
            &page(r#"<p><img src="https://img/a.jpg"></p><p>X</p><p><img src="https://img/b.jpg"></p><p>Y</p>"#),
            &RULES,
            &images,
            None,
        );
        assert_eq!(out.content, "<p>X</p>\n<p><img src=\"images/b.jpg\"></p>\n<p>Y</p>");
        // localized before trimming
        assert_eq!(
            out.local_images,
            vec!["images/a.jpg".to_string(), "images/b.jpg".to_string()]
        );
    }

    #[test]
    fn test_missing_body() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert_eq!(sanitize(html, &RULES, &HashMap::new(), None), Sanitized::default());
    }

    #[test]
    fn test_images_localized_or_dropped() {
        let mut images = HashMap::new();
        images.insert("https://img/ok.jpg?a=1&b=2".to_string(), "images/ok.jpg".to_string());
        let out = sanitize(
            &page(concat!(
                r#"<p>text<img src="https://img/ok.jpg?a=1&amp;amp;b=2" alt="">"#,
                r#"<img src="https://img/fail.jpg" alt="x"><img src=""></p>"#,
            )),
            &RULES,
            &images,
            None,
        );
        assert_eq!(out.local_images, vec!["images/ok.jpg".to_string()]);
        assert!(out.content.contains(r#"<img src="images/ok.jpg">"#));
        assert!(!out.content.contains("fail.jpg"));
        assert!(!out.content.contains("alt"));
    }

    #[test]
    fn test_alt_with_url_is_dropped() {
        let mut images = HashMap::new();
        images.insert("https://img/a.jpg".to_string(), "l/a.jpg".to_string());
        images.insert("https://img/b.jpg".to_string(), "l/b.jpg".to_string());
        let out = sanitize(
            &page(r#"<p>t<img src="https://img/a.jpg" alt="see http://x"><img src="https://img/b.jpg" alt="Caption"></p>"#),
            &RULES,
            &images,
            None,
        );
        assert!(!out.content.contains("see http"));
        assert!(out.content.contains(r#"alt="Caption""#));
        assert_eq!(out.local_images, vec!["l/a.jpg".to_string(), "l/b.jpg".to_string()]);
    }

    #[test]
    fn test_decorative_image_removes_wrapper_div() {
        let out = run(r#"<div class="logo"><img src="https://static/logo.png"></div><p>X</p>"#);
        assert_eq!(out.content, "<p>X</p>");
    }

    #[test]
    fn test_decorative_image_in_paragraph_removes_only_image() {
        let out = run(r#"<p>X<img src="https://static/logo.png"></p>"#);
        assert_eq!(out.content, "<p>X</p>");
    }

    #[test]
    fn test_decorative_image_directly_in_body_keeps_body() {
        let out = run(r#"<img src="https://static/logo.png"><p>X</p>"#);
        assert_eq!(out.content, "<p>X</p>");
    }

    #[test]
    fn test_image_sources_skip_decorative_and_empty() {
        let html = page(r#"<img src="https://static/logo.png"><img src=""><img src="https://img/a.jpg?x=1&amp;amp;y=2"><img>"#);
        let doc = Document::from(html.as_str());
        let body = doc.select(RULES.body_selector);
        assert_eq!(image_sources(&body, &RULES, None), vec!["https://img/a.jpg?x=1&y=2".to_string()]);
    }

    #[test]
    fn test_relative_image_sources_resolved_against_base() {
        let base = Url::parse("https://www.163.com/tech/article/A.html").unwrap();
        let html = page(r#"<p>t<img src="//nimg.ws.126.net/a.jpg"><img src="/b.png"></p>"#);
        let doc = Document::from(html.as_str());
        let sources = image_sources(&doc.select(RULES.body_selector), &RULES, Some(&base));
        assert_eq!(
            sources,
            vec![
                "https://nimg.ws.126.net/a.jpg".to_string(),
                "https://www.163.com/b.png".to_string(),
            ]
        );

        let images: HashMap<String, String> = sources
            .into_iter()
            .zip(["l/a.jpg", "l/b.png"])
            .map(|(src, local)| (src, local.to_string()))
            .collect();
        let out = sanitize(&html, &RULES, &images, Some(&base));
        assert_eq!(out.local_images, vec!["l/a.jpg".to_string(), "l/b.png".to_string()]);
        assert_eq!(out.content, r#"<p>t<img src="l/a.jpg"><img src="l/b.png"></p>"#);
    }

    #[test]
    fn test_keyword_links_become_tags() {
        let out = run(r#"<p>买了<a href="https://www.163.com/search?keyword=%E6%89%8B%E6%9C%BA">手机</a>和<a href="https://www.163.com/search?keyword=5G">5G</a></p>"#);
        assert_eq!(
            out.tags,
            vec![
                ArticleTag { name: "手机".to_string(), tag: "shouji".to_string() },
                ArticleTag { name: "5G".to_string(), tag: "5G".to_string() },
            ]
        );
        assert!(!out.content.contains("href"));
        assert!(out.content.contains(r#"class="tag""#));
        assert!(out.content.contains(r#"data-name="手机""#));
        assert!(out.content.contains(r#"data-tag="shouji""#));
    }

    #[test]
    fn test_relative_keyword_link_resolved_against_base() {
        let base = Url::parse("https://www.163.com/tech/article/A.html").unwrap();
        let out = sanitize(
            &page(r#"<p><a href="search?keyword=%E7%A4%BA%E4%BE%8B">示例</a></p>"#),
            &RULES,
            &HashMap::new(),
            Some(&base),
        );
        assert_eq!(out.tags.len(), 1);
        assert_eq!(out.tags[0].name, "示例");
        assert_eq!(out.tags[0].tag, "shili");
    }

    #[test]
    fn test_empty_links_removed() {
        let out = run(r#"<p>a<a href="https://x/?keyword=k"></a>b<a>c</a>d</p>"#);
        assert!(out.tags.is_empty());
        assert_eq!(out.content, "<p>abd</p>");
    }

    #[test]
    fn test_link_without_keyword_becomes_empty_tag() {
        let out = run(r#"<p>a<a href="https://elsewhere/">e</a></p>"#);
        assert_eq!(
            out.tags,
            vec![ArticleTag { name: String::new(), tag: String::new() }]
        );
        assert_eq!(out.content, r#"<p>a<a class="tag" data-name="" data-tag="">e</a></p>"#);
    }

    #[test]
    fn test_paragraph_cleanup() {
        let out = run(r#"<p id="p1" class="f_center">Title</p><p class="f_center other">Y<br class="Apple-interchange-newline"></p>"#);
        assert_eq!(
            out.content,
            "<p style=\"text-align: center;\">Title</p>\n<p class=\"other\" style=\"text-align: center;\">Y</p>"
        );
    }

    #[test]
    fn test_comments_stripped() {
        let out = run("<p>A</p><!-- ad --><p>B<!--\nmulti\nline--></p>");
        assert_eq!(out.content, "<p>A</p>\n<p>B</p>");
    }

    #[test]
    fn test_visible_chars_counts_characters_not_bytes() {
        let out = run("<p>  新闻  </p>");
        assert_eq!(out.visible_chars, 2);
    }
}
