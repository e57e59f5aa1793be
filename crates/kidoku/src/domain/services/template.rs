use kidoku_lib::models::{SeriesRecord, SourceObservation};

use crate::utils;

/// Named values available to `{placeholder}` URL templates. Keys are stored
/// lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: Vec<(String, String)>,
}

impl TemplateContext {
    /// Context for a series page on one source: `title`, `slug`, `handle`
    /// (the site's override for its host when configured, else the slug) and
    /// `base_url`.
    pub fn for_series(series: &SeriesRecord, source: &SourceObservation) -> Self {
        let slug = utils::slugify(&series.title);
        let host = utils::normalize_host(&source.host);
        let handle = series
            .site_overrides
            .iter()
            .find(|(site, _)| utils::normalize_host(site) == host)
            .map(|(_, handle)| handle.clone())
            .unwrap_or_else(|| slug.clone());

        let mut ctx = Self::default();
        ctx.insert("title", &series.title);
        ctx.insert("slug", &slug);
        ctx.insert("handle", &handle);
        if let Some(link) = source.link.as_deref() {
            ctx.insert("base_url", link);
        }
        ctx
    }

    /// Extend a series context with chapter values. `chapter` prefers the
    /// numeric form when one is known.
    pub fn with_chapter(mut self, label: &str, number: Option<f64>) -> Self {
        let chapter = number
            .map(|number| number.to_string())
            .unwrap_or_else(|| label.to_string());
        self.insert("chapter", &chapter);
        self.insert("chapter_label", label);
        if let Some(number) = number {
            self.insert("chapter_number", &number.to_string());
        }
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.push((name.to_lowercase(), value.to_string()));
    }

    fn get(&self, name: &str) -> &str {
        let name = name.to_lowercase();
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

/// Substitute every `{name}` occurrence with its context value, empty string
/// for unknown names. An unterminated brace is kept literally. Returns
/// `None` for an absent template or a result that trims to empty.
pub fn resolve(template: Option<&str>, ctx: &TemplateContext) -> Option<String> {
    let template = template?;
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                out.push_str(ctx.get(&after[..end]));
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    let out = out.trim();
    (!out.is_empty()).then(|| out.to_string())
}

/// Deep link to a series page: resolved template, else the source's own raw
/// link.
pub fn resolve_series_link(source: &SourceObservation, series: &SeriesRecord) -> Option<String> {
    resolve(
        source.series_url_template.as_deref(),
        &TemplateContext::for_series(series, source),
    )
    .or_else(|| source.link.clone())
}

/// Deep link to one chapter. Template first, then the entry's own raw link,
/// then the source's series link. A raw link equal to the series link means
/// the scraper only saw the landing page, so it never shadows a resolved
/// template and only survives as the final fallback.
pub fn resolve_chapter_link(
    source: &SourceObservation,
    series: &SeriesRecord,
    label: &str,
    number: Option<f64>,
    raw_link: Option<&str>,
) -> Option<String> {
    let ctx = TemplateContext::for_series(series, source).with_chapter(label, number);
    if let Some(resolved) = resolve(source.chapter_url_template.as_deref(), &ctx) {
        return Some(resolved);
    }

    let base = source.link.as_deref();
    raw_link
        .filter(|link| Some(*link) != base)
        .map(str::to_string)
        .or_else(|| base.map(str::to_string))
}
