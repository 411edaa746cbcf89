//! Showcase page generation
//!
//! Generates a self-contained HTML page with embedded CSS and JavaScript.
//! Ingot cards are mounted into an explicit container surface; nothing is
//! looked up through globals.

use crate::clipboard::{
    DOCUMENT_COPIED_LABEL, DOCUMENT_ERROR_LABEL, DOCUMENT_IDLE_LABEL, DOCUMENT_REVERT,
    SNIPPET_REVERT,
};
use crate::config::{ResolvedConfig, Snippet};
use crate::console::BANNER;
use crate::ingot::{Ingot, IngotCounts};
use crate::markup::{html_escape, render_markup};
use crate::sexp::to_canonical_text;

/// A mount target whose contents can be replaced wholesale
pub trait Surface {
    fn replace_contents(&mut self, html: &str);
}

impl Surface for String {
    fn replace_contents(&mut self, html: &str) {
        self.clear();
        self.push_str(html);
    }
}

/// Element ids the page uses for its own sections and controls
pub const PAGE_SECTION_IDS: &[&str] = &[
    "commands",
    "crucible",
    "ingots",
    "companion",
    "copy-md-btn",
];

/// Render ingot cards into `surface`
///
/// Returns false, without rendering, when there is no surface.
pub fn mount_ingots(surface: Option<&mut dyn Surface>, ingots: &[Ingot]) -> bool {
    match surface {
        Some(surface) => {
            surface.replace_contents(&render_markup(ingots));
            true
        }
        None => false,
    }
}

/// An HTML document whose `<div id="...">` elements can be used as surfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    html: String,
}

impl PageDocument {
    pub fn new(html: impl Into<String>) -> Self {
        PageDocument { html: html.into() }
    }

    /// The `<div>` with the given id, if the document has one
    pub fn container(&mut self, id: &str) -> Option<Container<'_>> {
        let (start, end) = div_contents_range(&self.html, id)?;
        Some(Container {
            html: &mut self.html,
            start,
            end,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

/// Inner HTML of one `<div>` inside a [`PageDocument`]
#[derive(Debug)]
pub struct Container<'a> {
    html: &'a mut String,
    start: usize,
    end: usize,
}

impl Container<'_> {
    pub fn contents(&self) -> &str {
        &self.html[self.start..self.end]
    }
}

impl Surface for Container<'_> {
    fn replace_contents(&mut self, html: &str) {
        self.html.replace_range(self.start..self.end, html);
        self.end = self.start + html.len();
    }
}

/// Byte range of the inner HTML of `<div ... id="{id}" ...>`, with nested
/// `<div>` elements balanced
fn div_contents_range(html: &str, id: &str) -> Option<(usize, usize)> {
    let attr = format!(" id=\"{}\"", id);
    let attr_pos = html.match_indices(&attr).map(|(pos, _)| pos).find(|&pos| {
        html[..pos]
            .rfind('<')
            .is_some_and(|tag_start| html[tag_start..].starts_with("<div"))
    })?;
    let start = attr_pos + html[attr_pos..].find('>')? + 1;

    let mut depth = 1usize;
    let mut pos = start;
    loop {
        let rest = &html[pos..];
        let close = rest.find("</div>")?;
        match rest.find("<div") {
            Some(open) if open < close => {
                depth += 1;
                pos += open + "<div".len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, pos + close));
                }
                pos += close + "</div>".len();
            }
        }
    }
}

/// Render the complete showcase page
pub fn render_page(config: &ResolvedConfig) -> String {
    let shell = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {summary}
        {snippets}
        {crucible}
        {ingots}
        {companion}
        {footer}
    </div>
    <script>{js}</script>
</body>
</html>
"#,
        title = html_escape(&config.title),
        css = inline_css(),
        js = inline_javascript(),
        header = render_header(&config.title, &config.tagline),
        summary = render_summary(&IngotCounts::tally(&config.ingots)),
        snippets = render_snippets(&config.snippets),
        crucible = render_crucible(&config.ingots),
        ingots = render_ingot_section(&config.container_id),
        companion = render_companion(&config.companion_document),
        footer = render_footer(),
    );

    let mut page = PageDocument::new(shell);
    let mounted = {
        let mut container = page.container(&config.container_id);
        mount_ingots(
            container.as_mut().map(|c| c as &mut dyn Surface),
            &config.ingots,
        )
    };
    if !mounted {
        log::debug!("container #{} not found, cards skipped", config.container_id);
    }
    page.into_string()
}

fn render_header(title: &str, tagline: &str) -> String {
    format!(
        r#"<header>
    <h1>{title}</h1>
    <p class="tagline">{tagline}</p>
</header>"#,
        title = html_escape(title),
        tagline = html_escape(tagline),
    )
}

fn render_summary(counts: &IngotCounts) -> String {
    format!(
        r#"<section class="summary">
    <div class="summary-card"><div class="label">Ingots</div><div class="value">{total}</div></div>
    <div class="summary-card ore"><div class="label">ore</div><div class="value">{ore}</div></div>
    <div class="summary-card molten"><div class="label">molten</div><div class="value">{molten}</div></div>
    <div class="summary-card forged"><div class="label">forged</div><div class="value">{forged}</div></div>
    <div class="summary-card cracked"><div class="label">cracked</div><div class="value">{cracked}</div></div>
    <div class="summary-card"><div class="label">Forged</div><div class="value">{pct}%</div></div>
</section>"#,
        total = counts.total,
        ore = counts.ore,
        molten = counts.molten,
        forged = counts.forged,
        cracked = counts.cracked,
        pct = counts.pct_forged(),
    )
}

fn render_snippets(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return String::new();
    }
    let lines: String = snippets
        .iter()
        .map(|s| {
            format!(
                r#"
    <div class="cmd-line"><span class="cmd-label">{label}</span><code data-copy>{command}</code></div>"#,
                label = html_escape(&s.label),
                command = html_escape(&s.command),
            )
        })
        .collect();
    format!(
        r#"<section class="section" id="commands">
    <h2>Quick start</h2>{lines}
</section>"#,
        lines = lines,
    )
}

/// Canonical text of every ingot, as the page logs it
fn render_crucible(ingots: &[Ingot]) -> String {
    let lines: Vec<String> = ingots
        .iter()
        .map(|i| html_escape(&to_canonical_text(i)))
        .collect();
    format!(
        r#"<section class="section" id="crucible">
    <h2>{banner}</h2>
    <div class="cmd-line"><pre class="sexp" data-copy>{lines}</pre></div>
</section>"#,
        banner = html_escape(BANNER),
        lines = lines.join("\n"),
    )
}

fn render_ingot_section(container_id: &str) -> String {
    format!(
        r#"<section class="section" id="ingots">
    <h2>Ingots</h2>
    <div id="{id}" class="ingot-grid"></div>
</section>"#,
        id = html_escape(container_id),
    )
}

fn render_companion(document: &str) -> String {
    format!(
        r#"<section class="section" id="companion">
    <button id="copy-md-btn" data-src="{src}" data-revert-ms="{revert}" data-copied="{copied}" data-error="{error}">{idle}</button>
</section>"#,
        src = html_escape(document),
        revert = DOCUMENT_REVERT.as_millis(),
        copied = html_escape(DOCUMENT_COPIED_LABEL),
        error = html_escape(DOCUMENT_ERROR_LABEL),
        idle = html_escape(DOCUMENT_IDLE_LABEL),
    )
}

fn render_footer() -> String {
    format!(
        r#"<footer data-snippet-revert-ms="{revert}">
    <p>Generated by slag</p>
</footer>"#,
        revert = SNIPPET_REVERT.as_millis(),
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: 'Cascadia Code', ui-monospace, SFMono-Regular, Menlo, monospace;
    line-height: 1.6;
    color: #e5e7eb;
    background: #0b0d10;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 2rem 1rem;
}

header {
    margin-bottom: 2rem;
    padding-bottom: 1rem;
    border-bottom: 1px solid #262b33;
}

header h1 {
    font-size: 2.5rem;
    color: #f97316;
}

.tagline {
    color: #9ca3af;
}

.summary {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
    gap: 0.75rem;
    margin-bottom: 2rem;
}

.summary-card {
    border: 1px solid #262b33;
    padding: 0.75rem;
}

.summary-card .label {
    color: #9ca3af;
    font-size: 0.75rem;
    text-transform: uppercase;
}

.summary-card .value {
    font-size: 1.5rem;
    font-weight: 700;
}

.section {
    margin-bottom: 2rem;
}

.section h2 {
    font-size: 1.1rem;
    margin-bottom: 0.75rem;
    color: #fbbf24;
}

.cmd-line {
    position: relative;
    display: flex;
    gap: 1rem;
    align-items: center;
    background: #14171c;
    border: 1px solid #262b33;
    padding: 0.5rem 3rem 0.5rem 0.75rem;
    margin-bottom: 0.5rem;
    overflow-x: auto;
}

.cmd-label {
    color: #6b7280;
    min-width: 5rem;
}

.copy-btn {
    position: absolute;
    top: 0.4rem;
    right: 0.5rem;
    background: transparent;
    border: none;
    color: #9ca3af;
    cursor: pointer;
}

.copy-btn.copied {
    color: #22c55e;
}

pre.sexp {
    white-space: pre;
    font-size: 0.8rem;
}

.ingot-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(300px, 1fr));
    gap: 1rem;
}

.ingot-card {
    border: 1px solid #262b33;
    padding: 1rem;
    background: #111418;
}

.ingot-header {
    display: flex;
    justify-content: space-between;
    margin-bottom: 0.5rem;
}

.ingot-id {
    font-weight: 700;
}

[is="badge"] {
    padding: 0 0.5rem;
    font-size: 0.75rem;
    border: 1px solid currentColor;
}

.ore { color: #9ca3af; }
.molten { color: #f97316; }
.forged { color: #22c55e; }
.cracked { color: #ef4444; }

.ingot-meta {
    display: flex;
    flex-wrap: wrap;
    gap: 0.75rem;
    color: #9ca3af;
    font-size: 0.8rem;
    margin: 0.5rem 0;
}

.ingot-proof summary {
    cursor: pointer;
    color: #fbbf24;
}

.ingot-proof pre {
    white-space: pre-wrap;
    word-break: break-all;
    font-size: 0.8rem;
    margin-top: 0.25rem;
}

#copy-md-btn {
    background: #f97316;
    color: #0b0d10;
    border: none;
    padding: 0.6rem 1.2rem;
    font-family: inherit;
    font-weight: 700;
    cursor: pointer;
}

#copy-md-btn.copied {
    background: #22c55e;
}

footer {
    margin-top: 3rem;
    color: #6b7280;
    font-size: 0.8rem;
    text-align: center;
}

@media (max-width: 640px) {
    header h1 { font-size: 1.75rem; }
    .cmd-label { display: none; }
}
"#
}

/// Inline JavaScript for the copy affordances
fn inline_javascript() -> &'static str {
    r#"
(function() {
    const COPY_ICON = '<svg width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><rect x="9" y="9" width="13" height="13" rx="2"/><path d="M5 15H4a2 2 0 01-2-2V4a2 2 0 012-2h9a2 2 0 012 2v1"/></svg>';
    const CHECK_ICON = '<svg width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M20 6L9 17l-5-5"/></svg>';

    function snippetRevertMs() {
        const footer = document.querySelector('footer[data-snippet-revert-ms]');
        return footer ? parseInt(footer.dataset.snippetRevertMs, 10) : 1500;
    }

    function initCopyButtons() {
        const revertMs = snippetRevertMs();
        document.querySelectorAll('[data-copy]').forEach(function(el) {
            const wrapper = el.closest('.cmd-line') || el;
            const btn = document.createElement('button');
            btn.className = 'copy-btn';
            btn.innerHTML = COPY_ICON;
            btn.title = 'Copy to clipboard';

            const doCopy = function(e) {
                e.stopPropagation();
                navigator.clipboard.writeText(el.textContent).then(function() {
                    btn.innerHTML = CHECK_ICON;
                    btn.classList.add('copied');
                    setTimeout(function() {
                        btn.innerHTML = COPY_ICON;
                        btn.classList.remove('copied');
                    }, revertMs);
                }).catch(function(err) {
                    console.error('copy failed', err);
                });
            };

            btn.addEventListener('click', doCopy);
            wrapper.style.cursor = 'pointer';
            wrapper.addEventListener('click', doCopy);
            wrapper.appendChild(btn);
        });
    }

    function initCopyMarkdown() {
        const btn = document.getElementById('copy-md-btn');
        if (!btn) return;
        const idle = btn.textContent;
        const revertMs = parseInt(btn.dataset.revertMs, 10);

        btn.addEventListener('click', async function() {
            try {
                const response = await fetch(btn.dataset.src);
                if (!response.ok) throw new Error('HTTP ' + response.status);
                const markdown = await response.text();
                await navigator.clipboard.writeText(markdown);
                btn.textContent = btn.dataset.copied;
                btn.classList.add('copied');
                setTimeout(function() {
                    btn.textContent = idle;
                    btn.classList.remove('copied');
                }, revertMs);
            } catch (err) {
                btn.textContent = btn.dataset.error;
                setTimeout(function() { btn.textContent = idle; }, revertMs);
            }
        });
    }

    function init() {
        initCopyButtons();
        initCopyMarkdown();
        const crucible = document.querySelector('#crucible pre.sexp');
        if (crucible) {
            console.log(document.querySelector('#crucible h2').textContent);
            console.log('');
            if (crucible.textContent) {
                crucible.textContent.split('\n').forEach(function(line) { console.log(line); });
            }
        }
    }

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', init);
    } else {
        init();
    }
})();
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingot::example_ingots;

    #[test]
    fn test_mount_into_string_surface() {
        let mut surface = String::from("stale");
        let ingots = example_ingots();
        assert!(mount_ingots(Some(&mut surface), &ingots));
        assert_eq!(surface, render_markup(&ingots));
    }

    #[test]
    fn test_mount_without_surface_is_skipped() {
        assert!(!mount_ingots(None, &example_ingots()));
    }

    #[test]
    fn test_container_lookup_and_replace() {
        let mut doc = PageDocument::new(r#"<body><div id="a" class="x"></div><p>after</p></body>"#);
        {
            let mut container = doc.container("a").unwrap();
            assert_eq!(container.contents(), "");
            container.replace_contents("<div>one</div>");
            assert_eq!(container.contents(), "<div>one</div>");
            container.replace_contents("two");
        }
        assert_eq!(
            doc.as_str(),
            r#"<body><div id="a" class="x">two</div><p>after</p></body>"#
        );
    }

    #[test]
    fn test_container_balances_nested_divs() {
        let mut doc =
            PageDocument::new(r#"<div id="outer"><div><div>x</div></div>tail</div><div>next</div>"#);
        let container = doc.container("outer").unwrap();
        assert_eq!(container.contents(), "<div><div>x</div></div>tail");
    }

    #[test]
    fn test_missing_container() {
        let mut doc = PageDocument::new(r#"<div id="other"></div><span id="target"></span>"#);
        assert!(doc.container("target").is_none());
        assert!(doc.container("absent").is_none());
        assert!(doc.container("other").is_some());
    }

    #[test]
    fn test_container_skips_non_div_with_same_id() {
        let mut doc = PageDocument::new(
            r#"<section id="grid"><h2>Grid</h2><div id="grid">cards</div></section>"#,
        );
        assert_eq!(doc.container("grid").unwrap().contents(), "cards");
    }

    #[test]
    fn test_page_section_ids_are_not_divs() {
        let config = ResolvedConfig::defaults().unwrap();
        let mut doc = PageDocument::new(render_page(&config));
        for id in PAGE_SECTION_IDS {
            assert!(doc.container(id).is_none(), "#{} should not be a div", id);
        }
    }

    #[test]
    fn test_render_page_mounts_past_section_with_same_id() {
        let mut config = ResolvedConfig::defaults().unwrap();
        config.container_id = "ingots".to_string();
        let html = render_page(&config);
        assert!(html.contains(&format!(
            r#"<div id="ingots" class="ingot-grid">{}</div>"#,
            render_markup(&config.ingots)
        )));
    }

    #[test]
    fn test_render_page_skips_empty_crucible_lines() {
        let mut config = ResolvedConfig::defaults().unwrap();
        config.ingots.clear();
        let html = render_page(&config);
        assert!(html.contains(r#"<pre class="sexp" data-copy></pre>"#));
        assert!(html.contains("if (crucible.textContent) {"));
    }

    #[test]
    fn test_data_attribute_is_not_an_id() {
        let mut doc = PageDocument::new(r#"<div data-id="a">no</div><div id="a">yes</div>"#);
        assert_eq!(doc.container("a").unwrap().contents(), "yes");
    }

    #[test]
    fn test_render_page_mounts_cards() {
        let config = ResolvedConfig::defaults().unwrap();
        let html = render_page(&config);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(&format!(
            r#"<div id="ingot-display" class="ingot-grid">{}</div>"#,
            render_markup(&config.ingots)
        )));
        assert!(html.contains(r#"<button id="copy-md-btn" data-src="/slag.md""#));
        assert!(html.contains(">Copy as Markdown</button>"));
        assert!(html.contains("<code data-copy>cargo install slag</code>"));
    }

    #[test]
    fn test_render_page_summary_counts() {
        let config = ResolvedConfig::defaults().unwrap();
        let html = render_page(&config);
        assert!(html.contains(r#"<div class="label">Ingots</div><div class="value">6</div>"#));
        assert!(html.contains(r#"<div class="label">Forged</div><div class="value">33%</div>"#));
    }

    #[test]
    fn test_render_page_crucible_is_escaped_canonical_text() {
        let config = ResolvedConfig::defaults().unwrap();
        let html = render_page(&config);
        assert!(html.contains("slag · S-Expression Format:"));
        assert!(html.contains(
            "(ingot :id &quot;i1&quot; :status ore :solo t :grade 1 :skill default :heat 0 :max 5"
        ));
    }

    #[test]
    fn test_render_page_with_no_ingots() {
        let mut config = ResolvedConfig::defaults().unwrap();
        config.ingots.clear();
        let html = render_page(&config);
        assert!(html.contains(r#"<div id="ingot-display" class="ingot-grid"></div>"#));
        assert!(!html.contains("ingot-card\""));
    }

    #[test]
    fn test_render_page_escapes_title() {
        let mut config = ResolvedConfig::defaults().unwrap();
        config.title = "<b>slag</b>".to_string();
        let html = render_page(&config);
        assert!(html.contains("<title>&lt;b&gt;slag&lt;/b&gt;</title>"));
    }
}
