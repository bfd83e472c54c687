//! Header-aware structural splitter.
//!
//! Walks a fragment of parsed HTML depth-first and cuts it into chunks at
//! heading boundaries. A heading at any depth flushes the chunk in progress
//! and updates a heading-level stack; every chunk carries the accumulated
//! parent headers above it. `nav` and `aside` subtrees are skipped entirely.

use scraper::ElementRef;

/// Elements whose subtrees never contribute content.
const SUPPRESSED: &[&str] = &["nav", "aside", "script", "style"];

/// Elements that end a line of text when closed.
const BLOCK: &[&str] = &[
    "p", "div", "section", "article", "blockquote", "pre", "ul", "ol", "li", "table", "tr", "br",
    "dl", "dt", "dd",
];

/// One header-scoped chunk of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitChunk {
    /// Accumulated parent-header titles, outermost first.
    pub header_path: Vec<String>,
    /// Text content between this chunk's header and the next.
    pub text: String,
}

/// Split a sequence of sibling elements into header-scoped chunks.
///
/// Chunks with whitespace-only text are not emitted.
pub fn split_fragment(elements: &[ElementRef]) -> Vec<SplitChunk> {
    let mut chunks = Vec::new();
    let mut path: Vec<(u8, String)> = Vec::new();
    let mut current = String::new();

    for el in elements {
        walk(*el, &mut path, &mut current, &mut chunks);
    }
    flush(&path, &mut current, &mut chunks);

    chunks
}

fn walk(
    el: ElementRef,
    path: &mut Vec<(u8, String)>,
    current: &mut String,
    chunks: &mut Vec<SplitChunk>,
) {
    let name = el.value().name();
    if SUPPRESSED.contains(&name) {
        return;
    }

    if let Some(level) = heading_level(name) {
        flush(path, current, chunks);
        let title = el.text().collect::<String>().trim().to_string();
        while path.last().is_some_and(|(l, _)| *l >= level) {
            path.pop();
        }
        path.push((level, title));
        return;
    }

    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            walk(child_el, path, current, chunks);
        } else if let Some(text) = child.value().as_text() {
            current.push_str(text);
        }
    }

    if BLOCK.contains(&name) {
        current.push('\n');
    }
}

fn flush(path: &[(u8, String)], current: &mut String, chunks: &mut Vec<SplitChunk>) {
    let text = normalize(current);
    current.clear();
    if text.is_empty() {
        return;
    }
    chunks.push(SplitChunk {
        header_path: path.iter().map(|(_, title)| title.clone()).collect(),
        text,
    });
}

/// Heading level for `h1`..`h6`, `None` otherwise.
pub fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Trim per-line whitespace and collapse runs of blank lines.
fn normalize(raw: &str) -> String {
    let mut out = String::new();
    let mut blank = true;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !blank {
                out.push('\n');
            }
            blank = true;
        } else {
            out.push_str(line);
            out.push('\n');
            blank = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_elements(doc: &Html) -> Vec<ElementRef<'_>> {
        let body = Selector::parse("body").unwrap();
        doc.select(&body)
            .next()
            .unwrap()
            .children()
            .filter_map(ElementRef::wrap)
            .collect()
    }

    #[test]
    fn test_single_header_single_paragraph() {
        let doc = Html::parse_document("<body><h2>Mining</h2><p>Dig down.</p></body>");
        let chunks = split_fragment(&body_elements(&doc));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].header_path, vec!["Mining"]);
        assert_eq!(chunks[0].text, "Dig down.");
    }

    #[test]
    fn test_nested_headers_accumulate_parent_context() {
        let doc = Html::parse_document(
            "<body><h2>Mining</h2><div><p>Overview.</p><h3>Tools</h3><p>Use a pick.</p></div></body>",
        );
        let chunks = split_fragment(&body_elements(&doc));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].header_path, vec!["Mining"]);
        assert_eq!(chunks[0].text, "Overview.");
        assert_eq!(chunks[1].header_path, vec!["Mining", "Tools"]);
        assert_eq!(chunks[1].text, "Use a pick.");
    }

    #[test]
    fn test_same_level_header_replaces_sibling() {
        let doc = Html::parse_document(
            "<body><div><h3>First</h3><p>a</p><h3>Second</h3><p>b</p></div></body>",
        );
        let chunks = split_fragment(&body_elements(&doc));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].header_path, vec!["First"]);
        assert_eq!(chunks[1].header_path, vec!["Second"]);
    }

    #[test]
    fn test_higher_level_header_pops_stack() {
        let doc = Html::parse_document(
            "<body><div><h2>A</h2><h3>B</h3><p>deep</p><h2>C</h2><p>top</p></div></body>",
        );
        let chunks = split_fragment(&body_elements(&doc));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].header_path, vec!["A", "B"]);
        assert_eq!(chunks[1].header_path, vec!["C"]);
    }

    #[test]
    fn test_nav_and_aside_skipped() {
        let doc = Html::parse_document(
            "<body><h2>Topic</h2><nav><p>menu menu</p></nav><p>Real text.</p><aside>ads</aside></body>",
        );
        let chunks = split_fragment(&body_elements(&doc));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Real text.");
    }

    #[test]
    fn test_whitespace_only_chunks_dropped() {
        let doc = Html::parse_document("<body><h2>Empty</h2><p>   </p><div></div></body>");
        let chunks = split_fragment(&body_elements(&doc));
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_blank_line_collapse() {
        let doc = Html::parse_document(
            "<body><h2>T</h2><p>one</p><div></div><div></div><p>two</p></body>",
        );
        let chunks = split_fragment(&body_elements(&doc));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "one\n\ntwo");
    }
}
