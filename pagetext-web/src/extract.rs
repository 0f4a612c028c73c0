//! HTML to plain text.
//!
//! Pure functions with no I/O: byte decoding, markup stripping and the
//! line/phrase whitespace normalisation applied to every extracted page.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scraper::{Html, Node};

/// Elements whose contents never reach the extracted text.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Elements the HTML parser keeps as raw markup; their bodies are parsed
/// again so only the text inside reaches the output.
const RAWTEXT_REPARSED: &[&str] = &["noscript", "iframe", "noembed", "noframes", "xmp"];

/// Decode a response body using the encoding detected from the bytes
/// themselves. Any charset the server declared is ignored.
///
/// `tld` (e.g. `"cn"`, `"fr"`) is a hint for the detector.
pub fn decode_body(bytes: &[u8], tld: Option<&str>) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let tld = tld.filter(|t| {
        !t.is_empty()
            && t
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    });
    let encoding: &'static Encoding = detector.guess(tld.map(str::as_bytes), true);
    tracing::trace!(encoding = encoding.name(), "extract.decode");
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Parse `html`, drop `script`/`style` contents and return normalised text.
///
/// ```
/// use pagetext_web::extract::html_to_text;
///
/// let text = html_to_text("<script>alert(1)</script><p>Hello  World</p>");
/// assert_eq!(text, "Hello\nWorld");
/// ```
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 2);
    collect_text(&document, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(document: &Html, out: &mut String) {
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let mut enclosing = node
            .ancestors()
            .filter_map(|a| a.value().as_element().map(|e| e.name()));
        let parent = enclosing.next();
        if parent.is_some_and(is_stripped) || enclosing.any(is_stripped) {
            continue;
        }
        if parent.is_some_and(|name| RAWTEXT_REPARSED.contains(&name)) {
            collect_text(&Html::parse_fragment(&text.text), out);
            continue;
        }
        out.push_str(&text.text);
    }
}

fn is_stripped(name: &str) -> bool {
    STRIPPED_ELEMENTS.contains(&name)
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split into lines, trim, split each line on two-space runs, trim again,
/// drop empties and join with `\n`.
///
/// Only the exact sequence of two spaces separates phrases; a single space
/// or a tab inside a line is kept.
///
/// ```
/// use pagetext_web::extract::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  a b  c\n\n\td\te  "), "a b\nc\nd\te");
/// ```
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split(is_line_boundary)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
