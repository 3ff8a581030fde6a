//! Directory-listing scraping.
//!
//! Static file servers expose auto-generated HTML index pages rather than
//! a listing API. This module pulls hyperlink targets out of such pages
//! and normalizes them into archive-relative paths. The shapes handled
//! here are a compatibility shim for the hosts observed in the wild, not
//! a protocol: `href="…"`, `href='…'`, `data-href="…"`, and as a last
//! resort literal `…lifelog/YYYY/MM/DD.jsonl` paths anywhere in the body.

/// Path segment that anchors archive-relative normalization.
const ROOT_SEGMENT: &str = "lifelog/";

/// Extract hyperlink targets from a listing page.
///
/// Each strategy is tried only when the previous one found nothing, so a
/// page mixing shapes is read with its dominant one.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let double = scan_attr(html, "href=\"", '"');
    if !double.is_empty() {
        return double;
    }
    let single = scan_attr(html, "href='", '\'');
    if !single.is_empty() {
        return single;
    }
    let data = scan_attr(html, "data-href=\"", '"');
    if !data.is_empty() {
        return data;
    }
    scan_literal_paths(html)
}

/// Normalize a raw href into an archive-relative path.
///
/// Strips query and fragment, percent-decodes (best effort), converts
/// backslashes, drops a leading slash, and cuts everything up to and
/// including the `lifelog/` segment so absolute listing links and
/// relative ones normalize identically.
pub fn normalize_href(href: &str) -> String {
    let mut clean = href;
    if let Some(pos) = clean.find('?') {
        clean = &clean[..pos];
    }
    if let Some(pos) = clean.find('#') {
        clean = &clean[..pos];
    }
    let mut decoded = percent_decode(clean).replace('\\', "/");
    if let Some(stripped) = decoded.strip_prefix('/') {
        decoded = stripped.to_string();
    }
    if let Some(pos) = decoded.find(ROOT_SEGMENT) {
        decoded = decoded[pos + ROOT_SEGMENT.len()..].to_string();
    }
    decoded
}

/// Classify a listing item as a directory token of exactly `len` digits
/// (4 for a year folder, 2 for a month folder). Returned with a trailing
/// slash, ready to append to a base URL.
pub fn dir_token(value: &str, len: usize) -> Option<String> {
    let token = value.strip_suffix('/').unwrap_or(value);
    if token.len() == len && token.bytes().all(|b| b.is_ascii_digit()) {
        Some(format!("{}/", token))
    } else {
        None
    }
}

fn scan_attr(html: &str, prefix: &str, close: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(prefix) {
        let value_start = start + prefix.len();
        match rest[value_start..].find(close) {
            Some(end) => {
                out.push(rest[value_start..value_start + end].to_string());
                rest = &rest[value_start + end + 1..];
            }
            None => break,
        }
    }
    out
}

/// Literal `…lifelog/YYYY/MM/DD.jsonl` paths embedded anywhere in a body
/// that carries no anchors at all (JSON listings, plain-text indexes).
fn scan_literal_paths(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = body;
    while let Some(pos) = rest.find(ROOT_SEGMENT) {
        let after = &rest[pos + ROOT_SEGMENT.len()..];
        if let Some(key) = leading_day_path(after) {
            out.push(key.to_string());
        }
        rest = &rest[pos + ROOT_SEGMENT.len()..];
    }
    out
}

/// The `YYYY/MM/DD.jsonl` prefix of a string, if present.
fn leading_day_path(s: &str) -> Option<&str> {
    const SHAPE: &str = "dddd/dd/dd.jsonl";
    let candidate = s.get(..SHAPE.len())?;
    let ok = candidate
        .bytes()
        .zip(SHAPE.bytes())
        .all(|(b, want)| match want {
            b'd' => b.is_ascii_digit(),
            _ => b == want,
        });
    if ok {
        Some(candidate)
    } else {
        None
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(b) = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}
