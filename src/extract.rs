//! Title and summary extraction from report markdown.
//!
//! The title is the first level-1 heading anywhere in the document, falling
//! back to the first non-blank line, then to a fixed label. The summary is a
//! rough plain-text rendering of the body — code, images, and link targets
//! stripped — cut to the first 120 characters.

/// Maximum summary length in characters (not bytes).
const SUMMARY_MAX_CHARS: usize = 120;

/// Title used when the document is entirely blank.
const FALLBACK_TITLE: &str = "日报";

/// Extract `(title, summary)` from markdown. Pure; never fails.
pub fn extract_title_summary(md: &str) -> (String, String) {
    let title = md
        .lines()
        .find_map(h1_text)
        .or_else(|| md.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or(FALLBACK_TITLE)
        .to_string();

    let plain = strip_images_and_links(&strip_code_spans(md));
    let plain: String = plain
        .chars()
        .map(|c| {
            if matches!(c, '#' | '>' | '*' | '_' | '`' | '~' | '-') {
                ' '
            } else {
                c
            }
        })
        .collect();
    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    let summary = if plain.chars().count() > SUMMARY_MAX_CHARS {
        let head: String = plain.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        plain
    };

    (title, summary)
}

/// The text of a level-1 heading line (`# Title`), if this line is one.
fn h1_text(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?;
    if !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None; // `##` and deeper are not titles
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

/// Drop everything between backtick runs (inline code and fenced blocks).
/// An unmatched opening run is left in place.
fn strip_code_spans(md: &str) -> String {
    let mut out = String::new();
    let mut rest = md;
    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let after_open = rest[start..].trim_start_matches('`');
        match after_open.find('`') {
            Some(pos) => {
                rest = after_open[pos..].trim_start_matches('`');
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Remove `![alt](src)` images entirely and reduce `[text](url)` links to
/// their visible text. Anything that does not parse as either form is
/// passed through unchanged.
fn strip_images_and_links(md: &str) -> String {
    let mut out = String::new();
    let mut rest = md;
    loop {
        let Some(pos) = rest.find('[') else {
            out.push_str(rest);
            break;
        };
        let is_image = pos > 0 && rest.as_bytes()[pos - 1] == b'!';
        let head_end = if is_image { pos - 1 } else { pos };

        let after = &rest[pos + 1..];
        if let Some(close) = after.find(']') {
            let label = &after[..close];
            if let Some(target) = after[close + 1..].strip_prefix('(') {
                if let Some(paren) = target.find(')') {
                    out.push_str(&rest[..head_end]);
                    if !is_image {
                        out.push_str(label);
                    }
                    rest = &target[paren + 1..];
                    continue;
                }
            }
        }

        // Bare bracket, keep it and move on.
        out.push_str(&rest[..pos + 1]);
        rest = &rest[pos + 1..];
    }
    out
}
