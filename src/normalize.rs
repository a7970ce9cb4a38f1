//! Markdown blank-line normalization.
//!
//! Upstream report generators tend to emit markdown with block elements
//! jammed together (`# Title\ntext`, prose running straight into a list),
//! which many renderers then glue into a single paragraph. This pass walks
//! the document line by line and restores the blank-line separation between
//! block elements, leaving fenced code untouched.
//!
//! This is a line-level heuristic, not a markdown grammar. Nested lists and
//! quotes are classified by their leading marker only, and multi-line list
//! item continuations are treated as plain text. That matches the behavior
//! the rest of the pipeline (and the site renderer) was built around.

/// Block-level kind of a single line, judged from its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Heading,
    Quote,
    List,
    Rule,
    Text,
    /// A fence delimiter line (``` or ~~~).
    Fence,
}

/// Normalize blank-line separation between block elements.
///
/// - Strips a leading BOM and normalizes line endings to `\n` before scanning.
/// - Inserts a blank line before a list item that directly follows plain text.
/// - Inserts a blank line after a heading, blockquote, list item, or rule
///   when the next line is non-blank — unless it is a natural continuation
///   (quote after quote, list item after list item).
/// - Content inside fenced code blocks passes through byte-identical.
/// - The output ends with exactly one trailing newline.
pub fn normalize_spacing(raw: &str) -> String {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = text.split('\n').collect();

    let mut out: Vec<String> = Vec::new();
    // Kind of the most recently emitted line; None after a blank line.
    let mut prev_kind: Option<LineKind> = None;
    let mut in_fence = false;

    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            out.push((*line).to_string());
            in_fence = !in_fence;
            prev_kind = Some(LineKind::Fence);
            continue;
        }
        if in_fence {
            out.push((*line).to_string());
            continue;
        }
        if line.trim().is_empty() {
            out.push(String::new());
            prev_kind = None;
            continue;
        }

        let kind = classify_line(line);

        // A list item growing directly out of prose gets separated first.
        if kind == LineKind::List && prev_kind == Some(LineKind::Text) {
            out.push(String::new());
        }

        out.push((*line).to_string());
        prev_kind = Some(kind);

        if matches!(
            kind,
            LineKind::Heading | LineKind::Quote | LineKind::List | LineKind::Rule
        ) {
            if let Some(next) = lines.get(i + 1) {
                if !next.trim().is_empty() && !is_continuation(kind, next) {
                    out.push(String::new());
                    prev_kind = None;
                }
            }
        }
    }

    format!("{}\n", out.join("\n").trim_end())
}

/// Consecutive quote lines and consecutive list items stay packed together.
fn is_continuation(kind: LineKind, next: &str) -> bool {
    if is_fence(next) {
        return false;
    }
    let next_kind = classify_line(next);
    matches!(
        (kind, next_kind),
        (LineKind::Quote, LineKind::Quote) | (LineKind::List, LineKind::List)
    )
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

fn classify_line(line: &str) -> LineKind {
    let t = line.trim_start();

    // Horizontal rule has to win over the unordered-list check ("- - -").
    if is_rule(t) {
        return LineKind::Rule;
    }
    if is_heading(t) {
        return LineKind::Heading;
    }
    if t.starts_with('>') {
        return LineKind::Quote;
    }
    if is_list_item(t) {
        return LineKind::List;
    }
    LineKind::Text
}

/// `#` through `######` followed by whitespace.
fn is_heading(t: &str) -> bool {
    let hashes = t.chars().take_while(|&c| c == '#').count();
    (1..=6).contains(&hashes)
        && t[hashes..]
            .chars()
            .next()
            .is_some_and(|c| c == ' ' || c == '\t')
}

/// `- `, `* `, `+ `, or an ordered marker like `3. ` / `3) `.
fn is_list_item(t: &str) -> bool {
    let mut chars = t.chars();
    match chars.next() {
        Some('-') | Some('*') | Some('+') => matches!(chars.next(), Some(' ') | Some('\t')),
        Some(c) if c.is_ascii_digit() => {
            let rest = t.trim_start_matches(|c: char| c.is_ascii_digit());
            let mut rest_chars = rest.chars();
            matches!(rest_chars.next(), Some('.') | Some(')'))
                && matches!(rest_chars.next(), Some(' ') | Some('\t'))
        }
        _ => false,
    }
}

/// Three or more of the same `-`/`*`/`_` marker, optionally space-separated.
fn is_rule(t: &str) -> bool {
    let mut marker = None;
    let mut count = 0usize;
    for c in t.chars() {
        if c == ' ' || c == '\t' {
            continue;
        }
        match marker {
            None if c == '-' || c == '*' || c == '_' => {
                marker = Some(c);
                count = 1;
            }
            Some(m) if c == m => count += 1,
            _ => return false,
        }
    }
    count >= 3
}
