//! Letter-group span indexing for editor syntax highlighting.
//!
//! The editor colorizes the raw source per "letter": the groups delimited by
//! `|` and `||`. This walks the same grammar as the tokenizer but keeps
//! character offsets, so it layers on top of the token stream without
//! touching the decoder. Comment lines highlight as a whole and contribute
//! no groups, matching the pre-pass that strips them before drawing.

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    /// A completed two-digit hex byte.
    Byte,
    Pipe,
    Newline,
    /// A whole `//` line.
    Comment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte range into the source text. A hex pair interrupted by a pipe
    /// spans across it, exactly as the tokenizer pairs it.
    pub range: Range<usize>,
    pub kind: SpanKind,
    /// Letter group the span belongs to; separators close the group they
    /// terminate.
    pub group: usize,
}

/// Scan `text` into highlight spans with letter-group indices.
pub fn highlight_spans(text: &str) -> Vec<HighlightSpan> {
    let mut out = Vec::new();
    let mut group = 0usize;

    let mut offset = 0usize;
    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let trimmed_end = line.trim_end_matches('\n').len();
        if line.trim_start().starts_with("//") {
            out.push(HighlightSpan {
                range: line_start..line_start + trimmed_end,
                kind: SpanKind::Comment,
                group,
            });
            continue;
        }

        scan_line(&line[..trimmed_end], line_start, &mut group, &mut out);
    }

    out
}

fn scan_line(line: &str, base: usize, group: &mut usize, out: &mut Vec<HighlightSpan>) {
    let mut pending: Option<usize> = None; // offset of a half-read hex digit

    let mut chars = line.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch == '|' {
            if matches!(chars.peek(), Some(&(_, '|'))) {
                chars.next();
                out.push(HighlightSpan {
                    range: base + i..base + i + 2,
                    kind: SpanKind::Newline,
                    group: *group,
                });
            } else {
                out.push(HighlightSpan {
                    range: base + i..base + i + 1,
                    kind: SpanKind::Pipe,
                    group: *group,
                });
            }
            *group += 1;
            continue;
        }
        if ch.is_ascii_hexdigit() {
            match pending.take() {
                Some(start) => out.push(HighlightSpan {
                    range: base + start..base + i + ch.len_utf8(),
                    kind: SpanKind::Byte,
                    group: *group,
                }),
                None => pending = Some(i),
            }
            continue;
        }
        pending = None;
    }
}
