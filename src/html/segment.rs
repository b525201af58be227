//! Markup segmentation into tag and text runs.
//!
//! This is a forgiving scanner, not a parser: it never fails. A `<` that
//! does not open a recognisable tag, or a tag that is never closed with `>`,
//! is kept as plain text. A stack of "skip" elements decides which text runs
//! may be rewritten: anything inside an anchor, code block, heading, form
//! control or embedded script is left alone.

/// Elements whose text content is never auto-linked.
pub const SKIP_TAGS: &[&str] = &[
    "a", "code", "pre", "script", "style", "textarea", "h1", "h2", "h3", "h4", "h5", "h6",
    "button", "select", "option", "label", "kbd", "samp", "iframe", "noscript", "svg", "math",
];

/// Elements whose text is not part of the visible body.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements whose content is raw text and may contain unescaped `<`.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Inline elements that do not separate words in extracted text.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Character data. `eligible` is false inside any skip element;
    /// `visible` is false inside script/style/noscript/template.
    Text { eligible: bool, visible: bool },
    /// An element tag with its lowercase name.
    Tag { name: String, role: TagRole },
    /// Comment, doctype or processing instruction.
    Other,
}

/// One contiguous run of the original markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub raw: String,
    pub kind: SegmentKind,
}

impl Segment {
    #[must_use]
    pub fn is_eligible_text(&self) -> bool {
        matches!(self.kind, SegmentKind::Text { eligible: true, .. })
    }

    pub(crate) fn text(raw: impl Into<String>, eligible: bool) -> Self {
        Self {
            raw: raw.into(),
            kind: SegmentKind::Text {
                eligible,
                visible: true,
            },
        }
    }
}

/// Split markup into segments and mark which text runs are eligible.
///
/// Concatenating the `raw` of every segment reproduces the input exactly.
pub fn segment_html(html: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut skip_stack: Vec<String> = Vec::new();
    let mut hidden_depth = 0usize;

    let bytes = html.as_bytes();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        let Some(markup) = scan_markup(html, pos) else {
            pos += 1;
            continue;
        };

        push_text(
            &mut segments,
            &html[text_start..pos],
            skip_stack.is_empty(),
            hidden_depth == 0,
        );

        let raw = &html[pos..markup.end];
        pos = markup.end;
        text_start = pos;

        let Some((name, role)) = markup.tag else {
            segments.push(Segment {
                raw: raw.to_string(),
                kind: SegmentKind::Other,
            });
            continue;
        };

        match role {
            TagRole::Open => {
                if SKIP_TAGS.contains(&name.as_str()) {
                    skip_stack.push(name.clone());
                }
                if HIDDEN_TAGS.contains(&name.as_str()) {
                    hidden_depth += 1;
                }
            }
            TagRole::Close => {
                if let Some(idx) = skip_stack.iter().rposition(|open| *open == name) {
                    skip_stack.truncate(idx);
                }
                if HIDDEN_TAGS.contains(&name.as_str()) {
                    hidden_depth = hidden_depth.saturating_sub(1);
                }
            }
            TagRole::SelfClosing => {}
        }

        let is_raw_text = role == TagRole::Open && RAW_TEXT_TAGS.contains(&name.as_str());
        segments.push(Segment {
            raw: raw.to_string(),
            kind: SegmentKind::Tag { name: name.clone(), role },
        });

        // Raw-text content runs verbatim to the matching close tag
        if is_raw_text {
            let close = find_close_tag(html, pos, &name).unwrap_or(html.len());
            push_text(&mut segments, &html[pos..close], false, hidden_depth == 0);
            pos = close;
            text_start = close;
        }
    }

    push_text(
        &mut segments,
        &html[text_start..],
        skip_stack.is_empty(),
        hidden_depth == 0,
    );
    segments
}

/// Reassemble segments into markup.
#[must_use]
pub fn join_segments(segments: &[Segment]) -> String {
    let len = segments.iter().map(|s| s.raw.len()).sum();
    let mut out = String::with_capacity(len);
    for segment in segments {
        out.push_str(&segment.raw);
    }
    out
}

/// Visible text of a markup fragment with entities decoded and whitespace
/// collapsed.
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len() / 2);
    for segment in segment_html(html) {
        match &segment.kind {
            SegmentKind::Text { visible: true, .. } => {
                text.push_str(&html_escape::decode_html_entities(&segment.raw));
            }
            SegmentKind::Tag { name, .. } if !INLINE_TAGS.contains(&name.as_str()) => {
                text.push(' ');
            }
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last visible character before segment `idx`, looking through inline
/// tags and comments. `None` when a block-level tag or the start of the
/// markup comes first.
pub(crate) fn char_before(segments: &[Segment], idx: usize) -> Option<char> {
    adjacent_char(segments[..idx].iter().rev(), |text| text.chars().next_back())
}

/// First visible character after segment `idx`; see [`char_before`].
pub(crate) fn char_after(segments: &[Segment], idx: usize) -> Option<char> {
    let rest = segments.get(idx + 1..).unwrap_or_default();
    adjacent_char(rest.iter(), |text| text.chars().next())
}

fn adjacent_char<'a>(
    neighbours: impl Iterator<Item = &'a Segment>,
    edge: impl Fn(&str) -> Option<char>,
) -> Option<char> {
    for segment in neighbours {
        match &segment.kind {
            SegmentKind::Text { visible: true, .. } => {
                let decoded = html_escape::decode_html_entities(&segment.raw);
                if let Some(c) = edge(&*decoded) {
                    return Some(c);
                }
            }
            SegmentKind::Text { .. } | SegmentKind::Other => {}
            SegmentKind::Tag { name, .. } if INLINE_TAGS.contains(&name.as_str()) => {}
            SegmentKind::Tag { .. } => return None,
        }
    }
    None
}

fn push_text(segments: &mut Vec<Segment>, raw: &str, eligible: bool, visible: bool) {
    if raw.is_empty() {
        return;
    }
    segments.push(Segment {
        raw: raw.to_string(),
        kind: SegmentKind::Text { eligible, visible },
    });
}

struct Markup {
    end: usize,
    tag: Option<(String, TagRole)>,
}

/// Recognise markup starting at `start` (which holds `<`).
fn scan_markup(html: &str, start: usize) -> Option<Markup> {
    let rest = &html[start..];
    let bytes = rest.as_bytes();
    let next = *bytes.get(1)?;

    if rest.starts_with("<!--") {
        let end = rest[4..].find("-->")? + 4 + 3;
        return Some(Markup {
            end: start + end,
            tag: None,
        });
    }

    if next == b'!' || next == b'?' {
        let end = rest.find('>')? + 1;
        return Some(Markup {
            end: start + end,
            tag: None,
        });
    }

    let (closing, name_start) = if next == b'/' { (true, 2) } else { (false, 1) };
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
        return None;
    }

    let name_len = rest[name_start..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b':')
        .count();
    let name = rest[name_start..name_start + name_len].to_ascii_lowercase();

    let end = find_tag_end(rest, name_start + name_len)?;
    let role = if closing {
        TagRole::Close
    } else if rest[..end].trim_end_matches('>').ends_with('/')
        || VOID_TAGS.contains(&name.as_str())
    {
        TagRole::SelfClosing
    } else {
        TagRole::Open
    };

    Some(Markup {
        end: start + end,
        tag: Some((name, role)),
    })
}

/// Find the `>` that ends a tag, skipping quoted attribute values.
fn find_tag_end(tag: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in tag.bytes().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i + 1),
                b'<' => return None,
                _ => {}
            },
        }
    }
    None
}

fn find_close_tag(html: &str, from: usize, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    let haystack = html[from..].to_ascii_lowercase();
    haystack.find(&needle).map(|idx| from + idx)
}
