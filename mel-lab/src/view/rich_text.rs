//! `**bold**` emphasis parsing for synopsis text

const MARKER: &str = "**";

/// A run of text with uniform emphasis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Emphasis(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(t) | Span::Emphasis(t) => t,
        }
    }
}

/// One line of synopsis text
pub type Paragraph = Vec<Span>;

/// Split text into paragraphs on `\n`, dropping blank lines
pub fn parse(text: &str) -> Vec<Paragraph> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(parse_paragraph)
        .collect()
}

/// Split one paragraph into spans
///
/// Marker pairs become emphasis without the markers. A trailing unmatched
/// marker stays literal. Empty pairs (`****`) are removed
/// and the text around them joins into one span.
pub fn parse_paragraph(line: &str) -> Paragraph {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while let Some(open) = rest.find(MARKER) {
        let after_open = &rest[open + MARKER.len()..];
        let Some(close) = after_open.find(MARKER) else {
            break;
        };

        plain.push_str(&rest[..open]);
        let emphasized = &after_open[..close];
        if !emphasized.is_empty() {
            if !plain.is_empty() {
                spans.push(Span::Plain(std::mem::take(&mut plain)));
            }
            spans.push(Span::Emphasis(emphasized.to_string()));
        }
        rest = &after_open[close + MARKER.len()..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        spans.push(Span::Plain(plain));
    }
    spans
}
