/**
This module gives the tooling necessary to decode a sequence of BIO tagged tokens into rendering
units and spans. Both operations share a single internal scanner, so the spans extracted on their
own always agree, in order and in content, with the tagged rendering units produced for the same
region.
*/
use ahash::AHashSet;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Display;

/// A single BIO tag. `B-<label>` begins a span of type `<label>`, `I-<label>` continues one and
/// `O` marks a token outside of any span.
///
/// Parsing is infallible: any string that does not start with `B-` or `I-` is treated as an
/// outside tag. This mirrors the tolerance of the review tools consuming the decoder, where an
/// unknown tag renders as plain text rather than aborting the display pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BioTag<'a> {
    Outside,
    Begin(&'a str),
    Inside(&'a str),
}

impl<'a> BioTag<'a> {
    pub fn from_raw(raw: &'a str) -> Self {
        if let Some(label) = raw.strip_prefix("B-") {
            BioTag::Begin(label)
        } else if let Some(label) = raw.strip_prefix("I-") {
            BioTag::Inside(label)
        } else {
            BioTag::Outside
        }
    }
}

impl<'a> Display for BioTag<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outside => write!(f, "O"),
            Self::Begin(label) => write!(f, "B-{}", label),
            Self::Inside(label) => write!(f, "I-{}", label),
        }
    }
}

/// A span is a maximal contiguous run of tokens sharing one label. `start` and `end` index into
/// the token sequence of the region the span was decoded from, with `end` exclusive. `text` is the
/// tokens of the run joined with a single space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.text, self.label, self.start, self.end)
    }
}

/// A rendering unit is either a run of untagged tokens or a labeled span, both realized as tokens
/// joined with a single space and no trailing separator. Concatenating the token sequences of the
/// units in emitted order reproduces the region exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderingUnit {
    Plain(String),
    Tagged { text: String, label: String },
}

impl RenderingUnit {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Tagged { text, .. } => text,
        }
    }

    /// The label of a tagged unit, or `None` for a plain run.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Tagged { label, .. } => Some(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The token and tag sequences of a region must have the same length.
pub struct LengthMismatchError {
    pub tokens: usize,
    pub tags: usize,
}

impl Display for LengthMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The number of tokens ({}) does not match the number of tags ({})",
            self.tokens, self.tags
        )
    }
}

impl Error for LengthMismatchError {}

/// Intermediary segmentation shared by both public operations.
enum Segment {
    Plain(String),
    Tagged(Span),
}

fn flush_plain(segments: &mut Vec<Segment>, plain: &mut Vec<&str>) {
    if !plain.is_empty() {
        segments.push(Segment::Plain(plain.iter().join(" ")));
        plain.clear();
    }
}

fn flush_span(segments: &mut Vec<Segment>, open: &mut Option<(usize, String, Vec<&str>)>) {
    if let Some((start, label, tokens)) = open.take() {
        segments.push(Segment::Tagged(Span {
            start,
            end: start + tokens.len(),
            label,
            text: tokens.iter().join(" "),
        }));
    }
}

/// Scans the tags left to right, flushing eagerly on every label-class change. At most one of the
/// two accumulators is non-empty at any point of the scan, so the relative flush order only
/// matters in that it preserves document order.
fn segments<T, U>(tokens: &[T], tags: &[U]) -> Result<Vec<Segment>, LengthMismatchError>
where
    T: AsRef<str>,
    U: AsRef<str>,
{
    if tokens.len() != tags.len() {
        return Err(LengthMismatchError {
            tokens: tokens.len(),
            tags: tags.len(),
        });
    }
    let mut segments: Vec<Segment> = Vec::new();
    let mut plain: Vec<&str> = Vec::new();
    let mut open: Option<(usize, String, Vec<&str>)> = None;
    for (index, (token, tag)) in tokens.iter().zip(tags.iter()).enumerate() {
        let token = token.as_ref();
        match BioTag::from_raw(tag.as_ref()) {
            BioTag::Begin(label) => {
                flush_plain(&mut segments, &mut plain);
                flush_span(&mut segments, &mut open);
                open = Some((index, label.to_string(), vec![token]));
            }
            BioTag::Inside(label) => match open.as_mut() {
                // The label of the open span is kept even if the `I-` label differs. This is a
                // documented tolerance of the source data, not an oversight.
                Some((_, _, span_tokens)) => span_tokens.push(token),
                // A dangling `I-` establishes the span it claims to continue.
                None => open = Some((index, label.to_string(), vec![token])),
            },
            BioTag::Outside => {
                flush_span(&mut segments, &mut open);
                plain.push(token);
            }
        }
    }
    flush_plain(&mut segments, &mut plain);
    flush_span(&mut segments, &mut open);
    Ok(segments)
}

/// Decodes a region into its ordered sequence of rendering units: plain runs of untagged tokens
/// interleaved with labeled spans, in document order. Empty inputs yield an empty sequence.
/// Mismatched sequence lengths are rejected instead of being silently truncated.
///
/// # Example
/// ```rust
/// use spanmark::{decode_to_rendering_units, RenderingUnit};
///
/// let tokens = ["The", "VOC", "ship", "arrived"];
/// let tags = ["O", "B-ORG", "I-ORG", "O"];
/// let units = decode_to_rendering_units(&tokens, &tags).unwrap();
/// assert_eq!(
///     units,
///     vec![
///         RenderingUnit::Plain("The".to_string()),
///         RenderingUnit::Tagged { text: "VOC ship".to_string(), label: "ORG".to_string() },
///         RenderingUnit::Plain("arrived".to_string()),
///     ]
/// );
/// ```
pub fn decode_to_rendering_units<T, U>(
    tokens: &[T],
    tags: &[U],
) -> Result<Vec<RenderingUnit>, LengthMismatchError>
where
    T: AsRef<str>,
    U: AsRef<str>,
{
    let segments = segments(tokens, tags)?;
    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(text) => RenderingUnit::Plain(text),
            Segment::Tagged(span) => RenderingUnit::Tagged {
                text: span.text,
                label: span.label,
            },
        })
        .collect())
}

/// Decodes a region into its flat list of spans, in document order. The labels and texts of the
/// returned spans are identical, in the same order, to the tagged rendering units produced by
/// [`decode_to_rendering_units`] on the same input. The review tools rely on this agreement: their
/// per-span bookkeeping keys are derived from this list's ordering while the spans themselves are
/// rendered inline.
pub fn extract_spans<T, U>(tokens: &[T], tags: &[U]) -> Result<Vec<Span>, LengthMismatchError>
where
    T: AsRef<str>,
    U: AsRef<str>,
{
    let segments = segments(tokens, tags)?;
    Ok(segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Plain(_) => None,
            Segment::Tagged(span) => Some(span),
        })
        .collect())
}

/// Decodes a region into both its rendering units and its span list in a single pass.
pub fn decode<T, U>(
    tokens: &[T],
    tags: &[U],
) -> Result<(Vec<RenderingUnit>, Vec<Span>), LengthMismatchError>
where
    T: AsRef<str>,
    U: AsRef<str>,
{
    let segments = segments(tokens, tags)?;
    let mut units = Vec::with_capacity(segments.len());
    let mut spans = Vec::new();
    for segment in segments {
        match segment {
            Segment::Plain(text) => units.push(RenderingUnit::Plain(text)),
            Segment::Tagged(span) => {
                units.push(RenderingUnit::Tagged {
                    text: span.text.clone(),
                    label: span.label.clone(),
                });
                spans.push(span);
            }
        }
    }
    Ok((units, spans))
}

/// Collects the unique labels of a list of spans into a HashSet.
pub fn unique_labels(spans: &[Span]) -> AHashSet<&str> {
    AHashSet::from_iter(spans.iter().map(|span| span.label.as_str()))
}
