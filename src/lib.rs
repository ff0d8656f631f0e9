/*!
This library is the shared core of a set of interactive data-labeling review tools for BIO tagged
text. The tools render regions of tagged tokens as highlighted spans in a browser UI, let a human
mark each span correct or wrong and export the verdicts as CSV. Six near-duplicate scripts used to
re-implement the same decoding loop; this crate consolidates it into one decoder with a stable,
tested contract, plus the record store, conversion and review bookkeeping around it.

# BIO TAGGING
Each token carries one tag:
* `B-<label>`: the token begins a span of type `<label>`.
* `I-<label>`: the token continues the currently open span.
* `O`: the token is outside of any span.

Decoding is deliberately tolerant, matching the data the review tools actually see: a dangling
`I-` tag establishes the span it claims to continue, and the label of an `I-` tag is not checked
against the open span's label. Malformed records and mismatched sequence lengths, on the other
hand, are hard errors.

# Terminology
* A region is one unit of text (a sentence or document segment) with its parallel token and tag
    sequences, stored as one JSON line in a record store.
* A span is a maximal contiguous run of tokens sharing one label, derived from the tags.
* A rendering unit is either a plain-text run or a labeled span; the ordered units of a region
    partition its tokens for display.
* A verdict is a reviewer's judgment on a displayed span, kept in a [`ReviewStore`] under a typed
    [`SpanKey`].
*/

mod config;
mod convert;
mod decoder;
mod region;
mod review;

// The public api starts here
pub use config::{Layout, RenderConfig, RenderConfigBuilder};

pub use convert::{
    convert_csv_to_records, regions_from_csv, split_at_sentinel, ConvertError, NEWLINE_SENTINEL,
};

pub use decoder::{
    decode, decode_to_rendering_units, extract_spans, unique_labels, BioTag, LengthMismatchError,
    RenderingUnit, Span,
};

pub use region::{
    read_regions, read_regions_from, write_regions, write_regions_to, Region, RegionError,
};

pub use review::{
    ReviewDecision, ReviewStore, SpanKey, Verdict, VerdictParsingError, VerdictVocabulary,
};

/// One displayable piece of a region: its chunk index when the session chunks long regions
/// (`None` otherwise), its rendering units and its span list. The span list's ordering is what
/// the display layer derives its [`SpanKey`]s from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChunk {
    pub chunk: Option<usize>,
    pub units: Vec<RenderingUnit>,
    pub spans: Vec<Span>,
}

/// Main entrypoint of the spanmark library. This function decodes a region for display,
/// applying the chunking of the given config first so that the chunk and span indices line up
/// with the keys the review bookkeeping uses.
///
/// # Example
/// ```rust
/// use spanmark::{decode_region_conf, Region, RenderConfigBuilder};
///
/// let region = Region::new(
///     vec!["The".into(), "VOC".into(), "ship".into(), "arrived".into()],
///     vec!["O".into(), "B-ORG".into(), "I-ORG".into(), "O".into()],
/// )
/// .unwrap();
/// let config = RenderConfigBuilder::default().build();
///
/// let decoded = decode_region_conf(&region, &config);
/// assert_eq!(decoded.len(), 1);
/// assert_eq!(decoded[0].chunk, None);
/// assert_eq!(decoded[0].spans[0].text, "VOC ship");
/// assert_eq!(decoded[0].spans[0].label, "ORG");
/// ```
pub fn decode_region_conf(region: &Region, config: &RenderConfig) -> Vec<DecodedChunk> {
    match config.chunking() {
        None => {
            let (units, spans) = region.decode();
            vec![DecodedChunk {
                chunk: None,
                units,
                spans,
            }]
        }
        Some(max_tokens) => region
            .chunk(max_tokens)
            .into_iter()
            .enumerate()
            .map(|(index, sub_region)| {
                let (units, spans) = sub_region.decode();
                DecodedChunk {
                    chunk: Some(index),
                    units,
                    spans,
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn test_decode_region_conf_without_chunking() {
        let region = Region::new(
            vec!["Batavia".into(), "1782".into()],
            vec!["B-LOC".into(), "B-DATE".into()],
        )
        .unwrap();
        let decoded = decode_region_conf(&region, &RenderConfig::default());
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].chunk, None);
        assert_eq!(decoded[0].spans.len(), 2);
    }

    #[test]
    fn test_decode_region_conf_with_chunking() {
        let words: Vec<String> = (0..320).map(|i| format!("w{}", i)).collect();
        let events: Vec<String> = vec!["O".to_string(); 320];
        let region = Region::new(words, events).unwrap();
        let config = RenderConfigBuilder::default()
            .chunking(NonZeroUsize::new(150).unwrap())
            .build();
        let decoded = decode_region_conf(&region, &config);
        let chunk_indices: Vec<Option<usize>> = decoded.iter().map(|d| d.chunk).collect();
        assert_eq!(chunk_indices, vec![Some(0), Some(1), Some(2)]);
        // All-outside chunks each render as one plain unit.
        assert!(decoded.iter().all(|d| d.units.len() == 1 && d.spans.is_empty()));
    }
}
