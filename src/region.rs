/**
This module contains the `Region` datastructure and the line-delimited record store it is read
from and written to. A region is one unit of text (a sentence or document segment) carrying its
parallel token and tag sequences. Regions are validated at construction: the two sequences must
have the same length, so a `Region` can always be decoded.
*/
use crate::decoder::{self, LengthMismatchError, RenderingUnit, Span};
use serde::{Deserialize, Serialize};
use serde_jsonlines::{JsonLinesReader, JsonLinesWriter};
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::num::NonZeroUsize;
use std::path::Path;

/// One reviewable unit of text. On the wire, a region is a single JSON line with two keys:
/// `words`, the ordered token sequence, and `events`, the ordered BIO tag sequence of the same
/// length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion")]
pub struct Region {
    words: Vec<String>,
    events: Vec<String>,
}

/// Wire representation, before the length check.
#[derive(Deserialize)]
struct RawRegion {
    words: Vec<String>,
    events: Vec<String>,
}

impl TryFrom<RawRegion> for Region {
    type Error = LengthMismatchError;
    fn try_from(value: RawRegion) -> Result<Self, Self::Error> {
        Region::new(value.words, value.events)
    }
}

impl Region {
    pub fn new(words: Vec<String>, events: Vec<String>) -> Result<Self, LengthMismatchError> {
        if words.len() != events.len() {
            return Err(LengthMismatchError {
                tokens: words.len(),
                tags: events.len(),
            });
        }
        Ok(Region { words, events })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Decodes this region into its rendering units. See
    /// [`decode_to_rendering_units`](decoder::decode_to_rendering_units).
    pub fn rendering_units(&self) -> Vec<RenderingUnit> {
        match decoder::decode_to_rendering_units(&self.words, &self.events) {
            Ok(units) => units,
            // A Region is length-checked at construction.
            Err(_) => unreachable!(),
        }
    }

    /// Decodes this region into its flat span list. See [`extract_spans`](decoder::extract_spans).
    pub fn spans(&self) -> Vec<Span> {
        match decoder::extract_spans(&self.words, &self.events) {
            Ok(spans) => spans,
            Err(_) => unreachable!(),
        }
    }

    /// Decodes this region into both its rendering units and its span list in a single pass.
    pub fn decode(&self) -> (Vec<RenderingUnit>, Vec<Span>) {
        match decoder::decode(&self.words, &self.events) {
            Ok(decoded) => decoded,
            Err(_) => unreachable!(),
        }
    }

    /// Splits this region into `ceil(len / max_tokens)` near-equal sub-regions. The base chunk
    /// size is `len / chunks` and the first `len % chunks` chunks receive one extra token. An
    /// empty region yields no chunks.
    ///
    /// The split is by raw token count only and may cut through a span. The review tools this
    /// crate was extracted from behave the same way, and their recorded span keys depend on it,
    /// so the behavior is kept as is.
    pub fn chunk(&self, max_tokens: NonZeroUsize) -> Vec<Region> {
        let total = self.len();
        if total == 0 {
            return Vec::new();
        }
        let chunks = total.div_ceil(max_tokens.get());
        let base = total / chunks;
        let extra = total % chunks;
        let mut out = Vec::with_capacity(chunks);
        let mut offset = 0;
        for i in 0..chunks {
            let size = if i < extra { base + 1 } else { base };
            out.push(Region {
                words: self.words[offset..offset + size].to_vec(),
                events: self.events[offset..offset + size].to_vec(),
            });
            offset += size;
        }
        out
    }
}

#[derive(Debug)]
/// Errors encountered while reading regions from a record store.
pub enum RegionError {
    /// The underlying reader failed.
    Io(std::io::Error),
    /// A record line could not be parsed into a region. Lines are counted from zero, matching the
    /// region indices used by the review bookkeeping.
    Parse { line: usize, source: std::io::Error },
}

impl Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => std::fmt::Display::fmt(err, f),
            Self::Parse { line, source } => {
                write!(f, "Could not parse the record at line {}: {}", line, source)
            }
        }
    }
}

impl Error for RegionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RegionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Reads every region of a line-delimited record store. Each line must be a JSON mapping with the
/// `words` and `events` keys. A malformed line or a length mismatch between the two sequences is
/// reported with its line number instead of being silently absorbed.
pub fn read_regions_from<R: BufRead>(reader: R) -> Result<Vec<Region>, RegionError> {
    let lines = JsonLinesReader::new(reader);
    let mut regions = Vec::new();
    for (line, record) in lines.read_all::<Region>().enumerate() {
        let region = record.map_err(|source| RegionError::Parse { line, source })?;
        regions.push(region);
    }
    Ok(regions)
}

/// Reads every region of the record store at `path`. See [`read_regions_from`].
pub fn read_regions<P: AsRef<Path>>(path: P) -> Result<Vec<Region>, RegionError> {
    let file = File::open(path)?;
    read_regions_from(BufReader::new(file))
}

/// Writes regions as line-delimited JSON records, one region per line.
pub fn write_regions_to<W: Write>(regions: &[Region], writer: W) -> std::io::Result<()> {
    let mut lines = JsonLinesWriter::new(writer);
    for region in regions {
        lines.write(region)?;
    }
    lines.flush()
}

/// Writes regions to the record store at `path`. See [`write_regions_to`].
pub fn write_regions<P: AsRef<Path>>(regions: &[Region], path: P) -> std::io::Result<()> {
    let file = File::create(path)?;
    write_regions_to(regions, file)
}
