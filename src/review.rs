/**
This module holds the review-decision state of a labeling session. The original tools kept one
process-wide dictionary keyed by ad hoc string concatenation of file, region, chunk and span
index. Here the key is an explicit structure, the verdict is an enum, and the store's lifetime is
explicit: created at session start, cleared on reset, exported on demand. Recording twice under
the same key keeps the last decision.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

/// Identifies one reviewable span: the source file, the region index within that file, the chunk
/// index when the region was displayed in chunks, and the span index within the decoded span
/// list. The decoder guarantees stable span ordering for a given region, which is what makes this
/// key reusable across re-renders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpanKey {
    pub file: String,
    pub region: usize,
    pub chunk: Option<usize>,
    pub span: usize,
}

/// A reviewer's judgment on a displayed span. The surface wording depends on the
/// [`VerdictVocabulary`] of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    Reject,
}

/// The wording used when exporting verdicts. Gold-data review sessions use `correct`/`wrong`,
/// prediction review sessions use `useful`/`misleading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize, Default)]
pub enum VerdictVocabulary {
    #[default]
    CorrectWrong,
    UsefulMisleading,
}

impl VerdictVocabulary {
    pub fn word(&self, verdict: Verdict) -> &'static str {
        match (self, verdict) {
            (Self::CorrectWrong, Verdict::Accept) => "correct",
            (Self::CorrectWrong, Verdict::Reject) => "wrong",
            (Self::UsefulMisleading, Verdict::Accept) => "useful",
            (Self::UsefulMisleading, Verdict::Reject) => "misleading",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Verdict {
    type Err = VerdictParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "correct" | "useful" => Ok(Verdict::Accept),
            "wrong" | "misleading" => Ok(Verdict::Reject),
            _ => Err(VerdictParsingError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub struct VerdictParsingError(String);

impl Display for VerdictParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Impossible to parse the string ({}) into a Verdict",
            self.0
        )
    }
}

impl Error for VerdictParsingError {}

/// One recorded decision: the span as the reviewer saw it, plus the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub text: String,
    pub label: String,
    pub verdict: Verdict,
}

/// In-memory store of the decisions of one review session. Decisions are kept in key order, so
/// iterating or exporting is deterministic for a given set of decisions, regardless of the order
/// the reviewer clicked in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewStore {
    decisions: BTreeMap<SpanKey, ReviewDecision>,
    vocabulary: VerdictVocabulary,
}

impl ReviewStore {
    pub fn new(vocabulary: VerdictVocabulary) -> Self {
        ReviewStore {
            decisions: BTreeMap::new(),
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> VerdictVocabulary {
        self.vocabulary
    }

    /// Records a decision. Recording under an already-used key replaces the previous decision and
    /// returns it.
    pub fn record(&mut self, key: SpanKey, decision: ReviewDecision) -> Option<ReviewDecision> {
        self.decisions.insert(key, decision)
    }

    pub fn get(&self, key: &SpanKey) -> Option<&ReviewDecision> {
        self.decisions.get(key)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Drops every recorded decision. The explicit reset of a session.
    pub fn clear(&mut self) {
        self.decisions.clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpanKey, &ReviewDecision)> {
        self.decisions.iter()
    }

    /// Exports the decisions as CSV with the columns `file`, `region`, `chunk`, `text`, `label`
    /// and `verdict`, in key order. The chunk column is empty for regions displayed unchunked.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["file", "region", "chunk", "text", "label", "verdict"])?;
        for (key, decision) in &self.decisions {
            let region = key.region.to_string();
            let chunk = key.chunk.map(|c| c.to_string()).unwrap_or_default();
            csv_writer.write_record([
                key.file.as_str(),
                region.as_str(),
                chunk.as_str(),
                decision.text.as_str(),
                decision.label.as_str(),
                self.vocabulary.word(decision.verdict),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use enum_iterator::all;
    use rstest::rstest;

    fn key(region: usize, span: usize) -> SpanKey {
        SpanKey {
            file: String::from("1812"),
            region,
            chunk: None,
            span,
        }
    }

    fn decision(text: &str, label: &str, verdict: Verdict) -> ReviewDecision {
        ReviewDecision {
            text: text.to_string(),
            label: label.to_string(),
            verdict,
        }
    }

    #[test]
    fn test_record_is_last_write_wins() {
        let mut store = ReviewStore::default();
        store.record(key(0, 0), decision("Batavia", "LOC", Verdict::Accept));
        let previous = store.record(key(0, 0), decision("Batavia", "LOC", Verdict::Reject));
        assert_eq!(previous.unwrap().verdict, Verdict::Accept);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key(0, 0)).unwrap().verdict, Verdict::Reject);
    }

    #[test]
    fn test_clear_resets_the_session() {
        let mut store = ReviewStore::default();
        store.record(key(0, 0), decision("Batavia", "LOC", Verdict::Accept));
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_export_is_in_key_order() {
        let mut store = ReviewStore::default();
        store.record(key(3, 0), decision("1782", "DATE", Verdict::Reject));
        store.record(key(0, 1), decision("Batavia", "LOC", Verdict::Accept));
        store.record(key(0, 0), decision("VOC ship", "ORG", Verdict::Accept));
        let mut buffer = Vec::new();
        store.export_csv(&mut buffer).unwrap();
        let exported = String::from_utf8(buffer).unwrap();
        let expected = "\
file,region,chunk,text,label,verdict
1812,0,,VOC ship,ORG,correct
1812,0,,Batavia,LOC,correct
1812,3,,1782,DATE,wrong
";
        assert_eq!(exported, expected);
    }

    #[test]
    fn test_export_uses_the_session_vocabulary() {
        let mut store = ReviewStore::new(VerdictVocabulary::UsefulMisleading);
        store.record(key(0, 0), decision("Batavia", "LOC", Verdict::Reject));
        let mut buffer = Vec::new();
        store.export_csv(&mut buffer).unwrap();
        let exported = String::from_utf8(buffer).unwrap();
        assert!(exported.contains("misleading"));
    }

    #[rstest]
    #[case("correct", Verdict::Accept)]
    #[case("useful", Verdict::Accept)]
    #[case("wrong", Verdict::Reject)]
    #[case("Misleading", Verdict::Reject)]
    fn test_verdict_from_str(#[case] raw: &str, #[case] expected: Verdict) {
        assert_eq!(raw.parse::<Verdict>().unwrap(), expected);
    }

    #[test]
    fn test_verdict_from_str_rejects_unknown_words() {
        assert!("maybe".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_every_vocabulary_words_every_verdict() {
        for vocabulary in all::<VerdictVocabulary>() {
            for verdict in all::<Verdict>() {
                assert!(!vocabulary.word(verdict).is_empty());
            }
        }
    }
}
