/**
This module converts tabular annotation exports into the line-delimited record store consumed by
the review tools. The input is a CSV file carrying one token per row, with region boundaries
marked by a sentinel value appearing as data in both the word and the label columns.
*/
use crate::decoder::LengthMismatchError;
use crate::region::{write_regions, Region};
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The region-boundary sentinel: the literal two-character string `\n` (a backslash followed by
/// the letter `n`) stored as a cell value, not an actual newline.
pub const NEWLINE_SENTINEL: &str = "\\n";

/// Splits a flat sequence into the groups delimited by `sentinel`. Sentinel cells are dropped and
/// empty groups are discarded, so leading, trailing and repeated sentinels produce no output.
pub fn split_at_sentinel<T: AsRef<str>>(items: &[T], sentinel: &str) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for item in items {
        let item = item.as_ref();
        if item == sentinel {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(item.to_string());
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[derive(Debug)]
/// Errors encountered while converting a tabular annotation export into regions.
pub enum ConvertError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// The named column is missing from the CSV header.
    MissingColumn(String),
    /// The word and label columns split into a different number of groups.
    GroupCountMismatch { words: usize, labels: usize },
    /// A word group and its label group have different lengths. Groups are counted from zero.
    GroupLengthMismatch {
        group: usize,
        source: LengthMismatchError,
    },
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => std::fmt::Display::fmt(err, f),
            Self::Csv(err) => std::fmt::Display::fmt(err, f),
            Self::MissingColumn(column) => {
                write!(f, "The column ({}) is missing from the CSV header", column)
            }
            Self::GroupCountMismatch { words, labels } => write!(
                f,
                "The word column splits into {} groups but the label column into {}",
                words, labels
            ),
            Self::GroupLengthMismatch { group, source } => {
                write!(f, "Group {} is uneven: {}", group, source)
            }
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::GroupLengthMismatch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ConvertError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Reads a headered CSV and pairs the groups of the two named columns into regions. The group
/// counts of the two columns must agree, and so must the lengths within each pair of groups; the
/// original tools only printed the counts for a human to compare, which let uneven exports slip
/// through silently.
pub fn regions_from_csv<R: Read>(
    reader: R,
    word_column: &str,
    label_column: &str,
) -> Result<Vec<Region>, ConvertError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let word_index = headers
        .iter()
        .position(|header| header == word_column)
        .ok_or_else(|| ConvertError::MissingColumn(word_column.to_string()))?;
    let label_index = headers
        .iter()
        .position(|header| header == label_column)
        .ok_or_else(|| ConvertError::MissingColumn(label_column.to_string()))?;
    let mut words = Vec::new();
    let mut labels = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        words.push(record.get(word_index).unwrap_or_default().to_string());
        labels.push(record.get(label_index).unwrap_or_default().to_string());
    }
    let word_groups = split_at_sentinel(&words, NEWLINE_SENTINEL);
    let label_groups = split_at_sentinel(&labels, NEWLINE_SENTINEL);
    if word_groups.len() != label_groups.len() {
        return Err(ConvertError::GroupCountMismatch {
            words: word_groups.len(),
            labels: label_groups.len(),
        });
    }
    word_groups
        .into_iter()
        .zip(label_groups)
        .enumerate()
        .map(|(group, (word_group, label_group))| {
            Region::new(word_group, label_group)
                .map_err(|source| ConvertError::GroupLengthMismatch { group, source })
        })
        .collect()
}

/// Converts the CSV file at `input` into the line-delimited record store at `output` and returns
/// the number of regions written.
pub fn convert_csv_to_records<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    word_column: &str,
    label_column: &str,
) -> Result<usize, ConvertError> {
    let file = File::open(input)?;
    let regions = regions_from_csv(file, word_column, label_column)?;
    write_regions(&regions, output)?;
    Ok(regions.len())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_discards_empty_groups() {
        let items = ["\\n", "a", "b", "\\n", "\\n", "c", "\\n"];
        let groups = split_at_sentinel(&items, NEWLINE_SENTINEL);
        assert_eq!(
            groups,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()]
            ]
        );
    }

    #[test]
    fn test_split_without_sentinel_is_one_group() {
        let items = ["a", "b"];
        let groups = split_at_sentinel(&items, NEWLINE_SENTINEL);
        assert_eq!(groups, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_split_all_sentinels_is_empty() {
        let items = ["\\n", "\\n"];
        assert!(split_at_sentinel(&items, NEWLINE_SENTINEL).is_empty());
    }

    const CSV_EXPORT: &str = "\
,word,manual_resolve
0,The,O
1,VOC,B-ORG
2,ship,I-ORG
3,\\n,\\n
4,Batavia,B-LOC
5,1782,B-DATE
";

    #[test]
    fn test_regions_from_csv() {
        let regions =
            regions_from_csv(CSV_EXPORT.as_bytes(), "word", "manual_resolve").unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].words(), ["The", "VOC", "ship"]);
        assert_eq!(regions[0].events(), ["O", "B-ORG", "I-ORG"]);
        assert_eq!(regions[1].words(), ["Batavia", "1782"]);
        assert_eq!(regions[1].events(), ["B-LOC", "B-DATE"]);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = regions_from_csv(CSV_EXPORT.as_bytes(), "word", "nonexistent").unwrap_err();
        match err {
            ConvertError::MissingColumn(column) => assert_eq!(column, "nonexistent"),
            other => panic!("expected a missing column error, got: {}", other),
        }
    }

    #[test]
    fn test_uneven_groups_are_reported() {
        // The sentinel appears in the label column only, so the word column stays one group.
        let uneven = ",word,manual_resolve\n0,a,O\n1,b,\\n\n2,c,O\n";
        let err = regions_from_csv(uneven.as_bytes(), "word", "manual_resolve").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::GroupCountMismatch { words: 1, labels: 2 }
        ));
    }
}
