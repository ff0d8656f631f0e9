/*
 * This module contains some quality of life structs for the display glue. The `RenderConfig`
 * struct gathers the presentation knobs that used to be hardcoded into six copy-pasted review
 * scripts: whether long regions are chunked, how the verdict buttons are laid out, and which
 * verdict wording the session uses. The decoder itself never reads it; the display layer and the
 * `decode_region_conf` entrypoint do.
*/
use crate::review::VerdictVocabulary;
use either::Either as LeftOrRight;
use enum_iterator::Sequence;
use std::fmt::Display;
use std::num::NonZeroUsize;

/// How the verdict buttons are laid out next to the rendered spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Default)]
pub enum Layout {
    /// Buttons inline with each span, in a compact row.
    #[default]
    Inline,
    /// Buttons stacked under each span.
    Stacked,
    /// Spans and buttons flowing in columns.
    Columnar,
}

impl Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Presentation configuration of one review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderConfig {
    /// When set, regions longer than this are split into near-equal chunks before decoding.
    chunking: Option<NonZeroUsize>,
    layout: Layout,
    vocabulary: VerdictVocabulary,
}

impl RenderConfig {
    pub fn chunking(&self) -> Option<NonZeroUsize> {
        self.chunking
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn vocabulary(&self) -> VerdictVocabulary {
        self.vocabulary
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chunking: None,
            layout: Layout::Inline,
            vocabulary: VerdictVocabulary::CorrectWrong,
        }
    }
}

impl Display for RenderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!(
            "Chunking regions at: {:?}\n Button layout: {}\n Verdict vocabulary: {:?}",
            self.chunking, self.layout, self.vocabulary
        );
        write!(f, "{}", string)
    }
}

/// This builder can be used to build and customize a `RenderConfig` structure.
pub struct RenderConfigBuilder<Voc>
where
    Voc: Into<VerdictVocabulary>,
{
    chunking: Option<NonZeroUsize>,
    layout: Layout,
    vocabulary: LeftOrRight<Voc, VerdictVocabulary>,
}

impl Default for RenderConfigBuilder<VerdictVocabulary> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Voc> RenderConfigBuilder<Voc>
where
    Voc: Into<VerdictVocabulary>,
{
    pub fn new() -> Self {
        Self {
            chunking: None,
            layout: Layout::Inline,
            vocabulary: LeftOrRight::Right(VerdictVocabulary::CorrectWrong),
        }
    }

    pub fn chunking(mut self, max_tokens: NonZeroUsize) -> Self {
        self.chunking = Some(max_tokens);
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn vocabulary(mut self, vocabulary: Voc) -> Self {
        self.vocabulary = LeftOrRight::Left(vocabulary);
        self
    }

    pub fn build(self) -> RenderConfig {
        RenderConfig {
            chunking: self.chunking,
            layout: self.layout,
            vocabulary: self.vocabulary.either_into(),
        }
    }
}
