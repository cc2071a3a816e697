//! Round model: the typed sequence of songs and breaks that make up one
//! concatenated round, and the parser that builds it from a sources file.
//!
//! # Structure
//! - [`link`]: recognizes YouTube and Spotify track references in a line
//! - [`item`]: [`RoundItem`] and its two cases, [`Song`] and [`RoundBreak`]
//! - [`sequence`]: [`RoundList`], the canonical list and its rendering order
//! - [`parser`]: line classification and [`parse_source`]

pub mod item;
pub mod link;
pub mod parser;
pub mod sequence;

pub use item::{ArtifactDir, RoundBreak, RoundItem, Song};
pub use link::{LinkMatch, Service, find_links, match_link_at_start};
pub use parser::{
    LineKind, ParseWarning, ParseWarningKind, ParsedSource, classify_line, parse_source,
    parse_source_file,
};
pub use sequence::{DEFAULT_SONG_BREAK, RoundList};
