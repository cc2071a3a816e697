//! Track reference recognition.
//!
//! A track reference is a YouTube or Spotify URL, optionally prefixed with
//! `http://`/`https://` and/or `www.`:
//!
//! ```text
//! youtube.com/watch?v=<id>    youtube.com/embed/<id>    youtube.com/shorts/<id>
//! youtu.be/<id>
//! [open.]spotify.com/{track|album|playlist|artist|episode|show}/<id>
//! spotify.link/<id>           spoti.fi/<id>
//! ```
//!
//! YouTube ids are word characters and hyphens, Spotify ids are word
//! characters only. Matching stops at the first character outside the id,
//! so query strings like `?si=...` are not part of the match.

use serde::Serialize;
use std::fmt;

/// Streaming service a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    YouTube,
    Spotify,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::YouTube => write!(f, "YouTube"),
            Service::Spotify => write!(f, "Spotify"),
        }
    }
}

/// A track reference found inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMatch<'a> {
    /// The matched text, scheme and `www.` included when present
    pub text: &'a str,
    /// Byte offset of the match in the searched line
    pub start: usize,
    pub service: Service,
}

/// A host/path prefix followed by an id.
struct Route {
    prefix: &'static str,
    service: Service,
    hyphen_in_id: bool,
}

const fn youtube(prefix: &'static str) -> Route {
    Route {
        prefix,
        service: Service::YouTube,
        hyphen_in_id: true,
    }
}

const fn spotify(prefix: &'static str) -> Route {
    Route {
        prefix,
        service: Service::Spotify,
        hyphen_in_id: false,
    }
}

/// Alternatives in the order they are tried.
const ROUTES: &[Route] = &[
    youtube("youtube.com/watch?v="),
    youtube("youtube.com/embed/"),
    youtube("youtube.com/shorts/"),
    youtube("youtu.be/"),
    spotify("open.spotify.com/track/"),
    spotify("open.spotify.com/album/"),
    spotify("open.spotify.com/playlist/"),
    spotify("open.spotify.com/artist/"),
    spotify("open.spotify.com/episode/"),
    spotify("open.spotify.com/show/"),
    spotify("spotify.com/track/"),
    spotify("spotify.com/album/"),
    spotify("spotify.com/playlist/"),
    spotify("spotify.com/artist/"),
    spotify("spotify.com/episode/"),
    spotify("spotify.com/show/"),
    spotify("spotify.link/"),
    spotify("spoti.fi/"),
];

const SCHEMES: [&str; 3] = ["https://", "http://", ""];
const SUBDOMAINS: [&str; 2] = ["www.", ""];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte length of the id at the start of `s`, `None` if empty.
fn id_len(s: &str, hyphen: bool) -> Option<usize> {
    let len: usize = s
        .chars()
        .take_while(|&c| is_word_char(c) || (hyphen && c == '-'))
        .map(char::len_utf8)
        .sum();
    (len > 0).then_some(len)
}

/// Match host, path and id (no scheme) at the start of `s`.
fn body_len(s: &str) -> Option<(usize, Service)> {
    ROUTES.iter().find_map(|route| {
        let rest = s.strip_prefix(route.prefix)?;
        let id = id_len(rest, route.hyphen_in_id)?;
        Some((route.prefix.len() + id, route.service))
    })
}

/// Match a full reference at the start of `s`.
fn link_len(s: &str) -> Option<(usize, Service)> {
    for scheme in SCHEMES {
        let Some(after_scheme) = s.strip_prefix(scheme) else {
            continue;
        };
        for subdomain in SUBDOMAINS {
            let Some(rest) = after_scheme.strip_prefix(subdomain) else {
                continue;
            };
            if let Some((len, service)) = body_len(rest) {
                return Some((scheme.len() + subdomain.len() + len, service));
            }
        }
    }
    None
}

/// Match a track reference anchored at the start of `line`.
///
/// Trailing text after the reference is allowed and not part of the match.
pub fn match_link_at_start(line: &str) -> Option<LinkMatch<'_>> {
    link_len(line).map(|(len, service)| LinkMatch {
        text: &line[..len],
        start: 0,
        service,
    })
}

/// Find every non-overlapping track reference in `line`, left to right.
pub fn find_links(line: &str) -> Vec<LinkMatch<'_>> {
    let mut found = Vec::new();
    let mut resume_at = 0;

    for (start, _) in line.char_indices() {
        if start < resume_at {
            continue;
        }
        if let Some((len, service)) = link_len(&line[start..]) {
            found.push(LinkMatch {
                text: &line[start..start + len],
                start,
                service,
            });
            resume_at = start + len;
        }
    }

    found
}
