//! Third-party ids the front end sends for items it did not get from us.
//!
//! Accepted shapes are `tt0083658`, `imdb:tt0083658` and `tmdb:78`, each
//! optionally followed by `:<season>:<episode>` for a single episode.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Prefixes announced in the manifest for provider-addressed resources.
pub const PROVIDER_ID_PREFIXES: [&str; 3] = ["tt", "imdb:", "tmdb:"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Imdb(String),
    Tmdb(String),
}

impl ProviderId {
    /// Provider key as the media server spells it in `ProviderIds`.
    pub fn key(&self) -> &'static str {
        match self {
            ProviderId::Imdb(_) => "Imdb",
            ProviderId::Tmdb(_) => "Tmdb",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ProviderId::Imdb(id) | ProviderId::Tmdb(id) => id,
        }
    }

    /// `AnyProviderIdEquals` values to try, most specific first.
    pub fn lookup_keys(&self) -> Vec<String> {
        let value = self.value();
        let mut keys = vec![
            format!("{}.{value}", self.key().to_ascii_lowercase()),
            format!("{}.{value}", self.key()),
        ];
        if let (ProviderId::Imdb(_), Some(numeric)) = (self, imdb_digits(value)) {
            keys.push(format!("imdb.{numeric}"));
        }
        keys
    }

    /// Whether an item's `ProviderIds` name this id. Keys compare without
    /// case; IMDb values also match their bare numeric form.
    pub fn matches(&self, provider_ids: &BTreeMap<String, String>) -> bool {
        provider_ids
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(self.key()))
            .any(|(_, candidate)| match self {
                ProviderId::Imdb(id) => {
                    candidate.eq_ignore_ascii_case(id)
                        || imdb_digits(id).is_some_and(|digits| candidate == digits)
                }
                ProviderId::Tmdb(id) => candidate == id,
            })
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Imdb(id) => f.write_str(id),
            ProviderId::Tmdb(id) => write!(f, "tmdb:{id}"),
        }
    }
}

fn imdb_digits(id: &str) -> Option<&str> {
    let digits = id.strip_prefix("tt").or_else(|| id.strip_prefix("TT"))?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// Season and episode number of an episode-addressed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpisodeNumber {
    pub season: i32,
    pub episode: i32,
}

/// A parsed provider-addressed request id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderRef {
    pub id: ProviderId,
    pub episode: Option<EpisodeNumber>,
}

impl ProviderRef {
    /// `None` for ids that are not provider-addressed, including malformed
    /// season/episode suffixes.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (id, rest) = if let Some(rest) = raw.strip_prefix("tmdb:") {
            let (value, rest) = split_base(rest);
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            (ProviderId::Tmdb(value.to_string()), rest)
        } else {
            let rest = raw.strip_prefix("imdb:").unwrap_or(raw);
            let (value, rest) = split_base(rest);
            imdb_digits(value)?;
            (ProviderId::Imdb(value.to_string()), rest)
        };

        let episode = match rest {
            None => None,
            Some(rest) => {
                let (season, episode) = rest.split_once(':')?;
                Some(EpisodeNumber {
                    season: season.parse().ok()?,
                    episode: episode.parse().ok()?,
                })
            }
        };
        Some(Self { id, episode })
    }
}

fn split_base(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once(':') {
        Some((base, rest)) => (base, Some(rest)),
        None => (raw, None),
    }
}
