//! Direct-play stream resolution.

use std::fmt;

use streambridge_model::{
    IdKind, MediaSource, ProviderRef, Stream, StreamHints, Subtitle, parse_external_id,
};
use tracing::{debug, info};
use url::Url;

use crate::catalog::DEFAULT_FALLBACK_LIMIT;
use crate::error::{BridgeError, Result};
use crate::provider::ProviderResolver;
use crate::source::ItemSource;

pub const STREAM_NAME: &str = "Emby";
const DEFAULT_TITLE: &str = "Direct Play";
const DEFAULT_BINGE_GROUP: &str = "Stream";
const DIRECT_PLAY_CONTAINERS: &[&str] = &["mkv"];
const SUBTITLE_FORMAT: &str = "srt";
const UNDETERMINED_LANGUAGE: &str = "und";

/// Builds authenticated playback URLs on the media server.
#[derive(Clone)]
pub struct StreamLinks {
    base: Url,
    access_token: String,
    device_id: String,
}

impl fmt::Debug for StreamLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamLinks")
            .field("base", &self.base.as_str())
            .field("device_id", &self.device_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl StreamLinks {
    pub fn new(
        server_url: &str,
        access_token: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Result<Self> {
        let base = Url::parse(server_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::Unsupported(format!(
                "server url cannot carry a path: {base}"
            )));
        }
        Ok(Self {
            base,
            access_token: access_token.into(),
            device_id: device_id.into(),
        })
    }

    /// `/Videos/{item}/stream.{container}` for one media source, served as is.
    pub fn video(&self, item_id: &str, source: &MediaSource) -> Option<String> {
        let container = source.container.as_deref()?;
        let mut url = self.url(&["Videos", item_id, &format!("stream.{container}")])?;
        url.query_pairs_mut()
            .append_pair("MediaSourceId", &source.id)
            .append_pair("Static", "true")
            .append_pair("api_key", &self.access_token)
            .append_pair("DeviceId", &self.device_id);
        Some(url.into())
    }

    pub fn subtitle(&self, item_id: &str, source_id: &str, index: i32) -> Option<String> {
        let index = index.to_string();
        let file = format!("Stream.{SUBTITLE_FORMAT}");
        let mut url = self.url(&["Videos", item_id, source_id, "Subtitles", &index, &file])?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.access_token)
            .append_pair("Static", "true")
            .append_pair("DeviceId", &self.device_id);
        Some(url.into())
    }

    fn url(&self, segments: &[&str]) -> Option<Url> {
        if segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }
        let mut url = self.base.clone();
        url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
        Some(url)
    }
}

/// Human label for a media source, such as `1080p H264`.
///
/// Built from the video track's display title, its height and its codec,
/// skipping parts the display title already mentions. Sources without a
/// video track use the container name, then the source name.
pub fn quality_title(source: &MediaSource) -> Option<String> {
    let mut title = String::new();
    match source.video_stream() {
        Some(video) => {
            title.push_str(video.display_title.as_deref().unwrap_or_default());
            if let (Some(width), Some(height)) = (video.width, video.height) {
                let lower = title.to_lowercase();
                if !lower.contains(&format!("{height}p"))
                    && !lower.contains(&format!("{width}x{height}"))
                {
                    append_word(&mut title, &format!("{height}p"));
                }
            }
            if let Some(codec) = video.codec.as_deref() {
                if !title.to_lowercase().contains(&codec.to_lowercase()) {
                    append_word(&mut title, &codec.to_uppercase());
                }
            }
        }
        None => {
            if let Some(container) = source.container.as_deref() {
                title = container.to_uppercase();
            }
        }
    }
    if title.is_empty() {
        return source.name.clone();
    }
    Some(title)
}

fn append_word(title: &mut String, word: &str) {
    if !title.is_empty() {
        title.push(' ');
    }
    title.push_str(word);
}

fn is_direct_play(source: &MediaSource) -> bool {
    source.supports_direct_play
        && source.container.as_deref().is_some_and(|container| {
            DIRECT_PLAY_CONTAINERS
                .iter()
                .any(|allowed| container.eq_ignore_ascii_case(allowed))
        })
}

/// Resolves stream requests into direct-play links.
///
/// Accepts `emby~` ids of playable items and provider ids (`tt…`,
/// `imdb:…`, `tmdb:…`, with `:<season>:<episode>` for episodes). Anything
/// that does not resolve yields an empty list.
pub struct StreamService<'a> {
    source: &'a dyn ItemSource,
    links: &'a StreamLinks,
    fallback_limit: u32,
}

impl fmt::Debug for StreamService<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamService")
            .field("links", self.links)
            .field("fallback_limit", &self.fallback_limit)
            .finish_non_exhaustive()
    }
}

impl<'a> StreamService<'a> {
    pub fn new(source: &'a dyn ItemSource, links: &'a StreamLinks) -> Self {
        Self {
            source,
            links,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }

    pub fn with_fallback_limit(mut self, limit: u32) -> Self {
        self.fallback_limit = limit;
        self
    }

    pub async fn streams(&self, id: &str) -> Result<Vec<Stream>> {
        let Some(item_id) = self.resolve(id).await? else {
            debug!(id, "no playable item for stream request");
            return Ok(Vec::new());
        };

        let sources = self.source.fetch_playback_info(&item_id).await?.into_sources();
        let streams: Vec<Stream> = sources
            .iter()
            .filter(|source| is_direct_play(source))
            .filter_map(|source| self.to_stream(&item_id, source))
            .collect();
        info!(
            id,
            item = %item_id,
            sources = sources.len(),
            streams = streams.len(),
            "resolved streams"
        );
        Ok(streams)
    }

    /// Server id of the playable item an id points at.
    async fn resolve(&self, id: &str) -> Result<Option<String>> {
        if let Some(external) = parse_external_id(id) {
            return Ok(match external.kind {
                IdKind::Movie | IdKind::Episode | IdKind::Video => Some(external.server_id),
                IdKind::Series | IdKind::Folder => None,
            });
        }

        let Some(reference) = ProviderRef::parse(id) else {
            return Ok(None);
        };
        let resolver = ProviderResolver::new(self.source).with_fallback_limit(self.fallback_limit);
        match reference.episode {
            None => Ok(resolver.find_movie(&reference.id).await?.map(|movie| movie.id)),
            Some(number) => match resolver.find_series(&reference.id).await? {
                Some(series) => resolver.find_episode(&series, number).await,
                None => Ok(None),
            },
        }
    }

    fn to_stream(&self, item_id: &str, source: &MediaSource) -> Option<Stream> {
        let url = self.links.video(item_id, source)?;
        let quality = quality_title(source);
        let subtitles = source
            .streams()
            .filter(|track| track.is_subtitle() && track.is_text_subtitle_stream)
            .filter_map(|track| {
                let index = track.index?;
                Some(Subtitle {
                    id: format!("{}-{index}", source.id),
                    url: self.links.subtitle(item_id, &source.id, index)?,
                    lang: track
                        .language
                        .clone()
                        .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()),
                })
            })
            .collect();

        Some(Stream {
            name: STREAM_NAME.to_string(),
            title: quality.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            url,
            behavior_hints: StreamHints {
                binge_group: format!(
                    "{STREAM_NAME}-{}",
                    quality.as_deref().unwrap_or(DEFAULT_BINGE_GROUP)
                ),
                not_web_ready: true,
            },
            subtitles,
        })
    }
}
