/// Response of `/Items/{id}/PlaybackInfo`.
///
/// Like [`crate::ItemsPage`], the lists tolerate `null` and `null` members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct PlaybackInfo {
    #[cfg_attr(feature = "serde", serde(default))]
    pub media_sources: Option<Vec<Option<MediaSource>>>,
}

impl PlaybackInfo {
    pub fn from_sources(sources: Vec<MediaSource>) -> Self {
        Self {
            media_sources: Some(sources.into_iter().map(Some).collect()),
        }
    }

    pub fn into_sources(self) -> Vec<MediaSource> {
        self.media_sources
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect()
    }
}

/// One playable file or version of an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct MediaSource {
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::identifier")
    )]
    pub id: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub name: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub container: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::flag")
    )]
    pub supports_direct_play: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub media_streams: Option<Vec<Option<MediaStream>>>,
}

impl MediaSource {
    pub fn new(id: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            container: Some(container.into()),
            supports_direct_play: true,
            ..Self::default()
        }
    }

    pub fn with_stream(mut self, stream: MediaStream) -> Self {
        self.media_streams.get_or_insert_with(Vec::new).push(Some(stream));
        self
    }

    pub fn streams(&self) -> impl Iterator<Item = &MediaStream> {
        self.media_streams.iter().flatten().flatten()
    }

    pub fn video_stream(&self) -> Option<&MediaStream> {
        self.streams().find(|stream| stream.is_video())
    }
}

/// A track inside a [`MediaSource`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct MediaStream {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "Type", default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub stream_type: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub index: Option<i32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub codec: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub display_title: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub width: Option<i32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub height: Option<i32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub language: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::flag")
    )]
    pub is_text_subtitle_stream: bool,
}

impl MediaStream {
    pub fn video(codec: &str, width: i32, height: i32) -> Self {
        Self {
            stream_type: Some("Video".into()),
            codec: Some(codec.into()),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn subtitle(index: i32, codec: &str, language: Option<&str>) -> Self {
        Self {
            stream_type: Some("Subtitle".into()),
            index: Some(index),
            codec: Some(codec.into()),
            language: language.map(str::to_string),
            is_text_subtitle_stream: true,
            ..Self::default()
        }
    }

    pub fn is_video(&self) -> bool {
        self.stream_type.as_deref() == Some("Video")
    }

    pub fn is_subtitle(&self) -> bool {
        self.stream_type.as_deref() == Some("Subtitle")
    }
}
