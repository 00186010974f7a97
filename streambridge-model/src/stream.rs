/// Entry of a `/stream` response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Stream {
    pub name: String,
    pub title: String,
    pub url: String,
    pub behavior_hints: StreamHints,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub subtitles: Vec<Subtitle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StreamHints {
    pub binge_group: String,
    pub not_web_ready: bool,
}

/// External subtitle track served by the media server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subtitle {
    pub id: String,
    pub url: String,
    pub lang: String,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hints_are_camel_case() {
        let stream = Stream {
            name: "Emby".into(),
            title: "1080p H264".into(),
            url: "http://emby/Videos/1/stream.mkv".into(),
            behavior_hints: StreamHints {
                binge_group: "Emby-1080p H264".into(),
                not_web_ready: true,
            },
            subtitles: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&stream).unwrap(),
            json!({
                "name": "Emby",
                "title": "1080p H264",
                "url": "http://emby/Videos/1/stream.mkv",
                "behaviorHints": {"bingeGroup": "Emby-1080p H264", "notWebReady": true}
            })
        );
    }
}
