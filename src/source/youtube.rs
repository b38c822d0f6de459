//! YouTube transcript source.

use super::{DocumentLoader, Metadata, RawDocument, SourceHandle};
use crate::error::{DocQaError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument};
use url::Url;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
    "www.youtu.be",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id regex"))
}

/// Extract the video ID from a YouTube URL or a bare ID.
///
/// Handles `watch?v=ID`, `youtu.be/ID`, `/embed/ID`, `/shorts/ID` and `/v/ID`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if video_id_regex().is_match(input) {
        return Some(input.to_string());
    }

    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;
    let host = url.host_str()?.to_lowercase();
    if !YOUTUBE_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let candidate = if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        Some(v.to_string())
    } else {
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        if host.ends_with("youtu.be") {
            segments.next().map(str::to_string)
        } else {
            match segments.next() {
                Some("embed") | Some("shorts") | Some("v") | Some("live") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
    };

    candidate.filter(|id| video_id_regex().is_match(id))
}

/// Check whether a URL points at YouTube, whether or not it names a video.
fn is_youtube_url(input: &str) -> bool {
    let input = input.trim();
    if video_id_regex().is_match(input) {
        return true;
    }
    Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .is_some_and(|host| YOUTUBE_HOSTS.contains(&host.as_str()))
}

/// One timed piece of a transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, duration_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            duration_seconds,
            text,
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch transcript segments for a video, preferring `languages` in order.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>>;
}

/// Fetches subtitles (manual first, then automatic) through yt-dlp.
pub struct YtDlpTranscriptFetcher {
    program: String,
}

impl YtDlpTranscriptFetcher {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Pick the subtitle file for the most preferred language, falling back to
    /// whatever yt-dlp wrote.
    fn select_subtitle_file(dir: &Path, video_id: &str, languages: &[String]) -> Result<Option<PathBuf>> {
        for lang in languages {
            let path = dir.join(format!("{}.{}.json3", video_id, lang));
            if path.exists() {
                return Ok(Some(path));
            }
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json3"))
            .collect();
        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse yt-dlp's json3 subtitle format into ordered segments.
fn parse_json3(content: &str) -> Result<Vec<TranscriptSegment>> {
    let parsed: Json3 = serde_json::from_str(content)?;

    let mut segments: Vec<TranscriptSegment> = parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                event.start_ms as f64 / 1000.0,
                event.duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect();

    segments.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
    Ok(segments)
}

#[async_trait]
impl TranscriptFetcher for YtDlpTranscriptFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>> {
        let work_dir = tempfile::tempdir()?;
        let output_template = work_dir.path().join("%(id)s.%(ext)s");
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let langs = if languages.is_empty() {
            "en".to_string()
        } else {
            languages.join(",")
        };

        debug!("Fetching subtitles for {} ({})", video_id, langs);

        let output = tokio::process::Command::new(&self.program)
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .args(["--sub-langs", &langs])
            .args(["--sub-format", "json3"])
            .arg("--no-warnings")
            .arg("-o")
            .arg(&output_template)
            .arg(&url)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DocQaError::ToolNotFound(self.program.clone())
                } else {
                    DocQaError::Processing(format!("Failed to run {}: {}", self.program, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocQaError::Processing(format!(
                "Failed to fetch transcript for {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        let Some(path) = Self::select_subtitle_file(work_dir.path(), video_id, languages)? else {
            return Err(DocQaError::Processing(format!(
                "No transcript available for {} in languages: {}",
                video_id, langs
            )));
        };

        let content = tokio::fs::read_to_string(&path).await?;
        parse_json3(&content)
    }
}

/// Loads a YouTube video's transcript as one document.
pub struct YoutubeTranscriptLoader {
    fetcher: Arc<dyn TranscriptFetcher>,
    languages: Vec<String>,
}

impl YoutubeTranscriptLoader {
    pub fn new(fetcher: Arc<dyn TranscriptFetcher>, languages: Vec<String>) -> Self {
        Self { fetcher, languages }
    }
}

#[async_trait]
impl DocumentLoader for YoutubeTranscriptLoader {
    fn name(&self) -> &'static str {
        "youtube_transcript"
    }

    fn handles_url(&self, url: &str) -> bool {
        is_youtube_url(url)
    }

    #[instrument(skip(self, handle), fields(source = %handle.describe()))]
    async fn load(&self, handle: &SourceHandle) -> Result<Vec<RawDocument>> {
        let SourceHandle::Url(url) = handle else {
            return Err(DocQaError::UnsupportedSource(format!(
                "Transcript loader expects a URL, got {}",
                handle.describe()
            )));
        };

        if url.trim().is_empty() {
            return Err(DocQaError::Processing("No YouTube URL provided".to_string()));
        }

        let video_id = extract_video_id(url).ok_or_else(|| {
            DocQaError::Processing(format!("Could not extract YouTube video ID from {}", url))
        })?;

        let segments = self.fetcher.fetch(&video_id, &self.languages).await?;
        let transcript = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if transcript.is_empty() {
            return Err(DocQaError::Processing(format!(
                "Transcript for {} is empty",
                video_id
            )));
        }

        info!(
            "Fetched transcript for {} ({} segments, {} chars)",
            video_id,
            segments.len(),
            transcript.len()
        );

        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), url.clone());
        metadata.insert("video_id".to_string(), video_id);

        Ok(vec![RawDocument::new(transcript, metadata, url.as_str())?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTranscriptFetcher;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));

        assert_eq!(extract_video_id("https://www.youtube.com/watch"), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_handles_youtube_urls_only() {
        assert!(is_youtube_url("https://www.youtube.com/watch"));
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_youtube_url("https://vimeo.com/12345"));
        assert!(!is_youtube_url("/path/to/video.mp4"));
    }

    #[test]
    fn test_parse_json3_orders_and_cleans_segments() {
        let json = r#"{
            "events": [
                {"tStartMs": 4000, "dDurationMs": 2000, "segs": [{"utf8": "second"}, {"utf8": " line"}]},
                {"tStartMs": 0, "dDurationMs": 4000, "segs": [{"utf8": "first\nline"}]},
                {"tStartMs": 5000, "dDurationMs": 10},
                {"tStartMs": 6000, "dDurationMs": 10, "segs": [{"utf8": "\n"}]}
            ]
        }"#;

        let segments = parse_json3(json).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "first line");
        assert_eq!(segments[1].text, "second line");
        assert!((segments[1].start_seconds - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_select_subtitle_file_prefers_language_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dQw4w9WgXcQ.de.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("dQw4w9WgXcQ.en.json3"), "{}").unwrap();

        let languages = vec!["en".to_string(), "de".to_string()];
        let path = YtDlpTranscriptFetcher::select_subtitle_file(dir.path(), "dQw4w9WgXcQ", &languages)
            .unwrap()
            .unwrap();
        assert!(path.ends_with("dQw4w9WgXcQ.en.json3"));

        let languages = vec!["fr".to_string()];
        let path = YtDlpTranscriptFetcher::select_subtitle_file(dir.path(), "dQw4w9WgXcQ", &languages)
            .unwrap()
            .unwrap();
        assert!(path.ends_with("dQw4w9WgXcQ.de.json3"));
    }

    #[tokio::test]
    async fn test_transcript_becomes_one_document() {
        let loader = YoutubeTranscriptLoader::new(
            Arc::new(FakeTranscriptFetcher::new(vec!["Never gonna", "give you up"])),
            vec!["en".to_string()],
        );
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

        let docs = loader.load(&SourceHandle::url(url)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "Never gonna\ngive you up");
        assert_eq!(docs[0].metadata["source"], url);
        assert_eq!(docs[0].metadata["video_id"], "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_unparseable_id_is_processing_error() {
        let loader = YoutubeTranscriptLoader::new(
            Arc::new(FakeTranscriptFetcher::new(vec!["text"])),
            vec!["en".to_string()],
        );
        let err = loader
            .load(&SourceHandle::url("https://www.youtube.com/feed/trending"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocQaError::Processing(_)));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_processing_error() {
        let loader = YoutubeTranscriptLoader::new(
            Arc::new(FakeTranscriptFetcher::new(vec!["  ", ""])),
            vec!["en".to_string()],
        );
        let err = loader
            .load(&SourceHandle::url("https://youtu.be/dQw4w9WgXcQ"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocQaError::Processing(_)));
    }
}
