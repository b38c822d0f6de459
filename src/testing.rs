//! Deterministic fakes for exercising the pipelines without network access.

use crate::embedding::Embedder;
use crate::error::{DocQaError, Result};
use crate::generation::Generator;
use crate::source::{
    DocumentLoader, Metadata, RawDocument, SourceHandle, TranscriptFetcher, TranscriptSegment,
};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const FAKE_DIMENSIONS: usize = 512;

/// Bag-of-words embedder: texts sharing words get similar vectors.
#[derive(Default)]
pub struct FakeEmbedder {
    fail: bool,
    drop_last: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with an embedding error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Batches come back one vector short.
    pub fn dropping_last() -> Self {
        Self {
            drop_last: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; FAKE_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % FAKE_DIMENSIONS as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DocQaError::Embedding("no vector".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DocQaError::Embedding("embedding service unavailable".to_string()));
        }
        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| Self::vectorize(t)).collect();
        if self.drop_last && texts.len() > 1 {
            vectors.pop();
        }
        Ok(vectors)
    }
}

/// Generator that records every prompt it receives.
pub struct RecordingGenerator {
    reply: String,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(DocQaError::Generation("model overloaded".to_string()));
        }
        Ok(self.reply.clone())
    }
}

/// Transcript fetcher returning fixed lines, one second apart.
pub struct FakeTranscriptFetcher {
    lines: Vec<String>,
}

impl FakeTranscriptFetcher {
    pub fn new(lines: Vec<&str>) -> Self {
        Self {
            lines: lines.into_iter().map(str::to_string).collect(),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for FakeTranscriptFetcher {
    async fn fetch(&self, _video_id: &str, _languages: &[String]) -> Result<Vec<TranscriptSegment>> {
        Ok(self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| TranscriptSegment::new(i as f64, 1.0, line.clone()))
            .collect())
    }
}

/// File loader for one extension that returns fixed documents.
pub struct StaticLoader {
    extensions: Vec<&'static str>,
    contents: Vec<String>,
}

impl StaticLoader {
    pub fn new(extension: &'static str, contents: Vec<&str>) -> Self {
        Self {
            extensions: vec![extension],
            contents: contents.into_iter().map(str::to_string).collect(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    fn name(&self) -> &'static str {
        "static"
    }

    fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    async fn load(&self, handle: &SourceHandle) -> Result<Vec<RawDocument>> {
        self.contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let mut metadata = Metadata::new();
                metadata.insert("source".to_string(), handle.describe().to_string());
                metadata.insert("page_number".to_string(), (i + 1).to_string());
                RawDocument::new(content.as_str(), metadata, handle.describe())
            })
            .collect()
    }
}

/// Build a minimal PDF with one line of text per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
