//! Loads the Risk Management Framework text once per process.
//!
//! Sources are tried in order (local files first, then the network copy). The
//! first non-empty text wins and is cached for the lifetime of the
//! [`KnowledgeBase`]; later calls never touch a source again.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::KnowledgeBaseConfig;
use crate::error::{AssessmentError, Result};

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<String>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl KnowledgeSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

#[cfg(feature = "providers")]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "providers")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "providers")]
#[async_trait]
impl KnowledgeSource for HttpSource {
    fn describe(&self) -> String {
        format!("url {}", self.url)
    }

    async fn fetch(&self) -> Result<String> {
        let unavailable =
            |e: reqwest::Error| AssessmentError::KnowledgeBaseUnavailable(e.to_string());
        let res = self.client.get(&self.url).send().await.map_err(unavailable)?;
        let status = res.status();
        if !status.is_success() {
            return Err(AssessmentError::KnowledgeBaseUnavailable(format!(
                "GET {} returned status {}",
                self.url, status
            )));
        }
        res.text().await.map_err(unavailable)
    }
}

pub struct KnowledgeBase {
    sources: Vec<Arc<dyn KnowledgeSource>>,
    cache: OnceCell<Arc<str>>,
}

impl KnowledgeBase {
    pub fn new(sources: Vec<Arc<dyn KnowledgeSource>>) -> Self {
        Self {
            sources,
            cache: OnceCell::new(),
        }
    }

    /// Already-loaded framework text; no source is ever consulted.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self {
            sources: Vec::new(),
            cache: OnceCell::new_with(Some(Arc::from(text))),
        }
    }

    pub fn from_config(config: &KnowledgeBaseConfig) -> Self {
        let mut sources: Vec<Arc<dyn KnowledgeSource>> = config
            .local_paths
            .iter()
            .map(|p| Arc::new(FileSource::new(p.clone())) as Arc<dyn KnowledgeSource>)
            .collect();

        #[cfg(feature = "providers")]
        if let Some(url) = &config.remote_url {
            sources.push(Arc::new(HttpSource::new(url.clone())));
        }
        #[cfg(not(feature = "providers"))]
        if config.remote_url.is_some() {
            warn!("Knowledge base URL configured but the `providers` feature is disabled");
        }

        Self::new(sources)
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.initialized()
    }

    /// Returns the framework text, loading it on first use.
    pub async fn load(&self) -> Result<Arc<str>> {
        let text = self.cache.get_or_try_init(|| self.load_uncached()).await?;
        Ok(Arc::clone(text))
    }

    async fn load_uncached(&self) -> Result<Arc<str>> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.fetch().await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        "Loaded knowledge base from {} ({} chars)",
                        source.describe(),
                        text.len()
                    );
                    return Ok(Arc::from(text));
                }
                Ok(_) => {
                    debug!("Knowledge base source {} is empty", source.describe());
                    failures.push(format!("{}: empty", source.describe()));
                }
                Err(e) => {
                    debug!("Knowledge base source {} failed: {}", source.describe(), e);
                    failures.push(format!("{}: {}", source.describe(), e));
                }
            }
        }

        warn!("No knowledge base source could be read");
        Err(AssessmentError::KnowledgeBaseUnavailable(if failures.is_empty() {
            "no sources configured".to_string()
        } else {
            failures.join("; ")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        text: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(text: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                text,
                calls: AtomicUsize::new(0),
            })
        }
    }

    fn dyn_source(source: &Arc<CountingSource>) -> Arc<dyn KnowledgeSource> {
        source.clone()
    }

    #[async_trait]
    impl KnowledgeSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        async fn fetch(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text
                .map(str::to_string)
                .ok_or_else(|| AssessmentError::KnowledgeBaseUnavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_second_load_uses_cache() {
        let source = CountingSource::new(Some("RMF TEXT"));
        let kb = KnowledgeBase::new(vec![dyn_source(&source)]);

        assert_eq!(&*kb.load().await.unwrap(), "RMF TEXT");
        assert_eq!(&*kb.load().await.unwrap(), "RMF TEXT");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(kb.is_loaded());
    }

    #[tokio::test]
    async fn test_falls_back_to_next_source() {
        let local = CountingSource::new(None);
        let remote = CountingSource::new(Some("REMOTE RMF"));
        let kb = KnowledgeBase::new(vec![dyn_source(&local), dyn_source(&remote)]);

        assert_eq!(&*kb.load().await.unwrap(), "REMOTE RMF");
        assert_eq!(local.calls.load(Ordering::SeqCst), 1);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_is_unavailable() {
        let kb = KnowledgeBase::new(vec![
            dyn_source(&CountingSource::new(None)),
            dyn_source(&CountingSource::new(Some("  "))),
        ]);
        let err = kb.load().await.unwrap_err();
        assert!(matches!(err, AssessmentError::KnowledgeBaseUnavailable(_)));
        assert!(!kb.is_loaded());
    }

    #[tokio::test]
    async fn test_file_source_from_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Framework from disk").unwrap();

        let config = KnowledgeBaseConfig {
            local_paths: vec![
                PathBuf::from("/definitely/missing/rmf.md"),
                file.path().to_path_buf(),
            ],
            remote_url: None,
        };
        let kb = KnowledgeBase::from_config(&config);
        assert_eq!(&*kb.load().await.unwrap(), "Framework from disk");
    }

    #[test]
    fn test_remote_fallback_only_when_configured() {
        let config = KnowledgeBaseConfig::default();
        assert!(config.remote_url.is_none());
        let local_only = KnowledgeBase::from_config(&config);
        assert_eq!(local_only.sources.len(), config.local_paths.len());

        let with_remote = KnowledgeBaseConfig {
            remote_url: Some("https://example.com/rmf.md".to_string()),
            ..config
        };
        let kb = KnowledgeBase::from_config(&with_remote);
        let expected = if cfg!(feature = "providers") {
            with_remote.local_paths.len() + 1
        } else {
            with_remote.local_paths.len()
        };
        assert_eq!(kb.sources.len(), expected);
        if cfg!(feature = "providers") {
            assert!(kb.sources.last().unwrap().describe().contains("example.com"));
        }
    }

    #[tokio::test]
    async fn test_from_text_is_preloaded() {
        let kb = KnowledgeBase::from_text("inline");
        assert!(kb.is_loaded());
        assert_eq!(&*kb.load().await.unwrap(), "inline");
    }
}
