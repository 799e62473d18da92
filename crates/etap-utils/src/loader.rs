use crate::loader::error::LoadingError;
use async_stream::try_stream;
use async_walkdir::{DirEntry, Filtering, WalkDir};
use chrono::{DateTime, Utc};
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

pub mod error;

#[derive(Debug, Clone, Copy, Default)]
pub enum Filter {
    Yaml,
    #[default]
    Any,
}

impl Filter {
    pub fn apply<P: AsRef<Path>>(&self, path: P) -> bool {
        let extension = path.as_ref().extension().and_then(|ext| ext.to_str());
        let Some(extension) = extension else {
            return false;
        };
        match self {
            Filter::Yaml => ["yaml", "yml"].contains(&extension),
            Filter::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub metadata: FileMetadata,
    pub content: Vec<u8>,
}

/// Reads config documents from a directory tree.
#[derive(Clone, Debug)]
pub struct Loader {
    base_path: PathBuf,
}

impl Loader {
    #[must_use]
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn sub_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return self.base_path.clone();
        }
        self.base_path.join(path)
    }

    pub fn load_dir<'a, P: AsRef<Path>>(
        &'a self,
        path: P,
        filter: Filter,
    ) -> Pin<Box<dyn Stream<Item = Result<File, LoadingError>> + Send + 'a>> {
        let path = self.sub_path(path);
        tracing::trace!(?path, "loading dir");
        let mut walker = WalkDir::new(path).filter(move |entry| apply_filter(entry, filter));
        let stream = try_stream! {
            use futures::StreamExt;
            while let Some(entry) = walker.next().await {
                let entry = entry?;
                if entry.file_type().await?.is_file() {
                    let path = entry.path();
                    tracing::trace!(?path, "loading file");
                    let content = fs::read(&path).await?;
                    let last_modified = get_last_modified(&path).await?;
                    yield File {
                        metadata: FileMetadata {
                            key: path.to_string_lossy().into(),
                            last_modified: Some(last_modified),
                        },
                        content,
                    };
                }
            }
        };
        Box::pin(stream)
    }
}

async fn apply_filter(entry: DirEntry, filter: Filter) -> Filtering {
    let Ok(file_type) = entry.file_type().await else {
        return Filtering::Ignore;
    };
    if file_type.is_dir() {
        return Filtering::Continue;
    }
    if filter.apply(entry.path()) {
        Filtering::Continue
    } else {
        Filtering::Ignore
    }
}

async fn get_last_modified<P: AsRef<Path>>(path: P) -> Result<DateTime<Utc>, LoadingError> {
    let modified = fs::metadata(path).await?.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}
