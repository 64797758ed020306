use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use poise::serenity_prelude::CreateAttachment;

#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("picture reference `{0}` points outside of the media directory")]
    OutsideMediaDir(String),
    #[error("could not read picture `{reference}`: {source}")]
    Unreadable {
        reference: String,
        source: serenity::Error,
    },
}

/// Turns the opaque reference of a picture question into a file to attach.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn attachment(&self, reference: &str) -> Result<CreateAttachment, MediaError>;
}

/// Resolves references as relative paths inside one directory.
pub struct MediaDirectory {
    root: PathBuf,
}

impl MediaDirectory {
    pub fn new(root: impl Into<PathBuf>) -> MediaDirectory {
        MediaDirectory { root: root.into() }
    }

    /// Only plain relative paths are accepted; `..`, roots and drive
    /// prefixes are refused.
    pub fn locate(&self, reference: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(reference);

        let plain = relative.components().all(|component| {
            matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if !plain || relative.as_os_str().is_empty() {
            return Err(MediaError::OutsideMediaDir(reference.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaResolver for MediaDirectory {
    async fn attachment(&self, reference: &str) -> Result<CreateAttachment, MediaError> {
        let path = self.locate(reference)?;

        CreateAttachment::path(&path)
            .await
            .map_err(|source| MediaError::Unreadable {
                reference: reference.to_string(),
                source,
            })
    }
}
