//! Compiled artifacts — naming, placement in the output directory, retrieval.

use std::fmt;
use std::path::{Path, PathBuf};

use std::io::ErrorKind;

use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::render::RenderError;

/// Route prefix under which artifacts are served.
pub const PUBLIC_PREFIX: &str = "/api/v1/resumes/pdf/";

/// Which stage of the chain produced the PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ArtifactSource {
    Compiler(String),
    Fallback,
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactSource::Compiler(name) => f.write_str(name),
            ArtifactSource::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompiledArtifact {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub public_url: String,
    pub generator: ArtifactSource,
}

impl CompiledArtifact {
    pub fn new(path: PathBuf, file_name: String, generator: ArtifactSource) -> Self {
        Self {
            public_url: format!("{PUBLIC_PREFIX}{file_name}"),
            file_name,
            path,
            generator,
        }
    }
}

/// Every character outside `[A-Za-z0-9]` becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "resume".to_string()
    } else {
        sanitized
    }
}

/// `{sanitized_name}_{yyyyMMdd_HHmmss}.pdf`
pub fn generate_file_name(candidate_name: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.pdf",
        sanitize_name(candidate_name.trim()),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Upper bound on `_N` suffixes tried before giving up on a name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Moves a compiled PDF into `output_dir`, copying then removing the source
/// when a rename is impossible (e.g. across filesystems).
///
/// The output directory is append-only: when `file_name` is taken, a `_N`
/// suffix is added. Returns the final path and file name.
pub async fn relocate(
    source: &Path,
    output_dir: &Path,
    file_name: &str,
) -> Result<(PathBuf, String), RenderError> {
    let (mut file, target, file_name) = reserve(output_dir, file_name).await?;

    // The target is an empty placeholder this call created, so replacing it
    // cannot clobber another artifact.
    if tokio::fs::rename(source, &target).await.is_err() {
        debug!(source = %source.display(), "Rename failed, copying artifact instead");
        if let Err(e) = copy_into(source, &mut file).await {
            discard(&target).await;
            return Err(RenderError::io("copy", &target, e));
        }
        tokio::fs::remove_file(source)
            .await
            .map_err(|e| RenderError::io("remove", source, e))?;
    }
    Ok((target, file_name))
}

/// Writes freshly generated bytes under a name no other artifact uses.
pub async fn store_bytes(
    output_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<(PathBuf, String), RenderError> {
    let (mut file, target, file_name) = reserve(output_dir, file_name).await?;
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    if let Err(e) = written {
        discard(&target).await;
        return Err(RenderError::io("write", &target, e));
    }
    Ok((target, file_name))
}

/// Atomically claims `file_name`, or the first free `{stem}_{n}.{ext}`, by
/// creating it exclusively.
async fn reserve(
    output_dir: &Path,
    file_name: &str,
) -> Result<(tokio::fs::File, PathBuf, String), RenderError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| RenderError::io("create", output_dir, e))?;

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (file_name, String::new()),
    };

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            file_name.to_string()
        } else {
            format!("{stem}_{attempt}{ext}")
        };
        let path = output_dir.join(&candidate);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => {
                if attempt > 0 {
                    debug!(requested = %file_name, used = %candidate, "Artifact name taken, using suffix");
                }
                return Ok((file, path, candidate));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(RenderError::io("create", path, e)),
        }
    }

    Err(RenderError::io(
        "reserve",
        output_dir.join(file_name),
        std::io::Error::new(ErrorKind::AlreadyExists, "no free artifact name"),
    ))
}

async fn copy_into(source: &Path, file: &mut tokio::fs::File) -> std::io::Result<()> {
    let mut reader = tokio::fs::File::open(source).await?;
    tokio::io::copy(&mut reader, file).await?;
    file.flush().await
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove partial artifact");
    }
}

/// Reads a previously produced artifact. Names that could escape the output
/// directory are treated as unknown.
pub async fn load_artifact(output_dir: &Path, file_name: &str) -> Result<Bytes, RenderError> {
    if !is_plain_file_name(file_name) {
        return Err(RenderError::NotFound(file_name.to_string()));
    }
    let path = output_dir.join(file_name);
    match tokio::fs::read(&path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(RenderError::NotFound(file_name.to_string()))
        }
        Err(e) => Err(RenderError::io("read", path, e)),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
