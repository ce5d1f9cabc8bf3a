//! Static resource serving from the web root.

use std::io;
use std::path::{Component, Path, PathBuf};

use embed_http::handler::BoxError;
use embed_http::protocol::RequestEntity;
use embed_http::response::{ErrorResponser, Responser};
use http::{Method, StatusCode};
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

use crate::HttpStream;
use crate::mime_types;

const READ_BLOCK_SIZE: usize = 8 * 1024;

/// Serves files below `web_root` for requests no route claimed.
#[derive(Debug, Clone)]
pub struct StaticResource {
    web_root: PathBuf,
}

impl StaticResource {
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        Self { web_root: web_root.into() }
    }

    pub fn web_root(&self) -> &Path {
        &self.web_root
    }

    /// Answers `request` with the file its path names.
    ///
    /// The path is checked before anything touches the filesystem: `..` anywhere, or a
    /// path not starting with `/`, is rejected with 400. So are names without an
    /// extension and extensions without a known media type. A missing file is a 404 that
    /// keeps the connection; an unexpected filesystem error is returned as `Err`.
    pub async fn serve(&self, request: &RequestEntity, stream: &mut HttpStream) -> Result<bool, BoxError> {
        let path = request.path();
        if path.contains("..") || !path.starts_with('/') {
            debug!(path, "reject unsafe path");
            return reject(request, stream, StatusCode::BAD_REQUEST, "unsafe path").await;
        }

        let Some(file_path) = self.resolve(path) else {
            debug!(path, "reject unresolvable path");
            return reject(request, stream, StatusCode::BAD_REQUEST, "unsafe path").await;
        };

        let Some(extension) = file_path.extension().and_then(|extension| extension.to_str()) else {
            return reject(request, stream, StatusCode::BAD_REQUEST, "missing file extension").await;
        };

        let Some(content_type) = mime_types::lookup(&format!(".{extension}")) else {
            return reject(request, stream, StatusCode::BAD_REQUEST, "unsupported file type").await;
        };

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return not_found(request, stream).await,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return not_found(request, stream).await,
            Err(e) => return Err(e.into()),
        };

        let mut responser = Responser::fixed(StatusCode::OK, metadata.len());
        responser.set_content_type(&content_type);
        responser.set_keep_alive(request.keep_alive());

        if request.method() == Method::HEAD {
            responser.end(stream).await?;
            return Ok(responser.keep_alive());
        }

        let mut file = tokio::fs::File::open(&file_path).await?;
        let mut block = vec![0u8; READ_BLOCK_SIZE];
        let mut sent = 0u64;
        loop {
            let read = file.read(&mut block).await?;
            if read == 0 {
                break;
            }
            responser.write(stream, &block[..read]).await?;
            sent += read as u64;
        }
        responser.end(stream).await?;

        trace!(path, sent, "served static resource");
        Ok(responser.keep_alive())
    }

    /// Joins the request path onto the web root component by component. Anything that
    /// is not a plain name (a root, a prefix, a parent) makes the path unresolvable.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut resolved = self.web_root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(name) => resolved.push(name),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(resolved)
    }
}

async fn reject(
    request: &RequestEntity,
    stream: &mut HttpStream,
    status: StatusCode,
    message: &'static str,
) -> Result<bool, BoxError> {
    send_error(request, stream, ErrorResponser::new(status, message)).await
}

async fn not_found(request: &RequestEntity, stream: &mut HttpStream) -> Result<bool, BoxError> {
    let mut responser = ErrorResponser::new(StatusCode::NOT_FOUND, format!("resource '{}' not found", request.path()));
    responser.set_keep_alive(request.keep_alive());
    send_error(request, stream, responser).await
}

/// `HEAD` gets the error headers without the message body.
async fn send_error(request: &RequestEntity, stream: &mut HttpStream, responser: ErrorResponser) -> Result<bool, BoxError> {
    let keep_alive = responser.keep_alive();
    if request.method() == Method::HEAD {
        responser.send_head(stream).await?;
    } else {
        responser.send(stream).await?;
    }
    Ok(keep_alive)
}
