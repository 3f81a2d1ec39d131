use futures_util::StreamExt;
use protoprep::engine::error::RetrievalError;
use protoprep::engine::retrieval::Retriever;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Plain unauthenticated HTTP GET downloads; the body is saved verbatim.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    client: reqwest::Client,
    handle: Handle,
}

impl HttpRetriever {
    /// Creates a retriever whose blocking [`Retriever`] calls run on `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            client: reqwest::Client::new(),
            handle,
        }
    }

    /// Streams the body of `url` into `destination`, returning the byte count.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64, RetrievalError> {
        info!("Sending request to {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| http_error(url, e))?;

        let io_error = |source| RetrievalError::Io {
            path: destination.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(io_error)?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| http_error(url, e))?;
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;

        debug!("Saved {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

impl Retriever for HttpRetriever {
    /// Must be called from a blocking context, such as inside
    /// `tokio::task::block_in_place`.
    fn retrieve(&self, url: &str, destination: &Path) -> Result<(), RetrievalError> {
        self.handle
            .block_on(self.download(url, destination))
            .map(|_| ())
    }
}

fn http_error(url: &str, error: reqwest::Error) -> RetrievalError {
    match error.status() {
        Some(status) => RetrievalError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        },
        None => RetrievalError::Request {
            url: url.to_string(),
            message: error.to_string(),
        },
    }
}
