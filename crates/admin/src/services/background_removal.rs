//! Product-image background removal with API-key waterfall.
//!
//! The removal provider meters free keys aggressively, so up to four keys
//! are configured and tried in order. Quota and auth responses (402, 429,
//! 403) rotate to the next key; any other failure is terminal for the
//! image. When every key is spent the feature reports itself unavailable
//! and the caller keeps the original image.

use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};

const REMOVEBG_URL: &str = "https://api.remove.bg/v1.0/removebg";

/// Statuses that mean "this key is spent, try the next one".
const ROTATE_STATUSES: [u16; 3] = [402, 429, 403];

/// Errors surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundRemovalError {
    /// No keys configured, or every configured key is spent.
    #[error("no background-removal capacity available")]
    Unavailable,

    /// The provider rejected this image for a non-quota reason.
    #[error("background removal failed with status {status}")]
    Terminal { status: u16 },

    /// Transport failure reaching the provider.
    #[error("background removal request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One provider call with one key.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api status {status}")]
    Api { status: u16 },
}

/// Seam between the waterfall and the HTTP provider, faked in tests.
pub trait RemovalTransport {
    /// Submit one image under one key; `Ok` carries the processed PNG.
    fn remove(
        &self,
        api_key: &str,
        image: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// Try each key in order until one succeeds or a terminal failure occurs.
async fn waterfall<T: RemovalTransport>(
    transport: &T,
    keys: &[SecretString],
    image: &[u8],
) -> Result<Vec<u8>, BackgroundRemovalError> {
    for (index, key) in keys.iter().enumerate() {
        match transport.remove(key.expose_secret(), image).await {
            Ok(processed) => return Ok(processed),
            Err(TransportError::Api { status }) if ROTATE_STATUSES.contains(&status) => {
                tracing::warn!(key_index = index, status, "removal key spent, rotating");
            }
            Err(TransportError::Api { status }) => {
                return Err(BackgroundRemovalError::Terminal { status });
            }
            Err(TransportError::Http(error)) => return Err(error.into()),
        }
    }
    Err(BackgroundRemovalError::Unavailable)
}

/// The provider-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: REMOVEBG_URL.to_owned(),
        }
    }
}

impl RemovalTransport for HttpTransport {
    async fn remove(&self, api_key: &str, image: &[u8]) -> Result<Vec<u8>, TransportError> {
        let form = multipart::Form::new()
            .part(
                "image_file",
                multipart::Part::bytes(image.to_vec()).file_name("product.png"),
            )
            .text("size", "auto");

        let response = self
            .client
            .post(&self.url)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Api {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Background-removal service over the configured key list.
#[derive(Clone)]
pub struct BackgroundRemover {
    keys: Vec<SecretString>,
    transport: HttpTransport,
}

impl BackgroundRemover {
    #[must_use]
    pub fn new(keys: Vec<SecretString>) -> Self {
        Self {
            keys,
            transport: HttpTransport::default(),
        }
    }

    /// Strip the background from one product image.
    ///
    /// # Errors
    ///
    /// Returns [`BackgroundRemovalError::Unavailable`] when every key is
    /// spent (or none are configured) and
    /// [`BackgroundRemovalError::Terminal`] for non-quota provider errors.
    pub async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>, BackgroundRemovalError> {
        waterfall(&self.transport, &self.keys, image).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct ScriptedTransport {
        responses: Mutex<Vec<Result<Vec<u8>, TransportError>>>,
        keys_seen: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<Vec<u8>, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                keys_seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RemovalTransport for ScriptedTransport {
        async fn remove(&self, api_key: &str, _image: &[u8]) -> Result<Vec<u8>, TransportError> {
            self.keys_seen.lock().unwrap().push(api_key.to_owned());
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn keys(n: usize) -> Vec<SecretString> {
        (0..n).map(|i| format!("key-{i}").into()).collect()
    }

    #[tokio::test]
    async fn test_quota_statuses_rotate_to_next_key() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Api { status: 402 }),
            Err(TransportError::Api { status: 429 }),
            Ok(vec![1, 2, 3]),
        ]);

        let result = waterfall(&transport, &keys(4), b"img").await.unwrap();
        assert_eq!(result, vec![1, 2, 3]);
        assert_eq!(
            *transport.keys_seen.lock().unwrap(),
            vec!["key-0", "key-1", "key-2"]
        );
    }

    #[tokio::test]
    async fn test_non_quota_status_is_terminal() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Api { status: 400 })]);

        let result = waterfall(&transport, &keys(4), b"img").await;
        assert!(matches!(
            result,
            Err(BackgroundRemovalError::Terminal { status: 400 })
        ));
        // Remaining keys were never burned on a doomed image.
        assert_eq!(transport.keys_seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausting_every_key_is_unavailable() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Api { status: 402 }),
            Err(TransportError::Api { status: 403 }),
        ]);

        let result = waterfall(&transport, &keys(2), b"img").await;
        assert!(matches!(result, Err(BackgroundRemovalError::Unavailable)));
    }

    #[tokio::test]
    async fn test_no_keys_is_unavailable_without_any_call() {
        let transport = ScriptedTransport::new(vec![]);

        let result = waterfall(&transport, &[], b"img").await;
        assert!(matches!(result, Err(BackgroundRemovalError::Unavailable)));
        assert!(transport.keys_seen.lock().unwrap().is_empty());
    }
}
