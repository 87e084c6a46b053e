use crate::error::Error;

/// Issues time-limited URLs for private media.
pub trait MediaSigner {
    async fn sign(&self, key: &str) -> Result<String, Error>;
}
