use serde::{Deserialize, Serialize};

use crate::core::ports::signer::MediaSigner;
use crate::core::ports::tokener::{Payload, Tokener};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;

/// Grants read access to one media key until `exp`.
#[derive(Debug, Deserialize, Serialize)]
pub struct MediaClaim {
    pub key: String,
    pub exp: i64,
}

impl Payload for MediaClaim {
    fn user(&self) -> &str {
        &self.key
    }
}

/// Signs media keys into `{base}/media/{key}?token=..` URLs served by this process.
#[derive(Clone)]
pub struct JwtMediaSigner {
    tokener: JWT,
    base_url: String,
    ttl_secs: i64,
}

impl JwtMediaSigner {
    pub fn new(secret: Vec<u8>, base_url: &str, ttl_secs: i64) -> Self {
        Self {
            tokener: JWT::new(secret),
            base_url: base_url.trim_end_matches('/').to_owned(),
            ttl_secs,
        }
    }

    pub fn verify(&self, token: &str) -> Result<MediaClaim, Error> {
        self.tokener.verify_token(token)
    }
}

impl MediaSigner for JwtMediaSigner {
    async fn sign(&self, key: &str) -> Result<String, Error> {
        let claim = MediaClaim {
            key: key.to_owned(),
            exp: chrono::Utc::now().timestamp() + self.ttl_secs,
        };
        let token = self.tokener.gen_token(&claim)?;
        let path = key
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment))
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!("{}/media/{}?token={}", self.base_url, path, token))
    }
}
