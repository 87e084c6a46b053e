use actix_files::NamedFile;
use actix_web::web::{Data, Path, Query};
use std::io::ErrorKind;
use std::path::{Component, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::impls::signer::jwt::JwtMediaSigner;
use crate::request::MediaToken;

pub async fn fetch(key: Path<(String,)>, Query(MediaToken { token }): Query<MediaToken>, signer: Data<JwtMediaSigner>, config: Data<Config>) -> Result<NamedFile, Error> {
    let key = key.into_inner().0;
    let claim = signer.verify(&token).map_err(|_| Error::Unauthorized)?;
    if claim.key != key {
        return Err(Error::Unauthorized);
    }
    let relative = PathBuf::from(&key);
    if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(Error::BusinessError(format!("invalid media key {}", key)));
    }
    NamedFile::open_async(PathBuf::from(&config.media_path).join(relative)).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound(format!("media {}", key)),
        _ => e.into(),
    })
}
