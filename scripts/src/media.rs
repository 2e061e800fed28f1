use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use walkdir::WalkDir;

const UPLOAD_API: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Cloudinary account that hosts the product images
pub struct MediaHost {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

/// Public id of `file`: its path under `media_root`, always `/` separated.
pub fn public_id_for(media_root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(media_root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;

    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Hex SHA-256 of the params sorted by name, `&` joined, followed by the secret.
pub fn sign_upload(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut params = params.to_vec();
    params.sort_by_key(|(name, _)| *name);

    let to_sign = params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{to_sign}{api_secret}")))
}

impl MediaHost {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> anyhow::Result<Self> {
        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            anyhow::bail!(
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set"
            );
        }

        Ok(Self {
            client: reqwest::Client::new(),
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    /// Uploads `file` as an image under `public_id`, replacing any previous
    /// version. Returns its https url.
    pub async fn upload(&self, file: &Path, public_id: &str) -> anyhow::Result<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_upload(
            &[
                ("overwrite", "true"),
                ("public_id", public_id),
                ("timestamp", &timestamp),
            ],
            &self.api_secret,
        );

        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(public_id)
            .to_string();
        let content = tokio::fs::read(file).await?;

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(content).file_name(file_name),
            )
            .text("public_id", public_id.to_string())
            .text("overwrite", "true")
            .text("timestamp", timestamp)
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(format!("{UPLOAD_API}/{}/image/upload", self.cloud_name))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<UploadResponse>()
            .await?;

        Ok(response.secure_url)
    }
}

/// Uploads every file under `media_dir`. A failed file is reported and
/// skipped. Returns how many files were uploaded.
pub async fn upload_media(host: &MediaHost, media_dir: &Path) -> anyhow::Result<u64> {
    if !media_dir.is_dir() {
        anyhow::bail!("media directory {} not found", media_dir.display());
    }

    let mut uploaded = 0;
    for entry in WalkDir::new(media_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(public_id) = public_id_for(media_dir, entry.path()) else {
            eprintln!("Skipped {}: path is not valid utf-8", entry.path().display());
            continue;
        };

        match host.upload(entry.path(), &public_id).await {
            Ok(url) => {
                println!("Uploaded: {public_id} -> {url}");
                uploaded += 1;
            }
            Err(e) => eprintln!("Failed to upload {}: {e}", entry.path().display()),
        }
    }

    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_keeps_folders() {
        let root = Path::new("media");

        assert_eq!(
            public_id_for(root, Path::new("media/products/red-shirt.jpg")),
            Some("products/red-shirt.jpg".to_string())
        );
        assert_eq!(
            public_id_for(root, Path::new("media/logo.png")),
            Some("logo.png".to_string())
        );
        assert_eq!(public_id_for(root, Path::new("other/logo.png")), None);
        assert_eq!(public_id_for(root, root), None);
    }

    #[test]
    fn test_sign_upload_sorts_params() {
        let expected = "e09146c756fdf37cca0a0ab718caf42c2074ac479235be768c3310c777b429b7";

        assert_eq!(
            sign_upload(
                &[
                    ("timestamp", "1700000000"),
                    ("public_id", "products/red-shirt.jpg"),
                    ("overwrite", "true"),
                ],
                "abcd"
            ),
            expected
        );
        assert_ne!(
            sign_upload(&[("overwrite", "true")], "abcd"),
            sign_upload(&[("overwrite", "true")], "other")
        );
    }

    #[test]
    fn test_media_host_needs_credentials() {
        assert!(MediaHost::new("", "key", "secret").is_err());
        assert!(MediaHost::new("demo", "key", "secret").is_ok());
    }

    #[tokio::test]
    async fn test_upload_media_needs_a_directory() {
        let host = MediaHost::new("demo", "key", "secret").unwrap();

        assert!(
            upload_media(&host, Path::new("does/not/exist"))
                .await
                .is_err()
        );
    }
}
