use clap::{Args, Parser, Subcommand};

use std::path::PathBuf;

use crate::{config, media, utils};

#[derive(Args, Debug, Clone)]
pub struct RunMigrationsArgs {
    #[arg(short, long)]
    file: String,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateImageUrlsArgs {
    /// Prefix prepended to each product image file name
    #[arg(short, long)]
    base_url: String,
}

#[derive(Args, Debug, Clone)]
pub struct UploadMediaArgs {
    /// Directory whose files are uploaded, keeping their relative paths
    #[arg(short, long, default_value = "media")]
    dir: PathBuf,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    RunMigrations(RunMigrationsArgs),
    /// Fill product image urls from their uploaded image file names
    UpdateImageUrls(UpdateImageUrlsArgs),
    /// Upload the media directory to the image host
    UploadMedia(UploadMediaArgs),
}

/// Storefront operator tasks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let app_config = &*config::APP_CONFIG;

        match &self.action {
            Action::RunMigrations(RunMigrationsArgs { file }) => {
                let db_pool = utils::setup_sqlite_db_pool(app_config.is_prod()).await?;
                utils::run_migrations(&db_pool, file).await
            }
            Action::UpdateImageUrls(UpdateImageUrlsArgs { base_url }) => {
                let db_pool = utils::setup_sqlite_db_pool(app_config.is_prod()).await?;
                let updated = utils::update_image_urls(&db_pool, base_url).await?;
                println!("\nDone. {updated} products updated.");
                Ok(())
            }
            Action::UploadMedia(UploadMediaArgs { dir }) => {
                let host = media::MediaHost::new(
                    &app_config.cloudinary_cloud_name,
                    &app_config.cloudinary_api_key,
                    &app_config.cloudinary_api_secret,
                )?;
                let uploaded = media::upload_media(&host, dir).await?;
                println!("\nDone. {uploaded} files uploaded.");
                Ok(())
            }
        }
    }
}
