use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use image::DynamicImage;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    adapters::{
        dto::{
            photo_dto::{ListPhotosQuery, PhotoResponse},
            response::{ApiResponse, MessageResponse},
        },
        state::AppState,
        storage_resolver::StorageResolver,
    },
    application::{
        dto::photo_dto::{NewPhoto, PhotoUpdate},
        error::ApplicationError,
        repositories::photo_repository::PhotoRepository,
        services::StorageProvider,
    },
    domain::models::upload::UploadFile,
};

/// Pseudo-category the gallery UI sends to mean "no filter".
const ALL_CATEGORY: &str = "全部";

const FEATURED_LIMIT: i64 = 6;
const THUMBNAIL_MAX_DIM: u32 = 800;
const THUMBNAIL_JPEG_QUALITY: u8 = 80;

pub struct PhotoController;

impl PhotoController {
    /// GET /api/photos
    pub async fn get_photos(
        State(photo_repo): State<Arc<dyn PhotoRepository>>,
        Query(params): Query<ListPhotosQuery>,
    ) -> Result<Json<ApiResponse<Vec<PhotoResponse>>>, ApplicationError> {
        let category = params
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORY);

        let photos = photo_repo.list_photos(category, params.limit).await?;
        Ok(Json(ApiResponse::new(
            photos.into_iter().map(Into::into).collect(),
        )))
    }

    /// GET /api/photos/featured
    pub async fn get_featured_photos(
        State(photo_repo): State<Arc<dyn PhotoRepository>>,
    ) -> Result<Json<ApiResponse<Vec<PhotoResponse>>>, ApplicationError> {
        let photos = photo_repo.list_featured(FEATURED_LIMIT).await?;
        Ok(Json(ApiResponse::new(
            photos.into_iter().map(Into::into).collect(),
        )))
    }

    /// GET /api/categories
    pub async fn get_categories(
        State(photo_repo): State<Arc<dyn PhotoRepository>>,
    ) -> Result<Json<ApiResponse<Vec<String>>>, ApplicationError> {
        let mut names = vec![ALL_CATEGORY.to_string()];
        names.extend(photo_repo.list_categories().await?);
        Ok(Json(ApiResponse::new(names)))
    }

    /// POST /api/admin/photos
    pub async fn upload_photo(
        State(app_state): State<AppState>,
        mut multipart: Multipart,
    ) -> Result<(StatusCode, Json<ApiResponse<PhotoResponse>>), ApplicationError> {
        let mut file_bytes: Option<Vec<u8>> = None;
        let mut original_filename: Option<String> = None;
        let mut title: Option<String> = None;
        let mut category: Option<String> = None;
        let mut storage_provider: Option<String> = None;
        let mut storage_path: Option<String> = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "file" => {
                    original_filename = field.file_name().map(|f| f.to_string());
                    file_bytes = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| {
                                warn!("Cannot read file bytes: {}", e);
                                ApplicationError::BadRequest("Invalid file data".to_string())
                            })?
                            .to_vec(),
                    );
                }
                "title" => {
                    title = Some(field.text().await.map_err(|e| {
                        warn!("Invalid title field: {}", e);
                        ApplicationError::BadRequest("Invalid request data".to_string())
                    })?);
                }
                "category" => {
                    category = Some(field.text().await.map_err(|e| {
                        warn!("Invalid category field: {}", e);
                        ApplicationError::BadRequest("Invalid request data".to_string())
                    })?);
                }
                "storage_provider" => {
                    storage_provider = Some(field.text().await.map_err(|e| {
                        warn!("Invalid storage_provider field: {}", e);
                        ApplicationError::BadRequest("Invalid request data".to_string())
                    })?);
                }
                "storage_path" => {
                    storage_path = Some(field.text().await.map_err(|e| {
                        warn!("Invalid storage_path field: {}", e);
                        ApplicationError::BadRequest("Invalid request data".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let file_bytes = file_bytes.filter(|b| !b.is_empty());
        let (file_bytes, title) = match (file_bytes, title.filter(|t| !t.is_empty())) {
            (Some(bytes), Some(title)) => (bytes, title),
            _ => {
                return Err(ApplicationError::BadRequest(
                    "File and title are required".to_string(),
                ))
            }
        };

        let filename = random_filename(original_filename.as_deref());

        let img = image::load_from_memory(&file_bytes).map_err(|e| {
            warn!("Rejecting upload, cannot decode image: {}", e);
            ApplicationError::BadRequest("Unsupported image data".to_string())
        })?;
        let (width, height) = (img.width() as i32, img.height() as i32);

        let thumbnail_bytes = render_thumbnail(&img)?;
        let thumbnail_filename = format!("thumb-{}", filename);

        let storage_path = storage_path.filter(|p| !p.is_empty());
        let provider = resolve_provider(&app_state.storage, storage_provider.as_deref()).await?;

        let file = UploadFile::with_subfolder(filename, file_bytes, storage_path.clone());
        let size = file.size() as i64;
        let thumbnail =
            UploadFile::with_subfolder(thumbnail_filename, thumbnail_bytes, storage_path);

        let uploaded = provider.upload(file, Some(thumbnail)).await?;
        info!(
            "Uploaded photo to {} as {}",
            provider.name(),
            uploaded.key
        );

        let categories = category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        let photo = app_state
            .photo_repository
            .create_photo(NewPhoto {
                title,
                url: uploaded.url,
                thumbnail_url: uploaded.thumbnail_url,
                storage_provider: provider.name().to_string(),
                storage_key: uploaded.key,
                thumbnail_key: uploaded.thumbnail_key,
                width,
                height,
                size,
                categories,
            })
            .await?;

        Ok((StatusCode::CREATED, Json(ApiResponse::new(photo.into()))))
    }

    /// PATCH /api/admin/photos/{id}
    pub async fn update_photo(
        State(photo_repo): State<Arc<dyn PhotoRepository>>,
        Path(id): Path<Uuid>,
        Json(body): Json<PhotoUpdate>,
    ) -> Result<Json<ApiResponse<PhotoResponse>>, ApplicationError> {
        let photo = photo_repo.update_photo(id, body).await?;
        Ok(Json(ApiResponse::new(photo.into())))
    }

    /// DELETE /api/admin/photos/{id}
    ///
    /// Storage cleanup is best-effort: the database record goes away even
    /// when the backend refuses to delete the bytes.
    pub async fn delete_photo(
        State(app_state): State<AppState>,
        Path(id): Path<Uuid>,
    ) -> Result<Json<MessageResponse>, ApplicationError> {
        if let Some(photo) = app_state.photo_repository.get_photo(id).await? {
            match app_state
                .storage
                .resolve_named(&photo.storage_provider)
                .await
            {
                Ok(provider) => {
                    let outcome = provider
                        .delete(&photo.storage_key, photo.thumbnail_key.as_deref())
                        .await;
                    info!(
                        "Storage delete for photo {} on {}: {:?}",
                        id, photo.storage_provider, outcome
                    );
                }
                Err(e) => {
                    warn!(
                        "Skipping storage cleanup for photo {}, provider {} unavailable: {:?}",
                        id, photo.storage_provider, e
                    );
                }
            }

            app_state.photo_repository.delete_photo(id).await?;
        }

        Ok(Json(MessageResponse::new("Photo deleted successfully")))
    }
}

async fn resolve_provider(
    resolver: &StorageResolver,
    requested: Option<&str>,
) -> Result<Arc<dyn StorageProvider>, ApplicationError> {
    match requested.filter(|r| !r.is_empty()) {
        Some(name) => resolver.resolve_named(name).await,
        None => resolver.resolve().await,
    }
}

/// 32 hex chars plus the original extension, so uploads never collide on
/// the user-supplied name.
fn random_filename(original: Option<&str>) -> String {
    let name = Uuid::new_v4().simple().to_string();
    match original
        .and_then(|f| std::path::Path::new(f).extension())
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!("{}.{}", name, ext),
        None => name,
    }
}

/// JPEG thumbnail bounded to 800x800, never enlarged.
fn render_thumbnail(img: &DynamicImage) -> Result<Vec<u8>, ApplicationError> {
    let thumb = if img.width() > THUMBNAIL_MAX_DIM || img.height() > THUMBNAIL_MAX_DIM {
        img.thumbnail(THUMBNAIL_MAX_DIM, THUMBNAIL_MAX_DIM)
    } else {
        img.clone()
    };

    let mut bytes = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, THUMBNAIL_JPEG_QUALITY);
    thumb
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| ApplicationError::InternalError(format!("Thumbnail encoding failed: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_filename_keeps_extension() {
        let name = random_filename(Some("holiday photo.JPG"));
        assert_eq!(name.len(), 32 + 4);
        assert!(name.ends_with(".JPG"));
    }

    #[test]
    fn random_filename_without_extension() {
        let name = random_filename(Some("raw-dump"));
        assert_eq!(name.len(), 32);
    }

    #[test]
    fn random_filenames_do_not_collide() {
        assert_ne!(random_filename(None), random_filename(None));
    }

    #[test]
    fn thumbnail_is_bounded_to_max_dimensions() {
        let img = DynamicImage::new_rgb8(1600, 1200);
        let bytes = render_thumbnail(&img).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert!(thumb.width() <= THUMBNAIL_MAX_DIM);
        assert!(thumb.height() <= THUMBNAIL_MAX_DIM);
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let img = DynamicImage::new_rgb8(320, 200);
        let bytes = render_thumbnail(&img).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (320, 200));
    }
}
