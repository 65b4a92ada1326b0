use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::{
        dto::photo_dto::{NewPhoto, PhotoUpdate},
        error::ApplicationError,
    },
    domain::models::photo::Photo,
};

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, ApplicationError>;
    async fn get_photo(&self, id: Uuid) -> Result<Option<Photo>, ApplicationError>;
    async fn list_photos(
        &self,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Photo>, ApplicationError>;
    async fn list_featured(&self, limit: i64) -> Result<Vec<Photo>, ApplicationError>;
    async fn update_photo(&self, id: Uuid, update: PhotoUpdate) -> Result<Photo, ApplicationError>;
    async fn delete_photo(&self, id: Uuid) -> Result<(), ApplicationError>;
    async fn list_categories(&self) -> Result<Vec<String>, ApplicationError>;
}
