mod pg_photo_repository;
mod pg_settings_repository;
mod pg_user_repository;

pub use pg_photo_repository::PgPhotoRepository;
pub use pg_settings_repository::PgSettingsRepository;
pub use pg_user_repository::PgUserRepository;
