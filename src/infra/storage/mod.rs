pub mod http_media_storage;
