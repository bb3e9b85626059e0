pub mod compression;
pub mod models;

// 重新导出常用类型和函数
pub use compression::{decode_snapshot, encode_snapshot, CodecError};
pub use models::{CatalogMetadata, CatalogSnapshot, Racket, RacketAttribute, UnknownAttribute};
