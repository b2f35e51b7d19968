pub mod collection;
pub mod files;
pub mod users;

pub use collection::{Collection, StoreError};
pub use files::{FileStore, UploadError};
pub use users::{SUPER_ADMIN, UserDirectory};
