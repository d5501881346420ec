/*!
 * Document store boundary.
 *
 * Two logical collections per platform live behind this module: the source
 * listings (read-only to the pipeline) and the translation records. The
 * pipeline only ever needs identity-ordered paginated reads and
 * upsert-by-identity writes, which is the whole surface the repository
 * exposes.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::StoreConnection;
pub use models::TranslationRecord;
pub use repository::Repository;
