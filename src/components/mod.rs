// Export components
pub mod outlook;
pub mod page;
pub mod storage;

pub use outlook::{OutlookClient, ReqwestTransport, Transport};
pub use page::{Document, HtmlDocument, Identity, IdentityExtractor};
pub use storage::{find_token, Credential, JsonFileStore, KeyValueStore, MemoryStore, TokenQuery};
