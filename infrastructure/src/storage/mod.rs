//! Filesystem storage: inbox, entry archive and site index.

mod entry_store;
mod inbox;
mod site_index;

pub use entry_store::{FsEntryStore, METADATA_FILE, StoredEntry, entry_id};
pub use inbox::{FsInbox, STAGING_DIR};
pub use site_index::{IMAGES_DIR, INDEX_FILE, JsonSiteIndex};
