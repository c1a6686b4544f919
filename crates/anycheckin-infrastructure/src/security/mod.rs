mod encryption;

pub use encryption::{EncryptionError, EncryptionService};
