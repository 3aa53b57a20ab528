pub mod config;
pub mod conversation;
pub mod error;
pub mod region;
pub mod resolver;
pub mod state;
pub mod visa;

// Re-export main types for convenience
pub use config::Config;
pub use conversation::{Conversation, Pacing};
pub use error::VisaDataError;
pub use region::Region;
pub use resolver::{CountryList, MessageBody, MessageKind, QuickReply, Resolver, ResponseDescriptor};
pub use state::{ChatMessage, Sender};
pub use visa::{CountryVisaRecord, VisaDb};
