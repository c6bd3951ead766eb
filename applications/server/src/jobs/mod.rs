/// Background jobs
pub mod channel_sync;

pub use channel_sync::{ChannelSyncJob, ChannelSyncQueue};
