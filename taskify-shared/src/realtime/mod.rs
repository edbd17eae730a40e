/// Real-time change notification over Redis pub/sub
///
/// Every project has one channel, `project:{uuid}`. Updates that change a
/// board are published there as JSON and fanned out to the project's
/// connected WebSocket clients, whichever API instance they are attached
/// to.

pub mod broadcast;
pub mod client;

pub use broadcast::{
    project_channel, ProjectBroadcast, ProjectSubscriber, RedisBroadcast, TaskUpdatedEvent,
};
pub use client::{RedisClient, RedisClientError, RedisConfig};
