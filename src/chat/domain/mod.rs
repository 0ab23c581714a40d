//! Domain types for the chat subsystem.
//!
//! Pure data with no infrastructure dependencies, serialisable in the
//! camelCase wire form the server speaks.

mod group;
mod ids;
mod message;
mod user;

pub use group::Group;
pub use ids::{GroupId, MessageId, UserId};
pub use message::Message;
pub use user::User;
