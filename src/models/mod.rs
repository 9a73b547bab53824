pub mod channel;
pub mod comment;
pub mod message;
pub mod user;

pub use channel::{Channel, ChannelDetail};
pub use comment::{Comment, CommentWithSender};
pub use message::{Message, MessageListItem, MessageWithSender};
pub use user::{ShortUser, User};
