//! Repository layer: plain data records go in and out, all SQL lives here.

pub mod channels;
pub mod comments;
pub mod messages;
pub mod users;
