// Core types and primitives shared by every layer

pub mod strong_types;

pub use strong_types::{CommentId, HashtagId, PostId, ProfileId, Timestamp, UserId};
