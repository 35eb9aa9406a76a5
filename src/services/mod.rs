// Services - relationship logic and annotated read queries above the entities

pub mod engagement_service;
pub mod post_query_service;
pub mod profile_query_service;
pub mod social_graph_service;

pub use engagement_service::{EngagementService, LikeOutcome};
pub use post_query_service::{CommentSummary, PostFilter, PostQueryService, PostSummary};
pub use profile_query_service::{ProfileFilter, ProfileQueryService, ProfileSummary};
pub use social_graph_service::SocialGraphService;
