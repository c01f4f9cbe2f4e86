pub mod errors;
pub mod db;
pub mod user_account;
pub mod community;
pub mod community_member;
pub mod community_membership;
pub mod post;
pub mod comment;
pub mod post_like;
pub mod comment_like;

#[cfg(test)]
mod tests;
