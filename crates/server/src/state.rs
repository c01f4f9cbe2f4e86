//! Per-binary application state: services wired over SeaORM repositories.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::access::AccessHandler;
use service::auth::{AuthService, TokenService};
use service::community::remote::UserDirectory;
use service::community::repo::seaorm::SeaOrmCommunityRepository;
use service::community::{
    CommentLikeService, CommentService, CommunityService, MemberService, PostLikeService, PostService,
};
use service::resilience::CircuitBreaker;
use service::users::repo::seaorm::SeaOrmUserRepository;
use service::users::UserService;

type CommunityRepo = SeaOrmCommunityRepository;

#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService<SeaOrmUserRepository>>,
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    pub fn new(db: DatabaseConnection, tokens: Arc<TokenService>, breaker: CircuitBreaker) -> Self {
        let repo = Arc::new(SeaOrmUserRepository::new(db));
        Self { auth: Arc::new(AuthService::new(repo, tokens.clone(), breaker)), tokens }
    }
}

#[derive(Clone)]
pub struct UserState {
    pub users: Arc<UserService<SeaOrmUserRepository>>,
    pub access: AccessHandler<UserService<SeaOrmUserRepository>>,
    pub tokens: Arc<TokenService>,
}

impl UserState {
    pub fn new(db: DatabaseConnection, tokens: Arc<TokenService>, breaker: CircuitBreaker) -> Self {
        let users = Arc::new(UserService::new(Arc::new(SeaOrmUserRepository::new(db)), breaker));
        Self { access: AccessHandler::new(users.clone()), users, tokens }
    }
}

#[derive(Clone)]
pub struct CommunityState {
    pub communities: Arc<CommunityService<CommunityRepo>>,
    pub members: Arc<MemberService<CommunityRepo>>,
    pub posts: Arc<PostService<CommunityRepo>>,
    pub comments: Arc<CommentService<CommunityRepo>>,
    pub post_likes: Arc<PostLikeService<CommunityRepo>>,
    pub comment_likes: Arc<CommentLikeService<CommunityRepo>>,
    pub community_access: AccessHandler<CommunityService<CommunityRepo>>,
    pub post_access: AccessHandler<PostService<CommunityRepo>>,
    pub comment_access: AccessHandler<CommentService<CommunityRepo>>,
    pub post_like_access: AccessHandler<PostLikeService<CommunityRepo>>,
    pub comment_like_access: AccessHandler<CommentLikeService<CommunityRepo>>,
    pub tokens: Arc<TokenService>,
}

impl CommunityState {
    /// One breaker guards every repository and remote call of the binary.
    pub fn new(
        db: DatabaseConnection,
        users: Arc<dyn UserDirectory>,
        tokens: Arc<TokenService>,
        breaker: CircuitBreaker,
    ) -> Self {
        let repo = Arc::new(SeaOrmCommunityRepository::new(db));
        let communities = Arc::new(CommunityService::new(repo.clone(), users.clone(), breaker.clone()));
        let members = Arc::new(MemberService::new(repo.clone(), users, breaker.clone()));
        let posts = Arc::new(PostService::new(repo.clone(), breaker.clone()));
        let comments = Arc::new(CommentService::new(repo.clone(), breaker.clone()));
        let post_likes = Arc::new(PostLikeService::new(repo.clone(), breaker.clone()));
        let comment_likes = Arc::new(CommentLikeService::new(repo, breaker));
        Self {
            community_access: AccessHandler::new(communities.clone()),
            post_access: AccessHandler::new(posts.clone()),
            comment_access: AccessHandler::new(comments.clone()),
            post_like_access: AccessHandler::new(post_likes.clone()),
            comment_like_access: AccessHandler::new(comment_likes.clone()),
            communities,
            members,
            posts,
            comments,
            post_likes,
            comment_likes,
            tokens,
        }
    }
}
