pub mod collection;
pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use collection::{Collection, Document};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryCollection;
pub use repository::PgCollection;

use sqlx::PgPool;
use std::sync::Arc;

use models::{Certificate, Coupon, Course, Feedback, Quiz, User};

/// Handles to every collection the API touches.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn Collection<User>>,
    pub courses: Arc<dyn Collection<Course>>,
    pub quizzes: Arc<dyn Collection<Quiz>>,
    pub certificates: Arc<dyn Collection<Certificate>>,
    pub coupons: Arc<dyn Collection<Coupon>>,
    pub feedbacks: Arc<dyn Collection<Feedback>>,
}

impl Store {
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryCollection::<User>::new()),
            courses: Arc::new(MemoryCollection::<Course>::new()),
            quizzes: Arc::new(MemoryCollection::<Quiz>::new()),
            certificates: Arc::new(MemoryCollection::<Certificate>::new()),
            coupons: Arc::new(MemoryCollection::<Coupon>::new()),
            feedbacks: Arc::new(MemoryCollection::<Feedback>::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgCollection::<User>::new(pool.clone())),
            courses: Arc::new(PgCollection::<Course>::new(pool.clone())),
            quizzes: Arc::new(PgCollection::<Quiz>::new(pool.clone())),
            certificates: Arc::new(PgCollection::<Certificate>::new(pool.clone())),
            coupons: Arc::new(PgCollection::<Coupon>::new(pool.clone())),
            feedbacks: Arc::new(PgCollection::<Feedback>::new(pool)),
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.users.ping().await
    }
}
