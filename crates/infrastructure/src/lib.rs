//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod logging_entity_event_publisher;
mod postgres_department_repository;
mod postgres_identity_claims_repository;
mod postgres_institution_repository;
mod postgres_institution_user_repository;
mod postgres_role_repository;
mod postgres_support;
mod redis_entity_event_publisher;

pub use logging_entity_event_publisher::LoggingEntityEventPublisher;
pub use postgres_department_repository::PostgresDepartmentRepository;
pub use postgres_identity_claims_repository::PostgresIdentityClaimsRepository;
pub use postgres_institution_repository::PostgresInstitutionRepository;
pub use postgres_institution_user_repository::PostgresInstitutionUserRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use redis_entity_event_publisher::RedisEntityEventPublisher;
