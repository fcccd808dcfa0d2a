use crate::server::{
    error::{auth::AuthError, AppError},
    middleware::{
        auth::{AccessLevel, AuthGuard, Permission},
        session::AuthSession,
    },
};
use test_utils::{builder::TestBuilder, factory};

mod require;
mod require_domain;
mod require_report;
