use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::server::data::api_key::ApiKeyRepository;

mod revoke;
