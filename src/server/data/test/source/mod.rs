use chrono::Utc;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::server::data::source::SourceRepository;

mod get_pending_geo;
