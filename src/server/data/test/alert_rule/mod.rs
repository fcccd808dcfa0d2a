use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::server::data::alert_rule::AlertRuleRepository;

mod list_enabled_for_domain;
