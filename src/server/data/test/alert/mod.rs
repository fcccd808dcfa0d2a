use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::{
    model::alert::{AlertKind, Severity},
    server::{data::alert::AlertRepository, model::alert::CreateAlertParams},
};

mod mark_read;

fn alert(organization_id: i32, message: &str) -> CreateAlertParams {
    CreateAlertParams {
        organization_id,
        domain_id: None,
        rule_id: None,
        kind: AlertKind::NewSource,
        severity: Severity::Info,
        message: message.to_string(),
    }
}
