use crate::{
    model::organization::{OrgRole, Plan},
    server::data::organization::OrganizationRepository,
};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod list_for_user;
