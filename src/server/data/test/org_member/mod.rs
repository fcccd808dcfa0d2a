use crate::{model::organization::OrgRole, server::data::org_member::OrgMemberRepository};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod count_with_role;
mod update_role;
