use chrono::{TimeZone, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::{model::gmail::SyncStatus, server::data::gmail_account::GmailAccountRepository};

mod mark_synced;
mod reset_interrupted_syncs;
