mod alert;
mod alert_rule;
mod api_key;
mod gmail_account;
mod org_member;
mod organization;
mod report;
mod source;
mod user;
