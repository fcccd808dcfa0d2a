mod api_key;
mod auth;
