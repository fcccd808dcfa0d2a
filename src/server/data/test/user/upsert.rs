use super::*;

fn params(google_id: &str, email: &str, name: &str) -> UpsertUserParams {
    UpsertUserParams {
        google_id: google_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        avatar_url: None,
    }
}

/// Tests the first login creates the user.
///
/// Expected: Ok with a user carrying the Google profile
#[tokio::test]
async fn creates_new_user() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::User)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    let user = repo
        .upsert(params("google-1", "alice@example.com", "Alice"))
        .await?;

    assert_eq!(user.google_id, "google-1");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name, "Alice");

    Ok(())
}

/// Tests a returning user keeps their id and gets a refreshed profile.
///
/// Expected: Ok with the same id, the new email and a later login time
#[tokio::test]
async fn refreshes_existing_user() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::User)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    let first = repo
        .upsert(params("google-1", "alice@example.com", "Alice"))
        .await?;
    let second = repo
        .upsert(params("google-1", "alice@corp.example", "Alice Smith"))
        .await?;

    assert_eq!(first.id, second.id);
    assert_eq!(second.email, "alice@corp.example");
    assert_eq!(second.name, "Alice Smith");
    assert!(second.last_login_at >= first.last_login_at);

    let found = repo.find_by_google_id("google-1").await?.unwrap();
    assert_eq!(found.id, first.id);

    Ok(())
}
