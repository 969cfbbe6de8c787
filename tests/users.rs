//! User store and authentication integration tests

use secrecy::SecretString;

use lingo_gateway::config::AuthSettings;
use lingo_gateway::db::{UserRepo, UserUpdate};
use lingo_gateway::security::{hash_password, TokenService};

mod common;

#[test]
fn test_user_crud_roundtrip() {
    let db = common::setup_test_db();
    let repo = UserRepo::new(db.clone());

    let user = common::create_test_user(&db, "learner", "s3cret");
    assert_eq!(user.username, "learner");
    assert!(user.is_active);

    repo.update(
        user.id,
        &UserUpdate {
            full_name: Some("A. Learner".to_string()),
            ..UserUpdate::default()
        },
    )
    .unwrap();

    let updated = repo.find(user.id).unwrap().unwrap();
    assert_eq!(updated.full_name.as_deref(), Some("A. Learner"));

    repo.delete(user.id).unwrap();
    assert!(repo.find(user.id).unwrap().is_none());
}

#[test]
fn test_authenticate_updates_last_login() {
    let db = common::setup_test_db();
    let repo = UserRepo::new(db.clone());

    let user = common::create_test_user(&db, "learner", "s3cret");
    assert!(user.last_login.is_none());

    let authed = repo.authenticate("learner", "s3cret").unwrap().unwrap();
    assert!(authed.last_login.is_some());
}

#[test]
fn test_auth_failures_are_uniform() {
    let db = common::setup_test_db();
    let repo = UserRepo::new(db.clone());
    let user = common::create_test_user(&db, "learner", "s3cret");

    // Wrong password, unknown user, and inactive account all yield None
    assert!(repo.authenticate("learner", "wrong").unwrap().is_none());
    assert!(repo.authenticate("ghost", "s3cret").unwrap().is_none());

    repo.update(
        user.id,
        &UserUpdate {
            is_active: Some(false),
            ..UserUpdate::default()
        },
    )
    .unwrap();
    assert!(repo.authenticate("learner", "s3cret").unwrap().is_none());
}

#[test]
fn test_stored_hash_shape() {
    let db = common::setup_test_db();
    let repo = UserRepo::new(db.clone());
    common::create_test_user(&db, "learner", "password123");

    let user = repo.find_by_username("learner").unwrap().unwrap();
    assert_eq!(user.password_hash.len(), 64);
    assert_eq!(user.password_hash, hash_password("password123"));
}

#[test]
fn test_token_roundtrip_for_user() {
    let db = common::setup_test_db();
    let user = common::create_test_user(&db, "learner", "s3cret");

    let tokens = TokenService::new(&AuthSettings {
        jwt_secret: SecretString::from("integration-secret"),
        token_ttl_minutes: 30,
    });

    let token = tokens.issue(&user.username, user.id).unwrap();
    let claims = tokens.validate(&token).unwrap();
    assert_eq!(claims.sub, "learner");
    assert_eq!(claims.user_id, user.id);
}
