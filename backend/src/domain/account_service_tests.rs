//! Tests for the account service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockUserRepository, StoredCredentials};
use crate::test_support::{MutableClock, fast_credential_hasher};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn service(repo: MockUserRepository, now: DateTime<Utc>) -> AccountService<MockUserRepository> {
    AccountService::new(
        Arc::new(repo),
        fast_credential_hasher(),
        Arc::new(MutableClock::new(now)),
    )
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("valid credentials")
}

#[rstest]
#[tokio::test]
async fn register_stores_hash_not_plaintext(now: DateTime<Utc>) {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .withf(move |record| {
            record.email == "alice@example.com"
                && record.created == now
                && record.hashed_password.starts_with("$argon2id$")
                && !record.hashed_password.contains("pa55word!!")
        })
        .times(1)
        .return_once(|_| Ok(UserId::new(1)));

    let id = service(repo, now)
        .register(NewUser::new("Alice", "alice@example.com", "pa55word!!"))
        .await
        .expect("registration succeeds");
    assert_eq!(id, UserId::new(1));
}

#[rstest]
#[tokio::test]
async fn register_maps_duplicate_email_to_conflict(now: DateTime<Utc>) {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(UserRepositoryError::duplicate_email()));

    let err = service(repo, now)
        .register(NewUser::new("Alice", "alice@example.com", "pa55word!!"))
        .await
        .expect_err("duplicate email fails");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn authenticate_returns_stored_id_for_correct_password(now: DateTime<Utc>) {
    let hash = fast_credential_hasher()
        .hash("correct-password")
        .expect("hash");
    let mut repo = MockUserRepository::new();
    repo.expect_find_credentials()
        .withf(|email| email.eq_ignore_ascii_case("bob@example.com"))
        .times(1)
        .return_once(move |_| {
            Ok(Some(StoredCredentials {
                id: UserId::new(42),
                hashed_password: hash,
            }))
        });

    let id = service(repo, now)
        .authenticate(&credentials("bob@example.com", "correct-password"))
        .await
        .expect("login succeeds");
    assert_eq!(id, UserId::new(42));
}

#[rstest]
#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically(now: DateTime<Utc>) {
    let hash = fast_credential_hasher()
        .hash("correct-password")
        .expect("hash");
    let mut known = MockUserRepository::new();
    known.expect_find_credentials().times(1).return_once(move |_| {
        Ok(Some(StoredCredentials {
            id: UserId::new(42),
            hashed_password: hash,
        }))
    });
    let mut unknown = MockUserRepository::new();
    unknown
        .expect_find_credentials()
        .times(1)
        .return_once(|_| Ok(None));

    let wrong_password = service(known, now)
        .authenticate(&credentials("bob@example.com", "wrong-password"))
        .await
        .expect_err("wrong password fails");
    let unknown_email = service(unknown, now)
        .authenticate(&credentials("nobody@example.com", "correct-password"))
        .await
        .expect_err("unknown email fails");

    assert_eq!(wrong_password.code(), ErrorCode::Unauthorized);
    assert_eq!(wrong_password.code(), unknown_email.code());
    assert_eq!(wrong_password.message(), unknown_email.message());
}

#[rstest]
#[tokio::test]
async fn fetch_profile_reports_missing_user(now: DateTime<Utc>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let err = service(repo, now)
        .fetch_profile(UserId::new(7))
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn fetch_profile_propagates_store_failures(now: DateTime<Utc>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|_| Err(UserRepositoryError::connection("pool timed out")));

    let err = service(repo, now)
        .fetch_profile(UserId::new(7))
        .await
        .expect_err("store failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn unknown_email_still_runs_a_password_verification(now: DateTime<Utc>) {
    let hasher = fast_credential_hasher();
    let mut repo = MockUserRepository::new();
    repo.expect_find_credentials()
        .times(1)
        .return_once(|_| Ok(None));
    let service = AccountService::new(
        Arc::new(repo),
        hasher.clone(),
        Arc::new(MutableClock::new(now)),
    );

    let err = service
        .authenticate(&credentials("nobody@example.com", "some-password"))
        .await
        .expect_err("unknown email fails");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert!(hasher.dummy_ready(), "dummy hash was built and verified");
}
