//! Authorizer behaviour against the reference policy fixture.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use orgauthz_core::policy::AuthorizeInput;
use orgauthz_core::{Action, AuthzError};
use orgauthz_engine::compiler::{OrgQueries, QueryBackend, QueryCompiler};
use orgauthz_engine::obs::AuthzMetrics;
use orgauthz_engine::store::MemoryStore;
use orgauthz_engine::{Authorizer, RequestContext};
use tokio_util::sync::CancellationToken;

use common::*;

#[tokio::test]
async fn new_propagates_store_failure() {
    let err = Authorizer::new(Arc::new(ScriptedStore::failing()), &engine_cfg())
        .await
        .err()
        .expect("must fail");
    assert!(matches!(err, AuthzError::Store(_)));
    let cause = std::error::Error::source(&err).and_then(|s| s.downcast_ref::<FakeDatabaseFailure>());
    assert!(cause.is_some(), "underlying cause must be preserved");
}

#[tokio::test]
async fn new_rejects_malformed_document() {
    let store = ScriptedStore {
        document: Some(br#"{"invalid"#.to_vec()),
        ..ScriptedStore::failing()
    };
    let err = Authorizer::new(Arc::new(store), &engine_cfg()).await.err().expect("must fail");
    assert!(matches!(err, AuthzError::InvalidDocument(_)));
}

#[tokio::test]
async fn new_fails_fast_on_a_single_broken_policy() {
    let doc = br#"{
        "good": {"authorization_enabled": true, "predefined_policy": "rbac.v1", "policy_data": {}},
        "bad": {"authorization_enabled": true, "custom_policy": "package artifacthub.authz\nallow {", "policy_data": {}}
    }"#;
    let err = Authorizer::new(Arc::new(MemoryStore::new(doc.to_vec())), &engine_cfg())
        .await
        .err()
        .expect("must fail");
    assert!(matches!(err, AuthzError::Compile { ref org, .. } if org == "bad"));

    let doc = br#"{"x": {"authorization_enabled": true, "predefined_policy": "nope.v1"}}"#;
    let err = Authorizer::new(Arc::new(MemoryStore::new(doc.to_vec())), &engine_cfg())
        .await
        .err()
        .expect("must fail");
    assert!(err.to_string().contains("nope.v1"));
}

#[tokio::test]
async fn new_builds_snapshot_of_enabled_orgs() {
    let (_store, az) = fixture_authorizer().await;
    let snap = az.snapshot();
    assert_eq!(snap.organizations(), vec![ORG1, ORG2]);
    assert!(!snap.contains(ORG3));
    assert!(az.is_auto_refreshing());
    assert_eq!(az.metrics().organizations_loaded.get(), 2);
}

#[tokio::test]
async fn new_survives_missing_subscription() {
    let store = ScriptedStore {
        document: Some(fixture_policies()),
        alias: Some("user1".into()),
        ..ScriptedStore::failing()
    };
    let az = Authorizer::new(Arc::new(store), &engine_cfg()).await.unwrap();
    assert!(!az.is_auto_refreshing());

    let input = AuthorizeInput::new(ORG1, USER1_ID, Action::TRANSFER_ORGANIZATION_REPOSITORY);
    az.authorize(&RequestContext::background(), &input).await.unwrap();
}

#[tokio::test]
async fn authorize_reference_scenarios() {
    let (_store, az) = fixture_authorizer().await;
    let ctx = RequestContext::background();

    let cases = [
        (ORG1, USER1_ID, Action::ADD_ORGANIZATION_MEMBER, true),
        (ORG1, USER2_ID, Action::ADD_ORGANIZATION_MEMBER, true),
        (ORG1, USER3_ID, Action::ADD_ORGANIZATION_MEMBER, false),
        (ORG1, USER5_ID, Action::ADD_ORGANIZATION_MEMBER, false),
        (ORG1, USER2_ID, Action::UPDATE_ORGANIZATION, false),
        (ORG1, USER3_ID, Action::UPDATE_ORGANIZATION, true),
        (ORG1, USER1_ID, Action::TRANSFER_ORGANIZATION_REPOSITORY, true),
        (ORG1, USER2_ID, Action::TRANSFER_ORGANIZATION_REPOSITORY, false),
        (ORG1, USER4_ID, Action::UPDATE_ORGANIZATION, false),
        (ORG2, USER1_ID, Action::ADD_ORGANIZATION_MEMBER, false),
        (ORG2, USER2_ID, Action::ADD_ORGANIZATION_MEMBER, false),
        (ORG3, USER1_ID, Action::ADD_ORGANIZATION_MEMBER, true),
        (ORG3, USER2_ID, Action::ADD_ORGANIZATION_MEMBER, true),
        (ORG3, USER3_ID, Action::ADD_ORGANIZATION_MEMBER, true),
        (ORG3, USER5_ID, Action::DELETE_ORGANIZATION, true),
        ("no-such-org", USER5_ID, Action::DELETE_ORGANIZATION, true),
    ];

    for (i, (org, user, action, allow)) in cases.into_iter().enumerate() {
        let input = AuthorizeInput::new(org, user, action);
        let res = az.authorize(&ctx, &input).await;
        if allow {
            assert!(res.is_ok(), "case {i}: {input:?} -> {res:?}");
        } else {
            let err = res.expect_err("expected denial");
            assert!(err.is_insufficient_privilege(), "case {i}: {input:?} -> {err:?}");
        }
    }
}

#[tokio::test]
async fn authorize_denies_sentinel_action_in_enforced_org() {
    let (_store, az) = fixture_authorizer().await;
    let ctx = RequestContext::background();

    let err = az
        .authorize(&ctx, &AuthorizeInput::new(ORG1, USER1_ID, Action::ALL))
        .await
        .unwrap_err();
    assert!(err.is_insufficient_privilege());

    az.authorize(&ctx, &AuthorizeInput::new(ORG3, USER1_ID, Action::ALL))
        .await
        .unwrap();
}

#[tokio::test]
async fn get_allowed_actions_reference_scenarios() {
    let (_store, az) = fixture_authorizer().await;
    let ctx = RequestContext::background();

    let cases: Vec<(&str, &str, Option<Vec<Action>>)> = vec![
        (USER1_ID, ORG1, Some(vec![Action::ALL])),
        (
            USER2_ID,
            ORG1,
            Some(vec![Action::ADD_ORGANIZATION_MEMBER, Action::DELETE_ORGANIZATION_MEMBER]),
        ),
        (USER3_ID, ORG1, Some(vec![Action::UPDATE_ORGANIZATION])),
        (USER4_ID, ORG1, Some(vec![])),
        (USER5_ID, ORG1, None),
        (USER1_ID, ORG2, None),
        (USER2_ID, ORG2, None),
        (USER1_ID, ORG3, Some(vec![Action::ALL])),
        (USER3_ID, ORG3, Some(vec![Action::ALL])),
        (USER5_ID, ORG3, Some(vec![Action::ALL])),
    ];

    for (i, (user, org, expected)) in cases.into_iter().enumerate() {
        let actions = az.get_allowed_actions(&ctx, user, org).await.ok().flatten();
        assert_eq!(actions, expected, "case {i}: user={user} org={org}");
    }
}

#[tokio::test]
async fn get_allowed_actions_keeps_empty_and_undefined_apart() {
    let (_store, az) = fixture_authorizer().await;
    let ctx = RequestContext::background();

    let empty = az.get_allowed_actions(&ctx, USER4_ID, ORG1).await.unwrap();
    assert_eq!(empty, Some(vec![]));

    let undefined = az.get_allowed_actions(&ctx, USER1_ID, ORG2).await.unwrap();
    assert_eq!(undefined, None);

    let err = az.get_allowed_actions(&ctx, USER5_ID, ORG1).await.unwrap_err();
    assert!(matches!(err, AuthzError::AliasResolution(_)));
    assert!(!err.is_insufficient_privilege());

    let m = az.metrics();
    assert_eq!(m.allowed_actions.get(&[("outcome", "empty")]), 1);
    assert_eq!(m.allowed_actions.get(&[("outcome", "undefined")]), 1);
    assert_eq!(m.allowed_actions.get(&[("outcome", "error")]), 1);
}

#[tokio::test]
async fn alias_failure_in_authorize_is_insufficient_privilege() {
    let (_store, az) = fixture_authorizer().await;
    let input = AuthorizeInput::new(ORG1, USER5_ID, Action::UPDATE_ORGANIZATION);
    let err = az.authorize(&RequestContext::background(), &input).await.unwrap_err();
    assert!(matches!(err, AuthzError::InsufficientPrivilege));
    assert_eq!(
        az.metrics().alias_failures.get(&[("op", "authorize"), ("reason", "error")]),
        1
    );
}

fn hanging_alias_store() -> ScriptedStore {
    ScriptedStore {
        document: Some(fixture_policies()),
        alias: None,
        hang_on_alias: true,
        subscribable: false,
    }
}

#[tokio::test]
async fn request_timeout_bounds_alias_lookup() {
    let az = Authorizer::new(Arc::new(hanging_alias_store()), &engine_cfg()).await.unwrap();
    let ctx = RequestContext::background().timeout(Duration::from_millis(30));

    let input = AuthorizeInput::new(ORG1, USER1_ID, Action::UPDATE_ORGANIZATION);
    let err = tokio::time::timeout(Duration::from_secs(5), az.authorize(&ctx, &input))
        .await
        .expect("authorize must not hang")
        .unwrap_err();
    assert!(err.is_insufficient_privilege());

    let err = tokio::time::timeout(Duration::from_secs(5), az.get_allowed_actions(&ctx, USER1_ID, ORG1))
        .await
        .expect("get_allowed_actions must not hang")
        .unwrap_err();
    assert!(matches!(err, AuthzError::AliasResolution(_)));
    assert_eq!(
        az.metrics().alias_failures.get(&[("op", "authorize"), ("reason", "timeout")]),
        1
    );
}

#[tokio::test]
async fn cancelled_context_fails_alias_lookup() {
    let az = Authorizer::new(Arc::new(hanging_alias_store()), &engine_cfg()).await.unwrap();
    let token = CancellationToken::new();
    let ctx = RequestContext::with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), az.get_allowed_actions(&ctx, USER1_ID, ORG1))
        .await
        .expect("must not hang")
        .unwrap_err();
    assert!(matches!(err, AuthzError::Cancelled));

    let input = AuthorizeInput::new(ORG1, USER1_ID, Action::UPDATE_ORGANIZATION);
    let err = az.authorize(&ctx, &input).await.unwrap_err();
    assert!(err.is_insufficient_privilege());
    canceller.await.unwrap();
}

/// Backend whose queries always fail to evaluate.
struct FailingBackend;

struct FailingQueries;

impl OrgQueries for FailingQueries {
    fn evaluate_allow(&self, _input: &orgauthz_core::policy::EvaluationInput) -> orgauthz_core::Result<bool> {
        Err(AuthzError::Evaluation("boom".into()))
    }

    fn evaluate_allowed_actions(
        &self,
        _input: &orgauthz_core::policy::EvaluationInput,
    ) -> orgauthz_core::Result<Option<Vec<Action>>> {
        Err(AuthzError::Evaluation("boom".into()))
    }
}

impl QueryBackend for FailingBackend {
    fn prepare(&self, _source: &str) -> Result<Arc<dyn OrgQueries>, String> {
        Ok(Arc::new(FailingQueries))
    }
}

#[tokio::test]
async fn evaluation_errors_fail_closed_in_authorize_and_surface_in_listing() {
    let az = Authorizer::with_parts(
        fixture_store(),
        &engine_cfg(),
        QueryCompiler::with_backend(Arc::new(FailingBackend)),
        Arc::new(AuthzMetrics::default()),
    )
    .await
    .unwrap();
    let ctx = RequestContext::background();

    let input = AuthorizeInput::new(ORG1, USER1_ID, Action::UPDATE_ORGANIZATION);
    let err = az.authorize(&ctx, &input).await.unwrap_err();
    assert!(err.is_insufficient_privilege());
    assert_eq!(az.metrics().decisions.get(&[("outcome", "deny_error")]), 1);

    let err = az.get_allowed_actions(&ctx, USER1_ID, ORG1).await.unwrap_err();
    assert!(matches!(err, AuthzError::Evaluation(_)));

    // Disabled orgs never reach the backend.
    az.authorize(&ctx, &AuthorizeInput::new(ORG3, USER1_ID, Action::UPDATE_ORGANIZATION))
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_requests_share_one_snapshot() {
    let (_store, az) = fixture_authorizer().await;
    let az = Arc::new(az);

    let mut tasks = Vec::new();
    for i in 0..32 {
        let az = Arc::clone(&az);
        tasks.push(tokio::spawn(async move {
            let ctx = RequestContext::background();
            let (user, allowed) = if i % 2 == 0 { (USER1_ID, true) } else { (USER2_ID, false) };
            let input = AuthorizeInput::new(ORG1, user, Action::UPDATE_ORGANIZATION);
            assert_eq!(az.authorize(&ctx, &input).await.is_ok(), allowed);
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }
    assert_eq!(az.metrics().decisions.get(&[("outcome", "allow")]), 16);
    assert_eq!(az.metrics().decisions.get(&[("outcome", "deny")]), 16);
}
