mod support;

// std
use std::time::Duration;
// crates.io
use http::StatusCode;
// self
use session_relay::{
	auth::{CredentialPair, TokenSecret},
	backend::BackendDescriptor,
	error::Error,
};
use support::*;

fn pair(access: Option<&str>, refresh: Option<&str>) -> CredentialPair {
	CredentialPair::new(access.map(TokenSecret::new), refresh.map(TokenSecret::new))
}

#[tokio::test]
async fn refresh_extracts_the_access_cookie_and_ignores_unrelated_ones() {
	let (relay, backend) = scripted_relay();

	backend.respond(
		REFRESH_PATH,
		with_set_cookies(ok_json("{}"), &["csrftoken=c2; Path=/", "access_token=A2; Path=/"]),
	);

	let grant = relay
		.refresh(Some(&TokenSecret::new("R1")))
		.await
		.expect("Refresh should succeed with an access cookie.");

	assert_eq!(grant.access.expose(), "A2");
	assert_eq!(grant.rotated_refresh, None);
	assert_eq!(grant.instructions.len(), 1);
	assert!(grant.instructions.get("csrftoken").is_none());
	assert_eq!(backend.cookies_sent_to(REFRESH_PATH), vec![Some("refresh_token=R1".to_owned())]);
}

#[tokio::test]
async fn refresh_failures_are_reported_by_cause() {
	let (relay, backend) = scripted_relay();

	let err = relay.refresh(None).await.expect_err("Missing credential should fail.");

	assert!(matches!(err, Error::MissingRefreshCredential));
	assert!(backend.requests().is_empty());

	backend.respond(REFRESH_PATH, status_json(StatusCode::UNAUTHORIZED, "{}"));

	let err = relay.refresh(Some(&TokenSecret::new("R1"))).await.expect_err("401 should fail.");

	assert!(matches!(err, Error::RefreshRejected { status: 401 }));

	backend.respond(REFRESH_PATH, ok_json("{}"));

	let err = relay
		.refresh(Some(&TokenSecret::new("R1")))
		.await
		.expect_err("A response without an access cookie should fail.");

	assert!(matches!(err, Error::MissingAccessCredential));

	backend.respond(
		REFRESH_PATH,
		with_set_cookies(ok_json("{}"), &["access_token=; Max-Age=0; Path=/"]),
	);

	let err = relay
		.refresh(Some(&TokenSecret::new("R1")))
		.await
		.expect_err("A cleared access cookie should fail.");

	assert!(matches!(err, Error::MissingAccessCredential));

	backend.fail(REFRESH_PATH);

	let err = relay.refresh(Some(&TokenSecret::new("R1"))).await.expect_err("Transport should fail.");

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(relay.metrics.refresh_attempts(), 5);
	assert_eq!(relay.metrics.refresh_failures(), 5);
	assert_eq!(relay.metrics.refresh_successes(), 0);
}

#[tokio::test]
async fn logout_is_best_effort() {
	let (relay, backend) = scripted_relay();

	backend
		.respond(
			LOGOUT_PATH,
			with_set_cookies(ok_json("{}"), &[
				"access_token=; Max-Age=0; Path=/",
				"refresh_token=; Max-Age=0; Path=/",
			]),
		)
		.respond(LOGOUT_PATH, status_json(StatusCode::INTERNAL_SERVER_ERROR, "{}"))
		.fail(LOGOUT_PATH);

	let cleared = relay.logout(Some(&TokenSecret::new("R1"))).await;

	assert!(cleared.clears("access_token"));
	assert!(cleared.clears("refresh_token"));
	assert!(relay.logout(Some(&TokenSecret::new("R1"))).await.is_empty());
	assert!(relay.logout(None).await.is_empty());
	assert_eq!(backend.cookies_sent_to(LOGOUT_PATH), vec![
		Some("refresh_token=R1".to_owned()),
		Some("refresh_token=R1".to_owned()),
		None,
	]);
	assert_eq!(relay.metrics.logout_calls(), 3);
}

#[tokio::test]
async fn preflight_renews_only_when_access_is_missing() {
	let (relay, backend) = scripted_relay();

	backend.respond(REFRESH_PATH, with_set_cookies(ok_json("{}"), &["access_token=A2; Path=/"]));

	let renewed = relay.preflight(&pair(None, Some("R1"))).await;

	assert!(renewed.renewed);
	assert_eq!(renewed.credentials, pair(Some("A2"), Some("R1")));
	assert!(renewed.instructions.get("access_token").is_some_and(|i| !i.is_clear()));

	for untouched in [pair(Some("A1"), Some("R1")), pair(Some("A1"), None), pair(None, None)] {
		let preflight = relay.preflight(&untouched).await;

		assert!(!preflight.renewed);
		assert_eq!(preflight.credentials, untouched);
		assert!(preflight.instructions.is_empty());
	}

	assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn preflight_failure_leaves_the_pair_unchanged_without_logout() {
	let (relay, backend) = scripted_relay();

	backend.respond(REFRESH_PATH, status_json(StatusCode::UNAUTHORIZED, "{}"));

	let credentials = pair(None, Some("R1"));
	let preflight = relay.preflight(&credentials).await;

	assert!(!preflight.renewed);
	assert_eq!(preflight.credentials, credentials);
	assert!(preflight.instructions.is_empty());
	assert!(backend.requests_to(LOGOUT_PATH).is_empty());
	assert_eq!(relay.metrics.refresh_attempts(), 1);
}

#[tokio::test]
async fn preflight_gives_up_when_the_refresh_outlives_the_overall_timeout() {
	let descriptor =
		BackendDescriptor { overall_timeout: Some(Duration::from_millis(50)), ..descriptor() };
	let (relay, backend) = scripted_relay_with(descriptor);

	backend.stall(
		REFRESH_PATH,
		Duration::from_secs(10),
		with_set_cookies(ok_json("{}"), &["access_token=A2; Path=/"]),
	);

	let credentials = pair(None, Some("R1"));
	let preflight = tokio::time::timeout(Duration::from_secs(5), relay.preflight(&credentials))
		.await
		.expect("Pre-flight should respect the overall timeout.");

	assert!(!preflight.renewed);
	assert_eq!(preflight.credentials, credentials);
	assert!(preflight.instructions.is_empty());
	assert!(backend.requests_to(LOGOUT_PATH).is_empty());
}
