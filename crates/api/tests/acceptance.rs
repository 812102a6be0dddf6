mod common;

use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

use common::{as_principal, create_client, spawn_app};

/// Scenario 6 — randomize then join: a host creates an empty draft,
/// randomizes before anyone is seated, then adds a bot and joins a
/// human. Randomizing again must permute `seat_number` among the
/// occupied seats without moving any principal to a different seat.
#[tokio::test]
async fn randomize_after_join_permutes_seat_numbers_but_keeps_seat_identity() {
    let (base_url, pool) = spawn_app().await;
    let client = create_client();

    let create_response = as_principal(
        client.post(format!("{}/api/v1/draft", base_url)),
        "host",
    )
    .json(&json!({ "set_code": "TST", "max_seats": 4 }))
    .send()
    .await
    .expect("failed to create draft");
    assert_eq!(create_response.status(), 201);
    let created: Value = create_response.json().await.expect("invalid json");
    let share_id = created["share_id"].as_str().expect("missing share_id").to_string();

    // Randomizing an empty draft is a no-op but must still succeed.
    let empty_randomize = as_principal(
        client.post(format!("{}/api/v1/draft/{}/randomize", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to randomize empty draft");
    assert_eq!(empty_randomize.status(), 200);

    let bot_response = as_principal(
        client.post(format!("{}/api/v1/draft/{}/addBot", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to add bot");
    assert_eq!(bot_response.status(), 200);

    let join_response = as_principal(
        client.post(format!("{}/api/v1/draft/{}/join", base_url, share_id)),
        "alice",
    )
    .send()
    .await
    .expect("failed to join");
    assert_eq!(join_response.status(), 200);
    let joined: Value = join_response.json().await.expect("invalid json");
    let before = seat_identities(&joined);
    assert_eq!(before.len(), 3, "host, bot, and alice should all be seated");

    let randomize_response = as_principal(
        client.post(format!("{}/api/v1/draft/{}/randomize", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to randomize");
    assert_eq!(randomize_response.status(), 200);
    let randomized: Value = randomize_response.json().await.expect("invalid json");
    let after = seat_identities(&randomized);

    let before_numbers: HashSet<i64> = before.iter().map(|(_, _, n)| *n).collect();
    let after_numbers: HashSet<i64> = after.iter().map(|(_, _, n)| *n).collect();
    assert_eq!(
        before_numbers, after_numbers,
        "randomize must permute the same set of seat numbers, not invent new ones"
    );

    for (seat_id, principal, _) in &before {
        let still_there = after
            .iter()
            .find(|(id, p, _)| id == seat_id && p == principal);
        assert!(
            still_there.is_some(),
            "principal {principal} should keep owning seat {seat_id} after randomize"
        );
    }

    common::cleanup_database(&pool).await;
}

fn seat_identities(state: &Value) -> Vec<(String, String, i64)> {
    state["seats"]
        .as_array()
        .expect("seats array")
        .iter()
        .map(|seat| {
            (
                seat["seat_id"].as_str().unwrap().to_string(),
                seat["principal"].as_str().unwrap().to_string(),
                seat["seat_number"].as_i64().unwrap(),
            )
        })
        .collect()
}

/// Scenario 3 — CAS-conflict race: two seats select concurrently in the
/// leader round. The facade retries internally on a lost compare-and-
/// swap, so both requests must succeed and both picks must land, with
/// `state_version` advancing by exactly one commit.
#[tokio::test]
async fn concurrent_selects_from_different_seats_both_land() {
    let (base_url, pool) = spawn_app().await;
    let client = create_client();

    let create_response = as_principal(
        client.post(format!("{}/api/v1/draft", base_url)),
        "host",
    )
    .json(&json!({ "set_code": "TST", "max_seats": 2 }))
    .send()
    .await
    .expect("failed to create draft");
    let created: Value = create_response.json().await.expect("invalid json");
    let share_id = created["share_id"].as_str().unwrap().to_string();

    as_principal(
        client.post(format!("{}/api/v1/draft/{}/join", base_url, share_id)),
        "guest",
    )
    .send()
    .await
    .expect("failed to join");

    let start_response = as_principal(
        client.post(format!("{}/api/v1/draft/{}/start", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to start");
    assert_eq!(start_response.status(), 200);

    let host_card = first_offered_card(&base_url, &client, &share_id, "host").await;
    let guest_card = first_offered_card(&base_url, &client, &share_id, "guest").await;

    let host_select = as_principal(
        client.post(format!("{}/api/v1/draft/{}/select", base_url, share_id)),
        "host",
    )
    .json(&json!({ "card_id": host_card }));
    let guest_select = as_principal(
        client.post(format!("{}/api/v1/draft/{}/select", base_url, share_id)),
        "guest",
    )
    .json(&json!({ "card_id": guest_card }));

    let (host_result, guest_result) = tokio::join!(host_select.send(), guest_select.send());
    let host_response = host_result.expect("host select request failed");
    let guest_response = guest_result.expect("guest select request failed");
    assert_eq!(host_response.status(), 200, "host's select must survive any CAS retry");
    assert_eq!(guest_response.status(), 200, "guest's select must survive any CAS retry");

    let final_state = get_state(&base_url, &client, &share_id, "host").await;
    let seats = final_state["seats"].as_array().unwrap();
    assert_eq!(
        seats.iter().filter(|s| s["drafted_leaders_summary"].as_i64() == Some(1)).count(),
        2,
        "both concurrent picks must have committed into the round"
    );

    common::cleanup_database(&pool).await;
}

async fn first_offered_card(base_url: &str, client: &reqwest::Client, share_id: &str, principal: &str) -> String {
    let state = get_state(base_url, client, share_id, principal).await;
    state["private_hand"]["leader_offering"][0]
        .as_str()
        .expect("seat should have an offered leader card")
        .to_string()
}

async fn get_state(base_url: &str, client: &reqwest::Client, share_id: &str, principal: &str) -> Value {
    let response = as_principal(
        client.get(format!("{}/api/v1/draft/{}", base_url, share_id)),
        principal,
    )
    .send()
    .await
    .expect("failed to fetch draft state");
    assert_eq!(response.status(), 200);
    response.json().await.expect("invalid json")
}

/// Scenario 5 — pause straddles a timeout: pausing stops the round
/// clock from ever firing while paused, and the paused interval is
/// excluded from elapsed time entirely once resumed rather than
/// counting against the round timer as already-overdue.
#[tokio::test]
async fn pausing_suspends_the_round_timer_and_resuming_restarts_it() {
    let (base_url, pool) = spawn_app().await;
    let client = create_client();

    let create_response = as_principal(
        client.post(format!("{}/api/v1/draft", base_url)),
        "host",
    )
    .json(&json!({
        "set_code": "TST",
        "max_seats": 2,
        "round_timer_enabled": true,
        "round_timer_seconds": 1,
        "last_picker_timer_enabled": false,
    }))
    .send()
    .await
    .expect("failed to create draft");
    let created: Value = create_response.json().await.expect("invalid json");
    let share_id = created["share_id"].as_str().unwrap().to_string();

    as_principal(
        client.post(format!("{}/api/v1/draft/{}/join", base_url, share_id)),
        "guest",
    )
    .send()
    .await
    .expect("failed to join");
    as_principal(
        client.post(format!("{}/api/v1/draft/{}/start", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to start");

    let pause_response = as_principal(
        client.post(format!("{}/api/v1/draft/{}/pause", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to pause");
    assert_eq!(pause_response.status(), 200);
    let paused: Value = pause_response.json().await.expect("invalid json");
    assert_eq!(paused["paused"], true);
    let version_at_pause = paused["state_version"].as_i64().unwrap();

    // Round timer is 1s; sleeping well past it while paused must not
    // let the enforcer force a random pick.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let still_paused = get_state(&base_url, &client, &share_id, "host").await;
    assert_eq!(still_paused["paused"], true);
    assert_eq!(
        still_paused["state_version"].as_i64().unwrap(),
        version_at_pause,
        "the enforcer must not have forced a pick while the draft was paused"
    );

    let resume_response = as_principal(
        client.post(format!("{}/api/v1/draft/{}/resume", base_url, share_id)),
        "host",
    )
    .send()
    .await
    .expect("failed to resume");
    assert_eq!(resume_response.status(), 200);
    let resumed: Value = resume_response.json().await.expect("invalid json");
    assert_eq!(resumed["paused"], false);
    let version_at_resume = resumed["state_version"].as_i64().unwrap();

    // The pause happened moments after start, so the paused interval is
    // excluded entirely from elapsed time — shortly after resume the
    // round is nowhere near its 1s timer and nothing should have fired.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let shortly_after_resume = get_state(&base_url, &client, &share_id, "host").await;
    assert_eq!(
        shortly_after_resume["state_version"].as_i64().unwrap(),
        version_at_resume,
        "200ms after resume is well inside the round timer once the paused interval is excluded"
    );

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let after_timer_elapses = get_state(&base_url, &client, &share_id, "host").await;
    assert!(
        after_timer_elapses["state_version"].as_i64().unwrap() > version_at_resume,
        "the round timer should eventually force a commit once real elapsed time passes 1s"
    );

    common::cleanup_database(&pool).await;
}
