use crate::common::{TestClient, TestStateBuilder};
use axum::http::StatusCode;
use hzc_db::{Category, Flashcard, FlashcardRepository};
use hzc_srs::{Level, Track, today};
use serde_json::{Value, json};

fn seeded(words: &[&str]) -> (TestStateBuilder, Vec<Flashcard>) {
    let cards: Vec<_> = words
        .iter()
        .map(|w| Flashcard::new(*w, "pīn", "meaning", today()))
        .collect();
    let builder = cards
        .iter()
        .cloned()
        .fold(TestStateBuilder::new(), TestStateBuilder::with_card);
    (builder, cards)
}

async fn start(client: &TestClient, uri: &str) -> (String, Value) {
    let response = client.post(uri).await;
    response.assert_status(StatusCode::CREATED);
    let view: Value = response.json();
    (view["id"].as_str().unwrap().to_string(), view)
}

/// Reveal the current card and record an outcome; returns the answered card id.
async fn answer(client: &TestClient, session: &str, successful: bool) -> (String, Value) {
    let revealed: Value = client
        .post(&format!("/reviews/sessions/{session}/reveal"))
        .await
        .json();
    assert_eq!(revealed["state"]["revealed"], true);
    let id = revealed["card"]["id"].as_str().unwrap().to_string();

    let response = client
        .post_json(
            &format!("/reviews/sessions/{session}/outcome"),
            &json!({ "successful": successful }),
        )
        .await;
    response.assert_status(StatusCode::OK);
    (id, response.json())
}

#[tokio::test]
async fn test_failed_cards_come_back_in_the_same_session() {
    let (builder, cards) = seeded(&["一", "二", "三"]);
    let state = builder.build();
    let client = TestClient::from_state(state.clone());

    let (session, view) = start(&client, "/reviews/reading/sessions").await;
    assert_eq!(view["state"], json!({ "status": "active", "revealed": false }));
    assert_eq!(view["remaining"], 3);
    assert!(view["card"].is_null());
    assert!(view["prompt"].is_string());

    let (x, _) = answer(&client, &session, false).await;
    let (y, _) = answer(&client, &session, true).await;
    let (z, view) = answer(&client, &session, false).await;
    assert_eq!(view["remaining"], 2);

    let (again, _) = answer(&client, &session, true).await;
    assert_eq!(again, x);
    let (last, view) = answer(&client, &session, true).await;
    assert_eq!(last, z);

    assert_eq!(view["state"]["status"], "finished");
    assert_eq!(view["remaining"], 0);
    assert_eq!(view["answered"], json!([y, x, z]));

    let store = state.store().unwrap();
    for card in &cards {
        let stored = store.get_flashcard(&card.id).unwrap();
        assert_eq!(stored.review(Track::Reading).level, Level::new(1).unwrap());
        assert_eq!(stored.review(Track::Listening).level, Level::NEW);
    }
}

#[tokio::test]
async fn test_outcome_before_reveal_is_ignored() {
    let (builder, _) = seeded(&["一"]);
    let client = TestClient::from_state(builder.build());
    let (session, _) = start(&client, "/reviews/listening/sessions").await;

    let view: Value = client
        .post_json(
            &format!("/reviews/sessions/{session}/outcome"),
            &json!({ "successful": true }),
        )
        .await
        .json();
    assert_eq!(view["remaining"], 1);
    assert_eq!(view["state"]["revealed"], false);
}

#[tokio::test]
async fn test_empty_session_is_finished() {
    let client = TestClient::from_state(TestStateBuilder::new().build());
    let (_, view) = start(&client, "/reviews/speaking/sessions").await;
    assert_eq!(view["state"]["status"], "finished");
    assert!(view["prompt"].is_null());
}

#[tokio::test]
async fn test_speaking_prompt_is_english() {
    let (builder, _) = seeded(&["一"]);
    let client = TestClient::from_state(builder.build());
    let (_, view) = start(&client, "/reviews/speaking/sessions").await;
    assert_eq!(view["prompt"], "meaning");
}

#[tokio::test]
async fn test_change_filter_restarts_session() {
    let category = Category::new("Numbers", "#123456");
    let tagged = Flashcard::new("四", "sì", "four", today()).with_category(category.id.clone());
    let (builder, _) = seeded(&["一", "二"]);
    let state = builder.build();
    {
        let mut store = state.store().unwrap();
        store.add_category(category.clone()).unwrap();
        store.add_flashcard(tagged.clone()).unwrap();
    }
    let client = TestClient::from_state(state);

    let (session, view) = start(&client, "/reviews/reading/sessions?category=none").await;
    assert_eq!(view["remaining"], 2);
    answer(&client, &session, true).await;

    let response = client
        .put_json(
            &format!("/reviews/sessions/{session}/filter"),
            &json!({ "category": category.id.as_str(), "track": "listening" }),
        )
        .await;
    response.assert_status(StatusCode::OK);
    let view: Value = response.json();
    assert_eq!(view["track"], "listening");
    assert_eq!(view["filter"], json!({ "kind": "category", "id": category.id.as_str() }));
    assert_eq!(view["remaining"], 1);
    assert_eq!(view["answered"], json!([]));
    assert_eq!(view["prompt"], "四");
}

#[tokio::test]
async fn test_deleted_card_is_skipped() {
    let (builder, cards) = seeded(&["一"]);
    let client = TestClient::from_state(builder.build());
    let (session, _) = start(&client, "/reviews/reading/sessions").await;

    client
        .delete(&format!("/flashcards/{}", cards[0].id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (id, view) = answer(&client, &session, false).await;
    assert_eq!(id, cards[0].id.as_str());
    assert_eq!(view["state"]["status"], "finished");
    assert_eq!(view["answered"], json!([id]));
}

#[tokio::test]
async fn test_session_lifecycle() {
    let client = TestClient::from_state(TestStateBuilder::new().build());
    let (session, _) = start(&client, "/reviews/reading/sessions").await;
    let uri = format!("/reviews/sessions/{session}");

    client.get(&uri).await.assert_status(StatusCode::OK);
    client
        .delete(&uri)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    client.get(&uri).await.assert_status(StatusCode::NOT_FOUND);
    client
        .post(&format!("{uri}/reveal"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
