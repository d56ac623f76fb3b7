mod common;

use callbot_application::IntakeRequest;
use callbot_core::session::{Phase, SessionStore};
use common::{Harness, JudgeBehavior};

fn request(call_key: Option<&str>) -> IntakeRequest {
    let mut body = serde_json::json!({
        "account_id": "acc-9",
        "s_index": 1,
        "v_id": "v-9",
        "q_id": "q-9",
        "name": "이돌봄",
        "phone": "010-9876-5432",
        "address": { "state": "서울", "city": "마포구" },
        "question_list": [
            {
                "text": "식사는 잘 하세요?",
                "expected_answer": [
                    { "text": "끼니를 거르고", "response_type_list": [{ "response_type": 1, "response_index": 6 }] }
                ]
            }
        ],
        "vulnerabilities": {
            "risk_list": [
                { "risk_index_list": [2], "content": "주거문제" },
                { "risk_index_list": [2], "content": "주거문제" }
            ],
            "desire_list": [ { "desire_type": [5], "content": "말벗" } ]
        }
    });
    if let Some(key) = call_key {
        body["call_key"] = serde_json::Value::String(key.to_string());
    }
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_receive_seeds_session() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    let receipt = h.intake.receive(request(Some("CA1"))).await.unwrap();

    assert_eq!(receipt.call_key, "CA1");
    assert_eq!(receipt.question_count, 1);
    assert_eq!(receipt.phone, "+821098765432");

    let session = h.store.get("CA1").await.unwrap();
    assert!(session.is_live());
    assert_eq!(session.phase, Phase::Greeting);
    assert_eq!(session.risk_list.len(), 1, "duplicate items collapse on intake");
    assert_eq!(session.before_risk, session.risk_list);
    assert_eq!(session.before_desire.len(), 1);
    assert_eq!(session.reference.vulnerable_id.as_deref(), Some("v-9"));
}

#[tokio::test]
async fn test_receive_generates_call_key() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    let receipt = h.intake.receive(request(None)).await.unwrap();
    assert_eq!(receipt.call_key.len(), 36);
    assert!(h.store.get(&receipt.call_key).await.unwrap().is_live());
}

#[tokio::test]
async fn test_live_key_cannot_be_reseeded() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.intake.receive(request(Some("CA2"))).await.unwrap();

    let err = h.intake.receive(request(Some("CA2"))).await.unwrap_err();
    assert!(err.is_invalid_state());

    // Once the call has ended the key may be scheduled again.
    assert!(h.flow.disconnect("CA2", 6).await);
    assert!(h.intake.receive(request(Some("CA2"))).await.is_ok());
}

#[tokio::test]
async fn test_question_list_rules_apply_to_the_call() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.intake.receive(request(Some("CA3"))).await.unwrap();
    h.flow.handle_turn("CA3", None, None).await;

    h.flow
        .handle_turn("CA3", Some("요즘 끼니를 거르고 있어요"), Some("RE1"))
        .await;

    let session = h.store.get("CA3").await.unwrap();
    assert!(session.risk_list.iter().any(|item| item.content == "건강위기"));
    assert_eq!(h.judge.calls(), 0);
}
