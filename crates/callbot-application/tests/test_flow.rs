mod common;

use callbot_application::FlowSettings;
use callbot_application::prompt::{self, Prompt};
use callbot_core::session::SessionStore;
use common::{Harness, JudgeBehavior};
use std::sync::Arc;

#[tokio::test]
async fn test_resolved_item_runs_to_normal_completion() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA100", &[("주거문제", 2)]).await;

    let greeting = h.flow.handle_turn("CA100", None, None).await;
    assert!(!greeting.is_hang_up());
    assert!(greeting.text.starts_with(prompt::GREETING));
    assert!(greeting.text.contains("주거문제"));

    let next = h
        .flow
        .handle_turn("CA100", Some("이제 다 해결됐어요"), Some("RE1"))
        .await;
    assert!(next.text.starts_with(prompt::ACK_RESOLVED));
    assert!(next.text.contains(prompt::ASK_ADDITIONAL));

    let confirm = h.flow.handle_turn("CA100", Some("없어요"), Some("RE2")).await;
    assert_eq!(confirm, Prompt::ask(prompt::CONFIRM_END));

    let closing = h.flow.handle_turn("CA100", Some("네"), Some("RE3")).await;
    assert_eq!(closing, Prompt::hang_up(prompt::CLOSING));

    assert_eq!(h.sink.count(), 1);
    let report = h.sink.last();
    assert_eq!(report.result, 1);
    assert_eq!(report.fail_code, 0);
    assert_eq!(report.need_human, 0);
    assert!(report.delete_vulnerabilities.risk_list.is_empty());
    assert!(report.new_vulnerabilities.risk_list.is_empty());
    assert_eq!(report.result_vulnerabilities.risk_list.len(), 1);
    assert_eq!(report.reference.account_id.as_deref(), Some("acc-1"));
    assert!(report.overall_script.contains("A: 이제 다 해결됐어요"));
    assert!(report.overall_script.contains("A: 네"));
    assert_eq!(report.summary, "어르신과 안부 통화를 나눔.");

    assert_eq!(h.judge.calls(), 0, "resolved answers never reach the judge");
    assert!(h.store.is_empty().await, "session cleared at termination");
}

#[tokio::test]
async fn test_disconnect_terminates_once() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA200", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA200", None, None).await;

    assert!(h.flow.disconnect("CA200", 5).await);
    assert!(!h.flow.disconnect("CA200", 5).await);

    assert_eq!(h.sink.count(), 1);
    let report = h.sink.last();
    assert_eq!(report.result, 0);
    assert_eq!(report.fail_code, 5);
    assert_eq!(report.summary, "상담 불가: 연결끊어짐");
    assert!(report.delete_vulnerabilities.risk_list.is_empty());

    // A late delivery for the finished call must not start a new interview.
    let late = h.flow.handle_turn("CA200", Some("여보세요"), Some("RE9")).await;
    assert_eq!(late, Prompt::system_error());
    assert_eq!(h.sink.count(), 1);
}

#[tokio::test]
async fn test_duplicate_delivery_reserves_last_prompt() {
    let h = Harness::new(JudgeBehavior::Scores(1, 0, 0));
    h.seed("CA300", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA300", None, None).await;

    let first = h
        .flow
        .handle_turn("CA300", Some("허리가 아파요"), Some("RE1"))
        .await;
    let again = h
        .flow
        .handle_turn("CA300", Some("허리가 아파요"), Some("RE1"))
        .await;

    assert_eq!(first, again);
    assert!(first.text.contains(prompt::offer_help()));
    assert_eq!(h.judge.calls(), 1);

    let session = h.store.get("CA300").await.unwrap();
    assert_eq!(session.turn_index, 1);
    assert_eq!(session.script.len(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicates_advance_once() {
    let h = Harness::new(JudgeBehavior::Scores(1, 0, 0));
    h.seed("CA310", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA310", None, None).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let flow = Arc::clone(&h.flow);
        handles.push(tokio::spawn(async move {
            flow.handle_turn("CA310", Some("허리가 아파요"), Some("RE1"))
                .await
        }));
    }
    let mut prompts = Vec::new();
    for handle in handles {
        prompts.push(handle.await.unwrap());
    }

    assert!(prompts.windows(2).all(|pair| pair[0] == pair[1]));
    let session = h.store.get("CA310").await.unwrap();
    assert_eq!(session.turn_index, 1);
}

#[tokio::test]
async fn test_exception_ends_call_once() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA400", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA400", None, None).await;

    let ended = h
        .flow
        .handle_turn("CA400", Some("다시는 전화하지 마세요"), Some("RE1"))
        .await;
    assert_eq!(ended, Prompt::hang_up(prompt::EXCEPTION_CLOSING));

    let report = h.sink.last();
    assert_eq!(report.result, 0);
    assert_eq!(report.fail_code, 2);
    assert_eq!(report.summary, "상담 불가: 상담거부");

    let after = h
        .flow
        .handle_turn("CA400", Some("전화하지 말라니까요"), Some("RE2"))
        .await;
    assert_eq!(after, Prompt::system_error());
    assert_eq!(h.sink.count(), 1);
}

#[tokio::test]
async fn test_silence_reprompts_then_ends() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA500", &[("주거문제", 2)]).await;
    let greeting = h.flow.handle_turn("CA500", None, None).await;
    let question = greeting
        .text
        .trim_start_matches(prompt::GREETING)
        .trim()
        .to_string();

    for id in ["RE1", "RE2"] {
        let reprompt = h.flow.handle_turn("CA500", None, Some(id)).await;
        assert!(!reprompt.is_hang_up());
        assert_eq!(reprompt.text, prompt::join(prompt::NOT_HEARD, &question));
    }

    let ended = h.flow.handle_turn("CA500", Some("   "), Some("RE3")).await;
    assert!(ended.is_hang_up());

    let report = h.sink.last();
    assert_eq!(report.fail_code, 3);
    assert_eq!(report.result, 0);
    assert!(report.overall_script.is_empty());
}

#[tokio::test]
async fn test_judge_failure_does_not_abort_call() {
    let h = Harness::new(JudgeBehavior::Fail);
    h.seed("CA600", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA600", None, None).await;

    let offer = h
        .flow
        .handle_turn("CA600", Some("허리가 아파요"), Some("RE1"))
        .await;
    assert!(!offer.is_hang_up());
    assert!(offer.text.contains(prompt::offer_help()));

    h.flow.handle_turn("CA600", Some("아니요"), Some("RE2")).await;
    h.flow.handle_turn("CA600", Some("없어요"), Some("RE3")).await;
    let closing = h.flow.handle_turn("CA600", Some("네"), Some("RE4")).await;
    assert_eq!(closing, Prompt::hang_up(prompt::CLOSING));

    let report = h.sink.last();
    assert_eq!(report.result, 1);
    let added = &report.new_vulnerabilities.risk_list;
    assert_eq!(added.len(), 1);
    assert_eq!(
        added[0].content,
        "analysis failed [긴급성(1), 일상생활(1), 보호자(2)]"
    );
    assert_eq!(added[0].risk_index_list, vec![8]);
}

#[tokio::test]
async fn test_accepted_help_offer_requests_counselor() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA700", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA700", None, None).await;

    let offer = h
        .flow
        .handle_turn("CA700", Some("월세가 석 달 밀렸어요"), Some("RE1"))
        .await;
    assert!(offer.text.contains(prompt::offer_help()));

    let referred = h
        .flow
        .handle_turn("CA700", Some("네 부탁드려요"), Some("RE2"))
        .await;
    assert!(referred.text.starts_with(prompt::ACK_REFERRED));

    h.flow.handle_turn("CA700", Some("없어요"), Some("RE3")).await;
    h.flow.handle_turn("CA700", Some("네"), Some("RE4")).await;

    let report = h.sink.last();
    assert_eq!(report.need_human, 1);
    assert_eq!(report.result, 2);
    assert!(report.summary.ends_with("심층상담 필요."));
    assert_eq!(report.new_vulnerabilities.risk_list[0].content, "주거위기");
    assert_eq!(h.judge.calls(), 0);
}

#[tokio::test]
async fn test_declined_help_offer_continues_call() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA710", &[("주거문제", 2)]).await;
    h.flow.handle_turn("CA710", None, None).await;

    let offer = h
        .flow
        .handle_turn("CA710", Some("월세가 석 달 밀렸어요"), Some("RE1"))
        .await;
    assert!(offer.text.contains(prompt::offer_help()));

    let next = h
        .flow
        .handle_turn("CA710", Some("아니요, 상담원 연결은 필요 없어요"), Some("RE2"))
        .await;
    assert!(!next.is_hang_up());
    assert!(next.text.starts_with(prompt::ACK_NOTED));
    assert!(next.text.contains(prompt::ASK_ADDITIONAL));
    assert_eq!(h.sink.count(), 0);

    h.flow.handle_turn("CA710", Some("없어요"), Some("RE3")).await;
    let closing = h
        .flow
        .handle_turn("CA710", Some("네, 괜찮아요"), Some("RE4"))
        .await;
    assert_eq!(closing, Prompt::hang_up(prompt::CLOSING));

    let report = h.sink.last();
    assert_eq!(report.fail_code, 0);
    assert_eq!(report.need_human, 0);
    assert_eq!(report.result, 1);
}

#[tokio::test]
async fn test_negated_answers_do_not_resolve_items() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA720", &[("주거문제", 2), ("고용문제", 3), ("건강문제", 6)])
        .await;
    h.flow.handle_turn("CA720", None, None).await;

    for (i, answer) in ["안 괜찮아요", "돈이 없어요", "별로 안 나아졌어요"]
        .iter()
        .enumerate()
    {
        let answer_id = format!("RE{}", i * 2);
        let offer = h
            .flow
            .handle_turn("CA720", Some(*answer), Some(answer_id.as_str()))
            .await;
        assert!(!offer.is_hang_up());
        assert!(!offer.text.starts_with(prompt::ACK_RESOLVED), "{answer}");
        assert!(offer.text.contains(prompt::offer_help()), "{answer}");
        assert_eq!(h.judge.calls(), i + 1);

        let decline_id = format!("RE{}", i * 2 + 1);
        h.flow
            .handle_turn("CA720", Some("아니요"), Some(decline_id.as_str()))
            .await;
    }

    let session = h.store.get("CA720").await.unwrap();
    assert_eq!(session.turn_index, 6);
    assert_eq!(h.sink.count(), 0);
}

#[tokio::test]
async fn test_unconfirmed_end_returns_to_additional() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    h.seed("CA730", &[]).await;
    h.flow.handle_turn("CA730", None, None).await;

    let confirm = h.flow.handle_turn("CA730", Some("없어요"), Some("RE1")).await;
    assert_eq!(confirm, Prompt::ask(prompt::CONFIRM_END));

    let back = h
        .flow
        .handle_turn("CA730", Some("아니요, 더 있어요"), Some("RE2"))
        .await;
    assert!(!back.is_hang_up());
    assert!(back.text.starts_with(prompt::ACK_NOTED));
    assert!(back.text.contains(prompt::ASK_ADDITIONAL));
    assert_eq!(h.sink.count(), 0);

    let confirm = h.flow.handle_turn("CA730", Some("없어요"), Some("RE3")).await;
    assert_eq!(confirm, Prompt::ask(prompt::CONFIRM_END));
    let closing = h
        .flow
        .handle_turn("CA730", Some("네, 괜찮아요"), Some("RE4"))
        .await;
    assert_eq!(closing, Prompt::hang_up(prompt::CLOSING));
    assert_eq!(h.sink.count(), 1);
    assert_eq!(h.sink.last().fail_code, 0);
}

#[tokio::test]
async fn test_additional_complaint_detail_and_severity() {
    let h = Harness::new(JudgeBehavior::Scores(3, 2, 4));
    h.seed("CA800", &[]).await;

    let greeting = h.flow.handle_turn("CA800", None, None).await;
    assert!(greeting.text.contains(prompt::ASK_ADDITIONAL));

    let answers = [
        "허리가 너무 아파서 걷기가 힘들어요",
        "지난주에 넘어졌어요",
        "많이 급해요",
        "밥 먹기도 힘들어요",
        "혼자 살아요",
    ];
    let mut last = Prompt::ask("");
    for (i, answer) in answers.iter().enumerate() {
        let delivery_id = format!("RE{i}");
        last = h
            .flow
            .handle_turn("CA800", Some(*answer), Some(delivery_id.as_str()))
            .await;
        assert!(!last.is_hang_up());
    }
    assert!(last.text.starts_with(prompt::ACK_REFERRED));
    assert!(last.text.contains(prompt::ASK_ADDITIONAL));

    let judged = h.judge.answers.lock().unwrap().clone();
    assert_eq!(judged.len(), 1);
    assert!(judged[0].contains("허리가 너무 아파서"));
    assert!(judged[0].contains("혼자 살아요"));

    h.flow.handle_turn("CA800", Some("없어요"), Some("RE10")).await;
    h.flow.handle_turn("CA800", Some("네"), Some("RE11")).await;

    let report = h.sink.last();
    assert_eq!(report.need_human, 2);
    assert_eq!(report.result, 2);
    let added = &report.new_vulnerabilities.risk_list;
    assert_eq!(added.len(), 1);
    assert!(added[0].content.starts_with("허리 통증 [긴급성(3)"));
}

#[tokio::test]
async fn test_turn_cap_ends_call_normally() {
    let settings = FlowSettings {
        max_turns: 2,
        ..FlowSettings::default()
    };
    let h = Harness::with_settings(JudgeBehavior::Scores(0, 0, 0), settings);
    h.seed("CA900", &[]).await;
    h.flow.handle_turn("CA900", None, None).await;

    let first = h
        .flow
        .handle_turn("CA900", Some("허리가 아파요"), Some("RE1"))
        .await;
    assert!(!first.is_hang_up());

    let capped = h
        .flow
        .handle_turn("CA900", Some("넘어졌어요"), Some("RE2"))
        .await;
    assert_eq!(capped, Prompt::hang_up(prompt::CLOSING));

    let report = h.sink.last();
    assert_eq!(report.fail_code, 0);
    assert_eq!(report.result, 1);
}

#[tokio::test]
async fn test_unseeded_call_gets_apology() {
    let h = Harness::new(JudgeBehavior::Scores(0, 0, 0));
    let prompt = h.flow.handle_turn("CA-unknown", None, None).await;
    assert_eq!(prompt, Prompt::system_error());
    assert_eq!(h.sink.count(), 0);
}
