//! Answer classification.
//!
//! Keyword rules run first, in a fixed order, and the first match wins:
//! exception, deep referral, known category. Only when none match is the
//! scored judge consulted. The judge is a network collaborator, so its call
//! is bounded and any failure degrades to conservative scores.

use callbot_core::case_file::Question;
use callbot_core::classification::{ANALYSIS_FAILED_REASON, ClassificationResult, KeywordRules};
use callbot_core::collaborator::ScoredJudge;
use callbot_core::registry::SeverityScores;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

pub struct AnswerClassifier {
    rules: KeywordRules,
    judge: Arc<dyn ScoredJudge>,
    judge_timeout: Duration,
}

impl AnswerClassifier {
    pub fn new(rules: KeywordRules, judge: Arc<dyn ScoredJudge>, judge_timeout: Duration) -> Self {
        Self {
            rules,
            judge,
            judge_timeout,
        }
    }

    /// Rules for one call: the configured rules extended with the expected
    /// answers of the call's question list.
    pub fn rules_for<'a>(&'a self, questions: &[Question]) -> Cow<'a, KeywordRules> {
        if questions.is_empty() {
            return Cow::Borrowed(&self.rules);
        }
        let mut rules = self.rules.clone();
        rules.extend_from_questions(questions);
        Cow::Owned(rules)
    }

    /// Keyword steps only. `Some(Unclassifiable)` for a blank answer.
    pub fn classify_keywords(rules: &KeywordRules, answer: &str) -> Option<ClassificationResult> {
        if answer.trim().is_empty() {
            return Some(ClassificationResult::Unclassifiable);
        }
        let result = rules
            .match_exception(answer)
            .or_else(|| rules.match_deep_referral(answer))
            .or_else(|| rules.match_category(answer));

        if let Some(result) = &result {
            tracing::debug!("[Classifier] Keyword match: {:?}", result);
        }
        result
    }

    /// Scored path only. Never fails: a judge error, timeout, or malformed
    /// verdict yields the fallback scores with reason "analysis failed".
    pub async fn classify_scored(&self, answer: &str) -> ClassificationResult {
        if answer.trim().is_empty() {
            return ClassificationResult::Unclassifiable;
        }

        let verdict = tokio::time::timeout(self.judge_timeout, self.judge.judge(answer)).await;
        let (scores, reason) = match verdict {
            Ok(Ok(verdict)) if verdict.scores.is_in_range() => (verdict.scores, verdict.reason),
            Ok(Ok(verdict)) => {
                tracing::warn!(
                    "[Classifier] Judge returned out-of-range scores {:?}, using fallback",
                    verdict.scores
                );
                Self::fallback()
            }
            Ok(Err(e)) => {
                tracing::warn!("[Classifier] Judge failed: {}, using fallback", e);
                Self::fallback()
            }
            Err(_) => {
                tracing::warn!(
                    "[Classifier] Judge timed out after {:?}, using fallback",
                    self.judge_timeout
                );
                Self::fallback()
            }
        };

        let reason = if reason.trim().is_empty() {
            ANALYSIS_FAILED_REASON.to_string()
        } else {
            reason
        };
        tracing::debug!("[Classifier] Scored {:?}: {}", scores, reason);
        ClassificationResult::Scored { scores, reason }
    }

    fn fallback() -> (SeverityScores, String) {
        (SeverityScores::fallback(), ANALYSIS_FAILED_REASON.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use callbot_core::case_file::{ExpectedAnswer, ResponseType};
    use callbot_core::classification::SeverityTier;
    use callbot_core::collaborator::ScoredVerdict;
    use callbot_core::{CallbotError, Result};
    use std::sync::Mutex;

    enum Behavior {
        Verdict(u8, u8, u8),
        Fail,
        Hang,
    }

    struct MockJudge {
        behavior: Behavior,
        calls: Mutex<u32>,
    }

    impl MockJudge {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ScoredJudge for MockJudge {
        async fn judge(&self, _answer: &str) -> Result<ScoredVerdict> {
            *self.calls.lock().unwrap() += 1;
            match self.behavior {
                Behavior::Verdict(u, a, g) => Ok(ScoredVerdict {
                    scores: SeverityScores::new(u, a, g),
                    reason: "허리 통증 호소".to_string(),
                }),
                Behavior::Fail => Err(CallbotError::decode("not json")),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(CallbotError::internal("unreachable"))
                }
            }
        }
    }

    fn classifier(judge: Arc<MockJudge>) -> AnswerClassifier {
        AnswerClassifier::new(KeywordRules::default(), judge, Duration::from_millis(50))
    }

    #[test]
    fn test_keyword_steps_in_order() {
        let rules = KeywordRules::default();

        assert!(
            AnswerClassifier::classify_keywords(&rules, "상담거부 합니다")
                .is_some_and(|r| r.is_exception())
        );
        assert!(matches!(
            AnswerClassifier::classify_keywords(&rules, "상담원 연결해 주세요"),
            Some(ClassificationResult::Escalation { .. })
        ));
        assert!(matches!(
            AnswerClassifier::classify_keywords(&rules, "월세가 두 달 밀렸어요"),
            Some(ClassificationResult::Risk {
                category_index: 2,
                ..
            })
        ));
        assert_eq!(AnswerClassifier::classify_keywords(&rules, "허리가 아파요"), None);
    }

    #[test]
    fn test_exception_wins_over_later_steps() {
        let result = AnswerClassifier::classify_keywords(
            &KeywordRules::default(),
            "상담거부, 상담원 연결도 필요 없어요",
        );
        assert!(result.is_some_and(|r| r.is_exception()));
    }

    #[tokio::test]
    async fn test_scored_path_uses_judge() {
        let judge = MockJudge::new(Behavior::Verdict(3, 0, 0));
        let classifier = classifier(judge.clone());
        let result = classifier.classify_scored("허리가 너무 아파요").await;
        assert_eq!(result.tier(), Some(SeverityTier::Critical));
        assert_eq!(*judge.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_judge_failure_falls_back() {
        let classifier = classifier(MockJudge::new(Behavior::Fail));
        assert_eq!(
            classifier.classify_scored("허리가 아파요").await,
            ClassificationResult::Scored {
                scores: SeverityScores::fallback(),
                reason: ANALYSIS_FAILED_REASON.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_judge_timeout_falls_back() {
        let classifier = classifier(MockJudge::new(Behavior::Hang));
        let result = classifier.classify_scored("허리가 아파요").await;
        assert_eq!(result.tier(), Some(SeverityTier::Caution));
    }

    #[tokio::test]
    async fn test_blank_answer_is_unclassifiable() {
        let judge = MockJudge::new(Behavior::Verdict(0, 0, 0));
        let classifier = classifier(judge.clone());
        assert_eq!(
            AnswerClassifier::classify_keywords(&KeywordRules::default(), "   "),
            Some(ClassificationResult::Unclassifiable)
        );
        assert_eq!(
            classifier.classify_scored("   ").await,
            ClassificationResult::Unclassifiable
        );
        assert_eq!(*judge.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_question_list_extends_rules() {
        let classifier = classifier(MockJudge::new(Behavior::Verdict(0, 0, 0)));
        let questions = vec![Question {
            text: "요즘 식사는 잘 하세요?".to_string(),
            expected_answer: vec![ExpectedAnswer {
                text: "밥을 거의 못 먹어요".to_string(),
                response_type_list: vec![ResponseType {
                    response_type: 1,
                    response_index: 6,
                }],
            }],
        }];

        let rules = classifier.rules_for(&questions);
        assert!(matches!(rules, Cow::Owned(_)));
        assert!(matches!(
            AnswerClassifier::classify_keywords(&rules, "요즘 밥을 거의 못 먹어요"),
            Some(ClassificationResult::Risk {
                category_index: 6,
                ..
            })
        ));
        assert!(matches!(classifier.rules_for(&[]), Cow::Borrowed(_)));
    }
}
