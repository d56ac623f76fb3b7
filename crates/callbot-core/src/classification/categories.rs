//! Category label tables shared with the case-management backend.
//!
//! All indices are 1-based and stable; the backend stores the numbers, not
//! the labels.

pub const RISK_CATEGORIES: &[(u32, &str)] = &[
    (1, "요금체납"),
    (2, "주거위기"),
    (3, "고용위기"),
    (4, "급여/서비스 탈락 및 미이용"),
    (5, "긴급상황 위기"),
    (6, "건강위기"),
    (7, "에너지위기"),
    (8, "기타"),
];

pub const DESIRE_CATEGORIES: &[(u32, &str)] = &[
    (1, "안전"),
    (2, "건강"),
    (3, "일상생활유지"),
    (4, "가족관계"),
    (5, "사회적 관계"),
    (6, "경제"),
    (7, "교육"),
    (8, "고용"),
    (9, "생활환경"),
    (10, "법률 및 권익보장"),
    (11, "기타"),
];

pub const FAIL_CODE_IDENTITY_MISMATCH: u32 = 1;
pub const FAIL_CODE_REFUSAL: u32 = 2;
pub const FAIL_CODE_INCOMPREHENSIBLE: u32 = 3;
pub const FAIL_CODE_INAPPROPRIATE: u32 = 4;
pub const FAIL_CODE_DISCONNECTED: u32 = 5;
pub const FAIL_CODE_NO_PICKUP: u32 = 6;

/// Exception reasons by `fail_code`, each with the phrases that identify it
/// besides the label itself. Ordered by fail code.
pub const EXCEPTIONS: &[(u32, &str, &[&str])] = &[
    (
        FAIL_CODE_IDENTITY_MISMATCH,
        "신상정보불일치",
        &["잘못 거셨", "그런 사람 없", "본인 아니", "번호 잘못"],
    ),
    (
        FAIL_CODE_REFUSAL,
        "상담거부",
        &["전화하지 마", "귀찮게 하지", "통화하기 싫"],
    ),
    (FAIL_CODE_INCOMPREHENSIBLE, "의사소통불가", &[]),
    (FAIL_CODE_INAPPROPRIATE, "부적절한답변", &["욕설"]),
    (FAIL_CODE_DISCONNECTED, "연결끊어짐", &[]),
    (FAIL_CODE_NO_PICKUP, "전화미수신", &[]),
];

/// Deep-referral labels; the position (1-based) is the `need_human` value.
pub const DEEP_REFERRAL_LABELS: &[&str] = &["심층상담을 원함", "알아낸 취약 정보가 중대함"];

pub const NEED_HUMAN_REQUESTED: u8 = 1;
pub const NEED_HUMAN_SEVERE: u8 = 2;

fn lookup(table: &[(u32, &'static str)], index: u32) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == index)
        .map(|(_, label)| *label)
}

pub fn risk_label(index: u32) -> Option<&'static str> {
    lookup(RISK_CATEGORIES, index)
}

pub fn desire_label(index: u32) -> Option<&'static str> {
    lookup(DESIRE_CATEGORIES, index)
}

pub fn exception_label(fail_code: u32) -> Option<&'static str> {
    EXCEPTIONS
        .iter()
        .find(|(code, _, _)| *code == fail_code)
        .map(|(_, label, _)| *label)
}

pub fn exception_labels() -> impl Iterator<Item = &'static str> {
    EXCEPTIONS.iter().map(|(_, label, _)| *label)
}

pub fn deep_referral_label(need_human: u8) -> Option<&'static str> {
    let position = usize::from(need_human).checked_sub(1)?;
    DEEP_REFERRAL_LABELS.get(position).copied()
}
