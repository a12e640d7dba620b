//! Fixed keyword FAQ. First matching keyword wins, so more specific
//! entries must precede broader ones sharing a prefix.

const FAQ_ENTRIES: [(&str, &str); 7] = [
    ("반품", "제품 수령 후 7일 이내 반품 가능합니다."),
    ("배송", "배송은 2~3일 소요됩니다."),
    ("환불", "환불은 영업일 기준 3일 이내 처리됩니다."),
    (
        "가입 승인",
        "회원 가입 승인까지 영업일 기준 1~2일 소요됩니다. 승인 완료 시 문자 메세지를 보내드립니다.",
    ),
    (
        "상품 등록 제한",
        "등록이 제한되는 상품은 다음과 같습니다.\n- 유통기한이 지난 농산물\n- 가공식품, 반찬류, 탕류 등\n- 씨앗, 묘목, 농약, 비료\n- 고기, 생선, 계란, 유제품\n- 그 외 농산물에 해당하지 않는 기타 상품",
    ),
    (
        "판매자 구매",
        "판매자로 가입하신 경우, 상품 구매를 원하시면 구매자로 따로 가입하셔야 합니다.",
    ),
    (
        "상품 등록 유의사항",
        "상품명은 중복 없이 명확하게 작성해 주세요.\n상품 이미지는 1장 이상 등록해야 하며, 실제 상품과 동일해야 합니다.\n상품 단위, 규격, 수량, 가격을 정확히 입력해 주세요.\n유통기한이 지난 상품이나 플랫폼에서 금지한 품목은 등록할 수 없습니다.\n욕설, 비방, 광고성 문구, 외부 링크는 작성할 수 없습니다.\n개인정보(연락처, 계좌번호 등)를 상품 설명에 포함하지 마세요.\n도배, 중복 등록된 상품은 관리자에 의해 삭제될 수 있습니다.\n타인의 이미지나 글을 무단으로 사용하는 경우 제재를 받을 수 있습니다.\n등록된 상품 정보가 사실과 다를 경우, 거래 제한 및 판매 중지 조치가 있을 수 있습니다.\n예약상품의 경우 예약금의 비율은 기본 50%입니다.",
    ),
];

const FAQ_FALLBACK: &str = "죄송합니다. 해당 질문은 등록되어 있지 않습니다.";

pub fn handle(utterance: &str) -> String {
    FAQ_ENTRIES
        .iter()
        .find(|(keyword, _)| utterance.contains(keyword))
        .map(|(_, answer)| (*answer).to_string())
        .unwrap_or_else(|| FAQ_FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::handle;

    #[test]
    fn keyword_match_returns_registered_answer() {
        assert_eq!(handle("반품은 어떻게 하나요?"), "제품 수령 후 7일 이내 반품 가능합니다.");
        assert_eq!(handle("배송 기간이 궁금해요"), "배송은 2~3일 소요됩니다.");
    }

    #[test]
    fn longer_keywords_still_match_inside_sentences() {
        assert!(handle("판매자 구매도 가능한가요?").contains("구매자로 따로 가입"));
        assert!(handle("가입 승인은 언제 되나요").contains("영업일 기준 1~2일"));
    }

    #[test]
    fn unknown_question_gets_fallback() {
        assert_eq!(handle("주차장 있나요"), "죄송합니다. 해당 질문은 등록되어 있지 않습니다.");
    }
}
