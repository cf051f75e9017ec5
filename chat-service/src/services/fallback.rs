//! Canned replies used when Gemini is not configured or fails.
//!
//! Rules are checked in order against the lower-cased message and the first
//! match wins. Keyword groups overlap (a booking question can mention a price),
//! so the order is part of the behaviour.

/// Hours of operation.
pub const HOURS_REPLY: &str = "Bệnh viện mở cửa 24/7. Để biết chi tiết phòng khám theo chuyên khoa, vui lòng gọi hotline 0868 686 868.";

/// How to book an appointment.
pub const BOOKING_REPLY: &str =
    "Bạn có thể đặt lịch qua website hoặc gọi hotline 0868 686 868 để được hỗ trợ nhanh.";

/// Prices are quoted over the phone.
pub const PRICING_REPLY: &str =
    "Chi phí tùy thuộc dịch vụ và gói khám. Vui lòng gọi hotline để nhận báo giá chi tiết.";

/// Zalo chat contact.
pub const ZALO_REPLY: &str = "Bạn có thể mở Zalo tới số 0868686868 hoặc nhấn vào liên kết Zalo trên trang để chat trực tiếp.";

/// Anything else.
pub const DEFAULT_REPLY: &str = "Xin lỗi, tôi chưa hiểu câu hỏi. Bạn có thể gọi hotline 0868 686 868 để được hỗ trợ nhanh hơn.";

/// A keyword predicate over the lower-cased message and the reply it selects.
pub struct FallbackRule {
    pub name: &'static str,
    matches: fn(&str) -> bool,
    pub reply: &'static str,
}

impl FallbackRule {
    pub fn matches(&self, lowered: &str) -> bool {
        (self.matches)(lowered)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

// "mở cửa" and "giờ làm" are implied by "mở" and "giờ", but the list is kept
// as deployed.
fn asks_hours(m: &str) -> bool {
    m.contains("giờ") && contains_any(m, &["làm", "mở", "mở cửa", "giờ làm"])
}

fn asks_booking(m: &str) -> bool {
    contains_any(m, &["đặt lịch", "đặt", "lịch"])
}

fn asks_price(m: &str) -> bool {
    contains_any(m, &["giá", "chi phí"])
}

fn asks_zalo(m: &str) -> bool {
    m.contains("zalo")
}

/// Rules in priority order.
pub const RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "hours",
        matches: asks_hours,
        reply: HOURS_REPLY,
    },
    FallbackRule {
        name: "booking",
        matches: asks_booking,
        reply: BOOKING_REPLY,
    },
    FallbackRule {
        name: "pricing",
        matches: asks_price,
        reply: PRICING_REPLY,
    },
    FallbackRule {
        name: "zalo",
        matches: asks_zalo,
        reply: ZALO_REPLY,
    },
];

/// Pick the canned reply for `message`. Total and case-insensitive.
pub fn classify(message: &str) -> &'static str {
    let lowered = message.to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.reply)
        .unwrap_or(DEFAULT_REPLY)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REPLIES: [&str; 5] = [
        HOURS_REPLY,
        BOOKING_REPLY,
        PRICING_REPLY,
        ZALO_REPLY,
        DEFAULT_REPLY,
    ];

    #[test]
    fn hours_question() {
        assert_eq!(classify("Bệnh viện mở cửa mấy giờ?"), HOURS_REPLY);
        assert_eq!(classify("Giờ làm việc của phòng khám?"), HOURS_REPLY);
    }

    #[test]
    fn hour_word_alone_is_not_an_hours_question() {
        assert_eq!(classify("Bây giờ tôi bị sốt"), DEFAULT_REPLY);
    }

    #[test]
    fn booking_question() {
        assert_eq!(classify("Tôi muốn đặt lịch khám"), BOOKING_REPLY);
        assert_eq!(classify("Lịch khám bác sĩ tuần này"), BOOKING_REPLY);
    }

    #[test]
    fn pricing_question() {
        assert_eq!(classify("Chi phí khám tổng quát?"), PRICING_REPLY);
        assert_eq!(classify("Giá xét nghiệm máu"), PRICING_REPLY);
    }

    #[test]
    fn zalo_question_is_case_insensitive() {
        assert_eq!(classify("Có ZALO không?"), ZALO_REPLY);
    }

    #[test]
    fn unknown_question_gets_default() {
        assert_eq!(classify("Xin chào"), DEFAULT_REPLY);
        assert_eq!(classify(""), DEFAULT_REPLY);
    }

    #[test]
    fn hours_rule_beats_booking_rule() {
        assert_eq!(classify("Giờ làm việc để đặt lịch?"), HOURS_REPLY);
    }

    #[test]
    fn booking_rule_beats_pricing_rule() {
        assert_eq!(classify("Giá đặt lịch khám"), BOOKING_REPLY);
    }

    #[test]
    fn pricing_rule_beats_zalo_rule() {
        assert_eq!(classify("Hỏi giá qua zalo"), PRICING_REPLY);
    }

    #[test]
    fn output_is_always_one_of_the_fixed_replies() {
        let inputs = [
            "giờ mở cửa",
            "ĐẶT LỊCH",
            "chi phí",
            "zalo",
            "hello",
            "   ",
            "🙂",
            "giờ",
        ];
        for input in inputs {
            let reply = classify(input);
            assert!(ALL_REPLIES.contains(&reply), "unexpected reply for {input:?}");
            assert_eq!(reply, classify(input));
        }
    }

    #[test]
    fn every_reply_points_at_the_hotline_or_zalo_number() {
        for reply in ALL_REPLIES {
            assert!(reply.contains("hotline") || reply.contains("0868686868"));
        }
    }

    #[test]
    fn rules_are_in_priority_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["hours", "booking", "pricing", "zalo"]);
    }
}
