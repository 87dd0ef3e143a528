use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DealInfo {
    pub stage: String,
    /// Digits and separators as written, without `$` or a trailing `k`.
    pub amount: String,
    pub close_date: String,
    pub competitors: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailInfo {
    pub contact: String,
    pub company: String,
}

// Compile-once patterns. `.` never crosses a newline, `$` is end of text.
fn re_stage() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)stage:\s*(.+?)(?:\n|$)").expect("stage regex should compile"))
}

fn re_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)amount:\s*\$?([\d,]+)k?").expect("amount regex should compile"))
}

fn re_close_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)close\s+date:\s*(.+?)(?:\n|$)").expect("close date regex should compile")
    })
}

fn re_competitors() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)competitors?:\s*(.+?)(?:\n|$)").expect("competitors regex should compile")
    })
}

fn re_contact() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)contact:\s*(.+?)(?:\(|$)").expect("contact regex should compile"))
}

fn re_email_company() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)email to\s+(.+?)\s+(?:after|M&A)").expect("company regex should compile")
    })
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn extract_deal_info(text: &str) -> DealInfo {
    let or_unknown = |re: &Regex| first_capture(re, text).unwrap_or_else(|| UNKNOWN.to_string());
    DealInfo {
        stage: or_unknown(re_stage()),
        amount: first_capture(re_amount(), text).unwrap_or_else(|| "0".to_string()),
        close_date: or_unknown(re_close_date()),
        competitors: or_unknown(re_competitors()),
    }
}

pub fn extract_email_info(text: &str) -> EmailInfo {
    EmailInfo {
        contact: first_capture(re_contact(), text).unwrap_or_else(|| "Contact".to_string()),
        company: first_capture(re_email_company(), text)
            .unwrap_or_else(|| "the prospect".to_string()),
    }
}
