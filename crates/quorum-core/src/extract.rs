//! Identifier extraction from free-text subjects, bodies, and action payloads

use quorum_model::{Network, TopicIdentifiers};
use regex::Regex;
use std::sync::OnceLock;

static CIP_RE: OnceLock<Regex> = OnceLock::new();
static CIP_WORD_RE: OnceLock<Regex> = OnceLock::new();
static NETWORK_APP_RE: OnceLock<Regex> = OnceLock::new();
static APP_RE: OnceLock<Regex> = OnceLock::new();
static VALIDATOR_RE: OnceLock<Regex> = OnceLock::new();
static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn cip_re() -> &'static Regex {
    // Separator is * not ?, so "CIP #0083" (space plus hash) still matches
    CIP_RE.get_or_init(|| Regex::new(r"(?i)cip[#\-\s]*0*(\d+)").unwrap())
}

fn network_app_re() -> &'static Regex {
    NETWORK_APP_RE.get_or_init(|| Regex::new(r"(?i)(mainnet|testnet):\s*(\S+)").unwrap())
}

/// Extract a CIP number, normalized to 4-digit zero-padded form
/// ("CIP 83" -> "0083")
pub fn cip_number(text: &str) -> Option<String> {
    cip_re()
        .captures(text)
        .map(|caps| format!("{:0>4}", &caps[1]))
}

/// Extract an app name from free text: `mainnet: Foo`, `testnet: Foo`,
/// or `app: Foo`
pub fn app_name_from_text(text: &str) -> Option<String> {
    if let Some(caps) = network_app_re().captures(text) {
        return Some(caps[2].to_string());
    }
    let app_re = APP_RE.get_or_init(|| Regex::new(r"(?i)app:\s*(\S+)").unwrap());
    app_re.captures(text).map(|caps| caps[1].to_string())
}

/// Extract an app name from a structured action payload, checking the
/// provider-ish fields the vote templates use
pub fn app_name_from_value(value: &serde_json::Value) -> Option<String> {
    const FIELDS: &[&str] = &[
        "provider",
        "featuredAppProvider",
        "featuredApp",
        "beneficiary",
        "name",
    ];
    for field in FIELDS {
        if let Some(name) = value.get(field).and_then(|v| v.as_str()) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Extract a validator name from free text: `validator: Foo`
pub fn validator_name_from_text(text: &str) -> Option<String> {
    let validator_re =
        VALIDATOR_RE.get_or_init(|| Regex::new(r"(?i)validator:\s*(\S+)").unwrap());
    validator_re.captures(text).map(|caps| caps[1].to_string())
}

/// Extract a validator name from a structured action payload
pub fn validator_name_from_value(value: &serde_json::Value) -> Option<String> {
    const FIELDS: &[&str] = &["validator", "name"];
    for field in FIELDS {
        if let Some(name) = value.get(field).and_then(|v| v.as_str()) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Network variant mentioned as a `mainnet:`/`testnet:` prefix
pub fn network_hint(text: &str) -> Option<Network> {
    network_app_re().captures(text).map(|caps| {
        if caps[1].eq_ignore_ascii_case("mainnet") {
            Network::Mainnet
        } else {
            Network::Testnet
        }
    })
}

/// First `major.minor` version token in the text
pub fn version_token(text: &str) -> Option<String> {
    let version_re = VERSION_RE.get_or_init(|| Regex::new(r"(\d+\.\d+)").unwrap());
    version_re.captures(text).map(|caps| caps[1].to_string())
}

/// Extract all candidate identifiers from a topic's subject and body.
/// No match for a field leaves it `None`; this never fails.
pub fn extract_identifiers(subject: &str, body: &str) -> TopicIdentifiers {
    let combined = format!("{} {}", subject, body);
    let cip = cip_number(&combined);

    let cip_word_re = CIP_WORD_RE.get_or_init(|| Regex::new(r"(?i)\bcip\b").unwrap());
    let is_cip_discussion = cip.is_some() || cip_word_re.is_match(&combined);

    TopicIdentifiers {
        cip_number: cip,
        app_name: app_name_from_text(&combined),
        validator_name: validator_name_from_text(&combined),
        keywords: keywords(&combined),
        is_cip_discussion,
    }
}

/// Lower-cased search tokens; not format-critical, used only for search
fn keywords(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        if token.len() < 4 || token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let lowered = token.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
        }
    }
    seen
}
