//! Emergency payload codec for the digital health key.
//!
//! The token is a base64url rendering of a short-keyed JSON record. It is
//! readable and forgeable by anyone holding the link, so it only ever carries
//! the emergency subset of a profile and never credentials.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use healthkey_core::{EmergencyPayload, EmergencyProfile};
use serde::{Deserialize, Serialize};
use serde_json::json;

mod link;
mod view;

pub use link::{
    decode_link, emergency_link, share_card, token_from_link, LinkError, QrImageService,
    QrServerImage, SharedCard, TOKEN_PARAM,
};
pub use view::{CardSection, ContactLink, EmergencyCard, EmergencyView, PrimaryInfo, SectionKind};

/// Tokens longer than this are rejected before any decoding work.
pub const MAX_TOKEN_LEN: usize = 16 * 1024;

/// Encode the emergency subset of `profile`, stamped with the current time.
pub fn encode(profile: &EmergencyProfile) -> String {
    encode_at(profile, Utc::now())
}

/// Encode with an explicit generation timestamp.
pub fn encode_at(profile: &EmergencyProfile, generated_at: DateTime<Utc>) -> String {
    encode_payload(&EmergencyPayload::from_profile(profile, generated_at))
}

/// Serialize an already-built payload into a URL-safe token.
pub fn encode_payload(payload: &EmergencyPayload) -> String {
    let wire = json!({
        "n": payload.name,
        "d": payload.dob,
        "b": payload.blood_type,
        "a": payload.allergies,
        "c": payload.conditions,
        "m": payload.medications,
        "cn": payload.emergency_contact_name,
        "cp": payload.emergency_contact_phone,
        "cr": payload.emergency_contact_relationship,
        "no": payload.notes,
        "t": payload.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    URL_SAFE_NO_PAD.encode(wire.to_string())
}

/// Decode a token back into the payload.
///
/// Every failure renders the same way for the viewer; the variant only records
/// why for logs.
pub fn decode(token: &str) -> Result<EmergencyPayload, DecodeError> {
    let result = detect_token(token).and_then(|detected| {
        tracing::debug!(
            token_format = ?detected.format,
            bytes = detected.bytes.len(),
            "emergency token detected"
        );
        parse_payload(&detected.bytes)
    });

    if let Err(err) = &result {
        tracing::debug!(reason = %err.reason(), "rejected emergency token");
    }
    result
}

/// Textual encodings accepted on decode, tried in [`TokenFormat::ATTEMPTS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
    /// Current format, as produced by [`encode_payload`].
    Base64UrlNoPad,
    Base64Url,
    /// Tokens minted by older builds with the standard alphabet.
    Base64Standard,
    Base64StandardNoPad,
}

impl TokenFormat {
    pub const ATTEMPTS: [TokenFormat; 4] = [
        TokenFormat::Base64UrlNoPad,
        TokenFormat::Base64Url,
        TokenFormat::Base64Standard,
        TokenFormat::Base64StandardNoPad,
    ];

    fn decode(self, token: &str) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            Self::Base64UrlNoPad => URL_SAFE_NO_PAD.decode(token),
            Self::Base64Url => URL_SAFE.decode(token),
            Self::Base64Standard => STANDARD.decode(token),
            Self::Base64StandardNoPad => STANDARD_NO_PAD.decode(token),
        }
    }
}

/// Raw bytes of a token together with the format that accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedToken {
    pub format: TokenFormat,
    pub bytes: Vec<u8>,
}

/// Run the ordered format attempts; the first that decodes wins.
pub fn detect_token(token: &str) -> Result<DetectedToken, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Missing);
    }
    if token.len() > MAX_TOKEN_LEN {
        return Err(DecodeError::Encoding);
    }
    // Form decoding of an unescaped query turns the standard alphabet's `+` into a space.
    let token = token.replace(' ', "+");

    TokenFormat::ATTEMPTS
        .iter()
        .find_map(|format| {
            format
                .decode(&token)
                .ok()
                .map(|bytes| DetectedToken {
                    format: *format,
                    bytes,
                })
        })
        .ok_or(DecodeError::Encoding)
}

#[derive(Deserialize)]
struct WirePayload {
    #[serde(rename = "n", alias = "name", default)]
    name: String,
    #[serde(rename = "d", alias = "dob", default)]
    dob: String,
    #[serde(rename = "b", alias = "bloodType", default)]
    blood_type: String,
    #[serde(rename = "a", alias = "allergies", default)]
    allergies: String,
    #[serde(rename = "c", alias = "conditions", default)]
    conditions: String,
    #[serde(rename = "m", alias = "medications", default)]
    medications: String,
    #[serde(rename = "cn", alias = "emergencyContactName", default)]
    emergency_contact_name: String,
    #[serde(rename = "cp", alias = "emergencyContactPhone", default)]
    emergency_contact_phone: String,
    #[serde(rename = "cr", alias = "emergencyContactRelationship", default)]
    emergency_contact_relationship: String,
    #[serde(rename = "no", alias = "notes", default)]
    notes: String,
    #[serde(rename = "t", alias = "generatedAt")]
    generated_at: String,
}

fn parse_payload(bytes: &[u8]) -> Result<EmergencyPayload, DecodeError> {
    let text =
        std::str::from_utf8(bytes).map_err(|err| DecodeError::Structure(err.to_string()))?;
    let wire: WirePayload =
        serde_json::from_str(text).map_err(|err| DecodeError::Structure(err.to_string()))?;

    let generated_at = DateTime::parse_from_rfc3339(&wire.generated_at)
        .map_err(|err| DecodeError::Structure(format!("generatedAt: {err}")))?
        .with_timezone(&Utc);

    Ok(EmergencyPayload {
        name: wire.name,
        dob: wire.dob,
        blood_type: wire.blood_type,
        allergies: wire.allergies,
        conditions: wire.conditions,
        medications: wire.medications,
        emergency_contact_name: wire.emergency_contact_name,
        emergency_contact_phone: wire.emergency_contact_phone,
        emergency_contact_relationship: wire.emergency_contact_relationship,
        notes: wire.notes,
        generated_at,
    })
}

/// Why a token was rejected. All variants display the same viewer message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid or expired emergency card")]
    Missing,
    #[error("invalid or expired emergency card")]
    Encoding,
    #[error("invalid or expired emergency card")]
    Structure(String),
}

impl DecodeError {
    pub fn reason(&self) -> String {
        match self {
            Self::Missing => "token missing".to_string(),
            Self::Encoding => "token is not base64 text".to_string(),
            Self::Structure(detail) => format!("token structure invalid: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use healthkey_core::{EmergencyContact, Medication};
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_profile() -> EmergencyProfile {
        EmergencyProfile {
            name: "Lan Tran".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 3, 9),
            blood_type: Some("O-".to_string()),
            allergies: vec!["Penicillin".to_string(), "Latex".to_string()],
            conditions: vec!["Type 2 diabetes".to_string()],
            medications: vec![Medication {
                name: "Metformin".to_string(),
                dosage: Some("500 mg".to_string()),
                frequency: Some("twice daily".to_string()),
            }],
            emergency_contact: Some(EmergencyContact {
                name: "Minh Tran".to_string(),
                phone: "+1 (555) 010-2030".to_string(),
                relationship: "Spouse".to_string(),
            }),
            notes: Some("Carries glucose tablets".to_string()),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 30, 0).unwrap()
    }

    #[test]
    fn token_is_url_safe() {
        let token = encode_at(&sample_profile(), fixed_time());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn decode_restores_every_field() {
        let profile = sample_profile();
        let payload = decode(&encode_at(&profile, fixed_time())).unwrap();

        assert_eq!(payload.name, "Lan Tran");
        assert_eq!(payload.dob, "1984-03-09");
        assert_eq!(payload.blood_type, "O-");
        assert_eq!(payload.allergy_list(), vec!["Penicillin", "Latex"]);
        assert_eq!(payload.condition_list(), vec!["Type 2 diabetes"]);
        assert_eq!(payload.medication_list(), vec!["Metformin"]);
        assert_eq!(payload.emergency_contact_name, "Minh Tran");
        assert_eq!(payload.emergency_contact_phone, "+1 (555) 010-2030");
        assert_eq!(payload.emergency_contact_relationship, "Spouse");
        assert_eq!(payload.notes, "Carries glucose tablets");
        assert_eq!(payload.generated_at, fixed_time());
    }

    #[test]
    fn decoded_payload_exposes_semantic_keys() {
        let payload = decode(&encode_at(&sample_profile(), fixed_time())).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "allergies",
                "bloodType",
                "conditions",
                "dob",
                "emergencyContactName",
                "emergencyContactPhone",
                "emergencyContactRelationship",
                "generatedAt",
                "medications",
                "name",
                "notes",
            ]
        );
    }

    #[test]
    fn empty_profile_encodes_empty_fields() {
        let payload = decode(&encode_at(&EmergencyProfile::default(), fixed_time())).unwrap();
        assert_eq!(payload.allergies, "");
        assert_eq!(payload.emergency_contact_phone, "");
        assert!(payload.medication_list().is_empty());
    }

    #[test]
    fn invalid_inputs_share_one_outcome() {
        let not_json = URL_SAFE_NO_PAD.encode("definitely not json");
        let wrong_shape = URL_SAFE_NO_PAD.encode("[1, 2, 3]");
        let no_timestamp = URL_SAFE_NO_PAD.encode(r#"{"n":"Lan"}"#);

        let failures = [
            decode(""),
            decode("   "),
            decode("%%% not a token %%%"),
            decode(&not_json),
            decode(&wrong_shape),
            decode(&no_timestamp),
        ];

        for failure in failures {
            let err = failure.unwrap_err();
            assert_eq!(err.to_string(), "invalid or expired emergency card");
        }
    }

    #[test]
    fn failure_reasons_stay_distinguishable_for_logs() {
        assert_eq!(decode("").unwrap_err(), DecodeError::Missing);
        assert_eq!(decode("***").unwrap_err(), DecodeError::Encoding);
        assert!(matches!(
            decode(&URL_SAFE_NO_PAD.encode("nope")).unwrap_err(),
            DecodeError::Structure(_)
        ));
    }

    #[test]
    fn legacy_standard_base64_with_long_keys_decodes() {
        let legacy = json!({
            "name": "Lan Tran",
            "bloodType": "AB+",
            "allergies": "Sulfa, Shellfish",
            "emergencyContactPhone": "555-0100",
            "generatedAt": "2025-12-01T08:00:00.000Z",
        });
        let token = STANDARD.encode(legacy.to_string());

        let detected = detect_token(&token).unwrap();
        assert!(matches!(
            detected.format,
            TokenFormat::Base64Url | TokenFormat::Base64Standard | TokenFormat::Base64UrlNoPad
        ));

        let payload = decode(&token).unwrap();
        assert_eq!(payload.blood_type, "AB+");
        assert_eq!(payload.allergy_list(), vec!["Sulfa", "Shellfish"]);
        assert_eq!(payload.dob, "");
    }

    #[test]
    fn standard_token_with_plus_survives_form_decoding() {
        let legacy = json!({
            "name": "Lan Tran",
            "notes": "~~~ keep upright",
            "generatedAt": "2025-12-01T08:00:00.000Z",
        });
        let token = STANDARD.encode(legacy.to_string());
        assert!(token.contains('+'));

        let payload = decode(&token.replace('+', " ")).unwrap();
        assert_eq!(payload.notes, "~~~ keep upright");
        assert_eq!(
            detect_token(&token.replace('+', " ")).unwrap().format,
            TokenFormat::Base64Standard
        );
    }

    #[test]
    fn current_tokens_detect_as_unpadded_url_safe() {
        let token = encode_at(&sample_profile(), fixed_time());
        assert_eq!(
            detect_token(&token).unwrap().format,
            TokenFormat::Base64UrlNoPad
        );
    }

    #[test]
    fn oversized_token_is_rejected() {
        let token = "A".repeat(MAX_TOKEN_LEN + 4);
        assert_eq!(decode(&token).unwrap_err(), DecodeError::Encoding);
    }

    #[test]
    fn comma_inside_list_item_splits_on_decode() {
        let profile = EmergencyProfile {
            allergies: vec!["Penicillin, oral".to_string()],
            ..EmergencyProfile::default()
        };
        let payload = decode(&encode_at(&profile, fixed_time())).unwrap();
        assert_eq!(payload.allergy_list(), vec!["Penicillin", "oral"]);
    }
}
