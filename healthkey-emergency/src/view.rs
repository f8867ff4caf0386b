//! View model for the unauthenticated emergency card page.

use chrono::{DateTime, Utc};
use healthkey_core::EmergencyPayload;
use serde::Serialize;

use crate::decode;

/// What the viewer renders: a full card or the generic invalid state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EmergencyView {
    Card(EmergencyCard),
    Invalid { message: String },
}

impl EmergencyView {
    pub fn from_token(token: &str) -> Self {
        match decode(token) {
            Ok(payload) => Self::Card(EmergencyCard::from_payload(&payload)),
            Err(err) => Self::Invalid {
                message: err.to_string(),
            },
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

/// Decoded card. `primary` is rendered above `secondary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyCard {
    pub primary: PrimaryInfo,
    pub secondary: Vec<CardSection>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryInfo {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub contact: Option<ContactLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactLink {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
    /// `tel:` link for one-tap dialing.
    pub dial_href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Conditions,
    Medications,
    Notes,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Conditions => "Medical conditions",
            Self::Medications => "Current medications",
            Self::Notes => "Notes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSection {
    pub kind: SectionKind,
    pub title: String,
    pub items: Vec<String>,
}

impl EmergencyCard {
    pub fn from_payload(payload: &EmergencyPayload) -> Self {
        let contact = ContactLink {
            name: non_empty(&payload.emergency_contact_name),
            phone: non_empty(&payload.emergency_contact_phone),
            relationship: non_empty(&payload.emergency_contact_relationship),
            dial_href: dial_href(&payload.emergency_contact_phone),
        };
        let has_contact = contact.name.is_some() || contact.phone.is_some();

        let primary = PrimaryInfo {
            name: non_empty(&payload.name),
            date_of_birth: non_empty(&payload.dob),
            blood_type: non_empty(&payload.blood_type),
            allergies: payload.allergy_list(),
            contact: has_contact.then_some(contact),
        };

        let notes: Vec<String> = non_empty(&payload.notes).into_iter().collect();
        let secondary = [
            (SectionKind::Conditions, payload.condition_list()),
            (SectionKind::Medications, payload.medication_list()),
            (SectionKind::Notes, notes),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(kind, items)| CardSection {
            kind,
            title: kind.title().to_string(),
            items,
        })
        .collect();

        Self {
            primary,
            secondary,
            generated_at: payload.generated_at,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&CardSection> {
        self.secondary.iter().find(|section| section.kind == kind)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `tel:` href keeping digits and a leading `+`.
fn dial_href(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let prefix = if trimmed.starts_with('+') { "+" } else { "" };
    Some(format!("tel:{prefix}{digits}"))
}
