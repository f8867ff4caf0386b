use chrono::{TimeZone, Utc};
use healthkey_core::{EmergencyContact, EmergencyProfile, Medication};
use healthkey_emergency::{decode, encode_at, DecodeError};
use proptest::prelude::*;

fn list_item() -> impl Strategy<Value = String> {
    "[ ]{0,2}[A-Za-z0-9][A-Za-z0-9 ()/-]{0,20}"
}

fn profile_strategy() -> impl Strategy<Value = EmergencyProfile> {
    (
        "[A-Za-z .'-]{0,30}",
        proptest::option::of("(A|B|AB|O)[+-]"),
        proptest::collection::vec(list_item(), 0..5),
        proptest::collection::vec(list_item(), 0..5),
        proptest::collection::vec(list_item(), 0..5),
        proptest::option::of(("[A-Za-z ]{1,20}", "[+]?[0-9 ()-]{3,16}", "[A-Za-z]{0,10}")),
        proptest::option::of(".{0,60}"),
    )
        .prop_map(
            |(name, blood_type, allergies, conditions, medications, contact, notes)| {
                EmergencyProfile {
                    name,
                    date_of_birth: None,
                    blood_type,
                    allergies,
                    conditions,
                    medications: medications
                        .into_iter()
                        .map(|name| Medication {
                            name,
                            ..Medication::default()
                        })
                        .collect(),
                    emergency_contact: contact.map(|(name, phone, relationship)| {
                        EmergencyContact {
                            name,
                            phone,
                            relationship,
                        }
                    }),
                    notes,
                }
            },
        )
}

fn trimmed(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

proptest! {
    #[test]
    fn decode_recovers_encoded_profile(profile in profile_strategy()) {
        let generated_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let payload = decode(&encode_at(&profile, generated_at)).unwrap();

        let medication_names: Vec<String> =
            profile.medications.iter().map(|med| med.name.clone()).collect();
        prop_assert_eq!(payload.allergy_list(), trimmed(&profile.allergies));
        prop_assert_eq!(payload.condition_list(), trimmed(&profile.conditions));
        prop_assert_eq!(payload.medication_list(), trimmed(&medication_names));

        let contact = profile.emergency_contact.clone().unwrap_or_default();
        let blood_type = profile.blood_type.clone().unwrap_or_default();
        let notes = profile.notes.clone().unwrap_or_default();
        prop_assert_eq!(&payload.name, &profile.name);
        prop_assert_eq!(&payload.blood_type, &blood_type);
        prop_assert_eq!(&payload.emergency_contact_name, &contact.name);
        prop_assert_eq!(&payload.emergency_contact_phone, &contact.phone);
        prop_assert_eq!(&payload.emergency_contact_relationship, &contact.relationship);
        prop_assert_eq!(&payload.notes, &notes);
        prop_assert_eq!(payload.generated_at, generated_at);
    }

    #[test]
    fn arbitrary_text_never_panics(input in ".{0,200}") {
        match decode(&input) {
            Ok(_) => {}
            Err(DecodeError::Missing | DecodeError::Encoding | DecodeError::Structure(_)) => {}
        }
    }
}
