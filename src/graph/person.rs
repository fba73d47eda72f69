//! Person records for the family graph
//!
//! A person carries identity fields in a primary and an alternate script
//! (e.g. Latin and Arabic), life years, and display metadata. Privacy is a
//! per-person flag resolved at read time by the API layer.

use super::now_millis;
use super::types::{Gender, PersonId};
use serde::{Deserialize, Deserializer, Serialize};

/// A person node in the family graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier within the owning space
    pub id: PersonId,

    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,

    /// Name fields in the alternate script
    #[serde(default)]
    pub first_name_alt: Option<String>,
    #[serde(default)]
    pub middle_name_alt: Option<String>,
    #[serde(default)]
    pub last_name_alt: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,

    /// Hide detail fields from non-members
    #[serde(default)]
    pub is_private: bool,
    /// Hide the birth year from non-members even when the person is public
    #[serde(default)]
    pub hide_birth_year: bool,

    /// Free-form tag list
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

/// Fields accepted when creating a person
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonInput {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub first_name_alt: Option<String>,
    #[serde(default)]
    pub middle_name_alt: Option<String>,
    #[serde(default)]
    pub last_name_alt: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub hide_birth_year: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Distinguish an absent patch field (no change) from an explicit `null`
/// (clear the stored value); plain `Option<Option<T>>` folds both into the
/// outer `None`.
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update for a person
///
/// Outer `None` leaves a field untouched; for clearable fields the inner
/// `None` (JSON `null`) clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonPatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub middle_name: Option<Option<String>>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub first_name_alt: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub middle_name_alt: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub last_name_alt: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub nickname: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub gender: Option<Option<Gender>>,
    #[serde(default, deserialize_with = "clearable")]
    pub birth_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "clearable")]
    pub death_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "clearable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub photo_url: Option<Option<String>>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub hide_birth_year: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Person {
    /// Create a new person from input fields
    pub fn new(id: PersonId, input: PersonInput) -> Self {
        let now = now_millis();
        Person {
            id,
            first_name: input.first_name,
            middle_name: input.middle_name,
            last_name: input.last_name,
            first_name_alt: input.first_name_alt,
            middle_name_alt: input.middle_name_alt,
            last_name_alt: input.last_name_alt,
            nickname: input.nickname,
            gender: input.gender,
            birth_year: input.birth_year,
            death_year: input.death_year,
            bio: input.bio,
            photo_url: input.photo_url,
            is_private: input.is_private,
            hide_birth_year: input.hide_birth_year,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full display name in the primary script
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.as_str()];
        if let Some(middle) = &self.middle_name {
            if !middle.is_empty() {
                parts.push(middle);
            }
        }
        parts.push(&self.last_name);
        parts.join(" ")
    }

    /// Full display name in the alternate script, if any part is set
    pub fn alt_name(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.first_name_alt.as_deref(),
            self.middle_name_alt.as_deref(),
            self.last_name_alt.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Whether a death year is recorded
    pub fn is_deceased(&self) -> bool {
        self.death_year.is_some()
    }

    /// Apply a partial update, bumping the modification timestamp
    pub fn apply(&mut self, patch: PersonPatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.middle_name {
            self.middle_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if let Some(v) = patch.first_name_alt {
            self.first_name_alt = v;
        }
        if let Some(v) = patch.middle_name_alt {
            self.middle_name_alt = v;
        }
        if let Some(v) = patch.last_name_alt {
            self.last_name_alt = v;
        }
        if let Some(v) = patch.nickname {
            self.nickname = v;
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = patch.birth_year {
            self.birth_year = v;
        }
        if let Some(v) = patch.death_year {
            self.death_year = v;
        }
        if let Some(v) = patch.bio {
            self.bio = v;
        }
        if let Some(v) = patch.photo_url {
            self.photo_url = v;
        }
        if let Some(v) = patch.is_private {
            self.is_private = v;
        }
        if let Some(v) = patch.hide_birth_year {
            self.hide_birth_year = v;
        }
        if let Some(v) = patch.tags {
            self.tags = v;
        }
        self.updated_at = now_millis();
    }

    /// Copy of this person with detail fields stripped for non-member reads
    ///
    /// Names stay visible so the tree keeps its shape; `is_private` drops
    /// bio, photo, tags and life years, and `hide_birth_year` drops the
    /// birth year on its own.
    pub fn redacted(&self) -> Person {
        let mut person = self.clone();
        if person.hide_birth_year {
            person.birth_year = None;
        }
        if person.is_private {
            person.bio = None;
            person.photo_url = None;
            person.tags = Vec::new();
            person.birth_year = None;
            person.death_year = None;
        }
        person
    }

    /// Case-insensitive match against name fields and nickname
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let fields = [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
            self.first_name_alt.as_deref(),
            self.middle_name_alt.as_deref(),
            self.last_name_alt.as_deref(),
            self.nickname.as_deref(),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|f| f.to_lowercase().contains(&needle))
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Person {}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, last: &str) -> PersonInput {
        PersonInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_name() {
        let mut person = Person::new(PersonId::new(1), input("Ahmad", "Aoudi"));
        assert_eq!(person.full_name(), "Ahmad Aoudi");

        person.middle_name = Some("Ali".to_string());
        assert_eq!(person.full_name(), "Ahmad Ali Aoudi");
    }

    #[test]
    fn test_alt_name() {
        let mut person = Person::new(PersonId::new(1), input("Ahmad", "Aoudi"));
        assert_eq!(person.alt_name(), None);

        person.first_name_alt = Some("أحمد".to_string());
        person.last_name_alt = Some("العودي".to_string());
        assert_eq!(person.alt_name(), Some("أحمد العودي".to_string()));
    }

    #[test]
    fn test_apply_patch() {
        let mut person = Person::new(PersonId::new(1), input("Sara", "Aoudi"));
        person.birth_year = Some(1990);

        let patch = PersonPatch {
            nickname: Some(Some("Sue".to_string())),
            birth_year: Some(None),
            ..Default::default()
        };
        person.apply(patch);

        assert_eq!(person.nickname.as_deref(), Some("Sue"));
        assert_eq!(person.birth_year, None);
        // Untouched field survives
        assert_eq!(person.first_name, "Sara");
    }

    #[test]
    fn test_patch_null_clears_absent_keeps() {
        let patch: PersonPatch =
            serde_json::from_str(r#"{"birth_year": null, "nickname": "Sue"}"#).unwrap();
        assert_eq!(patch.birth_year, Some(None));
        assert_eq!(patch.nickname, Some(Some("Sue".to_string())));
        assert_eq!(patch.death_year, None);
    }

    #[test]
    fn test_redaction() {
        let mut person = Person::new(PersonId::new(1), input("Nour", "Aoudi"));
        person.birth_year = Some(1964);
        person.bio = Some("Matriarch".to_string());
        person.is_private = true;

        let public = person.redacted();
        assert_eq!(public.first_name, "Nour");
        assert_eq!(public.bio, None);
        assert_eq!(public.birth_year, None);

        // hide_birth_year alone only drops the year
        person.is_private = false;
        person.hide_birth_year = true;
        let public = person.redacted();
        assert_eq!(public.bio.as_deref(), Some("Matriarch"));
        assert_eq!(public.birth_year, None);
    }

    #[test]
    fn test_matches() {
        let mut person = Person::new(PersonId::new(1), input("Wael", "Aoudi"));
        person.nickname = Some("Abu Fares".to_string());

        assert!(person.matches("wael"));
        assert!(person.matches("AOUDI"));
        assert!(person.matches("fares"));
        assert!(!person.matches("zeina"));
    }
}
