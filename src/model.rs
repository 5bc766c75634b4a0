//! Roster and catalog records as exchanged with the admin API.
//!
//! Field names follow the remote JSON contract (`_id`, camelCase), so the
//! same types are used for decoding responses and encoding request bodies.

use serde::{Deserialize, Deserializer, Serialize};

/// Fixed number of users requested per roster page.
pub const PAGE_SIZE: u32 = 30;

/// Validity applied to a new enrollment when the operator does not pick one.
pub const DEFAULT_VALIDITY_MONTHS: u32 = 12;

/// Inclusive bounds accepted for an enrollment's validity.
pub const VALIDITY_MONTHS_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

/// Gender choices offered by the create-user form; the empty string means "not set".
pub const GENDER_CHOICES: [&str; 4] = ["", "Male", "Female", "Other"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Exam category a user is preparing for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "CAT")]
    Cat,
    #[serde(rename = "XAT")]
    Xat,
    #[serde(rename = "SNAP")]
    Snap,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Cat, Category::Xat, Category::Snap, Category::Other];

    pub fn label(self) -> &'static str {
        match self {
            Category::Cat => "CAT",
            Category::Xat => "XAT",
            Category::Snap => "SNAP",
            Category::Other => "Other",
        }
    }

    /// Decode a category label; anything unrecognised is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "CAT" => Category::Cat,
            "XAT" => Category::Xat,
            "SNAP" => Category::Snap,
            _ => Category::Other,
        }
    }

    /// Next category in form order, wrapping around.
    pub fn cycle(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Gate on an enrollment record. Only `unlocked` counts as an active enrollment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnrollmentStatus {
    Unlocked,
    Other(String),
}

impl From<String> for EnrollmentStatus {
    fn from(s: String) -> Self {
        if s == "unlocked" { Self::Unlocked } else { Self::Other(s) }
    }
}

impl From<EnrollmentStatus> for String {
    fn from(s: EnrollmentStatus) -> Self {
        match s {
            EnrollmentStatus::Unlocked => "unlocked".to_string(),
            EnrollmentStatus::Other(s) => s,
        }
    }
}

impl Default for EnrollmentStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// Course reference inside an enrollment record: either a bare id or the
/// course object populated by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseRef {
    Resolved(Course),
    Id(String),
}

impl CourseRef {
    pub fn id(&self) -> &str {
        match self {
            CourseRef::Resolved(c) => &c.id,
            CourseRef::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CourseRef::Resolved(c) => Some(&c.name),
            CourseRef::Id(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    #[serde(default)]
    pub course_id: Option<CourseRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: EnrollmentStatus,
}

impl EnrollmentRecord {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Unlocked && self.course_id.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "blank_category_as_none")]
    pub selected_category: Option<Category>,
    #[serde(default)]
    pub selected_exam: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enrolled_courses: Vec<EnrollmentRecord>,
}

impl User {
    /// Course references of every `unlocked` enrollment, in record order.
    pub fn active_enrollments(&self) -> impl Iterator<Item = &CourseRef> {
        self.enrolled_courses
            .iter()
            .filter(|e| e.is_active())
            .filter_map(|e| e.course_id.as_ref())
    }

    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or("—")
    }
}

/// Decode `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_category_as_none<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(raw.as_deref()).map(Category::from_label))
}

/// Treat empty strings coming from the backend the same as missing ones.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// One page of the roster as returned by the list endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total_pages: u32,
}

/// Unsaved create-user form state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserDraft {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: String,
    pub city: String,
    pub selected_category: Category,
    pub selected_exam: String,
}

impl NewUserDraft {
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn cycle_gender(&mut self) {
        let idx = GENDER_CHOICES.iter().position(|g| *g == self.gender).unwrap_or(0);
        self.gender = GENDER_CHOICES[(idx + 1) % GENDER_CHOICES.len()].to_string();
    }
}

/// Unsaved enroll form state, bound to one selected user while the modal is open.
#[derive(Clone, Debug, PartialEq)]
pub struct EnrollDraft {
    pub course_id: Option<String>,
    pub validity_input: String,
}

impl Default for EnrollDraft {
    fn default() -> Self {
        Self {
            course_id: None,
            validity_input: DEFAULT_VALIDITY_MONTHS.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub user_id: String,
    pub course_id: String,
    pub validity_months: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_decodes_mixed_course_refs() {
        let raw = json!({
            "_id": "u1",
            "name": "Raj",
            "phoneNumber": "9999999999",
            "selectedCategory": "XAT",
            "enrolledCourses": [
                {
                    "courseId": { "_id": "c1", "name": "Quant", "price": 4999 },
                    "status": "unlocked"
                },
                { "courseId": "c2", "status": "unlocked" },
                { "courseId": "c3", "status": "locked" },
                { "courseId": null, "status": "unlocked" }
            ]
        });
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.selected_category, Some(Category::Xat));
        let active: Vec<&str> = user.active_enrollments().map(|c| c.id()).collect();
        assert_eq!(active, vec!["c1", "c2"]);
        let first = user.enrolled_courses[0].course_id.as_ref();
        assert_eq!(first.and_then(|c| c.name()), Some("Quant"));
        assert_eq!(user.enrolled_courses[2].status, EnrollmentStatus::Other("locked".into()));
    }

    #[test]
    fn unknown_category_decodes_as_other() {
        let raw = json!({ "_id": "u", "selectedCategory": "GMAT" });
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.selected_category, Some(Category::Other));
        assert_eq!(user.display_name(), "—");
    }

    #[test]
    fn blank_category_decodes_as_none() {
        for raw in [json!(""), json!("  "), json!(null)] {
            let user: User = serde_json::from_value(json!({ "_id": "u", "selectedCategory": raw }))
                .unwrap();
            assert_eq!(user.selected_category, None);
        }
    }

    #[test]
    fn nulls_decode_as_defaults() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "A",
            "enrolledCourses": null
        }))
        .unwrap();
        assert!(user.enrolled_courses.is_empty());
        assert_eq!(user.active_enrollments().count(), 0);

        let user: User = serde_json::from_value(json!({
            "_id": "u2",
            "enrolledCourses": [
                { "courseId": { "_id": "c1", "name": null }, "status": "unlocked" },
                { "courseId": "c2", "status": null }
            ]
        }))
        .unwrap();
        let active: Vec<&str> = user.active_enrollments().map(|c| c.id()).collect();
        assert_eq!(active, vec!["c1"]);
        assert_eq!(user.enrolled_courses[0].course_id.as_ref().and_then(|c| c.name()), Some(""));

        let course: Course = serde_json::from_value(json!({ "_id": "c3", "name": null })).unwrap();
        assert_eq!(course.name, "");
    }

    #[test]
    fn new_user_draft_uses_wire_names() {
        let draft = NewUserDraft {
            name: "A".into(),
            phone_number: "9999999999".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(v["phoneNumber"], "9999999999");
        assert_eq!(v["selectedCategory"], "CAT");
        assert_eq!(v["selectedExam"], "");
    }

    #[test]
    fn gender_and_category_cycle_wrap() {
        let mut d = NewUserDraft::default();
        for expected in ["Male", "Female", "Other", ""] {
            d.cycle_gender();
            assert_eq!(d.gender, expected);
        }
        assert_eq!(Category::Other.cycle(), Category::Cat);
    }
}
