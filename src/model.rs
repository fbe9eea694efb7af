use crate::date::PartialDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    Partner,
    ParentChild,
    Friend,
}

/// Qualifier of a relationship. Which variants make sense depends on the
/// [`RelationType`]; see [`RelationSubtype::applies_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationSubtype {
    // partner
    Married,
    Divorced,
    Partner,
    // parent-child
    Biological,
    Adopted,
    Foster,
    Step,
    // friend
    University,
    HighSchool,
    MiddleSchool,
    Elementary,
    SummerCityFriend,
    Sport,
    Romantic,
    Flirt,
    WorkColleague,
    Neighbor,
    Acquaintance,
}

impl RelationSubtype {
    pub fn applies_to(self, kind: RelationType) -> bool {
        match self {
            Self::Married | Self::Divorced | Self::Partner => kind == RelationType::Partner,
            Self::Biological | Self::Adopted | Self::Foster | Self::Step => {
                kind == RelationType::ParentChild
            }
            _ => kind == RelationType::Friend,
        }
    }
}

/// Axis along which generations are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Orientation {
    /// Ancestors above descendants.
    #[default]
    Vertical,
    /// Ancestors left of descendants.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ProjectType {
    #[default]
    FamilyTree,
    FriendCluster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    #[serde(default, deserialize_with = "crate::date::deserialize_lenient")]
    pub birth_date: Option<PartialDate>,
    pub birth_place: Option<String>,
    #[serde(default, deserialize_with = "crate::date::deserialize_lenient")]
    pub death_date: Option<PartialDate>,
    pub death_place: Option<String>,
    pub photo: Option<String>,
    pub notes: String,
    pub custom_fields: BTreeMap<String, String>,
}

impl Person {
    /// Creates an unnamed person of unknown gender with no recorded events.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            gender: Gender::Unknown,
            birth_date: None,
            birth_place: None,
            death_date: None,
            death_place: None,
            photo: None,
            notes: String::new(),
            custom_fields: BTreeMap::new(),
        }
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.trim(), self.last_name.trim()) {
            ("", "") => self.id.clone(),
            (first, "") => first.to_string(),
            ("", last) => last.to_string(),
            (first, last) => format!("{first} {last}"),
        }
    }
}

/// A typed edge between two persons.
///
/// Only `ParentChild` is directional (`from` is the parent). Endpoints may
/// dangle after a person is deleted; consumers skip such edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
    pub from: String,
    pub to: String,
    pub subtype: Option<RelationSubtype>,
    #[serde(default, deserialize_with = "crate::date::deserialize_lenient")]
    pub start_date: Option<PartialDate>,
    #[serde(default, deserialize_with = "crate::date::deserialize_lenient")]
    pub end_date: Option<PartialDate>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        kind: RelationType,
        from: impl Into<String>,
        to: impl Into<String>,
        subtype: Option<RelationSubtype>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            from: from.into(),
            to: to.into(),
            subtype,
            start_date: None,
            end_date: None,
            location: None,
        }
    }

    pub fn involves(&self, person_id: &str) -> bool {
        self.from == person_id || self.to == person_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_json_matches_editor_shape() {
        let rel = Relationship::new(
            "r1",
            RelationType::ParentChild,
            "p1",
            "p2",
            Some(RelationSubtype::Biological),
        );
        let value = serde_json::to_value(&rel).unwrap();
        assert_eq!(value["type"], "parent-child");
        assert_eq!(value["subtype"], "biological");
        assert_eq!(value["startDate"], serde_json::Value::Null);

        let friend: Relationship = serde_json::from_str(
            r#"{"id":"r2","type":"friend","from":"a","to":"b","subtype":"summerCityFriend",
                "startDate":"2001","endDate":null}"#,
        )
        .unwrap();
        assert_eq!(friend.subtype, Some(RelationSubtype::SummerCityFriend));
        assert_eq!(friend.start_date, Some(PartialDate::Year(2001)));
        assert_eq!(friend.location, None);
    }

    #[test]
    fn subtypes_belong_to_one_relation_type() {
        assert!(RelationSubtype::Divorced.applies_to(RelationType::Partner));
        assert!(RelationSubtype::Step.applies_to(RelationType::ParentChild));
        assert!(RelationSubtype::Neighbor.applies_to(RelationType::Friend));
        assert!(!RelationSubtype::Married.applies_to(RelationType::Friend));
        assert!(!RelationSubtype::Sport.applies_to(RelationType::ParentChild));
    }

    #[test]
    fn display_name_skips_empty_parts() {
        let mut person = Person::new("p1");
        assert_eq!(person.display_name(), "p1");
        person.first_name = "Anna".to_string();
        assert_eq!(person.display_name(), "Anna");
        person.last_name = "Bianchi".to_string();
        assert_eq!(person.display_name(), "Anna Bianchi");
    }

    #[test]
    fn person_requires_known_gender() {
        let json = r#"{"id":"p1","firstName":"A","lastName":"B","gender":"invalid",
            "birthDate":null,"birthPlace":null,"deathDate":null,"deathPlace":null,
            "photo":null,"notes":"","customFields":{}}"#;
        assert!(serde_json::from_str::<Person>(json).is_err());
    }
}
