use std::collections::HashMap;

use tracing::debug;

use crate::model::{Gender, Person, RelationSubtype, RelationType, Relationship};

const HEADER: [&str; 6] = [
    "0 HEAD",
    "1 SOUR FamilyTree",
    "1 GEDC",
    "2 VERS 5.5.1",
    "2 FORM LINEAGE-LINKED",
    "1 CHAR UTF-8",
];

fn sex_code(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "M",
        Gender::Female => "F",
        Gender::Other | Gender::Unknown => "U",
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn write_event(
    lines: &mut Vec<String>,
    tag: &str,
    date: Option<&crate::date::PartialDate>,
    place: Option<&str>,
) {
    if date.is_none() && place.is_none() {
        return;
    }
    lines.push(format!("1 {tag}"));
    if let Some(date) = date {
        lines.push(format!("2 DATE {}", date.to_gedcom()));
    }
    if let Some(place) = place {
        lines.push(format!("2 PLAC {place}"));
    }
}

fn write_individual(lines: &mut Vec<String>, person: &Person) {
    lines.push(format!("0 @{}@ INDI", person.id));
    lines.push(format!("1 NAME {} /{}/", person.first_name, person.last_name));
    lines.push(format!("1 SEX {}", sex_code(person.gender)));
    write_event(
        lines,
        "BIRT",
        person.birth_date.as_ref(),
        non_empty(&person.birth_place),
    );
    write_event(
        lines,
        "DEAT",
        person.death_date.as_ref(),
        non_empty(&person.death_place),
    );
    if !person.notes.is_empty() {
        let mut note_lines = person.notes.split('\n');
        lines.push(format!("1 NOTE {}", note_lines.next().unwrap_or_default()));
        for more in note_lines {
            lines.push(format!("2 CONT {more}"));
        }
    }
}

/// One `FAM` per partner relationship whose endpoints both exist.
///
/// `to` is the husband when `from` is female, otherwise `from` is; the gender
/// of `to` is never consulted. Children
/// are the `to` side of any parent-child link leaving either partner.
fn write_families(lines: &mut Vec<String>, persons: &[Person], relationships: &[Relationship]) -> usize {
    let mut by_id: HashMap<&str, &Person> = HashMap::with_capacity(persons.len());
    for person in persons {
        by_id.entry(person.id.as_str()).or_insert(person);
    }
    let parent_child: Vec<&Relationship> = relationships
        .iter()
        .filter(|r| r.kind == RelationType::ParentChild)
        .collect();

    let mut written = 0usize;
    let mut fam_idx = 1usize;
    for partner in relationships.iter().filter(|r| r.kind == RelationType::Partner) {
        let fam_id = format!("F{fam_idx}");
        fam_idx += 1;
        let (Some(p1), Some(p2)) = (by_id.get(partner.from.as_str()), by_id.get(partner.to.as_str()))
        else {
            continue;
        };

        let (husband, wife) = if p1.gender == Gender::Female {
            (p2, p1)
        } else {
            (p1, p2)
        };

        lines.push(format!("0 @{fam_id}@ FAM"));
        lines.push(format!("1 HUSB @{}@", husband.id));
        lines.push(format!("1 WIFE @{}@", wife.id));

        match partner.subtype {
            Some(RelationSubtype::Married) => {
                lines.push("1 MARR".to_string());
                if let Some(date) = &partner.start_date {
                    lines.push(format!("2 DATE {}", date.to_gedcom()));
                }
            }
            Some(RelationSubtype::Divorced) => {
                lines.push("1 MARR".to_string());
                if let Some(date) = &partner.start_date {
                    lines.push(format!("2 DATE {}", date.to_gedcom()));
                }
                lines.push("1 DIV".to_string());
                if let Some(date) = &partner.end_date {
                    lines.push(format!("2 DATE {}", date.to_gedcom()));
                }
            }
            _ => {}
        }

        let couple = [partner.from.as_str(), partner.to.as_str()];
        let mut child_ids: Vec<&str> = Vec::new();
        for link in &parent_child {
            if couple.contains(&link.from.as_str()) && !child_ids.contains(&link.to.as_str()) {
                child_ids.push(link.to.as_str());
            }
        }
        for child_id in child_ids {
            let has_parent_in_couple = parent_child
                .iter()
                .any(|r| r.to == child_id && couple.contains(&r.from.as_str()));
            if has_parent_in_couple && by_id.contains_key(child_id) {
                lines.push(format!("1 CHIL @{child_id}@"));
            }
        }
        written += 1;
    }
    written
}

/// Writes persons and relationships as a GEDCOM 5.5.1 document.
///
/// Always produces a complete document; empty input yields just the header
/// and trailer. Friend relationships have no GEDCOM counterpart and are
/// omitted, as are parent-child links whose parent has no partner record.
pub fn serialize_gedcom(persons: &[Person], relationships: &[Relationship]) -> String {
    let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
    for person in persons {
        write_individual(&mut lines, person);
    }
    let families = write_families(&mut lines, persons, relationships);
    lines.push("0 TRLR".to_string());

    debug!(
        persons = persons.len(),
        families,
        lines = lines.len(),
        "serialized GEDCOM"
    );
    lines.join("\n")
}
