use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::GedcomData;
use crate::date::PartialDate;
use crate::id::generate_id;
use crate::model::{Gender, Person, RelationSubtype, RelationType, Relationship};

static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(?:(@\S+@)\s+)?(.*)$").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)\s*(.*)$").unwrap());

/// Record opened by the most recent level-0 line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Record {
    #[default]
    None,
    Individual(usize),
    Family(usize),
}

/// Level-1 structure whose level-2 children are being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Context {
    #[default]
    None,
    Birth,
    Death,
    Note,
    Marriage,
    Divorce,
}

#[derive(Debug, Default)]
struct FamilyRecord {
    husband: Option<String>,
    wife: Option<String>,
    children: Vec<String>,
    married: bool,
    divorced: bool,
    marriage_date: Option<PartialDate>,
    divorce_date: Option<PartialDate>,
}

impl FamilyRecord {
    fn partner_subtype(&self) -> RelationSubtype {
        if self.divorced {
            RelationSubtype::Divorced
        } else if self.married {
            RelationSubtype::Married
        } else {
            RelationSubtype::Partner
        }
    }
}

struct Line<'a> {
    level: u32,
    xref: Option<&'a str>,
    tag: &'a str,
    value: &'a str,
}

fn split_line(raw: &str) -> Option<Line<'_>> {
    let caps = LINE_RE.captures(raw)?;
    let level = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let xref = caps.get(2).map(|m| m.as_str().trim_matches('@'));
    let rest = caps.get(3)?.as_str();
    let tag_caps = TAG_RE.captures(rest)?;
    Some(Line {
        level,
        xref,
        tag: tag_caps.get(1)?.as_str(),
        value: tag_caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
    })
}

fn pointer(value: &str) -> Option<String> {
    let id = value.trim().trim_matches('@');
    (!id.is_empty()).then(|| id.to_string())
}

#[derive(Default)]
struct Parser {
    persons: Vec<Person>,
    families: Vec<FamilyRecord>,
    record: Record,
    context: Context,
    skipped: usize,
}

impl Parser {
    fn feed(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        let Some(line) = split_line(raw) else {
            self.skipped += 1;
            return;
        };

        if line.level == 0 {
            self.open_record(line.xref, line.tag);
            return;
        }

        match self.record {
            Record::Individual(idx) => self.individual_line(idx, &line),
            Record::Family(idx) => self.family_line(idx, &line),
            Record::None => {}
        }
    }

    fn open_record(&mut self, xref: Option<&str>, tag: &str) {
        self.context = Context::None;
        self.record = match tag {
            "INDI" => {
                let id = match xref {
                    Some(xref) if !xref.is_empty() => xref.to_string(),
                    _ => generate_id("p"),
                };
                self.persons.push(Person::new(id));
                Record::Individual(self.persons.len() - 1)
            }
            "FAM" => {
                self.families.push(FamilyRecord::default());
                Record::Family(self.families.len() - 1)
            }
            _ => Record::None,
        };
    }

    fn individual_line(&mut self, idx: usize, line: &Line<'_>) {
        let Some(person) = self.persons.get_mut(idx) else {
            return;
        };
        match line.level {
            1 => {
                self.context = match line.tag {
                    "BIRT" => Context::Birth,
                    "DEAT" => Context::Death,
                    "NOTE" => Context::Note,
                    _ => Context::None,
                };
                match line.tag {
                    "NAME" => {
                        let mut parts = line.value.split('/').map(str::trim);
                        person.first_name = parts.next().unwrap_or_default().to_string();
                        person.last_name = parts.next().unwrap_or_default().to_string();
                    }
                    "SEX" => {
                        person.gender = match line.value {
                            "M" => Gender::Male,
                            "F" => Gender::Female,
                            _ => Gender::Unknown,
                        };
                    }
                    "NOTE" => person.notes = line.value.to_string(),
                    _ => {}
                }
            }
            2 => match (self.context, line.tag) {
                (Context::Birth, "DATE") => person.birth_date = PartialDate::from_gedcom(line.value),
                (Context::Birth, "PLAC") => person.birth_place = Some(line.value.to_string()),
                (Context::Death, "DATE") => person.death_date = PartialDate::from_gedcom(line.value),
                (Context::Death, "PLAC") => person.death_place = Some(line.value.to_string()),
                (Context::Note, "CONT") => {
                    person.notes.push('\n');
                    person.notes.push_str(line.value);
                }
                (Context::Note, "CONC") => person.notes.push_str(line.value),
                _ => {}
            },
            _ => {}
        }
    }

    fn family_line(&mut self, idx: usize, line: &Line<'_>) {
        let Some(family) = self.families.get_mut(idx) else {
            return;
        };
        match line.level {
            1 => {
                self.context = Context::None;
                match line.tag {
                    "HUSB" => family.husband = pointer(line.value),
                    "WIFE" => family.wife = pointer(line.value),
                    "CHIL" => {
                        if let Some(child) = pointer(line.value) {
                            family.children.push(child);
                        }
                    }
                    "MARR" => {
                        family.married = true;
                        self.context = Context::Marriage;
                    }
                    "DIV" => {
                        family.divorced = true;
                        self.context = Context::Divorce;
                    }
                    _ => {}
                }
            }
            2 => match (self.context, line.tag) {
                (Context::Marriage, "DATE") => {
                    family.marriage_date = PartialDate::from_gedcom(line.value)
                }
                (Context::Divorce, "DATE") => {
                    family.divorce_date = PartialDate::from_gedcom(line.value)
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn finish(self) -> GedcomData {
        let mut relationships = Vec::new();
        for family in &self.families {
            if let (Some(husband), Some(wife)) = (&family.husband, &family.wife) {
                let mut partner = Relationship::new(
                    generate_id("r"),
                    RelationType::Partner,
                    husband.clone(),
                    wife.clone(),
                    Some(family.partner_subtype()),
                );
                partner.start_date = family.marriage_date;
                partner.end_date = family.divorce_date;
                relationships.push(partner);
            }

            let parents: Vec<&String> = family.husband.iter().chain(family.wife.iter()).collect();
            for child in &family.children {
                for parent in &parents {
                    relationships.push(Relationship::new(
                        generate_id("r"),
                        RelationType::ParentChild,
                        (*parent).clone(),
                        child.clone(),
                        Some(RelationSubtype::Biological),
                    ));
                }
            }
        }

        debug!(
            persons = self.persons.len(),
            families = self.families.len(),
            relationships = relationships.len(),
            skipped = self.skipped,
            "parsed GEDCOM"
        );

        GedcomData {
            persons: self.persons,
            relationships,
        }
    }
}

/// Reads a GEDCOM document into persons and relationships.
///
/// Tolerant: malformed lines and unknown tags are skipped, never reported.
/// Relationships are derived from `FAM` records once every line is read:
/// one partner link per couple plus a biological parent-child link from each
/// listed parent to each child.
pub fn parse_gedcom(text: &str) -> GedcomData {
    let mut parser = Parser::default();
    for raw in text.trim_start_matches('\u{feff}').lines() {
        parser.feed(raw);
    }
    parser.finish()
}
