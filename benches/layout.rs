use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use famgraph::{
    Gender, Orientation, Person, ProjectType, RelationSubtype, RelationType, Relationship,
    compute_layout, parse_gedcom, serialize_gedcom,
};
use std::hint::black_box;

/// Couples with `children` kids each, repeated for `generations`; every
/// child after the first marries into the next generation.
fn synthetic_tree(generations: usize, children: usize) -> (Vec<Person>, Vec<Relationship>) {
    let mut persons = Vec::new();
    let mut relationships = Vec::new();
    let mut next_id = 0usize;
    let mut new_person = |persons: &mut Vec<Person>, gender: Gender| {
        let mut person = Person::new(format!("p{next_id}"));
        person.first_name = format!("Name{next_id}");
        person.last_name = "Rossi".to_string();
        person.gender = gender;
        next_id += 1;
        let id = person.id.clone();
        persons.push(person);
        id
    };

    let mut couples = vec![(
        new_person(&mut persons, Gender::Male),
        new_person(&mut persons, Gender::Female),
    )];
    for _ in 0..generations {
        let mut next = Vec::new();
        for (husband, wife) in &couples {
            relationships.push(Relationship::new(
                format!("r{}", relationships.len()),
                RelationType::Partner,
                husband.clone(),
                wife.clone(),
                Some(RelationSubtype::Married),
            ));
            for idx in 0..children {
                let child = new_person(&mut persons, Gender::Male);
                for parent in [husband, wife] {
                    relationships.push(Relationship::new(
                        format!("r{}", relationships.len()),
                        RelationType::ParentChild,
                        parent.clone(),
                        child.clone(),
                        Some(RelationSubtype::Biological),
                    ));
                }
                if idx > 0 {
                    let spouse = new_person(&mut persons, Gender::Female);
                    next.push((child, spouse));
                }
            }
        }
        couples = next;
    }
    (persons, relationships)
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (name, generations, children) in [
        ("tree_small", 2, 2),
        ("tree_medium", 4, 3),
        ("tree_wide", 3, 6),
    ] {
        let tree = synthetic_tree(generations, children);
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, (persons, rels)| {
            b.iter(|| {
                let result = compute_layout(
                    black_box(persons),
                    black_box(rels),
                    Orientation::Vertical,
                    ProjectType::FamilyTree,
                );
                black_box(result.node_positions.len());
            });
        });
    }
    group.finish();
}

fn bench_gedcom(c: &mut Criterion) {
    let mut group = c.benchmark_group("gedcom");
    for (name, generations, children) in [("tree_small", 2, 2), ("tree_medium", 4, 3)] {
        let (persons, rels) = synthetic_tree(generations, children);
        let text = serialize_gedcom(&persons, &rels);
        group.bench_with_input(BenchmarkId::new("parse", name), &text, |b, data| {
            b.iter(|| {
                let parsed = parse_gedcom(black_box(data));
                black_box(parsed.persons.len());
            });
        });
        group.bench_with_input(
            BenchmarkId::new("serialize", name),
            &(persons, rels),
            |b, (persons, rels)| {
                b.iter(|| {
                    let out = serialize_gedcom(black_box(persons), black_box(rels));
                    black_box(out.len());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_gedcom
);
criterion_main!(benches);
