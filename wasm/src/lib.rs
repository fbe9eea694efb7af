use famgraph::{
    LayoutConfig, Orientation, Person, ProjectType, Relationship, compute_layout_with_config,
    parse_gedcom, serialize_gedcom,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOptions {
    orientation: Option<Orientation>,
    project_type: Option<ProjectType>,
    config: Option<LayoutConfig>,
}

#[derive(Debug, Serialize)]
struct GedcomPayload<'a> {
    persons: &'a [Person],
    relationships: &'a [Relationship],
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, JsValue> {
    serde_json::from_str(raw).map_err(js_error)
}

#[wasm_bindgen]
pub fn compute_layout_json(
    persons_json: &str,
    relationships_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let persons: Vec<Person> = decode(persons_json)?;
    let relationships: Vec<Relationship> = decode(relationships_json)?;
    let options = match options_json {
        Some(raw) => decode::<LayoutOptions>(&raw)?,
        None => LayoutOptions::default(),
    };

    let result = compute_layout_with_config(
        &persons,
        &relationships,
        options.orientation.unwrap_or_default(),
        options.project_type.unwrap_or_default(),
        &options.config.unwrap_or_default(),
    );
    serde_json::to_string(&result).map_err(js_error)
}

#[wasm_bindgen]
pub fn parse_gedcom_json(text: &str) -> Result<String, JsValue> {
    let data = parse_gedcom(text);
    serde_json::to_string(&GedcomPayload {
        persons: &data.persons,
        relationships: &data.relationships,
    })
    .map_err(js_error)
}

#[wasm_bindgen]
pub fn serialize_gedcom_json(persons_json: &str, relationships_json: &str) -> Result<String, JsValue> {
    let persons: Vec<Person> = decode(persons_json)?;
    let relationships: Vec<Relationship> = decode(relationships_json)?;
    Ok(serialize_gedcom(&persons, &relationships))
}
