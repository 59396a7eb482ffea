//! Per-block component design: one generation call, tolerant parsing, catalog
//! enrichment.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::ComponentCatalog;
use crate::clients::{ChatMessage, GenerationRequest, TextGenerator};
use crate::design::extract::{
    ParseError, SectionRule, extract_fenced, extract_json_payload, extract_sections,
};
use crate::design::types::{
    BlockType, ComponentDesign, DesignBlock, DesignStrategy, LibraryComponent, LibraryUsage,
    Priority, Prompt, PropSpec, prompt_text,
};
use crate::deserializers::value_to_text;
use crate::error::Result;

const DESIGN_SECTIONS: &[SectionRule] = &[
    SectionRule {
        field: "componentName",
        heading: "Component Name",
    },
    SectionRule {
        field: "componentDescription",
        heading: "Component Description",
    },
    SectionRule {
        field: "library",
        heading: "Component Library Recommendations",
    },
];

static LIBRARY_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\*\*([^*]+)\*\*:[ \t]*([^\n]*)\n\s*(?:-\s*)?\*\*Components\*\*:[ \t]*([^\n]+)\n\s*(?:-\s*)?\*\*Usage\*\*:[ \t]*([^\n]+)",
    )
    .expect("valid regex")
});
// `name?: type; // description`
static PROP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][\w$]*)(\?)?\s*:\s*([^;/]+?)\s*;?\s*(?://\s*(.*))?$")
        .expect("valid regex")
});

const DESIGN_SYSTEM_PROMPT: &str = r#"# Component Design

## Goal
Design a specific component for the "{{TITLE}}" block.
{{CONTEXT}}
## Available component library
{{CATALOG}}

## Design requirements
1. Prefer the private component library: study each component's purpose, usage and API before choosing.
2. Prefer composite components: if one private component already covers several related functions, use it as a whole.
3. Compose several private components for complex behavior instead of reinventing them.
4. Only recommend components that actually exist in the library above.

## Output format
Respond with one JSON object:
```json
{
  "componentName": "PascalCaseName",
  "componentDescription": "what the component does",
  "props": [
    {"name": "data", "type": "Row[]", "required": true, "default": null, "description": "rows to render"}
  ],
  "library": [
    {"name": "library name", "components": ["component-key"], "description": "how these components work together"}
  ]
}
```"#;

pub struct BlockDesigner {
    generator: Arc<dyn TextGenerator>,
}

/// Inputs for one block design call.
pub struct BlockDesignInput<'a> {
    pub prompt: &'a [Prompt],
    pub block_id: &'a str,
    pub block_info: Option<&'a DesignBlock>,
    pub strategy: Option<&'a DesignStrategy>,
    pub catalog: &'a ComponentCatalog,
    pub model: &'a str,
}

impl BlockDesigner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Exactly one generation call. A call failure propagates; an unusable
    /// response yields the placeholder design.
    pub async fn design(&self, input: &BlockDesignInput<'_>) -> Result<ComponentDesign> {
        let block = input
            .block_info
            .cloned()
            .or_else(|| input.strategy.and_then(|s| s.block(input.block_id).cloned()))
            .unwrap_or_else(|| default_block(input.block_id));

        let request = GenerationRequest {
            model: input.model.to_string(),
            system_instructions: design_instructions(&block, input.strategy, input.catalog),
            messages: vec![ChatMessage::user(prompt_text(input.prompt, "\n"))],
        };
        debug!(
            block_id = %input.block_id,
            system_len = request.system_instructions.len(),
            "block design request"
        );

        let text = self.generator.generate(&request).await?;
        Ok(parse_block_response(&text, input.block_id, input.catalog))
    }
}

fn default_block(block_id: &str) -> DesignBlock {
    DesignBlock {
        block_id: block_id.to_string(),
        block_type: BlockType::Component,
        title: "Component Design".to_string(),
        description: "Design a component based on requirements".to_string(),
        components: Vec::new(),
        dependencies: Vec::new(),
        estimated_tokens: 1000,
        priority: Priority::Medium,
    }
}

pub fn design_instructions(
    block: &DesignBlock,
    strategy: Option<&DesignStrategy>,
    catalog: &ComponentCatalog,
) -> String {
    let context = match strategy {
        Some(s) => {
            let deps = if block.dependencies.is_empty() {
                "None".to_string()
            } else {
                block.dependencies.join(", ")
            };
            format!(
                "\n## Design context\n- Overall strategy: {}\n- Current block: {} ({})\n- Block description: {}\n- Block priority: {}\n- Dependencies: {}\n",
                if s.design_strategy.is_empty() { "N/A" } else { s.design_strategy.as_str() },
                block.title,
                block.block_type.as_str(),
                block.description,
                block.priority.as_str(),
                deps
            )
        }
        None => format!(
            "\n## Block\n- {} ({}, priority {}): {}\n",
            block.title,
            block.block_type.as_str(),
            block.priority.as_str(),
            block.description
        ),
    };
    let catalog_text = if catalog.is_empty() {
        "No specific component library available; use appropriate components from your knowledge."
            .to_string()
    } else {
        catalog.describe()
    };

    DESIGN_SYSTEM_PROMPT
        .replace("{{TITLE}}", &block.title)
        .replace("{{CONTEXT}}", &context)
        .replace("{{CATALOG}}", &catalog_text)
}

/// JSON payload first, then the heading layout, then the placeholder.
pub fn parse_block_response(text: &str, block_id: &str, catalog: &ComponentCatalog) -> ComponentDesign {
    match extract_json_payload(text) {
        Ok(payload) => return design_from_json(&payload, block_id, catalog),
        Err(e) => debug!("No JSON design payload for {}: {}", block_id, e),
    }
    match design_from_sections(text, block_id, catalog) {
        Ok(design) => design,
        Err(e) => {
            warn!("Unusable design response for block {} ({}), using placeholder", block_id, e);
            ComponentDesign::placeholder(block_id)
        }
    }
}

fn design_from_json(payload: &Map<String, Value>, block_id: &str, catalog: &ComponentCatalog) -> ComponentDesign {
    let text_field = |key: &str| payload.get(key).and_then(value_to_text);

    let props = payload.get("props").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(|p| match serde_json::from_value::<PropSpec>(p.clone()) {
                Ok(prop) => Some(prop),
                Err(e) => {
                    debug!("Dropping malformed prop in {}: {}", block_id, e);
                    None
                }
            })
            .collect()
    });

    let library = payload
        .get("library")
        .and_then(Value::as_array)
        .map(|libs| libs.iter().filter_map(|lib| library_from_json(lib, catalog)).collect())
        .unwrap_or_default();

    ComponentDesign {
        component_name: text_field("componentName").unwrap_or_else(|| format!("{block_id}-component")),
        component_description: text_field("componentDescription").unwrap_or_default(),
        library,
        props,
    }
}

fn library_from_json(lib: &Value, catalog: &ComponentCatalog) -> Option<LibraryUsage> {
    let obj = lib.as_object()?;
    let components = obj
        .get("components")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|raw| {
                    let name = match raw {
                        Value::String(s) => s.trim().to_string(),
                        Value::Object(o) => o.get("name")?.as_str()?.trim().to_string(),
                        _ => return None,
                    };
                    (!name.is_empty()).then(|| enrich(name, raw.clone(), catalog))
                })
                .collect()
        })
        .unwrap_or_default();

    let description = ["description", "usage"]
        .iter()
        .filter_map(|k| obj.get(*k).and_then(value_to_text))
        .collect::<Vec<_>>()
        .join(" ");

    Some(LibraryUsage {
        name: obj.get("name").and_then(value_to_text).unwrap_or_default(),
        components,
        description,
    })
}

/// Catalog members carry their entry; anything else keeps its raw fragment.
fn enrich(name: String, raw: Value, catalog: &ComponentCatalog) -> LibraryComponent {
    match catalog.entry_value(&name) {
        Some(info) => LibraryComponent {
            name,
            info,
            is_private: true,
        },
        None => LibraryComponent {
            name,
            info: raw,
            is_private: false,
        },
    }
}

fn design_from_sections(
    text: &str,
    block_id: &str,
    catalog: &ComponentCatalog,
) -> std::result::Result<ComponentDesign, ParseError> {
    let sections = extract_sections(text, DESIGN_SECTIONS)?;
    let section = |key: &str| sections.get(key).and_then(Value::as_str).unwrap_or_default();

    let component_name = section("componentName")
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.trim_matches(|c| c == '*' || c == '`').to_string())
        .unwrap_or_else(|| format!("{block_id}-component"));

    let props = extract_fenced(text, "typescript")
        .or_else(|| extract_fenced(text, "ts"))
        .map(parse_props_interface)
        .filter(|p| !p.is_empty());

    let library = LIBRARY_ENTRY
        .captures_iter(section("library"))
        .map(|c| {
            let get = |i: usize| c.get(i).map(|m| m.as_str().trim()).unwrap_or_default();
            let components = get(3)
                .split(',')
                .map(|s| s.trim().trim_matches('`'))
                .filter(|s| !s.is_empty())
                .map(|s| enrich(s.to_string(), Value::String(s.to_string()), catalog))
                .collect();
            LibraryUsage {
                name: get(1).to_string(),
                components,
                description: format!("{} {}", get(2), get(4)).trim().to_string(),
            }
        })
        .collect();

    Ok(ComponentDesign {
        component_name,
        component_description: section("componentDescription").to_string(),
        library,
        props,
    })
}

/// Members of a TypeScript props interface.
pub fn parse_props_interface(source: &str) -> Vec<PropSpec> {
    source
        .lines()
        .filter(|l| !l.trim_start().starts_with("interface") && !l.trim_start().starts_with("//"))
        .filter_map(|l| PROP_LINE.captures(l))
        .map(|c| PropSpec {
            name: c[1].to_string(),
            prop_type: c[3].trim().to_string(),
            required: Some(c.get(2).is_none()),
            default: None,
            description: c.get(4).map(|m| m.as_str().trim().to_string()).filter(|d| !d.is_empty()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, ComponentCatalog};
    use std::collections::BTreeMap;

    fn catalog() -> ComponentCatalog {
        let mut entries = BTreeMap::new();
        entries.insert(
            "cat-table".to_string(),
            CatalogEntry {
                purpose: Some("Data table".into()),
                ..Default::default()
            },
        );
        ComponentCatalog::new(entries)
    }

    #[test]
    fn json_payload_is_enriched() {
        let text = r#"```json
{"componentName": "UserTable", "componentDescription": "Lists users",
 "props": [{"name": "rows", "type": "User[]", "required": "yes"}, {"bad": true}],
 "library": [{"name": "private", "components": ["cat-table", {"name": "x-pager", "size": 3}], "description": "grid"}]}
```"#;
        let design = parse_block_response(text, "b1", &catalog());
        assert_eq!(design.component_name, "UserTable");
        let props = design.props.unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].required, Some(true));
        let comps = &design.library[0].components;
        assert!(comps[0].is_private);
        assert_eq!(comps[0].info["purpose"], "Data table");
        assert!(!comps[1].is_private);
        assert_eq!(comps[1].info["size"], 3);
    }

    #[test]
    fn prose_yields_placeholder() {
        let design = parse_block_response("I cannot help with that.", "content-area-1", &catalog());
        assert_eq!(design, ComponentDesign::placeholder("content-area-1"));
        assert_eq!(design.component_name, "content-area-1-component");
    }

    #[test]
    fn heading_layout_is_accepted() {
        let text = "### Component Name\nUserTable\n\n### Component Description\nA table of users.\n\n### Props Interface\n```typescript\ninterface ComponentProps {\n  rows: User[]; // data rows\n  loading?: boolean;\n}\n```\n\n### Component Library Recommendations\n- **Private Library**: table kit\n  - **Components**: cat-table, fancy-pager\n  - **Usage**: table plus pager\n";
        let design = parse_block_response(text, "b1", &catalog());
        assert_eq!(design.component_name, "UserTable");
        assert_eq!(design.component_description, "A table of users.");
        let props = design.props.as_ref().unwrap();
        assert_eq!(props[0].name, "rows");
        assert_eq!(props[0].prop_type, "User[]");
        assert_eq!(props[0].description.as_deref(), Some("data rows"));
        assert_eq!(props[1].required, Some(false));
        assert_eq!(design.library.len(), 1);
        assert_eq!(design.library[0].name, "Private Library");
        assert_eq!(design.library[0].description, "table kit table plus pager");
        let names: Vec<&str> = design.component_names().collect();
        assert_eq!(names, vec!["cat-table", "fancy-pager"]);
        assert!(design.library[0].components[0].is_private);
        assert!(!design.library[0].components[1].is_private);
    }

    #[test]
    fn instructions_embed_block_and_catalog() {
        let block = DesignBlock {
            block_id: "b1".into(),
            block_type: BlockType::Layout,
            title: "Shell".into(),
            description: "page frame".into(),
            components: Vec::new(),
            dependencies: vec!["b0".into()],
            estimated_tokens: 1000,
            priority: Priority::High,
        };
        let strategy = DesignStrategy {
            requirement_summary: String::new(),
            complexity_level: Default::default(),
            design_strategy: "layered".into(),
            blocks: vec![block.clone()],
            implementation_steps: Vec::new(),
        };
        let text = design_instructions(&block, Some(&strategy), &catalog());
        assert!(text.contains("\"Shell\" block"));
        assert!(text.contains("Overall strategy: layered"));
        assert!(text.contains("Dependencies: b0"));
        assert!(text.contains("cat-table: Data table"));
    }
}
