//! Human-readable summaries returned alongside each tool's JSON payload.

use serde_json::{Map, Value};

use crate::design::{BlockOutcome, IntegratedDesign, PlanOutcome};

pub fn format_plan(outcome: &PlanOutcome) -> String {
    let strategy = &outcome.strategy;
    let mut lines = vec![
        "## Design Strategy".to_string(),
        String::new(),
        format!("**Requirement:** {}", strategy.requirement_summary),
        format!("**Complexity:** `{}`", strategy.complexity_level.as_str()),
        format!("**Strategy:** {}", strategy.design_strategy),
        String::new(),
    ];

    if let Some(smart) = &outcome.smart_analysis {
        if !smart.business_domains.is_empty() {
            lines.push("**Business domains:**".to_string());
            for (i, domain) in smart.business_domains.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, domain));
            }
            lines.push(String::new());
        }
        if !smart.interaction_patterns.is_empty() {
            lines.push("**Interaction patterns:**".to_string());
            for pattern in &smart.interaction_patterns {
                lines.push(format!("- **{}**: {}", pattern.pattern_type, pattern.description));
                if let Some(flow) = &pattern.data_flow {
                    lines.push(format!("  - data flow: {flow}"));
                }
            }
            lines.push(String::new());
        }
        let strong: Vec<_> = smart
            .existing_component_matches
            .iter()
            .filter(|m| m.match_score > 0.5)
            .collect();
        if !strong.is_empty() {
            lines.push("**Existing component matches:**".to_string());
            for m in strong {
                lines.push(format!(
                    "- **{}** ({}%)",
                    m.component_name,
                    (m.match_score * 100.0).round()
                ));
            }
            lines.push(String::new());
        }
    }

    lines.push(format!("**Blocks ({}):**", strategy.blocks.len()));
    for block in &strategy.blocks {
        let deps = if block.dependencies.is_empty() {
            String::new()
        } else {
            format!(" (after {})", block.dependencies.join(", "))
        };
        lines.push(format!(
            "- `{}` [{} / {}] {}{}",
            block.block_id,
            block.block_type.as_str(),
            block.priority.as_str(),
            block.title,
            deps
        ));
    }
    lines.push(String::new());

    lines.push("**Implementation steps:**".to_string());
    for step in &strategy.implementation_steps {
        lines.push(format!(
            "{}. {} → `{}` ({})",
            step.step_number, step.action, step.tool_call, step.block_id
        ));
    }

    if let Some(next) = &outcome.next_action {
        lines.push(String::new());
        lines.push(format!("**Next:** `{}`: {}", next.tool, next.description));
    }
    lines.join("\n")
}

pub fn format_block_design(outcome: &BlockOutcome) -> String {
    let design = &outcome.design;
    let mut lines = vec![
        format!("## Block Design: `{}`", outcome.block_id),
        String::new(),
        format!("**Component:** {}", design.component_name),
    ];
    if !design.component_description.is_empty() {
        lines.push(format!("**Description:** {}", design.component_description));
    }

    if let Some(props) = design.props.as_ref().filter(|p| !p.is_empty()) {
        lines.push(String::new());
        lines.push("**Props:**".to_string());
        for p in props {
            let optional = if p.required == Some(false) { "?" } else { "" };
            let desc = p
                .description
                .as_deref()
                .map(|d| format!(" - {d}"))
                .unwrap_or_default();
            lines.push(format!("- `{}{}: {}`{}", p.name, optional, p.prop_type, desc));
        }
    }

    if !design.library.is_empty() {
        lines.push(String::new());
        lines.push("**Libraries:**".to_string());
        for lib in &design.library {
            let names: Vec<String> = lib
                .components
                .iter()
                .map(|c| {
                    if c.is_private {
                        format!("{} (private)", c.name)
                    } else {
                        c.name.clone()
                    }
                })
                .collect();
            lines.push(format!("- **{}**: {}", lib.name, names.join(", ")));
            if !lib.description.is_empty() {
                lines.push(format!("  {}", lib.description));
            }
        }
    }

    if let Some(integrated) = &outcome.integrated {
        lines.push(String::new());
        lines.push(format!(
            "**Progress:** {} of {} blocks designed",
            integrated.block_designs.len(),
            integrated.strategy.blocks.len()
        ));
    }
    if let Some(next) = &outcome.next_action {
        lines.push(format!("**Next:** `{}`: {}", next.tool, next.description));
    }
    lines.push(String::new());
    lines.push(format!(
        "_{} ms, model {}_",
        outcome.metadata.processing_time_ms, outcome.metadata.model
    ));
    lines.join("\n")
}

pub fn format_integrated(design: &IntegratedDesign) -> String {
    let mut lines = vec![design.composition_plan.clone(), String::new()];
    let used = &design.aggregated.private_components_used;
    if used.is_empty() {
        lines.push("**Private components used:** none".to_string());
    } else {
        lines.push(format!("**Private components used:** {}", used.join(", ")));
    }
    let with_props: Vec<&str> = design
        .aggregated
        .props_by_block
        .keys()
        .map(String::as_str)
        .collect();
    if !with_props.is_empty() {
        lines.push(format!("**Blocks with props:** {}", with_props.join(", ")));
    }
    lines.join("\n")
}

pub fn format_component_doc(name: &str, doc: &Map<String, Value>) -> String {
    let mut lines = vec![format!("## Component: `{name}`")];
    if doc.is_empty() {
        lines.push("No further documentation.".to_string());
    }
    for (key, value) in doc {
        match value {
            Value::String(s) => lines.push(format!("**{key}:** {s}")),
            other => {
                let pretty = serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string());
                lines.push(format!("**{key}:**\n```json\n{pretty}\n```"));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn component_doc_renders_strings_and_json() {
        let doc = json!({"notes": "virtualized", "api": {"size": "sm"}});
        let text = format_component_doc("cat-table", doc.as_object().unwrap());
        assert!(text.starts_with("## Component: `cat-table`"));
        assert!(text.contains("**notes:** virtualized"));
        assert!(text.contains("\"size\": \"sm\""));
    }
}
