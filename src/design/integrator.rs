//! Folding completed block designs into one integrated design.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::catalog::ComponentCatalog;
use crate::design::types::{AggregatedDesign, BlockDesign, DesignStrategy, IntegratedDesign, PropSpec};

/// Pure; recomputed on every call. `aggregated` does not depend on the order
/// of `block_designs`, the composition plan follows `strategy.blocks`.
pub fn integrate(
    strategy: DesignStrategy,
    block_designs: Vec<BlockDesign>,
    catalog: &ComponentCatalog,
) -> IntegratedDesign {
    for (block_id, dep) in strategy.dangling_dependencies() {
        warn!("Block {} depends on unknown block {}", block_id, dep);
    }

    let aggregated = aggregate(&block_designs, catalog);
    let composition_plan = composition_plan(&strategy, &block_designs);
    debug!(
        "Integrated {} block designs ({} with props, {} private components)",
        block_designs.len(),
        aggregated.props_by_block.len(),
        aggregated.private_components_used.len()
    );

    IntegratedDesign {
        strategy,
        block_designs,
        aggregated,
        composition_plan,
    }
}

fn aggregate(block_designs: &[BlockDesign], catalog: &ComponentCatalog) -> AggregatedDesign {
    let mut grouped: BTreeMap<String, Vec<Vec<PropSpec>>> = BTreeMap::new();
    let mut private: BTreeSet<String> = BTreeSet::new();

    for design in block_designs {
        if let Some(props) = design.component.props.as_ref().filter(|p| !p.is_empty()) {
            grouped
                .entry(design.block_id.clone())
                .or_default()
                .push(props.clone());
        }
        private.extend(
            design
                .component
                .component_names()
                .filter(|name| catalog.has(name))
                .map(str::to_string),
        );
    }

    let props_by_block = grouped
        .into_iter()
        .map(|(block_id, mut lists)| {
            let props = if lists.len() == 1 {
                lists.pop().unwrap_or_default()
            } else {
                merge_props(lists)
            };
            (block_id, props)
        })
        .collect();

    AggregatedDesign {
        props_by_block,
        private_components_used: private.into_iter().collect(),
    }
}

/// Several designs for one block: union of their props in a canonical order.
fn merge_props(lists: Vec<Vec<PropSpec>>) -> Vec<PropSpec> {
    let mut merged: Vec<PropSpec> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| {
        (&a.name, &a.prop_type, &a.required, &a.default, &a.description).cmp(&(
            &b.name,
            &b.prop_type,
            &b.required,
            &b.default,
            &b.description,
        ))
    });
    merged.dedup();
    merged
}

pub fn composition_plan(strategy: &DesignStrategy, block_designs: &[BlockDesign]) -> String {
    let mut lines = vec![
        "# Component Integration Plan".to_string(),
        String::new(),
        "## Overall Strategy".to_string(),
        strategy.design_strategy.clone(),
        String::new(),
        "## Blocks".to_string(),
    ];

    for block in &strategy.blocks {
        lines.push(format!("### {}", block.title));
        lines.push(format!("- **Type**: {}", block.block_type.as_str()));
        lines.push(format!("- **Description**: {}", block.description));
        lines.push(format!("- **Priority**: {}", block.priority.as_str()));

        if let Some(design) = block_designs.iter().find(|d| d.block_id == block.block_id) {
            let component = &design.component;
            lines.push(format!("- **Component**: {}", component.component_name));
            lines.push(format!(
                "- **Component Description**: {}",
                component.component_description
            ));
            if !component.library.is_empty() {
                lines.push("- **Libraries**:".to_string());
                for lib in &component.library {
                    let names: Vec<&str> = lib.components.iter().map(|c| c.name.as_str()).collect();
                    lines.push(format!("  - {}: {}", lib.name, names.join(", ")));
                }
            }
        }
        lines.push(String::new());
    }

    lines.push("## Integration Suggestions".to_string());
    lines.push("1. Build blocks in priority order".to_string());
    lines.push("2. Respect dependencies between blocks".to_string());
    lines.push("3. Use the private component library consistently".to_string());
    lines.push("4. Keep data flow between components explicit".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::design::types::ComponentDesign;
    use serde_json::json;

    fn catalog(keys: &[&str]) -> ComponentCatalog {
        ComponentCatalog::new(
            keys.iter()
                .map(|k| (k.to_string(), CatalogEntry::default()))
                .collect(),
        )
    }

    #[test]
    fn duplicate_block_props_merge_canonically() {
        let d = |props: serde_json::Value| BlockDesign {
            block_id: "b1".into(),
            component: serde_json::from_value::<ComponentDesign>(json!({"props": props})).unwrap(),
        };
        let first = d(json!([{"name": "b"}, {"name": "a"}]));
        let second = d(json!([{"name": "a"}, {"name": "c"}]));
        let strategy: DesignStrategy = serde_json::from_value(json!({"blocks": []})).unwrap();

        let x = integrate(strategy.clone(), vec![first.clone(), second.clone()], &catalog(&[]));
        let y = integrate(strategy, vec![second, first], &catalog(&[]));
        assert_eq!(x.aggregated, y.aggregated);
        let names: Vec<&str> = x.aggregated.props_by_block["b1"]
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn plan_follows_strategy_order() {
        let strategy: DesignStrategy = serde_json::from_value(json!({
            "designStrategy": "two blocks",
            "blocks": [
                {"blockId": "first", "title": "First"},
                {"blockId": "second", "title": "Second"}
            ]
        }))
        .unwrap();
        let designs: Vec<BlockDesign> = serde_json::from_value(json!([
            {"blockId": "second", "component": {"componentName": "Two", "library": [{"name": "lib", "components": ["k"]}]}},
            {"blockId": "first", "component": {"componentName": "One"}}
        ]))
        .unwrap();
        let plan = integrate(strategy, designs, &catalog(&["k"])).composition_plan;
        let first = plan.find("### First").unwrap();
        let second = plan.find("### Second").unwrap();
        assert!(first < second);
        assert!(plan.contains("- **Component**: One"));
        assert!(plan.contains("  - lib: k"));
        assert!(plan.starts_with("# Component Integration Plan"));
    }
}
