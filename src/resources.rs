//! Static MCP resources: component design rules and composition templates.

use serde_json::{Value, json};

pub const DESIGN_RULES_URI: &str = "design://rules";
pub const COMPONENT_TEMPLATES_URI: &str = "design://component-templates";

pub fn design_rules() -> Value {
    json!({
        "description": "Component design rules and constraints",
        "rules": {
            "naming": {
                "convention": "PascalCase for component names",
                "catalog": "Refer to private components by their catalog key, e.g. cat-button, cat-table",
                "fileNaming": "kebab-case for file names, e.g. user-profile"
            },
            "structure": {
                "fileOrganization": "One folder per component with its main file, styles and type definitions",
                "dependencies": "Build on the private component library before anything else",
                "reusability": "Extract shared logic into reusable hooks or composables"
            },
            "functionality": {
                "singleResponsibility": "Each component has a single responsibility",
                "props": "Declare every prop with an explicit type and a default where optional",
                "events": "Declare every emitted event with its payload type",
                "state": "Keep state local unless a sibling block needs it"
            },
            "accessibility": {
                "aria": "Add appropriate ARIA attributes",
                "keyboard": "Support keyboard navigation",
                "semantic": "Use semantic HTML elements"
            },
            "performance": {
                "rendering": "Avoid recomputing derived data on every render",
                "loading": "Lazy-load heavy blocks",
                "cleanup": "Release subscriptions and timers on unmount"
            }
        },
        "constraints": [
            "All props have explicit types",
            "Components support responsive layouts",
            "Basic error handling is required",
            "Only recommend catalog components that exist"
        ],
        "libraryGuidelines": [
            "Check the private library for a suitable component first",
            "Prefer one composite component over several primitives",
            "Stay consistent with the existing design system"
        ]
    })
}

pub fn component_templates() -> &'static str {
    r#"# Component Templates

## Selection strategy
1. Look up the block's needs in the private component catalog (`query_component`).
2. Prefer a composite catalog component that already covers the block.
3. Otherwise compose several catalog components; fall back to custom markup last.

## Block composition
```
<PageLayout>            <- layout block (header / sidebar / footer)
  <SearchArea />        <- content-area-N blocks, in implementation order
  <TableArea />
  <DetailDrawer />
</PageLayout>
```

## Props interface
```typescript
interface ComponentProps {
  data: Row[];          // required input
  loading?: boolean;    // optional with default false
  onSelect?: (row: Row) => void;
}
```

## Integration checklist
- Design blocks in implementation-step order (high priority, fewer dependencies first).
- Pass shared state down from the layout block; lift events up.
- Keep one source of truth per data set across blocks.
"#
}
