//! Rule-based decomposition of detected UI areas into design blocks.

use crate::design::classifier::UiArea;
use crate::design::types::{BlockType, Complexity, DesignBlock, Priority};

pub const MAIN_COMPONENT_ID: &str = "main-component";
pub const LAYOUT_BLOCK_ID: &str = "layout-structure";
pub const MAIN_CONTENT_ID: &str = "main-content";

const WHOLE_BLOCK_TOKENS: u32 = 1500;
const CONTENT_AREA_TOKENS: u32 = 1200;

/// Never fails and never calls out.
pub fn plan_blocks(areas: &[UiArea], complexity: Complexity) -> Vec<DesignBlock> {
    match complexity {
        Complexity::Simple => vec![single_block(areas.first())],
        Complexity::Medium | Complexity::Complex => layered_blocks(areas),
    }
}

fn single_block(area: Option<&UiArea>) -> DesignBlock {
    let (title, description) = match area {
        Some(area) => (area.label().to_string(), format!("Design {}", area.label())),
        None => (
            "Main component".to_string(),
            "Design main component based on requirements".to_string(),
        ),
    };
    block(MAIN_COMPONENT_ID, BlockType::Component, title, description, Vec::new(), WHOLE_BLOCK_TOKENS, Priority::High)
}

fn layered_blocks(areas: &[UiArea]) -> Vec<DesignBlock> {
    let (layout, content): (Vec<UiArea>, Vec<UiArea>) =
        areas.iter().copied().partition(UiArea::is_layout);

    let mut blocks = Vec::with_capacity(content.len() + 1);
    if !layout.is_empty() {
        let labels: Vec<&str> = layout.iter().map(UiArea::label).collect();
        blocks.push(block(
            LAYOUT_BLOCK_ID,
            BlockType::Layout,
            "Page layout structure".to_string(),
            format!("Design page layout: {}", labels.join(", ")),
            Vec::new(),
            WHOLE_BLOCK_TOKENS,
            Priority::High,
        ));
    }

    let deps = || {
        if layout.is_empty() {
            Vec::new()
        } else {
            vec![LAYOUT_BLOCK_ID.to_string()]
        }
    };

    if content.is_empty() {
        blocks.push(block(
            MAIN_CONTENT_ID,
            BlockType::Component,
            "Main content area".to_string(),
            "Design main content area".to_string(),
            deps(),
            WHOLE_BLOCK_TOKENS,
            Priority::High,
        ));
        return blocks;
    }

    for (i, area) in content.iter().enumerate() {
        blocks.push(block(
            &format!("content-area-{}", i + 1),
            BlockType::Component,
            area.label().to_string(),
            format!("Design {}", area.label()),
            deps(),
            CONTENT_AREA_TOKENS,
            if i == 0 { Priority::High } else { Priority::Medium },
        ));
    }
    blocks
}

fn block(
    id: &str,
    block_type: BlockType,
    title: String,
    description: String,
    dependencies: Vec<String>,
    estimated_tokens: u32,
    priority: Priority,
) -> DesignBlock {
    DesignBlock {
        block_id: id.to_string(),
        block_type,
        title,
        description,
        components: Vec::new(),
        dependencies,
        estimated_tokens,
        priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_tier_is_one_block() {
        let blocks = plan_blocks(&[], Complexity::Simple);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_id, MAIN_COMPONENT_ID);
        assert_eq!(blocks[0].title, "Main component");

        let blocks = plan_blocks(&[UiArea::Form, UiArea::Card], Complexity::Simple);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "Form area");
    }

    #[test]
    fn layout_areas_merge_and_become_dependencies() {
        let areas = [UiArea::Table, UiArea::Header, UiArea::Sidebar, UiArea::Form];
        let blocks = plan_blocks(&areas, Complexity::Complex);
        let ids: Vec<&str> = blocks.iter().map(|b| b.block_id.as_str()).collect();
        assert_eq!(ids, vec!["layout-structure", "content-area-1", "content-area-2"]);
        assert_eq!(blocks[0].block_type, BlockType::Layout);
        assert!(blocks[0].dependencies.is_empty());
        assert!(blocks[0].description.contains("Header area, Sidebar area"));
        assert_eq!(blocks[1].dependencies, vec!["layout-structure"]);
        assert_eq!(blocks[1].priority, Priority::High);
        assert_eq!(blocks[2].priority, Priority::Medium);
        assert_eq!(blocks[2].estimated_tokens, 1200);
    }

    #[test]
    fn layout_only_synthesizes_content() {
        let blocks = plan_blocks(&[UiArea::Header, UiArea::Footer], Complexity::Medium);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].block_id, MAIN_CONTENT_ID);
        assert_eq!(blocks[1].dependencies, vec![LAYOUT_BLOCK_ID]);
    }

    #[test]
    fn no_areas_medium_tier() {
        let blocks = plan_blocks(&[], Complexity::Medium);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_id, MAIN_CONTENT_ID);
        assert!(blocks[0].dependencies.is_empty());
    }
}
