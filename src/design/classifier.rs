//! Keyword detection of UI areas in a requirement.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::design::types::{Prompt, prompt_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UiArea {
    Table,
    Search,
    Detail,
    Header,
    Sidebar,
    Footer,
    Form,
    Card,
    Tabs,
}

impl UiArea {
    /// Detection and reporting order.
    pub const ALL: [UiArea; 9] = [
        UiArea::Table,
        UiArea::Search,
        UiArea::Detail,
        UiArea::Header,
        UiArea::Sidebar,
        UiArea::Footer,
        UiArea::Form,
        UiArea::Card,
        UiArea::Tabs,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UiArea::Table => "Table area",
            UiArea::Search => "Search area",
            UiArea::Detail => "Detail area",
            UiArea::Header => "Header area",
            UiArea::Sidebar => "Sidebar area",
            UiArea::Footer => "Footer area",
            UiArea::Form => "Form area",
            UiArea::Card => "Card area",
            UiArea::Tabs => "Tab area",
        }
    }

    /// Header, sidebar and footer are merged into one layout block.
    pub fn is_layout(&self) -> bool {
        matches!(self, UiArea::Header | UiArea::Sidebar | UiArea::Footer)
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            UiArea::Table => &TABLE,
            UiArea::Search => &SEARCH,
            UiArea::Detail => &DETAIL,
            UiArea::Header => &HEADER,
            UiArea::Sidebar => &SIDEBAR,
            UiArea::Footer => &FOOTER,
            UiArea::Form => &FORM,
            UiArea::Card => &CARD,
            UiArea::Tabs => &TABS,
        }
    }
}

/// CJK keywords match anywhere; English keywords must stand as whole words.
fn area_regex(cjk: &str, english: &str) -> Regex {
    let pattern = format!(r"{cjk}|(?:^|[^a-z0-9])(?:{english})(?:[^a-z0-9]|$)");
    Regex::new(&pattern).expect("valid area regex")
}

static TABLE: Lazy<Regex> =
    Lazy::new(|| area_regex("表格|列表|数据表格", "tables?|lists?|listings?|grids?"));
static SEARCH: Lazy<Regex> =
    Lazy::new(|| area_regex("搜索|查询|筛选", "search(?:es|ing)?|filters?|filtering|query"));
static DETAIL: Lazy<Regex> =
    Lazy::new(|| area_regex("详情|弹窗|抽屉|详情页", "details?|modals?|drawers?|dialogs?"));
static HEADER: Lazy<Regex> =
    Lazy::new(|| area_regex("头部|导航", "headers?|nav|navbar|navigation"));
static SIDEBAR: Lazy<Regex> = Lazy::new(|| area_regex("侧边栏|侧栏", "sidebars?|side bar"));
static FOOTER: Lazy<Regex> = Lazy::new(|| area_regex("底部|页脚", "footers?"));
static FORM: Lazy<Regex> = Lazy::new(|| area_regex("表单", "forms?"));
static CARD: Lazy<Regex> = Lazy::new(|| area_regex("卡片", "cards?"));
static TABS: Lazy<Regex> = Lazy::new(|| area_regex("标签页|选项卡", "tabs?"));

/// Search, query and filter forms describe the Search area only.
static SEARCH_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"搜索表单|查询表单|筛选表单|(?:search|filter|query)[ -]?forms?")
        .expect("valid search-form regex")
});

/// Text segments joined with spaces and lowercased.
pub fn requirement_text(prompt: &[Prompt]) -> String {
    prompt_text(prompt, " ").to_lowercase()
}

/// Detected areas in `UiArea::ALL` order, each at most once.
pub fn detect_areas(text: &str) -> Vec<UiArea> {
    let text = text.to_lowercase();
    let text = SEARCH_FORM.replace_all(&text, " search ");
    UiArea::ALL
        .into_iter()
        .filter(|area| area.pattern().is_match(&text))
        .collect()
}

pub fn detect_prompt_areas(prompt: &[Prompt]) -> Vec<UiArea> {
    detect_areas(&requirement_text(prompt))
}

/// Labels joined for human-readable reasoning.
pub fn describe_areas(areas: &[UiArea]) -> String {
    areas
        .iter()
        .map(UiArea::label)
        .collect::<Vec<_>>()
        .join(", ")
}
