// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Popup Menu Builder
/// Parses the tray menu manifest into a MenuDefinition tree
///
/// Manifest format:
///   <menu name="Godot Launcher">
///       <item name="Open launcher" command="open"/>
///       <item name="---"/>                         (separator by label)
///       <separator/>                               (separator by element)
///       <menu name="More"> ... </menu>             (nested submenu)
///   </menu>
///
/// Commands are decoded into TrayAction here, once, so dispatch never
/// re-parses strings.

use crate::glge_error::LaunchError;
use crate::glgr_resource::ResourceResolver;
use crate::glgx_xml::XmlElement;

// ============================================================================
// SECTION 1: Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    Open,
    Config,
    Quit,
    Unrecognized(String),
}

impl TrayAction {
    /// Case-insensitive; anything unknown is kept verbatim as Unrecognized
    pub fn parse(command: &str) -> Self {
        match command.trim().to_lowercase().as_str() {
            "open" => TrayAction::Open,
            "config" => TrayAction::Config,
            "quit" => TrayAction::Quit,
            _ => TrayAction::Unrecognized(command.to_string()),
        }
    }
}

// ============================================================================
// SECTION 2: Menu tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLeaf {
    pub label: String,
    pub action: TrayAction,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    Leaf(MenuLeaf),
    Separator,
    SubMenu { label: String, children: Vec<MenuNode> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDefinition {
    pub title: String,
    pub nodes: Vec<MenuNode>,
}

/// Three or more hyphens and nothing else
pub fn is_separator_label(label: &str) -> bool {
    label.len() >= 3 && label.chars().all(|c| c == '-')
}

impl MenuDefinition {
    pub fn load(resolver: &dyn ResourceResolver, path: &str) -> Result<Self, LaunchError> {
        let xml = resolver.require(path)?.read_string()?;
        Self::from_xml(&xml).map_err(|e| LaunchError::xml(path, e))
    }

    pub fn from_xml(xml: &str) -> Result<Self, String> {
        let root = XmlElement::parse(xml)?;

        Ok(MenuDefinition {
            title: root.attr("name").unwrap_or_default().to_string(),
            nodes: Self::build_nodes(&root),
        })
    }

    fn build_nodes(parent: &XmlElement) -> Vec<MenuNode> {
        let mut nodes = Vec::new();

        for child in &parent.children {
            match child.name.as_str() {
                "menu" => nodes.push(MenuNode::SubMenu {
                    label: child.attr("name").unwrap_or_default().to_string(),
                    children: Self::build_nodes(child),
                }),
                "item" => nodes.push(Self::build_item(child)),
                "separator" => nodes.push(MenuNode::Separator),
                other => log::debug!("TRAY: ignoring <{}> in menu manifest", other),
            }
        }

        nodes
    }

    fn build_item(e: &XmlElement) -> MenuNode {
        let label = e.attr("name").unwrap_or_default();
        if is_separator_label(label) {
            return MenuNode::Separator;
        }

        // Items without a command dispatch their own label
        let command = e.attr("command")
            .or_else(|| e.attr("action"))
            .unwrap_or(label);

        let enabled = e.attr("enabled")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        MenuNode::Leaf(MenuLeaf {
            label: label.to_string(),
            action: TrayAction::parse(command),
            enabled,
        })
    }

    /// Leaves in document order, depth-first
    pub fn leaves(&self) -> Vec<&MenuLeaf> {
        fn walk<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a MenuLeaf>) {
            for node in nodes {
                match node {
                    MenuNode::Leaf(leaf) => out.push(leaf),
                    MenuNode::SubMenu { children, .. } => walk(children, out),
                    MenuNode::Separator => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }
}
