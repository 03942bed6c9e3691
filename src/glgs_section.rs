// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Section/Tab Loader
/// Turns a tab manifest into tabs appended to a container
///
/// Manifest format:
///   <tabs>
///       <item name="Engines" section="sections/engines_section.xml"/>
///   </tabs>
///
/// Every entry is built in isolation: a broken entry becomes a `SkipReason`
/// in the report and loading carries on with the next one.

use crate::glge_error::{LaunchError, SkipReason};
use crate::glgr_resource::{ResourceHandle, ResourceResolver};
use crate::glgx_xml::XmlElement;

// ============================================================================
// SECTION 1: Fragments and tabs
// ============================================================================

/// Instantiated UI fragment backing one tab
#[derive(Debug, Clone)]
pub struct Fragment {
    pub source: String,
    pub root: XmlElement,
}

impl Fragment {
    pub fn id(&self) -> Option<&str> {
        self.root.attr("id")
    }
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub label: String,
    pub fragment: Fragment,
}

/// Builds a fragment from a located section resource
pub trait SectionFactory {
    fn instantiate(&self, handle: &ResourceHandle) -> Result<Fragment, String>;
}

/// Fragments described as XML documents rooted at <section>
pub struct XmlFragmentFactory;

impl SectionFactory for XmlFragmentFactory {
    fn instantiate(&self, handle: &ResourceHandle) -> Result<Fragment, String> {
        let content = handle.read_string().map_err(|e| e.to_string())?;
        let root = XmlElement::parse(&content)?;

        if root.name != "section" {
            return Err(format!("expected <section> root, found <{}>", root.name));
        }

        Ok(Fragment { source: handle.url(), root })
    }
}

/// Anything tabs can be appended to
pub trait TabContainer {
    fn add_tab(&mut self, tab: Tab);
    fn request_focus(&mut self);
}

// ============================================================================
// SECTION 2: Manifest entries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub name: String,
    pub resource_path: String,
}

impl SectionEntry {
    fn from_element(e: &XmlElement) -> Result<Self, SkipReason> {
        let name = e.non_empty_attr("name").ok_or(SkipReason::MissingName)?;
        let section = e.non_empty_attr("section").ok_or(SkipReason::MissingSection)?;

        Ok(SectionEntry {
            name: name.to_string(),
            resource_path: section.to_string(),
        })
    }
}

/// Outcome of one manifest load
#[derive(Debug, Default)]
pub struct SectionReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<(usize, SkipReason)>,
}

// ============================================================================
// SECTION 3: Loader
// ============================================================================

pub struct SectionLoader<'a> {
    resolver: &'a dyn ResourceResolver,
    factory: &'a dyn SectionFactory,
}

impl<'a> SectionLoader<'a> {
    pub fn new(resolver: &'a dyn ResourceResolver, factory: &'a dyn SectionFactory) -> Self {
        SectionLoader { resolver, factory }
    }

    /// Load the manifest at `manifest_path`; only a missing manifest is an error
    pub fn load(&self, manifest_path: &str, container: &mut dyn TabContainer) -> Result<SectionReport, LaunchError> {
        let manifest = self.resolver.require(manifest_path)?.read_string()?;
        Ok(self.load_document(manifest_path, &manifest, container))
    }

    pub fn load_document(&self, manifest_path: &str, xml: &str, container: &mut dyn TabContainer) -> SectionReport {
        let mut report = SectionReport::default();

        match XmlElement::parse(xml) {
            Ok(root) => {
                for (index, item) in root.descendants_named("item").into_iter().enumerate() {
                    match self.build_tab(item) {
                        Ok(tab) => {
                            report.loaded.push(tab.label.clone());
                            container.add_tab(tab);
                        }
                        Err(reason) => {
                            log::warn!("SECTIONS: {} item #{} skipped: {}", manifest_path, index, reason);
                            report.skipped.push((index, reason));
                        }
                    }
                }
            }
            Err(e) => {
                log::error!("SECTIONS: {} parse_error ({}), no tabs loaded", manifest_path, e);
            }
        }

        container.request_focus();

        log::info!("SECTIONS: loaded {} tabs from {} ({} skipped)",
            report.loaded.len(), manifest_path, report.skipped.len());
        report
    }

    fn build_tab(&self, item: &XmlElement) -> Result<Tab, SkipReason> {
        let entry = SectionEntry::from_element(item)?;

        let handle = self.resolver.locate(&entry.resource_path)
            .ok_or_else(|| SkipReason::Unresolved(entry.resource_path.clone()))?;

        let fragment = self.factory.instantiate(&handle)
            .map_err(SkipReason::Instantiation)?;

        Ok(Tab { label: entry.name, fragment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glgr_resource::testing::MemoryResources;

    #[derive(Default)]
    struct TabList {
        labels: Vec<String>,
        focused: bool,
    }

    impl TabContainer for TabList {
        fn add_tab(&mut self, tab: Tab) {
            self.labels.push(tab.label);
        }

        fn request_focus(&mut self) {
            self.focused = true;
        }
    }

    fn sections() -> MemoryResources {
        MemoryResources::default()
            .with("sections/a.xml", r#"<section id="a"/>"#)
            .with("sections/c.xml", r#"<section id="c"><list/></section>"#)
            .with("sections/broken.xml", r#"<section><list></section>"#)
            .with("sections/wrong_root.xml", r#"<panel/>"#)
    }

    fn load(resources: &MemoryResources, xml: &str, tabs: &mut TabList) -> SectionReport {
        SectionLoader::new(resources, &XmlFragmentFactory).load_document("menus/tab_menu.xml", xml, tabs)
    }

    #[test]
    fn test_loads_in_document_order() {
        let resources = sections();
        let mut tabs = TabList::default();
        let report = load(&resources, r#"
            <tabs>
                <item name="C" section="sections/c.xml"/>
                <item name="A" section="sections/a.xml" icon="ignored"/>
            </tabs>
        "#, &mut tabs);

        assert_eq!(tabs.labels, vec!["C", "A"]);
        assert_eq!(report.loaded, vec!["C", "A"]);
        assert!(report.skipped.is_empty());
        assert!(tabs.focused);
    }

    #[test]
    fn test_poison_entry_does_not_block_siblings() {
        let resources = sections();
        let mut tabs = TabList::default();
        let report = load(&resources, r#"
            <tabs>
                <item name="A" section="sections/a.xml"/>
                <item name="B" section="sections/broken.xml"/>
                <item name="C" section="sections/c.xml"/>
            </tabs>
        "#, &mut tabs);

        assert_eq!(tabs.labels, vec!["A", "C"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0], (1, SkipReason::Instantiation(_))));
    }

    #[test]
    fn test_skip_reasons() {
        let resources = sections();
        let mut tabs = TabList::default();
        let report = load(&resources, r#"
            <tabs>
                <item section="sections/a.xml"/>
                <item name="No section"/>
                <item name="" section="sections/a.xml"/>
                <item name="Missing" section="sections/missing.xml"/>
                <item name="Wrong" section="sections/wrong_root.xml"/>
            </tabs>
        "#, &mut tabs);

        assert!(tabs.labels.is_empty());
        let reasons: Vec<_> = report.skipped.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(reasons[0], SkipReason::MissingName);
        assert_eq!(reasons[1], SkipReason::MissingSection);
        assert_eq!(reasons[2], SkipReason::MissingName);
        assert_eq!(reasons[3], SkipReason::Unresolved("sections/missing.xml".to_string()));
        assert!(matches!(reasons[4], SkipReason::Instantiation(_)));
    }

    #[test]
    fn test_appends_to_existing_tabs() {
        let resources = sections();
        let mut tabs = TabList { labels: vec!["Existing".to_string()], focused: false };
        load(&resources, r#"<tabs><item name="A" section="sections/a.xml"/></tabs>"#, &mut tabs);
        load(&resources, r#"<tabs><item name="A" section="sections/a.xml"/></tabs>"#, &mut tabs);

        assert_eq!(tabs.labels, vec!["Existing", "A", "A"]);
    }

    #[test]
    fn test_malformed_manifest_loads_nothing() {
        let resources = sections();
        let mut tabs = TabList::default();
        let report = load(&resources, "<tabs><item name=\"A\"", &mut tabs);

        assert!(report.loaded.is_empty());
        assert!(tabs.labels.is_empty());
        assert!(tabs.focused);
    }

    #[test]
    fn test_missing_manifest_is_error() {
        let resources = sections();
        let mut tabs = TabList::default();
        let result = SectionLoader::new(&resources, &XmlFragmentFactory).load("menus/none.xml", &mut tabs);
        assert!(matches!(result, Err(LaunchError::ResourceNotFound { .. })));
    }

    #[test]
    fn test_fragment_keeps_source() {
        let resources = sections();
        let handle = resources.locate("sections/c.xml").unwrap();
        let fragment = XmlFragmentFactory.instantiate(&handle).unwrap();
        assert_eq!(fragment.id(), Some("c"));
        assert_eq!(fragment.source, "memory:/sections/c.xml");
    }
}
