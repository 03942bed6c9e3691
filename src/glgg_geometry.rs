// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Screen Geometry
/// Placement rectangles computed from display work areas
///
/// Nothing is cached: every call asks the DisplaySource again so resolution
/// or monitor changes between calls are picked up.

/// Rectangle in logical screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub name: String,
    pub bounds: Rect,
    /// Work area: bounds minus taskbars, docks and panels
    pub visible_bounds: Rect,
    pub primary: bool,
}

pub trait DisplaySource {
    fn displays(&self) -> Vec<Display>;
}

/// Margins kept between the window and the work-area corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub right: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins { right: 60.0, bottom: 10.0 }
    }
}

/// Work area reported by the OS, clipped to the display bounds
/// Falls back to the full bounds when the report does not overlap them
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub fn clip_work_area(bounds: Rect, work: Rect) -> Rect {
    let left = bounds.x.max(work.x);
    let top = bounds.y.max(work.y);
    let right = (bounds.x + bounds.width).min(work.x + work.width);
    let bottom = (bounds.y + bounds.height).min(work.y + work.height);

    if right <= left || bottom <= top {
        return bounds;
    }
    Rect::new(left, top, right - left, bottom - top)
}

/// Primary display, or the first one reported when none is flagged primary
pub fn active_display(source: &dyn DisplaySource) -> Option<Display> {
    let displays = source.displays();
    displays.iter()
        .find(|d| d.primary)
        .or_else(|| displays.first())
        .cloned()
}

/// Work area of `display`, or of the active display when none is given
pub fn visible_bounds(source: &dyn DisplaySource, display: Option<&Display>) -> Option<Rect> {
    match display {
        Some(d) => Some(d.visible_bounds),
        None => active_display(source).map(|d| d.visible_bounds),
    }
}

/// Rectangle at (0,0) sized as percentages of the work area
pub fn percent_of(source: &dyn DisplaySource, display: Option<&Display>, percent: (f64, f64)) -> Option<Rect> {
    let screen = visible_bounds(source, display)?;
    Some(Rect {
        x: 0.0,
        y: 0.0,
        width: percent.0 * screen.width / 100.0,
        height: percent.1 * screen.height / 100.0,
    })
}

/// Translate a sized rect into the bottom-right corner of `screen`
pub fn anchor_bottom_right(screen: Rect, size: Rect, margins: Margins) -> Rect {
    Rect {
        x: screen.x + screen.width - (size.width + margins.right),
        y: screen.y + screen.height - (size.height + margins.bottom),
        width: size.width,
        height: size.height,
    }
}
