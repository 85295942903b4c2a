use serde::Serialize;
use serde_json::{Value, json};

use crate::classify::{OutputNames, RepeatClass};
use crate::model::{PlacedFragment, RepeatGroup, SpriteSheet};

/// One stylesheet rule positioning a fragment inside its composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    pub class_name: String,
    pub image: String,
    pub repeat: RepeatClass,
    /// Negated placement, as written to `background-position`.
    pub position: (i64, i64),
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl StyleRule {
    pub fn new(item: &PlacedFragment, class: RepeatClass, image: &str) -> Self {
        let f = &item.fragment;
        // the repeating axis is left to the box, so only the fixed one is sized
        let (width, height) = match class {
            RepeatClass::NoRepeat => (Some(f.width), Some(f.height)),
            RepeatClass::RepeatY => (Some(f.width), None),
            RepeatClass::RepeatX => (None, Some(f.height)),
        };
        Self {
            class_name: css_safe_class(&f.file_name),
            image: image.to_string(),
            repeat: class,
            position: (
                -(item.placement.offset_x as i64),
                -(item.placement.offset_y as i64),
            ),
            width,
            height,
        }
    }

    pub fn to_css(&self) -> String {
        let mut s = format!(
            ".{}  {{\n  background:url({}) {} {} {};",
            self.class_name,
            self.image,
            self.repeat.keyword(),
            px(self.position.0),
            px(self.position.1),
        );
        if let Some(w) = self.width {
            s.push_str(&format!(" width:{};", px(w as i64)));
        }
        if let Some(h) = self.height {
            s.push_str(&format!(" height:{};", px(h as i64)));
        }
        s.push_str("\n}\n");
        s
    }
}

/// Lower-cased file name with each run of non-letters collapsed to `-` and
/// no leading or trailing `-`. Distinct names may collide.
pub fn css_safe_class(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_gap = false;
    for ch in name.chars() {
        if ch.is_ascii_alphabetic() {
            out.push(ch.to_ascii_lowercase());
            in_gap = false;
        } else if !in_gap {
            out.push('-');
            in_gap = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// CSS length: bare `0`, otherwise `<n>px`.
pub fn px(n: i64) -> String {
    if n == 0 { "0".into() } else { format!("{n}px") }
}

/// Rules for one group, in placement order.
pub fn style_rules(group: &RepeatGroup, names: &OutputNames) -> Vec<StyleRule> {
    let image = names.composite(group.class);
    group
        .items
        .iter()
        .map(|item| StyleRule::new(item, group.class, image))
        .collect()
}

/// The full stylesheet: one commented section per group in sheet order.
/// Empty groups still get their section header.
pub fn to_stylesheet(sheet: &SpriteSheet) -> String {
    let mut s = String::new();
    for (i, group) in sheet.groups.iter().enumerate() {
        if i > 0 {
            s.push_str("\n\n");
        }
        s.push_str(&format!("/* {} */\n", sheet.names.composite(group.class)));
        for rule in style_rules(group, &sheet.names) {
            s.push_str(&rule.to_css());
        }
    }
    s
}

/// Layout metadata as JSON: `{ groups: [ { class, image, width, height, fragments } ], stylesheet }`.
pub fn to_json(sheet: &SpriteSheet) -> Value {
    let groups: Vec<Value> = sheet
        .groups
        .iter()
        .map(|g| {
            let fragments: Vec<Value> = g
                .items
                .iter()
                .map(|it| {
                    let f = &it.fragment;
                    let padding = f.padding();
                    json!({
                        "file": f.file_name,
                        "className": css_safe_class(&f.file_name),
                        "x": it.placement.offset_x,
                        "y": it.placement.offset_y,
                        "w": f.width,
                        "h": f.height,
                        "padding": {"left": padding.left, "right": padding.right},
                        "format": f.format,
                        "fileSize": f.file_size,
                    })
                })
                .collect();
            json!({
                "class": g.class,
                "image": sheet.names.composite(g.class),
                "width": g.width,
                "height": g.height,
                "fragments": fragments,
            })
        })
        .collect();
    json!({ "groups": groups, "stylesheet": sheet.names.stylesheet })
}
