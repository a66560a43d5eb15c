//! Column definitions as supplied by the host, and the resolved leaf columns
//! the grid works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Default width for a leaf column without an explicit width.
pub const DEFAULT_COLUMN_WIDTH: f32 = 120.0;

/// Default minimum width for a leaf column.
pub const DEFAULT_MIN_COLUMN_WIDTH: f32 = 40.0;

/// Data kind of a column. Only `Button` and `Canvas` columns render without a
/// value accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Select,
    Tree,
    Button,
    Canvas,
}

impl ColumnKind {
    /// Whether the column draws itself without reading a row value.
    pub fn is_self_rendering(self) -> bool {
        matches!(self, Self::Button | Self::Canvas)
    }
}

/// Optional extra content shown in a header cell next to its title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum HeaderContent {
    /// Named icon from the icon set.
    Icon(String),
    /// Short secondary label.
    Badge(String),
}

/// One level of a leaf column's header path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderSegment {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<HeaderContent>,
}

/// A single cell value read from a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Convert a JSON value. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order used for sorting: `Empty < Bool < Number < Text`.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Reads a cell value out of a row.
#[derive(Clone)]
pub struct ValueAccessor(Rc<dyn Fn(&Value) -> CellValue>);

impl ValueAccessor {
    pub fn new(f: impl Fn(&Value) -> CellValue + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Look up `field` on a JSON object row.
    pub fn field(field: &str) -> Self {
        let field = field.to_string();
        Self::new(move |row| row.get(&field).map_or(CellValue::Empty, CellValue::from_json))
    }

    /// Accessor for columns that have no value.
    pub fn empty() -> Self {
        Self::new(|_| CellValue::Empty)
    }

    pub fn read(&self, row: &Value) -> CellValue {
        (self.0)(row)
    }
}

impl fmt::Debug for ValueAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueAccessor(..)")
    }
}

impl PartialEq for ValueAccessor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Turns a cell value into display text.
#[derive(Clone)]
pub struct FormatAccessor(Rc<dyn Fn(&CellValue) -> String>);

impl FormatAccessor {
    pub fn new(f: impl Fn(&CellValue) -> String + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn display() -> Self {
        Self::new(ToString::to_string)
    }

    pub fn format(&self, value: &CellValue) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for FormatAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FormatAccessor(..)")
    }
}

impl PartialEq for FormatAccessor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A node of the host's column-definition tree. Groups have `children`;
/// leaves have an `id` (the value accessor key) or a self-rendering kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnDef {
    pub id: Option<String>,
    pub title: String,
    pub kind: ColumnKind,
    pub width: Option<f32>,
    pub min_width: Option<f32>,
    pub grow: Option<f32>,
    pub sortable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ColumnDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_content: Option<HeaderContent>,
    #[serde(skip)]
    pub value: Option<ValueAccessor>,
    #[serde(skip)]
    pub format: Option<FormatAccessor>,
    #[serde(skip)]
    pub sort_by: Option<ValueAccessor>,
}

impl ColumnDef {
    /// Data-bound leaf column reading `id` from each row.
    pub fn leaf(id: &str, title: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Header group over `children`.
    pub fn group(title: &str, children: Vec<ColumnDef>) -> Self {
        Self {
            title: title.to_string(),
            children,
            ..Self::default()
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_min_width(mut self, min_width: f32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    #[must_use]
    pub fn with_grow(mut self, grow: f32) -> Self {
        self.grow = Some(grow);
        self
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub fn with_header_content(mut self, content: HeaderContent) -> Self {
        self.header_content = Some(content);
        self
    }

    #[must_use]
    pub fn with_value(mut self, f: impl Fn(&Value) -> CellValue + 'static) -> Self {
        self.value = Some(ValueAccessor::new(f));
        self
    }

    #[must_use]
    pub fn with_format(mut self, f: impl Fn(&CellValue) -> String + 'static) -> Self {
        self.format = Some(FormatAccessor::new(f));
        self
    }

    #[must_use]
    pub fn with_sort(mut self, f: impl Fn(&Value) -> CellValue + 'static) -> Self {
        self.sort_by = Some(ValueAccessor::new(f));
        self
    }
}

/// A resolved, data-bound column. Rebuilt whenever the column configuration
/// changes and otherwise immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafColumn {
    pub id: String,
    pub title: String,
    /// Outermost group first, own label last.
    pub header_path: Vec<HeaderSegment>,
    pub kind: ColumnKind,
    pub min_width: f32,
    pub base_width: f32,
    pub grow: f32,
    pub sortable: bool,
    pub value: ValueAccessor,
    pub format: FormatAccessor,
    pub sort_by: ValueAccessor,
}

impl LeafColumn {
    pub fn value(&self, row: &Value) -> CellValue {
        self.value.read(row)
    }

    pub fn display(&self, row: &Value) -> String {
        self.format.format(&self.value(row))
    }

    pub fn sort_key(&self, row: &Value) -> CellValue {
        self.sort_by.read(row)
    }

    pub fn depth(&self) -> usize {
        self.header_path.len()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_order() {
        let mut values = vec![
            CellValue::Text("b".into()),
            CellValue::Number(2.0),
            CellValue::Empty,
            CellValue::Bool(true),
            CellValue::Number(-1.0),
            CellValue::Text("a".into()),
        ];
        values.sort_by(CellValue::total_cmp);
        assert_eq!(
            values,
            vec![
                CellValue::Empty,
                CellValue::Bool(true),
                CellValue::Number(-1.0),
                CellValue::Number(2.0),
                CellValue::Text("a".into()),
                CellValue::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_field_accessor() {
        let row = json!({"name": "Ada", "age": 36, "tags": [1, 2]});
        assert_eq!(
            ValueAccessor::field("name").read(&row),
            CellValue::Text("Ada".into())
        );
        assert_eq!(ValueAccessor::field("age").read(&row), CellValue::Number(36.0));
        assert_eq!(
            ValueAccessor::field("tags").read(&row),
            CellValue::Text("[1,2]".into())
        );
        assert_eq!(ValueAccessor::field("missing").read(&row), CellValue::Empty);
    }

    #[test]
    fn test_column_def_from_json() {
        let def: ColumnDef = serde_json::from_str(
            r#"{"title": "Person", "children": [
                {"id": "name", "title": "Name", "sortable": true, "minWidth": 80},
                {"title": "Edit", "kind": "button", "headerContent": {"type": "icon", "value": "grip"}}
            ]}"#,
        )
        .unwrap();
        assert!(def.is_group());
        assert_eq!(def.children.len(), 2);
        assert_eq!(def.children[0].min_width, Some(80.0));
        assert!(def.children[0].sortable);
        assert_eq!(def.children[1].kind, ColumnKind::Button);
        assert_eq!(
            def.children[1].header_content,
            Some(HeaderContent::Icon("grip".into()))
        );
    }
}
