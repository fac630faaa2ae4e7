//! Entity schemas: structural validation of untyped JSON records.
//!
//! Every validator walks a `serde_json::Value`, collects *all* problems it
//! finds (not just the first), applies declared defaults for absent fields,
//! and only then builds the typed entity. Validation is structural: it never
//! checks that an id refers to something that exists; `lint` does that.

use crate::color::is_hex_color;
use crate::id::EntityId;
use crate::model::*;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Maximum length of any `name` field.
pub const NAME_MAX_LEN: usize = 100;
/// Maximum length of any `description` field.
pub const DESCRIPTION_MAX_LEN: usize = 1000;
/// Inclusive bounds for `transparency`.
pub const TRANSPARENCY_RANGE: (f64, f64) = (0.0, 1.0);
/// Inclusive bounds for rectangle `outlineWidth`.
pub const OUTLINE_WIDTH_RANGE: (f64, f64) = (0.0, 10.0);

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    Missing,
    WrongType { expected: &'static str },
    OutOfRange { min: f64, max: f64 },
    InvalidHex,
    TooLong { max: usize },
    InvalidEnum { allowed: &'static [&'static str] },
    /// An anchor `ref` must name exactly one of `item`, `anchor`, `tile`.
    AnchorRef,
}

/// A single schema violation at `path` (e.g. `layers[0].transparency`).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let at = if self.path.is_empty() { "<root>" } else { &self.path };
        match &self.kind {
            ValidationErrorKind::Missing => write!(f, "{at}: required field is missing"),
            ValidationErrorKind::WrongType { expected } => write!(f, "{at}: expected {expected}"),
            ValidationErrorKind::OutOfRange { min, max } => {
                write!(f, "{at}: must be between {min} and {max}")
            }
            ValidationErrorKind::InvalidHex => {
                write!(f, "{at}: must be a valid hex color (e.g., #ff0000)")
            }
            ValidationErrorKind::TooLong { max } => {
                write!(f, "{at}: must be at most {max} characters")
            }
            ValidationErrorKind::InvalidEnum { allowed } => {
                write!(f, "{at}: must be one of {}", allowed.join(", "))
            }
            ValidationErrorKind::AnchorRef => {
                write!(f, "{at}: must reference exactly one of item, anchor, tile")
            }
        }
    }
}

impl Error for ValidationError {}

/// Failure to load a whole document.
#[derive(Debug)]
pub enum ModelError {
    Parse(serde_json::Error),
    Invalid(Vec<ValidationError>),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "document is not valid JSON: {err}"),
            Self::Invalid(errors) => {
                write!(f, "document failed validation with {} error(s)", errors.len())?;
                for err in errors {
                    write!(f, "\n  {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

// ─── Public API ──────────────────────────────────────────────────────────

/// An entity that can be built from an untyped record.
pub trait Validate: Sized {
    fn validate(record: &Value) -> Result<Self, Vec<ValidationError>>;
}

macro_rules! impl_validate {
    ($($ty:ty => $f:ident),* $(,)?) => {
        $(
            impl Validate for $ty {
                fn validate(record: &Value) -> Result<Self, Vec<ValidationError>> {
                    run(record, $f)
                }
            }
        )*
    };
}

impl_validate! {
    ViewItem => view_item,
    Layer => layer,
    Rectangle => rectangle,
    Connector => connector,
    TextBox => text_box,
    ModelItem => model_item,
    Icon => icon,
    PaletteColor => palette_color,
    View => view,
    Model => model,
}

impl Model {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(text)?;
        let model = Model::validate(&value).map_err(ModelError::Invalid)?;
        log::debug!(
            "loaded model {:?}: {} items, {} views",
            model.title,
            model.items.len(),
            model.views.len()
        );
        Ok(model)
    }

    /// Serialize to the interchange shape (camelCase keys, absent optionals).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Check a transparency value against its range. Used by reducers for
/// values that never pass through a record.
pub fn check_transparency(path: &str, value: f64) -> Result<(), ValidationError> {
    check_range(path, value, TRANSPARENCY_RANGE)
}

/// Check an outline width against its range.
pub fn check_outline_width(path: &str, value: f64) -> Result<(), ValidationError> {
    check_range(path, value, OUTLINE_WIDTH_RANGE)
}

/// Check a string against `^#[0-9A-Fa-f]{6}$`.
pub fn check_hex(path: &str, value: &str) -> Result<(), ValidationError> {
    if is_hex_color(value) {
        Ok(())
    } else {
        Err(ValidationError::new(path, ValidationErrorKind::InvalidHex))
    }
}

fn check_range(path: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ValidationError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::new(
            path,
            ValidationErrorKind::OutOfRange { min, max },
        ))
    }
}

// ─── Walker ──────────────────────────────────────────────────────────────

fn run<T>(record: &Value, f: fn(&mut Ctx, &Value, &str) -> Option<T>) -> Result<T, Vec<ValidationError>> {
    let mut ctx = Ctx::default();
    let parsed = f(&mut ctx, record, "");
    match parsed {
        Some(entity) if ctx.errors.is_empty() => Ok(entity),
        _ => Err(ctx.errors),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[derive(Default)]
struct Ctx {
    errors: Vec<ValidationError>,
}

impl Ctx {
    fn push(&mut self, path: String, kind: ValidationErrorKind) {
        self.errors.push(ValidationError { path, kind });
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.push(path.to_string(), ValidationErrorKind::WrongType { expected: "object" });
        }
        obj
    }

    /// Fetch a required key, recording `Missing` when absent.
    fn required<'v>(&mut self, obj: &'v Map<String, Value>, path: &str, key: &str) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.push(join(path, key), ValidationErrorKind::Missing);
        }
        value
    }

    fn string_value(&mut self, value: &Value, path: String, max: Option<usize>) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.push(path, ValidationErrorKind::WrongType { expected: "string" });
            return None;
        };
        if let Some(max) = max
            && s.chars().count() > max
        {
            self.push(path, ValidationErrorKind::TooLong { max });
            return None;
        }
        Some(s.to_string())
    }

    fn string(&mut self, obj: &Map<String, Value>, path: &str, key: &str, max: Option<usize>) -> Option<String> {
        let value = self.required(obj, path, key)?;
        self.string_value(value, join(path, key), max)
    }

    /// Optional string: `Some(None)` when absent, `None` when invalid.
    fn opt_string(&mut self, obj: &Map<String, Value>, path: &str, key: &str, max: Option<usize>) -> Option<Option<String>> {
        match obj.get(key) {
            None => Some(None),
            Some(value) => self.string_value(value, join(path, key), max).map(Some),
        }
    }

    fn id(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<EntityId> {
        self.string(obj, path, key, None).map(|s| EntityId::intern(&s))
    }

    fn opt_id(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<EntityId>> {
        self.opt_string(obj, path, key, None)
            .map(|s| s.map(|s| EntityId::intern(&s)))
    }

    fn int_value(&mut self, value: &Value, path: String) -> Option<i32> {
        let n = value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok());
        if n.is_none() {
            self.push(path, ValidationErrorKind::WrongType { expected: "integer" });
        }
        n
    }

    fn opt_int(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<i32>> {
        match obj.get(key) {
            None => Some(None),
            Some(value) => self.int_value(value, join(path, key)).map(Some),
        }
    }

    fn number_value(&mut self, value: &Value, path: String, range: Option<(f64, f64)>) -> Option<f64> {
        let Some(n) = value.as_f64() else {
            self.push(path, ValidationErrorKind::WrongType { expected: "number" });
            return None;
        };
        if let Some(range) = range
            && let Err(err) = check_range(&path, n, range)
        {
            self.errors.push(err);
            return None;
        }
        Some(n)
    }

    fn opt_number(&mut self, obj: &Map<String, Value>, path: &str, key: &str, range: Option<(f64, f64)>) -> Option<Option<f64>> {
        match obj.get(key) {
            None => Some(None),
            Some(value) => self.number_value(value, join(path, key), range).map(Some),
        }
    }

    fn opt_bool(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<bool>> {
        match obj.get(key) {
            None => Some(None),
            Some(Value::Bool(b)) => Some(Some(*b)),
            Some(_) => {
                self.push(join(path, key), ValidationErrorKind::WrongType { expected: "boolean" });
                None
            }
        }
    }

    fn opt_hex(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<String>> {
        let s = self.opt_string(obj, path, key, None)?;
        if let Some(s) = &s
            && let Err(err) = check_hex(&join(path, key), s)
        {
            self.errors.push(err);
            return None;
        }
        Some(s)
    }

    fn opt_enum<T: Copy>(&mut self, obj: &Map<String, Value>, path: &str, key: &str, allowed: &'static [&'static str], values: &[T]) -> Option<Option<T>> {
        let s = self.opt_string(obj, path, key, None)?;
        let Some(s) = s else { return Some(None) };
        match allowed.iter().position(|a| *a == s) {
            Some(i) => Some(Some(values[i])),
            None => {
                self.push(join(path, key), ValidationErrorKind::InvalidEnum { allowed });
                None
            }
        }
    }

    fn coords(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Coords> {
        let value = self.required(obj, path, key)?;
        coords(self, value, &join(path, key))
    }

    /// Validate each element of an array field. Absent arrays are `Missing`
    /// when `required`, otherwise empty.
    fn array<T>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
        f: fn(&mut Ctx, &Value, &str) -> Option<T>,
    ) -> Option<Vec<T>> {
        let field = join(path, key);
        let value = match obj.get(key) {
            Some(value) => value,
            None if required => {
                self.push(field, ValidationErrorKind::Missing);
                return None;
            }
            None => return Some(Vec::new()),
        };
        let Some(elements) = value.as_array() else {
            self.push(field, ValidationErrorKind::WrongType { expected: "array" });
            return None;
        };

        let mut out = Vec::with_capacity(elements.len());
        let mut ok = true;
        for (i, element) in elements.iter().enumerate() {
            match f(self, element, &format!("{field}[{i}]")) {
                Some(entity) => out.push(entity),
                None => ok = false,
            }
        }
        ok.then_some(out)
    }
}

// ─── Entity validators ───────────────────────────────────────────────────
//
// Each validator evaluates every field before bailing so a single pass
// reports all errors in the record.

fn coords(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Coords> {
    let obj = ctx.object(value, path)?;
    let x = ctx
        .required(obj, path, "x")
        .and_then(|v| ctx.int_value(v, join(path, "x")));
    let y = ctx
        .required(obj, path, "y")
        .and_then(|v| ctx.int_value(v, join(path, "y")));
    Some(Coords::new(x?, y?))
}

fn view_item(ctx: &mut Ctx, value: &Value, path: &str) -> Option<ViewItem> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let tile = ctx.coords(obj, path, "tile");
    let label_height = ctx.opt_number(obj, path, "labelHeight", None);
    let z_index = ctx.opt_int(obj, path, "zIndex");
    Some(ViewItem {
        id: id?,
        tile: tile?,
        label_height: label_height?,
        z_index: z_index?,
    })
}

fn layer(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Layer> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let name = ctx.string(obj, path, "name", Some(NAME_MAX_LEN));
    let description = ctx.opt_string(obj, path, "description", Some(DESCRIPTION_MAX_LEN));
    let items = ctx.array(obj, path, "items", true, view_item);
    let z_offset = ctx.opt_int(obj, path, "zOffset");
    let visible = ctx.opt_bool(obj, path, "visible");
    let transparency = ctx.opt_number(obj, path, "transparency", Some(TRANSPARENCY_RANGE));
    Some(Layer {
        id: id?,
        name: name?,
        description: description?,
        items: items?,
        z_offset: z_offset?.unwrap_or(0),
        visible: visible?.unwrap_or(true),
        transparency: transparency?.unwrap_or(1.0),
    })
}

fn rectangle(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Rectangle> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let color = ctx.opt_id(obj, path, "color");
    let color_value = ctx.opt_hex(obj, path, "colorValue");
    let outline_color = ctx.opt_hex(obj, path, "outlineColor");
    let outline_width = ctx.opt_number(obj, path, "outlineWidth", Some(OUTLINE_WIDTH_RANGE));
    let from = ctx.coords(obj, path, "from");
    let to = ctx.coords(obj, path, "to");
    let transparency = ctx.opt_number(obj, path, "transparency", Some(TRANSPARENCY_RANGE));
    let z_index = ctx.opt_int(obj, path, "zIndex");
    Some(Rectangle {
        id: id?,
        color: color?,
        color_value: color_value?,
        outline_color: outline_color?,
        outline_width: outline_width?,
        from: from?,
        to: to?,
        transparency: transparency?,
        z_index: z_index?,
    })
}

fn anchor(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Anchor> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let target = ctx
        .required(obj, path, "ref")
        .and_then(|r| anchor_ref(ctx, r, &join(path, "ref")));
    Some(Anchor {
        id: id?,
        target: target?,
    })
}

fn anchor_ref(ctx: &mut Ctx, value: &Value, path: &str) -> Option<AnchorRef> {
    let obj = ctx.object(value, path)?;
    let present = ["item", "anchor", "tile"]
        .iter()
        .filter(|k| obj.contains_key(**k))
        .count();
    if present != 1 {
        ctx.push(path.to_string(), ValidationErrorKind::AnchorRef);
        return None;
    }
    if obj.contains_key("tile") {
        return ctx.coords(obj, path, "tile").map(AnchorRef::Tile);
    }
    if obj.contains_key("item") {
        return ctx.id(obj, path, "item").map(AnchorRef::Item);
    }
    ctx.id(obj, path, "anchor").map(AnchorRef::Anchor)
}

fn connector(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Connector> {
    const STYLES: &[&str] = &["SOLID", "DOTTED", "DASHED"];

    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let description = ctx.opt_string(obj, path, "description", Some(DESCRIPTION_MAX_LEN));
    let color = ctx.opt_id(obj, path, "color");
    let width = ctx.opt_number(obj, path, "width", None);
    let style = ctx.opt_enum(obj, path, "style", STYLES, &ConnectorStyle::ALL);
    let anchors = ctx.array(obj, path, "anchors", true, anchor);
    let z_index = ctx.opt_int(obj, path, "zIndex");
    Some(Connector {
        id: id?,
        description: description?,
        color: color?,
        width: width?.unwrap_or(crate::config::ConnectorDefaults::default().width),
        style: style?.unwrap_or_default(),
        anchors: SmallVec::from_vec(anchors?),
        z_index: z_index?,
    })
}

fn text_box(ctx: &mut Ctx, value: &Value, path: &str) -> Option<TextBox> {
    const ORIENTATIONS: &[&str] = &["X", "Y"];

    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let tile = ctx.coords(obj, path, "tile");
    let content = ctx.string(obj, path, "content", None);
    let font_size = ctx.opt_number(obj, path, "fontSize", None);
    let orientation = ctx.opt_enum(
        obj,
        path,
        "orientation",
        ORIENTATIONS,
        &[Orientation::X, Orientation::Y],
    );
    let z_index = ctx.opt_int(obj, path, "zIndex");
    Some(TextBox {
        id: id?,
        tile: tile?,
        content: content?,
        font_size: font_size?.unwrap_or(crate::config::TextBoxDefaults::default().font_size),
        orientation: orientation?.unwrap_or_default(),
        z_index: z_index?,
    })
}

fn model_item(ctx: &mut Ctx, value: &Value, path: &str) -> Option<ModelItem> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let name = ctx.string(obj, path, "name", Some(NAME_MAX_LEN));
    let description = ctx.opt_string(obj, path, "description", Some(DESCRIPTION_MAX_LEN));
    let icon = ctx.opt_id(obj, path, "icon");
    Some(ModelItem {
        id: id?,
        name: name?,
        description: description?,
        icon: icon?,
    })
}

fn icon(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Icon> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let name = ctx.string(obj, path, "name", Some(NAME_MAX_LEN));
    let url = ctx.string(obj, path, "url", None);
    let collection = ctx.opt_string(obj, path, "collection", None);
    let is_isometric = ctx.opt_bool(obj, path, "isIsometric");
    Some(Icon {
        id: id?,
        name: name?,
        url: url?,
        collection: collection?,
        is_isometric: is_isometric?,
    })
}

fn palette_color(ctx: &mut Ctx, value: &Value, path: &str) -> Option<PaletteColor> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let value = ctx.string(obj, path, "value", None);
    if let Some(v) = &value
        && let Err(err) = check_hex(&join(path, "value"), v)
    {
        ctx.errors.push(err);
        return None;
    }
    Some(PaletteColor {
        id: id?,
        value: value?,
    })
}

fn view(ctx: &mut Ctx, value: &Value, path: &str) -> Option<View> {
    let obj = ctx.object(value, path)?;
    let id = ctx.id(obj, path, "id");
    let name = ctx.string(obj, path, "name", Some(NAME_MAX_LEN));
    let description = ctx.opt_string(obj, path, "description", Some(DESCRIPTION_MAX_LEN));
    let last_updated = ctx.opt_string(obj, path, "lastUpdated", None);
    let items = ctx.array(obj, path, "items", true, view_item);
    let rectangles = ctx.array(obj, path, "rectangles", false, rectangle);
    let connectors = ctx.array(obj, path, "connectors", false, connector);
    let text_boxes = ctx.array(obj, path, "textBoxes", false, text_box);
    let layers = ctx.array(obj, path, "layers", false, layer);
    Some(View {
        id: id?,
        name: name?,
        description: description?,
        last_updated: last_updated?,
        items: items?,
        rectangles: rectangles?,
        connectors: connectors?,
        text_boxes: text_boxes?,
        layers: layers?,
    })
}

fn model(ctx: &mut Ctx, value: &Value, path: &str) -> Option<Model> {
    let obj = ctx.object(value, path)?;
    let title = ctx.string(obj, path, "title", Some(NAME_MAX_LEN));
    let version = ctx.opt_string(obj, path, "version", None);
    let description = ctx.opt_string(obj, path, "description", Some(DESCRIPTION_MAX_LEN));
    let items = ctx.array(obj, path, "items", true, model_item);
    let icons = ctx.array(obj, path, "icons", false, icon);
    let colors = ctx.array(obj, path, "colors", false, palette_color);
    let views = ctx.array(obj, path, "views", true, view);
    Some(Model {
        title: title?,
        version: version?,
        description: description?,
        items: items?,
        icons: icons?,
        colors: colors?,
        views: views?,
    })
}
