//! Document builder: assemble the output GPX 1.1 element tree.
//!
//! The tree is plain data ([`Element`]) so it can be inspected in tests and
//! handed to [`crate::pipeline::write`] for serialisation. Child order
//! inside each `<wpt>` is fixed: `name`, `desc`, `sym`, `ele`, then the
//! optional `extensions` block.

use crate::config::ExtractConfig;
use crate::waypoint::{format_decimal, Bounds, Waypoint};

/// Prefix bound to the Garmin extension namespace.
pub const EXTENSION_PREFIX: &str = "gpxx";

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Content of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// An element whose only content is `text`.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Self::new(name);
        el.children.push(Node::Text(text.into()));
        el
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |n| match n {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Concatenated direct text content.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Build the output `<gpx>` tree for `waypoints`, in the given order.
///
/// When `bounds` is given, a `<metadata>` block with one `<bounds>` element is
/// the first child of the root.
pub fn build_document(
    waypoints: &[Waypoint],
    bounds: Option<&Bounds>,
    config: &ExtractConfig,
) -> Element {
    let mut gpx = Element::new("gpx")
        .attr("version", "1.1")
        .attr("creator", config.creator.as_str())
        .attr("xmlns", config.gpx11_namespace.as_str());
    if config.with_extensions() {
        gpx = gpx.attr(
            format!("xmlns:{EXTENSION_PREFIX}"),
            config.extension_namespace.as_str(),
        );
    }

    if let Some(b) = bounds {
        gpx = gpx.child(metadata_element(b));
    }

    for waypoint in waypoints {
        gpx = gpx.child(waypoint_element(waypoint, config));
    }
    gpx
}

fn metadata_element(b: &Bounds) -> Element {
    Element::new("metadata").child(
        Element::new("bounds")
            .attr("minlat", format_decimal(b.min_lat))
            .attr("maxlat", format_decimal(b.max_lat))
            .attr("minlon", format_decimal(b.min_lon))
            .attr("maxlon", format_decimal(b.max_lon)),
    )
}

fn waypoint_element(waypoint: &Waypoint, config: &ExtractConfig) -> Element {
    let mut wpt = Element::new("wpt")
        .attr("lat", format_decimal(waypoint.latitude))
        .attr("lon", format_decimal(waypoint.longitude))
        .child(Element::text("name", waypoint.basename.as_str()))
        .child(Element::text("desc", waypoint.name.as_str()));

    if let Some(symbol) = config.effective_symbol() {
        wpt = wpt.child(Element::text("sym", symbol));
    }
    if let Some(ele) = waypoint.elevation {
        wpt = wpt.child(Element::text("ele", ele.to_string()));
    }
    if config.with_extensions() {
        wpt = wpt.child(extensions_element(waypoint, config.category.as_deref()));
    }
    wpt
}

fn extensions_element(waypoint: &Waypoint, category: Option<&str>) -> Element {
    let gpxx = |local: &str| format!("{EXTENSION_PREFIX}:{local}");

    let mut ext = Element::new(gpxx("WaypointExtension")).child(
        Element::new(gpxx("Address"))
            .child(Element::text(gpxx("StreetAddress"), waypoint.name.as_str())),
    );
    if let Some(category) = category {
        ext = ext.child(
            Element::new(gpxx("Categories")).child(Element::text(gpxx("Category"), category)),
        );
    }
    Element::new("extensions").child(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputProfile;
    use crate::pipeline::bounds::compute_bounds;

    fn wpt(basename: &str, lat: f64, lon: f64, ele: Option<i64>) -> Waypoint {
        Waypoint {
            basename: basename.into(),
            name: format!("{basename} name"),
            latitude: lat,
            longitude: lon,
            elevation: ele,
        }
    }

    fn child_names(el: &Element) -> Vec<&str> {
        el.children
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.name.as_str()),
                Node::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_root_attributes_garmin() {
        let doc = build_document(&[], None, &ExtractConfig::default());
        assert_eq!(doc.name, "gpx");
        let keys: Vec<&str> = doc.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["version", "creator", "xmlns", "xmlns:gpxx"]);
        assert_eq!(doc.attribute("version"), Some("1.1"));
        assert_eq!(
            doc.attribute("xmlns:gpxx"),
            Some("http://www.garmin.com/xmlschemas/GpxExtensions/v3")
        );
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_basic_profile_has_no_extension_namespace() {
        let config = ExtractConfig::builder()
            .profile(OutputProfile::Basic)
            .build()
            .unwrap();
        let doc = build_document(&[wpt("a", 1.0, 2.0, None)], None, &config);
        assert_eq!(doc.attribute("xmlns:gpxx"), None);

        let point = doc.children_named("wpt").next().unwrap();
        assert_eq!(child_names(point), vec!["name", "desc", "sym"]);
        assert_eq!(
            point.children_named("sym").next().unwrap().text_content(),
            "Flag"
        );
    }

    #[test]
    fn test_child_order_with_everything() {
        let config = ExtractConfig::builder()
            .symbol("Summit")
            .category("Peaks")
            .build()
            .unwrap();
        let doc = build_document(&[wpt("a", 1.0, 2.0, Some(1200))], None, &config);
        let point = doc.children_named("wpt").next().unwrap();
        assert_eq!(
            child_names(point),
            vec!["name", "desc", "sym", "ele", "extensions"]
        );
        assert_eq!(point.children_named("name").next().unwrap().text_content(), "a");
        assert_eq!(
            point.children_named("desc").next().unwrap().text_content(),
            "a name"
        );
        assert_eq!(point.children_named("ele").next().unwrap().text_content(), "1200");

        let ext = point
            .children_named("extensions")
            .next()
            .unwrap()
            .children_named("gpxx:WaypointExtension")
            .next()
            .unwrap();
        assert_eq!(child_names(ext), vec!["gpxx:Address", "gpxx:Categories"]);
        let street = ext
            .children_named("gpxx:Address")
            .next()
            .unwrap()
            .children_named("gpxx:StreetAddress")
            .next()
            .unwrap();
        assert_eq!(street.text_content(), "a name");
        let category = ext
            .children_named("gpxx:Categories")
            .next()
            .unwrap()
            .children_named("gpxx:Category")
            .next()
            .unwrap();
        assert_eq!(category.text_content(), "Peaks");
    }

    #[test]
    fn test_no_category_block_without_category() {
        let doc = build_document(&[wpt("a", 1.0, 2.0, None)], None, &ExtractConfig::default());
        let point = doc.children_named("wpt").next().unwrap();
        assert_eq!(child_names(point), vec!["name", "desc", "extensions"]);
        let ext = point
            .children_named("extensions")
            .next()
            .unwrap()
            .children_named("gpxx:WaypointExtension")
            .next()
            .unwrap();
        assert_eq!(child_names(ext), vec!["gpxx:Address"]);
    }

    #[test]
    fn test_bounds_metadata_is_first_child() {
        let points = [wpt("a", 1.0, 2.0, None), wpt("b", 3.0, 4.0, Some(10))];
        let bounds = compute_bounds(&points).unwrap();
        let doc = build_document(&points, Some(&bounds), &ExtractConfig::default());

        assert_eq!(child_names(&doc), vec!["metadata", "wpt", "wpt"]);
        let b = doc
            .children_named("metadata")
            .next()
            .unwrap()
            .children_named("bounds")
            .next()
            .unwrap();
        assert_eq!(b.attribute("minlat"), Some("1.0"));
        assert_eq!(b.attribute("maxlat"), Some("3.0"));
        assert_eq!(b.attribute("minlon"), Some("2.0"));
        assert_eq!(b.attribute("maxlon"), Some("4.0"));

        let pts: Vec<&Element> = doc.children_named("wpt").collect();
        assert_eq!(pts[0].attribute("lat"), Some("1.0"));
        assert_eq!(pts[1].attribute("lon"), Some("4.0"));
        assert_eq!(pts[0].children_named("ele").count(), 0);
        assert_eq!(pts[1].children_named("ele").next().unwrap().text_content(), "10");
    }

    #[test]
    fn test_custom_creator() {
        let config = ExtractConfig::builder().creator("unit-test").build().unwrap();
        let doc = build_document(&[], None, &config);
        assert_eq!(doc.attribute("creator"), Some("unit-test"));
    }
}
