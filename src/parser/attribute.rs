use scraper::ElementRef;
use tracing::debug;

use super::types::{classify, TypeClass};
use crate::error::DocumentError;
use crate::schema::{AttributeDescriptor, Items, SchemaType};

const REQUIRED_MARKER: &str = "required";
const DEFAULT_MARKER: &str = "default";

/// Build the descriptor for one attribute heading.
///
/// The metadata block (`div > description`) and the description paragraph are
/// looked up among the heading's following siblings, up to the next heading of
/// the same level. `Ok(None)` means the attribute is typed `any` and dropped.
pub fn extract(
    heading: ElementRef<'_>,
    title: &str,
) -> Result<Option<AttributeDescriptor>, DocumentError> {
    let mut descriptor = AttributeDescriptor::new(title);
    let scope = sibling_scope(heading);

    let metadata = scope
        .iter()
        .find(|e| e.value().name() == "div")
        .and_then(|div| child_elements(*div, "description").next());

    if let Some(block) = metadata {
        descriptor.required = first_child_text(block, "strong") == Some(REQUIRED_MARKER);

        let raw_type =
            first_child_text(block, "em").ok_or_else(|| DocumentError::MissingTypeMarker {
                attribute: title.to_string(),
            })?;

        match classify(raw_type) {
            TypeClass::Array(item_type) => {
                descriptor.schema_type = SchemaType::Array;
                descriptor.items = Some(Items { item_type });
            }
            TypeClass::Enumerated(members) => {
                debug!(attribute = title, raw_type, "enumerated type");
                descriptor.schema_type = SchemaType::String;
                descriptor.enum_values = Some(members);
            }
            TypeClass::Any => {
                debug!(attribute = title, raw_type, "dropping `any` attribute");
                return Ok(None);
            }
            TypeClass::Scalar(schema_type) => {
                if schema_type.is_raw() {
                    debug!(attribute = title, raw_type, "unclassified type passed through");
                }
                descriptor.schema_type = schema_type;
            }
        }

        descriptor.default = default_value(block).map(str::to_string);
    }

    descriptor.description = scope
        .iter()
        .find(|e| e.value().name() == "p")
        .and_then(|p| own_text(*p))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(Some(descriptor))
}

/// First direct text node of an element.
pub fn own_text<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .children()
        .find_map(|node| node.value().as_text())
        .map(|text| &**text)
}

/// First direct text node that is not blank, trimmed. Headings carry a
/// whitespace node before their anchor link on some pages.
pub fn heading_text<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| (&**text).trim())
        .find(|text| !text.is_empty())
}

fn sibling_scope<'a>(heading: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let level = heading.value().name();
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|e| e.value().name() != level)
        .collect()
}

fn child_elements<'a, 'b>(
    parent: ElementRef<'a>,
    tag: &'b str,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

fn first_child_text<'a>(parent: ElementRef<'a>, tag: &str) -> Option<&'a str> {
    child_elements(parent, tag).find_map(own_text)
}

/// Text of the `code` that follows the first `em` mentioning "default".
fn default_value<'a>(block: ElementRef<'a>) -> Option<&'a str> {
    let marker = child_elements(block, "em")
        .find(|em| own_text(*em).is_some_and(|t| t.contains(DEFAULT_MARKER)))?;
    marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "code")
        .and_then(own_text)
}
