//! Locates a layer's complexType inside a DescribeFeatureType response and
//! reads the field declarations of its sequence.
//!
//! The lookup is a two-step heuristic: the layer's `xsd:element` declaration
//! names the type, and when that is missing the type is assumed to be called
//! `<localName>Type`. Only the first `xsd:sequence` under the matched type is
//! read.

use crate::domain::model::{
    Documentation, FieldDocs, LayerRef, TypeName, TypeNameOrigin, Unavailable,
};
use crate::utils::error::Result;
use roxmltree::{Document, Node, ParsingOptions};

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

fn is_xsd(node: &Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
}

/// 第一個 name 屬性相符的 xsd 元素 (文件順序)
fn find_named<'a, 'input>(
    doc: &'a Document<'input>,
    kind: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|node| is_xsd(node, kind) && node.attribute("name") == Some(name))
}

/// Resolves the type name for `layer`: the declared `type` first, then the
/// naming convention.
pub fn derive_type_name(doc: &Document, layer: &LayerRef) -> TypeName {
    let local_name = layer.local_name();

    // 只看第一個同名宣告；沒有 type 屬性就改用命名慣例
    match find_named(doc, "element", local_name).and_then(|el| el.attribute("type")) {
        Some(declared) if !declared.is_empty() => TypeName::declared(declared),
        _ => TypeName::by_convention(local_name),
    }
}

/// The field sequence of the layer's complexType, if one can be located.
fn locate_sequence<'a, 'input>(
    doc: &'a Document<'input>,
    layer: &LayerRef,
) -> std::result::Result<Option<Node<'a, 'input>>, TypeName> {
    let type_name = derive_type_name(doc, layer);
    if type_name.origin == TypeNameOrigin::Convention {
        tracing::debug!(
            "No type declared for layer {}, trying '{}'",
            layer,
            type_name.name
        );
    }

    let complex_type = find_named(doc, "complexType", type_name.local_name()).ok_or(type_name)?;

    // descendants() 包含自身，跳過 complexType 本身
    Ok(complex_type
        .descendants()
        .skip(1)
        .find(|node| is_xsd(node, "sequence")))
}

fn field_declarations<'a, 'input>(
    sequence: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    sequence.children().filter(|node| is_xsd(node, "element"))
}

/// Schema responses may carry a DOCTYPE prolog.
fn parse_schema(doc: &str) -> std::result::Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(doc, options)
}

/// Leading text of `annotation/documentation`, up to the first child element.
/// Comments between text chunks are skipped.
fn documentation_text(field: Node) -> String {
    let Some(documentation) = field
        .children()
        .find(|node| is_xsd(node, "annotation"))
        .and_then(|annotation| annotation.children().find(|node| is_xsd(node, "documentation")))
    else {
        return String::new();
    };

    let text: String = documentation
        .children()
        .take_while(|node| !node.is_element())
        .filter(Node::is_text)
        .filter_map(|node| node.text())
        .collect();
    text.trim().to_string()
}

/// Field names of the layer's type in declaration order.
///
/// A malformed document is an error; a type that cannot be found is not,
/// it yields an empty list.
pub fn list_field_names(doc: &str, layer: &LayerRef) -> Result<Vec<String>> {
    let doc = parse_schema(doc)?;

    let sequence = match locate_sequence(&doc, layer) {
        Ok(sequence) => sequence,
        Err(type_name) => {
            tracing::warn!(
                "Could not find complexType '{}' in DescribeFeatureType for layer {}",
                type_name.local_name(),
                layer
            );
            return Ok(Vec::new());
        }
    };

    Ok(sequence
        .into_iter()
        .flat_map(field_declarations)
        .filter_map(|field| field.attribute("name"))
        .map(str::to_string)
        .collect())
}

/// Field name to documentation mapping. Never fails; see [`Documentation`].
pub fn field_documentation(doc: &str, layer: &LayerRef) -> Documentation {
    let doc = match parse_schema(doc) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("Property descriptions could not be parsed for layer {}: {}", layer, e);
            return Documentation::Unavailable(Unavailable::Parse(e.to_string()));
        }
    };

    let sequence = match locate_sequence(&doc, layer) {
        Ok(sequence) => sequence,
        Err(type_name) => {
            tracing::warn!("Property descriptions could not be found for layer {}", layer);
            return Documentation::Unavailable(Unavailable::TypeNotFound {
                type_name: type_name.local_name().to_string(),
            });
        }
    };

    let mut docs = FieldDocs::new();
    for field in sequence.into_iter().flat_map(field_declarations) {
        if let Some(name) = field.attribute("name") {
            docs.insert(name.to_string(), documentation_text(field));
        }
    }
    Documentation::Resolved(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARKS_SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:app="http://example.org/app" targetNamespace="http://example.org/app">
  <xsd:element name="Parks" type="app:ParksType"/>
  <xsd:complexType name="ParksType">
    <xsd:sequence>
      <xsd:element name="id"/>
      <xsd:element name="area">
        <xsd:annotation>
          <xsd:documentation>Area in m²</xsd:documentation>
        </xsd:annotation>
      </xsd:element>
    </xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;

    fn layer(name: &str) -> LayerRef {
        LayerRef::new(name).unwrap()
    }

    #[test]
    fn test_field_names_in_document_order() {
        let names = list_field_names(PARKS_SCHEMA, &layer("app:Parks")).unwrap();
        assert_eq!(names, vec!["id", "area"]);
    }

    #[test]
    fn test_documentation_defaults_to_empty_string() {
        let docs = field_documentation(PARKS_SCHEMA, &layer("app:Parks")).into_fields();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get("id").map(String::as_str), Some(""));
        assert_eq!(docs.get("area").map(String::as_str), Some("Area in m²"));
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["id", "area"]);
    }

    #[test]
    fn test_qualified_and_unqualified_layer_resolve_identically() {
        assert_eq!(
            list_field_names(PARKS_SCHEMA, &layer("app:Parks")).unwrap(),
            list_field_names(PARKS_SCHEMA, &layer("Parks")).unwrap()
        );
        assert_eq!(
            field_documentation(PARKS_SCHEMA, &layer("other:Parks")),
            field_documentation(PARKS_SCHEMA, &layer("Parks"))
        );
    }

    #[test]
    fn test_declared_type_name() {
        let doc = Document::parse(PARKS_SCHEMA).unwrap();
        let type_name = derive_type_name(&doc, &layer("app:Parks"));
        assert_eq!(type_name, TypeName::declared("app:ParksType"));
    }

    #[test]
    fn test_convention_fallback_without_element_declaration() {
        let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="TreesType">
    <xs:complexContent>
      <xs:extension base="gml:AbstractFeatureType">
        <xs:sequence>
          <xs:element name="species" type="xs:string"/>
          <xs:element name="height" type="xs:double"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>"#;
        let doc = Document::parse(schema).unwrap();
        assert_eq!(
            derive_type_name(&doc, &layer("fis:Trees")).origin,
            TypeNameOrigin::Convention
        );
        assert_eq!(
            list_field_names(schema, &layer("fis:Trees")).unwrap(),
            vec!["species", "height"]
        );
    }

    #[test]
    fn test_element_without_type_attribute_falls_back() {
        let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:element name="Lakes"/>
  <xsd:complexType name="LakesType">
    <xsd:sequence><xsd:element name="depth"/></xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;
        assert_eq!(list_field_names(schema, &layer("Lakes")).unwrap(), vec!["depth"]);
    }

    #[test]
    fn test_missing_type_yields_empty_results() {
        let names = list_field_names(PARKS_SCHEMA, &layer("app:Roads")).unwrap();
        assert!(names.is_empty());

        let docs = field_documentation(PARKS_SCHEMA, &layer("app:Roads"));
        assert_eq!(
            docs.reason(),
            Some(&Unavailable::TypeNotFound {
                type_name: "RoadsType".to_string()
            })
        );
        assert!(docs.into_fields().is_empty());
    }

    #[test]
    fn test_malformed_document() {
        assert!(list_field_names("<xsd:schema", &layer("Parks")).is_err());

        let docs = field_documentation("<xsd:schema", &layer("Parks"));
        assert!(matches!(docs.reason(), Some(Unavailable::Parse(_))));
        assert!(docs.into_fields().is_empty());
    }

    #[test]
    fn test_duplicate_field_names_are_kept_in_simple_mode() {
        let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:complexType name="WellsType">
    <xsd:sequence>
      <xsd:element name="id"/>
      <xsd:element name="id"/>
      <xsd:element type="xsd:string"/>
      <xsd:element name="depth"/>
    </xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;
        assert_eq!(
            list_field_names(schema, &layer("Wells")).unwrap(),
            vec!["id", "id", "depth"]
        );
        let docs = field_documentation(schema, &layer("Wells")).into_fields();
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["id", "depth"]);
    }

    #[test]
    fn test_first_sequence_wins_and_nested_elements_are_ignored() {
        let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:complexType name="SitesType">
    <xsd:sequence>
      <xsd:element name="name"/>
      <xsd:element name="address">
        <xsd:complexType>
          <xsd:sequence>
            <xsd:element name="street"/>
          </xsd:sequence>
        </xsd:complexType>
      </xsd:element>
    </xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;
        assert_eq!(
            list_field_names(schema, &layer("Sites")).unwrap(),
            vec!["name", "address"]
        );
    }

    #[test]
    fn test_type_without_sequence_is_empty_but_resolved() {
        let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:complexType name="EmptyType"/>
</xsd:schema>"#;
        assert!(list_field_names(schema, &layer("Empty")).unwrap().is_empty());
        let docs = field_documentation(schema, &layer("Empty"));
        assert!(docs.is_resolved());
        assert!(docs.into_fields().is_empty());
    }

    #[test]
    fn test_doctype_prolog_is_accepted() {
        let schema = r#"<?xml version="1.0"?>
<!DOCTYPE xsd:schema [ <!ENTITY x "y"> ]>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:element name="Parks" type="app:ParksType"/>
  <xsd:complexType name="ParksType">
    <xsd:sequence><xsd:element name="id"/></xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;
        assert_eq!(list_field_names(schema, &layer("app:Parks")).unwrap(), vec!["id"]);
        assert!(field_documentation(schema, &layer("app:Parks")).is_resolved());
    }

    #[test]
    fn test_documentation_text_skips_comments() {
        let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:complexType name="ParksType">
    <xsd:sequence>
      <xsd:element name="area">
        <xsd:annotation>
          <xsd:documentation><!-- generated -->Area in m2</xsd:documentation>
        </xsd:annotation>
      </xsd:element>
      <xsd:element name="name">
        <xsd:annotation>
          <xsd:documentation> Name <!-- x --> der Anlage <b>ignored</b> tail</xsd:documentation>
        </xsd:annotation>
      </xsd:element>
    </xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;
        let docs = field_documentation(schema, &layer("Parks")).into_fields();
        assert_eq!(docs.get("area").map(String::as_str), Some("Area in m2"));
        assert_eq!(docs.get("name").map(String::as_str), Some("Name  der Anlage"));
    }

    #[test]
    fn test_elements_outside_xsd_namespace_are_ignored() {
        let schema = r#"<schema xmlns="http://example.org/not-xsd">
  <complexType name="ParksType">
    <sequence><element name="id"/></sequence>
  </complexType>
</schema>"#;
        assert!(list_field_names(schema, &layer("Parks")).unwrap().is_empty());
    }
}
