//! Rewriting the selected markup and generating component text

use crate::ast::{ByteRange, ParsedDocument};
use crate::props::{PropValue, PropertySet, Synthesis};
use carve_foundation::{CarveError, CarveResult};
use once_cell::sync::Lazy;
use regex::Regex;
use swc_ecma_ast::Expr;

/// Shape of the generated component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStyle {
    /// `const Name = (props) => (...)`
    Function,
    /// `export class Name extends React.Component { render() { ... } }`
    Class,
}

/// Text settings for generated components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTemplate {
    /// Base class of class-form components
    pub base_component: String,
    /// One level of indentation
    pub indent: String,
    /// Parameter name of function-form components
    pub props_name: String,
}

impl Default for ComponentTemplate {
    fn default() -> Self {
        Self {
            base_component: "React.Component".to_string(),
            indent: "    ".to_string(),
            props_name: "props".to_string(),
        }
    }
}

impl ComponentTemplate {
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = " ".repeat(width);
        self
    }

    /// `props.a.b`, or `this.props.a.b` for class components
    pub fn props_access(&self, style: ComponentStyle, path: &[String]) -> String {
        let object = match style {
            ComponentStyle::Function => self.props_name.as_str(),
            ComponentStyle::Class => "this.props",
        };
        std::iter::once(object)
            .chain(path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug)]
struct Splice {
    range: ByteRange,
    text: String,
}

/// Removal range of an attribute, widened over the whitespace separating it from its predecessor
fn attribute_removal(source: &str, attr: ByteRange, floor: usize) -> ByteRange {
    let leading = source
        .get(floor..attr.start)
        .map(|prefix| prefix.len() - prefix.trim_end().len())
        .unwrap_or(0);
    ByteRange::new(attr.start - leading, attr.end)
}

/// Whitespace indentation of the line `offset` sits on, in characters
fn line_indent(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

/// Strip up to `width` leading whitespace characters from every line but the first
fn dedent_tail(text: &str, width: usize) -> String {
    let mut lines = text.split('\n');
    let mut out: Vec<String> = lines.next().map(str::to_string).into_iter().collect();
    for line in lines {
        let strip = line
            .char_indices()
            .take(width)
            .take_while(|(_, c)| *c == ' ' || *c == '\t')
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        out.push(line[strip..].to_string());
    }
    out.join("\n")
}

/// Source of the selected markup with every reference replaced by a props access
///
/// Substitution and removal ranges must lie inside `target` and must not
/// overlap. Continuation lines lose the indentation of the line the markup
/// starts on.
pub fn rewrite_markup(
    document: &ParsedDocument,
    target: ByteRange,
    synthesis: &Synthesis,
    template: &ComponentTemplate,
    style: ComponentStyle,
) -> CarveResult<String> {
    let source = document.text().as_str();
    let mut splices: Vec<Splice> = synthesis
        .substitutions
        .iter()
        .map(|substitution| {
            let access = template.props_access(style, &substitution.path);
            Splice {
                range: document.range_of(substitution.span),
                text: match &substitution.shorthand {
                    Some(key) => format!("{}: {}", key, access),
                    None => access,
                },
            }
        })
        .collect();
    if let Some(span) = synthesis.removed_attr {
        splices.push(Splice {
            range: attribute_removal(source, document.range_of(span), target.start),
            text: String::new(),
        });
    }

    splices.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut text = source
        .get(target.start..target.end)
        .ok_or_else(|| CarveError::internal(format!("Markup range {:?} is out of bounds", target)))?
        .to_string();
    let mut floor = target.end;
    for splice in &splices {
        if !target.contains(splice.range) || splice.range.end > floor {
            return Err(CarveError::internal(format!(
                "Rewrite of {:?} overlaps another rewrite or leaves the markup",
                splice.range
            )));
        }
        text.replace_range(
            splice.range.start - target.start..splice.range.end - target.start,
            &splice.text,
        );
        floor = splice.range.start;
    }

    Ok(dedent_tail(&text, line_indent(source, target.start)))
}

fn indent_block(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid regex"));

/// True when `name` appears in `body` as a whole identifier
fn mentions(body: &str, name: &str) -> bool {
    IDENTIFIER.find_iter(body).any(|word| word.as_str() == name)
}

/// Arrow-function component; takes the props parameter only when the body uses it
pub fn generate_function_component(name: &str, body: &str, template: &ComponentTemplate) -> String {
    let param = if mentions(body, &template.props_name) {
        template.props_name.as_str()
    } else {
        ""
    };

    format!(
        "const {name} = ({param}) => (\n{body}\n);\n",
        name = name,
        param = param,
        body = indent_block(body, &template.indent)
    )
}

/// Exported class component with a props-forwarding constructor
pub fn generate_class_component(name: &str, body: &str, template: &ComponentTemplate) -> String {
    let i1 = template.indent.as_str();
    let i2 = i1.repeat(2);
    format!(
        "export class {name} extends {base} {{\n\
         {i1}constructor(props) {{\n\
         {i2}super(props);\n\
         {i1}}}\n\
         \n\
         {i1}render() {{\n\
         {i2}return (\n\
         {body}\n\
         {i2});\n\
         {i1}}}\n\
         }}\n",
        name = name,
        base = template.base_component,
        i1 = i1,
        i2 = i2,
        body = indent_block(body, &i1.repeat(3))
    )
}

/// Self-closing element passing every staged prop, in staging order
pub fn render_replacement(
    name: &str,
    props: &PropertySet,
    print: impl Fn(&Expr) -> CarveResult<String>,
) -> CarveResult<String> {
    let mut attributes = String::new();
    for property in props.iter() {
        let value = match &property.value {
            PropValue::Expr(expr) => format!("{{{}}}", print(expr)?),
            PropValue::Raw(raw) => raw.clone(),
        };
        attributes.push(' ');
        attributes.push_str(&property.name);
        attributes.push('=');
        attributes.push_str(&value);
    }
    Ok(format!("<{}{} />", name, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{parse_document, print_expr};
    use crate::props::Property;
    use pretty_assertions::assert_eq;
    use swc_common::{sync::Lrc, FilePathMapping, SourceMap, SyntaxContext, DUMMY_SP};
    use swc_ecma_ast::Ident;

    #[test]
    fn test_props_access() {
        let template = ComponentTemplate::default();
        let path = vec!["user".to_string(), "name".to_string()];
        assert_eq!(
            template.props_access(ComponentStyle::Function, &path),
            "props.user.name"
        );
        assert_eq!(
            template.props_access(ComponentStyle::Class, &path),
            "this.props.user.name"
        );

        let custom = ComponentTemplate {
            props_name: "p".to_string(),
            ..ComponentTemplate::default()
        };
        assert_eq!(custom.props_access(ComponentStyle::Function, &[]), "p");
    }

    #[test]
    fn test_dedent_tail_keeps_relative_indentation() {
        let text = "<ul>\n        <li />\n      </ul>";
        assert_eq!(dedent_tail(text, 6), "<ul>\n  <li />\n</ul>");
        assert_eq!(dedent_tail("<a>\n  x\n</a>", 8), "<a>\nx\n</a>");
    }

    #[test]
    fn test_attribute_removal_takes_leading_space() {
        let source = "<li key={a} id=\"x\" />";
        let start = source.find("key").unwrap();
        let attr = ByteRange::new(start, start + "key={a}".len());
        assert_eq!(attribute_removal(source, attr, 0), ByteRange::new(3, attr.end));
    }

    #[test]
    fn test_rewrite_markup_without_substitutions_is_verbatim() {
        let source = "const A = () => (\n  <div>\n    <b>hi</b>\n  </div>\n);\n";
        let document = parse_document(source).unwrap();
        let start = source.find("<div>").unwrap();
        let end = source.find("</div>").unwrap() + "</div>".len();
        let text = rewrite_markup(
            &document,
            ByteRange::new(start, end),
            &Synthesis::default(),
            &ComponentTemplate::default(),
            ComponentStyle::Function,
        )
        .unwrap();
        assert_eq!(text, "<div>\n  <b>hi</b>\n</div>");
    }

    #[test]
    fn test_function_component_without_props() {
        let template = ComponentTemplate::default();
        let text = generate_function_component("Header", "<h1>Title</h1>", &template);
        assert_eq!(text, "const Header = () => (\n    <h1>Title</h1>\n);\n");
    }

    #[test]
    fn test_function_component_with_props() {
        let template = ComponentTemplate::default();
        let text = generate_function_component("Row", "<tr>\n  <td>{props.name}</td>\n</tr>", &template);
        assert_eq!(
            text,
            "const Row = (props) => (\n    <tr>\n      <td>{props.name}</td>\n    </tr>\n);\n"
        );
    }

    #[test]
    fn test_props_detection_is_word_bounded() {
        let template = ComponentTemplate::default();
        let text = generate_function_component("Tip", "<p>{propsal}</p>", &template);
        assert!(text.starts_with("const Tip = () =>"));

        assert!(mentions("<p>{props.tip}</p>", "props"));
        assert!(!mentions("<p>{$props.tip}</p>", "props"));
        assert!(!mentions("<p>{props_1}</p>", "props"));
    }

    #[test]
    fn test_class_component_layout() {
        let template = ComponentTemplate::default().with_indent_width(2);
        let text = generate_class_component("Counter", "<div>{this.props.count}</div>", &template);
        assert_eq!(
            text,
            "export class Counter extends React.Component {\n  constructor(props) {\n    super(props);\n  }\n\n  render() {\n    return (\n      <div>{this.props.count}</div>\n    );\n  }\n}\n"
        );
    }

    #[test]
    fn test_replacement_lists_props_in_order() {
        let cm = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let mut props = PropertySet::default();
        props.stage(Property {
            name: "key".to_string(),
            value: PropValue::Raw("\"a\"".to_string()),
            rendered: "\"a\"".to_string(),
        });
        props.stage(Property {
            name: "count".to_string(),
            value: PropValue::Expr(Box::new(Expr::Ident(Ident::new(
                "count".into(),
                DUMMY_SP,
                SyntaxContext::empty(),
            )))),
            rendered: "count".to_string(),
        });

        let text = render_replacement("Extracted", &props, |expr| print_expr(&cm, expr)).unwrap();
        assert_eq!(text, "<Extracted key=\"a\" count={count} />");

        let empty = render_replacement("Extracted", &PropertySet::default(), |expr| {
            print_expr(&cm, expr)
        })
        .unwrap();
        assert_eq!(empty, "<Extracted />");
    }
}
