use carve_lang_jsx::{
    extract, extract_with, parse_document, plan_extract_component, plan_extract_to_file,
    ComponentStyle, ComponentTemplate, ExtractSettings, Selection,
};
use pretty_assertions::assert_eq;

/// Character range of the first occurrence of `selected` in `source`
fn select(source: &str, selected: &str) -> Selection {
    let byte = source
        .find(selected)
        .unwrap_or_else(|| panic!("'{}' not found in source", selected));
    let start = source[..byte].chars().count();
    Selection::new(start, start + selected.chars().count())
}

fn extract_function(source: &str, selected: &str) -> carve_lang_jsx::RefactorResult {
    let selection = select(source, selected);
    extract("Extracted", source, selection.start, selection.end, false).unwrap()
}

const COUNTER: &str = r#"import React from 'react';

class Counter extends React.Component {
  render() {
    return (
      <section>
        <div>{this.state.count}</div>
      </section>
    );
  }
}
"#;

#[test]
fn test_class_state_member_becomes_prop() {
    let result = extract_function(COUNTER, "<div>{this.state.count}</div>");

    assert_eq!(result.replacement_text, "<Extracted count={this.state.count} />");
    assert_eq!(
        result.new_component_text,
        "const Extracted = (props) => (\n    <div>{props.count}</div>\n);\n"
    );
    assert_eq!(result.insert_offset, COUNTER.find("class Counter").unwrap());
}

#[test]
fn test_class_form_reads_from_this_props() {
    let selection = select(COUNTER, "<div>{this.state.count}</div>");
    let result = extract("Count", COUNTER, selection.start, selection.end, true).unwrap();

    assert_eq!(result.replacement_text, "<Count count={this.state.count} />");
    assert!(result
        .new_component_text
        .starts_with("export class Count extends React.Component {\n"));
    assert!(result
        .new_component_text
        .contains("            <div>{this.props.count}</div>\n"));
}

#[test]
fn test_map_item_collapses_to_one_prop() {
    let source = r#"
const List = ({ items }) => (
  <ul>
    {items.map(item => (
      <div>
        <li>{item.name}</li>{item.value}
      </div>
    ))}
  </ul>
);
"#;
    let result = extract_function(source, "<li>{item.name}</li>{item.value}");

    assert_eq!(result.replacement_text, "<Extracted item={item} />");
    assert_eq!(
        result.new_component_text,
        "const Extracted = (props) => (\n    <><li>{props.item.name}</li>{props.item.value}</>\n);\n"
    );
}

#[test]
fn test_bound_method_is_passed_whole() {
    let source = r#"
class Toolbar extends React.Component {
  handleClick() {}

  render() {
    return (
      <div>
        <button onClick={this.handleClick.bind(this)}>Save</button>
      </div>
    );
  }
}
"#;
    let result = extract_function(
        source,
        "<button onClick={this.handleClick.bind(this)}>Save</button>",
    );

    assert_eq!(
        result.replacement_text,
        "<Extracted handleClick={this.handleClick.bind(this)} />"
    );
    assert!(result
        .new_component_text
        .contains("<button onClick={props.handleClick}>Save</button>"));
}

#[test]
fn test_plain_text_is_an_invalid_selection() {
    let source = "const Label = () => <span>Save changes</span>;\n";
    let selection = select(source, "Save changes");
    let err = extract("Extracted", source, selection.start, selection.end, false).unwrap_err();

    assert_eq!(err.code(), "E_INVALID_SELECTION");
    assert_eq!(err.user_message(), "Invalid JSX selected");
}

#[test]
fn test_markup_outside_a_component_is_rejected() {
    let source = "const element = <div><span>hi</span></div>;\n";
    let selection = select(source, "<span>hi</span>");
    let err = extract("Extracted", source, selection.start, selection.end, false).unwrap_err();

    assert_eq!(err.code(), "E_INVALID_COMPONENT");
}

#[test]
fn test_key_moves_to_the_replacement() {
    let source = r#"
const List = ({ items }) => (
  <ul>
    {items.map(item => <li key={item.id}>{item.name}</li>)}
  </ul>
);
"#;
    let result = extract_function(source, "<li key={item.id}>{item.name}</li>");

    assert_eq!(
        result.replacement_text,
        "<Extracted key={item.id} item={item} />"
    );
    assert_eq!(
        result.new_component_text,
        "const Extracted = (props) => (\n    <li>{props.item.name}</li>\n);\n"
    );
}

#[test]
fn test_self_contained_markup_needs_no_props() {
    let source = r#"
function Page() {
  return (
    <main>
      <h1>Title</h1>
    </main>
  );
}
"#;
    let selection = select(source, "<h1>Title</h1>");
    let result = extract("Header", source, selection.start, selection.end, false).unwrap();

    assert_eq!(result.replacement_text, "<Header />");
    assert_eq!(
        result.new_component_text,
        "const Header = () => (\n    <h1>Title</h1>\n);\n"
    );
    assert_eq!(result.insert_offset, source.find("function Page").unwrap());
}

#[test]
fn test_colliding_names_are_made_unique() {
    let source = r#"
const Card = (props) => (
  <div>
    <p>{props.user.name} {props.team.name}</p>
  </div>
);
"#;
    let result = extract_function(source, "<p>{props.user.name} {props.team.name}</p>");

    assert_eq!(
        result.replacement_text,
        "<Extracted name={props.user.name} _name={props.team.name} />"
    );
    assert!(result
        .new_component_text
        .contains("<p>{props.name} {props._name}</p>"));
}

#[test]
fn test_shared_prefix_becomes_one_container_prop() {
    let source = r#"
const Row = ({ order }) => (
  <tr>
    <td title={order.id}>{order.customer.name} / {order.customer.email}</td>
  </tr>
);
"#;
    let result = extract_function(
        source,
        "<td title={order.id}>{order.customer.name} / {order.customer.email}</td>",
    );

    assert_eq!(
        result.replacement_text,
        "<Extracted id={order.id} customer={order.customer} />"
    );
    assert!(result.new_component_text.contains(
        "<td title={props.id}>{props.customer.name} / {props.customer.email}</td>"
    ));
}

#[test]
fn test_multiline_selection_keeps_relative_layout() {
    let source = r#"
const Profile = ({ user }) => (
  <article>
    <header>
      <h2>{user.name}</h2>
    </header>
  </article>
);
"#;
    let result = extract_function(
        source,
        "<header>\n      <h2>{user.name}</h2>\n    </header>",
    );

    assert_eq!(
        result.new_component_text,
        "const Extracted = (props) => (\n    <header>\n      <h2>{props.name}</h2>\n    </header>\n);\n"
    );
}

#[test]
fn test_custom_props_name() {
    let template = ComponentTemplate {
        props_name: "p".to_string(),
        ..ComponentTemplate::default()
    };
    let selection = select(COUNTER, "<div>{this.state.count}</div>");
    let result = extract_with(
        "Extracted",
        COUNTER,
        selection,
        ComponentStyle::Function,
        &template,
    )
    .unwrap();

    assert_eq!(
        result.new_component_text,
        "const Extracted = (p) => (\n    <div>{p.count}</div>\n);\n"
    );
}

#[test]
fn test_applied_plan_parses_and_reads_props() {
    let selection = select(COUNTER, "<div>{this.state.count}</div>");
    let plan = plan_extract_component(
        COUNTER,
        selection,
        "Extracted",
        "src/Counter.jsx",
        &ExtractSettings::default(),
    )
    .unwrap();

    assert_eq!(plan.metadata.intent_name, "extract_component");
    assert_eq!(plan.edits.len(), 2);

    let output = plan.apply_to_source(COUNTER).unwrap();
    assert!(output.contains(
        "const Extracted = (props) => (\n    <div>{props.count}</div>\n);\n\n\nclass Counter"
    ));
    assert!(output.contains("<section>\n        <Extracted count={this.state.count} />\n      </section>"));
    assert!(parse_document(&output).is_ok());
}

#[test]
fn test_extract_to_file_plan() {
    let source = r#"const Page = ({ title }) => (
  <main>
    <h1>{title}</h1>
  </main>
);
"#;
    let selection = select(source, "<h1>{title}</h1>");
    let plan = plan_extract_to_file(
        source,
        selection,
        "Title",
        "src/pages/Page.tsx",
        "typescriptreact",
        &ExtractSettings::default(),
    )
    .unwrap();

    let created: Vec<(&str, &str)> = plan.created_files().collect();
    assert_eq!(created.len(), 1);
    let (path, contents) = created[0];
    assert_eq!(path, "src/pages/Title.tsx");
    assert!(contents.starts_with(
        "import React from \"react\";\nexport class Title extends React.Component {\n"
    ));
    assert!(contents.contains("<h1>{this.props.title}</h1>"));

    let output = plan.apply_to_source(source).unwrap();
    assert!(output.starts_with("import { Title } from './Title';\nconst Page"));
    assert!(output.contains("<main>\n    <Title title={title} />\n  </main>"));
    assert!(parse_document(&output).is_ok());
}

#[test]
fn test_unknown_language_cannot_extract_to_file() {
    let source = "const Page = () => <main><h1>Hi</h1></main>;\n";
    let selection = select(source, "<h1>Hi</h1>");
    let err = plan_extract_to_file(
        source,
        selection,
        "Title",
        "src/Page.vue",
        "vue",
        &ExtractSettings::default(),
    )
    .unwrap_err();

    assert_eq!(err.code(), "E_INVALID_INPUT");
}

#[test]
fn test_document_with_byte_order_mark() {
    let source = "\u{feff}const Badge = ({ label }) => (\n  <div>\n    <b>{label}</b>\n  </div>\n);\n";
    let result = extract_function(source, "<b>{label}</b>");

    assert_eq!(result.replacement_text, "<Extracted label={label} />");
    assert_eq!(
        result.new_component_text,
        "const Extracted = (props) => (\n    <b>{props.label}</b>\n);\n"
    );
    // Character offset just past the mark
    assert_eq!(result.insert_offset, 1);
}

#[test]
fn test_malformed_document_is_a_parse_error() {
    let source = "const Broken = () => (\n  <div>\n    <span>hi</span>\n  </div>\n;\n";
    let selection = select(source, "<span>hi</span>");
    let err = extract("Extracted", source, selection.start, selection.end, false).unwrap_err();

    assert_eq!(err.code(), "E_PARSE");
}

#[test]
fn test_deep_chain_shares_topmost_container() {
    let source = r#"
const Tree = ({ a }) => (
  <div>
    <p>{a.b.c.d}{a.b.c.e}{a.b.x}{a.b.y}</p>
  </div>
);
"#;
    let result = extract_function(source, "<p>{a.b.c.d}{a.b.c.e}{a.b.x}{a.b.y}</p>");

    assert_eq!(result.replacement_text, "<Extracted b={a.b} />");
    assert!(result
        .new_component_text
        .contains("<p>{props.b.c.d}{props.b.c.e}{props.b.x}{props.b.y}</p>"));
}
