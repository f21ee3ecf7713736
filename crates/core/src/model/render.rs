//! Source text generation for declarations and declaration headers.

use super::decl::{Declaration, DeclarationDetail};
use super::element::ElementBase;
use srcsync_api::{Identifier, Modifiers, Parameter, TextRange, TypeRef};

pub(crate) const INDENT_UNIT: &str = "    ";

/// Ranges of a rendered declaration, relative to the start of its text.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    pub element: TextRange,
    pub header: TextRange,
    pub javadoc: Option<TextRange>,
    pub body: Option<TextRange>,
    pub declarator: Option<TextRange>,
    /// Nested layouts of a class, in member order.
    pub children: Vec<Layout>,
}

impl Layout {
    fn shift(&mut self, by: usize) {
        let shift = |r: &mut TextRange| {
            r.begin += by;
            r.end += by;
        };
        shift(&mut self.element);
        shift(&mut self.header);
        self.javadoc.iter_mut().for_each(shift);
        self.body.iter_mut().for_each(shift);
        self.declarator.iter_mut().for_each(shift);
        for child in &mut self.children {
            child.shift(by);
        }
    }
}

pub(crate) struct Rendered {
    pub text: String,
    pub layout: Layout,
}

/// Renders `decl` as it should appear at a position whose line is indented by
/// `indent`. The first line carries no indentation of its own.
pub(crate) fn render(decl: &Declaration, indent: &str) -> Rendered {
    let mut out = String::new();
    let mut layout = Layout::default();

    if let Some(doc) = &decl.base.javadoc {
        let doc = indent_block(&javadoc_text(doc), indent);
        layout.javadoc = Some(TextRange::new(0, doc.len()));
        out.push_str(&doc);
        out.push('\n');
        out.push_str(indent);
    }
    let header_begin = out.len();

    match &decl.detail {
        DeclarationDetail::Field(field) => {
            out.push_str(&field_prefix(&decl.base, &field.type_ref));
            let begin = out.len();
            out.push_str(&declarator(decl.base.name.as_str(), field.initializer.as_deref()));
            layout.declarator = Some(TextRange::new(begin, out.len()));
            out.push(';');
            layout.header = TextRange::new(header_begin, out.len());
        }
        DeclarationDetail::Method(method) => {
            out.push_str(&method_header(
                &decl.base,
                method.type_parameters.as_deref(),
                &method.return_type,
                &method.parameters,
                &method.exceptions,
            ));
            layout.header = TextRange::new(header_begin, out.len());
            match &method.body {
                Some(body) => {
                    out.push(' ');
                    let begin = out.len();
                    out.push_str(&indent_block(body, indent));
                    layout.body = Some(TextRange::new(begin, out.len()));
                }
                None => out.push(';'),
            }
        }
        DeclarationDetail::Constructor(ctor) => {
            out.push_str(&constructor_header(
                &decl.base,
                ctor.type_parameters.as_deref(),
                &ctor.parameters,
                &ctor.exceptions,
            ));
            layout.header = TextRange::new(header_begin, out.len());
            out.push(' ');
            let begin = out.len();
            out.push_str(&indent_block(&ctor.body, indent));
            layout.body = Some(TextRange::new(begin, out.len()));
        }
        DeclarationDetail::Initializer(init) => {
            out.push_str(initializer_header(init.is_static));
            layout.header = TextRange::new(header_begin, out.len());
            let begin = out.len();
            out.push_str(&indent_block(&init.body, indent));
            layout.body = Some(TextRange::new(begin, out.len()));
        }
        DeclarationDetail::Class(class) => {
            out.push_str(&class_header(
                &decl.base,
                class.is_interface,
                class.type_parameters.as_deref(),
                class.superclass.as_ref(),
                &class.interfaces,
            ));
            layout.header = TextRange::new(header_begin, out.len());
            out.push(' ');
            let body_begin = out.len();
            out.push('{');
            let child_indent = format!("{}{}", indent, INDENT_UNIT);
            let mut previous: Option<&Declaration> = None;
            for member in &class.members {
                out.push('\n');
                let both_fields = previous.is_some_and(|p| p.as_field().is_some())
                    && member.as_field().is_some();
                if previous.is_some() && !both_fields {
                    out.push('\n');
                }
                out.push_str(&child_indent);
                let child = render(member, &child_indent);
                let mut child_layout = child.layout;
                child_layout.shift(out.len());
                out.push_str(&child.text);
                layout.children.push(child_layout);
                previous = Some(member);
            }
            out.push('\n');
            out.push_str(indent);
            out.push('}');
            layout.body = Some(TextRange::new(body_begin, out.len()));
        }
    }

    layout.element = TextRange::new(0, out.len());
    Rendered { text: out, layout }
}

/// Annotations and modifiers followed by a space, or nothing.
pub(crate) fn modifier_prefix(annotations: &[String], modifiers: Modifiers) -> String {
    let mut out = String::new();
    for annotation in annotations {
        out.push_str(annotation);
        out.push(' ');
    }
    let mods = modifiers.to_source();
    if !mods.is_empty() {
        out.push_str(&mods);
        out.push(' ');
    }
    out
}

pub(crate) fn class_header(
    base: &ElementBase,
    is_interface: bool,
    type_parameters: Option<&str>,
    superclass: Option<&Identifier>,
    interfaces: &[Identifier],
) -> String {
    let mut out = modifier_prefix(&base.annotations, base.modifiers);
    out.push_str(if is_interface { "interface " } else { "class " });
    out.push_str(base.name.as_str());
    if let Some(tp) = type_parameters {
        out.push_str(tp);
    }
    if let Some(superclass) = superclass.filter(|_| !is_interface) {
        out.push_str(" extends ");
        out.push_str(superclass.as_str());
    }
    if !interfaces.is_empty() {
        out.push_str(if is_interface { " extends " } else { " implements " });
        out.push_str(&join_identifiers(interfaces));
    }
    out
}

pub(crate) fn method_header(
    base: &ElementBase,
    type_parameters: Option<&str>,
    return_type: &TypeRef,
    parameters: &[Parameter],
    exceptions: &[Identifier],
) -> String {
    let mut out = modifier_prefix(&base.annotations, base.modifiers);
    if let Some(tp) = type_parameters {
        out.push_str(tp);
        out.push(' ');
    }
    out.push_str(&return_type.to_source());
    out.push(' ');
    out.push_str(base.name.as_str());
    push_signature_tail(&mut out, parameters, exceptions);
    out
}

pub(crate) fn constructor_header(
    base: &ElementBase,
    type_parameters: Option<&str>,
    parameters: &[Parameter],
    exceptions: &[Identifier],
) -> String {
    let mut out = modifier_prefix(&base.annotations, base.modifiers);
    if let Some(tp) = type_parameters {
        out.push_str(tp);
        out.push(' ');
    }
    out.push_str(base.name.as_str());
    push_signature_tail(&mut out, parameters, exceptions);
    out
}

fn push_signature_tail(out: &mut String, parameters: &[Parameter], exceptions: &[Identifier]) {
    out.push('(');
    let params: Vec<String> = parameters.iter().map(Parameter::to_source).collect();
    out.push_str(&params.join(", "));
    out.push(')');
    if !exceptions.is_empty() {
        out.push_str(" throws ");
        out.push_str(&join_identifiers(exceptions));
    }
}

/// Everything of a field declaration that precedes its declarator.
pub(crate) fn field_prefix(base: &ElementBase, type_ref: &TypeRef) -> String {
    let mut out = modifier_prefix(&base.annotations, base.modifiers);
    out.push_str(&type_ref.to_source());
    out.push(' ');
    out
}

pub(crate) fn declarator(name: &str, initializer: Option<&str>) -> String {
    match initializer {
        Some(init) => format!("{} = {}", name, init),
        None => name.to_string(),
    }
}

pub(crate) fn initializer_header(is_static: bool) -> &'static str {
    if is_static { "static " } else { "" }
}

fn join_identifiers(names: &[Identifier]) -> String {
    names
        .iter()
        .map(Identifier::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wraps plain text in a doc comment; comment text is kept as is.
pub(crate) fn javadoc_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("/**") {
        return trimmed.to_string();
    }
    let mut out = String::from("/**\n");
    for line in trimmed.lines() {
        if line.trim().is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(" * ");
            out.push_str(line.trim());
            out.push('\n');
        }
    }
    out.push_str(" */");
    out
}

/// Prefixes every line but the first with `indent`.
pub(crate) fn indent_block(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Inverse of [`indent_block`]: strips up to `indent` from every line but the
/// first.
pub(crate) fn dedent_block(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            let line = line.strip_prefix(indent).unwrap_or_else(|| {
                let ws = line
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .count()
                    .min(indent.len());
                &line[ws..]
            });
            out.push_str(line);
        } else {
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_method_layout() {
        let decl = Declaration::method(
            "run",
            TypeRef::void(),
            vec![Parameter::new("x", TypeRef::raw("int"))],
        )
        .with_modifiers(Modifiers::PUBLIC)
        .with_body("{\n    go();\n}");
        let rendered = render(&decl, "    ");
        assert_eq!(rendered.text, "public void run(int x) {\n        go();\n    }");
        let header = rendered.layout.header;
        assert_eq!(&rendered.text[header.begin..header.end], "public void run(int x)");
        let body = rendered.layout.body.unwrap();
        assert!(rendered.text[body.begin..body.end].starts_with('{'));
        assert!(rendered.text[body.begin..body.end].ends_with('}'));
    }

    #[test]
    fn test_render_field_declarator() {
        let decl = Declaration::field("count", TypeRef::raw("int"))
            .with_modifiers(Modifiers::PRIVATE)
            .with_initializer("0");
        let rendered = render(&decl, "");
        assert_eq!(rendered.text, "private int count = 0;");
        let d = rendered.layout.declarator.unwrap();
        assert_eq!(&rendered.text[d.begin..d.end], "count = 0");
    }

    #[test]
    fn test_render_class_with_children() {
        let decl = Declaration::class("A")
            .with_interfaces(vec![Identifier::new("I")])
            .with_member(Declaration::field("x", TypeRef::raw("int")))
            .with_member(Declaration::field("y", TypeRef::raw("int")))
            .with_member(Declaration::abstract_method("m", TypeRef::void(), vec![]));
        let rendered = render(&decl, "");
        assert_eq!(
            rendered.text,
            "class A implements I {\n    int x;\n    int y;\n\n    void m();\n}"
        );
        assert_eq!(rendered.layout.children.len(), 3);
        let m = &rendered.layout.children[2];
        assert_eq!(&rendered.text[m.element.begin..m.element.end], "void m();");
    }

    #[test]
    fn test_render_javadoc_first() {
        let decl = Declaration::field("x", TypeRef::raw("int")).with_javadoc("The x.");
        let rendered = render(&decl, "  ");
        assert_eq!(rendered.text, "/**\n   * The x.\n   */\n  int x;");
        let header = rendered.layout.header;
        assert_eq!(&rendered.text[header.begin..header.end], "int x;");
    }

    #[test]
    fn test_indent_round_trip() {
        let body = "{\n    return 1;\n}";
        let indented = indent_block(body, "    ");
        assert_eq!(indented, "{\n        return 1;\n    }");
        assert_eq!(dedent_block(&indented, "    "), body);
    }

    #[test]
    fn test_static_initializer_header() {
        let rendered = render(&Declaration::initializer(true), "");
        assert_eq!(rendered.text, "static {\n}");
        let header = rendered.layout.header;
        assert_eq!(&rendered.text[header.begin..header.end], "static ");
    }
}
