use srcsync_api::{Modifiers, ParseTree, SourceParser, TypeRef};
use srcsync_java::JavaParser;

fn parse(source: &str) -> ParseTree {
    let outcome = JavaParser::new().unwrap().parse(source);
    assert_eq!(outcome.error_count, 0, "unexpected syntax errors");
    outcome.tree.unwrap()
}

fn slice(source: &str, begin: usize, end: usize) -> &str {
    &source[begin..end]
}

#[test]
fn test_package_and_imports() {
    let source = "package a.b;\n\nimport java.util.List;\nimport static java.lang.Math.max;\nimport java.io.*;\n\nclass A {\n}\n";
    let tree = parse(source);
    assert_eq!(tree.package.as_ref().unwrap().as_str(), "a.b");
    assert_eq!(tree.imports.len(), 3);
    assert_eq!(tree.imports[0].name.as_str(), "java.util.List");
    assert!(!tree.imports[0].is_static);
    assert!(tree.imports[1].is_static);
    assert!(tree.imports[2].on_demand);
    assert_eq!(tree.imports[2].name.as_str(), "java.io");
}

#[test]
fn test_class_header_and_body_spans() {
    let source = "/** Doc. */\npublic class A extends B implements I, J<String> {\n}\n";
    let tree = parse(source);
    let class = &tree.classes[0];
    assert_eq!(class.name, "A");
    assert_eq!(class.modifiers, Modifiers::PUBLIC);
    assert_eq!(class.superclass.as_ref().unwrap().as_str(), "B");
    let interfaces: Vec<&str> = class.interfaces.iter().map(|i| i.as_str()).collect();
    assert_eq!(interfaces, vec!["I", "J<String>"]);
    assert_eq!(class.javadoc.as_deref(), Some("/** Doc. */"));

    let span = class.span;
    assert_eq!(span.begin, 0);
    assert_eq!(
        slice(source, span.header_begin, span.header_end),
        "public class A extends B implements I, J<String>"
    );
    let body = span.body.unwrap();
    assert_eq!(slice(source, body.begin, body.end), "{\n}");
    assert_eq!(span.end, source.len() - 1);
}

#[test]
fn test_interface_extends_list() {
    let tree = parse("interface I extends J, K {\n    void m();\n    default int n() { return 1; }\n    static void s() {}\n}\n");
    let iface = &tree.classes[0];
    assert!(iface.is_interface);
    assert_eq!(iface.interfaces.len(), 2);
    assert_eq!(iface.methods.len(), 3);
    assert!(iface.methods[0].body.is_none());
    assert!(iface.methods[1].modifiers.contains(Modifiers::DEFAULT));
    assert!(iface.methods[2].modifiers.contains(Modifiers::STATIC));
}

#[test]
fn test_method_spans_and_signature() {
    let source = "class A {\n    @Override\n    protected <T> List<T> load(final String name, int... ids) throws IOException, E {\n        return null;\n    }\n    abstract void run();\n}\n";
    let tree = parse(source);
    let class = &tree.classes[0];
    let load = &class.methods[0];
    assert_eq!(load.name, "load");
    assert_eq!(load.annotations, vec!["@Override".to_string()]);
    assert_eq!(load.modifiers, Modifiers::PROTECTED);
    assert_eq!(load.type_parameters.as_deref(), Some("<T>"));
    assert_eq!(load.return_type.to_source(), "List<T>");
    assert_eq!(load.parameters.len(), 2);
    assert!(load.parameters[0].is_final);
    assert_eq!(load.parameters[0].type_ref, TypeRef::raw("String"));
    assert_eq!(load.parameters[1].type_ref.to_source(), "int...");
    assert_eq!(load.parameters[1].name, "ids");
    let exceptions: Vec<&str> = load.exceptions.iter().map(|e| e.as_str()).collect();
    assert_eq!(exceptions, vec!["IOException", "E"]);
    assert_eq!(
        slice(source, load.span.header_begin, load.span.header_end),
        "@Override\n    protected <T> List<T> load(final String name, int... ids) throws IOException, E"
    );
    assert_eq!(
        load.body.as_deref(),
        Some("{\n        return null;\n    }")
    );

    let run = &class.methods[1];
    assert!(run.body.is_none());
    assert_eq!(
        slice(source, run.span.header_begin, run.span.header_end),
        "abstract void run()"
    );
    assert_eq!(slice(source, run.span.begin, run.span.end), "abstract void run();");
}

#[test]
fn test_field_groups_share_statement() {
    let source = "class A {\n    private int a, b = 2, c;\n    String s;\n    long x, y;\n}\n";
    let tree = parse(source);
    let fields = &tree.classes[0].fields;
    assert_eq!(fields.len(), 6);

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "s", "x", "y"]);
    assert_eq!(fields[0].group, Some(0));
    assert_eq!(fields[2].group, Some(0));
    assert_eq!(fields[3].group, None);
    assert_eq!(fields[4].group, Some(1));

    assert_eq!(fields[0].span, fields[1].span);
    assert_eq!(
        slice(source, fields[0].span.header_begin, fields[0].span.header_end),
        "private int a, b = 2, c;"
    );
    assert_eq!(
        slice(source, fields[1].declarator.begin, fields[1].declarator.end),
        "b = 2"
    );
    assert_eq!(fields[1].initializer.as_deref(), Some("2"));
    assert_eq!(fields[1].modifiers, Modifiers::PRIVATE);
}

#[test]
fn test_initializers_and_nested_classes() {
    let source = "class A {\n    static {\n        init();\n    }\n    {\n    }\n    A(int x) {\n    }\n    static class B {\n    }\n}\n";
    let tree = parse(source);
    let class = &tree.classes[0];
    assert_eq!(class.initializers.len(), 2);

    let stat = &class.initializers[0];
    assert!(stat.is_static);
    assert_eq!(slice(source, stat.span.header_begin, stat.span.header_end), "static ");
    assert_eq!(stat.body, "{\n        init();\n    }");

    let inst = &class.initializers[1];
    assert!(!inst.is_static);
    assert_eq!(inst.span.header_begin, inst.span.header_end);

    assert_eq!(class.constructors.len(), 1);
    assert_eq!(class.constructors[0].parameters.len(), 1);
    assert_eq!(class.classes.len(), 1);
    assert_eq!(class.classes[0].name, "B");
    assert!(class.classes[0].modifiers.contains(Modifiers::STATIC));
}

#[test]
fn test_javadoc_must_be_adjacent() {
    let source = "class A {\n    /** Counter. */\n    int n;\n    /** Detached. */\n    // note\n    int m;\n}\n";
    let tree = parse(source);
    let fields = &tree.classes[0].fields;
    assert_eq!(fields[0].javadoc.as_deref(), Some("/** Counter. */"));
    let doc = fields[0].span.javadoc.unwrap();
    assert_eq!(fields[0].span.begin, doc.begin);
    assert!(fields[1].javadoc.is_none());
}

#[test]
fn test_tree_serializes_to_json() {
    let tree = parse("class A {\n    void m() {\n    }\n}\n");
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["classes"][0]["name"], "A");
    assert_eq!(json["classes"][0]["methods"][0]["name"], "m");
}
