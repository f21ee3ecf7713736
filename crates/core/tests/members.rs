mod common;

use common::{class, context, member, member_names, open};
use srcsync_api::{ElementKind, Identifier, Modifiers, Parameter, TypeRef};
use srcsync_core::SyncError;
use srcsync_core::model::{CollectionChange, CollectionRef, Declaration, InterfacesChange};

#[test]
fn test_removing_a_grouped_field_keeps_the_statement() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    int a, b, c;\n}\n");
    let file = coord.file().clone();
    let (a, fa, fb, fc) = {
        let model = file.read();
        let a = class(&model, "A");
        (
            a,
            member(&model, a, ElementKind::Field, "a"),
            member(&model, a, ElementKind::Field, "b"),
            member(&model, a, ElementKind::Field, "c"),
        )
    };

    file.edit(|model| {
        model.change_members(
            CollectionRef::of(a, ElementKind::Field),
            CollectionChange::Remove(vec![fb]),
        )
    })
    .unwrap();

    assert_eq!(file.document().text(), "class A {\n    int a, c;\n}\n");
    {
        let model = file.read();
        assert!(!model.is_valid(fb));
        let first = model.element(fa).unwrap().as_field().unwrap().clone();
        let last = model.element(fc).unwrap().as_field().unwrap().clone();
        assert_eq!(first.next_in_group, Some(fc));
        assert_eq!(last.previous_in_group, Some(fa));
        assert_eq!(model.element(fc).unwrap().source_text().unwrap(), "int a, c;");
    }

    let report = coord.reparse_now().unwrap();
    assert!(report.changes.is_empty());
    let model = file.read();
    assert_eq!(member(&model, a, ElementKind::Field, "a"), fa);
    assert_eq!(member(&model, a, ElementKind::Field, "c"), fc);
}

#[test]
fn test_removing_the_first_grouped_field() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    int a, b;\n}\n");
    let file = coord.file().clone();
    let (a, fa) = {
        let model = file.read();
        let a = class(&model, "A");
        (a, member(&model, a, ElementKind::Field, "a"))
    };

    file.edit(|model| {
        model.change_members(
            CollectionRef::of(a, ElementKind::Field),
            CollectionChange::Remove(vec![fa]),
        )
    })
    .unwrap();
    assert_eq!(file.document().text(), "class A {\n    int b;\n}\n");
    assert!(coord.reparse_now().unwrap().changes.is_empty());
}

#[test]
fn test_retyping_a_grouped_field_splits_it_out() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    int a, b, c;\n}\n");
    let file = coord.file().clone();
    let (a, fa, fb, fc) = {
        let model = file.read();
        let a = class(&model, "A");
        (
            a,
            member(&model, a, ElementKind::Field, "a"),
            member(&model, a, ElementKind::Field, "b"),
            member(&model, a, ElementKind::Field, "c"),
        )
    };

    file.edit(|model| model.set_field_type(fb, TypeRef::raw("long"))).unwrap();

    assert_eq!(file.document().text(), "class A {\n    int a, c;\n    long b;\n}\n");
    {
        let model = file.read();
        let first = model.element(fa).unwrap().as_field().unwrap().clone();
        let moved = model.element(fb).unwrap().as_field().unwrap().clone();
        assert_eq!(first.next_in_group, Some(fc));
        assert!(!moved.is_grouped());
        assert_eq!(model.element(fb).unwrap().source_text().unwrap(), "long b;");
    }

    coord.reparse_now().unwrap();
    let model = file.read();
    assert_eq!(member(&model, a, ElementKind::Field, "a"), fa);
    assert_eq!(member(&model, a, ElementKind::Field, "b"), fb);
    assert_eq!(member(&model, a, ElementKind::Field, "c"), fc);
    assert_eq!(
        model.element(fb).unwrap().as_field().unwrap().type_ref,
        TypeRef::raw("long")
    );
}

#[test]
fn test_refused_split_leaves_the_group_alone() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    int a, b, c;\n}\n");
    let file = coord.file().clone();
    let (fa, fb) = {
        let model = file.read();
        let a = class(&model, "A");
        (
            member(&model, a, ElementKind::Field, "a"),
            member(&model, a, ElementKind::Field, "b"),
        )
    };

    file.document().set_read_only(true);
    let err = file
        .edit(|model| model.set_modifiers(fb, Modifiers::PRIVATE))
        .unwrap_err();
    assert!(matches!(err, SyncError::Structural(_)));

    assert_eq!(file.document().text(), "class A {\n    int a, b, c;\n}\n");
    let model = file.read();
    let moved = model.element(fb).unwrap();
    assert_eq!(moved.modifiers(), Modifiers::empty());
    assert_eq!(moved.as_field().unwrap().previous_in_group, Some(fa));
    assert_eq!(moved.source_text().unwrap(), "int a, b, c;");
}

#[test]
fn test_set_replaces_every_member() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    int a;\n    int b;\n}\n");
    let file = coord.file().clone();
    let (a, old) = {
        let model = file.read();
        let a = class(&model, "A");
        (a, model.members(CollectionRef::of(a, ElementKind::Field)).unwrap())
    };

    let created = file
        .edit(|model| {
            model.change_members(
                CollectionRef::of(a, ElementKind::Field),
                CollectionChange::Set(vec![
                    Declaration::field("x", TypeRef::raw("int")),
                    Declaration::field("y", TypeRef::raw("String")).with_initializer("\"y\""),
                ]),
            )
        })
        .unwrap();

    {
        let model = file.read();
        assert_eq!(model.members(CollectionRef::of(a, ElementKind::Field)).unwrap(), created);
        assert!(old.iter().all(|id| !model.is_valid(*id)));
        assert_eq!(member_names(&model, a, ElementKind::Field), vec!["x", "y"]);
    }
    let text = file.document().text();
    assert!(text.contains("int x;"));
    assert!(text.contains("String y = \"y\";"));

    let report = coord.reparse_now().unwrap();
    assert!(report.changes.is_empty());
    let model = file.read();
    assert_eq!(model.members(CollectionRef::of(a, ElementKind::Field)).unwrap(), created);
}

#[test]
fn test_added_members_land_in_kind_order() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    int a;\n\n    void run() {\n    }\n}\n");
    let file = coord.file().clone();
    let a = class(&file.read(), "A");

    file.edit(|model| {
        model.change_members(
            CollectionRef::of(a, ElementKind::Field),
            CollectionChange::Add(vec![Declaration::field("b", TypeRef::raw("long"))]),
        )?;
        model.change_members(
            CollectionRef::of(a, ElementKind::Constructor),
            CollectionChange::Add(vec![Declaration::constructor("ignored", Vec::new())
                .with_modifiers(Modifiers::PUBLIC)]),
        )?;
        model.change_members(
            CollectionRef::of(a, ElementKind::Method),
            CollectionChange::Add(vec![Declaration::abstract_method(
                "stop",
                TypeRef::void(),
                Vec::new(),
            )
            .with_body("{\n    run();\n}")]),
        )
    })
    .unwrap();

    assert_eq!(
        file.document().text(),
        "class A {\n    int a;\n    long b;\n\n    public A() {\n    }\n\n    void run() {\n    }\n\n    void stop() {\n        run();\n    }\n}\n"
    );
    assert!(coord.reparse_now().unwrap().changes.is_empty());
}

#[test]
fn test_first_member_of_an_empty_class() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n}\n");
    let file = coord.file().clone();
    let a = class(&file.read(), "A");

    file.edit(|model| {
        model.change_members(
            CollectionRef::of(a, ElementKind::Method),
            CollectionChange::Add(vec![Declaration::method(
                "m",
                TypeRef::raw("int"),
                vec![Parameter::new("x", TypeRef::raw("int"))],
            )
            .with_body("{\n    return x;\n}")]),
        )
    })
    .unwrap();
    assert_eq!(
        file.document().text(),
        "class A {\n    int m(int x) {\n        return x;\n    }\n}\n"
    );
}

#[test]
fn test_setters_rewrite_only_their_region() {
    let ctx = context();
    let coord = open(
        &ctx,
        "A.java",
        "class A {\n    int count = 1;\n\n    void run(int a) {\n        count++;\n    }\n}\n",
    );
    let file = coord.file().clone();
    let (a, count, run) = {
        let model = file.read();
        let a = class(&model, "A");
        (
            a,
            member(&model, a, ElementKind::Field, "count"),
            member(&model, a, ElementKind::Method, "run"),
        )
    };

    file.edit(|model| {
        model.set_name(count, "total")?;
        model.set_initializer(count, Some("2".to_string()))?;
        model.set_modifiers(run, Modifiers::PUBLIC)?;
        model.set_parameters(run, vec![Parameter::new("b", TypeRef::raw("long"))])?;
        model.set_exceptions(run, vec![Identifier::new("java.io.IOException")])
    })
    .unwrap();

    assert_eq!(
        file.document().text(),
        "class A {\n    int total = 2;\n\n    public void run(long b) throws java.io.IOException {\n        count++;\n    }\n}\n"
    );

    let report = coord.reparse_now().unwrap();
    assert!(report.changes.is_empty());
    let model = file.read();
    assert_eq!(member(&model, a, ElementKind::Field, "total"), count);
    assert_eq!(member(&model, a, ElementKind::Method, "run"), run);
}

#[test]
fn test_remaining_setters_keep_identity() {
    let ctx = context();
    let coord = open(
        &ctx,
        "A.java",
        "class A extends Base {\n    static {\n        init();\n    }\n\n    int size() {\n        return 0;\n    }\n}\n",
    );
    let file = coord.file().clone();
    let (a, block, size) = {
        let model = file.read();
        let a = class(&model, "A");
        (
            a,
            model.members(CollectionRef::of(a, ElementKind::Initializer)).unwrap()[0],
            member(&model, a, ElementKind::Method, "size"),
        )
    };

    file.edit(|model| {
        model.set_superclass(a, Some(Identifier::new("Other")))?;
        model.set_static(block, false)?;
        model.set_return_type(size, TypeRef::raw("long"))?;
        model.set_body(size, "{\n    return 1L;\n}")
    })
    .unwrap();

    assert_eq!(
        file.document().text(),
        "class A extends Other {\n    {\n        init();\n    }\n\n    long size() {\n        return 1L;\n    }\n}\n"
    );

    let report = coord.reparse_now().unwrap();
    assert!(report.changes.is_empty());
    let model = file.read();
    assert!(model.is_valid(block));
    assert_eq!(member(&model, a, ElementKind::Method, "size"), size);
    assert_eq!(model.class(a).unwrap().superclass, Some(Identifier::new("Other")));
}

#[test]
fn test_javadoc_and_interfaces() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    void run() {\n    }\n}\n");
    let file = coord.file().clone();
    let (a, run) = {
        let model = file.read();
        let a = class(&model, "A");
        (a, member(&model, a, ElementKind::Method, "run"))
    };

    file.edit(|model| {
        model.set_javadoc(run, Some("Runs.".to_string()))?;
        model.change_interfaces(a, InterfacesChange::Add(vec![Identifier::new("Runnable")]))
    })
    .unwrap();
    let text = file.document().text();
    assert!(text.starts_with("class A implements Runnable {\n"));
    assert!(text.contains("    /**\n     * Runs.\n     */\n    void run() {"));

    assert!(coord.reparse_now().unwrap().changes.is_empty());
    let model = file.read();
    assert!(model.element(run).unwrap().javadoc().is_some());
    assert_eq!(model.class(a).unwrap().interfaces, vec![Identifier::new("Runnable")]);
}

#[test]
fn test_read_only_document_rolls_back() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    void run() {\n    }\n}\n");
    let file = coord.file().clone();
    let (a, run) = {
        let model = file.read();
        let a = class(&model, "A");
        (a, member(&model, a, ElementKind::Method, "run"))
    };

    file.document().set_read_only(true);
    let err = file.edit(|model| model.set_name(run, "walk")).unwrap_err();
    assert!(matches!(err, SyncError::Structural(_)));
    assert_eq!(file.read().element(run).unwrap().name().as_str(), "run");

    let err = file
        .edit(|model| {
            model.change_members(
                CollectionRef::of(a, ElementKind::Field),
                CollectionChange::Add(vec![Declaration::field("x", TypeRef::raw("int"))]),
            )
        })
        .unwrap_err();
    assert!(matches!(err, SyncError::Structural(_)));
    assert!(file.read().members(CollectionRef::of(a, ElementKind::Field)).unwrap().is_empty());
}

#[test]
fn test_locked_and_dead_elements_are_rejected() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n    void run() {\n    }\n}\n");
    let file = coord.file().clone();
    let (a, run) = {
        let model = file.read();
        let a = class(&model, "A");
        (a, member(&model, a, ElementKind::Method, "run"))
    };

    file.edit(|model| model.set_locked(run, true)).unwrap();
    let err = file.edit(|model| model.set_name(run, "walk")).unwrap_err();
    assert!(matches!(err, SyncError::Structural(_)));

    file.edit(|model| model.set_locked(a, true)).unwrap();
    let err = file
        .edit(|model| {
            model.change_members(
                CollectionRef::of(a, ElementKind::Method),
                CollectionChange::Remove(vec![run]),
            )
        })
        .unwrap_err();
    assert!(matches!(err, SyncError::Structural(_)));

    file.edit(|model| {
        model.set_locked(a, false)?;
        model.set_locked(run, false)?;
        model.change_members(
            CollectionRef::of(a, ElementKind::Method),
            CollectionChange::Remove(vec![run]),
        )
    })
    .unwrap();
    assert_eq!(file.document().text(), "class A {\n}\n");

    let err = file.edit(|model| model.set_name(run, "walk")).unwrap_err();
    assert!(matches!(err, SyncError::InvalidElement(_)));
}

#[test]
fn test_wrong_kind_is_rejected() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n}\n");
    let file = coord.file().clone();
    let a = class(&file.read(), "A");

    let err = file
        .edit(|model| {
            model.change_members(
                CollectionRef::of(a, ElementKind::Field),
                CollectionChange::Add(vec![Declaration::method("m", TypeRef::void(), Vec::new())]),
            )
        })
        .unwrap_err();
    assert!(matches!(err, SyncError::Structural(_)));
    assert_eq!(file.document().text(), "class A {\n}\n");
}

#[test]
fn test_top_level_class_insertion() {
    let ctx = context();
    let coord = open(&ctx, "A.java", "class A {\n}\n");
    let file = coord.file().clone();

    file.edit(|model| {
        model.change_members(
            CollectionRef::classes(),
            CollectionChange::Add(vec![Declaration::interface("I").with_member(
                Declaration::abstract_method("m", TypeRef::void(), Vec::new()),
            )]),
        )
    })
    .unwrap();
    assert_eq!(
        file.document().text(),
        "class A {\n}\n\ninterface I {\n    void m();\n}\n"
    );
    assert!(coord.reparse_now().unwrap().changes.is_empty());
    assert!(file.read().find_class("I").is_some());
}
