mod common;

use common::{context_with_mode, open};
use srcsync_core::model::ChangeRecord;
use srcsync_core::sync::{ChangeAction, Confirmation, InterfaceSyncEngine, SyncConfirmer, SyncOutcome};
use srcsync_core::{
    SyncError, SyncMode, SyncSettings, SynchronizationContext, SynchronizationCoordinator,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

fn edit_and_cycle(coord: &SynchronizationCoordinator, text: &str) -> (Vec<ChangeRecord>, SyncOutcome) {
    coord.file().document().set_text(text).unwrap();
    let report = coord.run_cycle(false).unwrap();
    (report.reparse.changes, report.sync.unwrap())
}

#[test]
fn test_new_interface_method_reaches_implementor() {
    let ctx = context_with_mode(SyncMode::Automatic);
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    let (changes, outcome) = edit_and_cycle(&iface, "interface I {\n    void m();\n}\n");
    assert_eq!(outcome.mode, SyncMode::Automatic);
    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(outcome.applied[0].description, "Add method m() to C (from I)");
    assert!(outcome.failures.is_empty());
    assert_eq!(
        class.file().document().text(),
        "class C implements I {\n    public void m() {\n    }\n}\n"
    );

    // Applying is idempotent.
    let engine = InterfaceSyncEngine::new(ctx.clone());
    assert!(engine.synchronize(iface.file(), &changes, false).is_empty());
    assert!(class.reparse_now().unwrap().changes.is_empty());
    let deep = class.run_cycle(true).unwrap();
    assert!(deep.sync.unwrap().is_empty());
}

#[test]
fn test_body_uses_return_template() {
    let mut templates = BTreeMap::new();
    templates.insert("String".to_string(), "return \"\";".to_string());
    let ctx = SynchronizationContext::new(SyncSettings {
        default_mode: SyncMode::Automatic,
        return_templates: templates,
        ..Default::default()
    });
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    edit_and_cycle(
        &iface,
        "interface I {\n    int size();\n\n    String name(int index) throws Exception;\n}\n",
    );
    assert_eq!(
        class.file().document().text(),
        "class C implements I {\n    public int size() {\n        return 0;\n    }\n\n    public String name(int index) throws Exception {\n        return \"\";\n    }\n}\n"
    );
}

#[test]
fn test_signature_change_updates_existing_method() {
    let ctx = context_with_mode(SyncMode::Automatic);
    let iface = open(&ctx, "I.java", "interface I {\n    void m(int x);\n}\n");
    let class = open(
        &ctx,
        "C.java",
        "class C implements I {\n    public void m(int x) {\n        run(x);\n    }\n}\n",
    );
    let before = class.file().read().all_classes();

    let (_, outcome) = edit_and_cycle(&iface, "interface I {\n    void m(long x);\n}\n");
    assert_eq!(outcome.applied.len(), 1);
    assert!(!outcome.applied[0].is_add());
    assert_eq!(
        class.file().document().text(),
        "class C implements I {\n    public void m(long x) {\n        run(x);\n    }\n}\n"
    );
    assert_eq!(class.file().read().all_classes(), before);
    assert!(class.reparse_now().unwrap().changes.is_empty());
}

#[test]
fn test_default_and_static_methods_are_not_obligations() {
    let ctx = context_with_mode(SyncMode::Automatic);
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    edit_and_cycle(
        &iface,
        "interface I {\n    default void a() {\n    }\n\n    static I of() {\n        return null;\n    }\n}\n",
    );
    assert_eq!(class.file().document().text(), "class C implements I {\n}\n");
}

#[test]
fn test_abstract_and_covered_classes_are_skipped() {
    let ctx = context_with_mode(SyncMode::Automatic);
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let abstract_class = open(&ctx, "A.java", "abstract class A implements I {\n}\n");
    let covered = open(
        &ctx,
        "B.java",
        "class Base {\n    public void m() {\n    }\n}\n\nclass B extends Base implements I {\n}\n",
    );

    let (_, outcome) = edit_and_cycle(&iface, "interface I {\n    void m();\n}\n");
    assert!(outcome.is_empty());
    assert_eq!(
        abstract_class.file().document().text(),
        "abstract class A implements I {\n}\n"
    );
    assert_eq!(
        covered.file().document().text(),
        "class Base {\n    public void m() {\n    }\n}\n\nclass B extends Base implements I {\n}\n"
    );
}

#[test]
fn test_concrete_subclass_of_abstract_implementor_gets_the_method() {
    let ctx = context_with_mode(SyncMode::Automatic);
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    open(&ctx, "A.java", "abstract class A implements I {\n}\n");
    let concrete = open(&ctx, "D.java", "class D extends A {\n}\n");

    let (_, outcome) = edit_and_cycle(&iface, "interface I {\n    void m();\n}\n");
    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(
        concrete.file().document().text(),
        "class D extends A {\n    public void m() {\n    }\n}\n"
    );
}

#[test]
fn test_adding_an_interface_to_a_class() {
    let ctx = context_with_mode(SyncMode::Automatic);
    open(&ctx, "I.java", "package p;\n\npublic interface I {\n    void m();\n}\n");
    let class = open(&ctx, "C.java", "package q;\n\nimport p.I;\n\nclass C {\n}\n");

    let (_, outcome) = edit_and_cycle(&class, "package q;\n\nimport p.I;\n\nclass C implements I {\n}\n");
    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(outcome.applied[0].interface, "p.I");
    assert_eq!(
        class.file().document().text(),
        "package q;\n\nimport p.I;\n\nclass C implements I {\n    public void m() {\n    }\n}\n"
    );
}

struct Recorder {
    answer: Confirmation,
    proposed: Mutex<Vec<(String, Vec<ChangeAction>, SyncMode)>>,
    failures: Mutex<usize>,
}

impl SyncConfirmer for Recorder {
    fn confirm(&self, file: &str, actions: &[ChangeAction], mode: SyncMode) -> Confirmation {
        self.proposed
            .lock()
            .unwrap()
            .push((file.to_string(), actions.to_vec(), mode));
        self.answer.clone()
    }

    fn report_failures(&self, failures: &[(ChangeAction, SyncError)]) {
        *self.failures.lock().unwrap() += failures.len();
    }
}

#[test]
fn test_confirm_mode_asks_and_applies_the_approved_subset() {
    let ctx = context_with_mode(SyncMode::Confirm);
    let confirmer = Arc::new(Recorder {
        answer: Confirmation {
            approved: vec![1, 7],
            mode: Some(SyncMode::Automatic),
        },
        proposed: Mutex::new(Vec::new()),
        failures: Mutex::new(0),
    });
    ctx.set_confirmer(confirmer.clone());
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    let (_, outcome) = edit_and_cycle(&iface, "interface I {\n    void a();\n\n    void b();\n}\n");
    assert_eq!(outcome.mode, SyncMode::Confirm);
    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(outcome.applied[0].signature(), "b()");

    let proposed = confirmer.proposed.lock().unwrap();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].0, "I.java");
    assert_eq!(proposed[0].1.len(), 2);
    assert_eq!(proposed[0].2, SyncMode::Confirm);
    assert_eq!(*confirmer.failures.lock().unwrap(), 0);

    assert_eq!(ctx.mode("I.java"), SyncMode::Automatic);
    assert_eq!(
        class.file().document().text(),
        "class C implements I {\n    public void b() {\n    }\n}\n"
    );
}

#[test]
fn test_confirm_mode_without_confirmer_leaves_actions_pending() {
    let ctx = context_with_mode(SyncMode::Confirm);
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    let (_, outcome) = edit_and_cycle(&iface, "interface I {\n    void m();\n}\n");
    assert!(outcome.applied.is_empty());
    assert_eq!(outcome.pending.len(), 1);
    assert_eq!(outcome.pending[0].class, "C");
    assert_eq!(outcome.pending[0].file, "C.java");
    assert_eq!(class.file().document().text(), "class C implements I {\n}\n");

    let engine = InterfaceSyncEngine::new(ctx.clone());
    let id = engine.apply(&outcome.pending[0]).unwrap();
    assert!(class.file().read().is_valid(id));
    assert_eq!(
        class.file().document().text(),
        "class C implements I {\n    public void m() {\n    }\n}\n"
    );
}

#[test]
fn test_disabled_mode_only_runs_deep_checks() {
    let ctx = context_with_mode(SyncMode::Disabled);
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    let (changes, outcome) = edit_and_cycle(&iface, "interface I {\n    void m();\n}\n");
    assert_eq!(outcome.mode, SyncMode::Disabled);
    assert!(outcome.is_empty());

    // Planning alone still reports the work without touching the class.
    let planned = InterfaceSyncEngine::new(ctx.clone()).plan(iface.file(), &changes);
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].description, "Add method m() to C (from I)");
    assert_eq!(class.file().document().text(), "class C implements I {\n}\n");

    let deep = class.run_cycle(true).unwrap().sync.unwrap();
    assert_eq!(deep.mode, SyncMode::Confirm);
    assert_eq!(deep.pending.len(), 1);
    assert_eq!(deep.pending[0].signature(), "m()");
}

#[test]
fn test_globally_disabled_sync_still_allows_deep_checks() {
    let ctx = SynchronizationContext::new(SyncSettings {
        enabled: false,
        default_mode: SyncMode::Automatic,
        ..Default::default()
    });
    let iface = open(&ctx, "I.java", "interface I {\n}\n");
    let class = open(&ctx, "C.java", "class C implements I {\n}\n");

    iface
        .file()
        .document()
        .set_text("interface I {\n    void m();\n}\n")
        .unwrap();
    assert!(iface.run_cycle(false).unwrap().sync.is_none());
    assert_eq!(class.file().document().text(), "class C implements I {\n}\n");

    let deep = class.run_cycle(true).unwrap().sync.unwrap();
    assert_eq!(deep.applied.len(), 1);
}

#[test]
fn test_deep_check_respects_concrete_ancestors() {
    let ctx = context_with_mode(SyncMode::Confirm);
    open(&ctx, "I.java", "interface I {\n    void m();\n}\n\ninterface J extends I {\n    void n();\n}\n");
    let file = open(
        &ctx,
        "Types.java",
        "class Base implements I {\n    public void m() {\n    }\n}\n\n\
         class Covered extends Base implements I {\n}\n\n\
         abstract class Partial implements J {\n}\n\n\
         class Leaf extends Partial {\n}\n\n\
         class Grand extends Base implements J {\n}\n",
    );

    let engine = InterfaceSyncEngine::new(ctx.clone());
    let actions = engine.plan_deep_check(file.file());
    let planned: Vec<(String, String)> = actions
        .iter()
        .map(|a| (a.class.clone(), a.signature()))
        .collect();

    assert!(!planned.iter().any(|(class, _)| class == "Covered" || class == "Base"));
    assert!(!planned.iter().any(|(class, _)| class == "Partial"));
    assert!(planned.contains(&("Leaf".to_string(), "m()".to_string())));
    assert!(planned.contains(&("Leaf".to_string(), "n()".to_string())));
    assert!(planned.contains(&("Grand".to_string(), "n()".to_string())));
    assert!(!planned.contains(&("Grand".to_string(), "m()".to_string())));
    assert_eq!(planned.len(), 3);
}
