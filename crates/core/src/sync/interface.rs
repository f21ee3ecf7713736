//! Propagation of interface methods to implementing classes.
//!
//! A pass looks at the change records of one reparse: methods added to or
//! changed on an interface are pushed to every class implementing it, and
//! classes whose interface list grew are checked for missing methods. The
//! deep source check runs the missing-method check over every concrete class
//! of a file.

use super::action::{ActionKind, ChangeAction, method_signature};
use super::context::SynchronizationContext;
use super::index::{MethodSummary, TypeIndex, TypeSummary};
use crate::config::{SyncMode, SyncSettings};
use crate::error::{Result, SyncError};
use crate::model::render::INDENT_UNIT;
use crate::model::{
    ChangeKind, ChangeRecord, CollectionChange, CollectionRef, Declaration, DeclarationDetail,
    ElementId,
};
use crate::source::SourceFile;
use indexmap::IndexMap;
use srcsync_api::{ElementKind, Identifier, Modifiers, Parameter, same_parameter_types};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a synchronization pass did with the actions it computed.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// The mode the actions were dispatched under.
    pub mode: SyncMode,
    pub applied: Vec<ChangeAction>,
    /// Actions waiting for confirmation; only filled in CONFIRM mode without
    /// a registered confirmer.
    pub pending: Vec<ChangeAction>,
    pub failures: Vec<(ChangeAction, SyncError)>,
}

impl SyncOutcome {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.pending.is_empty() && self.failures.is_empty()
    }
}

fn exception_set(exceptions: &[Identifier]) -> BTreeSet<&str> {
    exceptions.iter().map(|e| e.simple_name()).collect()
}

/// Accumulates actions for one pass, one per (class, method signature).
struct Planner<'a> {
    index: TypeIndex,
    settings: &'a SyncSettings,
    actions: IndexMap<(String, String), ChangeAction>,
}

impl Planner<'_> {
    fn candidate(&self, method: &MethodSummary) -> Declaration {
        let parameters: Vec<Parameter> = method
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| Parameter {
                name: if p.name.is_empty() {
                    format!("p{}", i + 1)
                } else {
                    p.name.clone()
                },
                type_ref: p.type_ref.clone(),
                is_final: p.is_final,
            })
            .collect();

        let statement = self.settings.return_statement(&method.return_type);
        let body = if statement.is_empty() {
            "{\n}".to_string()
        } else {
            format!("{{\n{}{}\n}}", INDENT_UNIT, statement)
        };

        let mut decl = Declaration::method(
            method.name.as_str(),
            method.return_type.clone(),
            parameters,
        )
        .with_modifiers(Modifiers::PUBLIC)
        .with_exceptions(method.exceptions.clone())
        .with_body(body);
        if let DeclarationDetail::Method(detail) = &mut decl.detail {
            detail.type_parameters = method.type_parameters.clone();
        }
        decl
    }

    /// True when `existing` already has the shape of `candidate`. Parameter
    /// names and `final` flags do not count.
    fn matches(existing: &MethodSummary, candidate: &Declaration) -> bool {
        let Some(detail) = candidate.as_method() else {
            return false;
        };
        existing.name == candidate.name().as_str()
            && existing.modifiers.contains(Modifiers::PUBLIC)
            && existing.return_type.same_as(&detail.return_type)
            && same_parameter_types(&existing.parameters, &detail.parameters)
            && exception_set(&existing.exceptions) == exception_set(&detail.exceptions)
    }

    /// A superclass already provides `method` for `class`, either with its
    /// own body or by being a concrete implementor of `iface` itself.
    fn inherited(&self, class: &TypeSummary, iface: &str, method: &MethodSummary) -> bool {
        self.index.ancestors(class).into_iter().any(|ancestor| {
            ancestor
                .find_method(&method.name, &method.parameters)
                .is_some_and(|m| m.has_body)
                || (ancestor.is_concrete() && self.index.implements(ancestor, iface))
        })
    }

    fn plan_method(
        &mut self,
        class: &TypeSummary,
        iface: &TypeSummary,
        method: &MethodSummary,
        previous: Option<&Declaration>,
    ) {
        let candidate = self.candidate(method);
        let existing = class
            .find_method(&method.name, &method.parameters)
            .or_else(|| {
                previous.and_then(|old| class.find_method(old.name().as_str(), old.parameters()))
            });

        let signature = method_signature(&candidate);
        let kind = match existing {
            Some(found) if Self::matches(found, &candidate) => {
                debug!("{} already declares {}", class.qualified_name, signature);
                return;
            }
            Some(found) => ActionKind::Update {
                method: found.id,
                declaration: candidate,
            },
            None => ActionKind::Add(candidate),
        };

        let description = match &kind {
            ActionKind::Add(_) => format!(
                "Add method {} to {} (from {})",
                signature, class.qualified_name, iface.qualified_name
            ),
            ActionKind::Update { .. } => format!(
                "Update method {} in {} to match {}",
                signature, class.qualified_name, iface.qualified_name
            ),
        };
        self.actions
            .entry((class.qualified_name.clone(), signature))
            .or_insert_with(|| ChangeAction {
                description,
                file: class.file.clone(),
                class: class.qualified_name.clone(),
                interface: iface.qualified_name.clone(),
                kind,
            });
    }

    /// Pushes one interface method to every implementing concrete class.
    fn propagate(&mut self, iface: &str, method: &MethodSummary, previous: Option<&Declaration>) {
        let Some(iface_summary) = self.index.get(iface).cloned() else {
            return;
        };
        for class_name in self.index.implementors(iface) {
            let Some(class) = self.index.get(&class_name).cloned() else {
                continue;
            };
            if !class.is_concrete() || self.inherited(&class, iface, method) {
                continue;
            }
            self.plan_method(&class, &iface_summary, method, previous);
        }
    }

    /// Interface methods `class` must implement, with the interface each one
    /// comes from.
    fn obligations(&self, class: &TypeSummary) -> Vec<(TypeSummary, MethodSummary)> {
        let mut found = Vec::new();
        let mut excluded = HashSet::new();
        let mut visited = HashSet::new();
        self.collect(class, true, &mut found, &mut excluded, &mut visited);

        let ancestors = self.index.ancestors(class);
        found
            .into_iter()
            .filter(|(iface, _)| !excluded.contains(&iface.qualified_name))
            .filter(|(_, m)| {
                !ancestors.iter().any(|a| {
                    a.find_method(&m.name, &m.parameters)
                        .is_some_and(|found| found.has_body)
                })
            })
            .collect()
    }

    fn collect(
        &self,
        node: &TypeSummary,
        is_root: bool,
        found: &mut Vec<(TypeSummary, MethodSummary)>,
        excluded: &mut HashSet<String>,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(node.qualified_name.clone()) {
            return;
        }
        if node.is_interface {
            for method in node.methods.iter().filter(|m| m.is_obligation()) {
                found.push((node.clone(), method.clone()));
            }
        }
        let include = is_root || node.is_interface || node.is_abstract;
        for iface in self.index.interfaces(node) {
            if include {
                self.collect(iface, false, found, excluded, visited);
            } else {
                self.exclude(iface, excluded);
            }
        }
        if let Some(sup) = self.index.superclass(node) {
            self.collect(sup, false, found, excluded, visited);
        }
    }

    fn exclude(&self, iface: &TypeSummary, excluded: &mut HashSet<String>) {
        if !excluded.insert(iface.qualified_name.clone()) {
            return;
        }
        for parent in self.index.interfaces(iface) {
            self.exclude(parent, excluded);
        }
    }

    fn check_class(&mut self, class: &TypeSummary) {
        if !class.is_concrete() {
            return;
        }
        for (iface, method) in self.obligations(class) {
            self.plan_method(class, &iface, &method, None);
        }
    }

    fn plan_changes(&mut self, file: &str, changes: &[ChangeRecord]) {
        for record in changes {
            match (record.category, record.kind) {
                (_, ChangeKind::Remove) => {}
                (ElementKind::Method, _) => self.plan_method_record(file, record),
                (ElementKind::Class, kind) => {
                    let Some(target) = self.index.by_element(file, record.element).cloned() else {
                        continue;
                    };
                    self.plan_class_record(&target, kind, record.previous.as_ref());
                }
                _ => {}
            }
        }
    }

    fn plan_class_record(&mut self, target: &TypeSummary, kind: ChangeKind, previous: Option<&Declaration>) {
        if target.is_interface {
            // A new interface may already be named by classes that could not
            // resolve it before.
            if kind == ChangeKind::Add {
                for method in target.methods.iter().filter(|m| m.is_obligation()) {
                    self.propagate(&target.qualified_name, method, None);
                }
            }
            return;
        }
        let after: BTreeSet<&str> = target.interfaces.iter().map(|i| i.as_str()).collect();
        let before: BTreeSet<&str> = previous
            .and_then(|p| p.as_class())
            .map(|c| c.interfaces.iter().map(|i| i.as_str()).collect())
            .unwrap_or_default();
        let interfaces_changed = match kind {
            ChangeKind::Add => !after.is_empty(),
            _ => before != after,
        };
        if interfaces_changed {
            self.check_class(target);
        }
    }

    fn plan_method_record(&mut self, file: &str, record: &ChangeRecord) {
        let Some(owner) = record.owner else {
            return;
        };
        let Some(iface) = self.index.by_element(file, owner).cloned() else {
            return;
        };
        if !iface.is_interface {
            return;
        }
        let Some(method) = iface.methods.iter().find(|m| m.id == record.element) else {
            return;
        };
        if !method.is_obligation() {
            return;
        }
        let previous = match record.kind {
            ChangeKind::Change => record.previous.as_ref(),
            _ => None,
        };
        self.propagate(&iface.qualified_name, method, previous);
    }

    fn into_actions(self) -> Vec<ChangeAction> {
        self.actions.into_values().collect()
    }
}

/// Computes and dispatches interface synchronization actions.
pub struct InterfaceSyncEngine {
    context: Arc<SynchronizationContext>,
}

impl InterfaceSyncEngine {
    pub fn new(context: Arc<SynchronizationContext>) -> Self {
        Self { context }
    }

    fn with_planner(&self, plan: impl FnOnce(&mut Planner<'_>)) -> Vec<ChangeAction> {
        let settings = self.context.settings();
        let mut planner = Planner {
            index: TypeIndex::build(&self.context.sources()),
            settings: &settings,
            actions: IndexMap::new(),
        };
        plan(&mut planner);
        planner.into_actions()
    }

    /// Actions implied by the change records of one reparse of `file`.
    pub fn plan(&self, file: &SourceFile, changes: &[ChangeRecord]) -> Vec<ChangeAction> {
        self.with_planner(|planner| planner.plan_changes(file.name(), changes))
    }

    /// Missing interface methods of every concrete class in `file`.
    pub fn plan_deep_check(&self, file: &SourceFile) -> Vec<ChangeAction> {
        let classes = file.read().all_classes();
        self.with_planner(|planner| {
            for id in classes {
                if let Some(class) = planner.index.by_element(file.name(), id).cloned() {
                    planner.check_class(&class);
                }
            }
        })
    }

    /// Plans and dispatches according to the file's mode. A deep check runs
    /// even when the file is DISABLED, through the confirmation path.
    pub fn synchronize(&self, file: &SourceFile, changes: &[ChangeRecord], deep_check: bool) -> SyncOutcome {
        let settings = self.context.settings();
        let mut mode = self.context.mode(file.name());
        if mode == SyncMode::Disabled && deep_check {
            mode = SyncMode::Confirm;
        }
        let mut outcome = SyncOutcome {
            mode,
            ..Default::default()
        };
        if mode == SyncMode::Disabled {
            debug!("Synchronization disabled for {}", file.name());
            return outcome;
        }

        let classes = if deep_check { file.read().all_classes() } else { Vec::new() };
        let actions = self.with_planner(|planner| {
            if settings.enabled {
                planner.plan_changes(file.name(), changes);
            }
            for id in classes {
                if let Some(class) = planner.index.by_element(file.name(), id).cloned() {
                    planner.check_class(&class);
                }
            }
        });
        if actions.is_empty() {
            return outcome;
        }
        debug!("{} synchronization actions for {}", actions.len(), file.name());

        match mode {
            SyncMode::Automatic => {
                self.apply_all(actions, &mut outcome);
                for (action, err) in &outcome.failures {
                    warn!("Could not apply '{}': {}", action, err);
                }
            }
            _ => match self.context.confirmer() {
                Some(confirmer) => {
                    let answer = confirmer.confirm(file.name(), &actions, mode);
                    if let Some(new_mode) = answer.mode {
                        self.context.set_mode(file.name(), new_mode);
                    }
                    let approved: BTreeSet<usize> = answer
                        .approved
                        .into_iter()
                        .filter(|i| *i < actions.len())
                        .collect();
                    let chosen = actions
                        .into_iter()
                        .enumerate()
                        .filter(|(i, _)| approved.contains(i))
                        .map(|(_, action)| action)
                        .collect();
                    self.apply_all(chosen, &mut outcome);
                    if !outcome.failures.is_empty() {
                        confirmer.report_failures(&outcome.failures);
                    }
                }
                None => outcome.pending = actions,
            },
        }
        outcome
    }

    fn apply_all(&self, actions: Vec<ChangeAction>, outcome: &mut SyncOutcome) {
        for action in actions {
            match self.apply(&action) {
                Ok(_) => outcome.applied.push(action),
                Err(err) => outcome.failures.push((action, err)),
            }
        }
    }

    /// Applies one action to its class. Returns the id of the added or
    /// updated method.
    pub fn apply(&self, action: &ChangeAction) -> Result<ElementId> {
        let source = self
            .context
            .source(&action.file)
            .ok_or_else(|| SyncError::structural(format!("{} is not open", action.file)))?;
        let id = source.edit(|model| {
            let class = model
                .find_class(&action.class)
                .ok_or_else(|| SyncError::structural(format!("class {} not found", action.class)))?;
            match &action.kind {
                ActionKind::Add(decl) => {
                    let created = model.change_members(
                        CollectionRef::of(class, ElementKind::Method),
                        CollectionChange::Add(vec![decl.clone()]),
                    )?;
                    created
                        .first()
                        .copied()
                        .ok_or_else(|| SyncError::Internal("no method created".to_string()))
                }
                ActionKind::Update {
                    method,
                    declaration,
                } => {
                    let detail = declaration
                        .as_method()
                        .ok_or_else(|| SyncError::Internal("update without a method".to_string()))?;
                    let (name, modifiers, return_type, parameters, exceptions) = {
                        let record = model.element(*method)?;
                        let payload = record
                            .as_method()
                            .ok_or_else(|| SyncError::structural(format!("{} is not a method", method)))?;
                        (
                            record.name().clone(),
                            record.modifiers(),
                            payload.return_type.clone(),
                            payload.parameters.clone(),
                            payload.exceptions.clone(),
                        )
                    };
                    if &name != declaration.name() {
                        model.set_name(*method, declaration.name().clone())?;
                    }
                    if !modifiers.contains(Modifiers::PUBLIC) {
                        model.set_modifiers(*method, (modifiers - Modifiers::ACCESS) | Modifiers::PUBLIC)?;
                    }
                    if !return_type.same_as(&detail.return_type) {
                        model.set_return_type(*method, detail.return_type.clone())?;
                    }
                    if !same_parameter_types(&parameters, &detail.parameters) {
                        model.set_parameters(*method, detail.parameters.clone())?;
                    }
                    if exception_set(&exceptions) != exception_set(&detail.exceptions) {
                        model.set_exceptions(*method, detail.exceptions.clone())?;
                    }
                    Ok(*method)
                }
            }
        })?;
        info!("Applied: {}", action);
        Ok(id)
    }
}
