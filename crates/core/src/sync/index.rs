//! A snapshot of every open class and interface, built once per
//! synchronization pass.

use crate::model::{ElementId, Import, SourceModel};
use crate::source::SourceFile;
use indexmap::IndexMap;
use srcsync_api::{ElementKind, Identifier, Modifiers, Parameter, TypeRef, same_parameter_types};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct MethodSummary {
    pub id: ElementId,
    pub name: String,
    pub modifiers: Modifiers,
    pub type_parameters: Option<String>,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    pub has_body: bool,
}

impl MethodSummary {
    /// Abstract instance methods are the ones implementors must provide.
    pub fn is_obligation(&self) -> bool {
        !self.has_body && !self.modifiers.intersects(Modifiers::STATIC | Modifiers::DEFAULT)
    }

    pub fn same_signature(&self, name: &str, parameters: &[Parameter]) -> bool {
        self.name == name && same_parameter_types(&self.parameters, parameters)
    }
}

/// Name lookup scope of one compilation unit.
#[derive(Debug, Default)]
struct UnitScope {
    package: Option<String>,
    imports: Vec<Import>,
    classes: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct TypeSummary {
    pub file: String,
    pub qualified_name: String,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub superclass: Option<Identifier>,
    pub interfaces: Vec<Identifier>,
    pub methods: Vec<MethodSummary>,
}

impl TypeSummary {
    /// A class that has to provide bodies for inherited abstract methods.
    pub fn is_concrete(&self) -> bool {
        !self.is_interface && !self.is_abstract
    }

    pub fn find_method(&self, name: &str, parameters: &[Parameter]) -> Option<&MethodSummary> {
        self.methods.iter().find(|m| m.same_signature(name, parameters))
    }
}

#[derive(Debug, Default)]
pub(crate) struct TypeIndex {
    types: IndexMap<String, TypeSummary>,
    units: HashMap<String, UnitScope>,
    by_element: HashMap<(String, ElementId), String>,
    implementors: HashMap<String, Vec<String>>,
}

fn strip_type_arguments(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

impl TypeIndex {
    pub fn build(sources: &[Arc<SourceFile>]) -> Self {
        let mut index = TypeIndex::default();
        for source in sources {
            let model = source.read();
            index.add_unit(source.name(), &model);
        }
        debug!(
            "Type index built over {} sources: {} types",
            sources.len(),
            index.types.len()
        );
        index
    }

    fn add_unit(&mut self, file: &str, model: &SourceModel) {
        let mut scope = UnitScope {
            package: model.package().map(|p| p.as_str().to_string()),
            imports: model.imports().to_vec(),
            classes: Vec::new(),
        };

        for id in model.all_classes() {
            let (Ok(record), Ok(class), Ok(qualified_name)) =
                (model.element(id), model.class(id), model.qualified_name(id))
            else {
                continue;
            };

            let methods = class
                .members(ElementKind::Method)
                .iter()
                .filter_map(|mid| model.element(mid).ok())
                .filter_map(|m| {
                    let payload = m.as_method()?;
                    Some(MethodSummary {
                        id: m.id(),
                        name: m.name().as_str().to_string(),
                        modifiers: m.modifiers(),
                        type_parameters: payload.type_parameters.clone(),
                        return_type: payload.return_type.clone(),
                        parameters: payload.parameters.clone(),
                        exceptions: payload.exceptions.clone(),
                        has_body: payload.body.is_some(),
                    })
                })
                .collect();

            scope.classes.push(qualified_name.clone());
            self.by_element
                .insert((file.to_string(), id), qualified_name.clone());
            self.types.insert(
                qualified_name.clone(),
                TypeSummary {
                    file: file.to_string(),
                    qualified_name,
                    is_interface: class.is_interface,
                    is_abstract: record.modifiers().contains(Modifiers::ABSTRACT),
                    superclass: class.superclass.clone(),
                    interfaces: class.interfaces.clone(),
                    methods,
                },
            );
        }
        self.units.insert(file.to_string(), scope);
    }

    pub fn get(&self, qualified: &str) -> Option<&TypeSummary> {
        self.types.get(qualified)
    }

    pub fn by_element(&self, file: &str, id: ElementId) -> Option<&TypeSummary> {
        self.by_element
            .get(&(file.to_string(), id))
            .and_then(|q| self.types.get(q))
    }

    /// Resolves a type name as written inside `from`'s compilation unit.
    pub fn resolve(&self, from: &TypeSummary, name: &Identifier) -> Option<&TypeSummary> {
        let raw = strip_type_arguments(name.as_str());
        if raw.is_empty() {
            return None;
        }
        if let Some(found) = self.types.get(raw) {
            return Some(found);
        }

        let scope = self.units.get(&from.file)?;
        let (head, rest) = match raw.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (raw, None),
        };
        let with_rest = |base: &str| match rest {
            Some(rest) => format!("{}.{}", base, rest),
            None => base.to_string(),
        };

        // Classes of the same unit, innermost enclosing scope first.
        let suffix = format!(".{}", raw);
        let mut local: Vec<&String> = scope
            .classes
            .iter()
            .filter(|q| {
                q.strip_suffix(&suffix).is_some_and(|outer| {
                    from.qualified_name == outer
                        || from.qualified_name.starts_with(&format!("{}.", outer))
                })
            })
            .collect();
        local.sort_by_key(|q| std::cmp::Reverse(q.len()));
        if let Some(found) = local.first().and_then(|q| self.types.get(q.as_str())) {
            return Some(found);
        }

        let candidates = scope
            .imports
            .iter()
            .filter(|i| !i.is_static && !i.on_demand && i.name.simple_name() == head)
            .map(|i| with_rest(i.name.as_str()))
            .chain(
                scope
                    .package
                    .iter()
                    .map(|package| format!("{}.{}", package, raw)),
            )
            .chain(
                scope
                    .imports
                    .iter()
                    .filter(|i| !i.is_static && i.on_demand)
                    .map(|i| format!("{}.{}", i.name, raw)),
            );
        for candidate in candidates {
            if let Some(found) = self.types.get(&candidate) {
                return Some(found);
            }
        }

        let mut unique = self
            .types
            .values()
            .filter(|t| t.qualified_name == raw || t.qualified_name.ends_with(&suffix));
        match (unique.next(), unique.next()) {
            (Some(found), None) => Some(found),
            _ => None,
        }
    }

    pub fn superclass(&self, of: &TypeSummary) -> Option<&TypeSummary> {
        of.superclass
            .as_ref()
            .and_then(|name| self.resolve(of, name))
            .filter(|sup| !sup.is_interface && sup.qualified_name != of.qualified_name)
    }

    pub fn interfaces<'a>(&'a self, of: &'a TypeSummary) -> impl Iterator<Item = &'a TypeSummary> + 'a {
        of.interfaces
            .iter()
            .filter_map(move |name| self.resolve(of, name))
            .filter(|i| i.is_interface)
    }

    /// Superclasses of `of`, nearest first. Stops on inheritance cycles.
    pub fn ancestors<'a>(&'a self, of: &'a TypeSummary) -> Vec<&'a TypeSummary> {
        let mut out: Vec<&TypeSummary> = Vec::new();
        let mut seen = HashSet::from([of.qualified_name.as_str()]);
        let mut current = self.superclass(of);
        while let Some(sup) = current {
            if !seen.insert(sup.qualified_name.as_str()) {
                break;
            }
            out.push(sup);
            current = self.superclass(sup);
        }
        out
    }

    /// True when `of` reaches `target` through its interfaces, the interfaces
    /// they extend, or its superclasses.
    pub fn implements(&self, of: &TypeSummary, target: &str) -> bool {
        let mut seen = HashSet::new();
        self.implements_inner(of, target, &mut seen)
    }

    fn implements_inner<'a>(
        &'a self,
        of: &'a TypeSummary,
        target: &str,
        seen: &mut HashSet<&'a str>,
    ) -> bool {
        if !seen.insert(of.qualified_name.as_str()) {
            return false;
        }
        for iface in self.interfaces(of) {
            if iface.qualified_name == target || self.implements_inner(iface, target, seen) {
                return true;
            }
        }
        match self.superclass(of) {
            Some(sup) => self.implements_inner(sup, target, seen),
            None => false,
        }
    }

    /// Qualified names of every class implementing `iface`, directly or
    /// transitively. Cached for the rest of the pass.
    pub fn implementors(&mut self, iface: &str) -> Vec<String> {
        if let Some(cached) = self.implementors.get(iface) {
            return cached.clone();
        }
        let found: Vec<String> = self
            .types
            .values()
            .filter(|t| !t.is_interface && self.implements(t, iface))
            .map(|t| t.qualified_name.clone())
            .collect();
        debug!("{} implementors of {}: {:?}", found.len(), iface, found);
        self.implementors.insert(iface.to_string(), found.clone());
        found
    }
}
