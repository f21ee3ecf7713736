use nu_ansi_term::{Color, Style};
use serde::Serialize;
use srcsync_api::ElementKind;
use srcsync_core::model::{CollectionRef, ElementId};
use srcsync_core::sync::{ActionKind, ChangeAction};
use srcsync_core::{Result, SourceModel};
use tabled::Tabled;

/// One declaration of an outline, members in source order.
#[derive(Debug, Serialize)]
pub struct OutlineNode {
    pub kind: ElementKind,
    pub name: String,
    pub signature: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn build(model: &SourceModel, id: ElementId) -> Result<Self> {
        let record = model.element(id)?;
        let text = model.document().text();
        let begin = record.bounds().header.begin();
        let line = text.get(..begin).map_or(0, |t| t.matches('\n').count()) + 1;

        let signature = match record.as_field() {
            Some(field) => format!("{} {}", field.type_ref, record.name()),
            None => record
                .bounds()
                .header
                .text()?
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        };

        let mut members: Vec<(usize, ElementId)> = Vec::new();
        if record.as_class().is_some() {
            for kind in ElementKind::MEMBER_ORDER {
                for member in model.members(CollectionRef::of(id, kind))? {
                    let bounds = model.element(member)?.bounds();
                    let at = bounds.declarator.as_ref().unwrap_or(&bounds.element).begin();
                    members.push((at, member));
                }
            }
        }
        members.sort();
        let children = members
            .into_iter()
            .map(|(_, member)| OutlineNode::build(model, member))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind: record.kind(),
            name: record.name().to_string(),
            signature,
            line,
            children,
        })
    }

    pub fn render(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let label = if self.signature.is_empty() {
            "{ }".to_string()
        } else {
            self.signature.clone()
        };
        out.push_str(&format!(
            "{}{} {} {}\n",
            indent,
            kind_style(self.kind).paint(format!("{:<11}", self.kind.as_str())),
            label,
            Style::new().dimmed().paint(format!(":{}", self.line)),
        ));
        for child in &self.children {
            child.render(depth + 1, out);
        }
    }
}

fn kind_style(kind: ElementKind) -> Style {
    match kind {
        ElementKind::Class => Color::LightBlue.bold(),
        ElementKind::Method => Style::new().fg(Color::LightGreen),
        ElementKind::Constructor => Style::new().fg(Color::Cyan),
        ElementKind::Field => Style::new().fg(Color::Yellow),
        ElementKind::Initializer => Style::new().fg(Color::Purple),
    }
}

/// A table row for one proposed synchronization action.
#[derive(Tabled)]
pub struct ActionView {
    pub action: String,
    pub method: String,
    pub class: String,
    pub interface: String,
    pub file: String,
}

impl From<&ChangeAction> for ActionView {
    fn from(action: &ChangeAction) -> Self {
        let kind = match action.kind {
            ActionKind::Add(_) => "add",
            ActionKind::Update { .. } => "update",
        };
        Self {
            action: kind.to_string(),
            method: action.signature(),
            class: action.class.clone(),
            interface: action.interface.clone(),
            file: action.file.clone(),
        }
    }
}
