use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    dashboard::Dashboard,
    dataset::{BoxerRecord, Sex},
    figure::{self, Figure},
    options::{weight_options, DropdownOption},
    stats::Distributions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    SexDropdown,
    WeightDropdown,
    HeightGraph,
    ReachGraph,
}

impl Component {
    /// DOM id of the component on the page.
    pub fn id(self) -> &'static str {
        match self {
            Component::SexDropdown => "sex-dropdown",
            Component::WeightDropdown => "weight-dropdown",
            Component::HeightGraph => "height-graph",
            Component::ReachGraph => "reach-graph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Options,
    Value,
    Figure,
}

/// Current value of both selectors. The weight is unset until the user picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub sex: String,
    #[serde(default)]
    pub weight: Option<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            sex: Sex::Male.code().to_string(),
            weight: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    pub target: Component,
    pub property: Property,
    pub value: Value,
}

impl Output {
    fn new(target: Component, property: Property, value: Value) -> Output {
        Output {
            target,
            property,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    pub source: Component,
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub state: Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub selection: Selection,
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    Unbound { source: Component, kind: EventKind },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Unbound { source, kind } => write!(
                f,
                "no handler bound to {:?} events of `{}`",
                kind,
                source.id()
            ),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Weight-class options for a sex selector value.
pub fn weight_class_options(sex: &str) -> Vec<DropdownOption> {
    weight_options(sex)
}

/// Height and reach histograms of the rows matching both selectors exactly.
pub fn size_histograms(
    records: &[BoxerRecord],
    sex: &str,
    weight: Option<&str>,
) -> (Figure, Figure) {
    let selected = Distributions::of(
        records
            .iter()
            .filter(|r| r.sex.code() == sex && weight == Some(r.weight_class.as_str()))
            .filter(|r| !r.weight_class.is_empty()),
    );
    let sex_label = Sex::from_code(sex).map_or(sex, |s| s.label());
    let subject = match weight {
        Some(weight) => format!("{} {}", sex_label, weight),
        None => sex_label.to_string(),
    };
    (
        figure::histogram(
            &format!("Height distribution for {}", subject),
            "Height_cm",
            &selected.heights,
            figure::SIZE_HISTOGRAM,
        ),
        figure::histogram(
            &format!("Reach distribution for {}", subject),
            "Reach_cm",
            &selected.reaches,
            figure::SIZE_HISTOGRAM,
        ),
    )
}

type Handler = fn(&Dashboard, &mut Selection) -> Vec<Output>;

// A new sex invalidates whatever weight class was picked for the old one.
fn on_sex_change(_: &Dashboard, selection: &mut Selection) -> Vec<Output> {
    selection.weight = None;
    vec![
        Output::new(
            Component::WeightDropdown,
            Property::Options,
            json!(weight_class_options(&selection.sex)),
        ),
        Output::new(Component::WeightDropdown, Property::Value, Value::Null),
    ]
}

fn on_selection_change(dashboard: &Dashboard, selection: &mut Selection) -> Vec<Output> {
    let (height, reach) = size_histograms(
        dashboard.records(),
        &selection.sex,
        selection.weight.as_deref(),
    );
    vec![
        Output::new(Component::HeightGraph, Property::Figure, json!(height)),
        Output::new(Component::ReachGraph, Property::Figure, json!(reach)),
    ]
}

/// Maps a component event to the handlers it triggers, run in registration order.
pub struct Registry {
    handlers: IndexMap<(Component, EventKind), Vec<(&'static str, Handler)>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.handlers.iter().map(|(key, handlers)| {
            let names: Vec<&str> = handlers.iter().map(|(name, _)| *name).collect();
            (key, names)
        });
        f.debug_map().entries(names).finish()
    }
}

impl Registry {
    pub fn empty() -> Registry {
        Registry {
            handlers: IndexMap::new(),
        }
    }

    pub fn on(
        mut self,
        source: Component,
        kind: EventKind,
        name: &'static str,
        handler: Handler,
    ) -> Registry {
        self.handlers
            .entry((source, kind))
            .or_insert_with(Vec::new)
            .push((name, handler));
        self
    }

    pub fn dashboard() -> Registry {
        Registry::empty()
            .on(
                Component::SexDropdown,
                EventKind::Change,
                "weight_class_options",
                on_sex_change,
            )
            .on(
                Component::SexDropdown,
                EventKind::Change,
                "size_histograms",
                on_selection_change,
            )
            .on(
                Component::WeightDropdown,
                EventKind::Change,
                "size_histograms",
                on_selection_change,
            )
    }

    pub fn dispatch(&self, dashboard: &Dashboard, event: Event) -> Result<Update, DispatchError> {
        let handlers = self
            .handlers
            .get(&(event.source, event.kind))
            .ok_or(DispatchError::Unbound {
                source: event.source,
                kind: event.kind,
            })?;
        debug!(
            source = event.source.id(),
            event = ?event.kind,
            handlers = handlers.len(),
            sex = %event.state.sex,
            weight = ?event.state.weight,
            "dispatching event"
        );

        let mut selection = event.state;
        let mut outputs = Vec::new();
        for (name, handler) in handlers {
            let produced = handler(dashboard, &mut selection);
            debug!(handler = name, outputs = produced.len(), "handler finished");
            outputs.extend(produced);
        }
        Ok(Update { selection, outputs })
    }
}
