use chrono::{TimeZone, Utc};
use histograph_core::graph::{DynMetamodel, DynObject, LiveElement, LiveValue};
use histograph_core::FixedDateProvider;
use histograph_engine::{Histograph, HistographBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Person { name, age, boss } and Team { name, members }
#[allow(dead_code)]
pub fn metamodel() -> DynMetamodel {
    DynMetamodel::new()
        .with_type("Person", &["name", "age", "boss"])
        .with_type("Team", &["name", "members"])
}

#[allow(dead_code)]
pub fn person(id: &str, name: &str, age: i64) -> DynObject {
    DynObject::new("Person", id)
        .with("name", name)
        .with("age", age)
        .with("boss", LiveValue::Reference(None))
}

#[allow(dead_code)]
pub fn team(id: &str, name: &str, members: &[&DynObject]) -> DynObject {
    DynObject::new("Team", id).with("name", name).with(
        "members",
        LiveValue::List(
            members
                .iter()
                .map(|m| LiveElement::Object((*m).clone()))
                .collect(),
        ),
    )
}

#[allow(dead_code)]
pub fn no_properties() -> BTreeMap<String, String> {
    BTreeMap::new()
}

#[allow(dead_code)]
pub fn builder() -> HistographBuilder<DynMetamodel> {
    HistographBuilder::new(metamodel()).with_date_provider(Arc::new(FixedDateProvider::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    )))
}

/// In-memory histograph with a fixed clock
#[allow(dead_code)]
pub fn histograph() -> Histograph<DynMetamodel> {
    builder().build().unwrap()
}
