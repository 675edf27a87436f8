//! Load Page Span Tests
//!
//! Tests for:
//! - Offset and limit recorded on the `load_page` span

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use rl_client::memory::InMemoryService;
use rl_common::{CircleId, GroupId, LocalGroup, RoleInput, WorkingCircle};
use rl_store::{GroupsStore, RoleListStore, ScrollCounter, StaticDefaults, StoreOptions};

type Recorded = Arc<Mutex<Vec<(String, String, String)>>>;

/// Collects (span, field, value) for every value recorded after span creation
struct RecordedFields(Recorded);

struct FieldVisitor<'a> {
    span: &'a str,
    out: &'a mut Vec<(String, String, String)>,
}

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.out
            .push((self.span.to_string(), field.name().to_string(), format!("{:?}", value)));
    }
}

impl<S> Layer<S> for RecordedFields
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut out = self.0.lock().unwrap();
        values.record(&mut FieldVisitor {
            span: span.name(),
            out: &mut out,
        });
    }
}

#[tokio::test(start_paused = true)]
async fn test_load_page_span_records_offset_and_limit() {
    let recorded: Recorded = Arc::default();
    let subscriber = tracing_subscriber::registry().with(RecordedFields(recorded.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let service = Arc::new(InMemoryService::new().with_groups(
        vec![LocalGroup { id: GroupId(1), name: "Berlin".into() }],
        vec![WorkingCircle { id: CircleId(10), name: "Outreach".into(), local_group_id: None }],
    ));
    for name in ["a", "b", "c"] {
        service.seed(
            RoleInput::new(name)
                .with_local_group(GroupId(1))
                .with_working_circle(CircleId(10))
                .with_time_commitment(2, 8),
        );
    }
    let store = RoleListStore::with_options(
        service.clone(),
        Arc::new(GroupsStore::new(service)),
        Arc::new(StaticDefaults::default()),
        StoreOptions {
            page_limit: 2,
            ..StoreOptions::default()
        },
    );
    let scroll = ScrollCounter::new();

    store.load_page(&scroll).await.unwrap();
    store.load_page(&scroll).await.unwrap();

    let fields: Vec<_> = recorded
        .lock()
        .unwrap()
        .iter()
        .filter(|(span, _, _)| span == "load_page")
        .map(|(_, field, value)| (field.clone(), value.clone()))
        .collect();
    let expected: Vec<_> = [("offset", "0"), ("limit", "2"), ("offset", "2"), ("limit", "2")]
        .iter()
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect();
    assert_eq!(fields, expected);
}
