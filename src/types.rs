use serde::{Deserialize, Serialize};

/// A customer viewing a page. `is_special` marks views of campaign pages,
/// which downstream consumers weight differently.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PageView {
    pub customer_id: String,
    pub url: String,
    pub is_special: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Purchase {
    pub customer_id: String,
    pub item: String,
    pub amount: f64,
}

/// The closed set of event kinds this pipeline understands, regardless of
/// which wire format they arrived under. `NoAction` is the sentinel for a
/// well-formed wrapper record with no populated action - it is not a decode
/// error, and folding it is a no-op.
#[derive(Clone, Debug, PartialEq)]
pub enum CustomerEvent {
    PageView(PageView),
    Purchase(Purchase),
    NoAction,
}

impl CustomerEvent {
    /// The customer id embedded in the payload. `NoAction` carries none; its
    /// routing key comes from the wrapper container's `id` field instead.
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            CustomerEvent::PageView(pv) => Some(&pv.customer_id),
            CustomerEvent::Purchase(p) => Some(&p.customer_id),
            CustomerEvent::NoAction => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CustomerEvent::PageView(_) => "page_view",
            CustomerEvent::Purchase(_) => "purchase",
            CustomerEvent::NoAction => "no_action",
        }
    }
}

/// The decoded, format-agnostic representation of one record. The routing
/// key is always the customer id the payload embeds (the producer keys
/// records by it), so all events for one customer land on one partition and
/// are folded in order by a single worker.
#[derive(Clone, Debug, PartialEq)]
pub struct EventEnvelope {
    pub routing_key: String,
    pub event: CustomerEvent,
}

impl EventEnvelope {
    /// Builds an envelope for an event that embeds a customer id. Returns
    /// `None` for `NoAction`, which has no identity of its own.
    pub fn from_event(event: CustomerEvent) -> Option<Self> {
        let routing_key = event.customer_id()?.to_string();
        Some(Self { routing_key, event })
    }
}

/// Per-customer accumulated state, re-emitted after every fold.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomerAggregate {
    pub customer_id: String,
    pub page_view_urls: Vec<String>,
    pub purchased_items: Vec<String>,
}

impl CustomerAggregate {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            page_view_urls: Vec::new(),
            purchased_items: Vec::new(),
        }
    }

    /// Folds a single event into the aggregate. Append-only: page views add
    /// their url, purchases their item, the no-action sentinel changes
    /// nothing.
    pub fn apply(&mut self, event: &CustomerEvent) {
        match event {
            CustomerEvent::PageView(pv) => self.page_view_urls.push(pv.url.clone()),
            CustomerEvent::Purchase(p) => self.purchased_items.push(p.item.clone()),
            CustomerEvent::NoAction => {}
        }
    }
}
