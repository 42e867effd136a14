use serde_json::{Map, Value};

/// One incident report as returned by the API: an opaque JSON object with no
/// enforced schema beyond the configured date field. Records are immutable
/// once fetched and their identity is positional within a record set.
pub type Record = Map<String, Value>;
