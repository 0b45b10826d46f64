//! Document → Meeting projection.
//!
//! Fields are copied by name. Anything missing from the document is left
//! absent on the record; projection never fails.

use bridge_types::{Document, Meeting};

/// Document field names read into a [`Meeting`], in record order.
pub const MEETING_FIELDS: [&str; 4] = ["name", "date", "startTime", "endTime"];

/// Project one document into a meeting.
///
/// Every field in [`MEETING_FIELDS`] is copied verbatim, whatever its JSON
/// type.
pub fn project_meeting(doc: &Document) -> Meeting {
    let [name, date, start_time, end_time] = MEETING_FIELDS.map(|field| doc.field(field).cloned());

    Meeting {
        id: doc.id.clone(),
        name,
        date,
        start_time,
        end_time,
    }
}

/// Project a collection snapshot, preserving enumeration order.
pub fn project_meetings(docs: &[Document]) -> Vec<Meeting> {
    docs.iter().map(project_meeting).collect()
}
