// CSV import - one entity per row, through the resource controllers
//
// Headers become payload keys and empty cells are left out. For child kinds
// the parent id is taken out of its column (e.g. `region_id`) and passed as
// the parent, the same way the nested create routes do it.

use anyhow::{Context, Result};
use csv::StringRecord;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::entities::EntityKind;
use crate::error::ResourceResult;
use crate::service::Lodging;

/// Rows imported and rows rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: usize,
}

pub fn import_file(lodging: &Lodging, kind: EntityKind, path: &Path) -> Result<ImportReport> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV {}", path.display()))?;
    import_csv(lodging, kind, file)
}

pub fn import_csv<R: Read>(lodging: &Lodging, kind: EntityKind, input: R) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    let parent_field = kind.descriptor().parent.map(|fk| fk.field);

    let mut report = ImportReport::default();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = index + 2;

        let mut payload = row_payload(&headers, &record);

        let parent = match parent_field {
            Some(field) => match payload.remove(field) {
                Some(Value::String(parent)) => Some(parent),
                _ => {
                    warn!(line, field, "Row has no parent id, skipped");
                    report.rejected += 1;
                    continue;
                }
            },
            None => None,
        };

        match create_row(lodging, kind, parent.as_deref(), Value::Object(payload)) {
            Ok(id) => {
                report.imported += 1;
                debug!(line, id = %id, "Row imported");
            }
            Err(e) => {
                warn!(line, error = %e, "Row rejected");
                report.rejected += 1;
            }
        }
    }

    info!(
        kind = %kind,
        imported = report.imported,
        rejected = report.rejected,
        "CSV import finished"
    );
    Ok(report)
}

fn row_payload(headers: &StringRecord, record: &StringRecord) -> Map<String, Value> {
    headers
        .iter()
        .zip(record.iter())
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
        .collect()
}

fn create_row(
    lodging: &Lodging,
    kind: EntityKind,
    parent: Option<&str>,
    payload: Value,
) -> ResourceResult<String> {
    let payload = Some(payload);
    Ok(match kind {
        EntityKind::Region => lodging.regions.create(parent, payload)?.id,
        EntityKind::Locality => lodging.localities.create(parent, payload)?.id,
        EntityKind::Listing => lodging.listings.create(parent, payload)?.id,
        EntityKind::Reviewer => lodging.reviewers.create(parent, payload)?.id,
        EntityKind::Tag => lodging.tags.create(parent, payload)?.id,
        EntityKind::Review => lodging.reviews.create(parent, payload)?.id,
    })
}
