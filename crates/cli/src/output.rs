use clap::ValueEnum;
use net_dns_query_domain::{Query, ResourceRecord, ResponseCode};
use net_dns_query_infrastructure::dns::Resolution;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct RecordView {
    name: String,
    ttl: u32,
    class: String,
    #[serde(rename = "type")]
    record_type: String,
    data: String,
}

impl From<&ResourceRecord> for RecordView {
    fn from(record: &ResourceRecord) -> Self {
        Self {
            name: record.name.to_fqdn(),
            ttl: record.ttl,
            class: record.record_class.to_string(),
            record_type: record.record_type.to_string(),
            data: record.data.to_string(),
        }
    }
}

/// Renders a resolution for stdout. JSON output is always an array of
/// records, empty for NXDOMAIN and NODATA.
pub fn render(
    query: &Query,
    resolution: &Resolution,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let views: Vec<RecordView> = resolution.records.iter().map(RecordView::from).collect();
            let mut out = serde_json::to_string_pretty(&views)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Text => Ok(render_text(query, resolution)),
    }
}

fn render_text(query: &Query, resolution: &Resolution) -> String {
    let mut out = String::new();

    if resolution.response_code == ResponseCode::NameError {
        let _ = writeln!(out, "{}: no such domain (NXDOMAIN)", query.name().to_fqdn());
        return out;
    }
    if resolution.records.is_empty() {
        let _ = writeln!(
            out,
            "{}: no {} records",
            query.name().to_fqdn(),
            query.record_type()
        );
        return out;
    }

    for record in &resolution.records {
        let _ = writeln!(out, "{}", record);
    }
    out
}
