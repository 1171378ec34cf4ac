//! Multi-format export (spec §4.11 "Export behavior"): `html | pdf |
//! json | zip`. PDF falls back to HTML + an explainer on
//! `export_unsupported`; zip bundles whatever the other formats
//! produced plus a `metadata.json` manifest.

use crate::storage::ReportStorage;
use crate::types::{ChartSpec, ExportFormat, ExportedFile, ReportContent};
use md5::{Digest, Md5};
use patentflow_common::{CoreResult, DocumentExporter};
use serde_json::json;
use std::collections::HashMap;
use std::io::Write;

fn hash_of(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

async fn write_and_record(
    storage: &ReportStorage,
    path: std::path::PathBuf,
    bytes: &[u8],
    format: &str,
) -> std::io::Result<ExportedFile> {
    storage.write_file(&path, bytes).await?;
    Ok(ExportedFile {
        path: path.to_string_lossy().to_string(),
        size: bytes.len() as u64,
        hash: hash_of(bytes),
        format: format.to_string(),
    })
}

fn json_payload(content: &ReportContent, charts: &[ChartSpec]) -> Vec<u8> {
    let value = json!({
        "summary": content.summary,
        "sections": content.sections.iter().map(|s| json!({"title": s.title, "body": s.body})).collect::<Vec<_>>(),
        "charts": charts,
    });
    serde_json::to_vec_pretty(&value).unwrap_or_default()
}

/// Exports one requested format, returning the `ReportVersion.files`
/// entries it produced (more than one for `pdf`'s failure path and for
/// `zip`).
pub async fn export_one(
    format: ExportFormat,
    report_id: &str,
    version_number: u32,
    html: &str,
    content: &ReportContent,
    charts: &[ChartSpec],
    storage: &ReportStorage,
    document_exporter: &dyn DocumentExporter,
) -> CoreResult<HashMap<String, ExportedFile>> {
    let mut files = HashMap::new();
    match format {
        ExportFormat::Html => {
            let path = storage.report_file_path(report_id, version_number, "html");
            let file = write_and_record(storage, path, html.as_bytes(), "html")
                .await
                .map_err(io_error)?;
            files.insert("html".to_string(), file);
        }
        ExportFormat::Json => {
            let bytes = json_payload(content, charts);
            let path = storage.report_file_path(report_id, version_number, "json");
            let file = write_and_record(storage, path, &bytes, "json").await.map_err(io_error)?;
            files.insert("json".to_string(), file);
        }
        ExportFormat::Pdf => {
            match document_exporter.html_to_pdf(html, &json!({})).await {
                Ok(bytes) => {
                    let path = storage.report_file_path(report_id, version_number, "pdf");
                    let file = write_and_record(storage, path, &bytes, "pdf").await.map_err(io_error)?;
                    files.insert("pdf".to_string(), file);
                }
                Err(err) => {
                    let fallback_html_path = storage.report_file_path(report_id, version_number, "pdf_fallback.html");
                    write_and_record(storage, fallback_html_path.clone(), html.as_bytes(), "html")
                        .await
                        .map_err(io_error)?;
                    let explainer = format!(
                        "PDF export is unavailable in this environment: {err}\n\nAn HTML rendering of this report \
                         has been saved alongside this file at: {}\n",
                        fallback_html_path.display()
                    );
                    let explainer_path = storage.report_file_path(report_id, version_number, "pdf_error.txt");
                    let file = write_and_record(storage, explainer_path, explainer.as_bytes(), "pdf_error")
                        .await
                        .map_err(io_error)?;
                    files.insert("pdf".to_string(), file);
                }
            }
        }
        ExportFormat::Zip => {
            let pdf_bytes = document_exporter.html_to_pdf(html, &json!({})).await.ok();
            let json_bytes = json_payload(content, charts);
            let mut formats = vec!["html", "json"];
            if pdf_bytes.is_some() {
                formats.push("pdf");
            }
            let metadata = json!({
                "report_id": report_id,
                "version_number": version_number,
                "formats": formats,
            });
            let zip_bytes = build_zip(html.as_bytes(), &json_bytes, pdf_bytes.as_deref(), &metadata)?;
            let path = storage.report_file_path(report_id, version_number, "zip");
            let file = write_and_record(storage, path, &zip_bytes, "zip").await.map_err(io_error)?;
            files.insert("zip".to_string(), file);
        }
    }
    Ok(files)
}

fn build_zip(
    html: &[u8],
    json_bytes: &[u8],
    pdf: Option<&[u8]>,
    metadata: &serde_json::Value,
) -> CoreResult<Vec<u8>> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("report.html", options).map_err(zip_error)?;
        zip.write_all(html).map_err(io_error)?;

        zip.start_file("report.json", options).map_err(zip_error)?;
        zip.write_all(json_bytes).map_err(io_error)?;

        if let Some(pdf_bytes) = pdf {
            zip.start_file("report.pdf", options).map_err(zip_error)?;
            zip.write_all(pdf_bytes).map_err(io_error)?;
        }

        zip.start_file("metadata.json", options).map_err(zip_error)?;
        let metadata_bytes = serde_json::to_vec_pretty(metadata).unwrap_or_default();
        zip.write_all(&metadata_bytes).map_err(io_error)?;

        zip.finish().map_err(zip_error)?;
    }
    Ok(buffer.into_inner())
}

fn io_error(err: std::io::Error) -> patentflow_common::CoreError {
    patentflow_common::CoreError::internal(format!("report export I/O failed: {err}"))
}

fn zip_error(err: zip::result::ZipError) -> patentflow_common::CoreError {
    patentflow_common::CoreError::internal(format!("zip archive build failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportSection;
    use patentflow_common::fakes::UnsupportedDocumentExporter;

    fn content() -> ReportContent {
        ReportContent { summary: "s".to_string(), sections: vec![ReportSection { title: "t".to_string(), body: "b".to_string() }] }
    }

    #[tokio::test]
    async fn html_export_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::new(dir.path());
        storage.ensure_layout().await.unwrap();
        let files = export_one(
            ExportFormat::Html,
            "r1",
            1,
            "<html></html>",
            &content(),
            &[],
            &storage,
            &UnsupportedDocumentExporter,
        )
        .await
        .unwrap();
        assert!(files.contains_key("html"));
        assert!(std::path::Path::new(&files["html"].path).exists());
    }

    #[tokio::test]
    async fn pdf_export_falls_back_to_html_plus_explainer() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::new(dir.path());
        storage.ensure_layout().await.unwrap();
        let files = export_one(
            ExportFormat::Pdf,
            "r1",
            1,
            "<html></html>",
            &content(),
            &[],
            &storage,
            &UnsupportedDocumentExporter,
        )
        .await
        .unwrap();
        let pdf_entry = &files["pdf"];
        assert_eq!(pdf_entry.format, "pdf_error");
        assert!(pdf_entry.path.ends_with("pdf_error.txt"));
    }

    #[tokio::test]
    async fn zip_export_bundles_html_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::new(dir.path());
        storage.ensure_layout().await.unwrap();
        let files = export_one(
            ExportFormat::Zip,
            "r1",
            1,
            "<html></html>",
            &content(),
            &[],
            &storage,
            &UnsupportedDocumentExporter,
        )
        .await
        .unwrap();
        assert!(files.contains_key("zip"));
        let bytes = tokio::fs::read(&files["zip"].path).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("report.html").is_ok());
        assert!(archive.by_name("metadata.json").is_ok());
    }
}
