use crate::domain::model::{Dataset, ExportFormat, ExportOptions};
use crate::domain::ports::Storage;
use crate::utils::error::{CurateError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Record-oriented JSON array, indented three spaces.
pub fn render_json<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(buf)
}

pub fn render_csv<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| CurateError::IoError(e.into_error()))
}

fn render<T: Serialize>(records: &[T], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => render_json(records),
        ExportFormat::Csv => render_csv(records),
    }
}

/// (file name, contents) for every table in every configured format.
pub fn render_dataset(dataset: &Dataset, options: &ExportOptions) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for format in &options.formats {
        let ext = format.extension();
        files.push((
            format!("{}.{}", options.observations_name, ext),
            render(&dataset.observations, *format)?,
        ));
        files.push((
            format!("{}.{}", options.sites_name, ext),
            render(&dataset.sites, *format)?,
        ));
    }
    Ok(files)
}

pub fn bundle_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Write the export and return where it went: the zip archive when
/// bundling, otherwise the output directory.
pub fn export_dataset<S: Storage>(
    storage: &S,
    dataset: &Dataset,
    options: &ExportOptions,
) -> Result<String> {
    let files = render_dataset(dataset, options)?;
    let out_dir = Path::new(&options.output_path);

    match &options.bundle {
        Some(bundle_name) => {
            let archive = bundle_zip(&files)?;
            let path = out_dir.join(bundle_name).to_string_lossy().into_owned();
            tracing::debug!("Writing {} files into {} ({} bytes)", files.len(), path, archive.len());
            storage.write_file(&path, &archive)?;
            Ok(path)
        }
        None => {
            for (name, data) in &files {
                let path = out_dir.join(name).to_string_lossy().into_owned();
                tracing::debug!("Writing {} ({} bytes)", path, data.len());
                storage.write_file(&path, data)?;
            }
            Ok(options.output_path.clone())
        }
    }
}
