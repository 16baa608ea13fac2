//! Document catalogue, accept rules and storage path conventions.
//!
//! Stored documents live at `{employee_number}/{document_type}_{unix_millis}.{ext}`.
//! Document type ids may themselves contain underscores (`id_front`), so the type is
//! recovered by splitting on the last underscore before the timestamp.

use serde::Deserialize;

/// One kind of document an employee is asked to provide.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentType {
    /// Stable id used in storage paths, e.g. `kra_pin`
    pub id: String,
    /// Label shown to employees
    pub label: String,
    /// Comma-separated accept list: `.ext`, `type/*` or a MIME fragment
    pub accept: String,
}

impl DocumentType {
    fn new(id: &str, label: &str, accept: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            accept: accept.to_string(),
        }
    }

    /// The catalogue the portal ships with.
    #[must_use]
    pub fn default_catalog() -> Vec<Self> {
        vec![
            Self::new("id_front", "Kenyan ID Front", ".jpg,.jpeg"),
            Self::new("id_back", "Kenyan ID Back", ".jpg,.jpeg"),
            Self::new("kra_pin", "KRA PIN Certificate", ".jpg,.jpeg"),
            Self::new("nssf", "NSSF Card", ".jpg,.jpeg"),
            Self::new("nhif", "NHIF Card", ".jpg,.jpeg"),
            Self::new("cv", "CV/Resume", ".pdf,.doc,.docx"),
            Self::new("certificates", "Certificates", "image/*,.pdf,.doc,.docx"),
        ]
    }

    /// Whether a file with this name and MIME type satisfies any accept rule.
    #[must_use]
    pub fn accepts(&self, file_name: &str, content_type: &str) -> bool {
        let extension = file_extension(file_name).map(str::to_lowercase);
        let content_type = content_type.to_lowercase();

        self.accept
            .split(',')
            .map(|rule| rule.trim().to_lowercase())
            .filter(|rule| !rule.is_empty())
            .any(|rule| {
                if let Some(ext) = rule.strip_prefix('.') {
                    extension.as_deref() == Some(ext)
                } else if let Some(major) = rule.strip_suffix("/*") {
                    content_type
                        .split_once('/')
                        .is_some_and(|(m, _)| m == major)
                } else {
                    content_type.contains(&rule)
                }
            })
    }
}

/// Looks a document type up by id.
#[must_use]
pub fn find_document_type<'a>(catalog: &'a [DocumentType], id: &str) -> Option<&'a DocumentType> {
    catalog.iter().find(|t| t.id == id)
}

/// Text after the last `.` of a file name, if any.
#[must_use]
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Storage path for a new upload.
#[must_use]
pub fn build_document_path(
    employee_number: &str,
    document_type: &str,
    unix_millis: i64,
    file_name: &str,
) -> String {
    match file_extension(file_name) {
        Some(ext) => format!("{employee_number}/{document_type}_{unix_millis}.{ext}"),
        None => format!("{employee_number}/{document_type}_{unix_millis}"),
    }
}

/// Recovers the document type id from a stored file name such as
/// `id_front_1718000000000.jpg`.
#[must_use]
pub fn parse_document_type(file_name: &str) -> Option<&str> {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    let (document_type, stamp) = stem.rsplit_once('_')?;
    let is_stamp = !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit());
    (is_stamp && !document_type.is_empty()).then_some(document_type)
}

/// Broad class of a stored file, used to pick a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Document,
}

impl FileKind {
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        match file_extension(file_name).map(str::to_lowercase).as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "webp") => Self::Image,
            Some("pdf") => Self::Pdf,
            _ => Self::Document,
        }
    }
}

/// Human-readable size: `0 B`, `512 B`, `1.5 KB`, `5 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    let text = format!("{rounded:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text} {}", UNITS[unit])
}
